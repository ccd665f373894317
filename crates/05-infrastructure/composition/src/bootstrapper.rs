//! 定位器启动器

use crate::environment::Environment;
use chrono::{DateTime, Utc};
use di_abstractions::MutableBeanLocator;
use di_impl::DefaultBeanLocator;
use infrastructure_common::{init_tracing, BootstrapResult, LocatorSettings};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// 定位器启动器
///
/// 负责协调启动顺序：加载配置、初始化日志、逐个发现运行环境并注册其发布者
pub struct LocatorBootstrapper {
    /// 显式给出的配置，优先于配置文件
    settings: Option<LocatorSettings>,
    /// 配置文件路径
    settings_path: Option<PathBuf>,
    /// 运行环境列表
    environments: Vec<Box<dyn Environment>>,
    /// 是否初始化日志
    logging_enabled: bool,
}

impl LocatorBootstrapper {
    /// 创建新的启动器
    pub fn new() -> Self {
        Self {
            settings: None,
            settings_path: None,
            environments: Vec::new(),
            logging_enabled: false,
        }
    }

    /// 使用显式配置
    pub fn with_settings(mut self, settings: LocatorSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// 从 TOML 文件加载配置
    pub fn with_settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// 添加运行环境
    pub fn add_environment<E: Environment + 'static>(mut self, environment: E) -> Self {
        debug!("添加运行环境: {}", environment.name());
        self.environments.push(Box::new(environment));
        self
    }

    /// 是否初始化全局日志
    pub fn enable_logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    /// 启动定位器
    pub async fn bootstrap(self) -> BootstrapResult<LocatorRuntime> {
        // 第一步：加载配置
        let settings = match self.settings {
            Some(settings) => {
                settings.validate()?;
                settings
            }
            None => LocatorSettings::load(self.settings_path.as_deref())?,
        };

        // 第二步：初始化日志
        if self.logging_enabled && !init_tracing(&settings.logging) {
            debug!("全局日志订阅者已存在，跳过初始化");
        }
        info!("开始启动 Bean 定位器");

        // 第三步：注册各环境的发布者
        let locator = DefaultBeanLocator::new();
        for environment in &self.environments {
            info!("发现运行环境: {}", environment.name());
            let publishers = environment.publishers().await?;

            for ranked in publishers {
                let rank = ranked.rank.unwrap_or(settings.default_rank);
                if !locator.add(ranked.publisher.clone(), rank) {
                    warn!(
                        environment = environment.name(),
                        publisher = %ranked.publisher.id(),
                        "发布者重复注册，已忽略"
                    );
                }
            }
        }

        match serde_json::to_string(&locator.snapshot()) {
            Ok(snapshot) => debug!(snapshot = %snapshot, "定位器初始状态"),
            Err(error) => warn!(error = %error, "无法序列化定位器快照"),
        }
        info!(
            publishers = locator.publishers().len(),
            "Bean 定位器启动完成"
        );

        Ok(LocatorRuntime {
            locator,
            settings,
            started_at: Utc::now(),
            stopped: AtomicBool::new(false),
        })
    }
}

impl Default for LocatorBootstrapper {
    fn default() -> Self {
        Self::new()
    }
}

/// 已启动的定位器
///
/// 关闭必须显式调用 [`LocatorRuntime::shutdown`]。
#[derive(Debug)]
pub struct LocatorRuntime {
    locator: DefaultBeanLocator,
    settings: LocatorSettings,
    started_at: DateTime<Utc>,
    stopped: AtomicBool,
}

impl LocatorRuntime {
    /// 定位器
    pub fn locator(&self) -> &DefaultBeanLocator {
        &self.locator
    }

    /// 生效的配置
    pub fn settings(&self) -> &LocatorSettings {
        &self.settings
    }

    /// 启动时间
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// 是否已关闭
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// 关闭：移除所有发布者并结束所有监听；重复调用是无操作
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("关闭 Bean 定位器");
        self.locator.clear();
    }
}
