//! 定位器配置
//!
//! 配置来源按优先级从低到高：内置默认值、可选的 TOML 文件、`LOCATOR__` 前缀的环境变量。

use crate::errors::{ConfigError, ConfigResult};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "LOCATOR";

/// 定位器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorSettings {
    /// 未显式指定等级的发布者使用的默认等级
    pub default_rank: i32,
    /// 日志配置
    pub logging: LoggingSettings,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            default_rank: 0,
            logging: LoggingSettings::default(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` 过滤表达式
    pub filter: String,
    /// 是否输出 JSON 格式日志
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl LocatorSettings {
    /// 加载配置
    ///
    /// `path` 为 `None` 时只使用默认值与环境变量。
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "logging.filter 不能为空".to_string(),
            });
        }
        Ok(())
    }
}
