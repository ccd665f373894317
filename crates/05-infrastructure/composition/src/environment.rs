//! 运行环境适配
//!
//! 每种运行环境（进程内模块、扩展注册表等）实现一个 [`Environment`]，
//! 在启动时交出它发现的绑定发布者。

use async_trait::async_trait;
use di_abstractions::BindingPublisher;
use infrastructure_common::BootstrapResult;
use std::sync::Arc;

/// 带可选等级的发布者
#[derive(Clone)]
pub struct RankedPublisher {
    /// 发布者
    pub publisher: Arc<dyn BindingPublisher>,
    /// 注册等级；`None` 时使用配置中的默认等级
    pub rank: Option<i32>,
}

impl RankedPublisher {
    /// 使用默认等级
    pub fn new(publisher: Arc<dyn BindingPublisher>) -> Self {
        Self {
            publisher,
            rank: None,
        }
    }

    /// 指定等级
    pub fn with_rank(mut self, rank: i32) -> Self {
        self.rank = Some(rank);
        self
    }
}

impl std::fmt::Debug for RankedPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankedPublisher")
            .field("publisher", &self.publisher.description())
            .field("rank", &self.rank)
            .finish()
    }
}

/// 运行环境 trait
#[async_trait]
pub trait Environment: Send + Sync {
    /// 环境名称
    fn name(&self) -> &str;

    /// 发现该环境中的发布者
    async fn publishers(&self) -> BootstrapResult<Vec<RankedPublisher>>;
}

/// 固定发布者列表的环境
#[derive(Debug)]
pub struct StaticEnvironment {
    name: String,
    publishers: Vec<RankedPublisher>,
}

impl StaticEnvironment {
    /// 创建环境
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            publishers: Vec::new(),
        }
    }

    /// 添加使用默认等级的发布者
    pub fn with_publisher(mut self, publisher: Arc<dyn BindingPublisher>) -> Self {
        self.publishers.push(RankedPublisher::new(publisher));
        self
    }

    /// 添加指定等级的发布者
    pub fn with_ranked_publisher(
        mut self,
        publisher: Arc<dyn BindingPublisher>,
        rank: i32,
    ) -> Self {
        self.publishers.push(RankedPublisher::new(publisher).with_rank(rank));
        self
    }
}

#[async_trait]
impl Environment for StaticEnvironment {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publishers(&self) -> BootstrapResult<Vec<RankedPublisher>> {
        Ok(self.publishers.clone())
    }
}
