//! # 基础设施组合层
//!
//! 负责把配置、日志与各运行环境的绑定发布者组合成一个可运行的 Bean 定位器。
//!
//! ## 主要功能
//!
//! - **运行环境适配**: 每种环境实现 [`Environment`]，交出它发现的发布者
//! - **启动编排**: [`LocatorBootstrapper`] 按 配置 → 日志 → 发布者 的顺序启动
//! - **显式关闭**: [`LocatorRuntime::shutdown`] 移除所有发布者并结束所有监听
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_abstractions::{BeanLocator, Binding, Key};
//! use di_impl::StaticBindingPublisher;
//! use infrastructure_composition::{LocatorBootstrapper, StaticEnvironment};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let module = StaticBindingPublisher::builder("app")
//!         .bind(Binding::<String>::instance(Arc::new("hello".to_string())))
//!         .build();
//!
//!     let runtime = LocatorBootstrapper::new()
//!         .enable_logging(true)
//!         .add_environment(StaticEnvironment::new("in-process").with_publisher(Arc::new(module)))
//!         .bootstrap()
//!         .await?;
//!
//!     for entry in runtime.locator().locate(Key::<String>::unrestricted()) {
//!         println!("{}", entry);
//!     }
//!
//!     runtime.shutdown();
//!     Ok(())
//! }
//! ```

pub mod bootstrapper;
pub mod environment;

#[cfg(test)]
mod tests;

pub use bootstrapper::{LocatorBootstrapper, LocatorRuntime};
pub use environment::{Environment, RankedPublisher, StaticEnvironment};

// 重新导出错误类型
pub use infrastructure_common::BootstrapError;
