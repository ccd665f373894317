//! # Infrastructure Common
//!
//! 这个 crate 提供了 Bean 定位基础设施的公共类型和工具。
//!
//! ## 核心组件
//!
//! - [`RawType`] - 契约类型元数据
//! - [`ProvisionError`] - 实例提供错误
//! - [`LocatorSettings`] - 定位器配置
//! - [`init_tracing`] - 日志初始化

pub mod configuration;
pub mod errors;
pub mod logging;
pub mod metadata;

pub use configuration::*;
pub use errors::*;
pub use logging::*;
pub use metadata::*;
