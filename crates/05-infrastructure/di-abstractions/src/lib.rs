//! # Dependency Injection Abstractions
//!
//! Bean 定位抽象层，定义限定符、绑定、发布/订阅与监听的核心接口。
//!
//! ## 核心接口
//!
//! - [`Key`] / [`Qualifier`] - 查找键与限定符模型
//! - [`Binding`] - 契约类型到实例提供者的绑定
//! - [`BindingPublisher`] / [`BindingSubscriber`] - 绑定来源协议
//! - [`BeanEntry`] - 对外可见的 Bean 条目
//! - [`Mediator`] / [`WatchHandle`] - 监听协议
//! - [`BeanLocator`] / [`MutableBeanLocator`] - 定位器接口

pub mod binding;
pub mod entry;
pub mod key;
pub mod locator;
pub mod mediator;
pub mod publisher;
pub mod qualifier;

pub use binding::*;
pub use entry::*;
pub use key::*;
pub use locator::*;
pub use mediator::*;
pub use publisher::*;
pub use qualifier::*;
