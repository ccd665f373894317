//! # 依赖注入具体实现
//!
//! 提供 Bean 定位器的默认实现：多来源绑定的有序聚合、限定符过滤，
//! 以及随发布者增删持续同步的监听机制。
//!
//! ## 主要组件
//!
//! - [`DefaultBeanLocator`] - 可变 Bean 定位器
//! - [`RankedBindings`] - 按契约类型共享的有序绑定集合
//! - [`StaticBindingPublisher`] / [`DynamicBindingPublisher`] - 绑定发布者
//! - [`ChannelMediator`] - 以通道接收监听事件
//! - [`lookup`] / [`current`] - role/hint 查找与线程内当前定位器
//!
//! ## 使用示例
//!
//! ```rust
//! use di_abstractions::{BeanLocator, Binding, Key, MutableBeanLocator};
//! use di_impl::{DefaultBeanLocator, StaticBindingPublisher};
//! use std::sync::Arc;
//!
//! let locator = DefaultBeanLocator::new();
//! let module = StaticBindingPublisher::builder("module")
//!     .bind(Binding::<String>::instance(Arc::new("hello".to_string())))
//!     .build();
//! locator.add(Arc::new(module), 0);
//!
//! let greeting = locator.locate(Key::<String>::unrestricted()).first().unwrap();
//! assert_eq!(greeting.value().unwrap().as_str(), "hello");
//! ```

pub mod beans;
pub mod channel;
pub mod current;
pub mod locator;
pub mod lookup;
pub mod publishers;
pub mod ranked_bindings;
pub mod ranked_sequence;
pub mod ranking;
mod watched;

pub use beans::{BeanIter, Beans};
pub use channel::{BeanEvent, ChannelMediator};
pub use locator::{CachedTypeInfo, DefaultBeanLocator, LocatorSnapshot, PublisherInfo, WatchInfo};
pub use lookup::{has_component, lookup, lookup_all};
pub use publishers::{DynamicBindingPublisher, StaticBindingPublisher, StaticPublisherBuilder};
pub use ranked_bindings::RankedBindings;
pub use ranked_sequence::{Ranked, RankedIter, RankedSequence, SortKey, Tier};
pub use ranking::{DefaultRankingFunction, RankingFunction};
