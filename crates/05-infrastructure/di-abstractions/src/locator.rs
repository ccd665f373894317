//! Bean 定位器抽象接口

use crate::entry::BeanEntry;
use crate::key::Key;
use crate::mediator::{Mediator, WatchHandle};
use crate::publisher::{BindingPublisher, PublisherId};
use std::sync::Arc;

/// Bean 定位器 trait
///
/// 提供按键查找与监听的核心接口
pub trait BeanLocator: Send + Sync {
    /// `locate` 返回的序列类型
    type Beans<T: ?Sized + Send + Sync + 'static>: IntoIterator<Item = BeanEntry<T>>;

    /// 查找匹配键的 Bean，按等级降序排列；未找到时返回空序列
    fn locate<T>(&self, key: Key<T>) -> Self::Beans<T>
    where
        T: ?Sized + Send + Sync + 'static;

    /// 注册监听：立即为当前匹配的 Bean 调用 `add`，之后随发布者变化持续通知
    fn watch<T, W, M>(&self, key: Key<T>, mediator: M, watcher: W) -> WatchHandle
    where
        T: ?Sized + Send + Sync + 'static,
        W: Send + Sync + 'static,
        M: Mediator<T, W> + 'static;
}

/// 可变 Bean 定位器 trait
pub trait MutableBeanLocator: BeanLocator {
    /// 以指定等级注册发布者；已注册时返回 `false`
    fn add(&self, publisher: Arc<dyn BindingPublisher>, rank: i32) -> bool;

    /// 移除发布者；未注册时返回 `false`
    fn remove(&self, publisher: PublisherId) -> bool;

    /// 移除所有发布者并结束所有监听
    fn clear(&self);
}
