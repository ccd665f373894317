//! 监听（mediation）协议

use crate::entry::BeanEntry;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// 中介者
///
/// 在匹配监听键的 Bean 出现或消失时被调用。返回的错误会被定位器捕获并记录，
/// 不会影响其他中介者，也不会回滚定位器自身的状态。
pub trait Mediator<T: ?Sized, W>: Send + Sync {
    /// Bean 出现
    fn add(&self, entry: &BeanEntry<T>, watcher: &W) -> anyhow::Result<()>;

    /// Bean 消失
    fn remove(&self, entry: &BeanEntry<T>, watcher: &W) -> anyhow::Result<()>;
}

/// 基于闭包的中介者
pub struct FnMediator<T: ?Sized, W, A, R> {
    on_add: A,
    on_remove: R,
    _marker: PhantomData<fn(&T, &W)>,
}

/// 由两个闭包构造中介者
pub fn mediator_fn<T, W, A, R>(on_add: A, on_remove: R) -> FnMediator<T, W, A, R>
where
    T: ?Sized,
    A: Fn(&BeanEntry<T>, &W) -> anyhow::Result<()> + Send + Sync,
    R: Fn(&BeanEntry<T>, &W) -> anyhow::Result<()> + Send + Sync,
{
    FnMediator {
        on_add,
        on_remove,
        _marker: PhantomData,
    }
}

impl<T, W, A, R> Mediator<T, W> for FnMediator<T, W, A, R>
where
    T: ?Sized,
    A: Fn(&BeanEntry<T>, &W) -> anyhow::Result<()> + Send + Sync,
    R: Fn(&BeanEntry<T>, &W) -> anyhow::Result<()> + Send + Sync,
{
    fn add(&self, entry: &BeanEntry<T>, watcher: &W) -> anyhow::Result<()> {
        (self.on_add)(entry, watcher)
    }

    fn remove(&self, entry: &BeanEntry<T>, watcher: &W) -> anyhow::Result<()> {
        (self.on_remove)(entry, watcher)
    }
}

/// 监听标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WatchId(Uuid);

impl WatchId {
    /// 生成新的监听标识
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 监听句柄
///
/// 只有显式调用 [`WatchHandle::cancel`] 才会结束监听；丢弃句柄不会取消。
#[must_use = "监听只能通过句柄取消"]
pub struct WatchHandle {
    id: WatchId,
    cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl WatchHandle {
    /// 创建监听句柄
    pub fn new(id: WatchId, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// 监听标识
    pub fn id(&self) -> WatchId {
        self.id
    }

    /// 取消监听；重复取消是无操作
    pub fn cancel(&self) {
        let cancel = self.cancel.lock().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    /// 是否已取消
    pub fn is_cancelled(&self) -> bool {
        self.cancel.lock().is_none()
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
