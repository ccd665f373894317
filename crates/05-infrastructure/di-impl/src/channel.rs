//! 基于通道的中介者

use di_abstractions::{BeanEntry, Mediator};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::UnboundedSender;

/// Bean 出现或消失事件
pub enum BeanEvent<T: ?Sized> {
    /// Bean 出现
    Added(BeanEntry<T>),
    /// Bean 消失
    Removed(BeanEntry<T>),
}

impl<T: ?Sized> BeanEvent<T> {
    /// 事件涉及的条目
    pub fn entry(&self) -> &BeanEntry<T> {
        match self {
            Self::Added(entry) | Self::Removed(entry) => entry,
        }
    }

    /// 是否为出现事件
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added(_))
    }
}

impl<T: ?Sized> Clone for BeanEvent<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Added(entry) => Self::Added(entry.clone()),
            Self::Removed(entry) => Self::Removed(entry.clone()),
        }
    }
}

impl<T: ?Sized> fmt::Debug for BeanEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added(entry) => f.debug_tuple("Added").field(entry).finish(),
            Self::Removed(entry) => f.debug_tuple("Removed").field(entry).finish(),
        }
    }
}

/// 把通知转发到无界通道的中介者
///
/// 接收端关闭后的第一次发送失败作为中介者错误记录，之后的通知静默丢弃。
/// 丢弃接收端并不会结束监视，调用方仍需对 [`di_abstractions::WatchHandle`] 调用 `cancel()`。
pub struct ChannelMediator<T: ?Sized> {
    closed: AtomicBool,
    _marker: PhantomData<fn(&T)>,
}

impl<T: ?Sized> ChannelMediator<T> {
    /// 创建中介者
    pub fn new() -> Self {
        Self {
            closed: AtomicBool::new(false),
            _marker: PhantomData,
        }
    }

    fn forward(
        &self,
        event: BeanEvent<T>,
        watcher: &UnboundedSender<BeanEvent<T>>,
    ) -> anyhow::Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Ok(());
        }
        if watcher.send(event).is_err() && !self.closed.swap(true, Ordering::AcqRel) {
            anyhow::bail!("事件接收端已关闭，后续通知将被丢弃");
        }
        Ok(())
    }
}

impl<T: ?Sized> Default for ChannelMediator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mediator<T, UnboundedSender<BeanEvent<T>>> for ChannelMediator<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn add(
        &self,
        entry: &BeanEntry<T>,
        watcher: &UnboundedSender<BeanEvent<T>>,
    ) -> anyhow::Result<()> {
        self.forward(BeanEvent::Added(entry.clone()), watcher)
    }

    fn remove(
        &self,
        entry: &BeanEntry<T>,
        watcher: &UnboundedSender<BeanEvent<T>>,
    ) -> anyhow::Result<()> {
        self.forward(BeanEvent::Removed(entry.clone()), watcher)
    }
}
