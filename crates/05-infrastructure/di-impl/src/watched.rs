//! 监听同步
//!
//! 每个监听维护一份已通知的条目集合。绑定变化时重新计算当前匹配的条目，
//! 先为消失的条目调用 `remove`，再按等级顺序为新出现的条目调用 `add`。
//! 同一监听的同步被互斥锁串行化；同步期间到达的变化（包括中介者自身触发的变化）
//! 只登记一个待处理标记，由持锁者在本轮结束前补做。

use crate::beans::Beans;
use crate::ranked_bindings::{BindingsListener, RankedBindings};
use di_abstractions::{BeanEntry, BindingId, Key, Mediator, WatchId};
use infrastructure_common::RawType;
use parking_lot::{Mutex, MutexGuard};
use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// 定位器持有的类型擦除监听注册
pub(crate) trait WatchRegistration: Send + Sync {
    fn id(&self) -> WatchId;

    fn key_description(&self) -> String;

    fn raw_type(&self) -> RawType;

    /// 停止通知；不会为已通知的条目补发 `remove`
    fn deactivate(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Add,
    Remove,
}

/// 单个监听
pub(crate) struct WatchedBeans<T: ?Sized, W, M> {
    id: WatchId,
    key: Key<T>,
    bindings: Arc<RankedBindings<T>>,
    mediator: M,
    watcher: W,
    announced: Mutex<Vec<BeanEntry<T>>>,
    pending: AtomicBool,
    active: AtomicBool,
}

impl<T, W, M> WatchedBeans<T, W, M>
where
    T: ?Sized + Send + Sync + 'static,
    W: Send + Sync + 'static,
    M: Mediator<T, W> + 'static,
{
    pub(crate) fn new(
        id: WatchId,
        key: Key<T>,
        bindings: Arc<RankedBindings<T>>,
        mediator: M,
        watcher: W,
    ) -> Self {
        Self {
            id,
            key,
            bindings,
            mediator,
            watcher,
            announced: Mutex::new(Vec::new()),
            pending: AtomicBool::new(false),
            active: AtomicBool::new(true),
        }
    }

    /// 同步并等待本轮完成，用于注册时的补发
    pub(crate) fn catch_up(&self) {
        self.pending.store(true, Ordering::SeqCst);
        let guard = self.announced.lock();
        self.drain(guard);
    }

    /// 登记变化；若其他调用正在同步，由其补做
    fn request_sync(&self) {
        self.pending.store(true, Ordering::SeqCst);
        if let Some(guard) = self.announced.try_lock() {
            self.drain(guard);
        }
    }

    fn drain<'a>(&'a self, mut guard: MutexGuard<'a, Vec<BeanEntry<T>>>) {
        loop {
            while self.pending.swap(false, Ordering::SeqCst) {
                self.reconcile(&mut guard);
            }
            drop(guard);

            if !self.pending.load(Ordering::SeqCst) {
                return;
            }
            match self.announced.try_lock() {
                Some(next) => guard = next,
                None => return,
            }
        }
    }

    fn reconcile(&self, announced: &mut Vec<BeanEntry<T>>) {
        if !self.active.load(Ordering::SeqCst) {
            announced.clear();
            return;
        }

        let current: Vec<BeanEntry<T>> =
            Beans::new(self.bindings.clone(), self.key.clone()).into_iter().collect();
        let current_ids: HashSet<BindingId> =
            current.iter().map(BeanEntry::binding_id).collect();

        let (kept, departed): (Vec<_>, Vec<_>) = announced
            .drain(..)
            .partition(|entry| current_ids.contains(&entry.binding_id()));
        *announced = kept;

        for entry in &departed {
            self.deliver(Event::Remove, entry);
        }

        let known: HashSet<BindingId> = announced.iter().map(BeanEntry::binding_id).collect();
        for entry in current {
            if known.contains(&entry.binding_id()) {
                continue;
            }
            self.deliver(Event::Add, &entry);
            announced.push(entry);
        }
    }

    fn deliver(&self, event: Event, entry: &BeanEntry<T>) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match event {
            Event::Add => self.mediator.add(entry, &self.watcher),
            Event::Remove => self.mediator.remove(entry, &self.watcher),
        }));

        match outcome {
            Ok(Ok(())) => {
                trace!(watch = %self.id, ?event, entry = %entry, "已通知监听");
            }
            Ok(Err(error)) => {
                warn!(
                    watch = %self.id,
                    ?event,
                    entry = %entry,
                    error = %error,
                    "中介者处理失败，已忽略"
                );
            }
            Err(payload) => {
                warn!(
                    watch = %self.id,
                    ?event,
                    entry = %entry,
                    panic = %panic_message(payload.as_ref()),
                    "中介者发生 panic，已忽略"
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic>".to_string()
    }
}

impl<T, W, M> BindingsListener for WatchedBeans<T, W, M>
where
    T: ?Sized + Send + Sync + 'static,
    W: Send + Sync + 'static,
    M: Mediator<T, W> + 'static,
{
    fn bindings_changed(&self) {
        if self.active.load(Ordering::SeqCst) {
            self.request_sync();
        }
    }
}

impl<T, W, M> WatchRegistration for WatchedBeans<T, W, M>
where
    T: ?Sized + Send + Sync + 'static,
    W: Send + Sync + 'static,
    M: Mediator<T, W> + 'static,
{
    fn id(&self) -> WatchId {
        self.id
    }

    fn key_description(&self) -> String {
        self.key.to_string()
    }

    fn raw_type(&self) -> RawType {
        self.key.raw_type()
    }

    fn deactivate(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            debug!(watch = %self.id, key = %self.key, "结束监听");
            self.request_sync();
        }
    }
}
