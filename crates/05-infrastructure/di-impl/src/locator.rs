//! 默认 Bean 定位器
//!
//! 定位器持有按等级排序的发布者列表，并为每个被查找或监听过的契约类型缓存一个
//! [`RankedBindings`]。缓存在首次访问时创建，此后随发布者的增删保持同步，由所有调用方共享。
//!
//! 结构性操作（增删发布者、创建缓存、注册监听）由一把可重入锁串行化，因此中介者在
//! 收到通知时可以安全地回调定位器。

use crate::beans::Beans;
use crate::channel::{BeanEvent, ChannelMediator};
use crate::ranked_bindings::{BindingCache, BindingsListener, RankedBindings};
use crate::ranked_sequence::{RankedSequence, Tier};
use crate::watched::{WatchRegistration, WatchedBeans};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use di_abstractions::{
    BeanLocator, BindingPublisher, Key, Mediator, MutableBeanLocator, PublisherId, WatchHandle,
    WatchId,
};
use infrastructure_common::RawType;
use parking_lot::ReentrantMutex;
use serde::Serialize;
use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Clone)]
struct PublisherRecord {
    publisher: Arc<dyn BindingPublisher>,
    rank: i32,
    registered_at: DateTime<Utc>,
}

/// 已注册发布者的诊断信息
#[derive(Debug, Clone, Serialize)]
pub struct PublisherInfo {
    /// 发布者标识
    pub id: PublisherId,
    /// 描述
    pub description: String,
    /// 注册等级
    pub rank: i32,
    /// 注册时间
    pub registered_at: DateTime<Utc>,
}

/// 已缓存契约类型的诊断信息
#[derive(Debug, Clone, Serialize)]
pub struct CachedTypeInfo {
    /// 契约类型名
    pub raw_type: String,
    /// 当前绑定数量
    pub bindings: usize,
}

/// 活动监听的诊断信息
#[derive(Debug, Clone, Serialize)]
pub struct WatchInfo {
    /// 监听标识
    pub id: WatchId,
    /// 契约类型名
    pub raw_type: String,
    /// 查找键
    pub key: String,
}

/// 定位器状态快照
#[derive(Debug, Clone, Serialize)]
pub struct LocatorSnapshot {
    /// 发布者，按等级降序
    pub publishers: Vec<PublisherInfo>,
    /// 已缓存的契约类型
    pub cached_types: Vec<CachedTypeInfo>,
    /// 活动监听
    pub watches: Vec<WatchInfo>,
}

struct LocatorInner {
    publishers: RankedSequence<PublisherRecord>,
    cached: DashMap<TypeId, Arc<dyn BindingCache>>,
    watchers: DashMap<WatchId, Arc<dyn WatchRegistration>>,
    structure: ReentrantMutex<()>,
}

impl LocatorInner {
    fn caches(&self) -> Vec<Arc<dyn BindingCache>> {
        self.cached.iter().map(|cache| cache.value().clone()).collect()
    }

    fn unwatch(&self, id: WatchId) {
        let _structure = self.structure.lock();
        if let Some((_, registration)) = self.watchers.remove(&id) {
            registration.deactivate();
        }
    }
}

/// 默认 Bean 定位器
///
/// 克隆得到的是同一个定位器的另一个句柄。
#[derive(Clone)]
pub struct DefaultBeanLocator {
    inner: Arc<LocatorInner>,
}

impl DefaultBeanLocator {
    /// 创建空定位器
    pub fn new() -> Self {
        Self {
            inner: Arc::new(LocatorInner {
                publishers: RankedSequence::new(),
                cached: DashMap::new(),
                watchers: DashMap::new(),
                structure: ReentrantMutex::new(()),
            }),
        }
    }

    /// 获取（必要时创建）契约类型对应的有序绑定
    fn bindings_for<T>(&self) -> Arc<RankedBindings<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<T>();
        if let Some(cache) = self.inner.cached.get(&type_id) {
            return downcast_cache(cache.value().clone());
        }

        let _structure = self.inner.structure.lock();
        if let Some(cache) = self.inner.cached.get(&type_id) {
            return downcast_cache(cache.value().clone());
        }

        let bindings = RankedBindings::<T>::new();
        let raw_type = RawType::of::<T>();
        for record in self.inner.publishers.iter() {
            let record = record.item();
            if record.publisher.supplies(raw_type) {
                bindings.subscribe_publisher(&record.publisher, record.rank);
            }
        }
        debug!(raw_type = %raw_type, bindings = bindings.len(), "创建有序绑定缓存");

        self.inner.cached.insert(type_id, bindings.clone());
        bindings
    }

    /// 是否已注册该发布者
    pub fn contains(&self, publisher: PublisherId) -> bool {
        self.inner
            .publishers
            .contains(|record| record.publisher.id() == publisher)
    }

    /// 已注册的发布者，按等级降序
    pub fn publishers(&self) -> Vec<PublisherInfo> {
        self.inner
            .publishers
            .iter()
            .map(|ranked| {
                let record = ranked.item();
                PublisherInfo {
                    id: record.publisher.id(),
                    description: record.publisher.description(),
                    rank: record.rank,
                    registered_at: record.registered_at,
                }
            })
            .collect()
    }

    /// 活动监听数量
    pub fn watch_count(&self) -> usize {
        self.inner.watchers.len()
    }

    /// 诊断快照
    pub fn snapshot(&self) -> LocatorSnapshot {
        let mut cached_types: Vec<CachedTypeInfo> = self
            .inner
            .caches()
            .iter()
            .map(|cache| CachedTypeInfo {
                raw_type: cache.raw_type().name().to_string(),
                bindings: cache.len(),
            })
            .collect();
        cached_types.sort_by(|a, b| a.raw_type.cmp(&b.raw_type));

        let watches = self
            .inner
            .watchers
            .iter()
            .map(|registration| WatchInfo {
                id: registration.id(),
                raw_type: registration.raw_type().name().to_string(),
                key: registration.key_description(),
            })
            .collect();

        LocatorSnapshot {
            publishers: self.publishers(),
            cached_types,
            watches,
        }
    }

    /// 以通道形式监听：每次出现或消失都会发送一个 [`BeanEvent`]
    ///
    /// 丢弃接收端不会结束监视；不再需要事件时对返回的句柄调用 `cancel()`。
    pub fn watch_events<T>(
        &self,
        key: Key<T>,
    ) -> (WatchHandle, mpsc::UnboundedReceiver<BeanEvent<T>>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = self.watch(key, ChannelMediator::new(), sender);
        (handle, receiver)
    }
}

fn downcast_cache<T>(cache: Arc<dyn BindingCache>) -> Arc<RankedBindings<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    match cache.into_any().downcast::<RankedBindings<T>>() {
        Ok(bindings) => bindings,
        Err(_) => unreachable!("缓存按 TypeId 索引，类型必然一致"),
    }
}

impl Default for DefaultBeanLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DefaultBeanLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultBeanLocator")
            .field("publishers", &self.inner.publishers.len())
            .field("cached_types", &self.inner.cached.len())
            .field("watches", &self.inner.watchers.len())
            .finish()
    }
}

impl BeanLocator for DefaultBeanLocator {
    type Beans<T: ?Sized + Send + Sync + 'static> = Beans<T>;

    fn locate<T>(&self, key: Key<T>) -> Beans<T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Beans::new(self.bindings_for::<T>(), key)
    }

    fn watch<T, W, M>(&self, key: Key<T>, mediator: M, watcher: W) -> WatchHandle
    where
        T: ?Sized + Send + Sync + 'static,
        W: Send + Sync + 'static,
        M: Mediator<T, W> + 'static,
    {
        let bindings = self.bindings_for::<T>();
        let id = WatchId::new();
        let watched = Arc::new(WatchedBeans::new(
            id,
            key.clone(),
            bindings.clone(),
            mediator,
            watcher,
        ));

        {
            let _structure = self.inner.structure.lock();
            let listener: Weak<dyn BindingsListener> = Arc::downgrade(&watched) as Weak<_>;
            bindings.add_listener(listener);
            self.inner.watchers.insert(id, watched.clone());
        }
        debug!(watch = %id, key = %key, "注册监听");

        watched.catch_up();

        let inner = Arc::downgrade(&self.inner);
        let registration: Weak<dyn WatchRegistration> = Arc::downgrade(&watched) as Weak<_>;
        WatchHandle::new(id, move || {
            if let Some(inner) = inner.upgrade() {
                inner.unwatch(id);
            } else if let Some(registration) = registration.upgrade() {
                registration.deactivate();
            }
        })
    }
}

impl MutableBeanLocator for DefaultBeanLocator {
    fn add(&self, publisher: Arc<dyn BindingPublisher>, rank: i32) -> bool {
        let _structure = self.inner.structure.lock();
        let id = publisher.id();
        if self.contains(id) {
            debug!(publisher = %id, "发布者已注册，忽略");
            return false;
        }

        self.inner.publishers.insert(
            PublisherRecord {
                publisher: publisher.clone(),
                rank,
                registered_at: Utc::now(),
            },
            rank,
            Tier::Default,
        );
        info!(publisher = %id, description = %publisher.description(), rank, "注册发布者");

        for cache in self.inner.caches() {
            if publisher.supplies(cache.raw_type()) {
                cache.attach(&publisher, rank);
            }
        }
        true
    }

    fn remove(&self, publisher: PublisherId) -> bool {
        let _structure = self.inner.structure.lock();
        let removed = self
            .inner
            .publishers
            .remove_where(|record| record.publisher.id() == publisher);
        if removed.is_empty() {
            debug!(publisher = %publisher, "发布者未注册，忽略移除");
            return false;
        }

        for cache in self.inner.caches() {
            cache.detach(publisher);
        }
        info!(publisher = %publisher, "移除发布者");
        true
    }

    fn clear(&self) {
        let _structure = self.inner.structure.lock();
        let records = self.inner.publishers.clear();
        let caches = self.inner.caches();
        for record in &records {
            let id = record.publisher.id();
            for cache in &caches {
                cache.detach(id);
            }
        }

        let watches: Vec<WatchId> = self.inner.watchers.iter().map(|entry| *entry.key()).collect();
        for id in &watches {
            if let Some((_, registration)) = self.inner.watchers.remove(id) {
                registration.deactivate();
            }
        }
        info!(publishers = records.len(), watches = watches.len(), "已清空定位器");
    }
}
