//! 按契约类型聚合的有序绑定
//!
//! 每个契约类型至多一个 [`RankedBindings`]，由所有 `locate`/`watch` 调用共享。
//! 它为每个已注册发布者保留一个订阅门面，门面按发布者的等级给绑定排序。

use crate::ranked_sequence::{Ranked, RankedSequence, SortKey, Tier};
use crate::ranking::{DefaultRankingFunction, RankingFunction};
use dashmap::DashMap;
use di_abstractions::{
    BeanEntry, Binding, BindingId, BindingPublisher, BindingSubscriber, ErasedBinding, PublisherId,
};
use infrastructure_common::RawType;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

/// 绑定变化监听器
pub(crate) trait BindingsListener: Send + Sync {
    /// 绑定集合发生了结构变化
    fn bindings_changed(&self);
}

/// 类型擦除的绑定缓存，供定位器统一管理不同契约类型
pub(crate) trait BindingCache: Send + Sync {
    fn raw_type(&self) -> RawType;

    fn attach(&self, publisher: &Arc<dyn BindingPublisher>, rank: i32);

    fn detach(&self, publisher: PublisherId);

    fn len(&self) -> usize;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

struct Subscription {
    publisher: Arc<dyn BindingPublisher>,
    subscriber: Arc<dyn BindingSubscriber>,
    rank: i32,
}

/// 订阅与绑定来源，二者在同一把锁内维护
#[derive(Default)]
struct Contributions {
    subscriptions: HashMap<PublisherId, Subscription>,
    /// 每个绑定的提供者，按提供先后排列；首位决定绑定的等级
    contributors: HashMap<BindingId, Vec<PublisherId>>,
}

/// 某契约类型的有序绑定集合
///
/// 同一绑定可以由多个发布者提供，序列中只出现一次；只有最后一个提供者退出时绑定才会消失。
pub struct RankedBindings<T: ?Sized> {
    raw_type: RawType,
    bindings: RankedSequence<Binding<T>>,
    state: Mutex<Contributions>,
    beans: DashMap<BindingId, BeanEntry<T>>,
    listeners: Mutex<Vec<Weak<dyn BindingsListener>>>,
    this: Weak<Self>,
}

impl<T: ?Sized + Send + Sync + 'static> RankedBindings<T> {
    /// 创建空集合
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            raw_type: RawType::of::<T>(),
            bindings: RankedSequence::new(),
            state: Mutex::new(Contributions::default()),
            beans: DashMap::new(),
            listeners: Mutex::new(Vec::new()),
            this: this.clone(),
        })
    }

    /// 契约类型
    pub fn raw_type(&self) -> RawType {
        self.raw_type
    }

    /// 绑定数量
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 已订阅的发布者数量
    pub fn publisher_count(&self) -> usize {
        self.state.lock().subscriptions.len()
    }

    /// 已缓存的 Bean 条目数量
    pub fn cached_entries(&self) -> usize {
        self.beans.len()
    }

    /// 订阅发布者；重复订阅同一发布者是无操作
    pub(crate) fn subscribe_publisher(&self, publisher: &Arc<dyn BindingPublisher>, rank: i32) {
        let id = publisher.id();
        let subscriber: Arc<dyn BindingSubscriber> = {
            let mut state = self.state.lock();
            if state.subscriptions.contains_key(&id) {
                trace!(raw_type = %self.raw_type, publisher = %id, "发布者已订阅，忽略");
                return;
            }
            let subscriber: Arc<dyn BindingSubscriber> = Arc::new(PublisherSubscriber {
                target: self.this.clone(),
                publisher: id,
                ranking: DefaultRankingFunction::new(rank),
            });
            state.subscriptions.insert(
                id,
                Subscription {
                    publisher: publisher.clone(),
                    subscriber: subscriber.clone(),
                    rank,
                },
            );
            subscriber
        };

        debug!(raw_type = %self.raw_type, publisher = %id, rank, "订阅发布者");
        publisher.subscribe(subscriber);
    }

    /// 退订发布者并收回其残留的提供关系；未订阅时是无操作
    pub(crate) fn unsubscribe_publisher(&self, publisher: PublisherId) {
        let Some(subscription) = self.state.lock().subscriptions.remove(&publisher) else {
            return;
        };

        debug!(raw_type = %self.raw_type, publisher = %publisher, "退订发布者");
        subscription
            .publisher
            .unsubscribe(&subscription.subscriber);

        let leftovers = self.withdraw_all(publisher);
        if leftovers > 0 {
            warn!(
                raw_type = %self.raw_type,
                publisher = %publisher,
                count = leftovers,
                "发布者退订后仍有残留绑定，已清除"
            );
        }
    }

    /// 收回发布者的全部提供关系，返回被收回的数量
    fn withdraw_all(&self, publisher: PublisherId) -> usize {
        let mut withdrawn = Vec::new();
        let mut departed = Vec::new();
        {
            let mut state = self.state.lock();
            state.contributors.retain(|id, contributors| {
                let Some(position) = contributors.iter().position(|c| *c == publisher) else {
                    return true;
                };
                contributors.remove(position);
                if contributors.is_empty() {
                    departed.push(*id);
                    false
                } else {
                    withdrawn.push((*id, position == 0));
                    true
                }
            });

            for (id, was_head) in &withdrawn {
                if *was_head {
                    self.rerank(&state, *id);
                }
            }
            if !departed.is_empty() {
                self.bindings.remove_where(|binding| departed.contains(&binding.id()));
            }
        }

        for id in &departed {
            self.beans.remove(id);
        }
        if !departed.is_empty() {
            self.notify();
        }
        withdrawn.len() + departed.len()
    }

    /// 按新的首位提供者重新计算绑定等级
    fn rerank(&self, state: &Contributions, id: BindingId) {
        let Some(subscription) = state
            .contributors
            .get(&id)
            .and_then(|contributors| contributors.first())
            .and_then(|head| state.subscriptions.get(head))
        else {
            return;
        };

        let ranking = DefaultRankingFunction::new(subscription.rank);
        for binding in self.bindings.remove_where(|binding| binding.id() == id) {
            let erased = binding.erase();
            let rank = ranking.rank(&erased);
            trace!(raw_type = %self.raw_type, binding = %id, rank, "提供者变化，重新排序");
            self.bindings.insert(binding, rank, ranking.tier(&erased));
        }
        self.beans.remove(&id);
    }

    fn insert(&self, binding: Binding<T>, rank: i32, tier: Tier, publisher: PublisherId) {
        let id = binding.id();
        {
            let mut state = self.state.lock();
            if !state.subscriptions.contains_key(&publisher) {
                debug!(
                    raw_type = %self.raw_type,
                    publisher = %publisher,
                    "忽略来自未订阅发布者的绑定"
                );
                return;
            }

            let contributors = state.contributors.entry(id).or_default();
            if contributors.contains(&publisher) {
                return;
            }
            contributors.push(publisher);
            if contributors.len() > 1 {
                trace!(
                    raw_type = %self.raw_type,
                    binding = %id,
                    publisher = %publisher,
                    "绑定已由其他发布者提供"
                );
                return;
            }
            self.bindings.insert(binding, rank, tier);
        }

        debug!(raw_type = %self.raw_type, binding = %id, rank, "添加绑定");
        self.notify();
    }

    fn remove_binding(&self, id: BindingId, publisher: PublisherId) {
        {
            let mut state = self.state.lock();
            let Some(contributors) = state.contributors.get_mut(&id) else {
                trace!(raw_type = %self.raw_type, binding = %id, "绑定不存在，忽略移除");
                return;
            };
            let Some(position) = contributors.iter().position(|c| *c == publisher) else {
                trace!(
                    raw_type = %self.raw_type,
                    binding = %id,
                    publisher = %publisher,
                    "发布者未提供该绑定，忽略移除"
                );
                return;
            };
            contributors.remove(position);

            if !contributors.is_empty() {
                debug!(
                    raw_type = %self.raw_type,
                    binding = %id,
                    publisher = %publisher,
                    "绑定仍由其他发布者提供"
                );
                if position == 0 {
                    self.rerank(&state, id);
                }
                return;
            }
            state.contributors.remove(&id);
            self.bindings.remove_where(|binding| binding.id() == id);
        }

        self.beans.remove(&id);
        debug!(raw_type = %self.raw_type, binding = %id, "移除绑定");
        self.notify();
    }

    fn bindings_from(&self, publisher: PublisherId) -> Vec<ErasedBinding> {
        let owned: HashSet<BindingId> = self
            .state
            .lock()
            .contributors
            .iter()
            .filter(|(_, contributors)| contributors.contains(&publisher))
            .map(|(id, _)| *id)
            .collect();

        self.bindings
            .snapshot()
            .iter()
            .filter(|ranked| owned.contains(&ranked.item().id()))
            .map(|ranked| ranked.item().erase())
            .collect()
    }

    fn contains(&self, id: BindingId) -> bool {
        self.bindings.contains(|binding| binding.id() == id)
    }

    /// 注册监听器；监听器被释放后自动移除
    pub(crate) fn add_listener(&self, listener: Weak<dyn BindingsListener>) {
        self.listeners.lock().push(listener);
    }

    fn notify(&self) {
        let live: Vec<Arc<dyn BindingsListener>> = {
            let mut listeners = self.listeners.lock();
            listeners.retain(|listener| listener.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };

        for listener in live {
            listener.bindings_changed();
        }
    }

    /// 排序键严格大于 `after` 的下一个绑定
    pub(crate) fn next_after(&self, after: Option<&SortKey>) -> Option<Ranked<Binding<T>>> {
        self.bindings.next_after(after)
    }

    /// 获取（或创建并缓存）绑定对应的 Bean 条目
    pub(crate) fn entry(&self, ranked: &Ranked<Binding<T>>) -> BeanEntry<T> {
        let binding = ranked.item();
        let id = binding.id();
        let entry = self
            .beans
            .entry(id)
            .or_insert_with(|| BeanEntry::new(binding.clone(), ranked.rank()))
            .clone();

        // 绑定在创建条目期间被移除时不保留缓存
        if !self.contains(id) {
            self.beans.remove(&id);
        }
        entry
    }
}

impl<T: ?Sized + Send + Sync + 'static> BindingCache for RankedBindings<T> {
    fn raw_type(&self) -> RawType {
        self.raw_type
    }

    fn attach(&self, publisher: &Arc<dyn BindingPublisher>, rank: i32) {
        self.subscribe_publisher(publisher, rank);
    }

    fn detach(&self, publisher: PublisherId) {
        self.unsubscribe_publisher(publisher);
    }

    fn len(&self) -> usize {
        self.bindings.len()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// 每个发布者一个的订阅门面
struct PublisherSubscriber<T: ?Sized> {
    target: Weak<RankedBindings<T>>,
    publisher: PublisherId,
    ranking: DefaultRankingFunction,
}

impl<T: ?Sized + Send + Sync + 'static> BindingSubscriber for PublisherSubscriber<T> {
    fn raw_type(&self) -> RawType {
        RawType::of::<T>()
    }

    fn add(&self, binding: ErasedBinding) {
        let Some(target) = self.target.upgrade() else {
            return;
        };
        let typed = match binding.try_downcast::<T>() {
            Ok(typed) => typed,
            Err(error) => {
                warn!(error = %error, publisher = %self.publisher, "忽略类型不匹配的绑定");
                return;
            }
        };
        target.insert(
            typed,
            self.ranking.rank(&binding),
            self.ranking.tier(&binding),
            self.publisher,
        );
    }

    fn remove(&self, binding: &ErasedBinding) {
        if let Some(target) = self.target.upgrade() {
            target.remove_binding(binding.id(), self.publisher);
        }
    }

    fn bindings(&self) -> Vec<ErasedBinding> {
        self.target
            .upgrade()
            .map(|target| target.bindings_from(self.publisher))
            .unwrap_or_default()
    }
}
