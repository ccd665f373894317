//! 绑定发布者实现
//!
//! - [`StaticBindingPublisher`]：固定绑定集合，类似静态模块
//! - [`DynamicBindingPublisher`]：运行期可发布、收回绑定，类似扩展注册表

use di_abstractions::{
    Binding, BindingId, BindingPublisher, BindingSubscriber, ErasedBinding, PublisherId,
};
use infrastructure_common::RawType;
use parking_lot::{ReentrantMutex, RwLock};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// 静态绑定发布者
#[derive(Debug)]
pub struct StaticBindingPublisher {
    id: PublisherId,
    name: String,
    bindings: HashMap<TypeId, Vec<ErasedBinding>>,
}

/// 静态发布者构建器
#[derive(Debug)]
pub struct StaticPublisherBuilder {
    name: String,
    bindings: Vec<ErasedBinding>,
}

impl StaticPublisherBuilder {
    /// 添加绑定；未设置来源的绑定以发布者名称作为来源
    pub fn bind<T>(mut self, binding: Binding<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let binding = if binding.has_source() {
            binding
        } else {
            binding.with_source(self.name.clone())
        };
        self.bindings.push(binding.erase());
        self
    }

    /// 构建发布者
    pub fn build(self) -> StaticBindingPublisher {
        let mut bindings: HashMap<TypeId, Vec<ErasedBinding>> = HashMap::new();
        for binding in self.bindings {
            bindings
                .entry(binding.raw_type().id())
                .or_default()
                .push(binding);
        }

        StaticBindingPublisher {
            id: PublisherId::new(),
            name: self.name,
            bindings,
        }
    }
}

impl StaticBindingPublisher {
    /// 创建构建器
    pub fn builder(name: impl Into<String>) -> StaticPublisherBuilder {
        StaticPublisherBuilder {
            name: name.into(),
            bindings: Vec::new(),
        }
    }

    /// 绑定总数
    pub fn binding_count(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }
}

impl BindingPublisher for StaticBindingPublisher {
    fn id(&self) -> PublisherId {
        self.id
    }

    fn description(&self) -> String {
        format!("static:{}", self.name)
    }

    fn supplies(&self, raw_type: RawType) -> bool {
        self.bindings.contains_key(&raw_type.id())
    }

    fn subscribe(&self, subscriber: Arc<dyn BindingSubscriber>) {
        let raw_type = subscriber.raw_type();
        let Some(bindings) = self.bindings.get(&raw_type.id()) else {
            return;
        };
        trace!(
            publisher = %self.name,
            raw_type = %raw_type,
            count = bindings.len(),
            "推送静态绑定"
        );
        for binding in bindings {
            subscriber.add(binding.clone());
        }
    }

    fn unsubscribe(&self, subscriber: &Arc<dyn BindingSubscriber>) {
        let Some(bindings) = self.bindings.get(&subscriber.raw_type().id()) else {
            return;
        };
        let owned: HashSet<BindingId> = bindings.iter().map(ErasedBinding::id).collect();
        for binding in subscriber.bindings() {
            if owned.contains(&binding.id()) {
                subscriber.remove(&binding);
            }
        }
    }
}

#[derive(Default)]
struct DynamicState {
    bindings: Vec<ErasedBinding>,
    subscribers: Vec<Arc<dyn BindingSubscriber>>,
}

impl DynamicState {
    fn subscribers_of(&self, raw_type: RawType) -> Vec<Arc<dyn BindingSubscriber>> {
        self.subscribers
            .iter()
            .filter(|subscriber| subscriber.raw_type() == raw_type)
            .cloned()
            .collect()
    }
}

fn same_subscriber(a: &Arc<dyn BindingSubscriber>, b: &Arc<dyn BindingSubscriber>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

/// 动态绑定发布者
///
/// 发布与收回会立即推送给所有已订阅的同类型订阅者。推送在状态锁之外进行，
/// 订阅者回调中再次调用本发布者是安全的。
pub struct DynamicBindingPublisher {
    id: PublisherId,
    name: String,
    state: RwLock<DynamicState>,
    delivery: ReentrantMutex<()>,
}

impl DynamicBindingPublisher {
    /// 创建发布者
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PublisherId::new(),
            name: name.into(),
            state: RwLock::new(DynamicState::default()),
            delivery: ReentrantMutex::new(()),
        }
    }

    /// 发布绑定，返回其标识
    pub fn publish<T>(&self, binding: Binding<T>) -> BindingId
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let binding = if binding.has_source() {
            binding
        } else {
            binding.with_source(self.name.clone())
        };
        let id = binding.id();
        let erased = binding.erase();

        let _delivery = self.delivery.lock();
        let subscribers = {
            let mut state = self.state.write();
            if state.bindings.iter().any(|existing| existing.id() == id) {
                return id;
            }
            state.bindings.push(erased.clone());
            state.subscribers_of(erased.raw_type())
        };

        debug!(publisher = %self.name, binding = %id, raw_type = %erased.raw_type(), "发布绑定");
        for subscriber in subscribers {
            subscriber.add(erased.clone());
        }
        id
    }

    /// 收回绑定；不存在时返回 `false`
    pub fn retract(&self, id: BindingId) -> bool {
        let _delivery = self.delivery.lock();
        let (binding, subscribers) = {
            let mut state = self.state.write();
            let Some(position) = state.bindings.iter().position(|binding| binding.id() == id)
            else {
                return false;
            };
            let binding = state.bindings.remove(position);
            let subscribers = state.subscribers_of(binding.raw_type());
            (binding, subscribers)
        };

        debug!(publisher = %self.name, binding = %id, "收回绑定");
        for subscriber in subscribers {
            subscriber.remove(&binding);
        }
        true
    }

    /// 当前绑定数量
    pub fn binding_count(&self) -> usize {
        self.state.read().bindings.len()
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.state.read().subscribers.len()
    }
}

impl BindingPublisher for DynamicBindingPublisher {
    fn id(&self) -> PublisherId {
        self.id
    }

    fn description(&self) -> String {
        format!("dynamic:{}", self.name)
    }

    fn subscribe(&self, subscriber: Arc<dyn BindingSubscriber>) {
        let _delivery = self.delivery.lock();
        let raw_type = subscriber.raw_type();
        let bindings: Vec<ErasedBinding> = {
            let mut state = self.state.write();
            if !state
                .subscribers
                .iter()
                .any(|existing| same_subscriber(existing, &subscriber))
            {
                state.subscribers.push(subscriber.clone());
            }
            state
                .bindings
                .iter()
                .filter(|binding| binding.raw_type() == raw_type)
                .cloned()
                .collect()
        };

        for binding in bindings {
            subscriber.add(binding);
        }
    }

    fn unsubscribe(&self, subscriber: &Arc<dyn BindingSubscriber>) {
        let _delivery = self.delivery.lock();
        self.state
            .write()
            .subscribers
            .retain(|existing| !same_subscriber(existing, subscriber));

        let owned: HashSet<BindingId> = self
            .state
            .read()
            .bindings
            .iter()
            .map(ErasedBinding::id)
            .collect();
        for binding in subscriber.bindings() {
            if owned.contains(&binding.id()) {
                subscriber.remove(&binding);
            }
        }
    }
}

impl std::fmt::Debug for DynamicBindingPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicBindingPublisher")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("bindings", &self.binding_count())
            .finish()
    }
}
