//! 绑定定义
//!
//! 绑定把契约类型与限定符关联到一个零参数的实例提供者。实例化策略（单例、瞬时）
//! 由提供者自身决定，定位器只负责排序与过滤。

use crate::qualifier::Qualifier;
use infrastructure_common::{ProvisionError, ProvisionResult, RawType};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 实例提供者
pub type ProviderFn<T> = dyn Fn() -> Result<Arc<T>, ProvisionError> + Send + Sync;

static NEXT_BINDING_ID: AtomicU64 = AtomicU64::new(1);

/// 绑定标识，进程内唯一；移除绑定按标识进行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl BindingId {
    fn next() -> Self {
        Self(NEXT_BINDING_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct BindingHeader {
    id: BindingId,
    raw_type: RawType,
    qualifier: Qualifier,
    source: Option<String>,
    description: Option<String>,
    implementation: Option<RawType>,
    priority: Option<i32>,
}

impl BindingHeader {
    fn new(raw_type: RawType) -> Self {
        Self {
            id: BindingId::next(),
            raw_type,
            qualifier: Qualifier::default_hint(),
            source: None,
            description: None,
            implementation: None,
            priority: None,
        }
    }
}

/// 类型化绑定
pub struct Binding<T: ?Sized> {
    header: Arc<BindingHeader>,
    provider: Arc<ProviderFn<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Binding<T> {
    /// 由提供者函数创建绑定
    pub fn provider<F>(provider: F) -> Self
    where
        F: Fn() -> Result<Arc<T>, ProvisionError> + Send + Sync + 'static,
    {
        Self {
            header: Arc::new(BindingHeader::new(RawType::of::<T>())),
            provider: Arc::new(provider),
        }
    }

    /// 由现成实例创建绑定，每次提供同一实例
    pub fn instance(instance: Arc<T>) -> Self {
        Self::provider(move || Ok(instance.clone()))
    }

    fn header_mut(&mut self) -> &mut BindingHeader {
        Arc::make_mut(&mut self.header)
    }

    /// 设置 hint
    pub fn named(self, hint: impl AsRef<str>) -> Self {
        self.qualified(Qualifier::named(hint))
    }

    /// 设置限定符
    pub fn qualified(mut self, qualifier: impl Into<Qualifier>) -> Self {
        self.header_mut().qualifier = qualifier.into();
        self
    }

    /// 设置来源描述
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.header_mut().source = Some(source.into());
        self
    }

    /// 设置描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.header_mut().description = Some(description.into());
        self
    }

    /// 记录静态已知的实现类型
    pub fn with_implementation<I: 'static>(mut self) -> Self {
        self.header_mut().implementation = Some(RawType::of::<I>());
        self
    }

    /// 显式优先级，覆盖发布者的等级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.header_mut().priority = Some(priority);
        self
    }

    /// 调用提供者创建实例
    pub fn get(&self) -> Result<Arc<T>, ProvisionError> {
        (self.provider)()
    }

    /// 擦除类型，用于在发布者与订阅者之间传递
    pub fn erase(&self) -> ErasedBinding {
        ErasedBinding {
            header: self.header.clone(),
            provider: Arc::new(self.provider.clone()),
        }
    }
}

impl<T: ?Sized> Binding<T> {
    /// 绑定标识
    pub fn id(&self) -> BindingId {
        self.header.id
    }

    /// 契约类型
    pub fn raw_type(&self) -> RawType {
        self.header.raw_type
    }

    /// 限定符
    pub fn qualifier(&self) -> &Qualifier {
        &self.header.qualifier
    }

    /// 来源描述
    pub fn source(&self) -> &str {
        self.header.source.as_deref().unwrap_or("<unknown>")
    }

    /// 是否已设置来源描述
    pub fn has_source(&self) -> bool {
        self.header.source.is_some()
    }

    /// 描述
    pub fn description(&self) -> Option<&str> {
        self.header.description.as_deref()
    }

    /// 实现类型
    pub fn implementation(&self) -> Option<RawType> {
        self.header.implementation
    }

    /// 显式优先级
    pub fn priority(&self) -> Option<i32> {
        self.header.priority
    }
}

impl<T: ?Sized> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            header: self.header.clone(),
            provider: self.provider.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.header.id)
            .field("raw_type", &self.header.raw_type.name())
            .field("qualifier", &self.header.qualifier)
            .field("source", &self.header.source)
            .field("priority", &self.header.priority)
            .field("provider", &"<function>")
            .finish()
    }
}

/// 类型擦除的绑定
///
/// 发布者以擦除形式持有不同契约类型的绑定，订阅者再按自身类型还原。
#[derive(Clone)]
pub struct ErasedBinding {
    header: Arc<BindingHeader>,
    provider: Arc<dyn Any + Send + Sync>,
}

impl ErasedBinding {
    /// 还原为类型化绑定；类型不符时返回 [`ProvisionError::TypeMismatch`]
    pub fn try_downcast<T: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> ProvisionResult<Binding<T>> {
        self.provider
            .downcast_ref::<Arc<ProviderFn<T>>>()
            .map(|provider| Binding {
                header: self.header.clone(),
                provider: provider.clone(),
            })
            .ok_or_else(|| ProvisionError::TypeMismatch {
                expected: RawType::of::<T>().name().to_string(),
                actual: self.header.raw_type.name().to_string(),
            })
    }

    /// 还原为类型化绑定；类型不符时返回 `None`
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Binding<T>> {
        self.try_downcast().ok()
    }

    /// 绑定标识
    pub fn id(&self) -> BindingId {
        self.header.id
    }

    /// 契约类型
    pub fn raw_type(&self) -> RawType {
        self.header.raw_type
    }

    /// 限定符
    pub fn qualifier(&self) -> &Qualifier {
        &self.header.qualifier
    }

    /// 来源描述
    pub fn source(&self) -> &str {
        self.header.source.as_deref().unwrap_or("<unknown>")
    }

    /// 显式优先级
    pub fn priority(&self) -> Option<i32> {
        self.header.priority
    }
}

impl fmt::Debug for ErasedBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedBinding")
            .field("id", &self.header.id)
            .field("raw_type", &self.header.raw_type.name())
            .field("qualifier", &self.header.qualifier)
            .finish()
    }
}
