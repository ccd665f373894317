//! Bean 条目
//!
//! 绑定对外可见的形式。实例在首次调用 [`BeanEntry::value`] 时创建并缓存；
//! 提供者失败不会被缓存，下一次调用会重试。

use crate::binding::{Binding, BindingId};
use crate::qualifier::Qualifier;
use infrastructure_common::{ProvisionError, RawType};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

struct EntryInner<T: ?Sized> {
    binding: Binding<T>,
    rank: i32,
    value: OnceCell<Arc<T>>,
}

/// Bean 条目
pub struct BeanEntry<T: ?Sized> {
    inner: Arc<EntryInner<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> BeanEntry<T> {
    /// 创建条目
    pub fn new(binding: Binding<T>, rank: i32) -> Self {
        Self {
            inner: Arc::new(EntryInner {
                binding,
                rank,
                value: OnceCell::new(),
            }),
        }
    }

    /// 获取实例，首次调用时创建
    pub fn value(&self) -> Result<Arc<T>, ProvisionError> {
        self.inner
            .value
            .get_or_try_init(|| self.inner.binding.get())
            .map(Arc::clone)
    }
}

impl<T: ?Sized> BeanEntry<T> {
    /// 限定符
    pub fn qualifier(&self) -> &Qualifier {
        self.inner.binding.qualifier()
    }

    /// hint；非命名限定符返回 `None`
    pub fn hint(&self) -> Option<&str> {
        self.qualifier().hint()
    }

    /// 是否已创建实例
    pub fn is_realized(&self) -> bool {
        self.inner.value.get().is_some()
    }

    /// 描述
    pub fn description(&self) -> String {
        match self.inner.binding.description() {
            Some(description) => description.to_string(),
            None => {
                let name = self
                    .implementation()
                    .unwrap_or_else(|| self.inner.binding.raw_type())
                    .short_name();
                format!("{} from {}", name, self.source())
            }
        }
    }

    /// 静态已知的实现类型
    pub fn implementation(&self) -> Option<RawType> {
        self.inner.binding.implementation()
    }

    /// 等级
    pub fn rank(&self) -> i32 {
        self.inner.rank
    }

    /// 来源描述
    pub fn source(&self) -> &str {
        self.inner.binding.source()
    }

    /// 绑定标识
    pub fn binding_id(&self) -> BindingId {
        self.inner.binding.id()
    }

    /// 底层绑定
    pub fn binding(&self) -> &Binding<T> {
        &self.inner.binding
    }

    /// 是否为同一个缓存条目
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: ?Sized> Clone for BeanEntry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for BeanEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanEntry")
            .field("binding", &self.binding_id())
            .field("qualifier", self.qualifier())
            .field("rank", &self.rank())
            .field("source", &self.source())
            .finish()
    }
}

impl<T: ?Sized> fmt::Display for BeanEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.qualifier(), self.description())
    }
}
