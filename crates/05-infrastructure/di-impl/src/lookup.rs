//! 按 role/hint 查找的便利函数
//!
//! role 即契约类型，hint 即命名限定符。`locate` 对“未找到”返回空序列，
//! 这里的函数在需要强制语义时把它转换为 [`ProvisionError::NoBinding`]。

use di_abstractions::{normalize_hint, BeanEntry, BeanLocator, Key};
use infrastructure_common::{ProvisionError, ProvisionResult, RawType};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 查找 hint 对应的、等级最高的实例
pub fn lookup<T, L>(locator: &L, hint: &str) -> ProvisionResult<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
    L: BeanLocator + ?Sized,
{
    locator
        .locate(Key::<T>::named(hint))
        .into_iter()
        .next()
        .ok_or_else(|| {
            ProvisionError::no_binding(RawType::of::<T>().short_name(), normalize_hint(hint))
        })?
        .value()
}

/// 所有命名绑定，按 hint 分组；同一 hint 只保留等级最高的条目
pub fn lookup_all<T, L>(locator: &L) -> BTreeMap<String, BeanEntry<T>>
where
    T: ?Sized + Send + Sync + 'static,
    L: BeanLocator + ?Sized,
{
    let mut entries = BTreeMap::new();
    for entry in locator.locate(Key::<T>::unrestricted()) {
        if let Some(hint) = entry.hint() {
            entries.entry(hint.to_string()).or_insert_with(|| entry.clone());
        }
    }
    entries
}

/// 是否存在 hint 对应的绑定
pub fn has_component<T, L>(locator: &L, hint: &str) -> bool
where
    T: ?Sized + Send + Sync + 'static,
    L: BeanLocator + ?Sized,
{
    locator
        .locate(Key::<T>::named(hint))
        .into_iter()
        .next()
        .is_some()
}
