//! `locate` 返回的活动序列

use crate::ranked_bindings::RankedBindings;
use crate::ranked_sequence::SortKey;
use di_abstractions::{BeanEntry, Key};
use std::fmt;
use std::sync::Arc;

/// 匹配某个键的 Bean 序列
///
/// 序列由共享的 [`RankedBindings`] 支撑，可以多次迭代；每次迭代都反映迭代期间的
/// 添加与移除，已被移除的绑定会被跳过。
pub struct Beans<T: ?Sized> {
    bindings: Arc<RankedBindings<T>>,
    key: Key<T>,
}

impl<T: ?Sized + Send + Sync + 'static> Beans<T> {
    pub(crate) fn new(bindings: Arc<RankedBindings<T>>, key: Key<T>) -> Self {
        Self { bindings, key }
    }

    /// 查找键
    pub fn key(&self) -> &Key<T> {
        &self.key
    }

    /// 新的活动迭代器
    pub fn iter(&self) -> BeanIter<T> {
        BeanIter {
            bindings: self.bindings.clone(),
            key: self.key.clone(),
            last: None,
        }
    }

    /// 第一个（等级最高的）匹配条目
    pub fn first(&self) -> Option<BeanEntry<T>> {
        self.iter().next()
    }

    /// 是否没有匹配条目
    pub fn is_empty(&self) -> bool {
        self.first().is_none()
    }

    /// 两个序列是否由同一个有序绑定集合支撑
    pub fn shares_bindings(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bindings, &other.bindings)
    }
}

impl<T: ?Sized> Clone for Beans<T> {
    fn clone(&self) -> Self {
        Self {
            bindings: self.bindings.clone(),
            key: self.key.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Beans<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Beans").field("key", &self.key).finish()
    }
}

/// Bean 序列的活动迭代器
pub struct BeanIter<T: ?Sized> {
    bindings: Arc<RankedBindings<T>>,
    key: Key<T>,
    last: Option<SortKey>,
}

impl<T: ?Sized + Send + Sync + 'static> Iterator for BeanIter<T> {
    type Item = BeanEntry<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let ranked = self.bindings.next_after(self.last.as_ref())?;
            self.last = Some(ranked.key());
            if self.key.matches(ranked.item().qualifier()) {
                return Some(self.bindings.entry(&ranked));
            }
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> IntoIterator for Beans<T> {
    type Item = BeanEntry<T>;
    type IntoIter = BeanIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        BeanIter {
            bindings: self.bindings,
            key: self.key,
            last: None,
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> IntoIterator for &Beans<T> {
    type Item = BeanEntry<T>;
    type IntoIter = BeanIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
