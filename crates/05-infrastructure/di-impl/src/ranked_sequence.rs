//! 有序等级序列
//!
//! 元素按 `(等级降序, 默认先于限定, 插入顺序)` 全序排列。写操作在写锁内复制并替换快照；
//! 读操作只克隆当前快照的 `Arc`，因此迭代永远不会看到半更新的列表。
//!
//! 迭代器是活动游标：每次 `next` 重新读取当前快照，返回排序键严格大于上一次返回值的
//! 第一个元素。已移除的元素会被跳过，落在游标之后的新元素会被看到，迭代从不失败。

use parking_lot::RwLock;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 同等级内的分层
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// 默认（未限定）绑定
    Default,
    /// 限定绑定
    Qualified,
}

/// 排序键
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey {
    rank: Reverse<i32>,
    tier: Tier,
    seq: u64,
}

impl SortKey {
    /// 等级
    pub fn rank(&self) -> i32 {
        self.rank.0
    }

    /// 分层
    pub fn tier(&self) -> Tier {
        self.tier
    }
}

/// 带排序键的元素
#[derive(Debug, Clone)]
pub struct Ranked<T> {
    key: SortKey,
    item: T,
}

impl<T> Ranked<T> {
    /// 排序键
    pub fn key(&self) -> SortKey {
        self.key
    }

    /// 等级
    pub fn rank(&self) -> i32 {
        self.key.rank()
    }

    /// 元素
    pub fn item(&self) -> &T {
        &self.item
    }
}

/// 有序等级序列
#[derive(Debug)]
pub struct RankedSequence<T> {
    contents: RwLock<Arc<Vec<Ranked<T>>>>,
    next_seq: AtomicU64,
}

impl<T: Clone> RankedSequence<T> {
    /// 创建空序列
    pub fn new() -> Self {
        Self {
            contents: RwLock::new(Arc::new(Vec::new())),
            next_seq: AtomicU64::new(0),
        }
    }

    /// 插入元素，返回其排序键
    pub fn insert(&self, item: T, rank: i32, tier: Tier) -> SortKey {
        let mut contents = self.contents.write();
        Self::insert_locked(&mut contents, &self.next_seq, item, rank, tier)
    }

    fn insert_locked(
        contents: &mut Arc<Vec<Ranked<T>>>,
        next_seq: &AtomicU64,
        item: T,
        rank: i32,
        tier: Tier,
    ) -> SortKey {
        let key = SortKey {
            rank: Reverse(rank),
            tier,
            seq: next_seq.fetch_add(1, Ordering::Relaxed),
        };

        let position = contents.partition_point(|ranked| ranked.key < key);
        let mut next = Vec::with_capacity(contents.len() + 1);
        next.extend_from_slice(&contents[..position]);
        next.push(Ranked { key, item });
        next.extend_from_slice(&contents[position..]);
        *contents = Arc::new(next);

        key
    }

    /// 移除所有满足条件的元素，返回被移除的元素
    pub fn remove_where(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let mut contents = self.contents.write();
        if !contents.iter().any(|ranked| predicate(&ranked.item)) {
            return Vec::new();
        }

        let (removed, kept): (Vec<_>, Vec<_>) = contents
            .iter()
            .cloned()
            .partition(|ranked| predicate(&ranked.item));
        *contents = Arc::new(kept);

        removed.into_iter().map(|ranked| ranked.item).collect()
    }

    /// 清空序列，返回所有元素
    pub fn clear(&self) -> Vec<T> {
        let mut contents = self.contents.write();
        let previous = std::mem::take(&mut *contents);
        previous.iter().map(|ranked| ranked.item.clone()).collect()
    }

    /// 是否存在满足条件的元素
    pub fn contains(&self, predicate: impl Fn(&T) -> bool) -> bool {
        self.snapshot().iter().any(|ranked| predicate(&ranked.item))
    }

    /// 当前快照
    pub fn snapshot(&self) -> Arc<Vec<Ranked<T>>> {
        self.contents.read().clone()
    }

    /// 元素数量
    pub fn len(&self) -> usize {
        self.contents.read().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 排序键严格大于 `after` 的第一个元素
    pub fn next_after(&self, after: Option<&SortKey>) -> Option<Ranked<T>> {
        let contents = self.snapshot();
        let position = match after {
            Some(after) => contents.partition_point(|ranked| ranked.key <= *after),
            None => 0,
        };
        contents.get(position).cloned()
    }

    /// 活动迭代器
    pub fn iter(&self) -> RankedIter<'_, T> {
        RankedIter {
            sequence: self,
            last: None,
        }
    }
}

impl<T: Clone> Default for RankedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 活动迭代器
pub struct RankedIter<'a, T> {
    sequence: &'a RankedSequence<T>,
    last: Option<SortKey>,
}

impl<T: Clone> Iterator for RankedIter<'_, T> {
    type Item = Ranked<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.sequence.next_after(self.last.as_ref())?;
        self.last = Some(next.key);
        Some(next)
    }
}
