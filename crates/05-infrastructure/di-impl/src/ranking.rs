//! 绑定排序函数

use crate::ranked_sequence::Tier;
use di_abstractions::ErasedBinding;

/// 排序函数 trait
pub trait RankingFunction: Send + Sync {
    /// 发布者的主等级
    fn primary_rank(&self) -> i32;

    /// 计算绑定等级
    fn rank(&self, binding: &ErasedBinding) -> i32;

    /// 同等级内的分层：默认绑定排在限定绑定之前
    fn tier(&self, binding: &ErasedBinding) -> Tier {
        if binding.qualifier().is_default() {
            Tier::Default
        } else {
            Tier::Qualified
        }
    }
}

/// 默认排序函数：绑定的显式优先级，否则使用发布者注册时的等级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultRankingFunction {
    primary_rank: i32,
}

impl DefaultRankingFunction {
    /// 创建排序函数
    pub fn new(primary_rank: i32) -> Self {
        Self { primary_rank }
    }
}

impl RankingFunction for DefaultRankingFunction {
    fn primary_rank(&self) -> i32 {
        self.primary_rank
    }

    fn rank(&self, binding: &ErasedBinding) -> i32 {
        binding.priority().unwrap_or(self.primary_rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::Binding;
    use std::sync::Arc;

    #[test]
    fn test_priority_overrides_primary_rank() {
        let ranking = DefaultRankingFunction::new(7);
        let plain = Binding::<u32>::instance(Arc::new(1)).erase();
        let prioritised = Binding::<u32>::instance(Arc::new(2))
            .with_priority(-3)
            .erase();

        assert_eq!(ranking.primary_rank(), 7);
        assert_eq!(ranking.rank(&plain), 7);
        assert_eq!(ranking.rank(&prioritised), -3);
    }

    #[test]
    fn test_tier() {
        let ranking = DefaultRankingFunction::new(0);
        let plain = Binding::<u32>::instance(Arc::new(1)).erase();
        let named = Binding::<u32>::instance(Arc::new(2)).named("tag").erase();
        let explicit_default = Binding::<u32>::instance(Arc::new(3)).named("").erase();

        assert_eq!(ranking.tier(&plain), Tier::Default);
        assert_eq!(ranking.tier(&named), Tier::Qualified);
        assert_eq!(ranking.tier(&explicit_default), Tier::Default);
    }
}
