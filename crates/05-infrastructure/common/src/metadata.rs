//! 元数据定义
//!
//! 提供契约类型（raw type）的元数据信息

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 契约类型信息
///
/// 标识一次查找所请求的契约（trait object 或具体类型），相等性与哈希仅由 `TypeId` 决定。
#[derive(Debug, Clone, Copy)]
pub struct RawType {
    /// 类型ID
    id: TypeId,
    /// 完整类型名称
    name: &'static str,
}

impl RawType {
    /// 从类型获取契约类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// 类型ID
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// 完整类型名称（包含模块路径）
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        let base = base.trim_start_matches("dyn ");
        base.rsplit("::").next().unwrap_or(base)
    }

    /// 是否为指定类型
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for RawType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RawType {}

impl Hash for RawType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    trait Greeter {}
    struct EnglishGreeter;

    #[test]
    fn test_raw_type_identity() {
        assert_eq!(RawType::of::<dyn Greeter>(), RawType::of::<dyn Greeter>());
        assert_ne!(RawType::of::<dyn Greeter>(), RawType::of::<EnglishGreeter>());
        assert!(RawType::of::<EnglishGreeter>().is::<EnglishGreeter>());

        let set: HashSet<RawType> = [RawType::of::<String>(), RawType::of::<String>()]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_short_name() {
        assert_eq!(RawType::of::<EnglishGreeter>().short_name(), "EnglishGreeter");
        assert_eq!(RawType::of::<dyn Greeter>().short_name(), "Greeter");
        assert_eq!(RawType::of::<Vec<String>>().short_name(), "Vec");
    }
}
