//! 查找键

use crate::qualifier::{Qualifier, QualifierAnnotation, QualifierConstraint, QualifierType};
use infrastructure_common::RawType;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// 查找键：契约类型 + 限定约束
///
/// 契约类型由类型参数 `T` 给出，通常是 trait object（例如 `Key<dyn Greeter>`）。
pub struct Key<T: ?Sized> {
    raw_type: RawType,
    constraint: QualifierConstraint,
    _contract: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized + 'static> Key<T> {
    fn with_constraint(constraint: QualifierConstraint) -> Self {
        Self {
            raw_type: RawType::of::<T>(),
            constraint,
            _contract: PhantomData,
        }
    }

    /// 不限定查找：匹配该契约类型的所有绑定
    pub fn unrestricted() -> Self {
        Self::with_constraint(QualifierConstraint::Unrestricted)
    }

    /// 按注解类型限定
    pub fn restricted_by_type<Q: QualifierAnnotation>() -> Self {
        Self::with_constraint(QualifierConstraint::ByType(QualifierType::of::<Q>()))
    }

    /// 按注解实例限定
    pub fn restricted_by_value(qualifier: impl Into<Qualifier>) -> Self {
        Self::with_constraint(QualifierConstraint::ByValue(qualifier.into()))
    }

    /// 按 hint 限定；`""` 与 `"default"` 都表示默认 hint
    pub fn named(hint: impl AsRef<str>) -> Self {
        Self::restricted_by_value(Qualifier::named(hint))
    }

    /// 契约类型
    pub fn raw_type(&self) -> RawType {
        self.raw_type
    }

    /// 限定约束
    pub fn constraint(&self) -> &QualifierConstraint {
        &self.constraint
    }

    /// 绑定限定符是否满足此键
    pub fn matches(&self, qualifier: &Qualifier) -> bool {
        self.constraint.matches(qualifier)
    }
}

impl<T: ?Sized> Clone for Key<T> {
    fn clone(&self) -> Self {
        Self {
            raw_type: self.raw_type,
            constraint: self.constraint.clone(),
            _contract: PhantomData,
        }
    }
}

impl<T: ?Sized> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw_type == other.raw_type && self.constraint == other.constraint
    }
}

impl<T: ?Sized> Eq for Key<T> {}

impl<T: ?Sized> Hash for Key<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw_type.hash(state);
        self.constraint.hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("raw_type", &self.raw_type.name())
            .field("constraint", &self.constraint)
            .finish()
    }
}

impl<T: ?Sized> fmt::Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            QualifierConstraint::Unrestricted => write!(f, "{}", self.raw_type.short_name()),
            QualifierConstraint::ByType(kind) => {
                write!(f, "@{} {}", kind.short_name(), self.raw_type.short_name())
            }
            QualifierConstraint::ByValue(qualifier) => {
                write!(f, "{} [{}]", self.raw_type.short_name(), qualifier)
            }
        }
    }
}
