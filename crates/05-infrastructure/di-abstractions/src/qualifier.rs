//! 限定符模型
//!
//! 限定符用于区分同一契约类型的多个绑定，等价于传统组件模型中的 hint/name。
//! 未显式限定的绑定携带默认 hint（`Named("default")`）。

use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 默认 hint 名称
pub const DEFAULT_HINT: &str = "default";

/// 规范化 hint：空白 hint 视为默认 hint
pub fn normalize_hint(hint: &str) -> String {
    let trimmed = hint.trim();
    if trimmed.is_empty() {
        DEFAULT_HINT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// 限定符注解 trait
///
/// 通常通过 `#[derive(Qualifier)]` 实现。
pub trait QualifierAnnotation: Send + Sync + 'static {
    /// 注解成员值
    fn attributes(&self) -> BTreeMap<String, AttributeValue>;
}

/// 限定符注解类型
#[derive(Debug, Clone, Copy)]
pub struct QualifierType {
    id: TypeId,
    name: &'static str,
}

impl QualifierType {
    /// 获取注解类型
    pub fn of<Q: QualifierAnnotation>() -> Self {
        Self {
            id: TypeId::of::<Q>(),
            name: std::any::type_name::<Q>(),
        }
    }

    /// 完整类型名称
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 简短类型名称
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for QualifierType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for QualifierType {}

impl Hash for QualifierType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// 注解成员值
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<AttributeValue>),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => write!(f, "\"{value}\""),
            Self::List(values) => {
                f.write_str("[")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// 限定符实例
///
/// 两个限定符相等当且仅当注解类型相同且所有成员值相等。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Qualifier {
    kind: QualifierType,
    attributes: BTreeMap<String, AttributeValue>,
}

impl Qualifier {
    /// 由注解实例创建限定符
    pub fn of<Q: QualifierAnnotation>(annotation: &Q) -> Self {
        Self {
            kind: QualifierType::of::<Q>(),
            attributes: annotation.attributes(),
        }
    }

    /// 命名限定符（传统 hint）
    pub fn named(hint: impl AsRef<str>) -> Self {
        Self::of(&Named::new(hint.as_ref()))
    }

    /// 默认 hint 限定符
    pub fn default_hint() -> Self {
        Self::named(DEFAULT_HINT)
    }

    /// 是否为默认 hint
    pub fn is_default(&self) -> bool {
        self.hint() == Some(DEFAULT_HINT)
    }

    /// 注解类型
    pub fn qualifier_type(&self) -> QualifierType {
        self.kind
    }

    /// 所有成员值
    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }

    /// 获取成员值
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// 命名限定符的 hint；其他注解类型返回 `None`
    pub fn hint(&self) -> Option<&str> {
        if self.kind != QualifierType::of::<Named>() {
            return None;
        }
        match self.attributes.get(Named::VALUE) {
            Some(AttributeValue::Str(hint)) => Some(hint.as_str()),
            _ => None,
        }
    }
}

impl Default for Qualifier {
    fn default() -> Self {
        Self::default_hint()
    }
}

impl<Q: QualifierAnnotation> From<Q> for Qualifier {
    fn from(annotation: Q) -> Self {
        Self::of(&annotation)
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(hint) = self.hint() {
            return f.write_str(hint);
        }
        write!(f, "@{}", self.kind.short_name())?;
        if self.attributes.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (index, (name, value)) in self.attributes.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}

/// 命名限定符
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Named(String);

impl Named {
    /// 成员名
    pub const VALUE: &'static str = "value";

    /// 创建命名限定符，空白名称规范化为默认 hint
    pub fn new(name: &str) -> Self {
        Self(normalize_hint(name))
    }

    /// 名称
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl QualifierAnnotation for Named {
    fn attributes(&self) -> BTreeMap<String, AttributeValue> {
        BTreeMap::from([(Self::VALUE.to_string(), AttributeValue::Str(self.0.clone()))])
    }
}

/// 查找时的限定约束
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QualifierConstraint {
    /// 不限定，匹配所有绑定
    Unrestricted,
    /// 按注解类型匹配
    ByType(QualifierType),
    /// 按注解实例（类型及成员值）匹配
    ByValue(Qualifier),
}

impl QualifierConstraint {
    /// 绑定限定符是否满足约束
    pub fn matches(&self, qualifier: &Qualifier) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::ByType(kind) => qualifier.qualifier_type() == *kind,
            Self::ByValue(expected) => qualifier == expected,
        }
    }
}
