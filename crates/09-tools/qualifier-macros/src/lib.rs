//! # Qualifier Macros
//!
//! 提供 `#[derive(Qualifier)]`，为结构体实现 `di_abstractions::QualifierAnnotation`。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use di_abstractions::Key;
//! use qualifier_macros::Qualifier;
//!
//! #[derive(Qualifier)]
//! struct Region {
//!     zone: &'static str,
//!     #[qualifier(rename = "tier")]
//!     level: i32,
//!     #[qualifier(skip)]
//!     note: String,
//! }
//!
//! let key = Key::<dyn Storage>::restricted_by_type::<Region>();
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod qualifier;
mod utils;

/// 限定符派生宏
///
/// 每个具名字段成为一个同名成员，字段类型需要实现 `Clone` 与
/// `Into<AttributeValue>`；单元结构体没有成员。
///
/// # 字段属性
///
/// - `#[qualifier(skip)]` - 不作为成员
/// - `#[qualifier(rename = "name")]` - 使用自定义成员名
#[proc_macro_derive(Qualifier, attributes(qualifier))]
pub fn derive_qualifier(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    qualifier::derive_qualifier_impl(input)
}
