//! 宏工具函数

use syn::{Field, LitStr, Result};

/// 字段上的 `#[qualifier(..)]` 选项
#[derive(Debug, Default)]
pub struct FieldOptions {
    /// 不作为成员
    pub skip: bool,
    /// 自定义成员名
    pub rename: Option<String>,
}

/// 解析字段属性
pub fn parse_field_options(field: &Field) -> Result<FieldOptions> {
    let mut options = FieldOptions::default();

    for attr in &field.attrs {
        if !attr.path().is_ident("qualifier") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                options.rename = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("不支持的 qualifier 选项，可用: skip, rename"))
            }
        })?;
    }

    Ok(options)
}
