//! 限定符派生宏实现

use crate::utils::parse_field_options;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, Result};

/// 实现 #[derive(Qualifier)]
pub fn derive_qualifier_impl(input: DeriveInput) -> TokenStream {
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(Error::new_spanned(
                struct_name,
                "Qualifier 只能用于结构体",
            ))
        }
    };

    let mut inserts = Vec::new();
    match fields {
        Fields::Named(named) => {
            for field in &named.named {
                let options = parse_field_options(field)?;
                if options.skip {
                    continue;
                }
                let Some(ident) = &field.ident else {
                    continue;
                };
                let name = options.rename.unwrap_or_else(|| ident.to_string());
                inserts.push(quote! {
                    attributes.insert(
                        ::std::string::String::from(#name),
                        ::di_abstractions::AttributeValue::from(
                            ::core::clone::Clone::clone(&self.#ident),
                        ),
                    );
                });
            }
        }
        Fields::Unit => {}
        Fields::Unnamed(_) => {
            return Err(Error::new_spanned(
                struct_name,
                "Qualifier 只支持具名字段结构体或单元结构体",
            ))
        }
    }

    Ok(quote! {
        impl #impl_generics ::di_abstractions::QualifierAnnotation for #struct_name #ty_generics #where_clause {
            fn attributes(
                &self,
            ) -> ::std::collections::BTreeMap<::std::string::String, ::di_abstractions::AttributeValue> {
                #[allow(unused_mut)]
                let mut attributes = ::std::collections::BTreeMap::new();
                #(#inserts)*
                attributes
            }
        }
    })
}
