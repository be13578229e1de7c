//! Derive macros for the todolist reducer architecture
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Implements `todolist_core::action::Action` for action enums
//!
//! # Example
//!
//! ```ignore
//! use todolist_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     Add { title: String },
//!     #[action(rename = "LikeToggled")]
//!     ToggleLiked { id: u64 },
//! }
//!
//! assert_eq!(TodoAction::Add { title: "x".into() }.name(), "Add");
//! assert_eq!(TodoAction::ToggleLiked { id: 1 }.name(), "LikeToggled");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr};

/// Derive macro for Action enums
///
/// Implements `todolist_core::action::Action`, whose `name()` returns the
/// variant name as a `&'static str`. The runtime uses it to label log spans
/// and metrics for each dispatch.
///
/// # Attributes
///
/// - `#[action(rename = "...")]` - Override the reported name of a variant
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - An `#[action(...)]` attribute is malformed
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(
            input,
            "#[derive(Action)] can only be used on enums"
        )
        .to_compile_error()
        .into();
    };

    let mut name_arms = Vec::with_capacity(data_enum.variants.len());

    for variant in &data_enum.variants {
        let variant_name = &variant.ident;

        let reported = match renamed(&variant.attrs) {
            Ok(Some(rename)) => rename,
            Ok(None) => variant_name.to_string(),
            Err(error) => return error.to_compile_error().into(),
        };

        let arm = match &variant.fields {
            Fields::Named(_) => quote! { Self::#variant_name { .. } => #reported, },
            Fields::Unnamed(_) => quote! { Self::#variant_name(..) => #reported, },
            Fields::Unit => quote! { Self::#variant_name => #reported, },
        };
        name_arms.push(arm);
    }

    let expanded = quote! {
        impl #impl_generics ::todolist_core::action::Action for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                match *self {
                    #(#name_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Reads `#[action(rename = "...")]` from a variant's attributes
fn renamed(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut rename = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("action")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                rename = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported action attribute, expected `rename`"))
            }
        })?;
    }

    Ok(rename)
}
