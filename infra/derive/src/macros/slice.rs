use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Ident, ItemStruct, Visibility};

pub fn expand_slice(input: ItemStruct) -> TokenStream {
    let handle = &input.ident;
    let inner = format_ident!("{handle}Inner");

    let attrs = &input.attrs;
    let vis = &input.vis;
    let fields = &input.fields;
    let shared_impls = handle_impls(vis, handle, &inner);

    quote! {
        #(#attrs)*
        #[derive(Debug, Clone)]
        #vis struct #inner #fields

        #shared_impls
    }
}

/// The Arc-backed handle: cheap to clone, `Deref`s to the inner state and
/// registers as a [`FeatureSlice`] trait object.
fn handle_impls(vis: &Visibility, handle: &Ident, inner: &Ident) -> TokenStream {
    quote! {
        #[derive(Debug, Clone)]
        #vis struct #handle {
            inner: std::sync::Arc<#inner>,
        }

        impl #handle {
            pub fn new(inner: #inner) -> Self {
                Self { inner: std::sync::Arc::new(inner) }
            }
        }

        impl std::ops::Deref for #handle {
            type Target = #inner;
            fn deref(&self) -> &Self::Target { &self.inner }
        }

        impl ::studio_kernel::domain::registry::FeatureSlice for #handle {
            fn as_any(&self) -> &dyn std::any::Any { self }
        }
    }
}
