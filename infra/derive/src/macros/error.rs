use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{
    Attribute, Data, DeriveInput, Field, Fields, GenericArgument, Ident, PathArguments,
    PathSegment, Type, Variant,
};

/// Parsed shape of one enum variant: its source field, if any, and whether it
/// carries a context slot the ext trait can write into.
struct ErrorVariant<'a> {
    name: &'a Ident,
    source: Option<(&'a Ident, &'a Type)>,
    has_context: bool,
    cfg_attrs: Vec<Attribute>,
}

pub fn expand_error(input: DeriveInput) -> TokenStream {
    let enum_ident = &input.ident;
    let ext_ident = format_ident!("{}Ext", enum_ident);

    let Data::Enum(data) = &input.data else {
        return quote! { compile_error!("studio_error can only be derived for enums"); };
    };

    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        match parse_variant(variant) {
            Ok(parsed) => variants.push(parsed),
            Err(err) => return err,
        }
    }
    if let Err(err) = enforce_context_presence(&variants) {
        return err;
    }

    let extra_derives = missing_derives(&input);
    let ext_trait = context_ext_trait(enum_ident, &ext_ident, &variants);
    let conversions = variants.iter().filter_map(|v| source_conversions(enum_ident, &ext_ident, v));
    let internal = internal_conversions(enum_ident, &variants);

    quote! {
        #[allow(non_shorthand_field_patterns)]
        #extra_derives
        #input

        #ext_trait
        #(#conversions)*
        #internal

        #[allow(dead_code)]
        fn format_context(
            context: &Option<std::borrow::Cow<'static, str>>,
        ) -> std::borrow::Cow<'static, str> {
            match context {
                Some(c) => std::borrow::Cow::Owned(format!(" ({c})")),
                None => std::borrow::Cow::Borrowed(""),
            }
        }
    }
}

/// One pass over the named fields picks up the `context` slot (validating its
/// type) and the first `source`-like field (by name or `#[source]`/`#[from]`).
fn parse_variant(variant: &Variant) -> Result<ErrorVariant<'_>, TokenStream> {
    let Fields::Named(fields) = &variant.fields else {
        return Err(reject(
            &variant.ident,
            "studio_error requires named fields for source/context handling",
        ));
    };

    let mut has_context = false;
    let mut source = None;

    for field in &fields.named {
        let Some(ident) = field.ident.as_ref() else { continue };
        if ident == "context" {
            if !is_context_type(&field.ty) {
                return Err(reject(&field.ty, "context field must be Option<Cow<'static, str>>"));
            }
            has_context = true;
        } else if source.is_none()
            && (ident == "source" || marked_with(field, "source") || marked_with(field, "from"))
        {
            source = Some((ident, &field.ty));
        }
    }

    Ok(ErrorVariant {
        name: &variant.ident,
        source,
        has_context,
        cfg_attrs: variant
            .attrs
            .iter()
            .filter(|attr| attr.path().is_ident("cfg"))
            .cloned()
            .collect(),
    })
}

/// A variant wrapping a source must also carry a context slot, otherwise the
/// generated `.context(...)` would silently drop the message.
fn enforce_context_presence(variants: &[ErrorVariant<'_>]) -> Result<(), TokenStream> {
    match variants.iter().find(|v| v.source.is_some() && !v.has_context) {
        Some(v) => Err(reject(
            v.name,
            "studio_error requires `context: Option<Cow<'static, str>>` for variants with a source",
        )),
        None => Ok(()),
    }
}

fn reject(spanned: impl ToTokens, message: &str) -> TokenStream {
    syn::Error::new_spanned(spanned, message).to_compile_error()
}

/// Injects `Debug` and `thiserror::Error` unless the enum already derives them.
fn missing_derives(input: &DeriveInput) -> TokenStream {
    let derived = derived_trait_names(input);
    let mut wanted = Vec::new();
    if !derived.contains("Debug") {
        wanted.push(quote! { Debug });
    }
    if !derived.contains("Error") {
        wanted.push(quote! { ::thiserror::Error });
    }
    if wanted.is_empty() {
        return quote!();
    }
    quote! { #[derive(#(#wanted),*)] }
}

/// The `<Name>Ext` trait plus its impl for `Result<T, Name>`: `.context(...)`
/// stamps the message into whichever variant the error already is.
fn context_ext_trait(
    enum_ident: &Ident,
    ext_ident: &Ident,
    variants: &[ErrorVariant<'_>],
) -> TokenStream {
    let arms = variants.iter().filter(|v| v.has_context).map(|v| {
        let cfg_attrs = &v.cfg_attrs;
        let name = v.name;
        quote! {
            #(#cfg_attrs)*
            #enum_ident::#name { context: slot, .. } => *slot = Some(context.into()),
        }
    });

    quote! {
        pub trait #ext_ident<T> {
            fn context(
                self,
                context: impl Into<std::borrow::Cow<'static, str>>,
            ) -> std::result::Result<T, #enum_ident>;
        }

        #[automatically_derived]
        impl<T> #ext_ident<T> for std::result::Result<T, #enum_ident> {
            #[inline]
            fn context(
                self,
                context: impl Into<std::borrow::Cow<'static, str>>,
            ) -> Self {
                self.map_err(|mut err| {
                    match &mut err {
                        #( #arms )*
                        _ => {}
                    }
                    err
                })
            }
        }
    }
}

/// For each variant with a source: a plain `From<SourceTy>` (no context) and
/// an ext-trait impl on `Result<T, SourceTy>` that attaches one.
fn source_conversions(
    enum_ident: &Ident,
    ext_ident: &Ident,
    v: &ErrorVariant<'_>,
) -> Option<TokenStream> {
    if v.name == "Internal" {
        return None;
    }
    let (field, source_ty) = v.source?;
    let name = v.name;
    let cfg_attrs = &v.cfg_attrs;

    Some(quote! {
        #(#cfg_attrs)*
        #[automatically_derived]
        impl From<#source_ty> for #enum_ident {
            #[inline]
            fn from(#field: #source_ty) -> Self {
                Self::#name { #field, context: None }
            }
        }

        #(#cfg_attrs)*
        impl<T> #ext_ident<T> for std::result::Result<T, #source_ty> {
            #[inline]
            fn context(
                self,
                context: impl Into<std::borrow::Cow<'static, str>>,
            ) -> std::result::Result<T, #enum_ident> {
                self.map_err(|#field| #enum_ident::#name {
                    #field,
                    context: Some(context.into()),
                })
            }
        }
    })
}

/// `Internal` variants accept bare strings, so `"oops".into()` works.
fn internal_conversions(enum_ident: &Ident, variants: &[ErrorVariant<'_>]) -> TokenStream {
    let Some(internal) = variants.iter().find(|v| v.name == "Internal") else {
        return quote!();
    };
    let cfg_attrs = &internal.cfg_attrs;

    quote! {
        #(#cfg_attrs)*
        impl From<&'static str> for #enum_ident {
            #[inline]
            fn from(s: &'static str) -> Self {
                Self::Internal { message: std::borrow::Cow::Borrowed(s), context: None }
            }
        }
        #(#cfg_attrs)*
        impl From<String> for #enum_ident {
            #[inline]
            fn from(s: String) -> Self {
                Self::Internal { message: std::borrow::Cow::Owned(s), context: None }
            }
        }
    }
}

fn marked_with(field: &Field, marker: &str) -> bool {
    field.attrs.iter().any(|attr| attr.path().is_ident(marker))
}

fn derived_trait_names(input: &DeriveInput) -> FxHashSet<String> {
    let mut seen = FxHashSet::default();
    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|nested| {
            if let Some(tail) = nested.path.segments.last() {
                seen.insert(tail.ident.to_string());
            }
            Ok(())
        });
    }
    seen
}

/// Structural check for `Option<Cow<'static, str>>`, tolerant of path prefixes
/// (`std::borrow::Cow` and plain `Cow` both pass).
fn is_context_type(ty: &Type) -> bool {
    segment_of(ty, "Option")
        .and_then(first_type_arg)
        .and_then(|inner| segment_of(inner, "Cow"))
        .is_some_and(cow_args_are_static_str)
}

fn segment_of<'a>(ty: &'a Type, name: &str) -> Option<&'a PathSegment> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let tail = type_path.path.segments.last()?;
    (tail.ident == name).then_some(tail)
}

fn first_type_arg(segment: &PathSegment) -> Option<&Type> {
    let PathArguments::AngleBracketed(generics) = &segment.arguments else {
        return None;
    };
    match generics.args.first()? {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    }
}

fn cow_args_are_static_str(segment: &PathSegment) -> bool {
    let PathArguments::AngleBracketed(generics) = &segment.arguments else {
        return false;
    };
    let mut params = generics.args.iter();
    let lifetime_ok = matches!(
        params.next(),
        Some(GenericArgument::Lifetime(lt)) if lt.ident == "static"
    );
    let str_ok = matches!(
        params.next(),
        Some(GenericArgument::Type(Type::Path(p)))
            if p.path.segments.last().is_some_and(|tail| tail.ident == "str")
    );
    lifetime_ok && str_ok
}
