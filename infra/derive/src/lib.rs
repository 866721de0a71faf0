#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! Attribute macros shared by the platform crates.
//!
//! Two pieces of boilerplate get stamped out here: error enums with a
//! `.context(...)` bolt-on (`studio_error`) and Arc-backed feature-slice
//! handles (`studio_slice`). Workspace crates depend on this crate by path;
//! the doc examples are `ignore`d because a proc-macro crate cannot compile
//! against its own output.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemStruct, parse_macro_input};

/// Turns a plain enum into a platform error type.
///
/// On top of the annotated enum this generates:
/// * `#[derive(Debug, thiserror::Error)]` when those derives are absent;
/// * a `<Name>Ext` trait whose `.context(...)` attaches a message to
///   `Result<T, Name>` in place, or converts `Result<T, SourceTy>` while
///   attaching one;
/// * `From<SourceTy>` (context `None`) per source-carrying variant, so `?`
///   works on upstream errors;
/// * `From<&'static str>` / `From<String>` when an `Internal` variant exists;
/// * a module-level `format_context` helper for `#[error(...)]` strings.
///
/// The contract: variants use named fields only; a variant with a source field
/// (named `source`, or marked `#[source]`/`#[from]`) must also carry
/// `context: Option<Cow<'static, str>>`. Violations are compile errors
/// pointing at the offending variant or field.
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[studio_derive::studio_error]
/// pub enum SnapshotError {
///     #[error("Artifact write failed{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Recorder fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read_report(path: &str) -> Result<Vec<u8>, SnapshotError> {
///     std::fs::read(path).context("Loading the previous snapshot")
/// }
/// ```
#[proc_macro_attribute]
pub fn studio_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_error(input).into()
}

/// Wraps a feature's state struct in the slice-handle pattern.
///
/// The annotated struct becomes `<Name>Inner`; the macro emits a `<Name>`
/// handle holding an `Arc<<Name>Inner>` that derefs to the inner state and
/// implements `FeatureSlice`, so the kernel registry can hold it as a trait
/// object and callers can downcast it back.
///
/// ```rust,ignore
/// #[studio_derive::studio_slice]
/// pub struct Flags {
///     pub provider_cache: ProviderFlagCache,
/// }
///
/// fn init() -> Flags {
///     Flags::new(FlagsInner { provider_cache: ProviderFlagCache::new(100) })
/// }
/// ```
#[proc_macro_attribute]
pub fn studio_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
