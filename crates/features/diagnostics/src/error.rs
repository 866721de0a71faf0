use std::borrow::Cow;

/// Failure cases raised while capturing or persisting a snapshot.
#[studio_derive::studio_error]
pub enum DiagnosticsError {
    /// Failures raised by the object-graph introspection capability.
    #[error("Introspection error{}: {message}", format_context(.context))]
    Introspection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Artifact persistence failures.
    #[error("Diagnostics storage error{}: {source}", format_context(.context))]
    Storage { source: studio_storage::StorageError, context: Option<Cow<'static, str>> },
    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal diagnostics error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
