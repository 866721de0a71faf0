use std::borrow::Cow;

/// Failure cases for wiring the flag registry slice.
#[studio_derive::studio_error]
pub enum FlagsError {
    /// Configuration errors for the flag registry.
    #[error("Flags config error{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal flags error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
