use std::borrow::Cow;

/// Initialization failures for the logging stack.
#[studio_derive::studio_error]
pub enum LoggerError {
    /// The rolling file appender could not be built (bad directory, bad prefix).
    #[error("File appender setup failed{}: {source}", format_context(context))]
    Appender { source: tracing_appender::rolling::InitError, context: Option<Cow<'static, str>> },

    /// Another global subscriber was installed first; only one wins per process.
    #[error("Global subscriber registration failed{}: {source}", format_context(context))]
    Subscriber {
        source: tracing_subscriber::util::TryInitError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Logger internal failure{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Builder settings that cannot produce a working subscriber.
    #[error("Rejected logger configuration{}: {message}", format_context(context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
