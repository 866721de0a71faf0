//! Tracing bootstrap for Studio services.
//!
//! One builder wires the global subscriber: a compact ANSI console layer, an
//! optional rolling file layer (plain text or JSON) behind a non-blocking
//! writer, and an env filter that honors `RUST_LOG` unless explicit
//! directives are supplied.
//!
//! ```rust
//! # use studio_logger::Logger;
//! let _logger = Logger::builder()
//!     .name("studio-demo")
//!     .env_filter("studio=debug")
//!     .init()
//!     .unwrap();
//! ```

mod builder;
mod error;

pub use crate::builder::{LoggerBuilder, NoFile, NoName, WithFile, WithName};
pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use tracing_appender::non_blocking::WorkerGuard;

/// Handle to the installed logging system.
///
/// Owns the background worker guard for the file layer. Hold it for the
/// lifetime of the process; dropping it flushes and stops the worker.
#[must_use = "dropping the handle stops the background logging worker"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts a [`LoggerBuilder`]; a logger name is required before `init`.
    ///
    /// The name identifies the process in rolled file names
    /// (e.g. `studio.2026-08-24.log`).
    ///
    /// ```rust
    /// use studio_logger::Logger;
    ///
    /// let _logger = Logger::builder().name("studio").init().unwrap();
    /// ```
    #[must_use = "the builder does nothing until init() installs the subscriber"]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub(crate) const fn attach(guard: Option<WorkerGuard>) -> Self {
        Self { guard }
    }

    /// Best-effort synchronization point before shutdown; the real flush
    /// happens when the handle drops and the worker guard unwinds.
    pub fn flush(&self) {
        tracing::debug!("Logger flushed");
    }

    /// The file layer's worker guard, when a file path was configured.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Shutting down logging, draining buffered records");
        }
    }
}
