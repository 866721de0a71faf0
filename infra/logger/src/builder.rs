use crate::Logger;
use crate::error::LoggerError;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const DEFAULT_RETAINED_FILES: usize = 10;
const FILE_SUFFIX: &str = "log";

/// An output layer over the bare registry; the env filter stacks on top.
type Sink = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug)]
struct Options {
    console: bool,
    directory: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    retained_files: usize,
    json: bool,
    directives: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            console: true,
            directory: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            retained_files: DEFAULT_RETAINED_FILES,
            json: false,
            directives: None,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub(super) trait Sealed {}
}
use private::Sealed;

impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// Typestate builder for the global tracing subscriber.
///
/// A name is mandatory before `init`; file-only knobs (`rotation`,
/// `max_files`, `json`) unlock once `path` selects a log directory.
#[allow(private_bounds)]
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    options: Options,
    name: N,
    sink: PhantomData<F>,
}

impl LoggerBuilder {
    pub(crate) fn new() -> Self {
        Self { options: Options::default(), name: NoName, sink: PhantomData }
    }
}

#[allow(private_bounds)]
impl<F: Sealed> LoggerBuilder<NoName, F> {
    /// Names the logger; the name prefixes every rolled log file.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, F> {
        LoggerBuilder { options: self.options, name: WithName(name.into()), sink: PhantomData }
    }
}

#[allow(private_bounds)]
impl<F: Sealed> LoggerBuilder<WithName, F> {
    /// Toggles the compact ANSI console layer (on by default).
    #[must_use = "the builder does nothing until init() installs the subscriber"]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.options.console = enabled;
        self
    }

    /// Sets the default severity floor; `RUST_LOG` can still lower or raise it
    /// per target unless [`LoggerBuilder::env_filter`] takes over.
    #[must_use = "the builder does nothing until init() installs the subscriber"]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.options.level = level;
        self
    }

    /// Replaces the `RUST_LOG` lookup with an explicit directive list,
    /// e.g. `"studio=debug,hyper=warn"`. Parsed during [`LoggerBuilder::init`];
    /// malformed directives fail initialization.
    #[must_use = "the builder does nothing until init() installs the subscriber"]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.options.directives = Some(filter.into());
        self
    }

    /// Routes a copy of the log stream into rolling files under `path`.
    pub fn path(self, path: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let mut options = self.options;
        options.directory = Some(path.into());
        LoggerBuilder { options, name: self.name, sink: PhantomData }
    }

    /// Installs the global subscriber and hands back the [`Logger`] handle.
    ///
    /// Keep the handle alive: it owns the non-blocking worker guard, and
    /// dropping it stops the background flusher.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for a blank name, zero retention,
    /// unparsable filter directives, or a setup with every output disabled;
    /// [`LoggerError::Subscriber`] when another global subscriber already won.
    pub fn init(self) -> Result<Logger, LoggerError> {
        self.preflight()?;

        let filter = self.directives()?;
        let mut sinks: Vec<Sink> = Vec::new();

        if self.options.console {
            sinks.push(console_sink());
        }

        let guard = match self.options.directory {
            Some(ref directory) => {
                let (sink, guard) = file_sink(directory, &self.name.0, &self.options)?;
                sinks.push(sink);
                Some(guard)
            },
            None => None,
        };

        if sinks.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Every output is disabled; enable the console or set a file path".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(sinks).with(filter).try_init()?;

        Ok(Logger::attach(guard))
    }

    fn preflight(&self) -> Result<(), LoggerError> {
        if self.name.0.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name must not be blank".into(),
                context: None,
            });
        }
        if self.options.retained_files == 0 {
            return Err(LoggerError::InvalidConfiguration {
                message: "At least one log file must be retained".into(),
                context: None,
            });
        }
        Ok(())
    }

    fn directives(&self) -> Result<EnvFilter, LoggerError> {
        let base = EnvFilter::builder().with_default_directive(self.options.level.into());
        match self.options.directives {
            Some(ref spec) => base.parse(spec).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Unparsable filter directives '{spec}': {e}").into(),
                context: None,
            }),
            None => Ok(base.from_env_lossy()),
        }
    }
}

impl LoggerBuilder<WithName, WithFile> {
    /// Selects how often the file appender rolls over (daily by default).
    #[must_use = "the builder does nothing until init() installs the subscriber"]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.options.rotation = rotation;
        self
    }

    /// Caps how many rolled files survive before the oldest is pruned.
    #[must_use = "the builder does nothing until init() installs the subscriber"]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.options.retained_files = max;
        self
    }

    /// Switches the file layer to newline-delimited JSON records.
    #[must_use = "the builder does nothing until init() installs the subscriber"]
    pub const fn json(mut self) -> Self {
        self.options.json = true;
        self
    }
}

fn console_sink() -> Sink {
    layer::<Registry>().compact().with_ansi(true).boxed()
}

fn file_sink(
    directory: &Path,
    prefix: &str,
    options: &Options,
) -> Result<(Sink, WorkerGuard), LoggerError> {
    fs::create_dir_all(directory).map_err(|e| LoggerError::Internal {
        message: e.to_string().into(),
        context: Some(format!("Failed to create log directory {}", directory.display()).into()),
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(options.rotation.clone())
        .filename_prefix(prefix)
        .filename_suffix(FILE_SUFFIX)
        .max_log_files(options.retained_files)
        .build(directory)?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let sink = layer::<Registry>().with_writer(writer).with_ansi(false);

    Ok((if options.json { sink.json().boxed() } else { sink.boxed() }, guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_favor_console_at_info() {
        let builder = Logger::builder().name("studio-test");
        assert!(builder.options.console);
        assert_eq!(builder.options.level, LevelFilter::INFO);
        assert!(builder.options.directory.is_none());
        assert!(builder.options.directives.is_none());
    }

    #[test]
    #[serial]
    fn settings_accumulate_across_typestates() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("logs");
        let builder = Logger::builder()
            .name("studio-test")
            .console(false)
            .env_filter("studio=trace")
            .path(&target)
            .rotation(Rotation::HOURLY)
            .max_files(3)
            .level(LevelFilter::WARN);

        assert!(!builder.options.console);
        assert_eq!(builder.options.level, LevelFilter::WARN);
        assert_eq!(builder.options.retained_files, 3);
        assert_eq!(builder.options.directives.as_deref(), Some("studio=trace"));
        assert_eq!(builder.options.directory.as_deref(), Some(target.as_path()));
    }

    #[test]
    #[serial]
    fn blank_name_is_rejected() {
        let err = Logger::builder().name("   ").init().expect_err("blank name must fail");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn zero_retention_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Logger::builder()
            .name("studio-test")
            .path(dir.path().join("logs"))
            .max_files(0)
            .init()
            .expect_err("zero retention must fail");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    #[serial]
    fn malformed_directives_are_rejected() {
        let err = Logger::builder()
            .name("studio-test")
            .env_filter("studio=%%%")
            .init()
            .expect_err("bad directives must fail");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
