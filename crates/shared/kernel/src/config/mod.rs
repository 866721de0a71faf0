use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Failures while assembling the layered configuration.
#[studio_derive::studio_error]
pub enum ConfigError {
    #[error("Configuration loading failed{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a typed configuration from a file plus environment overrides.
///
/// The file source (default `studio`, so `studio.toml` and friends in the
/// working directory) is required; on top of it, `STUDIO__`-prefixed
/// environment variables overlay individual values, with `__` separating
/// nesting levels. `STUDIO__DIAGNOSTICS__MAX_GRAPHED_TYPES=10` lands in
/// `diagnostics.max_graphed_types`.
///
/// # Errors
/// The configuration file being absent, unparsable, or shaped differently
/// than `T` all surface as [`ConfigError`].
///
/// ```rust
/// use studio_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct Limits {
///     max_graphed_types: usize,
/// }
///
/// let limits: Limits = load_config(Some("config/studio")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let source = path.map_or_else(|| PathBuf::from("studio"), |p| p.as_ref().to_path_buf());
    info!("Loading config from {}", source.display());

    let overlay =
        Environment::with_prefix("STUDIO").separator("__").convert_case(config::Case::Snake);

    Config::builder()
        .add_source(File::from(source.as_path()).required(true))
        .add_source(overlay)
        .build()
        .context("Failed to assemble config sources")?
        .try_deserialize::<T>()
        .context("Config payload does not match the target shape")
}
