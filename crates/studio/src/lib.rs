//! Facade crate for Studio features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `studio` with the desired feature flags (`flags`/`diagnostics`).
//! - Install logging through `studio::logger::Logger::builder()` before anything else.
//! - Call `studio::init` to register feature slices; extend as new slices appear.

pub use studio_domain as domain;
pub use studio_kernel as kernel;
pub use studio_logger as logger;
#[cfg(feature = "diagnostics")]
pub use studio_storage as storage;

#[cfg(any(feature = "flags", feature = "diagnostics"))]
use studio_domain::config::StudioConfig;

/// Feature registry for runtime introspection.
pub mod features {
    #[cfg(feature = "diagnostics")]
    pub use studio_diagnostics as diagnostics;
    #[cfg(feature = "flags")]
    pub use studio_flags as flags;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "flags")]
        "flags",
        #[cfg(feature = "diagnostics")]
        "diagnostics",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize all enabled features.
///
/// # Errors
/// Returns an error if any feature initialization fails.
#[cfg(any(feature = "flags", feature = "diagnostics"))]
pub fn init(
    config: &StudioConfig,
) -> Result<Vec<domain::registry::InitializedSlice>, Box<dyn std::error::Error>> {
    let mut slices = Vec::new();

    // Flag registry
    #[cfg(feature = "flags")]
    slices.push(features::flags::init(&config.flags)?);

    // Leak diagnostics
    #[cfg(feature = "diagnostics")]
    slices.push(features::diagnostics::init(&config.diagnostics)?);

    Ok(slices)
}
