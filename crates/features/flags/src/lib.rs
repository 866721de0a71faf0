//! Feature-flag registry for the Studio authoring UI.
//!
//! Declares the named switches and flags the host application queries per
//! request, resolved through a [`FlagSource`] capability under the `studio`
//! configuration namespace. A factory derives per-provider review-rule flags
//! on demand, and [`ProviderFlagCache`] gives hosts an explicit shared cache
//! for them.
//!
//! # Examples
//!
//! ```rust
//! use studio_flags::{MemoryFlags, enable_checklists_quality, show_review_rules_for_provider};
//!
//! let source = MemoryFlags::new();
//!
//! // Declared defaults apply while the source has no definition.
//! assert!(enable_checklists_quality().is_enabled(&source));
//!
//! let proctorio = show_review_rules_for_provider("proctorio");
//! assert_eq!(proctorio.qualified_name(), "studio.show_review_rules_for_proctorio");
//! assert!(!proctorio.is_enabled(&source));
//!
//! // Host overrides win over the declared default.
//! source.set("studio.enable_checklists_quality", false);
//! assert!(!enable_checklists_quality().is_enabled(&source));
//! ```

mod cache;
mod error;
mod registry;
mod source;

pub use crate::cache::ProviderFlagCache;
pub use crate::error::{FlagsError, FlagsErrorExt};
pub use crate::registry::{Flag, FlagNamespace, Switch, SwitchNamespace};
pub use crate::source::{FlagSource, MemoryFlags};

use studio_domain::config::FlagsConfig;
use studio_domain::constants::{FLAG_LOG_PREFIX, FLAG_NAMESPACE, PROVIDER_FLAG_PREFIX};
use studio_kernel::domain::registry::InitializedSlice;

/// Returns a fresh handle to the switch configuration namespace.
#[must_use]
pub fn switch_namespace() -> SwitchNamespace {
    SwitchNamespace::new(FLAG_NAMESPACE, FLAG_LOG_PREFIX)
}

/// Returns a fresh handle to the flag configuration namespace.
#[must_use]
pub fn flag_namespace() -> FlagNamespace {
    FlagNamespace::new(FLAG_NAMESPACE, FLAG_LOG_PREFIX)
}

/// Switch gating the course policy page.
#[must_use]
pub fn enable_policy_page() -> Switch {
    Switch::new(switch_namespace(), "enable_policy_page")
}

/// Flag allowing per-provider overrides of proctoring review rules.
#[must_use]
pub fn enable_proctoring_provider_overrides() -> Flag {
    Flag::new(flag_namespace(), "enable_proctoring_provider_overrides", false)
}

/// Flag enabling the checklist quality panel. On unless explicitly disabled.
#[must_use]
pub fn enable_checklists_quality() -> Flag {
    Flag::new(flag_namespace(), "enable_checklists_quality", true)
}

/// Flag showing review rules on the proctored exam settings page.
#[must_use]
pub fn show_review_rules() -> Flag {
    Flag::new(flag_namespace(), "show_review_rules", false)
}

/// Builds the review-rules flag for a single proctoring provider.
///
/// Pure: every call returns a fresh [`Flag`] naming the same logical flag.
/// Callers that want one shared value per provider go through
/// [`ProviderFlagCache`] instead.
#[must_use]
pub fn show_review_rules_for_provider(provider: &str) -> Flag {
    Flag::new(flag_namespace(), format!("{PROVIDER_FLAG_PREFIX}{provider}"), false)
}

/// Flag registry feature state.
#[studio_derive::studio_slice]
pub struct Flags {
    /// Shared per-provider review-rule flag cache.
    pub provider_cache: ProviderFlagCache,
}

/// Initialize the flag registry feature.
///
/// Wires the provider flag cache with the capacity taken from `config`.
///
/// # Errors
///
/// Returns [`FlagsError::Config`] when `provider_cache_capacity` is zero.
pub fn init(config: &FlagsConfig) -> Result<InitializedSlice, FlagsError> {
    if config.provider_cache_capacity == 0 {
        return Err(FlagsError::Config {
            message: "provider_cache_capacity must be greater than zero".into(),
            context: None,
        });
    }

    let inner = FlagsInner { provider_cache: ProviderFlagCache::new(config.provider_cache_capacity) };

    let slice = Flags::new(inner);

    tracing::info!(capacity = config.provider_cache_capacity, "Flag registry slice initialized");

    Ok(InitializedSlice::new(slice))
}
