//! Shared string constants.
//!
//! Flag names and artifact labels are an external interface: operators match
//! on them in dashboards and on disk, so they live here as named constants
//! instead of scattered literals.

/// Configuration namespace for every authoring-UI toggle.
pub const FLAG_NAMESPACE: &str = "studio";

/// Prefix attached to flag-resolution log lines.
pub const FLAG_LOG_PREFIX: &str = "Studio: ";

/// Name prefix for per-provider review-rules flags.
pub const PROVIDER_FLAG_PREFIX: &str = "show_review_rules_for_";

/// Default label for leak-snapshot artifacts.
pub const SNAPSHOT_LABEL: &str = "memory_leaks";

/// Default directory (under the storage root) for leak-snapshot artifacts.
pub const SNAPSHOT_DIR: &str = "memory_graphs";
