//! Injected per-provider flag cache.

use crate::registry::Flag;
use crate::show_review_rules_for_provider;
use moka::sync::Cache;

/// Bounded, thread-safe cache of per-provider review-rule flags.
///
/// The factory itself never caches; hosts that want one shared flag value per
/// provider own an instance of this type instead of a process-wide global.
/// Clones share the same underlying cache.
#[derive(Debug, Clone)]
pub struct ProviderFlagCache {
    cache: Cache<String, Flag>,
}

impl ProviderFlagCache {
    /// Creates a cache bounded to `capacity` provider entries.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self { cache: Cache::builder().max_capacity(capacity).build() }
    }

    /// Returns the review-rules flag for `provider`, building it on first use.
    #[must_use]
    pub fn review_rules_for(&self, provider: &str) -> Flag {
        self.cache.get_with(provider.to_owned(), || show_review_rules_for_provider(provider))
    }
}
