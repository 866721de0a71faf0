//! The boundary to the external flag-evaluation framework.

use fxhash::FxHashMap;
use parking_lot::RwLock;

/// Capability consumed by flag and switch resolution.
///
/// Implementations answer "what value, if any, is configured for this fully
/// qualified name?". `None` means the name is undefined and the declared
/// default applies.
pub trait FlagSource {
    /// Looks up the configured value for `qualified_name`.
    fn value(&self, qualified_name: &str) -> Option<bool>;
}

/// In-process [`FlagSource`] backed by a hash map.
///
/// Hosts and tests define flag values here; the production evaluation
/// framework lives outside this crate and only has to satisfy the same trait.
#[derive(Debug, Default)]
pub struct MemoryFlags {
    values: RwLock<FxHashMap<String, bool>>,
}

impl MemoryFlags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines `qualified_name`, replacing any previous value.
    pub fn set(&self, qualified_name: impl Into<String>, value: bool) {
        self.values.write().insert(qualified_name.into(), value);
    }

    /// Removes the definition, restoring default resolution for the name.
    pub fn clear(&self, qualified_name: &str) {
        self.values.write().remove(qualified_name);
    }
}

impl FlagSource for MemoryFlags {
    fn value(&self, qualified_name: &str) -> Option<bool> {
        self.values.read().get(qualified_name).copied()
    }
}
