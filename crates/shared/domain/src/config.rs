use crate::constants::{SNAPSHOT_DIR, SNAPSHOT_LABEL};
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level platform configuration shared across subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StudioConfigInner {
    pub storage: StorageConfig,
    pub flags: FlagsConfig,
    pub diagnostics: SnapshotConfig,
}

/// Handle the subsystems clone freely; the `Arc` keeps that cheap.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct StudioConfig {
    #[serde(flatten, default)]
    inner: Arc<StudioConfigInner>,
}

impl Deref for StudioConfig {
    type Target = StudioConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for StudioConfig {
    fn deref_mut(&mut self) -> &mut StudioConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Artifact storage root. `None` resolves to a `studio` directory under the
/// system temporary directory.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: Option<PathBuf>,
}

/// Feature-flag subsystem knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlagsConfig {
    /// Capacity of the per-provider review-rules flag cache.
    pub provider_cache_capacity: u64,
}

/// Leak-snapshot recorder options.
///
/// The numeric bounds are artifact-size guards: the console table, the number
/// of graphed types, and the number of objects resolved per type are all
/// capped so one recording stays reviewable by hand.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Artifact label; also the key for the per-label snapshot index.
    pub label: String,
    /// Directory under the storage root where artifacts land.
    pub dump_dir: PathBuf,
    /// At most this many type rows are requested and shown in the summary.
    pub max_console_rows: usize,
    /// At most this many types (ranked by new-object count) are graphed.
    pub max_graphed_types: usize,
    /// Edge depth for forward-reference graphs.
    pub refs_depth: usize,
    /// Edge depth for back-reference graphs.
    pub back_refs_depth: usize,
    /// At most this many objects per type are resolved for graphing.
    pub max_objects_per_type: usize,
    /// Type names that are never graphed (internal bookkeeping types).
    pub ignored_types: Vec<String>,
    /// When false, only the textual summary artifact is produced.
    pub show_graphs: bool,
    /// When true, forward-reference graphs are rendered and persisted too.
    pub graph_forward_refs: bool,
}

// --- Defaults ---

impl Default for FlagsConfig {
    fn default() -> Self {
        Self { provider_cache_capacity: 100 }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            label: SNAPSHOT_LABEL.to_owned(),
            dump_dir: PathBuf::from(SNAPSHOT_DIR),
            max_console_rows: 30,
            max_graphed_types: 20,
            refs_depth: 3,
            back_refs_depth: 8,
            max_objects_per_type: 5,
            ignored_types: vec!["set".to_owned()],
            show_graphs: true,
            graph_forward_refs: false,
        }
    }
}
