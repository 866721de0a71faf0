//! Memory-leak diagnostics for long-running Studio processes.
//!
//! An operator-invoked recorder snapshots "objects created since the last
//! check" from an [`ObjectGraph`] introspection capability, persists a
//! summary table, and renders DOT reference graphs for the types with the
//! most new allocations. Artifacts land in the sandboxed storage engine
//! under deterministic `{label}_{pid}_{index}` names, so successive
//! snapshots of one process line up side by side.
//!
//! # Examples
//!
//! ```rust
//! use studio_diagnostics::{
//!     CreationOrder, DiagnosticsError, ObjectGraph, ObjectId, SnapshotRecorder, TypeDelta,
//! };
//! use studio_domain::config::SnapshotConfig;
//! use studio_storage::Storage;
//!
//! struct StaticGraph;
//!
//! impl ObjectGraph for StaticGraph {
//!     type Object = ObjectId;
//!
//!     fn new_object_ids(
//!         &mut self,
//!         limit: usize,
//!         _order: CreationOrder,
//!     ) -> Result<Vec<TypeDelta>, DiagnosticsError> {
//!         Ok(vec![TypeDelta::new("dict", vec![1, 2, 3])].into_iter().take(limit).collect())
//!     }
//!
//!     fn resolve_objects(&self, ids: &[ObjectId]) -> Result<Vec<ObjectId>, DiagnosticsError> {
//!         Ok(ids.to_vec())
//!     }
//!
//!     fn render_back_references(
//!         &self,
//!         objects: &[ObjectId],
//!         _max_depth: usize,
//!     ) -> Result<String, DiagnosticsError> {
//!         Ok(format!("digraph backrefs {{ /* {} roots */ }}", objects.len()))
//!     }
//!
//!     fn render_forward_references(
//!         &self,
//!         objects: &[ObjectId],
//!         _max_depth: usize,
//!     ) -> Result<String, DiagnosticsError> {
//!         Ok(format!("digraph refs {{ /* {} roots */ }}", objects.len()))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DiagnosticsError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     let storage = Storage::builder().root(tmp.path()).connect().await?;
//!
//!     let mut recorder = SnapshotRecorder::new(StaticGraph, storage);
//!     recorder.record(&SnapshotConfig::default()).await?;
//!     recorder.record(&SnapshotConfig::default()).await?;
//!
//!     assert_eq!(recorder.next_index("memory_leaks"), 3);
//!     Ok(())
//! }
//! ```

mod error;
mod graph;
mod recorder;

pub use crate::error::{DiagnosticsError, DiagnosticsErrorExt};
pub use crate::graph::{CreationOrder, ObjectGraph, ObjectId, TypeDelta};
pub use crate::recorder::SnapshotRecorder;

use studio_domain::config::SnapshotConfig;
use studio_kernel::domain::registry::InitializedSlice;

/// Diagnostics feature state.
#[studio_derive::studio_slice]
pub struct Diagnostics {
    /// Configured snapshot defaults for building recorders.
    pub defaults: SnapshotConfig,
}

/// Initialize the diagnostics feature.
///
/// Captures the configured snapshot defaults so hosts can build recorders
/// against them later.
///
/// # Errors
///
/// Currently infallible; the error surface is reserved for future wiring.
pub fn init(config: &SnapshotConfig) -> Result<InitializedSlice, DiagnosticsError> {
    let inner = DiagnosticsInner { defaults: config.clone() };

    let slice = Diagnostics::new(inner);

    tracing::info!(
        label = %config.label,
        dump_dir = %config.dump_dir.display(),
        "Diagnostics slice initialized"
    );

    Ok(InitializedSlice::new(slice))
}
