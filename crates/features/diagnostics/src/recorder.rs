//! The leak-snapshot recording procedure.

use crate::error::DiagnosticsError;
use crate::graph::{CreationOrder, ObjectGraph, TypeDelta};
use chrono::Utc;
use fxhash::FxHashMap;
use std::cmp::Reverse;
use std::fmt::Write as _;
use studio_domain::config::SnapshotConfig;
use studio_storage::Storage;
use tracing::info;

const TOTAL_LABEL: &str = "total";

/// Records point-in-time object-graph snapshots to the artifact store.
///
/// The recorder owns the introspection capability, the storage handle, and
/// the per-label snapshot indices. Indices are process-lifetime state: for a
/// given label, N sequential [`record`](Self::record) calls emit indices
/// `1..=N` in artifact names, restarting at 1 in a new process.
///
/// [`record`](Self::record) takes `&mut self`, so one recorder cannot race
/// against itself; callers sharing a recorder across tasks wrap it in a lock.
#[derive(Debug)]
pub struct SnapshotRecorder<S: ObjectGraph> {
    source: S,
    storage: Storage,
    indices: FxHashMap<String, u64>,
}

impl<S: ObjectGraph> SnapshotRecorder<S> {
    /// Creates a recorder with fresh per-label indices.
    #[must_use]
    pub fn new(source: S, storage: Storage) -> Self {
        Self { source, storage, indices: FxHashMap::default() }
    }

    /// The index the next [`record`](Self::record) call would emit for `label`.
    #[must_use]
    pub fn next_index(&self, label: &str) -> u64 {
        self.indices.get(label).copied().unwrap_or(0) + 1
    }

    /// Takes one snapshot.
    ///
    /// Queries the capability for objects created since the previous snapshot
    /// (resetting its baseline), logs and persists the summary table, then
    /// renders back-reference graphs for the types with the most new objects.
    /// Artifacts are named `{label}_{pid}_{index}` under
    /// [`SnapshotConfig::dump_dir`]:
    ///
    /// - `{stem}.txt`: the summary table, always written;
    /// - `{stem}_{type}_backrefs.dot`: per graphed type;
    /// - `{stem}_{type}_refs.dot`: per graphed type, only when
    ///   `graph_forward_refs` is set.
    ///
    /// # Errors
    ///
    /// Introspection and storage failures propagate unhandled. The snapshot
    /// index is taken right after the initial query succeeds, so a later
    /// failure still consumes it; a failure of the initial query does not.
    pub async fn record(&mut self, config: &SnapshotConfig) -> Result<(), DiagnosticsError> {
        let mut rows =
            self.source.new_object_ids(config.max_console_rows, CreationOrder::OldestFirst)?;

        let summary = render_summary(&rows);
        info!("{summary}");

        let counter = self.indices.entry(config.label.clone()).or_insert(0);
        *counter += 1;
        let index = *counter;

        let stem = format!("{}_{}_{}", config.label, std::process::id(), index);
        let summary_path = config.dump_dir.join(format!("{stem}.txt"));
        self.storage.save(&summary_path, summary.as_bytes()).await?;
        info!(path = %self.storage.resolve(&summary_path)?.display(), "Snapshot summary saved");

        if !config.show_graphs {
            return Ok(());
        }

        // Stable, so equal counts keep the capability's creation order.
        rows.sort_by_key(|row| Reverse(row.count()));

        for row in rows.iter().take(config.max_graphed_types) {
            if row.object_ids.is_empty() || config.ignored_types.contains(&row.type_name) {
                continue;
            }

            let sample = &row.object_ids[..row.object_ids.len().min(config.max_objects_per_type)];
            let objects = self.source.resolve_objects(sample)?;

            let rendered = self.source.render_back_references(&objects, config.back_refs_depth)?;
            let path = config.dump_dir.join(format!("{stem}_{}_backrefs.dot", row.type_name));
            self.storage.save(&path, rendered.as_bytes()).await?;
            info!(path = %self.storage.resolve(&path)?.display(), "Back-reference graph saved");

            if config.graph_forward_refs {
                let rendered =
                    self.source.render_forward_references(&objects, config.refs_depth)?;
                let path = config.dump_dir.join(format!("{stem}_{}_refs.dot", row.type_name));
                self.storage.save(&path, rendered.as_bytes()).await?;
                info!(path = %self.storage.resolve(&path)?.display(), "Forward-reference graph saved");
            }
        }

        Ok(())
    }
}

/// Renders the aligned type/count table with a UTC capture timestamp.
fn render_summary(rows: &[TypeDelta]) -> String {
    let captured = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let name_width =
        rows.iter().map(|row| row.type_name.len()).fold(TOTAL_LABEL.len(), usize::max);
    let total: usize = rows.iter().map(TypeDelta::count).sum();

    let mut out = format!("New objects since last snapshot (captured {captured})\n");
    for row in rows {
        let _ = writeln!(out, "{:<name_width$}  {:>8}", row.type_name, row.count());
    }
    let _ = writeln!(out, "{TOTAL_LABEL:<name_width$}  {total:>8}");
    out
}
