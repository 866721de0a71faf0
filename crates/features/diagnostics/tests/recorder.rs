use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use studio_diagnostics::*;
use studio_domain::config::SnapshotConfig;
use studio_storage::Storage;
use tempfile::TempDir;

/// Everything the scripted capability saw, for post-run assertions, plus
/// armable failure counters.
#[derive(Default)]
struct GraphLog {
    limits: Vec<usize>,
    orders: Vec<CreationOrder>,
    resolved_batch_sizes: Vec<usize>,
    back_depths: Vec<usize>,
    forward_depths: Vec<usize>,
    fail_queries: usize,
    fail_renders: usize,
}

/// Scripted stand-in for the heap introspection library: pops one prepared
/// row batch per snapshot and logs every call it receives.
struct ScriptedGraph {
    batches: VecDeque<Vec<TypeDelta>>,
    log: Arc<Mutex<GraphLog>>,
}

impl ScriptedGraph {
    fn new(batches: Vec<Vec<TypeDelta>>) -> (Self, Arc<Mutex<GraphLog>>) {
        let log = Arc::new(Mutex::new(GraphLog::default()));
        (Self { batches: batches.into(), log: Arc::clone(&log) }, log)
    }
}

impl ObjectGraph for ScriptedGraph {
    type Object = ObjectId;

    fn new_object_ids(
        &mut self,
        limit: usize,
        order: CreationOrder,
    ) -> Result<Vec<TypeDelta>, DiagnosticsError> {
        let mut log = self.log.lock().unwrap();
        log.limits.push(limit);
        log.orders.push(order);
        if log.fail_queries > 0 {
            log.fail_queries -= 1;
            return Err(DiagnosticsError::Introspection {
                message: "object graph unavailable".into(),
                context: None,
            });
        }
        Ok(self.batches.pop_front().unwrap_or_default())
    }

    fn resolve_objects(&self, ids: &[ObjectId]) -> Result<Vec<ObjectId>, DiagnosticsError> {
        self.log.lock().unwrap().resolved_batch_sizes.push(ids.len());
        Ok(ids.to_vec())
    }

    fn render_back_references(
        &self,
        objects: &[ObjectId],
        max_depth: usize,
    ) -> Result<String, DiagnosticsError> {
        let mut log = self.log.lock().unwrap();
        log.back_depths.push(max_depth);
        if log.fail_renders > 0 {
            log.fail_renders -= 1;
            return Err(DiagnosticsError::Introspection {
                message: "render failed".into(),
                context: None,
            });
        }
        Ok(format!("digraph backrefs {{ roots = {} }}", objects.len()))
    }

    fn render_forward_references(
        &self,
        objects: &[ObjectId],
        max_depth: usize,
    ) -> Result<String, DiagnosticsError> {
        self.log.lock().unwrap().forward_depths.push(max_depth);
        Ok(format!("digraph refs {{ roots = {} }}", objects.len()))
    }
}

async fn storage_at(root: &Path) -> Storage {
    Storage::builder().root(root).connect().await.unwrap()
}

fn leak_test_config() -> SnapshotConfig {
    SnapshotConfig { label: "leak_test".to_owned(), ..SnapshotConfig::default() }
}

fn artifact_names(root: &Path) -> Vec<String> {
    let dump = root.join("memory_graphs");
    if !dump.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = std::fs::read_dir(&dump)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn artifact_text(root: &Path, name: &str) -> String {
    std::fs::read_to_string(root.join("memory_graphs").join(name)).unwrap()
}

#[tokio::test]
async fn sequential_records_emit_indices_one_to_n() {
    let temp = TempDir::new().unwrap();
    let (graph, _log) = ScriptedGraph::new(vec![
        vec![TypeDelta::new("dict", vec![1])],
        vec![TypeDelta::new("dict", vec![2])],
        vec![TypeDelta::new("dict", vec![3])],
    ]);
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    let config = SnapshotConfig { show_graphs: false, ..leak_test_config() };
    for _ in 0..3 {
        recorder.record(&config).await.unwrap();
    }

    let pid = std::process::id();
    assert_eq!(
        artifact_names(temp.path()),
        vec![
            format!("leak_test_{pid}_1.txt"),
            format!("leak_test_{pid}_2.txt"),
            format!("leak_test_{pid}_3.txt"),
        ]
    );
    assert_eq!(recorder.next_index("leak_test"), 4);
}

#[tokio::test]
async fn labels_keep_independent_indices() {
    let temp = TempDir::new().unwrap();
    let (graph, _log) = ScriptedGraph::new(vec![Vec::new(), Vec::new(), Vec::new()]);
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    let first = SnapshotConfig { label: "heap".to_owned(), show_graphs: false, ..SnapshotConfig::default() };
    let second = SnapshotConfig { label: "sockets".to_owned(), show_graphs: false, ..SnapshotConfig::default() };

    recorder.record(&first).await.unwrap();
    recorder.record(&second).await.unwrap();
    recorder.record(&first).await.unwrap();

    let pid = std::process::id();
    assert_eq!(
        artifact_names(temp.path()),
        vec![
            format!("heap_{pid}_1.txt"),
            format!("heap_{pid}_2.txt"),
            format!("sockets_{pid}_1.txt"),
        ]
    );
}

#[tokio::test]
async fn graphs_disabled_produces_exactly_one_artifact() {
    let temp = TempDir::new().unwrap();
    let (graph, log) = ScriptedGraph::new(vec![vec![
        TypeDelta::new("dict", vec![1, 2, 3]),
        TypeDelta::new("list", vec![4, 5]),
    ]]);
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    let config = SnapshotConfig { show_graphs: false, ..leak_test_config() };
    recorder.record(&config).await.unwrap();

    let names = artifact_names(temp.path());
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with(".txt"));
    assert!(log.lock().unwrap().resolved_batch_sizes.is_empty(), "nothing may be resolved");
}

#[tokio::test]
async fn summary_lists_types_and_total() {
    let temp = TempDir::new().unwrap();
    let (graph, _log) = ScriptedGraph::new(vec![vec![
        TypeDelta::new("dict", vec![1, 2, 3]),
        TypeDelta::new("list", vec![4, 5]),
    ]]);
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    let config = SnapshotConfig { show_graphs: false, ..leak_test_config() };
    recorder.record(&config).await.unwrap();

    let names = artifact_names(temp.path());
    let summary = artifact_text(temp.path(), &names[0]);
    assert!(summary.contains("dict"));
    assert!(summary.contains("list"));
    assert!(summary.lines().last().unwrap().starts_with("total"));
    assert!(summary.lines().last().unwrap().ends_with(" 5"));
}

#[tokio::test]
async fn ignored_types_are_never_graphed() {
    let temp = TempDir::new().unwrap();
    let (graph, _log) = ScriptedGraph::new(vec![vec![
        TypeDelta::new("set", vec![1, 2, 3, 4, 5, 6]),
        TypeDelta::new("dict", vec![7, 8]),
    ]]);
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    recorder.record(&leak_test_config()).await.unwrap();

    let names = artifact_names(temp.path());
    let dots: Vec<&String> = names.iter().filter(|n| n.ends_with(".dot")).collect();
    let pid = std::process::id();
    assert_eq!(dots, vec![&format!("leak_test_{pid}_1_dict_backrefs.dot")]);
}

#[tokio::test]
async fn ignored_rows_still_consume_graph_slots() {
    let temp = TempDir::new().unwrap();
    let (graph, _log) = ScriptedGraph::new(vec![vec![
        TypeDelta::new("set", vec![1, 2, 3]),
        TypeDelta::new("dict", vec![4]),
    ]]);
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    let config = SnapshotConfig { max_graphed_types: 1, ..leak_test_config() };
    recorder.record(&config).await.unwrap();

    let names = artifact_names(temp.path());
    assert!(
        !names.iter().any(|n| n.ends_with(".dot")),
        "the ignored top type must use up the only slot: {names:?}"
    );
}

#[tokio::test]
async fn only_top_types_by_count_are_graphed() {
    let temp = TempDir::new().unwrap();
    let (graph, _log) = ScriptedGraph::new(vec![vec![
        TypeDelta::new("A", vec![1, 2, 3]),
        TypeDelta::new("B", vec![1]),
    ]]);
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    let config = SnapshotConfig { max_graphed_types: 1, ..leak_test_config() };
    recorder.record(&config).await.unwrap();

    let names = artifact_names(temp.path());
    let pid = std::process::id();
    assert!(names.contains(&format!("leak_test_{pid}_1_A_backrefs.dot")));
    assert!(!names.iter().any(|n| n.contains("_B_")));
}

#[tokio::test]
async fn equal_counts_break_ties_by_row_order() {
    let temp = TempDir::new().unwrap();
    let (graph, _log) = ScriptedGraph::new(vec![vec![
        TypeDelta::new("first", vec![1]),
        TypeDelta::new("second", vec![2]),
    ]]);
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    let config = SnapshotConfig { max_graphed_types: 1, ..leak_test_config() };
    recorder.record(&config).await.unwrap();

    let names = artifact_names(temp.path());
    assert!(names.iter().any(|n| n.contains("_first_")));
    assert!(!names.iter().any(|n| n.contains("_second_")));
}

#[tokio::test]
async fn resolved_objects_are_capped_per_type() {
    let temp = TempDir::new().unwrap();
    let (graph, log) =
        ScriptedGraph::new(vec![vec![TypeDelta::new("dict", (1..=10).collect())]]);
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    recorder.record(&leak_test_config()).await.unwrap();

    assert_eq!(log.lock().unwrap().resolved_batch_sizes, vec![5]);

    let pid = std::process::id();
    let dot = artifact_text(temp.path(), &format!("leak_test_{pid}_1_dict_backrefs.dot"));
    assert!(dot.contains("roots = 5"));
}

#[tokio::test]
async fn second_call_names_artifacts_with_index_two() {
    let temp = TempDir::new().unwrap();
    let (graph, _log) = ScriptedGraph::new(vec![
        vec![TypeDelta::new("dict", vec![1])],
        vec![TypeDelta::new("dict", vec![2])],
    ]);
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    let config = leak_test_config();
    recorder.record(&config).await.unwrap();
    recorder.record(&config).await.unwrap();

    let names = artifact_names(temp.path());
    let pid = std::process::id();
    assert!(names.contains(&format!("leak_test_{pid}_2.txt")));
    assert!(names.contains(&format!("leak_test_{pid}_2_dict_backrefs.dot")));
}

#[tokio::test]
async fn forward_graphs_are_skipped_by_default() {
    let temp = TempDir::new().unwrap();
    let (graph, log) = ScriptedGraph::new(vec![vec![TypeDelta::new("dict", vec![1])]]);
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    recorder.record(&leak_test_config()).await.unwrap();

    assert!(!artifact_names(temp.path()).iter().any(|n| n.ends_with("_refs.dot")));
    assert!(log.lock().unwrap().forward_depths.is_empty(), "must not even be rendered");
    assert_eq!(log.lock().unwrap().back_depths, vec![8]);
}

#[tokio::test]
async fn forward_graphs_are_written_when_enabled() {
    let temp = TempDir::new().unwrap();
    let (graph, log) = ScriptedGraph::new(vec![vec![TypeDelta::new("dict", vec![1])]]);
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    let config = SnapshotConfig { graph_forward_refs: true, ..leak_test_config() };
    recorder.record(&config).await.unwrap();

    let names = artifact_names(temp.path());
    let pid = std::process::id();
    assert!(names.contains(&format!("leak_test_{pid}_1_dict_backrefs.dot")));
    assert!(names.contains(&format!("leak_test_{pid}_1_dict_refs.dot")));
    assert_eq!(log.lock().unwrap().forward_depths, vec![3]);
}

#[tokio::test]
async fn capability_receives_row_limit_and_creation_order() {
    let temp = TempDir::new().unwrap();
    let (graph, log) = ScriptedGraph::new(vec![Vec::new()]);
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    let config = SnapshotConfig { max_console_rows: 7, show_graphs: false, ..leak_test_config() };
    recorder.record(&config).await.unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.limits, vec![7]);
    assert_eq!(log.orders, vec![CreationOrder::OldestFirst]);
}

#[tokio::test]
async fn failed_initial_query_does_not_consume_an_index() {
    let temp = TempDir::new().unwrap();
    let (graph, log) = ScriptedGraph::new(vec![vec![TypeDelta::new("dict", vec![1])]]);
    log.lock().unwrap().fail_queries = 1;
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    let config = leak_test_config();
    let err = recorder.record(&config).await.expect_err("armed query failure");
    assert!(matches!(err, DiagnosticsError::Introspection { .. }));
    assert_eq!(recorder.next_index("leak_test"), 1);
    assert!(artifact_names(temp.path()).is_empty());

    recorder.record(&config).await.unwrap();

    let pid = std::process::id();
    assert!(artifact_names(temp.path()).contains(&format!("leak_test_{pid}_1.txt")));
}

#[tokio::test]
async fn failed_render_still_consumes_the_index() {
    let temp = TempDir::new().unwrap();
    let (graph, log) = ScriptedGraph::new(vec![
        vec![TypeDelta::new("dict", vec![1])],
        vec![TypeDelta::new("dict", vec![2])],
    ]);
    log.lock().unwrap().fail_renders = 1;
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    let config = leak_test_config();
    let err = recorder.record(&config).await.expect_err("armed render failure");
    assert!(matches!(err, DiagnosticsError::Introspection { .. }));
    assert_eq!(recorder.next_index("leak_test"), 2, "summary was taken, index is spent");

    let pid = std::process::id();
    let names = artifact_names(temp.path());
    assert!(names.contains(&format!("leak_test_{pid}_1.txt")));
    assert!(!names.iter().any(|n| n.ends_with(".dot")));

    recorder.record(&config).await.unwrap();
    let names = artifact_names(temp.path());
    assert!(names.contains(&format!("leak_test_{pid}_2.txt")));
    assert!(names.contains(&format!("leak_test_{pid}_2_dict_backrefs.dot")));
}

#[tokio::test]
async fn empty_rows_are_not_graphed() {
    let temp = TempDir::new().unwrap();
    let (graph, log) = ScriptedGraph::new(vec![vec![
        TypeDelta::new("dict", Vec::new()),
        TypeDelta::new("list", vec![1]),
    ]]);
    let mut recorder = SnapshotRecorder::new(graph, storage_at(temp.path()).await);

    recorder.record(&leak_test_config()).await.unwrap();

    let names = artifact_names(temp.path());
    assert!(!names.iter().any(|n| n.contains("_dict_")));
    assert!(names.iter().any(|n| n.contains("_list_")));
    assert_eq!(log.lock().unwrap().resolved_batch_sizes, vec![1]);
}
