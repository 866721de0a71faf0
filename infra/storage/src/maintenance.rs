use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Marker embedded in the names of in-flight atomic write files.
pub(crate) const TMP_MARKER: &str = ".studiotmp.";

/// How long an abandoned tmp file may linger before the sweeper takes it.
const STALE_AFTER: Duration = Duration::from_secs(300);

#[derive(Default)]
struct Sweep {
    removed: usize,
    failed: usize,
}

pub(crate) async fn purge_tmp(root: &Path) {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || sweep(&root, now)).await {
        Ok(stats) if stats.removed > 0 || stats.failed > 0 => {
            info!(removed = stats.removed, failed = stats.failed, "Cleaned up temporary files");
        },
        Err(e) => error!(error = %e, "Temp file cleanup task panicked"),
        _ => {},
    }
}

/// Walks leaves first so directories emptied by the sweep fold away as well.
fn sweep(root: &Path, now: SystemTime) -> Sweep {
    let mut stats = Sweep::default();

    for entry in WalkDir::new(root).contents_first(true).into_iter().flatten() {
        if entry.path() == root {
            continue;
        }
        if entry.file_type().is_dir() {
            // Only succeeds once the directory is empty.
            let _ = std::fs::remove_dir(entry.path());
        } else if entry.file_type().is_file() && is_abandoned(&entry, now) {
            match std::fs::remove_file(entry.path()) {
                Ok(()) => stats.removed += 1,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Failed to remove tmp file");
                    stats.failed += 1;
                },
            }
        }
    }

    stats
}

/// Unreadable metadata counts as stale.
fn is_abandoned(entry: &DirEntry, now: SystemTime) -> bool {
    let is_tmp = entry
        .path()
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains(TMP_MARKER));

    is_tmp
        && std::fs::metadata(entry.path())
            .ok()
            .and_then(|m| m.modified().ok())
            .and_then(|modified| now.duration_since(modified).ok())
            .is_none_or(|age| age > STALE_AFTER)
}
