//! The storage engine: sandboxed paths, atomic writes, optional compression.
//!
//! [`Storage`] is the handle everything else hangs off. It owns the canonical
//! sandbox root, funnels every caller path through the security resolver, and
//! keeps artifact writes crash-safe with a stage-then-rename protocol.

use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance;
use crate::security;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// On-disk encoding of artifact payloads.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    None,
    Lz4,
}

impl Compression {
    fn encode(self, payload: &[u8]) -> Vec<u8> {
        match self {
            Self::None => payload.to_vec(),
            Self::Lz4 => lz4_flex::compress_prepend_size(payload),
        }
    }

    fn decode(self, raw: &[u8]) -> Result<Vec<u8>, StorageError> {
        match self {
            Self::None => Ok(raw.to_vec()),
            Self::Lz4 => lz4_flex::decompress_size_prepended(raw).context("Lz4 payload rejected"),
        }
    }
}

/// State shared by every clone of a [`Storage`] handle.
#[derive(Debug)]
pub struct StorageInner {
    /// Canonicalized sandbox root; every resolved path must stay below it.
    pub(crate) root: PathBuf,
    /// Payload encoding applied transparently on save and load.
    pub(crate) compression: Compression,
    /// Distinguishes concurrent in-flight writes to the same target.
    pub(crate) tmp_counter: AtomicU64,
}

impl StorageInner {
    /// Sibling path for the staged copy of `target`, carrying the tmp marker
    /// the maintenance sweeper looks for.
    fn tmp_sibling(&self, target: &Path) -> PathBuf {
        let serial = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let stem = target.file_name().and_then(|s| s.to_str()).unwrap_or("storage");
        target.with_file_name(format!("{stem}{}{serial}", maintenance::TMP_MARKER))
    }
}

/// Cheaply cloneable handle to a sandboxed artifact store.
///
/// All operations take sandbox-relative paths; anything that would resolve
/// outside the root is refused before the filesystem is touched. Saves go
/// through a staged temporary file plus `fsync` and land via rename, so a
/// crash never leaves a half-written artifact under the final name.
///
/// ```rust
/// use studio_storage::{Compression, Storage, StorageError};
///
/// #[tokio::main]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     # let root = tmp.path().join("artifacts");
///     let storage =
///         Storage::builder().root(&root).compression(Compression::Lz4).connect().await?;
///
///     storage.save("memory_leaks/report_1.txt", b"12 retained dicts").await?;
///     assert!(storage.exists("memory_leaks/report_1.txt")?);
///
///     let report = storage.load("memory_leaks/report_1.txt").await?;
///     assert_eq!(report, b"12 retained dicts");
///
///     storage.delete("memory_leaks/report_1.txt").await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    #[must_use = "the engine only comes up once connect() runs"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// Maps a sandbox-relative path to its physical location.
    ///
    /// The translation is the security chokepoint shared by every operation:
    /// lexical `..`/absolute rejection first, then a canonical containment
    /// check against the root (via the first existing ancestor for paths that
    /// do not exist yet).
    ///
    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] when the path would leave the
    /// sandbox; [`StorageError::Io`] when the filesystem check itself fails.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::resolve_path(&self.root, path)
    }

    /// Reads a whole artifact, decoding it per the configured [`Compression`].
    ///
    /// # Errors
    /// [`StorageError::FileNotFound`] for a missing artifact,
    /// [`StorageError::Decompress`] for a payload the decoder rejects, plus
    /// the usual resolution and I/O failures.
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve(path)?;
        let raw =
            fs::read(&resolved).await.map_err(|e| classify(e, &resolved, "Read failed"))?;
        self.compression.decode(&raw)
    }

    /// Writes a whole artifact atomically, creating parent directories.
    ///
    /// The payload is encoded, staged to a uniquely named sibling tmp file,
    /// `fsync`ed, and renamed over the target. Platforms that refuse to rename
    /// onto an existing file get a remove-then-rename fallback, and the parent
    /// directory is synced afterwards so the entry itself is durable.
    ///
    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] for paths outside the sandbox;
    /// [`StorageError::Io`] when staging, syncing, or the swap fails.
    pub async fn save(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create parents for {}", resolved.display()))?;
        }

        let staged = self.tmp_sibling(&resolved);
        stage(&staged, &self.compression.encode(data)).await?;
        promote(&staged, &resolved).await?;

        if let Some(parent) = resolved.parent() {
            fsync_dir(parent).await;
        }

        debug!(path = %resolved.display(), "Artifact saved atomically");
        Ok(())
    }

    /// Removes an artifact.
    ///
    /// # Errors
    /// [`StorageError::FileNotFound`] when there is nothing to remove, plus
    /// resolution and I/O failures.
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;
        fs::remove_file(&resolved)
            .await
            .map_err(|e| classify(e, &resolved, "Delete failed"))?;
        debug!(path = %resolved.display(), "Artifact deleted");
        Ok(())
    }

    /// Whether an artifact currently exists under the given sandbox path.
    ///
    /// # Errors
    /// Only resolution failures surface here; a missing file is `Ok(false)`.
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.resolve(path)?.exists())
    }

    /// Sweeps stale staged tmp files out of the sandbox.
    ///
    /// Runs automatically during `connect`; exposed for manual housekeeping
    /// in long-lived processes.
    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root).await;
    }
}

/// Stages the encoded payload under the tmp name and forces it to disk.
async fn stage(staged: &Path, payload: &[u8]) -> Result<(), StorageError> {
    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(staged)
        .await
        .context(format!("Staging failed: {}", staged.display()))?;
    file.write_all(payload).await.context("Write failed")?;
    file.sync_all().await.context("Hardware sync failed")?;
    Ok(())
}

/// Renames the staged file over the target, tolerating platforms where the
/// target must be removed first.
async fn promote(staged: &Path, target: &Path) -> Result<(), StorageError> {
    let Err(err) = fs::rename(staged, target).await else {
        return Ok(());
    };

    if err.kind() != std::io::ErrorKind::AlreadyExists {
        return Err(StorageError::Io {
            source: err,
            context: Some(swap_context(staged, target).into()),
        });
    }

    fs::remove_file(target)
        .await
        .context(format!("Failed to displace existing file: {}", target.display()))?;
    fs::rename(staged, target).await.context(swap_context(staged, target))?;
    Ok(())
}

fn swap_context(staged: &Path, target: &Path) -> String {
    format!("Atomic swap failed: {} -> {}", staged.display(), target.display())
}

/// Makes the directory entry created by a rename durable. Failure is logged,
/// not propagated, because the artifact bytes themselves are already synced.
async fn fsync_dir(path: &Path) {
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(err) = dir.sync_all().await {
                tracing::warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Directory open failed");
        },
    }
}

fn classify(err: std::io::Error, path: &Path, action: &'static str) -> StorageError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StorageError::FileNotFound { message: path.display().to_string().into(), context: None }
    } else {
        StorageError::Io {
            source: err,
            context: Some(format!("{action}: {}", path.display()).into()),
        }
    }
}
