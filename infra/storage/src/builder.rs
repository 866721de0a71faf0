use crate::engine::{Compression, Storage, StorageInner};
use crate::error::{StorageError, StorageErrorExt};
use private::Sealed;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

#[derive(Debug)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

/// Typestate builder for the storage engine.
///
/// `compression` and `create` may be set in any order; `connect` becomes
/// available immediately (falling back to a scratch root) or after `root`
/// pins the sandbox to an explicit directory.
#[allow(private_bounds)]
#[derive(Debug)]
pub struct StorageBuilder<S: Sealed = NoRoot> {
    state: S,
    compression: Compression,
    create: bool,
}

impl Default for StorageBuilder<NoRoot> {
    fn default() -> Self {
        Self { state: NoRoot, compression: Compression::None, create: true }
    }
}

#[allow(private_bounds)]
impl<S: Sealed> StorageBuilder<S> {
    /// Selects the payload encoding (plain bytes by default).
    #[must_use = "the engine only comes up once connect() runs"]
    pub const fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Whether a missing root directory is created on connect (on by default).
    #[must_use = "the engine only comes up once connect() runs"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.create = enable;
        self
    }
}

impl StorageBuilder<NoRoot> {
    #[must_use = "the engine only comes up once connect() runs"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the sandbox to an explicit root directory.
    pub fn root(self, path: impl Into<PathBuf>) -> StorageBuilder<WithRoot> {
        StorageBuilder {
            state: WithRoot(path.into()),
            compression: self.compression,
            create: self.create,
        }
    }

    /// Connects rooted in the platform scratch directory.
    ///
    /// Shorthand for `.root(std::env::temp_dir().join("studio")).connect()`,
    /// which keeps diagnostic dumps out of the project tree when no explicit
    /// root is configured.
    ///
    /// # Errors
    /// Propagates the same errors as the rooted `connect`.
    pub async fn connect(self) -> Result<Storage, StorageError> {
        let scratch = std::env::temp_dir().join("studio");
        self.root(scratch).connect().await
    }
}

impl StorageBuilder<WithRoot> {
    /// Brings the engine up under the configured root.
    ///
    /// The root is created when allowed, canonicalized so later containment
    /// checks compare against the physical directory rather than a symlink,
    /// and swept for staged tmp files abandoned by earlier crashes. The sweep
    /// is best-effort: a failure there logs a warning and never blocks the
    /// connect.
    ///
    /// # Errors
    /// [`StorageError::DirectoryNotFound`] when the root is missing and
    /// `create(false)` was set; [`StorageError::Io`] when the directory cannot
    /// be created or canonicalized.
    pub async fn connect(self) -> Result<Storage, StorageError> {
        let root = bootstrap(&self.state.0, self.create).await?;

        let storage = Storage {
            inner: Arc::new(StorageInner {
                root,
                compression: self.compression,
                tmp_counter: AtomicU64::new(1),
            }),
        };

        storage.purge_tmp().await;

        Ok(storage)
    }
}

/// Ensures the root exists (or refuses) and returns its canonical form.
async fn bootstrap(root: &Path, create: bool) -> Result<PathBuf, StorageError> {
    if create {
        fs::create_dir_all(root)
            .await
            .context(format!("Failed to bootstrap storage root: {}", root.display()))?;
        info!(path = %root.display(), "Bootstrapped storage root");
    } else if !fs::try_exists(root).await.unwrap_or(false) {
        return Err(StorageError::DirectoryNotFound {
            message: root.display().to_string().into(),
            context: Some("Storage root is missing and auto-creation is disabled".into()),
        });
    }

    fs::canonicalize(root)
        .await
        .context(format!("Failed to resolve storage root: {}", root.display()))
}
