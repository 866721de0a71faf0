//! Sandboxed filesystem storage for diagnostic artifacts.
//!
//! Everything lives under one root directory. Relative paths map one-to-one
//! onto disk, so an operator can open any artifact by hand, but every path is
//! checked against the canonical root first and traversal out of the sandbox
//! is refused. Writes are staged and renamed with `fsync` on both file and
//! directory, payloads can go through transparent LZ4 framing, and leftover
//! staging files from crashed runs are swept on connect.
//!
//! ```rust
//! use studio_storage::{Compression, Storage, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let scratch = tempfile::tempdir().unwrap();
//!     let storage = Storage::builder()
//!         .root(scratch.path().join("artifacts"))
//!         .compression(Compression::Lz4)
//!         .connect()
//!         .await?;
//!
//!     storage.save("memory_leaks/report_1.txt", b"12 retained dicts").await?;
//!     assert_eq!(storage.load("memory_leaks/report_1.txt").await?, b"12 retained dicts");
//!     Ok(())
//! }
//! ```
//!
//! Without an explicit root the engine sandboxes itself under a `studio`
//! directory inside the system scratch space:
//!
//! ```rust,no_run
//! use studio_storage::{Storage, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     let storage = Storage::builder().connect().await?;
//!     storage.save("memory_graphs/report.txt", b"summary").await?;
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod security;

pub use builder::StorageBuilder;
pub use engine::{Compression, Storage};
pub use error::{StorageError, StorageErrorExt};
