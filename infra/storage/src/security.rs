use crate::error::StorageError;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Joins a caller-supplied relative path to the sandbox root and proves the
/// result cannot escape it.
///
/// Two layers of defense: a lexical pass that rejects absolute components and
/// `..` underflow before anything touches the filesystem, then a canonical
/// check that catches symlinks pointing outside the root. Paths that do not
/// exist yet are validated through their first existing ancestor, so callers
/// may resolve targets in directories that will only be created on write.
pub(crate) fn resolve_path(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let requested = path.as_ref();
    let joined = root.join(lexical_normalize(requested)?);

    match joined.canonicalize() {
        Ok(canonical) if canonical.starts_with(root) => Ok(canonical),
        Ok(canonical) => Err(escape(&canonical, "Canonical path leaves the sandbox root")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            validate_unborn(root, &joined)?;
            Ok(joined)
        },
        Err(e) => Err(StorageError::Io { source: e, context: None }),
    }
}

/// Collapses `.` and `..` without touching the filesystem.
///
/// `..` is tolerated while there is a previous segment to cancel; one step
/// past the sandbox base is a traversal attempt. Absolute components are
/// rejected outright.
fn lexical_normalize(path: &Path) -> Result<PathBuf, StorageError> {
    let mut kept: Vec<&OsStr> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::Normal(segment) => kept.push(segment),
            Component::ParentDir => {
                kept.pop().ok_or_else(|| escape(path, "Too many '..' segments"))?;
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(escape(path, "Absolute paths are not allowed in the sandbox"));
            },
        }
    }

    Ok(kept.into_iter().collect())
}

/// Clears a target that does not exist yet.
///
/// Walks the ancestor chain until it meets the root or an existing directory;
/// the first existing ancestor is canonicalized so a symlinked parent cannot
/// smuggle the write outside the sandbox. Intermediate directories are allowed
/// to be missing.
fn validate_unborn(root: &Path, joined: &Path) -> Result<(), StorageError> {
    if !joined.starts_with(root) {
        return Err(escape(joined, "Path is outside the sandbox"));
    }

    for ancestor in joined.ancestors() {
        if ancestor == root {
            return Ok(());
        }
        if !ancestor.exists() {
            continue;
        }
        return match ancestor.canonicalize() {
            Ok(canonical) if canonical.starts_with(root) => Ok(()),
            Ok(_) => Err(escape(ancestor, "Existing parent is a symlink out of the sandbox")),
            Err(e) => Err(StorageError::Io {
                source: e,
                context: Some("Failed to verify parent directory".into()),
            }),
        };
    }

    Err(escape(joined, "No ancestor inside the sandbox"))
}

fn escape(path: &Path, reason: &'static str) -> StorageError {
    StorageError::PathTraversalAttempt {
        message: path.display().to_string().into(),
        context: Some(reason.into()),
    }
}
