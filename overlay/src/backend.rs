//! Persistence backends for the edit store
//!
//! A backend holds exactly one serialized blob. It makes no transactional
//! promise beyond what the underlying medium gives; the store treats every
//! failure here as recoverable.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Errors raised by a persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage quota exceeded: {attempted} bytes (limit {limit})")]
    QuotaExceeded { limit: usize, attempted: usize },

    #[error("storage unavailable: {message}")]
    Unavailable { message: String },
}

/// Raw read/write access to the single stored blob.
pub trait PersistenceBackend {
    /// Read the blob, `None` when nothing has been stored yet
    fn read(&self) -> Result<Option<String>, BackendError>;

    /// Replace the blob
    fn write(&self, blob: &str) -> Result<(), BackendError>;
}

/// Blob stored in a single JSON file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceBackend for FileBackend {
    fn read(&self) -> Result<Option<String>, BackendError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically replace the file via a `.tmp` sibling.
    fn write(&self, blob: &str) -> Result<(), BackendError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, blob)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    contents: Option<String>,
    quota: Option<usize>,
    unavailable: bool,
}

/// In-process backend, cloneable so a test can keep a handle on what the
/// store wrote.
///
/// Can emulate a size quota and a disabled storage medium.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-seeded with raw contents (possibly not valid JSON).
    pub fn with_contents(contents: impl Into<String>) -> Self {
        let backend = Self::new();
        backend.lock().contents = Some(contents.into());
        backend
    }

    /// Reject writes larger than `limit` bytes.
    pub fn with_quota(self, limit: usize) -> Self {
        self.lock().quota = Some(limit);
        self
    }

    /// Make every read and write fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// What is currently stored.
    pub fn contents(&self) -> Option<String> {
        self.lock().contents.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersistenceBackend for MemoryBackend {
    fn read(&self) -> Result<Option<String>, BackendError> {
        let state = self.lock();
        if state.unavailable {
            return Err(BackendError::Unavailable {
                message: "storage disabled".to_string(),
            });
        }
        Ok(state.contents.clone())
    }

    fn write(&self, blob: &str) -> Result<(), BackendError> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(BackendError::Unavailable {
                message: "storage disabled".to_string(),
            });
        }
        if let Some(limit) = state.quota
            && blob.len() > limit
        {
            return Err(BackendError::QuotaExceeded {
                limit,
                attempted: blob.len(),
            });
        }
        state.contents = Some(blob.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_backend_reads_none_before_first_write() {
        let dir = TempDir::new().expect("temp dir");
        let backend = FileBackend::new(dir.path().join("edits.json"));
        assert!(backend.read().expect("read").is_none());
    }

    #[test]
    fn file_backend_creates_parent_dirs_and_leaves_no_tmp() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("nested").join("edits.json");
        let backend = FileBackend::new(&path);

        backend.write("{\"1\":{\"name\":\"A\"}}").expect("write");

        assert_eq!(
            backend.read().expect("read").as_deref(),
            Some("{\"1\":{\"name\":\"A\"}}")
        );
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn memory_backend_enforces_quota() {
        let backend = MemoryBackend::new().with_quota(4);
        backend.write("{}").expect("small write fits");

        let err = backend.write("{\"1\":{}}").unwrap_err();
        assert!(matches!(err, BackendError::QuotaExceeded { limit: 4, .. }));
        assert_eq!(backend.contents().as_deref(), Some("{}"));
    }

    #[test]
    fn memory_backend_clones_share_contents() {
        let backend = MemoryBackend::new();
        let handle = backend.clone();
        backend.write("{}").expect("write");
        assert_eq!(handle.contents().as_deref(), Some("{}"));

        handle.set_unavailable(true);
        assert!(matches!(
            backend.read(),
            Err(BackendError::Unavailable { .. })
        ));
    }
}
