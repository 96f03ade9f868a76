//! File-backed key-value backend.
//!
//! Each key is one `<key>.json` file inside a directory. Every write goes to
//! its own sibling temp file and is renamed into place, so a reader never
//! sees a half-written bucket and concurrent writers are last-writer-wins.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::KeyValueBackend;

/// Error type for the file backend.
#[derive(Debug, thiserror::Error)]
pub enum FileBackendError {
    /// Key contains characters that cannot be a file name.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Filesystem error.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

/// Backend storing each key as a JSON file in a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open a backend rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, FileBackendError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| FileBackendError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, FileBackendError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(FileBackendError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueBackend for FileBackend {
    type Error = FileBackendError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(FileBackendError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!("{key}.{}.tmp", Uuid::new_v4().simple()));
        fs::write(&tmp, value).map_err(|source| FileBackendError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            FileBackendError::Io { path, source }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        assert_eq!(backend.get("ziweiProfiles").unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path().join("nested")).unwrap();
        backend.set("tarotRecords", "[]").unwrap();
        assert_eq!(backend.get("tarotRecords").unwrap().as_deref(), Some("[]"));
        assert!(backend.dir().join("tarotRecords.json").exists());
        let leftovers: Vec<_> = fs::read_dir(backend.dir())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_overlapping_writers_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        let values: Vec<String> = (0..8).map(|i| format!("[{}]", i.to_string().repeat(100_000))).collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = values
                .iter()
                .map(|value| {
                    let backend = backend.clone();
                    scope.spawn(move || backend.set("tarotRecords", value))
                })
                .collect();
            for handle in handles {
                assert!(handle.join().unwrap().is_ok());
            }
        });

        let stored = backend.get("tarotRecords").unwrap().unwrap();
        assert!(values.contains(&stored));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        assert!(matches!(
            backend.set("../escape", "x"),
            Err(FileBackendError::InvalidKey(_))
        ));
        assert!(matches!(backend.get(""), Err(FileBackendError::InvalidKey(_))));
    }
}
