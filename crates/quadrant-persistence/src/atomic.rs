//! Atomic file operations for crash-safe persistence.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::{PersistenceError, Result};

/// Creates `dir` (and parents) if missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| PersistenceError::DirectoryError {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Writes `data` into a temp file next to `path`, flushed and ready to persist.
fn stage(path: &Path, data: &[u8]) -> Result<NamedTempFile> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    // Same directory keeps the rename on one filesystem
    let dir = path.parent().unwrap_or(Path::new("."));
    let write_err = |source| PersistenceError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let mut temp_file = NamedTempFile::new_in(dir).map_err(write_err)?;
    temp_file.write_all(data).map_err(write_err)?;
    temp_file.as_file().sync_all().map_err(write_err)?;
    Ok(temp_file)
}

/// Writes data to a file atomically, replacing any existing file.
///
/// The file is never observed in a partially written state, even if the
/// process crashes mid-write.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    stage(path, data)?
        .persist(path)
        .map_err(|e| PersistenceError::WriteError {
            path: path.to_path_buf(),
            source: e.error,
        })?;
    Ok(())
}

/// Writes data to a new file atomically, failing if `path` already exists.
///
/// Used for append-only records: an existing file is never overwritten.
pub fn atomic_create(path: &Path, data: &[u8]) -> Result<()> {
    stage(path, data)?.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            PersistenceError::AlreadyExists {
                kind: "file".to_string(),
                id: path.display().to_string(),
            }
        } else {
            PersistenceError::WriteError {
                path: path.to_path_buf(),
                source: e.error,
            }
        }
    })?;
    Ok(())
}

/// Writes JSON data to a file atomically.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json.as_bytes())
}

/// Writes JSON data to a new file atomically, refusing to overwrite.
pub fn atomic_create_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_create(path, json.as_bytes())
}

/// Reads and deserializes JSON from a file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).map_err(|source| PersistenceError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&data)?;
    Ok(value)
}

/// Reads JSON from a file, returning None if the file doesn't exist.
pub fn read_json_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

/// Reads every `*.json` file in `dir`.
///
/// A missing directory yields an empty list. Files that fail to parse are
/// logged and skipped so one corrupt record cannot hide the rest.
pub fn read_json_dir<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let read_err = |source| PersistenceError::ReadError {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut values = Vec::with_capacity(paths.len());
    for path in paths {
        match read_json::<T>(&path) {
            Ok(value) => values.push(value),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable record"),
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Ledger {
        name: String,
        high_water: u32,
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir/test.txt");

        atomic_write(&path, b"nested content").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "nested content");
    }

    #[test]
    fn test_atomic_write_replaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ranks.json");

        atomic_write(&path, b"one").unwrap();
        atomic_write(&path, b"two").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
    }

    #[test]
    fn test_atomic_create_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("record.json");

        atomic_create(&path, b"first").unwrap();
        let second = atomic_create(&path, b"second");

        assert!(matches!(second, Err(PersistenceError::AlreadyExists { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");
    }

    #[test]
    fn test_read_json_optional() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let missing: Option<Ledger> = read_json_optional(&path).unwrap();
        assert!(missing.is_none());

        let data = Ledger {
            name: "tasks".to_string(),
            high_water: 9,
        };
        atomic_write_json(&path, &data).unwrap();

        let found: Option<Ledger> = read_json_optional(&path).unwrap();
        assert_eq!(found, Some(data));
    }

    #[test]
    fn test_read_json_dir_skips_corrupt_files() {
        let dir = tempdir().unwrap();
        let good = Ledger {
            name: "ok".to_string(),
            high_water: 1,
        };
        atomic_write_json(&dir.path().join("a.json"), &good).unwrap();
        atomic_write(&dir.path().join("b.json"), b"{ not json").unwrap();
        atomic_write(&dir.path().join("notes.txt"), b"ignored").unwrap();

        let values: Vec<Ledger> = read_json_dir(dir.path()).unwrap();
        assert_eq!(values, vec![good]);

        let none: Vec<Ledger> = read_json_dir(&dir.path().join("missing")).unwrap();
        assert!(none.is_empty());
    }
}
