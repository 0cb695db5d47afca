//! File reads and directory listing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PersistenceError, Result};

/// Read a file, returning `None` when it does not exist.
pub fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PersistenceError::Io {
            operation: "read",
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Paths of every `*.<extension>` file directly inside `dir`, sorted.
///
/// A missing directory lists as empty.
pub fn list_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(PersistenceError::Io {
                operation: "list",
                path: dir.to_path_buf(),
                source: e,
            });
        }
    };

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PersistenceError::Io {
            operation: "list",
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = tempdir().unwrap();
        assert!(read_if_exists(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn test_list_filters_by_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.json"), "1").unwrap();
        fs::write(dir.path().join("a.json"), "1").unwrap();
        fs::write(dir.path().join("a.json.tmp"), "1").unwrap();
        fs::write(dir.path().join("notes.txt"), "1").unwrap();

        let paths = list_with_extension(dir.path(), "json").unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        assert!(
            list_with_extension(&dir.path().join("missing"), "json")
                .unwrap()
                .is_empty()
        );
    }
}
