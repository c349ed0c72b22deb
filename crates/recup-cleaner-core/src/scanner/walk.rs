use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Every regular file under `dir`, nested subdirectories included, in a stable
/// name order. Entries that vanish or cannot be read mid-walk are skipped.
pub fn walk_files(dir: &Path) -> impl Iterator<Item = PathBuf> {
    let root = dir.to_path_buf();
    WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                if is_vanished(&err) {
                    debug!("Entry vanished while walking {}: {}", root.display(), err);
                } else {
                    warn!("Error walking {}: {}", root.display(), err);
                }
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
}

/// Entries removed by someone else between listing and visiting are routine.
fn is_vanished(err: &walkdir::Error) -> bool {
    err.io_error()
        .map_or(false, |e| e.kind() == io::ErrorKind::NotFound)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub stem: String,
    pub extension: String,
    pub size: u64,
}

/// Regular files directly inside `dir` (not recursive), sorted by name.
/// A path that is not a directory yields an empty list.
pub fn list_files(dir: &Path) -> Vec<FileSummary> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Error reading directory {}: {}", dir.display(), err);
            return Vec::new();
        }
    };

    let mut files: Vec<(String, FileSummary)> = entries
        .flatten()
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let extension = path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default();
            Some((
                name,
                FileSummary {
                    stem,
                    extension,
                    size: metadata.len(),
                },
            ))
        })
        .collect();

    files.sort_by(|a, b| a.0.cmp(&b.0));
    files.into_iter().map(|(_, summary)| summary).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_walk_files_recurses() {
        let tmp = tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join("top.jpg"), "1").unwrap();
        fs::write(nested.join("deep.pdf"), "2").unwrap();

        let files: Vec<PathBuf> = walk_files(tmp.path()).collect();
        assert_eq!(files.len(), 2);
        assert!(files.contains(&nested.join("deep.pdf")));
    }

    #[test]
    fn test_walk_missing_dir_counts_as_vanished() {
        let tmp = tempdir().unwrap();
        let missing = tmp.path().join("gone");

        let err = WalkDir::new(&missing)
            .into_iter()
            .find_map(|entry| entry.err())
            .unwrap();
        assert!(is_vanished(&err));
        assert_eq!(walk_files(&missing).count(), 0);
    }

    #[test]
    fn test_walk_unreadable_root_is_not_vanished() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        // Descending into a regular file fails with something other than
        // NotFound.
        let err = WalkDir::new(file.join("child"))
            .into_iter()
            .find_map(|entry| entry.err())
            .unwrap();
        assert!(!is_vanished(&err));
    }

    #[test]
    fn test_list_files_is_flat() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub").join("hidden.txt"), "x").unwrap();
        fs::write(tmp.path().join("f1.jpg"), "12345").unwrap();
        fs::write(tmp.path().join("noext"), "").unwrap();

        let files = list_files(tmp.path());
        assert_eq!(
            files,
            vec![
                FileSummary {
                    stem: "f1".to_string(),
                    extension: "jpg".to_string(),
                    size: 5,
                },
                FileSummary {
                    stem: "noext".to_string(),
                    extension: String::new(),
                    size: 0,
                },
            ]
        );
    }

    #[test]
    fn test_list_files_on_non_directory() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("f.txt");
        fs::write(&file, "x").unwrap();
        assert!(list_files(&file).is_empty());
    }
}
