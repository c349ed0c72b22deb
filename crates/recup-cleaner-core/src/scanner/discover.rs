use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Folder name prefix used by PhotoRec for its numbered output folders.
pub const DEFAULT_FOLDER_PREFIX: &str = "recup_dir";

/// One of the producer's numbered output folders, e.g. `recup_dir.12`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecupFolder {
    pub path: PathBuf,
    pub index: u64,
}

impl RecupFolder {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl Ord for RecupFolder {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index
            .cmp(&other.index)
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for RecupFolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// List `<prefix>.<n>` folders directly under `base_dir`, ordered by `n`.
///
/// A missing or unreadable base directory yields an empty list. Entries whose
/// suffix is not an integer are skipped.
pub fn discover_folders(base_dir: &Path, prefix: &str) -> Vec<RecupFolder> {
    let entries = match fs::read_dir(base_dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("Cannot read {}: {}", base_dir.display(), err);
            return Vec::new();
        }
    };

    let mut folders: Vec<RecupFolder> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name();
            let index = parse_folder_index(&name.to_string_lossy(), prefix)?;
            let path = entry.path();
            if !path.is_dir() {
                return None;
            }
            Some(RecupFolder { path, index })
        })
        .collect();

    folders.sort();
    trace!(
        "Discovered {} folders under {}",
        folders.len(),
        base_dir.display()
    );
    folders
}

fn parse_folder_index(name: &str, prefix: &str) -> Option<u64> {
    let suffix = name.strip_prefix(prefix)?.strip_prefix('.')?;
    if !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse::<u64>().ok()
}
