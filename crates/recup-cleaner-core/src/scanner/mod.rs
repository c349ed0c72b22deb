mod discover;
mod walk;

pub use discover::{discover_folders, RecupFolder, DEFAULT_FOLDER_PREFIX};
pub use walk::{list_files, walk_files, FileSummary};
