use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Run a single filesystem operation and swallow its failure.
///
/// The producer may be writing or renaming files underneath us at any time, so
/// a vanished file or a permission error is an expected race, not a fault. The
/// failure is logged and the caller gets `None`.
pub fn attempt<T, F>(action: &str, path: &Path, op: F) -> Option<T>
where
    F: FnOnce() -> io::Result<T>,
{
    match op() {
        Ok(value) => Some(value),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("Skipping {} of {}: {}", action, path.display(), err);
            None
        }
        Err(err) => {
            warn!("Failed to {} {}: {}", action, path.display(), err);
            None
        }
    }
}

pub fn file_size(path: &Path) -> Option<u64> {
    attempt("stat", path, || fs::metadata(path).map(|m| m.len()))
}

pub fn remove_file(path: &Path) -> Option<()> {
    attempt("delete", path, || fs::remove_file(path))
}

pub fn remove_dir_all(path: &Path) -> Option<()> {
    attempt("remove directory", path, || fs::remove_dir_all(path))
}

pub fn create_dir_all(path: &Path) -> Option<()> {
    attempt("create directory", path, || fs::create_dir_all(path))
}

/// Move `src` into `dest_dir`, keeping its file name unless that name is
/// already taken there. Falls back to copy-then-remove when a plain rename is
/// refused (e.g. across filesystems).
pub fn move_into(src: &Path, dest_dir: &Path) -> Option<PathBuf> {
    let file_name = src.file_name()?;
    let dest = unique_destination(dest_dir, Path::new(file_name));

    attempt("move", src, || match fs::rename(src, &dest) {
        Ok(()) => Ok(()),
        Err(rename_err) if src.exists() => {
            debug!(
                "Rename of {} failed ({}), falling back to copy",
                src.display(),
                rename_err
            );
            fs::copy(src, &dest)?;
            fs::remove_file(src)
        }
        Err(rename_err) => Err(rename_err),
    })?;

    Some(dest)
}

fn unique_destination(dest_dir: &Path, file_name: &Path) -> PathBuf {
    let candidate = dest_dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = file_name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1u32;
    loop {
        let candidate = dest_dir.join(format!("{}_{}{}", stem, counter, extension));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
