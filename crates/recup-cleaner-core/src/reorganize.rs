use crate::fs_ops;
use crate::progress::ProgressReporter;
use crate::scanner::discover_folders;
use crate::session::SessionState;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReorganizeReport {
    pub files_moved: usize,
    /// Files left at their original location because the move failed.
    pub files_failed: usize,
    pub type_folders: usize,
    pub buckets_created: usize,
    pub source_folders_removed: usize,
    pub cancelled: bool,
}

/// Move every retained file into `<base_dir>/<extension>/<n>/`, with at most
/// `batch_size` files per numbered bucket, then remove the numbered source
/// folders.
///
/// Files retained without an extension are grouped under `no_extension`.
/// Buckets are always used, even when a type fits in a single one. A failed
/// move leaves the file where it was. Source folders are removed whether or
/// not they are empty; a removal that fails leaves the folder in place.
pub fn reorganize_by_type(
    base_dir: &Path,
    folder_prefix: &str,
    state: &mut SessionState,
    batch_size: usize,
    reporter: &dyn ProgressReporter,
) -> ReorganizeReport {
    let batch_size = batch_size.max(1);
    let retained = state.take_retained_files();
    let total_files: usize = retained.values().map(|paths| paths.len()).sum();
    let mut report = ReorganizeReport::default();

    info!(
        "Reorganizing {} files of {} types in {}",
        total_files,
        retained.len(),
        base_dir.display()
    );
    reporter.on_reorganize_start(total_files);

    'types: for (extension, paths) in &retained {
        let folder_name = if extension.is_empty() {
            "no_extension"
        } else {
            extension.as_str()
        };
        let type_folder = base_dir.join(folder_name);
        report.type_folders += 1;

        for (batch_idx, batch) in paths.chunks(batch_size).enumerate() {
            if state.is_cancelled() {
                report.cancelled = true;
                break 'types;
            }

            let bucket = type_folder.join((batch_idx + 1).to_string());
            if fs_ops::create_dir_all(&bucket).is_none() {
                report.files_failed += batch.len();
                continue;
            }
            report.buckets_created += 1;

            for path in batch {
                match fs_ops::move_into(path, &bucket) {
                    Some(_) => report.files_moved += 1,
                    None => report.files_failed += 1,
                }
            }

            reporter.on_message(&format!(
                "Reorganizing {} ({}/{} files)",
                folder_name,
                report.files_moved + report.files_failed,
                total_files
            ));
        }
        debug!("Moved {} files into {}", paths.len(), type_folder.display());
    }

    if !report.cancelled {
        for folder in discover_folders(base_dir, folder_prefix) {
            if fs_ops::remove_dir_all(&folder.path).is_some() {
                report.source_folders_removed += 1;
            }
        }
    }

    info!(
        "Reorganization complete: {} moved, {} failed, {} source folders removed",
        report.files_moved, report.files_failed, report.source_folders_removed
    );
    reporter.on_reorganize_complete(&report);
    report
}
