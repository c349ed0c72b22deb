use crate::action_log::{ActionRecord, UNKNOWN_SIZE};
use crate::filter::{Disposition, ExtensionRules};
use crate::fs_ops;
use crate::progress::ProgressReporter;
use crate::scanner::walk_files;
use crate::session::SessionState;
use std::path::Path;
use tracing::{debug, info};

/// What one finalization pass over a folder did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FolderOutcome {
    pub files_visited: usize,
    pub kept: u64,
    pub deleted: u64,
    pub deleted_bytes: u64,
    /// Files whose deletion failed and were left in place.
    pub skipped: u64,
    /// The pass stopped early because the session was cancelled.
    pub cancelled: bool,
}

/// Scan every file under `folder`, keep or delete it according to `rules`,
/// and account for it in `state`.
///
/// Per-file I/O failures are skipped. Cancellation is checked between files;
/// the file in flight always completes. Marking the folder as finalized is up
/// to the caller.
pub fn finalize_folder(
    folder: &Path,
    rules: &ExtensionRules,
    state: &mut SessionState,
    reporter: &dyn ProgressReporter,
) -> FolderOutcome {
    let folder_name = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut outcome = FolderOutcome::default();

    debug!("Finalizing {}", folder.display());
    reporter.on_folder_start(folder);

    for path in walk_files(folder) {
        if state.is_cancelled() {
            info!("Cancelled while finalizing {}", folder_name);
            outcome.cancelled = true;
            break;
        }

        outcome.files_visited += 1;

        // Kept by an earlier, interrupted pass over this folder.
        if !state.is_retained(&path) {
            process_file(&path, &folder_name, rules, state, &mut outcome);
        }

        reporter.on_message(&format!(
            "Processing {} ({} files)",
            folder_name, outcome.files_visited
        ));
        reporter.on_file_processed(&folder_name, outcome.files_visited, state.stats());
    }

    debug!(
        "Finalized {}: {} visited, {} kept, {} deleted ({} bytes)",
        folder_name, outcome.files_visited, outcome.kept, outcome.deleted, outcome.deleted_bytes
    );
    outcome
}

fn process_file(
    path: &Path,
    folder_name: &str,
    rules: &ExtensionRules,
    state: &mut SessionState,
    outcome: &mut FolderOutcome,
) {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let classification = rules.classify(&file_name);

    let size = match classification.disposition {
        Disposition::Keep => {
            state.record_kept(&classification.extension, path.to_path_buf());
            outcome.kept += 1;
            fs_ops::file_size(path).map_or(UNKNOWN_SIZE, |s| s as i64)
        }
        Disposition::Delete => {
            let Some(size) = fs_ops::file_size(path) else {
                outcome.skipped += 1;
                return;
            };
            if fs_ops::remove_file(path).is_none() {
                outcome.skipped += 1;
                return;
            }
            state.record_deleted(size);
            outcome.deleted += 1;
            outcome.deleted_bytes += size;
            size as i64
        }
    };

    state.log_action(&ActionRecord {
        folder: folder_name.to_string(),
        file_name,
        extension: classification.extension,
        disposition: classification.disposition,
        size,
    });
}
