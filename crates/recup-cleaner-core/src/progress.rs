use crate::engine::MonitorPhase;
use crate::finalize::FolderOutcome;
use crate::reorganize::ReorganizeReport;
use crate::session::SessionStats;
use std::path::Path;

/// Trait for reporting cleaning progress.
///
/// `on_message` is the plain human-readable sink; the other hooks carry the
/// same events in structured form for richer front ends. All methods have
/// default no-op implementations, so an absent reporter is `SilentReporter`.
pub trait ProgressReporter: Send + Sync {
    fn on_message(&self, _message: &str) {}
    fn on_phase(&self, _phase: MonitorPhase) {}
    fn on_folder_start(&self, _folder: &Path) {}
    fn on_file_processed(&self, _folder_name: &str, _files_processed: usize, _stats: SessionStats) {}
    fn on_folder_complete(&self, _folder: &Path, _outcome: &FolderOutcome, _stats: SessionStats) {}
    fn on_reorganize_start(&self, _total_files: usize) {}
    fn on_reorganize_complete(&self, _report: &ReorganizeReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
