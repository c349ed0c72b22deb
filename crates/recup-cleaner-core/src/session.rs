use crate::action_log::{ActionLog, ActionRecord};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Point-in-time copy of the session counters, cheap to hand to a UI thread.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub folders_finalized: usize,
    pub kept_count: u64,
    pub deleted_count: u64,
    pub deleted_bytes: u64,
}

/// State of one monitoring session.
///
/// Owned by exactly one finalization or reorganization at a time. Counters only
/// grow; the retained-files map only grows until the reorganizer drains it.
#[derive(Debug, Default)]
pub struct SessionState {
    finalized_folders: HashSet<PathBuf>,
    retained_files: BTreeMap<String, Vec<PathBuf>>,
    retained_index: HashSet<PathBuf>,
    kept_count: u64,
    deleted_count: u64,
    deleted_bytes: u64,
    action_log: Option<ActionLog>,
    cancel_token: Arc<AtomicBool>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action_log(mut self, log: ActionLog) -> Self {
        self.action_log = Some(log);
        self
    }

    pub fn set_action_log(&mut self, log: Option<ActionLog>) {
        if let Some(old) = std::mem::replace(&mut self.action_log, log) {
            old.close();
        }
    }

    pub fn action_log(&self) -> Option<&ActionLog> {
        self.action_log.as_ref()
    }

    pub fn close_action_log(&mut self) {
        self.set_action_log(None);
    }

    /// Clear everything for a new session. The cancellation token keeps its
    /// identity so holders of a clone can still cancel the next session.
    pub fn reset(&mut self) {
        self.reset_counters();
        self.close_action_log();
        self.cancel_token.store(false, Ordering::Relaxed);
    }

    /// Forget finalized folders, retained files and counters, but keep the
    /// action log attached and the cancellation flag as it is.
    pub fn reset_counters(&mut self) {
        self.finalized_folders.clear();
        self.retained_files.clear();
        self.retained_index.clear();
        self.kept_count = 0;
        self.deleted_count = 0;
        self.deleted_bytes = 0;
    }

    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_token)
    }

    pub fn cancel(&self) {
        self.cancel_token.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.load(Ordering::Relaxed)
    }

    pub fn is_finalized(&self, folder: &Path) -> bool {
        self.finalized_folders.contains(folder)
    }

    pub fn mark_finalized(&mut self, folder: &Path) {
        self.finalized_folders.insert(folder.to_path_buf());
    }

    pub fn finalized_folders(&self) -> &HashSet<PathBuf> {
        &self.finalized_folders
    }

    pub fn retained_files(&self) -> &BTreeMap<String, Vec<PathBuf>> {
        &self.retained_files
    }

    pub fn is_retained(&self, path: &Path) -> bool {
        self.retained_index.contains(path)
    }

    pub fn retained_count(&self) -> usize {
        self.retained_index.len()
    }

    /// Hand the retained-files map over to the reorganizer, leaving it empty.
    pub fn take_retained_files(&mut self) -> BTreeMap<String, Vec<PathBuf>> {
        self.retained_index.clear();
        std::mem::take(&mut self.retained_files)
    }

    pub fn kept_count(&self) -> u64 {
        self.kept_count
    }

    pub fn deleted_count(&self) -> u64 {
        self.deleted_count
    }

    pub fn deleted_bytes(&self) -> u64 {
        self.deleted_bytes
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            folders_finalized: self.finalized_folders.len(),
            kept_count: self.kept_count,
            deleted_count: self.deleted_count,
            deleted_bytes: self.deleted_bytes,
        }
    }

    pub(crate) fn record_kept(&mut self, extension: &str, path: PathBuf) {
        self.kept_count += 1;
        self.retained_index.insert(path.clone());
        self.retained_files
            .entry(extension.to_string())
            .or_default()
            .push(path);
    }

    pub(crate) fn record_deleted(&mut self, size: u64) {
        self.deleted_count += 1;
        self.deleted_bytes += size;
    }

    pub(crate) fn log_action(&mut self, record: &ActionRecord) {
        if let Some(log) = self.action_log.as_mut() {
            log.record(record);
        }
    }
}
