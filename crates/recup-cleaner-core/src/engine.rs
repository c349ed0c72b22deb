use crate::config::AppConfig;
use crate::error::Error;
use crate::filter::ExtensionRules;
use crate::finalize::finalize_folder;
use crate::progress::ProgressReporter;
use crate::reorganize::{reorganize_by_type, ReorganizeReport};
use crate::scanner::{discover_folders, RecupFolder, DEFAULT_FOLDER_PREFIX};
use crate::session::{SessionState, SessionStats};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_BATCH_SIZE: usize = 500;
const STOP_CHECK_SLICE: Duration = Duration::from_millis(100);

/// Where the monitor loop stands, derived from the number of numbered folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    /// No numbered folders yet.
    Idle,
    /// Exactly one folder exists and it is still being written.
    Monitoring,
    /// Two or more folders exist; all but the newest are finalized.
    Finalizing,
    Stopped,
}

impl MonitorPhase {
    fn from_folder_count(count: usize) -> Self {
        match count {
            0 => MonitorPhase::Idle,
            1 => MonitorPhase::Monitoring,
            _ => MonitorPhase::Finalizing,
        }
    }
}

impl fmt::Display for MonitorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MonitorPhase::Idle => "idle",
            MonitorPhase::Monitoring => "monitoring",
            MonitorPhase::Finalizing => "finalizing",
            MonitorPhase::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub phase: MonitorPhase,
    /// Newest folder, left alone because the producer may still write to it.
    pub active_folder: Option<PathBuf>,
    /// Folders finalized during this tick, oldest first.
    pub finalized: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishReport {
    pub finalized: Vec<PathBuf>,
    pub reorganize: Option<ReorganizeReport>,
    pub stats: SessionStats,
    pub cancelled: bool,
}

/// Incremental cleaner for a PhotoRec output directory.
///
/// While recovery runs, `tick` (or `run`) finalizes every numbered folder but
/// the newest. Once the producer has exited, `finish` takes the remaining
/// folders and optionally regroups the kept files by type.
#[derive(Debug, Clone)]
pub struct CleanerEngine {
    base_dir: PathBuf,
    folder_prefix: String,
    rules: ExtensionRules,
    poll_interval: Duration,
    batch_size: usize,
    reorganize: bool,
}

impl CleanerEngine {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            folder_prefix: DEFAULT_FOLDER_PREFIX.to_string(),
            rules: ExtensionRules::keep_all(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            batch_size: DEFAULT_BATCH_SIZE,
            reorganize: true,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        config.validate()?;
        let base_dir = config
            .base_dir
            .clone()
            .ok_or_else(|| Error::InvalidSetting("no base directory given".to_string()))?;

        Ok(Self::new(base_dir)
            .with_folder_prefix(&config.folder_prefix)
            .with_rules(config.extension_rules())
            .with_poll_interval(Duration::from_millis(config.poll_interval_ms))
            .with_batch_size(config.batch_size)
            .with_reorganize(config.reorganize))
    }

    pub fn with_folder_prefix(mut self, prefix: &str) -> Self {
        self.folder_prefix = prefix.to_string();
        self
    }

    pub fn with_rules(mut self, rules: ExtensionRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_reorganize(mut self, reorganize: bool) -> Self {
        self.reorganize = reorganize;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn rules(&self) -> &ExtensionRules {
        &self.rules
    }

    pub fn discover(&self) -> Vec<RecupFolder> {
        discover_folders(&self.base_dir, &self.folder_prefix)
    }

    /// One scheduling step: rediscover folders and finalize every one except
    /// the newest that has not been finalized yet.
    pub fn tick(&self, state: &mut SessionState, reporter: &dyn ProgressReporter) -> TickReport {
        let folders = self.discover();
        let phase = MonitorPhase::from_folder_count(folders.len());
        reporter.on_phase(phase);

        let Some((active, completed)) = folders.split_last() else {
            reporter.on_message("Monitoring...");
            return TickReport {
                phase,
                active_folder: None,
                finalized: Vec::new(),
            };
        };

        let finalized = self.finalize_all(completed, state, reporter);
        reporter.on_message(&format!("Monitoring active folder: {}", active.name()));

        TickReport {
            phase,
            active_folder: Some(active.path.clone()),
            finalized,
        }
    }

    /// Tick every poll interval until `stop` is set or the session is
    /// cancelled. Both are checked between ticks and while sleeping, never in
    /// the middle of a folder. Returns the number of ticks run.
    pub fn run(
        &self,
        state: &mut SessionState,
        reporter: &dyn ProgressReporter,
        stop: &AtomicBool,
    ) -> usize {
        info!("Monitoring {}", self.base_dir.display());
        let mut ticks = 0;

        while !stop.load(Ordering::Relaxed) && !state.is_cancelled() {
            self.tick(state, reporter);
            ticks += 1;
            self.sleep_interval(state, stop);
        }

        debug!("Monitor loop stopped after {} ticks", ticks);
        reporter.on_phase(MonitorPhase::Stopped);
        ticks
    }

    /// Finalize whatever is left, the newest folder included, then regroup the
    /// kept files when reorganization is enabled. Closes the action log.
    ///
    /// Only call this once the producer has exited.
    pub fn finish(&self, state: &mut SessionState, reporter: &dyn ProgressReporter) -> FinishReport {
        let folders = self.discover();
        let finalized = self.finalize_all(&folders, state, reporter);
        self.complete(state, reporter, finalized)
    }

    /// Process a directory the producer has already finished with: the
    /// session counters are reset, every folder is finalized in order, then
    /// the kept files are regrouped. An attached action log stays open.
    pub fn clean_once(
        &self,
        state: &mut SessionState,
        reporter: &dyn ProgressReporter,
    ) -> FinishReport {
        state.reset_counters();
        let folders = self.discover();
        if folders.is_empty() {
            reporter.on_message(&format!(
                "No '{}' folders found to clean.",
                self.folder_prefix
            ));
        }

        let total = folders.len();
        let mut finalized = Vec::new();
        for (idx, folder) in folders.iter().enumerate() {
            reporter.on_message(&format!("Processing folder {}/{}...", idx + 1, total));
            if let Some(path) = self.finalize_one(folder, state, reporter) {
                finalized.push(path);
            }
            if state.is_cancelled() {
                break;
            }
        }

        self.complete(state, reporter, finalized)
    }

    fn complete(
        &self,
        state: &mut SessionState,
        reporter: &dyn ProgressReporter,
        finalized: Vec<PathBuf>,
    ) -> FinishReport {
        let cancelled = state.is_cancelled();
        let reorganize = if self.reorganize && !cancelled {
            reporter.on_message("Reorganizing files...");
            let report = reorganize_by_type(
                &self.base_dir,
                &self.folder_prefix,
                state,
                self.batch_size,
                reporter,
            );
            reporter.on_message("Reorganization complete.");
            Some(report)
        } else {
            None
        };

        state.close_action_log();
        FinishReport {
            finalized,
            reorganize,
            stats: state.stats(),
            cancelled: state.is_cancelled(),
        }
    }

    fn finalize_all(
        &self,
        folders: &[RecupFolder],
        state: &mut SessionState,
        reporter: &dyn ProgressReporter,
    ) -> Vec<PathBuf> {
        let mut finalized = Vec::new();
        for folder in folders {
            if state.is_cancelled() {
                break;
            }
            if let Some(path) = self.finalize_one(folder, state, reporter) {
                finalized.push(path);
            }
        }
        finalized
    }

    /// Finalize `folder` unless it already was. Returns its path when this
    /// call completed it.
    fn finalize_one(
        &self,
        folder: &RecupFolder,
        state: &mut SessionState,
        reporter: &dyn ProgressReporter,
    ) -> Option<PathBuf> {
        if state.is_finalized(&folder.path) {
            return None;
        }

        reporter.on_message(&format!("Processing {}", folder.path.display()));
        let started = Instant::now();
        let outcome = finalize_folder(&folder.path, &self.rules, state, reporter);

        // An interrupted folder stays unfinalized so a later pass picks up
        // the files it never reached.
        if outcome.cancelled {
            return None;
        }

        state.mark_finalized(&folder.path);
        info!(
            "Finalized {} in {:.2}s: {} kept, {} deleted",
            folder.name(),
            started.elapsed().as_secs_f64(),
            outcome.kept,
            outcome.deleted
        );
        reporter.on_folder_complete(&folder.path, &outcome, state.stats());
        Some(folder.path.clone())
    }

    fn sleep_interval(&self, state: &SessionState, stop: &AtomicBool) {
        let deadline = Instant::now() + self.poll_interval;
        loop {
            if stop.load(Ordering::Relaxed) || state.is_cancelled() {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            thread::sleep(STOP_CHECK_SLICE.min(deadline - now));
        }
    }
}
