use console::style;
use indicatif::{HumanBytes, HumanCount, ProgressBar, ProgressStyle};
use recup_cleaner_core::{
    FolderOutcome, MonitorPhase, ProgressReporter, ReorganizeReport, SessionStats,
};
use std::path::Path;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const MAX_ACTIVITY_WIDTH: usize = 60;

#[derive(Debug, Clone)]
pub enum StatusMessage {
    Phase(MonitorPhase),
    Activity(String),
    Stats(SessionStats),
    FolderComplete { name: String, stats: SessionStats },
    ReorganizeStart(usize),
    ReorganizeComplete(ReorganizeReport),
}

/// Forwards engine events to the status thread. The engine never touches the
/// terminal; the status thread never touches the session.
pub struct ChannelReporter {
    tx: mpsc::Sender<StatusMessage>,
}

impl ChannelReporter {
    pub fn new(tx: mpsc::Sender<StatusMessage>) -> Self {
        Self { tx }
    }

    fn send(&self, message: StatusMessage) {
        // The status thread may already be gone during shutdown.
        let _ = self.tx.send(message);
    }
}

impl ProgressReporter for ChannelReporter {
    fn on_message(&self, message: &str) {
        self.send(StatusMessage::Activity(message.to_string()));
    }

    fn on_phase(&self, phase: MonitorPhase) {
        self.send(StatusMessage::Phase(phase));
    }

    fn on_file_processed(&self, _folder_name: &str, _files_processed: usize, stats: SessionStats) {
        self.send(StatusMessage::Stats(stats));
    }

    fn on_folder_complete(&self, folder: &Path, _outcome: &FolderOutcome, stats: SessionStats) {
        let name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.send(StatusMessage::FolderComplete { name, stats });
    }

    fn on_reorganize_start(&self, total_files: usize) {
        self.send(StatusMessage::ReorganizeStart(total_files));
    }

    fn on_reorganize_complete(&self, report: &ReorganizeReport) {
        self.send(StatusMessage::ReorganizeComplete(report.clone()));
    }
}

/// Render status messages on a spinner until every sender is dropped.
pub fn spawn_status_handler(rx: mpsc::Receiver<StatusMessage>) -> JoinHandle<()> {
    thread::spawn(move || {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
        );
        pb.enable_steady_tick(Duration::from_millis(100));

        let mut phase = MonitorPhase::Idle;
        let mut stats = SessionStats::default();
        let mut activity = String::from("Waiting for PhotoRec...");
        pb.set_prefix(phase_label(phase));

        for message in rx {
            match message {
                StatusMessage::Phase(next) => {
                    phase = next;
                    pb.set_prefix(phase_label(phase));
                }
                StatusMessage::Activity(text) => activity = text,
                StatusMessage::Stats(next) => stats = next,
                StatusMessage::FolderComplete { name, stats: next } => {
                    stats = next;
                    pb.println(format!(
                        "  {} {} finalized",
                        style("✓").green(),
                        style(name).bold()
                    ));
                }
                StatusMessage::ReorganizeStart(total) => {
                    activity = format!("Reorganizing {} files...", HumanCount(total as u64));
                }
                StatusMessage::ReorganizeComplete(report) => {
                    pb.println(format!(
                        "  {} Reorganized {} files into {} type folders ({} failed)",
                        style("✓").green(),
                        HumanCount(report.files_moved as u64),
                        report.type_folders,
                        report.files_failed
                    ));
                }
            }
            pb.set_message(render_status(&stats, &activity));
        }

        pb.finish_and_clear();
    })
}

fn phase_label(phase: MonitorPhase) -> String {
    let label = format!("[{}]", phase);
    match phase {
        MonitorPhase::Idle | MonitorPhase::Stopped => style(label).dim().to_string(),
        MonitorPhase::Monitoring => style(label).blue().to_string(),
        MonitorPhase::Finalizing => style(label).green().to_string(),
    }
}

fn render_status(stats: &SessionStats, activity: &str) -> String {
    format!(
        "folders {} | deleted {} | kept {} | freed {} | {}",
        style(HumanCount(stats.folders_finalized as u64)).bold(),
        style(HumanCount(stats.deleted_count)).bold().red(),
        style(HumanCount(stats.kept_count)).bold().green(),
        style(HumanBytes(stats.deleted_bytes)).bold().green(),
        shorten_middle(activity, MAX_ACTIVITY_WIDTH)
    )
}

/// Shorten `text` to `width` characters by replacing its middle with `...`.
pub fn shorten_middle(text: &str, width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= width || width < 5 {
        return text.to_string();
    }
    let tail = (width - 3) / 2;
    let head = width - 3 - tail;
    let start: String = chars[..head].iter().collect();
    let end: String = chars[chars.len() - tail..].iter().collect();
    format!("{}...{}", start, end)
}
