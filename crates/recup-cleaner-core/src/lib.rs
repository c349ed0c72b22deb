pub mod action_log;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod finalize;
pub mod fs_ops;
pub mod progress;
pub mod reorganize;
pub mod scanner;
pub mod session;

pub use action_log::{ActionLog, ActionRecord};
pub use config::AppConfig;
pub use engine::{CleanerEngine, FinishReport, MonitorPhase, TickReport};
pub use error::Error;
pub use filter::{Classification, Disposition, ExtensionRules};
pub use finalize::{finalize_folder, FolderOutcome};
pub use progress::{ProgressReporter, SilentReporter};
pub use reorganize::{reorganize_by_type, ReorganizeReport};
pub use scanner::{discover_folders, list_files, FileSummary, RecupFolder};
pub use session::{SessionState, SessionStats};
