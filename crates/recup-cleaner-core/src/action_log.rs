use crate::error::Error;
use crate::filter::Disposition;
use chrono::Local;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Size written when a file's size could not be read.
pub const UNKNOWN_SIZE: i64 = -1;

const HEADER: [&str; 5] = ["Folder", "Filename", "Extension", "Status", "Size"];

/// One row of the action log: what happened to one visited file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub folder: String,
    pub file_name: String,
    pub extension: String,
    pub disposition: Disposition,
    pub size: i64,
}

impl ActionRecord {
    fn to_fields(&self) -> [String; 5] {
        [
            self.folder.clone(),
            self.file_name.clone(),
            self.extension.clone(),
            self.disposition.as_str().to_string(),
            self.size.to_string(),
        ]
    }
}

/// Append-only CSV record of every disposition decision in a session.
pub struct ActionLog {
    writer: csv::Writer<File>,
    path: PathBuf,
    records_written: usize,
}

impl std::fmt::Debug for ActionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionLog")
            .field("path", &self.path)
            .field("records_written", &self.records_written)
            .finish()
    }
}

impl ActionLog {
    /// Create a fresh, timestamped log file in `dir` and write the header row.
    pub fn create_in(dir: &Path) -> Result<Self, Error> {
        fs::create_dir_all(dir)?;
        let file_name = format!(
            "recup_cleaner_log_{}.csv",
            Local::now().format("%Y%m%d_%H%M%S")
        );
        Self::create(&dir.join(file_name))
    }

    pub fn create(path: &Path) -> Result<Self, Error> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(HEADER)?;
        writer.flush()?;
        info!("Writing action log to {}", path.display());
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            records_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Write and flush one record. A write failure is logged and otherwise
    /// ignored so that logging can never stop a cleaning pass.
    pub fn record(&mut self, record: &ActionRecord) {
        let result = self
            .writer
            .write_record(record.to_fields())
            .and_then(|_| self.writer.flush().map_err(csv::Error::from));
        match result {
            Ok(()) => self.records_written += 1,
            Err(err) => warn!(
                "Failed to write action log record to {}: {}",
                self.path.display(),
                err
            ),
        }
    }

    pub fn close(mut self) {
        if let Err(err) = self.writer.flush() {
            warn!("Failed to flush action log {}: {}", self.path.display(), err);
        }
    }
}
