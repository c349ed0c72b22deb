use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Action log error: {0}")]
    ActionLog(#[from] csv::Error),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}
