use crate::error::Error;
use crate::filter::{normalize_extensions, ExtensionRules};
use crate::scanner::DEFAULT_FOLDER_PREFIX;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PhotoRec output directory to watch.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    #[serde(default = "default_folder_prefix")]
    pub folder_prefix: String,
    #[serde(default)]
    pub keep_extensions: Vec<String>,
    #[serde(default)]
    pub exclude_extensions: Vec<String>,
    /// When false every file is kept regardless of the extension lists.
    #[serde(default = "default_true")]
    pub cleaning_enabled: bool,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_true")]
    pub reorganize: bool,
    #[serde(default)]
    pub log_enabled: bool,
    /// Where action logs go; the base directory when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_folder_prefix() -> String {
    DEFAULT_FOLDER_PREFIX.to_string()
}

fn default_true() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_batch_size() -> usize {
    500
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            folder_prefix: default_folder_prefix(),
            keep_extensions: Vec::new(),
            exclude_extensions: Vec::new(),
            cleaning_enabled: true,
            poll_interval_ms: default_poll_interval_ms(),
            batch_size: default_batch_size(),
            reorganize: true,
            log_enabled: false,
            log_dir: None,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.batch_size == 0 {
            return Err(Error::InvalidSetting(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidSetting(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.folder_prefix.trim().is_empty() {
            return Err(Error::InvalidSetting(
                "folder_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Rules derived from the extension lists; everything is kept when
    /// cleaning is disabled.
    pub fn extension_rules(&self) -> ExtensionRules {
        if !self.cleaning_enabled {
            return ExtensionRules::keep_all();
        }
        ExtensionRules::new(
            normalize_extensions(self.keep_extensions.iter().flat_map(|s| s.split(','))),
            normalize_extensions(self.exclude_extensions.iter().flat_map(|s| s.split(','))),
        )
    }

    /// Directory for action logs: `log_dir`, else the base directory.
    pub fn action_log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref().or(self.base_dir.as_deref())
    }
}

/// Load `Config.toml` from the working directory (if present), overlaid with
/// `RECUP_CLEANER_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(environment_source())
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

pub fn load_configuration_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::from(path).required(true))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

fn environment_source() -> Environment {
    Environment::with_prefix("RECUP_CLEANER")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("keep_extensions")
        .with_list_parse_key("exclude_extensions")
}
