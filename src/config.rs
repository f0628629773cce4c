//! # Configuration
//!
//! Settings resolve in this order: defaults → config file → CLI flags.
//!
//! The config file lives at `~/.tabtasks/config.toml`. If it is missing on
//! first run, a commented-out default is written so every option is
//! discoverable. Relative paths in the file are resolved against the
//! directory that holds it.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, LevelFilter};
use serde::{Deserialize, Serialize};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Set when this run wrote the commented default file.
    #[serde(skip)]
    pub generated: Option<PathBuf>,
    /// Problems met while loading, reported once logging is up.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    pub data_file: Option<String>,
    pub backup_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub color: Option<bool>,
    pub clear_screen: Option<bool>,
    pub banner: Option<bool>,
    pub comment_preview: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const APP_DIR_NAME: &str = ".tabtasks";
pub const DEFAULT_DATA_FILE: &str = "tabs.json";
pub const DEFAULT_BACKUP_DIR: &str = "backup";
pub const DEFAULT_LOG_FILE: &str = "tabtasks.log";
pub const DEFAULT_COMMENT_PREVIEW: usize = 20;
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

/// How the interactive shell renders its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub color: bool,
    pub clear_screen: bool,
    pub banner: bool,
    pub comment_preview: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            color: true,
            clear_screen: true,
            banner: true,
            comment_preview: DEFAULT_COMMENT_PREVIEW,
        }
    }
}

impl DisplayOptions {
    /// Plain output for non-terminal use and tests.
    pub fn plain() -> Self {
        DisplayOptions { color: false, clear_screen: false, banner: false, ..Default::default() }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub data_file: PathBuf,
    pub backup_dir: PathBuf,
    pub display: DisplayOptions,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
    /// Problems found while resolving, reported once logging is up.
    pub warnings: Vec<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.tabtasks`, or `./.tabtasks` when no home directory is known.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Returns the default config path, `~/.tabtasks/config.toml`.
pub fn config_path() -> PathBuf {
    app_dir().join("config.toml")
}

/// Load config from `path`.
///
/// If the file doesn't exist, generates a commented-out default and returns
/// `AppConfig::default()`. Failing to write it is recorded in `warnings`.
/// A malformed file is a `ConfigError::Parse`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        let mut config = AppConfig::default();
        match generate_default_config(path) {
            Ok(()) => config.generated = Some(path.to_path_buf()),
            Err(msg) => config.warnings.push(msg),
        }
        return Ok(config);
    }
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: AppConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) -> Result<(), String> {
    let default_content = r#"# tabtasks configuration
# All settings are optional; defaults are used for anything not specified.
# Relative paths are resolved against the directory holding this file.

# [storage]
# data_file = "tabs.json"
# backup_dir = "backup"

# [display]
# color = true
# clear_screen = true
# banner = true
# comment_preview = 20               # characters of comment shown in tables

# [logging]
# level = "info"                     # off, error, warn, info, debug, trace
# file = "tabtasks.log"
"#;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create config directory {}: {e}", parent.display()))?;
    }
    fs::write(path, default_content)
        .map_err(|e| format!("failed to write default config {}: {e}", path.display()))
}

// ============================================================================
// Resolution
// ============================================================================

/// Collapse defaults → config file → CLI into concrete settings.
///
/// `base_dir` anchors relative paths; `cli_db` is the `--db` flag.
pub fn resolve(config: &AppConfig, base_dir: &Path, cli_db: Option<&Path>) -> ResolvedConfig {
    let mut warnings = config.warnings.clone();

    let data_file = match cli_db {
        Some(db) => db.to_path_buf(),
        None => anchor(base_dir, config.storage.data_file.as_deref().unwrap_or(DEFAULT_DATA_FILE)),
    };
    let backup_dir = anchor(
        base_dir,
        config.storage.backup_dir.as_deref().unwrap_or(DEFAULT_BACKUP_DIR),
    );

    let defaults = DisplayOptions::default();
    let display = DisplayOptions {
        color: config.display.color.unwrap_or(defaults.color),
        clear_screen: config.display.clear_screen.unwrap_or(defaults.clear_screen),
        banner: config.display.banner.unwrap_or(defaults.banner),
        comment_preview: config
            .display
            .comment_preview
            .filter(|&n| n > 0)
            .unwrap_or(defaults.comment_preview),
    };

    let log_level = match config.logging.level.as_deref() {
        None => DEFAULT_LOG_LEVEL,
        Some(raw) => LevelFilter::from_str(raw.trim()).unwrap_or_else(|_| {
            warnings.push(format!("unknown log level '{raw}', using {DEFAULT_LOG_LEVEL}"));
            DEFAULT_LOG_LEVEL
        }),
    };
    let log_file = anchor(base_dir, config.logging.file.as_deref().unwrap_or(DEFAULT_LOG_FILE));

    ResolvedConfig { data_file, backup_dir, display, log_level, log_file, warnings }
}

fn anchor(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
