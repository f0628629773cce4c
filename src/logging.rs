//! File logging bootstrap.
//!
//! The interactive shell owns the terminal, so log lines go to a file only.
//! Logging is best effort: failing to set it up never stops the program.

use std::fs::{self, OpenOptions};
use std::path::Path;

use log::{info, LevelFilter};
use simplelog::{ConfigBuilder, WriteLogger};

/// Start appending log lines to `log_file` at `level`.
///
/// Returns a human-readable error when the file cannot be opened or a logger
/// is already installed. `LevelFilter::Off` installs nothing.
pub fn init_logging(level: LevelFilter, log_file: &Path) -> Result<(), String> {
    if level == LevelFilter::Off {
        return Ok(());
    }
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!("failed to create log directory `{}`: {err}", parent.display())
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|err| format!("failed to open log file `{}`: {err}", log_file.display()))?;

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();
    WriteLogger::init(level, config, file)
        .map_err(|err| format!("failed to start logger: {err}"))?;

    info!(
        "event=app_start status=ok platform={} version={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_installs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        assert!(init_logging(LevelFilter::Off, &path).is_ok());
        assert!(!path.exists());
    }
}
