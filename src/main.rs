use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::tty::IsTty;
use log::{error, info, warn};

use tabtasks::cli::Cli;
use tabtasks::cmd::{self, Commands, Context};
use tabtasks::config::{self, DisplayOptions};
use tabtasks::db::JsonFile;
use tabtasks::logging::init_logging;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("event=app_exit status=error");
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let app_config = config::load_config(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(config::app_dir);
    let resolved = config::resolve(&app_config, &base_dir, cli.db.as_deref());

    if let Err(e) = init_logging(resolved.log_level, &resolved.log_file) {
        eprintln!("Warning: logging disabled: {e}");
    }
    if let Some(generated) = &app_config.generated {
        info!("event=config_generated path={}", generated.display());
    }
    for warning in &resolved.warnings {
        warn!("event=config_warning detail={warning:?}");
        eprintln!("Warning: {warning}");
    }

    // Styling and screen clearing only make sense on a real terminal.
    let tty = io::stdout().is_tty();
    let display = DisplayOptions {
        color: resolved.display.color && tty,
        clear_screen: resolved.display.clear_screen && tty,
        ..resolved.display
    };
    let ctx = Context {
        storage: JsonFile::new(resolved.data_file),
        backup_dir: resolved.backup_dir,
        display,
    };

    cmd::run(cli.command.unwrap_or(Commands::Menu), &ctx)
}
