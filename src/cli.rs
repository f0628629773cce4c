use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Tabbed task manager for the terminal.
/// With no subcommand the interactive menu opens.
#[derive(Parser, Debug)]
#[command(name = "tabtasks", version, about = "Organise tasks into tabs from the terminal")]
pub struct Cli {
    /// Path to the JSON data file. Overrides the config file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to the config file (default: ~/.tabtasks/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::State;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["tabtasks"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_add_accepts_state_codes() {
        let cli = Cli::try_parse_from(["tabtasks", "--db", "x.json", "add", "Work", "Fix sink", "--state", "g"])
            .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("x.json")));
        match cli.command {
            Some(Commands::Add { tab, title, state, comment }) => {
                assert_eq!(tab, "Work");
                assert_eq!(title, "Fix sink");
                assert_eq!(state, State::Started);
                assert!(comment.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tabtasks", "tabs", "--config", "c.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(cli.command, Some(Commands::Tabs)));
    }
}
