//! # tabtasks
//!
//! A terminal task manager. Tasks are grouped into named tabs; each task
//! carries a title, a state, an optional comment, timestamps and a history
//! of every change made to it.
//!
//! The [`store::Store`] holds all tabs and enforces their invariants. It is
//! saved as a single JSON file through [`db::JsonFile`]. Two front ends sit
//! on top: the interactive menu in [`shell`] and the one-shot subcommands
//! in [`cmd`].
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the interactive menu
//! tabtasks
//!
//! # Or work from the command line
//! tabtasks new-tab Work
//! tabtasks add Work "Write report" --state g --comment "due friday"
//! tabtasks list Work --state started
//! tabtasks update Work 1 --state finished
//! tabtasks archive Work
//! ```
//!
//! Data lives in `~/.tabtasks/` unless `--db` or the config file says
//! otherwise.

pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod fields;
pub mod logging;
pub mod store;
pub mod tab;
pub mod task;
pub mod shell {
    pub mod colors;
    pub mod input;
    pub mod menu;
    pub mod render;
}
