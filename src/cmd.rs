//! Command implementations for the CLI interface.
//!
//! Each subcommand has a `cmd_*` handler. Handlers receive the loaded store
//! and the [`Context`] built from configuration, save after a successful
//! mutation and print their results to stdout. Store errors are returned as
//! failures so the process exits non-zero.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::Subcommand;
use clap_complete::{generate, Shell as CompletionShell};
use log::{info, warn};

use crate::config::DisplayOptions;
use crate::db::{create_backup, load_legacy_dir, JsonFile, Persistence};
use crate::fields::State;
use crate::shell::menu::Shell;
use crate::shell::render::{self, truncate};
use crate::store::{Store, StoreError};
use crate::tab::Tab;
use crate::task::{Task, TaskFilter, TaskId, TaskUpdate};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive menu (the default).
    Menu,

    /// List all tabs.
    Tabs,

    /// Create a new tab.
    NewTab {
        /// Name of the tab.
        name: String,
    },

    /// Rename a tab.
    RenameTab {
        /// Tab name or ID.
        tab: String,
        /// New name.
        name: String,
    },

    /// Delete a tab and every task in it.
    DeleteTab {
        /// Tab name or ID.
        tab: String,
    },

    /// List the tasks of a tab.
    List {
        /// Tab name or ID.
        tab: String,
        /// Only tasks in this state: urgent (u) | in-pause (p) | started (g) | finished (f).
        #[arg(long, value_enum)]
        state: Option<State>,
        /// Only tasks whose title contains this text (case-insensitive).
        #[arg(long)]
        search: Option<String>,
        /// Show archived tasks instead of active ones.
        #[arg(long)]
        archived: bool,
    },

    /// Add a task to a tab.
    Add {
        /// Tab name or ID.
        tab: String,
        /// Short title for the task.
        title: String,
        #[arg(long, value_enum, default_value_t = State::Urgent)]
        state: State,
        /// Optional free-text comment.
        #[arg(long)]
        comment: Option<String>,
    },

    /// Update fields on a task.
    Update {
        /// Tab name or ID.
        tab: String,
        /// Task ID.
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_enum)]
        state: Option<State>,
        /// New comment. An empty string clears it.
        #[arg(long)]
        comment: Option<String>,
    },

    /// Show a task with its full history.
    View {
        /// Tab name or ID.
        tab: String,
        /// Task ID.
        id: TaskId,
    },

    /// Delete a task permanently.
    Delete {
        /// Tab name or ID.
        tab: String,
        /// Task ID.
        id: TaskId,
    },

    /// Move finished tasks of a tab into its archive.
    Archive {
        /// Tab name or ID.
        tab: String,
    },

    /// Import tabs from a legacy per-tab data directory.
    Import {
        /// Directory holding one JSON file per tab.
        dir: PathBuf,
        /// Skip creating a backup before import.
        #[arg(long)]
        no_backup: bool,
    },

    /// Create a timestamped backup of the data file.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

/// Resolved paths and display settings shared by the handlers.
pub struct Context {
    pub storage: JsonFile,
    pub backup_dir: PathBuf,
    pub display: DisplayOptions,
}

impl Context {
    fn save(&self, store: &Store) -> Result<()> {
        self.storage.save(store)?;
        Ok(())
    }
}

/// Dispatch a parsed subcommand.
pub fn run(command: Commands, ctx: &Context) -> Result<()> {
    if let Commands::Completions { shell } = command {
        cmd_completions(shell);
        return Ok(());
    }
    if let Commands::Backup = command {
        return cmd_backup(ctx);
    }

    let mut store = ctx.storage.load()?;
    match command {
        Commands::Menu => cmd_menu(store, ctx),
        Commands::Tabs => {
            cmd_tabs(&store);
            Ok(())
        }
        Commands::NewTab { name } => cmd_new_tab(&mut store, ctx, &name),
        Commands::RenameTab { tab, name } => cmd_rename_tab(&mut store, ctx, &tab, &name),
        Commands::DeleteTab { tab } => cmd_delete_tab(&mut store, ctx, &tab),
        Commands::List { tab, state, search, archived } => {
            cmd_list(&store, ctx, &tab, TaskFilter { state, title_contains: search }, archived)
        }
        Commands::Add { tab, title, state, comment } => {
            cmd_add(&mut store, ctx, &tab, &title, state, comment)
        }
        Commands::Update { tab, id, title, state, comment } => {
            let update = TaskUpdate { title, state, comment };
            cmd_update(&mut store, ctx, &tab, id, update)
        }
        Commands::View { tab, id } => cmd_view(&store, ctx, &tab, id),
        Commands::Delete { tab, id } => cmd_delete(&mut store, ctx, &tab, id),
        Commands::Archive { tab } => cmd_archive(&mut store, ctx, &tab),
        Commands::Import { dir, no_backup } => cmd_import(&mut store, ctx, &dir, no_backup),
        Commands::Backup | Commands::Completions { .. } => unreachable!("handled before loading"),
    }
}

/// Run the interactive shell on stdin/stdout.
pub fn cmd_menu(store: Store, ctx: &Context) -> Result<()> {
    let stdin = io::stdin();
    let shell = Shell::new(store, &ctx.storage, stdin.lock(), io::stdout(), ctx.display);
    shell.run().context("interactive session failed")?;
    Ok(())
}

/// Print every tab with its task counts.
pub fn cmd_tabs(store: &Store) {
    let tabs = store.list_tabs();
    if tabs.is_empty() {
        println!("No tabs. Create one with `tabtasks new-tab <name>`.");
        return;
    }
    println!("{:<5} {:<24} {:>5} {:>8}", "ID", "Name", "Tasks", "Archived");
    for tab in tabs {
        println!(
            "{:<5} {:<24} {:>5} {:>8}",
            tab.id,
            truncate(&tab.name, 24),
            tab.tasks.len(),
            tab.archived.len()
        );
    }
}

/// Create a tab.
pub fn cmd_new_tab(store: &mut Store, ctx: &Context, name: &str) -> Result<()> {
    let (id, name) = store.create_tab(name).map(|t| (t.id, t.name.clone()))?;
    ctx.save(store)?;
    println!("Tab '{name}' created successfully! (ID {id})");
    Ok(())
}

/// Rename a tab.
pub fn cmd_rename_tab(store: &mut Store, ctx: &Context, tab: &str, name: &str) -> Result<()> {
    let id = store.resolve_tab(tab)?.id;
    let new_name = store.rename_tab(id, name)?.name.clone();
    ctx.save(store)?;
    println!("Tab {id} renamed to '{new_name}'.");
    Ok(())
}

/// Delete a tab with all its tasks.
pub fn cmd_delete_tab(store: &mut Store, ctx: &Context, tab: &str) -> Result<()> {
    let id = store.resolve_tab(tab)?.id;
    let removed = store.delete_tab(id)?;
    ctx.save(store)?;
    println!(
        "Deleted tab '{}' ({} tasks, {} archived).",
        removed.name,
        removed.tasks.len(),
        removed.archived.len()
    );
    Ok(())
}

/// List a tab's tasks, optionally filtered.
pub fn cmd_list(
    store: &Store,
    ctx: &Context,
    tab: &str,
    filter: TaskFilter,
    archived: bool,
) -> Result<()> {
    let tab = store.resolve_tab(tab)?;
    let source = if archived { &tab.archived } else { &tab.tasks };
    let found: Vec<&Task> = source.iter().filter(|t| filter.matches(t)).collect();

    let filtered = filter != TaskFilter::default();
    if filtered && found.is_empty() {
        println!("No tasks found");
        return Ok(());
    }
    let heading = list_heading(tab, &filter, archived, found.len());
    println!("{}", render::task_table(&heading, &found, &ctx.display));
    Ok(())
}

fn list_heading(tab: &Tab, filter: &TaskFilter, archived: bool, count: usize) -> String {
    let kind = if archived { "Archived" } else { "Tasks" };
    match filter.state {
        Some(state) => format!("{} {kind}: {count} {} tasks", tab.name, state.label()),
        None => format!("{} {kind}", tab.name),
    }
}

/// Add a task to a tab.
pub fn cmd_add(
    store: &mut Store,
    ctx: &Context,
    tab: &str,
    title: &str,
    state: State,
    comment: Option<String>,
) -> Result<()> {
    let tab_id = store.resolve_tab(tab)?.id;
    let id = store.create_task(tab_id, title, state, comment)?.id;
    ctx.save(store)?;
    println!("Task added! (ID {id})");
    Ok(())
}

/// Apply field updates to a task.
pub fn cmd_update(
    store: &mut Store,
    ctx: &Context,
    tab: &str,
    id: TaskId,
    update: TaskUpdate,
) -> Result<()> {
    if update.is_empty() {
        bail!("nothing to update: pass --title, --state or --comment");
    }
    let tab_id = store.resolve_tab(tab)?.id;
    let before = store.get_task(tab_id, id)?.modified_at;
    let after = store.update_task(tab_id, id, update)?.modified_at;
    if after == before {
        println!("No changes made.");
        return Ok(());
    }
    ctx.save(store)?;
    println!("Task updated!");
    Ok(())
}

/// Show one task in full. Archived tasks can be viewed too.
pub fn cmd_view(store: &Store, ctx: &Context, tab: &str, id: TaskId) -> Result<()> {
    let tab = store.resolve_tab(tab)?;
    let task = tab
        .task(id)
        .or_else(|| tab.archived.iter().find(|t| t.id == id))
        .ok_or(StoreError::TaskNotFound { tab_id: tab.id, task_id: id })?;
    println!("{}", render::task_detail(task, &ctx.display));
    Ok(())
}

/// Delete a task permanently.
pub fn cmd_delete(store: &mut Store, ctx: &Context, tab: &str, id: TaskId) -> Result<()> {
    let tab_id = store.resolve_tab(tab)?.id;
    let removed = store.delete_task(tab_id, id)?;
    ctx.save(store)?;
    println!("Task {} '{}' deleted permanently!", removed.id, removed.title);
    Ok(())
}

/// Archive finished tasks of a tab.
pub fn cmd_archive(store: &mut Store, ctx: &Context, tab: &str) -> Result<()> {
    let tab_id = store.resolve_tab(tab)?.id;
    let moved = store.archive_finished(tab_id)?;
    if moved == 0 {
        println!("No finished tasks to archive.");
        return Ok(());
    }
    ctx.save(store)?;
    println!("Archived {moved} finished task(s).");
    Ok(())
}

/// Import tabs from a legacy data directory with automatic backup.
///
/// Tabs whose name is already taken are skipped with a warning. Nothing is
/// written when no tab could be imported.
pub fn cmd_import(store: &mut Store, ctx: &Context, dir: &Path, no_backup: bool) -> Result<()> {
    let legacy = load_legacy_dir(dir)?;
    if legacy.is_empty() {
        println!("No tab files found in {}.", dir.display());
        return Ok(());
    }

    if !no_backup && ctx.storage.path().exists() {
        let backup_path = create_backup(ctx.storage.path(), &ctx.backup_dir)?;
        println!("Created backup: {}", backup_path.display());
    }

    let mut imported = 0;
    for tab in legacy {
        let task_count = tab.tasks.len();
        match store.import_tab(&tab.name, tab.tasks, tab.task_counter) {
            Ok(created) => {
                println!("Imported tab '{}' with {task_count} tasks.", created.name);
                imported += 1;
            }
            Err(StoreError::DuplicateName(name)) => {
                warn!("event=legacy_import status=skipped reason=duplicate_name");
                eprintln!(
                    "Warning: skipped {}: a tab named '{name}' already exists",
                    tab.source.display()
                );
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to import {}", tab.source.display()));
            }
        }
    }

    if imported > 0 {
        ctx.save(store)?;
    }
    info!("event=legacy_import status=ok tabs={imported}");
    println!("Import complete: {imported} tab(s) imported.");
    Ok(())
}

/// Create a timestamped backup of the data file.
pub fn cmd_backup(ctx: &Context) -> Result<()> {
    let backup_path = create_backup(ctx.storage.path(), &ctx.backup_dir)?;
    println!("Backup created: {}", backup_path.display());
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: CompletionShell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    let mut out = io::stdout();
    generate(shell, &mut app, app_name, &mut out);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn context(dir: &Path) -> Context {
        Context {
            storage: JsonFile::new(dir.join("tabs.json")),
            backup_dir: dir.join("backup"),
            display: DisplayOptions::plain(),
        }
    }

    #[test]
    fn test_add_and_update_persist() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let mut store = Store::new();

        cmd_new_tab(&mut store, &ctx, "Work").unwrap();
        cmd_add(&mut store, &ctx, "work", "Write report", State::Urgent, None).unwrap();
        let update = TaskUpdate::default().state(State::Finished);
        cmd_update(&mut store, &ctx, "1", 1, update).unwrap();

        let saved = ctx.storage.load().unwrap();
        assert_eq!(saved, store);
        let task = saved.get_task(1, 1).unwrap();
        assert_eq!(task.state, State::Finished);
        assert_eq!(task.history.len(), 2);
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let mut store = Store::new();
        cmd_new_tab(&mut store, &ctx, "Work").unwrap();
        cmd_add(&mut store, &ctx, "Work", "Write report", State::Urgent, None).unwrap();
        assert!(cmd_update(&mut store, &ctx, "Work", 1, TaskUpdate::default()).is_err());
    }

    #[test]
    fn test_store_errors_fail_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let mut store = Store::new();
        let err = cmd_delete(&mut store, &ctx, "Nowhere", 1).unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::UnknownTab("Nowhere".into()))
        );
        assert!(!ctx.storage.path().exists());
    }

    #[test]
    fn test_archive_then_view_archived() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let mut store = Store::new();
        cmd_new_tab(&mut store, &ctx, "Home").unwrap();
        cmd_add(&mut store, &ctx, "Home", "Paint fence", State::Finished, None).unwrap();
        cmd_add(&mut store, &ctx, "Home", "Mow lawn", State::Started, None).unwrap();

        cmd_archive(&mut store, &ctx, "Home").unwrap();
        assert_eq!(store.tasks(1).unwrap().len(), 1);
        assert_eq!(store.archived(1).unwrap().len(), 1);
        assert!(cmd_view(&store, &ctx, "Home", 1).is_ok());
        assert!(store.get_task(1, 1).is_err());
    }

    #[test]
    fn test_import_skips_duplicates_and_backs_up() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let mut store = Store::new();
        cmd_new_tab(&mut store, &ctx, "Work").unwrap();

        let legacy = dir.path().join("task_data");
        fs::create_dir_all(&legacy).unwrap();
        fs::write(legacy.join("a.json"), r#"{"name": "work", "tasks": [], "task_counter": 1}"#).unwrap();
        fs::write(
            legacy.join("b.json"),
            r#"{"name": "Garden", "task_counter": 3, "tasks": [
                {"id": 2, "title": "Plant roses", "state": "g", "comment": "",
                 "created_at": "2024-01-02 10:00:00", "modified_at": "2024-01-03 11:00:00",
                 "history": ["2024-01-02 10:00:00: Task created"]}
            ]}"#,
        )
        .unwrap();

        cmd_import(&mut store, &ctx, &legacy, false).unwrap();

        assert_eq!(store.list_tabs().len(), 2);
        let garden = store.find_tab("garden").unwrap();
        assert_eq!(garden.tasks[0].state, State::Started);
        assert_eq!(garden.next_task_id, 3);
        assert_eq!(fs::read_dir(&ctx.backup_dir).unwrap().count(), 1);
    }
}
