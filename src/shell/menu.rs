//! Interactive tab and task menus.
//!
//! `Shell` owns the store for the length of a session and calls into it for
//! every action. Each successful mutation is saved straight away. Store
//! errors are shown and the menu re-prompts; only terminal and storage
//! failures end the session early.

use std::io::{self, BufRead, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use log::{debug, info};
use thiserror::Error;

use crate::config::DisplayOptions;
use crate::db::{PersistError, Persistence};
use crate::fields::State;
use crate::shell::colors::{self, paint, paint_bold};
use crate::shell::input::Console;
use crate::shell::render;
use crate::store::{Store, StoreError};
use crate::tab::TabId;
use crate::task::{TaskFilter, TaskId, TaskUpdate};

/// Failures that end an interactive session.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// Input reached end of file.
    #[error("input closed")]
    Closed,
}

/// What a menu asks its caller to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Back,
    Exit,
}

const TASK_MENU: &str = "\n1. Show Tasks\n2. New Task\n3. Modify Task\n4. Delete Task\n5. View Task Info\n6. Filter Tasks\n7. Back to Tabs\n8. Exit Program";
const TASK_CHOICES: [&str; 8] = ["1", "2", "3", "4", "5", "6", "7", "8"];

/// Interactive session over a store.
pub struct Shell<'a, R, W> {
    store: Store,
    storage: &'a dyn Persistence,
    console: Console<R, W>,
    display: DisplayOptions,
    status: Option<String>,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(
        store: Store,
        storage: &'a dyn Persistence,
        input: R,
        out: W,
        display: DisplayOptions,
    ) -> Self {
        Shell {
            store,
            storage,
            console: Console::new(input, out, display.color),
            display,
            status: None,
        }
    }

    /// Run until the user exits or input ends. Returns the final store.
    pub fn run(mut self) -> Result<Store, ShellError> {
        info!("event=session_start tabs={}", self.store.list_tabs().len());
        loop {
            match self.tab_menu() {
                Ok(Flow::Exit) => break,
                Ok(_) => continue,
                Err(ShellError::Closed) => {
                    debug!("event=session_eof");
                    writeln!(self.console.out)?;
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        self.console.out.flush()?;
        info!("event=session_end tabs={}", self.store.list_tabs().len());
        Ok(self.store)
    }

    fn tab_menu(&mut self) -> Result<Flow, ShellError> {
        self.clear_screen()?;
        let c = self.display.color;
        if self.display.banner {
            writeln!(self.console.out, "{}", paint(render::BANNER, colors::HEADER, c))?;
            writeln!(self.console.out, "{}\n", paint_bold("Task Manager", colors::TITLE, c))?;
        }
        let table = render::tab_table(self.store.list_tabs(), &self.display);
        writeln!(self.console.out, "{table}")?;
        if let Some(status) = self.status.take() {
            writeln!(self.console.out, "\n{status}")?;
        }

        let tab_ids: Vec<TabId> = self.store.list_tabs().iter().map(|t| t.id).collect();
        let choice = if tab_ids.is_empty() {
            self.console.choose("Select action", &["n", "e"], Some("n"))?
        } else {
            let mut choices: Vec<String> = (1..=tab_ids.len()).map(|i| i.to_string()).collect();
            choices.extend(["m", "n", "e"].map(String::from));
            self.console.choose("Select tab or action", &choices, None)?
        };

        match choice.as_str() {
            "m" => self.modify_tab(&tab_ids)?,
            "n" => self.new_tab()?,
            "e" => {
                self.say_goodbye()?;
                return Ok(Flow::Exit);
            }
            number => {
                // Choices are validated, so this is always a tab number.
                let picked = number.parse::<usize>().ok().and_then(|n| n.checked_sub(1));
                let Some(&tab_id) = picked.and_then(|i| tab_ids.get(i)) else {
                    return Ok(Flow::Continue);
                };
                if self.task_menu(tab_id)? == Flow::Exit {
                    return Ok(Flow::Exit);
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn new_tab(&mut self) -> Result<(), ShellError> {
        let name = self.console.ask("Enter tab name")?;
        let created = self.store.create_tab(&name).map(|tab| tab.name.clone());
        match created {
            Ok(name) => {
                self.persist()?;
                self.status = Some(self.ok(&format!("Tab '{name}' created successfully!")));
            }
            Err(e) => self.status = Some(self.error_text(&e)),
        }
        Ok(())
    }

    fn modify_tab(&mut self, tab_ids: &[TabId]) -> Result<(), ShellError> {
        let answer = self.console.ask("Enter tab number to modify")?;
        let Ok(number) = answer.trim().parse::<usize>() else {
            self.status = Some(self.danger("Please enter a valid number!"));
            return Ok(());
        };
        let Some(&tab_id) = number.checked_sub(1).and_then(|i| tab_ids.get(i)) else {
            self.status = Some(self.danger("Invalid tab number!"));
            return Ok(());
        };

        let action = self.console.choose(
            "Choose action: (c) Change name, (d) Delete tab",
            &["c", "d"],
            None,
        )?;
        if action == "c" {
            let new_name = self.console.ask("Enter new name")?;
            let renamed = self.store.rename_tab(tab_id, &new_name).map(|_| ());
            match renamed {
                Ok(()) => {
                    self.persist()?;
                    self.status = Some(self.ok("Tab name updated!"));
                }
                Err(e) => self.status = Some(self.error_text(&e)),
            }
        } else {
            let name = self.tab_name(tab_id);
            let prompt = self.danger(&format!("Delete tab '{name}' and all its tasks?"));
            if self.console.confirm(&prompt)? {
                let deleted = self.store.delete_tab(tab_id).map(|_| ());
                match deleted {
                    Ok(()) => {
                        self.persist()?;
                        self.status = Some(self.danger("Tab deleted!"));
                    }
                    Err(e) => self.status = Some(self.error_text(&e)),
                }
            }
        }
        Ok(())
    }

    fn task_menu(&mut self, tab_id: TabId) -> Result<Flow, ShellError> {
        self.show_tasks(tab_id)?;
        loop {
            writeln!(self.console.out, "{TASK_MENU}")?;
            let choice = self.console.choose("Choose action", &TASK_CHOICES, None)?;
            match choice.as_str() {
                "1" => self.show_tasks(tab_id)?,
                "2" => self.new_task(tab_id)?,
                "3" => self.modify_task(tab_id)?,
                "4" => self.delete_task(tab_id)?,
                "5" => self.view_task_info(tab_id)?,
                "6" => self.filter_tasks(tab_id)?,
                "7" => return Ok(Flow::Back),
                _ => {
                    self.say_goodbye()?;
                    return Ok(Flow::Exit);
                }
            }
        }
    }

    fn show_tasks(&mut self, tab_id: TabId) -> Result<(), ShellError> {
        let rendered = match self.store.tab(tab_id) {
            Ok(tab) => {
                let tasks: Vec<_> = tab.tasks.iter().collect();
                render::task_table(&format!("{} Tasks", tab.name), &tasks, &self.display)
            }
            Err(e) => self.error_text(&e),
        };
        writeln!(self.console.out, "\n{rendered}\n")?;
        Ok(())
    }

    fn new_task(&mut self, tab_id: TabId) -> Result<(), ShellError> {
        let title = self.console.ask("Enter task title")?;
        let state = self.ask_state("State", Some(State::Urgent))?;
        let comment = self.console.ask("Enter comment")?;

        let created = self
            .store
            .create_task(tab_id, &title, state, Some(comment))
            .map(|task| task.id);
        match created {
            Ok(id) => {
                self.persist()?;
                self.notify(&self.ok(&format!("Task {id} added!")))?;
            }
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    fn modify_task(&mut self, tab_id: TabId) -> Result<(), ShellError> {
        let Some(task_id) = self.ask_task_id("Enter task ID")? else {
            return Ok(());
        };
        let task = match self.store.get_task(tab_id, task_id).cloned() {
            Ok(task) => task,
            Err(e) => return self.report(&e),
        };

        let title = self.console.ask_default("New title", &task.title)?;
        let state = self.ask_state("New state", Some(task.state))?;
        let current_comment = task.comment.clone().unwrap_or_default();
        let comment = self
            .console
            .ask_default("New comment ('-' clears)", &current_comment)?;
        let comment = if comment.trim() == "-" { String::new() } else { comment };

        let update = TaskUpdate::default().title(title).state(state).comment(comment);
        let updated = self
            .store
            .update_task(tab_id, task_id, update)
            .map(|t| t.modified_at != task.modified_at);
        match updated {
            Ok(true) => {
                self.persist()?;
                self.notify(&self.ok("Task updated!"))?;
            }
            Ok(false) => self.notify(&paint("No changes made.", colors::NOTICE, self.display.color))?,
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    fn delete_task(&mut self, tab_id: TabId) -> Result<(), ShellError> {
        let Some(task_id) = self.ask_task_id("Enter task ID to delete")? else {
            return Ok(());
        };
        let title = match self.store.get_task(tab_id, task_id).map(|t| t.title.clone()) {
            Ok(title) => title,
            Err(e) => return self.report(&e),
        };

        let prompt = self.danger(&format!("Are you sure you want to delete task '{title}'?"));
        if !self.console.confirm(&prompt)? {
            return self.notify(&paint("Deletion cancelled", colors::NOTICE, self.display.color));
        }
        match self.store.delete_task(tab_id, task_id).map(|_| ()) {
            Ok(()) => {
                self.persist()?;
                self.notify(&self.danger("Task deleted permanently!"))?;
                self.show_tasks(tab_id)?;
            }
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    fn view_task_info(&mut self, tab_id: TabId) -> Result<(), ShellError> {
        let Some(task_id) = self.ask_task_id("Enter task ID")? else {
            return Ok(());
        };
        let task = match self.store.get_task(tab_id, task_id).cloned() {
            Ok(task) => task,
            Err(e) => return self.report(&e),
        };
        writeln!(self.console.out, "\n{}", render::task_detail(&task, &self.display))?;

        if task.history.is_empty() || !self.console.confirm("\nView detailed change log?")? {
            return Ok(());
        }
        let entry = self
            .console
            .ask_number("Enter log number to view details")?
            .and_then(|n| usize::try_from(n).ok())
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| task.history.get(i));
        match entry {
            Some(entry) => {
                let details = render::change_details(entry, &self.display);
                writeln!(self.console.out, "\n{details}")?;
            }
            None => self.notify(&self.danger("Invalid log number!"))?,
        }
        Ok(())
    }

    fn filter_tasks(&mut self, tab_id: TabId) -> Result<(), ShellError> {
        let state = self.ask_state("Filter by state", None)?;
        let search = self.console.ask("Title contains (blank for any)")?;
        let filter = TaskFilter { state: Some(state), title_contains: Some(search) };

        let rendered = match self.store.filter_tasks(tab_id, |t| filter.matches(t)) {
            Ok(found) if found.is_empty() => paint("No tasks found", colors::NOTICE, self.display.color),
            Ok(found) => {
                let heading = format!("{} {} tasks:", found.len(), state.label());
                render::task_table(&heading, &found, &self.display)
            }
            Err(e) => self.error_text(&e),
        };
        writeln!(self.console.out, "\n{rendered}")?;
        Ok(())
    }

    fn ask_state(&mut self, prompt: &str, default: Option<State>) -> Result<State, ShellError> {
        let codes: Vec<String> = State::ALL.iter().map(|s| s.code().to_string()).collect();
        let prompt = format!("{prompt} ({})", State::menu_help());
        let default = default.map(|s| s.code().to_string());
        let answer = self.console.choose(&prompt, &codes, default.as_deref())?;
        // `choose` only returns one of the listed codes.
        Ok(answer
            .chars()
            .next()
            .and_then(State::from_code)
            .unwrap_or(State::Urgent))
    }

    fn ask_task_id(&mut self, prompt: &str) -> Result<Option<TaskId>, ShellError> {
        let id = self.console.ask_number(prompt)?;
        if id.is_none() {
            self.notify(&self.danger("Invalid ID! Please enter a number."))?;
        }
        Ok(id)
    }

    fn persist(&mut self) -> Result<(), ShellError> {
        self.storage.save(&self.store)?;
        Ok(())
    }

    fn tab_name(&self, tab_id: TabId) -> String {
        self.store
            .tab(tab_id)
            .map(|t| t.name.clone())
            .unwrap_or_default()
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        if self.display.clear_screen {
            queue!(self.console.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }

    fn say_goodbye(&mut self) -> Result<(), ShellError> {
        self.notify(&self.ok("Goodbye! See you soon!"))
    }

    fn notify(&mut self, message: &str) -> Result<(), ShellError> {
        writeln!(self.console.out, "{message}")?;
        Ok(())
    }

    fn report(&mut self, err: &StoreError) -> Result<(), ShellError> {
        debug!("event=store_error kind={err:?}");
        let text = self.error_text(err);
        self.notify(&text)
    }

    fn error_text(&self, err: &StoreError) -> String {
        let message = match err {
            StoreError::TaskNotFound { .. } => "Task not found!".to_string(),
            StoreError::TabNotFound(_) | StoreError::UnknownTab(_) => "Tab not found!".to_string(),
            other => format!("Error: {other}"),
        };
        paint(&message, colors::DANGER, self.display.color)
    }

    fn ok(&self, text: &str) -> String {
        paint(text, colors::OK, self.display.color)
    }

    fn danger(&self, text: &str) -> String {
        paint(text, colors::DANGER, self.display.color)
    }
}
