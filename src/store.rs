//! In-memory record store for tabs and their tasks.
//!
//! `Store` is the only place tabs and tasks are mutated. Every operation
//! validates its input before touching any state, so a failed call leaves the
//! store exactly as it was.
//!
//! Invariants kept here:
//! - tab ids come from a store-wide counter and task ids from a per-tab
//!   counter; neither counter ever goes backwards, so ids are never reused;
//! - tab names are non-empty and unique under [`name_key`];
//! - `modified_at >= created_at` for every task, and a changing update moves
//!   `modified_at` strictly forward.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fields::State;
use crate::tab::{name_key, Tab, TabId};
use crate::task::{normalise_comment, HistoryEntry, Task, TaskId, TaskUpdate};

/// Recoverable failures of store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("tab {0} not found")]
    TabNotFound(TabId),
    #[error("no tab named '{0}'")]
    UnknownTab(String),
    #[error("task {task_id} not found in tab {tab_id}")]
    TaskNotFound { tab_id: TabId, task_id: TaskId },
    #[error("a tab named '{0}' already exists")]
    DuplicateName(String),
}

impl StoreError {
    /// True for every "referenced thing does not exist" error.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::TabNotFound(_) | StoreError::UnknownTab(_) | StoreError::TaskNotFound { .. }
        )
    }
}

/// All tabs, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    tabs: Vec<Tab>,
    next_tab_id: TabId,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Store { tabs: Vec::new(), next_tab_id: 1 }
    }

    /// Create a new, empty tab.
    pub fn create_tab(&mut self, name: &str) -> Result<&Tab, StoreError> {
        let name = validate_name(name)?;
        self.ensure_unique_name(&name, None)?;

        let id = self.next_tab_id;
        self.next_tab_id = advance(id, "tab ids")?;
        self.tabs.push(Tab::new(id, name, Utc::now()));
        info!("event=tab_create tab={id}");
        Ok(&self.tabs[self.tabs.len() - 1])
    }

    /// Delete a tab and, with it, every task it owns.
    pub fn delete_tab(&mut self, id: TabId) -> Result<Tab, StoreError> {
        let idx = self.position(id)?;
        let tab = self.tabs.remove(idx);
        info!(
            "event=tab_delete tab={id} tasks={} archived={}",
            tab.tasks.len(),
            tab.archived.len()
        );
        Ok(tab)
    }

    /// Rename a tab. Renaming a tab to its own name in another casing is allowed.
    pub fn rename_tab(&mut self, id: TabId, new_name: &str) -> Result<&Tab, StoreError> {
        let idx = self.position(id)?;
        let name = validate_name(new_name)?;
        self.ensure_unique_name(&name, Some(id))?;
        self.tabs[idx].name = name;
        info!("event=tab_rename tab={id}");
        Ok(&self.tabs[idx])
    }

    /// Tabs in insertion order.
    pub fn list_tabs(&self) -> &[Tab] {
        &self.tabs
    }

    /// Get a tab by ID.
    pub fn tab(&self, id: TabId) -> Result<&Tab, StoreError> {
        self.tabs.iter().find(|t| t.id == id).ok_or(StoreError::TabNotFound(id))
    }

    /// Find a tab by name, ignoring case and surrounding whitespace.
    pub fn find_tab(&self, name: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.has_name(name))
    }

    /// Resolve a tab from user input: an exact name first, then a numeric id.
    pub fn resolve_tab(&self, ident: &str) -> Result<&Tab, StoreError> {
        if let Some(tab) = self.find_tab(ident) {
            return Ok(tab);
        }
        match ident.trim().parse::<TabId>() {
            Ok(id) => self.tab(id),
            Err(_) => Err(StoreError::UnknownTab(ident.trim().to_string())),
        }
    }

    /// Active tasks of a tab, in creation order.
    pub fn tasks(&self, tab_id: TabId) -> Result<&[Task], StoreError> {
        Ok(&self.tab(tab_id)?.tasks)
    }

    /// Archived tasks of a tab.
    pub fn archived(&self, tab_id: TabId) -> Result<&[Task], StoreError> {
        Ok(&self.tab(tab_id)?.archived)
    }

    /// Create a task at the end of a tab's task list.
    pub fn create_task(
        &mut self,
        tab_id: TabId,
        title: &str,
        state: State,
        comment: Option<String>,
    ) -> Result<&Task, StoreError> {
        let idx = self.position(tab_id)?;
        let title = validate_title(title)?;

        let tab = &mut self.tabs[idx];
        let id = tab.next_task_id;
        tab.next_task_id = advance(id, "task ids")?;
        let now = Utc::now();
        tab.tasks.push(Task {
            id,
            title,
            state,
            comment: normalise_comment(comment),
            created_at: now,
            modified_at: now,
            history: vec![HistoryEntry { at: now, changes: vec!["Task created".to_string()] }],
        });
        info!("event=task_create tab={tab_id} task={id} state={}", state.code());
        Ok(&tab.tasks[tab.tasks.len() - 1])
    }

    /// Apply a partial update.
    ///
    /// Only fields whose value actually differs count as changes. When nothing
    /// changes the task is returned untouched, including `modified_at`.
    pub fn update_task(
        &mut self,
        tab_id: TabId,
        task_id: TaskId,
        update: TaskUpdate,
    ) -> Result<&Task, StoreError> {
        let idx = self.position(tab_id)?;
        let task = self.tabs[idx]
            .task_mut(task_id)
            .ok_or(StoreError::TaskNotFound { tab_id, task_id })?;

        let title = update.title.as_deref().map(validate_title).transpose()?;
        let comment = update.comment.map(|c| normalise_comment(Some(c)));

        let mut changes = Vec::new();
        let title = title.filter(|t| *t != task.title);
        if let Some(ref t) = title {
            changes.push(format!("Title changed from '{}' to '{}'", task.title, t));
        }
        let state = update.state.filter(|s| *s != task.state);
        if let Some(s) = state {
            changes.push(format!("State changed from '{}' to '{}'", task.state, s));
        }
        let comment = comment.filter(|c| *c != task.comment);
        if let Some(ref c) = comment {
            changes.push(match (&task.comment, c) {
                (None, Some(_)) => "Comment added".to_string(),
                (Some(_), None) => "Comment removed".to_string(),
                _ => "Comment updated".to_string(),
            });
        }

        if changes.is_empty() {
            debug!("event=task_update tab={tab_id} task={task_id} status=unchanged");
            return Ok(&*task);
        }

        if let Some(t) = title {
            task.title = t;
        }
        if let Some(s) = state {
            task.state = s;
        }
        if let Some(c) = comment {
            task.comment = c;
        }
        let at = later_than(task.modified_at);
        task.modified_at = at;
        info!("event=task_update tab={tab_id} task={task_id} changes={}", changes.len());
        task.history.push(HistoryEntry { at, changes });
        Ok(&*task)
    }

    /// Delete one task.
    pub fn delete_task(&mut self, tab_id: TabId, task_id: TaskId) -> Result<Task, StoreError> {
        let idx = self.position(tab_id)?;
        let tasks = &mut self.tabs[idx].tasks;
        let pos = tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or(StoreError::TaskNotFound { tab_id, task_id })?;
        info!("event=task_delete tab={tab_id} task={task_id}");
        Ok(tasks.remove(pos))
    }

    /// Get an active task.
    pub fn get_task(&self, tab_id: TabId, task_id: TaskId) -> Result<&Task, StoreError> {
        self.tab(tab_id)?
            .task(task_id)
            .ok_or(StoreError::TaskNotFound { tab_id, task_id })
    }

    /// Active tasks of a tab matching `predicate`, in tab order.
    pub fn filter_tasks<P>(&self, tab_id: TabId, predicate: P) -> Result<Vec<&Task>, StoreError>
    where
        P: Fn(&Task) -> bool,
    {
        Ok(self.tab(tab_id)?.tasks.iter().filter(|t| predicate(t)).collect())
    }

    /// Move every finished task of a tab into its archive. Returns how many moved.
    pub fn archive_finished(&mut self, tab_id: TabId) -> Result<usize, StoreError> {
        let idx = self.position(tab_id)?;
        let tab = &mut self.tabs[idx];
        let (done, active): (Vec<Task>, Vec<Task>) = std::mem::take(&mut tab.tasks)
            .into_iter()
            .partition(|t| t.state == State::Finished);
        tab.tasks = active;
        let moved = done.len();
        tab.archived.extend(done);
        info!("event=tab_archive tab={tab_id} moved={moved}");
        Ok(moved)
    }

    /// Insert a tab together with tasks that already exist elsewhere.
    ///
    /// Task ids, timestamps and history are kept as given. The tab's task
    /// counter ends up past both `task_counter` and every imported id.
    pub fn import_tab(
        &mut self,
        name: &str,
        tasks: Vec<Task>,
        task_counter: TaskId,
    ) -> Result<&Tab, StoreError> {
        let name = validate_name(name)?;
        self.ensure_unique_name(&name, None)?;

        let mut seen = HashSet::new();
        let mut imported = Vec::with_capacity(tasks.len());
        for mut task in tasks {
            task.title = validate_title(&task.title)?;
            task.comment = normalise_comment(task.comment);
            if task.id == 0 || !seen.insert(task.id) {
                return Err(StoreError::Validation(format!(
                    "task id {} is invalid or repeated in tab '{name}'",
                    task.id
                )));
            }
            if task.modified_at < task.created_at {
                task.modified_at = task.created_at;
            }
            imported.push(task);
        }

        let max_id = seen.iter().copied().max().unwrap_or(0);
        let after_max = max_id.checked_add(1).ok_or_else(|| {
            StoreError::Validation(format!("task id {max_id} in tab '{name}' is too large"))
        })?;
        let next_tab_id = advance(self.next_tab_id, "tab ids")?;
        let created_at = imported.iter().map(|t| t.created_at).min().unwrap_or_else(Utc::now);
        let id = self.next_tab_id;
        self.next_tab_id = next_tab_id;

        let mut tab = Tab::new(id, name, created_at);
        tab.next_task_id = task_counter.max(after_max);
        tab.tasks = imported;
        info!("event=tab_import tab={id} tasks={}", tab.tasks.len());
        self.tabs.push(tab);
        Ok(&self.tabs[self.tabs.len() - 1])
    }

    /// Check every invariant. Used on data read from disk.
    pub fn verify(&self) -> Result<(), String> {
        let mut tab_ids = HashSet::new();
        let mut names = HashSet::new();
        for tab in &self.tabs {
            if tab.id == 0 || tab.id >= self.next_tab_id {
                return Err(format!("tab id {} is outside the allocated range", tab.id));
            }
            if !tab_ids.insert(tab.id) {
                return Err(format!("tab id {} appears twice", tab.id));
            }
            if tab.name.trim().is_empty() {
                return Err(format!("tab {} has an empty name", tab.id));
            }
            if !names.insert(name_key(&tab.name)) {
                return Err(format!("tab name '{}' appears twice", tab.name));
            }

            let mut task_ids = HashSet::new();
            for task in tab.tasks.iter().chain(tab.archived.iter()) {
                if task.id == 0 || task.id >= tab.next_task_id {
                    return Err(format!(
                        "task id {} in tab '{}' is outside the allocated range",
                        task.id, tab.name
                    ));
                }
                if !task_ids.insert(task.id) {
                    return Err(format!("task id {} appears twice in tab '{}'", task.id, tab.name));
                }
                if task.title.trim().is_empty() {
                    return Err(format!("task {} in tab '{}' has an empty title", task.id, tab.name));
                }
                if task.modified_at < task.created_at {
                    return Err(format!(
                        "task {} in tab '{}' was modified before it was created",
                        task.id, tab.name
                    ));
                }
            }
        }
        Ok(())
    }

    fn position(&self, id: TabId) -> Result<usize, StoreError> {
        self.tabs
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::TabNotFound(id))
    }

    fn ensure_unique_name(&self, name: &str, except: Option<TabId>) -> Result<(), StoreError> {
        let clash = self
            .tabs
            .iter()
            .any(|t| Some(t.id) != except && t.has_name(name));
        if clash {
            return Err(StoreError::DuplicateName(name.to_string()));
        }
        Ok(())
    }
}

/// The counter value after `current`, or an error once the id space is used up.
fn advance(current: u64, what: &str) -> Result<u64, StoreError> {
    current
        .checked_add(1)
        .ok_or_else(|| StoreError::Validation(format!("no {what} left to allocate")))
}

fn validate_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::Validation("tab name cannot be empty".into()));
    }
    Ok(name.to_string())
}

fn validate_title(title: &str) -> Result<String, StoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(StoreError::Validation("task title cannot be empty".into()));
    }
    Ok(title.to_string())
}

/// The current time, or the smallest step past `prev` if the clock has not moved.
fn later_than(prev: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > prev {
        now
    } else {
        prev + Duration::nanoseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskFilter;

    fn store_with_work() -> (Store, TabId) {
        let mut store = Store::new();
        let id = store.create_tab("Work").unwrap().id;
        (store, id)
    }

    #[test]
    fn test_create_tab_assigns_increasing_ids() {
        let mut store = Store::new();
        let a = store.create_tab("Work").unwrap().id;
        let b = store.create_tab("Home").unwrap().id;
        assert_eq!((a, b), (1, 2));
        let names: Vec<_> = store.list_tabs().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Work", "Home"]);
    }

    #[test]
    fn test_create_tab_trims_and_rejects_empty() {
        let mut store = Store::new();
        assert_eq!(store.create_tab("  Errands ").unwrap().name, "Errands");
        let err = store.create_tab("   ").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.list_tabs().len(), 1);
    }

    #[test]
    fn test_duplicate_names_ignore_case() {
        let mut store = Store::new();
        store.create_tab("Home").unwrap();
        assert_eq!(
            store.create_tab("home").unwrap_err(),
            StoreError::DuplicateName("home".into())
        );
        assert_eq!(store.list_tabs().len(), 1);
    }

    #[test]
    fn test_tab_ids_are_not_reused() {
        let mut store = Store::new();
        let a = store.create_tab("A").unwrap().id;
        store.delete_tab(a).unwrap();
        let b = store.create_tab("A").unwrap().id;
        assert!(b > a);
    }

    #[test]
    fn test_rename_tab() {
        let mut store = Store::new();
        let work = store.create_tab("Work").unwrap().id;
        store.create_tab("Home").unwrap();

        assert_eq!(store.rename_tab(work, "Office").unwrap().name, "Office");
        assert_eq!(store.rename_tab(work, "OFFICE").unwrap().name, "OFFICE");
        assert!(matches!(store.rename_tab(work, "home"), Err(StoreError::DuplicateName(_))));
        assert!(matches!(store.rename_tab(work, ""), Err(StoreError::Validation(_))));
        assert_eq!(store.rename_tab(99, "X").unwrap_err(), StoreError::TabNotFound(99));
        assert_eq!(store.tab(work).unwrap().name, "OFFICE");
    }

    #[test]
    fn test_create_task_sets_timestamps_and_history() {
        let (mut store, work) = store_with_work();
        let task = store
            .create_task(work, "Write report", State::Urgent, Some("  by friday ".into()))
            .unwrap();
        assert_eq!(task.id, 1);
        assert_eq!(task.title, "Write report");
        assert_eq!(task.comment.as_deref(), Some("by friday"));
        assert_eq!(task.created_at, task.modified_at);
        assert_eq!(task.history.len(), 1);
        assert_eq!(task.history[0].changes, vec!["Task created".to_string()]);
    }

    #[test]
    fn test_create_task_with_empty_title_leaves_store_untouched() {
        let (mut store, work) = store_with_work();
        let before = store.clone();
        let err = store.create_task(work, "  ", State::Urgent, None).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store, before);
    }

    #[test]
    fn test_create_task_in_missing_tab() {
        let mut store = Store::new();
        let err = store.create_task(3, "x", State::Started, None).unwrap_err();
        assert_eq!(err, StoreError::TabNotFound(3));
    }

    #[test]
    fn test_task_ids_not_reused_after_delete_or_archive() {
        let (mut store, work) = store_with_work();
        let first = store.create_task(work, "one", State::Finished, None).unwrap().id;
        let second = store.create_task(work, "two", State::Urgent, None).unwrap().id;
        store.delete_task(work, second).unwrap();
        assert_eq!(store.archive_finished(work).unwrap(), 1);
        let third = store.create_task(work, "three", State::Urgent, None).unwrap().id;
        assert_eq!((first, second, third), (1, 2, 3));
    }

    #[test]
    fn test_noop_update_keeps_modified_at() {
        let (mut store, work) = store_with_work();
        let id = store.create_task(work, "Write", State::Urgent, Some("c".into())).unwrap().id;
        let before = store.get_task(work, id).unwrap().clone();

        let update = TaskUpdate::default().title("Write").state(State::Urgent).comment("c");
        let after = store.update_task(work, id, update).unwrap();
        assert_eq!(*after, before);
    }

    #[test]
    fn test_changing_update_moves_modified_at_forward() {
        let (mut store, work) = store_with_work();
        let id = store.create_task(work, "Write", State::Urgent, None).unwrap().id;
        let created = store.get_task(work, id).unwrap().modified_at;

        let task = store
            .update_task(work, id, TaskUpdate::default().state(State::Finished))
            .unwrap();
        assert!(task.modified_at > created);
        assert_eq!(task.created_at, created);
        assert_eq!(task.state, State::Finished);
        assert_eq!(
            task.history.last().unwrap().changes,
            vec!["State changed from 'Urgent' to 'Finished'".to_string()]
        );

        let previous = task.modified_at;
        let task = store
            .update_task(work, id, TaskUpdate::default().title("Rewrite"))
            .unwrap();
        assert!(task.modified_at > previous);
    }

    #[test]
    fn test_update_records_every_changed_field() {
        let (mut store, work) = store_with_work();
        let id = store.create_task(work, "a", State::Urgent, None).unwrap().id;
        let update = TaskUpdate::default().title("b").state(State::Started).comment("note");
        let task = store.update_task(work, id, update).unwrap();
        assert_eq!(
            task.history.last().unwrap().summary(),
            "Title changed from 'a' to 'b' | State changed from 'Urgent' to 'Started' | Comment added"
        );
    }

    #[test]
    fn test_update_with_blank_comment_clears_it() {
        let (mut store, work) = store_with_work();
        let id = store.create_task(work, "a", State::Urgent, Some("x".into())).unwrap().id;
        let task = store.update_task(work, id, TaskUpdate::default().comment(" ")).unwrap();
        assert_eq!(task.comment, None);
        assert_eq!(task.history.last().unwrap().changes, vec!["Comment removed".to_string()]);
    }

    #[test]
    fn test_update_rejects_empty_title_without_changes() {
        let (mut store, work) = store_with_work();
        let id = store.create_task(work, "a", State::Urgent, None).unwrap().id;
        let before = store.clone();
        let update = TaskUpdate::default().title("").state(State::Finished);
        assert!(matches!(store.update_task(work, id, update), Err(StoreError::Validation(_))));
        assert_eq!(store, before);
    }

    #[test]
    fn test_update_missing_task() {
        let (mut store, work) = store_with_work();
        let err = store.update_task(work, 5, TaskUpdate::default()).unwrap_err();
        assert_eq!(err, StoreError::TaskNotFound { tab_id: work, task_id: 5 });
        assert!(err.is_not_found());
        let update = TaskUpdate::default().title("x");
        assert_eq!(store.update_task(99, 1, update).unwrap_err(), StoreError::TabNotFound(99));
    }

    #[test]
    fn test_delete_missing_task_leaves_store_untouched() {
        let (mut store, work) = store_with_work();
        store.create_task(work, "keep me", State::Urgent, None).unwrap();
        let before = store.clone();
        assert_eq!(
            store.delete_task(work, 9).unwrap_err(),
            StoreError::TaskNotFound { tab_id: work, task_id: 9 }
        );
        assert_eq!(store.delete_task(99, 1).unwrap_err(), StoreError::TabNotFound(99));
        assert_eq!(store, before);
    }

    #[test]
    fn test_delete_tab_cascades() {
        let (mut store, work) = store_with_work();
        let id = store.create_task(work, "a", State::Urgent, None).unwrap().id;
        let removed = store.delete_tab(work).unwrap();
        assert_eq!(removed.tasks.len(), 1);
        assert!(store.get_task(work, id).unwrap_err().is_not_found());
        assert_eq!(store.delete_tab(work).unwrap_err(), StoreError::TabNotFound(work));
    }

    #[test]
    fn test_filter_scenario() {
        let (mut store, _) = store_with_work();
        let work = store.find_tab("work").unwrap().id;
        let id = store.create_task(work, "Write report", State::Urgent, None).unwrap().id;
        store.create_task(work, "Plan", State::InPause, None).unwrap();

        let urgent = TaskFilter::by_state(State::Urgent);
        let found = store.filter_tasks(work, |t| urgent.matches(t)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);

        store.delete_task(work, id).unwrap();
        assert!(store.filter_tasks(work, |t| urgent.matches(t)).unwrap().is_empty());
        assert!(store.filter_tasks(42, |_| true).unwrap_err().is_not_found());
    }

    #[test]
    fn test_resolve_tab_by_name_then_id() {
        let mut store = Store::new();
        let work = store.create_tab("Work").unwrap().id;
        let numeric = store.create_tab("1999").unwrap().id;
        assert_eq!(store.resolve_tab("WORK").unwrap().id, work);
        assert_eq!(store.resolve_tab("1999").unwrap().id, numeric);
        assert_eq!(store.resolve_tab("1").unwrap().id, work);
        assert_eq!(store.resolve_tab("7").unwrap_err(), StoreError::TabNotFound(7));
        assert_eq!(store.resolve_tab("nope").unwrap_err(), StoreError::UnknownTab("nope".into()));
    }

    #[test]
    fn test_archive_hides_finished_tasks() {
        let (mut store, work) = store_with_work();
        let done = store.create_task(work, "done", State::Finished, None).unwrap().id;
        store.create_task(work, "open", State::Started, None).unwrap();
        store.archive_finished(work).unwrap();
        assert_eq!(store.tasks(work).unwrap().len(), 1);
        assert_eq!(store.archived(work).unwrap()[0].id, done);
        assert!(store.get_task(work, done).is_err());
    }

    #[test]
    fn test_import_tab_keeps_ids_and_advances_counter() {
        let mut store = Store::new();
        let now = Utc::now();
        let task = |id| Task {
            id,
            title: format!("t{id}"),
            state: State::InPause,
            comment: Some(String::new()),
            created_at: now,
            modified_at: now - Duration::seconds(5),
            history: Vec::new(),
        };
        let tab = store.import_tab("Legacy", vec![task(2), task(5)], 3).unwrap();
        assert_eq!(tab.next_task_id, 6);
        assert_eq!(tab.tasks[1].modified_at, tab.tasks[1].created_at);
        assert_eq!(tab.tasks[0].comment, None);
        let id = tab.id;
        assert_eq!(store.create_task(id, "next", State::Urgent, None).unwrap().id, 6);
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_import_tab_rejects_repeated_ids() {
        let mut store = Store::new();
        let now = Utc::now();
        let task = Task {
            id: 1,
            title: "x".into(),
            state: State::Urgent,
            comment: None,
            created_at: now,
            modified_at: now,
            history: Vec::new(),
        };
        let err = store.import_tab("Dup", vec![task.clone(), task], 1).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.list_tabs().is_empty());
    }

    #[test]
    fn test_import_tab_rejects_largest_id() {
        let mut store = Store::new();
        let now = Utc::now();
        let task = Task {
            id: u64::MAX,
            title: "x".into(),
            state: State::Urgent,
            comment: None,
            created_at: now,
            modified_at: now,
            history: Vec::new(),
        };
        let err = store.import_tab("Huge", vec![task], 1).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.list_tabs().is_empty());
        assert!(store.verify().is_ok());
    }

    #[test]
    fn test_exhausted_task_counter_is_an_error() {
        let (mut store, work) = store_with_work();
        store.tabs[0].next_task_id = u64::MAX;
        let before = store.clone();
        let err = store.create_task(work, "last", State::Urgent, None).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store, before);
    }

    #[test]
    fn test_verify_detects_counter_corruption() {
        let (mut store, work) = store_with_work();
        store.create_task(work, "a", State::Urgent, None).unwrap();
        assert!(store.verify().is_ok());
        store.tabs[0].next_task_id = 1;
        assert!(store.verify().is_err());
    }
}
