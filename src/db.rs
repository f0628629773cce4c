//! Persistence for the record store.
//!
//! The store lives in a single pretty-printed JSON file. Saves go through a
//! temporary file and a rename so a crash never leaves a half-written file
//! behind. This module also reads the older one-file-per-tab data directory.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::fields::State;
use crate::store::Store;
use crate::task::{HistoryEntry, Task, TaskId};

/// Timestamp layout used by the legacy per-tab files.
pub const LEGACY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Unrecoverable storage failures.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("{} is not valid JSON: {source}", .path.display())]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("failed to encode data: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{} is inconsistent: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Load/save seam between the shell and durable storage.
pub trait Persistence {
    fn load(&self) -> Result<Store, PersistError>;
    fn save(&self, store: &Store) -> Result<(), PersistError>;
}

/// The store as one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for JsonFile {
    /// A missing file is an empty store. Anything unreadable is an error,
    /// never a fresh start, so existing data is not overwritten by accident.
    fn load(&self) -> Result<Store, PersistError> {
        if !self.path.exists() {
            info!("event=store_load status=missing path={}", self.path.display());
            return Ok(Store::new());
        }
        let mut buf = String::new();
        File::open(&self.path)
            .and_then(|mut f| f.read_to_string(&mut buf))
            .map_err(|source| PersistError::Read { path: self.path.clone(), source })?;
        let store: Store = serde_json::from_str(&buf)
            .map_err(|source| PersistError::Parse { path: self.path.clone(), source })?;
        store
            .verify()
            .map_err(|reason| PersistError::Invalid { path: self.path.clone(), reason })?;
        info!(
            "event=store_load status=ok tabs={} path={}",
            store.list_tabs().len(),
            self.path.display()
        );
        Ok(store)
    }

    fn save(&self, store: &Store) -> Result<(), PersistError> {
        let write_err = |source| PersistError::Write { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let data = serde_json::to_string_pretty(store)?;

        // Atomic-ish write via temp + rename.
        let tmp = self.path.with_extension("json.tmp");
        let written = File::create(&tmp)
            .and_then(|mut f| {
                f.write_all(data.as_bytes())?;
                f.flush()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(source) = written {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(source));
        }
        debug!("event=store_save status=ok bytes={}", data.len());
        Ok(())
    }
}

/// Copy the data file into `backup_dir` under a timestamped name.
pub fn create_backup(data_file: &Path, backup_dir: &Path) -> Result<PathBuf, PersistError> {
    if !data_file.exists() {
        return Err(PersistError::Read {
            path: data_file.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "data file does not exist"),
        });
    }
    fs::create_dir_all(backup_dir)
        .map_err(|source| PersistError::Write { path: backup_dir.to_path_buf(), source })?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let file_name = data_file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("tabs.json");
    let backup_path = backup_dir.join(format!("{timestamp}_{file_name}"));

    fs::copy(data_file, &backup_path)
        .map_err(|source| PersistError::Write { path: backup_path.clone(), source })?;
    info!("event=backup status=ok path={}", backup_path.display());
    Ok(backup_path)
}

/// A tab read from the legacy data directory, ready for `Store::import_tab`.
#[derive(Debug, Clone)]
pub struct LegacyTab {
    pub name: String,
    pub tasks: Vec<Task>,
    pub task_counter: TaskId,
    pub source: PathBuf,
}

#[derive(Deserialize)]
struct LegacyTabFile {
    name: String,
    #[serde(default)]
    tasks: Vec<LegacyTask>,
    task_counter: Option<TaskId>,
}

#[derive(Deserialize)]
struct LegacyTask {
    id: TaskId,
    title: String,
    state: String,
    #[serde(default)]
    comment: Option<String>,
    created_at: String,
    modified_at: String,
    #[serde(default)]
    history: Vec<String>,
}

/// Read every `*.json` file of a legacy data directory, in file name order.
pub fn load_legacy_dir(dir: &Path) -> Result<Vec<LegacyTab>, PersistError> {
    let read_err = |source| PersistError::Read { path: dir.to_path_buf(), source };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();

    let mut tabs = Vec::with_capacity(files.len());
    for path in files {
        tabs.push(load_legacy_file(&path)?);
    }
    Ok(tabs)
}

fn load_legacy_file(path: &Path) -> Result<LegacyTab, PersistError> {
    let data = fs::read_to_string(path)
        .map_err(|source| PersistError::Read { path: path.to_path_buf(), source })?;
    let file: LegacyTabFile = serde_json::from_str(&data)
        .map_err(|source| PersistError::Parse { path: path.to_path_buf(), source })?;
    let invalid = |reason: String| PersistError::Invalid { path: path.to_path_buf(), reason };

    let mut tasks = Vec::with_capacity(file.tasks.len());
    for raw in file.tasks {
        let state = raw
            .state
            .chars()
            .next()
            .filter(|_| raw.state.chars().count() == 1)
            .and_then(State::from_code)
            .ok_or_else(|| invalid(format!("task {} has unknown state '{}'", raw.id, raw.state)))?;
        let created_at = parse_legacy_time(&raw.created_at)
            .ok_or_else(|| invalid(format!("task {} has bad created_at '{}'", raw.id, raw.created_at)))?;
        let modified_at = parse_legacy_time(&raw.modified_at).unwrap_or_else(|| {
            warn!("event=legacy_import task={} status=bad_modified_at", raw.id);
            created_at
        });
        let history = raw
            .history
            .iter()
            .map(|line| parse_legacy_history(line, created_at))
            .collect();
        tasks.push(Task {
            id: raw.id,
            title: raw.title,
            state,
            comment: raw.comment,
            created_at,
            modified_at,
            history,
        });
    }

    let task_counter = file
        .task_counter
        .unwrap_or(tasks.len() as TaskId + 1);
    Ok(LegacyTab { name: file.name, tasks, task_counter, source: path.to_path_buf() })
}

/// Parse a legacy local-time timestamp into UTC.
pub fn parse_legacy_time(s: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), LEGACY_TIME_FORMAT).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Split `"<timestamp>: change | change"` into a history entry.
///
/// Lines without a readable timestamp are kept whole, dated `fallback`.
fn parse_legacy_history(line: &str, fallback: DateTime<Utc>) -> HistoryEntry {
    let (at, body) = match line.split_once(": ") {
        Some((stamp, rest)) => match parse_legacy_time(stamp) {
            Some(at) => (at, rest),
            None => (fallback, line),
        },
        None => (fallback, line),
    };
    let changes = body
        .split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    HistoryEntry { at, changes }
}
