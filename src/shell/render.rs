//! Plain-text rendering of tabs, tasks and history.
//!
//! Every function returns a `String` so the same output serves the
//! interactive shell, the one-shot commands and the tests.

use chrono::{DateTime, Local, Utc};

use crate::config::DisplayOptions;
use crate::shell::colors::{self, paint, paint_bold, state_color};
use crate::tab::Tab;
use crate::task::{HistoryEntry, Task};

/// Local-time layout for timestamps in tables.
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MAX_TITLE_WIDTH: usize = 40;

pub const BANNER: &str = r#"
 _____  _    ____ _____  _    ____  _  __ ____
|_   _|/ \  | __ )_   _|/ \  / ___|| |/ // ___|
  | | / _ \ |  _ \ | | / _ \ \___ \| ' / \___ \
  | |/ ___ \| |_) || |/ ___ \ ___) | . \  ___) |
  |_/_/   \_\____/ |_/_/   \_\____/|_|\_\|____/
"#;

/// Format a UTC timestamp in local time.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(DISPLAY_TIME_FORMAT).to_string()
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// First `width` characters of a comment on one line, `...` when cut.
pub fn comment_preview(comment: Option<&str>, width: usize) -> String {
    let Some(comment) = comment else {
        return String::new();
    };
    let flat = comment.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > width {
        format!("{}...", flat.chars().take(width).collect::<String>())
    } else {
        flat
    }
}

/// The tab selection menu: numbered tabs followed by the menu actions.
pub fn tab_table(tabs: &[Tab], opts: &DisplayOptions) -> String {
    let c = opts.color;
    let width = tabs
        .iter()
        .map(|t| t.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Tab Name".len());
    let rule = format!("{:-<8} {:-<width$} {:-<5}", "", "", "");

    let mut lines = vec![paint_bold("Tabs Manager", colors::TITLE, c)];
    if tabs.is_empty() {
        lines.push(paint("[No tabs. Add new tab.]", colors::NOTICE, c));
    }
    lines.push(paint(&format!("{:<8} {:<width$} {}", "Number", "Tab Name", "Tasks"), colors::HEADER, c));
    lines.push(rule.clone());
    for (i, tab) in tabs.iter().enumerate() {
        lines.push(format!(
            "{} {} {}",
            paint(&format!("{:<8}", i + 1), colors::HEADER, c),
            paint(&format!("{:<width$}", tab.name), colors::TITLE, c),
            tab.tasks.len()
        ));
    }
    lines.push(rule);
    if !tabs.is_empty() {
        lines.push(format!("{:<8} {}", "m", paint("Modify Tab", colors::NOTICE, c)));
    }
    lines.push(format!("{:<8} {}", "n", paint("New Tab", colors::OK, c)));
    lines.push(format!("{:<8} {}", "e", paint("Exit", colors::DANGER, c)));
    lines.join("\n")
}

/// A table of tasks under `heading`.
pub fn task_table(heading: &str, tasks: &[&Task], opts: &DisplayOptions) -> String {
    let c = opts.color;
    if tasks.is_empty() {
        return paint("[No tasks. Add new task.]", colors::NOTICE, c);
    }

    let title_width = tasks
        .iter()
        .map(|t| t.title.chars().count())
        .max()
        .unwrap_or(0)
        .clamp("Title".len(), MAX_TITLE_WIDTH);
    let id_width = tasks
        .iter()
        .map(|t| t.id.to_string().len())
        .max()
        .unwrap_or(0)
        .max(2);

    let mut lines = vec![paint_bold(heading, colors::TITLE, c)];
    lines.push(paint(
        &format!(
            "{:<id_width$} {:<title_width$} {:<8} {:<19} {:<19} {}",
            "ID", "Title", "State", "Created", "Modified", "Comment"
        ),
        colors::HEADER,
        c,
    ));
    lines.push(format!(
        "{:-<id_width$} {:-<title_width$} {:-<8} {:-<19} {:-<19} {:-<7}",
        "", "", "", "", "", ""
    ));
    for task in tasks {
        lines.push(format!(
            "{} {:<title_width$} {} {} {} {}",
            paint(&format!("{:<id_width$}", task.id), colors::HEADER, c),
            truncate(&task.title, title_width),
            paint(&format!("{:<8}", task.state.label()), state_color(task.state), c),
            paint(&format_timestamp(task.created_at), colors::DIM, c),
            paint(&format_timestamp(task.modified_at), colors::DIM, c),
            paint(
                &comment_preview(task.comment.as_deref(), opts.comment_preview),
                colors::NOTICE,
                c
            ),
        ));
    }
    lines.join("\n")
}

/// Full view of one task, including its numbered history.
pub fn task_detail(task: &Task, opts: &DisplayOptions) -> String {
    let c = opts.color;
    let mut lines = vec![
        paint_bold(&task.title, colors::TITLE, c),
        format!("ID:            {}", task.id),
        format!(
            "State:         {}",
            paint(task.state.label(), state_color(task.state), c)
        ),
        format!("Created:       {}", format_timestamp(task.created_at)),
        format!("Last Modified: {}", format_timestamp(task.modified_at)),
        String::new(),
        format!("Comment: {}", task.comment.as_deref().unwrap_or("-")),
        String::new(),
        paint_bold("History", colors::TITLE, c),
    ];
    if task.history.is_empty() {
        lines.push("-".to_string());
    }
    for (i, entry) in task.history.iter().enumerate() {
        let line = format!("{}: {}", format_timestamp(entry.at), entry.summary());
        lines.push(format!("{}. {}", i + 1, paint(&line, colors::DIM, c)));
    }
    lines.join("\n")
}

/// One history entry broken out into a bullet per change.
pub fn change_details(entry: &HistoryEntry, opts: &DisplayOptions) -> String {
    let mut lines = vec![paint_bold(
        &format!("Change Details ({}):", format_timestamp(entry.at)),
        colors::TITLE,
        opts.color,
    )];
    lines.extend(entry.changes.iter().map(|change| format!("  • {change}")));
    lines.join("\n")
}
