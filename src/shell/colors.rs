//! Color constants for terminal output.

use crossterm::style::{Color, Stylize};

use crate::fields::State;

/// Table headers and menu numbers.
pub const HEADER: Color = Color::Cyan;
/// Tab names and table titles.
pub const TITLE: Color = Color::Magenta;
/// Success messages.
pub const OK: Color = Color::Green;
/// Warnings and "nothing to show" notices.
pub const NOTICE: Color = Color::Yellow;
/// Errors and destructive prompts.
pub const DANGER: Color = Color::Red;
/// Timestamps and history lines.
pub const DIM: Color = Color::DarkGrey;

/// Color used for a task state.
pub fn state_color(state: State) -> Color {
    match state {
        State::Urgent => Color::Red,
        State::InPause => Color::Blue,
        State::Started => Color::Yellow,
        State::Finished => Color::Green,
    }
}

/// Wrap `text` in color escapes, or return it unchanged when color is off.
pub fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        text.with(color).to_string()
    } else {
        text.to_string()
    }
}

/// Bold variant of [`paint`].
pub fn paint_bold(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        text.with(color).bold().to_string()
    } else {
        text.to_string()
    }
}
