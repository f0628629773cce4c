//! Enumerations and field types for tasks.
//!
//! The task state set is fixed. Each state has a single-letter code used by the
//! interactive menus and by the legacy data files.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Task progress state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum State {
    #[value(alias = "u")]
    Urgent,
    #[value(alias = "p")]
    InPause,
    #[value(alias = "g")]
    Started,
    #[value(alias = "f")]
    Finished,
}

impl State {
    /// Every state, in menu order.
    pub const ALL: [State; 4] = [State::Urgent, State::InPause, State::Started, State::Finished];

    /// Single-letter menu code.
    pub fn code(self) -> char {
        match self {
            State::Urgent => 'u',
            State::InPause => 'p',
            State::Started => 'g',
            State::Finished => 'f',
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            State::Urgent => "Urgent",
            State::InPause => "In Pause",
            State::Started => "Started",
            State::Finished => "Finished",
        }
    }

    /// Look a state up by its single-letter code.
    pub fn from_code(code: char) -> Option<State> {
        State::ALL.into_iter().find(|s| s.code() == code.to_ascii_lowercase())
    }

    /// Menu help text such as `u=Urgent, p=In Pause, g=Started, f=Finished`.
    pub fn menu_help() -> String {
        State::ALL
            .iter()
            .map(|s| format!("{}={}", s.code(), s.label()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for State {
    type Err = StoreError;

    /// Accepts a code (`u`), a label (`In Pause`) or a kebab name (`in-pause`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let mut chars = raw.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(state) = State::from_code(c) {
                return Ok(state);
            }
        }
        let normalised = raw.to_lowercase().replace([' ', '_'], "-");
        State::ALL
            .into_iter()
            .find(|st| st.label().to_lowercase().replace(' ', "-") == normalised)
            .ok_or_else(|| {
                StoreError::Validation(format!(
                    "unknown state '{raw}' (expected one of {})",
                    State::menu_help()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for state in State::ALL {
            assert_eq!(State::from_code(state.code()), Some(state));
        }
        assert_eq!(State::from_code('G'), Some(State::Started));
        assert_eq!(State::from_code('x'), None);
    }

    #[test]
    fn test_parse_accepts_codes_labels_and_names() {
        assert_eq!("u".parse::<State>().unwrap(), State::Urgent);
        assert_eq!("In Pause".parse::<State>().unwrap(), State::InPause);
        assert_eq!("in-pause".parse::<State>().unwrap(), State::InPause);
        assert_eq!(" finished ".parse::<State>().unwrap(), State::Finished);
    }

    #[test]
    fn test_parse_rejects_unknown_state() {
        let err = "blocked".parse::<State>().unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!("".parse::<State>().is_err());
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        assert_eq!(serde_json::to_string(&State::InPause).unwrap(), "\"in-pause\"");
        let back: State = serde_json::from_str("\"finished\"").unwrap();
        assert_eq!(back, State::Finished);
    }
}
