//! The application phase derived from the designated input's playback.
//!
//! ```text
//!            designated input starts playing
//!   ┌──────┐ ───────────────────────────────▶ ┌───────┐
//!   │ IDLE │                                  │ DRAFT │
//!   └──────┘ ◀─────────────────────────────── └───────┘
//!            any other ACTS event for the designated input
//! ```
//!
//! `INGAME` and `RESULT` are reserved: they exist so clients can share the
//! vocabulary, but no device event drives the machine into them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::line::ActsEvent;

/// Application phase.  Starts at [`GameState::Idle`] and has no terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameState {
    #[default]
    Idle,
    Draft,
    InGame,
    Result,
}

impl GameState {
    /// Returns the state after observing `acts`.
    ///
    /// Only events for `designated` (the 1-based index of the designated
    /// input) can change the state.  Events for any other input, or any
    /// event while the designated input is unknown, leave it untouched.
    pub fn after_acts(self, acts: &ActsEvent, designated: Option<u32>) -> GameState {
        match designated {
            Some(index) if index == acts.input => {
                if acts.started_playing() {
                    GameState::Draft
                } else {
                    GameState::Idle
                }
            }
            _ => self,
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameState::Idle => "IDLE",
            GameState::Draft => "DRAFT",
            GameState::InGame => "INGAME",
            GameState::Result => "RESULT",
        };
        f.write_str(name)
    }
}
