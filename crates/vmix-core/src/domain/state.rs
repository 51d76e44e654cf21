//! [`DeviceState`]: everything the relay knows about the device.
//!
//! A single writer (the relay's device task) mutates this struct in receipt
//! order and publishes immutable copies to readers.  The methods here are
//! the only way the state changes, and each one either applies a complete
//! update or leaves the state untouched.

use std::time::{Duration, Instant};

use crate::domain::game_state::GameState;
use crate::domain::snapshot::{designated_index, parse_snapshot, Input, SnapshotError};
use crate::protocol::line::ActsEvent;

/// Device state derived from the line stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceState {
    /// The most recent well-formed XML snapshot, verbatim.  Empty until the
    /// first snapshot arrives.
    pub raw_snapshot: String,
    /// Inputs parsed from `raw_snapshot`, in document order.
    pub inputs: Vec<Input>,
    /// 1-based position of the designated input in `inputs`; `None` while
    /// unknown.
    pub designated_input: Option<u32>,
    pub game_state: GameState,
    /// Current value of the designated input's countdown text field.
    pub countdown: Option<i64>,
    /// When a snapshot was last requested from the device.
    pub last_snapshot_request: Option<Instant>,
}

impl DeviceState {
    /// Replaces the snapshot, inputs, designated index, and countdown.
    ///
    /// The designated index is always recomputed from the new input list,
    /// so a renamed input becomes unknown rather than keeping a stale index.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] for a malformed document, in which case
    /// nothing is modified.
    pub fn apply_snapshot(
        &mut self,
        xml: &str,
        designated_title: &str,
        countdown_field: &str,
    ) -> Result<(), SnapshotError> {
        let inputs = parse_snapshot(xml)?;
        let designated_input = designated_index(&inputs, designated_title);

        self.raw_snapshot = xml.to_string();
        self.inputs = inputs;
        self.designated_input = designated_input;
        self.countdown = self
            .designated()
            .and_then(|input| input.text(countdown_field))
            .and_then(parse_countdown);
        Ok(())
    }

    /// Feeds an ACTS event through the game-state machine.
    ///
    /// Returns the new state if it changed.
    pub fn apply_acts(&mut self, acts: &ActsEvent) -> Option<GameState> {
        let next = self.game_state.after_acts(acts, self.designated_input);
        if next == self.game_state {
            return None;
        }
        self.game_state = next;
        Some(next)
    }

    /// Updates the countdown from an `XMLTEXT` reply.  Non-numeric text
    /// clears it.
    pub fn apply_countdown_text(&mut self, text: &str) {
        self.countdown = parse_countdown(text);
    }

    /// The designated input, if present in the current snapshot.
    pub fn designated(&self) -> Option<&Input> {
        let index = self.designated_input?.checked_sub(1)?;
        self.inputs.get(index as usize)
    }

    /// Returns `true` when more than `window` has passed since the last
    /// snapshot request (or none was ever made).
    pub fn snapshot_request_due(&self, now: Instant, window: Duration) -> bool {
        match self.last_snapshot_request {
            Some(last) => now.saturating_duration_since(last) > window,
            None => true,
        }
    }
}

/// Parses a countdown text field into whole seconds.
///
/// Accepts plain integers (`"30"`), decimals (`"29.6"`, truncated), and
/// `m:ss` clocks (`"1:05"` is 65).  A leading `-` on a clock negates the
/// whole value.  Values that do not fit an `i64` are rejected.
pub fn parse_countdown(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Some((minutes, seconds)) = text.split_once(':') {
        let minutes = minutes.trim();
        let (negative, minutes) = match minutes.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, minutes),
        };
        let minutes: i64 = minutes.parse().ok().filter(|m| *m >= 0)?;
        let seconds: i64 = seconds.trim().parse().ok().filter(|s| *s >= 0)?;
        let total = minutes.checked_mul(60)?.checked_add(seconds)?;
        return Some(if negative { -total } else { total });
    }
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    text.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.trunc() as i64)
}
