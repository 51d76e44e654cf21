//! The device session's decision logic, free of sockets.
//!
//! [`SessionCore`] owns the [`DeviceState`] and processes one logical line at
//! a time.  For every line it returns a [`LineOutcome`] describing what the
//! I/O task must do next: which [`DeviceEvent`]s to publish and which
//! [`DeviceCommand`]s to write back to the device.
//!
//! The connection task in `infrastructure::device_conn` is the only caller
//! in production.  Because the current time is passed in rather than read
//! from the clock, the snapshot debounce can be tested with hand-built
//! instants.
//!
//! # Per-category rules
//!
//! | Category | State change                          | Event              | Commands              |
//! |----------|---------------------------------------|--------------------|-----------------------|
//! | Snapshot | replace snapshot, inputs, index       | `Snapshot`         | none                  |
//! | Tally    | none                                  | `Tally`            | none                  |
//! | Acts     | game state, if for designated input   | `Acts` (+ change)  | none                  |
//! | Function | debounce timestamp                    | `Function`         | `XML`, when debounced |
//! | Text     | countdown                             | none               | none                  |
//! | Generic  | none                                  | `Generic`          | none                  |

use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

use vmix_core::protocol::line::{snapshot_body, text_value};
use vmix_core::{classify, ActsEvent, Category, DeviceCommand, DeviceState, GameState, TallyState};

use crate::domain::config::RelayConfig;

// ── Events ────────────────────────────────────────────────────────────────────

/// Everything the device session reports to its listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// The TCP connection opened and the bootstrap commands were queued.
    Connected,
    /// The TCP connection closed.
    Disconnected,
    /// Connecting failed; the session retries after the reconnect delay.
    ConnectionError(String),
    /// A well-formed snapshot was accepted.  Carries the raw XML.
    Snapshot(String),
    Tally(TallyState),
    Acts(ActsEvent),
    /// A raw `FUNCTION` line.
    Function(String),
    GameStateChanged(GameState),
    /// Any other line, including rejected snapshots.
    Generic(String),
}

/// What the I/O task must do after the core processed an input.
#[derive(Debug, Default, PartialEq)]
pub struct LineOutcome {
    /// Events to publish, in order.
    pub events: Vec<DeviceEvent>,
    /// Commands to write to the device, in order.
    pub commands: Vec<DeviceCommand>,
    /// `true` when [`SessionCore::state`] changed and must be republished.
    pub state_changed: bool,
}

impl LineOutcome {
    fn event(event: DeviceEvent) -> Self {
        Self {
            events: vec![event],
            ..Self::default()
        }
    }
}

// ── SessionCore ───────────────────────────────────────────────────────────────

/// Single writer of [`DeviceState`].
#[derive(Debug)]
pub struct SessionCore {
    state: DeviceState,
    designated_title: String,
    countdown_field: String,
    snapshot_debounce: Duration,
}

impl SessionCore {
    pub fn new(
        designated_title: impl Into<String>,
        countdown_field: impl Into<String>,
        snapshot_debounce: Duration,
    ) -> Self {
        Self {
            state: DeviceState::default(),
            designated_title: designated_title.into(),
            countdown_field: countdown_field.into(),
            snapshot_debounce,
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(
            config.draft_input_title.clone(),
            config.draft_text_field.clone(),
            config.snapshot_debounce,
        )
    }

    /// The current device state.
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Called once per successful connect.  Returns the bootstrap commands.
    ///
    /// The bootstrap `XML` request counts as a snapshot request for the
    /// debounce window.
    pub fn on_connected(&mut self, now: Instant) -> LineOutcome {
        self.state.last_snapshot_request = Some(now);
        LineOutcome {
            events: vec![DeviceEvent::Connected],
            commands: DeviceCommand::bootstrap().to_vec(),
            state_changed: true,
        }
    }

    /// Called once when the connection closes.  Returns the teardown
    /// commands; the caller writes them best-effort.
    ///
    /// Device state is kept: clients keep seeing the last snapshot until a
    /// new one arrives after reconnecting.
    pub fn on_disconnected(&mut self) -> LineOutcome {
        LineOutcome {
            events: vec![DeviceEvent::Disconnected],
            commands: DeviceCommand::teardown().to_vec(),
            state_changed: false,
        }
    }

    /// Processes one logical line received from the device.
    pub fn handle_line(&mut self, line: &str, now: Instant) -> LineOutcome {
        match classify(line) {
            Category::Snapshot => self.handle_snapshot(line),
            Category::Tally => match TallyState::parse(line) {
                Some(tally) => LineOutcome::event(DeviceEvent::Tally(tally)),
                None => self.generic(line),
            },
            Category::Acts => self.handle_acts(line),
            Category::Function => self.handle_function(line, now),
            Category::Text => self.handle_text(line),
            Category::Generic => self.generic(line),
        }
    }

    fn handle_snapshot(&mut self, line: &str) -> LineOutcome {
        let Some(body) = snapshot_body(line) else {
            return self.generic(line);
        };

        match self
            .state
            .apply_snapshot(body, &self.designated_title, &self.countdown_field)
        {
            Ok(()) => {
                debug!(
                    "snapshot accepted: {} inputs, designated input {:?}",
                    self.state.inputs.len(),
                    self.state.designated_input
                );
                LineOutcome {
                    events: vec![DeviceEvent::Snapshot(body.to_string())],
                    commands: Vec::new(),
                    state_changed: true,
                }
            }
            Err(e) => {
                debug!("snapshot rejected: {e}");
                self.generic(line)
            }
        }
    }

    fn handle_acts(&mut self, line: &str) -> LineOutcome {
        let Some(acts) = ActsEvent::parse(line) else {
            return self.generic(line);
        };

        let mut outcome = LineOutcome::event(DeviceEvent::Acts(acts.clone()));
        match self.state.apply_acts(&acts) {
            Some(next) => {
                info!("game state is now {next} (input {} {})", acts.input, acts.event);
                outcome.events.push(DeviceEvent::GameStateChanged(next));
                outcome.state_changed = true;
            }
            None if Some(acts.input) != self.state.designated_input => {
                trace!("acts for input {} ignored by game state", acts.input);
            }
            None => {}
        }
        outcome
    }

    fn handle_function(&mut self, line: &str, now: Instant) -> LineOutcome {
        let mut outcome = LineOutcome::event(DeviceEvent::Function(line.to_string()));
        if self
            .state
            .snapshot_request_due(now, self.snapshot_debounce)
        {
            self.state.last_snapshot_request = Some(now);
            outcome.commands.push(DeviceCommand::Xml);
            outcome.state_changed = true;
        } else {
            trace!("snapshot request suppressed by debounce");
        }
        outcome
    }

    fn handle_text(&mut self, line: &str) -> LineOutcome {
        let Some(value) = text_value(line) else {
            return self.generic(line);
        };
        let before = self.state.countdown;
        self.state.apply_countdown_text(value);
        LineOutcome {
            state_changed: self.state.countdown != before,
            ..LineOutcome::default()
        }
    }

    fn generic(&self, line: &str) -> LineOutcome {
        debug!("device: {line}");
        LineOutcome::event(DeviceEvent::Generic(line.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
