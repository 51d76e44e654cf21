//! JSON events exchanged with web clients over WebSocket.
//!
//! Every text frame carries one event as a JSON envelope:
//!
//! ```json
//! {"event":"xml","data":"<vmix>...</vmix>"}
//! {"event":"countDownDraft","data":27}
//! {"event":"deleteAllTeams"}
//! ```
//!
//! Serde's adjacently tagged representation (`tag = "event"`,
//! `content = "data"`) produces exactly this shape.  The two directions use
//! separate enums so a server-only event can never be accepted from a
//! client, and vice versa.

use serde::{Deserialize, Serialize};

use crate::domain::roster::{NewTeam, Team, TeamId};

// ── Server → Client ───────────────────────────────────────────────────────────

/// Events the relay pushes to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// The latest raw XML snapshot (empty string before the first one).
    Xml(String),

    /// A raw `FUNCTION` line from the device.
    Function(String),

    /// The full roster.
    Teams(Vec<Team>),

    /// Seconds left on the draft countdown.  Only sent while the game state
    /// is `DRAFT`.
    CountDownDraft(i64),
}

impl ServerEvent {
    /// The wire name of the event, for log messages.
    ///
    /// Logging the name rather than the event keeps multi-hundred-kilobyte
    /// snapshots out of the log.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Xml(_) => "xml",
            ServerEvent::Function(_) => "function",
            ServerEvent::Teams(_) => "teams",
            ServerEvent::CountDownDraft(_) => "countDownDraft",
        }
    }
}

// ── Client → Server ───────────────────────────────────────────────────────────

/// Events clients send to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// A raw device command, forwarded verbatim (e.g. `FUNCTION Cut`).
    Command(String),

    /// Create a team with its players.
    AddTeam(NewTeam),

    /// Delete one team (and its players) by id.
    DeleteTeam(TeamId),

    /// Delete every team.
    DeleteAllTeams,
}

impl ClientEvent {
    /// The wire name of the event, for log messages.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Command(_) => "command",
            ClientEvent::AddTeam(_) => "addTeam",
            ClientEvent::DeleteTeam(_) => "deleteTeam",
            ClientEvent::DeleteAllTeams => "deleteAllTeams",
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
