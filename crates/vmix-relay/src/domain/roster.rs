//! Roster records: teams and their players.
//!
//! The roster is always exchanged as a whole.  Clients never receive
//! incremental patches; every mutation is followed by a full `teams`
//! broadcast.

use serde::{Deserialize, Serialize};

/// Store-assigned team identifier.
pub type TeamId = i64;

/// A player belonging to one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub team_id: TeamId,
}

/// A team with its ordered list of players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub alias: String,
    pub players: Vec<Player>,
}

/// Payload of the client `addTeam` event.
///
/// ```json
/// {"name":"Red","alias":"R","players":["A","B"]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    #[serde(default)]
    pub alias: String,
    /// Player names, in roster order.
    #[serde(default)]
    pub players: Vec<String>,
}
