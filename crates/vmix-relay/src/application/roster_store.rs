//! The roster persistence port and its in-memory implementation.
//!
//! The hub only sees [`RosterStore`].  `MemoryRosterStore` is the default;
//! the SQLite-backed store lives in `infrastructure::roster_db`.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::roster::{NewTeam, Player, Team, TeamId};

/// Errors returned by a [`RosterStore`].
#[derive(Debug, Error, PartialEq)]
pub enum RosterError {
    #[error("team {0} not found")]
    TeamNotFound(TeamId),

    /// The backing store failed (I/O, SQL, poisoned lock).
    #[error("roster storage error: {0}")]
    Storage(String),
}

/// CRUD over teams and their players.
///
/// Every call is a complete operation; callers never see a half-written
/// team.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// All teams in creation order, each with its players in roster order.
    async fn list_teams(&self) -> Result<Vec<Team>, RosterError>;

    /// Creates a team and its players, returning the stored record.
    async fn add_team(&self, team: NewTeam) -> Result<Team, RosterError>;

    /// Deletes one team and its players.
    async fn delete_team(&self, id: TeamId) -> Result<(), RosterError>;

    async fn delete_all_teams(&self) -> Result<(), RosterError>;
}

// ── In-memory store ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MemoryRoster {
    teams: Vec<Team>,
    next_team_id: TeamId,
    next_player_id: i64,
}

/// Roster kept in process memory; lost on restart.
#[derive(Debug, Default)]
pub struct MemoryRosterStore {
    inner: Mutex<MemoryRoster>,
}

impl MemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RosterStore for MemoryRosterStore {
    async fn list_teams(&self) -> Result<Vec<Team>, RosterError> {
        Ok(self.inner.lock().await.teams.clone())
    }

    async fn add_team(&self, team: NewTeam) -> Result<Team, RosterError> {
        let mut roster = self.inner.lock().await;

        roster.next_team_id += 1;
        let team_id = roster.next_team_id;

        let mut players = Vec::with_capacity(team.players.len());
        for name in team.players {
            roster.next_player_id += 1;
            players.push(Player {
                id: roster.next_player_id,
                name,
                team_id,
            });
        }

        let stored = Team {
            id: team_id,
            name: team.name,
            alias: team.alias,
            players,
        };
        roster.teams.push(stored.clone());
        Ok(stored)
    }

    async fn delete_team(&self, id: TeamId) -> Result<(), RosterError> {
        let mut roster = self.inner.lock().await;
        let before = roster.teams.len();
        roster.teams.retain(|team| team.id != id);
        if roster.teams.len() == before {
            return Err(RosterError::TeamNotFound(id));
        }
        Ok(())
    }

    async fn delete_all_teams(&self) -> Result<(), RosterError> {
        self.inner.lock().await.teams.clear();
        Ok(())
    }
}
