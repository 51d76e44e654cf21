//! SQLite-backed roster.
//!
//! Schema:
//!
//! ```sql
//! teams   (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, alias TEXT)
//! players (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT,
//!          team_id INTEGER REFERENCES teams(id) ON DELETE CASCADE)
//! ```
//!
//! rusqlite is blocking, so every call runs on Tokio's blocking pool.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use tracing::info;

use crate::application::roster_store::{RosterError, RosterStore};
use crate::domain::roster::{NewTeam, Player, Team, TeamId};

impl From<rusqlite::Error> for RosterError {
    fn from(e: rusqlite::Error) -> Self {
        RosterError::Storage(e.to_string())
    }
}

/// Thread-safe SQLite roster.
#[derive(Clone)]
pub struct SqliteRosterStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRosterStore {
    /// Opens (or creates) the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open roster database {}", path.display()))?;
        info!("roster database: {}", path.display());
        Self::with_connection(conn)
    }

    /// A private in-memory database.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory roster")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE IF NOT EXISTS teams (
                 id    INTEGER PRIMARY KEY AUTOINCREMENT,
                 name  TEXT NOT NULL,
                 alias TEXT NOT NULL DEFAULT ''
             );
             CREATE TABLE IF NOT EXISTS players (
                 id      INTEGER PRIMARY KEY AUTOINCREMENT,
                 name    TEXT NOT NULL,
                 team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE
             );
             CREATE INDEX IF NOT EXISTS idx_players_team ON players(team_id);",
        )
        .context("failed to initialise roster schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `op` with the connection on the blocking pool.
    async fn with_conn<T, F>(&self, op: F) -> Result<T, RosterError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, RosterError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| RosterError::Storage("roster connection lock poisoned".into()))?;
            op(&mut guard)
        })
        .await
        .map_err(|e| RosterError::Storage(format!("roster task failed: {e}")))?
    }
}

fn load_teams(conn: &Connection) -> Result<Vec<Team>, RosterError> {
    let mut stmt = conn.prepare("SELECT id, name, alias FROM teams ORDER BY id")?;
    let mut teams = stmt
        .query_map([], |row| {
            Ok(Team {
                id: row.get(0)?,
                name: row.get(1)?,
                alias: row.get(2)?,
                players: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare("SELECT id, name, team_id FROM players ORDER BY id")?;
    let players = stmt.query_map([], |row| {
        Ok(Player {
            id: row.get(0)?,
            name: row.get(1)?,
            team_id: row.get(2)?,
        })
    })?;
    for player in players {
        let player = player?;
        if let Some(team) = teams.iter_mut().find(|t| t.id == player.team_id) {
            team.players.push(player);
        }
    }
    Ok(teams)
}

#[async_trait]
impl RosterStore for SqliteRosterStore {
    async fn list_teams(&self) -> Result<Vec<Team>, RosterError> {
        self.with_conn(|conn| load_teams(conn)).await
    }

    async fn add_team(&self, team: NewTeam) -> Result<Team, RosterError> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO teams (name, alias) VALUES (?1, ?2)",
                params![team.name, team.alias],
            )?;
            let team_id: TeamId = tx.last_insert_rowid();

            let mut players = Vec::with_capacity(team.players.len());
            for name in team.players {
                tx.execute(
                    "INSERT INTO players (name, team_id) VALUES (?1, ?2)",
                    params![name, team_id],
                )?;
                players.push(Player {
                    id: tx.last_insert_rowid(),
                    name,
                    team_id,
                });
            }
            tx.commit()?;

            Ok(Team {
                id: team_id,
                name: team.name,
                alias: team.alias,
                players,
            })
        })
        .await
    }

    async fn delete_team(&self, id: TeamId) -> Result<(), RosterError> {
        self.with_conn(move |conn| {
            let deleted = conn.execute("DELETE FROM teams WHERE id = ?1", params![id])?;
            if deleted == 0 {
                return Err(RosterError::TeamNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_all_teams(&self) -> Result<(), RosterError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM players", [])?;
            tx.execute("DELETE FROM teams", [])?;
            tx.commit()?;
            Ok(())
        })
        .await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn red() -> NewTeam {
        NewTeam {
            name: "Red".to_string(),
            alias: "R".to_string(),
            players: vec!["A".to_string(), "B".to_string()],
        }
    }

    #[tokio::test]
    async fn test_add_team_then_list() {
        // Arrange
        let store = SqliteRosterStore::open_in_memory().unwrap();

        // Act
        let added = store.add_team(red()).await.unwrap();
        let teams = store.list_teams().await.unwrap();

        // Assert
        assert_eq!(teams, vec![added]);
        assert_eq!(teams[0].name, "Red");
        let names: Vec<&str> = teams[0].players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[tokio::test]
    async fn test_delete_team_cascades_to_players() {
        // Arrange
        let store = SqliteRosterStore::open_in_memory().unwrap();
        let red = store.add_team(red()).await.unwrap();

        // Act
        store.delete_team(red.id).await.unwrap();

        // Assert
        assert!(store.list_teams().await.unwrap().is_empty());
        let conn = store.conn.lock().unwrap();
        let players: i64 = conn
            .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))
            .unwrap();
        assert_eq!(players, 0);
    }

    #[tokio::test]
    async fn test_delete_unknown_team_is_not_found() {
        let store = SqliteRosterStore::open_in_memory().unwrap();
        assert_eq!(
            store.delete_team(7).await,
            Err(RosterError::TeamNotFound(7))
        );
    }

    #[tokio::test]
    async fn test_delete_all_teams() {
        let store = SqliteRosterStore::open_in_memory().unwrap();
        store.add_team(red()).await.unwrap();
        store.add_team(red()).await.unwrap();

        store.delete_all_teams().await.unwrap();

        assert!(store.list_teams().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_roster_survives_reopen() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roster.db");
        {
            let store = SqliteRosterStore::open(&path).unwrap();
            store.add_team(red()).await.unwrap();
        }

        // Act
        let store = SqliteRosterStore::open(&path).unwrap();
        let teams = store.list_teams().await.unwrap();

        // Assert
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].players.len(), 2);
    }

    #[tokio::test]
    async fn test_open_creates_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("roster.db");

        SqliteRosterStore::open(&path).unwrap();

        assert!(path.exists());
    }
}
