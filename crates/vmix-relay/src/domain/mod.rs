//! Domain layer for vmix-relay.
//!
//! Pure types with no dependencies on I/O or async runtimes:
//!
//! - Configuration ([`RelayConfig`])
//! - The JSON events exchanged with web clients
//! - Roster records (teams and players)

pub mod config;
pub mod messages;
pub mod roster;

pub use config::RelayConfig;
pub use messages::{ClientEvent, ServerEvent};
pub use roster::{NewTeam, Player, Team, TeamId};
