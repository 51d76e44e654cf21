//! Infrastructure layer: sockets, tasks, and storage.
//!
//! - [`device_conn`] – the single TCP connection to vMix and its task.
//! - [`ws_server`] – the WebSocket accept loop and per-client sessions.
//! - [`roster_db`] – the SQLite roster store.

pub mod device_conn;
pub mod roster_db;
pub mod ws_server;

pub use device_conn::{spawn_device_session, DeviceHandle, DeviceSubscription};
pub use roster_db::SqliteRosterStore;
pub use ws_server::{run_server, serve};
