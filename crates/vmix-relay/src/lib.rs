//! vmix-relay library crate.
//!
//! This crate owns the single TCP session to a vMix instance and fans its
//! state out to any number of WebSocket clients.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Web clients (JSON over WebSocket)
//!         ↕
//! [vmix-relay]
//!   ├── domain/           Pure types: config, client messages, roster records
//!   ├── application/      Device session core, relay hub, roster store seam
//!   └── infrastructure/
//!         ├── device_conn/ The one TCP connection to vMix (actor task)
//!         ├── ws_server/   WebSocket accept loop, ticker, event forwarder
//!         └── roster_db/   SQLite roster store (rusqlite)
//!         ↕
//! vMix  (line-oriented TCP API, port 8099)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `vmix-core`; it talks to the
//!   device and the roster only through the `DeviceLink` and `RosterStore`
//!   traits, which keeps it testable without sockets.
//! - `infrastructure` depends on all other layers plus `tokio`,
//!   `tokio-tungstenite`, and `rusqlite`.

/// Domain layer: pure types (no I/O).
pub mod domain;

/// Application layer: device state derivation and client fan-out.
pub mod application;

/// Infrastructure layer: device TCP connection, WebSocket server, SQLite.
pub mod infrastructure;
