//! Relay configuration types.
//!
//! [`RelayConfig`] is the single source of truth for all runtime settings.
//! It is built from CLI arguments and environment variables in `main.rs`,
//! or from [`RelayConfig::default`] in tests and local development.
//!
//! Keeping configuration as a plain struct (no environment reads in here)
//! means the relay can be embedded in integration tests with a config that
//! points at a fake device on an ephemeral port.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// All runtime configuration for the relay.
///
/// Build this once at startup and share it behind an `Arc`.
///
/// # Example
///
/// ```rust
/// use vmix_relay::domain::RelayConfig;
///
/// let cfg = RelayConfig::default();
/// assert_eq!(cfg.ws_bind_addr.port(), 3000);
/// assert_eq!(cfg.device_port, 8099);
/// ```
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address the WebSocket server binds to.
    pub ws_bind_addr: SocketAddr,

    /// Hostname or IP address of the vMix machine.
    pub device_host: String,

    /// vMix TCP API port.  vMix always listens on 8099.
    pub device_port: u16,

    /// Title of the input whose playback drives the game state.
    pub draft_input_title: String,

    /// Name of the designated input's text field that holds the countdown.
    pub draft_text_field: String,

    /// Period of the hub tick that broadcasts the draft countdown.
    pub tick_interval: Duration,

    /// Delay between device reconnect attempts.
    pub reconnect_delay: Duration,

    /// Minimum spacing between snapshot requests triggered by function
    /// events.
    pub snapshot_debounce: Duration,

    /// Per-client outbound queue depth.  When a slow client's queue is full,
    /// further events to that client are dropped rather than stalling the
    /// others.
    pub client_queue_depth: usize,

    /// SQLite file for the roster.  `None` keeps the roster in memory.
    pub roster_db: Option<PathBuf>,
}

impl Default for RelayConfig {
    /// | Field              | Default          |
    /// |--------------------|------------------|
    /// | ws_bind_addr       | `0.0.0.0:3000`   |
    /// | device_host        | `127.0.0.1`      |
    /// | device_port        | `8099`           |
    /// | draft_input_title  | `Draft`          |
    /// | draft_text_field   | `Countdown.Text` |
    /// | tick_interval      | 1 second         |
    /// | reconnect_delay    | 3 seconds        |
    /// | snapshot_debounce  | 1 second         |
    /// | client_queue_depth | 128              |
    /// | roster_db          | in memory        |
    fn default() -> Self {
        Self {
            ws_bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            device_host: "127.0.0.1".to_string(),
            device_port: 8099,
            draft_input_title: "Draft".to_string(),
            draft_text_field: "Countdown.Text".to_string(),
            tick_interval: Duration::from_secs(1),
            reconnect_delay: Duration::from_secs(3),
            snapshot_debounce: Duration::from_millis(1000),
            client_queue_depth: 128,
            roster_db: None,
        }
    }
}

impl RelayConfig {
    /// `host:port` of the device, for log messages.
    pub fn device_addr(&self) -> String {
        format!("{}:{}", self.device_host, self.device_port)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
