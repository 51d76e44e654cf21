//! vMix relay: entry point.
//!
//! Holds one TCP session to vMix and relays its state to any number of web
//! clients over WebSocket.
//!
//! # Usage
//!
//! ```text
//! vmix-relay [OPTIONS]
//!
//! Options:
//!   --ws-bind <ADDR>              WebSocket bind address [default: 0.0.0.0]
//!   --ws-port <PORT>              WebSocket listener port [default: 3000]
//!   --vmix-host <HOST>            vMix hostname or IP [default: 127.0.0.1]
//!   --vmix-port <PORT>            vMix TCP API port [default: 8099]
//!   --draft-input-title <TITLE>   Input that drives the game state [default: Draft]
//!   --draft-text-field <NAME>     Countdown text field [default: Countdown.Text]
//!   --tick-ms <MS>                Countdown tick period [default: 1000]
//!   --reconnect-secs <SECS>       Delay between reconnects [default: 3]
//!   --roster-db <PATH>            SQLite roster file [default: in memory]
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable                | Default          |
//! |-------------------------|------------------|
//! | `VMIX_RELAY_BIND`       | `0.0.0.0`        |
//! | `VMIX_RELAY_PORT`       | `3000`           |
//! | `VMIX_HOST`             | `127.0.0.1`      |
//! | `VMIX_PORT`             | `8099`           |
//! | `VMIX_DRAFT_INPUT`      | `Draft`          |
//! | `VMIX_DRAFT_TEXT_FIELD` | `Countdown.Text` |
//! | `VMIX_TICK_MS`          | `1000`           |
//! | `VMIX_RECONNECT_SECS`   | `3`              |
//! | `VMIX_ROSTER_DB`        | unset            |
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vmix_relay::application::{MemoryRosterStore, RelayHub, RosterStore};
use vmix_relay::domain::RelayConfig;
use vmix_relay::infrastructure::{run_server, spawn_device_session, SqliteRosterStore};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Relays a vMix TCP API session to WebSocket clients.
#[derive(Debug, Parser)]
#[command(
    name = "vmix-relay",
    about = "Relays a vMix TCP API session to WebSocket clients",
    version
)]
struct Cli {
    /// IP address to bind the WebSocket server to.
    #[arg(long, default_value = "0.0.0.0", env = "VMIX_RELAY_BIND")]
    ws_bind: String,

    /// TCP port for the WebSocket server.
    #[arg(long, default_value_t = 3000, env = "VMIX_RELAY_PORT")]
    ws_port: u16,

    /// Hostname or IP address of the vMix machine.
    #[arg(long, default_value = "127.0.0.1", env = "VMIX_HOST")]
    vmix_host: String,

    /// vMix TCP API port.
    #[arg(long, default_value_t = 8099, env = "VMIX_PORT")]
    vmix_port: u16,

    /// Title of the input whose playback starts the draft.
    #[arg(long, default_value = "Draft", env = "VMIX_DRAFT_INPUT")]
    draft_input_title: String,

    /// Text field of the draft input that holds the countdown.
    #[arg(long, default_value = "Countdown.Text", env = "VMIX_DRAFT_TEXT_FIELD")]
    draft_text_field: String,

    /// Countdown broadcast period in milliseconds.
    #[arg(long, default_value_t = 1000, env = "VMIX_TICK_MS")]
    tick_ms: u64,

    /// Seconds to wait between vMix reconnect attempts.
    #[arg(long, default_value_t = 3, env = "VMIX_RECONNECT_SECS")]
    reconnect_secs: u64,

    /// SQLite file for the team roster.  Without it the roster lives in
    /// memory and is lost on restart.
    #[arg(long, env = "VMIX_ROSTER_DB")]
    roster_db: Option<PathBuf>,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`RelayConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--ws-bind` is not a valid IP address, the host is
    /// empty, or `--tick-ms` is zero.
    fn into_relay_config(self) -> anyhow::Result<RelayConfig> {
        let ws_bind_addr: SocketAddr = format!("{}:{}", self.ws_bind, self.ws_port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid WebSocket bind address: '{}:{}'",
                    self.ws_bind, self.ws_port
                )
            })?;

        if self.vmix_host.trim().is_empty() {
            anyhow::bail!("--vmix-host must not be empty");
        }
        if self.tick_ms == 0 {
            anyhow::bail!("--tick-ms must be greater than zero");
        }

        Ok(RelayConfig {
            ws_bind_addr,
            device_host: self.vmix_host,
            device_port: self.vmix_port,
            draft_input_title: self.draft_input_title,
            draft_text_field: self.draft_text_field,
            tick_interval: Duration::from_millis(self.tick_ms),
            reconnect_delay: Duration::from_secs(self.reconnect_secs),
            roster_db: self.roster_db,
            ..RelayConfig::default()
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_relay_config()?;

    info!(
        "vMix relay starting: ws={}, vmix={}, designated input '{}'",
        config.ws_bind_addr,
        config.device_addr(),
        config.draft_input_title
    );

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    let roster: Arc<dyn RosterStore> = match &config.roster_db {
        Some(path) => Arc::new(SqliteRosterStore::open(path)?),
        None => {
            info!("roster kept in memory");
            Arc::new(MemoryRosterStore::new())
        }
    };

    let (device, device_task) = spawn_device_session(&config, Arc::clone(&running));
    let events = device.subscribe();
    let hub = Arc::new(RelayHub::new(Arc::new(device), roster, &config));

    let served = run_server(&config, hub, events, Arc::clone(&running)).await;

    // The server only returns early on a bind error; stop the device task too.
    running.store(false, Ordering::Relaxed);
    if let Err(e) = device_task.await {
        tracing::error!("device task panicked: {e}");
    }
    served?;

    info!("vMix relay stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Cli {
        Cli::parse_from(["vmix-relay"])
    }

    #[test]
    fn test_cli_defaults() {
        let cli = defaults();
        assert_eq!(cli.ws_port, 3000);
        assert_eq!(cli.vmix_host, "127.0.0.1");
        assert_eq!(cli.vmix_port, 8099);
        assert_eq!(cli.draft_input_title, "Draft");
        assert_eq!(cli.draft_text_field, "Countdown.Text");
        assert!(cli.roster_db.is_none());
    }

    #[test]
    fn test_cli_vmix_host_override() {
        let cli = Cli::parse_from(["vmix-relay", "--vmix-host", "10.0.0.5"]);
        assert_eq!(cli.vmix_host, "10.0.0.5");
    }

    #[test]
    fn test_cli_draft_input_override() {
        let cli = Cli::parse_from([
            "vmix-relay",
            "--draft-input-title",
            "Pick Phase",
            "--draft-text-field",
            "Timer.Text",
        ]);
        assert_eq!(cli.draft_input_title, "Pick Phase");
        assert_eq!(cli.draft_text_field, "Timer.Text");
    }

    #[test]
    fn test_into_relay_config_defaults_match_relay_config_default() {
        // Arrange
        let expected = RelayConfig::default();

        // Act
        let config = defaults().into_relay_config().unwrap();

        // Assert
        assert_eq!(config.ws_bind_addr, expected.ws_bind_addr);
        assert_eq!(config.device_addr(), expected.device_addr());
        assert_eq!(config.tick_interval, expected.tick_interval);
        assert_eq!(config.reconnect_delay, expected.reconnect_delay);
        assert_eq!(config.snapshot_debounce, expected.snapshot_debounce);
    }

    #[test]
    fn test_into_relay_config_custom_values() {
        let cli = Cli::parse_from([
            "vmix-relay",
            "--ws-port",
            "8080",
            "--vmix-host",
            "vmix.local",
            "--tick-ms",
            "250",
            "--roster-db",
            "/tmp/roster.db",
        ]);

        let config = cli.into_relay_config().unwrap();

        assert_eq!(config.ws_bind_addr.port(), 8080);
        assert_eq!(config.device_addr(), "vmix.local:8099");
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.roster_db, Some(PathBuf::from("/tmp/roster.db")));
    }

    #[test]
    fn test_into_relay_config_invalid_ws_bind_returns_error() {
        let cli = Cli {
            ws_bind: "not.an.ip".to_string(),
            ..defaults()
        };
        assert!(cli.into_relay_config().is_err());
    }

    #[test]
    fn test_into_relay_config_zero_tick_returns_error() {
        let cli = Cli {
            tick_ms: 0,
            ..defaults()
        };
        assert!(cli.into_relay_config().is_err());
    }

    #[test]
    fn test_into_relay_config_empty_host_returns_error() {
        let cli = Cli {
            vmix_host: "  ".to_string(),
            ..defaults()
        };
        assert!(cli.into_relay_config().is_err());
    }
}
