//! The single TCP connection to vMix.
//!
//! [`spawn_device_session`] starts one Tokio task that owns the connection
//! and the [`SessionCore`].  Everything else talks to it through a
//! [`DeviceHandle`]:
//!
//! ```text
//!                  ┌──────────── device task ────────────┐
//!  send_command ──▶│ mpsc ──▶ write_half ──▶ vMix        │
//!                  │                                     │
//!                  │ vMix ──▶ read_half ──▶ drain_frames │
//!                  │              ──▶ SessionCore        │
//!                  │                   │        │        │
//!  state()     ◀───│ watch<Arc<State>> ┘        │        │
//!  subscribe() ◀───│ broadcast<DeviceEvent> ────┘        │
//!                  └─────────────────────────────────────┘
//! ```
//!
//! Lines are processed strictly in receipt order by the one task, so the
//! state needs no lock.  Each new state is published before the events that
//! caused it, so a listener reacting to an event always reads a state that
//! already includes it.
//!
//! # Reconnects
//!
//! A failed connect emits [`DeviceEvent::ConnectionError`]; a closed
//! connection emits [`DeviceEvent::Disconnected`].  Either way the task
//! waits `reconnect_delay` before trying again.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};
use tracing::{debug, info, warn};

use vmix_core::{decode_frame, DeviceCommand, DeviceState};

use crate::application::device_session::{DeviceEvent, LineOutcome, SessionCore};
use crate::application::hub::{DeviceError, DeviceLink};
use crate::domain::config::RelayConfig;

/// Capacity of the device event channel.  A listener that falls further
/// behind than this loses the oldest events.
const EVENT_CAPACITY: usize = 1024;

/// How often the task re-checks the shutdown flag while idle.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

// ── Connection ────────────────────────────────────────────────────────────────

/// An open TCP connection to the device, split into halves.
pub struct DeviceConnection {
    pub read_half: tokio::net::tcp::OwnedReadHalf,
    pub write_half: OwnedWriteHalf,
}

impl DeviceConnection {
    /// Connects to the vMix TCP API.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be resolved or refuses the
    /// connection.
    pub async fn connect(host: &str, port: u16) -> anyhow::Result<Self> {
        let stream = TcpStream::connect((host, port))
            .await
            .with_context(|| format!("failed to connect to vMix at {host}:{port}"))?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!("could not disable Nagle on vMix socket: {e}");
        }

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            read_half,
            write_half,
        })
    }
}

// ── Handle ────────────────────────────────────────────────────────────────────

/// Cheap, cloneable access to the device task.
#[derive(Clone)]
pub struct DeviceHandle {
    commands: mpsc::UnboundedSender<DeviceCommand>,
    state: watch::Receiver<Arc<DeviceState>>,
    events: broadcast::Sender<DeviceEvent>,
    connected: Arc<AtomicBool>,
}

impl DeviceHandle {
    /// The latest complete device state.
    pub fn state(&self) -> Arc<DeviceState> {
        self.state.borrow().clone()
    }

    /// Registers a new event listener.  Dropping it deregisters.
    pub fn subscribe(&self) -> DeviceSubscription {
        DeviceSubscription {
            rx: self.events.subscribe(),
        }
    }

    /// Queues a command for the device.
    ///
    /// # Errors
    ///
    /// [`DeviceError::NotConnected`] while the connection is down, and
    /// [`DeviceError::SessionClosed`] once the device task has exited.
    pub fn send_command(&self, command: DeviceCommand) -> Result<(), DeviceError> {
        if !self.is_connected() {
            return Err(DeviceError::NotConnected);
        }
        self.commands
            .send(command)
            .map_err(|_| DeviceError::SessionClosed)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl DeviceLink for DeviceHandle {
    fn state(&self) -> Arc<DeviceState> {
        DeviceHandle::state(self)
    }

    fn send_command(&self, command: DeviceCommand) -> Result<(), DeviceError> {
        DeviceHandle::send_command(self, command)
    }
}

/// One registered listener for device events.
pub struct DeviceSubscription {
    rx: broadcast::Receiver<DeviceEvent>,
}

impl DeviceSubscription {
    /// Waits for the next event.  Returns `None` once the device task is
    /// gone.
    ///
    /// If this listener fell behind, the skipped events are logged and
    /// reception continues with the oldest retained one.
    pub async fn recv(&mut self) -> Option<DeviceEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("device listener lagged; {skipped} events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// Starts the device task and returns its handle.
///
/// The task runs until `running` is cleared.
pub fn spawn_device_session(
    config: &RelayConfig,
    running: Arc<AtomicBool>,
) -> (DeviceHandle, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(Arc::new(DeviceState::default()));
    let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
    let connected = Arc::new(AtomicBool::new(false));

    let handle = DeviceHandle {
        commands: command_tx,
        state: state_rx,
        events: event_tx.clone(),
        connected: Arc::clone(&connected),
    };

    let task = DeviceTask {
        host: config.device_host.clone(),
        port: config.device_port,
        reconnect_delay: config.reconnect_delay,
        core: SessionCore::from_config(config),
        commands: command_rx,
        state: state_tx,
        events: event_tx,
        connected,
        running,
    };
    let join = tokio::spawn(task.run());

    (handle, join)
}

struct DeviceTask {
    host: String,
    port: u16,
    reconnect_delay: Duration,
    core: SessionCore,
    commands: mpsc::UnboundedReceiver<DeviceCommand>,
    state: watch::Sender<Arc<DeviceState>>,
    events: broadcast::Sender<DeviceEvent>,
    connected: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

impl DeviceTask {
    async fn run(mut self) {
        let addr = format!("{}:{}", self.host, self.port);

        while self.running.load(Ordering::Relaxed) {
            match DeviceConnection::connect(&self.host, self.port).await {
                Ok(conn) => {
                    info!("connected to vMix at {addr}");
                    self.discard_stale_commands();
                    self.connected.store(true, Ordering::Release);

                    match self.drive(conn).await {
                        Ok(()) => info!("vMix connection at {addr} closed"),
                        Err(e) => warn!("vMix connection at {addr} failed: {e:#}"),
                    }
                }
                Err(e) => {
                    warn!("{e:#}; retrying in {:?}", self.reconnect_delay);
                    self.publish(LineOutcome {
                        events: vec![DeviceEvent::ConnectionError(format!("{e:#}"))],
                        ..LineOutcome::default()
                    });
                }
            }

            self.wait_before_reconnect().await;
        }

        debug!("device task stopped");
    }

    /// Runs one connection until it closes, fails, or shutdown is requested.
    async fn drive(&mut self, conn: DeviceConnection) -> anyhow::Result<()> {
        let DeviceConnection {
            mut read_half,
            mut write_half,
        } = conn;

        let bootstrap = self.core.on_connected(Instant::now());
        let result = self.pump(&mut read_half, &mut write_half, bootstrap).await;

        self.connected.store(false, Ordering::Release);
        let teardown = self.core.on_disconnected();
        for command in &teardown.commands {
            if let Err(e) = write_command(&mut write_half, command).await {
                debug!("teardown {command} not sent: {e:#}");
                break;
            }
        }
        self.publish(LineOutcome {
            commands: Vec::new(),
            ..teardown
        });

        result
    }

    async fn pump(
        &mut self,
        read_half: &mut tokio::net::tcp::OwnedReadHalf,
        write_half: &mut OwnedWriteHalf,
        bootstrap: LineOutcome,
    ) -> anyhow::Result<()> {
        self.execute(write_half, bootstrap).await?;

        let mut recv_buf: Vec<u8> = Vec::with_capacity(64 * 1024);
        let mut read_tmp = vec![0u8; 16 * 1024];
        let mut shutdown_check = interval(SHUTDOWN_POLL);

        loop {
            tokio::select! {
                read = read_half.read(&mut read_tmp) => {
                    let n = read.context("read from vMix failed")?;
                    if n == 0 {
                        debug!("vMix closed the connection (EOF)");
                        return Ok(());
                    }
                    recv_buf.extend_from_slice(&read_tmp[..n]);

                    for line in drain_frames(&mut recv_buf) {
                        let outcome = self.core.handle_line(&line, Instant::now());
                        self.execute(write_half, outcome).await?;
                    }
                }
                Some(command) = self.commands.recv() => {
                    write_command(write_half, &command).await?;
                }
                _ = shutdown_check.tick() => {
                    if !self.running.load(Ordering::Relaxed) {
                        info!("shutdown requested; closing vMix connection");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Writes the outcome's commands, then publishes its state and events.
    async fn execute(
        &mut self,
        write_half: &mut OwnedWriteHalf,
        outcome: LineOutcome,
    ) -> anyhow::Result<()> {
        for command in &outcome.commands {
            write_command(write_half, command).await?;
        }
        self.publish(outcome);
        Ok(())
    }

    fn publish(&self, outcome: LineOutcome) {
        if outcome.state_changed {
            self.state.send_replace(Arc::new(self.core.state().clone()));
        }
        for event in outcome.events {
            // An error only means nobody is listening right now.
            let _ = self.events.send(event);
        }
    }

    /// Drops commands queued for a connection that no longer exists.
    fn discard_stale_commands(&mut self) {
        let mut dropped = 0usize;
        while self.commands.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!("discarded {dropped} commands queued before reconnect");
        }
    }

    async fn wait_before_reconnect(&self) {
        let deadline = Instant::now() + self.reconnect_delay;
        while self.running.load(Ordering::Relaxed) && Instant::now() < deadline {
            sleep(SHUTDOWN_POLL.min(deadline.saturating_duration_since(Instant::now()))).await;
        }
    }
}

async fn write_command(
    write_half: &mut OwnedWriteHalf,
    command: &DeviceCommand,
) -> anyhow::Result<()> {
    debug!("→ vMix: {command}");
    write_half
        .write_all(&command.to_wire())
        .await
        .with_context(|| format!("write of {command} to vMix failed"))
}

// ── Framing ───────────────────────────────────────────────────────────────────

/// Removes every complete logical line from the front of `buf`.
///
/// Bytes of an incomplete trailing frame stay in `buf` for the next read.
/// Undecodable frames are logged and skipped; blank lines are dropped.
pub fn drain_frames(buf: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        match decode_frame(buf) {
            Ok((line, consumed)) => {
                buf.drain(..consumed);
                if !line.is_empty() {
                    lines.push(line);
                }
            }
            Err(e) if e.consumed() == 0 => break,
            Err(e) => {
                warn!("skipping undecodable frame from vMix: {e}");
                buf.drain(..e.consumed());
            }
        }
    }
    lines
}

// ── Tests ─────────────────────────────────────────────────────────────────────
