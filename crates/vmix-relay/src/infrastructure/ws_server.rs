//! WebSocket server: accept loop, per-client sessions, and the relay's
//! background tasks.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Upgrading each accepted connection to a WebSocket session and
//!    registering it with the [`RelayHub`].
//! 3. Running a writer task per client that drains the client's queue into
//!    text frames, and a reader loop that decodes client events.
//! 4. Forwarding device events to the hub (one listener for the whole
//!    process).
//! 5. Driving the hub's periodic tick.
//! 6. Stopping everything when the `running` flag is cleared.
//!
//! Each client runs in its own Tokio task, so one slow browser never delays
//! the accept loop or other clients.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{interval, timeout, MissedTickBehavior};
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};

use crate::application::hub::{DeviceLink, RelayHub};
use crate::application::roster_store::RosterStore;
use crate::domain::config::RelayConfig;
use crate::domain::messages::ClientEvent;
use crate::infrastructure::device_conn::DeviceSubscription;

/// How long a blocking wait may run before re-checking the shutdown flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds the listener, starts the background tasks, and serves clients
/// until `running` is cleared.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound (port in use, missing
/// permission).
pub async fn run_server<D, R>(
    config: &RelayConfig,
    hub: Arc<RelayHub<D, R>>,
    events: DeviceSubscription,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()>
where
    D: DeviceLink + ?Sized + 'static,
    R: RosterStore + ?Sized + 'static,
{
    let listener = TcpListener::bind(config.ws_bind_addr)
        .await
        .with_context(|| {
            format!(
                "failed to bind WebSocket listener on {}",
                config.ws_bind_addr
            )
        })?;

    info!("WebSocket relay listening on {}", config.ws_bind_addr);

    let forwarder = tokio::spawn(forward_device_events(
        events,
        Arc::clone(&hub),
        Arc::clone(&running),
    ));
    let ticker = tokio::spawn(run_ticker(
        Arc::clone(&hub),
        config.tick_interval,
        Arc::clone(&running),
    ));

    let result = serve(listener, hub, running).await;

    forwarder.abort();
    ticker.abort();
    result
}

/// Runs the accept loop on an already bound listener.
///
/// Split from [`run_server`] so tests can bind port 0 and learn the address
/// before serving.
pub async fn serve<D, R>(
    listener: TcpListener,
    hub: Arc<RelayHub<D, R>>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()>
where
    D: DeviceLink + ?Sized + 'static,
    R: RosterStore + ?Sized + 'static,
{
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // A short timeout lets the loop notice shutdown while idle.
        match timeout(SHUTDOWN_POLL, listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                info!("new client connection from {peer_addr}");
                let hub = Arc::clone(&hub);
                tokio::spawn(async move {
                    handle_client(stream, peer_addr, hub).await;
                });
            }
            Ok(Err(e)) => {
                // Transient (e.g. too many open files); keep serving.
                error!("accept error: {e}");
            }
            Err(_) => {}
        }
    }

    Ok(())
}

/// Feeds every device event to the hub, in order.
///
/// This is the process's one registered device listener; it deregisters
/// when it returns and drops the subscription.
pub async fn forward_device_events<D, R>(
    mut events: DeviceSubscription,
    hub: Arc<RelayHub<D, R>>,
    running: Arc<AtomicBool>,
) where
    D: DeviceLink + ?Sized,
    R: RosterStore + ?Sized,
{
    while running.load(Ordering::Relaxed) {
        match timeout(SHUTDOWN_POLL, events.recv()).await {
            Ok(Some(event)) => hub.on_device_event(&event).await,
            Ok(None) => {
                debug!("device event stream ended");
                break;
            }
            Err(_) => {}
        }
    }
}

/// Calls [`RelayHub::on_tick`] every `period`.  Late ticks are skipped, not
/// bunched.
pub async fn run_ticker<D, R>(hub: Arc<RelayHub<D, R>>, period: Duration, running: Arc<AtomicBool>)
where
    D: DeviceLink + ?Sized,
    R: RosterStore + ?Sized,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if !running.load(Ordering::Relaxed) {
            break;
        }
        hub.on_tick().await;
    }
}

// ── Per-client session ────────────────────────────────────────────────────────

async fn handle_client<D, R>(stream: TcpStream, peer_addr: SocketAddr, hub: Arc<RelayHub<D, R>>)
where
    D: DeviceLink + ?Sized + 'static,
    R: RosterStore + ?Sized + 'static,
{
    match run_client_session(stream, peer_addr, hub).await {
        Ok(()) => info!("client {peer_addr} closed normally"),
        Err(e) => warn!("client {peer_addr} closed with error: {e:#}"),
    }
}

/// Runs one client from handshake to deregistration.
async fn run_client_session<D, R>(
    stream: TcpStream,
    peer_addr: SocketAddr,
    hub: Arc<RelayHub<D, R>>,
) -> anyhow::Result<()>
where
    D: DeviceLink + ?Sized + 'static,
    R: RosterStore + ?Sized + 'static,
{
    let ws_stream = accept_async(stream)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    let (mut ws_tx, mut ws_rx) = ws_stream.split();
    let (client_id, mut outbound) = hub.on_client_connect().await;
    debug!("client {peer_addr} registered as {client_id}");

    // ── Writer: hub queue → WebSocket ─────────────────────────────────────────
    let writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!("client {client_id}: cannot serialize {}: {e}", event.name());
                    continue;
                }
            };
            if ws_tx.send(WsMessage::Text(json)).await.is_err() {
                debug!("client {client_id}: send failed (client gone)");
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    // ── Reader: WebSocket → hub ───────────────────────────────────────────────
    loop {
        let frame = match ws_rx.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                debug!("client {client_id}: connection closed");
                break;
            }
            Some(Err(e)) => {
                warn!("client {client_id}: WebSocket error: {e}");
                break;
            }
            None => break,
        };

        match frame {
            WsMessage::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => hub.on_client_message(client_id, event).await,
                Err(e) => {
                    // One bad payload must not end the session.
                    warn!("client {client_id}: invalid message: {e}");
                }
            },
            WsMessage::Close(_) => {
                debug!("client {client_id}: close frame received");
                break;
            }
            WsMessage::Binary(_) => warn!("client {client_id}: binary frame ignored"),
            WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => {}
        }
    }

    hub.on_client_disconnect(client_id).await;
    writer.abort();
    Ok(())
}
