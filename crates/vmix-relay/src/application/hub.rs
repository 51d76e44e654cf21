//! The relay hub: fan-out from one device to many WebSocket clients.
//!
//! [`RelayHub`] owns the registry of connected clients and mediates in both
//! directions:
//!
//! ```text
//!   device events ──▶ on_device_event ──▶ broadcast ──▶ every client queue
//!   client events ──▶ on_client_message ─┬─▶ DeviceLink::send_command
//!                                        └─▶ RosterStore, then broadcast teams
//!   ticker        ──▶ on_tick ──▶ countDownDraft (DRAFT only)
//! ```
//!
//! # Delivery
//!
//! Each client has a bounded queue drained by its own writer task.  The hub
//! only ever calls `try_send`, so one slow or dead client never delays the
//! others: a full queue drops that message for that client (with a warning)
//! and a closed queue is skipped.  Delivery is at-most-once.
//!
//! # Consistent reads
//!
//! The hub never sees a partially updated device state.  [`DeviceLink::state`]
//! hands out an immutable `Arc<DeviceState>` published by the device task
//! after each complete update.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use vmix_core::{DeviceCommand, DeviceState, GameState};

use crate::application::device_session::DeviceEvent;
use crate::application::roster_store::RosterStore;
use crate::domain::config::RelayConfig;
use crate::domain::messages::{ClientEvent, ServerEvent};
use crate::domain::roster::{NewTeam, TeamId};

/// Identity of one connected client.
pub type ClientId = Uuid;

// ── Device port ───────────────────────────────────────────────────────────────

/// Errors returned when a command cannot be handed to the device.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// The TCP connection to the device is not open.
    #[error("device is not connected")]
    NotConnected,

    /// The device session task has exited.
    #[error("device session has shut down")]
    SessionClosed,
}

/// What the hub needs from the device session.
///
/// Implemented by `infrastructure::device_conn::DeviceHandle` and by test
/// fakes.
pub trait DeviceLink: Send + Sync {
    /// The latest complete device state.
    fn state(&self) -> Arc<DeviceState>;

    /// Queues a command for the device.  Fire-and-forget once accepted.
    fn send_command(&self, command: DeviceCommand) -> Result<(), DeviceError>;
}

// ── Hub ───────────────────────────────────────────────────────────────────────

/// Hub settings taken from [`RelayConfig`].
#[derive(Debug, Clone)]
struct HubSettings {
    queue_depth: usize,
    designated_title: String,
    countdown_field: String,
    snapshot_debounce: Duration,
}

/// Client registry plus the glue between clients, device, and roster.
pub struct RelayHub<D: ?Sized, R: ?Sized> {
    device: Arc<D>,
    roster: Arc<R>,
    clients: RwLock<HashMap<ClientId, mpsc::Sender<ServerEvent>>>,
    settings: HubSettings,
    /// When the hub last requested a snapshot because of a function event.
    last_snapshot_request: Mutex<Option<Instant>>,
}

impl<D, R> RelayHub<D, R>
where
    D: DeviceLink + ?Sized,
    R: RosterStore + ?Sized,
{
    pub fn new(device: Arc<D>, roster: Arc<R>, config: &RelayConfig) -> Self {
        Self {
            device,
            roster,
            clients: RwLock::new(HashMap::new()),
            settings: HubSettings {
                queue_depth: config.client_queue_depth.max(1),
                designated_title: config.draft_input_title.clone(),
                countdown_field: config.draft_text_field.clone(),
                snapshot_debounce: config.snapshot_debounce,
            },
            last_snapshot_request: Mutex::new(None),
        }
    }

    /// Number of registered clients.
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    // ── Client lifecycle ──────────────────────────────────────────────────────

    /// Registers a new client and returns its id and outbound queue.
    ///
    /// Then, in order:
    /// 1. broadcasts the full roster to every client (the new one included);
    /// 2. asks the device for a fresh snapshot, which every client receives
    ///    as `xml` when it arrives;
    /// 3. broadcasts the last known snapshot (empty before the first one) so
    ///    the new client has something to render immediately.
    pub async fn on_client_connect(&self) -> (ClientId, mpsc::Receiver<ServerEvent>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.settings.queue_depth);
        let total = {
            let mut clients = self.clients.write().await;
            clients.insert(id, tx);
            clients.len()
        };
        info!("client {id} connected ({total} total)");

        self.broadcast_roster().await;
        self.send_to_device(DeviceCommand::Xml);

        let snapshot = self.device.state().raw_snapshot.clone();
        self.broadcast(ServerEvent::Xml(snapshot)).await;

        (id, rx)
    }

    /// Forwards a raw client command to the device, unvalidated.
    pub async fn on_client_command(&self, client: ClientId, command: String) {
        debug!("client {client}: command {command:?}");
        self.send_to_device(DeviceCommand::Raw(command));
    }

    /// Deregisters a client.  Unknown ids are ignored.
    pub async fn on_client_disconnect(&self, client: ClientId) {
        let removed = self.clients.write().await.remove(&client).is_some();
        if removed {
            info!("client {client} disconnected");
        }
    }

    /// Dispatches one decoded client message.
    pub async fn on_client_message(&self, client: ClientId, message: ClientEvent) {
        debug!("client {client}: {}", message.name());
        match message {
            ClientEvent::Command(command) => self.on_client_command(client, command).await,
            ClientEvent::AddTeam(team) => self.add_team(team).await,
            ClientEvent::DeleteTeam(id) => self.delete_team(id).await,
            ClientEvent::DeleteAllTeams => self.delete_all_teams().await,
        }
    }

    // ── Device side ───────────────────────────────────────────────────────────

    /// Reacts to one event from the device session.
    pub async fn on_device_event(&self, event: &DeviceEvent) {
        match event {
            DeviceEvent::Snapshot(xml) => {
                self.broadcast(ServerEvent::Xml(xml.clone())).await;
            }
            DeviceEvent::Function(line) => self.on_device_function(line).await,
            DeviceEvent::Connected => info!("device connected"),
            DeviceEvent::Disconnected => warn!("device disconnected"),
            DeviceEvent::ConnectionError(e) => warn!("device connection failed: {e}"),
            DeviceEvent::GameStateChanged(state) => info!("game state changed to {state}"),
            DeviceEvent::Tally(_) | DeviceEvent::Acts(_) | DeviceEvent::Generic(_) => {
                debug!("device event: {event:?}");
            }
        }
    }

    /// Forwards a device function line, then requests a fresh snapshot.
    pub async fn on_device_function(&self, line: &str) {
        self.on_device_function_at(line, Instant::now()).await;
    }

    /// [`Self::on_device_function`] with an injected clock.
    ///
    /// The snapshot request is skipped when either the hub or the device
    /// session made one within the debounce window, so one function event
    /// costs the device at most one `XML` request.
    pub async fn on_device_function_at(&self, line: &str, now: Instant) {
        self.broadcast(ServerEvent::Function(line.to_string()))
            .await;

        let window = self.settings.snapshot_debounce;
        if !self.device.state().snapshot_request_due(now, window) {
            debug!("snapshot already requested by the device session");
            return;
        }

        let due = {
            let mut last = self.last_snapshot_request.lock().await;
            let due = match *last {
                Some(at) => now.saturating_duration_since(at) > window,
                None => true,
            };
            if due {
                *last = Some(now);
            }
            due
        };
        if due {
            self.send_to_device(DeviceCommand::Xml);
        }
    }

    /// Periodic tick.  A no-op outside `DRAFT`.
    ///
    /// In `DRAFT`, broadcasts the known countdown (if any) and queries the
    /// designated input's countdown field so the next tick sees a fresh
    /// value.
    pub async fn on_tick(&self) {
        let state = self.device.state();
        if state.game_state != GameState::Draft {
            return;
        }

        if let Some(countdown) = state.countdown {
            self.broadcast(ServerEvent::CountDownDraft(countdown)).await;
        }
        self.send_to_device(DeviceCommand::text_field(
            &self.settings.designated_title,
            &self.settings.countdown_field,
        ));
    }

    // ── Roster ────────────────────────────────────────────────────────────────

    pub async fn add_team(&self, team: NewTeam) {
        match self.roster.add_team(team).await {
            Ok(team) => {
                info!("team {} ({}) added", team.id, team.name);
                self.broadcast_roster().await;
            }
            Err(e) => error!("failed to add team: {e}"),
        }
    }

    pub async fn delete_team(&self, id: TeamId) {
        match self.roster.delete_team(id).await {
            Ok(()) => {
                info!("team {id} deleted");
                self.broadcast_roster().await;
            }
            Err(e) => error!("failed to delete team {id}: {e}"),
        }
    }

    pub async fn delete_all_teams(&self) {
        match self.roster.delete_all_teams().await {
            Ok(()) => {
                info!("all teams deleted");
                self.broadcast_roster().await;
            }
            Err(e) => error!("failed to delete all teams: {e}"),
        }
    }

    /// Re-reads the whole roster and broadcasts it as `teams`.
    pub async fn broadcast_roster(&self) {
        match self.roster.list_teams().await {
            Ok(teams) => {
                self.broadcast(ServerEvent::Teams(teams)).await;
            }
            Err(e) => error!("failed to read roster: {e}"),
        }
    }

    // ── Delivery ──────────────────────────────────────────────────────────────

    /// Queues `event` for every client.  Returns how many queues accepted it.
    pub async fn broadcast(&self, event: ServerEvent) -> usize {
        let clients = self.clients.read().await;
        let mut delivered = 0;
        for (id, tx) in clients.iter() {
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("client {id}: queue full, dropping {}", event.name());
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!("client {id}: queue closed, skipping {}", event.name());
                }
            }
        }
        delivered
    }

    fn send_to_device(&self, command: DeviceCommand) {
        if let Err(e) = self.device.send_command(command.clone()) {
            warn!("could not send {command} to device: {e}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::roster_store::{MemoryRosterStore, MockRosterStore, RosterError};
    use crate::domain::roster::Team;
    use std::sync::Mutex as StdMutex;

    /// Device stand-in that records commands and serves a settable state.
    #[derive(Default)]
    struct FakeDevice {
        state: StdMutex<Arc<DeviceState>>,
        sent: StdMutex<Vec<DeviceCommand>>,
        offline: bool,
    }

    impl FakeDevice {
        fn with_state(state: DeviceState) -> Self {
            Self {
                state: StdMutex::new(Arc::new(state)),
                ..Self::default()
            }
        }

        fn sent(&self) -> Vec<DeviceCommand> {
            self.sent.lock().unwrap().clone()
        }

        fn xml_requests(&self) -> usize {
            self.sent()
                .iter()
                .filter(|c| **c == DeviceCommand::Xml)
                .count()
        }
    }

    impl DeviceLink for FakeDevice {
        fn state(&self) -> Arc<DeviceState> {
            self.state.lock().unwrap().clone()
        }

        fn send_command(&self, command: DeviceCommand) -> Result<(), DeviceError> {
            if self.offline {
                return Err(DeviceError::NotConnected);
            }
            self.sent.lock().unwrap().push(command);
            Ok(())
        }
    }

    fn hub_with(device: FakeDevice) -> (Arc<FakeDevice>, RelayHub<FakeDevice, MemoryRosterStore>) {
        let device = Arc::new(device);
        let hub = RelayHub::new(
            Arc::clone(&device),
            Arc::new(MemoryRosterStore::new()),
            &RelayConfig::default(),
        );
        (device, hub)
    }

    fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn draft_state(countdown: Option<i64>) -> DeviceState {
        DeviceState {
            game_state: GameState::Draft,
            countdown,
            ..DeviceState::default()
        }
    }

    #[tokio::test]
    async fn test_connect_with_empty_roster_sends_teams_then_empty_xml() {
        // Arrange
        let (device, hub) = hub_with(FakeDevice::default());

        // Act
        let (_id, mut rx) = hub.on_client_connect().await;

        // Assert
        assert_eq!(
            drain(&mut rx),
            vec![ServerEvent::Teams(vec![]), ServerEvent::Xml(String::new())]
        );
        assert_eq!(device.sent(), vec![DeviceCommand::Xml]);
    }

    #[tokio::test]
    async fn test_connect_sends_last_known_snapshot() {
        let state = DeviceState {
            raw_snapshot: "<vmix/>".to_string(),
            ..DeviceState::default()
        };
        let (_device, hub) = hub_with(FakeDevice::with_state(state));

        let (_id, mut rx) = hub.on_client_connect().await;

        assert!(drain(&mut rx).contains(&ServerEvent::Xml("<vmix/>".to_string())));
    }

    #[tokio::test]
    async fn test_connect_refreshes_every_client() {
        // Arrange
        let (_device, hub) = hub_with(FakeDevice::default());
        let (_first, mut first_rx) = hub.on_client_connect().await;
        drain(&mut first_rx);

        // Act
        let (_second, _second_rx) = hub.on_client_connect().await;

        // Assert: the existing client also got teams and xml
        assert_eq!(
            drain(&mut first_rx),
            vec![ServerEvent::Teams(vec![]), ServerEvent::Xml(String::new())]
        );
        assert_eq!(hub.client_count().await, 2);
    }

    #[tokio::test]
    async fn test_client_command_is_forwarded_verbatim() {
        let (device, hub) = hub_with(FakeDevice::default());
        let (id, _rx) = hub.on_client_connect().await;

        hub.on_client_message(id, ClientEvent::Command("FUNCTION Cut".to_string()))
            .await;

        assert_eq!(
            device.sent().last(),
            Some(&DeviceCommand::Raw("FUNCTION Cut".to_string()))
        );
    }

    #[tokio::test]
    async fn test_command_while_device_offline_does_not_panic() {
        let (_device, hub) = hub_with(FakeDevice {
            offline: true,
            ..FakeDevice::default()
        });
        let (id, _rx) = hub.on_client_connect().await;
        hub.on_client_command(id, "FUNCTION Cut".to_string()).await;
        assert_eq!(hub.client_count().await, 1);
    }

    #[tokio::test]
    async fn test_disconnected_client_receives_nothing_further() {
        // Arrange
        let (_device, hub) = hub_with(FakeDevice::default());
        let (gone, _gone_rx) = hub.on_client_connect().await;
        let (_stay, mut stay_rx) = hub.on_client_connect().await;
        drain(&mut stay_rx);

        // Act
        hub.on_client_disconnect(gone).await;
        let delivered = hub.broadcast(ServerEvent::Function("F".to_string())).await;

        // Assert
        assert_eq!(delivered, 1);
        assert_eq!(hub.client_count().await, 1);
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_skipped() {
        let (_device, hub) = hub_with(FakeDevice::default());
        let (_dead, dead_rx) = hub.on_client_connect().await;
        let (_live, mut live_rx) = hub.on_client_connect().await;
        drop(dead_rx);
        drain(&mut live_rx);

        let delivered = hub.broadcast(ServerEvent::CountDownDraft(3)).await;

        assert_eq!(delivered, 1);
        assert_eq!(drain(&mut live_rx), vec![ServerEvent::CountDownDraft(3)]);
    }

    #[tokio::test]
    async fn test_full_queue_drops_for_that_client_only() {
        // Arrange: depth 2, filled by teams + xml on connect
        let config = RelayConfig {
            client_queue_depth: 2,
            ..RelayConfig::default()
        };
        let device = Arc::new(FakeDevice::default());
        let hub = RelayHub::new(device, Arc::new(MemoryRosterStore::new()), &config);
        let (_slow, _slow_rx) = hub.on_client_connect().await;
        let (_fast, mut fast_rx) = hub.on_client_connect().await;
        drain(&mut fast_rx);

        // Act
        let delivered = hub.broadcast(ServerEvent::CountDownDraft(9)).await;

        // Assert
        assert_eq!(delivered, 1);
        assert_eq!(drain(&mut fast_rx), vec![ServerEvent::CountDownDraft(9)]);
    }

    #[tokio::test]
    async fn test_snapshot_event_is_broadcast_as_xml() {
        let (_device, hub) = hub_with(FakeDevice::default());
        let (_id, mut rx) = hub.on_client_connect().await;
        drain(&mut rx);

        hub.on_device_event(&DeviceEvent::Snapshot("<vmix/>".to_string()))
            .await;

        assert_eq!(drain(&mut rx), vec![ServerEvent::Xml("<vmix/>".to_string())]);
    }

    #[tokio::test]
    async fn test_function_event_is_broadcast_then_snapshot_requested() {
        // Arrange
        let (device, hub) = hub_with(FakeDevice::default());
        let (_id, mut rx) = hub.on_client_connect().await;
        drain(&mut rx);
        let before = device.xml_requests();

        // Act
        hub.on_device_event(&DeviceEvent::Function("FUNCTION OK Completed".to_string()))
            .await;

        // Assert
        assert_eq!(
            drain(&mut rx),
            vec![ServerEvent::Function("FUNCTION OK Completed".to_string())]
        );
        assert_eq!(device.xml_requests(), before + 1);
    }

    #[tokio::test]
    async fn test_hub_debounces_function_snapshot_requests() {
        let (device, hub) = hub_with(FakeDevice::default());
        let start = Instant::now();

        hub.on_device_function_at("FUNCTION OK A", start).await;
        hub.on_device_function_at("FUNCTION OK B", start + Duration::from_millis(300))
            .await;
        assert_eq!(device.xml_requests(), 1);

        hub.on_device_function_at("FUNCTION OK C", start + Duration::from_millis(1400))
            .await;
        assert_eq!(device.xml_requests(), 2);
    }

    #[tokio::test]
    async fn test_function_skips_request_already_made_by_session() {
        // Arrange
        let start = Instant::now();
        let (device, hub) = hub_with(FakeDevice::with_state(DeviceState {
            last_snapshot_request: Some(start),
            ..DeviceState::default()
        }));
        let (_id, mut rx) = hub.on_client_connect().await;
        drain(&mut rx);
        let before = device.xml_requests();

        // Act
        hub.on_device_function_at("FUNCTION OK Cut", start + Duration::from_millis(5))
            .await;

        // Assert
        assert_eq!(device.xml_requests(), before);
        assert_eq!(
            drain(&mut rx),
            vec![ServerEvent::Function("FUNCTION OK Cut".to_string())]
        );
    }

    #[tokio::test]
    async fn test_function_requests_snapshot_when_both_windows_stale() {
        let start = Instant::now();
        let (device, hub) = hub_with(FakeDevice::with_state(DeviceState {
            last_snapshot_request: Some(start),
            ..DeviceState::default()
        }));

        hub.on_device_function_at("FUNCTION OK Cut", start + Duration::from_millis(1500))
            .await;

        assert_eq!(device.xml_requests(), 1);
    }

    #[tokio::test]
    async fn test_other_device_events_are_not_forwarded() {
        let (_device, hub) = hub_with(FakeDevice::default());
        let (_id, mut rx) = hub.on_client_connect().await;
        drain(&mut rx);

        for event in [
            DeviceEvent::Connected,
            DeviceEvent::Disconnected,
            DeviceEvent::ConnectionError("refused".to_string()),
            DeviceEvent::GameStateChanged(GameState::Draft),
            DeviceEvent::Generic("VERSION OK 27".to_string()),
        ] {
            hub.on_device_event(&event).await;
        }

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_tick_in_idle_emits_nothing() {
        // Arrange
        let (device, hub) = hub_with(FakeDevice::with_state(DeviceState {
            countdown: Some(30),
            ..DeviceState::default()
        }));
        let (_id, mut rx) = hub.on_client_connect().await;
        drain(&mut rx);
        let sent_before = device.sent().len();

        // Act
        hub.on_tick().await;

        // Assert
        assert!(drain(&mut rx).is_empty());
        assert_eq!(device.sent().len(), sent_before);
    }

    #[tokio::test]
    async fn test_tick_in_draft_emits_exactly_one_countdown() {
        // Arrange
        let (device, hub) = hub_with(FakeDevice::with_state(draft_state(Some(27))));
        let (_id, mut rx) = hub.on_client_connect().await;
        drain(&mut rx);

        // Act
        hub.on_tick().await;

        // Assert
        assert_eq!(drain(&mut rx), vec![ServerEvent::CountDownDraft(27)]);
        assert_eq!(
            device.sent().last(),
            Some(&DeviceCommand::text_field("Draft", "Countdown.Text"))
        );
    }

    #[tokio::test]
    async fn test_tick_in_draft_without_countdown_only_queries() {
        let (device, hub) = hub_with(FakeDevice::with_state(draft_state(None)));
        let (_id, mut rx) = hub.on_client_connect().await;
        drain(&mut rx);

        hub.on_tick().await;

        assert!(drain(&mut rx).is_empty());
        assert!(matches!(device.sent().last(), Some(DeviceCommand::XmlText(_))));
    }

    #[tokio::test]
    async fn test_add_team_broadcasts_full_roster() {
        // Arrange
        let (_device, hub) = hub_with(FakeDevice::default());
        let (id, mut rx) = hub.on_client_connect().await;
        drain(&mut rx);

        // Act
        hub.on_client_message(
            id,
            ClientEvent::AddTeam(NewTeam {
                name: "Red".to_string(),
                alias: "R".to_string(),
                players: vec!["A".to_string(), "B".to_string()],
            }),
        )
        .await;

        // Assert
        let events = drain(&mut rx);
        let [ServerEvent::Teams(teams)] = &events[..] else {
            panic!("expected one teams event, got {events:?}");
        };
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].name, "Red");
        let players: Vec<&str> = teams[0].players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(players, ["A", "B"]);
    }

    #[tokio::test]
    async fn test_delete_all_teams_broadcasts_empty_roster() {
        let (_device, hub) = hub_with(FakeDevice::default());
        let (id, mut rx) = hub.on_client_connect().await;
        hub.add_team(NewTeam {
            name: "Red".to_string(),
            alias: "R".to_string(),
            players: vec![],
        })
        .await;
        drain(&mut rx);

        hub.on_client_message(id, ClientEvent::DeleteAllTeams).await;

        assert_eq!(drain(&mut rx), vec![ServerEvent::Teams(vec![])]);
    }

    #[tokio::test]
    async fn test_delete_unknown_team_does_not_rebroadcast() {
        let (_device, hub) = hub_with(FakeDevice::default());
        let (id, mut rx) = hub.on_client_connect().await;
        drain(&mut rx);

        hub.on_client_message(id, ClientEvent::DeleteTeam(42)).await;

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_skips_broadcast() {
        // Arrange
        let mut store = MockRosterStore::new();
        store.expect_list_teams().returning(|| Ok(Vec::<Team>::new()));
        store
            .expect_add_team()
            .times(1)
            .returning(|_| Err(RosterError::Storage("disk full".to_string())));
        let hub = RelayHub::new(
            Arc::new(FakeDevice::default()),
            Arc::new(store),
            &RelayConfig::default(),
        );
        let (_id, mut rx) = hub.on_client_connect().await;
        drain(&mut rx);

        // Act
        hub.add_team(NewTeam {
            name: "Red".to_string(),
            alias: "R".to_string(),
            players: vec![],
        })
        .await;

        // Assert
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_roster_read_failure_on_connect_still_sends_xml() {
        let mut store = MockRosterStore::new();
        store
            .expect_list_teams()
            .returning(|| Err(RosterError::Storage("locked".to_string())));
        let hub = RelayHub::new(
            Arc::new(FakeDevice::default()),
            Arc::new(store),
            &RelayConfig::default(),
        );

        let (_id, mut rx) = hub.on_client_connect().await;

        assert_eq!(drain(&mut rx), vec![ServerEvent::Xml(String::new())]);
    }
}
