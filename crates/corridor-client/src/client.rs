//! The sync client: one owned connection, one driver task.
//!
//! [`SyncClient`] is an explicit instance with a `connect()`/`disconnect()`
//! lifecycle - no global connection state. All transport events, timers, and
//! state mutation run on a single driver task, so messages from one
//! connection are merged into the store in exact arrival order and the store
//! itself needs no locking discipline beyond the shared read handles.
//!
//! Teardown is deterministic: `disconnect()` (or dropping the client)
//! terminates the driver, which cancels the reconnect, heartbeat, and
//! replay-tick timers with it. Nothing can mutate state after the driver is
//! gone.

use std::sync::Arc;
use std::time::Duration;

use corridor_protocol::{codec, ClientCommand, ServerMessage};
use corridor_replay::ReplayBuffer;
use corridor_state::StateStore;
use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant};
use tracing::{debug, info, warn};

use crate::connection::{ConnectionStatus, ReconnectConfig, StatusUpdate};
use crate::error::{Error, Result};
use crate::transport::{Frame, Transport};

/// Fallback feed endpoint, matching the city hub's default bind.
pub const DEFAULT_URL: &str = "ws://127.0.0.1:8001/ws/city";

/// Configuration for a sync client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Feed endpoint (`ws://` or `wss://`).
    pub url: String,

    /// Reconnect backoff policy.
    pub reconnect: ReconnectConfig,

    /// Interval between heartbeat pings while connected.
    pub heartbeat_interval: Duration,

    /// Interval at which replay playback advances one frame.
    pub replay_tick_interval: Duration,

    /// Capacity of the snapshot replay ring.
    pub replay_capacity: usize,

    /// Retained event-log entries in the state store.
    pub event_log_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ClientConfig {
    /// Create config from environment variables with sensible defaults.
    ///
    /// Only the endpoint is environment-supplied (`CORRIDOR_WS_URL`); the
    /// remaining knobs use the `with_*` builders.
    pub fn from_env() -> Self {
        let url =
            std::env::var("CORRIDOR_WS_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        Self {
            url,
            reconnect: ReconnectConfig::default(),
            heartbeat_interval: Duration::from_secs(15),
            replay_tick_interval: Duration::from_secs(1),
            replay_capacity: corridor_replay::DEFAULT_REPLAY_CAPACITY,
            event_log_limit: corridor_state::DEFAULT_EVENT_LOG_LIMIT,
        }
    }

    /// Set the feed endpoint.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the reconnect backoff policy.
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Set the heartbeat interval.
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Set the replay playback tick interval.
    #[must_use]
    pub fn with_replay_tick_interval(mut self, interval: Duration) -> Self {
        self.replay_tick_interval = interval;
        self
    }

    /// Set the replay ring capacity.
    #[must_use]
    pub fn with_replay_capacity(mut self, capacity: usize) -> Self {
        self.replay_capacity = capacity;
        self
    }

    /// Set the retained event-log bound.
    #[must_use]
    pub fn with_event_log_limit(mut self, limit: usize) -> Self {
        self.event_log_limit = limit;
        self
    }
}

/// Handle to a spawned driver task.
struct DriverHandle {
    cmd_tx: mpsc::UnboundedSender<ClientCommand>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// The synchronization client.
///
/// Owns the transport (through its driver task), the state store, and the
/// replay buffer. Consumers read state through [`store`](Self::store) and
/// [`replay`](Self::replay) and observe connection status through
/// [`subscribe_status`](Self::subscribe_status).
pub struct SyncClient {
    config: ClientConfig,
    store: Arc<RwLock<StateStore>>,
    replay: Arc<RwLock<ReplayBuffer>>,
    status_tx: watch::Sender<StatusUpdate>,
    driver: Option<DriverHandle>,
}

impl SyncClient {
    /// Create a stopped client. Nothing connects until
    /// [`connect`](Self::connect).
    pub fn new(config: ClientConfig) -> Self {
        let store = Arc::new(RwLock::new(StateStore::with_event_log_limit(
            config.event_log_limit,
        )));
        let replay = Arc::new(RwLock::new(ReplayBuffer::with_capacity(
            config.replay_capacity,
        )));
        let (status_tx, _) = watch::channel(StatusUpdate::new(ConnectionStatus::Disconnected));
        Self {
            config,
            store,
            replay,
            status_tx,
            driver: None,
        }
    }

    /// Establish (or re-establish) the connection.
    ///
    /// Spawns the driver task, which moves through `Connecting` and retries
    /// with backoff on failure. A no-op while a driver is already running;
    /// after the terminal `Error` state this starts a fresh attempt cycle.
    pub fn connect(&mut self) {
        if let Some(driver) = &self.driver {
            if !driver.task.is_finished() {
                debug!("connect called while driver is running; ignoring");
                return;
            }
        }

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let driver = Driver {
            config: self.config.clone(),
            store: Arc::clone(&self.store),
            replay: Arc::clone(&self.replay),
            status_tx: self.status_tx.clone(),
            cmd_rx,
            shutdown_rx,
        };
        let task = tokio::spawn(driver.run());
        self.driver = Some(DriverHandle {
            cmd_tx,
            shutdown_tx,
            task,
        });
    }

    /// Intentional, terminal close.
    ///
    /// Cancels any pending reconnect and heartbeat timers, closes the
    /// transport, and lands in `Disconnected` without self-reconnecting.
    pub async fn disconnect(&mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };
        let _ = driver.shutdown_tx.send(true);
        if let Err(e) = driver.task.await {
            warn!(error = %e, "driver task did not shut down cleanly");
        }
        if self.status_tx.borrow().status != ConnectionStatus::Disconnected {
            let _ = self
                .status_tx
                .send(StatusUpdate::new(ConnectionStatus::Disconnected));
        }
    }

    /// Transmit a command, or fail immediately when not connected.
    ///
    /// No queuing and no acknowledgement: a command that races a disconnect
    /// is dropped, and the store only reflects a command's effect once the
    /// server echoes it back.
    pub fn send(&self, command: ClientCommand) -> Result<()> {
        if self.status_tx.borrow().status != ConnectionStatus::Connected {
            return Err(Error::NotConnected);
        }
        let Some(driver) = &self.driver else {
            return Err(Error::NotConnected);
        };
        driver
            .cmd_tx
            .send(command)
            .map_err(|_| Error::NotConnected)
    }

    /// Current connection status.
    pub fn status(&self) -> StatusUpdate {
        self.status_tx.borrow().clone()
    }

    /// Subscribe to status transitions.
    pub fn subscribe_status(&self) -> watch::Receiver<StatusUpdate> {
        self.status_tx.subscribe()
    }

    /// Shared handle to the live state store.
    pub fn store(&self) -> Arc<RwLock<StateStore>> {
        Arc::clone(&self.store)
    }

    /// Shared handle to the replay buffer.
    pub fn replay(&self) -> Arc<RwLock<ReplayBuffer>> {
        Arc::clone(&self.replay)
    }

    /// Whether the driver task is alive (connected or trying to connect).
    pub fn is_running(&self) -> bool {
        self.driver.as_ref().is_some_and(|d| !d.task.is_finished())
    }

    /// Select a node for detail display.
    pub async fn select_node(&self, intersection_id: impl Into<String>) {
        self.store.write().await.select_node(intersection_id);
    }
}

/// Why the driver stopped.
enum Exit {
    /// Intentional shutdown via `disconnect()` or a dropped client.
    Shutdown,
    /// Reconnect attempts exhausted; terminal `Error` status published.
    Exhausted,
}

/// Why a live connection ended.
enum Closed {
    Shutdown,
    Lost(String),
}

/// Outcome of one backoff wait.
enum Backoff {
    Retry,
    Shutdown,
    Exhausted,
}

/// The driver owns the transport and every timer. It is the single writer
/// of the store and the replay buffer.
struct Driver {
    config: ClientConfig,
    store: Arc<RwLock<StateStore>>,
    replay: Arc<RwLock<ReplayBuffer>>,
    status_tx: watch::Sender<StatusUpdate>,
    cmd_rx: mpsc::UnboundedReceiver<ClientCommand>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Driver {
    async fn run(mut self) {
        match self.run_inner().await {
            Exit::Shutdown => {
                if self.status_tx.borrow().status != ConnectionStatus::Disconnected {
                    self.set_status(StatusUpdate::new(ConnectionStatus::Disconnected));
                }
                debug!("driver stopped");
            }
            Exit::Exhausted => debug!("driver stopped in terminal error state"),
        }
    }

    async fn run_inner(&mut self) -> Exit {
        let mut attempt: u32 = 0;

        loop {
            self.set_status(StatusUpdate::new(ConnectionStatus::Connecting));

            let mut transport = tokio::select! {
                _ = wait_shutdown(&mut self.shutdown_rx) => return Exit::Shutdown,
                result = Transport::connect(&self.config.url) => match result {
                    Ok(transport) => transport,
                    Err(e) => {
                        warn!(error = %e, "connection attempt failed");
                        match self.backoff(&mut attempt, e.to_string()).await {
                            Backoff::Retry => continue,
                            Backoff::Shutdown => return Exit::Shutdown,
                            Backoff::Exhausted => return Exit::Exhausted,
                        }
                    }
                },
            };

            info!(url = %self.config.url, "connected to city feed");
            attempt = 0;
            self.set_status(StatusUpdate::new(ConnectionStatus::Connected));

            match self.drive_connection(&mut transport).await {
                Closed::Shutdown => {
                    transport.close().await;
                    return Exit::Shutdown;
                }
                Closed::Lost(reason) => {
                    match self.backoff(&mut attempt, reason).await {
                        Backoff::Retry => continue,
                        Backoff::Shutdown => return Exit::Shutdown,
                        Backoff::Exhausted => return Exit::Exhausted,
                    }
                }
            }
        }
    }

    /// Serve one live connection until it ends.
    async fn drive_connection(&mut self, transport: &mut Transport) -> Closed {
        // First heartbeat one full interval after connect, not immediately.
        let mut heartbeat = interval_at(
            Instant::now() + self.config.heartbeat_interval,
            self.config.heartbeat_interval,
        );
        let mut replay_tick = interval(self.config.replay_tick_interval);

        loop {
            tokio::select! {
                _ = wait_shutdown(&mut self.shutdown_rx) => return Closed::Shutdown,

                frame = transport.next_frame() => match frame {
                    Frame::Text(text) => self.handle_frame(&text).await,
                    Frame::Closed => return Closed::Lost("connection closed".to_string()),
                },

                command = self.cmd_rx.recv() => match command {
                    Some(command) => {
                        if let Err(e) = self.forward(transport, &command).await {
                            return Closed::Lost(e.to_string());
                        }
                    }
                    // All senders gone: the client handle was dropped
                    // without disconnect(). Treat as shutdown.
                    None => return Closed::Shutdown,
                },

                _ = heartbeat.tick() => {
                    if let Err(e) = self.forward(transport, &ClientCommand::Ping).await {
                        return Closed::Lost(e.to_string());
                    }
                }

                _ = replay_tick.tick() => {
                    self.replay.write().await.tick();
                }
            }
        }
    }

    /// Decode one frame and merge it. Undecodable frames are dropped by the
    /// codec; full snapshots are also recorded into the replay ring.
    async fn handle_frame(&self, raw: &str) {
        let Some(msg) = codec::decode(raw) else {
            return;
        };
        if let ServerMessage::CityUpdate(update) = &msg {
            self.replay.write().await.record(update.clone());
        }
        let applied = self.store.write().await.apply(&msg);
        debug!(kind = msg.kind(), ?applied, "message merged");
    }

    /// Serialize and transmit one outbound command.
    async fn forward(&self, transport: &mut Transport, command: &ClientCommand) -> Result<()> {
        let json = match codec::encode(command) {
            Ok(json) => json,
            Err(e) => {
                warn!(kind = command.kind(), error = %e, "dropping unserializable command");
                return Ok(());
            }
        };
        transport.send_text(&json).await?;
        debug!(kind = command.kind(), "command sent");
        Ok(())
    }

    /// Publish `Disconnected` and wait out the backoff delay, or go
    /// terminal once attempts are exhausted.
    async fn backoff(&mut self, attempt: &mut u32, reason: String) -> Backoff {
        if *attempt >= self.config.reconnect.max_attempts {
            warn!(attempts = *attempt, "reconnect attempts exhausted");
            self.set_status(StatusUpdate::with_error(ConnectionStatus::Error, reason));
            return Backoff::Exhausted;
        }

        let delay = self.config.reconnect.delay_for_attempt(*attempt);
        *attempt += 1;
        info!(
            attempt = *attempt,
            delay_ms = delay.as_millis() as u64,
            "scheduling reconnect"
        );
        self.set_status(StatusUpdate::with_error(
            ConnectionStatus::Disconnected,
            reason,
        ));

        tokio::select! {
            _ = wait_shutdown(&mut self.shutdown_rx) => Backoff::Shutdown,
            _ = tokio::time::sleep(delay) => Backoff::Retry,
        }
    }

    fn set_status(&self, update: StatusUpdate) {
        info!(status = %update.status, error = update.error.as_deref(), "connection status");
        // Receivers may all be gone during teardown.
        let _ = self.status_tx.send(update);
    }
}

/// Resolve when shutdown is signalled or the client handle is gone.
async fn wait_shutdown(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}
