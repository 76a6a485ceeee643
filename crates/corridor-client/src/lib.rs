//! Corridor Client - real-time synchronization for the city traffic feed.
//!
//! One [`SyncClient`] instance owns one logical connection to the city hub
//! and keeps a consistent, query-able view of current city state while
//! tolerating connection loss and partial delivery.
//!
//! # Architecture
//!
//! ```text
//! Transport ─→ driver task ─→ codec ─→ StateStore (merge)
//!    ↑            │                └──→ ReplayBuffer (snapshots only)
//!    │            ├── reconnect backoff timer
//!    │            ├── heartbeat timer
//!    └─ commands ─┘
//! ```
//!
//! The driver task is the single writer: transport events, timers, and
//! outbound commands are serviced serially, so messages merge in exact
//! arrival order. Consumers read the store and the replay buffer through
//! shared handles and observe connection status on a watch channel.
//!
//! # Example
//!
//! ```no_run
//! use corridor_client::{ClientConfig, SyncClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut client = SyncClient::new(ClientConfig::from_env());
//!     client.connect();
//!
//!     // ... read client.store(), issue commands, watch status ...
//!
//!     client.disconnect().await;
//! }
//! ```

pub mod client;
pub mod commands;
pub mod connection;
pub mod error;
pub mod transport;

pub use client::{ClientConfig, SyncClient, DEFAULT_URL};
pub use connection::{ConnectionStatus, ReconnectConfig, StatusUpdate};
pub use error::{Error, Result};
