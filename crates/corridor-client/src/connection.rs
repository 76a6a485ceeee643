//! Connection lifecycle: status states and reconnect policy.

use std::time::Duration;

/// State of the managed connection.
///
/// Transitions: `Connecting -> Connected -> Disconnected -> (Connecting |
/// Error)`. `Error` is terminal - it is entered once the reconnect budget is
/// exhausted and only an explicit [`connect`](crate::SyncClient::connect)
/// leaves it. An intentional [`disconnect`](crate::SyncClient::disconnect)
/// lands in `Disconnected` without scheduling a reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// A connection attempt is in flight.
    Connecting,
    /// The transport is open.
    Connected,
    /// The transport is down; a reconnect may be pending.
    Disconnected,
    /// Reconnect attempts are exhausted.
    Error,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One observable status transition, published on the client's watch
/// channel on every state change.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub status: ConnectionStatus,
    /// Human-readable description of the failure that caused this
    /// transition, when there was one. For display, not for matching.
    pub error: Option<String>,
}

impl StatusUpdate {
    pub(crate) fn new(status: ConnectionStatus) -> Self {
        Self {
            status,
            error: None,
        }
    }

    pub(crate) fn with_error(status: ConnectionStatus, error: impl Into<String>) -> Self {
        Self {
            status,
            error: Some(error.into()),
        }
    }
}

/// Reconnect backoff policy.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnect attempt.
    pub base_delay: Duration,
    /// Upper bound for the backoff delay.
    pub max_delay: Duration,
    /// Attempts before giving up and entering the terminal `Error` state.
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: 10,
        }
    }
}

impl ReconnectConfig {
    /// Backoff delay for the given attempt number (0-based).
    ///
    /// Doubles per attempt, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        // 2^attempt saturates well before the shift could overflow.
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}
