//! Event timeline entries.

use serde::{Deserialize, Serialize};

/// One entry of the server's append-only event log.
///
/// The payload is opaque to the client - it is retained for display only,
/// never replayed into state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: String,
    #[serde(default)]
    pub data: serde_json::Value,
}
