//! Frame codec: raw text in, typed messages out.
//!
//! Decoding never fails loudly. Malformed payloads and unknown message kinds
//! are dropped with a trace log so a misbehaving or newer server cannot
//! crash the merge pipeline.

use crate::messages::{ClientCommand, ServerMessage};
use serde_json::Value;
use tracing::trace;

/// Decode one inbound frame.
///
/// Returns `None` for anything outside the recognized set: unparseable
/// JSON, a missing or non-string `type` field, an unknown discriminator, or
/// a recognized discriminator with a malformed payload.
pub fn decode(raw: &str) -> Option<ServerMessage> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            trace!(error = %e, "dropping unparseable frame");
            return None;
        }
    };

    let Some(kind) = value.get("type").and_then(Value::as_str).map(str::to_owned) else {
        trace!("dropping frame without string type field");
        return None;
    };

    match serde_json::from_value::<ServerMessage>(value) {
        Ok(msg) => Some(msg),
        Err(e) => {
            trace!(kind = %kind, error = %e, "dropping unrecognized or malformed frame");
            None
        }
    }
}

/// Serialize one outbound command.
pub fn encode(cmd: &ClientCommand) -> serde_json::Result<String> {
    serde_json::to_string(cmd)
}
