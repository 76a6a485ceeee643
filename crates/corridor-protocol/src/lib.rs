//! Corridor Protocol - wire messages for the city traffic feed
//!
//! The feed is JSON text frames over one WebSocket connection, discriminated
//! by a string `type` field in both directions:
//!
//! ```text
//! ┌─────────────┐   city_update / incident_update / ...   ┌─────────────┐
//! │   Server    │ ───────────────────────────────────────→ │   Client    │
//! │  (city hub) │ ←─────────────────────────────────────── │ (dashboard) │
//! └─────────────┘   dispatch_ambulance / ping / ...        └─────────────┘
//! ```
//!
//! Inbound frames decode into [`ServerMessage`], a closed union - anything
//! that does not parse, lacks a string `type`, or carries an unrecognized
//! kind is silently dropped by [`codec::decode`]. Unknown message kinds are
//! not an error: a forward-compatible client must tolerate them.
//!
//! Outbound frames are [`ClientCommand`] values serialized with their fixed
//! `type` discriminators.

pub mod codec;
pub mod messages;

pub use codec::{decode, encode};
pub use messages::{CityUpdate, ClientCommand, ServerMessage};
