//! Message types for the city feed, both directions.

use corridor_model::{AmbulanceRoute, CityDescription, Direction, EventRecord, Incident, IncidentKind};
use serde::{Deserialize, Serialize};

/// A full snapshot frame.
///
/// Authoritative as of its timestamp: the carried node, incident, and route
/// collections replace the client's copies wholesale. The event tail is the
/// most recent slice of the server's timeline, appended (not replayed) on
/// the client side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityUpdate {
    pub timestamp: String,
    pub city: CityDescription,
    #[serde(default)]
    pub incidents: Vec<Incident>,
    #[serde(default)]
    pub ambulance_routes: Vec<AmbulanceRoute>,
    #[serde(default)]
    pub event_log_tail: Vec<EventRecord>,
}

/// Inbound messages, discriminated by the wire `type` field.
///
/// This is a closed set - [`crate::codec::decode`] drops any other kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Periodic full snapshot of the city.
    CityUpdate(CityUpdate),
    /// Incremental upsert of one incident.
    IncidentUpdate { timestamp: String, incident: Incident },
    /// Incremental upsert of one ambulance corridor.
    AmbulanceRouteUpdate { timestamp: String, route: AmbulanceRoute },
    /// Heartbeat acknowledgement. Advisory only.
    Pong { timestamp: String },
    /// Server-side error notice.
    Error { timestamp: String, message: String },
}

impl ServerMessage {
    /// Wire discriminator for this message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::CityUpdate(_) => "city_update",
            ServerMessage::IncidentUpdate { .. } => "incident_update",
            ServerMessage::AmbulanceRouteUpdate { .. } => "ambulance_route_update",
            ServerMessage::Pong { .. } => "pong",
            ServerMessage::Error { .. } => "error",
        }
    }
}

/// Outbound user commands.
///
/// Fire-and-forget: there is no acknowledgement tracking. The store reflects
/// a command's effect only once the server echoes it back as an update or a
/// later snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Request a priority corridor between two intersections.
    DispatchAmbulance {
        from_intersection: String,
        to_intersection: String,
        eta_seconds: u32,
    },
    /// Report a disruption at an intersection approach.
    IncidentCreate {
        intersection_id: String,
        direction: Direction,
        incident_type: IncidentKind,
        severity: u8,
    },
    /// Mark an incident cleared.
    IncidentClear { incident_id: String },
    /// Tear down an ambulance corridor.
    ClearAmbulanceRoute { route_id: String },
    /// Heartbeat probe.
    Ping,
}

impl ClientCommand {
    /// Wire discriminator for this command, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientCommand::DispatchAmbulance { .. } => "dispatch_ambulance",
            ClientCommand::IncidentCreate { .. } => "incident_create",
            ClientCommand::IncidentClear { .. } => "incident_clear",
            ClientCommand::ClearAmbulanceRoute { .. } => "clear_ambulance_route",
            ClientCommand::Ping => "ping",
        }
    }
}
