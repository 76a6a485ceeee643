//! Outbound command API.
//!
//! One method per command kind, each a thin serializer over
//! [`SyncClient::send`]. Fire-and-forget: a failure is reported
//! synchronously and nothing is retried or reflected locally - the store
//! changes only when the server echoes the effect back.

use corridor_model::{Direction, IncidentKind};
use corridor_protocol::ClientCommand;

use crate::client::SyncClient;
use crate::error::Result;

impl SyncClient {
    /// Request a priority corridor for an ambulance between two
    /// intersections.
    pub fn dispatch_ambulance(
        &self,
        from_intersection: impl Into<String>,
        to_intersection: impl Into<String>,
        eta_seconds: u32,
    ) -> Result<()> {
        self.send(ClientCommand::DispatchAmbulance {
            from_intersection: from_intersection.into(),
            to_intersection: to_intersection.into(),
            eta_seconds,
        })
    }

    /// Report a disruption at an intersection approach.
    pub fn create_incident(
        &self,
        intersection_id: impl Into<String>,
        direction: Direction,
        incident_type: IncidentKind,
        severity: u8,
    ) -> Result<()> {
        self.send(ClientCommand::IncidentCreate {
            intersection_id: intersection_id.into(),
            direction,
            incident_type,
            severity,
        })
    }

    /// Mark an incident cleared.
    pub fn clear_incident(&self, incident_id: impl Into<String>) -> Result<()> {
        self.send(ClientCommand::IncidentClear {
            incident_id: incident_id.into(),
        })
    }

    /// Tear down an ambulance corridor.
    pub fn clear_ambulance_route(&self, route_id: impl Into<String>) -> Result<()> {
        self.send(ClientCommand::ClearAmbulanceRoute {
            route_id: route_id.into(),
        })
    }

    /// Send a heartbeat probe outside the automatic cadence.
    pub fn ping(&self) -> Result<()> {
        self.send(ClientCommand::Ping)
    }
}
