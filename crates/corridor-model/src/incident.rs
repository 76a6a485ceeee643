//! Incidents and ambulance corridors.
//!
//! Both arrive two ways: inside a full snapshot (baseline) and as standalone
//! incremental updates. Either way an entry is identified by its id field
//! and merged by upsert; entries disappear only when a newer snapshot's
//! collection no longer contains them.

use crate::city::Direction;
use serde::{Deserialize, Serialize};

/// Classification of a reported disruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentKind {
    Accident,
    Roadblock,
    Event,
}

/// Lifecycle state of an incident.
///
/// Well-behaved servers only move active -> cleared; the client does not
/// enforce this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    Active,
    Cleared,
}

/// A reported disruption at a specific intersection approach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique key within the incident collection.
    pub incident_id: String,
    pub intersection_id: String,
    pub direction: Direction,
    pub incident_type: IncidentKind,
    pub severity: u8,
    pub created_at: String,
    pub status: IncidentStatus,
}

impl Incident {
    pub fn is_active(&self) -> bool {
        self.status == IncidentStatus::Active
    }
}

/// Lifecycle state of an ambulance corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    Enroute,
    Arrived,
    Cleared,
}

/// A requested priority path between two intersections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbulanceRoute {
    /// Unique key within the route collection.
    pub route_id: String,
    pub from_intersection: String,
    pub to_intersection: String,
    pub created_at: String,
    pub eta_seconds: u32,
    pub status: RouteStatus,
}

impl AmbulanceRoute {
    pub fn is_enroute(&self) -> bool {
        self.status == RouteStatus::Enroute
    }
}
