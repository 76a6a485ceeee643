//! Corridor Model - City traffic data model
//!
//! Plain data types shared by every Corridor crate:
//!
//! - **City**: a full description of all signalized intersections at one
//!   point in time (the payload of a server snapshot)
//! - **Incident**: a reported disruption at an intersection/direction
//! - **AmbulanceRoute**: a priority corridor between two intersections
//! - **EventRecord**: one entry of the server's append-only event timeline
//!
//! Collections of incidents and routes are keyed by their id fields; a
//! collection never holds two entries with the same id. Timestamps are the
//! server's ISO-8601 strings and are treated as opaque display values.

pub mod city;
pub mod event;
pub mod incident;

pub use city::{
    CityDescription, Direction, DirectionMetrics, Explainability, GeoPoint, Node, NodeMetrics,
    SignalPhase, SignalStatus, VehicleCounts,
};
pub use event::EventRecord;
pub use incident::{AmbulanceRoute, Incident, IncidentKind, IncidentStatus, RouteStatus};
