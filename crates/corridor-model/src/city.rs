//! City snapshot payload: intersections, signal phases, and metrics.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A WGS-84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Compass direction of an intersection approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All four approaches, in the order the server reports them.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::North => write!(f, "north"),
            Direction::South => write!(f, "south"),
            Direction::East => write!(f, "east"),
            Direction::West => write!(f, "west"),
        }
    }
}

/// Signal head state for the active phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalStatus {
    Green,
    Yellow,
    Red,
}

/// The phase a signal controller is currently serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalPhase {
    pub phase_id: u32,
    /// Approaches currently receiving right of way.
    pub active_directions: Vec<Direction>,
    pub status: SignalStatus,
    /// Seconds until the controller re-evaluates the phase.
    pub remaining_time: u32,
}

/// Vehicle counts by class on one approach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleCounts {
    pub car: u32,
    pub bus: u32,
    pub truck: u32,
    pub bike: u32,
}

impl VehicleCounts {
    /// Total vehicles across all classes.
    pub fn total(&self) -> u32 {
        self.car + self.bus + self.truck + self.bike
    }
}

/// Queue and wait measurements for one approach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionMetrics {
    pub vehicle_counts: VehicleCounts,
    pub queue_length: u32,
    pub vehicles_crossed: u32,
    pub avg_wait_time: f64,
    pub emergency_vehicle_present: bool,
}

/// Aggregate measurements across all approaches of one intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub total_vehicles_passed: u64,
    pub avg_wait_time_all_sides: f64,
    pub throughput: f64,
    pub avg_speed: f64,
    pub cycle_time: u32,
}

/// The controller's stated rationale for its current phase decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explainability {
    pub policy: String,
    pub reason: String,
    pub phase_scores: HashMap<String, f64>,
    pub chosen_phase: String,
    pub emergency_preemption: bool,
    pub notes: String,
}

/// One signalized intersection.
///
/// A node is owned entirely by the snapshot that last described it - it is
/// replaced wholesale on every `city_update`, never partially patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique key within the city's node list.
    pub intersection_id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Ids of directly connected intersections.
    pub neighbors: Vec<String>,
    pub current_phase: SignalPhase,
    pub overall_metrics: NodeMetrics,
    pub direction_metrics: HashMap<Direction, DirectionMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explainability: Option<Explainability>,
}

/// A complete, authoritative description of the city at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityDescription {
    pub city_id: String,
    pub center: GeoPoint,
    pub nodes: Vec<Node>,
}
