//! State store and merge rules.

use std::collections::VecDeque;

use corridor_model::{AmbulanceRoute, EventRecord, GeoPoint, Incident, Node};
use corridor_protocol::ServerMessage;

/// Retained event-log entries. Matches the feed's own server-side retention,
/// so the timeline survives several snapshot tails.
pub const DEFAULT_EVENT_LOG_LIMIT: usize = 500;

/// What a call to [`StateStore::apply`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Collections were replaced wholesale from a snapshot.
    Snapshot,
    /// One incident was upserted.
    IncidentUpserted,
    /// One ambulance route was upserted.
    RouteUpserted,
    /// A heartbeat acknowledgement was recorded.
    Heartbeat,
    /// A server error notice was recorded.
    ServerError,
}

/// The authoritative in-memory view of the city.
///
/// Owned by one client instance; all writes flow through [`apply`] and
/// [`select_node`] on a single driver task, so the store itself carries no
/// locking.
///
/// [`apply`]: StateStore::apply
/// [`select_node`]: StateStore::select_node
#[derive(Debug)]
pub struct StateStore {
    city_id: Option<String>,
    center: Option<GeoPoint>,
    nodes: Vec<Node>,
    incidents: Vec<Incident>,
    routes: Vec<AmbulanceRoute>,
    events: VecDeque<EventRecord>,
    event_log_limit: usize,
    selected_node: Option<String>,
    last_snapshot_at: Option<String>,
    last_pong_at: Option<String>,
    last_server_error: Option<String>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Create an empty store with the default event-log bound.
    pub fn new() -> Self {
        Self::with_event_log_limit(DEFAULT_EVENT_LOG_LIMIT)
    }

    /// Create an empty store retaining at most `limit` event entries.
    pub fn with_event_log_limit(limit: usize) -> Self {
        Self {
            city_id: None,
            center: None,
            nodes: Vec::new(),
            incidents: Vec::new(),
            routes: Vec::new(),
            events: VecDeque::new(),
            event_log_limit: limit,
            selected_node: None,
            last_snapshot_at: None,
            last_pong_at: None,
            last_server_error: None,
        }
    }

    /// Merge one inbound message.
    ///
    /// Messages are applied in exact arrival order; a snapshot takes
    /// precedence over any incremental state received before it.
    pub fn apply(&mut self, msg: &ServerMessage) -> Applied {
        match msg {
            ServerMessage::CityUpdate(update) => {
                // Copy-then-swap: the new collections are fully built from
                // the message before replacing the old ones.
                self.city_id = Some(update.city.city_id.clone());
                self.center = Some(update.city.center);
                self.nodes = update.city.nodes.clone();
                self.incidents = update.incidents.clone();
                self.routes = update.ambulance_routes.clone();
                for event in &update.event_log_tail {
                    self.push_event(event.clone());
                }
                self.last_snapshot_at = Some(update.timestamp.clone());
                if self.selected_node.is_none() {
                    self.selected_node =
                        self.nodes.first().map(|n| n.intersection_id.clone());
                }
                Applied::Snapshot
            }
            ServerMessage::IncidentUpdate { incident, .. } => {
                self.incidents
                    .retain(|i| i.incident_id != incident.incident_id);
                self.incidents.insert(0, incident.clone());
                Applied::IncidentUpserted
            }
            ServerMessage::AmbulanceRouteUpdate { route, .. } => {
                self.routes.retain(|r| r.route_id != route.route_id);
                self.routes.insert(0, route.clone());
                Applied::RouteUpserted
            }
            ServerMessage::Pong { timestamp } => {
                self.last_pong_at = Some(timestamp.clone());
                Applied::Heartbeat
            }
            ServerMessage::Error { message, .. } => {
                self.last_server_error = Some(message.clone());
                Applied::ServerError
            }
        }
    }

    /// Select a node for detail display.
    pub fn select_node(&mut self, intersection_id: impl Into<String>) {
        self.selected_node = Some(intersection_id.into());
    }

    /// Currently selected node id, if any.
    pub fn selected_node(&self) -> Option<&str> {
        self.selected_node.as_deref()
    }

    /// The selected node's full record, if it exists in the current snapshot.
    pub fn selected(&self) -> Option<&Node> {
        let id = self.selected_node.as_deref()?;
        self.node(id)
    }

    /// Look up a node by intersection id.
    pub fn node(&self, intersection_id: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.intersection_id == intersection_id)
    }

    pub fn city_id(&self) -> Option<&str> {
        self.city_id.as_deref()
    }

    pub fn center(&self) -> Option<GeoPoint> {
        self.center
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn routes(&self) -> &[AmbulanceRoute] {
        &self.routes
    }

    /// Retained event timeline, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &EventRecord> {
        self.events.iter()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Timestamp of the last applied snapshot.
    pub fn last_snapshot_at(&self) -> Option<&str> {
        self.last_snapshot_at.as_deref()
    }

    /// Timestamp of the last heartbeat acknowledgement.
    pub fn last_pong_at(&self) -> Option<&str> {
        self.last_pong_at.as_deref()
    }

    /// Most recent server error notice, if any.
    pub fn last_server_error(&self) -> Option<&str> {
        self.last_server_error.as_deref()
    }

    fn push_event(&mut self, event: EventRecord) {
        if self.event_log_limit == 0 {
            return;
        }
        while self.events.len() >= self.event_log_limit {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}
