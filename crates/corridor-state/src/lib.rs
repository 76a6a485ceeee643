//! Corridor State - the authoritative current view of the city.
//!
//! [`StateStore`] holds the node list, incident collection, route collection,
//! and bounded event timeline, and merges inbound messages through one pure
//! dispatch function, [`StateStore::apply`]. Merge logic is fully separated
//! from I/O: the store never touches a socket and is directly unit-testable.
//!
//! # Merge rules
//!
//! - A full snapshot replaces the node, incident, and route collections
//!   wholesale and appends its event tail to the retained log.
//! - An incremental incident/route update upserts by id: an existing entry
//!   is replaced and moved to the front, a new entry is inserted at the
//!   front, so the most-recently-updated entry always surfaces first.
//! - Node selection changes only through [`StateStore::select_node`], except
//!   that the first snapshot selects its first node when nothing is selected.
//!
//! The protocol carries no sequence numbers, so an incremental update that
//! races a snapshot describing older state is silently discarded when the
//! snapshot replaces the collection. That is a known consistency gap
//! inherited from the feed, not a guarantee to rely on.

pub mod store;

pub use store::{Applied, StateStore, DEFAULT_EVENT_LOG_LIMIT};
