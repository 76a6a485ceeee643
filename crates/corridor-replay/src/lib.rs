//! Corridor Replay - bounded history of full snapshots for scrubbing.
//!
//! [`ReplayBuffer`] is a passive recorder: the client driver feeds it every
//! full snapshot (incremental updates are never recorded) and it keeps the
//! most recent N in arrival order, evicting the oldest once full. A read
//! cursor with play/stop/seek controls feeds the scrub/playback UI. The
//! buffer is independent of the live state store and never reconstructs
//! authoritative state.

use std::collections::VecDeque;

use corridor_protocol::CityUpdate;
use serde::{Deserialize, Serialize};

/// Default ring capacity, in snapshots.
pub const DEFAULT_REPLAY_CAPACITY: usize = 300;

/// Current state of replay playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayState {
    /// Cursor is parked; ticks do nothing.
    Stopped,
    /// Cursor advances one frame per tick.
    Playing,
    /// Cursor reached the last frame; playback does not loop.
    Finished,
}

/// Fixed-capacity FIFO ring of city snapshots with a playback cursor.
pub struct ReplayBuffer {
    frames: VecDeque<CityUpdate>,
    capacity: usize,
    cursor: usize,
    state: ReplayState,
    recording: bool,
}

impl ReplayBuffer {
    /// Create an empty buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Create an empty buffer holding at most `capacity` snapshots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            cursor: 0,
            state: ReplayState::Stopped,
            recording: true,
        }
    }

    /// Append a snapshot, evicting the oldest when full.
    ///
    /// Ignored while recording is off. When a frame is evicted the cursor
    /// shifts down with it, so it keeps pointing at the same recorded
    /// moment while scrubbing.
    pub fn record(&mut self, snapshot: CityUpdate) {
        if !self.recording {
            return;
        }
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
            self.cursor = self.cursor.saturating_sub(1);
        }
        self.frames.push_back(snapshot);
    }

    /// Toggle whether new snapshots are appended.
    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Start playback. Restarts from the beginning when already at the end.
    pub fn play(&mut self) {
        if self.frames.is_empty() {
            return;
        }
        if self.state == ReplayState::Finished || self.cursor + 1 >= self.frames.len() {
            self.cursor = 0;
        }
        self.state = ReplayState::Playing;
    }

    /// Halt playback, leaving the cursor in place.
    pub fn stop(&mut self) {
        if self.state == ReplayState::Playing {
            self.state = ReplayState::Stopped;
        }
    }

    /// Jump the cursor directly, implicitly pausing playback.
    ///
    /// The index is clamped to the last frame.
    pub fn seek(&mut self, index: usize) {
        if self.frames.is_empty() {
            return;
        }
        self.cursor = index.min(self.frames.len() - 1);
        self.state = ReplayState::Stopped;
    }

    /// Advance one frame if playing. Called by the owner at a fixed tick
    /// interval; playback finishes at the last frame rather than looping.
    pub fn tick(&mut self) -> Option<&CityUpdate> {
        if self.state != ReplayState::Playing {
            return None;
        }
        if self.cursor + 1 < self.frames.len() {
            self.cursor += 1;
        } else {
            self.state = ReplayState::Finished;
        }
        self.frames.get(self.cursor)
    }

    /// The snapshot at the cursor, or `None` while the buffer is empty.
    pub fn current(&self) -> Option<&CityUpdate> {
        self.frames.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshots currently held, oldest first.
    pub fn frames(&self) -> impl Iterator<Item = &CityUpdate> {
        self.frames.iter()
    }
}

impl Default for ReplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Replay summary for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayStatus {
    pub cursor: usize,
    pub len: usize,
    pub capacity: usize,
    pub state: ReplayState,
    pub recording: bool,
}

impl From<&ReplayBuffer> for ReplayStatus {
    fn from(buffer: &ReplayBuffer) -> Self {
        Self {
            cursor: buffer.cursor,
            len: buffer.frames.len(),
            capacity: buffer.capacity,
            state: buffer.state,
            recording: buffer.recording,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corridor_model::{CityDescription, GeoPoint};

    fn snapshot(n: usize) -> CityUpdate {
        CityUpdate {
            timestamp: format!("2026-08-06T10:00:{n:02}Z"),
            city: CityDescription {
                city_id: format!("CITY_{n}"),
                center: GeoPoint {
                    lat: 0.0,
                    lng: 0.0,
                },
                nodes: Vec::new(),
            },
            incidents: Vec::new(),
            ambulance_routes: Vec::new(),
            event_log_tail: Vec::new(),
        }
    }

    fn city_ids(buffer: &ReplayBuffer) -> Vec<String> {
        buffer.frames().map(|f| f.city.city_id.clone()).collect()
    }

    #[test]
    fn empty_buffer_has_no_current_frame() {
        let buffer = ReplayBuffer::with_capacity(4);
        assert!(buffer.current().is_none());
        assert_eq!(buffer.state(), ReplayState::Stopped);
    }

    #[test]
    fn record_evicts_oldest_at_capacity() {
        let mut buffer = ReplayBuffer::with_capacity(3);
        for n in 0..4 {
            buffer.record(snapshot(n));
        }

        assert_eq!(buffer.len(), 3);
        assert_eq!(city_ids(&buffer), ["CITY_1", "CITY_2", "CITY_3"]);
    }

    #[test]
    fn recording_toggle_gates_appends() {
        let mut buffer = ReplayBuffer::with_capacity(3);
        buffer.record(snapshot(0));

        buffer.set_recording(false);
        buffer.record(snapshot(1));
        assert_eq!(buffer.len(), 1);

        buffer.set_recording(true);
        buffer.record(snapshot(2));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn tick_advances_only_while_playing() {
        let mut buffer = ReplayBuffer::with_capacity(8);
        for n in 0..3 {
            buffer.record(snapshot(n));
        }

        assert!(buffer.tick().is_none());
        assert_eq!(buffer.cursor(), 0);

        buffer.play();
        buffer.tick();
        assert_eq!(buffer.cursor(), 1);
    }

    #[test]
    fn playback_finishes_at_end_without_looping() {
        let mut buffer = ReplayBuffer::with_capacity(8);
        for n in 0..3 {
            buffer.record(snapshot(n));
        }

        buffer.play();
        buffer.tick();
        buffer.tick();
        assert_eq!(buffer.cursor(), 2);

        buffer.tick();
        assert_eq!(buffer.state(), ReplayState::Finished);
        assert_eq!(buffer.cursor(), 2);
    }

    #[test]
    fn play_after_finish_restarts() {
        let mut buffer = ReplayBuffer::with_capacity(8);
        for n in 0..2 {
            buffer.record(snapshot(n));
        }

        buffer.play();
        buffer.tick();
        buffer.tick();
        assert_eq!(buffer.state(), ReplayState::Finished);

        buffer.play();
        assert_eq!(buffer.cursor(), 0);
        assert_eq!(buffer.state(), ReplayState::Playing);
    }

    #[test]
    fn seek_clamps_and_pauses() {
        let mut buffer = ReplayBuffer::with_capacity(8);
        for n in 0..4 {
            buffer.record(snapshot(n));
        }
        buffer.play();

        buffer.seek(2);
        assert_eq!(buffer.cursor(), 2);
        assert_eq!(buffer.state(), ReplayState::Stopped);
        assert_eq!(buffer.current().unwrap().city.city_id, "CITY_2");

        buffer.seek(100);
        assert_eq!(buffer.cursor(), 3);
    }

    #[test]
    fn eviction_shifts_cursor_with_its_frame() {
        let mut buffer = ReplayBuffer::with_capacity(3);
        for n in 0..3 {
            buffer.record(snapshot(n));
        }
        buffer.seek(1); // CITY_1

        buffer.record(snapshot(3)); // evicts CITY_0
        assert_eq!(buffer.cursor(), 0);
        assert_eq!(buffer.current().unwrap().city.city_id, "CITY_1");
    }

    #[test]
    fn status_reflects_buffer() {
        let mut buffer = ReplayBuffer::with_capacity(5);
        for n in 0..2 {
            buffer.record(snapshot(n));
        }
        buffer.play();

        let status = ReplayStatus::from(&buffer);
        assert_eq!(status.len, 2);
        assert_eq!(status.capacity, 5);
        assert_eq!(status.state, ReplayState::Playing);
        assert!(status.recording);
    }
}
