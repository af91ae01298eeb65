use dashmap::DashMap;
use std::collections::VecDeque;
use tracing::debug;

use crate::protocol::Reading;

/// Default number of readings kept in memory per room
pub const DEFAULT_MAX_RECENT: usize = 200;

/// Bounded FIFO of the most recent readings of one room
#[derive(Debug, Clone)]
pub struct RoomBuffer {
    recent: VecDeque<Reading>,
    capacity: usize,
    total_appended: u64,
}

impl RoomBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            recent: VecDeque::with_capacity(capacity),
            capacity,
            total_appended: 0,
        }
    }

    /// Push to the tail, evicting from the head once over capacity
    pub fn push(&mut self, reading: Reading) {
        self.recent.push_back(reading);
        while self.recent.len() > self.capacity {
            self.recent.pop_front();
        }
        self.total_appended += 1;
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.recent.back()
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }

    /// Owned copy, oldest first
    pub fn snapshot(&self) -> Vec<Reading> {
        self.recent.iter().cloned().collect()
    }
}

/// Per-room in-memory store backing the low-latency status and history paths.
///
/// Rooms have no state until their first append. Reads always hand out owned
/// copies, so a concurrent append never alters a sequence a caller holds.
pub struct MemoryStore {
    rooms: DashMap<String, RoomBuffer>,
    capacity: usize,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn append(&self, room: &str, reading: Reading) {
        let mut buffer = self
            .rooms
            .entry(room.to_string())
            .or_insert_with(|| RoomBuffer::new(self.capacity));
        buffer.push(reading);
        debug!(
            "Room '{}' buffer holds {} readings ({} appended)",
            room,
            buffer.len(),
            buffer.total_appended()
        );
    }

    pub fn latest(&self, room: &str) -> Option<Reading> {
        self.rooms
            .get(room)
            .and_then(|buffer| buffer.latest().cloned())
    }

    /// Recent readings, oldest first. Empty for rooms without state.
    pub fn recent(&self, room: &str) -> Vec<Reading> {
        self.rooms
            .get(room)
            .map(|buffer| buffer.snapshot())
            .unwrap_or_default()
    }

    /// Rooms currently holding state, sorted
    pub fn rooms(&self) -> Vec<String> {
        let mut rooms: Vec<String> = self
            .rooms
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| entry.key().clone())
            .collect();
        rooms.sort();
        rooms
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECENT)
    }
}
