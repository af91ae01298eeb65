// Copyright 2025 Steeria
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Query service: read-only access to both stores

use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::buffer::MemoryStore;
use crate::error::QueryError;
use crate::protocol::{LatestSnapshot, RawHistory, Reading};
use crate::rooms::RoomRegistry;
use crate::storage::LogStore;

pub struct QueryService {
    rooms: RoomRegistry,
    memory: Arc<MemoryStore>,
    log: Arc<dyn LogStore>,
}

impl QueryService {
    pub fn new(rooms: RoomRegistry, memory: Arc<MemoryStore>, log: Arc<dyn LogStore>) -> Self {
        Self { rooms, memory, log }
    }

    fn check_room(&self, room: &str) -> Result<(), QueryError> {
        if self.rooms.contains(room) {
            Ok(())
        } else {
            Err(QueryError::InvalidRoom {
                room: room.to_string(),
            })
        }
    }

    /// Latest in-memory reading of a registered room
    pub fn status(&self, room: &str) -> Result<Reading, QueryError> {
        self.check_room(room)?;
        self.memory.latest(room).ok_or_else(|| QueryError::NotFound {
            room: room.to_string(),
        })
    }

    /// In-memory history of a registered room, oldest first
    pub fn history(&self, room: &str) -> Result<Vec<Reading>, QueryError> {
        self.check_room(room)?;
        Ok(self.memory.recent(room))
    }

    /// Last durably logged entry of every registered room, as stored
    pub async fn latest_across_rooms(&self) -> BTreeMap<String, Option<Value>> {
        let mut latest = BTreeMap::new();
        for room in self.rooms.iter() {
            latest.insert(room.to_string(), self.log.last(room).await);
        }
        latest
    }

    pub async fn latest_snapshot(&self) -> LatestSnapshot {
        LatestSnapshot {
            updated_at: Utc::now(),
            salas: self.latest_across_rooms().await,
        }
    }

    /// Durable history of any identifier.
    ///
    /// Not restricted to the room registry, so rooms can be queried before
    /// they are formally registered. Unknown identifiers yield an empty result.
    pub async fn raw_history(&self, identifier: &str) -> RawHistory {
        RawHistory::new(identifier, self.log.read_all(identifier).await)
    }

    /// Rooms currently holding in-memory state
    pub fn rooms_in_memory(&self) -> Vec<String> {
        self.memory.rooms()
    }
}
