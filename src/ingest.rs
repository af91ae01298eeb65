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

// Ingestion coordinator: validation -> memory -> durable log, per room in order

use chrono::{SubsecRound, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::buffer::MemoryStore;
use crate::error::{PersistenceError, ValidationError};
use crate::protocol::{IngestStats, Reading};
use crate::rooms::RoomRegistry;
use crate::storage::LogStore;
use crate::validator;

/// How far an accepted reading made it
#[derive(Debug)]
pub enum Durability {
    /// Present in both stores
    Persisted,
    /// Present in memory only; the durable append failed
    Degraded(PersistenceError),
}

/// Result of an accepted submission
#[derive(Debug)]
pub struct IngestOutcome {
    pub reading: Reading,
    pub durability: Durability,
}

impl IngestOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self.durability, Durability::Persisted)
    }
}

/// Sole writer of both stores.
///
/// Submissions for the same room are serialized by a per-room lock held from
/// timestamp assignment until the durable append returns, so both stores see
/// a room's readings in the same order and server timestamps never go
/// backwards within a room. Different rooms never wait on each other.
pub struct IngestionCoordinator {
    rooms: RoomRegistry,
    memory: Arc<MemoryStore>,
    log: Arc<dyn LogStore>,
    room_locks: DashMap<String, Arc<Mutex<()>>>,
    accepted: AtomicU64,
    rejected: AtomicU64,
    degraded: AtomicU64,
}

impl IngestionCoordinator {
    pub fn new(rooms: RoomRegistry, memory: Arc<MemoryStore>, log: Arc<dyn LogStore>) -> Self {
        Self {
            rooms,
            memory,
            log,
            room_locks: DashMap::new(),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            degraded: AtomicU64::new(0),
        }
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    /// Accept a raw payload and return the canonical reading.
    ///
    /// A persistence failure does not fail the submission; see
    /// [`submit_detailed`](Self::submit_detailed) to observe it.
    pub async fn submit(&self, raw: &Value) -> Result<Reading, ValidationError> {
        self.submit_detailed(raw).await.map(|outcome| outcome.reading)
    }

    pub async fn submit_detailed(&self, raw: &Value) -> Result<IngestOutcome, ValidationError> {
        let room = validator::check_room(raw, &self.rooms).map_err(|e| self.reject(e))?;

        let lock = self.room_lock(room);
        let _guard = lock.lock().await;

        // Millisecond precision, as serialized
        let now = Utc::now().trunc_subsecs(3);
        let now = match self.memory.latest(room) {
            Some(last) if last.server_timestamp > now => last.server_timestamp,
            _ => now,
        };
        let reading = validator::validate(raw, &self.rooms, now).map_err(|e| self.reject(e))?;

        info!(
            room = %reading.room,
            temperature = reading.temperature,
            humidity = reading.humidity,
            origin = %reading.origin,
            "Received reading"
        );

        self.memory.append(&reading.room, reading.clone());
        self.accepted.fetch_add(1, Ordering::Relaxed);

        let durability = match self.log.append(&reading.room, &reading).await {
            Ok(()) => Durability::Persisted,
            Err(e) => {
                self.degraded.fetch_add(1, Ordering::Relaxed);
                warn!(
                    room = %reading.room,
                    backend = self.log.backend_type(),
                    error = %e,
                    "Durable append failed, reading kept in memory only"
                );
                Durability::Degraded(e)
            }
        };

        Ok(IngestOutcome {
            reading,
            durability,
        })
    }

    pub fn stats(&self) -> IngestStats {
        IngestStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
        }
    }

    fn room_lock(&self, room: &str) -> Arc<Mutex<()>> {
        self.room_locks
            .entry(room.to_string())
            .or_default()
            .clone()
    }

    fn reject(&self, error: ValidationError) -> ValidationError {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        debug!("Rejected reading: {}", error);
        error
    }
}
