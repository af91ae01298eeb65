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

// Composition root: one instance per process, handed explicitly to every boundary

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::buffer::MemoryStore;
use crate::config::SteeriaConfig;
use crate::ingest::IngestionCoordinator;
use crate::protocol::HealthResponse;
use crate::query::QueryService;
use crate::rooms::RoomRegistry;
use crate::storage::{FileLogStore, LogStore};

pub const SERVICE_NAME: &str = "Steeria Core";

pub struct SensorService {
    coordinator: IngestionCoordinator,
    queries: QueryService,
    log: Arc<dyn LogStore>,
    started_at: Instant,
}

impl SensorService {
    /// Build the service over the filesystem log store described by `config`
    pub async fn from_config(config: &SteeriaConfig) -> Result<Self> {
        let log: Arc<dyn LogStore> = Arc::new(FileLogStore::new(&config.storage));
        log.initialize()
            .await
            .context("Failed to initialize log store")?;

        Ok(Self::new(
            config.room_registry(),
            MemoryStore::new(config.memory.max_recent),
            log,
        ))
    }

    pub fn new(rooms: RoomRegistry, memory: MemoryStore, log: Arc<dyn LogStore>) -> Self {
        let memory = Arc::new(memory);
        info!(
            "Service ready: {} rooms, {} readings in memory per room, {} log backend",
            rooms.len(),
            memory.capacity(),
            log.backend_type()
        );
        Self {
            coordinator: IngestionCoordinator::new(rooms.clone(), memory.clone(), log.clone()),
            queries: QueryService::new(rooms, memory, log.clone()),
            log,
            started_at: Instant::now(),
        }
    }

    pub fn coordinator(&self) -> &IngestionCoordinator {
        &self.coordinator
    }

    pub fn queries(&self) -> &QueryService {
        &self.queries
    }

    pub fn log_store(&self) -> &Arc<dyn LogStore> {
        &self.log
    }

    pub fn health(&self, port: u16) -> HealthResponse {
        HealthResponse {
            ok: true,
            servico: SERVICE_NAME.to_string(),
            versao: env!("CARGO_PKG_VERSION").to_string(),
            uptime: self.started_at.elapsed().as_secs_f64(),
            rooms_in_memory: self.queries.rooms_in_memory(),
            porta: port,
            ingest: self.coordinator.stats(),
        }
    }
}
