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

// Steeria Core: environmental sensor ingestion service
//
// This service:
// - Validates periodic room readings (temperature, humidity, vpd, sensor status)
// - Keeps the most recent readings of each room in memory for fast polling
// - Appends every reading to a bounded per-room JSON log on disk
// - Serves latest/history queries over HTTP and a zenoh bridge
// - Hosts device integrations that feed the ingestion entry point

pub mod api;
pub mod buffer;
pub mod config;
pub mod control;
pub mod error;
pub mod ingest;
pub mod integrations;
pub mod protocol;
pub mod query;
pub mod rooms;
pub mod service;
pub mod storage;
pub mod validator;

// Re-export main types
pub use buffer::{MemoryStore, RoomBuffer};
pub use config::{load_config, load_config_with_env, SteeriaConfig};
pub use control::ControlInterface;
pub use error::{PersistenceError, QueryError, SteeriaError, ValidationError};
pub use ingest::{Durability, IngestOutcome, IngestionCoordinator};
pub use protocol::{IngestStats, RawHistory, Reading};
pub use query::QueryService;
pub use rooms::RoomRegistry;
pub use service::SensorService;
pub use storage::{FileLogStore, LogStore};
