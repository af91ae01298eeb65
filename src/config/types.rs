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

// Configuration types for steeria-core

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::buffer::DEFAULT_MAX_RECENT;
use crate::rooms::{RoomRegistry, DEFAULT_ROOMS};
use crate::storage::DEFAULT_MAX_LOG_ENTRIES;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SteeriaConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_rooms")]
    pub rooms: Vec<String>,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub zenoh: ZenohConfig,
    #[serde(default)]
    pub integrations: IntegrationsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SteeriaConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            rooms: default_rooms(),
            memory: MemoryConfig::default(),
            storage: StorageConfig::default(),
            zenoh: ZenohConfig::default(),
            integrations: IntegrationsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SteeriaConfig {
    pub fn room_registry(&self) -> RoomRegistry {
        RoomRegistry::new(self.rooms.iter().cloned())
    }
}

/// HTTP listener
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemoryConfig {
    /// Readings kept in memory per room
    #[serde(default = "default_max_recent")]
    pub max_recent: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_recent: default_max_recent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Readings kept on disk per room
    #[serde(default = "default_max_log_entries")]
    pub max_log_entries: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_log_entries: default_max_log_entries(),
        }
    }
}

/// Zenoh bridge configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZenohConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_mode")]
    pub mode: String, // "peer", "client", or "router"

    #[serde(default)]
    pub connect: Option<EndpointsConfig>,

    #[serde(default)]
    pub listen: Option<EndpointsConfig>,

    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for ZenohConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: default_mode(),
            connect: None,
            listen: None,
            key_prefix: default_key_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointsConfig {
    pub endpoints: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IntegrationsConfig {
    #[serde(default)]
    pub tuya_sf03: TuyaConfig,
}

/// Polling of the Tuya SF_03 device adapter
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TuyaConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_tuya_room")]
    pub room: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Ingest endpoint to post to; readings are submitted in-process when unset
    #[serde(default)]
    pub ingest_url: Option<String>,
}

impl Default for TuyaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            room: default_tuya_room(),
            poll_interval_seconds: default_poll_interval(),
            ingest_url: None,
        }
    }
}

impl TuyaConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"

    #[serde(default = "default_log_format")]
    pub format: String, // "text", "json"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_rooms() -> Vec<String> { DEFAULT_ROOMS.iter().map(|r| r.to_string()).collect() }
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }
fn default_max_recent() -> usize { DEFAULT_MAX_RECENT }
fn default_data_dir() -> String { "./data".to_string() }
fn default_max_log_entries() -> usize { DEFAULT_MAX_LOG_ENTRIES }
fn default_mode() -> String { "peer".to_string() }
fn default_key_prefix() -> String { "steeria".to_string() }
fn default_tuya_room() -> String { "SF_03".to_string() }
fn default_poll_interval() -> u64 { 60 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "text".to_string() }
