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

// Tuya SF_03 adapter
//
// The cloud API is not wired yet; the adapter reports a fixed reading in the
// shape the cloud response will be mapped to.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use super::DeviceAdapter;

pub struct TuyaSf03Adapter {
    room: String,
    name: String,
}

impl TuyaSf03Adapter {
    pub fn new(room: impl Into<String>) -> Self {
        let room = room.into();
        Self {
            name: format!("tuya:{}", room),
            room,
        }
    }
}

impl Default for TuyaSf03Adapter {
    fn default() -> Self {
        Self::new("SF_03")
    }
}

#[async_trait]
impl DeviceAdapter for TuyaSf03Adapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> Result<Value> {
        Ok(json!({
            "sala": self.room,
            "temperatura": 26.8,
            "umidade": 60,
            "vpd": 1.0,
            "origem": format!("{} (mock)", self.name),
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "bateria_sensor": "high",
            "sensor_online": true,
        }))
    }
}
