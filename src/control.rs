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

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use zenoh::query::Query;
use zenoh::sample::Sample;
use zenoh::Session;

use crate::config::ZenohConfig;
use crate::service::SensorService;

/// Build the zenoh session configuration from the bridge settings
pub fn session_config(config: &ZenohConfig) -> Result<zenoh::Config> {
    let mut raw = json!({ "mode": config.mode });
    if let Some(connect) = &config.connect {
        raw["connect"] = json!({ "endpoints": connect.endpoints });
    }
    if let Some(listen) = &config.listen {
        raw["listen"] = json!({ "endpoints": listen.endpoints });
    }
    zenoh::Config::from_json5(&raw.to_string())
        .map_err(|e| anyhow!("Invalid zenoh configuration: {}", e))
}

pub async fn open_session(config: &ZenohConfig) -> Result<Session> {
    let session = zenoh::open(session_config(config)?)
        .await
        .map_err(|e| anyhow!("Failed to open Zenoh session: {}", e))?;
    info!("Zenoh session opened in {} mode", config.mode);
    Ok(session)
}

/// Last segment of a key expression, e.g. `SF_03` for `steeria/ingest/SF_03`
pub fn room_from_key(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or_default()
}

/// Decode a published reading. The room is taken from the key when the
/// payload does not name one.
pub fn payload_for_key(key: &str, bytes: &[u8]) -> Result<Value> {
    let mut payload: Value =
        serde_json::from_slice(bytes).context("Reading payload is not valid JSON")?;

    match payload.as_object_mut() {
        Some(obj) => {
            if !obj.contains_key("sala") && !obj.contains_key("room") {
                obj.insert("sala".to_string(), Value::String(room_from_key(key).to_string()));
            }
        }
        None => bail!("Reading payload must be a JSON object"),
    }

    Ok(payload)
}

/// Zenoh bridge: readings published on `<prefix>/ingest/<room>` are submitted
/// to the coordinator, queries on `<prefix>/status/<room>` are answered with
/// the latest in-memory reading.
pub struct ControlInterface {
    session: Session,
    service: Arc<SensorService>,
    key_prefix: String,
}

impl ControlInterface {
    pub fn new(session: Session, service: Arc<SensorService>, key_prefix: String) -> Self {
        Self {
            session,
            service,
            key_prefix,
        }
    }

    /// Run the bridge (blocks until the session closes)
    pub async fn run(&self) -> Result<()> {
        let ingest_key = format!("{}/ingest/*", self.key_prefix);
        let subscriber = self
            .session
            .declare_subscriber(ingest_key.clone())
            .await
            .map_err(|e| anyhow!("{}", e))?;

        info!("Ingest bridge listening on '{}'", ingest_key);

        let status_key = format!("{}/status/*", self.key_prefix);
        let status_queryable = self
            .session
            .declare_queryable(status_key.clone())
            .await
            .map_err(|e| anyhow!("{}", e))?;

        info!("Status interface listening on '{}'", status_key);

        loop {
            tokio::select! {
                sample = subscriber.recv_async() => {
                    let sample = sample.map_err(|e| anyhow!("Ingest subscriber closed: {}", e))?;
                    // Inline so readings of one publisher keep their order
                    self.handle_sample(sample).await;
                }
                query = status_queryable.recv_async() => {
                    let query = query.map_err(|e| anyhow!("Status queryable closed: {}", e))?;
                    let service = self.service.clone();
                    tokio::spawn(async move {
                        if let Err(e) = Self::handle_status_query(query, service).await {
                            error!("Error handling status query: {}", e);
                        }
                    });
                }
            }
        }
    }

    async fn handle_sample(&self, sample: Sample) {
        let key = sample.key_expr().as_str().to_string();
        let payload = match payload_for_key(&key, &sample.payload().to_bytes()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Dropping reading published on '{}': {}", key, e);
                return;
            }
        };

        match self.service.coordinator().submit(&payload).await {
            Ok(reading) => debug!("Bridged reading for room '{}'", reading.room),
            Err(e) => warn!("Rejected reading published on '{}': {}", key, e),
        }
    }

    async fn handle_status_query(query: Query, service: Arc<SensorService>) -> Result<()> {
        let key = query.key_expr().clone();
        let room = room_from_key(key.as_str());

        match service.queries().status(room) {
            Ok(reading) => {
                let body = serde_json::to_string(&reading)?;
                query
                    .reply(key.clone(), body)
                    .await
                    .map_err(|e| anyhow!("Failed to send reply: {}", e))?;
            }
            Err(e) => {
                query
                    .reply_err(e.to_string())
                    .await
                    .map_err(|e| anyhow!("Failed to send error reply: {}", e))?;
            }
        }

        Ok(())
    }
}
