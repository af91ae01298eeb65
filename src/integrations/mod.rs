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

// Device integrations
//
// An adapter talks to a vendor device or cloud and produces one raw reading
// payload; a sink delivers that payload to the ingestion entry point, either
// in-process or over HTTP.

pub mod tuya;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::service::SensorService;

pub use tuya::TuyaSf03Adapter;

/// Source of raw reading payloads
#[async_trait]
pub trait DeviceAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the current reading as an ingest payload
    async fn read(&self) -> Result<Value>;
}

/// Destination of raw reading payloads
#[async_trait]
pub trait ReadingSink: Send + Sync {
    async fn send(&self, payload: Value) -> Result<()>;
}

/// Submits straight to the in-process coordinator
pub struct ServiceSink {
    service: Arc<SensorService>,
}

impl ServiceSink {
    pub fn new(service: Arc<SensorService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ReadingSink for ServiceSink {
    async fn send(&self, payload: Value) -> Result<()> {
        self.service.coordinator().submit(&payload).await?;
        Ok(())
    }
}

/// Posts to a running `/ingest/ambiente` endpoint
pub struct HttpSink {
    client: reqwest::Client,
    url: String,
}

impl HttpSink {
    pub fn new(url: String) -> Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl ReadingSink for HttpSink {
    async fn send(&self, payload: Value) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .context("Failed to send reading")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("Ingest failed with status {}: {}", status, error_text);
        }

        Ok(())
    }
}

/// Pull one reading from `adapter` and push it to `sink`.
///
/// Failures are logged and reported as `false`; they never propagate.
pub async fn sync_once(adapter: &dyn DeviceAdapter, sink: &dyn ReadingSink) -> bool {
    let result: Result<()> = async {
        let payload = adapter.read().await.context("Device read failed")?;
        sink.send(payload).await
    }
    .await;

    match result {
        Ok(()) => {
            debug!("Synced reading from '{}'", adapter.name());
            true
        }
        Err(e) => {
            error!("Integration '{}' failed: {:#}", adapter.name(), e);
            false
        }
    }
}

/// Sync `adapter` into `sink` every `interval` until the task is aborted
pub fn spawn_polling(
    adapter: Arc<dyn DeviceAdapter>,
    sink: Arc<dyn ReadingSink>,
    interval: Duration,
) -> JoinHandle<()> {
    info!("Polling integration '{}' every {:?}", adapter.name(), interval);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            sync_once(adapter.as_ref(), sink.as_ref()).await;
        }
    })
}
