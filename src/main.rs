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

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use steeria_core::api::{self, AppState};
use steeria_core::config::{load_config_with_env, ConfigLoader, LoggingConfig};
use steeria_core::control::{self, ControlInterface};
use steeria_core::integrations::{
    self, DeviceAdapter, HttpSink, ReadingSink, ServiceSink, TuyaSf03Adapter,
};
use steeria_core::SensorService;

/// Steeria Core - environmental sensor ingestion service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.yaml")]
    config: PathBuf,

    /// HTTP port (overrides config file and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory of the per-room logs (overrides config file)
    #[arg(short, long)]
    data_dir: Option<String>,
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let level = match logging.level.to_lowercase().as_str() {
        level @ ("trace" | "debug" | "info" | "warn" | "error") => level.to_string(),
        _ => "info".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if logging.format.eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config_with_env(&args.config)?;

    // Apply CLI overrides
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }
    ConfigLoader::validate(&config)?;

    init_tracing(&config.logging)?;

    info!("Starting Steeria Core");
    info!("Loaded configuration from: {:?}", args.config);
    info!("Rooms: {}", config.rooms.join(", "));
    info!("Data directory: {}", config.storage.data_dir);

    let service = Arc::new(SensorService::from_config(&config).await?);

    let bridge = if config.zenoh.enabled {
        let session = control::open_session(&config.zenoh).await?;
        let bridge =
            ControlInterface::new(session, service.clone(), config.zenoh.key_prefix.clone());
        Some(tokio::spawn(async move {
            if let Err(e) = bridge.run().await {
                error!("Zenoh bridge error: {}", e);
            }
        }))
    } else {
        None
    };

    let tuya = &config.integrations.tuya_sf03;
    let poller = if tuya.enabled {
        let adapter: Arc<dyn DeviceAdapter> = Arc::new(TuyaSf03Adapter::new(tuya.room.clone()));
        let sink: Arc<dyn ReadingSink> = match &tuya.ingest_url {
            Some(url) => Arc::new(HttpSink::new(url.clone())?),
            None => Arc::new(ServiceSink::new(service.clone())),
        };
        Some(integrations::spawn_polling(adapter, sink, tuya.poll_interval()))
    } else {
        None
    };

    let state = AppState::new(service.clone(), config.server.port);
    let bind_address = config.server.bind_address();

    tokio::select! {
        result = api::serve(state, &bind_address) => {
            if let Err(e) = result {
                error!("HTTP API error: {:#}", e);
            }
            info!("HTTP API stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    // Cleanup
    for task in [bridge, poller].into_iter().flatten() {
        task.abort();
    }
    info!("Steeria Core shut down ({} readings accepted)", service.coordinator().stats().accepted);

    Ok(())
}
