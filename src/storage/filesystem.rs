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

// Filesystem log store: one pretty-printed JSON array per room

use super::backend::LogStore;
use crate::config::StorageConfig;
use crate::error::PersistenceError;
use crate::protocol::Reading;
use crate::rooms::is_safe_identifier;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default number of readings kept on disk per room
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 500;

/// File name of the log for `room`
pub fn log_file_name(room: &str) -> String {
    format!("ambiente_{}.json", room)
}

/// Filesystem backend keeping the most recent readings of each room in
/// `<data_dir>/ambiente_<room>.json`.
///
/// Every append is a read-modify-write of the whole file, serialized per room
/// by an async mutex and published with a rename over the previous file.
pub struct FileLogStore {
    base_path: PathBuf,
    max_entries: usize,
    file_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl FileLogStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self::with_path(&config.data_dir, config.max_log_entries)
    }

    pub fn with_path(base_path: impl Into<PathBuf>, max_entries: usize) -> Self {
        let base_path = base_path.into();
        info!(
            "Initializing filesystem log store at: {} (max {} entries per room)",
            base_path.display(),
            max_entries
        );
        Self {
            base_path,
            max_entries: max_entries.max(1),
            file_locks: DashMap::new(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the log for `room`, `None` when the identifier cannot name a file
    pub fn log_path(&self, room: &str) -> Option<PathBuf> {
        is_safe_identifier(room).then(|| self.base_path.join(log_file_name(room)))
    }

    fn file_lock(&self, room: &str) -> Arc<Mutex<()>> {
        self.file_locks
            .entry(room.to_string())
            .or_default()
            .clone()
    }

    async fn ensure_base_directory(&self) -> Result<(), PersistenceError> {
        if fs::metadata(&self.base_path).await.is_err() {
            info!("Creating data directory: {}", self.base_path.display());
        }
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| PersistenceError::io(&self.base_path, e))
    }

    /// Load a log file. Missing, unreadable or non-array files yield an empty
    /// sequence; every array element is kept as stored.
    async fn load(&self, path: &Path) -> Vec<Value> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Cannot read log {}, treating as empty: {}", path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                warn!("Log {} is not a JSON array, treating as empty", path.display());
                Vec::new()
            }
            Err(e) => {
                warn!("Log {} is corrupted, treating as empty: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    async fn write_atomically(&self, path: &Path, body: &[u8]) -> Result<(), PersistenceError> {
        let tmp_path = path.with_extension("json.tmp");

        let mut file = fs::File::create(&tmp_path)
            .await
            .map_err(|e| PersistenceError::io(&tmp_path, e))?;
        file.write_all(body)
            .await
            .map_err(|e| PersistenceError::io(&tmp_path, e))?;
        file.flush()
            .await
            .map_err(|e| PersistenceError::io(&tmp_path, e))?;
        drop(file);

        fs::rename(&tmp_path, path)
            .await
            .map_err(|e| PersistenceError::io(path, e))
    }
}

#[async_trait]
impl LogStore for FileLogStore {
    async fn initialize(&self) -> Result<(), PersistenceError> {
        self.ensure_base_directory().await
    }

    async fn append(&self, room: &str, reading: &Reading) -> Result<(), PersistenceError> {
        let path = self
            .log_path(room)
            .ok_or_else(|| PersistenceError::InvalidIdentifier(room.to_string()))?;

        let lock = self.file_lock(room);
        let _guard = lock.lock().await;

        // Created lazily on the first append of the room
        self.ensure_base_directory().await?;

        let mut entries = self.load(&path).await;
        entries.push(serde_json::to_value(reading)?);
        if entries.len() > self.max_entries {
            let excess = entries.len() - self.max_entries;
            entries.drain(..excess);
        }

        let body = serde_json::to_vec_pretty(&entries)?;
        self.write_atomically(&path, &body).await?;

        debug!(
            "Appended reading to {} ({} entries, {} bytes)",
            path.display(),
            entries.len(),
            body.len()
        );
        Ok(())
    }

    async fn read_all(&self, room: &str) -> Vec<Value> {
        match self.log_path(room) {
            Some(path) => self.load(&path).await,
            None => {
                debug!("Identifier '{}' cannot name a log file", room);
                Vec::new()
            }
        }
    }

    async fn health_check(&self) -> bool {
        match fs::metadata(&self.base_path).await {
            Ok(metadata) if metadata.is_dir() => {
                let test_file = self.base_path.join(".health_check_test");
                match fs::write(&test_file, b"test").await {
                    Ok(()) => {
                        let _ = fs::remove_file(&test_file).await;
                        true
                    }
                    Err(e) => {
                        warn!("Health check failed - cannot write: {}", e);
                        false
                    }
                }
            }
            Ok(_) => {
                warn!(
                    "Health check failed - data path is not a directory: {}",
                    self.base_path.display()
                );
                false
            }
            // Nothing ingested yet; the directory is created lazily
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => {
                warn!(
                    "Health check failed - cannot access data path {}: {}",
                    self.base_path.display(),
                    e
                );
                false
            }
        }
    }

    fn backend_type(&self) -> &str {
        "filesystem"
    }
}
