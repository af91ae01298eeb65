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

// Durable log store trait

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PersistenceError;
use crate::protocol::Reading;

/// Per-room bounded append log that survives restarts.
///
/// Implementations must serialize appends to the same room; appends to
/// different rooms are independent. Read paths never fail: a missing or
/// unreadable log is reported as an empty sequence.
///
/// Entries are opaque JSON objects. Logs written by older producers may carry
/// extra keys or differently typed fields; they are returned and preserved
/// across appends exactly as stored.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Prepare the medium (create directories etc.)
    async fn initialize(&self) -> Result<(), PersistenceError>;

    /// Append one reading, evicting the oldest entries beyond the bound
    async fn append(&self, room: &str, reading: &Reading) -> Result<(), PersistenceError>;

    /// Whole log for `room`, oldest first
    async fn read_all(&self, room: &str) -> Vec<Value>;

    /// Last logged entry of `room`
    async fn last(&self, room: &str) -> Option<Value> {
        self.read_all(room).await.pop()
    }

    /// Entries of `room` that parse as [`Reading`], oldest first
    async fn read_readings(&self, room: &str) -> Vec<Reading> {
        self.read_all(room)
            .await
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect()
    }

    /// Health check
    async fn health_check(&self) -> bool;

    /// Get backend type identifier
    fn backend_type(&self) -> &str;
}
