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

// Error taxonomy for the ingestion and query paths

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for every core operation.
#[derive(Error, Debug)]
pub enum SteeriaError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("query error: {0}")]
    Query(#[from] QueryError),
}

/// Rejection of an inbound payload. Neither store is touched when this is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `room` is missing, not a string, or not in the room registry.
    #[error("invalid room code: {room:?}")]
    InvalidRoom { room: Option<String> },

    /// `temperature` or `humidity` is missing or not a JSON number.
    #[error("field '{field}' must be a number")]
    InvalidNumericField { field: &'static str },
}

/// Failure of the durable log medium.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The identifier cannot be mapped to a file name inside the data directory.
    #[error("identifier '{0}' cannot name a log file")]
    InvalidIdentifier(String),

    #[error("I/O failure on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize log: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure of an in-memory query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid room code: {room}")]
    InvalidRoom { room: String },

    /// The room is registered but has not received a reading yet.
    #[error("room '{room}' has no readings yet")]
    NotFound { room: String },
}
