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

// Durable log store
//
// Provides a trait-based abstraction over the per-room bounded append log,
// so the ingestion coordinator can be exercised against other media in tests.

pub mod backend;
pub mod filesystem;

pub use backend::LogStore;
pub use filesystem::{log_file_name, FileLogStore, DEFAULT_MAX_LOG_ENTRIES};
