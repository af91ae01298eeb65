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

// Room registry: the fixed set of rooms accepted on validated paths

/// Rooms registered when the configuration does not list any.
pub const DEFAULT_ROOMS: [&str; 4] = ["SG_01", "SV_02", "SF_03", "SC_04"];

/// Fixed, ordered set of valid room identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRegistry {
    rooms: Vec<String>,
}

impl RoomRegistry {
    pub fn new<I, S>(rooms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registered: Vec<String> = Vec::new();
        for room in rooms {
            let room = room.into();
            if !registered.contains(&room) {
                registered.push(room);
            }
        }
        Self { rooms: registered }
    }

    pub fn contains(&self, room: &str) -> bool {
        self.rooms.iter().any(|r| r == room)
    }

    /// Rooms in registration order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.rooms.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_ROOMS)
    }
}

/// Whether an identifier can be embedded in a log file name.
///
/// Only ASCII alphanumerics, `_` and `-` are allowed, which rules out path
/// separators and `..` segments.
pub fn is_safe_identifier(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
