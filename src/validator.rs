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

// Reading validator: normalizes a raw inbound payload into a canonical Reading

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use crate::error::ValidationError;
use crate::protocol::{Reading, UNKNOWN_ORIGIN};
use crate::rooms::RoomRegistry;

// Accepted inbound keys, storage name first
const ROOM_KEYS: &[&str] = &["sala", "room"];
const TEMPERATURE_KEYS: &[&str] = &["temperatura", "temperature"];
const HUMIDITY_KEYS: &[&str] = &["umidade", "humidity"];
const VPD_KEYS: &[&str] = &["vpd"];
const ORIGIN_KEYS: &[&str] = &["origem", "origin"];
const SOURCE_TIMESTAMP_KEYS: &[&str] = &["timestamp", "timestampOrigem", "sourceTimestamp"];
const BATTERY_KEYS: &[&str] = &["bateria_sensor", "batterySensor"];
const ONLINE_KEYS: &[&str] = &["sensor_online", "sensorOnline"];

fn field<'a>(obj: Option<&'a Map<String, Value>>, keys: &[&str]) -> Option<&'a Value> {
    let obj = obj?;
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

/// Non-empty string, or `None` for absent, null, empty or non-string values.
fn text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn number(obj: Option<&Map<String, Value>>, keys: &[&'static str]) -> Result<f64, ValidationError> {
    field(obj, keys)
        .and_then(Value::as_f64)
        .ok_or(ValidationError::InvalidNumericField { field: keys[0] })
}

/// Registered room named by the payload.
pub fn check_room<'a>(raw: &'a Value, rooms: &RoomRegistry) -> Result<&'a str, ValidationError> {
    match field(raw.as_object(), ROOM_KEYS) {
        Some(Value::String(room)) if rooms.contains(room) => Ok(room.as_str()),
        Some(Value::String(room)) => Err(ValidationError::InvalidRoom {
            room: Some(room.clone()),
        }),
        _ => Err(ValidationError::InvalidRoom { room: None }),
    }
}

/// Validate `raw` and build the canonical reading stamped with `now`.
///
/// Room is checked first, then temperature, then humidity. Optional fields
/// default as follows: `vpd`, `timestamp` and `bateria_sensor` to null,
/// `origem` to [`UNKNOWN_ORIGIN`], `sensor_online` to `true` unless it is an
/// explicit boolean. A present `vpd` is carried unchanged, whatever its type.
pub fn validate(
    raw: &Value,
    rooms: &RoomRegistry,
    now: DateTime<Utc>,
) -> Result<Reading, ValidationError> {
    let room = check_room(raw, rooms)?.to_string();
    let obj = raw.as_object();

    let temperature = number(obj, TEMPERATURE_KEYS)?;
    let humidity = number(obj, HUMIDITY_KEYS)?;

    Ok(Reading {
        source_timestamp: text(field(obj, SOURCE_TIMESTAMP_KEYS)),
        server_timestamp: now,
        room,
        temperature,
        humidity,
        vpd: field(obj, VPD_KEYS).cloned(),
        origin: text(field(obj, ORIGIN_KEYS)).unwrap_or_else(|| UNKNOWN_ORIGIN.to_string()),
        battery_sensor: text(field(obj, BATTERY_KEYS)),
        sensor_online: field(obj, ONLINE_KEYS)
            .and_then(Value::as_bool)
            .unwrap_or(true),
    })
}
