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

// Wire and storage records shared by the HTTP boundary, the zenoh bridge and the log files

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Origin recorded when the producer does not identify itself
pub const UNKNOWN_ORIGIN: &str = "desconhecida";

/// One accepted environmental measurement for a room.
///
/// The serialized key names are the storage contract of the per-room log
/// files and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(rename = "timestampOrigem", default)]
    pub source_timestamp: Option<String>,
    #[serde(rename = "timestampServidor", with = "server_time")]
    pub server_timestamp: DateTime<Utc>,
    #[serde(rename = "sala")]
    pub room: String,
    #[serde(rename = "temperatura")]
    pub temperature: f64,
    #[serde(rename = "umidade")]
    pub humidity: f64,
    /// Carried as received; producers may send a number or a string
    #[serde(default)]
    pub vpd: Option<Value>,
    #[serde(rename = "origem")]
    pub origin: String,
    #[serde(rename = "bateria_sensor", default)]
    pub battery_sensor: Option<String>,
    #[serde(rename = "sensor_online")]
    pub sensor_online: bool,
}

/// RFC 3339 UTC with millisecond precision, e.g. `2025-11-14T10:27:39.123Z`.
pub mod server_time {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Response of a successful ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestAck {
    pub status: String,
    pub recebido: Reading,
}

impl IngestAck {
    pub fn ok(reading: Reading) -> Self {
        Self {
            status: "ok".to_string(),
            recebido: reading,
        }
    }
}

/// Full durable history of one identifier, entries exactly as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawHistory {
    pub sala: String,
    pub total: usize,
    pub dados: Vec<Value>,
}

impl RawHistory {
    pub fn new(sala: impl Into<String>, dados: Vec<Value>) -> Self {
        Self {
            sala: sala.into(),
            total: dados.len(),
            dados,
        }
    }
}

/// Last durably logged reading of every registered room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestSnapshot {
    #[serde(rename = "atualizadoEm", with = "server_time")]
    pub updated_at: DateTime<Utc>,
    pub salas: BTreeMap<String, Option<Value>>,
}

/// Counters of the ingestion path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    pub accepted: u64,
    pub rejected: u64,
    /// Accepted readings whose durable append failed
    pub degraded: u64,
}

/// Process liveness report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub servico: String,
    pub versao: String,
    /// Seconds since the service was constructed
    pub uptime: f64,
    #[serde(rename = "salasComMemoria")]
    pub rooms_in_memory: Vec<String>,
    pub porta: u16,
    pub ingest: IngestStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Reading {
        Reading {
            source_timestamp: None,
            server_timestamp: Utc.with_ymd_and_hms(2025, 11, 14, 10, 27, 39).unwrap(),
            room: "SF_03".to_string(),
            temperature: 26.8,
            humidity: 60.0,
            vpd: None,
            origin: UNKNOWN_ORIGIN.to_string(),
            battery_sensor: None,
            sensor_online: true,
        }
    }

    #[test]
    fn test_reading_storage_keys() {
        let value = serde_json::to_value(sample()).unwrap();
        let obj = value.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "bateria_sensor",
                "origem",
                "sala",
                "sensor_online",
                "temperatura",
                "timestampOrigem",
                "timestampServidor",
                "umidade",
                "vpd",
            ]
        );
        assert_eq!(obj["timestampServidor"], "2025-11-14T10:27:39.000Z");
        assert!(obj["vpd"].is_null());
        assert!(obj["timestampOrigem"].is_null());
    }

    #[test]
    fn test_reading_parses_stored_record() {
        let stored = r#"{
            "timestampOrigem": "2025-11-14T10:27:39Z",
            "timestampServidor": "2025-11-14T10:27:40.512Z",
            "sala": "SF_03",
            "temperatura": 26.8,
            "umidade": 60,
            "vpd": 1.0,
            "origem": "tuya:SF_03",
            "bateria_sensor": "high",
            "sensor_online": false
        }"#;
        let reading: Reading = serde_json::from_str(stored).unwrap();
        assert_eq!(reading.humidity, 60.0);
        assert_eq!(reading.vpd, Some(serde_json::json!(1.0)));
        assert!(!reading.sensor_online);
        assert_eq!(
            server_time::format(&reading.server_timestamp),
            "2025-11-14T10:27:40.512Z"
        );
    }

    #[test]
    fn test_raw_history_counts() {
        let entry = serde_json::to_value(sample()).unwrap();
        let history = RawHistory::new("SF_03", vec![entry.clone(), entry]);
        assert_eq!(history.total, 2);

        let empty = RawHistory::new("nowhere", Vec::new());
        let json = serde_json::to_value(&empty).unwrap();
        assert_eq!(json, serde_json::json!({"sala": "nowhere", "total": 0, "dados": []}));
    }
}
