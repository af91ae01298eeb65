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

// Durable log store tests

use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use steeria_core::storage::{log_file_name, DEFAULT_MAX_LOG_ENTRIES};
use steeria_core::{FileLogStore, LogStore, Reading};
use tempfile::TempDir;

fn reading(room: &str, seq: usize) -> Reading {
    Reading {
        source_timestamp: Some(format!("seq-{}", seq)),
        server_timestamp: Utc::now(),
        room: room.to_string(),
        temperature: seq as f64,
        humidity: 60.0,
        vpd: None,
        origin: "storage-test".to_string(),
        battery_sensor: None,
        sensor_online: true,
    }
}

#[tokio::test]
async fn test_log_bounded_at_max_entries() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileLogStore::with_path(temp_dir.path(), DEFAULT_MAX_LOG_ENTRIES);

    for seq in 0..=DEFAULT_MAX_LOG_ENTRIES {
        store.append("SF_03", &reading("SF_03", seq)).await.unwrap();
    }

    let content = std::fs::read_to_string(temp_dir.path().join(log_file_name("SF_03"))).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    let entries = parsed.as_array().expect("log must be a JSON array");
    assert_eq!(entries.len(), DEFAULT_MAX_LOG_ENTRIES);
    assert_eq!(entries[0]["temperatura"], 1.0);
    assert_eq!(
        entries[DEFAULT_MAX_LOG_ENTRIES - 1]["temperatura"],
        DEFAULT_MAX_LOG_ENTRIES as f64
    );
}

#[tokio::test]
async fn test_read_all_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileLogStore::with_path(temp_dir.path(), 10);
    for seq in 0..4 {
        store.append("SG_01", &reading("SG_01", seq)).await.unwrap();
    }

    let first = store.read_all("SG_01").await;
    let second = store.read_all("SG_01").await;
    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_log_reads_empty() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileLogStore::with_path(temp_dir.path(), 10);
    assert!(store.read_all("SC_04").await.is_empty());
    assert!(store.last("SC_04").await.is_none());
}

#[tokio::test]
async fn test_last_returns_newest() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileLogStore::with_path(temp_dir.path(), 10);
    store.append("SV_02", &reading("SV_02", 1)).await.unwrap();
    store.append("SV_02", &reading("SV_02", 2)).await.unwrap();

    assert_eq!(store.last("SV_02").await.unwrap()["temperatura"], 2.0);
}

#[tokio::test]
async fn test_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = FileLogStore::with_path(temp_dir.path(), 10);
        store.append("SF_03", &reading("SF_03", 7)).await.unwrap();
    }

    let reopened = FileLogStore::with_path(temp_dir.path(), 10);
    let history = reopened.read_all("SF_03").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["timestampOrigem"], "seq-7");
    assert_eq!(reopened.read_readings("SF_03").await[0].temperature, 7.0);
}

#[tokio::test]
async fn test_foreign_entries_kept() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileLogStore::with_path(temp_dir.path(), 10);
    store.append("SF_03", &reading("SF_03", 1)).await.unwrap();

    let path = temp_dir.path().join(log_file_name("SF_03"));
    let mut entries: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    entries.push(json!({"garbage": true}));
    std::fs::write(&path, serde_json::to_vec(&entries).unwrap()).unwrap();

    assert_eq!(store.read_all("SF_03").await.len(), 2);
    assert_eq!(store.last("SF_03").await, Some(json!({"garbage": true})));
    assert_eq!(store.read_readings("SF_03").await.len(), 1);

    store.append("SF_03", &reading("SF_03", 2)).await.unwrap();
    let all = store.read_all("SF_03").await;
    assert_eq!(all.len(), 3);
    assert_eq!(all[1], json!({"garbage": true}));
}

/// Entries as written by earlier producers: extra keys, string `vpd`,
/// numeric `timestampOrigem` and `bateria_sensor`
fn legacy_entries(room: &str, count: usize) -> Vec<Value> {
    (0..count)
        .map(|seq| {
            json!({
                "timestampOrigem": 1731579000 + seq,
                "timestampServidor": "2024-11-14T10:26:39.000Z",
                "sala": room,
                "temperatura": seq,
                "umidade": 55,
                "vpd": format!("{}.0", seq),
                "origem": "tuya",
                "bateria_sensor": 80,
                "sensor_online": "yes",
                "firmware": "2.1.0"
            })
        })
        .collect()
}

#[tokio::test]
async fn test_legacy_log_reported_in_full() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileLogStore::with_path(temp_dir.path(), 10);
    let legacy = legacy_entries("SV_02", 4);
    std::fs::write(
        temp_dir.path().join(log_file_name("SV_02")),
        serde_json::to_vec_pretty(&legacy).unwrap(),
    )
    .unwrap();

    assert_eq!(store.read_all("SV_02").await, legacy);
    assert_eq!(store.last("SV_02").await.as_ref(), legacy.last());
    assert!(store.read_readings("SV_02").await.is_empty());
}

#[tokio::test]
async fn test_append_preserves_legacy_entries_up_to_bound() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileLogStore::with_path(temp_dir.path(), 5);
    let legacy = legacy_entries("SG_01", 4);
    std::fs::write(
        temp_dir.path().join(log_file_name("SG_01")),
        serde_json::to_vec_pretty(&legacy).unwrap(),
    )
    .unwrap();

    store.append("SG_01", &reading("SG_01", 100)).await.unwrap();
    let all = store.read_all("SG_01").await;
    assert_eq!(all.len(), 5);
    assert_eq!(all[..4], legacy[..]);
    assert_eq!(all[4]["temperatura"], 100.0);

    // Past the bound the oldest entries go first, whatever their shape
    store.append("SG_01", &reading("SG_01", 101)).await.unwrap();
    store.append("SG_01", &reading("SG_01", 102)).await.unwrap();
    let all = store.read_all("SG_01").await;
    assert_eq!(all.len(), 5);
    assert_eq!(all[..2], legacy[2..]);
    let temps: Vec<f64> = all[2..]
        .iter()
        .filter_map(|entry| entry["temperatura"].as_f64())
        .collect();
    assert_eq!(temps, vec![100.0, 101.0, 102.0]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_same_room_not_lost() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileLogStore::with_path(temp_dir.path(), 500));

    let mut handles = Vec::new();
    for seq in 0..40 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.append("SF_03", &reading("SF_03", seq)).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut temps: Vec<usize> = store
        .read_readings("SF_03")
        .await
        .iter()
        .map(|r| r.temperature as usize)
        .collect();
    temps.sort_unstable();
    assert_eq!(temps, (0..40).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rooms_independent() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileLogStore::with_path(temp_dir.path(), 500));
    let rooms = ["SG_01", "SV_02", "SF_03", "SC_04"];

    let mut handles = Vec::new();
    for room in rooms {
        for seq in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.append(room, &reading(room, seq)).await.unwrap();
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for room in rooms {
        let history = store.read_all(room).await;
        assert_eq!(history.len(), 10);
        assert!(history.iter().all(|entry| entry["sala"] == room));
    }
}
