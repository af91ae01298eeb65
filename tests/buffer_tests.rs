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

// In-memory store tests

use chrono::Utc;
use std::sync::Arc;
use steeria_core::buffer::{MemoryStore, DEFAULT_MAX_RECENT};
use steeria_core::Reading;

fn reading(room: &str, seq: usize) -> Reading {
    Reading {
        source_timestamp: None,
        server_timestamp: Utc::now(),
        room: room.to_string(),
        temperature: seq as f64,
        humidity: 55.0,
        vpd: None,
        origin: "buffer-test".to_string(),
        battery_sensor: None,
        sensor_online: true,
    }
}

#[test]
fn test_keeps_last_n_in_order() {
    let store = MemoryStore::default();
    assert_eq!(store.capacity(), DEFAULT_MAX_RECENT);

    for seq in 0..=DEFAULT_MAX_RECENT {
        store.append("SF_03", reading("SF_03", seq));
    }

    let recent = store.recent("SF_03");
    assert_eq!(recent.len(), DEFAULT_MAX_RECENT);
    let expected: Vec<f64> = (1..=DEFAULT_MAX_RECENT).map(|seq| seq as f64).collect();
    let actual: Vec<f64> = recent.iter().map(|r| r.temperature).collect();
    assert_eq!(actual, expected);

    let latest = store.latest("SF_03").unwrap();
    assert_eq!(latest.temperature, DEFAULT_MAX_RECENT as f64);
    assert_eq!(&latest, recent.last().unwrap());
}

#[test]
fn test_rooms_are_independent() {
    let store = MemoryStore::new(2);
    store.append("SG_01", reading("SG_01", 1));
    store.append("SV_02", reading("SV_02", 2));
    store.append("SV_02", reading("SV_02", 3));
    store.append("SV_02", reading("SV_02", 4));

    assert_eq!(store.recent("SG_01").len(), 1);
    assert_eq!(store.recent("SV_02").len(), 2);
    assert_eq!(store.rooms(), vec!["SG_01".to_string(), "SV_02".to_string()]);
}

#[test]
fn test_repeated_reads_identical() {
    let store = MemoryStore::new(5);
    for seq in 0..3 {
        store.append("SC_04", reading("SC_04", seq));
    }
    assert_eq!(store.recent("SC_04"), store.recent("SC_04"));
    assert_eq!(store.latest("SC_04"), store.latest("SC_04"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_stay_bounded() {
    let store = Arc::new(MemoryStore::new(50));
    let mut handles = Vec::new();

    for task in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for seq in 0..100 {
                store.append("SF_03", reading("SF_03", task * 1000 + seq));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.recent("SF_03").len(), 50);
}
