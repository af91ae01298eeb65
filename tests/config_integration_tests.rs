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

// Configuration system integration tests

use std::fs;
use std::path::PathBuf;
use steeria_core::config::{load_config, ConfigLoader, SteeriaConfig};
use tempfile::TempDir;

#[test]
fn test_load_default_config() {
    let config_path = PathBuf::from("config/default.yaml");

    if config_path.exists() {
        let result = load_config(&config_path);
        assert!(result.is_ok(), "Failed to load default config: {:?}", result.err());

        let config = result.unwrap();

        // Verify defaults
        assert_eq!(config.rooms, vec!["SG_01", "SV_02", "SF_03", "SC_04"]);
        assert_eq!(config.memory.max_recent, 200);
        assert_eq!(config.storage.max_log_entries, 500);
        assert!(!config.zenoh.enabled);
        assert!(!config.integrations.tuya_sf03.enabled);
        assert_eq!(config.logging.level, "info");
    }
}

#[test]
fn test_config_with_env_vars() {
    let temp_config = r#"
server:
  host: ${STEERIA_IT_HOST:-127.0.0.1}
  port: ${STEERIA_IT_PORT:-8081}

rooms: [SG_01, SF_03]

storage:
  data_dir: ${STEERIA_IT_DATA:-/tmp/steeria-data}
  max_log_entries: 300

memory:
  max_recent: 100

logging:
  level: debug
  format: json
"#;

    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("test_config.yaml");
    fs::write(&config_path, temp_config).unwrap();

    std::env::remove_var("STEERIA_IT_HOST");
    std::env::remove_var("STEERIA_IT_PORT");
    std::env::set_var("STEERIA_IT_DATA", "/var/lib/steeria");

    let config = load_config(&config_path).unwrap();

    std::env::remove_var("STEERIA_IT_DATA");

    assert_eq!(config.server.bind_address(), "127.0.0.1:8081");
    assert_eq!(config.rooms, vec!["SG_01", "SF_03"]);
    assert_eq!(config.storage.data_dir, "/var/lib/steeria");
    assert_eq!(config.storage.max_log_entries, 300);
    assert_eq!(config.memory.max_recent, 100);
    assert_eq!(config.logging.format, "json");
    assert!(config.room_registry().contains("SF_03"));
    assert!(!config.room_registry().contains("SV_02"));
}

#[test]
fn test_minimal_config_uses_defaults() {
    let config = ConfigLoader::parse("logging:\n  level: warn\n").unwrap();
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.rooms.len(), 4);
    assert_eq!(config.storage.data_dir, "./data");
    assert_eq!(config.zenoh.key_prefix, "steeria");
    assert_eq!(config.integrations.tuya_sf03.room, "SF_03");
}

#[test]
fn test_invalid_configs_rejected() {
    let cases = [
        ("rooms: []\n", "at least one room"),
        ("memory:\n  max_recent: 0\n", "max_recent"),
        ("zenoh:\n  mode: mesh\n", "zenoh mode"),
        ("rooms: [\"a/b\"]\n", "a/b"),
        (
            "integrations:\n  tuya_sf03:\n    enabled: true\n    poll_interval_seconds: 0\n",
            "poll_interval_seconds",
        ),
    ];

    for (yaml, expected) in cases {
        let err = ConfigLoader::parse(yaml).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "expected '{}' in '{}'",
            expected,
            err
        );
    }
}

#[test]
fn test_missing_file() {
    let result = load_config("/nonexistent/steeria.yaml");
    assert!(result.is_err());
}

#[test]
fn test_config_serializes_back() {
    let yaml = serde_yaml::to_string(&SteeriaConfig::default()).unwrap();
    let parsed = ConfigLoader::parse(&yaml).unwrap();
    assert_eq!(parsed.rooms, SteeriaConfig::default().rooms);
}
