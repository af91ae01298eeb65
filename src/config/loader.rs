// Configuration loader with environment variable substitution

use super::types::*;
use crate::rooms::is_safe_identifier;
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file with environment variable substitution
    pub fn load<P: AsRef<Path>>(path: P) -> Result<SteeriaConfig> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        Self::parse(&content)
    }

    /// Parse YAML content with environment variable substitution
    pub fn parse(content: &str) -> Result<SteeriaConfig> {
        let content = Self::substitute_env_vars(content);

        let config: SteeriaConfig = serde_yaml::from_str(&content)
            .context("Failed to parse YAML configuration")?;

        Self::validate(&config)?;

        Ok(config)
    }

    /// Substitute ${VAR} and ${VAR:-default} patterns with environment variables
    ///
    /// Examples:
    /// - ${HOME} -> /home/user
    /// - ${PORT:-3000} -> 3000 (if PORT not set)
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]+))?\}").expect("static pattern");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str());

            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => match default_value {
                    Some(default) => default.to_string(),
                    // Keep original if no default and var not found
                    None => format!("${{{}}}", var_name),
                },
            }
        })
        .to_string()
    }

    /// Validate configuration
    pub fn validate(config: &SteeriaConfig) -> Result<()> {
        if config.rooms.is_empty() {
            bail!("rooms must list at least one room");
        }

        for room in &config.rooms {
            if !is_safe_identifier(room) {
                bail!(
                    "room '{}' may only contain ASCII letters, digits, '_' or '-'",
                    room
                );
            }
        }

        if config.memory.max_recent == 0 {
            bail!("memory.max_recent must be > 0");
        }

        if config.storage.max_log_entries < config.memory.max_recent {
            bail!(
                "storage.max_log_entries ({}) must be >= memory.max_recent ({})",
                config.storage.max_log_entries,
                config.memory.max_recent
            );
        }

        if config.storage.data_dir.trim().is_empty() {
            bail!("storage.data_dir cannot be empty");
        }

        if config.server.port == 0 {
            bail!("server.port must be > 0");
        }

        match config.zenoh.mode.as_str() {
            "peer" | "client" | "router" => {}
            unknown => bail!("Unknown zenoh mode: '{}'. Supported: peer, client, router", unknown),
        }

        let tuya = &config.integrations.tuya_sf03;
        if tuya.enabled {
            if tuya.poll_interval_seconds == 0 {
                bail!("integrations.tuya_sf03.poll_interval_seconds must be > 0");
            }
            if !config.rooms.contains(&tuya.room) {
                bail!("integrations.tuya_sf03.room '{}' is not a registered room", tuya.room);
            }
        }

        Ok(())
    }
}
