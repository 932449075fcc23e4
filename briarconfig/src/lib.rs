//! # BriarBot Configuration Module
//!
//! This module provides configuration management for BriarBot, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters for configuration values
//!
//! Unlike a process-wide singleton, the configuration is constructed
//! explicitly (usually once in `main`) and passed down in an `Arc` to every
//! component that needs it.
//!
//! ## Usage
//!
//! ```no_run
//! use briarconfig::Config;
//!
//! let config = Config::load("")?;
//! let quorum = config.quorum_percent();
//! for stream in config.streams()? {
//!     println!("monitoring {}", stream.url);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::{env, fs, path::Path, sync::Mutex};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("briarbot.yaml");

const ENV_CONFIG_DIR: &str = "BRIARBOT_CONFIG";
const ENV_PREFIX: &str = "BRIARBOT_CONFIG__";

// Default values for configuration
const DEFAULT_QUORUM_PERCENT: u64 = 85;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_UPTIME_INTERVAL_SECS: u64 = 60;
const DEFAULT_STORAGE_INTERVAL_SECS: u64 = 3600;
const DEFAULT_READY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_MIN_LEVEL: &str = "info";

/// Macro to generate a getter for u64 values with default
macro_rules! impl_u64_config {
    ($(#[$doc:meta])* $getter:ident, $path:expr, $default:expr) => {
        $(#[$doc])*
        pub fn $getter(&self) -> u64 {
            match self.get_value($path) {
                Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap(),
                Ok(Value::Number(n)) if n.is_i64() => n.as_i64().unwrap().max(0) as u64,
                _ => $default,
            }
        }
    };
}

/// Macro to generate a getter for bool values with default
macro_rules! impl_bool_config {
    ($(#[$doc:meta])* $getter:ident, $path:expr, $default:expr) => {
        $(#[$doc])*
        pub fn $getter(&self) -> bool {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => b,
                _ => $default,
            }
        }
    };
}

/// Macro to generate a getter for string values with default
macro_rules! impl_str_config {
    ($(#[$doc:meta])* $getter:ident, $path:expr, $default:expr) => {
        $(#[$doc])*
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(s)) => s,
                _ => $default.to_string(),
            }
        }
    };
}

/// One monitored live-stream source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Base URL of the stream server (status endpoint derived from it)
    pub url: String,
    /// Guild whose session the stream drives
    pub guild_id: u64,
    /// Voice channel to join when the stream comes online
    pub voice_channel_id: u64,
    /// Channel receiving online/offline/now-playing notifications
    pub notify_channel_id: u64,
    /// Whether the target is a moderated stage channel
    #[serde(default)]
    pub stage_channel: bool,
    /// Poll interval in seconds
    #[serde(default = "StreamConfig::default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl StreamConfig {
    fn default_poll_interval() -> u64 {
        DEFAULT_POLL_INTERVAL_SECS
    }
}

/// Configuration manager for BriarBot
///
/// Holds the merged YAML value tree (embedded defaults, optional external
/// file, environment overrides) and exposes typed accessors with defaults.
#[derive(Debug)]
pub struct Config {
    path: Option<String>,
    data: Mutex<Value>,
}

impl Config {
    /// Load the configuration.
    ///
    /// The external file is searched in the following order:
    /// 1. `<directory>/config.yaml` when `directory` is not empty
    /// 2. `$BRIARBOT_CONFIG/config.yaml`
    /// 3. `.briarbot/config.yaml` in the current directory
    ///
    /// A missing file is not an error: the embedded defaults apply, and
    /// `BRIARBOT_CONFIG__SECTION__KEY` environment variables override
    /// either way (`__` separates path segments).
    pub fn load(directory: &str) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let path = Self::find_config_file(directory);
        if let Some(path) = &path {
            let data = fs::read(path)
                .map_err(|e| anyhow!("Cannot read config file {}: {}", path, e))?;
            let external: Value = serde_yaml::from_slice(&data)?;
            merge_yaml(&mut value, &external);
            info!(config_file = %path, "Loaded config file");
        } else {
            info!("No config file found, using embedded defaults");
        }

        let mut value = lower_keys(value);
        Self::apply_env_overrides(&mut value);

        Ok(Config {
            path,
            data: Mutex::new(value),
        })
    }

    /// Build a configuration directly from a YAML string (tests, tooling)
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        let external: Value = serde_yaml::from_str(yaml)?;
        merge_yaml(&mut value, &external);
        Ok(Config {
            path: None,
            data: Mutex::new(lower_keys(value)),
        })
    }

    /// Path of the external file actually loaded, if any
    pub fn source_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn find_config_file(directory: &str) -> Option<String> {
        let candidates = [
            (!directory.is_empty()).then(|| Path::new(directory).join("config.yaml")),
            env::var(ENV_CONFIG_DIR)
                .ok()
                .map(|d| Path::new(&d).join("config.yaml")),
            Some(Path::new(".briarbot").join("config.yaml")),
        ];

        candidates
            .into_iter()
            .flatten()
            .find(|p| p.is_file())
            .map(|p| p.to_string_lossy().to_string())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(rest) = key.strip_prefix(ENV_PREFIX) {
                let key_path = rest.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    /// Get a configuration value at the specified path
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();
                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a mapping", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    /// Set a configuration value at the specified path (in memory only)
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        Self::set_value_internal(&mut data, path, value)
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key, value);
            } else {
                let entry = map
                    .entry(key)
                    .or_insert(Value::Mapping(serde_yaml::Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    // ========================================================================
    // Typed accessors
    // ========================================================================

    impl_u64_config!(
        /// Vote-skip quorum threshold, in percent (strictly-greater-than)
        quorum_percent,
        &["bot", "quorum_percent"],
        DEFAULT_QUORUM_PERCENT
    );

    impl_str_config!(
        /// Base URL of the audio node's REST API
        node_base_url,
        &["node", "base_url"],
        "http://127.0.0.1:2333"
    );
    impl_str_config!(
        /// Audio node password
        node_password,
        &["node", "password"],
        ""
    );
    impl_str_config!(
        /// Session identifier presented to the audio node
        node_session_id,
        &["node", "session_id"],
        "briarbot"
    );
    impl_str_config!(
        /// Search prefix for bare-text queries (e.g. "ytsearch")
        node_default_search,
        &["node", "default_search"],
        "ytsearch"
    );
    impl_bool_config!(
        /// Spawn a local node process when none is reachable
        node_spawn,
        &["node", "spawn"],
        false
    );
    impl_str_config!(
        /// Path to the node's jar when spawning locally
        node_jar_path,
        &["node", "jar_path"],
        "Lavalink.jar"
    );
    impl_str_config!(
        /// Java executable used to spawn the node
        node_java_path,
        &["node", "java_path"],
        "java"
    );
    impl_u64_config!(
        /// How long to wait for a spawned node's port, in seconds
        node_ready_timeout_secs,
        &["node", "ready_timeout_secs"],
        DEFAULT_READY_TIMEOUT_SECS
    );

    impl_str_config!(
        /// Webhook URL for channel notifications (empty: log only)
        webhook_url,
        &["notify", "webhook_url"],
        ""
    );

    impl_bool_config!(uptime_enabled, &["uptime", "enabled"], false);
    impl_str_config!(uptime_push_url, &["uptime", "push_url"], "");
    impl_u64_config!(
        uptime_interval_secs,
        &["uptime", "interval_secs"],
        DEFAULT_UPTIME_INTERVAL_SECS
    );

    impl_bool_config!(storage_enabled, &["storage", "enabled"], false);
    impl_str_config!(storage_base_url, &["storage", "base_url"], "");
    impl_str_config!(storage_api_key, &["storage", "api_key"], "");
    impl_u64_config!(storage_notify_channel_id, &["storage", "notify_channel_id"], 0);
    impl_u64_config!(
        storage_interval_secs,
        &["storage", "interval_secs"],
        DEFAULT_STORAGE_INTERVAL_SECS
    );

    impl_str_config!(
        /// Minimum log level when RUST_LOG is unset
        log_min_level,
        &["log", "min_level"],
        DEFAULT_LOG_MIN_LEVEL
    );

    /// Configured live streams, one monitor per entry
    pub fn streams(&self) -> Result<Vec<StreamConfig>> {
        match self.get_value(&["streams"]) {
            Ok(value @ Value::Sequence(_)) => {
                Ok(serde_yaml::from_value(value).map_err(|e| anyhow!("Invalid streams: {e}"))?)
            }
            _ => Ok(Vec::new()),
        }
    }
}

/// Merge `external` over `default`: mappings merge recursively, scalars and
/// sequences replace.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

fn lower_keys(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = serde_yaml::Mapping::new();
            for (k, v) in map {
                if let Value::String(s) = k {
                    new_map.insert(Value::String(s.to_lowercase()), lower_keys(v));
                } else {
                    new_map.insert(k, lower_keys(v));
                }
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys).collect()),
        _ => value,
    }
}
