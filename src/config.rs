use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::adapters::outbound::snapshot_codec::SnapshotFormat;

/// Environment variable consulted for the map document when no CLI argument is given.
pub const MAP_PATH_ENV: &str = "RMF_MAP_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub map: MapConfig,
    pub broadcast: BroadcastConfig,
    pub service: ServiceConfig,
    pub logging: LoggingConfig,
    pub kafka: KafkaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub path: Option<PathBuf>,
    pub lowercase_image_encoding: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    pub topic: String,
    pub format: SnapshotFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub request_buffer: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// fast_log output file for the snapshot builder; tracing only when unset.
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    pub enabled: bool,
    pub brokers: Vec<String>,
    pub client_id: String,
    pub max_message_bytes: usize,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.service.request_buffer == 0 {
            bail!("[service] request_buffer must be at least 1");
        }
        Ok(())
    }

    /// Defaults when `path` does not exist; a present but broken file is still an error.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if tokio::fs::try_exists(path.as_ref()).await.unwrap_or(false) {
            Self::from_file(path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Map document path. Precedence: CLI argument -> RMF_MAP_PATH -> `[map] path`.
    pub fn resolve_map_path(&self, cli_arg: Option<String>) -> Result<PathBuf> {
        if let Some(arg) = cli_arg {
            return Ok(PathBuf::from(arg));
        }
        if let Ok(v) = env::var(MAP_PATH_ENV) {
            if !v.is_empty() {
                return Ok(PathBuf::from(v));
            }
        }
        match &self.map.path {
            Some(p) => Ok(p.clone()),
            None => bail!("map path must be provided in command line or {} env", MAP_PATH_ENV),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            path: None,
            lowercase_image_encoding: true,
        }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            topic: "map".to_string(),
            format: SnapshotFormat::Binary,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "get_building_map".to_string(),
            request_buffer: 32,
        }
    }
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            brokers: vec!["localhost:9092".to_string()],
            client_id: "building-map-server".to_string(),
            max_message_bytes: 64 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [map]
            path = "/maps/office.building.yaml"

            [broadcast]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.map.path, Some(PathBuf::from("/maps/office.building.yaml")));
        assert!(config.map.lowercase_image_encoding);
        assert_eq!(config.broadcast.topic, "map");
        assert_eq!(config.broadcast.format, SnapshotFormat::Json);
        assert_eq!(config.service.name, "get_building_map");
    }

    #[test]
    fn test_zero_request_buffer_is_rejected() {
        let err = Config::from_toml("[service]\nrequest_buffer = 0\n").unwrap_err();
        assert!(err.to_string().contains("request_buffer"));

        let config = Config::from_toml("[service]\nrequest_buffer = 1\n").unwrap();
        assert_eq!(config.service.request_buffer, 1);
    }

    #[test]
    fn test_cli_argument_wins_over_config() {
        let mut config = Config::default();
        config.map.path = Some(PathBuf::from("from_config.yaml"));
        let path = config.resolve_map_path(Some("from_cli.yaml".to_string())).unwrap();
        assert_eq!(path, PathBuf::from("from_cli.yaml"));
    }
}
