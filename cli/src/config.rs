//! CLI configuration with TOML file support.

use std::path::Path;

use anyhow::Context;
use ballot_engine::EngineConfig;
use ballot_types::Principal;
use ballot_utils::LogFormat;
use serde::{Deserialize, Serialize};

/// Configuration for the `ballot` binary.
///
/// Loaded from a TOML file via `--config`; CLI flags and `BALLOT_*`
/// environment variables override the file's values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CliConfig {
    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Principals always classified as programmatic, in addition to those a
    /// script lists.
    #[serde(default)]
    pub programmatic: Vec<Principal>,

    /// Engine limits.
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl CliConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            programmatic: Vec::new(),
            engine: EngineConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = CliConfig::from_toml_str("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn nested_engine_table_overrides() {
        let toml = r#"
            log_format = "json"
            programmatic = ["0xc0ffee"]

            [engine]
            max_voters_per_grant = 50
        "#;
        let config = CliConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.engine.max_voters_per_grant, 50);
        assert_eq!(config.engine.max_candidates, 1_000);
        assert_eq!(config.programmatic.len(), 1);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();
        let config = CliConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn default_round_trips_through_toml() {
        let config = CliConfig::default();
        let parsed = CliConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(parsed.log_level, config.log_level);
        assert_eq!(parsed.engine, config.engine);
    }
}
