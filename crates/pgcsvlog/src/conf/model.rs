//! Model — IngestConfig.

use serde::{Deserialize, Serialize};

use crate::parser::{DurationOptions, EnrichOptions};

/// Path value meaning stdin (input) or stdout (output).
pub const STDIO_PATH: &str = "-";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// csvlog file to read, or `-` for stdin
    pub input_path: String,
    /// NDJSON destination, or `-` for stdout
    pub output_path: String,
    /// Rows buffered between the reader task and the enricher
    pub channel_capacity: usize,
    /// Also extract durations from `statement:` / `execute <name>:` messages
    pub statement_durations: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            input_path: STDIO_PATH.to_string(),
            output_path: STDIO_PATH.to_string(),
            channel_capacity: 256,
            statement_durations: false,
        }
    }
}

impl IngestConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.input_path.is_empty() {
            return Err("input_path must not be empty (use \"-\" for stdin)".to_string());
        }
        if self.output_path.is_empty() {
            return Err("output_path must not be empty (use \"-\" for stdout)".to_string());
        }
        if self.channel_capacity == 0 {
            return Err("channel_capacity must be > 0".to_string());
        }
        Ok(())
    }

    pub fn enrich_options(&self) -> EnrichOptions {
        EnrichOptions {
            duration: DurationOptions {
                statement_durations: self.statement_durations,
            },
        }
    }

    pub fn reads_stdin(&self) -> bool {
        self.input_path == STDIO_PATH
    }

    pub fn writes_stdout(&self) -> bool {
        self.output_path == STDIO_PATH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ────────────────────────────────────────────────

    #[test]
    fn test_ingest_config_defaults() {
        let cfg = IngestConfig::default();
        assert!(cfg.reads_stdin());
        assert!(cfg.writes_stdout());
        assert_eq!(cfg.channel_capacity, 256);
        assert!(!cfg.statement_durations);
        assert!(cfg.validate().is_ok());
    }

    // ── Validation ──────────────────────────────────────────────

    #[test]
    fn test_validate_empty_input_path() {
        let cfg = IngestConfig {
            input_path: String::new(),
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("input_path"), "Error should mention input_path: {}", err);
    }

    #[test]
    fn test_validate_empty_output_path() {
        let cfg = IngestConfig {
            output_path: String::new(),
            ..Default::default()
        };
        assert!(cfg.validate().unwrap_err().contains("output_path"));
    }

    #[test]
    fn test_validate_zero_channel_capacity() {
        let cfg = IngestConfig {
            channel_capacity: 0,
            ..Default::default()
        };
        assert!(cfg.validate().unwrap_err().contains("channel_capacity"));
    }

    // ── Enrich options ──────────────────────────────────────────

    #[test]
    fn test_enrich_options_follow_config() {
        let cfg = IngestConfig {
            statement_durations: true,
            ..Default::default()
        };
        assert!(cfg.enrich_options().duration.statement_durations);
        assert_eq!(IngestConfig::default().enrich_options(), EnrichOptions::default());
    }

    // ── Serialization Round-trip ─────────────────────────────────

    #[test]
    fn test_ingest_config_toml_round_trip() {
        let cfg = IngestConfig {
            input_path: "/var/log/postgresql/postgresql.csv".to_string(),
            channel_capacity: 64,
            ..Default::default()
        };
        let toml_str = toml::to_string(&cfg).expect("Should serialize to TOML");
        let back: IngestConfig = toml::from_str(&toml_str).expect("Should deserialize from TOML");
        assert_eq!(back.input_path, cfg.input_path);
        assert_eq!(back.channel_capacity, 64);
        assert_eq!(back.output_path, STDIO_PATH);
    }

    #[test]
    fn test_ingest_config_deserialize_partial_toml() {
        let cfg: IngestConfig = toml::from_str("statement_durations = true").expect("Should accept partial TOML");
        assert!(cfg.statement_durations);
        assert_eq!(cfg.channel_capacity, 256);
        assert!(cfg.reads_stdin());
    }
}
