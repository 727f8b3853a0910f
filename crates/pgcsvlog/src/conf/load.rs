//! Load — config loading from file and environment variables.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::model::IngestConfig;

const DEFAULT_CONFIG_PATH: &str = "/etc/pgcsvlog/pgcsvlog.toml";

impl IngestConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = std::env::var("PGCSVLOG_CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&config_path).exists() {
            tracing::info!("Loading configuration from: {}", config_path);
            Self::from_file(&config_path)?
        } else {
            tracing::debug!("Config file not found at {}, using environment variables", config_path);
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: IngestConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Override values from `lookup` (normally the process environment).
    /// Unparseable numbers and booleans are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(input) = lookup("PGCSVLOG_INPUT") {
            self.input_path = input;
        }
        if let Some(output) = lookup("PGCSVLOG_OUTPUT") {
            self.output_path = output;
        }
        if let Some(capacity) = lookup("PGCSVLOG_CHANNEL_CAPACITY").and_then(|s| s.parse().ok()) {
            self.channel_capacity = capacity;
        }
        if let Some(enabled) = lookup("PGCSVLOG_STATEMENT_DURATIONS").and_then(|s| s.parse().ok()) {
            self.statement_durations = enabled;
        }
    }
}
