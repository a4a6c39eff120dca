use serde::Deserialize;

use crate::aggregator::AggregatorConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub aggregator: AggregatorSection,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorSection {
    /// Decoded snapshots buffered ahead of the aggregation task.
    pub channel_capacity: usize,
    /// Log progress every N merged snapshots (0 = never).
    #[serde(default = "default_progress_log_every")]
    pub progress_log_every: u64,
}

fn default_progress_log_every() -> u64 {
    100
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

fn default_pretty() -> bool {
    true
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.aggregator.channel_capacity > 0,
            "aggregator.channel_capacity must be > 0, got {}",
            self.aggregator.channel_capacity
        );
        anyhow::ensure!(
            self.aggregator.channel_capacity <= 65_536,
            "aggregator.channel_capacity must be <= 65536, got {}",
            self.aggregator.channel_capacity
        );
        Ok(())
    }

    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            channel_capacity: self.aggregator.channel_capacity,
            progress_log_every: self.aggregator.progress_log_every,
        }
    }
}
