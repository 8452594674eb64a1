//! Run configuration for the HSI link tools

use anyhow::{Context, Result};
use clap::Args;
use hsi_core::predictor::PredictorStrategy;
use hsi_core::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Parameters of one compression and transmission run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Wrap the payload in CRC blocks before Hamming coding
    pub use_crc: bool,
    /// Channel window size: one bit flipped per `error_rate` bits, 0 disables
    pub error_rate: i64,
    pub predictor: PredictorStrategy,
    /// Channel seed; unset draws one from the OS
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            use_crc: true,
            error_rate: 0,
            predictor: PredictorStrategy::default(),
            seed: None,
        }
    }
}

impl RunConfig {
    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> hsi_core::Result<()> {
        if self.error_rate < 0 {
            return Err(CoreError::InvalidConfiguration {
                msg: format!("error rate must be non-negative, got {}", self.error_rate),
            });
        }
        Ok(())
    }

    /// Load configuration from a JSON or TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Self = match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(_) => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?,
        };

        Ok(config)
    }

    /// Save configuration; `.json` paths get JSON, anything else TOML
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                serde_json::to_string_pretty(self).context("Failed to serialize config")?
            }
            _ => toml::to_string_pretty(self).context("Failed to serialize config")?,
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }
}

/// Command line overrides for [`RunConfig`]
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Configuration file (JSON or TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Protect blocks with the CRC
    #[arg(long, conflicts_with = "no_crc")]
    pub crc: bool,

    /// Hamming-only link, no CRC
    #[arg(long)]
    pub no_crc: bool,

    /// Flip one bit in every window of this many bits (0 = noiseless)
    #[arg(long, allow_negative_numbers = true)]
    pub error_rate: Option<i64>,

    /// Predictor strategy
    #[arg(long)]
    pub predictor: Option<PredictorStrategy>,

    /// Channel seed
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ConfigArgs {
    /// Config file (or defaults) with command line values applied on top
    pub fn resolve(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };

        if self.crc {
            config.use_crc = true;
        }
        if self.no_crc {
            config.use_crc = false;
        }
        if let Some(rate) = self.error_rate {
            config.error_rate = rate;
        }
        if let Some(predictor) = self.predictor {
            config.predictor = predictor;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }
}
