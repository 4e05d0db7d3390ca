//! Finder configuration: optional TOML file, then command-line overrides.
//!
//! ```toml
//! step_minutes = 30
//!
//! [scoring]
//! availability = 1.0
//! earliness = 0.25
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use slot_engine::FinderConfig;

/// Overrides taken from command-line flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides {
    pub step_minutes: Option<u32>,
    pub availability_weight: Option<f64>,
    pub earliness_weight: Option<f64>,
}

pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<FinderConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            toml::from_str::<FinderConfig>(&raw)
                .with_context(|| format!("Invalid config: {}", path.display()))?
        }
        None => FinderConfig::default(),
    };

    if let Some(step) = overrides.step_minutes {
        config.step_minutes = Some(step);
    }
    if let Some(weight) = overrides.availability_weight {
        config.scoring.availability = weight;
    }
    if let Some(weight) = overrides.earliness_weight {
        config.scoring.earliness = weight;
    }

    if config.step_minutes == Some(0) {
        anyhow::bail!("step_minutes must be greater than zero");
    }
    config.scoring.validate()?;

    Ok(config)
}
