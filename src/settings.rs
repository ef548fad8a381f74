//! CLI configuration file

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use yolo_post_nms::SuppressionConfig;

/// Score a detection needs to be reported
pub const DEFAULT_MIN_SCORE: f32 = 0.25;

/// A reported score must pass a cutoff in `[0, 1]`
pub fn validate_min_score(min_score: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&min_score) {
        bail!("min_score {} is outside [0, 1]", min_score);
    }
    Ok(())
}

/// Postprocessing settings for every detector head
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocessConfig {
    pub min_score: f32,
    pub heads: Vec<SuppressionConfig>,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            heads: vec![SuppressionConfig::default()],
        }
    }
}

impl PostprocessConfig {
    /// Load and validate a TOML config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;

        Self::from_toml(&contents).with_context(|| format!("Invalid config: {:?}", path))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut config: PostprocessConfig = toml::from_str(contents)?;
        if config.heads.is_empty() {
            config.heads.push(SuppressionConfig::default());
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_min_score(self.min_score)?;
        for (index, head) in self.heads.iter().enumerate() {
            head.validate()
                .with_context(|| format!("head {} ({})", index, head.kind))?;
        }
        Ok(())
    }

    /// Suppression settings of output head `index`
    pub fn head(&self, index: usize) -> Result<&SuppressionConfig> {
        match self.heads.get(index) {
            Some(head) => Ok(head),
            None => bail!("head {} not configured ({} heads)", index, self.heads.len()),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
