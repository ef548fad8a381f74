//! Suppression configuration per detector head

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{NmsError, Result};
use crate::utils::validate::validate_threshold;

/// Default overlap threshold
pub const NMS_THRESHOLD: f32 = 0.45;

/// Suppression strategies the dispatcher knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NmsKind {
    /// Greedy per-class suppression with IoU overlap
    #[default]
    Greedy,
    /// Greedy per-class suppression with distance-aware IoU overlap (unit distance exponent)
    Diou,
}

impl NmsKind {
    pub const ALL: [NmsKind; 2] = [NmsKind::Greedy, NmsKind::Diou];

    /// Darknet cfg spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            NmsKind::Greedy => "greedynms",
            NmsKind::Diou => "diounms",
        }
    }
}

impl fmt::Display for NmsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NmsKind {
    type Err = NmsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedynms" | "greedy" => Ok(NmsKind::Greedy),
            "diounms" | "diou" => Ok(NmsKind::Diou),
            _ => Err(NmsError::UnsupportedSuppressionKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for NmsKind {
    type Error = NmsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<NmsKind> for String {
    fn from(value: NmsKind) -> Self {
        value.as_str().to_string()
    }
}

/// How one detector output head suppresses overlapping boxes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuppressionConfig {
    pub kind: NmsKind,
    pub threshold: f32,
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            kind: NmsKind::Greedy,
            threshold: NMS_THRESHOLD,
        }
    }
}

impl SuppressionConfig {
    pub fn new(kind: NmsKind, threshold: f32) -> Self {
        Self { kind, threshold }
    }

    /// Greedy IoU suppression at `threshold`
    pub fn greedy(threshold: f32) -> Self {
        Self::new(NmsKind::Greedy, threshold)
    }

    /// Greedy DIoU suppression at `threshold`
    pub fn diou(threshold: f32) -> Self {
        Self::new(NmsKind::Diou, threshold)
    }

    /// Parse the kind from its cfg name
    pub fn from_kind_name(kind: &str, threshold: f32) -> Result<Self> {
        Ok(Self::new(kind.parse()?, threshold))
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)
    }
}
