use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::EngineResult;
use crate::geometry::DashPattern;
use crate::history::DEFAULT_HISTORY_CAPACITY;

/// Engine-wide settings that stay fixed for an editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing fields fall back to the defaults below
pub struct EngineConfig {
    /// Canvas width used when the host has no container size yet
    pub width: u32,
    /// Canvas height used when the host has no container size yet
    pub height: u32,
    /// Undo states kept before the oldest is dropped
    pub history_capacity: usize,
    /// Distance between text line tops, as a multiple of the font size
    pub line_height: f32,
    /// Dashes of the live shape preview
    pub preview_dash: DashPattern,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            line_height: 1.2,
            preview_dash: DashPattern::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
