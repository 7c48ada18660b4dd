//! Runtime settings, read from an optional JSON file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::export::ExportOptions;
use crate::quantize::{MAX_COLORS, MAX_ITERATIONS, MIN_COLORS, MIN_ITERATIONS};
use crate::tool::{AreaFillPolicy, BrushTool};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub paint: PaintConfig,
    pub autosave: AutosaveConfig,
    pub export: ExportOptions,
}

impl Config {
    /// Loads a config file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }
}

/// Board generation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Requested grid width in cells
    pub cells_across: u32,
    /// Number of palette colors (K)
    pub palette_size: usize,
    pub iterations: usize,
    pub thumbnail_width: u32,
    /// Fixed seed for reproducible clustering
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            cells_across: 69,
            palette_size: 12,
            iterations: 10,
            thumbnail_width: 256,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn palette_size(&self) -> usize {
        self.palette_size.clamp(MIN_COLORS, MAX_COLORS)
    }

    pub fn iterations(&self) -> usize {
        self.iterations.clamp(MIN_ITERATIONS, MAX_ITERATIONS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintConfig {
    pub brush_size: u32,
    pub area_fill: AreaFillPolicy,
}

impl Default for PaintConfig {
    fn default() -> Self {
        Self {
            brush_size: 1,
            area_fill: AreaFillPolicy::AllColors,
        }
    }
}

impl PaintConfig {
    pub fn brush(&self) -> BrushTool {
        BrushTool::new(self.brush_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    pub enabled: bool,
    pub quiet_period_ms: u64,
    pub cooldown_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            quiet_period_ms: 400,
            cooldown_ms: 1000,
        }
    }
}

impl AutosaveConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}
