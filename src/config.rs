//! Console configuration file: camera list, loop rate and per-layout
//! parameters.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::display::{DisplayInfo, DisplayRegistry};
use crate::error::{LayoutError, Result};
use crate::layout::variants::MAX_GRID_DIM;
use crate::layout::{LayoutParams, LayoutType};

/// Camera entry in the configuration file.
pub type DisplayConfig = DisplayInfo;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Frames per second of the render loop.
    pub loop_rate: f64,
    pub default_layout: LayoutType,
    pub displays: Vec<DisplayConfig>,
    pub layouts: LayoutParams,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            loop_rate: 30.0,
            default_layout: LayoutType::Wide,
            displays: Vec::new(),
            layouts: LayoutParams::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: ConsoleConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.loop_rate.is_finite() || self.loop_rate <= 0.0 {
            return Err(LayoutError::Config(format!(
                "loop_rate must be positive, got {}",
                self.loop_rate
            )));
        }
        self.frame_interval()?;
        let grid = &self.layouts.grid;
        if grid.rows > MAX_GRID_DIM || grid.cols > MAX_GRID_DIM {
            return Err(LayoutError::Config(format!(
                "grid is {}x{}, at most {MAX_GRID_DIM}x{MAX_GRID_DIM} is supported",
                grid.rows, grid.cols
            )));
        }
        for display in &self.displays {
            if display.width == 0 || display.height == 0 || display.channels == 0 {
                return Err(LayoutError::Config(format!(
                    "display `{}` has an empty frame size",
                    display.label()
                )));
            }
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(1.0 / self.loop_rate).map_err(|err| {
            LayoutError::Config(format!("loop_rate {} is out of range: {err}", self.loop_rate))
        })
    }

    /// Register every configured display, in file order.
    pub fn build_registry(&self) -> DisplayRegistry {
        let mut registry = DisplayRegistry::new();
        for display in &self.displays {
            registry.register(display.clone());
        }
        registry
    }
}
