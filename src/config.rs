use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::visuals::{CANVAS_HEIGHT, CANVAS_WIDTH, Rgb};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial window size in pixels. Drawing is normalized, so this only
    /// affects the window, never where shapes land.
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub tick_interval_ms: u64,
    pub poll_interval_ms: u64,
    pub background: Rgb,
    pub mappings: Option<PathBuf>,
    pub input_port: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH as f32,
            canvas_height: CANVAS_HEIGHT as f32,
            tick_interval_ms: 33,
            poll_interval_ms: 2,
            background: Rgb::BLACK,
            mappings: None,
            input_port: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let ron_string = fs::read_to_string(path)?;
        let config: Config = ron::from_str(&ron_string)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, ron_string)?;
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
