//! Show configuration.
//!
//! Every recognized key is a field here with its default. Files are TOML:
//!
//! ```toml
//! [show]
//! target_burst_count = 12
//! color_palette = ["#ff1e1e", "hsl(210, 100%, 50%)"]
//!
//! [show.particle]
//! shrink = 0.96
//!
//! [terminal]
//! background = "#1a1b26"
//! ```
//!
//! Unknown keys are rejected.

use crate::color::{Color, default_palette};
use crate::error::{Error, Result};
use crate::particle::ParticleOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Number of bursts the spawner tries to keep alive.
    pub target_burst_count: usize,
    /// Mean gap between spawn ticks; each gap is 50-100% of this.
    pub spawn_interval_ms: f64,
    pub fps: f64,
    /// Native refresh rate of the display. At or above it, frames follow the display.
    pub refresh_rate: f64,
    pub color_palette: Vec<Color>,
    pub min_particles: usize,
    pub max_particles: usize,
    /// Fixed seed for a reproducible show.
    pub seed: Option<u64>,
    pub particle: ParticleOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_burst_count: 8,
            spawn_interval_ms: 400.0,
            fps: 60.0,
            refresh_rate: 60.0,
            color_palette: default_palette(),
            min_particles: 80,
            max_particles: 100,
            seed: None,
            particle: ParticleOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Clamps timing values into a usable range. Called once at load time, never per tick.
    pub fn validate(&mut self) {
        self.fps = self.fps.clamp(1.0, 1000.0);
        self.refresh_rate = self.refresh_rate.clamp(1.0, 1000.0);
        self.spawn_interval_ms = self.spawn_interval_ms.max(1.0);
        if self.min_particles > self.max_particles {
            std::mem::swap(&mut self.min_particles, &mut self.max_particles);
        }

        let p = &self.particle;
        if !(p.shrink > 0.0 && p.shrink < 1.0) {
            warn!(shrink = p.shrink, "particle shrink outside (0, 1): bursts may never finish");
        }
        if !(p.power > 0.0 && p.power < 1.0) {
            warn!(power = p.power, "particle power outside (0, 1)");
        }
    }
}

/// Host-side settings for the terminal front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalOptions {
    /// Canvas pixels per half-block pixel.
    pub scale: usize,
    pub background: Color,
    pub log_file: Option<PathBuf>,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            scale: 4,
            background: Color::BLACK,
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub show: EngineConfig,
    pub terminal: TerminalOptions,
}

impl AppConfig {
    pub fn from_toml(contents: &str, path: &Path) -> Result<Self> {
        let mut config: Self = toml::from_str(contents).map_err(|source| Error::ParseConfig {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate();
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents, path)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&mut self) {
        self.show.validate();
        self.terminal.scale = self.terminal.scale.clamp(1, 16);
    }
}
