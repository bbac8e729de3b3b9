use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::particles::ParticleDynamics;
use crate::scheduler::SchedulerSettings;
use crate::types::SimulationParams;

pub const CONFIG_ENV_VAR: &str = "CYMATIC_CONFIG";
const MAX_PARTICLES: usize = 200_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub particle_count: usize,
    pub particles_enabled: bool,
    /// Fixed seed for the particle scatter; random when absent.
    pub rng_seed: Option<u64>,
    pub target_fps: Option<f32>,
    pub glide_duration_ms: u64,
    pub max_frame_delta_ms: u64,
    /// Side length in pixels of the square field raster.
    pub raster_size: usize,
    pub export_path: PathBuf,
    pub initial: SimulationParams,
    pub dynamics: ParticleDynamics,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            particle_count: 20_000,
            particles_enabled: true,
            rng_seed: None,
            target_fps: Some(60.0),
            glide_duration_ms: 2_000,
            max_frame_delta_ms: 100,
            raster_size: 320,
            export_path: PathBuf::from("cymatic_pattern.png"),
            initial: SimulationParams::default(),
            dynamics: ParticleDynamics::default(),
        }
    }
}

impl SimulatorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("loaded config from {}", path.display());
        Ok(config.clamped())
    }

    pub fn clamped(self) -> Self {
        Self {
            particle_count: self.particle_count.min(MAX_PARTICLES),
            target_fps: self.scheduler_settings().clamped().target_fps,
            max_frame_delta_ms: self.max_frame_delta_ms.clamp(1, 1_000),
            raster_size: self.raster_size.clamp(32, 2_048),
            initial: self.initial.clamped(),
            dynamics: self.dynamics.clamped(),
            ..self
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn scheduler_settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            target_fps: self.target_fps,
            glide_duration: Duration::from_millis(self.glide_duration_ms),
            max_frame_delta: Duration::from_millis(self.max_frame_delta_ms),
        }
    }
}
