use std::time::Instant;

use crate::config::SimulatorConfig;
use crate::field::{FieldParams, FrameSnapshot};
use crate::particles::{Particle, ParticleSystem};
use crate::scheduler::{AnimationState, FrameScheduler, RunState};
use crate::types::{FieldModel, Shape, SimulationParams};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOutput {
    pub snapshot: FrameSnapshot,
    /// Simulated seconds covered by this frame.
    pub delta: f32,
}

pub struct Session {
    params: SimulationParams,
    scheduler: FrameScheduler,
    particles: ParticleSystem,
    particles_enabled: bool,
    export_requested: bool,
}

impl Session {
    pub fn new(config: &SimulatorConfig) -> Self {
        let params = config.initial.clamped();
        let seed = config.rng_seed.unwrap_or_else(rand::random);
        let particles = ParticleSystem::seed(config.particle_count, params.shape, seed)
            .with_dynamics(config.dynamics);

        Self {
            params,
            scheduler: FrameScheduler::new(params.frequency, config.scheduler_settings()),
            particles,
            particles_enabled: config.particles_enabled,
            export_requested: false,
        }
    }

    pub fn params(&self) -> SimulationParams {
        self.params
    }

    pub fn animation(&self) -> AnimationState {
        self.scheduler.animation()
    }

    pub fn particles(&self) -> &[Particle] {
        if self.particles_enabled {
            self.particles.particles()
        } else {
            &[]
        }
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particles_enabled(&self) -> bool {
        self.particles_enabled
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn target_fps(&self) -> Option<f32> {
        self.scheduler.settings().target_fps
    }

    pub fn tone_frequency(&self) -> f32 {
        self.scheduler.animation().interpolated_frequency()
    }

    pub fn set_frequency(&mut self, hz: f32) {
        let before = self.params.frequency;
        self.params.set_frequency(hz);
        if self.params.frequency != before {
            self.scheduler.request_frequency(self.params.frequency);
            self.scheduler.reset_clock();
        }
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.update_field(|params| params.set_amplitude(amplitude));
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.update_field(|params| params.set_damping(damping));
    }

    pub fn set_fluid_depth(&mut self, depth: f32) {
        self.update_field(|params| params.set_fluid_depth(depth));
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.update_field(|params| params.set_shape(shape));
    }

    pub fn set_mode_index(&mut self, index: usize) {
        self.update_field(|params| params.set_mode_index(index));
    }

    pub fn set_model(&mut self, model: FieldModel) {
        if self.params.model == model {
            return;
        }
        self.params.set_model(model);
        self.scheduler.snap_frequency(self.params.frequency);
        self.scheduler.reset_clock();
        log::debug!("field model switched to {model:?}");
    }

    pub fn set_particle_radius(&mut self, radius: f32) {
        self.params.set_particle_radius(radius);
    }

    pub fn set_particles_enabled(&mut self, enabled: bool) {
        self.particles_enabled = enabled;
    }

    pub fn set_particle_count(&mut self, count: usize) {
        if count != self.particles.len() {
            self.particles.reseed(count, self.params.shape);
        }
    }

    pub fn reseed_particles(&mut self) {
        self.particles.reseed(self.particles.len(), self.params.shape);
    }

    pub fn set_target_fps(&mut self, target_fps: Option<f32>) {
        self.scheduler.set_target_fps(target_fps);
    }

    pub fn toggle(&mut self) -> RunState {
        self.scheduler.toggle()
    }

    pub fn request_export(&mut self) {
        self.export_requested = true;
    }

    pub fn take_export_request(&mut self) -> bool {
        std::mem::take(&mut self.export_requested)
    }

    // Field, particles and raster all read this one copy per frame.
    pub fn snapshot(&self) -> FrameSnapshot {
        let animation = self.scheduler.animation();
        FrameSnapshot {
            params: self.params,
            field: FieldParams::at_rest(&self.params).with_glide(
                animation.current_frequency,
                animation.target_frequency,
                animation.transition_progress,
            ),
            time: animation.current_time,
        }
    }

    pub fn tick(&mut self, dt: f32) -> Option<FrameOutput> {
        let delta = self.scheduler.advance(dt)?;
        Some(self.step_particles(delta))
    }

    pub fn tick_at(&mut self, now: Instant) -> Option<FrameOutput> {
        let delta = self.scheduler.tick(now)?;
        Some(self.step_particles(delta))
    }

    fn step_particles(&mut self, delta: f32) -> FrameOutput {
        let snapshot = self.snapshot();
        if self.particles_enabled && !self.particles.is_empty() {
            self.particles.step(&snapshot, delta);
        }
        FrameOutput { snapshot, delta }
    }

    fn update_field(&mut self, apply: impl FnOnce(&mut SimulationParams)) {
        let before = self.params;
        apply(&mut self.params);
        if self.params != before {
            self.scheduler.reset_clock();
        }
    }
}
