use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use crate::types::lerp;

/// Absorbs the rounding of many small `dt / glide` increments so that a glide
/// stepped for its full duration finishes.
const PROGRESS_EPSILON: f32 = 1.0e-5;

pub const TARGET_FPS_RANGE: RangeInclusive<f32> = 10.0..=120.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerSettings {
    /// Frames arriving faster than this are skipped. `None` runs every tick.
    pub target_fps: Option<f32>,
    pub glide_duration: Duration,
    pub max_frame_delta: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            target_fps: Some(60.0),
            glide_duration: Duration::from_millis(2_000),
            max_frame_delta: Duration::from_millis(100),
        }
    }
}

impl SchedulerSettings {
    pub fn clamped(self) -> Self {
        Self {
            target_fps: clamp_fps(self.target_fps),
            ..self
        }
    }

    fn frame_budget(&self) -> Option<Duration> {
        self.target_fps.map(|fps| Duration::from_secs_f32(1.0 / fps))
    }
}

fn clamp_fps(target_fps: Option<f32>) -> Option<f32> {
    target_fps
        .filter(|fps| fps.is_finite())
        .map(|fps| fps.clamp(*TARGET_FPS_RANGE.start(), *TARGET_FPS_RANGE.end()))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    pub is_running: bool,
    pub current_time: f32,
    /// Glide origin; equals `target_frequency` at rest.
    pub current_frequency: f32,
    pub target_frequency: f32,
    pub transition_progress: f32,
}

impl AnimationState {
    pub fn is_gliding(&self) -> bool {
        self.current_frequency != self.target_frequency
    }

    pub fn interpolated_frequency(&self) -> f32 {
        lerp(
            self.current_frequency,
            self.target_frequency,
            self.transition_progress,
        )
    }
}

pub struct FrameScheduler {
    state: RunState,
    animation: AnimationState,
    settings: SchedulerSettings,
    last_tick: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(frequency: f32, settings: SchedulerSettings) -> Self {
        Self {
            state: RunState::Running,
            animation: AnimationState {
                is_running: true,
                current_time: 0.0,
                current_frequency: frequency,
                target_frequency: frequency,
                transition_progress: 1.0,
            },
            settings: settings.clamped(),
            last_tick: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn animation(&self) -> AnimationState {
        self.animation
    }

    pub fn settings(&self) -> SchedulerSettings {
        self.settings
    }

    pub fn set_target_fps(&mut self, target_fps: Option<f32>) {
        self.settings.target_fps = clamp_fps(target_fps);
    }

    // The first tick after resuming covers zero time.
    pub fn toggle(&mut self) -> RunState {
        self.state = match self.state {
            RunState::Running => RunState::Stopped,
            RunState::Stopped => RunState::Running,
        };
        self.animation.is_running = self.is_running();
        self.last_tick = None;
        self.state
    }

    pub fn reset_clock(&mut self) {
        self.animation.current_time = 0.0;
    }

    pub fn request_frequency(&mut self, frequency: f32) {
        let animation = &mut self.animation;
        if frequency == animation.target_frequency {
            return;
        }

        let origin = animation.interpolated_frequency();
        animation.target_frequency = frequency;
        if origin == frequency {
            animation.current_frequency = frequency;
            animation.transition_progress = 1.0;
            return;
        }

        animation.current_frequency = origin;
        animation.transition_progress = 0.0;
        log::debug!("frequency glide {origin} Hz -> {frequency} Hz");
    }

    pub fn snap_frequency(&mut self, frequency: f32) {
        self.animation.current_frequency = frequency;
        self.animation.target_frequency = frequency;
        self.animation.transition_progress = 1.0;
    }

    /// Returns the frame's time step in seconds, or `None` when stopped or
    /// throttled.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        if !self.is_running() {
            return None;
        }

        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return self.advance(0.0);
        };

        let elapsed = now.saturating_duration_since(last);
        if let Some(budget) = self.settings.frame_budget() {
            if elapsed < budget {
                return None;
            }
        }

        self.last_tick = Some(now);
        self.advance(elapsed.min(self.settings.max_frame_delta).as_secs_f32())
    }

    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        if !self.is_running() {
            return None;
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let animation = &mut self.animation;
        animation.current_time += dt;

        if animation.is_gliding() {
            let glide = self.settings.glide_duration.as_secs_f32();
            let progress = if glide > 0.0 {
                animation.transition_progress + dt / glide
            } else {
                1.0
            };

            if progress >= 1.0 - PROGRESS_EPSILON {
                animation.current_frequency = animation.target_frequency;
                animation.transition_progress = 1.0;
            } else {
                animation.transition_progress = progress;
            }
        }

        Some(dt)
    }
}
