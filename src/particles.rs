use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::field::{gradient, FrameSnapshot};
use crate::types::{assign_clamped, Shape};

const MIN_NORMAL_LENGTH: f32 = 1.0e-6;
const MAX_SEED_ATTEMPTS: usize = 64;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleDynamics {
    pub acceleration_scale: f32,
    /// Per-step velocity retention.
    pub velocity_damping: f32,
    pub bounce_damping: f32,
    pub gradient_step: f32,
    pub max_speed: f32,
}

impl Default for ParticleDynamics {
    fn default() -> Self {
        Self {
            acceleration_scale: 5_000.0,
            velocity_damping: 0.98,
            bounce_damping: 0.8,
            gradient_step: 0.001,
            max_speed: 4.0,
        }
    }
}

impl ParticleDynamics {
    /// Non-finite values fall back to the defaults.
    pub fn clamped(self) -> Self {
        let mut dynamics = Self::default();
        assign_clamped(&mut dynamics.acceleration_scale, self.acceleration_scale, 0.0..=1.0e6);
        assign_clamped(&mut dynamics.velocity_damping, self.velocity_damping, 0.0..=1.0);
        assign_clamped(&mut dynamics.bounce_damping, self.bounce_damping, 0.0..=1.0);
        assign_clamped(&mut dynamics.gradient_step, self.gradient_step, 1.0e-5..=0.05);
        assign_clamped(&mut dynamics.max_speed, self.max_speed, 1.0e-3..=100.0);
        dynamics
    }

    pub fn advance(&self, particle: &mut Particle, frame: &FrameSnapshot, dt: f32) {
        let (_, slope) = gradient(particle.position, frame.time, &frame.field, self.gradient_step);
        let force = -slope * self.acceleration_scale * frame.params.amplitude;

        let velocity = (particle.velocity * self.velocity_damping + force * dt)
            .clamp_length_max(self.max_speed);
        let previous = particle.position;
        let moved = previous + velocity * dt;

        let shape = frame.params.shape;
        if shape.contains(moved) {
            particle.position = moved;
            particle.velocity = velocity;
            return;
        }

        let projected = shape.nearest_boundary_point(moved);
        particle.position = projected;
        particle.velocity = match bounce_normal(previous, projected, moved) {
            Some(normal) => velocity.reject_from_normalized(normal)
                - velocity.project_onto_normalized(normal),
            None => -velocity,
        } * self.bounce_damping;
    }
}

/// Normal for the inelastic bounce: old position toward the projected point,
/// or, when the particle started on the outline, projected point toward the
/// escaped position.
fn bounce_normal(previous: Vec2, projected: Vec2, escaped: Vec2) -> Option<Vec2> {
    [projected - previous, escaped - projected]
        .into_iter()
        .find(|v| v.length() >= MIN_NORMAL_LENGTH)
        .map(Vec2::normalize)
}

pub struct ParticleSystem {
    particles: Vec<Particle>,
    dynamics: ParticleDynamics,
    rng: StdRng,
}

impl ParticleSystem {
    pub fn seed(count: usize, shape: Shape, seed: u64) -> Self {
        let mut system = Self {
            particles: Vec::new(),
            dynamics: ParticleDynamics::default(),
            rng: StdRng::seed_from_u64(seed),
        };
        system.reseed(count, shape);
        system
    }

    pub fn with_dynamics(mut self, dynamics: ParticleDynamics) -> Self {
        self.dynamics = dynamics.clamped();
        self
    }

    pub fn reseed(&mut self, count: usize, shape: Shape) {
        let (lo, hi) = shape.bounding_box();
        let rng = &mut self.rng;

        self.particles.clear();
        self.particles.reserve_exact(count);
        self.particles.extend((0..count).map(|_| {
            let mut position = random_point(rng, lo, hi);
            for _ in 0..MAX_SEED_ATTEMPTS {
                if shape.contains(position) {
                    break;
                }
                position = random_point(rng, lo, hi);
            }
            Particle {
                position: shape.nearest_boundary_point(position),
                velocity: Vec2::ZERO,
            }
        }));

        log::debug!("seeded {count} particles on {shape:?} plate");
    }

    pub fn step(&mut self, frame: &FrameSnapshot, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let dynamics = self.dynamics;
        self.particles
            .par_iter_mut()
            .for_each(|particle| dynamics.advance(particle, frame, dt));
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

fn random_point(rng: &mut StdRng, lo: Vec2, hi: Vec2) -> Vec2 {
    Vec2::new(rng.random_range(lo.x..=hi.x), rng.random_range(lo.y..=hi.y))
}
