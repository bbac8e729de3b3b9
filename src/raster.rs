use glam::{Vec2, Vec3};
use rayon::prelude::*;

use crate::field::FrameSnapshot;
use crate::particles::Particle;
use crate::types::FieldModel;

const BACKGROUND: [u8; 4] = [10, 12, 20, 255];
const SAND: [f32; 3] = [0.96, 0.88, 0.66];
/// Field brightness under the particle overlay.
const PARTICLE_BACKDROP: f32 = 0.35;

pub struct FieldRaster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl FieldRaster {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 4],
        }
    }

    pub fn dimensions(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn render(&mut self, frame: &FrameSnapshot, particles: &[Particle]) {
        let width = self.width;
        let height = self.height;
        let texel = 1.0 / width.max(height) as f32;
        let dim = if particles.is_empty() {
            1.0
        } else {
            PARTICLE_BACKDROP
        };

        self.pixels
            .par_chunks_mut(width * 4)
            .enumerate()
            .for_each(|(row, line)| {
                for (col, rgba) in line.chunks_exact_mut(4).enumerate() {
                    let point = plate_point(col, row, width, height);
                    if !frame.params.shape.contains(point) {
                        rgba.copy_from_slice(&BACKGROUND);
                        continue;
                    }
                    let color = shade(frame, point, texel) * dim;
                    rgba.copy_from_slice(&to_rgba8(color));
                }
            });

        self.splat_particles(frame, particles);
    }

    fn splat_particles(&mut self, frame: &FrameSnapshot, particles: &[Particle]) {
        let radius = frame.params.particle_radius;
        let reach = radius.ceil() as isize;
        let sand = to_rgba8(Vec3::from_array(SAND));

        for particle in particles {
            let cx = particle.position.x * self.width as f32;
            let cy = (1.0 - particle.position.y) * self.height as f32;

            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let px = cx as isize + dx;
                    let py = cy as isize + dy;
                    if px < 0 || py < 0 || px >= self.width as isize || py >= self.height as isize
                    {
                        continue;
                    }
                    let offset = Vec2::new(px as f32 + 0.5 - cx, py as f32 + 0.5 - cy);
                    if offset.length() > radius.max(0.5) {
                        continue;
                    }
                    let idx = (py as usize * self.width + px as usize) * 4;
                    self.pixels[idx..idx + 4].copy_from_slice(&sand);
                }
            }
        }
    }
}

fn plate_point(col: usize, row: usize, width: usize, height: usize) -> Vec2 {
    Vec2::new(
        (col as f32 + 0.5) / width as f32,
        1.0 - (row as f32 + 0.5) / height as f32,
    )
}

fn shade(frame: &FrameSnapshot, point: Vec2, texel: f32) -> Vec3 {
    let amplitude = frame.params.amplitude;
    let value = frame.evaluate(point);

    match frame.params.model {
        FieldModel::ReflectingWave => {
            let height = (value * amplitude).clamp(-1.0, 1.0) * 0.5 + 0.5;
            let water = Vec3::new(0.0, 0.1, 0.3).lerp(Vec3::new(0.0, 0.4, 0.8), height);
            let foam = Vec3::new(0.9, 0.95, 1.0);
            let base = water.lerp(foam, smoothstep(0.8, 1.0, height));

            let dx = frame.evaluate(point + Vec2::new(texel, 0.0))
                - frame.evaluate(point - Vec2::new(texel, 0.0));
            let dy = frame.evaluate(point + Vec2::new(0.0, texel))
                - frame.evaluate(point - Vec2::new(0.0, texel));
            let normal = Vec3::new(-dx, -dy, 0.1).normalize_or(Vec3::Z);
            let light = Vec3::new(0.5, 0.5, 1.0).normalize();
            let diffuse = normal.dot(light).max(0.0);
            let specular = reflect(-light, normal).dot(Vec3::Z).max(0.0).powi(32);

            base * (diffuse * 0.7 + 0.3) + Vec3::splat(specular * 0.2)
        }
        FieldModel::Chladni | FieldModel::TwoMode => {
            let t = (value * amplitude * 0.5).clamp(0.0, 1.0);
            Vec3::from_array(spectral_color(t))
        }
    }
}

fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn to_rgba8(color: Vec3) -> [u8; 4] {
    let c = color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    [c.x as u8, c.y as u8, c.z as u8, 255]
}

fn spectral_color(t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    let anchors = [
        (0.00, [0.02, 0.03, 0.13]),
        (0.25, [0.00, 0.46, 0.95]),
        (0.50, [0.05, 0.92, 0.35]),
        (0.75, [0.98, 0.86, 0.10]),
        (1.00, [0.95, 0.12, 0.18]),
    ];

    for pair in anchors.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t >= t0 && t <= t1 {
            let alpha = (t - t0) / (t1 - t0);
            return [
                c0[0] + (c1[0] - c0[0]) * alpha,
                c0[1] + (c1[1] - c0[1]) * alpha,
                c0[2] + (c1[2] - c0[2]) * alpha,
            ];
        }
    }

    anchors[anchors.len() - 1].1
}
