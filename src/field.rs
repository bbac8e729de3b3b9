use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use glam::Vec2;

use crate::geometry::{DISK_RADIUS, PLATE_CENTER};
use crate::special::{bessel_j0, bessel_j1};
use crate::types::{lerp, FieldModel, Shape, SimulationParams};

const WAVE_FREQUENCY_SCALE: f32 = 1.0e-4;
const REFLECTION_COUNT: usize = 4;

const CHLADNI_WAVENUMBER_PER_HZ: f32 = 0.02;

const TWO_MODE_REFERENCE_HZ: f32 = 100.0;
const TWO_MODE_PAIRS: [(f32, f32); 3] = [(2.0, 1.0), (3.0, 2.0), (4.0, 3.0)];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldParams {
    pub model: FieldModel,
    pub shape: Shape,
    pub mode_index: usize,
    pub fluid_depth: f32,
    pub damping: f32,
    /// Frequency the current glide started from.
    pub frequency: f32,
    pub target_frequency: f32,
    pub transition: f32,
}

impl FieldParams {
    pub fn at_rest(params: &SimulationParams) -> Self {
        Self {
            model: params.model,
            shape: params.shape,
            mode_index: params.mode_index,
            fluid_depth: params.fluid_depth,
            damping: params.damping,
            frequency: params.frequency,
            target_frequency: params.frequency,
            transition: 1.0,
        }
    }

    pub fn with_glide(mut self, origin: f32, target: f32, progress: f32) -> Self {
        self.frequency = origin;
        self.target_frequency = target;
        self.transition = progress.clamp(0.0, 1.0);
        self
    }

    pub fn effective_frequency(&self) -> f32 {
        lerp(self.frequency, self.target_frequency, self.transition)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSnapshot {
    pub params: SimulationParams,
    pub field: FieldParams,
    pub time: f32,
}

impl FrameSnapshot {
    pub fn evaluate(&self, point: Vec2) -> f32 {
        evaluate(point, self.time, &self.field)
    }
}

pub fn evaluate(point: Vec2, time: f32, field: &FieldParams) -> f32 {
    match field.model {
        FieldModel::ReflectingWave => {
            reflecting_wave(point, time, field.effective_frequency(), field)
        }
        FieldModel::Chladni => chladni(point, field.shape, field.effective_frequency()),
        FieldModel::TwoMode => {
            let pair = TWO_MODE_PAIRS[field.mode_index.min(TWO_MODE_PAIRS.len() - 1)];
            let to = two_mode(point, pair, field.target_frequency);
            if field.transition >= 1.0 || field.frequency == field.target_frequency {
                return to;
            }
            let from = two_mode(point, pair, field.frequency);
            lerp(from, to, field.transition)
        }
    }
}

pub fn gradient(point: Vec2, time: f32, field: &FieldParams, step: f32) -> (f32, Vec2) {
    let value = evaluate(point, time, field);
    let dx = evaluate(point + Vec2::new(step, 0.0), time, field) - value;
    let dy = evaluate(point + Vec2::new(0.0, step), time, field) - value;
    (value, Vec2::new(dx, dy) / step)
}

fn tanh_approx(x: f32) -> f32 {
    let x2 = x * x;
    (x * (27.0 + x2) / (27.0 + 9.0 * x2)).clamp(-1.0, 1.0)
}

// k = sqrt(f) * sqrt(tanh(d sqrt(f)) / d)
fn wavenumber(scaled_frequency: f32, depth: f32) -> f32 {
    let root = scaled_frequency.sqrt();
    root * (tanh_approx(depth * root) / depth).sqrt()
}

fn wave_directions(shape: Shape) -> impl Iterator<Item = Vec2> {
    let (count, spacing) = match shape {
        Shape::Disk => (8, FRAC_PI_4),
        Shape::Square => (2, FRAC_PI_2),
        Shape::Triangle => (5, TAU / 5.0),
    };
    (0..count).map(move |i| Vec2::from_angle(i as f32 * spacing))
}

fn standing_wave(point: Vec2, k: Vec2, phase: f32) -> f32 {
    let mut p = point;
    let mut sum = 0.0;
    for _ in 0..REFLECTION_COUNT {
        sum += (k.dot(p) - phase).sin();
        p = (Vec2::ONE - p).abs();
    }
    sum / REFLECTION_COUNT as f32
}

fn reflecting_wave(point: Vec2, time: f32, frequency: f32, field: &FieldParams) -> f32 {
    let scaled = frequency * WAVE_FREQUENCY_SCALE;
    let k = wavenumber(scaled, field.fluid_depth);
    let phase = time * scaled;

    let mut sum = 0.0;
    let mut count = 0;
    for direction in wave_directions(field.shape) {
        sum += standing_wave(point, direction * k, phase);
        count += 1;
    }

    sum / count as f32 * (-field.damping * time).exp()
}

fn drifting_modes(k: f32) -> (f32, f32) {
    let m = 2.0 + 3.0 * (0.1 * k).sin();
    let n = 2.0 + 3.0 * (0.15 * k).cos();
    (m, n)
}

fn chladni(point: Vec2, shape: Shape, frequency: f32) -> f32 {
    let k = CHLADNI_WAVENUMBER_PER_HZ * frequency;
    let (m, n) = drifting_modes(k);

    match shape {
        Shape::Disk => {
            let q = point - PLATE_CENTER;
            let r = q.length() / DISK_RADIUS;
            let theta = q.y.atan2(q.x);
            (bessel_j0(k * r) * (m * theta).cos() - bessel_j1(k * r) * (n * theta).cos()).abs()
        }
        Shape::Square => sinusoid_pair(point, m, n).abs(),
        Shape::Triangle => {
            let q = point - PLATE_CENTER;
            let [a, b, c] = [0.0, TAU / 3.0, 2.0 * TAU / 3.0]
                .map(|angle| sinusoid_product(Vec2::from_angle(angle).rotate(q) * 2.0, m, n));
            (a + b - c).abs()
        }
    }
}

fn sinusoid_product(p: Vec2, m: f32, n: f32) -> f32 {
    (m * PI * p.x).sin() * (n * PI * p.y).sin()
}

fn sinusoid_pair(p: Vec2, m: f32, n: f32) -> f32 {
    sinusoid_product(p, m, n) + sinusoid_product(p, n, m)
}

fn two_mode(point: Vec2, (n, m): (f32, f32), frequency: f32) -> f32 {
    let f = frequency / TWO_MODE_REFERENCE_HZ;
    sinusoid_pair(point * f, n, m).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fluid_params(shape: Shape, damping: f32) -> FieldParams {
        let mut params = SimulationParams::default();
        params.set_shape(shape);
        params.set_damping(damping);
        FieldParams::at_rest(&params)
    }

    fn model_params(model: FieldModel, shape: Shape, frequency: f32) -> FieldParams {
        let mut params = SimulationParams::default();
        params.set_model(model);
        params.set_shape(shape);
        params.set_frequency(frequency);
        FieldParams::at_rest(&params)
    }

    #[test]
    fn circular_fluid_surface_is_flat_at_time_zero() {
        let field = fluid_params(Shape::Disk, 0.1);
        // Opposite wave directions cancel pairwise before any phase advance.
        assert!(evaluate(Vec2::new(0.5, 0.5), 0.0, &field).abs() < 1.0e-4);
        assert!(evaluate(Vec2::new(0.2, 0.7), 0.0, &field).abs() < 1.0e-4);
    }

    #[test]
    fn fluid_surface_matches_documented_formula() {
        let field = fluid_params(Shape::Square, 0.25);
        let point = Vec2::new(0.3, 0.6);
        let time = 0.4;

        let f = 1_000_000.0 * WAVE_FREQUENCY_SCALE;
        let k = f.sqrt() * (tanh_approx(0.01 * f.sqrt()) / 0.01).sqrt();
        let fold = |k_vec: Vec2| {
            let mut p = point;
            let mut acc = 0.0;
            for _ in 0..4 {
                acc += (k_vec.dot(p) - time * f).sin();
                p = (Vec2::ONE - p).abs();
            }
            acc / 4.0
        };
        let expected = (fold(Vec2::new(k, 0.0)) + fold(Vec2::from_angle(FRAC_PI_2) * k)) / 2.0
            * (-0.25_f32 * time).exp();

        assert!((evaluate(point, time, &field) - expected).abs() < 1.0e-5);
    }

    #[test]
    fn damping_strictly_reduces_magnitude() {
        let time = 0.37;
        let candidates = [
            Vec2::new(0.31, 0.62),
            Vec2::new(0.12, 0.44),
            Vec2::new(0.73, 0.21),
            Vec2::new(0.55, 0.83),
        ];
        for shape in Shape::ALL {
            let point = candidates
                .into_iter()
                .find(|p| evaluate(*p, time, &fluid_params(shape, 0.0)).abs() > 1.0e-3)
                .expect("some candidate point has a nonzero field");

            let mut previous = f32::INFINITY;
            for damping in [0.0, 0.2, 0.5, 0.8, 1.0] {
                let value = evaluate(point, time, &fluid_params(shape, damping)).abs();
                assert!(value < previous, "{shape:?} damping {damping}");
                previous = value;
            }
        }
    }

    #[test]
    fn tanh_approximation_is_bounded() {
        assert_eq!(tanh_approx(0.0), 0.0);
        assert!((tanh_approx(0.5) - 0.5_f32.tanh()).abs() < 1.0e-2);
        assert_eq!(tanh_approx(50.0), 1.0);
        assert_eq!(tanh_approx(-50.0), -1.0);
    }

    #[test]
    fn chladni_disk_center_is_an_antinode() {
        let field = model_params(FieldModel::Chladni, Shape::Disk, 440.0);
        assert!((evaluate(PLATE_CENTER, 0.0, &field) - 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn chladni_square_vanishes_on_edges() {
        let field = model_params(FieldModel::Chladni, Shape::Square, 700.0);
        assert_eq!(evaluate(Vec2::new(0.0, 0.3), 0.0, &field), 0.0);
        assert_eq!(evaluate(Vec2::new(0.6, 0.0), 0.0, &field), 0.0);
    }

    #[test]
    fn chladni_ignores_time() {
        let field = model_params(FieldModel::Chladni, Shape::Triangle, 1200.0);
        let p = Vec2::new(0.4, 0.35);
        assert_eq!(evaluate(p, 0.0, &field), evaluate(p, 9.0, &field));
    }

    #[test]
    fn chladni_values_are_non_negative() {
        for shape in Shape::ALL {
            let field = model_params(FieldModel::Chladni, shape, 950.0);
            for i in 0..20 {
                let p = Vec2::new(i as f32 / 19.0, 1.0 - i as f32 / 23.0);
                assert!(evaluate(p, 0.0, &field) >= 0.0);
            }
        }
    }

    #[test]
    fn two_mode_blends_pattern_evaluations() {
        let base = model_params(FieldModel::TwoMode, Shape::Square, 200.0);
        let p = Vec2::new(0.37, 0.81);

        let start = base.with_glide(200.0, 400.0, 0.0);
        let middle = base.with_glide(200.0, 400.0, 0.5);
        let end = base.with_glide(200.0, 400.0, 1.0);

        let from = two_mode(p, TWO_MODE_PAIRS[0], 200.0);
        let to = two_mode(p, TWO_MODE_PAIRS[0], 400.0);

        assert_eq!(evaluate(p, 0.0, &start), from);
        assert!((evaluate(p, 0.0, &middle) - 0.5 * (from + to)).abs() < 1.0e-6);
        assert_eq!(evaluate(p, 0.0, &end), to);
    }

    #[test]
    fn mode_index_selects_pair() {
        let mut params = SimulationParams::default();
        params.set_model(FieldModel::TwoMode);
        params.set_mode_index(2);
        let field = FieldParams::at_rest(&params);
        let p = Vec2::new(0.21, 0.64);
        assert_eq!(evaluate(p, 0.0, &field), two_mode(p, (4.0, 3.0), 200.0));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let field = fluid_params(Shape::Triangle, 0.3);
        let p = Vec2::new(0.42, 0.58);
        let first = evaluate(p, 1.25, &field);
        for _ in 0..10 {
            assert_eq!(evaluate(p, 1.25, &field), first);
        }
    }

    #[test]
    fn gradient_points_uphill() {
        let field = model_params(FieldModel::TwoMode, Shape::Square, 100.0);
        // |sin(2πx)sin(πy) + sin(πx)sin(2πy)| rises moving right from x = 0.1
        // along y = 0.25.
        let (value, grad) = gradient(Vec2::new(0.1, 0.25), 0.0, &field, 1.0e-3);
        assert!(value > 0.0);
        assert!(grad.x > 0.0);
    }

    #[test]
    fn glide_moves_effective_frequency() {
        let field =
            model_params(FieldModel::Chladni, Shape::Disk, 440.0).with_glide(400.0, 800.0, 0.25);
        assert!((field.effective_frequency() - 500.0).abs() < 1.0e-3);
    }
}
