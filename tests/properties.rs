//! Property-based checks of the plate geometry, the field models and the
//! particle ensemble:
//! - containment agrees with a direct geometric test for disk and square
//! - boundary projection lands inside and leaves inside points alone
//! - field evaluation is a pure function
//! - stepping never loses particles or lets one escape

use cymatic_simulator::field::{evaluate, FieldParams, FrameSnapshot};
use cymatic_simulator::particles::ParticleSystem;
use cymatic_simulator::types::{FieldModel, Shape, SimulationParams};
use glam::Vec2;
use proptest::prelude::*;

const STEPS: usize = 8;
const DT: f32 = 1.0 / 60.0;

fn any_shape() -> impl Strategy<Value = Shape> {
    prop::sample::select(Shape::ALL.to_vec())
}

fn any_model() -> impl Strategy<Value = FieldModel> {
    prop::sample::select(FieldModel::ALL.to_vec())
}

/// Points on and well around the plate.
fn plate_point() -> impl Strategy<Value = Vec2> {
    (-1.5f32..2.5, -1.5f32..2.5).prop_map(|(x, y)| Vec2::new(x, y))
}

fn frame(model: FieldModel, shape: Shape, frequency_t: f32, time: f32) -> FrameSnapshot {
    let mut params = SimulationParams::default();
    params.set_model(model);
    params.set_shape(shape);
    let range = model.frequency_range();
    params.set_frequency(range.start() + (range.end() - range.start()) * frequency_t);
    FrameSnapshot {
        params,
        field: FieldParams::at_rest(&params),
        time,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn disk_containment_matches_distance(p in plate_point()) {
        prop_assert_eq!(Shape::Disk.contains(p), p.distance(Vec2::splat(0.5)) <= 0.5);
    }

    #[test]
    fn square_containment_matches_bounds(p in plate_point()) {
        let inside = p.x >= 0.0 && p.x <= 1.0 && p.y >= 0.0 && p.y <= 1.0;
        prop_assert_eq!(Shape::Square.contains(p), inside);
    }

    #[test]
    fn square_rejects_points_just_past_an_edge(t in 0.0f32..=1.0, past in 1.0e-6f32..1.0e-4) {
        for p in [
            Vec2::new(1.0 + past, t),
            Vec2::new(-past, t),
            Vec2::new(t, 1.0 + past),
            Vec2::new(t, -past),
        ] {
            prop_assert!(!Shape::Square.contains(p));
            let projected = Shape::Square.nearest_boundary_point(p);
            prop_assert!(projected.cmpge(Vec2::ZERO).all() && projected.cmple(Vec2::ONE).all());
        }
    }

    #[test]
    fn projection_lands_inside(shape in any_shape(), p in plate_point()) {
        let projected = shape.nearest_boundary_point(p);
        prop_assert!(shape.contains(projected), "{:?} projected {} to {}", shape, p, projected);
    }

    #[test]
    fn projection_is_idempotent(shape in any_shape(), p in plate_point()) {
        let once = shape.nearest_boundary_point(p);
        prop_assert_eq!(shape.nearest_boundary_point(once), once);
        if shape.contains(p) {
            prop_assert_eq!(once, p);
        }
    }

    #[test]
    fn evaluation_is_pure(
        model in any_model(),
        shape in any_shape(),
        frequency_t in 0.0f32..1.0,
        time in 0.0f32..10.0,
        p in plate_point(),
    ) {
        let snapshot = frame(model, shape, frequency_t, time);
        let first = evaluate(p, time, &snapshot.field);
        let second = evaluate(p, time, &snapshot.field);
        prop_assert!(first.is_finite());
        prop_assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn stepping_conserves_and_contains_particles(
        model in any_model(),
        shape in any_shape(),
        frequency_t in 0.0f32..1.0,
        count in 1usize..400,
        seed in any::<u64>(),
    ) {
        let mut system = ParticleSystem::seed(count, shape, seed);
        for step in 0..STEPS {
            let snapshot = frame(model, shape, frequency_t, step as f32 * DT);
            system.step(&snapshot, DT);
        }

        prop_assert_eq!(system.len(), count);
        for particle in system.particles() {
            prop_assert!(particle.position.is_finite());
            prop_assert!(particle.velocity.is_finite());
            prop_assert!(shape.contains(particle.position), "escaped to {}", particle.position);
        }
    }
}
