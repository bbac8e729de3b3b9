use glam::Vec2;

use crate::types::Shape;

pub const PLATE_CENTER: Vec2 = Vec2::new(0.5, 0.5);
pub const DISK_RADIUS: f32 = 0.5;
/// Slack on the triangle's rotated half-plane offsets, which pick up a few
/// ulps of rounding that the axis-aligned disk and square tests do not.
pub const TRIANGLE_TOLERANCE: f32 = 1.0e-6;
/// Projected points land this far inside curved or slanted edges.
const PROJECTION_INSET: f32 = 1.0e-6;

const TRIANGLE_HEIGHT: f32 = 0.866_025_4;
const SQRT_3: f32 = 1.732_050_8;
const SLANT_LIMIT: f32 = TRIANGLE_HEIGHT * 0.25;
const BASE_Y: f32 = -TRIANGLE_HEIGHT * 0.5;
const APEX_Y: f32 = TRIANGLE_HEIGHT * 0.5;
/// Outward unit normals of the left and right edges.
const LEFT_NORMAL: Vec2 = Vec2::new(-SQRT_3 * 0.5, 0.5);
const RIGHT_NORMAL: Vec2 = Vec2::new(SQRT_3 * 0.5, 0.5);

impl Shape {
    pub fn contains(self, point: Vec2) -> bool {
        match self {
            Shape::Disk => point.distance(PLATE_CENTER) <= DISK_RADIUS,
            Shape::Square => (0.0..=1.0).contains(&point.x) && (0.0..=1.0).contains(&point.y),
            Shape::Triangle => {
                let q = point - PLATE_CENTER;
                q.y >= BASE_Y - TRIANGLE_TOLERANCE
                    && LEFT_NORMAL.dot(q) <= SLANT_LIMIT + TRIANGLE_TOLERANCE
                    && RIGHT_NORMAL.dot(q) <= SLANT_LIMIT + TRIANGLE_TOLERANCE
            }
        }
    }

    /// Inside points are returned unchanged. The triangle projection is not
    /// a true nearest-point solve: it clamps the left edge, the right edge,
    /// the base, then the row span at the resulting height, in that order.
    /// The result is order dependent but always inside.
    pub fn nearest_boundary_point(self, point: Vec2) -> Vec2 {
        if self.contains(point) {
            return point;
        }
        if !point.is_finite() {
            return PLATE_CENTER;
        }

        match self {
            Shape::Disk => {
                let offset = point - PLATE_CENTER;
                PLATE_CENTER + offset * ((DISK_RADIUS - PROJECTION_INSET) / offset.length())
            }
            Shape::Square => point.clamp(Vec2::ZERO, Vec2::ONE),
            Shape::Triangle => PLATE_CENTER + clamp_into_triangle(point - PLATE_CENTER),
        }
    }

    pub fn bounding_box(self) -> (Vec2, Vec2) {
        match self {
            Shape::Disk | Shape::Square => (Vec2::ZERO, Vec2::ONE),
            Shape::Triangle => (
                Vec2::new(0.0, 0.5 + BASE_Y),
                Vec2::new(1.0, 0.5 + APEX_Y),
            ),
        }
    }
}

fn clamp_into_triangle(mut q: Vec2) -> Vec2 {
    for normal in [LEFT_NORMAL, RIGHT_NORMAL] {
        let excess = normal.dot(q) - SLANT_LIMIT;
        if excess > 0.0 {
            q -= normal * excess;
        }
    }

    q.y = q.y.clamp(BASE_Y + PROJECTION_INSET, APEX_Y - PROJECTION_INSET);

    let half_span = ((APEX_Y - q.y) / SQRT_3 - PROJECTION_INSET).max(0.0);
    q.x = q.x.clamp(-half_span, half_span);
    q
}
