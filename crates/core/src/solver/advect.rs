//! Semi-Lagrangian advection
//!
//! Each interior sample traces backward along the velocity field to its
//! departure point, clamps that point into the valid sampling rectangle, and
//! bilinearly interpolates the previous field there. Tracing backward makes
//! the scheme unconditionally stable: the lookup is always an interpolation
//! of defined samples, never an extrapolation.
//!
//! The kernel is generic over the target space and over how velocity is
//! sampled at a node, which is where the layouts differ: collocated fields
//! read both components at the same slot, staggered face advection has to
//! synthesize the other component by averaging its four nearest faces.

use super::boundary::{enforce, FieldKind};
use crate::grid::{ScalarField, Vec2};

/// Valid sampling rectangle for backward-traced positions.
///
/// Inset far enough from the outer boundary that the interpolation quad of
/// four defined samples always exists in the source field's space.
#[derive(Debug, Clone, Copy)]
pub struct SampleBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl SampleBounds {
    #[must_use]
    pub fn new(min: Vec2, max: Vec2) -> Self {
        debug_assert!(min.x <= max.x && min.y <= max.y);
        Self { min, max }
    }

    /// Clamp a traced position into the rectangle.
    #[inline]
    #[must_use]
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        Vec2::new(
            pos.x.clamp(self.min.x, self.max.x),
            pos.y.clamp(self.min.y, self.max.y),
        )
    }
}

/// Advect `value0` into `value` by `velocity_at`, then enforce boundaries.
///
/// `velocity_at` returns the velocity at a target-space node `(x, y)`;
/// `value` and `value0` share a space, which may differ from the space the
/// velocity lives on. `dt` is the time step of the backward trace.
pub fn advect<F>(
    value: &mut ScalarField,
    value0: &ScalarField,
    dt: f32,
    bounds: SampleBounds,
    kind: FieldKind,
    velocity_at: F,
) where
    F: Fn(usize, usize) -> Vec2,
{
    debug_assert!(value.space() == value0.space());
    let space = value.space();
    let w = space.width();
    let h = space.height();

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let vel = velocity_at(x, y);
            let departure = bounds.clamp(space.position(x, y) - vel * dt);
            value.set(x, y, value0.sample_bilinear(departure));
        }
    }
    enforce(value, kind);
}
