//! Boundary-condition enforcement
//!
//! All four domain edges are solid no-flux walls. The velocity component
//! normal to a wall reflects with a sign flip (`boundary = -first interior`),
//! which pins the wall-normal flow to zero halfway between the two samples;
//! scalars and the tangential velocity component copy the first interior
//! value (Neumann). Corners take the average of their two adjacent edge
//! samples.
//!
//! The same kernel serves every layout: collocated fields, staggered face
//! arrays, and cell scalars only differ in which space they hand in.
//! Enforcement must run after every operation that touches near-boundary
//! interior samples (each relaxation sweep, advection, source merge, and
//! gradient subtraction), or wall leakage builds up within a few steps.

use crate::grid::ScalarField;

/// Field kinds distinguishing boundary reflection rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Neumann on all four walls (density, pressure, divergence, texture
    /// coordinates).
    Scalar,
    /// x velocity component: normal to the left/right walls (sign flip),
    /// tangential to the top/bottom walls (copy).
    VelocityX,
    /// y velocity component: normal to the top/bottom walls (sign flip),
    /// tangential to the left/right walls (copy).
    VelocityY,
}

impl FieldKind {
    /// Reflection sign at the x-extreme columns.
    #[inline]
    fn x_wall_sign(self) -> f32 {
        match self {
            FieldKind::VelocityX => -1.0,
            FieldKind::Scalar | FieldKind::VelocityY => 1.0,
        }
    }

    /// Reflection sign at the y-extreme rows.
    #[inline]
    fn y_wall_sign(self) -> f32 {
        match self {
            FieldKind::VelocityY => -1.0,
            FieldKind::Scalar | FieldKind::VelocityX => 1.0,
        }
    }
}

/// Re-derive every boundary sample of `field` from its interior.
pub fn enforce(field: &mut ScalarField, kind: FieldKind) {
    let w = field.space().width();
    let h = field.space().height();
    let sx = kind.x_wall_sign();
    let sy = kind.y_wall_sign();

    for x in 1..w - 1 {
        field.set(x, 0, sy * field.get(x, 1));
        field.set(x, h - 1, sy * field.get(x, h - 2));
    }
    for y in 1..h - 1 {
        field.set(0, y, sx * field.get(1, y));
        field.set(w - 1, y, sx * field.get(w - 2, y));
    }

    // Corners: average of the two adjacent edge samples
    field.set(0, 0, 0.5 * (field.get(1, 0) + field.get(0, 1)));
    field.set(w - 1, 0, 0.5 * (field.get(w - 2, 0) + field.get(w - 1, 1)));
    field.set(0, h - 1, 0.5 * (field.get(1, h - 1) + field.get(0, h - 2)));
    field.set(
        w - 1,
        h - 1,
        0.5 * (field.get(w - 2, h - 1) + field.get(w - 1, h - 2)),
    );
}
