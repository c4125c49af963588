//! Incompressibility projection
//!
//! Removes the divergent part of the velocity field: compute the discrete
//! divergence, solve the Poisson equation `laplacian p = div` with the same
//! fixed-sweep relaxation used everywhere else (`a = 1`, denominator 4),
//! subtract the pressure gradient, and re-derive velocity boundaries. The
//! stencils differ per layout: collocated fields use half central
//! differences, staggered faces are already unit-spaced from their neighbor
//! cells and use direct one-cell differences.

use super::boundary::{enforce, FieldKind};
use crate::grid::ScalarField;

/// Pressure solve shared by both layouts: `p = (sum4(p) - div) / 4` swept a
/// fixed number of times with scalar boundaries re-derived after each sweep.
fn solve_pressure(pressure: &mut ScalarField, divergence: &ScalarField, sweeps: u32) {
    let w = pressure.space().width();
    let h = pressure.space().height();

    for _ in 0..sweeps {
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let neighbors = pressure.get(x + 1, y)
                    + pressure.get(x - 1, y)
                    + pressure.get(x, y + 1)
                    + pressure.get(x, y - 1);
                pressure.set(x, y, (neighbors - divergence.get(x, y)) / 4.0);
            }
        }
        enforce(pressure, FieldKind::Scalar);
    }
}

/// Project a collocated velocity field to divergence-free.
pub fn project_collocated(
    vx: &mut ScalarField,
    vy: &mut ScalarField,
    pressure: &mut ScalarField,
    divergence: &mut ScalarField,
    sweeps: u32,
) {
    let w = vx.space().width();
    let h = vx.space().height();

    // Divergence by half central differences; pressure cleared for the solve
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let div = 0.5
                * ((vx.get(x + 1, y) - vx.get(x - 1, y))
                    + (vy.get(x, y + 1) - vy.get(x, y - 1)));
            divergence.set(x, y, div);
            pressure.set(x, y, 0.0);
        }
    }
    enforce(divergence, FieldKind::Scalar);
    enforce(pressure, FieldKind::Scalar);

    solve_pressure(pressure, divergence, sweeps);

    // Subtract the pressure gradient
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            vx.add(x, y, -0.5 * (pressure.get(x + 1, y) - pressure.get(x - 1, y)));
            vy.add(x, y, -0.5 * (pressure.get(x, y + 1) - pressure.get(x, y - 1)));
        }
    }
    enforce(vx, FieldKind::VelocityX);
    enforce(vy, FieldKind::VelocityY);
}

/// Project a staggered (MAC) velocity field to divergence-free.
///
/// `pressure` and `divergence` live on the cell space; `vx`/`vy` on their
/// face spaces.
pub fn project_staggered(
    vx: &mut ScalarField,
    vy: &mut ScalarField,
    pressure: &mut ScalarField,
    divergence: &mut ScalarField,
    sweeps: u32,
) {
    let cw = pressure.space().width();
    let ch = pressure.space().height();

    // Face differences: faces sit half a cell either side of the center, so
    // no half factor appears
    for y in 1..ch - 1 {
        for x in 1..cw - 1 {
            let div =
                (vx.get(x + 1, y) - vx.get(x, y)) + (vy.get(x, y + 1) - vy.get(x, y));
            divergence.set(x, y, div);
            pressure.set(x, y, 0.0);
        }
    }
    enforce(divergence, FieldKind::Scalar);
    enforce(pressure, FieldKind::Scalar);

    solve_pressure(pressure, divergence, sweeps);

    // Each interior face subtracts the difference of its two bracketing cells
    let fw = vx.space().width();
    let fh = vx.space().height();
    for y in 1..fh - 1 {
        for x in 1..fw - 1 {
            vx.add(x, y, -(pressure.get(x, y) - pressure.get(x - 1, y)));
        }
    }
    let fw = vy.space().width();
    let fh = vy.space().height();
    for y in 1..fh - 1 {
        for x in 1..fw - 1 {
            vy.add(x, y, -(pressure.get(x, y) - pressure.get(x, y - 1)));
        }
    }
    enforce(vx, FieldKind::VelocityX);
    enforce(vy, FieldKind::VelocityY);
}
