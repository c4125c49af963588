//! Fixed-sweep relaxation and implicit diffusion
//!
//! Both the diffusion solve and the pressure solve are fixed-iteration
//! Gauss-Seidel relaxations: each sweep updates samples in place, reusing
//! already-updated neighbors within the same sweep, then re-derives the
//! boundary. The sweep count is a stability/performance budget, not a
//! convergence check; results are bounded-accuracy approximations.

use super::boundary::{enforce, FieldKind};
use crate::grid::ScalarField;

/// Relax `value` toward the solution of
/// `value[i,j] = (rhs[i,j] + a * sum4(value)) / denom` over the interior,
/// enforcing `kind` boundaries after every sweep.
pub fn relax(
    value: &mut ScalarField,
    rhs: &ScalarField,
    a: f32,
    denom: f32,
    kind: FieldKind,
    sweeps: u32,
) {
    debug_assert!(denom > 0.0, "relaxation denominator must stay positive");
    let w = value.space().width();
    let h = value.space().height();
    let inv_denom = 1.0 / denom;

    for _ in 0..sweeps {
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let neighbors = value.get(x + 1, y)
                    + value.get(x - 1, y)
                    + value.get(x, y + 1)
                    + value.get(x, y - 1);
                value.set(x, y, (rhs.get(x, y) + a * neighbors) * inv_denom);
            }
        }
        enforce(value, kind);
    }
}

/// Implicit diffusion: solves `(I - rate*dt*laplacian) value = value0`.
///
/// `value` is zeroed before sweeping; with `a = rate * dt` the update
/// denominator `1 + 4a` stays at least 1 for any non-negative rate, so the
/// solve is unconditionally stable for any time step. A rate of zero leaves
/// the interior equal to `value0` after the first sweep.
pub fn diffuse(
    value: &mut ScalarField,
    value0: &ScalarField,
    rate: f32,
    dt: f32,
    kind: FieldKind,
    sweeps: u32,
) {
    value.fill(0.0);
    let a = rate * dt;
    relax(value, value0, a, 1.0 + 4.0 * a, kind, sweeps);
}
