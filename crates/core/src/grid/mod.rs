//! Grid layouts and field storage
//!
//! A solver variant is defined by the index spaces its fields live on. The
//! collocated layout keeps every field on one cell-centered space; the
//! staggered (MAC) layout stores the x velocity component on vertical cell
//! faces and the y component on horizontal faces, with scalars at cell
//! centers. All index arithmetic goes through [`IndexSpace`]; no other
//! module is allowed to assume row-major storage or sample offsets.

mod field;
mod space;

pub use field::ScalarField;
pub use space::IndexSpace;

use nalgebra::Vector2;

/// 2D vector type for sample positions, velocities, and forces.
///
/// This is a simple alias for `nalgebra::Vector2<f32>`, used throughout
/// the solver for grid-space coordinates and velocity samples.
pub type Vec2 = Vector2<f32>;
