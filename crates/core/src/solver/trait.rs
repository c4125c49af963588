//! Fluid solver trait definition
//!
//! This module defines the [`FluidSolver`] trait, the layout-agnostic
//! surface consumed by rendering/input frontends. All three variant
//! steppers implement it; frontends deposit forces into staging buffers,
//! advance the pipelines once per frame, and read the committed fields back
//! for visualization. Returned views must not be treated as mutable state;
//! live fields are owned exclusively by the solver.

use crate::grid::{ScalarField, Vec2};

/// Layout-agnostic interface to one solver instance.
pub trait FluidSolver: Send + Sync {
    /// Grid extent in cells along x and y.
    fn dimensions(&self) -> (usize, usize);

    /// Zero every live field without reallocating. Texture coordinates, if
    /// present, return to the identity mapping.
    fn reset(&mut self);

    /// Resume stepping.
    fn start(&mut self);

    /// Pause stepping; subsequent `step_*` calls return without touching
    /// any buffer.
    fn stop(&mut self);

    /// Whether `step_*` calls currently advance the simulation.
    fn is_running(&self) -> bool;

    /// Zero all force/source staging buffers. Call once per frame before
    /// collecting input.
    fn clear_staging(&mut self);

    /// Accumulate a velocity force at an interior cell.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is not an interior cell.
    fn deposit_velocity_force(&mut self, x: usize, y: usize, dvx: f32, dvy: f32);

    /// Accumulate a density source at an interior cell.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is not an interior cell.
    fn deposit_density_source(&mut self, x: usize, y: usize, amount: f32);

    /// Advance the velocity pipeline by one time step.
    fn step_velocity(&mut self);

    /// Advance the density pipeline by one time step.
    fn step_density(&mut self);

    /// Advance the auxiliary texture-coordinate pipeline, where the variant
    /// has one. The default is a no-op; see [`FluidSolver::has_texture`].
    fn step_texture(&mut self) {}

    /// Whether this variant carries advected texture coordinates.
    fn has_texture(&self) -> bool {
        false
    }

    /// Committed density field.
    fn density(&self) -> &ScalarField;

    /// Velocity at the center of cell `(x, y)`: the direct sample on the
    /// collocated layouts, the mean of the bracketing faces on the
    /// staggered layout.
    fn cell_velocity(&self, x: usize, y: usize) -> Vec2;

    /// Density at cell corner `(x, y)`, the average of the four adjoining
    /// cells; smooth sampling for renderers drawing corner-aligned quads.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is 0 or past the last cell.
    fn vertex_density(&self, x: usize, y: usize) -> f32 {
        let d = self.density();
        0.25 * (d.get(x - 1, y - 1) + d.get(x, y - 1) + d.get(x - 1, y) + d.get(x, y))
    }
}
