//! Staggered-grid (MAC) stepper
//!
//! Scalars live at cell centers; the x velocity component lives on vertical
//! cell faces ((cells+1) x cells samples), the y component on horizontal
//! faces (cells x (cells+1)). Face storage makes the divergence a direct
//! one-cell difference and removes the pressure-velocity decoupling of the
//! collocated layout, at the cost of cross-component interpolation during
//! velocity advection: advecting one component requires the other
//! component's value at a location where it is never stored.

use super::advect::{advect, SampleBounds};
use super::boundary::{enforce, FieldKind};
use super::project::project_staggered;
use super::relax::diffuse;
use super::SolverConfig;
use crate::grid::{IndexSpace, ScalarField, Vec2};
use crate::FluidSolver;
use std::mem;
use tracing::{debug, info};

/// y velocity synthesized at x-face `(x, y)` from its four nearest y faces.
///
/// Valid for interior x faces (`1 <= x <= cells_x - 1`). A wrong neighbor
/// set here does not fault; it silently skews every backward trace.
#[inline]
fn y_velocity_at_x_face(vy: &ScalarField, x: usize, y: usize) -> f32 {
    0.25 * (vy.get(x - 1, y) + vy.get(x - 1, y + 1) + vy.get(x, y) + vy.get(x, y + 1))
}

/// x velocity synthesized at y-face `(x, y)` from its four nearest x faces.
#[inline]
fn x_velocity_at_y_face(vx: &ScalarField, x: usize, y: usize) -> f32 {
    0.25 * (vx.get(x, y - 1) + vx.get(x + 1, y - 1) + vx.get(x, y) + vx.get(x + 1, y))
}

/// Stable-fluids solver on a staggered (MAC) grid.
///
/// `width`/`height` count cells; the face arrays extend one sample further
/// along their own axis.
pub struct StaggeredSolver {
    cells: IndexSpace,

    vx: ScalarField,
    vy: ScalarField,
    vx0: ScalarField,
    vy0: ScalarField,
    density: ScalarField,
    density0: ScalarField,

    pressure: ScalarField,
    divergence: ScalarField,

    config: SolverConfig,
    running: bool,
}

impl StaggeredSolver {
    /// Allocate a solver for a `width x height` cell grid.
    ///
    /// # Panics
    ///
    /// Panics if either extent is below 3.
    #[must_use]
    pub fn new(width: usize, height: usize, config: SolverConfig) -> Self {
        let cells = IndexSpace::cell_centered(width, height);
        let x_faces = IndexSpace::new(width + 1, height, Vec2::new(0.0, 0.5));
        let y_faces = IndexSpace::new(width, height + 1, Vec2::new(0.5, 0.0));
        info!("staggered solver initialized: {}x{} cells", width, height);
        Self {
            cells,
            vx: ScalarField::new(x_faces),
            vy: ScalarField::new(y_faces),
            vx0: ScalarField::new(x_faces),
            vy0: ScalarField::new(y_faces),
            density: ScalarField::new(cells),
            density0: ScalarField::new(cells),
            pressure: ScalarField::new(cells),
            divergence: ScalarField::new(cells),
            config,
            running: true,
        }
    }

    /// Committed x velocity component on the x-face space.
    #[must_use]
    pub fn velocity_x(&self) -> &ScalarField {
        &self.vx
    }

    /// Committed y velocity component on the y-face space.
    #[must_use]
    pub fn velocity_y(&self) -> &ScalarField {
        &self.vy
    }

    fn assert_interior(&self, x: usize, y: usize) {
        assert!(
            x >= 1 && x < self.cells.width() - 1 && y >= 1 && y < self.cells.height() - 1,
            "deposit target ({x}, {y}) is not an interior cell"
        );
    }

    fn merge_velocity_sources(&mut self) {
        for (v, v0) in self.vx.as_mut_slice().iter_mut().zip(self.vx0.as_slice()) {
            *v += *v0;
        }
        for (v, v0) in self.vy.as_mut_slice().iter_mut().zip(self.vy0.as_slice()) {
            *v += *v0;
        }
        enforce(&mut self.vx, FieldKind::VelocityX);
        enforce(&mut self.vy, FieldKind::VelocityY);
    }

    fn merge_density_sources(&mut self) {
        for (d, d0) in self
            .density
            .as_mut_slice()
            .iter_mut()
            .zip(self.density0.as_slice())
        {
            *d += *d0;
        }
        enforce(&mut self.density, FieldKind::Scalar);
    }

    fn advect_velocity(&mut self) {
        let dt = self.config.time_step;
        let w = self.cells.width() as f32;
        let h = self.cells.height() as f32;
        let (vx0, vy0) = (&self.vx0, &self.vy0);

        // Each face family clamps to its own inset: half a cell along its
        // storage axis, a full cell along the other
        let bounds_x = SampleBounds::new(Vec2::new(0.5, 1.0), Vec2::new(w - 0.5, h - 1.0));
        advect(&mut self.vx, vx0, dt, bounds_x, FieldKind::VelocityX, |x, y| {
            Vec2::new(vx0.get(x, y), y_velocity_at_x_face(vy0, x, y))
        });

        let bounds_y = SampleBounds::new(Vec2::new(1.0, 0.5), Vec2::new(w - 1.0, h - 0.5));
        advect(&mut self.vy, vy0, dt, bounds_y, FieldKind::VelocityY, |x, y| {
            Vec2::new(x_velocity_at_y_face(vx0, x, y), vy0.get(x, y))
        });
    }

    fn project(&mut self) {
        project_staggered(
            &mut self.vx,
            &mut self.vy,
            &mut self.pressure,
            &mut self.divergence,
            self.config.relax_sweeps,
        );
    }
}

impl FluidSolver for StaggeredSolver {
    fn dimensions(&self) -> (usize, usize) {
        (self.cells.width(), self.cells.height())
    }

    fn reset(&mut self) {
        self.vx.fill(0.0);
        self.vy.fill(0.0);
        self.vx0.fill(0.0);
        self.vy0.fill(0.0);
        self.density.fill(0.0);
        self.density0.fill(0.0);
        self.pressure.fill(0.0);
        self.divergence.fill(0.0);
    }

    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn clear_staging(&mut self) {
        self.vx0.fill(0.0);
        self.vy0.fill(0.0);
        self.density0.fill(0.0);
    }

    fn deposit_velocity_force(&mut self, x: usize, y: usize, dvx: f32, dvy: f32) {
        self.assert_interior(x, y);
        // A cell force lands on both of its faces per axis
        self.vx0.add(x, y, dvx);
        self.vx0.add(x + 1, y, dvx);
        self.vy0.add(x, y, dvy);
        self.vy0.add(x, y + 1, dvy);
    }

    fn deposit_density_source(&mut self, x: usize, y: usize, amount: f32) {
        self.assert_interior(x, y);
        self.density0.add(x, y, amount);
    }

    fn step_velocity(&mut self) {
        if !self.running {
            return;
        }
        let dt = self.config.time_step;
        let sweeps = self.config.relax_sweeps;
        debug!("staggered velocity step: dt={dt}");

        self.merge_velocity_sources();
        self.project();

        if self.config.viscosity > 0.0 {
            mem::swap(&mut self.vx, &mut self.vx0);
            mem::swap(&mut self.vy, &mut self.vy0);
            diffuse(
                &mut self.vx,
                &self.vx0,
                self.config.viscosity,
                dt,
                FieldKind::VelocityX,
                sweeps,
            );
            diffuse(
                &mut self.vy,
                &self.vy0,
                self.config.viscosity,
                dt,
                FieldKind::VelocityY,
                sweeps,
            );
        }

        mem::swap(&mut self.vx, &mut self.vx0);
        mem::swap(&mut self.vy, &mut self.vy0);
        self.advect_velocity();

        self.project();
    }

    fn step_density(&mut self) {
        if !self.running {
            return;
        }
        let dt = self.config.time_step;
        let sweeps = self.config.relax_sweeps;

        self.merge_density_sources();

        if self.config.diffusivity > 0.0 {
            mem::swap(&mut self.density, &mut self.density0);
            diffuse(
                &mut self.density,
                &self.density0,
                self.config.diffusivity,
                dt,
                FieldKind::Scalar,
                sweeps,
            );
        }

        mem::swap(&mut self.density, &mut self.density0);
        let w = self.cells.width() as f32;
        let h = self.cells.height() as f32;
        let bounds = SampleBounds::new(Vec2::new(1.0, 1.0), Vec2::new(w - 1.0, h - 1.0));
        let (vx, vy) = (&self.vx, &self.vy);
        advect(
            &mut self.density,
            &self.density0,
            dt,
            bounds,
            FieldKind::Scalar,
            |x, y| {
                Vec2::new(
                    0.5 * (vx.get(x, y) + vx.get(x + 1, y)),
                    0.5 * (vy.get(x, y) + vy.get(x, y + 1)),
                )
            },
        );
    }

    fn density(&self) -> &ScalarField {
        &self.density
    }

    fn cell_velocity(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            0.5 * (self.vx.get(x, y) + self.vx.get(x + 1, y)),
            0.5 * (self.vy.get(x, y) + self.vy.get(x, y + 1)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn max_face_divergence(solver: &StaggeredSolver) -> f32 {
        let vx = solver.velocity_x();
        let vy = solver.velocity_y();
        let (w, h) = solver.dimensions();
        let mut max_div = 0.0_f32;
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let div = (vx.get(x + 1, y) - vx.get(x, y))
                    + (vy.get(x, y + 1) - vy.get(x, y));
                max_div = max_div.max(div.abs());
            }
        }
        max_div
    }

    #[test]
    fn test_cross_component_averages_match_linear_field() {
        // On a field linear in position, the four-face average must equal
        // the analytic value at the target face position.
        let cells = 16_usize;
        let y_faces = IndexSpace::new(cells, cells + 1, Vec2::new(0.5, 0.0));
        let mut vy = ScalarField::new(y_faces);
        for y in 0..cells + 1 {
            for x in 0..cells {
                let pos = y_faces.position(x, y);
                vy.set(x, y, 2.0 * pos.x + 3.0 * pos.y);
            }
        }
        // x-face (5, 7) sits at position (5.0, 7.5)
        let synthesized = y_velocity_at_x_face(&vy, 5, 7);
        assert_relative_eq!(synthesized, 2.0 * 5.0 + 3.0 * 7.5, epsilon = 1e-4);

        let x_faces = IndexSpace::new(cells + 1, cells, Vec2::new(0.0, 0.5));
        let mut vx = ScalarField::new(x_faces);
        for y in 0..cells {
            for x in 0..cells + 1 {
                let pos = x_faces.position(x, y);
                vx.set(x, y, -1.0 * pos.x + 4.0 * pos.y);
            }
        }
        // y-face (5, 7) sits at position (5.5, 7.0)
        let synthesized = x_velocity_at_y_face(&vx, 5, 7);
        assert_relative_eq!(synthesized, -5.5 + 4.0 * 7.0, epsilon = 1e-4);
    }

    #[test]
    fn test_single_impulse_survives_zero_motion_step() {
        let mut solver = StaggeredSolver::new(128, 128, SolverConfig::default());
        solver.clear_staging();
        solver.deposit_density_source(64, 64, 10.0);
        solver.step_velocity();
        solver.step_density();

        assert_relative_eq!(solver.density().sum(), 10.0, epsilon = 1e-3);
        assert_relative_eq!(solver.density().get(64, 64), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_velocity_deposit_lands_on_both_faces() {
        let mut solver = StaggeredSolver::new(32, 32, SolverConfig::default());
        solver.clear_staging();
        solver.deposit_velocity_force(10, 10, 0.5, -0.25);
        assert_eq!(solver.vx0.get(10, 10), 0.5);
        assert_eq!(solver.vx0.get(11, 10), 0.5);
        assert_eq!(solver.vy0.get(10, 10), -0.25);
        assert_eq!(solver.vy0.get(10, 11), -0.25);
    }

    #[test]
    fn test_velocity_step_yields_low_face_divergence() {
        let mut solver = StaggeredSolver::new(128, 128, SolverConfig::default());
        solver.clear_staging();
        solver.deposit_velocity_force(64, 64, 0.02, 0.01);
        solver.step_velocity();
        let max_div = max_face_divergence(&solver);
        assert!(max_div < 1e-3, "post-step divergence too high: {max_div}");
    }

    #[test]
    fn test_cell_velocity_averages_faces() {
        let mut solver = StaggeredSolver::new(16, 16, SolverConfig::default());
        solver.vx.set(5, 5, 1.0);
        solver.vx.set(6, 5, 3.0);
        solver.vy.set(5, 5, -1.0);
        solver.vy.set(5, 6, 1.0);
        let vel = solver.cell_velocity(5, 5);
        assert_relative_eq!(vel.x, 2.0);
        assert_relative_eq!(vel.y, 0.0);
    }

    #[test]
    fn test_stopped_solver_steps_are_no_ops() {
        let mut solver = StaggeredSolver::new(32, 32, SolverConfig::default());
        solver.clear_staging();
        solver.deposit_density_source(16, 16, 5.0);
        solver.stop();
        solver.step_density();
        assert_eq!(solver.density().sum(), 0.0);
    }
}
