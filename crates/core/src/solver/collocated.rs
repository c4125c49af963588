//! Collocated-grid stepper
//!
//! All fields share one cell-centered index space. Per velocity step:
//! merge staged forces, optional vorticity confinement, optional implicit
//! diffusion, projection, semi-Lagrangian self-advection, projection again.
//! The second projection removes the divergence the advection itself
//! introduces.

use super::advect::{advect, SampleBounds};
use super::boundary::{enforce, FieldKind};
use super::project::project_collocated;
use super::relax::diffuse;
use super::vorticity::VorticityConfiner;
use super::SolverConfig;
use crate::grid::{IndexSpace, ScalarField, Vec2};
use crate::FluidSolver;
use std::mem;
use tracing::{debug, info};

/// Stable-fluids solver on a collocated grid.
///
/// Owns every buffer it uses; external collaborators only write through the
/// staging deposits and read through the accessors. `width`/`height` count
/// samples including the derived boundary ring.
pub struct CollocatedSolver {
    space: IndexSpace,

    // Live fields and their staging/scratch partners (swapped, never copied)
    vx: ScalarField,
    vy: ScalarField,
    vx0: ScalarField,
    vy0: ScalarField,
    density: ScalarField,
    density0: ScalarField,

    // Projection scratch
    pressure: ScalarField,
    divergence: ScalarField,

    confiner: VorticityConfiner,
    config: SolverConfig,
    running: bool,
}

impl CollocatedSolver {
    /// Allocate a solver for a `width x height` grid. One-time setup;
    /// allocation failure aborts before any stepping can happen.
    ///
    /// # Panics
    ///
    /// Panics if either extent is below 3.
    #[must_use]
    pub fn new(width: usize, height: usize, config: SolverConfig) -> Self {
        let space = IndexSpace::cell_centered(width, height);
        info!("collocated solver initialized: {}x{} grid", width, height);
        Self {
            space,
            vx: ScalarField::new(space),
            vy: ScalarField::new(space),
            vx0: ScalarField::new(space),
            vy0: ScalarField::new(space),
            density: ScalarField::new(space),
            density0: ScalarField::new(space),
            pressure: ScalarField::new(space),
            divergence: ScalarField::new(space),
            confiner: VorticityConfiner::new(space),
            config,
            running: true,
        }
    }

    /// Committed x velocity component.
    #[must_use]
    pub fn velocity_x(&self) -> &ScalarField {
        &self.vx
    }

    /// Committed y velocity component.
    #[must_use]
    pub fn velocity_y(&self) -> &ScalarField {
        &self.vy
    }

    fn sample_bounds(&self) -> SampleBounds {
        let w = self.space.width() as f32;
        let h = self.space.height() as f32;
        SampleBounds::new(Vec2::new(1.0, 1.0), Vec2::new(w - 1.0, h - 1.0))
    }

    fn assert_interior(&self, x: usize, y: usize) {
        assert!(
            x >= 1 && x < self.space.width() - 1 && y >= 1 && y < self.space.height() - 1,
            "deposit target ({x}, {y}) is not an interior cell"
        );
    }

    fn merge_velocity_sources(&mut self) {
        let w = self.space.width();
        let h = self.space.height();
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                self.vx.add(x, y, self.vx0.get(x, y));
                self.vy.add(x, y, self.vy0.get(x, y));
            }
        }
        enforce(&mut self.vx, FieldKind::VelocityX);
        enforce(&mut self.vy, FieldKind::VelocityY);
    }

    fn merge_density_sources(&mut self) {
        let w = self.space.width();
        let h = self.space.height();
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                self.density.add(x, y, self.density0.get(x, y));
            }
        }
        enforce(&mut self.density, FieldKind::Scalar);
    }
}

impl FluidSolver for CollocatedSolver {
    fn dimensions(&self) -> (usize, usize) {
        (self.space.width(), self.space.height())
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
        self.vx0.add(x, y, dvx);
        self.vy0.add(x, y, dvy);
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
        debug!("collocated velocity step: dt={dt}");

        self.merge_velocity_sources();

        if self.config.vorticity_strength > 0.0 {
            self.confiner
                .apply(&mut self.vx, &mut self.vy, self.config.vorticity_strength);
        }

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

        project_collocated(
            &mut self.vx,
            &mut self.vy,
            &mut self.pressure,
            &mut self.divergence,
            sweeps,
        );

        // Self-advect by the pre-advection field
        mem::swap(&mut self.vx, &mut self.vx0);
        mem::swap(&mut self.vy, &mut self.vy0);
        let bounds = self.sample_bounds();
        let (vx0, vy0) = (&self.vx0, &self.vy0);
        advect(&mut self.vx, vx0, dt, bounds, FieldKind::VelocityX, |x, y| {
            Vec2::new(vx0.get(x, y), vy0.get(x, y))
        });
        advect(&mut self.vy, vy0, dt, bounds, FieldKind::VelocityY, |x, y| {
            Vec2::new(vx0.get(x, y), vy0.get(x, y))
        });

        project_collocated(
            &mut self.vx,
            &mut self.vy,
            &mut self.pressure,
            &mut self.divergence,
            sweeps,
        );
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
        let bounds = self.sample_bounds();
        let (vx, vy) = (&self.vx, &self.vy);
        advect(
            &mut self.density,
            &self.density0,
            dt,
            bounds,
            FieldKind::Scalar,
            |x, y| Vec2::new(vx.get(x, y), vy.get(x, y)),
        );
    }

    fn density(&self) -> &ScalarField {
        &self.density
    }

    fn cell_velocity(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(self.vx.get(x, y), self.vy.get(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_impulse_survives_zero_motion_step() {
        // 128x128, one density impulse, zero velocity, no diffusion: the
        // step must neither move nor lose the mass.
        let mut solver = CollocatedSolver::new(128, 128, SolverConfig::default());
        solver.clear_staging();
        solver.deposit_density_source(64, 64, 10.0);
        solver.step_velocity();
        solver.step_density();

        assert_relative_eq!(solver.density().sum(), 10.0, epsilon = 1e-3);
        assert_relative_eq!(solver.density().get(64, 64), 10.0, epsilon = 1e-4);
        assert_relative_eq!(solver.density().get(65, 64), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_density_conserved_across_repeated_steps() {
        let mut solver = CollocatedSolver::new(64, 64, SolverConfig::default());
        solver.clear_staging();
        solver.deposit_density_source(32, 32, 10.0);
        solver.step_density();
        for _ in 0..5 {
            solver.clear_staging();
            solver.step_velocity();
            solver.step_density();
        }
        assert_relative_eq!(solver.density().sum(), 10.0, epsilon = 1e-2);
    }

    #[test]
    fn test_velocity_step_yields_low_divergence() {
        let mut solver = CollocatedSolver::new(128, 128, SolverConfig::default());
        solver.clear_staging();
        solver.deposit_velocity_force(64, 64, 0.02, 0.01);
        solver.step_velocity();

        let vx = solver.velocity_x();
        let vy = solver.velocity_y();
        let mut max_div = 0.0_f32;
        for y in 1..127 {
            for x in 1..127 {
                let div = 0.5
                    * ((vx.get(x + 1, y) - vx.get(x - 1, y))
                        + (vy.get(x, y + 1) - vy.get(x, y - 1)));
                max_div = max_div.max(div.abs());
            }
        }
        assert!(max_div < 1e-3, "post-step divergence too high: {max_div}");
    }

    #[test]
    fn test_stopped_solver_steps_are_no_ops() {
        let mut solver = CollocatedSolver::new(32, 32, SolverConfig::default());
        solver.clear_staging();
        solver.deposit_density_source(16, 16, 5.0);
        solver.stop();
        assert!(!solver.is_running());

        solver.step_velocity();
        solver.step_density();
        assert_eq!(solver.density().sum(), 0.0);

        solver.start();
        solver.step_density();
        assert_relative_eq!(solver.density().sum(), 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_deposits_accumulate_until_cleared() {
        let mut solver = CollocatedSolver::new(32, 32, SolverConfig::default());
        solver.clear_staging();
        solver.deposit_density_source(16, 16, 2.0);
        solver.deposit_density_source(16, 16, 2.0);
        solver.step_density();
        assert_relative_eq!(solver.density().get(16, 16), 4.0, epsilon = 1e-5);

        // Staging is stale after the step; the next frame clears it
        solver.clear_staging();
        solver.step_density();
        assert_relative_eq!(solver.density().get(16, 16), 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_reset_zeroes_without_reallocating() {
        let mut solver = CollocatedSolver::new(32, 32, SolverConfig::default());
        solver.clear_staging();
        solver.deposit_density_source(10, 10, 3.0);
        solver.deposit_velocity_force(10, 10, 1.0, -1.0);
        solver.step_velocity();
        solver.step_density();

        solver.reset();
        assert_eq!(solver.density().sum(), 0.0);
        assert_eq!(solver.velocity_x().sum(), 0.0);
        assert_eq!(solver.velocity_y().sum(), 0.0);
        assert_eq!(solver.dimensions(), (32, 32));
    }

    #[test]
    fn test_vorticity_confinement_preserves_stability() {
        let config = SolverConfig {
            vorticity_strength: 0.3,
            ..Default::default()
        };
        let mut solver = CollocatedSolver::new(64, 64, config);
        for frame in 0..10 {
            solver.clear_staging();
            let push = if frame % 2 == 0 { 0.5 } else { -0.5 };
            solver.deposit_velocity_force(32, 30, push, 0.0);
            solver.deposit_velocity_force(32, 34, -push, 0.0);
            solver.step_velocity();
        }
        assert!(
            solver.velocity_x().as_slice().iter().all(|v| v.is_finite()),
            "confined flow must stay finite"
        );
    }

    #[test]
    #[should_panic(expected = "not an interior cell")]
    fn test_boundary_deposit_rejected() {
        let mut solver = CollocatedSolver::new(32, 32, SolverConfig::default());
        solver.deposit_density_source(0, 5, 1.0);
    }

    #[test]
    fn test_vertex_density_averages_four_cells() {
        let mut solver = CollocatedSolver::new(32, 32, SolverConfig::default());
        solver.clear_staging();
        solver.deposit_density_source(10, 10, 8.0);
        solver.step_density();
        // Corner (10, 10) touches cells (9,9), (10,9), (9,10), (10,10)
        assert_relative_eq!(solver.vertex_density(10, 10), 2.0, epsilon = 1e-4);
        assert_relative_eq!(solver.vertex_density(11, 11), 2.0, epsilon = 1e-4);
    }
}
