//! Collocated stepper with auxiliary texture advection
//!
//! Same layout and velocity pipeline as the basic collocated stepper, plus
//! a pair of texture-coordinate fields carried along by the flow. The
//! coordinates start as the identity mapping and are advected and diffused
//! like any scalar; a renderer samples its source image through them to
//! drag imagery with the fluid. They have no staging buffers: nothing
//! deposits into a texture, the flow alone distorts it.
//!
//! Pipeline differences from the basic variant: velocity diffusion runs
//! unconditionally (a zero rate degenerates to a copy), and density
//! advects before it diffuses.

use super::advect::{advect, SampleBounds};
use super::boundary::{enforce, FieldKind};
use super::project::project_collocated;
use super::relax::diffuse;
use super::SolverConfig;
use crate::grid::{IndexSpace, ScalarField, Vec2};
use crate::FluidSolver;
use std::mem;
use tracing::{debug, info};

/// Stable-fluids solver on a collocated grid with texture-coordinate
/// advection.
pub struct TexturedSolver {
    space: IndexSpace,

    vx: ScalarField,
    vy: ScalarField,
    vx0: ScalarField,
    vy0: ScalarField,
    density: ScalarField,
    density0: ScalarField,
    tex_x: ScalarField,
    tex_y: ScalarField,
    tex_x0: ScalarField,
    tex_y0: ScalarField,

    pressure: ScalarField,
    divergence: ScalarField,

    config: SolverConfig,
    running: bool,
}

impl TexturedSolver {
    /// Allocate a solver for a `width x height` grid; texture coordinates
    /// start as the identity mapping over the whole grid.
    ///
    /// # Panics
    ///
    /// Panics if either extent is below 3.
    #[must_use]
    pub fn new(width: usize, height: usize, config: SolverConfig) -> Self {
        let space = IndexSpace::cell_centered(width, height);
        info!("textured solver initialized: {}x{} grid", width, height);
        let mut solver = Self {
            space,
            vx: ScalarField::new(space),
            vy: ScalarField::new(space),
            vx0: ScalarField::new(space),
            vy0: ScalarField::new(space),
            density: ScalarField::new(space),
            density0: ScalarField::new(space),
            tex_x: ScalarField::new(space),
            tex_y: ScalarField::new(space),
            tex_x0: ScalarField::new(space),
            tex_y0: ScalarField::new(space),
            pressure: ScalarField::new(space),
            divergence: ScalarField::new(space),
            config,
            running: true,
        };
        solver.reset_texture();
        solver
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

    /// Advected x texture coordinate.
    #[must_use]
    pub fn texture_x(&self) -> &ScalarField {
        &self.tex_x
    }

    /// Advected y texture coordinate.
    #[must_use]
    pub fn texture_y(&self) -> &ScalarField {
        &self.tex_y
    }

    fn reset_texture(&mut self) {
        for y in 0..self.space.height() {
            for x in 0..self.space.width() {
                let pos = self.space.position(x, y);
                self.tex_x.set(x, y, pos.x);
                self.tex_y.set(x, y, pos.y);
            }
        }
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
}

impl FluidSolver for TexturedSolver {
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
        self.tex_x0.fill(0.0);
        self.tex_y0.fill(0.0);
        self.pressure.fill(0.0);
        self.divergence.fill(0.0);
        self.reset_texture();
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
        debug!("textured velocity step: dt={dt}");

        self.merge_velocity_sources();

        // Diffusion runs unconditionally in this variant
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

        project_collocated(
            &mut self.vx,
            &mut self.vy,
            &mut self.pressure,
            &mut self.divergence,
            sweeps,
        );

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

        // Advect first, then diffuse; reversed relative to the basic
        // collocated variant
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

    fn step_texture(&mut self) {
        if !self.running {
            return;
        }
        let dt = self.config.time_step;
        let sweeps = self.config.relax_sweeps;

        mem::swap(&mut self.tex_x, &mut self.tex_x0);
        mem::swap(&mut self.tex_y, &mut self.tex_y0);
        let bounds = self.sample_bounds();
        let (vx, vy) = (&self.vx, &self.vy);
        advect(
            &mut self.tex_x,
            &self.tex_x0,
            dt,
            bounds,
            FieldKind::Scalar,
            |x, y| Vec2::new(vx.get(x, y), vy.get(x, y)),
        );
        advect(
            &mut self.tex_y,
            &self.tex_y0,
            dt,
            bounds,
            FieldKind::Scalar,
            |x, y| Vec2::new(vx.get(x, y), vy.get(x, y)),
        );

        mem::swap(&mut self.tex_x, &mut self.tex_x0);
        mem::swap(&mut self.tex_y, &mut self.tex_y0);
        diffuse(
            &mut self.tex_x,
            &self.tex_x0,
            self.config.diffusivity,
            dt,
            FieldKind::Scalar,
            sweeps,
        );
        diffuse(
            &mut self.tex_y,
            &self.tex_y0,
            self.config.diffusivity,
            dt,
            FieldKind::Scalar,
            sweeps,
        );
    }

    fn has_texture(&self) -> bool {
        true
    }

    fn density(&self) -> &ScalarField {
        &self.density
    }

    fn cell_velocity(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(self.vx.get(x, y), self.vy.get(x, y))
    }
}
