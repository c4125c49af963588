//! 2D Stable-Fluids Solver Library
//!
//! Real-time incompressible flow on a fixed-resolution grid using the
//! unconditionally-stable semi-implicit "stable fluids" scheme: implicit
//! diffusion and pressure solves by fixed-sweep Gauss-Seidel relaxation,
//! semi-Lagrangian backward advection with bilinear sampling, and an
//! optional vorticity-confinement force.
//!
//! Three grid layouts share one set of kernels:
//! - collocated (all fields cell-centered)
//! - staggered MAC (velocity components on cell faces)
//! - collocated with auxiliary texture-coordinate advection
//!
//! Rendering, windowing, and input are external collaborators: they deposit
//! forces and sources into per-frame staging buffers, advance the pipelines
//! through the [`FluidSolver`] trait, and read the committed fields back
//! for display. The solver is single-threaded and synchronous: exactly one
//! step completes between two frames.

// Grid layouts and field storage
pub mod grid;

// Numerical kernels and variant steppers
pub mod solver;

// Re-export grid types
pub use grid::{IndexSpace, ScalarField, Vec2};

// Re-export solver types
pub use solver::{
    create_solver, CollocatedSolver, FieldKind, FluidSolver, GridLayout, SolverConfig,
    StaggeredSolver, TexturedSolver,
};
