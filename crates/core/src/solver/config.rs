//! Solver configuration

use serde::{Deserialize, Serialize};

/// Configuration shared by every solver variant.
///
/// All rates are per unit time; a rate of zero disables the corresponding
/// pass. The scheme is unconditionally stable for any combination, so none
/// of these values are clamped; they trade accuracy, not safety.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Integration time step
    pub time_step: f32,

    /// Velocity diffusion rate (kinematic viscosity); 0 skips the velocity
    /// diffusion pass
    pub viscosity: f32,

    /// Scalar diffusion rate for density and texture coordinates; 0 skips
    /// the scalar diffusion pass
    pub diffusivity: f32,

    /// Vorticity-confinement strength (collocated variant); 0 skips the
    /// pass. Absorbs the time step.
    pub vorticity_strength: f32,

    /// Gauss-Seidel sweeps per implicit solve (diffusion and pressure).
    /// A fixed budget, not a convergence check.
    pub relax_sweeps: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0,
            viscosity: 0.0,
            diffusivity: 0.0,
            vorticity_strength: 0.0,
            relax_sweeps: 20, // Matches the accuracy/cost balance of the reference scheme
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sweep_budget() {
        let config = SolverConfig::default();
        assert_eq!(config.relax_sweeps, 20);
        assert_eq!(config.time_step, 1.0);
        assert_eq!(config.viscosity, 0.0);
        assert_eq!(config.diffusivity, 0.0);
        assert_eq!(config.vorticity_strength, 0.0);
    }

    #[test]
    fn test_overrides_compose_with_defaults() {
        let config = SolverConfig {
            viscosity: 0.25,
            relax_sweeps: 40,
            ..Default::default()
        };
        assert_eq!(config.viscosity, 0.25);
        assert_eq!(config.relax_sweeps, 40);
        assert_eq!(config.time_step, 1.0);
    }
}
