use crate::{Float, SolverError};

/// Physical constants of the dye model, fixed for the lifetime of a
/// simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Physics {
    /// kg/m³ in the model's unit choice
    pub density: Float,
    /// m²/s
    pub diffusivity: Float,
    /// Accumulation coefficient used in place of `ρ·Δx·Δy/Δt` when `dt == 0`.
    /// Only needs to dwarf the neighbour coefficients.
    pub steady_coefficient: Float,
    /// Value the source cell is pinned to after every step.
    pub source_concentration: Float,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            density: 2.55,
            diffusivity: 1e-4,
            steady_coefficient: 1e10,
            source_concentration: 100.0,
        }
    }
}

impl Physics {
    pub fn with_density(mut self, density: Float) -> Self {
        self.density = density;
        self
    }

    pub fn with_diffusivity(mut self, diffusivity: Float) -> Self {
        self.diffusivity = diffusivity;
        self
    }

    pub fn with_steady_coefficient(mut self, coefficient: Float) -> Self {
        self.steady_coefficient = coefficient;
        self
    }

    pub fn with_source_concentration(mut self, concentration: Float) -> Self {
        self.source_concentration = concentration;
        self
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        let positive = [
            ("density", self.density),
            ("diffusivity", self.diffusivity),
            ("steady_coefficient", self.steady_coefficient),
        ];

        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SolverError::InvalidParameter { name, value });
            }
        }

        if !self.source_concentration.is_finite() {
            return Err(SolverError::InvalidParameter {
                name: "source_concentration",
                value: self.source_concentration,
            });
        }

        Ok(())
    }
}
