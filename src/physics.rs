//! Physical constants shared by the Maxwell and plasma-fluid kernels.

use serde::{
    Deserialize,
    Serialize,
};

/// Vacuum electromagnetic constants.
///
/// Mirrors the teacher's `PhysicalConstants`: a small value type rather than
/// free-floating `const`s, so alternate unit systems (e.g. reduced units for
/// regression tests) can be swapped in without touching the kernels.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PhysicalConstants {
    pub vacuum_permittivity: f64,
    pub vacuum_permeability: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::SI
    }
}

impl PhysicalConstants {
    pub const SI: Self = Self {
        vacuum_permittivity: 8.8541878188e-12,
        vacuum_permeability: 1.25663706127e-6,
    };

    pub fn speed_of_light(&self) -> f64 {
        (self.vacuum_permittivity * self.vacuum_permeability).powf(-0.5)
    }
}

/// Species-independent plasma constants, from the original program's
/// `physics/plasma.h`.
pub mod plasma_constants {
    /// Electron mass (kg).
    pub const ELECTRON_MASS: f64 = 9.1066e-31;
    /// Electron charge (C), negative.
    pub const ELECTRON_CHARGE: f64 = -1.6021917e-19;
    /// Atomic mass unit (kg).
    pub const AMU: f64 = 1.6605e-27;
    /// Boltzmann constant (J/K).
    pub const BOLTZMANN: f64 = 1.380622e-23;
}
