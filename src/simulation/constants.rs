//! Physical constants used to convert user units to SI at the particle boundary.

use static_assertions::const_assert;

/// Unified atomic mass unit in kilograms (CODATA 2018).
pub const ATOMIC_MASS_UNIT: f64 = 1.660_539_066_60e-27;
/// Elementary charge in coulombs, exact since the 2019 SI redefinition.
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;
/// Vacuum permittivity in farads per metre.
pub const VACUUM_PERMITTIVITY: f64 = 8.854_187_812_8e-12;

const_assert!(ATOMIC_MASS_UNIT > 0.0);
const_assert!(ELEMENTARY_CHARGE > 0.0);

/// Conversion factors injected into every [`Particle`](super::particle::Particle).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    /// kg per u
    pub atomic_mass_unit: f64,
    /// C per e
    pub elementary_charge: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        PhysicalConstants {
            atomic_mass_unit: ATOMIC_MASS_UNIT,
            elementary_charge: ELEMENTARY_CHARGE,
        }
    }
}
