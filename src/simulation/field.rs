use super::constants::VACUUM_PERMITTIVITY;
use super::error::{DeflectionError, DeflectionResult};

/// Uniform field acting on the particle, as a signed scalar.
///
/// The unit depends on the deflection model it is paired with: V/m for the electric plates,
/// T for the magnetic sector. Positive values point along `+y` (electric) or `+z` (magnetic).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    strength: f64,
}

impl Field {
    pub fn new(strength: f64) -> DeflectionResult<Self> {
        if !strength.is_finite() {
            return Err(DeflectionError::InvalidField(format!(
                "field strength must be finite, got {strength}"
            )));
        }
        Ok(Field { strength })
    }

    /// Field between parallel plates `distance` metres apart held at `potential` volts.
    pub fn from_potential(distance: f64, potential: f64) -> DeflectionResult<Self> {
        if !(distance.is_finite() && distance > 0.0) {
            return Err(DeflectionError::InvalidField(format!(
                "plate distance must be positive, got {distance} m"
            )));
        }
        Self::new(potential / distance)
    }

    /// Field of a charged plate of `area` square metres carrying `charge` coulombs, E = Q / (A·ε₀).
    pub fn from_surface_charge(charge: f64, area: f64) -> DeflectionResult<Self> {
        if !(area.is_finite() && area > 0.0) {
            return Err(DeflectionError::InvalidField(format!(
                "plate area must be positive, got {area} m²"
            )));
        }
        Self::new(charge / (area * VACUUM_PERMITTIVITY))
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }
}
