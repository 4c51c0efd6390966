//! Charged particle presets and the validated launch state fed to the deflection models
//! To add a new preset, add it to the Species enum,
//! then enter its properties in to a corresponding branch of the match statement in Species::retrieve_properties()

use std::f64::consts::FRAC_PI_2;
use std::fmt;

use strum_macros::EnumIter;

use super::constants::PhysicalConstants;
use super::error::{DeflectionError, DeflectionResult};

// Dropdown in the UI will be automatically populated with these options
#[derive(Debug, Clone, Copy, PartialEq, Default, EnumIter)]
pub enum Species {
    #[default]
    Hydrogen,
    Carbon,
    Oxygen,
    Silicon,
    Gallium,
    Caesium,
    Electron,
}

impl Species {
    pub fn properties(&self) -> SpeciesProperties {
        // function separated out to allow for future flexibility
        self.retrieve_properties()
    }

    fn retrieve_properties(&self) -> SpeciesProperties {
        match self {
            Species::Hydrogen => SpeciesProperties {
                mass: 1.007_825,
                charge: 1.0,
                name: "H+",
                colour: (230, 230, 230),
            },
            Species::Carbon => SpeciesProperties {
                mass: 12.0,
                charge: 1.0,
                name: "C+",
                colour: (120, 120, 120),
            },
            Species::Oxygen => SpeciesProperties {
                mass: 15.994_915,
                charge: -1.0,
                name: "O-",
                colour: (255, 60, 60),
            },
            Species::Silicon => SpeciesProperties {
                mass: 27.976_927,
                charge: 1.0,
                name: "Si+",
                colour: (240, 200, 160),
            },
            Species::Gallium => SpeciesProperties {
                mass: 68.925_574,
                charge: 1.0,
                name: "Ga+",
                colour: (190, 140, 255),
            },
            Species::Caesium => SpeciesProperties {
                mass: 132.905_452,
                charge: 1.0,
                name: "Cs+",
                colour: (255, 200, 40),
            },
            Species::Electron => SpeciesProperties {
                mass: 5.485_799_09e-4,
                charge: -1.0,
                name: "e-",
                colour: (0, 120, 255),
            },
        }
    }

    pub fn mass(&self) -> f64 {
        self.properties().mass
    }

    pub fn charge(&self) -> f64 {
        self.properties().charge
    }

    pub fn name(&self) -> &'static str {
        self.properties().name
    }

    pub fn colour(&self) -> (u8, u8, u8) {
        self.properties().colour
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpeciesProperties {
    pub mass: f64,   // u
    pub charge: f64, // e
    pub name: &'static str,
    pub colour: (u8, u8, u8), // RGB
}

/// Launch state of a single charged particle.
///
/// Mass is held in unified atomic mass units and charge in elementary charges; the SI values
/// are derived through the [`PhysicalConstants`] the particle was built with. The angle is
/// measured from the sample plane, so `0` is a grazing launch and `π/2` a perpendicular one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    mass: f64,
    charge: f64,
    speed: f64,
    angle: f64,
    height: f64,
    constants: PhysicalConstants,
}

impl Particle {
    pub fn new(mass: f64, charge: f64, speed: f64, angle: f64, height: f64) -> DeflectionResult<Self> {
        Self::with_constants(PhysicalConstants::default(), mass, charge, speed, angle, height)
    }

    pub fn from_species(species: Species, speed: f64, angle: f64, height: f64) -> DeflectionResult<Self> {
        Self::new(species.mass(), species.charge(), speed, angle, height)
    }

    pub fn with_constants(
        constants: PhysicalConstants,
        mass: f64,
        charge: f64,
        speed: f64,
        angle: f64,
        height: f64,
    ) -> DeflectionResult<Self> {
        let invalid = |message: String| Err(DeflectionError::InvalidParticle(message));

        if !(mass.is_finite() && mass > 0.0) {
            return invalid(format!("mass must be positive, got {mass} u"));
        }
        if !charge.is_finite() || charge == 0.0 {
            return invalid(format!("charge must be non-zero, got {charge} e"));
        }
        if !(speed.is_finite() && speed >= 0.0) {
            return invalid(format!("speed must be non-negative, got {speed} m/s"));
        }
        if !(angle.is_finite() && (0.0..=FRAC_PI_2).contains(&angle)) {
            return invalid(format!("launch angle must lie in [0, π/2], got {angle} rad"));
        }
        if !(height.is_finite() && height >= 0.0) {
            return invalid(format!("launch height must be non-negative, got {height} m"));
        }
        if !(constants.atomic_mass_unit > 0.0 && constants.elementary_charge > 0.0) {
            return invalid("physical constants must be positive".to_string());
        }

        Ok(Particle {
            mass,
            charge,
            speed,
            angle,
            height,
            constants,
        })
    }

    /// Mass in u
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Charge in e
    pub fn charge(&self) -> f64 {
        self.charge
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn constants(&self) -> PhysicalConstants {
        self.constants
    }

    pub fn mass_kg(&self) -> f64 {
        self.mass * self.constants.atomic_mass_unit
    }

    pub fn charge_coulombs(&self) -> f64 {
        self.charge * self.constants.elementary_charge
    }

    /// Signed mass-to-charge ratio in kg/C; the sign carries the deflection direction.
    pub fn mass_charge_ratio(&self) -> f64 {
        self.mass_kg() / self.charge_coulombs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn species_build_valid_particles() {
        for species in Species::iter() {
            let particle = Particle::from_species(species, 1e5, 0.3, 0.01).unwrap();
            assert_eq!(particle.charge().signum(), particle.mass_charge_ratio().signum());
        }
    }

    #[test]
    fn proton_mass_charge_ratio() {
        let particle = Particle::new(1.0, 1.0, 1e6, 0.5, 0.1).unwrap();
        assert_relative_eq!(particle.mass_charge_ratio(), 1.036_427e-8, max_relative = 1e-6);
    }

    #[test]
    fn negative_ions_have_negative_ratio() {
        let particle = Particle::from_species(Species::Oxygen, 1e5, 0.3, 0.01).unwrap();
        assert!(particle.mass_charge_ratio() < 0.0);
    }

    #[test]
    fn rejects_invalid_inputs() {
        assert!(Particle::new(0.0, 1.0, 1.0, 0.5, 0.1).is_err());
        assert!(Particle::new(-1.0, 1.0, 1.0, 0.5, 0.1).is_err());
        assert!(Particle::new(1.0, 0.0, 1.0, 0.5, 0.1).is_err());
        assert!(Particle::new(1.0, 1.0, -1.0, 0.5, 0.1).is_err());
        assert!(Particle::new(1.0, 1.0, 1.0, 2.0, 0.1).is_err());
        assert!(Particle::new(1.0, 1.0, 1.0, -0.1, 0.1).is_err());
        assert!(Particle::new(1.0, 1.0, 1.0, 0.5, -0.1).is_err());
        assert!(Particle::new(f64::NAN, 1.0, 1.0, 0.5, 0.1).is_err());
    }

    #[test]
    fn injected_constants_are_used() {
        let constants = PhysicalConstants {
            atomic_mass_unit: 2.0,
            elementary_charge: 4.0,
        };
        let particle = Particle::with_constants(constants, 3.0, -1.0, 1.0, 0.5, 0.1).unwrap();
        assert_eq!(particle.mass_kg(), 6.0);
        assert_eq!(particle.charge_coulombs(), -4.0);
        assert_eq!(particle.mass_charge_ratio(), -1.5);
    }
}
