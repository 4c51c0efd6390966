//! Contains all simulation logic: particle and field inputs, the two deflection models,
//! uncertainty propagation and batch sweeps

pub mod constants;
pub mod electric;
pub mod error;
pub mod field;
pub mod magnetic;
pub mod particle;
pub mod sweep;
pub mod uncertainty;
pub mod variables;

pub use electric::ElectricDeflection;
pub use error::{DeflectionError, DeflectionResult};
pub use field::Field;
pub use magnetic::{MagneticDeflection, field_for_target};
pub use particle::{Particle, Species};
pub use uncertainty::{Parameter, PropagationMethod, UncertaintyBudget};
pub use variables::{Apparatus, Tolerances};

use ndarray::Array1;
use strum_macros::{Display, EnumIter};

// Dropdown in the UI will be automatically populated with these options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, Display)]
pub enum DeflectionKind {
    #[default]
    Electric,
    Magnetic,
}

/// Where and how steeply a trajectory meets its reference plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    pub contact: Option<f64>,
    pub angle: Option<f64>,
}

/// Closed-form trajectory of one particle in one field.
///
/// `None` from any query means the quantity does not exist for this configuration
/// (the particle never reaches the plane, or `x` lies outside the curve's domain).
pub trait DeflectionModel {
    fn kind(&self) -> DeflectionKind;

    /// Height of the trajectory at abscissa `x`.
    fn trajectory_y(&self, x: f64) -> Option<f64>;

    /// Closed interval of abscissas on which [`trajectory_y`](Self::trajectory_y) is defined.
    fn domain(&self) -> (f64, f64);

    /// Landing coordinate on the reference plane: the abscissa of the sample plate for the
    /// electric model, the height on the detector plate for the magnetic one.
    fn point_of_contact(&self) -> Option<f64>;

    /// Angle between the trajectory's tangent and the x axis at the contact point (rad).
    fn incident_angle(&self) -> Option<f64>;

    /// Closed-form derivative of [`point_of_contact`](Self::point_of_contact) with respect to
    /// `parameter`, in the parameter's own units.
    fn sensitivity(&self, parameter: Parameter) -> Option<f64>;

    fn landing(&self) -> Landing {
        Landing {
            contact: self.point_of_contact(),
            angle: self.incident_angle(),
        }
    }

    /// Evenly spaced samples of the trajectory; points where it is undefined are dropped.
    fn sample_trajectory(&self, x_min: f64, x_max: f64, n_points: usize) -> DeflectionResult<Vec<(f64, f64)>> {
        if n_points < 2 {
            return Err(DeflectionError::InvalidSampling(format!(
                "at least two points are needed, got {n_points}"
            )));
        }
        if !(x_min.is_finite() && x_max.is_finite() && x_min <= x_max) {
            return Err(DeflectionError::InvalidSampling(format!(
                "invalid range [{x_min}, {x_max}]"
            )));
        }

        Ok(Array1::linspace(x_min, x_max, n_points)
            .iter()
            .filter_map(|&x| self.trajectory_y(x).map(|y| (x, y)))
            .filter(|(_, y)| y.is_finite())
            .collect())
    }
}

pub fn deflection(
    kind: DeflectionKind,
    particle: &Particle,
    field: Field,
    apparatus: &Apparatus,
) -> DeflectionResult<Box<dyn DeflectionModel>> {
    Ok(match kind {
        DeflectionKind::Electric => Box::new(ElectricDeflection::new(particle, field, apparatus.tolerances)?),
        DeflectionKind::Magnetic => Box::new(MagneticDeflection::new(particle, field, apparatus.detector_x)?),
    })
}

/// Everything needed to rebuild a deflection model, so single inputs can be perturbed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scenario {
    pub kind: DeflectionKind,
    pub particle: Particle,
    pub field: Field,
    pub apparatus: Apparatus,
}

impl Scenario {
    pub fn new(kind: DeflectionKind, particle: Particle, field: Field) -> Self {
        Scenario {
            kind,
            particle,
            field,
            apparatus: Apparatus::default(),
        }
    }

    pub fn with_apparatus(self, apparatus: Apparatus) -> Self {
        Scenario { apparatus, ..self }
    }

    pub fn model(&self) -> DeflectionResult<Box<dyn DeflectionModel>> {
        deflection(self.kind, &self.particle, self.field, &self.apparatus)
    }

    /// Nominal value of `parameter`, in the units the uncertainty budget uses.
    pub fn value(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Speed => self.particle.speed(),
            Parameter::Angle => self.particle.angle(),
            Parameter::Height => self.particle.height(),
            Parameter::Charge => self.particle.charge(),
            Parameter::Mass => self.particle.mass(),
            Parameter::Field => self.field.strength(),
        }
    }

    /// Copy of this scenario with one input replaced, revalidated.
    pub fn with_value(&self, parameter: Parameter, value: f64) -> DeflectionResult<Self> {
        let p = &self.particle;
        let (mut mass, mut charge, mut speed, mut angle, mut height) =
            (p.mass(), p.charge(), p.speed(), p.angle(), p.height());
        let mut field = self.field;

        match parameter {
            Parameter::Speed => speed = value,
            Parameter::Angle => angle = value,
            Parameter::Height => height = value,
            Parameter::Charge => charge = value,
            Parameter::Mass => mass = value,
            Parameter::Field => field = Field::new(value)?,
        }

        Ok(Scenario {
            particle: Particle::with_constants(p.constants(), mass, charge, speed, angle, height)?,
            field,
            ..*self
        })
    }
}
