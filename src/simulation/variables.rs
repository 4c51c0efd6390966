//! Default values and ranges for every user-facing input, plus the numeric tolerances of the solvers

use static_assertions::const_assert;

pub struct Variable {
    pub default: f64,
    pub min: f64,
    pub max: f64,
}

/// Initial speed (m/s)
pub const SPEED: Variable = Variable {
    default: 1.0e6,
    min: 1.0e4,
    max: 1.0e7,
};
/// Launch angle from the sample plane (degrees)
pub const ANGLE_DEGREES: Variable = Variable {
    default: 30.0,
    min: 1.0,
    max: 89.0,
};
/// Launch height above the sample plane (m)
pub const HEIGHT: Variable = Variable {
    default: 0.1,
    min: 0.001,
    max: 0.5,
};
/// Potential difference across the plates (V)
pub const POTENTIAL: Variable = Variable {
    default: -5000.0,
    min: -20000.0,
    max: 20000.0,
};
/// Plate separation (m)
pub const PLATE_DISTANCE: Variable = Variable {
    default: 0.1,
    min: 0.01,
    max: 1.0,
};
/// Magnetic flux density (T)
pub const MAGNETIC_FIELD: Variable = Variable {
    default: 0.5,
    min: 0.01,
    max: 2.0,
};
/// Detector plate abscissa for the magnetic sector (m)
pub const DETECTOR_X: Variable = Variable {
    default: 0.02,
    min: 0.0,
    max: 0.5,
};
/// Relative uncertainty applied to speed, angle, height and field
pub const RELATIVE_UNCERTAINTY: Variable = Variable {
    default: 0.01,
    min: 0.0,
    max: 0.1,
};

// mass and charge are known an order of magnitude better than the rest
pub const CONSTANT_UNCERTAINTY_FACTOR: f64 = 0.1;

const_assert!(SPEED.min > 0.0);
const_assert!(ANGLE_DEGREES.min > 0.0 && ANGLE_DEGREES.max < 90.0);
const_assert!(HEIGHT.min > 0.0);
const_assert!(PLATE_DISTANCE.min > 0.0);
const_assert!(MAGNETIC_FIELD.min > 0.0);

/// Numeric tolerances shared by the root finders and the finite-difference propagator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// `|a·c|` below `linear · b²` solves the contact as a straight line
    pub linear: f64,
    /// negative discriminants down to `-discriminant · b²` count as a tangent
    pub discriminant: f64,
    /// roots at or below this abscissa (m) are not future crossings
    pub contact_epsilon: f64,
    /// relative finite-difference step
    pub step_relative: f64,
    /// absolute step used when the nominal parameter is zero
    pub step_floor: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            linear: 1e-12,
            discriminant: 1e-12,
            contact_epsilon: 1e-9,
            step_relative: 1e-8,
            step_floor: 1e-12,
        }
    }
}

/// Geometry of the instrument around the particle source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Apparatus {
    /// Abscissa of the detector plate in the magnetic sector (m)
    pub detector_x: f64,
    pub tolerances: Tolerances,
}

impl Default for Apparatus {
    fn default() -> Self {
        Apparatus {
            detector_x: DETECTOR_X.default,
            tolerances: Tolerances::default(),
        }
    }
}
