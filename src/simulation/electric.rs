//! Parabolic flight between parallel plates.
//!
//! The particle leaves `(0, height)` at angle `θ` below the x axis, heading for the sample plane
//! `y = 0`, with speed components `vx = v·cosθ` and `vy = -v·sinθ`. The field points along `+y`
//! and accelerates the particle by `q·E/m`, so with `X = x / (v·cosθ)` the time of flight to `x`,
//!
//! ```text
//! y(x) = height - x·tanθ + ½·(E / (m/q))·X²
//! ```
//!
//! A positive ion is pulled onto the plane by `E < 0` and pushed away by `E > 0`.

use log::trace;

use super::error::{DeflectionError, DeflectionResult};
use super::field::Field;
use super::particle::Particle;
use super::uncertainty::Parameter;
use super::variables::Tolerances;
use super::{DeflectionKind, DeflectionModel};

// below this, sinθ or cosθ counts as a grazing or perpendicular launch
const DEGENERATE_TRIG: f64 = 1e-9;
// slope magnitude at contact, relative to its terms, below which the crossing is tangential;
// √ of the default discriminant tolerance, since rounding in Δ shows up in the slope as √Δ
const TANGENT_SLOPE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectricDeflection {
    particle: Particle,
    field: Field,
    tolerances: Tolerances,
    forward_speed: f64,
    tan_angle: f64,
    acceleration: f64,
}

impl ElectricDeflection {
    pub fn new(particle: &Particle, field: Field, tolerances: Tolerances) -> DeflectionResult<Self> {
        let (sin, cos) = particle.angle().sin_cos();
        if sin < DEGENERATE_TRIG || cos < DEGENERATE_TRIG {
            return Err(DeflectionError::InvalidParticle(format!(
                "launch angle {} rad must lie strictly inside (0, π/2)",
                particle.angle()
            )));
        }
        if particle.speed() <= 0.0 {
            return Err(DeflectionError::InvalidParticle(
                "the particle needs a positive speed to cross the plates".to_string(),
            ));
        }
        if particle.height() <= 0.0 {
            return Err(DeflectionError::InvalidParticle(format!(
                "launch height must be positive, got {} m",
                particle.height()
            )));
        }

        Ok(ElectricDeflection {
            particle: *particle,
            field,
            tolerances,
            forward_speed: particle.speed() * cos,
            tan_angle: sin / cos,
            acceleration: field.strength() / particle.mass_charge_ratio(),
        })
    }

    pub fn particle(&self) -> &Particle {
        &self.particle
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// Coefficients `(a, b, c)` of `a·x² + b·x + c = y(x)`.
    pub fn coefficients(&self) -> (f64, f64, f64) {
        (
            0.5 * self.acceleration / (self.forward_speed * self.forward_speed),
            -self.tan_angle,
            self.particle.height(),
        )
    }

    /// dy/dx at abscissa `x`.
    pub fn slope(&self, x: f64) -> f64 {
        -self.tan_angle + self.acceleration * x / (self.forward_speed * self.forward_speed)
    }

    fn first_forward_root(&self, roots: &[f64]) -> Option<f64> {
        roots
            .iter()
            .copied()
            .filter(|root| root.is_finite() && *root > self.tolerances.contact_epsilon)
            .min_by(f64::total_cmp)
    }
}

impl DeflectionModel for ElectricDeflection {
    fn kind(&self) -> DeflectionKind {
        DeflectionKind::Electric
    }

    fn trajectory_y(&self, x: f64) -> Option<f64> {
        if !x.is_finite() || x < 0.0 {
            return None;
        }
        let time = x / self.forward_speed;
        Some(self.particle.height() - x * self.tan_angle + 0.5 * self.acceleration * time * time)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, f64::INFINITY)
    }

    fn point_of_contact(&self) -> Option<f64> {
        let (a, b, c) = self.coefficients();

        if (a * c).abs() <= self.tolerances.linear * b * b {
            trace!("field negligible, solving {b}·x + {c} = 0");
            return self.first_forward_root(&[-c / b]);
        }

        let mut discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            if discriminant < -self.tolerances.discriminant * b * b {
                trace!("discriminant {discriminant} < 0, no contact");
                return None;
            }
            discriminant = 0.0;
        }

        // q-form avoids cancellation between -b and √Δ
        let q = -0.5 * (b + b.signum() * discriminant.sqrt());
        let roots = [q / a, c / q];
        trace!("contact roots {roots:?}");
        self.first_forward_root(&roots)
    }

    fn incident_angle(&self) -> Option<f64> {
        self.point_of_contact().map(|x| self.slope(x).atan())
    }

    fn sensitivity(&self, parameter: Parameter) -> Option<f64> {
        let x = self.point_of_contact()?;
        let slope = self.slope(x);
        let curvature_term = self.acceleration * x / (self.forward_speed * self.forward_speed);
        if slope.abs() <= TANGENT_SLOPE * (self.tan_angle + curvature_term.abs()) {
            return None;
        }

        // y(x; p) = 0 at contact, so dx/dp = -(∂y/∂p) / (∂y/∂x)
        let g = 0.5 * x * x / (self.forward_speed * self.forward_speed);
        let cos = self.particle.angle().cos();
        let dy_dp = match parameter {
            Parameter::Height => 1.0,
            Parameter::Speed => -2.0 * self.acceleration * g / self.particle.speed(),
            Parameter::Angle => -x / (cos * cos) + 2.0 * self.acceleration * g * self.tan_angle,
            Parameter::Field => g * self.particle.charge_coulombs() / self.particle.mass_kg(),
            Parameter::Charge => g * self.acceleration / self.particle.charge(),
            Parameter::Mass => -g * self.acceleration / self.particle.mass(),
        };
        Some(-dy_dp / slope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn particle(angle_degrees: f64) -> Particle {
        Particle::new(1.0, 1.0, 1e6, angle_degrees.to_radians(), 0.1).unwrap()
    }

    fn model(angle_degrees: f64, strength: f64) -> ElectricDeflection {
        ElectricDeflection::new(&particle(angle_degrees), Field::new(strength).unwrap(), Tolerances::default())
            .unwrap()
    }

    #[test]
    fn zero_field_is_a_straight_line() {
        let model = model(30.0, 0.0);
        let x = model.point_of_contact().unwrap();
        assert_relative_eq!(x, 0.1 / 30f64.to_radians().tan(), max_relative = 1e-12);
        assert_relative_eq!(model.incident_angle().unwrap(), -30f64.to_radians(), max_relative = 1e-12);
    }

    #[test]
    fn attracting_field_lands_on_the_plane() {
        let field = Field::from_potential(0.1, -5000.0).unwrap();
        let model = ElectricDeflection::new(&particle(30.0), field, Tolerances::default()).unwrap();
        let x = model.point_of_contact().unwrap();

        assert!(x.is_finite() && x > 0.0);
        assert!(x < 0.1 / 30f64.to_radians().tan());
        assert!(model.trajectory_y(x).unwrap().abs() < 1e-12);

        let angle = model.incident_angle().unwrap();
        assert_relative_eq!(angle.tan(), model.slope(x), max_relative = 1e-6);
        assert!(angle < -30f64.to_radians());
    }

    #[test]
    fn repelling_field_misses_the_plane() {
        let field = Field::from_potential(0.1, 5000.0).unwrap();
        let model = ElectricDeflection::new(&particle(10.0), field, Tolerances::default()).unwrap();
        assert_eq!(model.point_of_contact(), None);
        assert_eq!(model.incident_angle(), None);
        assert_eq!(model.sensitivity(Parameter::Speed), None);
    }

    #[test]
    fn weak_repulsion_still_lands_further_out() {
        let model = model(30.0, 100.0);
        let x = model.point_of_contact().unwrap();
        assert!(x > 0.1 / 30f64.to_radians().tan());
        assert!(model.trajectory_y(x).unwrap().abs() < 1e-9);
    }

    #[test]
    fn negative_ion_is_attracted_by_positive_field() {
        let oxygen = Particle::new(16.0, -1.0, 1e6, 30f64.to_radians(), 0.1).unwrap();
        let model = ElectricDeflection::new(&oxygen, Field::new(5e4).unwrap(), Tolerances::default()).unwrap();
        assert!(model.point_of_contact().unwrap() < 0.1 / 30f64.to_radians().tan());
    }

    #[test]
    fn trajectory_starts_at_launch_height() {
        let model = model(45.0, -5e4);
        assert_relative_eq!(model.trajectory_y(0.0).unwrap(), 0.1);
        assert_eq!(model.trajectory_y(-0.01), None);
        assert_eq!(model.trajectory_y(f64::NAN), None);
    }

    #[test]
    fn degenerate_launches_are_rejected() {
        let field = Field::new(0.0).unwrap();
        let tolerances = Tolerances::default();
        let flat = Particle::new(1.0, 1.0, 1e6, 0.0, 0.1).unwrap();
        let vertical = Particle::new(1.0, 1.0, 1e6, std::f64::consts::FRAC_PI_2, 0.1).unwrap();
        let resting = Particle::new(1.0, 1.0, 0.0, 0.5, 0.1).unwrap();
        let grounded = Particle::new(1.0, 1.0, 1e6, 0.5, 0.0).unwrap();

        for particle in [flat, vertical, resting, grounded] {
            assert!(matches!(
                ElectricDeflection::new(&particle, field, tolerances),
                Err(DeflectionError::InvalidParticle(_))
            ));
        }
    }

    #[test]
    fn analytic_height_sensitivity_without_field() {
        let model = model(30.0, 0.0);
        let tan = 30f64.to_radians().tan();
        assert_relative_eq!(model.sensitivity(Parameter::Height).unwrap(), 1.0 / tan, max_relative = 1e-12);
        assert_eq!(model.sensitivity(Parameter::Speed), Some(0.0));
    }

    #[test]
    fn analytic_sensitivity_matches_difference_quotient() {
        let base = model(30.0, -5e4);
        let x = base.point_of_contact().unwrap();
        let step = 1e-3;
        let perturbed = model(30.0, -5e4 * (1.0 + step));
        let quotient = (perturbed.point_of_contact().unwrap() - x) / (-5e4 * step);
        assert_relative_eq!(base.sensitivity(Parameter::Field).unwrap(), quotient, max_relative = 1e-2);
    }

    #[test]
    fn tangential_contact_has_no_sensitivity() {
        let particle = particle(10.0);
        let forward = particle.speed() * particle.angle().cos();
        // a = b² / 4c: the parabola just touches the plane
        let tangent =
            particle.angle().tan().powi(2) / (4.0 * 0.1) * 2.0 * forward * forward * particle.mass_charge_ratio();
        let model = ElectricDeflection::new(&particle, Field::new(tangent).unwrap(), Tolerances::default()).unwrap();

        let x = model.point_of_contact().unwrap();
        assert!(model.slope(x).abs() < 1e-6);
        assert_eq!(model.sensitivity(Parameter::Field), None);
        assert_eq!(model.sensitivity(Parameter::Height), None);
    }
}
