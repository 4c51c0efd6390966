//! Circular flight through a magnetic sector.
//!
//! The particle enters at the origin moving along `+y` with the field along `+z`. The Lorentz
//! force `q·v×B` points to `+x` when `q·B > 0`, so the orbit is the circle of radius
//! `R = |m/q|·v / |B|` centred on `(R, 0)`, traced over its upper half for `x ∈ [0, 2R]`.

use log::debug;

use super::error::{DeflectionError, DeflectionResult};
use super::field::Field;
use super::particle::Particle;
use super::uncertainty::Parameter;
use super::{DeflectionKind, DeflectionModel};

// relative overshoot past the ends of [0, 2R] still treated as on the orbit
const DOMAIN_SLACK: f64 = 1e-12;
// contact height, relative to R, below which the orbit meets the detector edge-on
const GRAZING_HEIGHT: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticDeflection {
    particle: Particle,
    field: Field,
    radius: f64,
    detector_x: f64,
}

impl MagneticDeflection {
    pub fn new(particle: &Particle, field: Field, detector_x: f64) -> DeflectionResult<Self> {
        if particle.speed() <= 0.0 {
            return Err(DeflectionError::InvalidParticle(
                "the particle needs a positive speed to enter the sector".to_string(),
            ));
        }
        if field.strength() == 0.0 {
            return Err(DeflectionError::InvalidField(
                "a zero magnetic field has no finite orbit radius".to_string(),
            ));
        }
        if !detector_x.is_finite() {
            return Err(DeflectionError::InvalidField(format!(
                "detector position must be finite, got {detector_x} m"
            )));
        }

        Ok(MagneticDeflection {
            particle: *particle,
            field,
            radius: particle.mass_charge_ratio().abs() * particle.speed() / field.strength().abs(),
            detector_x,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn detector_x(&self) -> f64 {
        self.detector_x
    }

    /// Height at which the orbit crosses a detector plate standing at `x_detector`.
    pub fn contact_at(&self, x_detector: f64) -> Option<f64> {
        self.trajectory_y(x_detector)
    }

    /// Angle of the orbit's tangent to the x axis where it crosses `x_detector`.
    pub fn incident_angle_at(&self, x_detector: f64) -> Option<f64> {
        let y = self.contact_at(x_detector)?;
        Some((self.radius - x_detector).atan2(y))
    }
}

impl DeflectionModel for MagneticDeflection {
    fn kind(&self) -> DeflectionKind {
        DeflectionKind::Magnetic
    }

    fn trajectory_y(&self, x: f64) -> Option<f64> {
        let r = self.radius;
        if !x.is_finite() || x < -DOMAIN_SLACK * r || x > (2.0 + DOMAIN_SLACK) * r {
            return None;
        }

        let argument = 1.0 - x / r;
        let clamped = argument.clamp(-1.0, 1.0);
        if clamped != argument {
            debug!("arccos argument {argument} clamped to {clamped} at x = {x}");
        }
        Some(r * clamped.acos().sin())
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 2.0 * self.radius)
    }

    fn point_of_contact(&self) -> Option<f64> {
        self.contact_at(self.detector_x)
    }

    fn incident_angle(&self) -> Option<f64> {
        self.incident_angle_at(self.detector_x)
    }

    fn sensitivity(&self, parameter: Parameter) -> Option<f64> {
        let y = self.point_of_contact()?;
        let r = self.radius;
        let dr_dp = match parameter {
            Parameter::Speed => r / self.particle.speed(),
            Parameter::Mass => r / self.particle.mass(),
            Parameter::Charge => -r / self.particle.charge(),
            Parameter::Field => -r / self.field.strength(),
            // the orbit starts at the entrance slit whatever the launch geometry
            Parameter::Angle | Parameter::Height => return Some(0.0),
        };
        // dy/dR diverges where the orbit crosses the detector vertically
        if y <= GRAZING_HEIGHT * r {
            return None;
        }

        // y = √(2Rx - x²), R = |m|·v / (|q|·|B|)
        let dy_dr = self.detector_x / y;
        Some(dy_dr * dr_dp)
    }
}

/// Field that lands the particle on `(x, y)`.
///
/// The returned field carries the sign of the particle's charge, which bends the orbit
/// toward positive `x`.
pub fn field_for_target(particle: &Particle, x: f64, y: f64) -> DeflectionResult<Field> {
    let unreachable = |reason| Err(DeflectionError::InvalidTarget { x, y, reason });

    if !(x.is_finite() && y.is_finite()) {
        return unreachable("coordinates must be finite");
    }
    if x <= 0.0 {
        return unreachable("the orbit only bends toward positive x");
    }
    if y < 0.0 {
        return unreachable("points below the entrance lie past the half turn");
    }
    if particle.speed() <= 0.0 {
        return unreachable("a particle at rest never leaves the entrance");
    }

    let magnitude = 2.0 * particle.mass_charge_ratio().abs() * particle.speed() * x / (x * x + y * y);
    Field::new(magnitude.copysign(particle.charge()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn proton() -> Particle {
        Particle::new(1.0, 1.0, 1e6, 0.0, 0.0).unwrap()
    }

    fn model(detector_x: f64) -> MagneticDeflection {
        MagneticDeflection::new(&proton(), Field::new(0.5).unwrap(), detector_x).unwrap()
    }

    #[test]
    fn radius_of_a_proton() {
        assert_relative_eq!(model(0.0).radius(), 1.036_427e-8 * 1e6 / 0.5, max_relative = 1e-6);
    }

    #[test]
    fn orbit_stays_within_the_radius() {
        let model = model(0.0);
        let r = model.radius();
        assert_relative_eq!(model.trajectory_y(r).unwrap(), r, max_relative = 1e-12);
        assert!(model.trajectory_y(0.0).unwrap().abs() < 1e-12 * r);
        assert!(model.trajectory_y(2.0 * r).unwrap() >= 0.0);
        assert!(model.trajectory_y(2.0 * r).unwrap() < 1e-6 * r);
    }

    #[test]
    fn outside_the_half_turn_is_absent() {
        let model = model(0.0);
        let r = model.radius();
        assert_eq!(model.trajectory_y(-0.01 * r), None);
        assert_eq!(model.trajectory_y(2.01 * r), None);
        assert_eq!(model.trajectory_y(f64::INFINITY), None);
    }

    #[test]
    fn round_off_past_the_end_is_clamped() {
        let model = model(0.0);
        let r = model.radius();
        let overshoot = 2.0 * r * (1.0 + 1e-14);
        let y = model.trajectory_y(overshoot).unwrap();
        assert!(y.is_finite() && y >= 0.0);
    }

    #[test]
    fn detector_contact_and_angle() {
        let r = model(0.0).radius();
        let model = model(r);
        assert_relative_eq!(model.point_of_contact().unwrap(), r, max_relative = 1e-12);
        assert!(model.incident_angle().unwrap().abs() < 1e-9);

        let early = MagneticDeflection::new(&proton(), Field::new(0.5).unwrap(), 0.5 * r).unwrap();
        assert!(early.incident_angle().unwrap() > 0.0);
        assert_eq!(model.contact_at(3.0 * r), None);
        assert_eq!(model.incident_angle_at(3.0 * r), None);
    }

    #[test]
    fn field_sign_does_not_change_the_orbit() {
        let up = MagneticDeflection::new(&proton(), Field::new(0.5).unwrap(), 0.01).unwrap();
        let down = MagneticDeflection::new(&proton(), Field::new(-0.5).unwrap(), 0.01).unwrap();
        assert_eq!(up.radius(), down.radius());
    }

    #[test]
    fn rejects_zero_field_and_resting_particle() {
        assert!(matches!(
            MagneticDeflection::new(&proton(), Field::new(0.0).unwrap(), 0.01),
            Err(DeflectionError::InvalidField(_))
        ));
        let resting = Particle::new(1.0, 1.0, 0.0, 0.0, 0.0).unwrap();
        assert!(MagneticDeflection::new(&resting, Field::new(0.5).unwrap(), 0.01).is_err());
    }

    #[test]
    fn target_round_trip() {
        let particle = proton();
        let (x, y) = (0.015, 0.02);
        let field = field_for_target(&particle, x, y).unwrap();
        assert!(field.strength() > 0.0);

        let model = MagneticDeflection::new(&particle, field, x).unwrap();
        assert_relative_eq!(model.point_of_contact().unwrap(), y, max_relative = 1e-9);
    }

    #[test]
    fn target_field_follows_the_charge_sign() {
        let oxygen = Particle::new(16.0, -1.0, 1e5, 0.0, 0.0).unwrap();
        let field = field_for_target(&oxygen, 0.1, 0.05).unwrap();
        assert!(field.strength() < 0.0);
    }

    #[test]
    fn unreachable_targets_are_rejected() {
        let particle = proton();
        for (x, y) in [(0.0, 0.1), (-0.1, 0.1), (-0.1, -0.1), (0.1, -0.1), (f64::NAN, 0.1)] {
            assert!(matches!(
                field_for_target(&particle, x, y),
                Err(DeflectionError::InvalidTarget { .. })
            ));
        }
    }

    #[test]
    fn sensitivity_to_speed_matches_geometry() {
        let model = model(0.01);
        let y = model.point_of_contact().unwrap();
        let step = 1.0;
        let faster = Particle::new(1.0, 1.0, 1e6 + step, 0.0, 0.0).unwrap();
        let perturbed = MagneticDeflection::new(&faster, Field::new(0.5).unwrap(), 0.01).unwrap();
        let quotient = (perturbed.point_of_contact().unwrap() - y) / step;
        assert_relative_eq!(model.sensitivity(Parameter::Speed).unwrap(), quotient, max_relative = 1e-4);
        assert_eq!(model.sensitivity(Parameter::Angle), Some(0.0));
    }

    #[test]
    fn detector_at_the_far_edge_has_no_radius_sensitivity() {
        let r = model(0.0).radius();
        let model = model(2.0 * r);
        assert!(model.point_of_contact().unwrap() < 1e-9 * r);
        assert_eq!(model.sensitivity(Parameter::Speed), None);
        assert_eq!(model.sensitivity(Parameter::Field), None);
        assert_eq!(model.sensitivity(Parameter::Angle), Some(0.0));
    }
}
