//! Worked examples through the public call surface.

use approx::assert_relative_eq;
use sims_deflection::simulation::constants::{ATOMIC_MASS_UNIT, ELEMENTARY_CHARGE};
use sims_deflection::simulation::sweep::{field_range, sweep_fields};
use sims_deflection::simulation::uncertainty::{propagate_uncertainty, uncertainty_corridor};
use sims_deflection::simulation::{
    Apparatus, DeflectionError, DeflectionKind, Field, Particle, PropagationMethod, Scenario, UncertaintyBudget,
    deflection,
};

fn proton(angle_degrees: f64) -> Particle {
    Particle::new(1.0, 1.0, 1e6, angle_degrees.to_radians(), 0.1).unwrap()
}

#[test]
fn proton_lands_between_biased_plates() {
    let field = Field::from_potential(0.1, -5000.0).unwrap();
    assert_relative_eq!(field.strength(), -50000.0);

    let model = deflection(DeflectionKind::Electric, &proton(30.0), field, &Apparatus::default()).unwrap();
    let x = model.point_of_contact().unwrap();
    assert!(x.is_finite() && x > 0.0);

    let theta = 30f64.to_radians();
    let acceleration = -50000.0 * ELEMENTARY_CHARGE / ATOMIC_MASS_UNIT;
    let forward = 1e6 * theta.cos();
    let slope = -theta.tan() + acceleration * x / (forward * forward);
    let angle = model.incident_angle().unwrap();
    assert_relative_eq!(angle.tan(), slope, max_relative = 1e-6);
}

#[test]
fn flipped_potential_repels_shallow_launch() {
    let field = Field::from_potential(0.1, 5000.0).unwrap();
    let model = deflection(DeflectionKind::Electric, &proton(10.0), field, &Apparatus::default()).unwrap();
    assert_eq!(model.point_of_contact(), None);
    assert_eq!(model.incident_angle(), None);
}

#[test]
fn uncertainty_is_undefined_without_contact() {
    let field = Field::from_potential(0.1, 5000.0).unwrap();
    let scenario = Scenario::new(DeflectionKind::Electric, proton(10.0), field);
    let budget = UncertaintyBudget::typical(&scenario, 0.01).unwrap();

    let result = propagate_uncertainty(&scenario, &budget, PropagationMethod::CentralDifference);
    assert!(matches!(result, Err(DeflectionError::UndefinedUncertainty(_))));
}

#[test]
fn corridor_contains_the_linear_band() {
    let field = Field::from_potential(0.1, -5000.0).unwrap();
    let scenario = Scenario::new(DeflectionKind::Electric, proton(30.0), field);
    let budget = UncertaintyBudget::typical(&scenario, 0.02).unwrap();

    let report = propagate_uncertainty(&scenario, &budget, PropagationMethod::Analytic).unwrap();
    let corridor = uncertainty_corridor(&scenario, &budget, PropagationMethod::Analytic).unwrap();
    let (low, high) = corridor.interval().unwrap();

    assert!(low < report.nominal - report.uncertainty);
    assert!(high > report.nominal + report.uncertainty);
}

#[test]
fn field_sweep_crosses_into_no_contact() {
    let fields = field_range(-5e4, 5e4, 21).unwrap();
    let landings = sweep_fields(DeflectionKind::Electric, &proton(10.0), &fields, &Apparatus::default());

    assert!(landings.iter().all(|landing| landing.is_ok()));
    assert!(landings.first().unwrap().as_ref().unwrap().contact.is_some());
    assert!(landings.last().unwrap().as_ref().unwrap().contact.is_none());

    let contacts: Vec<f64> = landings
        .iter()
        .map_while(|landing| landing.as_ref().unwrap().contact)
        .collect();
    for pair in contacts.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}
