//! Batch evaluation across particles or field values.
//!
//! Every element is independent: a particle that misses the plane yields a `Landing` with no
//! contact, and one that fails validation yields its own error, without touching the rest.

use ndarray::Array1;

use super::error::{DeflectionError, DeflectionResult};
use super::field::Field;
use super::particle::Particle;
use super::variables::Apparatus;
use super::{DeflectionKind, Landing, deflection};

pub fn sweep_particles(
    kind: DeflectionKind,
    particles: &[Particle],
    field: Field,
    apparatus: &Apparatus,
) -> Vec<DeflectionResult<Landing>> {
    particles
        .iter()
        .map(|particle| deflection(kind, particle, field, apparatus).map(|model| model.landing()))
        .collect()
}

pub fn sweep_fields(
    kind: DeflectionKind,
    particle: &Particle,
    fields: &[Field],
    apparatus: &Apparatus,
) -> Vec<DeflectionResult<Landing>> {
    fields
        .iter()
        .map(|&field| deflection(kind, particle, field, apparatus).map(|model| model.landing()))
        .collect()
}

/// `n` evenly spaced field strengths from `min` to `max` inclusive.
pub fn field_range(min: f64, max: f64, n: usize) -> DeflectionResult<Vec<Field>> {
    if n < 2 {
        return Err(DeflectionError::InvalidSampling(format!(
            "a field sweep needs at least two values, got {n}"
        )));
    }
    Array1::linspace(min, max, n).iter().map(|&strength| Field::new(strength)).collect()
}
