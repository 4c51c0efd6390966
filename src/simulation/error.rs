use thiserror::Error;

use super::uncertainty::Parameter;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeflectionError {
    #[error("Invalid particle: {0}")]
    InvalidParticle(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Invalid uncertainty for {parameter}: {value}")]
    InvalidBudget { parameter: Parameter, value: f64 },

    #[error("Unreachable target ({x}, {y}): {reason}")]
    InvalidTarget { x: f64, y: f64, reason: &'static str },

    #[error("Invalid sampling: {0}")]
    InvalidSampling(String),

    #[error("Uncertainty undefined: {0}")]
    UndefinedUncertainty(String),
}

pub type DeflectionResult<T> = Result<T, DeflectionError>;
