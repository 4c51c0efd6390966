//! First-order propagation of input uncertainties to the contact coordinate.
//!
//! For independent inputs `p_i` with absolute uncertainties `Δp_i`, the propagated uncertainty
//! of the contact coordinate `f` is `Δf = √Σ(∂f/∂p_i · Δp_i)²`. The partials come either from the
//! closed forms of each [`DeflectionModel`] or from central differences that rebuild the model
//! around the perturbed input.
//!
//! [`uncertainty_corridor`] is a separate, coarser tool for drawing: it pushes every input by its
//! full uncertainty in the same direction at once and reports where the two resulting particles
//! land. That envelope is a worst case, not a confidence interval.

use log::warn;
use static_assertions::const_assert_eq;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};

use super::error::{DeflectionError, DeflectionResult};
use super::variables::CONSTANT_UNCERTAINTY_FACTOR;
use super::{DeflectionModel, Scenario};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, Display)]
pub enum Parameter {
    #[strum(to_string = "initial speed")]
    Speed,
    #[strum(to_string = "launch angle")]
    Angle,
    #[strum(to_string = "launch height")]
    Height,
    #[strum(to_string = "charge")]
    Charge,
    #[strum(to_string = "mass")]
    Mass,
    #[strum(to_string = "field intensity")]
    Field,
}

const_assert_eq!(Parameter::COUNT, 6);

/// Absolute uncertainty per input, in the input's own units (m/s, rad, m, e, u, field unit).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UncertaintyBudget {
    values: [f64; Parameter::COUNT],
}

impl UncertaintyBudget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, parameter: Parameter, uncertainty: f64) -> DeflectionResult<Self> {
        if !(uncertainty.is_finite() && uncertainty >= 0.0) {
            return Err(DeflectionError::InvalidBudget {
                parameter,
                value: uncertainty,
            });
        }
        self.values[parameter as usize] = uncertainty;
        Ok(self)
    }

    pub fn absolute(entries: &[(Parameter, f64)]) -> DeflectionResult<Self> {
        entries
            .iter()
            .try_fold(Self::new(), |budget, &(parameter, value)| budget.with(parameter, value))
    }

    /// Converts relative uncertainties into absolute ones around the scenario's nominal values.
    pub fn from_relative(scenario: &Scenario, entries: &[(Parameter, f64)]) -> DeflectionResult<Self> {
        entries.iter().try_fold(Self::new(), |budget, &(parameter, relative)| {
            if !(relative.is_finite() && relative >= 0.0) {
                return Err(DeflectionError::InvalidBudget {
                    parameter,
                    value: relative,
                });
            }
            budget.with(parameter, relative * scenario.value(parameter).abs())
        })
    }

    /// `relative` on speed, angle, height and field, a tenth of it on the better known mass and charge.
    pub fn typical(scenario: &Scenario, relative: f64) -> DeflectionResult<Self> {
        let entries: Vec<(Parameter, f64)> = Parameter::iter()
            .map(|parameter| match parameter {
                Parameter::Charge | Parameter::Mass => (parameter, relative * CONSTANT_UNCERTAINTY_FACTOR),
                _ => (parameter, relative),
            })
            .collect();
        Self::from_relative(scenario, &entries)
    }

    pub fn scaled(&self, factor: f64) -> DeflectionResult<Self> {
        Parameter::iter().try_fold(Self::new(), |budget, parameter| {
            budget.with(parameter, self.get(parameter) * factor)
        })
    }

    pub fn get(&self, parameter: Parameter) -> f64 {
        self.values[parameter as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Parameter, f64)> + '_ {
        Parameter::iter().map(|parameter| (parameter, self.get(parameter)))
    }
}

// Dropdown in the UI will be automatically populated with these options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, Display)]
pub enum PropagationMethod {
    #[default]
    Analytic,
    #[strum(to_string = "Central difference")]
    CentralDifference,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub parameter: Parameter,
    pub partial: f64,
    pub uncertainty: f64,
}

impl Contribution {
    pub fn term(&self) -> f64 {
        self.partial * self.uncertainty
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UncertaintyReport {
    pub nominal: f64,
    pub uncertainty: f64,
    pub contributions: Vec<Contribution>,
    /// Inputs whose partial could not be evaluated and were left out of the sum
    pub failed: Vec<Parameter>,
}

fn nominal_contact(scenario: &Scenario) -> DeflectionResult<(Box<dyn DeflectionModel>, f64)> {
    let model = scenario.model()?;
    let contact = model.point_of_contact().ok_or_else(|| {
        DeflectionError::UndefinedUncertainty("the nominal trajectory never reaches the plane".to_string())
    })?;
    Ok((model, contact))
}

fn perturbed_contact(scenario: &Scenario, parameter: Parameter, value: f64) -> Option<f64> {
    scenario
        .with_value(parameter, value)
        .and_then(|perturbed| perturbed.model())
        .ok()?
        .point_of_contact()
}

/// ∂f/∂p by central difference, one-sided where one neighbour has no contact.
pub fn central_difference(scenario: &Scenario, parameter: Parameter, nominal: f64) -> Option<f64> {
    let tolerances = scenario.apparatus.tolerances;
    let value = scenario.value(parameter);
    let step = (value.abs() * tolerances.step_relative).max(tolerances.step_floor);
    let (above, below) = (value + step, value - step);

    match (
        perturbed_contact(scenario, parameter, above),
        perturbed_contact(scenario, parameter, below),
    ) {
        (Some(forward), Some(backward)) => Some((forward - backward) / (above - below)),
        (Some(forward), None) => Some((forward - nominal) / (above - value)),
        (None, Some(backward)) => Some((nominal - backward) / (value - below)),
        (None, None) => None,
    }
}

fn partial(
    scenario: &Scenario,
    model: &dyn DeflectionModel,
    parameter: Parameter,
    nominal: f64,
    method: PropagationMethod,
) -> Option<f64> {
    let derivative = match method {
        PropagationMethod::Analytic => model.sensitivity(parameter),
        PropagationMethod::CentralDifference => central_difference(scenario, parameter, nominal),
    };
    derivative.filter(|derivative| derivative.is_finite())
}

pub fn propagate_uncertainty(
    scenario: &Scenario,
    budget: &UncertaintyBudget,
    method: PropagationMethod,
) -> DeflectionResult<UncertaintyReport> {
    let (model, nominal) = nominal_contact(scenario)?;

    let mut contributions = Vec::with_capacity(Parameter::COUNT);
    let mut failed = Vec::new();
    for (parameter, uncertainty) in budget.iter() {
        if uncertainty == 0.0 {
            continue;
        }
        match partial(scenario, model.as_ref(), parameter, nominal, method) {
            Some(partial) => contributions.push(Contribution {
                parameter,
                partial,
                uncertainty,
            }),
            None => {
                warn!("partial derivative with respect to {parameter} is undefined, leaving it out");
                failed.push(parameter);
            }
        }
    }

    if contributions.is_empty() && !failed.is_empty() {
        return Err(DeflectionError::UndefinedUncertainty(format!(
            "no partial derivative could be evaluated ({} failed)",
            failed.len()
        )));
    }

    let uncertainty = contributions
        .iter()
        .map(|contribution| contribution.term().powi(2))
        .sum::<f64>()
        .sqrt();

    Ok(UncertaintyReport {
        nominal,
        uncertainty,
        contributions,
        failed,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub scenario: Scenario,
    /// False when a shifted input fell outside its physical range or the shifted particle cannot
    /// be modelled; `contact` is then `None` and `scenario` should not be drawn.
    pub in_domain: bool,
    pub contact: Option<f64>,
}

impl Bound {
    fn new(scenario: Scenario, in_domain: bool) -> Self {
        let model = if in_domain {
            scenario
                .model()
                .inspect_err(|e| warn!("bounding particle has no trajectory: {e}"))
                .ok()
        } else {
            None
        };
        Bound {
            scenario,
            in_domain: model.is_some(),
            contact: model.and_then(|model| model.point_of_contact()),
        }
    }
}

/// Moves one input of a bounding particle, returning false if the new value is not physical.
fn shift_input(bound: &mut Scenario, parameter: Parameter, value: f64) -> bool {
    match bound.with_value(parameter, value) {
        Ok(shifted) => {
            *bound = shifted;
            true
        }
        Err(e) => {
            warn!("{parameter} bound leaves its physical range: {e}");
            false
        }
    }
}

/// Worst-case envelope around a nominal trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corridor {
    pub nominal: f64,
    /// Every input pushed the way that moves the contact down
    pub lower: Bound,
    /// Every input pushed the way that moves the contact up
    pub upper: Bound,
}

impl Corridor {
    /// `[min, max]` of the two bounding contacts, when both particles land.
    pub fn interval(&self) -> Option<(f64, f64)> {
        let (a, b) = (self.lower.contact?, self.upper.contact?);
        Some((a.min(b), a.max(b)))
    }
}

/// Builds the two bounding particles of the uncertainty corridor.
///
/// Each input moves by its full uncertainty in the direction given by the sign of its partial,
/// so for charge and field the direction follows the sign of `charge × field`. Inputs whose
/// partial is undefined or zero stay at their nominal value. A bound pushed outside an input's
/// physical range (an angle past the normal, a negative height) is kept but has no contact.
pub fn uncertainty_corridor(
    scenario: &Scenario,
    budget: &UncertaintyBudget,
    method: PropagationMethod,
) -> DeflectionResult<Corridor> {
    let (model, nominal) = nominal_contact(scenario)?;

    let (mut lower, mut upper) = (*scenario, *scenario);
    let (mut lower_valid, mut upper_valid) = (true, true);
    for (parameter, uncertainty) in budget.iter() {
        if uncertainty == 0.0 {
            continue;
        }
        let Some(derivative) = partial(scenario, model.as_ref(), parameter, nominal, method) else {
            warn!("direction of {parameter} is undefined, holding it at its nominal value");
            continue;
        };
        if derivative == 0.0 {
            continue;
        }

        let value = scenario.value(parameter);
        let shift = uncertainty.copysign(derivative);
        upper_valid &= shift_input(&mut upper, parameter, value + shift);
        lower_valid &= shift_input(&mut lower, parameter, value - shift);
    }

    Ok(Corridor {
        nominal,
        lower: Bound::new(lower, lower_valid),
        upper: Bound::new(upper, upper_valid),
    })
}
