//! Measurement processes
//!
//! Gantree: L2_Measurements → MeasurementProcess
//!
//! A [`MeasurementProcess`] names what to extract from a state: an
//! expectation, a variance, probabilities or the state itself, plus the
//! sampling-based kinds that have no state-based evaluation. The state
//! reductions live here; choosing a strategy is the backend's job.

use crate::constants::limits;
use crate::error::{QdiffError, QdiffResult};
use crate::operator::Operator;
use crate::ops::AtomicOp;
use crate::types::Wires;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ReturnType
// ============================================================================

/// Kind of measurement
/// Gantree: ReturnType // closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnType {
    /// ⟨ψ|O|ψ⟩
    Expectation,
    /// ⟨O²⟩ − ⟨O⟩²
    Variance,
    /// Computational-basis probabilities
    Probability,
    /// Raw state vector
    State,
    /// Shot samples
    Sample,
    /// Shot histogram
    Counts,
    /// Classical-shadow snapshots
    ClassicalShadow,
    /// Expectation estimated from classical shadows
    ShadowExpval,
}

impl ReturnType {
    /// Measurement class name used in error messages
    pub fn class_name(&self) -> &'static str {
        match self {
            ReturnType::Expectation => "ExpectationMP",
            ReturnType::Variance => "VarianceMP",
            ReturnType::Probability => "ProbabilityMP",
            ReturnType::State => "StateMP",
            ReturnType::Sample => "SampleMP",
            ReturnType::Counts => "CountsMP",
            ReturnType::ClassicalShadow => "ClassicalShadowMP",
            ReturnType::ShadowExpval => "ShadowExpvalMP",
        }
    }

    /// Check if the kind can be evaluated from a state alone
    pub fn is_state_measurement(&self) -> bool {
        matches!(
            self,
            ReturnType::Expectation
                | ReturnType::Variance
                | ReturnType::Probability
                | ReturnType::State
        )
    }
}

// ============================================================================
// MeasurementResult
// ============================================================================

/// Value produced by a state-based measurement
/// Gantree: MeasurementResult // Scalar | Vector | State
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeasurementResult {
    /// Expectation or variance
    Scalar(f64),
    /// Probabilities
    Vector(Vec<f64>),
    /// Amplitudes
    State(Vec<Complex64>),
}

impl MeasurementResult {
    /// Scalar value, if this is one
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            MeasurementResult::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Probability vector, if this is one
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            MeasurementResult::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Amplitudes, if this is a state
    pub fn as_state(&self) -> Option<&[Complex64]> {
        match self {
            MeasurementResult::State(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// MeasurementProcess
// ============================================================================

/// Settings of a classical-shadow measurement
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowSpec {
    /// Number of equal parts the snapshots are split into for median-of-means
    pub k: usize,
    /// Observables estimated from the shadow
    pub observables: Vec<Operator>,
    /// Seed of the random measurement bases
    pub seed: Option<u64>,
}

/// What to extract from a state
/// Gantree: MeasurementProcess // return_type + obs | wires
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementProcess {
    return_type: ReturnType,
    obs: Option<Operator>,
    wires: Wires,
    shadow: Option<ShadowSpec>,
}

impl MeasurementProcess {
    fn with_obs(return_type: ReturnType, obs: Operator) -> Self {
        Self {
            return_type,
            obs: Some(obs),
            wires: Wires::empty(),
            shadow: None,
        }
    }

    fn with_wires(return_type: ReturnType, wires: Wires) -> Self {
        Self {
            return_type,
            obs: None,
            wires,
            shadow: None,
        }
    }

    /// Expectation value of an observable
    pub fn expval(obs: Operator) -> Self {
        Self::with_obs(ReturnType::Expectation, obs)
    }

    /// Variance of an observable
    pub fn var(obs: Operator) -> Self {
        Self::with_obs(ReturnType::Variance, obs)
    }

    /// Probabilities over `wires` (all device wires when empty)
    pub fn probs(wires: Wires) -> Self {
        Self::with_wires(ReturnType::Probability, wires)
    }

    /// Probabilities in the eigenbasis of an observable
    pub fn probs_of(obs: Operator) -> Self {
        Self::with_obs(ReturnType::Probability, obs)
    }

    /// Full state vector
    pub fn state() -> Self {
        Self::with_wires(ReturnType::State, Wires::empty())
    }

    /// Shot samples of an observable
    pub fn sample(obs: Operator) -> Self {
        Self::with_obs(ReturnType::Sample, obs)
    }

    /// Shot histogram over `wires`
    pub fn counts(wires: Wires) -> Self {
        Self::with_wires(ReturnType::Counts, wires)
    }

    /// Classical shadow over `wires`
    pub fn classical_shadow(wires: Wires, seed: Option<u64>) -> Self {
        Self {
            shadow: Some(ShadowSpec {
                k: 1,
                observables: Vec::new(),
                seed,
            }),
            ..Self::with_wires(ReturnType::ClassicalShadow, wires)
        }
    }

    /// Shadow estimate of the expectation of `observables`
    pub fn shadow_expval(observables: Vec<Operator>, k: usize, seed: Option<u64>) -> Self {
        let wires = observables
            .iter()
            .fold(Wires::empty(), |acc, o| acc.union(&o.wires()));
        Self {
            shadow: Some(ShadowSpec {
                k,
                observables,
                seed,
            }),
            ..Self::with_wires(ReturnType::ShadowExpval, wires)
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Measurement kind
    pub fn return_type(&self) -> ReturnType {
        self.return_type
    }

    /// Measured observable
    pub fn obs(&self) -> Option<&Operator> {
        self.obs.as_ref()
    }

    /// Classical-shadow settings
    pub fn shadow(&self) -> Option<&ShadowSpec> {
        self.shadow.as_ref()
    }

    /// Measurement class name
    pub fn name(&self) -> &'static str {
        self.return_type.class_name()
    }

    /// Measured wires: the observable's, else the explicit ones
    pub fn wires(&self) -> Wires {
        match &self.obs {
            Some(obs) => obs.wires(),
            None => self.wires.clone(),
        }
    }

    /// Check if a state alone determines the result
    pub fn is_state_measurement(&self) -> bool {
        self.return_type.is_state_measurement()
    }

    /// Gates rotating the observable's eigenbasis onto the computational basis
    pub fn diagonalizing_gates(&self) -> QdiffResult<Vec<AtomicOp>> {
        match &self.obs {
            Some(obs) => obs.diagonalizing_gates(),
            None => Ok(Vec::new()),
        }
    }

    fn not_implemented(&self) -> QdiffError {
        QdiffError::MeasurementNotImplemented {
            measurement: self.name().to_string(),
            observable: self.obs.as_ref().map(|o| o.name().to_string()),
        }
    }

    // ========================================================================
    // State Reduction
    // ========================================================================

    /// Reduce a flattened state, already rotated into the observable's
    /// eigenbasis, to this measurement's result
    /// Gantree: process_state(&self,flat,wires) -> Result<MeasurementResult>
    pub fn process_state(
        &self,
        flat: &[Complex64],
        device_wires: &Wires,
    ) -> QdiffResult<MeasurementResult> {
        if device_wires.len() > limits::MAX_QUBITS {
            return Err(QdiffError::TooManyQubits {
                qubits: device_wires.len(),
                max: limits::MAX_QUBITS,
            });
        }
        let dim = limits::dim(device_wires.len());
        if flat.len() != dim {
            return Err(QdiffError::InvalidState(format!(
                "{} amplitudes for {} wire(s)",
                flat.len(),
                device_wires.len()
            )));
        }

        match self.return_type {
            ReturnType::State => Ok(MeasurementResult::State(flat.to_vec())),
            ReturnType::Probability => {
                let wires = self.wires();
                let wires = if wires.is_empty() {
                    device_wires.clone()
                } else {
                    wires
                };
                Ok(MeasurementResult::Vector(marginal_probs(
                    flat,
                    device_wires,
                    &wires,
                )?))
            }
            ReturnType::Expectation | ReturnType::Variance => {
                let obs = self.obs.as_ref().ok_or_else(|| self.not_implemented())?;
                let eigvals = obs.eigvals()?;
                let probs = marginal_probs(flat, device_wires, &obs.wires())?;
                if eigvals.len() != probs.len() {
                    return Err(QdiffError::ShapeMismatch {
                        left: (eigvals.len(), 1),
                        right: (probs.len(), 1),
                    });
                }
                let mean: f64 = probs.iter().zip(&eigvals).map(|(p, e)| p * e).sum();
                if self.return_type == ReturnType::Expectation {
                    return Ok(MeasurementResult::Scalar(mean));
                }
                let second: f64 = probs.iter().zip(&eigvals).map(|(p, e)| p * e * e).sum();
                Ok(MeasurementResult::Scalar(second - mean * mean))
            }
            _ => Err(self.not_implemented()),
        }
    }
}

/// Marginal probabilities over `targets`, first target most significant
fn marginal_probs(
    flat: &[Complex64],
    device_wires: &Wires,
    targets: &Wires,
) -> QdiffResult<Vec<f64>> {
    let n = device_wires.len();
    let shifts: Vec<usize> = device_wires
        .positions(targets)?
        .into_iter()
        .map(|p| n - 1 - p)
        .collect();
    let mut probs = vec![0.0; limits::dim(targets.len())];
    for (index, amp) in flat.iter().enumerate() {
        let sub = shifts
            .iter()
            .fold(0usize, |acc, &s| (acc << 1) | ((index >> s) & 1));
        probs[sub] += amp.norm_sqr();
    }
    Ok(probs)
}

impl fmt::Display for MeasurementProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.return_type {
            ReturnType::Expectation => "expval",
            ReturnType::Variance => "var",
            ReturnType::Probability => "probs",
            ReturnType::State => "state",
            ReturnType::Sample => "sample",
            ReturnType::Counts => "counts",
            ReturnType::ClassicalShadow => "classical_shadow",
            ReturnType::ShadowExpval => "shadow_expval",
        };
        match &self.obs {
            Some(obs) => write!(f, "{}({})", label, obs),
            None if self.wires.is_empty() => write!(f, "{}()", label),
            None => write!(f, "{}(wires={})", label, self.wires),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
