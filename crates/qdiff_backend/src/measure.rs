//! Measurement dispatch
//!
//! Gantree: L4_Backend → MeasureDispatch
//!
//! `measure` picks one evaluation strategy per measurement:
//!
//! 1. measurements that need more than a final state are rejected;
//! 2. expectations of weighted-sum observables use a sparse ⟨ψ|H|ψ⟩;
//! 3. everything else rotates the state with the observable's diagonalizing
//!    gates and hands the flat vector to the measurement's own reduction.

use crate::apply::apply_operation;
use crate::state::QubitState;
use log::debug;
use qdiff_core::{
    names, CsrMatrix, MeasurementProcess, MeasurementResult, Operator, QdiffError, QdiffResult,
    ReturnType, Wires,
};
use qdiff_pauli::pauli_sentence;
use std::borrow::Cow;
use std::fmt;

/// Evaluation strategy chosen for a measurement
/// Gantree: MeasureStrategy // enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureStrategy {
    /// Rotate into the eigenbasis, then reduce the flat state
    DiagonalizingGates,
    /// Sparse ⟨ψ|H|ψ⟩
    SparseHamiltonian,
}

impl fmt::Display for MeasureStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasureStrategy::DiagonalizingGates => write!(f, "diagonalizing-gates"),
            MeasureStrategy::SparseHamiltonian => write!(f, "sparse-hamiltonian"),
        }
    }
}

fn not_implemented(mp: &MeasurementProcess) -> QdiffError {
    QdiffError::MeasurementNotImplemented {
        measurement: mp.name().to_string(),
        observable: mp.obs().map(|o| o.name().to_string()),
    }
}

/// Choose the strategy for a measurement
/// Gantree: select_strategy(mp) -> Result<MeasureStrategy>
pub fn select_strategy(mp: &MeasurementProcess) -> QdiffResult<MeasureStrategy> {
    if !mp.is_state_measurement() {
        return Err(not_implemented(mp));
    }
    match mp.obs() {
        Some(obs) if names::is_weighted_sum(obs.name()) => {
            if mp.return_type() == ReturnType::Expectation {
                Ok(MeasureStrategy::SparseHamiltonian)
            } else {
                Err(not_implemented(mp))
            }
        }
        _ => Ok(MeasureStrategy::DiagonalizingGates),
    }
}

/// Evaluate a measurement against a state
/// Gantree: measure(mp,state) -> Result<MeasurementResult>
pub fn measure(mp: &MeasurementProcess, state: &QubitState) -> QdiffResult<MeasurementResult> {
    let strategy = select_strategy(mp)?;
    debug!("measure {} with {} on {} wire(s)", mp, strategy, state.num_wires());
    match strategy {
        MeasureStrategy::DiagonalizingGates => state_diagonalizing_gates(mp, state),
        MeasureStrategy::SparseHamiltonian => state_hamiltonian_expval(mp, state),
    }
}

/// Rotate with the diagonalizing gates and reduce the flat state
/// Gantree: state_diagonalizing_gates(mp,state) -> Result<MeasurementResult>
pub fn state_diagonalizing_gates(
    mp: &MeasurementProcess,
    state: &QubitState,
) -> QdiffResult<MeasurementResult> {
    let mut rotated = Cow::Borrowed(state);
    for gate in mp.diagonalizing_gates()? {
        rotated = Cow::Owned(apply_operation(&gate, &rotated)?);
    }
    mp.process_state(&rotated.flatten(), state.wires())
}

/// ⟨ψ|H|ψ⟩ with sparse products, real part only
/// Gantree: state_hamiltonian_expval(mp,state) -> Result<MeasurementResult>
pub fn state_hamiltonian_expval(
    mp: &MeasurementProcess,
    state: &QubitState,
) -> QdiffResult<MeasurementResult> {
    let obs = mp.obs().ok_or_else(|| not_implemented(mp))?;
    let h = observable_matrix(obs, state.wires())?;

    let flat = state.flatten();
    let bra = CsrMatrix::row_vector(flat.iter().map(|a| a.conj()));
    let ket = h.dot(&CsrMatrix::column_vector(flat))?;
    let value = bra.dot(&ket)?.get(0, 0);
    Ok(MeasurementResult::Scalar(value.re))
}

/// Sparse matrix of a weighted-sum observable over `wire_order`
///
/// Pauli combinations go through their sentence; anything else uses the
/// operator's own sparse matrix.
fn observable_matrix(obs: &Operator, wire_order: &Wires) -> QdiffResult<CsrMatrix> {
    match pauli_sentence(obs) {
        Ok(sentence) => sentence.to_sparse(wire_order),
        Err(QdiffError::NotPauliCombination(_)) => obs.sparse_matrix(wire_order),
        Err(err) => Err(err),
    }
}

// ============================================================================
// Tests
// ============================================================================
