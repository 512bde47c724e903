//! State evolution
//!
//! Gantree: L4_Backend → ApplyOperation
//!
//! In-place amplitude kernels over a flat state vector. Wire position `p` of
//! an `n`-wire state owns bit `1 << (n - 1 - p)` of the flat index. The public
//! entry points copy the input and return a new [`QubitState`].

use crate::state::QubitState;
use log::trace;
use ndarray::Array2;
use num_complex::Complex64;
use qdiff_core::{AtomicOp, CsrMatrix, OpName, Operator, OperatorKind, QdiffResult};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

type C64 = Complex64;

const I: C64 = C64::new(0.0, 1.0);

// ============================================================================
// Entry Points
// ============================================================================

/// Apply an atomic operator, returning the evolved state
/// Gantree: apply_operation(op,state) -> Result<QubitState> // copy-on-write
pub fn apply_operation(op: &AtomicOp, state: &QubitState) -> QdiffResult<QubitState> {
    let n = state.num_wires();
    let positions = state.wires().positions(op.wires())?;
    let masks: Vec<usize> = positions.iter().map(|&p| 1 << (n - 1 - p)).collect();
    let mut amps = state.flatten();
    trace!("apply {} on positions {:?}", op, positions);

    match (op.name(), masks.as_slice()) {
        (OpName::Identity, _) => {}
        (OpName::PauliX, &[m]) => single_qubit(&mut amps, m, |a, b| (b, a)),
        (OpName::PauliY, &[m]) => single_qubit(&mut amps, m, |a, b| (-I * b, I * a)),
        (OpName::PauliZ, &[m]) => single_qubit(&mut amps, m, |a, b| (a, -b)),
        (OpName::Hadamard, &[m]) => single_qubit(&mut amps, m, |a, b| {
            ((a + b) * FRAC_1_SQRT_2, (a - b) * FRAC_1_SQRT_2)
        }),
        (OpName::S, &[m]) => single_qubit(&mut amps, m, |a, b| (a, I * b)),
        (OpName::T, &[m]) => {
            let phase = C64::from_polar(1.0, FRAC_PI_4);
            single_qubit(&mut amps, m, |a, b| (a, b * phase));
        }
        (OpName::PhaseShift, &[m]) => {
            let phase = C64::from_polar(1.0, op.param(0)?);
            single_qubit(&mut amps, m, |a, b| (a, b * phase));
        }
        (OpName::RX, &[m]) => {
            let (c, s) = half_angle(op.param(0)?);
            single_qubit(&mut amps, m, |a, b| {
                (a * c - I * s * b, -I * s * a + b * c)
            });
        }
        (OpName::RY, &[m]) => {
            let (c, s) = half_angle(op.param(0)?);
            single_qubit(&mut amps, m, |a, b| (a * c - b * s, a * s + b * c));
        }
        (OpName::RZ, &[m]) => {
            let theta = op.param(0)?;
            let neg = C64::from_polar(1.0, -theta / 2.0);
            let pos = C64::from_polar(1.0, theta / 2.0);
            single_qubit(&mut amps, m, |a, b| (a * neg, b * pos));
        }
        (OpName::SX | OpName::Rot, &[m]) => {
            let u = op.local_matrix()?;
            single_qubit(&mut amps, m, |a, b| matrix_2x2(&u, a, b));
        }
        (OpName::CNOT, &[control, target]) => cnot(&mut amps, control, target),
        (OpName::CZ, &[m1, m2]) => cz(&mut amps, m1, m2),
        (OpName::SWAP, &[m1, m2]) => swap(&mut amps, m1, m2),
        (OpName::CY, &[control, target]) => {
            controlled_single_qubit(&mut amps, control, target, |a, b| (-I * b, I * a))
        }
        _ => {
            let local = CsrMatrix::from_dense(op.local_matrix()?.view());
            amps = local.expand(&positions, n)?.matvec(&amps)?;
        }
    }

    QubitState::from_amplitudes(amps, state.wires().clone())
}

/// Apply any operator; composite operators go through their sparse matrix
/// Gantree: apply_operator(op,state) -> Result<QubitState>
pub fn apply_operator(op: &Operator, state: &QubitState) -> QdiffResult<QubitState> {
    match op.kind() {
        OperatorKind::Atomic(atomic) => apply_operation(atomic, state),
        _ => {
            trace!("apply {} through its sparse matrix", op.name());
            let amps = op.sparse_matrix(state.wires())?.matvec(&state.flatten())?;
            QubitState::from_amplitudes(amps, state.wires().clone())
        }
    }
}

// ============================================================================
// Single-Qubit Kernels
// ============================================================================

fn half_angle(theta: f64) -> (f64, f64) {
    ((theta / 2.0).cos(), (theta / 2.0).sin())
}

fn matrix_2x2(u: &Array2<C64>, a: C64, b: C64) -> (C64, C64) {
    (u[[0, 0]] * a + u[[0, 1]] * b, u[[1, 0]] * a + u[[1, 1]] * b)
}

fn single_qubit<F>(state: &mut [C64], mask: usize, f: F)
where
    F: Fn(C64, C64) -> (C64, C64),
{
    for i in 0..state.len() {
        if i & mask == 0 {
            let j = i | mask;
            let (new_i, new_j) = f(state[i], state[j]);
            state[i] = new_i;
            state[j] = new_j;
        }
    }
}

// ============================================================================
// Two-Qubit Kernels
// ============================================================================

fn controlled_single_qubit<F>(state: &mut [C64], control: usize, target: usize, f: F)
where
    F: Fn(C64, C64) -> (C64, C64),
{
    for i in 0..state.len() {
        if i & control != 0 && i & target == 0 {
            let j = i | target;
            let (new_i, new_j) = f(state[i], state[j]);
            state[i] = new_i;
            state[j] = new_j;
        }
    }
}

fn cnot(state: &mut [C64], control: usize, target: usize) {
    for i in 0..state.len() {
        if i & control != 0 && i & target == 0 {
            state.swap(i, i | target);
        }
    }
}

fn cz(state: &mut [C64], mask1: usize, mask2: usize) {
    for (i, amp) in state.iter_mut().enumerate() {
        if i & mask1 != 0 && i & mask2 != 0 {
            *amp = -*amp;
        }
    }
}

fn swap(state: &mut [C64], mask1: usize, mask2: usize) {
    for i in 0..state.len() {
        if (i & mask1 != 0) != (i & mask2 != 0) {
            let j = i ^ mask1 ^ mask2;
            if i < j {
                state.swap(i, j);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
