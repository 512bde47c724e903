//! Conversion between matrices, operators and Pauli sentences
//!
//! Gantree: L3_Conversion → PauliConversion
//!
//! [`pauli_decompose`] expands a dense `2^n × 2^n` matrix in the Pauli basis
//! with an in-place Walsh–Hadamard style transform. [`pauli_sentence`] turns
//! an arithmetic operator into a sentence and memoizes the result on the
//! operator. [`sentence_to_hamiltonian`] goes back to a legacy weighted sum.

use crate::config::DecomposeConfig;
use log::{debug, trace};
use ndarray::{s, Array2, ArrayView2};
use num_complex::Complex64;
use qdiff_core::{
    limits, tolerance, AtomicOp, OpName, Operator, OperatorKind, Pauli, PauliSentence,
    PauliWord, QdiffError, QdiffResult, Wire, Wires,
};

/// Result of [`pauli_decompose`]
/// Gantree: PauliDecomposition // Sentence | Hamiltonian
#[derive(Debug, Clone, PartialEq)]
pub enum PauliDecomposition {
    /// Requested with `pauli = true`
    Sentence(PauliSentence),
    /// Legacy weighted sum of Pauli tensors
    Hamiltonian(Operator),
}

impl PauliDecomposition {
    /// Sentence form, if this is one
    pub fn as_sentence(&self) -> Option<&PauliSentence> {
        match self {
            PauliDecomposition::Sentence(s) => Some(s),
            PauliDecomposition::Hamiltonian(_) => None,
        }
    }

    /// Operator form, if this is one
    pub fn as_operator(&self) -> Option<&Operator> {
        match self {
            PauliDecomposition::Sentence(_) => None,
            PauliDecomposition::Hamiltonian(op) => Some(op),
        }
    }

    /// Number of terms
    pub fn num_terms(&self) -> usize {
        match self {
            PauliDecomposition::Sentence(s) => s.len(),
            PauliDecomposition::Hamiltonian(op) => match op.kind() {
                OperatorKind::Hamiltonian { ops, .. } => ops.len(),
                _ => 1,
            },
        }
    }
}

// ============================================================================
// Dense Decomposition
// ============================================================================

/// Decompose a matrix into a linear combination of Pauli words
/// Gantree: pauli_decompose(matrix,config) -> Result<PauliDecomposition>
///
/// Coefficients with magnitude at most `1e-8` are dropped. Term order
/// follows the labels `I, X, Y, Z` with the first wire varying slowest.
pub fn pauli_decompose(
    matrix: ArrayView2<'_, Complex64>,
    config: &DecomposeConfig,
) -> QdiffResult<PauliDecomposition> {
    let padded = config.padding.then(|| pad_to_power_of_two(matrix));
    let matrix: ArrayView2<'_, Complex64> = match &padded {
        Some(padded) => padded.view(),
        None => matrix.reborrow(),
    };

    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(QdiffError::NotSquare { rows, cols });
    }
    if !rows.is_power_of_two() {
        return Err(QdiffError::NotPowerOfTwo { rows, cols });
    }
    let num_qubits = rows.trailing_zeros() as usize;
    if num_qubits > limits::MAX_QUBITS {
        return Err(QdiffError::TooManyQubits {
            qubits: num_qubits,
            max: limits::MAX_QUBITS,
        });
    }
    let wires = config.resolve_wires(num_qubits)?;
    debug!(
        "pauli_decompose: {}x{} matrix over {} qubit(s), pauli={}",
        rows, cols, num_qubits, config.pauli
    );

    let term_mat = pauli_transform(matrix, num_qubits);
    let terms = collect_terms(&term_mat, &wires, config.hide_identity);
    debug!("pauli_decompose: kept {} term(s)", terms.len());

    if config.pauli {
        let sentence = terms
            .into_iter()
            .map(|(factors, coeff)| (factors.into_iter().collect::<PauliWord>(), coeff))
            .collect();
        return Ok(PauliDecomposition::Sentence(sentence));
    }

    let (coeffs, ops): (Vec<Complex64>, Vec<Operator>) = terms
        .into_iter()
        .map(|(factors, coeff)| Ok((coeff, factors_to_operator(factors)?)))
        .collect::<QdiffResult<Vec<_>>>()?
        .into_iter()
        .unzip();
    Ok(PauliDecomposition::Hamiltonian(Operator::hamiltonian(
        coeffs, ops,
    )?))
}

/// Zero-pad to the smallest square power-of-two shape
fn pad_to_power_of_two(matrix: ArrayView2<'_, Complex64>) -> Array2<Complex64> {
    let (rows, cols) = matrix.dim();
    let side = rows.max(cols).next_power_of_two();
    if rows == side && cols == side {
        return matrix.to_owned();
    }
    trace!("padding {}x{} matrix to {}x{}", rows, cols, side, side);
    let mut out = Array2::zeros((side, side));
    out.slice_mut(s![..rows, ..cols]).assign(&matrix);
    out
}

/// Pauli coefficient table indexed by (z-bits, x-bits)
///
/// Row `r`, column `c` of the result holds the coefficient of the word whose
/// qubit `q` has a Z component when bit `n-1-q` of `r` is set and an X
/// component when the same bit of `c` is set.
fn pauli_transform(matrix: ArrayView2<'_, Complex64>, num_qubits: usize) -> Array2<Complex64> {
    let dim = limits::dim(num_qubits);
    // XOR permutation: column j of row k holds M[k, k ^ j]
    let mut term = Array2::from_shape_fn((dim, dim), |(k, j)| matrix[[k, k ^ j]]);

    let i_unit = Complex64::new(0.0, 1.0);
    for idx in 0..num_qubits {
        let bit = 1usize << (num_qubits - 1 - idx);
        for r in (0..dim).filter(|r| r & bit == 0) {
            for j in 0..dim {
                let a = term[[r, j]];
                let b = term[[r | bit, j]];
                term[[r, j]] = a + b;
                term[[r | bit, j]] = a - b;
            }
        }
        for r in (0..dim).filter(|r| r & bit != 0) {
            for j in (0..dim).filter(|j| j & bit != 0) {
                term[[r, j]] *= i_unit;
            }
        }
    }
    term.mapv_inplace(|v| v / dim as f64);
    term
}

type Factors = Vec<(Wire, Pauli)>;

/// Walk all `4^n` labels and keep the non-negligible ones
fn collect_terms(
    term_mat: &Array2<Complex64>,
    wires: &Wires,
    hide_identity: bool,
) -> Vec<(Factors, Complex64)> {
    let n = wires.len();
    let mut terms = Vec::new();
    for label in 0..(1usize << (2 * n)) {
        let paulis: Vec<Pauli> = (0..n)
            .map(|q| Pauli::ALL[(label >> (2 * (n - 1 - q))) & 3])
            .collect();
        let (row, col) = paulis.iter().fold((0usize, 0usize), |(r, c), p| {
            ((r << 1) | p.has_z() as usize, (c << 1) | p.has_x() as usize)
        });
        let coeff = term_mat[[row, col]];
        if tolerance::is_negligible(coeff) {
            continue;
        }

        let all_identity = paulis.iter().all(|p| *p == Pauli::I);
        let factors: Factors = wires
            .iter()
            .cloned()
            .zip(paulis)
            .filter(|(_, p)| !(hide_identity && !all_identity && *p == Pauli::I))
            .collect();
        if !factors.is_empty() {
            terms.push((factors, coeff));
        }
    }
    terms
}

/// Single factor → atomic Pauli; several → legacy tensor
fn factors_to_operator(factors: Factors) -> QdiffResult<Operator> {
    let mut ops: Vec<Operator> = factors
        .into_iter()
        .map(|(wire, pauli)| pauli_operator(pauli, wire))
        .collect();
    if ops.len() == 1 {
        return Ok(ops.remove(0));
    }
    Operator::tensor(ops)
}

fn pauli_operator(pauli: Pauli, wire: Wire) -> Operator {
    match pauli {
        Pauli::I => Operator::identity(wire),
        Pauli::X => Operator::pauli_x(wire),
        Pauli::Y => Operator::pauli_y(wire),
        Pauli::Z => Operator::pauli_z(wire),
    }
}

// ============================================================================
// Operator → Sentence
// ============================================================================

/// Pauli sentence of an operator built from Pauli words
/// Gantree: pauli_sentence(op) -> Result<PauliSentence> // memoized
///
/// The result is cached on `op`; later calls return the cached sentence.
pub fn pauli_sentence(op: &Operator) -> QdiffResult<PauliSentence> {
    if let Some(cached) = op.pauli_rep() {
        trace!("pauli_sentence: cache hit for {}", op.name());
        return Ok(cached.clone());
    }
    let sentence = compute_sentence(op)?;
    op.cache_pauli_rep(sentence.clone());
    Ok(sentence)
}

fn not_pauli(op: &Operator) -> QdiffError {
    QdiffError::NotPauliCombination(op.to_string())
}

fn compute_sentence(op: &Operator) -> QdiffResult<PauliSentence> {
    match op.kind() {
        OperatorKind::Atomic(atomic) => atomic_sentence(atomic).ok_or_else(|| not_pauli(op)),
        OperatorKind::Tensor(factors) => {
            if !op.is_pauli_word() {
                return Err(not_pauli(op));
            }
            product(factors)
        }
        OperatorKind::Prod(factors) => product(factors),
        OperatorKind::SProd { scalar, base } => Ok(pauli_sentence(base)?.scale(*scalar)),
        OperatorKind::Hamiltonian { coeffs, ops } => {
            if !ops.iter().all(Operator::is_pauli_word) {
                return Err(not_pauli(op));
            }
            let mut total = PauliSentence::new();
            for (&coeff, term) in coeffs.iter().zip(ops) {
                total += &pauli_sentence(term)?.scale(coeff);
            }
            Ok(total)
        }
        OperatorKind::Sum(summands) => {
            let mut total = PauliSentence::new();
            for summand in summands {
                total += &pauli_sentence(summand)?;
            }
            Ok(total)
        }
        OperatorKind::Adjoint(_) | OperatorKind::SparseHamiltonian { .. } => Err(not_pauli(op)),
    }
}

fn atomic_sentence(op: &AtomicOp) -> Option<PauliSentence> {
    match op.name().pauli()? {
        Pauli::I => Some(PauliSentence::identity()),
        pauli => Some(PauliSentence::single(op.wires()[0].clone(), pauli)),
    }
}

fn product(factors: &[Operator]) -> QdiffResult<PauliSentence> {
    let mut iter = factors.iter();
    let first = match iter.next() {
        Some(f) => pauli_sentence(f)?,
        None => return Ok(PauliSentence::identity()),
    };
    iter.try_fold(first, |acc, f| Ok(acc.mul_sentence(&pauli_sentence(f)?)))
}

// ============================================================================
// Sentence → Hamiltonian
// ============================================================================

/// Legacy Hamiltonian with one term per word of `sentence`
/// Gantree: sentence_to_hamiltonian(sentence,wire_order) -> Result<Operator>
///
/// The identity word becomes `Identity` over `wire_order`, which defaults to
/// the sentence's own wires.
pub fn sentence_to_hamiltonian(
    sentence: &PauliSentence,
    wire_order: Option<&Wires>,
) -> QdiffResult<Operator> {
    if sentence.is_empty() {
        return Operator::hamiltonian(Vec::<Complex64>::new(), Vec::new());
    }
    let wire_order = wire_order.cloned().unwrap_or_else(|| sentence.wires());

    let mut coeffs = Vec::with_capacity(sentence.len());
    let mut ops = Vec::with_capacity(sentence.len());
    for (word, coeff) in sentence.iter() {
        let op = if word.is_identity() {
            if wire_order.is_empty() {
                return Err(QdiffError::InvalidHyperparameter {
                    op: OpName::Identity.to_string(),
                    reason: "identity term needs at least one wire".to_string(),
                });
            }
            AtomicOp::new(OpName::Identity, vec![], wire_order.clone())?.into()
        } else {
            factors_to_operator(word.iter().map(|(w, p)| (w.clone(), p)).collect())?
        };
        coeffs.push(coeff);
        ops.push(op);
    }
    Operator::hamiltonian(coeffs, ops)
}

// ============================================================================
// Tests
// ============================================================================
