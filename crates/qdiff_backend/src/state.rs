//! Qubit state tensors
//!
//! Gantree: L4_Backend → QubitState
//!
//! A pure state over `n` wires stored as an `ndarray` tensor of shape
//! `[2; n]`. Axis `i` belongs to wire `i` of [`QubitState::wires`];
//! flattening is row-major, so the first wire is the most significant bit of
//! the flat index.

use ndarray::{ArrayD, ArrayViewD, IxDyn};
use num_complex::Complex64;
use qdiff_core::{limits, QdiffError, QdiffResult, Wires};
use std::fmt;

/// State vector as a rank-`n` tensor
/// Gantree: QubitState // ArrayD<C64> [2; n] + wires
#[derive(Debug, Clone, PartialEq)]
pub struct QubitState {
    tensor: ArrayD<Complex64>,
    wires: Wires,
}

impl QubitState {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// |0…0⟩ over `0..num_qubits`
    pub fn zero(num_qubits: usize) -> QdiffResult<Self> {
        Self::zero_on(Wires::range(num_qubits))
    }

    /// |0…0⟩ over the given wires
    pub fn zero_on(wires: Wires) -> QdiffResult<Self> {
        check_size(wires.len())?;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); limits::dim(wires.len())];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self::from_amplitudes(amplitudes, wires)
    }

    /// Computational basis state, first bit on the first wire
    pub fn basis(bits: &[u8]) -> QdiffResult<Self> {
        check_size(bits.len())?;
        if bits.iter().any(|&b| b > 1) {
            return Err(QdiffError::InvalidState(
                "basis state entries must be 0 or 1".to_string(),
            ));
        }
        let index = bits.iter().fold(0usize, |acc, &b| (acc << 1) | b as usize);
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); limits::dim(bits.len())];
        amplitudes[index] = Complex64::new(1.0, 0.0);
        Self::from_amplitudes(amplitudes, Wires::range(bits.len()))
    }

    /// State from flat amplitudes over `wires`
    /// Gantree: from_amplitudes(amps,wires) -> Result<Self> // length 2^n
    pub fn from_amplitudes(amplitudes: Vec<Complex64>, wires: Wires) -> QdiffResult<Self> {
        let n = wires.len();
        check_size(n)?;
        if amplitudes.len() != limits::dim(n) {
            return Err(QdiffError::InvalidState(format!(
                "{} amplitudes for {} wire(s)",
                amplitudes.len(),
                n
            )));
        }
        let tensor = ArrayD::from_shape_vec(IxDyn(&vec![2; n]), amplitudes)?;
        Ok(Self { tensor, wires })
    }

    /// State from an existing tensor; every axis must have length 2
    pub fn from_tensor(tensor: ArrayD<Complex64>) -> QdiffResult<Self> {
        if tensor.shape().iter().any(|&d| d != 2) {
            return Err(QdiffError::InvalidState(format!(
                "tensor shape {:?} is not [2; n]",
                tensor.shape()
            )));
        }
        check_size(tensor.ndim())?;
        let wires = Wires::range(tensor.ndim());
        Ok(Self { tensor, wires })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Device wires, one per tensor axis
    pub fn wires(&self) -> &Wires {
        &self.wires
    }

    /// Number of wires
    pub fn num_wires(&self) -> usize {
        self.wires.len()
    }

    /// Dimension of the state vector
    pub fn dim(&self) -> usize {
        self.tensor.len()
    }

    /// Tensor view
    pub fn tensor(&self) -> ArrayViewD<'_, Complex64> {
        self.tensor.view()
    }

    /// Flat amplitudes in row-major order
    pub fn flatten(&self) -> Vec<Complex64> {
        self.tensor.iter().copied().collect()
    }

    /// Amplitude of a flat basis index
    pub fn amplitude(&self, index: usize) -> Option<Complex64> {
        self.tensor.iter().nth(index).copied()
    }

    /// Σ |ψᵢ|²
    pub fn norm_sqr(&self) -> f64 {
        self.tensor.iter().map(|a| a.norm_sqr()).sum()
    }

    /// Check that the squared norm is within `tol` of one
    pub fn is_normalized(&self, tol: f64) -> bool {
        (self.norm_sqr() - 1.0).abs() <= tol
    }
}

fn check_size(num_qubits: usize) -> QdiffResult<()> {
    if num_qubits > limits::MAX_QUBITS {
        return Err(QdiffError::TooManyQubits {
            qubits: num_qubits,
            max: limits::MAX_QUBITS,
        });
    }
    Ok(())
}

impl fmt::Display for QubitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.num_wires();
        let terms: Vec<String> = self
            .tensor
            .iter()
            .enumerate()
            .filter(|(_, a)| a.norm_sqr() > 0.0)
            .map(|(i, a)| format!("({})|{:0width$b}⟩", a, i, width = n))
            .collect();
        if terms.is_empty() {
            write!(f, "0")
        } else {
            write!(f, "{}", terms.join(" + "))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
