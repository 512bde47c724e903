//! Single-qubit Paulis and Pauli words
//!
//! Gantree: L1_PauliModel → PauliWord
//!
//! A [`PauliWord`] maps wires to non-identity Paulis; every wire missing from
//! the map is implicitly `I`, so the identity word is the empty map.

use crate::constants::limits;
use crate::error::{QdiffError, QdiffResult};
use crate::sparse::CsrMatrix;
use crate::types::{Wire, Wires};
use ndarray::{arr2, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I_UNIT: Complex64 = Complex64::new(0.0, 1.0);
const MINUS_I: Complex64 = Complex64::new(0.0, -1.0);

// ============================================================================
// Pauli
// ============================================================================

/// Single-qubit Pauli operator
/// Gantree: Pauli // I, X, Y, Z
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity
    I,
    /// Bit flip
    X,
    /// Bit and phase flip
    Y,
    /// Phase flip
    Z,
}

impl Pauli {
    /// All four Paulis in label order
    pub const ALL: [Pauli; 4] = [Pauli::I, Pauli::X, Pauli::Y, Pauli::Z];

    /// Product of two Paulis as (result, phase)
    /// Gantree: mul(self,other) -> (Pauli, Complex64) // group table
    pub fn mul(self, other: Pauli) -> (Pauli, Complex64) {
        use Pauli::*;
        match (self, other) {
            (I, p) | (p, I) => (p, ONE),
            (X, X) | (Y, Y) | (Z, Z) => (I, ONE),
            (X, Y) => (Z, I_UNIT),
            (Y, X) => (Z, MINUS_I),
            (Y, Z) => (X, I_UNIT),
            (Z, Y) => (X, MINUS_I),
            (Z, X) => (Y, I_UNIT),
            (X, Z) => (Y, MINUS_I),
        }
    }

    /// Whether the Pauli has an X component (X or Y)
    pub fn has_x(self) -> bool {
        matches!(self, Pauli::X | Pauli::Y)
    }

    /// Whether the Pauli has a Z component (Y or Z)
    pub fn has_z(self) -> bool {
        matches!(self, Pauli::Y | Pauli::Z)
    }

    /// 2×2 matrix
    pub fn matrix(self) -> Array2<Complex64> {
        let z = Complex64::new(0.0, 0.0);
        match self {
            Pauli::I => arr2(&[[ONE, z], [z, ONE]]),
            Pauli::X => arr2(&[[z, ONE], [ONE, z]]),
            Pauli::Y => arr2(&[[z, MINUS_I], [I_UNIT, z]]),
            Pauli::Z => arr2(&[[ONE, z], [z, -ONE]]),
        }
    }

    /// Character label
    pub fn to_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    /// Parse from character label
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

// ============================================================================
// PauliWord
// ============================================================================

/// Tensor product of Paulis, one per acted-on wire
/// Gantree: PauliWord // wire → Pauli, identity implicit
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PauliWord {
    paulis: BTreeMap<Wire, Pauli>,
}

impl PauliWord {
    /// Identity word
    pub fn identity() -> Self {
        Self::default()
    }

    /// Word with a single factor
    pub fn single(wire: impl Into<Wire>, pauli: Pauli) -> Self {
        std::iter::once((wire.into(), pauli)).collect()
    }

    /// Parse a dense label such as `"XIZ"` over the given wires
    pub fn from_label(label: &str, wires: &Wires) -> QdiffResult<Self> {
        let chars: Vec<char> = label.chars().collect();
        if chars.len() != wires.len() {
            return Err(QdiffError::WireCountMismatch {
                wires: wires.len(),
                qubits: chars.len(),
            });
        }
        chars
            .into_iter()
            .zip(wires.iter())
            .map(|(c, w)| {
                Pauli::from_char(c)
                    .map(|p| (w.clone(), p))
                    .ok_or_else(|| QdiffError::InvalidHyperparameter {
                        op: "PauliWord".to_string(),
                        reason: format!("unknown Pauli label '{c}'"),
                    })
            })
            .collect()
    }

    /// Pauli acting on a wire (`I` when absent)
    pub fn get(&self, wire: &Wire) -> Pauli {
        self.paulis.get(wire).copied().unwrap_or(Pauli::I)
    }

    /// Number of non-identity factors
    pub fn len(&self) -> usize {
        self.paulis.len()
    }

    /// Check if this is the identity word
    pub fn is_empty(&self) -> bool {
        self.paulis.is_empty()
    }

    /// Alias of [`PauliWord::is_empty`]
    pub fn is_identity(&self) -> bool {
        self.paulis.is_empty()
    }

    /// Acted-on wires in sorted order
    pub fn wires(&self) -> Wires {
        // BTreeMap keys are already unique and sorted.
        Wires::new(self.paulis.keys().cloned()).unwrap_or_default()
    }

    /// Iterate over (wire, Pauli) factors
    pub fn iter(&self) -> impl Iterator<Item = (&Wire, Pauli)> {
        self.paulis.iter().map(|(w, p)| (w, *p))
    }

    /// Product of two words as (word, phase)
    /// Gantree: mul(&self,&other) -> (PauliWord, Complex64) // per-wire table
    pub fn mul(&self, other: &PauliWord) -> (PauliWord, Complex64) {
        let (base, rhs, swapped) = if self.len() >= other.len() {
            (self, other, false)
        } else {
            (other, self, true)
        };
        let mut paulis = base.paulis.clone();
        let mut phase = ONE;
        for (wire, &p) in &rhs.paulis {
            match paulis.get(wire).copied() {
                None => {
                    paulis.insert(wire.clone(), p);
                }
                Some(q) => {
                    // Order matters for the phase: left factor comes from `self`.
                    let (left, right) = if swapped { (p, q) } else { (q, p) };
                    let (result, factor) = left.mul(right);
                    phase *= factor;
                    if result == Pauli::I {
                        paulis.remove(wire);
                    } else {
                        paulis.insert(wire.clone(), result);
                    }
                }
            }
        }
        (PauliWord { paulis }, phase)
    }

    /// Bit masks (x-like, z-like) and the phase from Y factors for a wire order
    fn masks(&self, wire_order: &Wires) -> QdiffResult<(usize, usize, Complex64)> {
        let n = wire_order.len();
        let mut x_like = 0usize;
        let mut z_like = 0usize;
        let mut num_y = 0u32;
        for (wire, pauli) in self.iter() {
            let pos = wire_order
                .index_of(wire)
                .ok_or_else(|| QdiffError::WireNotFound(wire.to_string()))?;
            let bit = 1usize << (n - 1 - pos);
            if pauli.has_x() {
                x_like |= bit;
            }
            if pauli.has_z() {
                z_like |= bit;
            }
            if pauli == Pauli::Y {
                num_y += 1;
            }
        }
        Ok((x_like, z_like, I_UNIT.powu(num_y)))
    }

    /// Sparse matrix in the given wire order
    ///
    /// Row `r` has a single entry in column `r ^ x_like`, with sign
    /// `(-1)^popcount(col & z_like)` times `i^(number of Y)`.
    pub fn to_sparse(&self, wire_order: &Wires) -> QdiffResult<CsrMatrix> {
        let n = wire_order.len();
        if n > limits::MAX_QUBITS {
            return Err(QdiffError::TooManyQubits {
                qubits: n,
                max: limits::MAX_QUBITS,
            });
        }
        let (x_like, z_like, y_phase) = self.masks(wire_order)?;
        let dim = limits::dim(n);
        let triplets = (0..dim).map(|row| {
            let col = row ^ x_like;
            let sign = if (col & z_like).count_ones() % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            (row, col, y_phase * sign)
        });
        CsrMatrix::from_triplets(dim, dim, triplets)
    }

    /// Dense matrix in the given wire order
    pub fn to_matrix(&self, wire_order: &Wires) -> QdiffResult<Array2<Complex64>> {
        Ok(self.to_sparse(wire_order)?.to_dense())
    }
}

impl FromIterator<(Wire, Pauli)> for PauliWord {
    /// Identity factors are dropped; a repeated wire keeps the last Pauli
    fn from_iter<T: IntoIterator<Item = (Wire, Pauli)>>(iter: T) -> Self {
        let paulis = iter
            .into_iter()
            .filter(|(_, p)| *p != Pauli::I)
            .collect();
        PauliWord { paulis }
    }
}

impl fmt::Display for PauliWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            return write!(f, "I");
        }
        let factors: Vec<String> = self
            .iter()
            .map(|(w, p)| format!("{}({})", p, w))
            .collect();
        write!(f, "{}", factors.join(" @ "))
    }
}

// ============================================================================
// Tests
// ============================================================================
