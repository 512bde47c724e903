//! Pauli sentences
//!
//! Gantree: L1_PauliModel → PauliSentence
//!
//! A [`PauliSentence`] is a linear combination of [`PauliWord`]s with complex
//! coefficients. Products and sums never drop zero coefficients on their own;
//! call [`PauliSentence::simplify`] for that.

use crate::constants::limits;
use crate::error::{QdiffError, QdiffResult};
use crate::pauli::{Pauli, PauliWord};
use crate::sparse::CsrMatrix;
use crate::types::{Wire, Wires};
use ndarray::Array2;
use num_complex::Complex64;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign};

/// Linear combination of Pauli words
/// Gantree: PauliSentence // word → coefficient
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PauliSentence {
    terms: BTreeMap<PauliWord, Complex64>,
}

impl PauliSentence {
    /// Empty sentence (the zero operator)
    pub fn new() -> Self {
        Self::default()
    }

    /// Sentence with a single term
    pub fn from_word(word: PauliWord, coeff: impl Into<Complex64>) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(word, coeff.into());
        Self { terms }
    }

    /// Single Pauli on one wire with coefficient 1
    pub fn single(wire: impl Into<Wire>, pauli: Pauli) -> Self {
        Self::from_word(PauliWord::single(wire, pauli), 1.0)
    }

    /// Identity with coefficient 1
    pub fn identity() -> Self {
        Self::from_word(PauliWord::identity(), 1.0)
    }

    /// Number of stored terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if no term is stored
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Coefficient of a word (zero when absent)
    pub fn get(&self, word: &PauliWord) -> Complex64 {
        self.terms
            .get(word)
            .copied()
            .unwrap_or(Complex64::new(0.0, 0.0))
    }

    /// Iterate over (word, coefficient) terms
    pub fn iter(&self) -> impl Iterator<Item = (&PauliWord, Complex64)> {
        self.terms.iter().map(|(w, c)| (w, *c))
    }

    /// Add `coeff · word`, merging with an existing term
    pub fn add_term(&mut self, word: PauliWord, coeff: Complex64) {
        *self
            .terms
            .entry(word)
            .or_insert(Complex64::new(0.0, 0.0)) += coeff;
    }

    // ========================================================================
    // Algebra
    // ========================================================================

    /// Sentence sum, merging equal words
    /// Gantree: add(&self,&other) -> PauliSentence
    pub fn add_sentence(&self, other: &PauliSentence) -> PauliSentence {
        let mut out = self.clone();
        for (word, coeff) in other.iter() {
            out.add_term(word.clone(), coeff);
        }
        out
    }

    /// Sentence product, distributing over all term pairs
    /// Gantree: mul(&self,&other) -> PauliSentence // Σ c1·c2·phase · w1w2
    pub fn mul_sentence(&self, other: &PauliSentence) -> PauliSentence {
        let mut out = PauliSentence::new();
        for (w1, c1) in self.iter() {
            for (w2, c2) in other.iter() {
                let (word, phase) = w1.mul(w2);
                out.add_term(word, c1 * c2 * phase);
            }
        }
        out
    }

    /// Multiply every coefficient by a scalar
    pub fn scale(&self, scalar: impl Into<Complex64>) -> PauliSentence {
        let scalar = scalar.into();
        PauliSentence {
            terms: self
                .terms
                .iter()
                .map(|(w, c)| (w.clone(), c * scalar))
                .collect(),
        }
    }

    /// Drop terms whose coefficient magnitude is at most `tol`
    pub fn simplify(&mut self, tol: f64) {
        self.terms.retain(|_, c| c.norm() > tol);
    }

    // ========================================================================
    // Representations
    // ========================================================================

    /// Sorted union of the wires of every term
    pub fn wires(&self) -> Wires {
        let mut all: Vec<Wire> = self
            .terms
            .keys()
            .flat_map(|w| w.iter().map(|(wire, _)| wire.clone()))
            .collect();
        all.sort();
        all.dedup();
        Wires::new(all).unwrap_or_default()
    }

    /// Sparse matrix in the given wire order
    pub fn to_sparse(&self, wire_order: &Wires) -> QdiffResult<CsrMatrix> {
        let n = wire_order.len();
        if n > limits::MAX_QUBITS {
            return Err(QdiffError::TooManyQubits {
                qubits: n,
                max: limits::MAX_QUBITS,
            });
        }
        let dim = limits::dim(n);
        let mut acc = CsrMatrix::zeros(dim, dim);
        for (word, coeff) in self.iter() {
            acc = acc.add(&word.to_sparse(wire_order)?.scale(coeff))?;
        }
        Ok(acc)
    }

    /// Dense matrix in the given wire order
    pub fn to_matrix(&self, wire_order: &Wires) -> QdiffResult<Array2<Complex64>> {
        Ok(self.to_sparse(wire_order)?.to_dense())
    }
}

// ============================================================================
// Operator Traits
// ============================================================================

impl Add for PauliSentence {
    type Output = PauliSentence;

    fn add(self, rhs: PauliSentence) -> PauliSentence {
        self.add_sentence(&rhs)
    }
}

impl Add<&PauliSentence> for &PauliSentence {
    type Output = PauliSentence;

    fn add(self, rhs: &PauliSentence) -> PauliSentence {
        self.add_sentence(rhs)
    }
}

impl AddAssign<&PauliSentence> for PauliSentence {
    fn add_assign(&mut self, rhs: &PauliSentence) {
        for (word, coeff) in rhs.iter() {
            self.add_term(word.clone(), coeff);
        }
    }
}

impl Mul for PauliSentence {
    type Output = PauliSentence;

    fn mul(self, rhs: PauliSentence) -> PauliSentence {
        self.mul_sentence(&rhs)
    }
}

impl Mul<&PauliSentence> for &PauliSentence {
    type Output = PauliSentence;

    fn mul(self, rhs: &PauliSentence) -> PauliSentence {
        self.mul_sentence(rhs)
    }
}

impl Mul<Complex64> for PauliSentence {
    type Output = PauliSentence;

    fn mul(self, rhs: Complex64) -> PauliSentence {
        self.scale(rhs)
    }
}

impl Mul<f64> for PauliSentence {
    type Output = PauliSentence;

    fn mul(self, rhs: f64) -> PauliSentence {
        self.scale(rhs)
    }
}

impl MulAssign<Complex64> for PauliSentence {
    fn mul_assign(&mut self, rhs: Complex64) {
        self.terms.values_mut().for_each(|c| *c *= rhs);
    }
}

impl FromIterator<(PauliWord, Complex64)> for PauliSentence {
    /// Repeated words are summed
    fn from_iter<T: IntoIterator<Item = (PauliWord, Complex64)>>(iter: T) -> Self {
        let mut out = PauliSentence::new();
        for (word, coeff) in iter {
            out.add_term(word, coeff);
        }
        out
    }
}

impl fmt::Display for PauliSentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "0 * I");
        }
        let lines: Vec<String> = self
            .iter()
            .map(|(word, coeff)| format!("{} * {}", coeff, word))
            .collect();
        write!(f, "{}", lines.join("\n+ "))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::kron;
    use approx::assert_abs_diff_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn term(pairs: &[(usize, Pauli)], coeff: Complex64) -> PauliSentence {
        let word: PauliWord = pairs.iter().map(|&(w, p)| (Wire::Index(w), p)).collect();
        PauliSentence::from_word(word, coeff)
    }

    #[test]
    fn test_add_merges_terms() {
        let a = term(&[(0, Pauli::X)], c(1.0, 0.0));
        let b = term(&[(0, Pauli::X)], c(0.5, 0.0)) + term(&[(1, Pauli::Z)], c(2.0, 0.0));
        let sum = &a + &b;
        assert_eq!(sum.len(), 2);
        assert_eq!(sum.get(&PauliWord::single(0usize, Pauli::X)), c(1.5, 0.0));
        assert_eq!(sum.get(&PauliWord::single(1usize, Pauli::Z)), c(2.0, 0.0));
    }

    #[test]
    fn test_add_keeps_zero_until_simplified() {
        let a = term(&[(0, Pauli::X)], c(1.0, 0.0));
        let b = term(&[(0, Pauli::X)], c(-1.0, 0.0));
        let mut sum = a + b;
        assert_eq!(sum.len(), 1);
        sum.simplify(1e-8);
        assert!(sum.is_empty());
    }

    #[test]
    fn test_mul_applies_phase() {
        // X(0) · Y(0) = i Z(0)
        let x = PauliSentence::single(0usize, Pauli::X);
        let y = PauliSentence::single(0usize, Pauli::Y);
        let prod = x * y;
        assert_eq!(prod.len(), 1);
        assert_eq!(prod.get(&PauliWord::single(0usize, Pauli::Z)), c(0.0, 1.0));
    }

    #[test]
    fn test_mul_distributes() {
        // (X + Z)(X + Z) = 2 I + XZ + ZX = 2 I
        let s = PauliSentence::single(0usize, Pauli::X) + PauliSentence::single(0usize, Pauli::Z);
        let mut sq = &s * &s;
        sq.simplify(1e-12);
        assert_eq!(sq, PauliSentence::identity().scale(2.0));
    }

    #[test]
    fn test_scalar_mul() {
        let s = term(&[(0, Pauli::X), (1, Pauli::Z)], c(1.0, 0.0)) * c(0.0, 2.0);
        assert_eq!(s.len(), 1);
        assert_eq!(s.iter().next().unwrap().1, c(0.0, 2.0));
    }

    #[test]
    fn test_wires_sorted_union() {
        let s = term(&[(2, Pauli::X)], c(1.0, 0.0)) + term(&[(0, Pauli::Y)], c(1.0, 0.0));
        assert_eq!(s.wires(), Wires::new([0usize, 2]).unwrap());
        assert!(PauliSentence::identity().wires().is_empty());
    }

    #[test]
    fn test_to_matrix_matches_kron() {
        let s = term(&[(0, Pauli::X)], c(0.5, 0.0)) + term(&[(1, Pauli::Z)], c(-1.0, 0.0));
        let m = s.to_matrix(&Wires::range(2)).unwrap();
        let expected = kron(&Pauli::X.matrix(), &Pauli::I.matrix()).mapv(|v| v * 0.5)
            - kron(&Pauli::I.matrix(), &Pauli::Z.matrix());
        for (a, b) in m.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-12);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_empty_sentence_matrix_is_zero() {
        let m = PauliSentence::new().to_matrix(&Wires::range(1)).unwrap();
        assert!(m.iter().all(|v| v.norm() == 0.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(PauliSentence::new().to_string(), "0 * I");
        let s = term(&[(0, Pauli::X), (1, Pauli::Z)], c(2.0, 0.0));
        assert_eq!(s.to_string(), "2+0i * X(0) @ Z(1)");
    }
}
