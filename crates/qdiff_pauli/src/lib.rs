//! # QDiff Pauli
//!
//! Conversion between dense matrices, operator trees and Pauli sentences.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qdiff_pauli // L3: Conversion
//!     L3_Conversion
//!         DecomposeConfig // decomposition options
//!         PauliConversion // pauli_decompose, pauli_sentence
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use ndarray::array;
//! use num_complex::Complex64;
//! use qdiff_pauli::prelude::*;
//!
//! // Z = diag(1, -1)
//! let one = Complex64::new(1.0, 0.0);
//! let zero = Complex64::new(0.0, 0.0);
//! let z = array![[one, zero], [zero, -one]];
//!
//! let config = DecomposeConfig::default().with_pauli(true);
//! let decomposition = pauli_decompose(z.view(), &config).unwrap();
//! let sentence = decomposition.as_sentence().unwrap();
//! assert_eq!(sentence.to_string(), "1+0i * Z(0)");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Decomposition options (Gantree: L3_Conversion → DecomposeConfig)
pub mod config;

/// Conversions (Gantree: L3_Conversion → PauliConversion)
pub mod conversion;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::DecomposeConfig;
pub use conversion::{pauli_decompose, pauli_sentence, sentence_to_hamiltonian, PauliDecomposition};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qdiff_pauli::prelude::*;
    //! ```

    pub use crate::config::DecomposeConfig;
    pub use crate::conversion::{
        pauli_decompose, pauli_sentence, sentence_to_hamiltonian, PauliDecomposition,
    };
    pub use qdiff_core::prelude::*;
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use super::{NAME, VERSION};
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_matrix(rng: &mut StdRng, dim: usize) -> Array2<Complex64> {
        Array2::from_shape_fn((dim, dim), |_| {
            Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
        })
    }

    fn random_hermitian(rng: &mut StdRng, dim: usize) -> Array2<Complex64> {
        let a = random_matrix(rng, dim);
        let a_dag = a.t().mapv(|v| v.conj());
        a + a_dag
    }

    fn assert_matrix_close(a: &Array2<Complex64>, b: &Array2<Complex64>, eps: f64) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(x.re, y.re, epsilon = eps);
            assert_abs_diff_eq!(x.im, y.im, epsilon = eps);
        }
    }

    #[test]
    fn test_roundtrip_random_hermitian() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in 1..=3 {
            let h = random_hermitian(&mut rng, 1 << n);
            let config = DecomposeConfig::default().with_pauli(true);
            let out = pauli_decompose(h.view(), &config).unwrap();
            let sentence = out.as_sentence().unwrap();

            // Hermitian input gives real coefficients
            assert!(sentence.iter().all(|(_, c)| c.im.abs() < 1e-10));
            let rebuilt = sentence.to_matrix(&Wires::range(n)).unwrap();
            assert_matrix_close(&rebuilt, &h, 1e-10);
        }
    }

    #[test]
    fn test_roundtrip_random_non_hermitian_hamiltonian() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = random_matrix(&mut rng, 4);
        let out = pauli_decompose(m.view(), &DecomposeConfig::default()).unwrap();
        let op = out.as_operator().unwrap();
        assert_eq!(op.name(), "Hamiltonian");
        let rebuilt = op.matrix(&Wires::range(2)).unwrap();
        assert_matrix_close(&rebuilt, &m, 1e-10);
    }

    #[test]
    fn test_roundtrip_with_labelled_wires() {
        let mut rng = StdRng::seed_from_u64(3);
        let h = random_hermitian(&mut rng, 4);
        let order = Wires::new([Wire::from("q1"), Wire::from("q0")]).unwrap();
        let config = DecomposeConfig::default()
            .with_pauli(true)
            .with_hide_identity(true)
            .with_wire_order(["q1", "q0"]);
        let sentence = pauli_decompose(h.view(), &config)
            .unwrap()
            .as_sentence()
            .cloned()
            .unwrap();
        assert_matrix_close(&sentence.to_matrix(&order).unwrap(), &h, 1e-10);
    }

    #[test]
    fn test_decompose_and_pauli_sentence_agree() {
        let mut rng = StdRng::seed_from_u64(11);
        let h = random_hermitian(&mut rng, 8);
        let direct = pauli_decompose(h.view(), &DecomposeConfig::default().with_pauli(true))
            .unwrap()
            .as_sentence()
            .cloned()
            .unwrap();
        let via_operator = pauli_decompose(h.view(), &DecomposeConfig::default()).unwrap();
        let mut converted = pauli_sentence(via_operator.as_operator().unwrap()).unwrap();
        converted.simplify(1e-12);

        assert_eq!(converted.len(), direct.len());
        for (word, coeff) in direct.iter() {
            let other = converted.get(word);
            assert_abs_diff_eq!(coeff.re, other.re, epsilon = 1e-12);
            assert_abs_diff_eq!(coeff.im, other.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sentence_product_associative() {
        fn random_sentence(rng: &mut StdRng) -> PauliSentence {
            let h = random_matrix(rng, 4);
            pauli_decompose(h.view(), &DecomposeConfig::default().with_pauli(true))
                .unwrap()
                .as_sentence()
                .cloned()
                .unwrap()
        }

        let mut rng = StdRng::seed_from_u64(5);
        let a = random_sentence(&mut rng);
        let b = random_sentence(&mut rng);
        let c = random_sentence(&mut rng);

        let left = &(&a * &b) * &c;
        let right = &a * &(&b * &c);
        let order = Wires::range(2);
        assert_matrix_close(
            &left.to_matrix(&order).unwrap(),
            &right.to_matrix(&order).unwrap(),
            1e-10,
        );
    }

    #[test]
    fn test_sentence_product_matches_matrix_product() {
        let mut rng = StdRng::seed_from_u64(9);
        let m1 = random_hermitian(&mut rng, 4);
        let m2 = random_hermitian(&mut rng, 4);
        let config = DecomposeConfig::default().with_pauli(true);
        let s1 = pauli_decompose(m1.view(), &config).unwrap().as_sentence().cloned().unwrap();
        let s2 = pauli_decompose(m2.view(), &config).unwrap().as_sentence().cloned().unwrap();

        let product = &s1 * &s2;
        assert_matrix_close(
            &product.to_matrix(&Wires::range(2)).unwrap(),
            &m1.dot(&m2),
            1e-10,
        );
    }

    #[test]
    fn test_sentence_to_hamiltonian_roundtrip() {
        let mut rng = StdRng::seed_from_u64(21);
        let h = random_hermitian(&mut rng, 4);
        let sentence = pauli_decompose(h.view(), &DecomposeConfig::default().with_pauli(true))
            .unwrap()
            .as_sentence()
            .cloned()
            .unwrap();
        let order = Wires::range(2);
        let op = sentence_to_hamiltonian(&sentence, Some(&order)).unwrap();
        assert_matrix_close(&op.matrix(&order).unwrap(), &h, 1e-10);
        assert_eq!(pauli_sentence(&op).unwrap().len(), sentence.len());
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "qdiff_pauli");
    }
}
