//! Constants for QDiff
//!
//! Gantree: L0_Foundation → Constants
//!
//! Numerical tolerances, dense-representation limits and the observable
//! names the measurement dispatcher keys on.

// ============================================================================
// Tolerances
// Gantree: tolerance // numerical tolerances
// ============================================================================

pub mod tolerance {
    //! Floating-point tolerances shared by every component

    use num_complex::Complex64;

    /// Absolute tolerance for "effectively zero" coefficients
    /// Gantree: ATOL: f64 = 1e-8
    pub const ATOL: f64 = 1e-8;

    /// `allclose(value, 0)`: the test used to drop decomposition terms
    #[inline]
    pub fn is_negligible(value: Complex64) -> bool {
        value.norm() <= ATOL
    }
}

// ============================================================================
// Limits
// ============================================================================

pub mod limits {
    //! Size limits for dense representations

    /// Maximum number of wires for dense states and dense matrices
    /// Gantree: MAX_QUBITS: usize = 30
    pub const MAX_QUBITS: usize = 30;

    /// Dimension of the Hilbert space for `num_qubits` wires
    #[inline]
    pub const fn dim(num_qubits: usize) -> usize {
        1 << num_qubits
    }
}

// ============================================================================
// Observable Names
// Gantree: names // dispatch keys
// ============================================================================

pub mod names {
    //! Declared names of the weighted-sum observable family

    /// Legacy weighted sum of terms
    pub const HAMILTONIAN: &str = "Hamiltonian";

    /// Observable backed directly by a sparse matrix
    pub const SPARSE_HAMILTONIAN: &str = "SparseHamiltonian";

    /// Arithmetic sum of operators
    pub const SUM: &str = "Sum";

    /// Observables whose expectation is evaluated with a sparse matrix
    ///
    /// Only expectations are supported for these; variance and probabilities
    /// of a family member, `Sum` included, are reported as not implemented.
    pub const WEIGHTED_SUM_FAMILY: [&str; 3] = [HAMILTONIAN, SPARSE_HAMILTONIAN, SUM];

    /// Check whether a declared name belongs to the weighted-sum family
    pub fn is_weighted_sum(name: &str) -> bool {
        WEIGHTED_SUM_FAMILY.contains(&name)
    }
}

// ============================================================================
// Tests
// ============================================================================
