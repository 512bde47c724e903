//! # QDiff Backend
//!
//! State tensors, gate application and the measurement dispatcher.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qdiff_backend // L4: Backend
//!     L4_Backend
//!         QubitState // [2; n] tensor + wires
//!         ApplyOperation // gate kernels, sparse fallback
//!         MeasureDispatch // diagonalizing gates | sparse ⟨ψ|H|ψ⟩
//!         QuantumScript // operations + measurements
//!         SimulatorConfig // device settings
//!         DeviceTrait // Device, ExecutionResult
//!         StateSimulator // |0…0⟩ → ops → measurements
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qdiff_backend::prelude::*;
//!
//! // ⟨Y⟩ after RX(θ) is −sin θ
//! let theta = 0.54;
//! let script = QuantumScript::new()
//!     .with_operation(Operator::rx(theta, 0usize))
//!     .with_measurement(MeasurementProcess::expval(Operator::pauli_y(0usize)));
//!
//! let result = StateSimulator::default().execute(&script).unwrap();
//! let value = result.scalars().unwrap()[0];
//! assert!((value + theta.sin()).abs() < 1e-12);
//! ```
//!
//! ## Measuring a Prepared State
//!
//! ```rust
//! use qdiff_backend::prelude::*;
//!
//! let state = QubitState::basis(&[0, 1]).unwrap();
//! let h = Operator::hamiltonian(
//!     vec![0.5, 0.5],
//!     vec![Operator::pauli_z(0usize), Operator::pauli_z(1usize)],
//! )
//! .unwrap();
//! let value = measure(&MeasurementProcess::expval(h), &state).unwrap();
//! assert_eq!(value.as_scalar(), Some(0.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// State tensors (Gantree: L4_Backend → QubitState)
pub mod state;

/// Gate application (Gantree: L4_Backend → ApplyOperation)
pub mod apply;

/// Measurement dispatch (Gantree: L4_Backend → MeasureDispatch)
pub mod measure;

/// Scripts (Gantree: L4_Backend → QuantumScript)
pub mod script;

/// Simulator settings (Gantree: L4_Backend → SimulatorConfig)
pub mod config;

/// Device trait and results (Gantree: L4_Backend → DeviceTrait)
pub mod execution;

/// State-vector simulator (Gantree: L4_Backend → StateSimulator)
pub mod simulator;

// ============================================================================
// Re-exports
// ============================================================================

pub use apply::{apply_operation, apply_operator};
pub use config::SimulatorConfig;
pub use execution::{Device, ExecutionMetadata, ExecutionResult};
pub use measure::{
    measure, select_strategy, state_diagonalizing_gates, state_hamiltonian_expval,
    MeasureStrategy,
};
pub use script::QuantumScript;
pub use simulator::StateSimulator;
pub use state::QubitState;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qdiff_backend::prelude::*;
    //! ```

    pub use crate::apply::{apply_operation, apply_operator};
    pub use crate::config::SimulatorConfig;
    pub use crate::execution::{Device, ExecutionMetadata, ExecutionResult};
    pub use crate::measure::{measure, select_strategy, MeasureStrategy};
    pub use crate::script::QuantumScript;
    pub use crate::simulator::StateSimulator;
    pub use crate::state::QubitState;
    pub use qdiff_pauli::prelude::*;
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
    use ndarray::array;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    fn rx_state(theta: f64) -> QubitState {
        let rx = AtomicOp::new(OpName::RX, vec![theta], Wires::range(1)).unwrap();
        apply_operation(&rx, &QubitState::zero(1).unwrap()).unwrap()
    }

    fn expval(obs: Operator, state: &QubitState) -> f64 {
        measure(&MeasurementProcess::expval(obs), state)
            .unwrap()
            .as_scalar()
            .unwrap()
    }

    #[test]
    fn test_diagonalizing_path_pauli_y() {
        let theta = 0.54;
        let value = expval(Operator::pauli_y(0usize), &rx_state(theta));
        assert!((value - (-theta.sin())).abs() < 0.05);
        assert_abs_diff_eq!(value, -theta.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_sparse_path_exact_weighted_sum() {
        // |01⟩: Z(0) = +1, Z(1) = -1, X(0) = 0
        let state = QubitState::basis(&[0, 1]).unwrap();
        let h = Operator::hamiltonian(
            vec![0.5, 0.5],
            vec![Operator::pauli_z(0usize), Operator::pauli_z(1usize)],
        )
        .unwrap();
        assert_eq!(
            select_strategy(&MeasurementProcess::expval(h.clone())).unwrap(),
            MeasureStrategy::SparseHamiltonian
        );
        assert_eq!(expval(h, &state), 0.0);

        let h = Operator::hamiltonian(
            vec![0.5, 0.5],
            vec![Operator::pauli_z(0usize), Operator::pauli_x(0usize)],
        )
        .unwrap();
        assert_eq!(expval(h, &state), 0.5);
    }

    #[test]
    fn test_sparse_path_real_part_only() {
        // Y has purely imaginary entries; ⟨Y⟩ on a complex state stays real
        let state = rx_state(1.3);
        let h = Operator::hamiltonian(vec![2.0], vec![Operator::pauli_y(0usize)]).unwrap();
        let value = expval(h, &state);
        assert_abs_diff_eq!(value, -2.0 * 1.3f64.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_sparse_hamiltonian_observable() {
        let state = QubitState::basis(&[1]).unwrap();
        let z = array![[c(1.0), c(0.0)], [c(0.0), c(-1.0)]];
        let obs = Operator::sparse_hamiltonian(CsrMatrix::from_dense(z.view()), Wires::range(1))
            .unwrap();
        assert_eq!(expval(obs, &state), -1.0);
    }

    #[test]
    fn test_decomposed_matrix_expectation() {
        // Observable built by pauli_decompose evaluates like its matrix
        let m = array![
            [c(1.0), c(0.5), c(0.0), c(0.0)],
            [c(0.5), c(-1.0), c(0.0), c(0.2)],
            [c(0.0), c(0.0), c(0.3), c(0.0)],
            [c(0.0), c(0.2), c(0.0), c(0.7)]
        ];
        let obs = pauli_decompose(m.view(), &DecomposeConfig::default())
            .unwrap()
            .as_operator()
            .cloned()
            .unwrap();
        let state = QubitState::basis(&[0, 1]).unwrap();
        assert_abs_diff_eq!(expval(obs, &state), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_not_implemented_measurements() {
        let state = QubitState::zero(1).unwrap();
        let h = Operator::hamiltonian(vec![1.0], vec![Operator::pauli_z(0usize)]).unwrap();
        let cases = [
            (MeasurementProcess::sample(Operator::pauli_z(0usize)), "SampleMP"),
            (MeasurementProcess::counts(Wires::range(1)), "CountsMP"),
            (
                MeasurementProcess::classical_shadow(Wires::range(1), Some(7)),
                "ClassicalShadowMP",
            ),
            (
                MeasurementProcess::shadow_expval(vec![Operator::pauli_z(0usize)], 1, None),
                "ShadowExpvalMP",
            ),
            (MeasurementProcess::var(h.clone()), "VarianceMP"),
            (MeasurementProcess::probs_of(h), "ProbabilityMP"),
        ];
        for (mp, class) in cases {
            match measure(&mp, &state) {
                Err(QdiffError::MeasurementNotImplemented { measurement, .. }) => {
                    assert_eq!(measurement, class)
                }
                other => panic!("{} gave {:?}", class, other),
            }
        }
    }

    #[test]
    fn test_variance_and_probs() {
        let theta = 0.8;
        let state = rx_state(theta);
        let var = measure(&MeasurementProcess::var(Operator::pauli_z(0usize)), &state)
            .unwrap()
            .as_scalar()
            .unwrap();
        assert_abs_diff_eq!(var, 1.0 - theta.cos().powi(2), epsilon = 1e-12);

        let probs = measure(&MeasurementProcess::probs(Wires::range(1)), &state).unwrap();
        let probs = probs.as_vector().unwrap();
        assert_abs_diff_eq!(probs[0], (theta / 2.0).cos().powi(2), epsilon = 1e-12);
        assert_abs_diff_eq!(probs[1], (theta / 2.0).sin().powi(2), epsilon = 1e-12);
    }

    #[test]
    fn test_probs_of_observable_in_eigenbasis() {
        // H|0⟩ = |+⟩ is the +1 eigenstate of X
        let state = apply_operator(&Operator::hadamard(0usize), &QubitState::zero(1).unwrap())
            .unwrap();
        let probs = measure(&MeasurementProcess::probs_of(Operator::pauli_x(0usize)), &state)
            .unwrap();
        let probs = probs.as_vector().unwrap();
        assert_abs_diff_eq!(probs[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(probs[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_input_state_unchanged() {
        let state = rx_state(0.3);
        let before = state.clone();
        let _ = measure(&MeasurementProcess::expval(Operator::pauli_y(0usize)), &state).unwrap();
        let h = Operator::hamiltonian(vec![1.0], vec![Operator::pauli_x(0usize)]).unwrap();
        let _ = measure(&MeasurementProcess::expval(h), &state).unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn test_measure_memoizes_pauli_sentence() {
        let h = Operator::hamiltonian(vec![1.0], vec![Operator::pauli_z(0usize)]).unwrap();
        let mp = MeasurementProcess::expval(h);
        assert!(mp.obs().and_then(Operator::pauli_rep).is_none());
        measure(&mp, &QubitState::zero(1).unwrap()).unwrap();
        assert!(mp.obs().and_then(Operator::pauli_rep).is_some());
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "qdiff_backend");
    }
}
