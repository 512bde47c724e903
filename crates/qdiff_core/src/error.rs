//! Error types for QDiff
//!
//! Gantree: L0_Foundation → Errors
//!
//! One error enum shared by the Pauli algebra, the conversion engine and the
//! measurement engine. Every failure is deterministic, so nothing is retried.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for QDiff
/// Gantree: QdiffError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QdiffError {
    // ========================================================================
    // Shape / Dimension Errors
    // ========================================================================
    /// Matrix is not square (even after padding)
    #[error("The matrix should be square, got ({rows}, {cols}). Use padding for rectangular matrices.")]
    NotSquare { rows: usize, cols: usize },

    /// Matrix side is not a power of two
    #[error("Dimension of the matrix should be a power of 2, got ({rows}, {cols})")]
    NotPowerOfTwo { rows: usize, cols: usize },

    /// Explicit wire order does not match the number of qubits
    #[error("number of wires {wires} is not compatible with the number of qubits {qubits}")]
    WireCountMismatch { wires: usize, qubits: usize },

    /// Incompatible operand shapes in a matrix operation
    #[error("Shape mismatch: {left:?} and {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    /// Too many qubits for a dense representation
    #[error("{qubits} qubits exceeds the dense representation limit of {max}")]
    TooManyQubits { qubits: usize, max: usize },

    // ========================================================================
    // Wire Errors
    // ========================================================================
    /// Wire appears more than once
    #[error("Wire {0} appears more than once")]
    DuplicateWire(String),

    /// Wire missing from a wire order
    #[error("Wire {0} is not present in the wire order")]
    WireNotFound(String),

    // ========================================================================
    // Operator Construction Errors
    // ========================================================================
    /// Wrong number of parameters for an operator
    #[error("{op} takes {expected} parameter(s), got {got}")]
    InvalidParameterCount {
        op: String,
        expected: usize,
        got: usize,
    },

    /// Wrong number of wires for an operator
    #[error("{op} acts on {expected} wire(s), got {got}")]
    InvalidWireCount {
        op: String,
        expected: usize,
        got: usize,
    },

    /// Invalid hyperparameter value
    #[error("Invalid hyperparameter for {op}: {reason}")]
    InvalidHyperparameter { op: String, reason: String },

    /// Coefficients and terms of a weighted sum differ in length
    #[error("Number of coefficients ({coeffs}) and operators ({ops}) does not match")]
    LengthMismatch { coeffs: usize, ops: usize },

    /// Composite operator without children
    #[error("{0} requires at least one operand")]
    EmptyComposite(String),

    // ========================================================================
    // Unsupported Observable Errors
    // ========================================================================
    /// Operator is not a linear combination of Pauli words
    #[error("Op must be a linear combination of Pauli operators only, got: {0}")]
    NotPauliCombination(String),

    /// Operator has no diagonalizing gates
    #[error("Diagonalizing gates are not defined for {0}")]
    DiagonalizingGatesUndefined(String),

    /// Operator has no closed-form eigenvalues
    #[error("Eigenvalues are not defined for {0}")]
    EigvalsUndefined(String),

    // ========================================================================
    // Measurement Errors
    // ========================================================================
    /// Measurement has no state-based evaluation
    #[error("Measurement {measurement} is not implemented for state-based evaluation{}", .observable.as_ref().map(|o| format!(" with observable {o}")).unwrap_or_default())]
    MeasurementNotImplemented {
        measurement: String,
        observable: Option<String>,
    },

    /// State vector cannot be interpreted as a qubit tensor
    #[error("Invalid state: {0}")]
    InvalidState(String),

    // ========================================================================
    // Configuration / I/O Errors
    // ========================================================================
    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(String),
}

/// Result type alias for QDiff operations
/// Gantree: QdiffResult<T> // type alias
pub type QdiffResult<T> = Result<T, QdiffError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for QdiffError {
    fn from(err: serde_json::Error) -> Self {
        QdiffError::Json(err.to_string())
    }
}

impl From<ndarray::ShapeError> for QdiffError {
    fn from(err: ndarray::ShapeError) -> Self {
        QdiffError::InvalidState(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl QdiffError {
    /// Check if error is a shape/dimension error
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            QdiffError::NotSquare { .. }
                | QdiffError::NotPowerOfTwo { .. }
                | QdiffError::WireCountMismatch { .. }
                | QdiffError::ShapeMismatch { .. }
                | QdiffError::TooManyQubits { .. }
        )
    }

    /// Check if error rejects an observable that the engine cannot express
    pub fn is_unsupported_observable(&self) -> bool {
        matches!(
            self,
            QdiffError::NotPauliCombination(_)
                | QdiffError::DiagonalizingGatesUndefined(_)
                | QdiffError::EigvalsUndefined(_)
        )
    }

    /// Check if error signals a measurement without state-based handling
    pub fn is_unimplemented(&self) -> bool {
        matches!(self, QdiffError::MeasurementNotImplemented { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QdiffError::NotSquare { rows: 3, cols: 4 };
        assert!(err.to_string().contains("should be square"));
        assert!(err.to_string().contains("(3, 4)"));
    }

    #[test]
    fn test_power_of_two_message() {
        let err = QdiffError::NotPowerOfTwo { rows: 3, cols: 3 };
        assert!(err.to_string().contains("power of 2"));
    }

    #[test]
    fn test_measurement_not_implemented_message() {
        let err = QdiffError::MeasurementNotImplemented {
            measurement: "SampleMP".into(),
            observable: None,
        };
        assert_eq!(
            err.to_string(),
            "Measurement SampleMP is not implemented for state-based evaluation"
        );

        let err = QdiffError::MeasurementNotImplemented {
            measurement: "VarianceMP".into(),
            observable: Some("Hamiltonian".into()),
        };
        assert!(err.to_string().ends_with("with observable Hamiltonian"));
    }

    #[test]
    fn test_classification() {
        assert!(QdiffError::WireCountMismatch { wires: 1, qubits: 2 }.is_shape_error());
        assert!(QdiffError::NotPauliCombination("RX".into()).is_unsupported_observable());
        assert!(!QdiffError::NotPauliCombination("RX".into()).is_shape_error());
        assert!(QdiffError::MeasurementNotImplemented {
            measurement: "CountsMP".into(),
            observable: None
        }
        .is_unimplemented());
    }
}
