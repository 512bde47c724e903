//! # QDiff Core
//!
//! Wires, Pauli algebra, operators and measurement processes for the QDiff
//! state-measurement engine.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qdiff_core // L0+L1+L2: Foundation + Pauli model + Operators
//!     L0_Foundation // base types, constants, errors
//!         CoreTypes // Wire, Wires
//!         Constants // tolerances, limits, observable names
//!         Errors // QdiffError
//!     L1_PauliModel // Pauli algebra
//!         PauliWord // wire → Pauli
//!         PauliSentence // word → coefficient
//!     L1_Algebra // sparse linear algebra
//!         SparseMatrix // CSR over Complex64
//!     L1_Operators // named gates and observables
//!         AtomicOp // catalogue
//!     L2_Operators // operator tree
//!         Operator // atomic | wrapper | composite | weighted sum
//!     L2_Measurements // measurement processes
//!         MeasurementProcess // kind + observable | wires
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qdiff_core::prelude::*;
//!
//! // X(0) · Y(0) = i Z(0)
//! let x = PauliSentence::single(0usize, Pauli::X);
//! let y = PauliSentence::single(0usize, Pauli::Y);
//! let product = x * y;
//! assert_eq!(product.to_string(), "0+1i * Z(0)");
//! ```
//!
//! ## Weighted-Sum Observables
//!
//! ```rust
//! use qdiff_core::prelude::*;
//!
//! let h = Operator::hamiltonian(
//!     vec![0.5, 0.5],
//!     vec![Operator::pauli_x(0usize), Operator::pauli_z(1usize)],
//! )
//! .unwrap();
//! assert_eq!(h.name(), "Hamiltonian");
//! assert_eq!(h.sparse_matrix(&Wires::range(2)).unwrap().shape(), (4, 4));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Pauli words (Gantree: L1_PauliModel → PauliWord)
pub mod pauli;

/// Pauli sentences (Gantree: L1_PauliModel → PauliSentence)
pub mod sentence;

/// CSR matrices (Gantree: L1_Algebra → SparseMatrix)
pub mod sparse;

/// Atomic operators (Gantree: L1_Operators → AtomicOp)
pub mod ops;

/// Operator tree (Gantree: L2_Operators → Operator)
pub mod operator;

/// Measurement processes (Gantree: L2_Measurements → MeasurementProcess)
pub mod measurement;

// ============================================================================
// Re-exports
// ============================================================================

pub use constants::{limits, names, tolerance};
pub use error::{QdiffError, QdiffResult};
pub use measurement::{MeasurementProcess, MeasurementResult, ReturnType, ShadowSpec};
pub use operator::{Operator, OperatorKind};
pub use ops::{AtomicOp, Hyperparameters, OpName};
pub use pauli::{Pauli, PauliWord};
pub use sentence::PauliSentence;
pub use sparse::CsrMatrix;
pub use types::{Angle, ParamVec, Wire, Wires};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qdiff_core::prelude::*;
    //! ```

    pub use crate::constants::{limits, names, tolerance};
    pub use crate::error::{QdiffError, QdiffResult};
    pub use crate::measurement::{MeasurementProcess, MeasurementResult, ReturnType, ShadowSpec};
    pub use crate::operator::{Operator, OperatorKind};
    pub use crate::ops::{AtomicOp, Hyperparameters, OpName};
    pub use crate::pauli::{Pauli, PauliWord};
    pub use crate::sentence::PauliSentence;
    pub use crate::sparse::CsrMatrix;
    pub use crate::types::{Angle, ParamVec, Wire, Wires};
    pub use num_complex::Complex64;
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
