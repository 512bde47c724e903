//! Decomposition configuration
//!
//! Gantree: L3_Conversion → DecomposeConfig
//!
//! Options for [`crate::pauli_decompose`].

use qdiff_core::{QdiffError, QdiffResult, Wire, Wires};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Options for dense-matrix decomposition
/// Gantree: DecomposeConfig // hide_identity, wire_order, pauli, padding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposeConfig {
    /// Drop identity factors from terms that are not all-identity
    /// Gantree: hide_identity: bool // false
    pub hide_identity: bool,

    /// Wire labels, first wire most significant (defaults to `0..n`)
    /// Gantree: wire_order: Option<Vec<Wire>> // None
    pub wire_order: Option<Vec<Wire>>,

    /// Return a Pauli sentence instead of a Hamiltonian
    /// Gantree: pauli: bool // false
    pub pauli: bool,

    /// Zero-pad to a square power-of-two shape
    /// Gantree: padding: bool // false
    pub padding: bool,
}

impl DecomposeConfig {
    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set identity hiding
    pub fn with_hide_identity(mut self, hide: bool) -> Self {
        self.hide_identity = hide;
        self
    }

    /// Set explicit wire order
    pub fn with_wire_order<I, W>(mut self, wires: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<Wire>,
    {
        self.wire_order = Some(wires.into_iter().map(Into::into).collect());
        self
    }

    /// Request a Pauli sentence
    pub fn with_pauli(mut self, pauli: bool) -> Self {
        self.pauli = pauli;
        self
    }

    /// Enable zero padding
    pub fn with_padding(mut self, padding: bool) -> Self {
        self.padding = padding;
        self
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Wire order for `num_qubits` qubits, checked against the qubit count
    /// Gantree: resolve_wires(&self,n) -> Result<Wires>
    pub fn resolve_wires(&self, num_qubits: usize) -> QdiffResult<Wires> {
        match &self.wire_order {
            None => Ok(Wires::range(num_qubits)),
            Some(order) => {
                if order.len() != num_qubits {
                    return Err(QdiffError::WireCountMismatch {
                        wires: order.len(),
                        qubits: num_qubits,
                    });
                }
                Wires::new(order.iter().cloned())
            }
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    /// Gantree: validate(&self) -> Result // no repeated wires
    pub fn validate(&self) -> Result<(), String> {
        if let Some(order) = &self.wire_order {
            if let Err(err) = Wires::new(order.iter().cloned()) {
                return Err(format!("wire_order: {}", err));
            }
        }
        Ok(())
    }

    /// Validate, mapping failures into [`QdiffError::InvalidConfig`]
    pub fn checked(self) -> QdiffResult<Self> {
        self.validate().map_err(QdiffError::InvalidConfig)?;
        Ok(self)
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Parse from JSON
    pub fn from_json(json: &str) -> QdiffResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.checked()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> QdiffResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for DecomposeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wires = match &self.wire_order {
            Some(order) => order
                .iter()
                .map(|w| w.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            None => "default".to_string(),
        };
        write!(
            f,
            "DecomposeConfig(hide_identity={}, pauli={}, padding={}, wires=[{}])",
            self.hide_identity, self.pauli, self.padding, wires
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
