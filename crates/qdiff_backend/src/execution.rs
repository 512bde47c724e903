//! Device execution types and traits
//!
//! Gantree: L4_Backend → DeviceTrait
//!
//! Interface between a script and whatever evaluates it.

use crate::script::QuantumScript;
use qdiff_core::{MeasurementResult, QdiffResult, Wires};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Results of one script, one entry per measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement results in script order
    pub results: Vec<MeasurementResult>,

    /// Execution metadata
    pub metadata: ExecutionMetadata,
}

/// Execution metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Device name
    pub device: String,

    /// Device wires the state was laid out on
    pub wires: Wires,

    /// Number of applied operations
    pub num_operations: usize,

    /// ‖ψ‖² of the final state
    pub final_norm_sqr: f64,
}

impl ExecutionResult {
    /// Number of results
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Check if nothing was measured
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Result of the `index`-th measurement
    pub fn get(&self, index: usize) -> Option<&MeasurementResult> {
        self.results.get(index)
    }

    /// Scalar results, `None` if any result is not a scalar
    pub fn scalars(&self) -> Option<Vec<f64>> {
        self.results.iter().map(MeasurementResult::as_scalar).collect()
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExecutionResult(device={}, wires={}, results={})",
            self.metadata.device,
            self.metadata.wires,
            self.results.len()
        )
    }
}

/// Anything that evaluates quantum scripts
/// Gantree: Device // device interface
pub trait Device: Send + Sync {
    /// Device name
    fn name(&self) -> &str;

    /// Execute one script
    /// Gantree: execute(script) -> Result<ExecutionResult>
    fn execute(&self, script: &QuantumScript) -> QdiffResult<ExecutionResult>;

    /// Execute several scripts, stopping at the first failure
    fn execute_batch(&self, scripts: &[QuantumScript]) -> QdiffResult<Vec<ExecutionResult>> {
        scripts.iter().map(|s| self.execute(s)).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result() -> ExecutionResult {
        ExecutionResult {
            results: vec![
                MeasurementResult::Scalar(0.5),
                MeasurementResult::Vector(vec![0.25, 0.75]),
            ],
            metadata: ExecutionMetadata {
                device: "test".to_string(),
                wires: Wires::range(1),
                num_operations: 1,
                final_norm_sqr: 1.0,
            },
        }
    }

    #[test]
    fn test_accessors() {
        let result = make_result();
        assert_eq!(result.len(), 2);
        assert!(!result.is_empty());
        assert_eq!(result.get(0).and_then(MeasurementResult::as_scalar), Some(0.5));
        assert!(result.scalars().is_none());
    }

    #[test]
    fn test_scalars() {
        let mut result = make_result();
        result.results.pop();
        assert_eq!(result.scalars(), Some(vec![0.5]));
    }

    #[test]
    fn test_json_roundtrip() {
        let result = make_result();
        let json = serde_json::to_string(&result).unwrap();
        let back: ExecutionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_display() {
        let s = make_result().to_string();
        assert!(s.contains("device=test"));
        assert!(s.contains("results=2"));
    }
}
