//! Quantum scripts
//!
//! Gantree: L4_Backend → QuantumScript
//!
//! An ordered list of operations followed by the measurements taken on the
//! final state.

use qdiff_core::{MeasurementProcess, Operator, Wires};
use std::fmt;

/// Operations and measurements for one simulation
/// Gantree: QuantumScript // ops + measurements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuantumScript {
    /// Applied in order
    /// Gantree: operations: Vec<Operator>
    operations: Vec<Operator>,

    /// Taken on the final state
    /// Gantree: measurements: Vec<MeasurementProcess>
    measurements: Vec<MeasurementProcess>,

    name: Option<String>,
}

impl QuantumScript {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Script from operations and measurements
    pub fn from_parts(operations: Vec<Operator>, measurements: Vec<MeasurementProcess>) -> Self {
        Self {
            operations,
            measurements,
            name: None,
        }
    }

    /// Set the script name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append an operation
    /// Gantree: with_operation(op) -> Self
    pub fn with_operation(mut self, op: impl Into<Operator>) -> Self {
        self.operations.push(op.into());
        self
    }

    /// Append a measurement
    /// Gantree: with_measurement(mp) -> Self
    pub fn with_measurement(mut self, mp: MeasurementProcess) -> Self {
        self.measurements.push(mp);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Operations in application order
    pub fn operations(&self) -> &[Operator] {
        &self.operations
    }

    /// Measurements in result order
    pub fn measurements(&self) -> &[MeasurementProcess] {
        &self.measurements
    }

    /// Script name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Wires touched by operations and measurements, in order of appearance
    /// Gantree: wires(&self) -> Wires
    pub fn wires(&self) -> Wires {
        let op_wires = self.operations.iter().map(Operator::wires);
        let mp_wires = self.measurements.iter().map(MeasurementProcess::wires);
        op_wires
            .chain(mp_wires)
            .fold(Wires::empty(), |acc, w| acc.union(&w))
    }

    /// Number of distinct wires
    pub fn num_wires(&self) -> usize {
        self.wires().len()
    }

    /// Check if nothing is measured
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

impl fmt::Display for QuantumScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "QuantumScript({}, {} operation(s), {} measurement(s))",
            self.name.as_deref().unwrap_or("unnamed"),
            self.operations.len(),
            self.measurements.len()
        )?;
        for op in &self.operations {
            writeln!(f, "  {}", op)?;
        }
        for mp in &self.measurements {
            writeln!(f, "  {}", mp)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
