//! State-vector simulator
//!
//! Gantree: L4_Backend → StateSimulator
//!
//! Starts every script from |0…0⟩ over the device wires, applies the
//! operations in order and measures each measurement on the final state.

use crate::apply::apply_operator;
use crate::config::SimulatorConfig;
use crate::execution::{Device, ExecutionMetadata, ExecutionResult};
use crate::measure::measure;
use crate::script::QuantumScript;
use crate::state::QubitState;
use log::{debug, trace};
use qdiff_core::{QdiffError, QdiffResult};

/// Exact state-vector device
/// Gantree: StateSimulator // config
#[derive(Debug, Clone, Default)]
pub struct StateSimulator {
    config: SimulatorConfig,
}

impl StateSimulator {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Simulator from a validated config
    pub fn new(config: SimulatorConfig) -> QdiffResult<Self> {
        Ok(Self {
            config: config.checked()?,
        })
    }

    /// Simulator with `num_wires` device wires `0..num_wires`
    pub fn with_num_wires(num_wires: usize) -> Self {
        Self {
            config: SimulatorConfig::default().with_num_wires(num_wires),
        }
    }

    /// Active config
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Final state of a script
    /// Gantree: simulate_state(script) -> Result<QubitState>
    pub fn simulate_state(&self, script: &QuantumScript) -> QdiffResult<QubitState> {
        let wires = self.config.device_wires(&script.wires())?;
        let mut state = QubitState::zero_on(wires)?;
        for op in script.operations() {
            trace!("{}: apply {}", self.config.name, op);
            state = apply_operator(op, &state)?;
        }

        if self.config.check_norm && !state.is_normalized(self.config.norm_tolerance) {
            return Err(QdiffError::InvalidState(format!(
                "final state has squared norm {}",
                state.norm_sqr()
            )));
        }
        Ok(state)
    }
}

impl Device for StateSimulator {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn execute(&self, script: &QuantumScript) -> QdiffResult<ExecutionResult> {
        debug!(
            "{}: executing {} operation(s), {} measurement(s)",
            self.config.name,
            script.operations().len(),
            script.measurements().len()
        );
        let state = self.simulate_state(script)?;
        let results = script
            .measurements()
            .iter()
            .map(|mp| measure(mp, &state))
            .collect::<QdiffResult<Vec<_>>>()?;

        Ok(ExecutionResult {
            results,
            metadata: ExecutionMetadata {
                device: self.config.name.clone(),
                wires: state.wires().clone(),
                num_operations: script.operations().len(),
                final_norm_sqr: state.norm_sqr(),
            },
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qdiff_core::{MeasurementProcess, Operator, Wires};
    use std::f64::consts::PI;

    fn bell() -> QuantumScript {
        QuantumScript::new()
            .with_operation(Operator::hadamard(0usize))
            .with_operation(Operator::cnot(0usize, 1usize).unwrap())
    }

    #[test]
    fn test_bell_probabilities() {
        let script = bell().with_measurement(MeasurementProcess::probs(Wires::range(2)));
        let result = StateSimulator::default().execute(&script).unwrap();
        let probs = result.results[0].as_vector().unwrap();
        let expected = [0.5, 0.0, 0.0, 0.5];
        for (p, e) in probs.iter().zip(expected) {
            assert_abs_diff_eq!(*p, e, epsilon = 1e-12);
        }
        assert_eq!(result.metadata.num_operations, 2);
    }

    #[test]
    fn test_bell_parity() {
        let zz = Operator::tensor(vec![Operator::pauli_z(0usize), Operator::pauli_z(1usize)]).unwrap();
        let script = bell().with_measurement(MeasurementProcess::expval(zz));
        let result = StateSimulator::default().execute(&script).unwrap();
        assert_abs_diff_eq!(result.scalars().unwrap()[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rz_between_hadamards_flips() {
        let script = QuantumScript::new()
            .with_operation(Operator::hadamard(0usize))
            .with_operation(Operator::rz(PI, 0usize))
            .with_operation(Operator::hadamard(0usize))
            .with_measurement(MeasurementProcess::expval(Operator::pauli_z(0usize)));
        let result = StateSimulator::default().execute(&script).unwrap();
        assert_abs_diff_eq!(result.scalars().unwrap()[0], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fixed_device_wires() {
        let sim = StateSimulator::with_num_wires(3);
        let script = QuantumScript::new()
            .with_operation(Operator::pauli_x(2usize))
            .with_measurement(MeasurementProcess::state());
        let result = sim.execute(&script).unwrap();
        let amps = result.results[0].as_state().unwrap();
        assert_eq!(amps.len(), 8);
        assert_abs_diff_eq!(amps[1].re, 1.0, epsilon = 1e-12);
        assert_eq!(result.metadata.wires, Wires::range(3));

        let outside = QuantumScript::new().with_operation(Operator::pauli_x(5usize));
        assert!(matches!(
            sim.execute(&outside),
            Err(QdiffError::WireNotFound(_))
        ));
    }

    #[test]
    fn test_norm_check_rejects_non_unitary_operation() {
        let script = QuantumScript::new()
            .with_operation(Operator::s_prod(2.0, Operator::pauli_x(0usize)))
            .with_measurement(MeasurementProcess::state());
        let strict = StateSimulator::default();
        assert!(matches!(
            strict.execute(&script),
            Err(QdiffError::InvalidState(_))
        ));

        let lenient =
            StateSimulator::new(SimulatorConfig::default().with_check_norm(false)).unwrap();
        let result = lenient.execute(&script).unwrap();
        assert_abs_diff_eq!(result.metadata.final_norm_sqr, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimulatorConfig::default().with_norm_tolerance(-1.0);
        assert!(StateSimulator::new(config).is_err());
    }

    #[test]
    fn test_batch() {
        let sim = StateSimulator::default();
        let scripts = vec![
            bell().with_measurement(MeasurementProcess::state()),
            QuantumScript::new()
                .with_measurement(MeasurementProcess::expval(Operator::pauli_z(0usize))),
        ];
        let results = sim.execute_batch(&scripts).unwrap();
        assert_eq!(results.len(), 2);
        assert_abs_diff_eq!(results[1].scalars().unwrap()[0], 1.0, epsilon = 1e-12);
    }
}
