//! Atomic operator catalogue
//!
//! Gantree: L1_Operators → AtomicOp
//!
//! Named gates and observables that act on a fixed set of wires. Each entry
//! knows its parameter and wire arity, its local matrix (big-endian over its
//! own wires), and, for observables, its eigenvalues and diagonalizing gates.

use crate::constants::limits;
use crate::error::{QdiffError, QdiffResult};
use crate::pauli::Pauli;
use crate::types::{Angle, ParamVec, Wire, Wires};
use ndarray::{arr2, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// OpName
// ============================================================================

/// Declared operator name
/// Gantree: OpName // closed catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpName {
    // ========================================================================
    // Observables
    // ========================================================================
    /// Identity on any number of wires
    Identity,
    /// Pauli-X
    PauliX,
    /// Pauli-Y
    PauliY,
    /// Pauli-Z
    PauliZ,
    /// Hadamard
    Hadamard,
    /// Projector onto a computational basis state
    Projector,

    // ========================================================================
    // Fixed Gates
    // ========================================================================
    /// S = diag(1, i)
    S,
    /// T = diag(1, e^{iπ/4})
    T,
    /// Square root of X
    SX,
    /// Controlled-NOT (control, target)
    CNOT,
    /// Controlled-Z
    CZ,
    /// Controlled-Y (control, target)
    CY,
    /// SWAP
    SWAP,

    // ========================================================================
    // Parameterized Gates
    // ========================================================================
    /// Rotation about X
    RX,
    /// Rotation about Y
    RY,
    /// Rotation about Z
    RZ,
    /// Phase shift diag(1, e^{iφ})
    PhaseShift,
    /// General rotation RZ(ω) RY(θ) RZ(φ)
    Rot,
}

impl OpName {
    /// Declared name string
    pub fn as_str(&self) -> &'static str {
        match self {
            OpName::Identity => "Identity",
            OpName::PauliX => "PauliX",
            OpName::PauliY => "PauliY",
            OpName::PauliZ => "PauliZ",
            OpName::Hadamard => "Hadamard",
            OpName::Projector => "Projector",
            OpName::S => "S",
            OpName::T => "T",
            OpName::SX => "SX",
            OpName::CNOT => "CNOT",
            OpName::CZ => "CZ",
            OpName::CY => "CY",
            OpName::SWAP => "SWAP",
            OpName::RX => "RX",
            OpName::RY => "RY",
            OpName::RZ => "RZ",
            OpName::PhaseShift => "PhaseShift",
            OpName::Rot => "Rot",
        }
    }

    /// Number of numeric parameters
    pub fn num_params(&self) -> usize {
        match self {
            OpName::RX | OpName::RY | OpName::RZ | OpName::PhaseShift => 1,
            OpName::Rot => 3,
            _ => 0,
        }
    }

    /// Fixed wire count, `None` when any positive count is accepted
    pub fn num_wires(&self) -> Option<usize> {
        match self {
            OpName::Identity | OpName::Projector => None,
            OpName::CNOT | OpName::CZ | OpName::CY | OpName::SWAP => Some(2),
            _ => Some(1),
        }
    }

    /// Pauli this name stands for, if it is one of I, X, Y, Z
    pub fn pauli(&self) -> Option<Pauli> {
        match self {
            OpName::Identity => Some(Pauli::I),
            OpName::PauliX => Some(Pauli::X),
            OpName::PauliY => Some(Pauli::Y),
            OpName::PauliZ => Some(Pauli::Z),
            _ => None,
        }
    }
}

impl fmt::Display for OpName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OpName {
    type Err = QdiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = match s {
            "Identity" | "I" => OpName::Identity,
            "PauliX" | "X" => OpName::PauliX,
            "PauliY" | "Y" => OpName::PauliY,
            "PauliZ" | "Z" => OpName::PauliZ,
            "Hadamard" | "H" => OpName::Hadamard,
            "Projector" => OpName::Projector,
            "S" => OpName::S,
            "T" => OpName::T,
            "SX" => OpName::SX,
            "CNOT" | "CX" => OpName::CNOT,
            "CZ" => OpName::CZ,
            "CY" => OpName::CY,
            "SWAP" => OpName::SWAP,
            "RX" => OpName::RX,
            "RY" => OpName::RY,
            "RZ" => OpName::RZ,
            "PhaseShift" => OpName::PhaseShift,
            "Rot" => OpName::Rot,
            other => {
                return Err(QdiffError::InvalidHyperparameter {
                    op: other.to_string(),
                    reason: "unknown operator name".to_string(),
                })
            }
        };
        Ok(name)
    }
}

// ============================================================================
// AtomicOp
// ============================================================================

/// Non-numeric settings of an atomic operator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Basis state of a `Projector`, one bit per wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basis_state: Option<Vec<u8>>,
}

/// Named operator acting on explicit wires
/// Gantree: AtomicOp // name + params + wires + hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAtomicOp")]
pub struct AtomicOp {
    name: OpName,
    params: ParamVec,
    wires: Wires,
    #[serde(default)]
    hyperparameters: Hyperparameters,
}

/// Unchecked wire form of [`AtomicOp`]
#[derive(Deserialize)]
struct RawAtomicOp {
    name: OpName,
    #[serde(default)]
    params: ParamVec,
    wires: Wires,
    #[serde(default)]
    hyperparameters: Hyperparameters,
}

impl TryFrom<RawAtomicOp> for AtomicOp {
    type Error = QdiffError;

    fn try_from(raw: RawAtomicOp) -> QdiffResult<Self> {
        match (raw.name, raw.hyperparameters.basis_state) {
            (OpName::Projector, Some(bits)) if raw.params.is_empty() => {
                AtomicOp::projector(bits, raw.wires)
            }
            (OpName::Projector, Some(_)) => Err(QdiffError::InvalidParameterCount {
                op: OpName::Projector.to_string(),
                expected: 0,
                got: raw.params.len(),
            }),
            (name, None) => AtomicOp::new(name, raw.params, raw.wires),
            (name, Some(_)) => Err(QdiffError::InvalidHyperparameter {
                op: name.to_string(),
                reason: "only Projector takes a basis state".to_string(),
            }),
        }
    }
}

impl AtomicOp {
    /// Create with parameter and wire count validation
    /// Gantree: new(name,params,wires) -> Result<Self>
    pub fn new(name: OpName, params: ParamVec, wires: Wires) -> QdiffResult<Self> {
        if name == OpName::Projector {
            return Err(QdiffError::InvalidHyperparameter {
                op: name.to_string(),
                reason: "use AtomicOp::projector to supply a basis state".to_string(),
            });
        }
        Self::validated(name, params, wires, Hyperparameters::default())
    }

    /// Projector onto the basis state `|basis_state⟩` over `wires`
    pub fn projector(basis_state: Vec<u8>, wires: Wires) -> QdiffResult<Self> {
        if basis_state.len() != wires.len() {
            return Err(QdiffError::InvalidHyperparameter {
                op: OpName::Projector.to_string(),
                reason: format!(
                    "basis state of length {} on {} wire(s)",
                    basis_state.len(),
                    wires.len()
                ),
            });
        }
        if basis_state.iter().any(|&b| b > 1) {
            return Err(QdiffError::InvalidHyperparameter {
                op: OpName::Projector.to_string(),
                reason: "basis state entries must be 0 or 1".to_string(),
            });
        }
        Self::validated(
            OpName::Projector,
            Vec::new(),
            wires,
            Hyperparameters {
                basis_state: Some(basis_state),
            },
        )
    }

    /// Single-wire operator whose arity is known to be valid
    pub(crate) fn on_wire(name: OpName, params: ParamVec, wire: Wire) -> Self {
        Self {
            name,
            params,
            wires: Wires::single(wire),
            hyperparameters: Hyperparameters::default(),
        }
    }

    fn validated(
        name: OpName,
        params: ParamVec,
        wires: Wires,
        hyperparameters: Hyperparameters,
    ) -> QdiffResult<Self> {
        if params.len() != name.num_params() {
            return Err(QdiffError::InvalidParameterCount {
                op: name.to_string(),
                expected: name.num_params(),
                got: params.len(),
            });
        }
        let expected = name.num_wires().unwrap_or(wires.len().max(1));
        if wires.len() != expected {
            return Err(QdiffError::InvalidWireCount {
                op: name.to_string(),
                expected,
                got: wires.len(),
            });
        }
        if wires.len() > limits::MAX_QUBITS {
            return Err(QdiffError::TooManyQubits {
                qubits: wires.len(),
                max: limits::MAX_QUBITS,
            });
        }
        Ok(Self {
            name,
            params,
            wires,
            hyperparameters,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Declared name
    pub fn name(&self) -> OpName {
        self.name
    }

    /// Numeric parameters
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Acted-on wires
    pub fn wires(&self) -> &Wires {
        &self.wires
    }

    /// Hyperparameters
    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.hyperparameters
    }

    /// Parameter at `index`
    pub fn param(&self, index: usize) -> QdiffResult<f64> {
        self.params
            .get(index)
            .copied()
            .ok_or_else(|| QdiffError::InvalidParameterCount {
                op: self.name.to_string(),
                expected: self.name.num_params(),
                got: self.params.len(),
            })
    }

    // ========================================================================
    // Representations
    // ========================================================================

    /// Matrix over the operator's own wires
    /// Gantree: local_matrix(&self) -> Result<Array2<C64>>
    pub fn local_matrix(&self) -> QdiffResult<Array2<Complex64>> {
        let m = match self.name {
            OpName::Identity => Array2::eye(limits::dim(self.wires.len())),
            OpName::PauliX => Pauli::X.matrix(),
            OpName::PauliY => Pauli::Y.matrix(),
            OpName::PauliZ => Pauli::Z.matrix(),
            OpName::Hadamard => hadamard(),
            OpName::Projector => {
                let index = self.basis_index()?;
                let dim = limits::dim(self.wires.len());
                let mut m = Array2::zeros((dim, dim));
                m[[index, index]] = c(1.0, 0.0);
                m
            }
            OpName::S => diag(c(1.0, 0.0), c(0.0, 1.0)),
            OpName::T => diag(c(1.0, 0.0), Complex64::from_polar(1.0, FRAC_PI_4)),
            OpName::SX => arr2(&[[c(0.5, 0.5), c(0.5, -0.5)], [c(0.5, -0.5), c(0.5, 0.5)]]),
            OpName::CNOT => controlled(&Pauli::X.matrix()),
            OpName::CZ => controlled(&Pauli::Z.matrix()),
            OpName::CY => controlled(&Pauli::Y.matrix()),
            OpName::SWAP => {
                let mut m = Array2::zeros((4, 4));
                for (r, col) in [(0, 0), (1, 2), (2, 1), (3, 3)] {
                    m[[r, col]] = c(1.0, 0.0);
                }
                m
            }
            OpName::RX => rx(self.param(0)?),
            OpName::RY => ry(self.param(0)?),
            OpName::RZ => rz(self.param(0)?),
            OpName::PhaseShift => diag(c(1.0, 0.0), Complex64::from_polar(1.0, self.param(0)?)),
            OpName::Rot => rz(self.param(2)?)
                .dot(&ry(self.param(1)?))
                .dot(&rz(self.param(0)?)),
        };
        Ok(m)
    }

    /// Flat index of a projector's basis state (first wire most significant)
    fn basis_index(&self) -> QdiffResult<usize> {
        let bits = self.hyperparameters.basis_state.as_ref().ok_or_else(|| {
            QdiffError::InvalidHyperparameter {
                op: self.name.to_string(),
                reason: "missing basis state".to_string(),
            }
        })?;
        Ok(bits.iter().fold(0, |acc, &b| (acc << 1) | b as usize))
    }

    /// Eigenvalues in the computational basis after diagonalization
    /// Gantree: eigvals(&self) -> Result<Vec<f64>>
    pub fn eigvals(&self) -> QdiffResult<Vec<f64>> {
        match self.name {
            OpName::PauliX | OpName::PauliY | OpName::PauliZ | OpName::Hadamard => {
                Ok(vec![1.0, -1.0])
            }
            OpName::Identity => Ok(vec![1.0; limits::dim(self.wires.len())]),
            OpName::Projector => {
                let index = self.basis_index()?;
                let mut eig = vec![0.0; limits::dim(self.wires.len())];
                eig[index] = 1.0;
                Ok(eig)
            }
            _ => Err(QdiffError::EigvalsUndefined(self.name.to_string())),
        }
    }

    /// Gates rotating the operator's eigenbasis onto the computational basis
    /// Gantree: diagonalizing_gates(&self) -> Result<Vec<AtomicOp>>
    pub fn diagonalizing_gates(&self) -> QdiffResult<Vec<AtomicOp>> {
        let gate = |name: OpName, params: ParamVec| {
            AtomicOp::on_wire(name, params, self.wires[0].clone())
        };
        match self.name {
            OpName::PauliZ | OpName::Identity | OpName::Projector => Ok(Vec::new()),
            OpName::PauliX => Ok(vec![gate(OpName::Hadamard, vec![])]),
            OpName::PauliY => Ok(vec![
                gate(OpName::PauliZ, vec![]),
                gate(OpName::S, vec![]),
                gate(OpName::Hadamard, vec![]),
            ]),
            OpName::Hadamard => Ok(vec![gate(OpName::RY, vec![-FRAC_PI_4])]),
            _ => Err(QdiffError::DiagonalizingGatesUndefined(
                self.name.to_string(),
            )),
        }
    }
}

impl fmt::Display for AtomicOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}(wires={})", self.name, self.wires)
        } else {
            let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
            write!(f, "{}({}, wires={})", self.name, params.join(", "), self.wires)
        }
    }
}

// ============================================================================
// Matrix Builders
// ============================================================================

#[inline]
fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn diag(a: Complex64, b: Complex64) -> Array2<Complex64> {
    let z = c(0.0, 0.0);
    arr2(&[[a, z], [z, b]])
}

fn hadamard() -> Array2<Complex64> {
    let h = c(FRAC_1_SQRT_2, 0.0);
    arr2(&[[h, h], [h, -h]])
}

/// |0⟩⟨0| ⊗ I + |1⟩⟨1| ⊗ U for a single-qubit U
fn controlled(u: &Array2<Complex64>) -> Array2<Complex64> {
    let mut m = Array2::zeros((4, 4));
    m[[0, 0]] = c(1.0, 0.0);
    m[[1, 1]] = c(1.0, 0.0);
    for ((r, col), &v) in u.indexed_iter() {
        m[[2 + r, 2 + col]] = v;
    }
    m
}

fn rx(theta: Angle) -> Array2<Complex64> {
    let (s, co) = (theta / 2.0).sin_cos();
    arr2(&[[c(co, 0.0), c(0.0, -s)], [c(0.0, -s), c(co, 0.0)]])
}

fn ry(theta: Angle) -> Array2<Complex64> {
    let (s, co) = (theta / 2.0).sin_cos();
    arr2(&[[c(co, 0.0), c(-s, 0.0)], [c(s, 0.0), c(co, 0.0)]])
}

fn rz(theta: Angle) -> Array2<Complex64> {
    diag(
        Complex64::from_polar(1.0, -theta / 2.0),
        Complex64::from_polar(1.0, theta / 2.0),
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn op(name: OpName, params: ParamVec, wires: &[usize]) -> AtomicOp {
        AtomicOp::new(name, params, Wires::new(wires.iter().copied()).unwrap()).unwrap()
    }

    fn assert_matrix_close(a: &Array2<Complex64>, b: &Array2<Complex64>) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(x.re, y.re, epsilon = 1e-12);
            assert_abs_diff_eq!(x.im, y.im, epsilon = 1e-12);
        }
    }

    /// U · M · U† for diagonalizing gates applied in order
    fn rotate(m: &Array2<Complex64>, gates: &[AtomicOp]) -> Array2<Complex64> {
        gates.iter().fold(m.clone(), |acc, g| {
            let u = g.local_matrix().unwrap();
            let u_dag = u.t().mapv(|v| v.conj());
            u.dot(&acc).dot(&u_dag)
        })
    }

    #[test]
    fn test_arity_validation() {
        let err = AtomicOp::new(OpName::RX, vec![], Wires::range(1)).unwrap_err();
        assert!(matches!(err, QdiffError::InvalidParameterCount { expected: 1, got: 0, .. }));

        let err = AtomicOp::new(OpName::CNOT, vec![], Wires::range(1)).unwrap_err();
        assert!(matches!(err, QdiffError::InvalidWireCount { expected: 2, got: 1, .. }));

        assert!(AtomicOp::new(OpName::Identity, vec![], Wires::range(3)).is_ok());
        assert!(AtomicOp::new(OpName::Identity, vec![], Wires::empty()).is_err());
    }

    #[test]
    fn test_projector_validation() {
        assert!(AtomicOp::projector(vec![1, 0], Wires::range(2)).is_ok());
        assert!(AtomicOp::projector(vec![1], Wires::range(2)).is_err());
        assert!(AtomicOp::projector(vec![2, 0], Wires::range(2)).is_err());
        assert!(AtomicOp::new(OpName::Projector, vec![], Wires::range(1)).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let rx: AtomicOp =
            serde_json::from_str(r#"{"name":"RX","params":[0.5],"wires":[0]}"#).unwrap();
        assert_eq!(rx.param(0).unwrap(), 0.5);

        assert!(serde_json::from_str::<AtomicOp>(r#"{"name":"RX","params":[],"wires":[0]}"#).is_err());
        assert!(serde_json::from_str::<AtomicOp>(r#"{"name":"CNOT","wires":[0]}"#).is_err());
        assert!(serde_json::from_str::<AtomicOp>(r#"{"name":"Projector","wires":[0]}"#).is_err());
        assert!(serde_json::from_str::<AtomicOp>(
            r#"{"name":"PauliX","wires":[0],"hyperparameters":{"basis_state":[1]}}"#
        )
        .is_err());

        let projector = AtomicOp::projector(vec![1, 0], Wires::range(2)).unwrap();
        let json = serde_json::to_string(&projector).unwrap();
        assert_eq!(serde_json::from_str::<AtomicOp>(&json).unwrap(), projector);
    }

    #[test]
    fn test_param_accessor() {
        let rot = op(OpName::Rot, vec![0.1, 0.2, 0.3], &[0]);
        assert_eq!(rot.param(2).unwrap(), 0.3);
        assert!(matches!(
            rot.param(3),
            Err(QdiffError::InvalidParameterCount { expected: 3, got: 3, .. })
        ));
    }

    #[test]
    fn test_unitarity() {
        let gates = [
            op(OpName::Hadamard, vec![], &[0]),
            op(OpName::S, vec![], &[0]),
            op(OpName::T, vec![], &[0]),
            op(OpName::SX, vec![], &[0]),
            op(OpName::RX, vec![0.3], &[0]),
            op(OpName::RY, vec![-1.1], &[0]),
            op(OpName::RZ, vec![2.0], &[0]),
            op(OpName::PhaseShift, vec![0.7], &[0]),
            op(OpName::Rot, vec![0.1, 0.2, 0.3], &[0]),
            op(OpName::CNOT, vec![], &[0, 1]),
            op(OpName::CY, vec![], &[0, 1]),
            op(OpName::SWAP, vec![], &[0, 1]),
        ];
        for g in &gates {
            let u = g.local_matrix().unwrap();
            let prod = u.t().mapv(|v| v.conj()).dot(&u);
            assert_matrix_close(&prod, &Array2::eye(u.nrows()));
        }
    }

    #[test]
    fn test_sx_squares_to_x() {
        let sx = op(OpName::SX, vec![], &[0]).local_matrix().unwrap();
        assert_matrix_close(&sx.dot(&sx), &Pauli::X.matrix());
    }

    #[test]
    fn test_diagonalizing_gates_diagonalize() {
        for name in [OpName::PauliX, OpName::PauliY, OpName::PauliZ, OpName::Hadamard] {
            let obs = op(name, vec![], &[0]);
            let gates = obs.diagonalizing_gates().unwrap();
            let rotated = rotate(&obs.local_matrix().unwrap(), &gates);
            let eig = obs.eigvals().unwrap();
            let expected = diag(c(eig[0], 0.0), c(eig[1], 0.0));
            assert_matrix_close(&rotated, &expected);
        }
    }

    #[test]
    fn test_pauli_y_gate_sequence() {
        let gates = op(OpName::PauliY, vec![], &[0]).diagonalizing_gates().unwrap();
        let names: Vec<OpName> = gates.iter().map(|g| g.name()).collect();
        assert_eq!(names, vec![OpName::PauliZ, OpName::S, OpName::Hadamard]);
    }

    #[test]
    fn test_projector_eigvals() {
        let proj = AtomicOp::projector(vec![1, 0], Wires::range(2)).unwrap();
        assert_eq!(proj.eigvals().unwrap(), vec![0.0, 0.0, 1.0, 0.0]);
        assert!(proj.diagonalizing_gates().unwrap().is_empty());
        assert_eq!(proj.local_matrix().unwrap()[[2, 2]], c(1.0, 0.0));
    }

    #[test]
    fn test_gates_have_no_eigvals() {
        let rx = op(OpName::RX, vec![0.5], &[0]);
        assert!(matches!(rx.eigvals(), Err(QdiffError::EigvalsUndefined(_))));
        assert!(matches!(
            rx.diagonalizing_gates(),
            Err(QdiffError::DiagonalizingGatesUndefined(_))
        ));
    }

    #[test]
    fn test_name_parsing() {
        assert_eq!("PauliX".parse::<OpName>().unwrap(), OpName::PauliX);
        assert_eq!("CX".parse::<OpName>().unwrap(), OpName::CNOT);
        assert!("Toffoli".parse::<OpName>().is_err());
        assert_eq!(OpName::PhaseShift.to_string(), "PhaseShift");
    }

    #[test]
    fn test_display() {
        assert_eq!(op(OpName::RX, vec![0.5], &[0]).to_string(), "RX(0.5, wires=[0])");
        assert_eq!(op(OpName::PauliZ, vec![], &[1]).to_string(), "PauliZ(wires=[1])");
    }
}
