//! Operator data model
//!
//! Gantree: L2_Operators → Operator
//!
//! An [`Operator`] is a closed tagged union over atomic operators, symbolic
//! wrappers, composites and the two weighted-sum observables. Each value
//! carries a write-once cache for its Pauli sentence; the cache is owned by
//! the value and cloned with it.

use crate::constants::{limits, names};
use crate::error::{QdiffError, QdiffResult};
use crate::ops::{AtomicOp, OpName};
use crate::sentence::PauliSentence;
use crate::sparse::CsrMatrix;
use crate::types::{Angle, Wire, Wires};
use ndarray::Array2;
use num_complex::Complex64;
use std::fmt;
use std::sync::OnceLock;

/// Structural variants of an operator
/// Gantree: OperatorKind // tagged union
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorKind {
    /// Named gate or observable
    Atomic(AtomicOp),
    /// Hermitian conjugate of the base
    Adjoint(Box<Operator>),
    /// Scalar multiple of the base
    SProd {
        /// Multiplier
        scalar: Complex64,
        /// Scaled operator
        base: Box<Operator>,
    },
    /// Matrix product, left to right
    Prod(Vec<Operator>),
    /// Arithmetic sum
    Sum(Vec<Operator>),
    /// Legacy tensor-product observable over disjoint wires
    Tensor(Vec<Operator>),
    /// Legacy weighted sum Σ cᵢ·opᵢ
    Hamiltonian {
        /// Term coefficients
        coeffs: Vec<Complex64>,
        /// Terms, one per coefficient
        ops: Vec<Operator>,
    },
    /// Observable given directly by a sparse matrix over `wires`
    SparseHamiltonian {
        /// Matrix over `wires` (first wire most significant)
        matrix: CsrMatrix,
        /// Acted-on wires
        wires: Wires,
    },
}

/// Quantum operator with a memoized Pauli sentence
/// Gantree: Operator // kind + pauli_rep cache
#[derive(Debug, Clone)]
pub struct Operator {
    kind: OperatorKind,
    pauli_rep: OnceLock<PauliSentence>,
}

impl PartialEq for Operator {
    /// Structural equality; the cache is ignored
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl From<AtomicOp> for Operator {
    fn from(op: AtomicOp) -> Self {
        Operator::from_kind(OperatorKind::Atomic(op))
    }
}

impl Operator {
    // ========================================================================
    // Constructors
    // ========================================================================

    fn from_kind(kind: OperatorKind) -> Self {
        Self {
            kind,
            pauli_rep: OnceLock::new(),
        }
    }

    fn single(name: OpName, params: Vec<f64>, wire: impl Into<Wire>) -> Self {
        AtomicOp::on_wire(name, params, wire.into()).into()
    }

    /// Identity on one wire
    pub fn identity(wire: impl Into<Wire>) -> Self {
        Self::single(OpName::Identity, vec![], wire)
    }

    /// Pauli-X observable
    pub fn pauli_x(wire: impl Into<Wire>) -> Self {
        Self::single(OpName::PauliX, vec![], wire)
    }

    /// Pauli-Y observable
    pub fn pauli_y(wire: impl Into<Wire>) -> Self {
        Self::single(OpName::PauliY, vec![], wire)
    }

    /// Pauli-Z observable
    pub fn pauli_z(wire: impl Into<Wire>) -> Self {
        Self::single(OpName::PauliZ, vec![], wire)
    }

    /// Hadamard
    pub fn hadamard(wire: impl Into<Wire>) -> Self {
        Self::single(OpName::Hadamard, vec![], wire)
    }

    /// X rotation
    pub fn rx(theta: Angle, wire: impl Into<Wire>) -> Self {
        Self::single(OpName::RX, vec![theta], wire)
    }

    /// Y rotation
    pub fn ry(theta: Angle, wire: impl Into<Wire>) -> Self {
        Self::single(OpName::RY, vec![theta], wire)
    }

    /// Z rotation
    pub fn rz(theta: Angle, wire: impl Into<Wire>) -> Self {
        Self::single(OpName::RZ, vec![theta], wire)
    }

    /// Controlled-NOT
    pub fn cnot(control: impl Into<Wire>, target: impl Into<Wire>) -> QdiffResult<Self> {
        let wires = Wires::new([control.into(), target.into()])?;
        Ok(AtomicOp::new(OpName::CNOT, vec![], wires)?.into())
    }

    /// Basis-state projector
    pub fn projector(basis_state: Vec<u8>, wires: Wires) -> QdiffResult<Self> {
        Ok(AtomicOp::projector(basis_state, wires)?.into())
    }

    /// Hermitian conjugate
    pub fn adjoint(base: Operator) -> Self {
        Self::from_kind(OperatorKind::Adjoint(Box::new(base)))
    }

    /// Scalar product
    pub fn s_prod(scalar: impl Into<Complex64>, base: Operator) -> Self {
        Self::from_kind(OperatorKind::SProd {
            scalar: scalar.into(),
            base: Box::new(base),
        })
    }

    /// Product of one or more factors
    pub fn prod(factors: Vec<Operator>) -> QdiffResult<Self> {
        if factors.is_empty() {
            return Err(QdiffError::EmptyComposite("Prod".to_string()));
        }
        Ok(Self::from_kind(OperatorKind::Prod(factors)))
    }

    /// Sum of one or more summands
    pub fn sum(summands: Vec<Operator>) -> QdiffResult<Self> {
        if summands.is_empty() {
            return Err(QdiffError::EmptyComposite(names::SUM.to_string()));
        }
        Ok(Self::from_kind(OperatorKind::Sum(summands)))
    }

    /// Legacy tensor product; factors must act on disjoint wires
    pub fn tensor(factors: Vec<Operator>) -> QdiffResult<Self> {
        if factors.is_empty() {
            return Err(QdiffError::EmptyComposite("Tensor".to_string()));
        }
        let mut seen = Wires::empty();
        for f in &factors {
            let w = f.wires();
            if let Some(dup) = w.iter().find(|x| seen.contains(x)) {
                return Err(QdiffError::DuplicateWire(dup.to_string()));
            }
            seen = seen.union(&w);
        }
        Ok(Self::from_kind(OperatorKind::Tensor(factors)))
    }

    /// Legacy weighted sum; coefficient and term counts must match
    pub fn hamiltonian<C: Into<Complex64>>(coeffs: Vec<C>, ops: Vec<Operator>) -> QdiffResult<Self> {
        if coeffs.len() != ops.len() {
            return Err(QdiffError::LengthMismatch {
                coeffs: coeffs.len(),
                ops: ops.len(),
            });
        }
        Ok(Self::from_kind(OperatorKind::Hamiltonian {
            coeffs: coeffs.into_iter().map(Into::into).collect(),
            ops,
        }))
    }

    /// Sparse-matrix observable over `wires`
    pub fn sparse_hamiltonian(matrix: CsrMatrix, wires: Wires) -> QdiffResult<Self> {
        if wires.len() > limits::MAX_QUBITS {
            return Err(QdiffError::TooManyQubits {
                qubits: wires.len(),
                max: limits::MAX_QUBITS,
            });
        }
        let dim = limits::dim(wires.len());
        if matrix.shape() != (dim, dim) {
            return Err(QdiffError::ShapeMismatch {
                left: matrix.shape(),
                right: (dim, dim),
            });
        }
        Ok(Self::from_kind(OperatorKind::SparseHamiltonian { matrix, wires }))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Structural variant
    pub fn kind(&self) -> &OperatorKind {
        &self.kind
    }

    /// Declared name used for dispatch
    pub fn name(&self) -> &'static str {
        match &self.kind {
            OperatorKind::Atomic(op) => op.name().as_str(),
            OperatorKind::Adjoint(_) => "Adjoint",
            OperatorKind::SProd { .. } => "SProd",
            OperatorKind::Prod(_) => "Prod",
            OperatorKind::Sum(_) => names::SUM,
            OperatorKind::Tensor(_) => "Tensor",
            OperatorKind::Hamiltonian { .. } => names::HAMILTONIAN,
            OperatorKind::SparseHamiltonian { .. } => names::SPARSE_HAMILTONIAN,
        }
    }

    /// Acted-on wires in first-appearance order
    pub fn wires(&self) -> Wires {
        match &self.kind {
            OperatorKind::Atomic(op) => op.wires().clone(),
            OperatorKind::Adjoint(base) | OperatorKind::SProd { base, .. } => base.wires(),
            OperatorKind::Prod(ops)
            | OperatorKind::Sum(ops)
            | OperatorKind::Tensor(ops)
            | OperatorKind::Hamiltonian { ops, .. } => {
                ops.iter().fold(Wires::empty(), |acc, op| acc.union(&op.wires()))
            }
            OperatorKind::SparseHamiltonian { wires, .. } => wires.clone(),
        }
    }

    /// Check if the operator is a single Pauli word (up to a scalar)
    pub fn is_pauli_word(&self) -> bool {
        match &self.kind {
            OperatorKind::Atomic(op) => op.name().pauli().is_some(),
            OperatorKind::SProd { base, .. } => base.is_pauli_word(),
            OperatorKind::Prod(ops) | OperatorKind::Tensor(ops) => {
                ops.iter().all(Operator::is_pauli_word)
            }
            OperatorKind::Hamiltonian { ops, .. } => ops.len() == 1 && ops[0].is_pauli_word(),
            OperatorKind::Adjoint(_)
            | OperatorKind::Sum(_)
            | OperatorKind::SparseHamiltonian { .. } => false,
        }
    }

    // ========================================================================
    // Pauli Representation Cache
    // ========================================================================

    /// Cached Pauli sentence, if one has been computed
    pub fn pauli_rep(&self) -> Option<&PauliSentence> {
        self.pauli_rep.get()
    }

    /// Store a Pauli sentence; a value cached first (by any thread) is kept
    pub fn cache_pauli_rep(&self, sentence: PauliSentence) {
        let _ = self.pauli_rep.set(sentence);
    }

    // ========================================================================
    // Matrix Representations
    // ========================================================================

    /// Sparse matrix over `wire_order` (first wire most significant)
    /// Gantree: sparse_matrix(&self,wire_order) -> Result<CsrMatrix>
    pub fn sparse_matrix(&self, wire_order: &Wires) -> QdiffResult<CsrMatrix> {
        let n = wire_order.len();
        if n > limits::MAX_QUBITS {
            return Err(QdiffError::TooManyQubits {
                qubits: n,
                max: limits::MAX_QUBITS,
            });
        }
        let dim = limits::dim(n);
        match &self.kind {
            OperatorKind::Atomic(op) => {
                let local = CsrMatrix::from_dense(op.local_matrix()?.view());
                local.expand(&wire_order.positions(op.wires())?, n)
            }
            OperatorKind::Adjoint(base) => Ok(base.sparse_matrix(wire_order)?.adjoint()),
            OperatorKind::SProd { scalar, base } => {
                Ok(base.sparse_matrix(wire_order)?.scale(*scalar))
            }
            OperatorKind::Prod(ops) | OperatorKind::Tensor(ops) => {
                ops.iter().try_fold(CsrMatrix::identity(dim), |acc, op| {
                    acc.dot(&op.sparse_matrix(wire_order)?)
                })
            }
            OperatorKind::Sum(ops) => ops.iter().try_fold(CsrMatrix::zeros(dim, dim), |acc, op| {
                acc.add(&op.sparse_matrix(wire_order)?)
            }),
            OperatorKind::Hamiltonian { coeffs, ops } => coeffs.iter().zip(ops).try_fold(
                CsrMatrix::zeros(dim, dim),
                |acc, (&coeff, op)| acc.add(&op.sparse_matrix(wire_order)?.scale(coeff)),
            ),
            OperatorKind::SparseHamiltonian { matrix, wires } => {
                matrix.expand(&wire_order.positions(wires)?, n)
            }
        }
    }

    /// Dense matrix over `wire_order`
    pub fn matrix(&self, wire_order: &Wires) -> QdiffResult<Array2<Complex64>> {
        Ok(self.sparse_matrix(wire_order)?.to_dense())
    }

    // ========================================================================
    // Observable Structure
    // ========================================================================

    /// Eigenvalues matching the basis reached by [`Operator::diagonalizing_gates`],
    /// ordered over [`Operator::wires`]
    pub fn eigvals(&self) -> QdiffResult<Vec<f64>> {
        match &self.kind {
            OperatorKind::Atomic(op) => op.eigvals(),
            OperatorKind::Adjoint(base) => base.eigvals(),
            OperatorKind::SProd { scalar, base } if scalar.im == 0.0 => {
                Ok(base.eigvals()?.into_iter().map(|e| e * scalar.re).collect())
            }
            OperatorKind::Tensor(ops) => kron_eigvals(ops),
            OperatorKind::Prod(ops) if has_disjoint_factors(ops) => kron_eigvals(ops),
            _ => Err(QdiffError::EigvalsUndefined(self.name().to_string())),
        }
    }

    /// Gates that rotate the eigenbasis onto the computational basis
    /// Gantree: diagonalizing_gates(&self) -> Result<Vec<AtomicOp>>
    pub fn diagonalizing_gates(&self) -> QdiffResult<Vec<AtomicOp>> {
        match &self.kind {
            OperatorKind::Atomic(op) => op.diagonalizing_gates(),
            OperatorKind::Adjoint(base) | OperatorKind::SProd { base, .. } => {
                base.diagonalizing_gates()
            }
            OperatorKind::Tensor(ops) => concat_gates(ops),
            OperatorKind::Prod(ops) if has_disjoint_factors(ops) => concat_gates(ops),
            _ => Err(QdiffError::DiagonalizingGatesUndefined(
                self.name().to_string(),
            )),
        }
    }
}

fn has_disjoint_factors(ops: &[Operator]) -> bool {
    let wires: Vec<Wires> = ops.iter().map(Operator::wires).collect();
    let total: usize = wires.iter().map(Wires::len).sum();
    Wires::all_wires(&wires).len() == total
}

fn join_ops(ops: &[Operator], sep: &str) -> String {
    ops.iter()
        .map(|op| op.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

fn kron_eigvals(ops: &[Operator]) -> QdiffResult<Vec<f64>> {
    ops.iter().try_fold(vec![1.0], |acc, op| {
        let eig = op.eigvals()?;
        Ok(acc
            .iter()
            .flat_map(|a| eig.iter().map(move |b| a * b))
            .collect())
    })
}

fn concat_gates(ops: &[Operator]) -> QdiffResult<Vec<AtomicOp>> {
    let mut gates = Vec::new();
    for op in ops {
        gates.extend(op.diagonalizing_gates()?);
    }
    Ok(gates)
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OperatorKind::Atomic(op) => write!(f, "{}", op),
            OperatorKind::Adjoint(base) => write!(f, "Adjoint({})", base),
            OperatorKind::SProd { scalar, base } => write!(f, "{} * ({})", scalar, base),
            OperatorKind::Prod(ops) | OperatorKind::Tensor(ops) => {
                write!(f, "{}", join_ops(ops, " @ "))
            }
            OperatorKind::Sum(ops) => write!(f, "{}", join_ops(ops, " + ")),
            OperatorKind::Hamiltonian { coeffs, ops } => {
                let terms: Vec<String> = coeffs
                    .iter()
                    .zip(ops)
                    .map(|(c, op)| format!("({}) [{}]", c, op))
                    .collect();
                write!(f, "Hamiltonian: {}", terms.join(" + "))
            }
            OperatorKind::SparseHamiltonian { matrix, wires } => write!(
                f,
                "SparseHamiltonian(nnz={}, wires={})",
                matrix.nnz(),
                wires
            ),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pauli::Pauli;
    use crate::sparse::kron;
    use approx::assert_abs_diff_eq;

    fn assert_matrix_close(a: &Array2<Complex64>, b: &Array2<Complex64>) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(x.re, y.re, epsilon = 1e-12);
            assert_abs_diff_eq!(x.im, y.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(Operator::pauli_x(0usize).name(), "PauliX");
        let h = Operator::hamiltonian(vec![1.0], vec![Operator::pauli_z(0usize)]).unwrap();
        assert_eq!(h.name(), "Hamiltonian");
        let s = Operator::sum(vec![Operator::pauli_z(0usize)]).unwrap();
        assert_eq!(s.name(), "Sum");
        assert!(names::is_weighted_sum(s.name()));
    }

    #[test]
    fn test_constructor_validation() {
        assert!(matches!(
            Operator::hamiltonian(vec![1.0, 2.0], vec![Operator::pauli_z(0usize)]),
            Err(QdiffError::LengthMismatch { coeffs: 2, ops: 1 })
        ));
        assert!(Operator::tensor(vec![Operator::pauli_x(0usize), Operator::pauli_z(0usize)]).is_err());
        assert!(Operator::prod(vec![]).is_err());
        assert!(Operator::cnot(1usize, 1usize).is_err());
        assert!(Operator::sparse_hamiltonian(CsrMatrix::identity(3), Wires::range(2)).is_err());
    }

    #[test]
    fn test_wires_union() {
        let op = Operator::sum(vec![
            Operator::pauli_x(2usize),
            Operator::s_prod(0.5, Operator::pauli_z(0usize)),
            Operator::pauli_y(2usize),
        ])
        .unwrap();
        assert_eq!(op.wires(), Wires::new([2usize, 0]).unwrap());
    }

    #[test]
    fn test_is_pauli_word() {
        assert!(Operator::pauli_x(0usize).is_pauli_word());
        assert!(Operator::identity(0usize).is_pauli_word());
        assert!(!Operator::hadamard(0usize).is_pauli_word());
        let t = Operator::tensor(vec![Operator::pauli_x(0usize), Operator::pauli_z(1usize)]).unwrap();
        assert!(t.is_pauli_word());
        let h = Operator::hamiltonian(vec![1.0, 1.0], vec![Operator::pauli_x(0usize), Operator::pauli_z(1usize)])
            .unwrap();
        assert!(!h.is_pauli_word());
        assert!(!Operator::adjoint(Operator::pauli_x(0usize)).is_pauli_word());
    }

    #[test]
    fn test_sparse_matrix_atomic_expansion() {
        let order = Wires::range(2);
        let m = Operator::pauli_x(1usize).matrix(&order).unwrap();
        assert_matrix_close(&m, &kron(&Pauli::I.matrix(), &Pauli::X.matrix()));
    }

    #[test]
    fn test_sparse_matrix_hamiltonian() {
        let h = Operator::hamiltonian(
            vec![0.5, -2.0],
            vec![
                Operator::pauli_z(0usize),
                Operator::tensor(vec![Operator::pauli_x(0usize), Operator::pauli_x(1usize)]).unwrap(),
            ],
        )
        .unwrap();
        let m = h.matrix(&Wires::range(2)).unwrap();
        let z_i = kron(&Pauli::Z.matrix(), &Pauli::I.matrix()).mapv(|v| v * 0.5);
        let x_x = kron(&Pauli::X.matrix(), &Pauli::X.matrix()).mapv(|v| v * -2.0);
        assert_matrix_close(&m, &(z_i + x_x));
    }

    #[test]
    fn test_sparse_matrix_prod_order() {
        // X · Y = i Z on one wire
        let p = Operator::prod(vec![Operator::pauli_x(0usize), Operator::pauli_y(0usize)]).unwrap();
        let m = p.matrix(&Wires::range(1)).unwrap();
        assert_matrix_close(&m, &Pauli::Z.matrix().mapv(|v| v * Complex64::new(0.0, 1.0)));
    }

    #[test]
    fn test_sparse_hamiltonian_embedding() {
        let local = CsrMatrix::from_dense(Pauli::Z.matrix().view());
        let op = Operator::sparse_hamiltonian(local, Wires::single(1usize)).unwrap();
        let m = op.matrix(&Wires::range(2)).unwrap();
        assert_matrix_close(&m, &kron(&Pauli::I.matrix(), &Pauli::Z.matrix()));
    }

    #[test]
    fn test_missing_wire_in_order() {
        let op = Operator::pauli_x(5usize);
        assert!(matches!(
            op.sparse_matrix(&Wires::range(2)),
            Err(QdiffError::WireNotFound(_))
        ));
    }

    #[test]
    fn test_tensor_eigvals_and_gates() {
        let t = Operator::tensor(vec![Operator::pauli_x(0usize), Operator::pauli_z(1usize)]).unwrap();
        assert_eq!(t.eigvals().unwrap(), vec![1.0, -1.0, -1.0, 1.0]);
        let gates = t.diagonalizing_gates().unwrap();
        assert_eq!(gates.len(), 1);
        assert_eq!(gates[0].name(), OpName::Hadamard);
    }

    #[test]
    fn test_weighted_sums_have_no_diagonalizing_gates() {
        let h = Operator::hamiltonian(vec![1.0], vec![Operator::pauli_z(0usize)]).unwrap();
        assert!(matches!(
            h.diagonalizing_gates(),
            Err(QdiffError::DiagonalizingGatesUndefined(_))
        ));
        assert!(matches!(h.eigvals(), Err(QdiffError::EigvalsUndefined(_))));
    }

    #[test]
    fn test_sprod_eigvals_scaled() {
        let op = Operator::s_prod(3.0, Operator::pauli_y(0usize));
        assert_eq!(op.eigvals().unwrap(), vec![3.0, -3.0]);
        let complex = Operator::s_prod(Complex64::new(0.0, 1.0), Operator::pauli_y(0usize));
        assert!(complex.eigvals().is_err());
    }

    #[test]
    fn test_cache_survives_clone_and_ignores_second_set() {
        let op = Operator::pauli_x(0usize);
        assert!(op.pauli_rep().is_none());
        op.cache_pauli_rep(PauliSentence::single(0usize, Pauli::X));
        op.cache_pauli_rep(PauliSentence::new());
        assert_eq!(op.pauli_rep().unwrap().len(), 1);

        let copy = op.clone();
        assert_eq!(copy.pauli_rep(), op.pauli_rep());
        assert_eq!(copy, Operator::pauli_x(0usize));
    }

    #[test]
    fn test_operator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Operator>();
    }

    #[test]
    fn test_display() {
        let t = Operator::tensor(vec![Operator::pauli_x(0usize), Operator::pauli_z(1usize)]).unwrap();
        assert_eq!(t.to_string(), "PauliX(wires=[0]) @ PauliZ(wires=[1])");
    }
}
