//! Compressed sparse row matrices
//!
//! Gantree: L1_Algebra → SparseMatrix
//!
//! A small CSR container over `Complex64` with the handful of operations the
//! engine needs: products, sums, adjoints, dense conversion and expansion of
//! a k-qubit matrix into a larger wire basis.
//!
//! Qubit ordering is big-endian: local qubit `t` of a `k`-qubit matrix is bit
//! `k - 1 - t` of its row/column index.

use crate::constants::limits;
use crate::error::{QdiffError, QdiffResult};
use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;
use std::collections::BTreeMap;

/// Sparse complex matrix in CSR layout
/// Gantree: CsrMatrix // indptr/indices/data
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    rows: usize,
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<Complex64>,
}

impl CsrMatrix {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// All-zero matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            indptr: vec![0; rows + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Square identity
    pub fn identity(n: usize) -> Self {
        Self {
            rows: n,
            cols: n,
            indptr: (0..=n).collect(),
            indices: (0..n).collect(),
            data: vec![Complex64::new(1.0, 0.0); n],
        }
    }

    /// Build from (row, col, value) triplets; duplicates are summed
    /// Gantree: from_triplets(r,c,iter) -> Result<Self> // COO → CSR
    pub fn from_triplets<I>(rows: usize, cols: usize, triplets: I) -> QdiffResult<Self>
    where
        I: IntoIterator<Item = (usize, usize, Complex64)>,
    {
        let mut entries: Vec<(usize, usize, Complex64)> = triplets.into_iter().collect();
        if let Some(&(r, c, _)) = entries.iter().find(|(r, c, _)| *r >= rows || *c >= cols) {
            return Err(QdiffError::ShapeMismatch {
                left: (rows, cols),
                right: (r + 1, c + 1),
            });
        }
        entries.sort_unstable_by_key(|&(r, c, _)| (r, c));

        let mut indptr = vec![0; rows + 1];
        let mut indices: Vec<usize> = Vec::with_capacity(entries.len());
        let mut data: Vec<Complex64> = Vec::with_capacity(entries.len());
        let mut last: Option<(usize, usize)> = None;

        for (r, c, v) in entries {
            if last == Some((r, c)) {
                if let Some(slot) = data.last_mut() {
                    *slot += v;
                }
                continue;
            }
            indices.push(c);
            data.push(v);
            indptr[r + 1] += 1;
            last = Some((r, c));
        }
        for r in 0..rows {
            indptr[r + 1] += indptr[r];
        }

        Ok(Self {
            rows,
            cols,
            indptr,
            indices,
            data,
        })
    }

    /// Build from a dense matrix, skipping exact zeros
    pub fn from_dense(dense: ArrayView2<'_, Complex64>) -> Self {
        let (rows, cols) = dense.dim();
        let mut indptr = Vec::with_capacity(rows + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for row in dense.outer_iter() {
            for (c, &v) in row.iter().enumerate() {
                if v != Complex64::new(0.0, 0.0) {
                    indices.push(c);
                    data.push(v);
                }
            }
            indptr.push(indices.len());
        }
        Self {
            rows,
            cols,
            indptr,
            indices,
            data,
        }
    }

    /// 1×N row vector
    pub fn row_vector<I: IntoIterator<Item = Complex64>>(values: I) -> Self {
        let values: Vec<Complex64> = values.into_iter().collect();
        let n = values.len();
        let triplets = values.into_iter().enumerate().map(|(c, v)| (0, c, v));
        Self::from_triplets(1, n, triplets).unwrap_or_else(|_| Self::zeros(1, n))
    }

    /// N×1 column vector
    pub fn column_vector<I: IntoIterator<Item = Complex64>>(values: I) -> Self {
        let values: Vec<Complex64> = values.into_iter().collect();
        let n = values.len();
        let triplets = values.into_iter().enumerate().map(|(r, v)| (r, 0, v));
        Self::from_triplets(n, 1, triplets).unwrap_or_else(|_| Self::zeros(n, 1))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Entry at (row, col); zero when not stored
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        if row >= self.rows {
            return Complex64::new(0.0, 0.0);
        }
        let span = self.indptr[row]..self.indptr[row + 1];
        self.indices[span.clone()]
            .binary_search(&col)
            .map(|k| self.data[span.start + k])
            .unwrap_or(Complex64::new(0.0, 0.0))
    }

    /// Iterate over stored (row, col, value) entries in row order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Complex64)> + '_ {
        (0..self.rows).flat_map(move |r| {
            (self.indptr[r]..self.indptr[r + 1]).map(move |k| (r, self.indices[k], self.data[k]))
        })
    }

    /// Dense copy
    pub fn to_dense(&self) -> Array2<Complex64> {
        let mut dense = Array2::zeros((self.rows, self.cols));
        for (r, c, v) in self.iter() {
            dense[[r, c]] = v;
        }
        dense
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Matrix product `self · other`
    /// Gantree: dot(&other) -> Result<Self> // row-wise accumulation
    pub fn dot(&self, other: &CsrMatrix) -> QdiffResult<CsrMatrix> {
        if self.cols != other.rows {
            return Err(QdiffError::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }
        let mut indptr = Vec::with_capacity(self.rows + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        let mut row_acc: BTreeMap<usize, Complex64> = BTreeMap::new();
        for r in 0..self.rows {
            row_acc.clear();
            for k in self.indptr[r]..self.indptr[r + 1] {
                let (mid, a) = (self.indices[k], self.data[k]);
                for kk in other.indptr[mid]..other.indptr[mid + 1] {
                    *row_acc
                        .entry(other.indices[kk])
                        .or_insert(Complex64::new(0.0, 0.0)) += a * other.data[kk];
                }
            }
            for (&c, &v) in &row_acc {
                indices.push(c);
                data.push(v);
            }
            indptr.push(indices.len());
        }

        Ok(CsrMatrix {
            rows: self.rows,
            cols: other.cols,
            indptr,
            indices,
            data,
        })
    }

    /// Dense matrix-vector product
    pub fn matvec(&self, vector: &[Complex64]) -> QdiffResult<Vec<Complex64>> {
        if self.cols != vector.len() {
            return Err(QdiffError::ShapeMismatch {
                left: self.shape(),
                right: (vector.len(), 1),
            });
        }
        Ok((0..self.rows)
            .map(|r| {
                (self.indptr[r]..self.indptr[r + 1])
                    .map(|k| self.data[k] * vector[self.indices[k]])
                    .sum()
            })
            .collect())
    }

    /// Elementwise sum
    pub fn add(&self, other: &CsrMatrix) -> QdiffResult<CsrMatrix> {
        if self.shape() != other.shape() {
            return Err(QdiffError::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }
        Self::from_triplets(self.rows, self.cols, self.iter().chain(other.iter()))
    }

    /// Multiply every entry by a scalar
    pub fn scale(&self, scalar: Complex64) -> CsrMatrix {
        let mut out = self.clone();
        out.data.iter_mut().for_each(|v| *v *= scalar);
        out
    }

    /// Conjugate transpose
    pub fn adjoint(&self) -> CsrMatrix {
        let triplets = self.iter().map(|(r, c, v)| (c, r, v.conj()));
        // Transposed indices stay inside the swapped shape.
        Self::from_triplets(self.cols, self.rows, triplets)
            .unwrap_or_else(|_| Self::zeros(self.cols, self.rows))
    }

    // ========================================================================
    // Wire Expansion
    // ========================================================================

    /// Embed a `k`-qubit matrix into an `n`-qubit basis
    ///
    /// `positions[t]` is the position (in the `n`-qubit wire order) of local
    /// qubit `t`. Identity acts on every other position.
    pub fn expand(&self, positions: &[usize], num_qubits: usize) -> QdiffResult<CsrMatrix> {
        let k = positions.len();
        if num_qubits > limits::MAX_QUBITS {
            return Err(QdiffError::TooManyQubits {
                qubits: num_qubits,
                max: limits::MAX_QUBITS,
            });
        }
        let local_dim = limits::dim(k);
        if self.shape() != (local_dim, local_dim) {
            return Err(QdiffError::ShapeMismatch {
                left: self.shape(),
                right: (local_dim, local_dim),
            });
        }
        let mut seen = vec![false; num_qubits];
        for &p in positions {
            if p >= num_qubits || seen[p] {
                return Err(QdiffError::InvalidWireCount {
                    op: "matrix expansion".to_string(),
                    expected: num_qubits,
                    got: p + 1,
                });
            }
            seen[p] = true;
        }

        // Local index → full-basis bits of the acted-on wires.
        let scatter: Vec<usize> = (0..local_dim)
            .map(|local| {
                positions.iter().enumerate().fold(0, |acc, (t, &p)| {
                    if local >> (k - 1 - t) & 1 == 1 {
                        acc | 1 << (num_qubits - 1 - p)
                    } else {
                        acc
                    }
                })
            })
            .collect();
        // Every assignment of the untouched wires.
        let rest_bits: Vec<usize> = (0..num_qubits)
            .filter(|p| !seen[*p])
            .map(|p| 1 << (num_qubits - 1 - p))
            .collect();
        let bases: Vec<usize> = (0..limits::dim(rest_bits.len()))
            .map(|rest| {
                rest_bits
                    .iter()
                    .enumerate()
                    .fold(0, |acc, (t, &bit)| {
                        if rest >> (rest_bits.len() - 1 - t) & 1 == 1 {
                            acc | bit
                        } else {
                            acc
                        }
                    })
            })
            .collect();

        let full_dim = limits::dim(num_qubits);
        let mut triplets = Vec::with_capacity(self.nnz() * bases.len());
        for &base in &bases {
            for (r, c, v) in self.iter() {
                triplets.push((base | scatter[r], base | scatter[c], v));
            }
        }
        Self::from_triplets(full_dim, full_dim, triplets)
    }
}

// ============================================================================
// Dense Helpers
// ============================================================================

/// Kronecker product of two dense matrices
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    let mut out = Array2::zeros((ar * br, ac * bc));
    for ((i, j), &x) in a.indexed_iter() {
        for ((k, l), &y) in b.indexed_iter() {
            out[[i * br + k, j * bc + l]] = x * y;
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
