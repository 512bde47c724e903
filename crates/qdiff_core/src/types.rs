//! Core types for QDiff
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Wire labels, ordered wire collections and the numeric aliases used
//! throughout the workspace.

use crate::error::{QdiffError, QdiffResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Rotation angle in radians
/// Gantree: Angle // pub type Angle = f64
pub type Angle = f64;

/// Numeric parameters of an operator
/// Gantree: ParamVec // pub type ParamVec = Vec<f64>
pub type ParamVec = Vec<f64>;

// ============================================================================
// Wire
// ============================================================================

/// Label identifying one qubit subsystem
/// Gantree: Wire // integer or string label
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Wire {
    /// Integer wire label
    Index(usize),
    /// String wire label
    Label(String),
}

impl Wire {
    /// Integer value of the label, if it is one
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Wire::Index(i) => Some(*i),
            Wire::Label(_) => None,
        }
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wire::Index(i) => write!(f, "{}", i),
            Wire::Label(s) => write!(f, "{}", s),
        }
    }
}

impl From<usize> for Wire {
    fn from(index: usize) -> Self {
        Wire::Index(index)
    }
}

impl From<&str> for Wire {
    fn from(label: &str) -> Self {
        Wire::Label(label.to_string())
    }
}

impl From<String> for Wire {
    fn from(label: String) -> Self {
        Wire::Label(label)
    }
}

// ============================================================================
// Wires
// ============================================================================

/// Ordered collection of distinct wires
/// Gantree: Wires // ordered, unique
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Wire>", into = "Vec<Wire>")]
pub struct Wires {
    wires: Vec<Wire>,
}

impl Wires {
    /// Create from labels, rejecting repeats
    /// Gantree: new(iter) -> Result<Self> // uniqueness check
    pub fn new<I, W>(wires: I) -> QdiffResult<Self>
    where
        I: IntoIterator<Item = W>,
        W: Into<Wire>,
    {
        let mut out: Vec<Wire> = Vec::new();
        for wire in wires {
            let wire = wire.into();
            if out.contains(&wire) {
                return Err(QdiffError::DuplicateWire(wire.to_string()));
            }
            out.push(wire);
        }
        Ok(Self { wires: out })
    }

    /// Consecutive integer wires `0..n`
    pub fn range(n: usize) -> Self {
        Self {
            wires: (0..n).map(Wire::Index).collect(),
        }
    }

    /// Empty wire collection
    pub fn empty() -> Self {
        Self::default()
    }

    /// Single wire
    pub fn single(wire: impl Into<Wire>) -> Self {
        Self {
            wires: vec![wire.into()],
        }
    }

    /// Number of wires
    pub fn len(&self) -> usize {
        self.wires.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    /// Position of a wire in this ordering
    pub fn index_of(&self, wire: &Wire) -> Option<usize> {
        self.wires.iter().position(|w| w == wire)
    }

    /// Check membership
    pub fn contains(&self, wire: &Wire) -> bool {
        self.wires.contains(wire)
    }

    /// Positions of `subset` inside `self`
    /// Gantree: positions(&subset) -> Result<Vec<usize>> // wire → axis
    pub fn positions(&self, subset: &Wires) -> QdiffResult<Vec<usize>> {
        subset
            .iter()
            .map(|w| {
                self.index_of(w)
                    .ok_or_else(|| QdiffError::WireNotFound(w.to_string()))
            })
            .collect()
    }

    /// Union keeping first-appearance order
    pub fn union(&self, other: &Wires) -> Wires {
        let mut wires = self.wires.clone();
        for w in &other.wires {
            if !wires.contains(w) {
                wires.push(w.clone());
            }
        }
        Wires { wires }
    }

    /// Union of many collections, keeping first-appearance order
    pub fn all_wires<'a, I>(collections: I) -> Wires
    where
        I: IntoIterator<Item = &'a Wires>,
    {
        collections
            .into_iter()
            .fold(Wires::empty(), |acc, w| acc.union(w))
    }

    /// Check if two collections share no wire
    pub fn is_disjoint(&self, other: &Wires) -> bool {
        self.wires.iter().all(|w| !other.contains(w))
    }

    /// Sorted copy
    pub fn sorted(&self) -> Wires {
        let mut wires = self.wires.clone();
        wires.sort();
        Wires { wires }
    }

    /// Iterate over wires
    pub fn iter(&self) -> std::slice::Iter<'_, Wire> {
        self.wires.iter()
    }

    /// Borrow as slice
    pub fn as_slice(&self) -> &[Wire] {
        &self.wires
    }
}

impl fmt::Display for Wires {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.wires.iter().map(|w| w.to_string()).collect();
        write!(f, "[{}]", labels.join(", "))
    }
}

impl TryFrom<Vec<Wire>> for Wires {
    type Error = QdiffError;

    fn try_from(value: Vec<Wire>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Wires> for Vec<Wire> {
    fn from(value: Wires) -> Self {
        value.wires
    }
}

impl<'a> IntoIterator for &'a Wires {
    type Item = &'a Wire;
    type IntoIter = std::slice::Iter<'a, Wire>;

    fn into_iter(self) -> Self::IntoIter {
        self.wires.iter()
    }
}

impl std::ops::Index<usize> for Wires {
    type Output = Wire;

    fn index(&self, index: usize) -> &Self::Output {
        &self.wires[index]
    }
}

// ============================================================================
// Tests
// ============================================================================
