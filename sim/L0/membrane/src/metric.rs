//! Per-element stiffness (metric) tensors.
//!
//! For the basis tensors `B_e` of an element's edges, the stiffness tensor is
//! the bilinear form over edge pairs
//!
//! ```text
//! K_ij = μ · tr(B_i B_j) + λ · tr(B_i) tr(B_j)
//! ```
//!
//! stored packed over the upper triangle in a fixed-size record of
//! [`METRIC_STRIDE`] scalars.

use nalgebra::Matrix3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::stencil::{METRIC_STRIDE, Stencil};

/// Packed symmetric stiffness tensor of one element.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StiffnessTensor {
    entries: [f64; METRIC_STRIDE],
}

impl Default for StiffnessTensor {
    fn default() -> Self {
        Self {
            entries: [0.0; METRIC_STRIDE],
        }
    }
}

impl StiffnessTensor {
    /// Assemble the tensor from the element's Lamé coefficients and edge bases.
    #[must_use]
    pub fn assemble<S: Stencil>(mu: f64, lambda: f64, bases: &[Matrix3<f64>]) -> Self {
        debug_assert_eq!(bases.len(), S::NUM_EDGES);

        // first invariant, trace(strain)
        let tr_e: Vec<f64> = bases.iter().map(Matrix3::trace).collect();

        let mut tensor = Self::default();
        let mut k = 0;
        for ed1 in 0..S::NUM_EDGES {
            for ed2 in ed1..S::NUM_EDGES {
                // second invariant, trace(strain^2)
                let tr_ee = (bases[ed1] * bases[ed2]).trace();
                tensor.entries[k] = mu * tr_ee + lambda * tr_e[ed2] * tr_e[ed1];
                k += 1;
            }
        }
        tensor
    }

    /// Entry for the unordered edge pair `(i, j)`.
    #[must_use]
    pub fn get<S: Stencil>(&self, i: usize, j: usize) -> f64 {
        self.entries[S::packed_index(i, j)]
    }

    /// Raw packed entries.
    #[must_use]
    pub const fn entries(&self) -> &[f64; METRIC_STRIDE] {
        &self.entries
    }

    /// `Σ_j K_ij ε_j` for each local edge `i`.
    #[must_use]
    pub fn contract<S: Stencil>(&self, elongation: &[f64]) -> Vec<f64> {
        (0..S::NUM_EDGES)
            .map(|i| {
                (0..S::NUM_EDGES)
                    .map(|j| self.get::<S>(i, j) * elongation[j])
                    .sum()
            })
            .collect()
    }

    /// Quadratic form `½ εᵀ K ε` over the element's edges.
    #[must_use]
    pub fn energy<S: Stencil>(&self, elongation: &[f64]) -> f64 {
        let stress = self.contract::<S>(elongation);
        0.5 * stress
            .iter()
            .zip(elongation)
            .map(|(s, e)| s * e)
            .sum::<f64>()
    }

    /// Whether every entry is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.entries.iter().all(|v| v.is_finite())
    }
}

/// Stiffness storage of an element set, addressed by element index.
///
/// Filled once when the element set is built; there is no way to mutate it
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StiffnessArena {
    tensors: Vec<StiffnessTensor>,
}

impl StiffnessArena {
    /// Number of elements stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// Check if the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Tensor of element `t`.
    #[must_use]
    pub fn get(&self, t: usize) -> Option<&StiffnessTensor> {
        self.tensors.get(t)
    }

    /// Iterate over tensors in element order.
    pub fn iter(&self) -> std::slice::Iter<'_, StiffnessTensor> {
        self.tensors.iter()
    }

    /// Flat view of the storage, [`METRIC_STRIDE`] scalars per element.
    #[must_use]
    pub fn as_flat(&self) -> Vec<f64> {
        self.tensors.iter().flat_map(|t| t.entries).collect()
    }
}

impl FromIterator<StiffnessTensor> for StiffnessArena {
    fn from_iter<I: IntoIterator<Item = StiffnessTensor>>(iter: I) -> Self {
        Self {
            tensors: iter.into_iter().collect(),
        }
    }
}

impl std::ops::Index<usize> for StiffnessArena {
    type Output = StiffnessTensor;

    fn index(&self, t: usize) -> &StiffnessTensor {
        &self.tensors[t]
    }
}
