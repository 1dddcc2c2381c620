//! Local numbering of element vertices and edges.
//!
//! A stencil fixes, for one element type, which local vertices each local
//! edge joins and which two other local edges span the basis of each edge.
//! Stiffness tensors are stored packed over the upper triangle of the
//! edge-pair matrix.
//!
//! ```text
//!          2
//!         / \
//!   e1   /   \   e0
//!       /     \
//!      0 ───── 1
//!         e2
//! ```
//!
//! Edge `e` is opposite vertex `e`, so the vertex pair of an edge doubles as
//! the index pair of its two basis edges.

/// Number of scalars reserved per element in stiffness storage.
///
/// This is the size of the packed upper triangle of a 6×6 symmetric matrix,
/// enough for the largest (tetrahedral) stencil.
pub const METRIC_STRIDE: usize = 21;

/// Fixed local numbering table of an element type.
pub trait Stencil {
    /// Number of vertices per element.
    const NUM_VERTS: usize;

    /// Number of edges per element.
    const NUM_EDGES: usize;

    /// Local vertex pair joined by local edge `e`.
    fn edge(e: usize) -> [usize; 2];

    /// The two other local edges forming the basis of local edge `e`.
    fn basis_pair(e: usize) -> [usize; 2];

    /// Number of packed entries used by one element's stiffness tensor.
    #[must_use]
    fn metric_len() -> usize {
        Self::NUM_EDGES * (Self::NUM_EDGES + 1) / 2
    }

    /// Position of edge pair `(i, j)` in the packed upper triangle.
    ///
    /// The pair is unordered.
    #[must_use]
    fn packed_index(i: usize, j: usize) -> usize {
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        i * Self::NUM_EDGES - i * i.saturating_sub(1) / 2 + (j - i)
    }
}

/// Stencil of a triangle (2D shell element).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stencil2D;

impl Stencil2D {
    /// Local vertex pairs, indexed by local edge.
    pub const EDGES: [[usize; 2]; 3] = [[1, 2], [2, 0], [0, 1]];
}

impl Stencil for Stencil2D {
    const NUM_VERTS: usize = 3;
    const NUM_EDGES: usize = 3;

    fn edge(e: usize) -> [usize; 2] {
        Self::EDGES[e]
    }

    fn basis_pair(e: usize) -> [usize; 2] {
        // edge e is opposite vertex e
        Self::EDGES[e]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_opposite_vertices() {
        for e in 0..Stencil2D::NUM_EDGES {
            let [a, b] = Stencil2D::edge(e);
            assert_ne!(a, e);
            assert_ne!(b, e);
            assert_ne!(a, b);
        }
    }

    #[test]
    fn test_basis_pair_excludes_self() {
        for e in 0..Stencil2D::NUM_EDGES {
            let pair = Stencil2D::basis_pair(e);
            assert!(!pair.contains(&e));
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_packed_index_layout() {
        let expected = [
            ((0, 0), 0),
            ((0, 1), 1),
            ((0, 2), 2),
            ((1, 1), 3),
            ((1, 2), 4),
            ((2, 2), 5),
        ];
        for ((i, j), k) in expected {
            assert_eq!(Stencil2D::packed_index(i, j), k);
            assert_eq!(Stencil2D::packed_index(j, i), k);
        }
        assert_eq!(Stencil2D::metric_len(), 6);
        assert!(Stencil2D::metric_len() <= METRIC_STRIDE);
    }
}
