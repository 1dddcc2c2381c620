//! Rest-shape geometry of a single element.
//!
//! The basis tensor of an edge is the symmetrized tensor product of the
//! in-plane edge normals of its two basis edges (Weischedel, "A discrete
//! geometric view on shear-deformable shell models", remark at the end of
//! section 4.1). This reproduces linear finite elements in a coordinate-free
//! form.

use nalgebra::{Matrix3, Point3, Vector3};

use crate::stencil::Stencil;

/// Area of the triangle spanned by the first three element vertices.
///
/// Returns zero for collinear vertices; callers do not special-case it.
#[must_use]
pub fn triangle_area(positions: &[Point3<f64>], v: &[usize]) -> f64 {
    let edge1 = positions[v[1]] - positions[v[0]];
    let edge2 = positions[v[2]] - positions[v[0]];
    edge1.cross(&edge2).norm() / 2.0
}

/// Unit vector along `v`, or the x axis when `v` is too short to normalize.
fn normalize_or_x(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(f64::MIN_POSITIVE).unwrap_or_else(Vector3::x)
}

/// Basis tensor of local edge `e` of an element with vertices `v`.
///
/// With `(L, R)` the basis pair of `e`:
///
/// ```text
/// eL = x[L.0] − x[L.1]      eR = x[R.1] − x[R.0]
/// n  = normalize(eR × eL)
/// bL = n × eL               bR = eR × n
/// B  = (bL ⊗ bR + bR ⊗ bL) / (8 A²)
/// ```
#[must_use]
pub fn edge_basis<S: Stencil>(
    positions: &[Point3<f64>],
    v: &[usize],
    e: usize,
    area: f64,
) -> Matrix3<f64> {
    let [left, right] = S::basis_pair(e);
    let face_l = S::edge(left);
    let face_r = S::edge(right);

    let edge_l = positions[v[face_l[0]]] - positions[v[face_l[1]]];
    let edge_r = positions[v[face_r[1]]] - positions[v[face_r[0]]];

    let normal = normalize_or_x(edge_r.cross(&edge_l));
    let basis_l = normal.cross(&edge_l);
    let basis_r = edge_r.cross(&normal);

    (basis_l * basis_r.transpose() + basis_r * basis_l.transpose()) / (8.0 * area * area)
}

/// Basis tensors of every local edge of one element.
#[must_use]
pub fn element_bases<S: Stencil>(
    positions: &[Point3<f64>],
    v: &[usize],
    area: f64,
) -> Vec<Matrix3<f64>> {
    (0..S::NUM_EDGES)
        .map(|e| edge_basis::<S>(positions, v, e, area))
        .collect()
}
