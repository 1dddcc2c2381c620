//! Gradient of the elastic energy and scatter into generalized forces.
//!
//! The energy of an element is `½ Σᵢⱼ εᵢ Kᵢⱼ εⱼ` over its local edges. With
//! `εᵢ` a function of the squared length of edge `i = (a, b)`,
//! `∂εᵢ/∂x_a = 2 (x_a − x_b)`, so the force on the edge endpoints is
//!
//! ```text
//! F_a = −2 sᵢ (x_a − x_b)      F_b = +2 sᵢ (x_a − x_b)      sᵢ = Σⱼ Kᵢⱼ εⱼ
//! ```
//!
//! evaluated at the live vertex positions.

use nalgebra::Point3;

use crate::metric::StiffnessArena;
use crate::stencil::Stencil;
use crate::types::VertexBinding;

/// Accumulate per-vertex forces of all elements into `force`.
///
/// `force` holds three scalars per vertex and is zeroed first.
pub fn compute_force<S: Stencil>(
    force: &mut [f64],
    elongation: &[f64],
    stiffness: &StiffnessArena,
    elements: &[[usize; 3]],
    element_edges: &[[usize; 3]],
    xpos: &[Point3<f64>],
) {
    force.fill(0.0);

    for ((tensor, v), edges) in stiffness.iter().zip(elements).zip(element_edges) {
        for ed1 in 0..S::NUM_EDGES {
            let mut stress = 0.0;
            for ed2 in 0..S::NUM_EDGES {
                stress += tensor.get::<S>(ed1, ed2) * elongation[edges[ed2]];
            }

            let [a, b] = S::edge(ed1);
            let (va, vb) = (v[a], v[b]);
            let diff = xpos[va] - xpos[vb];
            for x in 0..3 {
                let f = 2.0 * stress * diff[x];
                force[3 * va + x] -= f;
                force[3 * vb + x] += f;
            }
        }
    }
}

/// Add per-vertex forces into the generalized force vector.
///
/// World-bound vertices have no DOFs and are skipped.
///
/// # Panics
///
/// Panics if a vertex's DOF range `dofadr..dofadr + 3` does not fit in
/// `qfrc`. Sizing the vector is the host's job.
pub fn add_flex_force(qfrc: &mut [f64], force: &[f64], bindings: &[VertexBinding]) {
    for (i, binding) in bindings.iter().enumerate() {
        let Some(dofadr) = binding.dofadr() else {
            continue; // Pinned vertex: no DOFs
        };
        debug_assert!(
            dofadr.checked_add(3).is_some_and(|end| end <= qfrc.len()),
            "vertex {i}: dofadr {dofadr} outside qfrc of length {}",
            qfrc.len()
        );
        let dst = &mut qfrc[dofadr..dofadr.saturating_add(3)];
        for (q, f) in dst.iter_mut().zip(&force[3 * i..3 * i + 3]) {
            *q += f;
        }
    }
}
