//! Triangle element sets.
//!
//! An [`ElementSet`] is the rest-pose description of one membrane: vertex
//! positions, triangles, the unique mesh edges, and for every triangle the
//! mesh edge behind each of its local edges (in [`Stencil2D`] order).
//!
//! ```text
//!   ●───●───●
//!   |\  |\  |
//!   | \ | \ |
//!   ●───●───●
//! ```
//!
//! Vertex count, element count and edge count are fixed once the set exists.

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MembraneError, Result};
use crate::geometry::triangle_area;
use crate::stencil::{Stencil, Stencil2D};
use crate::types::{PluginInstance, VertexBinding};

/// Rest-pose triangle mesh of one membrane.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElementSet {
    /// Rest vertex positions.
    rest_positions: Vec<Point3<f64>>,
    /// Vertex indices of each element.
    elements: Vec<[usize; 3]>,
    /// Mesh edge index behind each local edge of each element.
    element_edges: Vec<[usize; 3]>,
    /// Vertex pairs of the unique mesh edges.
    edges: Vec<[usize; 2]>,
    /// Attachment of each vertex to the host.
    bindings: Vec<VertexBinding>,
}

impl ElementSet {
    /// Create an element set from host-supplied connectivity.
    ///
    /// All vertices start attached to the world; see
    /// [`bind_to_plugin`](Self::bind_to_plugin).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `element_edges` and `elements` differ in length
    /// - a vertex or edge index is out of range
    /// - an element repeats a vertex
    /// - an element edge does not join the vertex pair its stencil position designates
    pub fn new(
        rest_positions: Vec<Point3<f64>>,
        elements: Vec<[usize; 3]>,
        element_edges: Vec<[usize; 3]>,
        edges: Vec<[usize; 2]>,
    ) -> Result<Self> {
        if element_edges.len() != elements.len() {
            return Err(MembraneError::size_mismatch(format!(
                "{} elements but {} element edge lists",
                elements.len(),
                element_edges.len()
            )));
        }

        let nvert = rest_positions.len();
        for (i, edge) in edges.iter().enumerate() {
            if edge.iter().any(|&v| v >= nvert) {
                return Err(MembraneError::index_out_of_bounds(format!(
                    "edge {i} references vertex outside 0..{nvert}"
                )));
            }
        }

        for (t, (v, ed)) in elements.iter().zip(&element_edges).enumerate() {
            if v.iter().any(|&i| i >= nvert) {
                return Err(MembraneError::index_out_of_bounds(format!(
                    "element {t} references vertex outside 0..{nvert}"
                )));
            }
            if v[0] == v[1] || v[1] == v[2] || v[2] == v[0] {
                return Err(MembraneError::invalid_topology(format!(
                    "element {t} repeats a vertex: {v:?}"
                )));
            }
            for (e, &edge) in ed.iter().enumerate() {
                let Some(&[a, b]) = edges.get(edge) else {
                    return Err(MembraneError::index_out_of_bounds(format!(
                        "element {t} references edge {edge} outside 0..{}",
                        edges.len()
                    )));
                };
                let [la, lb] = Stencil2D::edge(e);
                if canonical(a, b) != canonical(v[la], v[lb]) {
                    return Err(MembraneError::invalid_topology(format!(
                        "element {t} local edge {e} maps to edge {edge} ({a}, {b}), \
                         expected vertices ({}, {})",
                        v[la], v[lb]
                    )));
                }
            }
        }

        Ok(Self {
            bindings: vec![VertexBinding::World; nvert],
            rest_positions,
            elements,
            element_edges,
            edges,
        })
    }

    /// Create an element set from triangles, deriving the unique edges.
    ///
    /// Edges are numbered in order of first appearance while walking the
    /// triangles' local edges in stencil order.
    ///
    /// # Errors
    ///
    /// Returns an error if a triangle references a vertex out of range or
    /// repeats a vertex.
    pub fn from_triangles(rest_positions: Vec<Point3<f64>>, elements: Vec<[usize; 3]>) -> Result<Self> {
        let nvert = rest_positions.len();
        let mut edge_ids: HashMap<(usize, usize), usize> = HashMap::new();
        let mut edges = Vec::new();
        let mut element_edges = Vec::with_capacity(elements.len());

        for (t, v) in elements.iter().enumerate() {
            if v.iter().any(|&i| i >= nvert) {
                return Err(MembraneError::index_out_of_bounds(format!(
                    "element {t} references vertex outside 0..{nvert}"
                )));
            }
            let mut local = [0; 3];
            for (e, slot) in local.iter_mut().enumerate() {
                let [la, lb] = Stencil2D::edge(e);
                let key = canonical(v[la], v[lb]);
                *slot = *edge_ids.entry(key).or_insert_with(|| {
                    edges.push([key.0, key.1]);
                    edges.len() - 1
                });
            }
            element_edges.push(local);
        }

        Self::new(rest_positions, elements, element_edges, edges)
    }

    /// Create a rectangular grid of triangles.
    ///
    /// # Arguments
    ///
    /// * `origin` - Position of the (0,0) corner
    /// * `u_axis` - Direction and size of the U axis
    /// * `v_axis` - Direction and size of the V axis
    /// * `u_segments` - Number of segments along U
    /// * `v_segments` - Number of segments along V
    ///
    /// # Errors
    ///
    /// Never fails for valid segment counts; the error is forwarded from
    /// [`from_triangles`](Self::from_triangles).
    #[allow(clippy::cast_precision_loss)]
    pub fn grid(
        origin: Point3<f64>,
        u_axis: Vector3<f64>,
        v_axis: Vector3<f64>,
        u_segments: usize,
        v_segments: usize,
    ) -> Result<Self> {
        let u_segments = u_segments.max(1);
        let v_segments = v_segments.max(1);
        let u_verts = u_segments + 1;
        let v_verts = v_segments + 1;

        let mut positions = Vec::with_capacity(u_verts * v_verts);
        for j in 0..v_verts {
            for i in 0..u_verts {
                let u = i as f64 / u_segments as f64;
                let v = j as f64 / v_segments as f64;
                positions.push(origin + u_axis * u + v_axis * v);
            }
        }

        let mut triangles = Vec::with_capacity(2 * u_segments * v_segments);
        for j in 0..v_segments {
            for i in 0..u_segments {
                let idx00 = j * u_verts + i;
                let idx10 = j * u_verts + i + 1;
                let idx01 = (j + 1) * u_verts + i;
                let idx11 = (j + 1) * u_verts + i + 1;

                triangles.push([idx00, idx10, idx11]);
                triangles.push([idx00, idx11, idx01]);
            }
        }

        Self::from_triangles(positions, triangles)
    }

    /// Attach every vertex to its own body owned by `instance`.
    ///
    /// Vertex `i` gets body `i + 1` and DOFs `3i..3i + 3`.
    #[must_use]
    pub fn bind_to_plugin(mut self, instance: PluginInstance) -> Self {
        for (i, binding) in self.bindings.iter_mut().enumerate() {
            *binding = VertexBinding::Body {
                body: i + 1,
                plugin: Some(instance),
                dofadr: 3 * i,
            };
        }
        self
    }

    /// Replace all vertex bindings.
    ///
    /// # Errors
    ///
    /// Returns an error if `bindings` does not have one entry per vertex, or if
    /// a DOF range `dofadr..dofadr + 3` is not addressable.
    pub fn with_bindings(mut self, bindings: Vec<VertexBinding>) -> Result<Self> {
        if bindings.len() != self.rest_positions.len() {
            return Err(MembraneError::size_mismatch(format!(
                "{} bindings for {} vertices",
                bindings.len(),
                self.rest_positions.len()
            )));
        }
        let unaddressable = bindings
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.dofadr().map(|dofadr| (i, dofadr)))
            .find(|(_, dofadr)| dofadr.checked_add(3).is_none());
        if let Some((i, dofadr)) = unaddressable {
            return Err(MembraneError::index_out_of_bounds(format!(
                "vertex {i} has dofadr {dofadr} with no room for 3 DOFs"
            )));
        }
        self.bindings = bindings;
        Ok(self)
    }

    /// Fix a vertex to the world.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex index is out of range.
    pub fn pin_vertex(&mut self, index: usize) -> Result<()> {
        let nvert = self.bindings.len();
        let binding = self.bindings.get_mut(index).ok_or_else(|| {
            MembraneError::index_out_of_bounds(format!("vertex {index} outside 0..{nvert}"))
        })?;
        *binding = VertexBinding::World;
        Ok(())
    }

    /// Number of vertices.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.rest_positions.len()
    }

    /// Number of elements.
    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Number of unique edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Rest vertex positions.
    #[must_use]
    pub fn rest_positions(&self) -> &[Point3<f64>] {
        &self.rest_positions
    }

    /// Vertex indices of each element.
    #[must_use]
    pub fn elements(&self) -> &[[usize; 3]] {
        &self.elements
    }

    /// Mesh edge index behind each local edge of each element.
    #[must_use]
    pub fn element_edges(&self) -> &[[usize; 3]] {
        &self.element_edges
    }

    /// Vertex pairs of the unique edges.
    #[must_use]
    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    /// Vertex bindings.
    #[must_use]
    pub fn bindings(&self) -> &[VertexBinding] {
        &self.bindings
    }

    /// Rest area of element `t`.
    #[must_use]
    pub fn rest_area(&self, t: usize) -> f64 {
        triangle_area(&self.rest_positions, &self.elements[t])
    }

    /// Edge lengths for the given vertex positions.
    #[must_use]
    pub fn edge_lengths(&self, positions: &[Point3<f64>]) -> Vec<f64> {
        self.edges
            .iter()
            .map(|&[a, b]| (positions[b] - positions[a]).norm())
            .collect()
    }

    /// Edge lengths in the rest pose.
    #[must_use]
    pub fn rest_lengths(&self) -> Vec<f64> {
        self.edge_lengths(&self.rest_positions)
    }
}

/// Vertex pair in sorted order.
const fn canonical(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}
