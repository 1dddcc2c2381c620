//! Discrete-shell membrane elasticity for triangle flex meshes.
//!
//! This crate computes internal elastic and damping forces of a thin shell
//! discretized as a triangle mesh. Each triangle is an elastic element whose
//! response depends only on the lengths of its edges.
//!
//! # Physics Model
//!
//! ## Stiffness
//!
//! At construction, every element gets a symmetric stiffness tensor over its
//! edge pairs, built from the rest geometry and the material:
//!
//! ```text
//! K_ij = μ · tr(B_i B_j) + λ · tr(B_i) tr(B_j)
//! ```
//!
//! where `B_e` is the basis tensor of edge `e` (symmetrized product of the
//! in-plane normals of the two other edges, scaled by `1 / (8 A²)`) and `μ`,
//! `λ` are the Lamé parameters integrated over the element.
//!
//! ## Forces
//!
//! Every step, the elongation of each edge is
//!
//! ```text
//! ε = d² − r² + (d² − p²) · damping / dt
//! ```
//!
//! and the force on each vertex is the negative gradient of `½ εᵀ K ε` at the
//! live positions. Forces are added into the host's generalized force vector.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──build──▶ Built ──evaluate──▶ Evaluating ─┐
//!                                                  ▲        │
//!                                                  └────────┘
//! ```
//!
//! Stiffness tensors are written once during build and only read afterwards.
//!
//! # Quick Start
//!
//! ```
//! use sim_membrane::{ElementSet, Membrane, PassivePlugin, PluginConfig, PluginInstance, StepState};
//! use nalgebra::{Point3, Vector3};
//!
//! let instance = PluginInstance::new(0);
//! let mesh = ElementSet::grid(Point3::origin(), Vector3::x(), Vector3::y(), 4, 4)
//!     .unwrap()
//!     .bind_to_plugin(instance);
//!
//! let config = PluginConfig::new(instance)
//!     .with_attribute("face", "all")
//!     .with_attribute("young", "1e4")
//!     .with_attribute("poisson", "0.3")
//!     .with_attribute("thickness", "0.001")
//!     .with_attribute("damping", "0.001");
//!
//! let mut membrane = Membrane::create(&config, mesh.clone()).unwrap();
//!
//! let rest = mesh.rest_lengths();
//! let positions = mesh.rest_positions().to_vec();
//! let mut qfrc = vec![0.0; 3 * mesh.num_vertices()];
//!
//! membrane.evaluate(
//!     &StepState {
//!         deformed_lengths: &rest,
//!         reference_lengths: &rest,
//!         positions: &positions,
//!         timestep: 0.002,
//!     },
//!     &mut qfrc,
//! );
//! assert!(qfrc.iter().all(|f| f.abs() < 1e-12));
//! ```
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**.

#![doc(html_root_url = "https://docs.rs/sim-membrane/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]
// Index math on small meshes
#![allow(clippy::cast_precision_loss)]
// Allow many-letter math names (mu, la, kd)
#![allow(clippy::many_single_char_names, clippy::similar_names)]
// Test-related lints - these are style preferences
#![cfg_attr(test, allow(clippy::uninlined_format_args, clippy::float_cmp))]

pub mod config;
pub mod element_set;
pub mod error;
pub mod force;
pub mod geometry;
pub mod material;
pub mod membrane;
pub mod metric;
pub mod plugin;
pub mod stencil;
pub mod types;

// Re-export main types at crate root
pub use config::{ATTRIBUTES, MembraneConfig, PluginConfig};
pub use element_set::ElementSet;
pub use error::{MembraneError, Result};
pub use material::{MembraneMaterial, MembranePreset};
pub use membrane::{Membrane, PreviousLengths, StepState};
pub use metric::{StiffnessArena, StiffnessTensor};
pub use plugin::PluginTable;
pub use stencil::{METRIC_STRIDE, Stencil, Stencil2D};
pub use types::{PluginInstance, VertexBinding};

/// A passive-force plugin driven by the host's lifecycle.
///
/// The host builds an instance once per element set, evaluates it once per
/// step, and drops it on teardown. Evaluation only ever adds into the
/// generalized force vector.
pub trait PassivePlugin: Sized {
    /// Registered plugin name.
    const NAME: &'static str;

    /// Attribute names the plugin accepts.
    const ATTRIBUTES: &'static [&'static str];

    /// Build an instance from raw attributes and rest geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or the geometry is invalid; no
    /// instance is created in that case.
    fn build(config: &PluginConfig, geometry: ElementSet) -> Result<Self>;

    /// Id of the instance.
    fn instance(&self) -> PluginInstance;

    /// Evaluate one step and add the resulting forces into `qfrc_passive`.
    ///
    /// # Panics
    ///
    /// Panics if `qfrc_passive` is too short for the DOF addresses of the
    /// element set.
    fn evaluate(&mut self, step: &StepState<'_>, qfrc_passive: &mut [f64]);
}
