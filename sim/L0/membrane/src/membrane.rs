//! Membrane elasticity instance.
//!
//! A [`Membrane`] is built once from a configuration and a rest-pose
//! [`ElementSet`], then evaluated once per simulation step:
//!
//! ```text
//! build:     rest geometry + material → stiffness tensor per element
//! evaluate:  edge lengths → elongation per edge → force per vertex → qfrc
//! ```
//!
//! # Damping
//!
//! Generalized Rayleigh damping (Kharevych et al., "Geometric, Variational
//! Integrators for Computer Animation", section 5.2) is folded into the
//! elongation through the rate of change of the squared edge length:
//!
//! ```text
//! ε = d² − r² + (d² − p²) · damping / dt
//! ```
//!
//! where `d` is the deformed length, `r` the reference length and `p` the
//! deformed length of the previous step.

use nalgebra::Point3;
use tracing::{debug, info, trace, warn};

use crate::PassivePlugin;
use crate::config::{ATTRIBUTES, MembraneConfig, PluginConfig};
use crate::element_set::ElementSet;
use crate::error::{MembraneError, Result};
use crate::force::{add_flex_force, compute_force};
use crate::geometry::{element_bases, triangle_area};
use crate::material::MembraneMaterial;
use crate::metric::{StiffnessArena, StiffnessTensor};
use crate::stencil::Stencil2D;
use crate::types::{PluginInstance, VertexBinding};

/// Per-step input of the evaluator.
#[derive(Debug, Clone, Copy)]
pub struct StepState<'a> {
    /// Deformed edge lengths of this step.
    pub deformed_lengths: &'a [f64],
    /// Reference (rest) edge lengths.
    pub reference_lengths: &'a [f64],
    /// Live vertex positions.
    pub positions: &'a [Point3<f64>],
    /// Simulation timestep (seconds).
    pub timestep: f64,
}

/// Edge lengths of the previous step, used by damping.
///
/// The host fills in reference lengths only after plugins are constructed,
/// so the snapshot is taken on the first evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PreviousLengths {
    /// No evaluation has happened yet.
    #[default]
    Uninitialized,
    /// One length per edge.
    Initialized(Vec<f64>),
}

impl PreviousLengths {
    /// The snapshot, if taken.
    #[must_use]
    pub fn as_slice(&self) -> Option<&[f64]> {
        match self {
            Self::Uninitialized => None,
            Self::Initialized(lengths) => Some(lengths),
        }
    }

    /// Overwrite the snapshot with `lengths`, reusing its buffer once taken.
    pub fn record(&mut self, lengths: &[f64]) {
        match self {
            Self::Uninitialized => *self = Self::Initialized(lengths.to_vec()),
            Self::Initialized(previous) => previous.copy_from_slice(lengths),
        }
    }
}

/// Discrete-shell membrane attached to one element set.
#[derive(Debug, Clone)]
pub struct Membrane {
    instance: PluginInstance,
    material: MembraneMaterial,
    mesh: ElementSet,
    stiffness: StiffnessArena,
    elongation: Vec<f64>,
    force: Vec<f64>,
    previous: PreviousLengths,
}

impl Membrane {
    /// Parse the plugin attributes and build the instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the attributes are missing or invalid, or if the
    /// mesh references a body owned by another instance.
    pub fn create(config: &PluginConfig, mesh: ElementSet) -> Result<Self> {
        let parsed = MembraneConfig::from_plugin_config(config).inspect_err(|err| {
            warn!(instance = %config.instance(), %err, "Invalid membrane plugin attributes");
        })?;
        Self::build(&parsed, mesh)
    }

    /// Build stiffness tensors for every element of `mesh`.
    ///
    /// # Errors
    ///
    /// Returns [`MembraneError::TopologyMismatch`] if an element vertex is
    /// attached to a body that is not owned by `config.instance`.
    pub fn build(config: &MembraneConfig, mesh: ElementSet) -> Result<Self> {
        let instance = config.instance;
        let material = config.material;

        check_ownership(&mesh, instance)?;

        let positions = mesh.rest_positions();
        let mut mu_range = (f64::INFINITY, f64::NEG_INFINITY);
        let stiffness: StiffnessArena = mesh
            .elements()
            .iter()
            .map(|v| {
                let area = triangle_area(positions, v);
                let mu = material.element_mu(area);
                let lambda = material.element_lambda(area);
                mu_range = (mu_range.0.min(mu), mu_range.1.max(mu));

                let bases = element_bases::<Stencil2D>(positions, v, area);
                StiffnessTensor::assemble::<Stencil2D>(mu, lambda, &bases)
            })
            .collect();

        info!(
            %instance,
            elements = mesh.num_elements(),
            edges = mesh.num_edges(),
            vertices = mesh.num_vertices(),
            mu_min = mu_range.0,
            mu_max = mu_range.1,
            "Built membrane stiffness"
        );

        Ok(Self {
            instance,
            material,
            elongation: vec![0.0; mesh.num_edges()],
            force: vec![0.0; 3 * mesh.num_vertices()],
            stiffness,
            mesh,
            previous: PreviousLengths::Uninitialized,
        })
    }

    /// Compute this step's elongations and per-vertex forces.
    ///
    /// Nothing is written to the host; see [`evaluate`](PassivePlugin::evaluate)
    /// for the scatter into generalized forces.
    pub fn compute_forces(&mut self, step: &StepState<'_>) -> &[f64] {
        let ne = self.mesh.num_edges();
        debug_assert_eq!(step.deformed_lengths.len(), ne);
        debug_assert_eq!(step.reference_lengths.len(), ne);
        debug_assert_eq!(step.positions.len(), self.mesh.num_vertices());

        let kd = self.material.damping / step.timestep;

        if let PreviousLengths::Uninitialized = self.previous {
            debug!(instance = %self.instance, edges = ne, "Initializing previous edge lengths");
            self.previous = PreviousLengths::Initialized(step.reference_lengths.to_vec());
        }
        let prev = self.previous.as_slice().unwrap_or(step.reference_lengths);

        for (idx, elongation) in self.elongation.iter_mut().enumerate() {
            let deformed = step.deformed_lengths[idx];
            let reference = step.reference_lengths[idx];
            let previous = prev[idx];
            *elongation = deformed * deformed - reference * reference
                + (deformed * deformed - previous * previous) * kd;
        }

        compute_force::<Stencil2D>(
            &mut self.force,
            &self.elongation,
            &self.stiffness,
            self.mesh.elements(),
            self.mesh.element_edges(),
            step.positions,
        );

        if self.material.is_damped() {
            self.previous.record(step.deformed_lengths);
        }

        trace!(instance = %self.instance, kd, "Evaluated membrane forces");
        &self.force
    }

    /// Elastic energy `½ εᵀ K ε` at the elongations of the last evaluation.
    #[must_use]
    pub fn elastic_energy(&self) -> f64 {
        self.stiffness
            .iter()
            .zip(self.mesh.element_edges())
            .map(|(tensor, edges)| {
                let local = edges.map(|e| self.elongation[e]);
                tensor.energy::<Stencil2D>(&local)
            })
            .sum()
    }

    /// Instance id.
    #[must_use]
    pub const fn instance(&self) -> PluginInstance {
        self.instance
    }

    /// Material parameters.
    #[must_use]
    pub const fn material(&self) -> &MembraneMaterial {
        &self.material
    }

    /// The element set this membrane was built on.
    #[must_use]
    pub const fn mesh(&self) -> &ElementSet {
        &self.mesh
    }

    /// Stiffness tensors, one per element.
    #[must_use]
    pub const fn stiffness(&self) -> &StiffnessArena {
        &self.stiffness
    }

    /// Elongation per edge from the last evaluation.
    #[must_use]
    pub fn elongation(&self) -> &[f64] {
        &self.elongation
    }

    /// Force per vertex from the last evaluation, three scalars per vertex.
    #[must_use]
    pub fn forces(&self) -> &[f64] {
        &self.force
    }

    /// Previous edge lengths, `None` until the first evaluation.
    #[must_use]
    pub fn previous_lengths(&self) -> Option<&[f64]> {
        self.previous.as_slice()
    }
}

impl PassivePlugin for Membrane {
    const NAME: &'static str = "mujoco.elasticity.membrane";
    const ATTRIBUTES: &'static [&'static str] = &ATTRIBUTES;

    fn build(config: &PluginConfig, geometry: ElementSet) -> Result<Self> {
        Self::create(config, geometry)
    }

    fn instance(&self) -> PluginInstance {
        self.instance
    }

    fn evaluate(&mut self, step: &StepState<'_>, qfrc_passive: &mut [f64]) {
        self.compute_forces(step);
        add_flex_force(qfrc_passive, &self.force, self.mesh.bindings());
    }
}

/// Every vertex used by an element must be world-bound or owned by `instance`.
fn check_ownership(mesh: &ElementSet, instance: PluginInstance) -> Result<()> {
    for v in mesh.elements() {
        for &vertex in v {
            let binding = mesh.bindings()[vertex];
            if binding.is_owned_by(instance) {
                continue;
            }
            let body = match binding {
                VertexBinding::Body { body, .. } => body,
                VertexBinding::World => 0,
            };
            warn!(%instance, vertex, body, "Body does not have plugin instance");
            return Err(MembraneError::TopologyMismatch {
                vertex,
                body,
                instance,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn triangle(instance: PluginInstance) -> ElementSet {
        ElementSet::from_triangles(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.5, 3.0_f64.sqrt() / 2.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap()
        .bind_to_plugin(instance)
    }

    fn config(damping: f64) -> MembraneConfig {
        MembraneConfig::new(
            PluginInstance::new(0),
            MembraneMaterial::new(1000.0, 0.3, 0.01).with_damping(damping),
        )
    }

    #[test]
    fn test_build_sizes() {
        let membrane = Membrane::build(&config(0.0), triangle(PluginInstance::new(0))).unwrap();
        assert_eq!(membrane.stiffness().len(), 1);
        assert_eq!(membrane.elongation().len(), 3);
        assert_eq!(membrane.forces().len(), 9);
        assert!(membrane.previous_lengths().is_none());
        assert!(membrane.stiffness()[0].is_finite());
    }

    #[test]
    fn test_topology_mismatch() {
        let mesh = triangle(PluginInstance::new(1));
        let err = Membrane::build(&config(0.0), mesh).unwrap_err();
        assert_eq!(
            err,
            MembraneError::TopologyMismatch {
                vertex: 0,
                body: 1,
                instance: PluginInstance::new(0),
            }
        );
    }

    #[test]
    fn test_world_vertices_are_accepted() {
        let mut mesh = triangle(PluginInstance::new(0));
        mesh.pin_vertex(0).unwrap();
        assert!(Membrane::build(&config(0.0), mesh).is_ok());
    }

    #[test]
    fn test_lazy_previous_lengths() {
        let mesh = triangle(PluginInstance::new(0));
        let rest = mesh.rest_lengths();
        let positions = mesh.rest_positions().to_vec();
        let mut membrane = Membrane::build(&config(0.0), mesh).unwrap();

        let deformed: Vec<f64> = rest.iter().map(|l| l * 1.1).collect();
        membrane.compute_forces(&StepState {
            deformed_lengths: &deformed,
            reference_lengths: &rest,
            positions: &positions,
            timestep: 0.01,
        });

        // Without damping the snapshot stays at the reference lengths.
        assert_eq!(membrane.previous_lengths(), Some(rest.as_slice()));
    }

    #[test]
    fn test_damped_snapshot_tracks_deformed_lengths() {
        let mesh = triangle(PluginInstance::new(0));
        let rest = mesh.rest_lengths();
        let positions = mesh.rest_positions().to_vec();
        let mut membrane = Membrane::build(&config(0.05), mesh).unwrap();

        let deformed: Vec<f64> = rest.iter().map(|l| l * 1.1).collect();
        let step = StepState {
            deformed_lengths: &deformed,
            reference_lengths: &rest,
            positions: &positions,
            timestep: 0.01,
        };
        membrane.compute_forces(&step);

        // First step: previous == reference, so the rate term doubles up with kd = 5.
        for (idx, eps) in membrane.elongation().iter().enumerate() {
            let d2 = deformed[idx] * deformed[idx];
            let r2 = rest[idx] * rest[idx];
            assert_relative_eq!(*eps, (d2 - r2) * 6.0, epsilon = 1e-12);
        }
        assert_eq!(membrane.previous_lengths(), Some(deformed.as_slice()));

        // Second step at the same lengths: rate term vanishes.
        membrane.compute_forces(&step);
        for (idx, eps) in membrane.elongation().iter().enumerate() {
            let d2 = deformed[idx] * deformed[idx];
            let r2 = rest[idx] * rest[idx];
            assert_relative_eq!(*eps, d2 - r2, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_snapshot_buffer_is_reused() {
        let mesh = triangle(PluginInstance::new(0));
        let rest = mesh.rest_lengths();
        let positions = mesh.rest_positions().to_vec();
        let mut membrane = Membrane::build(&config(0.05), mesh).unwrap();

        let mut lengths = rest.clone();
        let step = |membrane: &mut Membrane, lengths: &[f64]| {
            membrane.compute_forces(&StepState {
                deformed_lengths: lengths,
                reference_lengths: &rest,
                positions: &positions,
                timestep: 0.01,
            });
        };

        step(&mut membrane, &lengths);
        let buffer = membrane.previous_lengths().unwrap().as_ptr();

        for scale in [1.01, 1.02, 0.99] {
            lengths.iter_mut().zip(&rest).for_each(|(l, r)| *l = r * scale);
            step(&mut membrane, &lengths);
            assert_eq!(membrane.previous_lengths(), Some(lengths.as_slice()));
            assert_eq!(membrane.previous_lengths().unwrap().as_ptr(), buffer);
        }
    }

    #[test]
    fn test_record_initializes_then_overwrites() {
        let mut previous = PreviousLengths::default();
        previous.record(&[1.0, 2.0]);
        assert_eq!(previous.as_slice(), Some([1.0, 2.0].as_slice()));
        previous.record(&[3.0, 4.0]);
        assert_eq!(previous, PreviousLengths::Initialized(vec![3.0, 4.0]));
    }

    #[test]
    fn test_energy_matches_force_direction() {
        let mesh = triangle(PluginInstance::new(0));
        let rest = mesh.rest_lengths();
        let mut positions = mesh.rest_positions().to_vec();
        positions[1] += Vector3::new(0.05, 0.0, 0.0);
        let deformed = mesh.edge_lengths(&positions);
        let mut membrane = Membrane::build(&config(0.0), mesh).unwrap();

        membrane.compute_forces(&StepState {
            deformed_lengths: &deformed,
            reference_lengths: &rest,
            positions: &positions,
            timestep: 0.01,
        });

        assert!(membrane.elastic_energy() > 0.0);
        // Vertex 1 was pulled along +x; the restoring force points back.
        assert!(membrane.forces()[3] < 0.0);
    }
}
