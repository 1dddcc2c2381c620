//! Core types shared between the builder and the evaluator.
//!
//! - [`PluginInstance`] - Identifier of a plugin instance in the host model
//! - [`VertexBinding`] - How a flex vertex is attached to the host's bodies

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a plugin instance in the host model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PluginInstance(pub usize);

impl PluginInstance {
    /// Create a new instance id.
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Get the raw slot index.
    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl From<usize> for PluginInstance {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PluginInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Plugin({})", self.0)
    }
}

/// How a flex vertex is attached to the host's kinematic tree.
///
/// Vertices attached to the world have no degrees of freedom: the evaluator
/// still computes their force but never scatters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VertexBinding {
    /// Fixed to the world body.
    #[default]
    World,
    /// Vertex body with three translational DOFs.
    Body {
        /// Host body id (never 0, the world).
        body: usize,
        /// Plugin instance that owns the body, if any.
        plugin: Option<PluginInstance>,
        /// Address of the first of the three DOFs in the generalized force vector.
        dofadr: usize,
    },
}

impl VertexBinding {
    /// DOF address of this vertex, or `None` when fixed to the world.
    #[must_use]
    pub const fn dofadr(&self) -> Option<usize> {
        match self {
            Self::World => None,
            Self::Body { dofadr, .. } => Some(*dofadr),
        }
    }

    /// Check whether the vertex may belong to the given instance.
    ///
    /// World-bound vertices are shared by everyone.
    #[must_use]
    pub fn is_owned_by(&self, instance: PluginInstance) -> bool {
        match self {
            Self::World => true,
            Self::Body { plugin, .. } => *plugin == Some(instance),
        }
    }

    /// Check if this vertex is fixed to the world.
    #[must_use]
    pub const fn is_pinned(&self) -> bool {
        matches!(self, Self::World)
    }
}
