//! Error types for membrane construction.
//!
//! Every error here is raised while an instance is being built. Once an
//! instance exists, force evaluation cannot fail.

use thiserror::Error;

use crate::types::PluginInstance;

/// Errors that can occur while building a membrane instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MembraneError {
    /// A required plugin attribute was not supplied.
    #[error("Missing attribute '{0}' in membrane plugin configuration")]
    MissingAttribute(String),

    /// A numeric plugin attribute could not be parsed.
    #[error("Invalid value '{value}' for attribute '{name}'")]
    InvalidAttribute {
        /// Attribute name.
        name: String,
        /// Raw attribute value.
        value: String,
    },

    /// An attribute not recognized by the membrane plugin.
    #[error("Unknown attribute '{0}' in membrane plugin configuration")]
    UnknownAttribute(String),

    /// A mesh vertex is attached to a body owned by another plugin instance.
    #[error("Vertex {vertex}: body {body} does not have plugin {instance}")]
    TopologyMismatch {
        /// Flex-local vertex index.
        vertex: usize,
        /// Host body the vertex is attached to.
        body: usize,
        /// Instance being constructed.
        instance: PluginInstance,
    },

    /// Invalid mesh topology (e.g., repeated vertex, edge not matching the stencil).
    #[error("Invalid mesh topology: {0}")]
    InvalidTopology(String),

    /// Index out of bounds.
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(String),

    /// Per-vertex or per-edge arrays of inconsistent length.
    #[error("Size mismatch: {0}")]
    SizeMismatch(String),
}

impl MembraneError {
    /// Create a missing attribute error.
    pub fn missing_attribute(name: impl Into<String>) -> Self {
        Self::MissingAttribute(name.into())
    }

    /// Create an invalid attribute error.
    pub fn invalid_attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create an unknown attribute error.
    pub fn unknown_attribute(name: impl Into<String>) -> Self {
        Self::UnknownAttribute(name.into())
    }

    /// Create an invalid topology error.
    pub fn invalid_topology(msg: impl Into<String>) -> Self {
        Self::InvalidTopology(msg.into())
    }

    /// Create an index out of bounds error.
    pub fn index_out_of_bounds(msg: impl Into<String>) -> Self {
        Self::IndexOutOfBounds(msg.into())
    }

    /// Create a size mismatch error.
    pub fn size_mismatch(msg: impl Into<String>) -> Self {
        Self::SizeMismatch(msg.into())
    }

    /// Whether this error comes from the attribute intake rather than the mesh.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::MissingAttribute(_) | Self::InvalidAttribute { .. } | Self::UnknownAttribute(_)
        )
    }
}

/// Result type for membrane operations.
pub type Result<T> = std::result::Result<T, MembraneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MembraneError::missing_attribute("young");
        assert!(format!("{err}").contains("young"));

        let err = MembraneError::invalid_attribute("poisson", "abc");
        let msg = format!("{err}");
        assert!(msg.contains("poisson"));
        assert!(msg.contains("abc"));

        let err = MembraneError::TopologyMismatch {
            vertex: 2,
            body: 7,
            instance: PluginInstance::new(1),
        };
        assert!(format!("{err}").contains("body 7"));
    }

    #[test]
    fn test_config_error_classification() {
        assert!(MembraneError::missing_attribute("face").is_config_error());
        assert!(MembraneError::unknown_attribute("stiffness").is_config_error());
        assert!(!MembraneError::invalid_topology("bad").is_config_error());
        assert!(!MembraneError::index_out_of_bounds("vertex 9").is_config_error());
    }
}
