//! Plugin attribute intake.
//!
//! The host hands every plugin instance a bag of string attributes. The
//! membrane recognizes:
//!
//! | Attribute   | Kind       | Required |
//! |-------------|------------|----------|
//! | `face`      | structural | yes      |
//! | `edge`      | structural | no       |
//! | `young`     | number     | yes      |
//! | `poisson`   | number     | yes      |
//! | `thickness` | number     | yes      |
//! | `damping`   | number     | yes      |
//!
//! Structural attributes select which mesh faces/edges the host attaches; only
//! their presence is checked here.

use hashbrown::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MembraneError, Result};
use crate::material::MembraneMaterial;
use crate::types::PluginInstance;

/// Attribute names accepted by the membrane plugin.
pub const ATTRIBUTES: [&str; 6] = ["face", "edge", "young", "poisson", "thickness", "damping"];

/// Raw attributes of one plugin instance, as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PluginConfig {
    instance: PluginInstance,
    attributes: HashMap<String, String>,
}

impl PluginConfig {
    /// Create an empty configuration for the given instance.
    #[must_use]
    pub fn new(instance: PluginInstance) -> Self {
        Self {
            instance,
            attributes: HashMap::new(),
        }
    }

    /// Add (or replace) an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Set an attribute in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Instance the attributes belong to.
    #[must_use]
    pub const fn instance(&self) -> PluginInstance {
        self.instance
    }

    /// Look up a raw attribute value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether an attribute is present and non-empty.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.trim().is_empty())
    }

    /// Iterate over attribute names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    fn require(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(MembraneError::missing_attribute(name)),
        }
    }

    fn number(&self, name: &str) -> Result<f64> {
        let raw = self.require(name)?;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| MembraneError::invalid_attribute(name, raw))
    }
}

/// Typed membrane configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MembraneConfig {
    /// Instance being configured.
    pub instance: PluginInstance,
    /// Material parameters.
    pub material: MembraneMaterial,
}

impl MembraneConfig {
    /// Create a configuration directly from typed parameters.
    #[must_use]
    pub const fn new(instance: PluginInstance, material: MembraneMaterial) -> Self {
        Self { instance, material }
    }

    /// Parse the typed configuration from raw plugin attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - an attribute name is not one of [`ATTRIBUTES`] (the lexicographically
    ///   smallest offender is reported)
    /// - `face`, `young`, `poisson`, `thickness` or `damping` is missing
    /// - a numeric attribute does not parse as a float
    pub fn from_plugin_config(config: &PluginConfig) -> Result<Self> {
        if let Some(unknown) = config.names().filter(|name| !ATTRIBUTES.contains(name)).min() {
            return Err(MembraneError::unknown_attribute(unknown));
        }

        config.require("face")?;

        let material = MembraneMaterial {
            youngs_modulus: config.number("young")?,
            poissons_ratio: config.number("poisson")?,
            thickness: config.number("thickness")?,
            damping: config.number("damping")?,
        };

        Ok(Self::new(config.instance(), material))
    }

    /// Render this configuration back into raw attributes.
    #[must_use]
    pub fn to_plugin_config(&self) -> PluginConfig {
        PluginConfig::new(self.instance)
            .with_attribute("face", "all")
            .with_attribute("young", self.material.youngs_modulus.to_string())
            .with_attribute("poisson", self.material.poissons_ratio.to_string())
            .with_attribute("thickness", self.material.thickness.to_string())
            .with_attribute("damping", self.material.damping.to_string())
    }
}
