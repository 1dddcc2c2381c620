//! Instance slots for passive plugins.
//!
//! The host addresses plugin instances by id. A [`PluginTable`] keeps one
//! slot per id: `create` fills a slot, `destroy` empties it, and `evaluate`
//! runs the instance for one step.

use tracing::debug;

use crate::PassivePlugin;
use crate::config::PluginConfig;
use crate::element_set::ElementSet;
use crate::error::Result;
use crate::membrane::StepState;
use crate::types::PluginInstance;

/// Slot storage of passive plugin instances, addressed by [`PluginInstance`].
#[derive(Debug, Clone)]
pub struct PluginTable<P> {
    slots: Vec<Option<P>>,
}

impl<P> Default for PluginTable<P> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<P: PassivePlugin> PluginTable<P> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an instance and store it in the slot named by `config`.
    ///
    /// An instance already occupying that slot is destroyed first. On failure
    /// the slot is left empty.
    ///
    /// # Errors
    ///
    /// Forwards the plugin's construction error.
    pub fn create(&mut self, config: &PluginConfig, geometry: ElementSet) -> Result<PluginInstance> {
        let instance = config.instance();
        let slot = instance.raw();
        if slot >= self.slots.len() {
            self.slots.resize_with(slot + 1, || None);
        }
        self.slots[slot] = None;

        let plugin = P::build(config, geometry)?;
        debug!(name = P::NAME, %instance, "Created plugin instance");
        self.slots[slot] = Some(plugin);
        Ok(instance)
    }

    /// Drop the instance in the given slot, returning it if there was one.
    pub fn destroy(&mut self, instance: PluginInstance) -> Option<P> {
        let plugin = self.slots.get_mut(instance.raw())?.take();
        if plugin.is_some() {
            debug!(name = P::NAME, %instance, "Destroyed plugin instance");
        }
        plugin
    }

    /// Evaluate one instance for one step, adding into `qfrc_passive`.
    ///
    /// Returns `false` if the slot is empty.
    pub fn evaluate(
        &mut self,
        instance: PluginInstance,
        step: &StepState<'_>,
        qfrc_passive: &mut [f64],
    ) -> bool {
        match self.get_mut(instance) {
            Some(plugin) => {
                plugin.evaluate(step, qfrc_passive);
                true
            }
            None => false,
        }
    }

    /// Instance in the given slot.
    #[must_use]
    pub fn get(&self, instance: PluginInstance) -> Option<&P> {
        self.slots.get(instance.raw())?.as_ref()
    }

    /// Mutable instance in the given slot.
    pub fn get_mut(&mut self, instance: PluginInstance) -> Option<&mut P> {
        self.slots.get_mut(instance.raw())?.as_mut()
    }

    /// Number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Check if no instance is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::Membrane;
    use nalgebra::Point3;

    fn mesh(instance: PluginInstance) -> ElementSet {
        ElementSet::from_triangles(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap()
        .bind_to_plugin(instance)
    }

    fn config(instance: PluginInstance) -> PluginConfig {
        PluginConfig::new(instance)
            .with_attribute("face", "all")
            .with_attribute("young", "1000")
            .with_attribute("poisson", "0.3")
            .with_attribute("thickness", "0.01")
            .with_attribute("damping", "0")
    }

    #[test]
    fn test_create_and_destroy() {
        let mut table: PluginTable<Membrane> = PluginTable::new();
        let id = PluginInstance::new(2);

        assert_eq!(table.create(&config(id), mesh(id)).unwrap(), id);
        assert_eq!(table.len(), 1);
        assert!(table.get(id).is_some());
        assert!(table.get(PluginInstance::new(0)).is_none());

        assert!(table.destroy(id).is_some());
        assert!(table.destroy(id).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_failed_create_leaves_slot_empty() {
        let mut table: PluginTable<Membrane> = PluginTable::new();
        let id = PluginInstance::new(0);
        table.create(&config(id), mesh(id)).unwrap();

        let bad = PluginConfig::new(id).with_attribute("face", "all");
        assert!(table.create(&bad, mesh(id)).is_err());
        assert!(table.get(id).is_none());
    }

    #[test]
    fn test_evaluate_missing_instance() {
        let mut table: PluginTable<Membrane> = PluginTable::new();
        let positions = [Point3::origin(); 3];
        let lengths = [1.0; 3];
        let step = StepState {
            deformed_lengths: &lengths,
            reference_lengths: &lengths,
            positions: &positions,
            timestep: 0.01,
        };
        let mut qfrc = vec![0.0; 9];
        assert!(!table.evaluate(PluginInstance::new(0), &step, &mut qfrc));
    }
}
