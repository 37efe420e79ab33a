use log::debug;

use crate::config::PluginConfig;

/// Plugin kept between wasm calls, tagged with the configuration generation
/// it was built from.
///
/// A call takes the plugin out for its whole duration so no `RefCell` borrow
/// is held across an await. Overlapping calls each get their own instance.
/// `configure` bumps the generation, so a plugin taken out before a
/// reconfiguration is dropped on return instead of being reinstalled.
pub(crate) struct PluginSlot<P> {
    config: PluginConfig,
    generation: u64,
    idle: Option<P>,
}

impl<P> PluginSlot<P> {
    pub fn new(config: PluginConfig) -> Self {
        Self {
            config,
            generation: 0,
            idle: None,
        }
    }

    pub fn configure(&mut self, config: PluginConfig) {
        self.config = config;
        self.generation += 1;
        self.idle = None;
    }

    /// The idle plugin, or a fresh one built from the current config
    pub fn take(&mut self, build: impl FnOnce(&PluginConfig) -> P) -> (u64, P) {
        let plugin = self.idle.take().unwrap_or_else(|| build(&self.config));
        (self.generation, plugin)
    }

    /// Returns whether the plugin was kept
    pub fn put_back(&mut self, generation: u64, plugin: P) -> bool {
        if generation != self.generation {
            debug!(
                "Dropping plugin from config generation {} (current {})",
                generation, self.generation
            );
            return false;
        }
        if self.idle.is_some() {
            return false;
        }
        self.idle = Some(plugin);
        true
    }
}
