//! Built-in query plugins.
//!
//! The full catalog of a deployment is expected to grow plugin by plugin;
//! these three cover the common shapes: a raw-Cypher passthrough, a
//! single-neuron connectivity listing, and an ROI search whose result cells
//! chain into follow-up queries.

use std::sync::Arc;

use crate::core::registry::QueryPlugin;

pub mod connections;
pub mod custom;
pub mod rois;

pub use connections::SimpleConnectionsPlugin;
pub use custom::CustomQueryPlugin;
pub use rois::NeuronsInRoisPlugin;

/// The default plugin list, in menu order.
pub fn builtin_plugins() -> Vec<Arc<dyn QueryPlugin>> {
    vec![
        Arc::new(NeuronsInRoisPlugin),
        Arc::new(SimpleConnectionsPlugin),
        Arc::new(CustomQueryPlugin),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::PluginRegistry;

    #[test]
    fn test_builtin_plugins_register_without_collision() {
        let registry = PluginRegistry::new(builtin_plugins()).unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.lookup("neurons-in-rois").is_some());
        assert!(registry.lookup("simple-connections").is_some());
        assert!(registry.lookup("custom-query").is_some());
    }
}
