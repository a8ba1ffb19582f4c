//! Plugin registry: the slug-keyed catalog of available query types.
//!
//! Populated once at startup and read-only afterwards. Two plugins slugging
//! to the same identifier is a startup failure, not a runtime condition.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::query::QueryDescriptor;
use crate::error::{CliError, RegistryError};

/// Grouping tag for the query menu; plugins without a category are general.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginCategory {
    Reconstruction,
}

/// Parameters collected by a plugin form collaborator on behalf of a plugin.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub data_set: String,
    pub available_rois: Vec<String>,
    pub params: HashMap<String, String>,
}

impl FormInput {
    pub fn new(data_set: impl Into<String>) -> Self {
        FormInput {
            data_set: data_set.into(),
            available_rois: Vec::new(),
            params: HashMap::new(),
        }
    }

    pub fn with_rois(mut self, rois: Vec<String>) -> Self {
        self.available_rois = rois;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str, CliError> {
        self.get(key).ok_or_else(|| {
            CliError::InvalidArguments(format!("missing required parameter '{}'", key))
        })
    }
}

/// Fixed capability set every registered query type implements.
pub trait QueryPlugin: Send + Sync {
    fn query_name(&self) -> &str;
    fn description(&self) -> &str;
    fn category(&self) -> Option<PluginCategory> {
        None
    }
    fn experimental(&self) -> bool {
        false
    }
    /// Build a root query descriptor from collected form input.
    fn build_query(&self, form: &FormInput) -> crate::Result<QueryDescriptor>;
}

/// Derive the URL-safe identifier for a plugin display name: lower-cased,
/// with runs of non-alphanumeric characters collapsed to single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut gap = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(ch);
        } else {
            gap = true;
        }
    }
    slug
}

pub struct PluginRegistry {
    plugins: Vec<Arc<dyn QueryPlugin>>,
    by_slug: HashMap<String, usize>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.len())
            .field("by_slug", &self.by_slug)
            .finish()
    }
}

impl PluginRegistry {
    /// Build the catalog, failing fast on the first slug collision.
    pub fn new(plugins: Vec<Arc<dyn QueryPlugin>>) -> Result<Self, RegistryError> {
        let mut by_slug: HashMap<String, usize> = HashMap::with_capacity(plugins.len());
        for (position, plugin) in plugins.iter().enumerate() {
            let slug = slugify(plugin.query_name());
            if let Some(&existing) = by_slug.get(&slug) {
                return Err(RegistryError::SlugCollision {
                    first: plugins[existing].query_name().to_string(),
                    second: plugin.query_name().to_string(),
                    slug,
                });
            }
            by_slug.insert(slug, position);
        }
        Ok(PluginRegistry { plugins, by_slug })
    }

    pub fn lookup(&self, slug: &str) -> Option<Arc<dyn QueryPlugin>> {
        self.by_slug
            .get(slug)
            .map(|&position| Arc::clone(&self.plugins[position]))
    }

    /// Plugins in registration order, optionally filtered by category.
    pub fn list(&self, category: Option<PluginCategory>) -> Vec<Arc<dyn QueryPlugin>> {
        self.plugins
            .iter()
            .filter(|plugin| category.is_none() || plugin.category() == category)
            .map(Arc::clone)
            .collect()
    }

    /// Slugs in registration order, for menus and error hints.
    pub fn slugs(&self) -> Vec<String> {
        self.plugins
            .iter()
            .map(|plugin| slugify(plugin.query_name()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakePlugin {
        name: &'static str,
        category: Option<PluginCategory>,
    }

    impl QueryPlugin for FakePlugin {
        fn query_name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "test plugin"
        }

        fn category(&self) -> Option<PluginCategory> {
            self.category
        }

        fn build_query(&self, form: &FormInput) -> crate::Result<QueryDescriptor> {
            Ok(QueryDescriptor::new(
                form.data_set.clone(),
                "MATCH (n) RETURN n",
                |_, _| Ok(Vec::new()),
            ))
        }
    }

    fn plugin(name: &'static str, category: Option<PluginCategory>) -> Arc<dyn QueryPlugin> {
        Arc::new(FakePlugin { name, category })
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Find Neurons"), "find-neurons");
        assert_eq!(slugify("ROIs Intersecting Neurons"), "rois-intersecting-neurons");
        assert_eq!(slugify("Custom  Query!"), "custom-query");
        assert_eq!(slugify("Autapses"), "autapses");
    }

    #[test]
    fn test_lookup_by_slug() {
        let registry = PluginRegistry::new(vec![
            plugin("Find Neurons", None),
            plugin("Simple Connections", None),
        ])
        .unwrap();

        let found = registry.lookup("simple-connections").unwrap();
        assert_eq!(found.query_name(), "Simple Connections");
        assert!(registry.lookup("no-such-query").is_none());
    }

    #[test]
    fn test_collision_fails_fast_with_colliding_names() {
        let err = PluginRegistry::new(vec![
            plugin("Find Neurons", None),
            plugin("find---neurons", None),
        ])
        .unwrap_err();

        let RegistryError::SlugCollision { first, second, slug } = err;
        assert_eq!(first, "Find Neurons");
        assert_eq!(second, "find---neurons");
        assert_eq!(slug, "find-neurons");
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let registry = PluginRegistry::new(vec![
            plugin("Find Neurons", None),
            plugin("Completeness", Some(PluginCategory::Reconstruction)),
            plugin("Custom Query", None),
        ])
        .unwrap();

        let all_plugins = registry.list(None);
        let all: Vec<&str> = all_plugins.iter().map(|p| p.query_name()).collect();
        assert_eq!(all, vec!["Find Neurons", "Completeness", "Custom Query"]);

        let recon_plugins = registry.list(Some(PluginCategory::Reconstruction));
        let recon: Vec<&str> = recon_plugins
            .iter()
            .map(|p| p.query_name())
            .collect();
        assert_eq!(recon, vec!["Completeness"]);
    }

    #[test]
    fn test_form_input_require() {
        let form = FormInput::new("hemibrain").with_param("neuron", "KC-s");
        assert_eq!(form.require("neuron").unwrap(), "KC-s");
        assert!(form.require("direction").is_err());
    }
}
