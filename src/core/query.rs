//! Query descriptors: the declarative unit handed to the submission
//! controller.
//!
//! A descriptor is built either by a plugin form or by the result processor
//! of a prior query (chained follow-up). It is consumed exactly once.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::api::models::CypherResponse;
use crate::core::results::Table;
use crate::error::{CliError, ResultError};

/// Opaque payload threaded through to the result processor, used by chained
/// queries to recover context such as which body id initiated them.
pub type ProcessorState = Value;

/// Pure over the raw response and the descriptor state; must not read any
/// other application state.
pub type ResultProcessor =
    Arc<dyn Fn(CypherResponse, &ProcessorState) -> Result<Vec<Table>, ResultError> + Send + Sync>;

/// Tag selecting the rendering component for a resolved query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisType {
    #[default]
    Table,
    HeatMap,
    BarGraph,
}

impl VisType {
    pub fn name(self) -> &'static str {
        match self {
            VisType::Table => "table",
            VisType::HeatMap => "heat-map",
            VisType::BarGraph => "bar-graph",
        }
    }
}

#[derive(Clone)]
pub struct QueryDescriptor {
    /// Target graph database identifier.
    pub data_set: String,
    /// Opaque Cypher text; never interpreted by the core.
    pub cypher: String,
    pub parameters: HashMap<String, Value>,
    pub vis_type: VisType,
    /// Originating plugin name, kept for provenance.
    pub plugin: String,
    pub title: String,
    pub menu_color: Option<String>,
    /// True when this descriptor was produced inside another query's result
    /// processing rather than by a user-initiated form.
    pub is_child: bool,
    pub state: ProcessorState,
    processor: ResultProcessor,
}

impl QueryDescriptor {
    pub fn new<F>(data_set: impl Into<String>, cypher: impl Into<String>, processor: F) -> Self
    where
        F: Fn(CypherResponse, &ProcessorState) -> Result<Vec<Table>, ResultError>
            + Send
            + Sync
            + 'static,
    {
        QueryDescriptor {
            data_set: data_set.into(),
            cypher: cypher.into(),
            parameters: HashMap::new(),
            vis_type: VisType::default(),
            plugin: String::new(),
            title: String::new(),
            menu_color: None,
            is_child: false,
            state: Value::Null,
            processor: Arc::new(processor),
        }
    }

    pub fn with_parameters(mut self, parameters: HashMap<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_vis_type(mut self, vis_type: VisType) -> Self {
        self.vis_type = vis_type;
        self
    }

    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = plugin.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_menu_color(mut self, color: impl Into<String>) -> Self {
        self.menu_color = Some(color.into());
        self
    }

    pub fn with_state(mut self, state: ProcessorState) -> Self {
        self.state = state;
        self
    }

    pub fn as_child(mut self) -> Self {
        self.is_child = true;
        self
    }

    /// Input constraints checked before any request is issued.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.data_set.trim().is_empty() {
            return Err(CliError::InvalidArguments(
                "query descriptor requires a non-empty data set".to_string(),
            ));
        }
        if self.cypher.trim().is_empty() {
            return Err(CliError::InvalidArguments(
                "query descriptor requires a non-empty query string".to_string(),
            ));
        }
        Ok(())
    }

    /// Normalize a raw response through the descriptor's processor.
    pub fn process(&self, response: CypherResponse) -> Result<Vec<Table>, ResultError> {
        (self.processor)(response, &self.state)
    }
}

impl fmt::Debug for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryDescriptor")
            .field("data_set", &self.data_set)
            .field("cypher", &self.cypher)
            .field("vis_type", &self.vis_type)
            .field("plugin", &self.plugin)
            .field("title", &self.title)
            .field("is_child", &self.is_child)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
