use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ResultError;

/// Request body for the custom Cypher endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CypherRequest {
    pub cypher: String,
    pub dataset: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, Value>,
}

/// Raw response of a Cypher execution. Opaque to the pipeline; only a
/// descriptor's result processor interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CypherResponse {
    pub columns: Vec<String>,
    pub data: Vec<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

impl CypherResponse {
    /// Position of a named column, for processors that address columns by
    /// name instead of relying on fixed ordering.
    pub fn column_index(&self, name: &str) -> Result<usize, ResultError> {
        self.columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| ResultError::MissingColumn {
                column: name.to_string(),
            })
    }
}

/// Per-dataset metadata from the dbmeta endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetInfo {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(rename = "ROIs", default)]
    pub rois: Vec<String>,
    #[serde(rename = "last-mod", default)]
    pub last_mod: Option<String>,
}

/// Body of a bookmark save against the user favorites endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct FavoritePayload {
    pub name: String,
    pub url: String,
    pub cypher: String,
    pub timestamp: DateTime<Utc>,
}
