//! Connection listing for a single neuron, by direction.
//!
//! Also provides the follow-up descriptors embedded in actionable cells of
//! the ROI search results.

use serde_json::json;

use crate::api::models::CypherResponse;
use crate::core::query::{ProcessorState, QueryDescriptor};
use crate::core::registry::{FormInput, QueryPlugin};
use crate::core::results::{Cell, CellValue, Table, text_header};
use crate::error::{CliError, ResultError};

/// Partners downstream of the source neuron.
const OUTPUTS_QUERY: &str = "match (m :Neuron)-[e :ConnectsTo]->(n :Neuron) where {filter} \
     return n.name as partner, n.bodyId as partnerid, e.weight as weight \
     order by e.weight desc";

/// Partners upstream of the source neuron.
const INPUTS_QUERY: &str = "match (m :Neuron)<-[e :ConnectsTo]-(n :Neuron) where {filter} \
     return n.name as partner, n.bodyId as partnerid, e.weight as weight \
     order by e.weight desc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Connections from the source neuron (its outputs).
    Outputs,
    /// Connections to the source neuron (its inputs).
    Inputs,
}

pub struct SimpleConnectionsPlugin;

impl QueryPlugin for SimpleConnectionsPlugin {
    fn query_name(&self) -> &str {
        "Simple Connections"
    }

    fn description(&self) -> &str {
        "List the inputs or outputs of a neuron, strongest connections first"
    }

    fn build_query(&self, form: &FormInput) -> crate::Result<QueryDescriptor> {
        let neuron = form.require("neuron")?;
        let direction = match form.get("direction").unwrap_or("outputs") {
            "outputs" => Direction::Outputs,
            "inputs" => Direction::Inputs,
            other => {
                return Err(CliError::InvalidArguments(format!(
                    "direction must be 'inputs' or 'outputs', got '{}'",
                    other
                ))
                .into());
            }
        };

        // Numeric input selects by body id, anything else by name pattern.
        let filter = match neuron.parse::<i64>() {
            Ok(body_id) => format!("m.bodyId={}", body_id),
            Err(_) => format!("m.name=~\"{}\"", neuron),
        };
        let template = match direction {
            Direction::Outputs => OUTPUTS_QUERY,
            Direction::Inputs => INPUTS_QUERY,
        };

        Ok(
            QueryDescriptor::new(
                form.data_set.clone(),
                template.replace("{filter}", &filter),
                process_connections,
            )
            .with_plugin(self.query_name())
            .with_title(format!("Connections of {}", neuron))
            .with_state(json!({
                "sourceName": neuron,
                "isPre": direction == Direction::Outputs,
            })),
        )
    }
}

/// Follow-up descriptor for the connections of one body id, embedded into
/// actionable cells by other processors.
pub fn connection_descriptor(
    data_set: &str,
    body_id: i64,
    body_name: &str,
    direction: Direction,
) -> QueryDescriptor {
    let template = match direction {
        Direction::Outputs => OUTPUTS_QUERY,
        Direction::Inputs => INPUTS_QUERY,
    };
    QueryDescriptor::new(
        data_set,
        template.replace("{filter}", &format!("m.bodyId={}", body_id)),
        process_connections,
    )
    .with_plugin("Simple Connections")
    .with_title(format!("Connections of {}", body_name))
    .with_state(json!({
        "sourceId": body_id,
        "sourceName": body_name,
        "isPre": direction == Direction::Outputs,
    }))
    .as_child()
}

/// One table of connection partners; the state says which neuron initiated
/// the query and in which direction.
fn process_connections(
    response: CypherResponse,
    state: &ProcessorState,
) -> Result<Vec<Table>, ResultError> {
    let partner = response.column_index("partner")?;
    let partner_id = response.column_index("partnerid")?;
    let weight = response.column_index("weight")?;

    let source = state["sourceName"].as_str().unwrap_or("neuron");
    let is_pre = state["isPre"].as_bool().unwrap_or(true);
    let name = if is_pre {
        format!("Connections from {}", source)
    } else {
        format!("Connections to {}", source)
    };

    let mut table = Table::new(name, text_header(&["Neuron ID", "Neuron", "#connections"]));
    for row in &response.data {
        table.push_row(vec![
            Cell::plain(CellValue::from_json(&row[partner_id])),
            Cell::plain(CellValue::from_json(&row[partner])),
            Cell::plain(CellValue::from_json(&row[weight])),
        ])?;
    }

    Ok(vec![table])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn partners_response() -> CypherResponse {
        CypherResponse {
            columns: vec![
                "partner".to_string(),
                "partnerid".to_string(),
                "weight".to_string(),
            ],
            data: vec![
                vec![json!("PN-a"), json!(1001), json!(44)],
                vec![json!("PN-b"), json!(1002), json!(3)],
            ],
            debug: None,
        }
    }

    #[test]
    fn test_build_query_by_body_id() {
        let form = FormInput::new("hemibrain").with_param("neuron", "911");
        let descriptor = SimpleConnectionsPlugin.build_query(&form).unwrap();
        assert!(descriptor.cypher.contains("m.bodyId=911"));
        assert!(descriptor.cypher.contains("-[e :ConnectsTo]->"));
        assert!(!descriptor.is_child);
    }

    #[test]
    fn test_build_query_by_name_and_direction() {
        let form = FormInput::new("hemibrain")
            .with_param("neuron", "KC-s")
            .with_param("direction", "inputs");
        let descriptor = SimpleConnectionsPlugin.build_query(&form).unwrap();
        assert!(descriptor.cypher.contains("m.name=~\"KC-s\""));
        assert!(descriptor.cypher.contains("<-[e :ConnectsTo]-"));
    }

    #[test]
    fn test_build_query_rejects_bad_direction() {
        let form = FormInput::new("hemibrain")
            .with_param("neuron", "911")
            .with_param("direction", "sideways");
        assert!(SimpleConnectionsPlugin.build_query(&form).is_err());
    }

    #[test]
    fn test_process_connections_names_table_from_state() {
        let state = json!({ "sourceId": 911, "sourceName": "KC-s", "isPre": false });
        let tables = process_connections(partners_response(), &state).unwrap();
        let table = &tables[0];
        assert_eq!(table.name, "Connections to KC-s");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.body()[0][2].value(), &CellValue::Int(44));
    }

    #[test]
    fn test_connection_descriptor_is_child() {
        let descriptor = connection_descriptor("hemibrain", 911, "KC-s", Direction::Outputs);
        assert!(descriptor.is_child);
        assert!(descriptor.cypher.contains("m.bodyId=911"));
        assert_eq!(descriptor.state["isPre"], json!(true));
    }
}
