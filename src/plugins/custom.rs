//! Passthrough plugin for hand-written Cypher.

use crate::api::models::CypherResponse;
use crate::core::query::{ProcessorState, QueryDescriptor};
use crate::core::registry::{FormInput, QueryPlugin};
use crate::core::results::{Cell, CellValue, Table};
use crate::error::ResultError;

pub struct CustomQueryPlugin;

impl QueryPlugin for CustomQueryPlugin {
    fn query_name(&self) -> &str {
        "Custom Query"
    }

    fn description(&self) -> &str {
        "Run arbitrary Cypher against the selected dataset"
    }

    fn build_query(&self, form: &FormInput) -> crate::Result<QueryDescriptor> {
        let cypher = form.require("cypher")?;
        Ok(
            QueryDescriptor::new(form.data_set.clone(), cypher, process_custom)
                .with_plugin(self.query_name())
                .with_title("Custom Query"),
        )
    }
}

/// One table straight off the wire: response columns as headers, every cell
/// plain.
fn process_custom(
    response: CypherResponse,
    _state: &ProcessorState,
) -> Result<Vec<Table>, ResultError> {
    let header = response
        .columns
        .iter()
        .map(|column| Cell::plain(column.as_str()))
        .collect();

    let mut table = Table::new("Custom Query", header);
    if let Some(debug) = response.debug.clone() {
        table = table.with_debug(debug);
    }
    for row in &response.data {
        table.push_row(
            row.iter()
                .map(|value| Cell::plain(CellValue::from_json(value)))
                .collect(),
        )?;
    }

    Ok(vec![table])
}
