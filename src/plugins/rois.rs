//! ROI-scoped neuron search.
//!
//! Finds neurons with inputs and outputs in the requested regions of
//! interest. The #post/#pre columns are interactive: each cell embeds a
//! follow-up connections query for that body id, ranked by the neuron's
//! total connection count.

use std::collections::HashMap;

use serde_json::json;

use crate::api::models::CypherResponse;
use crate::core::query::{ProcessorState, QueryDescriptor};
use crate::core::registry::{FormInput, QueryPlugin};
use crate::core::results::{Cell, Row, Table, text_header};
use crate::error::{CliError, ResultError};
use crate::plugins::connections::{Direction, connection_descriptor};

const NEURONS_QUERY: &str = "match (neuron :Neuron)<-[:PartOf]-(roi :NeuronPart{labels}) {filter} \
     return neuron.bodyId as bodyid, neuron.name as bodyname, roi.pre as pre, \
     roi.post as post, labels(roi) as rois, neuron.size as size, \
     neuron.pre as npre, neuron.post as npost order by neuron.bodyId";

pub struct NeuronsInRoisPlugin;

impl QueryPlugin for NeuronsInRoisPlugin {
    fn query_name(&self) -> &str {
        "Neurons in ROIs"
    }

    fn description(&self) -> &str {
        "Find neurons with inputs in one set of regions and outputs in another"
    }

    fn build_query(&self, form: &FormInput) -> crate::Result<QueryDescriptor> {
        let input_rois = split_rois(form.require("input_rois")?);
        let output_rois = split_rois(form.require("output_rois")?);
        if input_rois.is_empty() || output_rois.is_empty() {
            return Err(CliError::InvalidArguments(
                "at least one input ROI and one output ROI are required".to_string(),
            )
            .into());
        }

        // When the form knows the dataset's ROIs, reject unknown names early.
        if !form.available_rois.is_empty() {
            for roi in input_rois.iter().chain(&output_rois) {
                if !form.available_rois.iter().any(|known| known == roi) {
                    return Err(CliError::InvalidArguments(format!(
                        "unknown ROI '{}' for dataset {}",
                        roi, form.data_set
                    ))
                    .into());
                }
            }
        }

        let neuron_src = form.get("neuron").unwrap_or("").to_string();
        let filter = if neuron_src.is_empty() {
            String::new()
        } else {
            match neuron_src.parse::<i64>() {
                Ok(body_id) => format!("where neuron.bodyId={}", body_id),
                Err(_) => format!("where neuron.name=~\"{}\"", neuron_src),
            }
        };

        let labels: String = input_rois
            .iter()
            .chain(&output_rois)
            .map(|roi| format!(":`{}`", roi))
            .collect();

        let cypher = NEURONS_QUERY
            .replace("{labels}", &labels)
            .replace("{filter}", &filter);

        Ok(QueryDescriptor::new(form.data_set.clone(), cypher, process_neurons)
            .with_plugin(self.query_name())
            .with_title(format!(
                "Neurons with inputs in {} and outputs in {}",
                input_rois.join("/"),
                output_rois.join("/")
            ))
            .with_state(json!({
                "dataSet": form.data_set,
                "neuronSrc": neuron_src,
                "inputRois": input_rois,
                "outputRois": output_rois,
            })))
    }
}

fn split_rois(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|roi| !roi.is_empty())
        .map(str::to_string)
        .collect()
}

fn state_rois(state: &ProcessorState, key: &str) -> Vec<String> {
    state[key]
        .as_array()
        .map(|rois| {
            rois.iter()
                .filter_map(|roi| roi.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

struct NeuronMeta {
    name: String,
    size: i64,
    npre: i64,
    npost: i64,
    input_sizes: HashMap<String, i64>,
    output_sizes: HashMap<String, i64>,
}

/// Group the per-ROI records by body id, keep neurons covering every
/// requested region, and emit one table sorted by total ROI traffic.
fn process_neurons(
    response: CypherResponse,
    state: &ProcessorState,
) -> Result<Vec<Table>, ResultError> {
    let bodyid = response.column_index("bodyid")?;
    let bodyname = response.column_index("bodyname")?;
    let pre = response.column_index("pre")?;
    let post = response.column_index("post")?;
    let rois_col = response.column_index("rois")?;
    let size = response.column_index("size")?;
    let npre = response.column_index("npre")?;
    let npost = response.column_index("npost")?;

    let data_set = state["dataSet"].as_str().unwrap_or("").to_string();
    let neuron_src = state["neuronSrc"].as_str().unwrap_or("");
    let input_rois = state_rois(state, "inputRois");
    let output_rois = state_rois(state, "outputRois");

    // One record per (neuron, roi); fold into per-neuron metadata keeping
    // first-seen order.
    let mut order: Vec<i64> = Vec::new();
    let mut neurons: HashMap<i64, NeuronMeta> = HashMap::new();
    for record in &response.data {
        let body_id = record[bodyid].as_i64().unwrap_or(0);
        let meta = neurons.entry(body_id).or_insert_with(|| {
            order.push(body_id);
            NeuronMeta {
                name: record[bodyname].as_str().unwrap_or("").to_string(),
                size: record[size].as_i64().unwrap_or(0),
                npre: record[npre].as_i64().unwrap_or(0),
                npost: record[npost].as_i64().unwrap_or(0),
                input_sizes: HashMap::new(),
                output_sizes: HashMap::new(),
            }
        });

        let record_rois: Vec<&str> = record[rois_col]
            .as_array()
            .map(|labels| labels.iter().filter_map(|label| label.as_str()).collect())
            .unwrap_or_default();

        for roi in record_rois {
            if input_rois.iter().any(|r| r == roi) {
                let post_size = record[post].as_i64().unwrap_or(0);
                if post_size > 0 {
                    meta.input_sizes.insert(roi.to_string(), post_size);
                }
            }
            if output_rois.iter().any(|r| r == roi) {
                let pre_size = record[pre].as_i64().unwrap_or(0);
                if pre_size > 0 {
                    meta.output_sizes.insert(roi.to_string(), pre_size);
                }
            }
        }
    }

    let mut header = text_header(&["id", "neuron", "#voxels", "#post (inputs)", "#pre (outputs)"]);
    for roi in &input_rois {
        header.push(Cell::plain(format!("In:{}", roi)));
    }
    for roi in &output_rois {
        header.push(Cell::plain(format!("Out:{}", roi)));
    }

    // Rows paired with their ROI totals for the presort.
    let mut rows: Vec<(i64, Row)> = Vec::new();
    for body_id in order {
        let meta = &neurons[&body_id];
        if meta.input_sizes.len() != input_rois.len()
            || meta.output_sizes.len() != output_rois.len()
        {
            continue;
        }

        let mut row: Row = vec![
            Cell::plain(body_id),
            Cell::plain(meta.name.as_str()),
            Cell::plain(meta.size),
            Cell::ranked_follow_up(
                meta.npost,
                connection_descriptor(&data_set, body_id, &meta.name, Direction::Inputs),
                meta.npost,
            ),
            Cell::ranked_follow_up(
                meta.npre,
                connection_descriptor(&data_set, body_id, &meta.name, Direction::Outputs),
                meta.npre,
            ),
        ];

        let mut total = 0;
        for roi in &input_rois {
            let roi_size = meta.input_sizes[roi];
            total += roi_size;
            row.push(Cell::plain(roi_size));
        }
        for roi in &output_rois {
            let roi_size = meta.output_sizes[roi];
            total += roi_size;
            row.push(Cell::plain(roi_size));
        }

        rows.push((total, row));
    }

    // Busiest neurons first; equal totals keep body-id order.
    rows.sort_by(|a, b| b.0.cmp(&a.0));

    let title = format!(
        "Neurons {} with inputs in: {:?} and outputs in: {:?}",
        neuron_src, input_rois, output_rois
    );
    let mut table = Table::new(title, header);
    for (_, row) in rows {
        table.push_row(row)?;
    }

    Ok(vec![table])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::results::{CellAction, CellValue};
    use serde_json::{Value, json};

    fn form() -> FormInput {
        FormInput::new("hemibrain")
            .with_param("input_rois", "EB,FB")
            .with_param("output_rois", "PB")
    }

    fn record(body_id: i64, name: &str, pre: i64, post: i64, rois: &[&str]) -> Vec<Value> {
        // Columns: bodyid, bodyname, pre, post, rois, size, npre, npost
        vec![
            json!(body_id),
            json!(name),
            json!(pre),
            json!(post),
            json!(rois),
            json!(1000 + body_id),
            json!(pre * 10),
            json!(post * 10),
        ]
    }

    fn response(data: Vec<Vec<Value>>) -> CypherResponse {
        CypherResponse {
            columns: [
                "bodyid", "bodyname", "pre", "post", "rois", "size", "npre", "npost",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            data,
            debug: None,
        }
    }

    fn state() -> ProcessorState {
        json!({
            "dataSet": "hemibrain",
            "neuronSrc": "",
            "inputRois": ["EB"],
            "outputRois": ["PB"],
        })
    }

    #[test]
    fn test_build_query_composes_roi_labels() {
        let descriptor = NeuronsInRoisPlugin.build_query(&form()).unwrap();
        assert!(descriptor.cypher.contains(":`EB`:`FB`:`PB`"));
        assert!(!descriptor.cypher.contains("where"));
        assert_eq!(descriptor.state["inputRois"], json!(["EB", "FB"]));
    }

    #[test]
    fn test_build_query_neuron_filters() {
        let by_id = NeuronsInRoisPlugin
            .build_query(&form().with_param("neuron", "911"))
            .unwrap();
        assert!(by_id.cypher.contains("where neuron.bodyId=911"));

        let by_name = NeuronsInRoisPlugin
            .build_query(&form().with_param("neuron", "KC.*"))
            .unwrap();
        assert!(by_name.cypher.contains("where neuron.name=~\"KC.*\""));
    }

    #[test]
    fn test_build_query_rejects_unknown_roi() {
        let form = form().with_rois(vec!["EB".to_string(), "FB".to_string()]);
        let err = NeuronsInRoisPlugin.build_query(&form).unwrap_err();
        assert!(format!("{}", err).contains("PB"));
    }

    #[test]
    fn test_build_query_requires_both_roi_sets() {
        let form = FormInput::new("hemibrain").with_param("input_rois", "EB");
        assert!(NeuronsInRoisPlugin.build_query(&form).is_err());

        let form = FormInput::new("hemibrain")
            .with_param("input_rois", "EB")
            .with_param("output_rois", " , ");
        assert!(NeuronsInRoisPlugin.build_query(&form).is_err());
    }

    #[test]
    fn test_process_keeps_only_neurons_covering_all_rois() {
        // 911 touches EB (inputs) and PB (outputs); 1002 only EB.
        let response = response(vec![
            record(911, "KC-s", 0, 30, &["EB"]),
            record(911, "KC-s", 20, 0, &["PB"]),
            record(1002, "KC-t", 0, 12, &["EB"]),
        ]);

        let tables = process_neurons(response, &state()).unwrap();
        let table = &tables[0];
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.body()[0][0].value(), &CellValue::Int(911));
        // id, neuron, #voxels, #post, #pre, In:EB, Out:PB
        assert_eq!(table.column_count(), 7);
    }

    #[test]
    fn test_process_embeds_ranked_follow_ups() {
        let response = response(vec![
            record(911, "KC-s", 0, 30, &["EB"]),
            record(911, "KC-s", 20, 0, &["PB"]),
        ]);

        let tables = process_neurons(response, &state()).unwrap();
        let row = &tables[0].body()[0];

        let post_cell = &row[3];
        assert!(post_cell.is_actionable());
        assert_eq!(post_cell.sort_value(), &CellValue::Int(300));
        let CellAction::FollowUp(child) = post_cell.action().unwrap();
        assert!(child.is_child);
        assert!(child.cypher.contains("<-[e :ConnectsTo]-"));
        assert!(child.cypher.contains("m.bodyId=911"));
        assert_eq!(child.data_set, "hemibrain");

        let pre_cell = &row[4];
        let CellAction::FollowUp(child) = pre_cell.action().unwrap();
        assert!(child.cypher.contains("-[e :ConnectsTo]->"));
    }

    #[test]
    fn test_process_sorts_by_total_roi_traffic() {
        let response = response(vec![
            record(1, "a", 0, 5, &["EB"]),
            record(1, "a", 5, 0, &["PB"]),
            record(2, "b", 0, 50, &["EB"]),
            record(2, "b", 50, 0, &["PB"]),
            record(3, "c", 0, 5, &["EB"]),
            record(3, "c", 5, 0, &["PB"]),
        ]);

        let tables = process_neurons(response, &state()).unwrap();
        let ids: Vec<String> = tables[0]
            .body()
            .iter()
            .map(|row| row[0].value().to_string())
            .collect();
        // Body 2 is busiest; 1 and 3 tie and keep body-id order.
        assert_eq!(ids, vec!["2", "1", "3"]);
    }
}
