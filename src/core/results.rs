//! Normalized tabular results: cells, tables, and result sets.
//!
//! Every query processor flattens a raw Cypher response into this shape.
//! Cells are immutable once placed into a table.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::core::query::QueryDescriptor;
use crate::error::ResultError;

/// Scalar payload of a cell, decoded from a raw response value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Int(i)
                } else {
                    CellValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => CellValue::Text(s.clone()),
            // Arrays and objects are displayed as their JSON text
            other => CellValue::Text(other.to_string()),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    // Rank only exists to keep the ordering total; relative order of
    // mixed-type columns is unspecified.
    fn type_rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Int(_) | CellValue::Float(_) => 1,
            CellValue::Bool(_) => 2,
            CellValue::Text(_) => 3,
        }
    }

    /// Natural ordering: numeric keys compare numerically, text keys
    /// lexicographically. Cross-type comparisons fall back to a fixed type
    /// rank so sorting is total, but that order is unspecified behavior.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => match (self, other) {
                (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
                (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
                (CellValue::Null, CellValue::Null) => Ordering::Equal,
                (a, b) => a.type_rank().cmp(&b.type_rank()),
            },
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "-"),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

/// Operation attached to an interactive cell. Activating the cell triggers
/// exactly this operation and nothing else.
#[derive(Debug, Clone)]
pub enum CellAction {
    /// Submit the embedded descriptor through the submission controller.
    FollowUp(Box<QueryDescriptor>),
}

/// Atomic table entry: a display value, optionally interactive, optionally
/// carrying a sort-key override.
#[derive(Debug, Clone)]
pub enum Cell {
    Plain(CellValue),
    Ranked {
        value: CellValue,
        sort_key: CellValue,
    },
    Actionable {
        value: CellValue,
        action: CellAction,
        sort_key: Option<CellValue>,
    },
}

impl Cell {
    pub fn plain(value: impl Into<CellValue>) -> Self {
        Cell::Plain(value.into())
    }

    pub fn ranked(value: impl Into<CellValue>, sort_key: impl Into<CellValue>) -> Self {
        Cell::Ranked {
            value: value.into(),
            sort_key: sort_key.into(),
        }
    }

    pub fn follow_up(value: impl Into<CellValue>, query: QueryDescriptor) -> Self {
        Cell::Actionable {
            value: value.into(),
            action: CellAction::FollowUp(Box::new(query)),
            sort_key: None,
        }
    }

    pub fn ranked_follow_up(
        value: impl Into<CellValue>,
        query: QueryDescriptor,
        sort_key: impl Into<CellValue>,
    ) -> Self {
        Cell::Actionable {
            value: value.into(),
            action: CellAction::FollowUp(Box::new(query)),
            sort_key: Some(sort_key.into()),
        }
    }

    pub fn value(&self) -> &CellValue {
        match self {
            Cell::Plain(value) => value,
            Cell::Ranked { value, .. } => value,
            Cell::Actionable { value, .. } => value,
        }
    }

    /// Comparison key: the sort-key override if present, else the value.
    pub fn sort_value(&self) -> &CellValue {
        match self {
            Cell::Plain(value) => value,
            Cell::Ranked { sort_key, .. } => sort_key,
            Cell::Actionable {
                value, sort_key, ..
            } => sort_key.as_ref().unwrap_or(value),
        }
    }

    pub fn action(&self) -> Option<&CellAction> {
        match self {
            Cell::Actionable { action, .. } => Some(action),
            _ => None,
        }
    }

    pub fn is_actionable(&self) -> bool {
        matches!(self, Cell::Actionable { .. })
    }
}

pub type Row = Vec<Cell>;

/// One named table of a result set. Column index is the only join key
/// between header and body, so row length is enforced at insertion.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    header: Vec<Cell>,
    body: Vec<Row>,
    pub query_str: Option<String>,
    pub debug: Option<String>,
}

impl Table {
    pub fn new(name: impl Into<String>, header: Vec<Cell>) -> Self {
        Table {
            name: name.into(),
            header,
            body: Vec::new(),
            query_str: None,
            debug: None,
        }
    }

    pub fn with_query_str(mut self, query_str: impl Into<String>) -> Self {
        self.query_str = Some(query_str.into());
        self
    }

    pub fn with_debug(mut self, debug: impl Into<String>) -> Self {
        self.debug = Some(debug.into());
        self
    }

    /// Append a body row, rejecting rows that do not match the header width.
    pub fn push_row(&mut self, row: Row) -> Result<(), ResultError> {
        if row.len() != self.header.len() {
            return Err(ResultError::RowLength {
                table: self.name.clone(),
                expected: self.header.len(),
                got: row.len(),
            });
        }
        self.body.push(row);
        Ok(())
    }

    pub fn header(&self) -> &[Cell] {
        &self.header
    }

    pub fn body(&self) -> &[Row] {
        &self.body
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.body.len()
    }
}

/// A query execution may yield multiple tables; order is fixed by the
/// processor that produced them.
pub type ResultSet = Vec<Table>;

/// Convenience constructor for plain text header rows.
pub fn text_header(labels: &[&str]) -> Vec<Cell> {
    labels.iter().map(|label| Cell::plain(*label)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dummy_descriptor() -> QueryDescriptor {
        QueryDescriptor::new("hemibrain", "MATCH (n) RETURN n", |_, _| Ok(Vec::new()))
    }

    #[test]
    fn test_cell_value_from_json() {
        assert_eq!(CellValue::from_json(&json!(null)), CellValue::Null);
        assert_eq!(CellValue::from_json(&json!(42)), CellValue::Int(42));
        assert_eq!(CellValue::from_json(&json!(1.5)), CellValue::Float(1.5));
        assert_eq!(
            CellValue::from_json(&json!("KC-a")),
            CellValue::Text("KC-a".to_string())
        );
        assert_eq!(
            CellValue::from_json(&json!(["alpha", "beta"])),
            CellValue::Text("[\"alpha\",\"beta\"]".to_string())
        );
    }

    #[test]
    fn test_numeric_comparison_spans_int_and_float() {
        assert_eq!(
            CellValue::Int(3).compare(&CellValue::Float(3.5)),
            Ordering::Less
        );
        assert_eq!(
            CellValue::Float(4.0).compare(&CellValue::Int(4)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_text_comparison_is_lexicographic() {
        assert_eq!(
            CellValue::from("alpha").compare(&CellValue::from("beta")),
            Ordering::Less
        );
    }

    #[test]
    fn test_cross_type_comparison_is_total() {
        // The particular order is unspecified, but it must be consistent.
        let a = CellValue::Int(10);
        let b = CellValue::Text("10".to_string());
        assert_eq!(a.compare(&b), b.compare(&a).reverse());
    }

    #[test]
    fn test_sort_value_prefers_override() {
        let plain = Cell::plain(7i64);
        assert_eq!(plain.sort_value(), &CellValue::Int(7));

        let ranked = Cell::ranked("7,021", 7021i64);
        assert_eq!(ranked.sort_value(), &CellValue::Int(7021));
        assert_eq!(ranked.value(), &CellValue::Text("7,021".to_string()));

        let actionable = Cell::ranked_follow_up(12i64, dummy_descriptor(), 99i64);
        assert_eq!(actionable.sort_value(), &CellValue::Int(99));
    }

    #[test]
    fn test_actionable_cell_carries_follow_up() {
        let cell = Cell::follow_up(120i64, dummy_descriptor().as_child());
        assert!(cell.is_actionable());
        let CellAction::FollowUp(query) = cell.action().unwrap();
        assert!(query.is_child);
        // Without an override the display value is the comparison key.
        assert_eq!(cell.sort_value(), &CellValue::Int(120));
    }

    #[test]
    fn test_push_row_rejects_width_mismatch() {
        let mut table = Table::new("Neurons", text_header(&["id", "name"]));
        table
            .push_row(vec![Cell::plain(1i64), Cell::plain("KC")])
            .unwrap();

        let err = table.push_row(vec![Cell::plain(2i64)]).unwrap_err();
        match err {
            ResultError::RowLength {
                expected, got, ..
            } => {
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_null_displays_as_dash() {
        assert_eq!(CellValue::Null.to_string(), "-");
        assert_eq!(CellValue::Int(5).to_string(), "5");
    }
}
