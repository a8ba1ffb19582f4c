//! Sort engine for result tables.
//!
//! Index-based stable sorting: rows are never cloned or reordered in the
//! table itself; callers render through the returned index permutation.

use std::cmp::Ordering;

use crate::core::results::{Row, Table};
use crate::error::DisplayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Stable sort of a table's body by one column.
///
/// The comparison key for each row is the cell's sort-key override if
/// present, else its display value. Descending inverts only the key
/// comparison; the original row position remains the tie-break for equal
/// keys in both directions.
pub fn sort_indices(
    table: &Table,
    column: usize,
    direction: SortDirection,
) -> Result<Vec<usize>, DisplayError> {
    if column >= table.column_count() {
        return Err(DisplayError::SortColumn {
            column,
            columns: table.column_count(),
        });
    }

    let body = table.body();
    let mut indices: Vec<usize> = (0..body.len()).collect();
    indices.sort_by(|&a, &b| {
        let keys = body[a][column]
            .sort_value()
            .compare(body[b][column].sort_value());
        let keys = match direction {
            SortDirection::Ascending => keys,
            SortDirection::Descending => keys.reverse(),
        };
        match keys {
            Ordering::Equal => a.cmp(&b),
            ordered => ordered,
        }
    });
    Ok(indices)
}

/// Rows in render order: sorted when a sort column is set, else as produced
/// by the result processor.
pub fn sorted_rows<'a>(
    table: &'a Table,
    sort: Option<(usize, SortDirection)>,
) -> Result<Vec<&'a Row>, DisplayError> {
    match sort {
        None => Ok(table.body().iter().collect()),
        Some((column, direction)) => {
            let indices = sort_indices(table, column, direction)?;
            Ok(indices.into_iter().map(|i| &table.body()[i]).collect())
        }
    }
}
