//! CSV export of result panels.
//!
//! Reproduces the legacy download format: for each table a name row padded
//! with commas to the header width, then the header row, then body rows.
//! Every cell is written as its display value followed by a comma, so each
//! line carries a trailing comma. Values are NOT quoted or escaped; a cell
//! value containing a comma corrupts the column count of that line. That
//! gap is preserved deliberately rather than silently fixed.

use std::path::Path;

use crate::core::results::Table;
use crate::error::StorageError;

pub const EXPORT_FILE_NAME: &str = "results.csv";
pub const EXPORT_MEDIA_TYPE: &str = "text/csv";

/// Serialize tables in order; each table contributes its own trailing
/// newline and no blank-line separator.
pub fn to_csv(tables: &[Table]) -> String {
    let mut csv = String::new();

    for table in tables {
        let width = table.column_count();

        // Name row: name in column 0, remaining columns blank.
        csv.push_str(&table.name);
        csv.push(',');
        for _ in 1..width {
            csv.push(',');
        }
        csv.push('\n');

        for cell in table.header() {
            csv.push_str(&cell.value().to_string());
            csv.push(',');
        }
        csv.push('\n');

        // Action cells export only their display value, never their action.
        for row in table.body() {
            for cell in row {
                csv.push_str(&cell.value().to_string());
                csv.push(',');
            }
            csv.push('\n');
        }
    }

    csv
}

pub fn write_csv(tables: &[Table], path: &Path) -> Result<(), StorageError> {
    std::fs::write(path, to_csv(tables)).map_err(|source| StorageError::FileIo {
        path: path.display().to_string(),
        source,
    })
}
