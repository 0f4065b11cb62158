//! Delimited text: one line per row, cell values joined with commas.
//!
//! Cells are joined as-is. No header line, no quoting.

use crate::table::{cell_text, Row};

pub fn to_csv(rows: &[Row]) -> String {
    rows.iter()
        .map(|row| {
            row.values()
                .map(|v| cell_text(Some(v)))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
