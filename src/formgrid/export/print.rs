//! Plain fixed-width table for printing.

use crate::table::{cell_text, Column, Row};
use unicode_width::UnicodeWidthStr;

pub fn render(columns: &[Column], rows: &[Row]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| cell_text(row.get(&c.key)).replace('\n', " "))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|line| line[i].width())
                .chain(std::iter::once(c.header.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let headers: Vec<String> = columns.iter().map(|c| c.header.clone()).collect();
    lines.push(render_line(&headers, &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for line in &cells {
        lines.push(render_line(line, &widths));
    }
    lines.join("\n")
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{}{}", cell, " ".repeat(w.saturating_sub(cell.width()))))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}
