//! # Tabular View Engine
//!
//! [`TableView`] holds search, sort and pagination state over a snapshot of host rows.
//! Rendering is somebody else's job; this module only decides which rows are visible
//! and in what order.
//!
//! ## State
//!
//! - `filtered` is a list of indexes into the source rows. It is rebuilt from the source
//!   and the query on every query change, and reordered in place by sorting.
//! - Changing the query keeps an active sort (it is re-applied to the new rows).
//!   Changing the page size or the rows drops it.
//! - Sorting on the active key again reverses the current order rather than sorting
//!   descending. The two agree only when the rows were already ascending.
//!
//! Export always works on every source row, whatever the current view shows.

use crate::error::{GridError, Result};
use crate::export::{self, ExportFormat, ExportOptions, ExportSink};
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

pub type Row = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    pub header: String,
}

impl Column {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
        }
    }

    /// One column per key of the first row, headed by the key itself.
    pub fn from_rows(rows: &[Row]) -> Vec<Column> {
        rows.first()
            .map(|row| row.keys().map(|k| Column::new(k.clone(), k.clone())).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub key: String,
    pub ascending: bool,
}

/// The "Showing X to Y of Z entries" line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowSummary {
    pub from: usize,
    pub to: usize,
    pub total: usize,
}

impl fmt::Display for RowSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} to {} of {} entries",
            self.from, self.to, self.total
        )
    }
}

/// The string form of a cell, as searched and exported.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Natural ordering of two cells: missing/null first, then by kind.
pub fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (a, b) => cell_text(a).cmp(&cell_text(b)),
    }
}

#[derive(Debug, Clone)]
pub struct TableView {
    source: Vec<Row>,
    columns: Vec<Column>,
    query: String,
    filtered: Vec<usize>,
    sort: Option<SortState>,
    page: usize,
    page_size: usize,
    paginate: bool,
}

impl TableView {
    pub fn new(rows: Vec<Row>, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(GridError::InvalidPageSize);
        }
        let columns = Column::from_rows(&rows);
        let filtered = (0..rows.len()).collect();
        Ok(Self {
            source: rows,
            columns,
            query: String::new(),
            filtered,
            sort: None,
            page: 0,
            page_size,
            paginate: true,
        })
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_paginate(mut self, paginate: bool) -> Self {
        self.paginate = paginate;
        self
    }

    /// New host rows: re-filter with the current query, drop the sort, back to page 0.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        if self.columns.is_empty() {
            self.columns = Column::from_rows(&rows);
        }
        self.source = rows;
        self.sort = None;
        self.page = 0;
        self.refilter();
        debug!("table rows replaced: {} rows", self.source.len());
    }

    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
        self.page = 0;
        self.refilter();
        if let Some(sort) = self.sort.clone() {
            self.sort_ascending_by(&sort.key);
            if !sort.ascending {
                self.filtered.reverse();
            }
        }
        debug!(
            "table query {:?} matched {} of {} rows",
            self.query,
            self.filtered.len(),
            self.source.len()
        );
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(GridError::InvalidPageSize);
        }
        self.page_size = page_size;
        self.page = 0;
        self.sort = None;
        self.refilter();
        Ok(())
    }

    /// Sorts ascending on a new key, or reverses the current order on the active key.
    pub fn set_sort(&mut self, key: &str) {
        let same_key = self.sort.as_ref().is_some_and(|s| s.key == key);
        if same_key {
            self.filtered.reverse();
            if let Some(active) = self.sort.as_mut() {
                active.ascending = !active.ascending;
            }
        } else {
            self.sort_ascending_by(key);
            self.sort = Some(SortState {
                key: key.to_string(),
                ascending: true,
            });
        }
        debug!("table sorted by {} ({:?})", key, self.sort);
    }

    pub fn set_paginate(&mut self, paginate: bool) {
        self.paginate = paginate;
        self.page = 0;
    }

    /// Jumps to `page`, clamped to the last page.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.min(self.total_pages().saturating_sub(1));
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn paginate(&self) -> bool {
        self.paginate
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn source_rows(&self) -> &[Row] {
        &self.source
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn filtered_rows(&self) -> Vec<&Row> {
        self.filtered.iter().map(|&i| &self.source[i]).collect()
    }

    /// The rows on the current page, or all filtered rows when not paginating.
    pub fn page_rows(&self) -> Vec<&Row> {
        if !self.paginate {
            return self.filtered_rows();
        }
        self.filtered
            .iter()
            .skip(self.page * self.page_size)
            .take(self.page_size)
            .map(|&i| &self.source[i])
            .collect()
    }

    pub fn total_pages(&self) -> usize {
        if !self.paginate {
            return 1;
        }
        self.filtered.len().div_ceil(self.page_size)
    }

    pub fn summary(&self) -> RowSummary {
        let total = self.filtered.len();
        if !self.paginate {
            return RowSummary {
                from: 1,
                to: total,
                total,
            };
        }
        let from = self.page * self.page_size + 1;
        RowSummary {
            from,
            to: from.saturating_add(self.page_size - 1).min(total),
            total,
        }
    }

    /// Page-number buttons to show, centered on the current page where possible.
    pub fn page_window(&self, displayed_buttons: usize) -> Range<usize> {
        let total = self.total_pages();
        let max_start = total.saturating_sub(displayed_buttons);
        let start = self
            .page
            .saturating_sub(displayed_buttons / 2)
            .min(max_start);
        let end = start.saturating_add(displayed_buttons).min(total);
        start..end
    }

    /// Hands every source row to the adapter for `format`.
    ///
    /// Failures stay here: they are logged and reported as `false`.
    pub fn export(
        &self,
        format: ExportFormat,
        file_name: &str,
        sink: &mut dyn ExportSink,
        options: &ExportOptions,
    ) -> bool {
        match export::run(format, &self.columns, &self.source, file_name, sink, options) {
            Ok(target) => {
                info!("{} export of {} rows to {}", format, self.source.len(), target);
                true
            }
            Err(e) => {
                warn!("{} export failed: {}", format, e);
                false
            }
        }
    }

    fn refilter(&mut self) {
        let needle = self.query.to_lowercase();
        self.filtered = self
            .source
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                needle.is_empty()
                    || row
                        .values()
                        .any(|v| cell_text(Some(v)).to_lowercase().contains(&needle))
            })
            .map(|(i, _)| i)
            .collect();
    }

    fn sort_ascending_by(&mut self, key: &str) {
        let source = &self.source;
        self.filtered
            .sort_by(|&a, &b| compare_cells(source[a].get(key), source[b].get(key)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::MemorySink;
    use serde_json::json;

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    fn names(view: &TableView) -> Vec<String> {
        view.filtered_rows()
            .iter()
            .map(|r| cell_text(r.get("name")))
            .collect()
    }

    fn ages(view: &TableView) -> Vec<i64> {
        view.filtered_rows()
            .iter()
            .map(|r| r["age"].as_i64().unwrap())
            .collect()
    }

    fn people() -> Vec<Row> {
        rows(vec![
            json!({"name": "John Doe", "age": 30}),
            json!({"name": "Jane Doe", "age": 10}),
            json!({"name": "Bob Roe", "age": 20}),
        ])
    }

    fn numbered(n: usize) -> Vec<Row> {
        rows((0..n).map(|i| json!({"n": i})).collect())
    }

    #[test]
    fn query_matches_any_field_case_insensitively() {
        let mut view = TableView::new(people(), 10).unwrap();
        view.set_page(0);
        view.set_query("doe");
        assert_eq!(names(&view), vec!["John Doe", "Jane Doe"]);
        view.set_query("20");
        assert_eq!(names(&view), vec!["Bob Roe"]);
        view.set_query("");
        assert_eq!(view.filtered_len(), 3);
    }

    #[test]
    fn query_resets_page() {
        let mut view = TableView::new(numbered(30), 10).unwrap();
        view.set_page(2);
        assert_eq!(view.page(), 2);
        view.set_query("1");
        assert_eq!(view.page(), 0);
    }

    #[test]
    fn second_sort_reverses_current_order() {
        let mut view = TableView::new(people(), 10).unwrap();
        view.set_sort("age");
        assert_eq!(ages(&view), vec![10, 20, 30]);
        assert!(view.sort().unwrap().ascending);
        view.set_sort("age");
        assert_eq!(ages(&view), vec![30, 20, 10]);
        assert!(!view.sort().unwrap().ascending);
    }

    #[test]
    fn reversal_is_not_a_resort() {
        let mut view = TableView::new(
            rows(vec![
                json!({"name": "a", "age": 1}),
                json!({"name": "b", "age": 1}),
                json!({"name": "c", "age": 0}),
            ]),
            10,
        )
        .unwrap();
        view.set_sort("age");
        assert_eq!(names(&view), vec!["c", "a", "b"]);
        view.set_sort("age");
        // a stable descending sort would give a, b, c
        assert_eq!(names(&view), vec!["b", "a", "c"]);
        view.set_sort("name");
        assert_eq!(names(&view), vec!["a", "b", "c"]);
    }

    #[test]
    fn sort_survives_query_but_not_page_size() {
        let mut view = TableView::new(people(), 10).unwrap();
        view.set_sort("age");
        view.set_sort("age");
        view.set_query("doe");
        assert_eq!(ages(&view), vec![30, 10]);
        view.set_page_size(5).unwrap();
        assert!(view.sort().is_none());
        assert_eq!(ages(&view), vec![30, 10]);
        view.set_query("");
        assert_eq!(ages(&view), vec![30, 10, 20]);
    }

    #[test]
    fn set_rows_drops_sort() {
        let mut view = TableView::new(people(), 10).unwrap();
        view.set_sort("age");
        view.set_rows(people());
        assert!(view.sort().is_none());
        assert_eq!(ages(&view), vec![30, 10, 20]);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(matches!(
            TableView::new(vec![], 0),
            Err(GridError::InvalidPageSize)
        ));
        let mut view = TableView::new(vec![], 5).unwrap();
        assert!(view.set_page_size(0).is_err());
        assert_eq!(view.page_size(), 5);
    }

    #[test]
    fn paginates_filtered_rows() {
        let mut view = TableView::new(numbered(25), 10).unwrap();
        assert_eq!(view.total_pages(), 3);
        view.set_page(2);
        let page: Vec<i64> = view.page_rows().iter().map(|r| r["n"].as_i64().unwrap()).collect();
        assert_eq!(page, (20..25).collect::<Vec<_>>());
        view.set_page(9);
        assert_eq!(view.page(), 2);
        view.next_page();
        assert_eq!(view.page(), 2);
        view.prev_page();
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn no_pagination_shows_everything() {
        let view = TableView::new(numbered(25), 10).unwrap().with_paginate(false);
        assert_eq!(view.page_rows().len(), 25);
        assert_eq!(view.summary().to_string(), "Showing 1 to 25 of 25 entries");
    }

    #[test]
    fn summary_line() {
        let mut view = TableView::new(numbered(25), 10).unwrap();
        assert_eq!(view.summary().to_string(), "Showing 1 to 10 of 25 entries");
        view.set_page(2);
        assert_eq!(
            view.summary(),
            RowSummary {
                from: 21,
                to: 25,
                total: 25
            }
        );
        view.set_query("no such row");
        assert_eq!(view.summary().to_string(), "Showing 1 to 0 of 0 entries");
    }

    #[test]
    fn huge_page_size_does_not_overflow() {
        let view = TableView::new(numbered(3), usize::MAX).unwrap();
        assert_eq!(view.summary().to_string(), "Showing 1 to 3 of 3 entries");
        assert_eq!(view.total_pages(), 1);
        assert_eq!(view.page_rows().len(), 3);
        assert_eq!(view.page_window(usize::MAX), 0..1);
    }

    #[test]
    fn page_size_change_returns_to_first_page() {
        let mut view = TableView::new(numbered(50), 10).unwrap();
        view.set_page(2);
        assert_eq!(view.page(), 2);
        view.set_page_size(5).unwrap();
        assert_eq!(view.page(), 0);
        assert_eq!(view.summary().to_string(), "Showing 1 to 5 of 50 entries");
    }

    #[test]
    fn page_window_centers_and_clamps() {
        let mut view = TableView::new(numbered(200), 10).unwrap();
        assert_eq!(view.total_pages(), 20);
        assert_eq!(view.page_window(5), 0..5);
        view.set_page(19);
        assert_eq!(view.page_window(5), 15..20);
        view.set_page(10);
        assert_eq!(view.page_window(5), 8..13);
    }

    #[test]
    fn page_window_with_few_pages() {
        let view = TableView::new(numbered(25), 10).unwrap();
        assert_eq!(view.page_window(5), 0..3);
    }

    #[test]
    fn compare_cells_orders_by_kind() {
        assert_eq!(compare_cells(Some(&json!(2)), Some(&json!(10))), Ordering::Less);
        assert_eq!(compare_cells(Some(&json!("b")), Some(&json!("a"))), Ordering::Greater);
        assert_eq!(compare_cells(None, Some(&json!(0))), Ordering::Less);
        assert_eq!(compare_cells(Some(&Value::Null), None), Ordering::Equal);
        assert_eq!(compare_cells(Some(&json!(false)), Some(&json!(true))), Ordering::Less);
    }

    #[test]
    fn columns_come_from_first_row() {
        let view = TableView::new(people(), 10).unwrap();
        let keys: Vec<&str> = view.columns().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "age"]);
    }

    #[test]
    fn column_order_follows_parsed_host_json() {
        let parsed: Value =
            serde_json::from_str(r#"[{"zeta": 1, "alpha": "x", "mid": true}]"#).unwrap();
        let host: Vec<Row> = serde_json::from_value(parsed).unwrap();
        let view = TableView::new(host, 10).unwrap();
        let keys: Vec<&str> = view.columns().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);

        let mut sink = MemorySink::default();
        assert!(view.export(ExportFormat::Csv, "t", &mut sink, &ExportOptions::default()));
        assert_eq!(sink.files[0].1, b"1,x,true".to_vec());
    }

    #[test]
    fn export_uses_all_source_rows() {
        let mut view = TableView::new(people(), 1).unwrap();
        view.set_query("roe");
        let mut sink = MemorySink::default();
        assert!(view.export(ExportFormat::Csv, "people", &mut sink, &ExportOptions::default()));
        let (name, bytes) = &sink.files[0];
        assert_eq!(name, "people.csv");
        assert_eq!(
            String::from_utf8(bytes.clone()).unwrap(),
            "John Doe,30\nJane Doe,10\nBob Roe,20"
        );
    }

    #[test]
    fn export_failure_is_swallowed() {
        let view = TableView::new(people(), 10).unwrap();
        let mut sink = MemorySink::failing();
        assert!(!view.export(ExportFormat::Csv, "people", &mut sink, &ExportOptions::default()));
    }
}
