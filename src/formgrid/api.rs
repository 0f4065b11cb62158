//! # API Facade
//!
//! A thin layer over the collection manager and the view engine for clients that
//! want structured results instead of driving the state machines directly.
//!
//! ## Role and Responsibilities
//!
//! - **Dispatches** to [`FieldCollection`] and [`TableView`] operations
//! - **Normalizes inputs** (operation strings into [`FieldOp`]s, raw values into
//!   [`InputEvent`]s, optional export names into configured defaults)
//! - **Returns [`GridResult`]**: the resulting view plus leveled messages
//!
//! No printing, no exit codes. The CLI renders a `GridResult`; another client could
//! serialize it instead.

use crate::collection::{AddPolicy, DeletedInfo, FieldCollection, HostRename, ItemView};
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::export::{ExportFormat, ExportSink};
use crate::field::RawDescriptor;
use crate::table::{Column, Row, RowSummary, TableView};
use crate::variant::{FieldVariant, InputEvent};
use serde::Serialize;
use std::ops::Range;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl GridMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// The page of a table view, as handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePage {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub summary: RowSummary,
    pub page: usize,
    pub total_pages: usize,
    pub window: Range<usize>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TablePage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ItemView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub host_patch: Vec<HostRename>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<DeletedInfo>,
    pub messages: Vec<GridMessage>,
}

impl GridResult {
    pub fn add_message(&mut self, message: GridMessage) {
        self.messages.push(message);
    }

    pub fn with_table(mut self, table: TablePage) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_fields(mut self, fields: Vec<ItemView>) -> Self {
        self.fields = fields;
        self
    }
}

/// Table operations with configured defaults and an export destination.
pub struct TableApi<S: ExportSink> {
    view: TableView,
    config: GridConfig,
    sink: S,
}

impl<S: ExportSink> TableApi<S> {
    pub fn new(rows: Vec<Row>, config: GridConfig, sink: S) -> Result<Self> {
        let view = TableView::new(rows, config.page_size)?.with_paginate(config.paginate);
        Ok(Self { view, config, sink })
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.view = self.view.with_columns(columns);
        self
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn current(&self) -> GridResult {
        GridResult::default().with_table(self.page())
    }

    pub fn search(&mut self, query: &str) -> GridResult {
        self.view.set_query(query);
        self.current()
    }

    pub fn sort(&mut self, key: &str) -> GridResult {
        let mut result = GridResult::default();
        if !self.view.columns().iter().any(|c| c.key == key) {
            result.add_message(GridMessage::warning(format!(
                "No column named {}; rows without it sort first",
                key
            )));
        }
        self.view.set_sort(key);
        result.table = Some(self.page());
        result
    }

    pub fn go_to_page(&mut self, page: usize) -> GridResult {
        self.view.set_page(page);
        self.current()
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<GridResult> {
        self.view.set_page_size(page_size)?;
        Ok(self.current())
    }

    pub fn set_paginate(&mut self, paginate: bool) -> GridResult {
        self.view.set_paginate(paginate);
        self.current()
    }

    /// Exports every row. Failures become a warning message, never an error.
    pub fn export(&mut self, format: ExportFormat, file_name: Option<&str>) -> GridResult {
        let name = file_name.unwrap_or(&self.config.file_name).to_string();
        let options = self.config.export_options();

        let mut result = GridResult::default();
        let count = self.view.source_rows().len();
        if self.view.export(format, &name, &mut self.sink, &options) {
            let message = match format {
                ExportFormat::Clipboard => options.clipboard_notice.clone(),
                ExportFormat::Print => format!("Sent {} rows to print", count),
                _ => format!("Exported {} rows as {}", count, format),
            };
            result.add_message(GridMessage::success(message));
        } else {
            result.add_message(GridMessage::warning(format!("{} export failed", format)));
        }
        result
    }

    fn page(&self) -> TablePage {
        TablePage {
            columns: self.view.columns().to_vec(),
            rows: self.view.page_rows().into_iter().cloned().collect(),
            summary: self.view.summary(),
            page: self.view.page(),
            total_pages: self.view.total_pages(),
            window: self.view.page_window(self.config.displayed_buttons),
        }
    }
}

/// One step against a field collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOp {
    Set { index: usize, value: String },
    Add,
    Delete(usize),
}

impl FromStr for FieldOp {
    type Err = GridError;

    /// `add`, `delete:<i>` or `set:<i>=<value>`.
    fn from_str(s: &str) -> Result<Self> {
        let bad = || GridError::Api(format!("Invalid field operation: {}", s));
        if s == "add" {
            return Ok(FieldOp::Add);
        }
        if let Some(index) = s.strip_prefix("delete:") {
            return index.parse().map(FieldOp::Delete).map_err(|_| bad());
        }
        if let Some(rest) = s.strip_prefix("set:") {
            let (index, value) = rest.split_once('=').ok_or_else(bad)?;
            let index = index.parse().map_err(|_| bad())?;
            return Ok(FieldOp::Set {
                index,
                value: value.to_string(),
            });
        }
        Err(bad())
    }
}

/// Field collection operations with structured results.
pub struct FieldsApi<V: FieldVariant> {
    collection: FieldCollection<V>,
}

impl<V: FieldVariant> FieldsApi<V> {
    pub fn new(host: Vec<RawDescriptor>, policy: AddPolicy, config: &GridConfig) -> Result<Self> {
        let collection = FieldCollection::new(host, policy)
            .with_suffix_template(config.suffix_template()?)
            .with_alphabet(config.alphabet()?);
        Ok(Self { collection })
    }

    pub fn collection(&self) -> &FieldCollection<V> {
        &self.collection
    }

    pub fn current(&self) -> GridResult {
        GridResult::default().with_fields(self.collection.view())
    }

    pub fn apply(&mut self, op: &FieldOp) -> Result<GridResult> {
        let mut result = GridResult::default();
        match op {
            FieldOp::Set { index, value } => {
                let name = self
                    .collection
                    .items()
                    .get(*index)
                    .map(|i| i.key().to_string())
                    .unwrap_or_default();
                let event = InputEvent {
                    name,
                    value: value.clone(),
                    checked: matches!(value.as_str(), "true" | "on" | "1"),
                };
                self.collection.update_value(*index, &event)?;
            }
            FieldOp::Add => match self.collection.add_item() {
                Some(outcome) => {
                    result.add_message(GridMessage::success(format!(
                        "Added {}",
                        outcome.item.key()
                    )));
                    result.host_patch = outcome.host_patch;
                }
                None => result.add_message(GridMessage::info("Adding is disabled.")),
            },
            FieldOp::Delete(index) => match self.collection.delete_item(*index)? {
                Some(info) => {
                    result.add_message(GridMessage::success(format!("Deleted {}", info.key)));
                    result.deleted.push(info);
                }
                None => result.add_message(GridMessage::warning(format!(
                    "Item {} cannot be deleted",
                    index
                ))),
            },
        }
        result.fields = self.collection.view();
        Ok(result)
    }
}
