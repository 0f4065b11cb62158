//! # Export Adapters
//!
//! Each adapter turns rows into a serialized artifact and hands it to an
//! [`ExportSink`], which owns the side effect (writing a file, filling the clipboard,
//! sending to print).
//!
//! | Format      | Adapter          | Sink call      |
//! |-------------|------------------|----------------|
//! | `csv`       | [`csv`]          | `write_file`   |
//! | `xlsx`      | [`xlsx`]         | `write_file`   |
//! | `pdf`       | [`pdf`]          | `write_file`   |
//! | `clipboard` | [`clipboard`]    | `copy_text`    |
//! | `print`     | [`print`]        | `print`        |
//!
//! Adapters return `Result`; callers in the view engine log failures and carry on.

use crate::error::{GridError, Result};
use crate::table::{Column, Row};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub mod clipboard;
pub mod csv;
pub mod pdf;
pub mod print;
pub mod xlsx;

pub use pdf::{Align, ColumnStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Clipboard,
    Csv,
    Xlsx,
    Pdf,
    Print,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Clipboard,
        ExportFormat::Csv,
        ExportFormat::Xlsx,
        ExportFormat::Pdf,
        ExportFormat::Print,
    ];

    /// File extension for formats that produce a file.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ExportFormat::Csv => Some("csv"),
            ExportFormat::Xlsx => Some("xlsx"),
            ExportFormat::Pdf => Some("pdf"),
            ExportFormat::Clipboard | ExportFormat::Print => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "clipboard" | "copy" => Ok(ExportFormat::Clipboard),
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "pdf" => Ok(ExportFormat::Pdf),
            "print" => Ok(ExportFormat::Print),
            other => Err(GridError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportFormat::Clipboard => "clipboard",
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Print => "print",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub sheet_name: String,
    pub clipboard_notice: String,
    /// PDF style overrides keyed by column index.
    pub column_styles: BTreeMap<usize, ColumnStyle>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            clipboard_notice: "Copied to clipboard".to_string(),
            column_styles: BTreeMap::new(),
        }
    }
}

/// Where serialized exports go.
pub trait ExportSink {
    /// Stores a file and returns where it ended up.
    fn write_file(&mut self, file_name: &str, bytes: &[u8]) -> Result<String>;

    fn copy_text(&mut self, text: &str) -> Result<()>;

    fn print(&mut self, text: &str) -> Result<()>;

    fn notify(&mut self, _message: &str) {}
}

/// Writes files into a directory and copies through the OS clipboard.
///
/// Printed output and notices are collected for the caller to display.
#[derive(Debug, Clone, Default)]
pub struct FsSink {
    dir: PathBuf,
    pub printed: Vec<String>,
    pub notices: Vec<String>,
}

impl FsSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            printed: Vec::new(),
            notices: Vec::new(),
        }
    }
}

impl ExportSink for FsSink {
    fn write_file(&mut self, file_name: &str, bytes: &[u8]) -> Result<String> {
        if !self.dir.as_os_str().is_empty() && !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let path = self.dir.join(file_name);
        fs::write(&path, bytes)?;
        Ok(path.display().to_string())
    }

    fn copy_text(&mut self, text: &str) -> Result<()> {
        clipboard::copy_to_clipboard(text)
    }

    fn print(&mut self, text: &str) -> Result<()> {
        self.printed.push(text.to_string());
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

/// Records every call. Used by tests and by hosts that ship bytes elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub files: Vec<(String, Vec<u8>)>,
    pub clipboard: Vec<String>,
    pub printed: Vec<String>,
    pub notices: Vec<String>,
    fail: bool,
}

impl MemorySink {
    /// A sink whose every side effect fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            Err(GridError::Api("sink unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl ExportSink for MemorySink {
    fn write_file(&mut self, file_name: &str, bytes: &[u8]) -> Result<String> {
        self.check()?;
        self.files.push((file_name.to_string(), bytes.to_vec()));
        Ok(file_name.to_string())
    }

    fn copy_text(&mut self, text: &str) -> Result<()> {
        self.check()?;
        self.clipboard.push(text.to_string());
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<()> {
        self.check()?;
        self.printed.push(text.to_string());
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

/// `report` -> `report.csv`; names that already carry the extension are kept.
pub fn file_name_with_extension(file_name: &str, extension: &str) -> String {
    let suffix = format!(".{}", extension);
    if file_name.to_lowercase().ends_with(&suffix) {
        file_name.to_string()
    } else {
        format!("{}{}", file_name, suffix)
    }
}

/// Serializes `rows` for `format` and hands the result to `sink`.
///
/// Returns a description of where the export went.
pub fn run(
    format: ExportFormat,
    columns: &[Column],
    rows: &[Row],
    file_name: &str,
    sink: &mut dyn ExportSink,
    options: &ExportOptions,
) -> Result<String> {
    let bytes = match format {
        ExportFormat::Clipboard => {
            sink.copy_text(&clipboard::rows_to_text(rows))?;
            info!("{}", options.clipboard_notice);
            sink.notify(&options.clipboard_notice);
            return Ok("clipboard".to_string());
        }
        ExportFormat::Print => {
            sink.print(&print::render(columns, rows))?;
            return Ok("print".to_string());
        }
        ExportFormat::Csv => csv::to_csv(rows).into_bytes(),
        ExportFormat::Xlsx => xlsx::to_xlsx(rows, &options.sheet_name)?,
        ExportFormat::Pdf => pdf::to_pdf(columns, rows, &options.column_styles)?,
    };

    let extension = format.extension().unwrap_or_default();
    sink.write_file(&file_name_with_extension(file_name, extension), &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<Row> {
        vec![
            serde_json::from_value(json!({"name": "Ann", "age": 41})).unwrap(),
            serde_json::from_value(json!({"name": "Bo", "age": 7})).unwrap(),
        ]
    }

    #[test]
    fn format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert_eq!("copy".parse::<ExportFormat>().unwrap(), ExportFormat::Clipboard);
        assert!(matches!(
            "docx".parse::<ExportFormat>(),
            Err(GridError::UnknownFormat(_))
        ));
    }

    #[test]
    fn extension_is_appended_once() {
        assert_eq!(file_name_with_extension("report", "csv"), "report.csv");
        assert_eq!(file_name_with_extension("Report.CSV", "csv"), "Report.CSV");
    }

    #[test]
    fn clipboard_export_notifies() {
        let rows = sample();
        let mut sink = MemorySink::default();
        let target = run(
            ExportFormat::Clipboard,
            &Column::from_rows(&rows),
            &rows,
            "ignored",
            &mut sink,
            &ExportOptions::default(),
        )
        .unwrap();
        assert_eq!(target, "clipboard");
        assert_eq!(sink.clipboard, vec!["Ann\t41\nBo\t7"]);
        assert_eq!(sink.notices, vec!["Copied to clipboard"]);
    }

    #[test]
    fn print_export_renders_table() {
        let rows = sample();
        let mut sink = MemorySink::default();
        run(
            ExportFormat::Print,
            &Column::from_rows(&rows),
            &rows,
            "ignored",
            &mut sink,
            &ExportOptions::default(),
        )
        .unwrap();
        assert!(sink.printed[0].contains("Ann"));
        assert!(sink.files.is_empty());
    }

    #[test]
    fn file_exports_are_named_by_format() {
        let rows = sample();
        let columns = Column::from_rows(&rows);
        let mut sink = MemorySink::default();
        for format in [ExportFormat::Csv, ExportFormat::Xlsx, ExportFormat::Pdf] {
            run(format, &columns, &rows, "people", &mut sink, &ExportOptions::default())
                .unwrap();
        }
        let names: Vec<&str> = sink.files.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["people.csv", "people.xlsx", "people.pdf"]);
    }

    #[test]
    fn fs_sink_writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FsSink::new(dir.path().join("out"));
        let target = sink.write_file("a.csv", b"1,2").unwrap();
        assert!(target.ends_with("a.csv"));
        assert_eq!(std::fs::read(dir.path().join("out/a.csv")).unwrap(), b"1,2");
        sink.print("table").unwrap();
        assert_eq!(sink.printed, vec!["table"]);
    }
}
