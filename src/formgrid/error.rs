use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Index {index} out of range for collection of {len} items")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Page size must be at least 1")]
    InvalidPageSize,

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Workbook error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, GridError>;
