//! # Configuration
//!
//! `GridConfig` is stored as `formgrid.json` in the config directory. A missing file
//! means defaults; unknown keys in the file are ignored.
//!
//! | Key                 | Default               |
//! |---------------------|-----------------------|
//! | `page-size`         | `10`                  |
//! | `displayed-buttons` | `5`                   |
//! | `paginate`          | `true`                |
//! | `alphabet`          | `abcdefghijklmnopqrstuvwxyz` |
//! | `suffix-template`   | `[{n}]`               |
//! | `file-name`         | `export`              |
//! | `sheet-name`        | `Sheet1`              |
//! | `clipboard-notice`  | `Copied to clipboard` |

use crate::error::{GridError, Result};
use crate::export::ExportOptions;
use crate::resolve::SuffixTemplate;
use crate::sequence::{Alphabet, DEFAULT_ALPHABET};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "formgrid.json";

pub const KEYS: [&str; 8] = [
    "page-size",
    "displayed-buttons",
    "paginate",
    "alphabet",
    "suffix-template",
    "file-name",
    "sheet-name",
    "clipboard-notice",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    pub page_size: usize,
    pub displayed_buttons: usize,
    pub paginate: bool,
    pub alphabet: String,
    pub suffix_template: String,
    pub file_name: String,
    pub sheet_name: String,
    pub clipboard_notice: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            displayed_buttons: 5,
            paginate: true,
            alphabet: DEFAULT_ALPHABET.to_string(),
            suffix_template: "[{n}]".to_string(),
            file_name: "export".to_string(),
            sheet_name: "Sheet1".to_string(),
            clipboard_notice: "Copied to clipboard".to_string(),
        }
    }
}

impl GridConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: GridConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory, creating it when needed
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        Ok(match key {
            "page-size" => self.page_size.to_string(),
            "displayed-buttons" => self.displayed_buttons.to_string(),
            "paginate" => self.paginate.to_string(),
            "alphabet" => self.alphabet.clone(),
            "suffix-template" => self.suffix_template.clone(),
            "file-name" => self.file_name.clone(),
            "sheet-name" => self.sheet_name.clone(),
            "clipboard-notice" => self.clipboard_notice.clone(),
            other => return Err(unknown_key(other)),
        })
    }

    /// Sets a value by its dashed key, validating it first.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "page-size" => self.page_size = parse_positive(key, value)?,
            "displayed-buttons" => self.displayed_buttons = parse_positive(key, value)?,
            "paginate" => {
                self.paginate = value
                    .parse()
                    .map_err(|_| GridError::Config(format!("{} must be true or false", key)))?
            }
            "alphabet" => {
                Alphabet::new(value)?;
                self.alphabet = value.to_string();
            }
            "suffix-template" => {
                SuffixTemplate::parse(value)?;
                self.suffix_template = value.to_string();
            }
            "file-name" => self.file_name = value.to_string(),
            "sheet-name" => self.sheet_name = value.to_string(),
            "clipboard-notice" => self.clipboard_notice = value.to_string(),
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }

    pub fn alphabet(&self) -> Result<Alphabet> {
        Alphabet::new(&self.alphabet)
    }

    pub fn suffix_template(&self) -> Result<SuffixTemplate> {
        SuffixTemplate::parse(&self.suffix_template)
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            sheet_name: self.sheet_name.clone(),
            clipboard_notice: self.clipboard_notice.clone(),
            ..Default::default()
        }
    }
}

fn unknown_key(key: &str) -> GridError {
    GridError::Config(format!(
        "Unknown config key: {} (expected one of {})",
        key,
        KEYS.join(", ")
    ))
}

fn parse_positive(key: &str, value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(GridError::Config(format!(
            "{} must be a positive number, got {}",
            key, value
        ))),
    }
}
