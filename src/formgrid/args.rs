use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "formgrid")]
#[command(about = "Dynamic form fields and data tables from JSON", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search, sort, page and export rows from a JSON array
    #[command(alias = "t")]
    Table {
        /// JSON file holding an array of row objects
        rows: PathBuf,

        /// Case-insensitive text to filter rows by
        #[arg(short, long)]
        search: Option<String>,

        /// Column to sort by (repeat to toggle direction)
        #[arg(long)]
        sort: Vec<String>,

        /// Page to show, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Rows per page (defaults to the configured page size)
        #[arg(long)]
        page_size: Option<usize>,

        /// Show every row on one page
        #[arg(long)]
        no_paginate: bool,

        /// Export every row (csv, xlsx, pdf, clipboard, print)
        #[arg(short, long)]
        export: Option<String>,

        /// Export file name, without extension
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Resolve a field group and apply add, delete and set operations
    #[command(alias = "f")]
    Fields {
        /// JSON file with `fields` and an optional `policy`
        fields: PathBuf,

        /// Field variant (text, select, radio, checkbox)
        #[arg(long, default_value = "text")]
        variant: String,

        /// Number of items to add
        #[arg(long, default_value_t = 0)]
        add: usize,

        /// Item indexes to delete, applied after adding
        #[arg(long)]
        delete: Vec<usize>,

        /// Values to set, as INDEX=VALUE, applied first
        #[arg(long)]
        set: Vec<String>,
    },

    /// Print the label for an item index
    Label {
        /// Sequence kind (numeric, alphabetical, anything else disables)
        kind: String,

        /// Zero-based item index
        index: usize,

        /// Base label text
        #[arg(long, default_value = "")]
        base: String,

        /// Put the token before the base text
        #[arg(long)]
        prefix: bool,

        /// Put the token after the base text
        #[arg(long)]
        suffix: bool,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (e.g., page-size)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
