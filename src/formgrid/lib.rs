//! # Formgrid Architecture
//!
//! Formgrid is a **UI-agnostic form and table state library**. It owns the state of a
//! dynamic list of form fields and of a searchable, sortable, paginated data table,
//! and leaves rendering to whoever embeds it. The bundled binary is one such client.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs, cli/)                         │
//! │  - Parses arguments, loads JSON inputs, prints results      │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over the collection and the view engine      │
//! │  - Returns `GridResult` with leveled messages               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (collection, resolve, compose, sequence, table)       │
//! │  - Pure state machines over Rust types                      │
//! │  - No I/O assumptions whatsoever                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Export (export/)                                           │
//! │  - Format adapters (CSV, XLSX, PDF, clipboard, print)       │
//! │  - Side effects behind the `ExportSink` trait               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust values and returns Rust values. Exports reach
//! the outside world only through an [`export::ExportSink`], so tests run against
//! [`export::MemorySink`] and the binary uses [`export::FsSink`].
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for clients
//! - [`collection`]: Dynamic field collection manager (add, delete, values)
//! - [`resolve`]: Duplicate-key disambiguation with suffix templates
//! - [`compose`]: Sequence-token label composition
//! - [`sequence`]: Numeric and alphabetical sequence tokens
//! - [`field`]: Field descriptors, raw and resolved
//! - [`variant`]: Per-variant value handling (text, select, radio, checkbox)
//! - [`table`]: Table view engine (filter, sort, paginate, export)
//! - [`export`]: Export adapters and sinks
//! - [`config`]: Configuration management
//! - [`error`]: Error types
//! - `cli`: Printing for the binary (not part of the lib API)

pub mod api;
pub mod collection;
pub mod compose;
pub mod config;
pub mod error;
pub mod export;
pub mod field;
pub mod resolve;
pub mod sequence;
pub mod table;
pub mod variant;
