//! mediform CLI - Command-line interface library
//!
//! This library provides the CLI functionality for mediform, including:
//! - Render: Fill the mediation application form from a JSON file
//! - Upload: Send a document to Google Drive
//! - Generate: Render, upload and share in one step
//! - Inspect: Show what a generated document contains
//! - Serve: The `POST /generate-docx` HTTP endpoint
//!
//! # Binary Usage
//!
//! ```bash
//! # Render a form locally
//! mediform render values.json --output form.docx
//!
//! # Render, upload and print the public link
//! mediform generate values.json --folder 1AbCdEf
//!
//! # Check the table layout of a generated file
//! mediform inspect form.docx --format json
//! ```

pub mod app;
pub mod config;
pub mod logging;
pub mod publish;
pub mod server;

// Re-export main entry point and types
pub use app::{
    generate_command, inspect_command, inspect_document, load_values, render_command,
    serve_command, upload_command,
};
pub use app::{run_cli, DocumentSummary, OutputFormat, TableSummary};
pub use config::Settings;
