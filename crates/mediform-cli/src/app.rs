//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;

use mediform_core::{write_docx, FormValues};
use mediform_drive::public_view_url;
use mediform_ooxml::Document;

use crate::config::Settings;
use crate::logging;
use crate::publish::render_and_upload;

/// Output format for `inspect`
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tool consumption
    Json,
}

#[derive(Parser)]
#[command(name = "mediform")]
#[command(author, version, about = "Mediation application form generator", long_about = None)]
struct Cli {
    /// Configuration file (default: ./mediform.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a form from a JSON file of field values
    Render {
        /// Input JSON file (APPLICANT_NAME, DEFENDANT_NAME, ...)
        input: PathBuf,

        /// Output DOCX file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a DOCX file to Google Drive
    Upload {
        /// File to upload
        input: PathBuf,

        /// Destination Drive folder id
        #[arg(long)]
        folder: Option<String>,

        /// Share the file with anyone holding the link
        #[arg(long)]
        public: bool,
    },

    /// Render a form, upload it, share it, and print the link
    Generate {
        /// Input JSON file of field values
        input: PathBuf,

        /// Destination Drive folder id
        #[arg(long)]
        folder: Option<String>,
    },

    /// Show the text and table layout of a DOCX file
    Inspect {
        /// Input DOCX file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Serve the HTTP form generation endpoint
    Serve {
        /// Listen address (overrides server.addr)
        #[arg(long)]
        addr: Option<String>,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render { input, output } => {
            render_command(&input, output.as_deref(), &settings)?;
        }
        Commands::Upload {
            input,
            folder,
            public,
        } => {
            let url = upload_command(&input, folder.as_deref(), public, &settings)?;
            println!("{}", url);
        }
        Commands::Generate { input, folder } => {
            let folder = folder.or_else(|| settings.drive.folder_id.clone());
            let url = generate_command(&input, folder.as_deref(), &settings)?;
            println!("{}", url);
        }
        Commands::Inspect { input, format } => {
            inspect_command(&input, format)?;
        }
        Commands::Serve { addr } => {
            serve_command(addr.as_deref(), settings)?;
        }
    }

    Ok(())
}

/// Read field values from a JSON file
pub fn load_values(input: &Path) -> Result<FormValues> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    FormValues::from_json(&content)
        .with_context(|| format!("Invalid form values in {}", input.display()))
}

/// Execute the render command; returns the output path
pub fn render_command(input: &Path, output: Option<&Path>, settings: &Settings) -> Result<PathBuf> {
    let values = load_values(input)?;

    // Default output: input with .docx extension
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_extension("docx"),
    };

    write_docx(&settings.style, &values, &output_path)
        .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;

    println!("Rendered: {}", output_path.display());
    Ok(output_path)
}

/// Execute the upload command; returns the file's browser link
pub fn upload_command(
    input: &Path,
    folder: Option<&str>,
    public: bool,
    settings: &Settings,
) -> Result<String> {
    let uploader = settings.drive.uploader().with_context(|| {
        format!(
            "Failed to load Drive credentials: {}",
            settings.drive.credentials.display()
        )
    })?;
    let folder = folder.or(settings.drive.folder_id.as_deref());

    let file_id = uploader
        .upload_file(input, folder)
        .with_context(|| format!("Failed to upload {}", input.display()))?;
    if public {
        uploader
            .make_public(&file_id)
            .with_context(|| format!("Failed to share file {}", file_id))?;
    }
    debug!(%file_id, public, "Upload complete");
    Ok(public_view_url(&file_id))
}

/// Execute the generate command; returns the public link
pub fn generate_command(input: &Path, folder: Option<&str>, settings: &Settings) -> Result<String> {
    let values = load_values(input)?;
    let url = render_and_upload(&settings.style, &settings.drive, folder, &values)?;
    Ok(url)
}

/// Text and table layout of a document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub paragraphs: Vec<String>,
    pub tables: Vec<TableSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: usize,
    /// Text of each physical cell, row by row
    pub cells: Vec<Vec<String>>,
    /// Grid span of each physical cell, row by row
    pub spans: Vec<Vec<usize>>,
}

impl DocumentSummary {
    pub fn of(doc: &Document) -> Self {
        Self {
            paragraphs: doc.paragraphs().map(|p| p.text()).collect(),
            tables: doc
                .tables()
                .map(|t| TableSummary {
                    rows: t.row_count(),
                    columns: t.column_count(),
                    cells: t
                        .rows
                        .iter()
                        .map(|r| r.cells.iter().map(|c| c.text()).collect())
                        .collect(),
                    spans: t
                        .rows
                        .iter()
                        .map(|r| r.cells.iter().map(|c| c.grid_span).collect())
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Summarize a DOCX file
pub fn inspect_document(input: &Path) -> Result<DocumentSummary> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let doc = Document::open(input)
        .with_context(|| format!("Failed to open DOCX file: {}", input.display()))?;
    Ok(DocumentSummary::of(&doc))
}

/// Execute the inspect command
pub fn inspect_command(input: &Path, format: OutputFormat) -> Result<()> {
    let summary = inspect_document(input)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            for para in &summary.paragraphs {
                println!("{}", para.replace('\n', " / "));
            }
            for (idx, table) in summary.tables.iter().enumerate() {
                println!();
                println!("Table {} ({} x {})", idx + 1, table.rows, table.columns);
                for (row, cells) in table.cells.iter().enumerate() {
                    let line = cells
                        .iter()
                        .map(|c| c.replace('\n', " / "))
                        .collect::<Vec<_>>()
                        .join(" | ");
                    println!("  {:>2}: {}", row, line);
                }
            }
        }
    }

    Ok(())
}

/// Execute the serve command
pub fn serve_command(addr: Option<&str>, settings: Settings) -> Result<()> {
    let addr = addr
        .map(str::to_string)
        .unwrap_or_else(|| settings.server.addr.clone());
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(crate::server::serve(settings, &addr))
}
