//! CLI binary for edgequake-report.
//!
//! `serve` runs the HTTP service; `generate` runs the same pipeline on local
//! files and writes the `.docx` atomically.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_report::{generate_to_file, serve, ReportConfig, ReportRequest, ServerConfig};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ─────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── CLI definition ──────────────────────────────────────────────────────────

/// Build .docx reports from coordinates, a trend chart and PDF pages.
#[derive(Parser, Debug)]
#[command(name = "report-server", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    shared: SharedArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "REPORT_BIND", default_value = "0.0.0.0:8000")]
        bind: SocketAddr,

        /// Largest accepted request body, in MiB.
        #[arg(long, env = "REPORT_MAX_UPLOAD_MB", default_value_t = 100)]
        max_upload_mb: usize,
    },

    /// Generate one report from local files.
    Generate {
        /// Text for the Description section.
        #[arg(short, long)]
        description: Option<String>,

        /// Coordinates as JSON, e.g. '[[0,0],[1,2]]'. Ignored when --xlsx is given.
        #[arg(long)]
        coords: Option<String>,

        /// Spreadsheet with x in column A and y in column B (row 1 is a header).
        #[arg(long)]
        xlsx: Option<PathBuf>,

        /// PDF whose pages are appended as images.
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// Output .docx path.
        #[arg(short, long, default_value = "generated_document.docx")]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct SharedArgs {
    /// Rendering DPI for PDF pages (72–400).
    #[arg(long, global = true, env = "REPORT_DPI", default_value_t = 150)]
    dpi: u32,

    /// pdfium library file or directory.
    #[arg(long, global = true, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Largest accepted PDF, in MiB.
    #[arg(long, global = true, env = "REPORT_MAX_DOCUMENT_MB", default_value_t = 64)]
    max_document_mb: usize,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "REPORT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "REPORT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.shared.verbose {
        "debug"
    } else if cli.shared.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli.shared)?;

    match cli.command {
        Command::Serve {
            bind,
            max_upload_mb,
        } => {
            let server = ServerConfig {
                bind,
                max_upload_bytes: max_upload_mb * 1024 * 1024,
            };
            serve(config, server)
                .await
                .with_context(|| format!("Server on {bind} failed"))?;
        }
        Command::Generate {
            description,
            coords,
            xlsx,
            pdf,
            output,
        } => {
            if coords.is_none() && xlsx.is_none() {
                bail!("Either --coords or --xlsx must be provided");
            }
            let spreadsheet = match xlsx {
                Some(path) => Some(
                    tokio::fs::read(&path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                ),
                None => None,
            };
            let document = match pdf {
                Some(path) => Some(
                    tokio::fs::read(&path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                ),
                None => None,
            };
            let request = ReportRequest {
                description,
                coordinates: coords,
                spreadsheet,
                document,
            };

            let report = generate_to_file(request, &output, &config)
                .await
                .context("Report generation failed")?;

            if !cli.shared.quiet {
                eprintln!(
                    "{}  {} points, {} pages  {}ms  →  {}",
                    green("✔"),
                    report.coordinates.len(),
                    report.page_count,
                    report.stats.total_duration_ms,
                    bold(&output.display().to_string()),
                );
                if let Some(t) = report.trend {
                    eprintln!("   {}", dim(&t.annotation()));
                }
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ReportConfig`.
fn build_config(args: &SharedArgs) -> Result<ReportConfig> {
    let mut builder = ReportConfig::builder()
        .dpi(args.dpi)
        .max_document_bytes(args.max_document_mb * 1024 * 1024);
    if let Some(ref path) = args.pdfium_lib {
        builder = builder.pdfium_lib_path(path);
    }
    builder.build().context("Invalid configuration")
}
