//! # SlideMerge CLI
//!
//! Generates one slide per data row from a saved slide layout.
//!
//! ## Usage
//!
//! ```bash
//! # Export a deck
//! slidemerge export --design badge.json --rows people.json --images photos/ --out deck.json
//!
//! # Check a design against the data
//! slidemerge check --design badge.json --rows people.json
//!
//! # Manage the design library
//! slidemerge library save badge badge.json
//! slidemerge library list
//! slidemerge library remove badge
//! ```

use clap::{Parser, Subcommand};
use slidemerge_app::{AppConfig, AppError, ExportRequest, library_list, library_remove, library_save, run_check, run_export};
use std::io::Write;
use std::path::PathBuf;

/// SlideMerge - data-driven slide generator
#[derive(Parser, Debug)]
#[command(name = "slidemerge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Design library directory (defaults to the platform data directory)
    #[arg(long, global = true, value_name = "DIR")]
    library_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate one slide per data row
    Export {
        /// Design document (JSON)
        #[arg(long, value_name = "FILE")]
        design: PathBuf,

        /// Data rows: a JSON array of objects
        #[arg(long, value_name = "FILE")]
        rows: PathBuf,

        /// Directory of images referenced by the rows
        #[arg(long, value_name = "DIR")]
        images: Option<PathBuf>,

        /// Background image for every slide
        #[arg(long, value_name = "FILE")]
        background: Option<PathBuf>,

        /// Output deck manifest
        #[arg(long, value_name = "FILE")]
        out: PathBuf,

        /// Indent the output JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Validate a design and report unbound elements
    Check {
        /// Design document (JSON)
        #[arg(long, value_name = "FILE")]
        design: PathBuf,

        /// Data rows to check the design's columns against
        #[arg(long, value_name = "FILE")]
        rows: Option<PathBuf>,
    },
    /// Manage saved designs
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },
}

#[derive(Subcommand, Debug)]
enum LibraryAction {
    /// List saved designs
    List,
    /// Save a design file under a name
    Save { name: String, file: PathBuf },
    /// Remove a saved design
    Remove { name: String },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig {
        library_dir: cli.library_dir,
        ..AppConfig::default()
    };

    match cli.command {
        Commands::Export {
            design,
            rows,
            images,
            background,
            out,
            pretty,
        } => {
            config.pretty = pretty;
            let request = ExportRequest {
                design,
                rows,
                images,
                background,
                out,
            };
            let summary = run_export(&config, &request, |p| {
                eprint!("\rExporting slide {}/{} ({}%)", p.done, p.total, p.percent);
                std::io::stderr().flush().ok();
            })?;
            eprintln!();
            println!(
                "Wrote {} slides ({} bytes) to {}",
                summary.slides,
                summary.bytes,
                request.out.display()
            );
        }
        Commands::Check { design, rows } => {
            let report = run_check(&design, rows.as_deref())?;
            println!("{} elements", report.elements);
            if !report.columns.is_empty() {
                println!("Columns: {}", report.columns.join(", "));
            }
            for name in &report.missing_columns {
                println!("Missing column: {}", name);
            }
            for label in &report.unbound {
                println!("Unbound element: {}", label);
            }
            if report.is_clean() {
                println!("OK");
            }
        }
        Commands::Library { action } => {
            let storage = config.open_library()?;
            match action {
                LibraryAction::List => {
                    let names = library_list(&storage)?;
                    if names.is_empty() {
                        println!("No saved designs");
                    }
                    for name in names {
                        println!("  {}", name);
                    }
                }
                LibraryAction::Save { name, file } => {
                    library_save(&storage, &name, &file)?;
                    println!("Saved {}", name);
                }
                LibraryAction::Remove { name } => {
                    if library_remove(&storage, &name)? {
                        println!("Removed {}", name);
                    } else {
                        println!("No design named {}", name);
                    }
                }
            }
        }
    }
    Ok(())
}
