//! sdfgen: Command-line signed distance field generator.
//!
//! Reads a closed OBJ triangle mesh, samples its signed distance on a
//! regular grid and splices the result into an HTML/JavaScript template at
//! every `${SDF}` marker.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=mesh_sdf=info` - Basic operation logging
//! - `RUST_LOG=mesh_sdf=debug` - Detailed progress logging
//! - `RUST_LOG=mesh_sdf::timing=debug` - Per-phase timing
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # bunny.obj -> bunny.html, 0.01 cells with 2 cells of padding
//! sdfgen generate bunny.obj viewer.html 0.01 2
//!
//! # Preview the grid size first
//! sdfgen info bunny.obj 0.01 2
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{generate, info};

/// sdfgen - Signed distance fields from triangle meshes.
///
/// Sample a closed OBJ mesh on a regular grid and write the field into a
/// JavaScript template.
#[derive(Parser)]
#[command(name = "sdfgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a distance field and fill a template with it
    Generate {
        /// Input mesh file (.obj)
        input: PathBuf,

        /// Template file containing one or more ${SDF} markers
        template: PathBuf,

        /// Grid cell size in mesh units
        dx: f64,

        /// Empty cells around the mesh bounding box (at least 1)
        padding: usize,

        /// Output file path [default: input with an .html extension]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Parameter file (TOML, or JSON by extension)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip the sweep; cells far from the surface keep the largest float
        #[arg(long)]
        no_sweep: bool,

        /// Run on a single thread
        #[arg(long)]
        serial: bool,
    },

    /// Display mesh statistics and the grid that would be generated
    Info {
        /// Input mesh file (.obj)
        input: PathBuf,

        /// Grid cell size in mesh units
        dx: f64,

        /// Empty cells around the mesh bounding box (at least 1)
        padding: usize,
    },
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "mesh_sdf=info",
            2 => "mesh_sdf=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Generate {
            input,
            template,
            dx,
            padding,
            output,
            config,
            no_sweep,
            serial,
        } => generate::run(
            input,
            template,
            *dx,
            *padding,
            output.as_deref(),
            config.as_deref(),
            *no_sweep,
            *serial,
            &cli,
        ),
        Commands::Info { input, dx, padding } => info::run(input, *dx, *padding, &cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(sdf_err) = e.downcast_ref::<mesh_sdf::SdfError>() {
                eprintln!("{}: {}", "Error".red().bold(), sdf_err);
                eprintln!("  {}: {}", "Code".cyan(), sdf_err.code());
                eprintln!(
                    "  {}: {}",
                    "Suggestion".green(),
                    sdf_err.recovery_suggestion()
                );
                if let Some(location) = sdf_err.location() {
                    eprintln!("  {}: {}", "Location".yellow(), location);
                }
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
                for cause in e.chain().skip(1) {
                    eprintln!("  {}: {}", "Caused by".yellow(), cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
