//! Drydock CLI - Command-line tool for Space Engineers blueprint conversion.
//!
//! This is the main entry point for the Drydock command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use drydock::prelude::*;

/// Drydock - Space Engineers blueprint conversion tool
#[derive(Parser)]
#[command(name = "drydock")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a blueprint file and print its blocks as JSON
    Import {
        /// Blueprint file (bp.sbc)
        input: PathBuf,

        /// Write JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Export a JSON block list as a blueprint folder
    Export {
        /// Export request JSON ({"blocks": [...], "filename": ..., "thumbnail": ...})
        request: PathBuf,

        /// Directory blueprint folders are created in
        #[arg(short, long, env = "DRYDOCK_BLUEPRINTS_DIR", default_value = "blueprints")]
        root: PathBuf,

        /// Override the blueprint name from the request
        #[arg(short, long)]
        name: Option<String>,

        /// PNG image to use as the thumbnail
        #[arg(short, long)]
        thumbnail: Option<PathBuf>,
    },

    /// Print the SubtypeId a blueprint name is exported with
    Guid {
        /// Blueprint name (a trailing .sbc is ignored)
        name: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Import {
            input,
            output,
            pretty,
        } => cmd_import(&input, output.as_deref(), pretty),
        Commands::Export {
            request,
            root,
            name,
            thumbnail,
        } => cmd_export(&request, root, name, thumbnail.as_deref()),
        Commands::Guid { name } => {
            let name = drydock::blueprint::sanitize_name(&name);
            println!("{}", BlueprintGuid::from_name(&name));
            Ok(())
        }
    }
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// JSON body printed by `import`, the shape editors expect.
#[derive(Serialize)]
struct ImportResponse<'a> {
    blocks: &'a [BlockRecord],
}

fn cmd_import(input: &Path, output: Option<&Path>, pretty: bool) -> Result<()> {
    let start = Instant::now();
    let blocks = import_file(input)
        .with_context(|| format!("Failed to import {}", input.display()))?;
    debug!(elapsed = ?start.elapsed(), "import finished");

    let body = ImportResponse { blocks: &blocks };
    let json = if pretty {
        serde_json::to_string_pretty(&body)?
    } else {
        serde_json::to_string(&body)?
    };

    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Imported {} blocks -> {}", blocks.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn cmd_export(
    request_path: &Path,
    root: PathBuf,
    name: Option<String>,
    thumbnail: Option<&Path>,
) -> Result<()> {
    let data = fs::read(request_path)
        .with_context(|| format!("Failed to read {}", request_path.display()))?;
    let request: ExportRequest =
        serde_json::from_slice(&data).context("Failed to parse export request")?;

    let mut package = BlueprintPackage::from(request);
    if let Some(name) = name {
        package.name = name;
    }
    if let Some(path) = thumbnail {
        let image = fs::read(path)
            .with_context(|| format!("Failed to read thumbnail {}", path.display()))?;
        package.thumbnail = Some(format!("data:image/png;base64,{}", BASE64.encode(image)));
    }

    let exporter = Exporter::new(root);
    match exporter.export(&package) {
        Ok(receipt) => {
            println!("{}", receipt);
            Ok(())
        }
        Err(e) if e.is_partial() => {
            Err(anyhow::Error::new(e).context("Blueprint saved without thumbnail"))
        }
        Err(e) => Err(anyhow::Error::new(e).context("Failed to export blueprint")),
    }
}
