//! # polystage
//!
//! Build the polyhedral_common binaries and stage them for packaging.
//!
//! ## Usage
//!
//! ```bash
//! polystage              # Fetch + configure + compile + stage (same as `run`)
//! polystage fetch        # Clone the source if it is not already present
//! polystage build        # Fetch if needed, then configure and compile
//! polystage stage        # Verify and copy binaries from an existing build
//! polystage status       # Show source, build and staging status
//! polystage clean        # Remove the build directory (--source: whole tree)
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use polystage::config::Config;
use polystage::{artifacts, cmake, vendor, Pipeline, SystemRunner};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "polystage", version, about = "Build and stage polyhedral_common binaries")]
struct Cli {
    /// JSON config file (defaults reproduce the py_polyhedral build)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the staging destination directory
    #[arg(long, global = true)]
    dest: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole pipeline (fetch + build + stage)
    Run,
    /// Clone the source tree if it is not already present
    Fetch,
    /// Fetch if needed, then configure and compile
    Build,
    /// Verify and stage binaries from an existing build directory
    Stage,
    /// Show source, build and staging status
    Status,
    /// Remove the build directory
    Clean {
        /// Remove the whole source tree instead
        #[arg(long)]
        source: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(dest) = cli.dest {
        config.destination = dest;
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(config)?,
        Commands::Fetch => {
            vendor::ensure(&mut SystemRunner, &config.source, &config.build)?;
        }
        Commands::Build => {
            vendor::ensure(&mut SystemRunner, &config.source, &config.build)?;
            cmake::build(&mut SystemRunner, &config.source.path, &config.build)?;
        }
        Commands::Stage => {
            let staged =
                artifacts::stage_all(&config.build_dir(), &config.manifest, &config.destination)?;
            println!("Staged {} artifacts into {}", staged.len(), config.destination.display());
        }
        Commands::Status => status(&config),
        Commands::Clean { source } => clean(&config, source)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(config: Config) -> Result<()> {
    println!("=== Building polyhedral_common ===\n");

    let destination = config.destination.clone();
    let mut pipeline = Pipeline::new(config, SystemRunner);
    let staged = pipeline.run()?;

    println!("\n=== Build complete ===");
    println!("  Staged {} artifacts into {}", staged.len(), destination.display());
    Ok(())
}

fn status(config: &Config) {
    let source = &config.source.path;
    let build_dir = config.build_dir();

    println!("Source:");
    if source.exists() {
        println!("  {:12} [present] {}", "tree", source.display());
    } else {
        println!("  {:12} [missing] {}", "tree", config.source.url);
    }
    let state = if build_dir.exists() { "present" } else { "missing" };
    println!("  {:12} [{state}] {}", "build", build_dir.display());

    println!("\nArtifacts ({}):", config.destination.display());
    let report = artifacts::status(&build_dir, &config.manifest, &config.destination);
    for entry in &report {
        let built = if entry.built { "built" } else { "missing" };
        match entry.staged {
            Some(modified) => {
                let when = chrono::DateTime::<chrono::Local>::from(modified);
                println!(
                    "  {:40} [{built}] staged {}",
                    entry.name,
                    when.format("%Y-%m-%d %H:%M:%S")
                );
            }
            None => println!("  {:40} [{built}] not staged", entry.name),
        }
    }

    let staged = report.iter().filter(|e| e.staged.is_some()).count();
    println!("\n  Total: {staged}/{} staged", report.len());
}

fn clean(config: &Config, source: bool) -> Result<()> {
    let removed = vendor::clean(&config.source, source)?;
    if removed.is_empty() {
        println!("Nothing to clean");
    }
    for path in removed {
        println!("Cleaned: {}", path.display());
    }
    Ok(())
}
