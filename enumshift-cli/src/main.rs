use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use enumshift::commands;
use enumshift::commands::migrate::MigrateOptions;
use enumshift::core::{Config, OutputFormat};

#[derive(Parser)]
#[command(name = "enumshift")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Rewrite raw status literals into enum constant references",
    long_about = "Scans PHP sources for status literals used in query filters, comparisons \
                  and array mappings and replaces them with SessionStatus enum references. \
                  Each rewritten file is backed up with a .backup suffix."
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Config file (defaults to ./enumshift.toml, then ~/.config/enumshift/config.toml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite every matching file under the roots
    Migrate {
        /// Directories to scan (defaults to the configured roots)
        roots: Vec<PathBuf>,

        /// Extra individual files to process
        #[arg(long = "file")]
        files: Vec<PathBuf>,

        /// File extension to process
        #[arg(short, long)]
        extension: Option<String>,

        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the rules that fire on one file and the resulting diff
    Check {
        /// File to inspect
        path: PathBuf,
    },

    /// Print the raw value to enum member table
    Vocabulary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(if cli.verbose {
            "enumshift=debug"
        } else {
            "enumshift=info"
        })
        .init();

    let config = Config::load(cli.config.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Migrate {
            roots,
            files,
            extension,
            dry_run,
        } => {
            let options = MigrateOptions {
                roots,
                extra_files: files,
                extension,
                dry_run,
            };
            commands::migrate::run(&config, options, cli.format)?
        }
        Commands::Check { path } => commands::check::run(&config, path, cli.format)?,
        Commands::Vocabulary => commands::vocabulary::run(&config, cli.format)?,
    }

    Ok(())
}
