//! plotstyle CLI - Main entry point

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "plotstyle")]
#[command(version)]
#[command(about = "Resolve layered plot style documents", long_about = None)]
struct Cli {
    #[command(flatten)]
    options: OptionArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Resolution settings shared by every command.
#[derive(Args, Debug)]
pub struct OptionArgs {
    /// Folder searched for documents named by base filename
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Active language code
    #[arg(long, global = true)]
    pub language: Option<String>,

    /// Keep fields that only served as reference targets
    #[arg(long, global = true)]
    pub keep_all: bool,

    /// Folder for auxiliary file-valued fields
    #[arg(long, global = true, value_name = "DIR")]
    pub base_folder: Option<PathBuf>,

    /// TOML options file (defaults to ./plotstyle.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved style as JSON
    Resolve {
        /// Documents to merge, later ones overriding earlier ones
        #[arg(required = true)]
        files: Vec<String>,

        /// Only resolve this template branch
        #[arg(long)]
        index: Option<usize>,

        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Resolve documents and report every dropped or suspicious field
    Check {
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// List the registered validator ids
    Validators,
}

fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plotstyle=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            files,
            index,
            compact,
        } => commands::resolve::execute(commands::resolve::ResolveArgs {
            files,
            index,
            compact,
            options: cli.options,
        }),
        Commands::Check { files } => commands::check::execute(files, cli.options),
        Commands::Validators => commands::validators::execute(),
    }
}
