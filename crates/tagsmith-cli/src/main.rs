mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;
use tagsmith_core::types::UpdateStrategy;

#[derive(Parser)]
#[command(
    name = "tagsmith",
    about = "Assemble prompts from tagged source regions and apply generated edits back to the tree",
    version,
    propagate_version = true
)]
struct Cli {
    /// Source root (default: auto-detect from .tagsmith/ or .git/)
    #[arg(long, global = true, env = "TAGSMITH_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log written and created files
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .tagsmith/config.yaml
    Init,

    /// List scanned files, folders and blocks
    Scan,

    /// Fill a prompt template's ${...} placeholders from the source tree
    Prompt {
        /// Template file
        template: PathBuf,

        /// Write the prompt here instead of stdout
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Also keep a timestamped copy in the data folder
        #[arg(long)]
        save: bool,
    },

    /// Show the edits a response would make, without touching any file
    Parse {
        /// File holding the generated response
        response: PathBuf,

        /// Update mode: whole_file, injection_points, blocks or none
        #[arg(long, short = 'm')]
        mode: Option<UpdateStrategy>,
    },

    /// Apply a response's edits to the source tree
    Apply {
        /// File holding the generated response
        response: PathBuf,

        /// Update mode: whole_file, injection_points, blocks or none
        #[arg(long, short = 'm')]
        mode: Option<UpdateStrategy>,

        /// Write each changed file next to the original, e.g. -out gives a-out.py
        #[arg(long)]
        suffix: Option<String>,

        /// Let new_file regions replace files that already exist
        #[arg(long)]
        allow_overwrite: bool,
    },

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Scan => cmd::scan::run(&root, cli.json),
        Commands::Prompt {
            template,
            out,
            save,
        } => cmd::prompt::run(&root, &template, out.as_deref(), save, cli.json),
        Commands::Parse { response, mode } => cmd::parse::run(&root, &response, mode, cli.json),
        Commands::Apply {
            response,
            mode,
            suffix,
            allow_overwrite,
        } => cmd::apply::run(
            &root,
            &response,
            cmd::apply::ApplyArgs {
                mode,
                suffix,
                allow_overwrite,
            },
            cli.json,
        ),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
