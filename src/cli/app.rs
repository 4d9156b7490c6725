//! CLI definitions and entry point

use clap::{Parser, Subcommand};

use crate::cli::commands;
use crate::config::Config;
use crate::core::services::CheckMode;
use crate::output::OutputMode;

/// azp-audit - Azure Pipelines drift auditing for Ansible collections
#[derive(Parser, Debug)]
#[command(
    name = "azp-audit",
    version,
    about = "Audit Azure Pipelines test matrices for drift",
    long_about = "Audit Azure Pipelines configurations across Ansible collection\n\
                  repositories, flagging test matrices and container pins that have\n\
                  drifted from what the ansible-core devel branch currently tests.",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format (machine-readable)
    #[arg(long, global = true)]
    pub json: bool,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Discover repositories and update the local mirror
    Sync {
        /// Query the CI and source-hosting APIs for the repository set
        #[arg(long)]
        discover: bool,

        /// Fetch or update the mirrored checkouts
        #[arg(long)]
        update: bool,
    },

    /// Compare mirrored repositories against the canonical reference
    Check {
        /// Drift dimension to compare
        #[command(subcommand)]
        mode: CheckCommand,
    },

    /// Run sanity tests in each mirrored default-branch collection
    Sanity {
        /// Abort with the failing run's status instead of continuing
        #[arg(long)]
        check: bool,

        /// Restrict to specific sanity tests (repeatable)
        #[arg(long = "test", value_name = "NAME")]
        tests: Vec<String>,
    },

    /// Print discovered pipeline definition files
    ListPipelineFiles {
        /// Print the glob patterns instead of expanding them
        #[arg(long)]
        globs: bool,
    },
}

/// Which drift dimension `check` compares.
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum CheckCommand {
    /// Compare test matrices against the devel reference matrix
    Matrix,
    /// Compare container pins against the latest published tag
    Container,
}

/// Run the CLI. Returns the process exit code.
pub async fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    // All configuration is resolved up front; a missing required credential
    // surfaces here, before any network activity.
    let cfg = Config::load()?;

    match cli.command {
        Command::Sync { discover, update } => {
            commands::sync(&cfg, discover, update, output_mode).await
        },
        Command::Check { mode } => {
            let mode = match mode {
                CheckCommand::Matrix => CheckMode::Matrix,
                CheckCommand::Container => CheckMode::Container,
            };
            commands::check(&cfg, mode, output_mode).await
        },
        Command::Sanity { check, tests } => commands::sanity(&cfg, check, &tests).await,
        Command::ListPipelineFiles { globs } => {
            commands::list_pipeline_files(&cfg, globs, output_mode)
        },
    }
}
