use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "metagate",
    version,
    about = "API metadata validation for commit and push hooks"
)]
pub struct Args {
    /// Repository root (defaults to the enclosing git work tree)
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    /// Repository name used for classification
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Config file (defaults to api_validation.* discovered upward from the root)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Write output to a file instead of stdout
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// Never open a graphical dialog for overrides
    #[arg(long, global = true)]
    pub no_gui: bool,

    /// Read override answers from stdin instead of the terminal
    #[arg(long, global = true)]
    pub stdin_prompt: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the repository name and category
    Identify,
    /// List metadata files in the work tree
    FindMeta,
    /// Validate every metadata file (report only)
    Check,
    /// Validate the metadata governing the given files
    Files {
        /// Changed files; relative paths are taken from the repository root
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Offer an override when validation fails
        #[arg(long)]
        interactive: bool,
    },
    /// Validate metadata governing staged files (advisory)
    Staged,
    /// Validate metadata governing files changed between two commits
    Range {
        from: String,
        to: String,
        /// Offer an override when validation fails
        #[arg(long)]
        interactive: bool,
        /// Show the annotated commit message instead of amending HEAD
        #[arg(long)]
        dry_run: bool,
    },
    /// Commit hook entry point (advisory, always exits 0)
    PreCommit,
    /// Push hook entry point; reads push lines from stdin
    PrePush {
        remote: Option<String>,
        url: Option<String>,
        /// Show the annotated commit message instead of amending HEAD
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the effective configuration as YAML
    PrintConfig,
    /// Print the rule reference
    Rules,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}
