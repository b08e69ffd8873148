//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use keeper_core::ResourceKind;

/// search-keeper - Keep OpenSearch index templates and ISM policies in files
#[derive(Parser, Debug)]
#[command(name = "search-keeper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: search path)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Resources processed in parallel (overrides the config file)
    #[arg(long, global = true, value_name = "N", value_parser = clap::value_parser!(u16).range(1..=64))]
    pub workers: Option<u16>,

    /// Stop starting new items after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Resource kind selector
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    /// Composable index templates
    #[value(alias = "template")]
    Templates,
    /// Index State Management policies
    #[value(alias = "ism-policy", alias = "ism")]
    IsmPolicies,
}

impl From<KindArg> for ResourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Templates => ResourceKind::Template,
            KindArg::IsmPolicies => ResourceKind::IsmPolicy,
        }
    }
}

/// Kinds selected by an optional `--kind`; all kinds when absent.
pub fn kinds(kind: Option<KindArg>) -> Vec<ResourceKind> {
    match kind {
        Some(kind) => vec![kind.into()],
        None => ResourceKind::ALL.to_vec(),
    }
}

/// Output format for reports
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

/// Options shared by list, save, and publish
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Environment name from the configuration
    #[arg(short, long = "env", value_name = "ENV")]
    pub environment: String,

    /// Resource kind (default: all kinds)
    #[arg(short, long, value_enum)]
    pub kind: Option<KindArg>,

    /// Glob selecting resource names, e.g. "logs-*"
    #[arg(short, long)]
    pub pattern: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List configured environments
    Environments {
        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// List resources on the cluster and in local files
    ///
    /// Each name is annotated with where it exists and, when present on
    /// both sides, whether the two versions differ.
    List {
        #[command(flatten)]
        selection: Selection,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Save remote resources to local files
    ///
    /// Examples:
    ///   search-keeper save -e qa                  # Everything
    ///   search-keeper save -e qa -k templates     # Templates only
    ///   search-keeper save -e qa -p 'logs-*'      # Matching names
    Save {
        #[command(flatten)]
        selection: Selection,

        /// Report what would change without writing files
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Publish local files to the cluster
    ///
    /// Resources identical to their remote version are skipped.
    Publish {
        #[command(flatten)]
        selection: Selection,

        /// Report what would change without sending anything
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Delete one resource from the cluster
    Delete {
        /// Environment name from the configuration
        #[arg(short, long = "env", value_name = "ENV")]
        environment: String,

        /// Resource kind
        #[arg(short, long, value_enum)]
        kind: KindArg,

        /// Exact resource name
        name: String,

        /// Also remove the local file
        #[arg(long)]
        purge_local: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
