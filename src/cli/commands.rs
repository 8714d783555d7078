//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cloudflare v4 API client
#[derive(Parser, Debug)]
#[command(name = "cfapi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client profile (YAML); environment variables override it
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Overall deadline for the command, in seconds
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show details of the current user
    User,

    /// GET a path and print the response body
    Get {
        /// Path relative to the base URL, e.g. /zones
        path: String,
    },

    /// Fetch every page of a list endpoint
    List {
        /// Path relative to the base URL, e.g. /zones
        path: String,

        /// Items requested per page
        #[arg(long, default_value = "20")]
        per_page: u32,
    },

    /// Show the configured authentication scheme
    Auth,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}
