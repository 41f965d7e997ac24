//! CLI parse: clap types for DRUI. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DRUI CLI - Docker Registry UI
#[derive(Parser)]
#[command(name = "drui", version)]
#[command(about = "Browse and manage images stored in a Docker Registry")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (looked up for config/config.toml)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, short, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List repositories from the registry catalog
    Repositories {
        /// Only names matching this regular expression
        #[arg(long)]
        filter: Option<String>,
        /// Only names starting with this repository prefix
        #[arg(long)]
        repository: Option<String>,
        /// Maximum rows to show (defaults to ui.images_per_page)
        #[arg(long)]
        limit: Option<usize>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List tags of an image, oldest version first
    Tags {
        image: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show manifest summary, platforms and history of an image tag
    Inspect {
        image: String,
        /// Tag to inspect (defaults to latest, else the newest tag)
        #[arg(long)]
        tag: Option<String>,
        /// Platform manifest digest of a multi-arch tag
        #[arg(long)]
        digest: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Delete image tags
    Delete {
        image: String,
        /// Tags to preselect (comma separated)
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Concurrent delete requests (defaults to ui.delete_concurrency)
        #[arg(long)]
        concurrency: Option<usize>,
        /// Delete the preselected tags without prompting
        #[arg(long, short)]
        yes: bool,
    },
    /// Check registry authentication with the configured credentials
    Login,
    /// Show or change the color theme
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommands>,
    },
    /// Print the broadcast message
    Broadcast {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum ThemeCommands {
    /// Show the active theme
    Show,
    /// Switch between light and dark
    Toggle,
    /// Set the theme explicitly
    Set {
        /// light or dark
        theme: String,
    },
}
