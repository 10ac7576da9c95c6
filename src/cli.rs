//! Command-line interface definitions for auditrack.
//!
//! The CLI definitions are shared between the main binary and build tools
//! (like xtask) for man page generation.
//!
//! Field-level documentation is provided via clap attributes, so
//! `missing_docs` is allowed for this module.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use crate::model::{FunctionStatus, FunctionTag};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for auditrack.
#[derive(Parser)]
#[command(
    name = "atr",
    version = crate::VERSION,
    about = "Function-level review tracker for manual code audits",
    long_about = "Tracks which files are in audit scope, which functions have been read or \
                  reviewed, which are entrypoints, admin-only or hidden, and what was done each day"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true, env = "AUDITRACK_ROOT")]
    pub root: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Add files or folders to the audit scope
    Add {
        /// Paths to add
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Remove files or folders from the audit scope
    ///
    /// A scope entry is deleted; a file inside an in-scope folder is excluded.
    #[command(alias = "rm")]
    Remove {
        /// Paths to remove
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Load scope entries from a text file (one path per line)
    LoadScope {
        /// Scope file (defaults to core.scope_file)
        file: Option<PathBuf>,
    },

    /// Re-extract functions and reconcile them with recorded progress
    Sync {
        /// Files or folders to sync (defaults to everything in scope)
        paths: Vec<PathBuf>,
    },

    /// Change the review status of a function
    Mark {
        #[arg(value_enum)]
        status: MarkStatus,

        /// Tracked file (absolute or workspace-relative)
        file: String,

        /// Function name or id
        function: String,
    },

    /// Change the review status of every function in a file
    MarkFile {
        #[arg(value_enum)]
        status: FileMarkStatus,

        /// Tracked file (absolute or workspace-relative)
        file: String,
    },

    /// Set or clear a function flag
    Flag {
        #[arg(value_enum)]
        flag: FlagKind,

        /// Tracked file (absolute or workspace-relative)
        file: String,

        /// Function name or id
        function: String,

        /// Clear the flag instead of setting it
        #[arg(long)]
        off: bool,
    },

    /// Show or change the active status and tag filters
    Filter {
        /// Statuses to show (repeatable)
        #[arg(short, long = "status", value_enum)]
        statuses: Vec<StatusArg>,

        /// Tags to require (repeatable)
        #[arg(short, long = "tag", value_enum)]
        tags: Vec<TagArg>,

        /// Restore the default filters
        #[arg(long, conflicts_with_all = ["statuses", "tags"])]
        reset: bool,
    },

    /// List visible files, or the visible functions of one file
    #[command(alias = "ls")]
    List {
        /// Tracked file to list functions for
        file: Option<String>,

        /// Print function ids
        #[arg(long)]
        ids: bool,

        /// Ignore filters and include hidden functions
        #[arg(short, long)]
        all: bool,
    },

    /// Show scope and review totals
    Status,

    /// Show the daily progress log
    Progress {
        /// Number of most recent days to show
        #[arg(short = 'n', long, default_value = "7")]
        days: usize,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reset all review state
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Get and set configuration options
    Config {
        /// Configuration key
        key: Option<String>,

        /// Configuration value to set
        value: Option<String>,

        /// Unset the configuration key
        #[arg(long)]
        unset: bool,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarkStatus {
    /// unread -> read
    Read,
    /// read -> reviewed
    Reviewed,
    /// read or reviewed -> unread
    Unread,
    /// reviewed -> read
    Unreviewed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileMarkStatus {
    Read,
    Reviewed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlagKind {
    Entrypoint,
    Admin,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Unread,
    Read,
    Reviewed,
}

impl From<StatusArg> for FunctionStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Unread => Self::Unread,
            StatusArg::Read => Self::Read,
            StatusArg::Reviewed => Self::Reviewed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TagArg {
    Entrypoint,
    Admin,
}

impl From<TagArg> for FunctionTag {
    fn from(value: TagArg) -> Self {
        match value {
            TagArg::Entrypoint => Self::Entrypoint,
            TagArg::Admin => Self::Admin,
        }
    }
}
