#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Counters over in-memory collections
#![allow(clippy::float_arithmetic)] // Completion percentages
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # Auditrack - Function-Level Review Tracker
//!
//! Auditrack records how far a manual code audit has progressed. It keeps a
//! scope of files and folders, extracts the functions of every in-scope file
//! with universal-ctags, and tracks each function through
//! `unread -> read -> reviewed`, along with entrypoint, admin and hidden
//! flags and a day-by-day log of what was done.
//!
//! ## Architecture
//!
//! - [`model`]: Persistent data model (files, functions, filters, history)
//! - [`scope`]: Scope and exclusion rules
//! - [`extract`]: Symbol extraction (ctags) behind the [`extract::SymbolExtractor`] trait
//! - [`reconcile`]: Carrying review progress across re-extraction
//! - [`session`]: The review operations and their status machine
//! - [`store`]: Loading, normalizing and persisting the snapshot
//! - [`commands`]: Command implementations for the `atr` binary
//! - [`output`]: Output formatting and styling
//!
//! ## Example Usage
//!
//! ```no_run
//! use auditrack::AuditContext;
//!
//! # fn main() -> anyhow::Result<()> {
//! let ctx = AuditContext::new(None)?;
//! let mut session = ctx.open_session()?;
//!
//! session.add_to_scope(std::path::Path::new("src"))?;
//! if let Some(file) = session.find_file("src/Vault.sol").map(|f| f.file_path.clone()) {
//!     session.mark_read(&file, "deposit")?;
//! }
//! session.save_and_wait()?;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Command implementations for the `atr` binary.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Error type for rejected review operations.
pub mod error;

/// Symbol extraction from source files.
pub mod extract;

/// Status and tag filtering of functions and files.
pub mod filter;

/// Persistent data model.
pub mod model;

/// Output formatting and styling.
pub mod output;

/// Daily progress history and totals.
pub mod progress;

/// Reconciliation of re-extracted functions with recorded ones.
pub mod reconcile;

/// Scope and exclusion rules.
pub mod scope;

/// Scope definition files.
pub mod scope_file;

/// Review operations over one workspace.
pub mod session;

/// State snapshot loading, normalization and persistence.
pub mod store;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the atr binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default snapshot location relative to the workspace root.
pub const DEFAULT_STATE_FILE: &str = ".auditrack/state.json";

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/auditrack/config";

/// Central context for all auditrack commands.
///
/// Holds the workspace root, the loaded configuration and where it came
/// from. Sessions are opened from it.
///
/// # Examples
///
/// ```no_run
/// use auditrack::AuditContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Context for the current directory with the default config
/// let ctx = AuditContext::new(None)?;
///
/// // Context with explicit paths (for testing)
/// let ctx = AuditContext::new_explicit("/tmp/audit".into(), "/tmp/audit_config".into())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AuditContext {
    /// Root directory every tracked path must live under.
    pub workspace_root: PathBuf,

    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,

    /// Whether to run in non-interactive mode (no prompts).
    /// Used primarily for testing to prevent stdin reads.
    pub non_interactive: bool,
}

impl AuditContext {
    /// Creates a context for `root`, or the current directory when `None`.
    ///
    /// The configuration path comes from `AUDITRACK_CONFIG_PATH` when set,
    /// otherwise from the home directory.
    ///
    /// # Errors
    /// Returns an error if the root cannot be resolved, the home directory
    /// cannot be determined, or the configuration file cannot be read or
    /// created.
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = match root {
            Some(root) => root,
            None => std::env::current_dir().context("Could not determine current directory")?,
        };
        let workspace_root = utils::paths::resolve_root(&root)?;

        // Check environment variable for config path first
        let config_path = if let Ok(path) = std::env::var("AUDITRACK_CONFIG_PATH") {
            PathBuf::from(path)
        } else {
            let home = dirs::home_dir().context("Could not find home directory")?;
            home.join(DEFAULT_CONFIG_PATH)
        };

        let config = config::Config::load(&config_path)?;

        let validator = config::validator::ConfigValidator::new();
        match validator.unknown_fields(&config_path) {
            Ok(unknown) => {
                for field in unknown {
                    output::warning(&format!("Warning: Unknown configuration option: {field}"));
                }
            }
            Err(e) => output::warning(&format!("Warning: Configuration validation failed: {e}")),
        }

        Ok(Self {
            workspace_root,
            config_path,
            config,
            non_interactive: false,
        })
    }

    /// Creates a context with explicit paths for testing.
    ///
    /// A default configuration is written when `config_path` does not exist.
    ///
    /// # Errors
    /// Returns an error if the root cannot be resolved or the configuration
    /// cannot be loaded or created.
    pub fn new_explicit(workspace_root: PathBuf, config_path: PathBuf) -> Result<Self> {
        let workspace_root = utils::paths::resolve_root(&workspace_root)?;
        let config = config::Config::load(&config_path)?;

        Ok(Self {
            workspace_root,
            config_path,
            config,
            non_interactive: true,
        })
    }

    /// Absolute location of the state snapshot.
    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.config.state_path(&self.workspace_root)
    }

    /// Opens the snapshot and builds a session with the configured extractor.
    ///
    /// When the configured ctags program cannot be found, extraction is
    /// reported as failed for every file.
    ///
    /// # Errors
    /// Returns an error if the save worker cannot be started.
    pub fn open_session(&self) -> Result<session::ReviewSession> {
        let store = store::StateStore::open(self.state_path(), self.workspace_root.clone())?;

        let extractor: Box<dyn extract::SymbolExtractor> = match extract::ctags::CtagsExtractor::discover(
            &self.config.extraction.ctags_command,
            &self.config.extraction.languages,
        ) {
            Some(ctags) => Box::new(ctags),
            None => {
                output::verbose(&format!(
                    "'{}' not found, functions cannot be extracted",
                    self.config.extraction.ctags_command
                ));
                Box::new(extract::UnavailableExtractor)
            }
        };

        Ok(session::ReviewSession::new(store, extractor)
            .with_kinds(self.config.symbol_kinds())
            .with_ignore_patterns(self.config.ignore_patterns()))
    }
}
