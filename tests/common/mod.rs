#![allow(dead_code)]

use anyhow::Result;
use auditrack::AuditContext;
use auditrack::extract::{StaticExtractor, SymbolCandidate, SymbolKind};
use auditrack::session::ReviewSession;
use auditrack::store::StateStore;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fixed date used by sessions built here
pub fn audit_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date")
}

/// Temporary workspace with source files and a scripted extractor
pub struct TestWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub extractor: StaticExtractor,
}

impl TestWorkspace {
    /// Create an empty workspace
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        Ok(Self {
            temp_dir,
            root,
            extractor: StaticExtractor::new(),
        })
    }

    /// Write a source file and script its functions as `(name, start, end)`
    pub fn add_source(&mut self, relative: &str, functions: &[(&str, u32, u32)]) -> Result<PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, "// source\n")?;
        let symbols = functions
            .iter()
            .map(|(name, start, end)| SymbolCandidate::new(name, SymbolKind::Function, *start, *end))
            .collect();
        self.extractor.insert(&path, symbols);
        Ok(path)
    }

    /// Snapshot location
    pub fn state_path(&self) -> PathBuf {
        self.root.join(".auditrack/state.json")
    }

    /// Config location
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join(".config/auditrack/config")
    }

    /// Open a session over the current snapshot
    pub fn session(&self) -> Result<ReviewSession<StaticExtractor>> {
        let store = StateStore::open(self.state_path(), self.root.clone())?;
        Ok(ReviewSession::new(store, self.extractor.clone()).with_clock(audit_day))
    }

    /// Context with explicit paths
    pub fn context(&self) -> Result<AuditContext> {
        AuditContext::new_explicit(self.root.clone(), self.config_path())
    }

    /// Absolute key of a workspace-relative path
    pub fn key(&self, relative: &str) -> String {
        self.root.join(relative).to_string_lossy().into_owned()
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}
