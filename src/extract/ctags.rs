use super::{SymbolCandidate, SymbolExtractor, SymbolKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// One JSON line of `ctags --output-format=json`
#[derive(Debug, Deserialize)]
struct CtagsLine {
    /// `tag` for symbols, `ptag` for pseudo tags
    #[serde(rename = "_type")]
    line_type: String,
    /// Symbol name
    name: String,
    /// Long kind name (`--fields=+K`)
    #[serde(default)]
    kind: Option<String>,
    /// 1-indexed start line (`--fields=+n`)
    #[serde(default)]
    line: Option<u32>,
    /// 1-indexed end line (`--fields=+e`)
    #[serde(default)]
    end: Option<u32>,
}

/// Extractor backed by Universal Ctags
#[derive(Debug, Clone)]
pub struct CtagsExtractor {
    /// Resolved ctags executable
    program: PathBuf,
    /// Values for `--languages`, all languages when empty
    languages: Vec<String>,
}

impl CtagsExtractor {
    /// Use a specific ctags executable
    #[must_use]
    pub const fn new(program: PathBuf, languages: Vec<String>) -> Self {
        Self { program, languages }
    }

    /// Locate `command` on `PATH`
    ///
    /// Returns `None` when it cannot be found.
    #[must_use]
    pub fn discover(command: &str, languages: &[String]) -> Option<Self> {
        match which::which(command) {
            Ok(program) => {
                debug!(program = %program.display(), "Using ctags");
                Some(Self::new(program, languages.to_vec()))
            }
            Err(e) => {
                warn!(command, error = %e, "ctags not found, symbol extraction disabled");
                None
            }
        }
    }

    /// Resolved executable
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--output-format=json", "--fields=+nKe", "-f", "-"]);
        if !self.languages.is_empty() {
            cmd.arg(format!("--languages={}", self.languages.join(",")));
        }
        cmd.arg(path).stdin(Stdio::null());
        cmd
    }
}

impl SymbolExtractor for CtagsExtractor {
    fn extract(&self, path: &Path) -> Option<Vec<SymbolCandidate>> {
        let output = match self.command(path).output() {
            Ok(output) => output,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to run ctags");
                return None;
            }
        };

        if !output.status.success() {
            warn!(
                path = %path.display(),
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "ctags failed"
            );
            return None;
        }

        let symbols = parse_ctags_output(&String::from_utf8_lossy(&output.stdout));
        debug!(path = %path.display(), symbols = symbols.len(), "Symbols extracted");
        Some(symbols)
    }
}

/// Parse ctags JSON lines into candidates with 0-indexed spans
///
/// Pseudo tags, lines without a start line and unparsable lines are skipped.
/// A missing end line collapses the span onto the start line.
#[must_use]
pub fn parse_ctags_output(output: &str) -> Vec<SymbolCandidate> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<CtagsLine>(line) {
            Ok(tag) => Some(tag),
            Err(e) => {
                debug!(error = %e, "Skipping unparsable ctags line");
                None
            }
        })
        .filter(|tag| tag.line_type == "tag")
        .filter_map(|tag| {
            let line = tag.line?;
            let start_line = line.saturating_sub(1);
            let end_line = tag.end.unwrap_or(line).saturating_sub(1).max(start_line);
            let kind = tag
                .kind
                .as_deref()
                .map_or(SymbolKind::Other, SymbolKind::from_ctags);
            Some(SymbolCandidate {
                name: tag.name,
                kind,
                start_line,
                end_line,
            })
        })
        .collect()
}
