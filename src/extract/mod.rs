//! Symbol extraction boundary.
//!
//! The review core never parses source code. It asks a [`SymbolExtractor`]
//! for the function-like symbols of a file and receives either a list of
//! candidates or `None` on failure. Failure is not an error: the caller
//! treats it as a file without functions.

pub mod ctags;

use crate::model::FunctionRecord;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub use ctags::CtagsExtractor;

/// Kind of an extracted symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Free function
    Function,
    /// Method bound to a type
    Method,
    /// Constructor
    Constructor,
    /// Solidity-style modifier
    Modifier,
    /// Anything else (types, variables, events)
    Other,
}

impl SymbolKind {
    /// Kinds tracked when no explicit selection is configured
    pub const FUNCTION_LIKE: [Self; 4] = [
        Self::Function,
        Self::Method,
        Self::Constructor,
        Self::Modifier,
    ];

    /// Map a ctags long kind name
    #[must_use]
    pub fn from_ctags(kind: &str) -> Self {
        match kind {
            "function" | "func" | "subroutine" | "procedure" => Self::Function,
            "method" | "member" | "singletonMethod" => Self::Method,
            "constructor" => Self::Constructor,
            "modifier" => Self::Modifier,
            _ => Self::Other,
        }
    }

    /// Parse a configured kind name
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "function" => Some(Self::Function),
            "method" => Some(Self::Method),
            "constructor" => Some(Self::Constructor),
            "modifier" => Some(Self::Modifier),
            _ => None,
        }
    }

    /// Configured name of the kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::Modifier => "modifier",
            Self::Other => "other",
        }
    }

    /// Whether symbols of this kind are ever tracked
    #[must_use]
    pub const fn is_function_like(self) -> bool {
        !matches!(self, Self::Other)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One symbol as reported by an extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolCandidate {
    /// Name, possibly decorated (`transfer(address,uint256)`)
    pub name: String,
    /// Symbol kind
    pub kind: SymbolKind,
    /// First line, 0-indexed
    pub start_line: u32,
    /// Last line, 0-indexed
    pub end_line: u32,
}

impl SymbolCandidate {
    /// Create a candidate
    #[must_use]
    pub fn new(name: &str, kind: SymbolKind, start_line: u32, end_line: u32) -> Self {
        Self {
            name: name.to_string(),
            kind,
            start_line,
            end_line,
        }
    }
}

/// Source of function-like symbols for a file
pub trait SymbolExtractor {
    /// Symbols of `path`, or `None` when extraction failed
    fn extract(&self, path: &Path) -> Option<Vec<SymbolCandidate>>;
}

impl<T: SymbolExtractor + ?Sized> SymbolExtractor for Box<T> {
    fn extract(&self, path: &Path) -> Option<Vec<SymbolCandidate>> {
        (**self).extract(path)
    }
}

/// Strip language decoration such as a parameter list from a symbol name
#[must_use]
pub fn strip_decoration(name: &str) -> &str {
    name.split_once('(').map_or(name, |(head, _)| head).trim()
}

/// Turn candidates into fresh unread records for `file_path`
///
/// Only function-like kinds listed in `kinds` are kept (every function-like
/// kind when `kinds` is empty). The result is ordered by start line.
#[must_use]
pub fn to_records(
    file_path: &str,
    candidates: Vec<SymbolCandidate>,
    kinds: &[SymbolKind],
) -> Vec<FunctionRecord> {
    let mut records: Vec<FunctionRecord> = candidates
        .into_iter()
        .filter(|c| c.kind.is_function_like() && (kinds.is_empty() || kinds.contains(&c.kind)))
        .filter_map(|c| {
            let name = strip_decoration(&c.name);
            (!name.is_empty())
                .then(|| FunctionRecord::new(file_path, name, c.start_line, c.end_line))
        })
        .collect();
    records.sort_by_key(|r| r.start_line);
    records
}

/// Extractor that always fails, used when no extraction tool is available
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableExtractor;

impl SymbolExtractor for UnavailableExtractor {
    fn extract(&self, _path: &Path) -> Option<Vec<SymbolCandidate>> {
        None
    }
}

/// In-memory extractor for embedding callers and tests
///
/// Paths without an entry fail extraction.
#[derive(Debug, Clone, Default)]
pub struct StaticExtractor {
    symbols: HashMap<PathBuf, Vec<SymbolCandidate>>,
}

impl StaticExtractor {
    /// Create an extractor with no entries
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`StaticExtractor::insert`]
    #[must_use]
    pub fn with(mut self, path: impl Into<PathBuf>, symbols: Vec<SymbolCandidate>) -> Self {
        self.insert(path, symbols);
        self
    }

    /// Set the symbols reported for `path`
    pub fn insert(&mut self, path: impl Into<PathBuf>, symbols: Vec<SymbolCandidate>) {
        self.symbols.insert(path.into(), symbols);
    }

    /// Make extraction of `path` fail
    pub fn remove(&mut self, path: &Path) {
        self.symbols.remove(path);
    }
}

impl SymbolExtractor for StaticExtractor {
    fn extract(&self, path: &Path) -> Option<Vec<SymbolCandidate>> {
        self.symbols.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("transfer(address,uint256)", "transfer")]
    #[case("withdraw", "withdraw")]
    #[case("  spaced ( )", "spaced")]
    #[case("(anonymous)", "")]
    fn test_strip_decoration(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(strip_decoration(raw), expected);
    }

    #[test]
    fn test_to_records_keeps_function_like_sorted() {
        let candidates = vec![
            SymbolCandidate::new("b()", SymbolKind::Method, 20, 25),
            SymbolCandidate::new("Vault", SymbolKind::Other, 0, 40),
            SymbolCandidate::new("a", SymbolKind::Function, 5, 9),
            SymbolCandidate::new("()", SymbolKind::Function, 30, 31),
        ];

        let records = to_records("/repo/Vault.sol", candidates, &[]);

        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(records[1].id, "/repo/Vault.sol:b:20");
    }

    #[test]
    fn test_to_records_respects_kind_selection() {
        let candidates = vec![
            SymbolCandidate::new("onlyOwner", SymbolKind::Modifier, 1, 3),
            SymbolCandidate::new("f", SymbolKind::Function, 5, 9),
        ];
        let records = to_records("/repo/a.sol", candidates, &[SymbolKind::Function]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "f");
    }

    #[test]
    fn test_static_extractor_fails_unknown_paths() {
        let mut extractor = StaticExtractor::new().with(
            "/repo/a.sol",
            vec![SymbolCandidate::new("f", SymbolKind::Function, 0, 1)],
        );
        assert_eq!(extractor.extract(Path::new("/repo/a.sol")).unwrap().len(), 1);
        assert!(extractor.extract(Path::new("/repo/b.sol")).is_none());

        extractor.remove(Path::new("/repo/a.sol"));
        assert!(extractor.extract(Path::new("/repo/a.sol")).is_none());
    }

    #[test]
    fn test_boxed_extractor_delegates() {
        let boxed: Box<dyn SymbolExtractor> = Box::new(UnavailableExtractor);
        assert!(boxed.extract(Path::new("/repo/a.sol")).is_none());
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(SymbolKind::from_ctags("member"), SymbolKind::Method);
        assert_eq!(SymbolKind::from_ctags("event"), SymbolKind::Other);
        assert_eq!(SymbolKind::parse("modifier"), Some(SymbolKind::Modifier));
        assert!(!SymbolKind::Other.is_function_like());
    }
}
