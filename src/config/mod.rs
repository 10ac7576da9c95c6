pub mod parser;
pub mod validator;

use crate::extract::SymbolKind;
use crate::utils::compile_patterns;
use crate::utils::paths::ensure_parent_dirs;
use anyhow::{Context, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys accepted by [`Config::get`] and [`Config::set`], in display order
pub const KEYS: [&str; 8] = [
    "core.state_file",
    "core.scope_file",
    "extraction.ctags_command",
    "extraction.languages",
    "extraction.kinds",
    "extraction.ignore_patterns",
    "output.color",
    "output.verbose",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,

    /// How symbols are extracted from source files
    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Snapshot location, relative paths resolve against the workspace root
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    /// Scope definition file loaded by `load-scope` without an argument
    #[serde(default)]
    pub scope_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_ctags_command")]
    pub ctags_command: String,
    /// Passed to `--languages`; every language ctags knows when empty
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default = "default_kinds")]
    pub kinds: Vec<String>,
    /// Glob patterns pruned from folder walks
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_color")]
    pub color: bool,
    #[serde(default)]
    pub verbose: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            scope_file: None,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ctags_command: default_ctags_command(),
            languages: Vec::new(),
            kinds: default_kinds(),
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot read or parse the configuration file
    /// - Configuration file contains invalid TOML
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            // Create default config if it doesn't exist
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        parser::parse_config_file(path)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        ensure_parent_dirs(path)?;

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Absolute snapshot location for a workspace
    #[must_use]
    pub fn state_path(&self, root: &Path) -> PathBuf {
        root.join(&self.core.state_file)
    }

    /// Absolute scope file location for a workspace, if configured
    #[must_use]
    pub fn scope_file_path(&self, root: &Path) -> Option<PathBuf> {
        self.core.scope_file.as_ref().map(|p| root.join(p))
    }

    /// Configured symbol kinds; unknown names are skipped
    #[must_use]
    pub fn symbol_kinds(&self) -> Vec<SymbolKind> {
        self.extraction
            .kinds
            .iter()
            .filter_map(|k| SymbolKind::parse(k))
            .collect()
    }

    /// Compiled folder-walk ignore patterns
    #[must_use]
    pub fn ignore_patterns(&self) -> Vec<Pattern> {
        compile_patterns(&self.extraction.ignore_patterns)
    }

    /// Get a configuration value by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let (section, field) = key.split_once('.')?;

        match (section, field) {
            ("core", "state_file") => Some(self.core.state_file.display().to_string()),
            ("core", "scope_file") => self
                .core
                .scope_file
                .as_ref()
                .map(|p| p.display().to_string()),
            ("extraction", "ctags_command") => Some(self.extraction.ctags_command.clone()),
            ("extraction", "languages") => Some(self.extraction.languages.join(",")),
            ("extraction", "kinds") => Some(self.extraction.kinds.join(",")),
            ("extraction", "ignore_patterns") => Some(self.extraction.ignore_patterns.join(",")),
            ("output", "color") => Some(self.output.color.to_string()),
            ("output", "verbose") => Some(self.output.verbose.to_string()),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// List values are comma separated.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown
    /// - The value is invalid for the key (e.g., an unknown symbol kind)
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        let (section, field) = key
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("Invalid configuration key: {key}"))?;

        match (section, field) {
            ("core", "state_file") => {
                if value.trim().is_empty() {
                    anyhow::bail!("State file path cannot be empty");
                }
                self.core.state_file = PathBuf::from(value);
            }
            ("core", "scope_file") => self.core.scope_file = Some(PathBuf::from(value)),
            ("extraction", "ctags_command") => {
                if value.trim().is_empty() {
                    anyhow::bail!("ctags command cannot be empty");
                }
                self.extraction.ctags_command = value;
            }
            ("extraction", "languages") => self.extraction.languages = split_list(&value),
            ("extraction", "kinds") => {
                let kinds = split_list(&value);
                if let Some(bad) = kinds.iter().find(|k| SymbolKind::parse(k).is_none()) {
                    anyhow::bail!(
                        "Unknown symbol kind: {bad} (expected function, method, constructor or modifier)"
                    );
                }
                self.extraction.kinds = kinds;
            }
            ("extraction", "ignore_patterns") => {
                let patterns = split_list(&value);
                for pattern in &patterns {
                    Pattern::new(pattern)
                        .with_context(|| format!("Invalid glob pattern: {pattern}"))?;
                }
                self.extraction.ignore_patterns = patterns;
            }
            ("output", "color") => {
                self.output.color = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            ("output", "verbose") => {
                self.output.verbose = value
                    .parse()
                    .with_context(|| format!("Invalid boolean: {value}"))?;
            }
            _ => return Err(anyhow::anyhow!("Unknown configuration key: {key}")),
        }
        Ok(())
    }

    /// Unset a configuration value by key
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The key format is invalid (must be section.key)
    /// - The key is unknown or cannot be unset
    pub fn unset(&mut self, key: &str) -> Result<()> {
        let (section, field) = key
            .split_once('.')
            .ok_or_else(|| anyhow::anyhow!("Invalid configuration key: {key}"))?;

        match (section, field) {
            ("core", "scope_file") => self.core.scope_file = None,
            ("extraction", "languages") => self.extraction.languages.clear(),
            ("extraction", "kinds") => self.extraction.kinds = default_kinds(),
            ("extraction", "ignore_patterns") => {
                self.extraction.ignore_patterns = default_ignore_patterns();
            }
            _ => return Err(anyhow::anyhow!("Cannot unset configuration key: {key}")),
        }
        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// Default functions for serde
fn default_state_file() -> PathBuf {
    PathBuf::from(crate::DEFAULT_STATE_FILE)
}

fn default_ctags_command() -> String {
    "ctags".to_string()
}

fn default_kinds() -> Vec<String> {
    SymbolKind::FUNCTION_LIKE
        .iter()
        .map(|k| k.as_str().to_string())
        .collect()
}

fn default_ignore_patterns() -> Vec<String> {
    [".git", ".auditrack", "node_modules", "target", "lib", "out"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

const fn default_color() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_creates_default_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config");

        let config = Config::load(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config, Config::default());
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_get_set_round_trip() {
        let mut config = Config::default();
        config
            .set("extraction.languages", "Solidity, Rust".to_string())
            .unwrap();
        assert_eq!(
            config.get("extraction.languages").as_deref(),
            Some("Solidity,Rust")
        );

        config.set("output.color", "false".to_string()).unwrap();
        assert!(!config.output.color);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("extraction.kinds", "function,event".to_string()).is_err());
        assert!(config.set("output.color", "maybe".to_string()).is_err());
        assert!(config.set("extraction.ignore_patterns", "[".to_string()).is_err());
        assert!(config.set("nosection", "x".to_string()).is_err());
        assert!(config.set("core.unknown", "x".to_string()).is_err());
    }

    #[test]
    fn test_unset_restores_defaults() {
        let mut config = Config::default();
        config.set("core.scope_file", "scope.txt".to_string()).unwrap();
        config.set("extraction.kinds", "function".to_string()).unwrap();

        config.unset("core.scope_file").unwrap();
        config.unset("extraction.kinds").unwrap();

        assert_eq!(config, Config::default());
        assert!(config.unset("core.state_file").is_err());
    }

    #[test]
    fn test_paths_resolve_against_root() {
        let mut config = Config::default();
        let root = Path::new("/repo");
        assert_eq!(
            config.state_path(root),
            PathBuf::from("/repo/.auditrack/state.json")
        );
        assert_eq!(config.scope_file_path(root), None);

        config.core.state_file = PathBuf::from("/var/audit/state.json");
        assert_eq!(
            config.state_path(root),
            PathBuf::from("/var/audit/state.json")
        );
    }

    #[test]
    fn test_every_key_is_readable() {
        let mut config = Config::default();
        config.set("core.scope_file", "scope.txt".to_string()).unwrap();
        for key in KEYS {
            assert!(config.get(key).is_some(), "{key}");
        }
    }

    #[test]
    fn test_symbol_kinds_default_to_function_like() {
        assert_eq!(Config::default().symbol_kinds(), SymbolKind::FUNCTION_LIKE.to_vec());
    }
}
