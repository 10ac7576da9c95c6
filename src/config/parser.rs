use super::Config;
use crate::extract::SymbolKind;
use anyhow::{Context, Result};
use std::path::Path;

/// Read, parse and validate a config file
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or
/// contains invalid values.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
}

/// Parse and validate config text
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or contains invalid values.
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;

    // Validation errors are returned as-is, without the parse context
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    if config.core.state_file.as_os_str().is_empty() {
        anyhow::bail!("core.state_file cannot be empty");
    }

    if config.extraction.ctags_command.trim().is_empty() {
        anyhow::bail!("extraction.ctags_command cannot be empty");
    }

    if let Some(bad) = config
        .extraction
        .kinds
        .iter()
        .find(|k| SymbolKind::parse(k).is_none())
    {
        anyhow::bail!("Unknown symbol kind in extraction.kinds: {bad}");
    }

    for pattern in &config.extraction.ignore_patterns {
        glob::Pattern::new(pattern)
            .with_context(|| format!("Invalid glob pattern in extraction.ignore_patterns: {pattern}"))?;
    }

    Ok(())
}
