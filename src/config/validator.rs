use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;

/// Finds configuration fields that auditrack does not recognise
pub struct ConfigValidator {
    /// Set of valid configuration fields
    known_fields: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        Self {
            known_fields: super::KEYS.into_iter().collect(),
        }
    }

    /// Unknown fields in a config file, as `section.key`
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn unknown_fields(&self, config_path: &Path) -> Result<Vec<String>> {
        if !config_path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(config_path)?;
        let parsed: toml::Value = toml::from_str(&content)?;

        let mut unknown = Vec::new();
        self.check_table(&parsed, "", &mut unknown);
        Ok(unknown)
    }

    /// Recursively collects leaf keys that are not known fields
    fn check_table(&self, table: &toml::Value, prefix: &str, unknown: &mut Vec<String>) {
        let toml::Value::Table(map) = table else {
            return;
        };
        for (key, value) in map {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            if self.known_fields.contains(full_key.as_str()) {
                continue;
            }
            if let toml::Value::Table(_) = value {
                self.check_table(value, &full_key, unknown);
            } else {
                unknown.push(full_key);
            }
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unknown_fields_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config");
        std::fs::write(
            &path,
            "[core]\nstate_file = \"s.json\"\nrepo_path = \"x\"\n\n[extra]\nflag = true\n",
        )
        .unwrap();

        let unknown = ConfigValidator::new().unknown_fields(&path).unwrap();

        assert_eq!(unknown, vec!["core.repo_path".to_string(), "extra.flag".to_string()]);
    }

    #[test]
    fn test_missing_file_has_no_unknown_fields() {
        let temp = TempDir::new().unwrap();
        let unknown = ConfigValidator::new()
            .unknown_fields(&temp.path().join("missing"))
            .unwrap();
        assert!(unknown.is_empty());
    }
}
