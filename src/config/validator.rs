use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;

/// Detects configuration keys that cardmirror does not recognise
pub struct ConfigValidator {
    /// Set of valid configuration fields that are recognized by cardmirror
    known_fields: HashSet<&'static str>,
    /// Sections whose leaf keys are listed in `known_fields`
    known_sections: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_sections = HashSet::from(["core", "converter"]);
        let known_fields = HashSet::from([
            "core.source_suffix",
            "core.output_suffix",
            "core.overwrite",
            "converter.command",
        ]);

        Self {
            known_fields,
            known_sections,
        }
    }

    /// Lists unknown keys in a config file
    ///
    /// A missing file has no unknown keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn unknown_fields(&self, config_path: &Path) -> Result<Vec<String>> {
        if !config_path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(config_path)?;
        self.unknown_fields_in(&content)
    }

    /// Lists unknown keys in TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML
    pub fn unknown_fields_in(&self, content: &str) -> Result<Vec<String>> {
        let parsed: toml::Table = toml::from_str(content)?;
        let mut unknown = Vec::new();

        for (section, value) in &parsed {
            if !self.known_sections.contains(section.as_str()) {
                unknown.push(section.clone());
                continue;
            }
            let toml::Value::Table(map) = value else {
                unknown.push(section.clone());
                continue;
            };
            for key in map.keys() {
                let full_key = format!("{section}.{key}");
                if !self.known_fields.contains(full_key.as_str()) {
                    unknown.push(full_key);
                }
            }
        }

        Ok(unknown)
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

    #[test]
    fn test_known_fields_pass() {
        let validator = ConfigValidator::new();
        let unknown = validator
            .unknown_fields_in(
                "[core]\nsource_suffix = \".kra\"\noverwrite = true\n[converter]\ncommand = \"x {input} {output}\"\n",
            )
            .unwrap();
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_unknown_fields_reported() {
        let validator = ConfigValidator::new();
        let mut unknown = validator
            .unknown_fields_in("[core]\nsource_sufix = \".kra\"\n[render]\nthreads = 4\n")
            .unwrap();
        unknown.sort();
        assert_eq!(unknown, vec!["core.source_sufix", "render"]);
    }

    #[test]
    fn test_section_that_is_not_a_table() {
        let validator = ConfigValidator::new();
        let unknown = validator.unknown_fields_in("core = 3\n").unwrap();
        assert_eq!(unknown, vec!["core"]);
    }

    #[test]
    fn test_missing_file_has_no_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let validator = ConfigValidator::default();
        assert!(
            validator
                .unknown_fields(&dir.path().join("none.toml"))
                .unwrap()
                .is_empty()
        );
    }
}
