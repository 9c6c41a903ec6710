//! Configuration for cardmirror.
//!
//! ```toml
//! [core]
//! source_suffix = ".kra"
//! output_suffix = ".jpg"
//! overwrite = false
//!
//! [converter]
//! command = "krita {input} --export --export-filename {output}"
//! ```
//!
//! Every field is optional; missing ones take the defaults above. Command
//! line flags are applied on top through [`Overrides`].

/// TOML parsing and value validation
pub mod parser;
/// Unknown-key detection
pub mod validator;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default tracked source suffix (Krita documents).
pub const DEFAULT_SOURCE_SUFFIX: &str = ".kra";

/// Default rendered output suffix.
pub const DEFAULT_OUTPUT_SUFFIX: &str = ".jpg";

/// Default converter invocation.
pub const DEFAULT_CONVERTER_COMMAND: &str = "krita {input} --export --export-filename {output}";

/// Main configuration structure
///
/// # Examples
///
/// ```
/// use cardmirror::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.core.source_suffix, ".kra");
/// assert_eq!(config.core.output_suffix, ".jpg");
/// assert!(!config.core.overwrite);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Suffix mapping and destination policy
    #[serde(default)]
    pub core: CoreConfig,

    /// External converter settings
    #[serde(default)]
    pub converter: ConverterConfig,
}

/// The `[core]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Suffix of tracked source cards, e.g. `.kra`.
    #[serde(default = "default_source_suffix")]
    pub source_suffix: String,
    /// Suffix of rendered output cards, e.g. `.jpg`.
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
    /// Allow `build` into a destination root that already exists.
    #[serde(default)]
    pub overwrite: bool,
}

/// The `[converter]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Shell-like command template with `{input}` and `{output}` placeholders.
    #[serde(default = "default_converter_command")]
    pub command: String,
}

/// Values given on the command line, applied over the file configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--source-suffix`
    pub source_suffix: Option<String>,
    /// `--output-suffix`
    pub output_suffix: Option<String>,
    /// `--converter`
    pub converter: Option<String>,
    /// `--overwrite`; can only switch overwriting on
    pub overwrite: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            source_suffix: default_source_suffix(),
            output_suffix: default_output_suffix(),
            overwrite: false,
        }
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            command: default_converter_command(),
        }
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot read or parse the configuration file
    /// - Configuration file contains invalid TOML
    /// - A value fails validation
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
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
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create config file: {}", path.display()))?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }

    /// Applies command-line overrides and re-validates the result
    ///
    /// # Errors
    ///
    /// Returns an error if the overridden configuration is invalid
    pub fn apply(&mut self, overrides: &Overrides) -> Result<()> {
        if let Some(suffix) = &overrides.source_suffix {
            self.core.source_suffix.clone_from(suffix);
        }
        if let Some(suffix) = &overrides.output_suffix {
            self.core.output_suffix.clone_from(suffix);
        }
        if let Some(command) = &overrides.converter {
            self.converter.command.clone_from(command);
        }
        if overrides.overwrite {
            self.core.overwrite = true;
        }
        parser::validate_config(self)
    }
}

/// Platform config file location, e.g. `~/.config/cardmirror/config.toml`
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(crate::DEFAULT_CONFIG_PATH))
}

// Default functions for serde
fn default_source_suffix() -> String {
    DEFAULT_SOURCE_SUFFIX.to_string()
}

fn default_output_suffix() -> String {
    DEFAULT_OUTPUT_SUFFIX.to_string()
}

fn default_converter_command() -> String {
    DEFAULT_CONVERTER_COMMAND.to_string()
}
