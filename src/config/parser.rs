use super::Config;
use crate::convert::CommandConverter;
use anyhow::{Context, Result, bail};
use std::path::Path;

/// Reads and validates a config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or
/// fails validation.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Parses and validates TOML text.
///
/// # Errors
///
/// Returns an error if the text is not valid TOML or fails validation.
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse TOML config")?;

    // Validate and return validation errors directly without wrapping
    validate_config(&config)?;
    Ok(config)
}

/// Checks the suffix pair and the converter template.
///
/// # Errors
///
/// Returns an error describing the first invalid value.
pub fn validate_config(config: &Config) -> Result<()> {
    let core = &config.core;
    for (name, suffix) in [
        ("source_suffix", &core.source_suffix),
        ("output_suffix", &core.output_suffix),
    ] {
        if suffix.len() < 2 || !suffix.starts_with('.') {
            bail!("core.{name} must start with '.' and name an extension, got '{suffix}'");
        }
        if suffix.contains(['/', '\\']) {
            bail!("core.{name} must not contain path separators, got '{suffix}'");
        }
    }

    if core.source_suffix == core.output_suffix {
        bail!(
            "core.source_suffix and core.output_suffix must differ (both '{}')",
            core.source_suffix
        );
    }

    CommandConverter::from_template(&config.converter.command)
        .context("Invalid converter.command")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_empty_gives_defaults() {
        assert_eq!(parse_config_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_partial_sections() {
        let config = parse_config_str("[core]\noutput_suffix = \".png\"\n").unwrap();
        assert_eq!(config.core.output_suffix, ".png");
        assert_eq!(config.core.source_suffix, ".kra");
        assert!(!config.core.overwrite);
    }

    #[rstest]
    #[case("[core]\nsource_suffix = \"kra\"")]
    #[case("[core]\nsource_suffix = \".\"")]
    #[case("[core]\noutput_suffix = \"\"")]
    #[case("[core]\noutput_suffix = \".a/b\"")]
    #[case("[core]\nsource_suffix = \".jpg\"")]
    #[case("[converter]\ncommand = \"\"")]
    #[case("[converter]\ncommand = \"krita {input}\"")]
    #[case("[core]\noverwrite = \"yes\"")]
    #[case("not toml {{")]
    fn test_parse_rejects(#[case] content: &str) {
        assert!(parse_config_str(content).is_err());
    }
}
