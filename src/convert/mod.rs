//! # Converter Collaborator
//!
//! The converter renders one source card into one output card. The core only
//! cares about the binary outcome: `Ok(())` means a readable output exists at
//! the destination path, anything else is fatal to the run.
//!
//! The production implementation is [`CommandConverter`], which runs an
//! external program built from a shell-like template:
//!
//! ```text
//! krita {input} --export --export-filename {output}
//! ```
//!
//! `{input}` and `{output}` are replaced with the absolute source and
//! destination paths. The program is looked up on `PATH`, spawned in its own
//! process group, and waited for without a timeout.
//!
//! Tests drive the pipeline with closures instead: any
//! `Fn(&Path, &Path) -> anyhow::Result<()>` is a [`Converter`].

/// Converter error categorization
pub mod errors;

pub use errors::ConversionError;

use anyhow::{Context, Result, bail};
use command_group::CommandGroup;
use std::cell::OnceCell;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{Level, debug, span};

/// Placeholder for the absolute source path.
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Placeholder for the absolute destination path.
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Renders a single card.
pub trait Converter {
    /// Converts `source` into `destination`; both paths are absolute.
    ///
    /// # Errors
    ///
    /// Returns an error if the output could not be produced.
    fn convert(&self, source: &Path, destination: &Path) -> Result<()>;

    /// Checks the converter can run at all, before the first card.
    ///
    /// # Errors
    ///
    /// Returns an error if no conversion could possibly succeed.
    fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }
}

impl<F> Converter for F
where
    F: Fn(&Path, &Path) -> Result<()>,
{
    fn convert(&self, source: &Path, destination: &Path) -> Result<()> {
        self(source, destination)
    }
}

/// Runs an external program per card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandConverter {
    /// Program name or path.
    program: String,
    /// Argument templates, placeholders unexpanded.
    args: Vec<String>,
    /// Program path found on `PATH`, looked up on first use.
    resolved: OnceCell<PathBuf>,
}

impl CommandConverter {
    /// Parses a command template.
    ///
    /// Handles shell-like quoting, so paths with spaces in the template stay
    /// one argument:
    /// - `"krita {input} --export --export-filename {output}"`
    /// - `"'/opt/My Tools/render' -o {output} {input}"`
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not parse, is empty, or lacks
    /// either placeholder.
    pub fn from_template(template: &str) -> Result<Self> {
        let parts = shell_words::split(template)
            .with_context(|| format!("Invalid converter command syntax: '{template}'"))?;

        let Some((program, args)) = parts.split_first() else {
            bail!("Empty converter command");
        };

        for placeholder in [INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER] {
            if !args.iter().any(|a| a.contains(placeholder)) {
                bail!("Converter command '{template}' must contain the {placeholder} placeholder");
            }
        }

        debug!(program = %program, args = ?args, "Converter command parsed");

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            resolved: OnceCell::new(),
        })
    }

    /// Program name as configured.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Expands the argument templates for one card.
    ///
    /// Placeholders are replaced by the raw OS paths, so names that are not
    /// valid UTF-8 reach the program unchanged.
    #[must_use]
    pub fn render_args(&self, source: &Path, destination: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| substitute(arg, source.as_os_str(), destination.as_os_str()))
            .collect()
    }

    /// Resolves the program on `PATH`, once per converter.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::NotFound`] if the program cannot be found.
    pub fn ensure_available(&self) -> Result<&Path, ConversionError> {
        if let Some(path) = self.resolved.get() {
            return Ok(path);
        }
        let path = which::which(&self.program).map_err(|_| ConversionError::NotFound {
            program: self.program.clone(),
        })?;
        debug!(program = %path.display(), "Converter resolved");
        Ok(self.resolved.get_or_init(|| path))
    }
}

/// Replaces every placeholder in `arg`, left to right.
fn substitute(arg: &str, input: &OsStr, output: &OsStr) -> OsString {
    let mut rendered = OsString::new();
    let mut rest = arg;

    loop {
        let next = [(INPUT_PLACEHOLDER, input), (OUTPUT_PLACEHOLDER, output)]
            .into_iter()
            .filter_map(|(placeholder, value)| {
                rest.find(placeholder).map(|at| (at, placeholder, value))
            })
            .min_by_key(|&(at, _, _)| at);

        let Some((at, placeholder, value)) = next else {
            rendered.push(rest);
            return rendered;
        };
        rendered.push(&rest[..at]);
        rendered.push(value);
        rest = &rest[at + placeholder.len()..];
    }
}

impl Converter for CommandConverter {
    fn ensure_ready(&self) -> Result<()> {
        self.ensure_available()?;
        Ok(())
    }

    fn convert(&self, source: &Path, destination: &Path) -> Result<()> {
        let span = span!(Level::DEBUG, "convert", program = %self.program);
        let _guard = span.enter();

        let program = self.ensure_available()?;
        let args = self.render_args(source, destination);
        debug!(program = %program.display(), args = ?args, "Spawning converter");

        // Process group so a renderer's helper processes are reaped with it.
        let child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .group_spawn()
            .map_err(|source| ConversionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let output = child
            .wait_with_output()
            .map_err(|source| ConversionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        debug!(exit_code = ?output.status.code(), "Converter finished");

        if !output.status.success() {
            return Err(
                ConversionError::failed(&self.program, output.status.code(), &output.stderr).into(),
            );
        }

        if !destination.is_file() {
            return Err(ConversionError::MissingOutput {
                path: destination.to_path_buf(),
            }
            .into());
        }

        Ok(())
    }
}
