use std::fmt;
use std::io;
use std::path::PathBuf;

/// Why the external converter did not produce an output card
#[derive(Debug)]
pub enum ConversionError {
    /// The converter program is not on `PATH`
    NotFound {
        /// Program name as configured
        program: String,
    },
    /// The converter could not be started
    Spawn {
        /// Program name as configured
        program: String,
        /// Underlying OS error
        source: io::Error,
    },
    /// The converter ran and reported failure
    Failed {
        /// Program name as configured
        program: String,
        /// Exit code, `None` if killed by a signal
        code: Option<i32>,
        /// Trimmed stderr of the converter
        stderr: String,
    },
    /// The converter reported success but wrote nothing
    MissingOutput {
        /// Expected output path
        path: PathBuf,
    },
}

impl ConversionError {
    /// Builds a [`ConversionError::Failed`] from raw stderr bytes
    #[must_use]
    pub fn failed(program: &str, code: Option<i32>, stderr: &[u8]) -> Self {
        Self::Failed {
            program: program.to_string(),
            code,
            stderr: extract_meaningful_message(&String::from_utf8_lossy(stderr)),
        }
    }

    /// Short description of the error type
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "Converter Not Found",
            Self::Spawn { .. } => "Spawn Failed",
            Self::Failed { .. } => "Conversion Failed",
            Self::MissingOutput { .. } => "Missing Output",
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { program } => write!(
                f,
                "converter program '{program}' not found in PATH (set [converter] command or --converter)"
            ),
            Self::Spawn { program, source } => {
                write!(f, "failed to start converter '{program}': {source}")
            }
            Self::Failed {
                program,
                code,
                stderr,
            } => {
                match code {
                    Some(code) => write!(f, "converter '{program}' exited with status {code}")?,
                    None => write!(f, "converter '{program}' was terminated by a signal")?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {stderr}")?;
                }
                Ok(())
            }
            Self::MissingOutput { path } => write!(
                f,
                "converter reported success but {} was not written",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Keeps the last few non-empty stderr lines, which is where renderers
/// print the actual failure
fn extract_meaningful_message(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let start = lines.len().saturating_sub(3);
    lines[start..].join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_keeps_tail_of_stderr() {
        let err = ConversionError::failed(
            "krita",
            Some(2),
            b"loading plugins\n\nwarn: a\nwarn: b\nfatal: cannot open file\n",
        );
        let msg = err.to_string();
        assert!(msg.contains("exited with status 2"));
        assert!(msg.ends_with("warn: a | warn: b | fatal: cannot open file"));
        assert!(!msg.contains("loading plugins"));
    }

    #[test]
    fn test_failed_without_stderr() {
        let err = ConversionError::failed("false", Some(1), b"");
        assert_eq!(err.to_string(), "converter 'false' exited with status 1");
    }

    #[test]
    fn test_signal_termination() {
        let err = ConversionError::failed("krita", None, b"");
        assert!(err.to_string().contains("terminated by a signal"));
        assert_eq!(err.error_type(), "Conversion Failed");
    }

    #[test]
    fn test_spawn_exposes_source() {
        let err = ConversionError::Spawn {
            program: "krita".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
