#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use cardmirror::MirrorContext;
use cardmirror::config::Config;
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Converter command used by the CLI tests; copies the card verbatim.
pub const COPY_CONVERTER: &str = "cp {input} {output}";

/// A source tree at `<tmp>/cards` and a destination at `<tmp>/rendered`.
///
/// The destination root does not exist until something is written to it.
pub struct TestTree {
    pub temp_dir: TempDir,
    pub source: PathBuf,
    pub dest: PathBuf,
}

impl TestTree {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let source = temp_dir.path().join("cards");
        let dest = temp_dir.path().join("rendered");
        fs::create_dir_all(&source)?;

        Ok(Self {
            temp_dir,
            source,
            dest,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write_source(&self, rel: &str, content: &str) -> Result<PathBuf> {
        write_file(&self.source.join(rel), content)
    }

    pub fn write_dest(&self, rel: &str, content: &str) -> Result<PathBuf> {
        write_file(&self.dest.join(rel), content)
    }

    pub fn mkdir_source(&self, rel: &str) -> Result<()> {
        fs::create_dir_all(self.source.join(rel))?;
        Ok(())
    }

    pub fn mkdir_dest(&self, rel: &str) -> Result<()> {
        fs::create_dir_all(self.dest.join(rel))?;
        Ok(())
    }

    pub fn context(&self) -> Result<MirrorContext> {
        let mut config = Config::default();
        config.core.overwrite = true;
        MirrorContext::new(&self.source, &self.dest, config)
    }

    /// `cardmirror` with colors off and an isolated (absent) config file.
    pub fn command(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("cardmirror")?;
        cmd.env("NO_COLOR", "1")
            .env("CARDMIRROR_CONFIG_PATH", self.path().join("config.toml"))
            .env_remove("CARDMIRROR_LOG");
        Ok(cmd)
    }

    /// `cardmirror build -s <source> -d <dest> --converter 'cp ...'`
    pub fn build(&self) -> Result<Command> {
        let mut cmd = self.command()?;
        cmd.arg("build")
            .arg("-s")
            .arg(&self.source)
            .arg("-d")
            .arg(&self.dest)
            .arg("--converter")
            .arg(COPY_CONVERTER);
        Ok(cmd)
    }
}

pub fn set_mtime(path: &Path, secs: i64) -> Result<()> {
    filetime::set_file_mtime(path, FileTime::from_unix_time(secs, 0))?;
    Ok(())
}

/// In-process converter: copies the source card to the destination.
pub fn copy_card(source: &Path, destination: &Path) -> Result<()> {
    fs::copy(source, destination)?;
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(path.to_path_buf())
}
