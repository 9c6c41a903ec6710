#[cfg(test)]
pub mod fixtures {
    use crate::MirrorContext;
    use crate::config::Config;
    use anyhow::Result;
    use filetime::FileTime;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A temporary source/destination pair. The destination root is not
    /// created until something is written into it.
    pub struct TestTree {
        pub temp_dir: TempDir,
        pub source: PathBuf,
        pub dest: PathBuf,
    }

    impl TestTree {
        pub fn new() -> Result<Self> {
            let temp_dir = tempfile::tempdir()?;
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

        pub fn source(&self) -> &Path {
            &self.source
        }

        pub fn dest(&self) -> &Path {
            &self.dest
        }

        pub fn write_source(&self, rel: &str, content: &str) -> Result<PathBuf> {
            write_file(&self.source.join(rel), content)
        }

        pub fn write_dest(&self, rel: &str, content: &str) -> Result<PathBuf> {
            write_file(&self.dest.join(rel), content)
        }

        pub fn set_mtime(&self, path: &Path, secs: i64) -> Result<()> {
            filetime::set_file_mtime(path, FileTime::from_unix_time(secs, 0))?;
            Ok(())
        }

        pub fn context(&self) -> Result<MirrorContext> {
            MirrorContext::new(&self.source, &self.dest, Config::default())
        }
    }

    fn write_file(path: &Path, content: &str) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(path.to_path_buf())
    }
}
