use anyhow::{Context, Result};
use std::path::PathBuf;

/// Writes each raw message to `<dir>/<id>.eml`. The directory is created on
/// demand so a fresh checkout can run without setup.
pub struct MessageArchive {
    dir: PathBuf,
}

impl MessageArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn store(&self, message_id: &str, raw: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create archive directory {:?}", self.dir))?;

        let path = self.dir.join(format!("{message_id}.eml"));
        std::fs::write(&path, raw).with_context(|| format!("write message file {path:?}"))?;
        Ok(path)
    }
}
