use crate::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// A captured PNG, stored in a temporary file that is removed on drop.
#[derive(Debug)]
pub struct SnapshotImage {
    file: NamedTempFile,
}

impl SnapshotImage {
    pub fn write(png: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("dashboard-")
            .suffix(".png")
            .tempfile()?;
        file.write_all(png)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.file.path())?)
    }
}
