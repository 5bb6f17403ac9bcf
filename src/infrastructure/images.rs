use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::BotResult;
use crate::domain::caption::sanitize_filename;

/// Directory that holds downloaded images for the duration of a run.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{}.jpg", sanitize_filename(label)))
    }

    /// Write `bytes` to `<dir>/<sanitized label>.jpg`, creating the directory if needed.
    pub async fn save(&self, label: &str, bytes: &[u8]) -> BotResult<LocalImage> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(label);
        tokio::fs::write(&path, bytes).await?;
        let size = tokio::fs::metadata(&path).await?.len();

        debug!(path = %path.display(), size, "saved image");
        Ok(LocalImage {
            path,
            size,
            removed: false,
        })
    }
}

/// A downloaded image on disk. The file is removed when this value is dropped
/// unless [`LocalImage::remove`] already did so.
#[derive(Debug)]
pub struct LocalImage {
    path: PathBuf,
    size: u64,
    removed: bool,
}

impl LocalImage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size on disk in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub async fn read(&self) -> BotResult<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    pub async fn remove(mut self) -> BotResult<()> {
        tokio::fs::remove_file(&self.path).await?;
        self.removed = true;
        debug!(path = %self.path.display(), "removed image");
        Ok(())
    }
}

impl Drop for LocalImage {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(err) = std::fs::remove_file(&self.path)
            && err.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %self.path.display(), error = %err, "failed to remove image");
        }
    }
}
