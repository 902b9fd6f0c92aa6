//! Uploaded file handling: validation and storage under the media root.

pub mod processing;

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

pub use processing::{inspect_image, DetectedImage};

/// Relative directory recipe images live in.
pub const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("{0}")]
    InvalidImage(String),

    #[error("Refusing to touch path outside the media root: {0}")]
    InvalidPath(String),

    #[error("Media storage failed: {0}")]
    Io(#[from] io::Error),
}

/// A fresh, collision-free relative path for a recipe image, e.g.
/// `uploads/recipe/3f0c...e1.png`.
pub fn recipe_image_path(extension: &str) -> String {
    format!("{}/{}.{}", RECIPE_IMAGE_DIR, Uuid::new_v4(), extension)
}

/// Filesystem-backed storage rooted at a single directory.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    base_url: String,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL for a stored relative path.
    pub fn url(&self, relative: &str) -> String {
        format!("{}{}", self.base_url, relative)
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, MediaError> {
        let rel = Path::new(relative);
        let safe = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(MediaError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(rel))
    }

    pub async fn save(&self, relative: &str, data: &[u8]) -> Result<(), MediaError> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "stored media file");
        Ok(())
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn delete(&self, relative: &str) -> Result<(), MediaError> {
        let path = self.resolve(relative)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_image_path_is_unique() {
        let a = recipe_image_path("png");
        let b = recipe_image_path("png");
        assert!(a.starts_with("uploads/recipe/"));
        assert!(a.ends_with(".png"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_url_joins_base() {
        let storage = MediaStorage::new("media", "/media/");
        assert_eq!(
            storage.url("uploads/recipe/x.png"),
            "/media/uploads/recipe/x.png"
        );
    }

    #[tokio::test]
    async fn test_save_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = MediaStorage::new(dir.path(), "/media/");
        let rel = recipe_image_path("png");

        storage.save(&rel, b"data").await.unwrap();
        assert_eq!(std::fs::read(dir.path().join(&rel)).unwrap(), b"data");

        storage.delete(&rel).await.unwrap();
        assert!(!dir.path().join(&rel).exists());
        storage.delete(&rel).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let storage = MediaStorage::new("media", "/media/");
        assert!(matches!(
            storage.save("../etc/passwd", b"x").await,
            Err(MediaError::InvalidPath(_))
        ));
        assert!(matches!(
            storage.save("/abs/path", b"x").await,
            Err(MediaError::InvalidPath(_))
        ));
    }
}
