//! Upload storage for supporting documents.
//!
//! Files are written under the uploads directory with a generated name
//! (`<uuid v4><original extension>`), so user-supplied names never reach the
//! filesystem. The database keeps the path as `<uploads>/<file>`.

use crate::errors::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Largest accepted document, in bytes (5 MiB).
pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

/// MIME types accepted for supporting documents.
pub const ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["application/pdf", "image/jpeg", "image/jpg", "image/png"];

/// A document as received from the upload form.
#[derive(Debug, Clone, Default)]
pub struct UploadedDocument {
    /// Name the browser sent, used only for its extension
    pub file_name: String,
    /// MIME type sent with the file
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    /// Checks the MIME type and the size limit, in that order.
    pub fn validate(&self) -> Result<()> {
        if !ALLOWED_CONTENT_TYPES.contains(&self.content_type.as_str()) {
            return Err(Error::validation(
                "Invalid document format. Please upload PDF, JPG, or PNG files only",
            ));
        }
        if self.bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(Error::validation("Document size exceeds the 5MB limit"));
        }
        Ok(())
    }
}

/// Directory-backed document store.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Store rooted at `root`; the directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the documents are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `document` under a fresh name and returns the stored path.
    ///
    /// The directory is created on first use.
    pub async fn save(&self, document: &UploadedDocument) -> Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;

        let file_name = format!(
            "{}{}",
            uuid::Uuid::new_v4(),
            extension_of(&document.file_name)
        );
        let path = self.root.join(&file_name);
        tokio::fs::write(&path, &document.bytes).await?;

        debug!(
            "Stored document {} ({} bytes)",
            path.display(),
            document.bytes.len()
        );
        Ok(path.to_string_lossy().into_owned())
    }

    /// Reads a stored document back.
    pub async fn read(&self, stored_path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(self.resolve(stored_path)?)
            .await
            .map_err(Into::into)
    }

    /// Removes a stored document. A file that is already gone is not an error.
    pub async fn remove(&self, stored_path: &str) {
        let path = match self.resolve(stored_path) {
            Ok(path) => path,
            Err(e) => {
                warn!("Refusing to remove {stored_path}: {e}");
                return;
            }
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove document {}: {e}", path.display());
            }
        }
    }

    /// Maps a stored path back to a file inside the store.
    ///
    /// Only the file name is kept, so a tampered path cannot leave the root.
    fn resolve(&self, stored_path: &str) -> Result<PathBuf> {
        Path::new(stored_path)
            .file_name()
            .map(|name| self.root.join(name))
            .ok_or_else(|| Error::validation(format!("Invalid document path '{stored_path}'")))
    }
}

/// Lower-cased extension with its dot, or an empty string.
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn pdf(bytes: usize) -> UploadedDocument {
        UploadedDocument {
            file_name: "card.PDF".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: vec![b'x'; bytes],
        }
    }

    #[test]
    fn test_validate_content_type_before_size() {
        let mut doc = pdf(MAX_DOCUMENT_BYTES + 1);
        doc.content_type = "text/plain".to_string();
        assert!(matches!(
            doc.validate(),
            Err(Error::Validation { ref message }) if message.starts_with("Invalid document format")
        ));
    }

    #[test]
    fn test_validate_size_limit() {
        assert!(pdf(MAX_DOCUMENT_BYTES).validate().is_ok());
        assert!(matches!(
            pdf(MAX_DOCUMENT_BYTES + 1).validate(),
            Err(Error::Validation { ref message }) if message == "Document size exceeds the 5MB limit"
        ));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("card.PDF"), ".pdf");
        assert_eq!(extension_of("photo.jpeg"), ".jpeg");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of("weird.p/df"), "");
    }

    #[tokio::test]
    async fn test_save_read_remove() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = UploadStore::new(dir.path().join("uploads"));

        let path = store.save(&pdf(16)).await?;
        assert!(path.ends_with(".pdf"));
        assert!(Path::new(&path).starts_with(store.root()));
        assert_eq!(store.read(&path).await?.len(), 16);

        // generated names never collide
        let other = store.save(&pdf(16)).await?;
        assert_ne!(path, other);

        store.remove(&path).await;
        assert!(store.read(&path).await.is_err());
        // second removal is quiet
        store.remove(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn test_read_cannot_escape_root() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = UploadStore::new(dir.path().join("uploads"));
        std::fs::write(dir.path().join("secret.txt"), b"secret")?;

        assert!(store.read("uploads/../secret.txt").await.is_err());
        Ok(())
    }
}
