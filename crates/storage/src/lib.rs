//! Blob storage for uploaded files.
//!
//! Stored paths are relative and start with their visibility (`public/` or
//! `private/`), so a path alone tells whether it may be served by URL.

mod error;
mod local;

pub use error::StorageError;
pub use local::LocalStorage;

use async_trait::async_trait;
use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

/// A file received from a client
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Lowercase alphanumeric extension of the client file name, if any
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.file_name.rsplit_once('.')?;
        let ext: String = ext
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(8)
            .collect::<String>()
            .to_ascii_lowercase();
        (!ext.is_empty()).then_some(ext)
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores the upload under `dir` with a fresh name and returns its path
    async fn put(
        &self,
        dir: &str,
        upload: &Upload,
        visibility: Visibility,
    ) -> Result<String, StorageError>;

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Public URL of a stored file; private files have none
    fn url(&self, path: &str) -> Option<String>;
}

/// Deletes a file without failing the caller.
///
/// Cleanup of replaced or orphaned files is best-effort.
pub async fn discard(store: &dyn BlobStore, path: Option<&str>) {
    let Some(path) = path else { return };

    match store.delete(path).await {
        Ok(()) | Err(StorageError::NotFound(_)) => {}
        Err(e) => warn!("Failed to delete stored file {path}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> Upload {
        Upload {
            file_name: name.to_owned(),
            content_type: None,
            bytes: Vec::new(),
        }
    }

    #[test]
    fn test_extension_is_sanitized() {
        assert_eq!(upload("cours.PDF").extension().as_deref(), Some("pdf"));
        assert_eq!(upload("archive.tar.gz").extension().as_deref(), Some("gz"));
        assert_eq!(upload("../evil.p/h p").extension().as_deref(), Some("php"));
        assert_eq!(upload("README").extension(), None);
    }
}
