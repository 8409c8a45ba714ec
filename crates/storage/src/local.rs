use crate::{BlobStore, StorageError, Upload, Visibility};
use async_trait::async_trait;
use log::debug;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Stores files on the local disk.
///
/// Public files live under `<root>/public` and are expected to be served at
/// `<public_base_url>/storage/...`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    /// Creates the public and private directories if they are missing
    pub async fn open(
        root: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let root = root.into();
        for visibility in [Visibility::Public, Visibility::Private] {
            let dir = root.join(visibility.prefix());
            fs::create_dir_all(&dir)
                .await
                .map_err(|e| StorageError::io(dir.display().to_string(), e))?;
        }

        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    /// Directory holding public files, for static serving
    pub fn public_root(&self) -> PathBuf {
        self.root.join(Visibility::Public.prefix())
    }

    /// Joins a stored path to the root, refusing anything that could escape it
    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let mut resolved = self.root.clone();

        for component in relative.components() {
            match component {
                Component::Normal(segment) => resolved.push(segment),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StorageError::PathTraversal(path.to_owned()));
                }
            }
        }

        if resolved == self.root {
            return Err(StorageError::NotFound(path.to_owned()));
        }
        Ok(resolved)
    }
}

#[async_trait]
impl BlobStore for LocalStorage {
    async fn put(
        &self,
        dir: &str,
        upload: &Upload,
        visibility: Visibility,
    ) -> Result<String, StorageError> {
        let file_name = match upload.extension() {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };
        let path = format!(
            "{}/{}/{file_name}",
            visibility.prefix(),
            dir.trim_matches('/')
        );
        let target = self.resolve(&path)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(&path, e))?;
        }

        // Write next to the target then rename, so readers never see a partial file
        let tmp = target.with_extension("part");
        let mut file = fs::File::create(&tmp)
            .await
            .map_err(|e| StorageError::io(&path, e))?;
        file.write_all(&upload.bytes)
            .await
            .map_err(|e| StorageError::io(&path, e))?;
        file.sync_all()
            .await
            .map_err(|e| StorageError::io(&path, e))?;
        drop(file);
        fs::rename(&tmp, &target)
            .await
            .map_err(|e| StorageError::io(&path, e))?;

        debug!("Stored {} bytes at {path}", upload.bytes.len());
        Ok(path)
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let target = self.resolve(path)?;
        fs::read(&target).await.map_err(|e| StorageError::io(path, e))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        fs::remove_file(&target)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        debug!("Deleted {path}");
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let target = self.resolve(path)?;
        fs::try_exists(&target)
            .await
            .map_err(|e| StorageError::io(path, e))
    }

    fn url(&self, path: &str) -> Option<String> {
        let public = path.strip_prefix(Visibility::Public.prefix())?;
        let public = public.strip_prefix('/')?;
        Some(format!("{}/storage/{public}", self.public_base_url))
    }
}
