//! Transient image staging for the detection service.
//!
//! An image is written under a fresh random key, handed to the detector by
//! reference, and deleted once the detection call returns. [`StagedGuard`]
//! also deletes it when the request is dropped mid-detection.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Staging store lock poisoned")]
    Poisoned,
}

/// Reference to a staged object, as passed to the detection service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedImage {
    pub bucket: String,
    pub key: String,
}

/// `uploads/<uuid-v4>.jpg`
pub fn new_staging_key() -> String {
    format!("uploads/{}.jpg", Uuid::new_v4())
}

pub trait ImageStore: Send + Sync + 'static {
    fn put(&self, bytes: Vec<u8>) -> impl Future<Output = Result<StagedImage, StagingError>> + Send;

    /// Deleting an object that no longer exists succeeds.
    fn delete(&self, image: &StagedImage) -> impl Future<Output = Result<(), StagingError>> + Send;
}

/// Owns a staged object until it is released. Dropping an unreleased guard
/// schedules the delete on the current runtime.
pub struct StagedGuard<S: ImageStore> {
    store: Arc<S>,
    image: StagedImage,
    released: bool,
}

impl<S: ImageStore> StagedGuard<S> {
    pub fn new(store: Arc<S>, image: StagedImage) -> Self {
        Self {
            store,
            image,
            released: false,
        }
    }

    pub fn image(&self) -> &StagedImage {
        &self.image
    }

    /// Delete now. Failures are logged, not returned.
    pub async fn release(mut self) {
        delete_logged(self.store.as_ref(), &self.image).await;
        self.released = true;
    }
}

impl<S: ImageStore> Drop for StagedGuard<S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let store = Arc::clone(&self.store);
        let image = self.image.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(key = %image.key, "Request dropped, deleting staged image");
                handle.spawn(async move { delete_logged(store.as_ref(), &image).await });
            }
            Err(_) => {
                tracing::warn!(key = %image.key, "No runtime to delete staged image");
            }
        }
    }
}

async fn delete_logged<S: ImageStore>(store: &S, image: &StagedImage) {
    if let Err(e) = store.delete(image).await {
        tracing::warn!(error = %e, key = %image.key, "Failed to delete staged image");
    }
}

/// Stages images on the local filesystem under `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
    bucket: String,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
        }
    }

    pub fn path_of(&self, image: &StagedImage) -> PathBuf {
        self.root.join(&image.bucket).join(&image.key)
    }
}

impl ImageStore for FsImageStore {
    async fn put(&self, bytes: Vec<u8>) -> Result<StagedImage, StagingError> {
        let image = StagedImage {
            bucket: self.bucket.clone(),
            key: new_staging_key(),
        };
        let path = self.path_of(&image);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!(key = %image.key, bytes = bytes.len(), "Staged image");
        Ok(image)
    }

    async fn delete(&self, image: &StagedImage) -> Result<(), StagingError> {
        match tokio::fs::remove_file(self.path_of(image)).await {
            Ok(()) => {
                tracing::debug!(key = %image.key, "Deleted staged image");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, used by tests and local runs without a staging directory.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    bucket: String,
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryImageStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Number of objects currently staged.
    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(key).cloned()
    }
}

impl ImageStore for MemoryImageStore {
    async fn put(&self, bytes: Vec<u8>) -> Result<StagedImage, StagingError> {
        let image = StagedImage {
            bucket: self.bucket.clone(),
            key: new_staging_key(),
        };
        self.objects
            .lock()
            .map_err(|_| StagingError::Poisoned)?
            .insert(image.key.clone(), bytes);
        Ok(image)
    }

    async fn delete(&self, image: &StagedImage) -> Result<(), StagingError> {
        self.objects
            .lock()
            .map_err(|_| StagingError::Poisoned)?
            .remove(&image.key);
        Ok(())
    }
}
