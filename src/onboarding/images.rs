//! Display references for accepted profile images.
//!
//! The controller never keeps an uploaded file around. It hands the file to
//! an `ImageStore`, keeps the returned `ImageRef`, and releases the reference
//! again once a newer upload replaces it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use super::model::{ImageFile, ImageRef};

/// Turns accepted uploads into stable references the host can render.
pub trait ImageStore: Send + Sync {
    /// Take ownership of `file` and return a reference to it.
    fn register(&self, file: ImageFile) -> ImageRef;

    /// Drop the file behind `image_ref`. Unknown references are ignored.
    fn release(&self, image_ref: &ImageRef);
}

/// In-memory store handing out `blob:onboarding/<uuid>` references.
#[derive(Debug, Clone, Default)]
pub struct ObjectUrlRegistry {
    files: Arc<Mutex<HashMap<ImageRef, ImageFile>>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the file behind a reference.
    pub fn resolve(&self, image_ref: &ImageRef) -> Option<ImageFile> {
        self.lock().get(image_ref).cloned()
    }

    /// Number of live references.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ImageRef, ImageFile>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ImageStore for ObjectUrlRegistry {
    fn register(&self, file: ImageFile) -> ImageRef {
        let image_ref = ImageRef::new(format!("blob:onboarding/{}", Uuid::new_v4()));
        debug!(
            image_ref = %image_ref,
            file_name = %file.file_name,
            bytes = file.data.len(),
            "Registered profile image"
        );
        self.lock().insert(image_ref.clone(), file);
        image_ref
    }

    fn release(&self, image_ref: &ImageRef) {
        if self.lock().remove(image_ref).is_some() {
            debug!(image_ref = %image_ref, "Released profile image");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> ImageFile {
        ImageFile::new(name, Some("image/png"), vec![1, 2, 3])
    }

    #[test]
    fn register_returns_unique_blob_refs() {
        let registry = ObjectUrlRegistry::new();
        let a = registry.register(png("a.png"));
        let b = registry.register(png("b.png"));
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("blob:onboarding/"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn resolve_returns_registered_file() {
        let registry = ObjectUrlRegistry::new();
        let r = registry.register(png("me.png"));
        let file = registry.resolve(&r).unwrap();
        assert_eq!(file.file_name, "me.png");
        assert_eq!(file.data, vec![1, 2, 3]);
    }

    #[test]
    fn release_forgets_the_file() {
        let registry = ObjectUrlRegistry::new();
        let r = registry.register(png("me.png"));
        registry.release(&r);
        assert!(registry.resolve(&r).is_none());
        assert!(registry.is_empty());
        // Releasing twice is harmless.
        registry.release(&r);
    }

    #[test]
    fn clones_share_storage() {
        let registry = ObjectUrlRegistry::new();
        let handle = registry.clone();
        let r = handle.register(png("me.png"));
        assert!(registry.resolve(&r).is_some());
    }
}
