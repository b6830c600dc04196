//! Image asset references and resolution state.
//!
//! Documents only ever hold an [`AssetRef`]. Bytes are fetched through an
//! [`AssetStore`] by the host, which reports the outcome back into an
//! [`AssetTracker`] so a failed load shows as a placeholder instead of
//! interrupting editing.

use crate::storage::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use thiserror::Error;

/// Opaque handle to an image held by an asset store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

impl AssetRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Image data handed back by an asset store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Asset store errors.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(AssetRef),
    #[error("Asset store error: {0}")]
    Other(String),
}

/// Result type for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;

/// Resolves asset references to image data.
#[cfg(not(target_arch = "wasm32"))]
pub trait AssetStore: Send + Sync {
    /// Fetch the image behind `asset`.
    fn resolve(&self, asset: &AssetRef) -> BoxFuture<'_, AssetResult<ImageSource>>;
}

/// Resolves asset references to image data (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait AssetStore {
    /// Fetch the image behind `asset`.
    fn resolve(&self, asset: &AssetRef) -> BoxFuture<'_, AssetResult<ImageSource>>;
}

/// In-memory asset store for tests and embedding.
#[derive(Default)]
pub struct MemoryAssetStore {
    images: RwLock<HashMap<AssetRef, ImageSource>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register image data under `asset`.
    pub fn insert(&self, asset: AssetRef, image: ImageSource) -> AssetResult<()> {
        let mut images = self
            .images
            .write()
            .map_err(|e| AssetError::Other(format!("Lock error: {}", e)))?;
        images.insert(asset, image);
        Ok(())
    }
}

impl AssetStore for MemoryAssetStore {
    fn resolve(&self, asset: &AssetRef) -> BoxFuture<'_, AssetResult<ImageSource>> {
        let asset = asset.clone();
        Box::pin(async move {
            let images = self
                .images
                .read()
                .map_err(|e| AssetError::Other(format!("Lock error: {}", e)))?;
            images.get(&asset).cloned().ok_or(AssetError::NotFound(asset))
        })
    }
}

/// Load state of one asset as seen by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetState {
    /// Requested, outcome not reported yet.
    Pending,
    Ready,
    /// The store failed; draw a placeholder.
    Missing,
}

/// Tracks per-reference load state.
#[derive(Debug, Default)]
pub struct AssetTracker {
    states: HashMap<AssetRef, AssetState>,
}

impl AssetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `asset` as requested. Returns false if it already has a state.
    pub fn request(&mut self, asset: &AssetRef) -> bool {
        if self.states.contains_key(asset) {
            return false;
        }
        self.states.insert(asset.clone(), AssetState::Pending);
        true
    }

    /// Record the outcome of a resolve call.
    pub fn report<T>(&mut self, asset: &AssetRef, result: &AssetResult<T>) {
        let state = match result {
            Ok(_) => AssetState::Ready,
            Err(e) => {
                log::warn!("Asset {} unavailable: {}", asset, e);
                AssetState::Missing
            }
        };
        self.states.insert(asset.clone(), state);
    }

    /// Current state; unknown references are treated as pending.
    pub fn state(&self, asset: &AssetRef) -> AssetState {
        self.states.get(asset).copied().unwrap_or(AssetState::Pending)
    }

    /// Forget a reference so it can be requested again.
    pub fn retry(&mut self, asset: &AssetRef) {
        self.states.remove(asset);
    }

    /// Resolve `asset` through `store` and record the outcome.
    pub async fn load<S: AssetStore + ?Sized>(
        &mut self,
        store: &S,
        asset: &AssetRef,
    ) -> AssetResult<ImageSource> {
        self.states.insert(asset.clone(), AssetState::Pending);
        let result = store.resolve(asset).await;
        self.report(asset, &result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::block_on;

    fn png() -> ImageSource {
        ImageSource {
            mime_type: "image/png".to_string(),
            data: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[test]
    fn test_resolve_known_asset() {
        let store = MemoryAssetStore::new();
        store.insert(AssetRef::new("bg-cert-1"), png()).unwrap();
        let image = block_on(store.resolve(&AssetRef::new("bg-cert-1"))).unwrap();
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_tracker_marks_missing() {
        let store = MemoryAssetStore::new();
        let mut tracker = AssetTracker::new();
        let asset = AssetRef::new("missing.png");

        let result = block_on(tracker.load(&store, &asset));
        assert!(matches!(result, Err(AssetError::NotFound(_))));
        assert_eq!(tracker.state(&asset), AssetState::Missing);
    }

    #[test]
    fn test_tracker_marks_ready() {
        let store = MemoryAssetStore::new();
        let asset = AssetRef::new("logo.png");
        store.insert(asset.clone(), png()).unwrap();

        let mut tracker = AssetTracker::new();
        assert!(block_on(tracker.load(&store, &asset)).is_ok());
        assert_eq!(tracker.state(&asset), AssetState::Ready);
    }

    #[test]
    fn test_request_and_retry() {
        let mut tracker = AssetTracker::new();
        let asset = AssetRef::new("a");
        assert!(tracker.request(&asset));
        assert!(!tracker.request(&asset));
        tracker.report::<()>(&asset, &Err(AssetError::Other("offline".to_string())));
        assert_eq!(tracker.state(&asset), AssetState::Missing);
        tracker.retry(&asset);
        assert!(tracker.request(&asset));
        assert_eq!(tracker.state(&asset), AssetState::Pending);
    }

    #[test]
    fn test_asset_ref_serializes_as_string() {
        let json = serde_json::to_string(&AssetRef::new("bg/invoice-2.png")).unwrap();
        assert_eq!(json, "\"bg/invoice-2.png\"");
    }
}
