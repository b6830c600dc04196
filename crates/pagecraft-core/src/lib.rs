//! Pagecraft Core Library
//!
//! Canvas document engine for the Pagecraft template designer: multi-page
//! documents of positioned elements, snapping geometry, selection with link
//! groups, and undo/redo history behind every edit.

pub mod assets;
pub mod config;
pub mod document;
pub mod editor;
pub mod element;
pub mod export;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod selection;
pub mod storage;
pub mod templates;
pub mod viewport;

#[cfg(test)]
mod test_util;

pub use assets::{AssetError, AssetRef, AssetState, AssetStore, AssetTracker, ImageSource, MemoryAssetStore};
pub use config::{ConfigError, EditorConfig};
pub use document::{Document, DocumentError, DocumentResult, Page, PageId, DEFAULT_PAGE_SIZE};
pub use editor::Editor;
pub use element::{
    Element, ElementError, ElementId, ElementPatch, ElementProps, LinkGroupId, PropsPatch, SerializableColor,
    ShapeKind,
};
pub use export::{ExportError, ExportFormat, ExportRequest, Exporter};
pub use geometry::{HandleKind, SnapAxis, SnapGuide, SnapKind};
pub use history::{History, HistoryEntry, HistoryOutcome};
pub use interaction::{Gesture, Modifiers};
pub use selection::{SelectMode, Selection};
pub use storage::{MemoryStorage, Storage, StorageError, StorageResult};
pub use templates::{TemplateError, TemplateKind, TemplateManifest};
pub use viewport::Viewport;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
