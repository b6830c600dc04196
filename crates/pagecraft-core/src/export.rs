//! Export collaborator interface.
//!
//! Rasterizing and saving is done by the host. The engine only builds the
//! request and guarantees it is issued against committed state.

use crate::storage::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base name used when sanitizing leaves nothing.
pub const FALLBACK_BASE_NAME: &str = "document";

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Cannot export while an edit is in progress")]
    EditPending,
    #[error("Page {0} does not exist")]
    MissingPage(usize),
    #[error("Export failed: {0}")]
    Failed(String),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// What to export and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Identifier of the rendered page container (the page id).
    pub container_id: String,
    /// File name without extension, safe for any filesystem.
    pub file_base_name: String,
    pub format: ExportFormat,
}

impl ExportRequest {
    pub fn new(container_id: impl Into<String>, base_name: &str, format: ExportFormat) -> Self {
        Self {
            container_id: container_id.into(),
            file_base_name: sanitize_file_base_name(base_name),
            format,
        }
    }

    /// Base name plus extension.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.file_base_name, self.format.extension())
    }
}

/// Reduce a user-supplied name to `[A-Za-z0-9_-]`, collapsing runs of
/// anything else into a single `-`.
pub fn sanitize_file_base_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        FALLBACK_BASE_NAME.to_string()
    } else {
        out
    }
}

/// Rasterize-and-save backend provided by the host.
#[cfg(not(target_arch = "wasm32"))]
pub trait Exporter: Send + Sync {
    fn export(&self, request: &ExportRequest) -> BoxFuture<'_, ExportResult<()>>;
}

/// Rasterize-and-save backend provided by the host (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Exporter {
    fn export(&self, request: &ExportRequest) -> BoxFuture<'_, ExportResult<()>>;
}
