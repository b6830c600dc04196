//! Template manifests: background images per template kind.

use crate::assets::AssetRef;
use crate::document::{Document, Page, DEFAULT_PAGE_SIZE};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Template manifest errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Invalid manifest JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unknown template kind: {0}")]
    UnknownKind(String),
    #[error("Manifest for {0} lists no backgrounds")]
    NoBackgrounds(TemplateKind),
    #[error("Background {index} out of range ({count} available)")]
    BackgroundOutOfRange { index: usize, count: usize },
}

/// Kinds of business template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Certificate,
    Invoice,
    Quote,
}

impl TemplateKind {
    pub fn name(&self) -> &'static str {
        match self {
            TemplateKind::Certificate => "certificate",
            TemplateKind::Invoice => "invoice",
            TemplateKind::Quote => "quote",
        }
    }

    /// Certificates are landscape, the rest portrait.
    pub fn default_page_size(&self) -> Size {
        match self {
            TemplateKind::Certificate => Size::new(DEFAULT_PAGE_SIZE.height, DEFAULT_PAGE_SIZE.width),
            TemplateKind::Invoice | TemplateKind::Quote => DEFAULT_PAGE_SIZE,
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TemplateKind {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "certificate" => Ok(TemplateKind::Certificate),
            "invoice" => Ok(TemplateKind::Invoice),
            "quote" => Ok(TemplateKind::Quote),
            _ => Err(TemplateError::UnknownKind(s.to_string())),
        }
    }
}

/// Static list of backgrounds offered for one template kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateManifest {
    pub kind: TemplateKind,
    pub backgrounds: Vec<AssetRef>,
    /// Overrides the kind's default page size.
    #[serde(default)]
    pub page_size: Option<Size>,
}

impl TemplateManifest {
    /// Parse a manifest. Empty background identifiers are dropped.
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        let mut manifest: Self = serde_json::from_str(json)?;
        manifest.backgrounds.retain(|b| !b.is_empty());
        log::debug!(
            "Loaded {} manifest with {} backgrounds",
            manifest.kind,
            manifest.backgrounds.len()
        );
        Ok(manifest)
    }

    pub fn page_size(&self) -> Size {
        self.page_size.unwrap_or_else(|| self.kind.default_page_size())
    }

    pub fn background(&self, index: usize) -> Result<&AssetRef, TemplateError> {
        if self.backgrounds.is_empty() {
            return Err(TemplateError::NoBackgrounds(self.kind));
        }
        self.backgrounds
            .get(index)
            .ok_or(TemplateError::BackgroundOutOfRange {
                index,
                count: self.backgrounds.len(),
            })
    }
}

impl Document {
    /// One-page document using background `background` of `manifest`.
    pub fn from_template(
        name: impl Into<String>,
        manifest: &TemplateManifest,
        background: usize,
    ) -> Result<Self, TemplateError> {
        let background = manifest.background(background)?.clone();
        let mut page = Page::new(manifest.page_size());
        page.background = Some(background);

        let document = Document::with_page(name, page);
        log::info!("Created {} document {}", manifest.kind, document.id);
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERTIFICATES: &str = r#"{
        "kind": "certificate",
        "backgrounds": ["certificate-1.png", "certificate-2.png", ""]
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = TemplateManifest::from_json(CERTIFICATES).unwrap();
        assert_eq!(manifest.kind, TemplateKind::Certificate);
        assert_eq!(manifest.backgrounds.len(), 2);
        assert_eq!(manifest.page_size(), Size::new(1123.0, 794.0));
    }

    #[test]
    fn test_page_size_override() {
        let json = r#"{ "kind": "invoice", "backgrounds": ["inv.png"], "page_size": { "width": 600.0, "height": 800.0 } }"#;
        let manifest = TemplateManifest::from_json(json).unwrap();
        assert_eq!(manifest.page_size(), Size::new(600.0, 800.0));
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("Quote".parse::<TemplateKind>().unwrap(), TemplateKind::Quote);
        assert!(matches!(
            "receipt".parse::<TemplateKind>(),
            Err(TemplateError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_document_from_template() {
        let manifest = TemplateManifest::from_json(CERTIFICATES).unwrap();
        let doc = Document::from_template("Award", &manifest, 1).unwrap();
        assert_eq!(doc.page_count(), 1);
        let page = doc.page(0).unwrap();
        assert_eq!(page.background, Some(AssetRef::new("certificate-2.png")));
        assert_eq!(page.size, Size::new(1123.0, 794.0));
        assert!(page.is_empty());
    }

    #[test]
    fn test_background_out_of_range() {
        let manifest = TemplateManifest::from_json(CERTIFICATES).unwrap();
        assert!(matches!(
            Document::from_template("Award", &manifest, 5),
            Err(TemplateError::BackgroundOutOfRange { index: 5, count: 2 })
        ));
    }

    #[test]
    fn test_empty_manifest() {
        let manifest =
            TemplateManifest::from_json(r#"{ "kind": "quote", "backgrounds": [] }"#).unwrap();
        assert!(matches!(
            manifest.background(0),
            Err(TemplateError::NoBackgrounds(TemplateKind::Quote))
        ));
    }
}
