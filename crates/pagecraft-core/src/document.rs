//! Pages and the multi-page document.

use crate::assets::AssetRef;
use crate::element::{apply_props_patch, Element, ElementId, ElementPatch, ElementProps, LinkGroupId};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for pages.
pub type PageId = Uuid;

/// A4 portrait at 96 DPI.
pub const DEFAULT_PAGE_SIZE: Size = Size::new(794.0, 1123.0);

/// Document operation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },
    #[error("Element {0} already exists")]
    DuplicateElement(ElementId),
    #[error("Element {0} not found")]
    ElementNotFound(ElementId),
    #[error("Cannot remove the last page")]
    LastPage,
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// A single page: elements in insertion order plus a background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    id: PageId,
    pub size: Size,
    #[serde(default)]
    pub background: Option<AssetRef>,
    #[serde(default)]
    elements: Vec<Element>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Page {
    /// Create an empty page.
    pub fn new(size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            size,
            background: None,
            elements: Vec::new(),
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    /// Elements in insertion order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub(crate) fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.iter_mut()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Elements bottom to top.
    pub fn paint_order(&self) -> Vec<&Element> {
        crate::geometry::paint_order(&self.elements)
    }

    /// Members of a link group on this page, in insertion order.
    pub fn group_members(&self, group: LinkGroupId) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|e| e.link_group == Some(group))
            .map(|e| e.id)
            .collect()
    }

    /// Clear any group on this page that is down to a single member.
    /// Returns how many groups were dissolved.
    pub(crate) fn dissolve_singleton_groups(&mut self) -> usize {
        let mut counts: HashMap<LinkGroupId, usize> = HashMap::new();
        for group in self.elements.iter().filter_map(|e| e.link_group) {
            *counts.entry(group).or_default() += 1;
        }
        let mut dissolved = 0;
        for element in &mut self.elements {
            if let Some(group) = element.link_group {
                if counts.get(&group) == Some(&1) {
                    element.link_group = None;
                    dissolved += 1;
                }
            }
        }
        dissolved
    }

    fn max_z(&self) -> Option<i64> {
        self.elements.iter().map(|e| e.z_index).max()
    }

    fn min_z(&self) -> Option<i64> {
        self.elements.iter().map(|e| e.z_index).min()
    }
}

/// A multi-page document. Always holds at least one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    pages: Vec<Page>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl Document {
    /// Create a document with one empty default-size page.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            pages: vec![Page::default()],
        }
    }

    /// Create a document whose only page is `page`.
    pub fn with_page(name: impl Into<String>, page: Page) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            pages: vec![page],
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> DocumentResult<&Page> {
        let count = self.pages.len();
        self.pages
            .get(index)
            .ok_or(DocumentError::PageOutOfRange { index, count })
    }

    pub(crate) fn page_mut(&mut self, index: usize) -> DocumentResult<&mut Page> {
        let count = self.pages.len();
        self.pages
            .get_mut(index)
            .ok_or(DocumentError::PageOutOfRange { index, count })
    }

    /// Look up an element on a page.
    pub fn element(&self, page: usize, id: ElementId) -> DocumentResult<&Element> {
        self.page(page)?
            .element(id)
            .ok_or(DocumentError::ElementNotFound(id))
    }

    /// Find an element anywhere in the document, with its page index.
    pub fn find_element(&self, id: ElementId) -> Option<(usize, &Element)> {
        self.pages
            .iter()
            .enumerate()
            .find_map(|(index, page)| page.element(id).map(|e| (index, e)))
    }

    /// Add an element to a page.
    ///
    /// Ids are unique across the whole document. Incoming link membership
    /// is dropped; groups are only formed through the selection module.
    pub fn add_element(&mut self, page: usize, mut element: Element) -> DocumentResult<ElementId> {
        if self.find_element(element.id).is_some() {
            return Err(DocumentError::DuplicateElement(element.id));
        }
        if element.link_group.take().is_some() {
            log::debug!("Dropping link group of added element {}", element.id);
        }
        element.sanitize();
        let id = element.id;
        self.page_mut(page)?.elements.push(element);
        Ok(id)
    }

    /// Remove an element, dissolving its link group if one member is left.
    pub fn remove_element(&mut self, page: usize, id: ElementId) -> DocumentResult<Element> {
        let target = self.page_mut(page)?;
        let index = target
            .elements
            .iter()
            .position(|e| e.id == id)
            .ok_or(DocumentError::ElementNotFound(id))?;
        let removed = target.elements.remove(index);
        if let Some(group) = removed.link_group {
            let remaining = target.group_members(group);
            if remaining.len() == 1 {
                for element in target.elements_mut().filter(|e| e.link_group == Some(group)) {
                    element.link_group = None;
                }
            }
        }
        Ok(removed)
    }

    /// Merge a patch into an element in place.
    pub fn update_element(
        &mut self,
        page: usize,
        id: ElementId,
        patch: &ElementPatch,
    ) -> DocumentResult<()> {
        let element = self
            .page_mut(page)?
            .element_mut(id)
            .ok_or(DocumentError::ElementNotFound(id))?;
        *element = apply_props_patch(element, patch);
        Ok(())
    }

    /// Set an element's z-index.
    pub fn reorder(&mut self, page: usize, id: ElementId, new_z: i64) -> DocumentResult<()> {
        let element = self
            .page_mut(page)?
            .element_mut(id)
            .ok_or(DocumentError::ElementNotFound(id))?;
        element.z_index = new_z;
        Ok(())
    }

    /// Put an element above everything else on its page.
    pub fn bring_to_front(&mut self, page: usize, id: ElementId) -> DocumentResult<()> {
        let target = self.page(page)?;
        let current = self.element(page, id)?.z_index;
        let top = target
            .elements
            .iter()
            .filter(|e| e.id != id)
            .map(|e| e.z_index)
            .max();
        match top {
            Some(top) if top >= current => self.reorder(page, id, top.saturating_add(1)),
            _ => Ok(()),
        }
    }

    /// Put an element below everything else on its page.
    pub fn send_to_back(&mut self, page: usize, id: ElementId) -> DocumentResult<()> {
        let target = self.page(page)?;
        let current = self.element(page, id)?.z_index;
        let bottom = target
            .elements
            .iter()
            .filter(|e| e.id != id)
            .map(|e| e.z_index)
            .min();
        match bottom {
            Some(bottom) if bottom <= current => {
                self.reorder(page, id, bottom.saturating_sub(1))
            }
            _ => Ok(()),
        }
    }

    /// z-index that places a new element on top of `page`.
    pub fn next_z(&self, page: usize) -> DocumentResult<i64> {
        Ok(self.page(page)?.max_z().map_or(0, |z| z.saturating_add(1)))
    }

    /// z-index that places a new element under everything on `page`.
    pub fn bottom_z(&self, page: usize) -> DocumentResult<i64> {
        Ok(self.page(page)?.min_z().map_or(0, |z| z.saturating_sub(1)))
    }

    /// Elements of a page bottom to top.
    pub fn paint_order(&self, page: usize) -> DocumentResult<Vec<&Element>> {
        Ok(self.page(page)?.paint_order())
    }

    /// Append a new empty page. Returns its index.
    pub fn add_page(&mut self, size: Size) -> usize {
        self.pages.push(Page::new(size));
        log::info!("Added page {} to document {}", self.pages.len(), self.id);
        self.pages.len() - 1
    }

    /// Insert a page at `index` (may equal the page count).
    ///
    /// The page may come from outside (clipboard, another document), so it
    /// is repaired first: repeated ids within it are dropped, fields are
    /// clamped, groups already used on other pages get fresh ids and
    /// singleton groups are dissolved. Ids that exist elsewhere in the
    /// document are refused.
    pub fn insert_page(&mut self, index: usize, mut page: Page) -> DocumentResult<()> {
        let count = self.pages.len();
        if index > count {
            return Err(DocumentError::PageOutOfRange { index, count });
        }

        let mut seen = HashSet::new();
        let before = page.elements.len();
        page.elements.retain(|e| seen.insert(e.id));
        if page.elements.len() != before {
            log::debug!("Dropped {} repeated elements from inserted page", before - page.elements.len());
        }
        for element in page.elements() {
            if self.find_element(element.id).is_some() {
                return Err(DocumentError::DuplicateElement(element.id));
            }
        }

        let used: HashSet<LinkGroupId> = self
            .pages
            .iter()
            .flat_map(|p| p.elements.iter().filter_map(|e| e.link_group))
            .collect();
        let clashing: BTreeSet<LinkGroupId> = page
            .elements
            .iter()
            .filter_map(|e| e.link_group)
            .filter(|group| used.contains(group))
            .collect();
        for group in clashing {
            let fresh = Uuid::new_v4();
            for element in page.elements_mut().filter(|e| e.link_group == Some(group)) {
                element.link_group = Some(fresh);
            }
        }
        for element in &mut page.elements {
            element.sanitize();
        }
        page.dissolve_singleton_groups();

        self.pages.insert(index, page);
        log::info!("Inserted page at {} in document {}", index, self.id);
        Ok(())
    }

    /// Remove a page and everything on it. The last page cannot be removed.
    pub fn remove_page(&mut self, index: usize) -> DocumentResult<Page> {
        self.page(index)?;
        if self.pages.len() == 1 {
            return Err(DocumentError::LastPage);
        }
        log::info!("Removing page {} from document {}", index, self.id);
        Ok(self.pages.remove(index))
    }

    /// Move the page at `from` so it ends up at index `to`.
    pub fn move_page(&mut self, from: usize, to: usize) -> DocumentResult<()> {
        self.page(from)?;
        self.page(to)?;
        if from != to {
            let page = self.pages.remove(from);
            self.pages.insert(to, page);
        }
        Ok(())
    }

    /// Set or clear a page background.
    pub fn set_background(&mut self, page: usize, background: Option<AssetRef>) -> DocumentResult<()> {
        self.page_mut(page)?.background = background.filter(|b| !b.is_empty());
        Ok(())
    }

    /// Distinct variable token names used anywhere, sorted.
    pub fn variable_names(&self) -> Vec<String> {
        self.pages
            .iter()
            .flat_map(|p| p.elements.iter())
            .filter_map(|e| match &e.props {
                ElementProps::Variable(var) => Some(var.name.clone()),
                _ => None,
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Asset references used by backgrounds and image elements.
    pub fn asset_refs(&self) -> BTreeSet<AssetRef> {
        let mut refs = BTreeSet::new();
        for page in &self.pages {
            refs.extend(page.background.iter().cloned());
            for element in &page.elements {
                if let ElementProps::Image(image) = &element.props {
                    refs.insert(image.source.clone());
                }
            }
        }
        refs
    }

    /// Repair a document loaded from outside. Returns the number of fixes.
    ///
    /// Clamps element fields, drops repeated element ids, splits groups that
    /// span pages and dissolves singleton groups. An empty page list gets a
    /// default page.
    pub fn normalize(&mut self) -> usize {
        let mut fixes = 0;
        if self.pages.is_empty() {
            self.pages.push(Page::default());
            fixes += 1;
        }

        let mut seen_ids = HashSet::new();
        let mut seen_groups: HashSet<LinkGroupId> = HashSet::new();
        for page in &mut self.pages {
            let before = page.elements.len();
            page.elements.retain(|e| seen_ids.insert(e.id));
            fixes += before - page.elements.len();

            for element in &mut page.elements {
                let original = element.clone();
                element.sanitize();
                if *element != original {
                    fixes += 1;
                }
            }

            let groups: BTreeSet<LinkGroupId> =
                page.elements.iter().filter_map(|e| e.link_group).collect();
            for group in groups {
                if seen_groups.insert(group) {
                    continue;
                }
                let fresh = Uuid::new_v4();
                for element in page.elements_mut().filter(|e| e.link_group == Some(group)) {
                    element.link_group = Some(fresh);
                }
                seen_groups.insert(fresh);
                fixes += 1;
            }

            fixes += page.dissolve_singleton_groups();
        }

        if fixes > 0 {
            log::warn!("Repaired {} problems in document {}", fixes, self.id);
        }
        fixes
    }

    /// Describe every invariant violation. Empty means the document is sound.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.pages.is_empty() {
            problems.push("document has no pages".to_string());
        }
        let mut seen_ids = HashSet::new();
        let mut group_pages: HashMap<LinkGroupId, usize> = HashMap::new();
        for (index, page) in self.pages.iter().enumerate() {
            let mut group_sizes: HashMap<LinkGroupId, usize> = HashMap::new();
            for element in &page.elements {
                if !seen_ids.insert(element.id) {
                    problems.push(format!("page {}: duplicate element id {}", index, element.id));
                }
                if !(element.width >= 0.0 && element.height >= 0.0) {
                    problems.push(format!("page {}: element {} has negative size", index, element.id));
                }
                if !(0.0..=1.0).contains(&element.opacity) {
                    problems.push(format!(
                        "page {}: element {} opacity {} out of range",
                        index, element.id, element.opacity
                    ));
                }
                if let Some(group) = element.link_group {
                    *group_sizes.entry(group).or_default() += 1;
                }
            }
            for (group, size) in group_sizes {
                if size < 2 {
                    problems.push(format!("page {}: link group {} has one member", index, group));
                }
                if let Some(other) = group_pages.insert(group, index) {
                    problems.push(format!(
                        "link group {} spans pages {} and {}",
                        group, other, index
                    ));
                }
            }
        }
        problems
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON, repairing any broken invariants.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut document: Self = serde_json::from_str(json)?;
        document.normalize();
        log::info!("Loaded document {} ({} pages)", document.id, document.pages.len());
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ShapeKind, TextProps};
    use kurbo::Rect;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::from_origin_size((x, y), (w, h))
    }

    fn linked_pair(doc: &mut Document) -> (ElementId, ElementId, LinkGroupId) {
        let a = doc.add_element(0, Element::text(rect(0.0, 0.0, 10.0, 10.0), "a")).unwrap();
        let b = doc.add_element(0, Element::text(rect(20.0, 0.0, 10.0, 10.0), "b")).unwrap();
        let group = Uuid::new_v4();
        for el in doc.page_mut(0).unwrap().elements_mut() {
            el.link_group = Some(group);
        }
        (a, b, group)
    }

    #[test]
    fn test_document_creation() {
        let doc = Document::new("Invoice");
        assert_eq!(doc.page_count(), 1);
        assert!(doc.page(0).unwrap().is_empty());
        assert_eq!(doc.page(0).unwrap().size, DEFAULT_PAGE_SIZE);
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_add_and_find_element() {
        let mut doc = Document::new("Doc");
        let el = Element::text(rect(10.0, 10.0, 100.0, 30.0), "Hello");
        let id = doc.add_element(0, el).unwrap();
        assert_eq!(doc.page(0).unwrap().len(), 1);
        let (page, found) = doc.find_element(id).unwrap();
        assert_eq!(page, 0);
        assert_eq!(found.id(), id);
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let mut doc = Document::new("Doc");
        doc.add_page(DEFAULT_PAGE_SIZE);
        let el = Element::text(rect(0.0, 0.0, 10.0, 10.0), "x");
        doc.add_element(0, el.clone()).unwrap();
        assert_eq!(
            doc.add_element(1, el.clone()),
            Err(DocumentError::DuplicateElement(el.id()))
        );
    }

    #[test]
    fn test_add_to_missing_page() {
        let mut doc = Document::new("Doc");
        let el = Element::text(rect(0.0, 0.0, 10.0, 10.0), "x");
        assert_eq!(
            doc.add_element(3, el),
            Err(DocumentError::PageOutOfRange { index: 3, count: 1 })
        );
    }

    #[test]
    fn test_remove_element_dissolves_pair() {
        let mut doc = Document::new("Doc");
        let (a, b, _) = linked_pair(&mut doc);
        doc.remove_element(0, a).unwrap();
        assert_eq!(doc.element(0, b).unwrap().link_group(), None);
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_remove_element_shrinks_larger_group() {
        let mut doc = Document::new("Doc");
        let (a, b, group) = linked_pair(&mut doc);
        let c = doc.add_element(0, Element::text(rect(40.0, 0.0, 10.0, 10.0), "c")).unwrap();
        doc.page_mut(0).unwrap().element_mut(c).unwrap().link_group = Some(group);

        doc.remove_element(0, a).unwrap();
        assert_eq!(doc.element(0, b).unwrap().link_group(), Some(group));
        assert_eq!(doc.element(0, c).unwrap().link_group(), Some(group));
    }

    #[test]
    fn test_remove_missing_element() {
        let mut doc = Document::new("Doc");
        let id = Uuid::new_v4();
        assert_eq!(doc.remove_element(0, id), Err(DocumentError::ElementNotFound(id)));
    }

    #[test]
    fn test_added_element_loses_link_group() {
        let mut doc = Document::new("Doc");
        let mut el = Element::text(rect(0.0, 0.0, 10.0, 10.0), "x");
        el.link_group = Some(Uuid::new_v4());
        let id = doc.add_element(0, el).unwrap();
        assert_eq!(doc.element(0, id).unwrap().link_group(), None);
    }

    #[test]
    fn test_z_order() {
        let mut doc = Document::new("Doc");
        let a = doc.add_element(0, Element::shape(rect(0.0, 0.0, 10.0, 10.0), ShapeKind::Rectangle)).unwrap();
        let b = doc.add_element(0, Element::shape(rect(0.0, 0.0, 10.0, 10.0), ShapeKind::Circle)).unwrap();
        let c = doc.add_element(0, Element::shape(rect(0.0, 0.0, 10.0, 10.0), ShapeKind::Line)).unwrap();

        let ids = |doc: &Document| -> Vec<ElementId> {
            doc.paint_order(0).unwrap().iter().map(|e| e.id()).collect()
        };
        // Equal z: insertion order
        assert_eq!(ids(&doc), vec![a, b, c]);

        doc.bring_to_front(0, a).unwrap();
        assert_eq!(ids(&doc), vec![b, c, a]);

        doc.send_to_back(0, c).unwrap();
        assert_eq!(ids(&doc), vec![c, b, a]);

        doc.reorder(0, b, 100).unwrap();
        assert_eq!(ids(&doc), vec![c, a, b]);
    }

    #[test]
    fn test_bring_to_front_when_already_top() {
        let mut doc = Document::new("Doc");
        let a = doc.add_element(0, Element::text(rect(0.0, 0.0, 10.0, 10.0), "a").with_z_index(5)).unwrap();
        doc.add_element(0, Element::text(rect(0.0, 0.0, 10.0, 10.0), "b")).unwrap();
        doc.bring_to_front(0, a).unwrap();
        assert_eq!(doc.element(0, a).unwrap().z_index, 5);
    }

    #[test]
    fn test_page_ops() {
        let mut doc = Document::new("Doc");
        let first = doc.page(0).unwrap().id();
        let second_index = doc.add_page(Size::new(100.0, 100.0));
        assert_eq!(second_index, 1);
        let second = doc.page(1).unwrap().id();

        doc.move_page(1, 0).unwrap();
        assert_eq!(doc.page(0).unwrap().id(), second);
        assert_eq!(doc.page(1).unwrap().id(), first);

        doc.insert_page(1, Page::default()).unwrap();
        assert_eq!(doc.page_count(), 3);

        let removed = doc.remove_page(0).unwrap();
        assert_eq!(removed.id(), second);
        doc.remove_page(0).unwrap();
        assert_eq!(doc.remove_page(0), Err(DocumentError::LastPage));
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_insert_page_dissolves_singleton_group() {
        let mut doc = Document::new("Doc");
        let mut page = Page::default();
        let mut lone = Element::text(rect(0.0, 0.0, 10.0, 10.0), "lone");
        lone.link_group = Some(Uuid::new_v4());
        let id = lone.id();
        page.elements.push(lone);

        doc.insert_page(1, page).unwrap();
        assert_eq!(doc.element(1, id).unwrap().link_group(), None);
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_insert_page_drops_repeated_ids() {
        let mut doc = Document::new("Doc");
        let mut page = Page::default();
        let el = Element::text(rect(0.0, 0.0, 10.0, 10.0), "twice");
        page.elements.push(el.clone());
        page.elements.push(el.clone());

        doc.insert_page(0, page).unwrap();
        assert_eq!(doc.page(0).unwrap().len(), 1);
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_insert_page_renames_clashing_group() {
        let mut doc = Document::new("Doc");
        let (_, _, group) = linked_pair(&mut doc);
        let mut page = Page::default();
        let mut ids = Vec::new();
        for i in 0..2 {
            let mut el = Element::text(rect(f64::from(i) * 20.0, 0.0, 10.0, 10.0), "copy");
            el.link_group = Some(group);
            ids.push(el.id());
            page.elements.push(el);
        }

        doc.insert_page(1, page).unwrap();
        let copied = doc.element(1, ids[0]).unwrap().link_group();
        assert!(copied.is_some());
        assert_ne!(copied, Some(group));
        assert_eq!(doc.element(1, ids[1]).unwrap().link_group(), copied);
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_insert_page_rejects_ids_from_other_pages() {
        let mut doc = Document::new("Doc");
        let el = Element::text(rect(0.0, 0.0, 10.0, 10.0), "x");
        doc.add_element(0, el.clone()).unwrap();
        let mut page = Page::default();
        page.elements.push(el.clone());
        assert_eq!(doc.insert_page(1, page), Err(DocumentError::DuplicateElement(el.id())));
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_move_page_out_of_range() {
        let mut doc = Document::new("Doc");
        assert!(matches!(
            doc.move_page(0, 4),
            Err(DocumentError::PageOutOfRange { index: 4, .. })
        ));
    }

    #[test]
    fn test_set_background() {
        let mut doc = Document::new("Doc");
        doc.set_background(0, Some(AssetRef::new("certificate-1.png"))).unwrap();
        assert_eq!(doc.page(0).unwrap().background, Some(AssetRef::new("certificate-1.png")));
        doc.set_background(0, None).unwrap();
        assert_eq!(doc.page(0).unwrap().background, None);
    }

    #[test]
    fn test_variable_names() {
        let mut doc = Document::new("Doc");
        doc.add_page(DEFAULT_PAGE_SIZE);
        doc.add_element(0, Element::variable(rect(0.0, 0.0, 10.0, 10.0), "name").unwrap()).unwrap();
        doc.add_element(1, Element::variable(rect(0.0, 0.0, 10.0, 10.0), "date").unwrap()).unwrap();
        doc.add_element(1, Element::variable(rect(0.0, 0.0, 10.0, 10.0), "name").unwrap()).unwrap();
        doc.add_element(1, Element::text(rect(0.0, 0.0, 10.0, 10.0), "{static}")).unwrap();
        assert_eq!(doc.variable_names(), vec!["date".to_string(), "name".to_string()]);
    }

    #[test]
    fn test_update_element() {
        let mut doc = Document::new("Doc");
        let id = doc.add_element(0, Element::text(rect(0.0, 0.0, 10.0, 10.0), "x")).unwrap();
        doc.update_element(0, id, &ElementPatch::position(5.0, 6.0)).unwrap();
        let el = doc.element(0, id).unwrap();
        assert!((el.x - 5.0).abs() < f64::EPSILON);
        assert!((el.y - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = Document::new("Quote");
        doc.set_background(0, Some(AssetRef::new("quote-bg.png"))).unwrap();
        let mut props = TextProps::new("Total");
        props.font_size = 22.0;
        let text = Element::new(rect(1.5, 2.5, 30.0, 12.0), ElementProps::Text(props))
            .unwrap()
            .with_rotation(12.5)
            .with_z_index(-3);
        doc.add_element(0, text).unwrap();
        linked_pair(&mut doc);
        doc.add_element(0, Element::image(rect(0.0, 0.0, 5.0, 5.0), AssetRef::new("logo")).unwrap())
            .unwrap();

        let json = doc.to_json().unwrap();
        let loaded = Document::from_json(&json).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_from_json_repairs_singleton_group() {
        let mut doc = Document::new("Doc");
        let (a, b, _) = linked_pair(&mut doc);
        // Break the invariant behind the API's back
        doc.page_mut(0).unwrap().element_mut(b).unwrap().link_group = None;
        assert!(!doc.validate().is_empty());

        let loaded = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(loaded.element(0, a).unwrap().link_group(), None);
        assert!(loaded.validate().is_empty());
    }

    #[test]
    fn test_normalize_splits_cross_page_group() {
        let mut doc = Document::new("Doc");
        doc.add_page(DEFAULT_PAGE_SIZE);
        let (_, _, group) = linked_pair(&mut doc);
        let c = doc.add_element(1, Element::text(rect(0.0, 0.0, 10.0, 10.0), "c")).unwrap();
        let d = doc.add_element(1, Element::text(rect(0.0, 0.0, 10.0, 10.0), "d")).unwrap();
        for el in doc.page_mut(1).unwrap().elements_mut() {
            el.link_group = Some(group);
        }
        assert!(!doc.validate().is_empty());

        assert_eq!(doc.normalize(), 1);
        let g1 = doc.element(1, c).unwrap().link_group();
        assert!(g1.is_some());
        assert_ne!(g1, Some(group));
        assert_eq!(doc.element(1, d).unwrap().link_group(), g1);
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_from_json_with_no_pages() {
        let json = r#"{ "id": "x", "name": "Empty", "pages": [] }"#;
        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_asset_refs() {
        let mut doc = Document::new("Doc");
        doc.set_background(0, Some(AssetRef::new("bg"))).unwrap();
        doc.add_element(0, Element::image(rect(0.0, 0.0, 5.0, 5.0), AssetRef::new("logo")).unwrap())
            .unwrap();
        let refs: Vec<_> = doc.asset_refs().into_iter().collect();
        assert_eq!(refs, vec![AssetRef::new("bg"), AssetRef::new("logo")]);
    }
}
