//! Selection tracking and link groups.

use crate::document::{Document, DocumentResult};
use crate::element::{ElementId, LinkGroupId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// How a `select` call combines with the existing selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectMode {
    #[default]
    Replace,
    Add,
    Toggle,
}

/// Selected element ids, scoped to one page.
///
/// The page index doubles as the editor's current page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    page: usize,
    ids: BTreeSet<ElementId>,
}

impl Selection {
    /// Empty selection on `page`.
    pub fn new(page: usize) -> Self {
        Self {
            page,
            ids: BTreeSet::new(),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn ids(&self) -> &BTreeSet<ElementId> {
        &self.ids
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Switch pages. Always clears the selection.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
        self.ids.clear();
    }

    /// Point at the same page under a new index (after pages were moved).
    pub(crate) fn retarget(&mut self, page: usize) {
        self.page = page;
    }

    /// Update the selection with `ids`.
    ///
    /// Ids not on the selection's page are ignored. Each id stands for its
    /// whole link group, so toggling flips a group as one unit.
    pub fn select(&mut self, document: &Document, ids: &[ElementId], mode: SelectMode) {
        let units = units_for(document, self.page, ids);
        match mode {
            SelectMode::Replace => {
                self.ids = units.into_iter().flatten().collect();
            }
            SelectMode::Add => {
                self.ids.extend(units.into_iter().flatten());
            }
            SelectMode::Toggle => {
                for unit in units {
                    if unit.iter().all(|id| self.ids.contains(id)) {
                        for id in &unit {
                            self.ids.remove(id);
                        }
                    } else {
                        self.ids.extend(unit);
                    }
                }
            }
        }
    }

    /// Select every element on the page.
    pub fn select_all(&mut self, document: &Document) {
        self.ids = document
            .page(self.page)
            .map(|p| p.elements().iter().map(|e| e.id()).collect())
            .unwrap_or_default();
    }

    /// Drop ids that no longer exist on the page and pull the page back in
    /// range. Returns true if anything changed.
    pub fn prune(&mut self, document: &Document) -> bool {
        let last = document.page_count().saturating_sub(1);
        if self.page > last {
            log::debug!("Selection page {} out of range, moving to {}", self.page, last);
            self.set_page(last);
            return true;
        }
        let Ok(page) = document.page(self.page) else {
            return false;
        };
        let before = self.ids.len();
        self.ids.retain(|id| page.contains(*id));
        before != self.ids.len()
    }

    /// Add the missing members of every selected element's link group.
    pub fn expand_groups(&mut self, document: &Document) {
        let ids: Vec<ElementId> = self.ids.iter().copied().collect();
        for unit in units_for(document, self.page, &ids) {
            self.ids.extend(unit);
        }
    }
}

/// Group `ids` into selection units: a link group's full membership, or the
/// lone id. Unknown ids are dropped; each unit appears once.
fn units_for(document: &Document, page: usize, ids: &[ElementId]) -> Vec<BTreeSet<ElementId>> {
    let Ok(page) = document.page(page) else {
        return Vec::new();
    };
    let mut seen_groups: BTreeSet<LinkGroupId> = BTreeSet::new();
    let mut seen_ids: BTreeSet<ElementId> = BTreeSet::new();
    let mut units = Vec::new();
    for &id in ids {
        let Some(element) = page.element(id) else {
            log::debug!("Ignoring selection of {} (not on page)", id);
            continue;
        };
        match element.link_group() {
            Some(group) => {
                if seen_groups.insert(group) {
                    units.push(page.group_members(group).into_iter().collect());
                }
            }
            None => {
                if seen_ids.insert(id) {
                    units.push(BTreeSet::from([id]));
                }
            }
        }
    }
    units
}

/// Link elements on a page into a fresh group.
///
/// Unknown ids and duplicates are dropped. With fewer than two ids left this
/// is a no-op returning `None`. Groups the ids came from are dissolved if
/// they are left with a single member.
pub fn link(
    document: &mut Document,
    page: usize,
    ids: &[ElementId],
) -> DocumentResult<Option<LinkGroupId>> {
    let target = document.page_mut(page)?;
    let members: BTreeSet<ElementId> = ids.iter().copied().filter(|id| target.contains(*id)).collect();
    if members.len() < 2 {
        log::debug!("Link needs at least two elements, got {}", members.len());
        return Ok(None);
    }
    let group = Uuid::new_v4();
    for element in target.elements_mut().filter(|e| members.contains(&e.id())) {
        element.link_group = Some(group);
    }
    target.dissolve_singleton_groups();
    Ok(Some(group))
}

/// Take one element out of its link group. A lone remaining member is
/// released as well. Returns false if the element was not linked.
pub fn unlink(document: &mut Document, page: usize, id: ElementId) -> DocumentResult<bool> {
    let target = document.page_mut(page)?;
    let Some(element) = target.element_mut(id) else {
        log::debug!("Ignoring unlink of {} (not on page)", id);
        return Ok(false);
    };
    let Some(group) = element.link_group.take() else {
        return Ok(false);
    };
    let remaining = target.group_members(group);
    if remaining.len() == 1 {
        for element in target.elements_mut().filter(|e| e.link_group == Some(group)) {
            element.link_group = None;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use kurbo::Rect;

    fn doc_with(n: usize) -> (Document, Vec<ElementId>) {
        let mut doc = Document::new("Doc");
        let ids = (0..n)
            .map(|i| {
                let r = Rect::from_origin_size((i as f64 * 20.0, 0.0), (10.0, 10.0));
                doc.add_element(0, Element::text(r, format!("e{i}"))).unwrap()
            })
            .collect();
        (doc, ids)
    }

    #[test]
    fn test_replace_add_toggle() {
        let (doc, ids) = doc_with(3);
        let mut sel = Selection::new(0);

        sel.select(&doc, &[ids[0]], SelectMode::Replace);
        assert_eq!(sel.len(), 1);

        sel.select(&doc, &[ids[1]], SelectMode::Add);
        assert!(sel.contains(ids[0]) && sel.contains(ids[1]));

        sel.select(&doc, &[ids[0], ids[2]], SelectMode::Toggle);
        assert!(!sel.contains(ids[0]));
        assert!(sel.contains(ids[1]));
        assert!(sel.contains(ids[2]));

        sel.select(&doc, &[], SelectMode::Replace);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_ignores_ids_from_other_pages() {
        let (mut doc, ids) = doc_with(1);
        doc.add_page(crate::document::DEFAULT_PAGE_SIZE);
        let other = doc
            .add_element(1, Element::text(Rect::new(0.0, 0.0, 1.0, 1.0), "x"))
            .unwrap();
        let mut sel = Selection::new(0);
        sel.select(&doc, &[ids[0], other], SelectMode::Replace);
        assert_eq!(sel.ids().iter().copied().collect::<Vec<_>>(), vec![ids[0]]);
    }

    #[test]
    fn test_selecting_member_selects_group_of_three() {
        let (mut doc, ids) = doc_with(4);
        link(&mut doc, 0, &ids[..3]).unwrap();
        let mut sel = Selection::new(0);
        sel.select(&doc, &[ids[1]], SelectMode::Replace);
        assert_eq!(sel.len(), 3);
        assert!(sel.contains(ids[0]) && sel.contains(ids[1]) && sel.contains(ids[2]));
        assert!(!sel.contains(ids[3]));
    }

    #[test]
    fn test_toggle_flips_whole_group() {
        let (mut doc, ids) = doc_with(3);
        link(&mut doc, 0, &ids[..2]).unwrap();
        let mut sel = Selection::new(0);
        sel.select(&doc, &[ids[0]], SelectMode::Toggle);
        assert_eq!(sel.len(), 2);
        sel.select(&doc, &[ids[1]], SelectMode::Toggle);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_link_requires_two() {
        let (mut doc, ids) = doc_with(2);
        assert_eq!(link(&mut doc, 0, &[ids[0]]).unwrap(), None);
        assert_eq!(link(&mut doc, 0, &[ids[0], ids[0]]).unwrap(), None);
        assert_eq!(link(&mut doc, 0, &[ids[0], Uuid::new_v4()]).unwrap(), None);
        assert!(doc.element(0, ids[0]).unwrap().link_group().is_none());
    }

    #[test]
    fn test_link_then_unlink_dissolves() {
        let (mut doc, ids) = doc_with(2);
        let group = link(&mut doc, 0, &ids).unwrap().unwrap();
        assert_eq!(doc.element(0, ids[0]).unwrap().link_group(), Some(group));
        assert_eq!(doc.element(0, ids[1]).unwrap().link_group(), Some(group));

        assert!(unlink(&mut doc, 0, ids[0]).unwrap());
        assert_eq!(doc.element(0, ids[0]).unwrap().link_group(), None);
        assert_eq!(doc.element(0, ids[1]).unwrap().link_group(), None);
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_unlink_from_group_of_three_keeps_pair() {
        let (mut doc, ids) = doc_with(3);
        let group = link(&mut doc, 0, &ids).unwrap().unwrap();
        assert!(unlink(&mut doc, 0, ids[2]).unwrap());
        assert_eq!(doc.element(0, ids[0]).unwrap().link_group(), Some(group));
        assert_eq!(doc.element(0, ids[1]).unwrap().link_group(), Some(group));
        assert_eq!(doc.element(0, ids[2]).unwrap().link_group(), None);
    }

    #[test]
    fn test_unlink_unlinked_is_noop() {
        let (mut doc, ids) = doc_with(1);
        assert!(!unlink(&mut doc, 0, ids[0]).unwrap());
        assert!(!unlink(&mut doc, 0, Uuid::new_v4()).unwrap());
    }

    #[test]
    fn test_relink_dissolves_leftover() {
        let (mut doc, ids) = doc_with(3);
        link(&mut doc, 0, &ids[..2]).unwrap();
        // ids[1] leaves the first group, stranding ids[0]
        let second = link(&mut doc, 0, &ids[1..]).unwrap().unwrap();
        assert_eq!(doc.element(0, ids[0]).unwrap().link_group(), None);
        assert_eq!(doc.element(0, ids[1]).unwrap().link_group(), Some(second));
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_prune_and_page_change() {
        let (mut doc, ids) = doc_with(2);
        let mut sel = Selection::new(0);
        sel.select_all(&doc);
        assert_eq!(sel.len(), 2);

        doc.remove_element(0, ids[0]).unwrap();
        assert!(sel.prune(&doc));
        assert_eq!(sel.len(), 1);
        assert!(!sel.prune(&doc));

        sel.set_page(3);
        assert!(sel.is_empty());
        assert!(sel.prune(&doc));
        assert_eq!(sel.page(), 0);
    }
}
