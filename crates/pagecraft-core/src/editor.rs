//! The editor aggregate: document, selection, history and view state.

use crate::assets::{AssetRef, AssetResult, AssetState, AssetTracker};
use crate::config::EditorConfig;
use crate::document::{Document, DocumentResult, Page, PageId};
use crate::element::{Element, ElementId, ElementPatch, LinkGroupId};
use crate::export::{ExportError, ExportFormat, ExportRequest, ExportResult};
use crate::geometry::{bounding_box, union_bounds, SnapGuide};
use crate::history::{History, HistoryEntry, HistoryOutcome};
use crate::interaction::Gesture;
use crate::selection::{self, SelectMode, Selection};
use crate::viewport::Viewport;
use kurbo::{Rect, Size, Vec2};
use std::collections::BTreeMap;

/// Offset applied to duplicated elements, in document units.
pub const DUPLICATE_OFFSET: f64 = 10.0;

/// Owns everything the host UI reads and edits.
///
/// Discrete operations record one history step each. When the host has
/// called [`Editor::begin`], operations join that edit instead and are
/// recorded by [`Editor::commit`].
#[derive(Debug)]
pub struct Editor {
    pub(crate) config: EditorConfig,
    pub(crate) document: Document,
    pub(crate) selection: Selection,
    pub(crate) history: History,
    pub(crate) viewport: Viewport,
    pub(crate) gesture: Gesture,
    pub(crate) snap_lines: Vec<SnapGuide>,
    assets: AssetTracker,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Document::default())
    }
}

impl Editor {
    /// Create an editor with the default configuration.
    pub fn new(document: Document) -> Self {
        Self::with_config(document, EditorConfig::default())
    }

    /// Create an editor with an explicit configuration. An invalid
    /// configuration is replaced by the defaults.
    pub fn with_config(mut document: Document, config: EditorConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("{}; using default editor config", e);
                EditorConfig::default()
            }
        };
        document.normalize();
        let selection = Selection::new(0);
        let history = History::new(
            HistoryEntry::new(document.clone(), selection.clone()),
            config.history_depth,
        );
        Self {
            viewport: Viewport::from_config(&config),
            config,
            document,
            selection,
            history,
            gesture: Gesture::Idle,
            snap_lines: Vec::new(),
            assets: AssetTracker::new(),
        }
    }

    /// Replace the document and start a fresh history.
    pub fn load_document(&mut self, mut document: Document) {
        document.normalize();
        self.gesture = Gesture::Idle;
        self.snap_lines.clear();
        self.document = document;
        self.selection = Selection::new(0);
        self.history
            .reset(HistoryEntry::new(self.document.clone(), self.selection.clone()));
        log::info!("Editing document {} ({})", self.document.id, self.document.name);
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn current_page(&self) -> usize {
        self.selection.page()
    }

    /// The page being edited.
    pub fn page(&self) -> DocumentResult<&Page> {
        self.document.page(self.current_page())
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    pub fn set_zoom(&mut self, factor: f64) {
        self.viewport.set_zoom(factor);
    }

    /// Fit the current page into a view of `view_size`.
    pub fn fit_page(&mut self, view_size: Size, padding: f64) {
        if let Ok(page) = self.document.page(self.current_page()) {
            let size = page.size;
            self.viewport.fit_page(size, view_size, padding);
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Snap guides to draw during a drag.
    pub fn snap_lines(&self) -> &[SnapGuide] {
        &self.snap_lines
    }

    /// Rubber-band rectangle in document space while marquee selecting.
    pub fn selection_box(&self) -> Option<Rect> {
        match &self.gesture {
            Gesture::MarqueeSelecting(marquee) => Some(marquee.rect()),
            _ => None,
        }
    }

    /// Union of the selected elements' bounding boxes.
    pub fn selection_bounds(&self) -> Option<Rect> {
        let page = self.page().ok()?;
        union_bounds(
            page.elements()
                .iter()
                .filter(|e| self.selection.contains(e.id()))
                .map(bounding_box),
        )
    }

    // --- selection ---

    pub fn select(&mut self, ids: &[ElementId], mode: SelectMode) {
        self.selection.select(&self.document, ids, mode);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.document);
    }

    /// Switch the page being edited. Clears the selection.
    pub fn set_current_page(&mut self, index: usize) -> DocumentResult<()> {
        self.document.page(index)?;
        if self.gesture.is_active() {
            self.cancel_gesture();
        }
        self.selection.set_page(index);
        Ok(())
    }

    // --- history protocol ---

    /// Start an edit that spans several calls (slider scrub, typing).
    /// Returns false if an edit is already in progress.
    pub fn begin(&mut self) -> bool {
        if self.gesture.is_active() {
            return false;
        }
        self.history.begin(&self.document, &self.selection)
    }

    /// Record the edit in progress. Returns true if a step was recorded.
    pub fn commit(&mut self) -> bool {
        if self.gesture.is_active() {
            self.gesture = Gesture::Idle;
            self.snap_lines.clear();
        }
        self.history.commit(&self.document, &self.selection)
    }

    /// Drop the edit in progress and restore the state before it.
    pub fn cancel(&mut self) -> bool {
        if self.gesture.is_active() {
            self.cancel_gesture();
            return true;
        }
        match self.history.cancel() {
            Some(base) => {
                self.restore(base);
                true
            }
            None => false,
        }
    }

    /// Whether an edit is in progress.
    pub fn is_pending(&self) -> bool {
        self.history.is_pending()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo the last step. An edit in progress is abandoned first.
    pub fn undo(&mut self) -> bool {
        self.abandon_pending();
        let outcome = self.history.undo();
        self.apply_outcome(outcome)
    }

    /// Redo the last undone step. An edit in progress is abandoned first.
    pub fn redo(&mut self) -> bool {
        self.abandon_pending();
        let outcome = self.history.redo();
        self.apply_outcome(outcome)
    }

    fn abandon_pending(&mut self) {
        if self.gesture.is_active() {
            self.cancel_gesture();
        } else if let Some(base) = self.history.cancel() {
            self.restore(base);
        }
    }

    fn apply_outcome(&mut self, outcome: HistoryOutcome) -> bool {
        match outcome {
            HistoryOutcome::Restored(entry) => {
                self.restore(entry);
                true
            }
            HistoryOutcome::Nothing => false,
        }
    }

    pub(crate) fn restore(&mut self, entry: HistoryEntry) {
        self.document = entry.document;
        self.selection = entry.selection;
        self.selection.prune(&self.document);
    }

    /// Run a document mutation as one history step.
    ///
    /// Joins the host's edit when one is pending. A step that leaves the
    /// document unchanged does not touch history; a failed step is rolled
    /// back.
    fn edit<T>(
        &mut self,
        op: impl FnOnce(&mut Document, &mut Selection) -> DocumentResult<T>,
    ) -> DocumentResult<T> {
        if self.gesture.is_active() {
            log::debug!("Edit during active gesture, cancelling gesture");
            self.cancel_gesture();
        }
        let page_id = self.page().map(|p| p.id()).ok();
        let started = self.history.begin(&self.document, &self.selection);
        let result = op(&mut self.document, &mut self.selection);
        self.follow_page(page_id);
        self.selection.prune(&self.document);

        if started {
            match &result {
                Ok(_) => {
                    let unchanged = self
                        .history
                        .pending_base()
                        .is_some_and(|base| base.document == self.document);
                    if unchanged {
                        self.history.cancel();
                    } else {
                        self.history.commit(&self.document, &self.selection);
                    }
                }
                Err(e) => {
                    log::debug!("Edit failed, rolling back: {}", e);
                    if let Some(base) = self.history.cancel() {
                        self.restore(base);
                    }
                }
            }
        }
        result
    }

    /// Keep the selection on the same page after pages move around.
    fn follow_page(&mut self, page_id: Option<PageId>) {
        let Some(page_id) = page_id else {
            return;
        };
        let found = self.document.pages().iter().position(|p| p.id() == page_id);
        match found {
            Some(index) if index != self.selection.page() => self.selection.retarget(index),
            Some(_) => {}
            None => {
                let last = self.document.page_count().saturating_sub(1);
                self.selection.set_page(self.selection.page().min(last));
            }
        }
    }

    // --- elements ---

    /// Add an element to the current page.
    pub fn add_element(&mut self, element: Element) -> DocumentResult<ElementId> {
        let page = self.current_page();
        self.edit(|doc, _| doc.add_element(page, element))
    }

    pub fn remove_element(&mut self, id: ElementId) -> DocumentResult<Element> {
        let page = self.current_page();
        self.edit(|doc, _| doc.remove_element(page, id))
    }

    /// Apply a sparse update to an element on the current page.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> DocumentResult<()> {
        let page = self.current_page();
        self.edit(|doc, _| doc.update_element(page, id, patch))
    }

    /// Delete every selected element. Returns how many were removed.
    pub fn delete_selected(&mut self) -> DocumentResult<usize> {
        let page = self.current_page();
        let ids: Vec<ElementId> = self.selection.ids().iter().copied().collect();
        self.edit(|doc, sel| {
            for &id in &ids {
                doc.remove_element(page, id)?;
            }
            sel.clear();
            Ok(ids.len())
        })
    }

    /// Copy the selection with fresh ids, offset and on top. Links among
    /// the copies are recreated as new groups. The copies become selected.
    pub fn duplicate_selected(&mut self) -> DocumentResult<Vec<ElementId>> {
        let page = self.current_page();
        self.edit(|doc, sel| {
            let originals: Vec<Element> = doc
                .paint_order(page)?
                .into_iter()
                .filter(|e| sel.contains(e.id()))
                .cloned()
                .collect();
            let mut z = doc.next_z(page)?;
            let mut groups: BTreeMap<LinkGroupId, Vec<ElementId>> = BTreeMap::new();
            let mut copies = Vec::with_capacity(originals.len());
            for original in &originals {
                let mut copy = original.duplicate();
                copy.x += DUPLICATE_OFFSET;
                copy.y += DUPLICATE_OFFSET;
                copy.z_index = z;
                z = z.saturating_add(1);
                let id = doc.add_element(page, copy)?;
                if let Some(group) = original.link_group() {
                    groups.entry(group).or_default().push(id);
                }
                copies.push(id);
            }
            for members in groups.values() {
                selection::link(doc, page, members)?;
            }
            sel.select(doc, &copies, SelectMode::Replace);
            Ok(copies)
        })
    }

    /// Move the selection by `delta` document units.
    pub fn nudge_selected(&mut self, delta: Vec2) -> DocumentResult<()> {
        let page = self.current_page();
        let ids: Vec<ElementId> = self.selection.ids().iter().copied().collect();
        self.edit(|doc, _| {
            for id in ids {
                let element = doc.element(page, id)?;
                let patch = ElementPatch::position(element.x + delta.x, element.y + delta.y);
                doc.update_element(page, id, &patch)?;
            }
            Ok(())
        })
    }

    pub fn reorder(&mut self, id: ElementId, z_index: i64) -> DocumentResult<()> {
        let page = self.current_page();
        self.edit(|doc, _| doc.reorder(page, id, z_index))
    }

    pub fn bring_to_front(&mut self, id: ElementId) -> DocumentResult<()> {
        let page = self.current_page();
        self.edit(|doc, _| doc.bring_to_front(page, id))
    }

    pub fn send_to_back(&mut self, id: ElementId) -> DocumentResult<()> {
        let page = self.current_page();
        self.edit(|doc, _| doc.send_to_back(page, id))
    }

    // --- links ---

    /// Link elements on the current page. The selection grows to cover
    /// the new group if it held any member.
    pub fn link(&mut self, ids: &[ElementId]) -> DocumentResult<Option<LinkGroupId>> {
        let page = self.current_page();
        self.edit(|doc, sel| {
            let group = selection::link(doc, page, ids)?;
            sel.expand_groups(doc);
            Ok(group)
        })
    }

    pub fn link_selected(&mut self) -> DocumentResult<Option<LinkGroupId>> {
        let ids: Vec<ElementId> = self.selection.ids().iter().copied().collect();
        self.link(&ids)
    }

    pub fn unlink(&mut self, id: ElementId) -> DocumentResult<bool> {
        let page = self.current_page();
        self.edit(|doc, _| selection::unlink(doc, page, id))
    }

    // --- pages ---

    /// Append a page. Returns its index.
    pub fn add_page(&mut self, size: Size) -> usize {
        self.edit(|doc, _| Ok(doc.add_page(size)))
            .unwrap_or_else(|_| self.document.page_count().saturating_sub(1))
    }

    pub fn insert_page(&mut self, index: usize, page: Page) -> DocumentResult<()> {
        self.edit(|doc, _| doc.insert_page(index, page))
    }

    pub fn remove_page(&mut self, index: usize) -> DocumentResult<Page> {
        self.edit(|doc, _| doc.remove_page(index))
    }

    pub fn move_page(&mut self, from: usize, to: usize) -> DocumentResult<()> {
        self.edit(|doc, _| doc.move_page(from, to))
    }

    pub fn set_background(&mut self, page: usize, background: Option<AssetRef>) -> DocumentResult<()> {
        self.edit(|doc, _| doc.set_background(page, background))
    }

    // --- collaborators ---

    /// Build an export request for the current page.
    ///
    /// Refused while an edit is in progress so the rendered page matches
    /// committed state.
    pub fn export_request(&self, base_name: &str, format: ExportFormat) -> ExportResult<ExportRequest> {
        if self.history.is_pending() || self.gesture.is_active() {
            return Err(ExportError::EditPending);
        }
        let page = self
            .page()
            .map_err(|_| ExportError::MissingPage(self.current_page()))?;
        Ok(ExportRequest::new(page.id().to_string(), base_name, format))
    }

    /// Assets referenced by the document that have not been requested yet.
    /// They are marked pending; the host resolves them and calls
    /// [`Editor::report_asset`].
    pub fn request_assets(&mut self) -> Vec<AssetRef> {
        self.document
            .asset_refs()
            .into_iter()
            .filter(|asset| self.assets.request(asset))
            .collect()
    }

    /// Record the outcome of an asset load.
    pub fn report_asset<T>(&mut self, asset: &AssetRef, result: &AssetResult<T>) {
        self.assets.report(asset, result);
    }

    pub fn asset_state(&self, asset: &AssetRef) -> AssetState {
        self.assets.state(asset)
    }
}
