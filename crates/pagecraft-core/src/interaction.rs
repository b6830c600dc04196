//! Pointer gestures: drag, resize and marquee selection.
//!
//! One gesture at a time. Pointer positions arrive in view space and are
//! converted through the viewport. Drag and resize edit the working
//! document live and record a single history step on pointer-up.

use crate::editor::Editor;
use crate::element::ElementId;
use crate::geometry::{
    bounding_box, compute_snap_candidates, hit_test_handles, hit_test_with_tolerance,
    marquee_select, resize_rect, snap_threshold, union_bounds, HandleKind,
};
use crate::selection::SelectMode;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Toggle on click, add on marquee.
    pub shift: bool,
    pub ctrl: bool,
    /// Disables snapping while dragging.
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::default()
        }
    }
}

/// Moving the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    start: Point,
    /// Moving elements and their positions at pointer-down.
    origins: Vec<(ElementId, Point)>,
    /// Union bounding box of the moving set at pointer-down.
    bounds: Rect,
    /// Whether this gesture opened the history edit.
    owns_edit: bool,
}

impl DragState {
    fn moves(&self, id: ElementId) -> bool {
        self.origins.iter().any(|(moving, _)| *moving == id)
    }
}

/// Dragging one resize handle.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeState {
    id: ElementId,
    handle: HandleKind,
    start: Point,
    original: Rect,
    rotation: f64,
    owns_edit: bool,
}

impl ResizeState {
    pub fn element(&self) -> ElementId {
        self.id
    }

    pub fn handle(&self) -> HandleKind {
        self.handle
    }
}

/// Rubber-band selection.
#[derive(Debug, Clone, PartialEq)]
pub struct MarqueeState {
    start: Point,
    current: Point,
    additive: bool,
    preview: Vec<ElementId>,
}

impl MarqueeState {
    /// Current rectangle in document space.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }

    /// Elements that would be selected if released now.
    pub fn preview(&self) -> &[ElementId] {
        &self.preview
    }
}

/// Gesture state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(DragState),
    Resizing(ResizeState),
    MarqueeSelecting(MarqueeState),
}

impl Gesture {
    pub fn is_active(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Dragging(_) => "drag",
            Gesture::Resizing(_) => "resize",
            Gesture::MarqueeSelecting(_) => "marquee",
        }
    }
}

impl Editor {
    /// Start a gesture: resize handle, then element body, then marquee.
    ///
    /// Ignored while another gesture is active.
    pub fn pointer_down(&mut self, view_point: Point, modifiers: Modifiers) {
        if self.gesture.is_active() {
            log::debug!("Ignoring pointer down during {}", self.gesture.name());
            return;
        }
        let point = self.viewport.to_document_space(view_point);
        let zoom = self.viewport.zoom();
        let Ok(page) = self.document.page(self.selection.page()) else {
            return;
        };

        let handle_tolerance = snap_threshold(self.config.handle_tolerance_px, zoom);
        let handle_hit = page
            .paint_order()
            .into_iter()
            .rev()
            .filter(|e| e.visible && self.selection.contains(e.id()))
            .find_map(|e| {
                hit_test_handles(e, point, handle_tolerance)
                    .map(|handle| (e.id(), handle, e.rect(), e.rotation))
            });
        if let Some((id, handle, original, rotation)) = handle_hit {
            let owns_edit = self.history.begin(&self.document, &self.selection);
            self.gesture = Gesture::Resizing(ResizeState {
                id,
                handle,
                start: point,
                original,
                rotation,
                owns_edit,
            });
            return;
        }

        let body_hit =
            hit_test_with_tolerance(point, page.elements(), zoom, self.config.hit_tolerance_px);
        if let Some(id) = body_hit {
            if modifiers.shift {
                self.selection.select(&self.document, &[id], SelectMode::Toggle);
                if !self.selection.contains(id) {
                    return;
                }
            } else if !self.selection.contains(id) {
                self.selection.select(&self.document, &[id], SelectMode::Replace);
            }
            self.start_drag(point);
            return;
        }

        self.gesture = Gesture::MarqueeSelecting(MarqueeState {
            start: point,
            current: point,
            additive: modifiers.shift,
            preview: Vec::new(),
        });
    }

    fn start_drag(&mut self, point: Point) {
        let Ok(page) = self.document.page(self.selection.page()) else {
            return;
        };
        let moving: Vec<_> = page
            .elements()
            .iter()
            .filter(|e| self.selection.contains(e.id()))
            .collect();
        let Some(bounds) = union_bounds(moving.iter().map(|e| bounding_box(e))) else {
            return;
        };
        let origins = moving.iter().map(|e| (e.id(), e.origin())).collect();
        let owns_edit = self.history.begin(&self.document, &self.selection);
        self.gesture = Gesture::Dragging(DragState {
            start: point,
            origins,
            bounds,
            owns_edit,
        });
    }

    /// Update the active gesture.
    pub fn pointer_move(&mut self, view_point: Point, modifiers: Modifiers) {
        let point = self.viewport.to_document_space(view_point);
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => {}
            Gesture::Dragging(state) => {
                self.drag_to(&state, point, modifiers);
                self.gesture = Gesture::Dragging(state);
            }
            Gesture::Resizing(state) => {
                self.resize_to(&state, point);
                self.gesture = Gesture::Resizing(state);
            }
            Gesture::MarqueeSelecting(mut state) => {
                state.current = point;
                state.preview = self
                    .page()
                    .map(|page| marquee_select(state.rect(), page.elements()))
                    .unwrap_or_default();
                self.gesture = Gesture::MarqueeSelecting(state);
            }
        }
    }

    fn drag_to(&mut self, state: &DragState, point: Point, modifiers: Modifiers) {
        let mut delta = point - state.start;
        self.snap_lines.clear();
        let page_index = self.selection.page();

        if self.config.snapping_enabled && !modifiers.alt {
            if let Ok(page) = self.document.page(page_index) {
                let others: Vec<_> = page
                    .elements()
                    .iter()
                    .filter(|e| e.visible && !state.moves(e.id()))
                    .map(|e| (e.id(), bounding_box(e)))
                    .collect();
                let threshold = snap_threshold(self.config.snap_threshold_px, self.viewport.zoom());
                let snaps = compute_snap_candidates(state.bounds + delta, &others, threshold);
                delta += snaps.offset();
                self.snap_lines = snaps.lines();
            }
        }

        let Ok(page) = self.document.page_mut(page_index) else {
            return;
        };
        for (id, origin) in &state.origins {
            if let Some(element) = page.element_mut(*id) {
                element.x = origin.x + delta.x;
                element.y = origin.y + delta.y;
            }
        }
    }

    fn resize_to(&mut self, state: &ResizeState, point: Point) {
        let rect = resize_rect(
            state.original,
            state.rotation,
            state.handle,
            point - state.start,
            self.config.min_element_size,
        );
        let page_index = self.selection.page();
        let Ok(page) = self.document.page_mut(page_index) else {
            return;
        };
        if let Some(element) = page.element_mut(state.id) {
            element.x = rect.x0;
            element.y = rect.y0;
            element.width = rect.width();
            element.height = rect.height();
        }
    }

    /// Finish the active gesture at `view_point`.
    pub fn pointer_up(&mut self, view_point: Point, modifiers: Modifiers) {
        self.pointer_move(view_point, modifiers);
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => {}
            Gesture::Dragging(DragState { owns_edit, .. })
            | Gesture::Resizing(ResizeState { owns_edit, .. }) => {
                self.snap_lines.clear();
                self.finish_edit(owns_edit);
            }
            Gesture::MarqueeSelecting(state) => {
                let mode = if state.additive {
                    SelectMode::Add
                } else {
                    SelectMode::Replace
                };
                self.selection.select(&self.document, &state.preview, mode);
            }
        }
    }

    /// Commit the gesture's edit, or drop it if nothing changed.
    fn finish_edit(&mut self, owns_edit: bool) {
        if !owns_edit {
            return;
        }
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

    /// Abort the active gesture, restoring the state before it started.
    pub fn cancel_gesture(&mut self) {
        self.snap_lines.clear();
        let gesture = std::mem::take(&mut self.gesture);
        let owned = match &gesture {
            Gesture::Dragging(state) => state.owns_edit,
            Gesture::Resizing(state) => state.owns_edit,
            Gesture::Idle | Gesture::MarqueeSelecting(_) => return,
        };
        if owned {
            if let Some(base) = self.history.cancel() {
                self.restore(base);
            }
            return;
        }

        // The host owns the edit: put back only what the gesture touched.
        let Ok(page) = self.document.page_mut(self.selection.page()) else {
            return;
        };
        match gesture {
            Gesture::Dragging(state) => {
                for (id, origin) in state.origins {
                    if let Some(element) = page.element_mut(id) {
                        element.x = origin.x;
                        element.y = origin.y;
                    }
                }
            }
            Gesture::Resizing(state) => {
                if let Some(element) = page.element_mut(state.id) {
                    element.x = state.original.x0;
                    element.y = state.original.y0;
                    element.width = state.original.width();
                    element.height = state.original.height();
                }
            }
            Gesture::Idle | Gesture::MarqueeSelecting(_) => {}
        }
    }
}
