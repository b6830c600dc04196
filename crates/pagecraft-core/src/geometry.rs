//! Pure geometry: bounds, snapping, picking and resize handles.
//!
//! Everything here works in document space. Screen-constant distances
//! (snap threshold, pick slop) are passed in pixels and divided by zoom.

use crate::element::{Element, ElementId};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Rotate a vector clockwise (y down) by `degrees`.
pub fn rotate_vec(v: Vec2, degrees: f64) -> Vec2 {
    if degrees == 0.0 {
        return v;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Corners of `rect` rotated about its center, in TL, TR, BR, BL order.
pub fn rotated_corners(rect: Rect, degrees: f64) -> [Point; 4] {
    let center = rect.center();
    let hw = rect.width() / 2.0;
    let hh = rect.height() / 2.0;
    [
        Vec2::new(-hw, -hh),
        Vec2::new(hw, -hh),
        Vec2::new(hw, hh),
        Vec2::new(-hw, hh),
    ]
    .map(|offset| center + rotate_vec(offset, degrees))
}

/// Axis-aligned box enclosing `rect` rotated by `degrees` about its center.
pub fn rotated_bounds(rect: Rect, degrees: f64) -> Rect {
    if degrees == 0.0 || !degrees.is_finite() {
        return rect;
    }
    let corners = rotated_corners(rect, degrees);
    let mut bounds = Rect::from_points(corners[0], corners[0]);
    for corner in &corners[1..] {
        bounds = bounds.union_pt(*corner);
    }
    bounds
}

/// Bounding box of an element, enclosing its rotated shape.
pub fn bounding_box(element: &Element) -> Rect {
    rotated_bounds(element.rect(), element.rotation)
}

/// Union of several boxes.
pub fn union_bounds(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

/// Convert a screen-pixel distance into document units at `zoom`.
pub fn snap_threshold(px: f64, zoom: f64) -> f64 {
    if zoom.is_finite() && zoom > 0.0 {
        px / zoom
    } else {
        px
    }
}

/// Orientation of a snap line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapAxis {
    /// A vertical line at some x; adjusts horizontal position.
    Vertical,
    /// A horizontal line at some y; adjusts vertical position.
    Horizontal,
}

/// What lined up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapKind {
    Edge,
    Center,
}

/// A chosen alignment on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapGuide {
    pub axis: SnapAxis,
    /// Coordinate of the guide line in document space.
    pub position: f64,
    /// Amount to add to the moving box on this axis to land on the line.
    pub offset: f64,
    pub kind: SnapKind,
    /// Element the guide comes from.
    pub source: ElementId,
}

/// At most one guide per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SnapCandidates {
    pub vertical: Option<SnapGuide>,
    pub horizontal: Option<SnapGuide>,
}

impl SnapCandidates {
    pub fn is_empty(&self) -> bool {
        self.vertical.is_none() && self.horizontal.is_none()
    }

    /// Offset to apply to the moving box.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(
            self.vertical.map_or(0.0, |g| g.offset),
            self.horizontal.map_or(0.0, |g| g.offset),
        )
    }

    /// Guides to draw.
    pub fn lines(&self) -> Vec<SnapGuide> {
        self.vertical.into_iter().chain(self.horizontal).collect()
    }
}

// (moving feature, target feature) pairings per axis. Features are
// 0 = start edge, 1 = end edge, 2 = center.
const FEATURE_PAIRS: [(usize, usize, SnapKind); 5] = [
    (0, 0, SnapKind::Edge),
    (0, 1, SnapKind::Edge),
    (1, 0, SnapKind::Edge),
    (1, 1, SnapKind::Edge),
    (2, 2, SnapKind::Center),
];

struct Candidate {
    guide: SnapGuide,
    distance: f64,
    order: usize,
}

impl Candidate {
    /// Center beats edge, then distance, then source id, then feature order.
    fn better_than(&self, other: &Candidate) -> bool {
        let rank = |c: &Candidate| u8::from(c.guide.kind != SnapKind::Center);
        rank(self)
            .cmp(&rank(other))
            .then_with(|| self.distance.total_cmp(&other.distance))
            .then_with(|| self.guide.source.cmp(&other.guide.source))
            .then_with(|| self.order.cmp(&other.order))
            == Ordering::Less
    }
}

fn best_on_axis(
    axis: SnapAxis,
    moving: [f64; 3],
    others: &[(ElementId, Rect)],
    threshold: f64,
) -> Option<SnapGuide> {
    let mut best: Option<Candidate> = None;
    for (id, rect) in others {
        let target = match axis {
            SnapAxis::Vertical => [rect.x0, rect.x1, rect.center().x],
            SnapAxis::Horizontal => [rect.y0, rect.y1, rect.center().y],
        };
        for (order, (m, t, kind)) in FEATURE_PAIRS.iter().enumerate() {
            let offset = target[*t] - moving[*m];
            let distance = offset.abs();
            if !(distance <= threshold) {
                continue;
            }
            let candidate = Candidate {
                guide: SnapGuide {
                    axis,
                    position: target[*t],
                    offset,
                    kind: *kind,
                    source: *id,
                },
                distance,
                order,
            };
            if best.as_ref().is_none_or(|b| candidate.better_than(b)) {
                best = Some(candidate);
            }
        }
    }
    best.map(|c| c.guide)
}

/// Find the alignment guides for a moving box against other boxes.
///
/// Vertical and horizontal guides are chosen independently. `threshold` is
/// in document units (see [`snap_threshold`]).
pub fn compute_snap_candidates(
    moving: Rect,
    others: &[(ElementId, Rect)],
    threshold: f64,
) -> SnapCandidates {
    let center = moving.center();
    SnapCandidates {
        vertical: best_on_axis(
            SnapAxis::Vertical,
            [moving.x0, moving.x1, center.x],
            others,
            threshold,
        ),
        horizontal: best_on_axis(
            SnapAxis::Horizontal,
            [moving.y0, moving.y1, center.y],
            others,
            threshold,
        ),
    }
}

/// Elements in paint order (bottom first). Ties keep insertion order.
pub fn paint_order(elements: &[Element]) -> Vec<&Element> {
    let mut ordered: Vec<&Element> = elements.iter().collect();
    ordered.sort_by_key(|e| e.z_index);
    ordered
}

/// Topmost visible element whose bounding box contains `point` (edges
/// included). Pointer picking adds slop through [`hit_test_with_tolerance`].
pub fn hit_test(point: Point, elements: &[Element], zoom: f64) -> Option<ElementId> {
    hit_test_with_tolerance(point, elements, zoom, 0.0)
}

/// Topmost visible element whose bounds, inflated by `tolerance_px` screen
/// pixels, contain `point`.
pub fn hit_test_with_tolerance(
    point: Point,
    elements: &[Element],
    zoom: f64,
    tolerance_px: f64,
) -> Option<ElementId> {
    let slop = snap_threshold(tolerance_px, zoom);
    paint_order(elements)
        .into_iter()
        .rev()
        .filter(|e| e.visible)
        .find(|e| contains_inclusive(bounding_box(e).inflate(slop, slop), point))
        .map(|e| e.id())
}

fn contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

fn overlaps_inclusive(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

/// Visible elements whose bounding box touches or overlaps `rect`.
pub fn marquee_select(rect: Rect, elements: &[Element]) -> Vec<ElementId> {
    let rect = rect.abs();
    elements
        .iter()
        .filter(|e| e.visible && overlaps_inclusive(bounding_box(e), rect))
        .map(|e| e.id())
        .collect()
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Type of resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Corner(Corner),
    Edge(Edge),
}

impl HandleKind {
    /// Which sides the handle drags, as (x, y) signs in local space:
    /// -1 moves the left/top side, 1 the right/bottom side, 0 neither.
    pub fn sides(self) -> (f64, f64) {
        match self {
            HandleKind::Corner(Corner::TopLeft) => (-1.0, -1.0),
            HandleKind::Corner(Corner::TopRight) => (1.0, -1.0),
            HandleKind::Corner(Corner::BottomLeft) => (-1.0, 1.0),
            HandleKind::Corner(Corner::BottomRight) => (1.0, 1.0),
            HandleKind::Edge(Edge::Top) => (0.0, -1.0),
            HandleKind::Edge(Edge::Right) => (1.0, 0.0),
            HandleKind::Edge(Edge::Bottom) => (0.0, 1.0),
            HandleKind::Edge(Edge::Left) => (-1.0, 0.0),
        }
    }
}

const HANDLE_KINDS: [HandleKind; 8] = [
    HandleKind::Corner(Corner::TopLeft),
    HandleKind::Corner(Corner::TopRight),
    HandleKind::Corner(Corner::BottomLeft),
    HandleKind::Corner(Corner::BottomRight),
    HandleKind::Edge(Edge::Top),
    HandleKind::Edge(Edge::Right),
    HandleKind::Edge(Edge::Bottom),
    HandleKind::Edge(Edge::Left),
];

/// A resize handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in document coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point hits this handle. `tolerance` is in document units.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

/// The eight resize handles of an element, rotated with it.
pub fn handles(element: &Element) -> [Handle; 8] {
    let rect = element.rect();
    let center = rect.center();
    let half = Vec2::new(rect.width() / 2.0, rect.height() / 2.0);
    HANDLE_KINDS.map(|kind| {
        let (sx, sy) = kind.sides();
        let local = Vec2::new(sx * half.x, sy * half.y);
        Handle::new(center + rotate_vec(local, element.rotation), kind)
    })
}

/// Closest handle of `element` within `tolerance` of `point`.
pub fn hit_test_handles(element: &Element, point: Point, tolerance: f64) -> Option<HandleKind> {
    handles(element)
        .into_iter()
        .filter(|h| h.hit_test(point, tolerance))
        .min_by(|a, b| {
            (point - a.position)
                .hypot2()
                .total_cmp(&(point - b.position).hypot2())
        })
        .map(|h| h.kind)
}

/// Resize an (unrotated) `rect` rotated by `degrees` by dragging `handle`
/// through `world_delta`.
///
/// The delta is taken into the element's local axes, the dragged sides are
/// moved, sizes are clamped to `min_size`, and the box is repositioned so
/// the opposite anchor stays fixed in document space.
pub fn resize_rect(
    rect: Rect,
    degrees: f64,
    handle: HandleKind,
    world_delta: Vec2,
    min_size: f64,
) -> Rect {
    let local = rotate_vec(world_delta, -degrees);
    let (sx, sy) = handle.sides();
    let (w0, h0) = (rect.width(), rect.height());

    let width = (w0 + sx * local.x).max(min_size);
    let height = (h0 + sy * local.y).max(min_size);
    let width = if width.is_finite() { width } else { w0 };
    let height = if height.is_finite() { height } else { h0 };

    let anchor_before = Vec2::new(-sx * w0 / 2.0, -sy * h0 / 2.0);
    let anchor = rect.center() + rotate_vec(anchor_before, degrees);
    let anchor_after = Vec2::new(-sx * width / 2.0, -sy * height / 2.0);
    let center = anchor - rotate_vec(anchor_after, degrees);

    Rect::from_center_size(center, (width, height))
}
