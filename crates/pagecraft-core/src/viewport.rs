//! Zoom and pan for the page view.

use crate::config::{EditorConfig, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// View transform: document point `p` appears at `p * zoom + pan`.
///
/// Presentation state only. Never recorded in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Translation in view pixels.
    pub pan: Vec2,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Viewport using the zoom range from `config`. An unusable range
    /// falls back to the default one.
    pub fn from_config(config: &EditorConfig) -> Self {
        let (min_zoom, max_zoom) = (config.min_zoom, config.max_zoom);
        let usable = min_zoom.is_finite() && max_zoom.is_finite() && min_zoom > 0.0 && min_zoom <= max_zoom;
        if !usable {
            log::warn!("Ignoring zoom range {}..{}", min_zoom, max_zoom);
            return Self::default();
        }
        let mut viewport = Self {
            min_zoom,
            max_zoom,
            ..Self::default()
        };
        viewport.set_zoom(1.0);
        viewport
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn zoom_range(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// Zoom as a UI percentage (100 = 1.0).
    pub fn zoom_percent(&self) -> f64 {
        self.zoom * 100.0
    }

    /// Set the zoom factor, clamped to the allowed range. NaN is ignored.
    pub fn set_zoom(&mut self, factor: f64) {
        if factor.is_nan() {
            log::debug!("Ignoring NaN zoom");
            return;
        }
        // max/min rather than clamp: never panics on a bad range
        self.zoom = factor.max(self.min_zoom).min(self.max_zoom);
    }

    /// Set the zoom from a 0-300 % slider value.
    pub fn set_zoom_percent(&mut self, percent: f64) {
        self.set_zoom(percent / 100.0);
    }

    /// Document to view transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    pub fn to_view_space(&self, document_point: Point) -> Point {
        self.transform() * document_point
    }

    pub fn to_document_space(&self, view_point: Point) -> Point {
        Point::new(
            (view_point.x - self.pan.x) / self.zoom,
            (view_point.y - self.pan.y) / self.zoom,
        )
    }

    /// Convert a view-space distance into document units.
    pub fn to_document_distance(&self, view_distance: f64) -> f64 {
        view_distance / self.zoom
    }

    /// Pan by a delta in view pixels.
    pub fn pan(&mut self, delta: Vec2) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.pan += delta;
        }
    }

    /// Zoom to `factor`, keeping `view_point` over the same document point.
    pub fn zoom_at(&mut self, view_point: Point, factor: f64) {
        let anchor = self.to_document_space(view_point);
        self.set_zoom(factor);
        let moved = self.to_view_space(anchor);
        self.pan += view_point - moved;
    }

    /// Fit a page of `page_size` into a view of `view_size` and center it.
    pub fn fit_page(&mut self, page_size: Size, view_size: Size, padding: f64) {
        if page_size.width <= 0.0 || page_size.height <= 0.0 {
            self.pan = Vec2::ZERO;
            self.set_zoom(1.0);
            return;
        }
        let available = Size::new(
            (view_size.width - padding * 2.0).max(1.0),
            (view_size.height - padding * 2.0).max(1.0),
        );
        let scale_x = available.width / page_size.width;
        let scale_y = available.height / page_size.height;
        self.set_zoom(scale_x.min(scale_y));

        let page_center = Rect::from_origin_size(Point::ZERO, page_size).center();
        self.pan = Vec2::new(
            view_size.width / 2.0 - page_center.x * self.zoom,
            view_size.height / 2.0 - page_center.y * self.zoom,
        );
    }
}
