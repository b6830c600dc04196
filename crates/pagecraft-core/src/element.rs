//! Element definitions for the page canvas.

use crate::assets::AssetRef;
use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Identifier shared by all members of a link group.
pub type LinkGroupId = Uuid;

/// Font family used when none is given.
pub const DEFAULT_FONT_FAMILY: &str = "Inter";

/// Element construction errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElementError {
    #[error("Font family must not be empty")]
    EmptyFontFamily,
    #[error("Font size must be positive, got {0}")]
    InvalidFontSize(f64),
    #[error("Image source reference must not be empty")]
    EmptyImageSource,
    #[error("Invalid variable name: {0:?}")]
    InvalidVariableName(String),
    #[error("Unknown shape kind: {0}")]
    UnknownShapeKind(String),
}

/// Result type for element construction.
pub type ElementResult<T> = Result<T, ElementError>;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Light,
    #[default]
    Regular,
    Bold,
}

/// Horizontal text alignment inside the element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Shape subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Line,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Line => "line",
        }
    }
}

impl FromStr for ShapeKind {
    type Err = ElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rectangle" | "rect" => Ok(ShapeKind::Rectangle),
            "circle" | "ellipse" => Ok(ShapeKind::Circle),
            "line" => Ok(ShapeKind::Line),
            _ => Err(ElementError::UnknownShapeKind(s.to_string())),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Text content and font attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProps {
    pub content: String,
    pub font_family: String,
    pub font_size: f64,
    #[serde(default)]
    pub font_weight: FontWeight,
    pub color: SerializableColor,
    #[serde(default)]
    pub align: TextAlign,
}

impl TextProps {
    /// Default font size in document units.
    pub const DEFAULT_FONT_SIZE: f64 = 16.0;

    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: Self::DEFAULT_FONT_SIZE,
            font_weight: FontWeight::default(),
            color: SerializableColor::black(),
            align: TextAlign::default(),
        }
    }
}

/// Image reference. Bytes live in the asset store, never in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageProps {
    pub source: AssetRef,
}

/// Shape subtype plus fill and stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeProps {
    pub shape: ShapeKind,
    /// Fill color (None = no fill).
    pub fill: Option<SerializableColor>,
    pub stroke: SerializableColor,
    pub stroke_width: f64,
}

impl ShapeProps {
    pub fn new(shape: ShapeKind) -> Self {
        Self {
            shape,
            fill: None,
            stroke: SerializableColor::black(),
            stroke_width: 1.0,
        }
    }
}

/// A template token resolved by the host when the document is filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableProps {
    pub name: String,
    pub font_family: String,
    pub font_size: f64,
    pub color: SerializableColor,
}

impl VariableProps {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: TextProps::DEFAULT_FONT_SIZE,
            color: SerializableColor::black(),
        }
    }
}

/// Kind-specific properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementProps {
    Text(TextProps),
    Image(ImageProps),
    Shape(ShapeProps),
    Variable(VariableProps),
}

impl ElementProps {
    /// Discriminant name, as used on the wire.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ElementProps::Text(_) => "text",
            ElementProps::Image(_) => "image",
            ElementProps::Shape(_) => "shape",
            ElementProps::Variable(_) => "variable",
        }
    }

    fn validate(&self) -> ElementResult<()> {
        match self {
            ElementProps::Text(text) => validate_font(&text.font_family, text.font_size),
            ElementProps::Image(image) => {
                if image.source.is_empty() {
                    Err(ElementError::EmptyImageSource)
                } else {
                    Ok(())
                }
            }
            ElementProps::Shape(_) => Ok(()),
            ElementProps::Variable(var) => {
                validate_variable_name(&var.name)?;
                validate_font(&var.font_family, var.font_size)
            }
        }
    }
}

fn validate_font(family: &str, size: f64) -> ElementResult<()> {
    if family.trim().is_empty() {
        return Err(ElementError::EmptyFontFamily);
    }
    if !(size.is_finite() && size > 0.0) {
        return Err(ElementError::InvalidFontSize(size));
    }
    Ok(())
}

fn validate_variable_name(name: &str) -> ElementResult<()> {
    let bad = name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || c == '{' || c == '}');
    if bad {
        Err(ElementError::InvalidVariableName(name.to_string()))
    } else {
        Ok(())
    }
}

fn default_opacity() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

/// A placeable element on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub(crate) id: ElementId,
    /// Left of the unrotated box, page-local units.
    pub x: f64,
    /// Top of the unrotated box, page-local units.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation in degrees around the box center.
    #[serde(default)]
    pub rotation: f64,
    /// Paint/pick order; higher is on top.
    #[serde(default)]
    pub z_index: i64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Link group membership. Maintained by the selection module.
    #[serde(default)]
    pub(crate) link_group: Option<LinkGroupId>,
    pub props: ElementProps,
}

impl Element {
    /// Create a validated element occupying `rect`.
    pub fn new(rect: Rect, props: ElementProps) -> ElementResult<Self> {
        props.validate()?;
        Ok(Self::build(rect, props))
    }

    fn build(rect: Rect, props: ElementProps) -> Self {
        let rect = rect.abs();
        Self {
            id: Uuid::new_v4(),
            x: finite_or(rect.x0, 0.0),
            y: finite_or(rect.y0, 0.0),
            width: sanitize_len(rect.width(), 0.0),
            height: sanitize_len(rect.height(), 0.0),
            rotation: 0.0,
            z_index: 0,
            opacity: 1.0,
            visible: true,
            link_group: None,
            props,
        }
    }

    /// Text element with default font.
    pub fn text(rect: Rect, content: impl Into<String>) -> Self {
        Self::build(rect, ElementProps::Text(TextProps::new(content)))
    }

    /// Image element referencing an asset.
    pub fn image(rect: Rect, source: AssetRef) -> ElementResult<Self> {
        Self::new(rect, ElementProps::Image(ImageProps { source }))
    }

    /// Shape element with default stroke.
    pub fn shape(rect: Rect, shape: ShapeKind) -> Self {
        Self::build(rect, ElementProps::Shape(ShapeProps::new(shape)))
    }

    /// Variable (template token) element.
    pub fn variable(rect: Rect, name: impl Into<String>) -> ElementResult<Self> {
        Self::new(rect, ElementProps::Variable(VariableProps::new(name)))
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn link_group(&self) -> Option<LinkGroupId> {
        self.link_group
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The unrotated box.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    /// Builder-style z-index.
    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = z_index;
        self
    }

    /// Builder-style rotation (degrees).
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = finite_or(degrees, 0.0);
        self
    }

    /// Same element content under a fresh id and without link membership.
    pub(crate) fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        copy.link_group = None;
        copy
    }

    /// Clamp fields back into their valid ranges.
    pub(crate) fn sanitize(&mut self) {
        self.x = finite_or(self.x, 0.0);
        self.y = finite_or(self.y, 0.0);
        self.width = sanitize_len(self.width, 0.0);
        self.height = sanitize_len(self.height, 0.0);
        self.rotation = finite_or(self.rotation, 0.0);
        self.opacity = sanitize_opacity(self.opacity, 1.0);
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

fn sanitize_len(value: f64, fallback: f64) -> f64 {
    if value.is_nan() { fallback } else { value.max(0.0) }
}

fn sanitize_opacity(value: f64, fallback: f64) -> f64 {
    if value.is_nan() { fallback } else { value.clamp(0.0, 1.0) }
}

/// Partial text update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextPatch {
    pub content: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<FontWeight>,
    pub color: Option<SerializableColor>,
    pub align: Option<TextAlign>,
}

/// Partial image update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagePatch {
    pub source: Option<AssetRef>,
}

/// Partial shape update. `fill: Some(None)` clears the fill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapePatch {
    pub shape: Option<ShapeKind>,
    pub fill: Option<Option<SerializableColor>>,
    pub stroke: Option<SerializableColor>,
    pub stroke_width: Option<f64>,
}

/// Partial variable update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariablePatch {
    pub name: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub color: Option<SerializableColor>,
}

/// Kind-specific part of a patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PropsPatch {
    Text(TextPatch),
    Image(ImagePatch),
    Shape(ShapePatch),
    Variable(VariablePatch),
}

/// Sparse update for an element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub z_index: Option<i64>,
    pub opacity: Option<f64>,
    pub visible: Option<bool>,
    pub props: Option<PropsPatch>,
}

impl ElementPatch {
    /// Patch that only moves the element.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// Patch that only resizes the element.
    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    /// Patch that only changes opacity.
    pub fn opacity(opacity: f64) -> Self {
        Self {
            opacity: Some(opacity),
            ..Default::default()
        }
    }
}

/// Merge `patch` into a copy of `element`.
///
/// The id and link group are never touched. Numeric fields are clamped
/// (opacity to [0,1], sizes to >= 0) and NaN inputs are ignored. Props
/// patches for a different element kind are dropped, as are values that
/// would fail construction-time validation.
pub fn apply_props_patch(element: &Element, patch: &ElementPatch) -> Element {
    let mut next = element.clone();

    let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
    if let Some(x) = finite(patch.x) {
        next.x = x;
    }
    if let Some(y) = finite(patch.y) {
        next.y = y;
    }
    if let Some(width) = patch.width {
        next.width = sanitize_len(width, next.width);
    }
    if let Some(height) = patch.height {
        next.height = sanitize_len(height, next.height);
    }
    if let Some(rotation) = finite(patch.rotation) {
        next.rotation = rotation;
    }
    if let Some(z) = patch.z_index {
        next.z_index = z;
    }
    if let Some(opacity) = patch.opacity {
        next.opacity = sanitize_opacity(opacity, next.opacity);
    }
    if let Some(visible) = patch.visible {
        next.visible = visible;
    }

    if let Some(props) = &patch.props {
        match (&mut next.props, props) {
            (ElementProps::Text(text), PropsPatch::Text(p)) => {
                if let Some(content) = &p.content {
                    text.content = content.clone();
                }
                apply_font(&mut text.font_family, &mut text.font_size, &p.font_family, p.font_size);
                if let Some(weight) = p.font_weight {
                    text.font_weight = weight;
                }
                if let Some(color) = p.color {
                    text.color = color;
                }
                if let Some(align) = p.align {
                    text.align = align;
                }
            }
            (ElementProps::Image(image), PropsPatch::Image(p)) => {
                if let Some(source) = p.source.as_ref().filter(|s| !s.is_empty()) {
                    image.source = source.clone();
                }
            }
            (ElementProps::Shape(shape), PropsPatch::Shape(p)) => {
                if let Some(kind) = p.shape {
                    shape.shape = kind;
                }
                if let Some(fill) = p.fill {
                    shape.fill = fill;
                }
                if let Some(stroke) = p.stroke {
                    shape.stroke = stroke;
                }
                if let Some(width) = p.stroke_width {
                    shape.stroke_width = sanitize_len(width, shape.stroke_width);
                }
            }
            (ElementProps::Variable(var), PropsPatch::Variable(p)) => {
                if let Some(name) = &p.name {
                    if validate_variable_name(name).is_ok() {
                        var.name = name.clone();
                    } else {
                        log::debug!("Ignoring invalid variable name {:?}", name);
                    }
                }
                apply_font(&mut var.font_family, &mut var.font_size, &p.font_family, p.font_size);
                if let Some(color) = p.color {
                    var.color = color;
                }
            }
            (current, _) => {
                log::debug!(
                    "Ignoring props patch of another kind for {} element {}",
                    current.kind_name(),
                    element.id
                );
            }
        }
    }

    next
}

fn apply_font(family: &mut String, size: &mut f64, new_family: &Option<String>, new_size: Option<f64>) {
    if let Some(f) = new_family.as_ref().filter(|f| !f.trim().is_empty()) {
        *family = f.clone();
    }
    if let Some(s) = new_size.filter(|s| s.is_finite() && *s > 0.0) {
        *size = s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::from_origin_size((x, y), (w, h))
    }

    #[test]
    fn test_text_defaults() {
        let el = Element::text(rect(10.0, 10.0, 100.0, 30.0), "Hello");
        assert!((el.x - 10.0).abs() < f64::EPSILON);
        assert!((el.width - 100.0).abs() < f64::EPSILON);
        assert!((el.opacity - 1.0).abs() < f64::EPSILON);
        assert!(el.visible);
        assert!(el.link_group().is_none());
        match &el.props {
            ElementProps::Text(t) => assert_eq!(t.font_family, DEFAULT_FONT_FAMILY),
            other => panic!("Expected text props, got {other:?}"),
        }
    }

    #[test]
    fn test_new_normalizes_inverted_rect() {
        let el = Element::shape(Rect::new(100.0, 80.0, 20.0, 40.0), ShapeKind::Rectangle);
        assert!((el.x - 20.0).abs() < f64::EPSILON);
        assert!((el.y - 40.0).abs() < f64::EPSILON);
        assert!((el.width - 80.0).abs() < f64::EPSILON);
        assert!((el.height - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_text_requires_font_family() {
        let mut props = TextProps::new("x");
        props.font_family = "  ".to_string();
        let result = Element::new(rect(0.0, 0.0, 10.0, 10.0), ElementProps::Text(props));
        assert_eq!(result, Err(ElementError::EmptyFontFamily));
    }

    #[test]
    fn test_image_requires_source() {
        let result = Element::image(rect(0.0, 0.0, 10.0, 10.0), AssetRef::new(""));
        assert_eq!(result, Err(ElementError::EmptyImageSource));
    }

    #[test]
    fn test_variable_name_validation() {
        assert!(Element::variable(rect(0.0, 0.0, 10.0, 10.0), "recipient_name").is_ok());
        assert!(Element::variable(rect(0.0, 0.0, 10.0, 10.0), "").is_err());
        assert!(Element::variable(rect(0.0, 0.0, 10.0, 10.0), "two words").is_err());
        assert!(Element::variable(rect(0.0, 0.0, 10.0, 10.0), "{name}").is_err());
    }

    #[test]
    fn test_shape_kind_parse() {
        assert_eq!("rectangle".parse::<ShapeKind>(), Ok(ShapeKind::Rectangle));
        assert_eq!("Circle".parse::<ShapeKind>(), Ok(ShapeKind::Circle));
        assert_eq!("line".parse::<ShapeKind>(), Ok(ShapeKind::Line));
        assert!(matches!(
            "triangle".parse::<ShapeKind>(),
            Err(ElementError::UnknownShapeKind(_))
        ));
    }

    #[test]
    fn test_patch_is_copy_on_write() {
        let el = Element::text(rect(0.0, 0.0, 50.0, 20.0), "a");
        let patched = apply_props_patch(&el, &ElementPatch::position(30.0, 40.0));
        assert!((el.x - 0.0).abs() < f64::EPSILON);
        assert!((patched.x - 30.0).abs() < f64::EPSILON);
        assert!((patched.y - 40.0).abs() < f64::EPSILON);
        assert_eq!(patched.id(), el.id());
    }

    #[test]
    fn test_patch_clamps_opacity_and_size() {
        let el = Element::shape(rect(0.0, 0.0, 50.0, 20.0), ShapeKind::Circle);
        let patch = ElementPatch {
            width: Some(-5.0),
            height: Some(f64::NAN),
            opacity: Some(1.7),
            ..Default::default()
        };
        let patched = apply_props_patch(&el, &patch);
        assert!((patched.width - 0.0).abs() < f64::EPSILON);
        assert!((patched.height - 20.0).abs() < f64::EPSILON);
        assert!((patched.opacity - 1.0).abs() < f64::EPSILON);

        let patched = apply_props_patch(&el, &ElementPatch::opacity(-0.5));
        assert!((patched.opacity - 0.0).abs() < f64::EPSILON);

        let patched = apply_props_patch(&el, &ElementPatch::opacity(f64::NAN));
        assert!((patched.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_patch_preserves_link_group() {
        let mut el = Element::text(rect(0.0, 0.0, 50.0, 20.0), "a");
        let group = Uuid::new_v4();
        el.link_group = Some(group);
        let patched = apply_props_patch(&el, &ElementPatch::size(10.0, 10.0));
        assert_eq!(patched.link_group(), Some(group));
    }

    #[test]
    fn test_patch_text_props() {
        let el = Element::text(rect(0.0, 0.0, 50.0, 20.0), "a");
        let patch = ElementPatch {
            props: Some(PropsPatch::Text(TextPatch {
                content: Some("Certificate of Completion".to_string()),
                font_family: Some(String::new()),
                font_size: Some(24.0),
                align: Some(TextAlign::Center),
                ..Default::default()
            })),
            ..Default::default()
        };
        let patched = apply_props_patch(&el, &patch);
        let ElementProps::Text(text) = &patched.props else {
            panic!("Expected text props");
        };
        assert_eq!(text.content, "Certificate of Completion");
        // Empty family is rejected, previous value kept
        assert_eq!(text.font_family, DEFAULT_FONT_FAMILY);
        assert!((text.font_size - 24.0).abs() < f64::EPSILON);
        assert_eq!(text.align, TextAlign::Center);
    }

    #[test]
    fn test_patch_of_other_kind_is_ignored() {
        let el = Element::shape(rect(0.0, 0.0, 50.0, 20.0), ShapeKind::Rectangle);
        let patch = ElementPatch {
            props: Some(PropsPatch::Text(TextPatch {
                content: Some("nope".to_string()),
                ..Default::default()
            })),
            ..Default::default()
        };
        let patched = apply_props_patch(&el, &patch);
        assert_eq!(patched, el);
    }

    #[test]
    fn test_shape_fill_can_be_cleared() {
        let mut el = Element::shape(rect(0.0, 0.0, 50.0, 20.0), ShapeKind::Rectangle);
        if let ElementProps::Shape(shape) = &mut el.props {
            shape.fill = Some(SerializableColor::white());
        }
        let patch = ElementPatch {
            props: Some(PropsPatch::Shape(ShapePatch {
                fill: Some(None),
                ..Default::default()
            })),
            ..Default::default()
        };
        let patched = apply_props_patch(&el, &patch);
        let ElementProps::Shape(shape) = &patched.props else {
            panic!("Expected shape props");
        };
        assert_eq!(shape.fill, None);
    }

    #[test]
    fn test_color_conversion() {
        let color = SerializableColor::new(10, 20, 30, 255);
        let peniko_color: Color = color.into();
        let back: SerializableColor = peniko_color.into();
        assert_eq!(back, color);
    }

    #[test]
    fn test_json_shape() {
        let el = Element::variable(rect(1.0, 2.0, 3.0, 4.0), "invoice_total").unwrap();
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["props"]["kind"], "variable");
        assert_eq!(json["props"]["name"], "invoice_total");
        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, el);
    }
}
