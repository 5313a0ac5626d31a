//! Editor elements: time-bounded items placed on the canvas.

use cutline_core::{Placement, TimeFrame};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique element identifier, assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Element variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Video,
    Audio,
    Image,
    Text,
    Svg,
}

impl ElementKind {
    /// Whether the element is backed by a media element with its own clock.
    pub fn is_media(self) -> bool {
        matches!(self, Self::Video | Self::Audio)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Text => "text",
            Self::Svg => "svg",
        };
        f.write_str(name)
    }
}

/// Per-element visual filter for video and image elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Effect {
    #[default]
    None,
    BlackAndWhite,
    Sepia,
    Invert,
    Saturate,
}

/// Procedural per-part animation assignable to SVG elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkeletalKind {
    Walking,
    Handstand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProperties {
    /// Id of the backing video element.
    pub element_id: String,
    pub src: String,
    pub effect: Effect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioProperties {
    /// Id of the backing audio element.
    pub element_id: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProperties {
    pub element_id: String,
    pub src: String,
    pub effect: Effect,
    pub natural_width: f64,
    pub natural_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProperties {
    pub text: String,
    pub font_size: f64,
    /// CSS-style weight (400 normal, 700 bold).
    pub font_weight: u16,
    pub font_family: String,
    pub text_color: String,
    pub font_style: FontStyle,
}

impl TextProperties {
    pub const NORMAL_WEIGHT: u16 = 400;
    pub const BOLD_WEIGHT: u16 = 700;

    pub fn new(text: impl Into<String>, font_size: f64, font_weight: u16) -> Self {
        Self {
            text: text.into(),
            font_size,
            font_weight,
            font_family: "Arial".into(),
            text_color: "#ffffff".into(),
            font_style: FontStyle::Normal,
        }
    }

    pub fn is_bold(&self) -> bool {
        self.font_weight >= Self::BOLD_WEIGHT
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SvgProperties {
    pub src: String,
    /// Assigned skeletal animation, if any.
    pub animation_type: Option<SkeletalKind>,
}

/// Variant-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "properties")]
pub enum ElementProperties {
    Video(VideoProperties),
    Audio(AudioProperties),
    Image(ImageProperties),
    Text(TextProperties),
    Svg(SvgProperties),
}

impl ElementProperties {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Video(_) => ElementKind::Video,
            Self::Audio(_) => ElementKind::Audio,
            Self::Image(_) => ElementKind::Image,
            Self::Text(_) => ElementKind::Text,
            Self::Svg(_) => ElementKind::Svg,
        }
    }
}

/// A time-bounded item on the timeline and canvas.
///
/// The render object lives on the surface and is looked up by `id`; it is
/// never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorElement {
    pub id: ElementId,
    pub name: String,
    pub time_frame: TimeFrame,
    pub placement: Placement,
    #[serde(flatten)]
    pub properties: ElementProperties,
}

impl EditorElement {
    /// Create an element with a fresh id.
    pub fn new(
        name: impl Into<String>,
        time_frame: TimeFrame,
        placement: Placement,
        properties: ElementProperties,
    ) -> Self {
        Self {
            id: ElementId::new(),
            name: name.into(),
            time_frame,
            placement,
            properties,
        }
    }

    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.properties.kind()
    }

    /// Id of the backing media element for video/audio elements.
    pub fn media_id(&self) -> Option<&str> {
        match &self.properties {
            ElementProperties::Video(p) => Some(&p.element_id),
            ElementProperties::Audio(p) => Some(&p.element_id),
            _ => None,
        }
    }

    /// Source URL for media-backed variants.
    pub fn source(&self) -> Option<&str> {
        match &self.properties {
            ElementProperties::Video(p) => Some(&p.src),
            ElementProperties::Audio(p) => Some(&p.src),
            ElementProperties::Image(p) => Some(&p.src),
            ElementProperties::Svg(p) => Some(&p.src),
            ElementProperties::Text(_) => None,
        }
    }

    /// Point the element at a different backing media element.
    pub fn set_media_id(&mut self, media_id: impl Into<String>) {
        match &mut self.properties {
            ElementProperties::Video(p) => p.element_id = media_id.into(),
            ElementProperties::Audio(p) => p.element_id = media_id.into(),
            _ => {}
        }
    }

    /// Scale the render object carries at rest.
    ///
    /// Images are drawn at their natural size and fitted into the placement
    /// box, so their object scale folds in the fit.
    pub fn object_scale(&self) -> (f64, f64) {
        let placement = &self.placement;
        match &self.properties {
            ElementProperties::Image(image) => (
                fit_scale(placement.width, image.natural_width) * placement.scale_x,
                fit_scale(placement.height, image.natural_height) * placement.scale_y,
            ),
            _ => (placement.scale_x, placement.scale_y),
        }
    }

    /// Copy of this element under a fresh id.
    pub fn duplicate(&self, name: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(),
            name: name.into(),
            ..self.clone()
        }
    }
}

/// Scale that fits `natural` units into `target` units.
pub fn fit_scale(target: f64, natural: f64) -> f64 {
    if natural > 0.0 {
        target / natural
    } else {
        1.0
    }
}
