//! Animation records attached to elements.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::element::ElementId;

/// Edge an element slides in from or out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideDirection {
    Left,
    Right,
    Top,
    Bottom,
}

/// Granularity of a text slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideTextType {
    /// Slide the text object as a whole.
    #[default]
    None,
    /// Slide each character separately with a stagger.
    Character,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideProperties {
    pub direction: SlideDirection,
    /// Clip the element to its own box while sliding.
    #[serde(default)]
    pub use_clip_path: bool,
    #[serde(default)]
    pub text_type: SlideTextType,
}

impl SlideProperties {
    pub fn new(direction: SlideDirection) -> Self {
        Self {
            direction,
            use_clip_path: false,
            text_type: SlideTextType::None,
        }
    }
}

/// What the animation does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "properties")]
pub enum AnimationKind {
    FadeIn,
    FadeOut,
    SlideIn(SlideProperties),
    SlideOut(SlideProperties),
    Breathe,
}

impl AnimationKind {
    pub fn is_slide_in(&self) -> bool {
        matches!(self, Self::SlideIn(_))
    }

    pub fn is_slide_out(&self) -> bool {
        matches!(self, Self::SlideOut(_))
    }
}

/// An animation applied to one element.
///
/// `target_id` may dangle after the element is deleted; such animations are
/// skipped when the tween timeline is rebuilt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    pub id: Uuid,
    pub target_id: ElementId,
    /// Length of the effect (ms).
    pub duration: f64,
    #[serde(flatten)]
    pub kind: AnimationKind,
}

impl Animation {
    pub fn new(target_id: ElementId, kind: AnimationKind, duration: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            target_id,
            duration,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let target = ElementId::new();
        let mut props = SlideProperties::new(SlideDirection::Left);
        props.use_clip_path = true;
        let anim = Animation::new(target, AnimationKind::SlideIn(props), 1000.0);

        let json = serde_json::to_value(&anim).expect("serialize");
        assert_eq!(json["type"], "slideIn");
        assert_eq!(json["properties"]["direction"], "left");
        assert_eq!(json["properties"]["useClipPath"], true);
        assert_eq!(json["duration"], 1000.0);

        let back: Animation = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, anim);
    }

    #[test]
    fn test_fade_has_no_properties() {
        let anim = Animation::new(ElementId::new(), AnimationKind::FadeIn, 500.0);
        let json = serde_json::to_value(&anim).expect("serialize");
        assert_eq!(json["type"], "fadeIn");
        assert!(json.get("properties").is_none());
    }
}
