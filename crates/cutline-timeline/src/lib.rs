//! Cutline Timeline - Element model
//!
//! Implements the data the editor session works on:
//! - Time-bounded editor elements (video, audio, image, text, SVG)
//! - Animation records attached to elements
//! - The element model store with single selection
//! - The element to render-object side table
//! - The render surface contract plus an in-memory surface

pub mod animation;
pub mod element;
pub mod model;
pub mod objects;
pub mod surface;

pub use animation::{Animation, AnimationKind, SlideDirection, SlideProperties, SlideTextType};
pub use element::{
    fit_scale, AudioProperties, EditorElement, Effect, ElementId, ElementKind, ElementProperties,
    FontStyle, ImageProperties, SkeletalKind, SvgProperties, TextProperties, VideoProperties,
};
pub use model::ElementModel;
pub use objects::ObjectTable;
pub use surface::{
    GlyphBox, HeadlessSurface, ObjectId, ObjectProps, ObjectSpec, Property, RenderSurface,
    TextLayout,
};
