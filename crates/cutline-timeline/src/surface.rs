//! Render surface contract and an in-memory implementation.
//!
//! The surface is a 2D scene graph of disposable objects projected from the
//! element model. Objects are addressed by [`ObjectId`]; an object can exist
//! detached (created or cloned, not yet added) or attached to the stacking
//! order returned by [`RenderSurface::objects`].

use cutline_core::{EditorError, Placement, Rect, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::element::{Effect, FontStyle};

/// Handle to an object on a render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

/// Numeric object properties that tweens may drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    Left,
    Top,
    Angle,
    ScaleX,
    ScaleY,
    Opacity,
}

/// Transform and visibility of a render object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectProps {
    pub left: f64,
    pub top: f64,
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
    pub opacity: f64,
}

impl ObjectProps {
    /// Props mirroring an element placement.
    pub fn from_placement(placement: &Placement) -> Self {
        Self {
            left: placement.x,
            top: placement.y,
            angle: placement.rotation,
            scale_x: placement.scale_x,
            scale_y: placement.scale_y,
            width: placement.width,
            height: placement.height,
            visible: true,
            opacity: 1.0,
        }
    }

    pub fn get(&self, property: Property) -> f64 {
        match property {
            Property::Left => self.left,
            Property::Top => self.top,
            Property::Angle => self.angle,
            Property::ScaleX => self.scale_x,
            Property::ScaleY => self.scale_y,
            Property::Opacity => self.opacity,
        }
    }

    pub fn set(&mut self, property: Property, value: f64) {
        match property {
            Property::Left => self.left = value,
            Property::Top => self.top = value,
            Property::Angle => self.angle = value,
            Property::ScaleX => self.scale_x = value,
            Property::ScaleY => self.scale_y = value,
            Property::Opacity => self.opacity = value,
        }
    }
}

impl Default for ObjectProps {
    fn default() -> Self {
        Self::from_placement(&Placement::default())
    }
}

/// What a render object draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ObjectSpec {
    /// Frames of a backing video element.
    Video { media_id: String, effect: Effect },
    Image { src: String, effect: Effect },
    Text {
        text: String,
        font_size: f64,
        font_weight: u16,
        font_family: String,
        fill: String,
        font_style: FontStyle,
    },
    /// A single character split out of a text object.
    Glyph {
        ch: char,
        font_size: f64,
        font_weight: u16,
        font_family: String,
        fill: String,
    },
    /// A loaded SVG group; named sub-parts are addressable via
    /// [`RenderSurface::find_part`].
    Svg { src: String },
    /// Plain filled rectangle; audio elements use a transparent one as
    /// their on-canvas handle.
    Rect { fill: String },
}

/// Position of one laid-out character, relative to the text object origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphBox {
    pub ch: char,
    pub line: usize,
    pub left: f64,
    pub top: f64,
    pub width: f64,
}

/// Character layout of a text object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayout {
    pub line_height: f64,
    pub glyphs: Vec<GlyphBox>,
}

impl TextLayout {
    pub fn char_count(&self) -> usize {
        self.glyphs.len()
    }
}

/// The external 2D scene graph the editor projects elements onto.
pub trait RenderSurface {
    /// Create a detached object.
    fn create(&mut self, spec: ObjectSpec, props: ObjectProps) -> Result<ObjectId>;

    /// Attach an object at the top of the stacking order.
    fn add(&mut self, object: ObjectId);

    /// Detach an object; it keeps existing and can be added again.
    fn remove(&mut self, object: ObjectId);

    /// Attached objects, bottom to top.
    fn objects(&self) -> Vec<ObjectId>;

    /// Move an attached object to `index` in the stacking order.
    fn move_to(&mut self, object: ObjectId, index: usize);

    fn active(&self) -> Option<ObjectId>;

    fn set_active(&mut self, object: Option<ObjectId>);

    fn render_all(&mut self);

    fn props(&self, object: ObjectId) -> Option<ObjectProps>;

    fn props_mut(&mut self, object: ObjectId) -> Option<&mut ObjectProps>;

    fn spec(&self, object: ObjectId) -> Option<&ObjectSpec>;

    /// Replace what an object draws, keeping its transform.
    fn set_spec(&mut self, object: ObjectId, spec: ObjectSpec) -> Result<()>;

    /// Equivalent detached copy of an object.
    fn clone_object(&mut self, object: ObjectId) -> Result<ObjectId>;

    /// Forget an object entirely. Detaches it first if needed.
    fn discard(&mut self, object: ObjectId);

    fn set_clip(&mut self, object: ObjectId, clip: Option<Rect>);

    /// Named sub-part of a grouped object.
    fn find_part(&self, group: ObjectId, name: &str) -> Option<ObjectId>;

    fn text_layout(&self, object: ObjectId) -> Option<TextLayout>;

    fn set_background(&mut self, color: &str);

    /// Canvas size in scene units.
    fn size(&self) -> (f64, f64);

    /// Detach every object.
    fn clear(&mut self) {
        for object in self.objects() {
            self.remove(object);
        }
    }

    fn contains(&self, object: ObjectId) -> bool {
        self.objects().contains(&object)
    }
}

#[derive(Debug, Clone)]
struct HeadlessObject {
    spec: ObjectSpec,
    props: ObjectProps,
    clip: Option<Rect>,
    parts: Vec<(String, ObjectId)>,
}

/// In-memory render surface.
///
/// SVG sources must be registered with [`HeadlessSurface::register_svg`]
/// before objects can be created from them; unknown sources fail the way a
/// failed fetch would.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    width: f64,
    height: f64,
    next_id: u64,
    objects: HashMap<ObjectId, HeadlessObject>,
    order: Vec<ObjectId>,
    active: Option<ObjectId>,
    background: String,
    render_count: u64,
    svg_library: HashMap<String, Vec<String>>,
}

impl HeadlessSurface {
    /// Horizontal advance per character, as a fraction of the font size.
    const GLYPH_ADVANCE: f64 = 0.6;
    const LINE_HEIGHT: f64 = 1.16;

    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            next_id: 1,
            objects: HashMap::new(),
            order: Vec::new(),
            active: None,
            background: String::new(),
            render_count: 0,
            svg_library: HashMap::new(),
        }
    }

    /// Make an SVG source loadable, exposing the given named parts.
    pub fn register_svg(&mut self, src: impl Into<String>, parts: &[&str]) {
        self.svg_library
            .insert(src.into(), parts.iter().map(|p| p.to_string()).collect());
    }

    pub fn background(&self) -> &str {
        &self.background
    }

    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub fn clip(&self, object: ObjectId) -> Option<Rect> {
        self.objects.get(&object).and_then(|o| o.clip)
    }

    /// Number of live objects, attached or not, including SVG parts.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn allocate(&mut self, object: HeadlessObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, object);
        id
    }

    fn svg_parts(&mut self, src: &str) -> Result<Vec<(String, ObjectId)>> {
        let names = self
            .svg_library
            .get(src)
            .cloned()
            .ok_or_else(|| EditorError::ExternalLoad(format!("cannot load svg {src}")))?;
        Ok(names
            .into_iter()
            .map(|name| {
                let part = self.allocate(HeadlessObject {
                    spec: ObjectSpec::Svg {
                        src: format!("{src}#{name}"),
                    },
                    props: ObjectProps::default(),
                    clip: None,
                    parts: Vec::new(),
                });
                (name, part)
            })
            .collect())
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(800.0, 500.0)
    }
}

impl RenderSurface for HeadlessSurface {
    fn create(&mut self, spec: ObjectSpec, props: ObjectProps) -> Result<ObjectId> {
        let parts = match &spec {
            ObjectSpec::Svg { src } => self.svg_parts(src)?,
            _ => Vec::new(),
        };
        Ok(self.allocate(HeadlessObject {
            spec,
            props,
            clip: None,
            parts,
        }))
    }

    fn add(&mut self, object: ObjectId) {
        if self.objects.contains_key(&object) && !self.order.contains(&object) {
            self.order.push(object);
        }
    }

    fn remove(&mut self, object: ObjectId) {
        self.order.retain(|o| *o != object);
        if self.active == Some(object) {
            self.active = None;
        }
    }

    fn objects(&self) -> Vec<ObjectId> {
        self.order.clone()
    }

    fn move_to(&mut self, object: ObjectId, index: usize) {
        if let Some(pos) = self.order.iter().position(|o| *o == object) {
            self.order.remove(pos);
            let index = index.min(self.order.len());
            self.order.insert(index, object);
        }
    }

    fn active(&self) -> Option<ObjectId> {
        self.active
    }

    fn set_active(&mut self, object: Option<ObjectId>) {
        self.active = object.filter(|o| self.order.contains(o));
    }

    fn render_all(&mut self) {
        self.render_count += 1;
    }

    fn props(&self, object: ObjectId) -> Option<ObjectProps> {
        self.objects.get(&object).map(|o| o.props)
    }

    fn props_mut(&mut self, object: ObjectId) -> Option<&mut ObjectProps> {
        self.objects.get_mut(&object).map(|o| &mut o.props)
    }

    fn spec(&self, object: ObjectId) -> Option<&ObjectSpec> {
        self.objects.get(&object).map(|o| &o.spec)
    }

    fn set_spec(&mut self, object: ObjectId, spec: ObjectSpec) -> Result<()> {
        let entry = self
            .objects
            .get_mut(&object)
            .ok_or_else(|| EditorError::ResourceMissing(object.to_string()))?;
        entry.spec = spec;
        Ok(())
    }

    fn clone_object(&mut self, object: ObjectId) -> Result<ObjectId> {
        let source = self
            .objects
            .get(&object)
            .cloned()
            .ok_or_else(|| EditorError::ResourceMissing(object.to_string()))?;
        let mut parts = Vec::with_capacity(source.parts.len());
        for (name, part) in &source.parts {
            let copy = self.clone_object(*part)?;
            parts.push((name.clone(), copy));
        }
        Ok(self.allocate(HeadlessObject { parts, ..source }))
    }

    fn discard(&mut self, object: ObjectId) {
        self.remove(object);
        if let Some(entry) = self.objects.remove(&object) {
            for (_, part) in entry.parts {
                self.discard(part);
            }
        }
    }

    fn set_clip(&mut self, object: ObjectId, clip: Option<Rect>) {
        if let Some(entry) = self.objects.get_mut(&object) {
            entry.clip = clip;
        }
    }

    fn find_part(&self, group: ObjectId, name: &str) -> Option<ObjectId> {
        self.objects
            .get(&group)?
            .parts
            .iter()
            .find(|(part, _)| part == name)
            .map(|(_, id)| *id)
    }

    fn text_layout(&self, object: ObjectId) -> Option<TextLayout> {
        let (text, font_size) = match &self.objects.get(&object)?.spec {
            ObjectSpec::Text {
                text, font_size, ..
            } => (text, *font_size),
            _ => return None,
        };
        let advance = font_size * Self::GLYPH_ADVANCE;
        let line_height = font_size * Self::LINE_HEIGHT;
        let glyphs = text
            .split('\n')
            .enumerate()
            .flat_map(|(line, chars)| {
                chars.chars().enumerate().map(move |(col, ch)| GlyphBox {
                    ch,
                    line,
                    left: col as f64 * advance,
                    top: line as f64 * line_height,
                    width: advance,
                })
            })
            .collect();
        Some(TextLayout {
            line_height,
            glyphs,
        })
    }

    fn set_background(&mut self, color: &str) {
        self.background = color.to_string();
    }

    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}
