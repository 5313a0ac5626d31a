//! Seekable tween timeline.
//!
//! A [`TweenTimeline`] is a flat list of property tweens, each anchored at an
//! absolute offset on the editor timeline, plus clip windows. Seeking is a
//! pure function of the requested time: for every `(target, property)` pair
//! the latest tween that has started decides the value, and pairs with no
//! started tween hold the first tween's initial value.

use cutline_core::{KeyframeTrack, Rect};
use cutline_timeline::{ElementId, ObjectId, Property, RenderSurface};
use std::collections::BTreeMap;

/// What a tween drives, resolved to a render object at seek time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TweenTarget {
    /// The element's own render object.
    Element(ElementId),
    /// One character object split out of a text element.
    Glyph { element: ElementId, index: usize },
}

impl TweenTarget {
    pub fn element(&self) -> ElementId {
        match self {
            Self::Element(id) => *id,
            Self::Glyph { element, .. } => *element,
        }
    }
}

/// One property tween.
#[derive(Debug, Clone, PartialEq)]
pub struct TweenSpec {
    pub target: TweenTarget,
    pub property: Property,
    /// Absolute start on the editor timeline (ms).
    pub offset: f64,
    /// Keyframes relative to `offset`.
    pub track: KeyframeTrack,
}

impl TweenSpec {
    pub fn new(target: TweenTarget, property: Property, offset: f64, track: KeyframeTrack) -> Self {
        Self {
            target,
            property,
            offset,
            track,
        }
    }

    pub fn duration(&self) -> f64 {
        self.track.duration()
    }

    pub fn end(&self) -> f64 {
        self.offset + self.duration()
    }
}

/// A clip rectangle attached to an element for `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipWindow {
    pub target: ElementId,
    pub rect: Rect,
    pub start: f64,
    pub end: f64,
}

impl ClipWindow {
    pub fn is_active(&self, ms: f64) -> bool {
        self.start <= ms && ms < self.end
    }
}

/// Seekable collection of tweens bounded by the timeline length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TweenTimeline {
    duration: f64,
    tweens: Vec<TweenSpec>,
    clips: Vec<ClipWindow>,
}

impl TweenTimeline {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            tweens: Vec::new(),
            clips: Vec::new(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn tweens(&self) -> &[TweenSpec] {
        &self.tweens
    }

    pub fn clips(&self) -> &[ClipWindow] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty() && self.clips.is_empty()
    }

    /// Schedule a tween. Later insertions win ties on equal offsets.
    pub fn add(&mut self, spec: TweenSpec) {
        self.tweens.push(spec);
    }

    pub fn add_clip(&mut self, clip: ClipWindow) {
        self.clips.push(clip);
    }

    /// Value every tweened `(target, property)` pair takes at `ms`.
    pub fn values_at(&self, ms: f64) -> BTreeMap<(TweenTarget, Property), f64> {
        let ms = ms.clamp(0.0, self.duration.max(0.0));
        let mut chosen: BTreeMap<(TweenTarget, Property), &TweenSpec> = BTreeMap::new();
        for spec in &self.tweens {
            let key = (spec.target, spec.property);
            match chosen.get(&key) {
                None => {
                    chosen.insert(key, spec);
                }
                Some(current) => {
                    let started = spec.offset <= ms;
                    let current_started = current.offset <= ms;
                    let replace = match (current_started, started) {
                        (false, false) => spec.offset < current.offset,
                        (false, true) => true,
                        (true, false) => false,
                        (true, true) => spec.offset >= current.offset,
                    };
                    if replace {
                        chosen.insert(key, spec);
                    }
                }
            }
        }
        chosen
            .into_iter()
            .map(|(key, spec)| {
                let value = if spec.offset <= ms {
                    spec.track.evaluate(ms - spec.offset)
                } else {
                    spec.track.initial_value()
                };
                (key, value)
            })
            .collect()
    }

    /// Write every tween output for time `ms` onto the surface.
    ///
    /// Targets that `resolve` cannot map to an object are skipped.
    pub fn seek<S, F>(&self, ms: f64, resolve: F, surface: &mut S)
    where
        S: RenderSurface + ?Sized,
        F: Fn(&TweenTarget) -> Option<ObjectId>,
    {
        for ((target, property), value) in self.values_at(ms) {
            let Some(object) = resolve(&target) else {
                continue;
            };
            if let Some(props) = surface.props_mut(object) {
                props.set(property, value);
            }
        }

        let mut clipped: BTreeMap<ElementId, Option<Rect>> = BTreeMap::new();
        for clip in &self.clips {
            let entry = clipped.entry(clip.target).or_insert(None);
            if clip.is_active(ms) {
                *entry = Some(clip.rect);
            }
        }
        for (element, rect) in clipped {
            if let Some(object) = resolve(&TweenTarget::Element(element)) {
                surface.set_clip(object, rect);
            }
        }
    }
}
