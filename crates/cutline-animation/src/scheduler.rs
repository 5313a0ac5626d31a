//! Animation scheduler: rebuilds the tween timeline from animation records.
//!
//! The timeline is never patched. Any change to elements, timeframes or the
//! animation list discards it and builds a new one from scratch, so tween
//! offsets always reflect the current model.

use cutline_core::{CubicBezier, EasingCurve, KeyframeTrack, Placement, Rect};
use cutline_timeline::{
    Animation, AnimationKind, EditorElement, ElementId, ElementModel, ElementProperties,
    ObjectId, ObjectProps, ObjectSpec, ObjectTable, Property, RenderSurface, SlideDirection,
    SlideTextType, TextProperties,
};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::tween::{ClipWindow, TweenSpec, TweenTarget, TweenTimeline};

/// Heart rate the breathe effect is paced to.
pub const HEARTBEAT_BPM: f64 = 72.0;
/// Beats per breathe oscillation.
pub const BREATHE_EASE_FACTOR: f64 = 4.0;
pub const BREATHE_UPSCALE: f64 = 1.05;
/// Padding around the clip rectangle of a clipped slide.
pub const CLIP_MARGIN: f64 = 50.0;
/// Extra distance above the canvas for a slide out through the top edge.
pub const SLIDE_OUT_TOP_MARGIN: f64 = 100.0;
/// Length of the opacity flips that swap a text object for its characters.
const SWAP_MS: f64 = 1.0;
const GLYPH_FILL: &str = "#ffffff";

/// One breathe oscillation (ms).
pub fn breathe_period() -> f64 {
    60_000.0 / HEARTBEAT_BPM * BREATHE_EASE_FACTOR
}

/// Owns the current tween timeline and the character objects it created.
#[derive(Debug, Clone, Default)]
pub struct AnimationScheduler {
    timeline: TweenTimeline,
    glyphs: HashMap<ElementId, Vec<ObjectId>>,
}

impl AnimationScheduler {
    pub fn new(max_time: f64) -> Self {
        Self {
            timeline: TweenTimeline::new(max_time),
            glyphs: HashMap::new(),
        }
    }

    pub fn timeline(&self) -> &TweenTimeline {
        &self.timeline
    }

    /// Character objects split out of a text element.
    pub fn glyphs(&self, element: ElementId) -> &[ObjectId] {
        self.glyphs.get(&element).map_or(&[], Vec::as_slice)
    }

    pub fn resolve(&self, objects: &ObjectTable, target: &TweenTarget) -> Option<ObjectId> {
        match target {
            TweenTarget::Element(id) => objects.get(*id),
            TweenTarget::Glyph { element, index } => {
                self.glyphs.get(element).and_then(|g| g.get(*index)).copied()
            }
        }
    }

    /// Set every tween output for `ms`.
    pub fn seek<S: RenderSurface + ?Sized>(&self, ms: f64, objects: &ObjectTable, surface: &mut S) {
        self.timeline
            .seek(ms, |target| self.resolve(objects, target), surface);
    }

    /// Remove and forget all character objects.
    pub fn clear_glyphs<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        for (_, glyphs) in self.glyphs.drain() {
            for glyph in glyphs {
                surface.discard(glyph);
            }
        }
    }

    /// Discard the current timeline and build a new one.
    ///
    /// Animations whose target element or render object is missing are
    /// skipped.
    pub fn rebuild<S: RenderSurface + ?Sized>(
        &mut self,
        animations: &[Animation],
        model: &ElementModel,
        objects: &ObjectTable,
        surface: &mut S,
        max_time: f64,
    ) {
        self.clear_glyphs(surface);
        let mut timeline = TweenTimeline::new(max_time);

        for animation in animations {
            let Some(element) = model.get(animation.target_id) else {
                debug!(animation = %animation.id, "Animation target gone, skipping");
                continue;
            };
            let Some(object) = objects.get(element.id) else {
                debug!(element = %element.id, "No render object, skipping animation");
                continue;
            };
            surface.set_clip(object, None);
            let target = TweenTarget::Element(element.id);
            let frame = element.time_frame;

            match animation.kind {
                AnimationKind::FadeIn => timeline.add(TweenSpec::new(
                    target,
                    Property::Opacity,
                    frame.start,
                    KeyframeTrack::between(0.0, 1.0, animation.duration, EasingCurve::Linear),
                )),
                AnimationKind::FadeOut => timeline.add(TweenSpec::new(
                    target,
                    Property::Opacity,
                    frame.end - animation.duration,
                    KeyframeTrack::between(1.0, 0.0, animation.duration, EasingCurve::Linear),
                )),
                AnimationKind::SlideIn(props) => {
                    let from = offscreen(props.direction, &element.placement, surface.size(), false);
                    let to = (element.placement.x, element.placement.y);
                    if props.use_clip_path {
                        timeline.add_clip(clip_window(element, frame.start, animation.duration));
                    }
                    if let ElementProperties::Text(text) = &element.properties {
                        if props.text_type == SlideTextType::Character {
                            self.slide_characters(
                                &mut timeline,
                                element,
                                text,
                                object,
                                surface,
                                from,
                                animation.duration,
                            );
                        }
                    }
                    add_slide(
                        &mut timeline,
                        target,
                        from,
                        to,
                        frame.start,
                        animation.duration,
                        EasingCurve::Linear,
                    );
                }
                AnimationKind::SlideOut(props) => {
                    let from = (element.placement.x, element.placement.y);
                    let to = offscreen(props.direction, &element.placement, surface.size(), true);
                    let offset = frame.end - animation.duration;
                    if props.use_clip_path {
                        timeline.add_clip(clip_window(element, offset, animation.duration));
                    }
                    add_slide(
                        &mut timeline,
                        target,
                        from,
                        to,
                        offset,
                        animation.duration,
                        EasingCurve::Linear,
                    );
                }
                AnimationKind::Breathe => {
                    add_breathe(&mut timeline, animations, element);
                }
            }
        }

        debug!(
            tweens = timeline.len(),
            clips = timeline.clips().len(),
            "Animation timeline rebuilt"
        );
        self.timeline = timeline;
    }

    /// Split a text object into per-character objects and stagger them in.
    #[allow(clippy::too_many_arguments)]
    fn slide_characters<S: RenderSurface + ?Sized>(
        &mut self,
        timeline: &mut TweenTimeline,
        element: &EditorElement,
        text: &TextProperties,
        object: ObjectId,
        surface: &mut S,
        from: (f64, f64),
        duration: f64,
    ) {
        let glyphs = match split_characters(element, text, object, surface) {
            Ok(glyphs) if !glyphs.is_empty() => glyphs,
            Ok(_) => return,
            Err(e) => {
                warn!(element = %element.id, error = %e, "Character split failed");
                return;
            }
        };

        let start = element.time_frame.start;
        let char_duration = duration / 2.0;
        let delay = char_duration / glyphs.len() as f64;
        let placement = &element.placement;
        let easing = EasingCurve::Bezier(CubicBezier::EASE_OUT);

        for (index, glyph) in glyphs.iter().enumerate() {
            let Some(props) = surface.props(*glyph) else {
                continue;
            };
            let dx = props.left - placement.x;
            let dy = props.top - placement.y;
            let target = TweenTarget::Glyph {
                element: element.id,
                index,
            };
            add_slide(
                timeline,
                target,
                (from.0 + dx, from.1 + dy),
                (placement.x + dx, placement.y + dy),
                start + index as f64 * delay,
                char_duration,
                easing,
            );
            add_swap(timeline, target, start, start + duration, 0.0);
        }
        add_swap(
            timeline,
            TweenTarget::Element(element.id),
            start,
            start + duration,
            1.0,
        );

        self.glyphs.insert(element.id, glyphs);
    }
}

/// Off-canvas position for a slide through `direction`.
pub fn offscreen(
    direction: SlideDirection,
    placement: &Placement,
    canvas: (f64, f64),
    leaving: bool,
) -> (f64, f64) {
    let left = match direction {
        SlideDirection::Left => -placement.width,
        SlideDirection::Right => canvas.0,
        _ => placement.x,
    };
    let top = match direction {
        SlideDirection::Top if leaving => -SLIDE_OUT_TOP_MARGIN - placement.height,
        SlideDirection::Top => -placement.height,
        SlideDirection::Bottom => canvas.1,
        _ => placement.y,
    };
    (left, top)
}

/// Window `[slide-in end, slide-out start]` a breathe may occupy.
pub fn breathe_window(animations: &[Animation], element: &EditorElement) -> Option<(f64, f64)> {
    let frame = element.time_frame;
    let slide_in = animations
        .iter()
        .find(|a| a.target_id == element.id && a.kind.is_slide_in());
    let slide_out = animations
        .iter()
        .find(|a| a.target_id == element.id && a.kind.is_slide_out());
    let start = slide_in.map_or(frame.start, |a| frame.start + a.duration);
    let end = slide_out.map_or(frame.end, |a| frame.end - a.duration);
    (start <= end).then_some((start, end))
}

fn add_breathe(timeline: &mut TweenTimeline, animations: &[Animation], element: &EditorElement) {
    let Some((start, end)) = breathe_window(animations, element) else {
        debug!(element = %element.id, "Breathe window empty, skipping");
        return;
    };
    let window = end - start;
    let beats = (window / breathe_period()).floor() as usize;
    if beats < 1 {
        debug!(element = %element.id, window, "Breathe window shorter than one beat");
        return;
    }

    let target = TweenTarget::Element(element.id);
    let (scale_x, scale_y) = element.object_scale();
    for (property, base) in [(Property::ScaleX, scale_x), (Property::ScaleY, scale_y)] {
        let mut values = Vec::with_capacity(beats * 2 + 1);
        values.push(base);
        for _ in 0..beats {
            values.push(base * BREATHE_UPSCALE);
            values.push(base);
        }
        timeline.add(TweenSpec::new(
            target,
            property,
            start,
            KeyframeTrack::evenly_spaced(&values, window),
        ));
    }
}

fn add_slide(
    timeline: &mut TweenTimeline,
    target: TweenTarget,
    from: (f64, f64),
    to: (f64, f64),
    offset: f64,
    duration: f64,
    easing: EasingCurve,
) {
    timeline.add(TweenSpec::new(
        target,
        Property::Left,
        offset,
        KeyframeTrack::between(from.0, to.0, duration, easing),
    ));
    timeline.add(TweenSpec::new(
        target,
        Property::Top,
        offset,
        KeyframeTrack::between(from.1, to.1, duration, easing),
    ));
}

/// Opacity flips at the edges of `[start, end]`: `outside` before and
/// after, the opposite inside.
fn add_swap(timeline: &mut TweenTimeline, target: TweenTarget, start: f64, end: f64, outside: f64) {
    let inside = 1.0 - outside;
    timeline.add(TweenSpec::new(
        target,
        Property::Opacity,
        start,
        KeyframeTrack::between(outside, inside, SWAP_MS, EasingCurve::Linear),
    ));
    timeline.add(TweenSpec::new(
        target,
        Property::Opacity,
        end,
        KeyframeTrack::between(inside, outside, SWAP_MS, EasingCurve::Linear),
    ));
}

fn clip_window(element: &EditorElement, start: f64, duration: f64) -> ClipWindow {
    let rect: Rect = element.placement.clip_mask(CLIP_MARGIN);
    ClipWindow {
        target: element.id,
        rect,
        start,
        end: start + duration,
    }
}

/// Create one detached-then-added object per laid-out character.
fn split_characters<S: RenderSurface + ?Sized>(
    element: &EditorElement,
    text: &TextProperties,
    object: ObjectId,
    surface: &mut S,
) -> cutline_core::Result<Vec<ObjectId>> {
    let Some(layout) = surface.text_layout(object) else {
        return Ok(Vec::new());
    };
    let placement = &element.placement;
    let mut glyphs = Vec::with_capacity(layout.char_count());
    for glyph in &layout.glyphs {
        let props = ObjectProps {
            left: glyph.left * placement.scale_x + placement.x,
            top: glyph.line as f64 * layout.line_height * placement.scale_y + placement.y,
            angle: 0.0,
            scale_x: placement.scale_x,
            scale_y: placement.scale_y,
            width: glyph.width,
            height: layout.line_height,
            visible: true,
            opacity: 0.0,
        };
        let spec = ObjectSpec::Glyph {
            ch: glyph.ch,
            font_size: text.font_size,
            font_weight: text.font_weight,
            font_family: text.font_family.clone(),
            fill: GLYPH_FILL.to_string(),
        };
        match surface.create(spec, props) {
            Ok(id) => {
                surface.add(id);
                glyphs.push(id);
            }
            Err(e) => {
                for id in glyphs {
                    surface.discard(id);
                }
                return Err(e);
            }
        }
    }
    Ok(glyphs)
}
