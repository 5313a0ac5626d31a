//! The editing session: one context object per open editor.
//!
//! Every mutation funnels into [`EditorSession::refresh`], which rebuilds the
//! render surface from the element model, rebuilds the animation timeline
//! and re-applies the current playhead. Playback is driven by the host
//! calling [`EditorSession::tick`] with each fired frame request.

use cutline_animation::{sync_skeleton, AnimationScheduler, SkeletalBatch};
use cutline_core::{Clock, EditorConfig, EditorError, Result, MAX_EXPORT_LENGTH_MS};
use cutline_playback::{
    FrameHost, FrameOutcome, FrameRequest, MediaHost, PlaybackDriver, PlaybackState,
};
use cutline_timeline::{
    Animation, EditorElement, ElementId, ElementModel, ElementProperties, ObjectId, ObjectProps,
    ObjectSpec, ObjectTable, RenderSurface, TextProperties,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::editing::ClipboardEntry;

/// Editor state plus the host surfaces it drives.
///
/// `S` is the render surface, `M` the host of backing media elements and
/// `F` the frame scheduler of the display.
pub struct EditorSession<S, M, F> {
    pub(crate) config: EditorConfig,
    pub(crate) clock: Clock,
    pub(crate) model: ElementModel,
    pub(crate) animations: Vec<Animation>,
    pub(crate) objects: ObjectTable,
    pub(crate) scheduler: AnimationScheduler,
    pub(crate) driver: PlaybackDriver,
    pub(crate) clipboard: Option<ClipboardEntry>,
    pub(crate) background_color: String,
    pub(crate) surface: S,
    pub(crate) media: M,
    pub(crate) frames: F,
}

impl<S, M, F> EditorSession<S, M, F>
where
    S: RenderSurface,
    M: MediaHost,
    F: FrameHost,
{
    /// Open a session on an empty model with the playhead at frame 0.
    pub fn new(config: EditorConfig, surface: S, media: M, frames: F) -> Result<Self> {
        config.validate()?;
        let clock = Clock::new(config.max_time_ms, config.frame_rate());
        let mut session = Self {
            clock,
            model: ElementModel::new(),
            animations: Vec::new(),
            objects: ObjectTable::new(),
            scheduler: AnimationScheduler::new(config.max_time_ms),
            driver: PlaybackDriver::new(),
            clipboard: None,
            background_color: config.background_color.clone(),
            surface,
            media,
            frames,
            config,
        };
        session.surface.set_background(&session.background_color);
        info!(
            max_time_ms = session.config.max_time_ms,
            fps = session.config.fps,
            "Editor session opened"
        );
        Ok(session)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn model(&self) -> &ElementModel {
        &self.model
    }

    pub fn elements(&self) -> &[EditorElement] {
        self.model.elements()
    }

    pub fn selected(&self) -> Option<&EditorElement> {
        self.model.selected()
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    /// Render object currently projected for `element`.
    pub fn object_for(&self, element: ElementId) -> Option<ObjectId> {
        self.objects.get(element)
    }

    pub fn clipboard(&self) -> Option<&ClipboardEntry> {
        self.clipboard.as_ref()
    }

    pub fn background_color(&self) -> &str {
        &self.background_color
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable surface access, for hosts applying interactive transforms
    /// before reporting them through `on_object_modified`.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn driver(&self) -> &PlaybackDriver {
        &self.driver
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.driver.state()
    }

    pub fn is_playing(&self) -> bool {
        self.driver.is_playing()
    }

    pub fn current_time_ms(&self) -> f64 {
        self.clock.current_time_ms()
    }

    pub fn max_time_ms(&self) -> f64 {
        self.clock.max_time_ms()
    }

    /// Rebuild the render surface from the model.
    ///
    /// Objects are recreated in model order, except SVG groups which are
    /// loaded once and reused. Elements whose object cannot be built are
    /// skipped with a warning.
    pub fn refresh(&mut self) {
        self.surface.clear();
        let previous: HashMap<ElementId, ObjectId> = self.objects.drain().into_iter().collect();

        for element in self.model.elements() {
            let reused = match element.properties {
                ElementProperties::Svg(_) => previous
                    .get(&element.id)
                    .copied()
                    .filter(|object| self.surface.props(*object).is_some()),
                _ => None,
            };
            let object = match reused {
                Some(object) => {
                    if let Some(props) = self.surface.props_mut(object) {
                        apply_transform(props, element);
                    }
                    object
                }
                None => match create_object(&mut self.surface, &self.media, element) {
                    Ok(object) => object,
                    Err(err) => {
                        warn!(element = %element.id, error = %err, "No render object for element, skipping");
                        continue;
                    }
                },
            };
            self.surface.add(object);
            self.objects.insert(element.id, object);
        }

        for (element, object) in previous {
            if self.objects.get(element) != Some(object) {
                self.surface.discard(object);
            }
        }

        let orphaned = self
            .driver
            .skeletal()
            .is_some_and(|batch| self.objects.element_for(batch.group()).is_none());
        if orphaned {
            self.driver.clear_skeletal(&mut self.surface);
        }

        let active = self.model.selected_id().and_then(|id| self.objects.get(id));
        self.surface.set_active(active);
        self.rebuild_animations();
        self.update_time_to(self.clock.current_time_ms());
        self.surface.render_all();
        debug!(
            elements = self.model.len(),
            objects = self.objects.len(),
            "Surface refreshed"
        );
    }

    /// Rebuild the tween timeline from the animation list.
    pub fn rebuild_animations(&mut self) {
        self.scheduler.rebuild(
            &self.animations,
            &self.model,
            &self.objects,
            &mut self.surface,
            self.clock.max_time_ms(),
        );
    }

    /// Move the playhead to `ms` and bring every dependent clock along.
    ///
    /// Sets the frame, seeks the tween timeline, re-applies the background,
    /// recomputes visibility on the closed `[start, end]` range, then
    /// resyncs media and poses skeletal SVGs.
    pub fn update_time_to(&mut self, ms: f64) {
        self.clock.set_current_time_ms(ms);
        self.scheduler.seek(ms, &self.objects, &mut self.surface);
        self.surface.set_background(&self.background_color);
        for element in self.model.iter() {
            let Some(object) = self.objects.get(element.id) else {
                continue;
            };
            if let Some(props) = self.surface.props_mut(object) {
                props.visible = element.time_frame.contains(ms);
            }
        }
        self.driver.resync_media(&self.model, &mut self.media, ms);
        self.sync_svg_elements(ms);
    }

    fn sync_svg_elements(&mut self, ms: f64) {
        let driven = self
            .driver
            .skeletal()
            .filter(|batch| batch.is_running())
            .map(|batch| batch.group());
        for element in self.model.iter() {
            let ElementProperties::Svg(svg) = &element.properties else {
                continue;
            };
            let Some(kind) = svg.animation_type else {
                continue;
            };
            if !element.time_frame.contains(ms) {
                continue;
            }
            let Some(object) = self.objects.get(element.id) else {
                continue;
            };
            if driven == Some(object) {
                continue;
            }
            sync_skeleton(
                &mut self.surface,
                object,
                kind,
                element.placement.x,
                ms - element.time_frame.start,
            );
        }
    }

    /// Jump the playhead. Playback is stopped first.
    pub fn seek(&mut self, ms: f64) {
        if self.driver.is_playing() {
            self.stop();
        }
        let ms = ms.clamp(0.0, self.clock.max_time_ms());
        debug!(ms, "Seek");
        self.update_time_to(ms);
        self.surface.render_all();
    }

    /// Start real-time playback from the current playhead.
    pub fn play(&mut self) {
        if self.driver.is_playing() {
            return;
        }
        self.start_selected_skeleton();
        let from = self.clock.current_time_ms();
        self.driver.start(&mut self.frames, from);
        self.driver.resync_media(&self.model, &mut self.media, from);
    }

    /// Stop at the current frame.
    pub fn stop(&mut self) {
        self.driver.stop(&mut self.frames);
        let at = self.clock.current_time_ms();
        self.driver.resync_media(&self.model, &mut self.media, at);
    }

    /// Handle a fired frame callback.
    ///
    /// Returns `None` for stale or unexpected requests.
    pub fn tick(&mut self, request: FrameRequest) -> Option<FrameOutcome> {
        let new_time = self.driver.begin_frame(&self.frames, request)?;
        self.update_time_to(new_time);
        self.driver.update_skeletal(&mut self.surface, &self.frames);

        let max_time = self.clock.max_time_ms();
        let outcome = self.driver.end_frame(&mut self.frames, new_time, max_time);
        if outcome == FrameOutcome::ReachedEnd {
            self.clock.rewind();
            self.update_time_to(self.clock.current_time_ms());
            info!(max_time_ms = max_time, "Playback reached the end, rewound");
        }
        self.surface.render_all();
        Some(outcome)
    }

    fn start_selected_skeleton(&mut self) {
        let Some(element) = self.model.selected() else {
            return;
        };
        let ElementProperties::Svg(svg) = &element.properties else {
            return;
        };
        let Some(kind) = svg.animation_type else {
            return;
        };
        let Some(object) = self.objects.get(element.id) else {
            warn!(element = %element.id, "Selected SVG has no render object");
            return;
        };

        self.driver.clear_skeletal(&mut self.surface);
        if let Some(props) = self.surface.props_mut(object) {
            props.left = element.placement.x;
        }
        match SkeletalBatch::start(&self.surface, object, kind, self.frames.now_ms()) {
            Ok(batch) => self.driver.replace_skeletal(batch, &mut self.surface),
            Err(err) => warn!(element = %element.id, error = %err, "Cannot start skeletal animation"),
        }
    }

    pub fn set_background_color(&mut self, color: impl Into<String>) {
        self.background_color = color.into();
        self.surface.set_background(&self.background_color);
        self.surface.render_all();
    }

    /// Change the timeline length, clamping every element into it.
    pub fn set_max_time(&mut self, max_time_ms: f64) -> Result<()> {
        if !(max_time_ms > 0.0 && max_time_ms <= MAX_EXPORT_LENGTH_MS) {
            return Err(EditorError::Config(format!(
                "max time must be in (0, {MAX_EXPORT_LENGTH_MS}], got {max_time_ms}"
            )));
        }
        self.config.max_time_ms = max_time_ms;
        self.clock.set_max_time_ms(max_time_ms);
        self.model.clamp_to(max_time_ms);
        if self.clock.current_time_ms() > max_time_ms {
            self.clock.set_current_time_ms(max_time_ms);
        }
        self.refresh();
        Ok(())
    }
}

pub(crate) fn text_spec(text: &TextProperties) -> ObjectSpec {
    ObjectSpec::Text {
        text: text.text.clone(),
        font_size: text.font_size,
        font_weight: text.font_weight,
        font_family: text.font_family.clone(),
        fill: text.text_color.clone(),
        font_style: text.font_style,
    }
}

fn apply_transform(props: &mut ObjectProps, element: &EditorElement) {
    let placement = &element.placement;
    props.left = placement.x;
    props.top = placement.y;
    props.angle = placement.rotation;
    props.scale_x = placement.scale_x;
    props.scale_y = placement.scale_y;
}

/// Build the render object for one element, detached.
pub(crate) fn create_object<S, M>(
    surface: &mut S,
    media: &M,
    element: &EditorElement,
) -> Result<ObjectId>
where
    S: RenderSurface + ?Sized,
    M: MediaHost + ?Sized,
{
    let placement = &element.placement;
    let mut props = ObjectProps::from_placement(placement);
    let spec = match &element.properties {
        ElementProperties::Video(video) => {
            if media.get(&video.element_id).is_none() {
                return Err(EditorError::ResourceMissing(format!(
                    "media element {}",
                    video.element_id
                )));
            }
            ObjectSpec::Video {
                media_id: video.element_id.clone(),
                effect: video.effect,
            }
        }
        ElementProperties::Image(image) => {
            props.width = image.natural_width;
            props.height = image.natural_height;
            (props.scale_x, props.scale_y) = element.object_scale();
            ObjectSpec::Image {
                src: image.src.clone(),
                effect: image.effect,
            }
        }
        ElementProperties::Audio(_) => ObjectSpec::Rect {
            fill: "transparent".into(),
        },
        ElementProperties::Text(text) => text_spec(text),
        ElementProperties::Svg(svg) => ObjectSpec::Svg {
            src: svg.src.clone(),
        },
    };
    surface.create(spec, props)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use cutline_animation::angle_at;
    use cutline_animation::skeletal::{table, WALKING};
    use cutline_core::{TimeFrame, TimeFramePatch};
    use cutline_playback::{HeadlessMedia, HeadlessMediaHost, ManualFrameHost, MediaElement};
    use cutline_timeline::{AnimationKind, HeadlessSurface, SkeletalKind};

    pub(crate) type TestSession = EditorSession<HeadlessSurface, HeadlessMediaHost, ManualFrameHost>;

    pub(crate) fn session_with(max_time_ms: f64) -> (TestSession, ManualFrameHost) {
        let config = EditorConfig {
            max_time_ms,
            ..EditorConfig::default()
        };
        let frames = ManualFrameHost::new(0.0);
        let mut surface = HeadlessSurface::default();
        let names: Vec<&str> = WALKING.parts.iter().map(|p| p.name).collect();
        surface.register_svg("walker.svg", &names);
        let session =
            EditorSession::new(config, surface, HeadlessMediaHost::new(), frames.clone()).unwrap();
        (session, frames)
    }

    pub(crate) fn session() -> (TestSession, ManualFrameHost) {
        session_with(30_000.0)
    }

    #[test]
    fn test_end_of_playback_rewinds_to_frame_zero() {
        let (mut session, frames) = session_with(3000.0);
        let id = session.add_text("hello", 32.0, 400).unwrap();
        session.add_animation(Animation::new(id, AnimationKind::FadeIn, 1000.0));
        session.seek(2900.0);
        assert_eq!(session.current_time_ms(), 2900.0);
        let object = session.object_for(id).unwrap();

        session.play();
        assert!(session.is_playing());
        frames.advance(200.0);
        let request = frames.fire().unwrap();
        assert_eq!(session.tick(request), Some(FrameOutcome::ReachedEnd));
        assert_eq!(session.playback_state(), PlaybackState::Stopped);
        assert_eq!(session.clock().current_key_frame(), 0);
        assert_eq!(frames.pending(), None);

        // The surface shows frame zero, not the overshoot past the end.
        let props = session.surface().props(object).unwrap();
        assert!(props.visible);
        assert_eq!(props.opacity, 0.0);
    }

    #[test]
    fn test_tick_advances_playhead_and_schedules_next() {
        let (mut session, frames) = session();
        session.play();
        frames.advance(500.0);
        let request = frames.fire().unwrap();
        assert_eq!(session.tick(request), Some(FrameOutcome::Continue));
        assert_eq!(session.current_time_ms(), 500.0);
        assert!(frames.pending().is_some());
        assert_eq!(session.tick(request), None, "stale request");
    }

    #[test]
    fn test_seek_while_playing_stops_first() {
        let (mut session, frames) = session();
        session.play();
        session.seek(1000.0);
        assert!(!session.is_playing());
        assert_eq!(frames.pending(), None);
        assert_eq!(session.current_time_ms(), 1000.0);
    }

    #[test]
    fn test_visibility_uses_closed_range() {
        let (mut session, _) = session();
        let id = session.add_text("hello", 32.0, 400).unwrap();
        session
            .set_time_frame(id, TimeFramePatch::both(1000.0, 2000.0))
            .unwrap();
        let object = session.object_for(id).unwrap();

        session.seek(500.0);
        assert!(!session.surface().props(object).unwrap().visible);
        session.seek(1500.0);
        assert!(session.surface().props(object).unwrap().visible);
        session.seek(2000.0);
        assert!(session.surface().props(object).unwrap().visible);
        session.seek(2001.0);
        assert!(!session.surface().props(object).unwrap().visible);
    }

    #[test]
    fn test_refresh_projects_in_model_order_and_skips_missing_media() {
        let (mut session, _) = session();
        session
            .media_mut()
            .insert(HeadlessMedia::new("video-1", "clip.mp4", 4.0));
        let video = session
            .add_video("video-1", "clip.mp4", 4000.0, 16.0 / 9.0)
            .unwrap();
        let text = session.add_text("caption", 24.0, 400).unwrap();
        let orphan = session
            .add_video("video-missing", "gone.mp4", 4000.0, 1.0)
            .unwrap();

        assert_eq!(session.elements().len(), 3);
        let order = session.surface().objects();
        assert_eq!(
            order,
            vec![
                session.object_for(video).unwrap(),
                session.object_for(text).unwrap()
            ]
        );
        assert!(session.object_for(orphan).is_none());
    }

    #[test]
    fn test_media_follows_play_and_stop() {
        let (mut session, frames) = session();
        session
            .media_mut()
            .insert(HeadlessMedia::new("video-1", "clip.mp4", 4.0));
        session
            .add_video("video-1", "clip.mp4", 4000.0, 1.0)
            .unwrap();

        session.play();
        assert!(!session.media().media("video-1").unwrap().is_paused());

        frames.advance(100.0);
        let request = frames.fire().unwrap();
        session.tick(request);
        session.stop();
        assert!(session.media().media("video-1").unwrap().is_paused());
    }

    #[test]
    fn test_background_reapplied_on_time_update() {
        let (mut session, _) = session();
        session.set_background_color("#112233");
        session.surface_mut().set_background("#000000");
        session.seek(100.0);
        assert_eq!(session.surface().background(), "#112233");
    }

    #[test]
    fn test_set_max_time_clamps_elements() {
        let (mut session, _) = session();
        let id = session.add_text("long", 24.0, 400).unwrap();
        session.set_max_time(5000.0).unwrap();
        assert_eq!(session.model().get(id).unwrap().time_frame.end, 5000.0);
        assert!(session.set_max_time(0.0).is_err());
        assert!(session.set_max_time(700_000.0).is_err());
    }

    #[test]
    fn test_shrinking_below_element_start_keeps_valid_frame() {
        let (mut session, _) = session();
        let id = session.add_text("late", 24.0, 400).unwrap();
        session
            .set_time_frame(id, TimeFramePatch::both(20_000.0, 25_000.0))
            .unwrap();

        session.set_max_time(10_000.0).unwrap();
        let frame = session.model().get(id).unwrap().time_frame;
        assert_eq!(frame, TimeFrame::new(5000.0, 10_000.0));
        assert!(0.0 <= frame.start && frame.start < frame.end);
    }

    #[test]
    fn test_play_starts_selected_skeleton_and_stop_pauses_it() {
        let (mut session, frames) = session();
        let id = session.add_svg("walker.svg").unwrap();
        session
            .assign_skeletal_to_selected_svg(SkeletalKind::Walking)
            .unwrap();
        assert_eq!(session.selected().map(|e| e.id), Some(id));

        session.play();
        let batch = session.driver().skeletal().unwrap();
        assert!(batch.is_running());
        assert_eq!(batch.part_count(), table(SkeletalKind::Walking).parts.len());

        frames.advance(400.0);
        let request = frames.fire().unwrap();
        session.tick(request);
        let group = session.object_for(id).unwrap();
        let part = session
            .surface()
            .find_part(group, WALKING.parts[0].name)
            .unwrap();
        let angle = session.surface().props(part).unwrap().angle;
        let expected = angle_at(WALKING.parts[0].keys, WALKING.cycle_ms, 400.0);
        assert!((angle - expected).abs() < 1e-9);

        session.stop();
        assert!(!session.driver().skeletal().unwrap().is_running());
    }

    #[test]
    fn test_seek_poses_skeleton_without_playback() {
        let (mut session, _) = session();
        let id = session.add_svg("walker.svg").unwrap();
        session
            .assign_skeletal_to_selected_svg(SkeletalKind::Walking)
            .unwrap();
        session.seek(5000.0);
        let group = session.object_for(id).unwrap();
        let left = session.surface().props(group).unwrap().left;
        assert!((left - 150.0).abs() < 1e-9);
    }
}
