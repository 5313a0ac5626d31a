//! Real-time playback driven by the manual frame host.

use cutline_core::TimeFramePatch;
use cutline_playback::{FrameOutcome, ManualFrameHost, MediaElement, PlaybackState};
use cutline_timeline::{
    Animation, AnimationKind, RenderSurface, SlideDirection, SlideProperties, SlideTextType,
};

use crate::support::{session, Session};

/// Advance the host clock and deliver the pending frame.
fn step(session: &mut Session, frames: &ManualFrameHost, ms: f64) -> Option<FrameOutcome> {
    frames.advance(ms);
    let request = frames.fire()?;
    session.tick(request)
}

// ── End of timeline ────────────────────────────────────────────

#[test]
fn playback_past_the_end_stops_at_frame_zero() {
    let (mut session, frames) = session(3000.0);
    let id = session.add_text("credits", 32.0, 400).unwrap();
    session.add_animation(Animation::new(id, AnimationKind::FadeIn, 1000.0));
    session.seek(2000.0);
    session.play();

    let mut ticks = 0;
    loop {
        ticks += 1;
        match step(&mut session, &frames, 200.0) {
            Some(FrameOutcome::Continue) => assert!(session.current_time_ms() <= 3000.0),
            Some(FrameOutcome::ReachedEnd) => break,
            None => panic!("frame loop stalled"),
        }
    }

    assert_eq!(ticks, 6);
    assert_eq!(session.playback_state(), PlaybackState::Stopped);
    assert_eq!(session.clock().current_key_frame(), 0);
    assert_eq!(session.current_time_ms(), 0.0);
    assert!(frames.pending().is_none());

    let props = session.surface().props(session.object_for(id).unwrap()).unwrap();
    assert!(props.visible);
    assert_eq!(props.opacity, 0.0);
}

#[test]
fn replay_after_end_starts_from_zero() {
    let (mut session, frames) = session(1000.0);
    session.add_text("loop", 32.0, 400).unwrap();
    session.seek(900.0);
    session.play();
    assert_eq!(
        step(&mut session, &frames, 200.0),
        Some(FrameOutcome::ReachedEnd)
    );

    session.play();
    assert_eq!(
        step(&mut session, &frames, 250.0),
        Some(FrameOutcome::Continue)
    );
    assert_eq!(session.current_time_ms(), 250.0);
}

#[test]
fn end_of_playback_parks_media_at_zero() {
    let (mut session, frames) = session(1000.0);
    session
        .add_video("video-1", "clip.mp4", 10_000.0, 1.0)
        .unwrap();
    session.seek(900.0);
    session.play();
    assert_eq!(
        step(&mut session, &frames, 200.0),
        Some(FrameOutcome::ReachedEnd)
    );

    let video = session.media().media("video-1").unwrap();
    assert!(video.is_paused());
    assert_eq!(video.current_time(), 0.0);
}

#[test]
fn breathing_image_stays_within_its_fitted_scale() {
    let (mut session, frames) = session(30_000.0);
    let id = session.add_image("photo.png", 400.0, 200.0).unwrap();
    session.add_animation(Animation::new(id, AnimationKind::Breathe, 1000.0));
    let scale = |s: &Session| {
        let object = s.object_for(id).unwrap();
        s.surface().props(object).unwrap().scale_x
    };

    session.seek(0.0);
    assert!((scale(&session) - 0.5).abs() < 1e-9);
    session.play();
    for _ in 0..20 {
        step(&mut session, &frames, 333.0);
        assert!(scale(&session) >= 0.5 - 1e-9);
        assert!(scale(&session) <= 0.525 + 1e-9);
    }
}

// ── Media during playback ──────────────────────────────────────

#[test]
fn media_starts_and_stops_with_its_time_frame() {
    let (mut session, frames) = session(30_000.0);
    session
        .add_video("video-1", "clip.mp4", 1000.0, 1.0)
        .unwrap();
    let audio = session
        .add_audio("audio-1", "music.mp3", 20_000.0)
        .unwrap();
    session
        .set_time_frame(audio, TimeFramePatch::start(1000.0))
        .unwrap();

    session.play();
    step(&mut session, &frames, 500.0);
    assert!(!session.media().media("video-1").unwrap().is_paused());
    assert!(session.media().media("audio-1").unwrap().is_paused());

    step(&mut session, &frames, 700.0);
    assert_eq!(session.current_time_ms(), 1200.0);
    assert!(session.media().media("video-1").unwrap().is_paused());
    let music = session.media().media("audio-1").unwrap();
    assert!(!music.is_paused());
    assert!((music.current_time() - 0.2).abs() < 1e-9);

    session.stop();
    assert!(session.media().media("audio-1").unwrap().is_paused());
}

// ── Animation timeline ─────────────────────────────────────────

#[test]
fn rebuild_twice_yields_identical_timeline() {
    let (mut session, _frames) = session(30_000.0);
    let title = session.add_text("Title", 48.0, 700).unwrap();
    let logo = session.add_image("logo.png", 400.0, 200.0).unwrap();
    session
        .set_time_frame(title, TimeFramePatch::both(2000.0, 8000.0))
        .unwrap();

    let slide = SlideProperties {
        use_clip_path: true,
        text_type: SlideTextType::Character,
        ..SlideProperties::new(SlideDirection::Left)
    };
    session.add_animation(Animation::new(title, AnimationKind::SlideIn(slide), 1000.0));
    session.add_animation(Animation::new(title, AnimationKind::FadeOut, 500.0));
    session.add_animation(Animation::new(logo, AnimationKind::Breathe, 1000.0));

    session.rebuild_animations();
    let first = session.scheduler().timeline().clone();
    session.rebuild_animations();
    let second = session.scheduler().timeline();

    assert!(!first.is_empty());
    assert_eq!(first.tweens(), second.tweens());
    assert_eq!(first.clips(), second.clips());
}

#[test]
fn fade_follows_the_playhead() {
    let (mut session, frames) = session(30_000.0);
    let id = session.add_text("fade", 32.0, 400).unwrap();
    session.add_animation(Animation::new(id, AnimationKind::FadeIn, 1000.0));
    let opacity = |s: &Session| {
        let object = s.object_for(id).unwrap();
        s.surface().props(object).unwrap().opacity
    };

    session.seek(0.0);
    assert_eq!(opacity(&session), 0.0);

    session.play();
    step(&mut session, &frames, 250.0);
    assert!((opacity(&session) - 0.25).abs() < 1e-9);
    step(&mut session, &frames, 1000.0);
    assert_eq!(opacity(&session), 1.0);
}

#[test]
fn elements_hide_outside_their_time_frame() {
    let (mut session, frames) = session(30_000.0);
    let id = session.add_text("blink", 32.0, 400).unwrap();
    session
        .set_time_frame(id, TimeFramePatch::both(0.0, 500.0))
        .unwrap();
    let visible = |s: &Session| {
        let object = s.object_for(id).unwrap();
        s.surface().props(object).unwrap().visible
    };

    session.play();
    step(&mut session, &frames, 500.0);
    assert!(visible(&session));
    step(&mut session, &frames, 100.0);
    assert!(!visible(&session));
}
