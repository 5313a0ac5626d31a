//! Frame math and timeframe clamping through a live session.

use cutline_core::{Clock, FrameRate, TimeFrame, TimeFramePatch, MAX_EXPORT_LENGTH_MS};
use cutline_timeline::RenderSurface;
use proptest::prelude::*;

use crate::support::session;

// ── Frame / time inverse ───────────────────────────────────────

proptest! {
    #[test]
    fn frame_survives_round_trip_through_ms(fps in 1u32..=240, frame in 0i64..2_000_000) {
        let rate = FrameRate::from_fps(fps);
        prop_assert_eq!(rate.frame_from_ms(rate.ms_from_frame(frame)), frame);
    }

    #[test]
    fn ntsc_frame_survives_round_trip(frame in 0i64..2_000_000) {
        let rate = FrameRate::new(30_000, 1001);
        prop_assert_eq!(rate.frame_from_ms(rate.ms_from_frame(frame)), frame);
    }

    #[test]
    fn clock_reports_the_frame_it_was_seeked_to(fps in 1u32..=120, frame in 0i64..36_000) {
        let mut clock = Clock::new(MAX_EXPORT_LENGTH_MS, FrameRate::from_fps(fps));
        let ms = clock.rate().ms_from_frame(frame);
        clock.set_current_time_ms(ms);
        prop_assert_eq!(clock.current_key_frame(), frame);
        prop_assert_eq!(clock.current_time_ms(), ms);
    }
}

// ── Timeframe clamp ────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn session_clamps_time_frames(start in -50_000.0f64..-0.001, overshoot in 0.001f64..50_000.0) {
        let (mut session, _frames) = session(30_000.0);
        let id = session.add_text("clamped", 32.0, 400).unwrap();

        let stored = session
            .set_time_frame(id, TimeFramePatch::both(start, 30_000.0 + overshoot))
            .unwrap();
        prop_assert_eq!(stored, TimeFrame::new(0.0, 30_000.0));
        prop_assert_eq!(session.model().get(id).unwrap().time_frame, stored);
    }
}

#[test]
fn one_sided_patch_keeps_other_edge() {
    let (mut session, _frames) = session(10_000.0);
    let id = session.add_text("edge", 32.0, 400).unwrap();
    session
        .set_time_frame(id, TimeFramePatch::both(2000.0, 6000.0))
        .unwrap();

    let stored = session
        .set_time_frame(id, TimeFramePatch::end(99_000.0))
        .unwrap();
    assert_eq!(stored, TimeFrame::new(2000.0, 10_000.0));

    let stored = session
        .set_time_frame(id, TimeFramePatch::start(-1.0))
        .unwrap();
    assert_eq!(stored, TimeFrame::new(0.0, 10_000.0));
}

#[test]
fn shrinking_max_time_clamps_existing_elements() {
    let (mut session, _frames) = session(30_000.0);
    let id = session.add_text("long", 32.0, 400).unwrap();
    session.seek(25_000.0);

    session.set_max_time(12_000.0).unwrap();
    assert_eq!(session.model().get(id).unwrap().time_frame.end, 12_000.0);
    assert_eq!(session.current_time_ms(), 12_000.0);
    assert!(session.set_max_time(MAX_EXPORT_LENGTH_MS + 1.0).is_err());
}

#[test]
fn shrinking_past_an_element_start_slides_it_back() {
    let (mut session, _frames) = session(30_000.0);
    let id = session.add_text("outro", 32.0, 400).unwrap();
    session
        .set_time_frame(id, TimeFramePatch::both(20_000.0, 30_000.0))
        .unwrap();

    session.set_max_time(4000.0).unwrap();
    let frame = session.model().get(id).unwrap().time_frame;
    assert_eq!(frame.start, 0.0);
    assert_eq!(frame.end, 4000.0);

    session.seek(2000.0);
    let object = session.object_for(id).unwrap();
    assert!(session.surface().props(object).unwrap().visible);
}
