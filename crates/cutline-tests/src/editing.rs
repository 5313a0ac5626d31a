//! Editing operations across model, surface and media.

use cutline_core::{EditorError, Rejection, TimeFrame, TimeFramePatch};
use cutline_playback::MediaElement;
use cutline_timeline::{ElementProperties, RenderSurface};

use crate::support::session;

// ── Split ──────────────────────────────────────────────────────

#[test]
fn split_halves_a_ten_second_clip() {
    let (mut session, _frames) = session(30_000.0);
    let id = session
        .add_video("video-1", "clip.mp4", 10_000.0, 16.0 / 9.0)
        .unwrap();
    session.select(Some(id));

    let second = session.split().unwrap();

    let first = session.model().get(id).unwrap();
    assert_eq!(first.time_frame, TimeFrame::new(0.0, 5000.0));
    let second = session.model().get(second).unwrap();
    assert_eq!(second.time_frame, TimeFrame::new(5000.0, 10_000.0));
    assert_eq!(second.name, format!("Layer ({id})"));

    // Each half drives its own media element.
    assert_ne!(first.media_id(), second.media_id());
    assert!(session
        .media()
        .media(second.media_id().unwrap())
        .is_some());
    assert!(session.object_for(second.id).is_some());
}

#[test]
fn split_of_short_clip_changes_nothing() {
    let (mut session, _frames) = session(30_000.0);
    let id = session.add_text("short", 32.0, 400).unwrap();
    session
        .set_time_frame(id, TimeFramePatch::both(1000.0, 2999.0))
        .unwrap();
    session.select(Some(id));
    let before = session.elements().to_vec();

    let err = session.split().unwrap_err();
    assert!(matches!(
        err,
        EditorError::ActionRejected(Rejection::TooShortToSplit { .. })
    ));
    assert_eq!(session.elements(), before.as_slice());
}

// ── Clipboard ──────────────────────────────────────────────────

#[test]
fn copy_then_paste_offsets_the_duplicate() {
    let (mut session, _frames) = session(30_000.0);
    let id = session.add_text("hello", 32.0, 400).unwrap();
    session
        .set_time_frame(id, TimeFramePatch::both(1000.0, 4000.0))
        .unwrap();
    session.select(Some(id));

    session.copy().unwrap();
    let pasted = session.paste().unwrap();

    assert_eq!(session.elements().len(), 2);
    let original = session.model().get(id).unwrap().clone();
    let copy = session.model().get(pasted).unwrap();
    assert_ne!(copy.id, original.id);
    assert_eq!(copy.properties, original.properties);
    assert_eq!(copy.time_frame, original.time_frame);
    assert_eq!(copy.placement.x, original.placement.x + 50.0);
    assert_eq!(copy.placement.y, original.placement.y + 20.0);

    let object = session.object_for(pasted).unwrap();
    assert!(session.surface().objects().contains(&object));
    assert!(session.clipboard().is_none());
}

#[test]
fn second_cut_replaces_clipboard() {
    let (mut session, _frames) = session(30_000.0);
    let first = session.add_text("first", 32.0, 400).unwrap();
    let second = session.add_text("second", 32.0, 400).unwrap();

    session.select(Some(first));
    session.cut().unwrap();
    session.select(Some(second));
    session.cut().unwrap();
    assert!(session.elements().is_empty());

    let pasted = session.paste().unwrap();
    assert_eq!(session.elements().len(), 1);
    let ElementProperties::Text(text) = &session.model().get(pasted).unwrap().properties else {
        panic!("expected a text element");
    };
    assert_eq!(text.text, "second");
    assert!(matches!(
        session.paste(),
        Err(EditorError::ActionRejected(Rejection::ClipboardEmpty))
    ));
}

#[test]
fn copy_does_not_overwrite_a_cut() {
    let (mut session, _frames) = session(30_000.0);
    let first = session.add_text("first", 32.0, 400).unwrap();
    let second = session.add_text("second", 32.0, 400).unwrap();

    session.select(Some(first));
    session.cut().unwrap();
    session.select(Some(second));
    assert!(matches!(
        session.copy(),
        Err(EditorError::ActionRejected(Rejection::ClipboardOccupied))
    ));
    assert_eq!(session.clipboard().unwrap().element.name, "Text 1");
}

// ── Delete & selection ─────────────────────────────────────────

#[test]
fn delete_clears_selection_but_keeps_others() {
    let (mut session, _frames) = session(30_000.0);
    let keep = session.add_text("keep", 32.0, 400).unwrap();
    let doomed = session.add_text("doomed", 32.0, 400).unwrap();
    session.select(Some(doomed));
    assert_eq!(
        session.surface().active(),
        session.object_for(doomed)
    );

    let removed = session.delete().unwrap();
    assert_eq!(removed.id, doomed);
    assert!(session.selected().is_none());
    assert!(session.surface().active().is_none());
    assert_eq!(session.elements().len(), 1);
    assert_eq!(session.elements()[0].id, keep);
}

#[test]
fn operations_without_selection_are_rejected() {
    let (mut session, _frames) = session(30_000.0);
    session.add_text("idle", 32.0, 400).unwrap();
    session.select(None);
    let before = session.elements().to_vec();

    for result in [
        session.cut().map(|_| ()),
        session.copy(),
        session.split().map(|_| ()),
        session.delete().map(|_| ()),
    ] {
        assert!(matches!(
            result,
            Err(EditorError::ActionRejected(Rejection::NoSelection))
        ));
    }
    assert_eq!(session.elements(), before.as_slice());
}

// ── Layers & media ─────────────────────────────────────────────

#[test]
fn reorder_restacks_surface_in_model_order() {
    let (mut session, _frames) = session(30_000.0);
    let a = session.add_text("a", 32.0, 400).unwrap();
    let b = session.add_text("b", 32.0, 400).unwrap();
    let c = session.add_text("c", 32.0, 400).unwrap();

    session.reorder(2, 0).unwrap();

    let order: Vec<_> = session.elements().iter().map(|e| e.id).collect();
    assert_eq!(order, vec![c, a, b]);
    let stacked: Vec<_> = order
        .iter()
        .map(|id| session.object_for(*id).unwrap())
        .collect();
    assert_eq!(session.surface().objects(), stacked);
}

#[test]
fn retiming_video_resyncs_its_clock() {
    let (mut session, _frames) = session(30_000.0);
    let id = session
        .add_video("video-1", "clip.mp4", 10_000.0, 1.0)
        .unwrap();
    session.seek(5000.0);
    let video = |s: &crate::support::Session| s.media().media("video-1").unwrap().current_time();
    assert!((video(&session) - 5.0).abs() < 1e-9);

    session
        .set_time_frame(id, TimeFramePatch::start(2000.0))
        .unwrap();
    assert!((video(&session) - 3.0).abs() < 1e-9);
    assert!(session.media().media("video-1").unwrap().is_paused());
}
