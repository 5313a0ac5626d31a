//! Exporting a session's timeline on paused tokio time.

use cutline_core::{ContainerFormat, ExportSettings, Result, TimeFramePatch};
use cutline_export::{
    ExportCancel, ExportEvent, ExportOrchestrator, ExportPlan, HeadlessExportHost, Transcoder,
};
use cutline_playback::MediaElement;
use std::sync::Arc;

use crate::support::session;

struct TaggingTranscoder;

impl Transcoder for TaggingTranscoder {
    fn transcode(&self, input: &[u8], _from: ContainerFormat, to: ContainerFormat) -> Result<Vec<u8>> {
        let mut out = input.to_vec();
        out.extend_from_slice(to.extension().as_bytes());
        Ok(out)
    }
}

fn orchestrator(format: ContainerFormat) -> ExportOrchestrator {
    ExportOrchestrator::new(
        ExportSettings {
            format,
            capture_fps: 30,
        },
        Arc::new(TaggingTranscoder),
    )
}

#[tokio::test(start_paused = true)]
async fn session_timeline_exports_as_mp4() {
    let (mut session, _frames) = session(4000.0);
    session
        .add_video("video-1", "clip.mp4", 10_000.0, 1.0)
        .unwrap();
    let audio = session
        .add_audio("audio-1", "music.mp3", 20_000.0)
        .unwrap();
    session
        .set_time_frame(audio, TimeFramePatch::start(1500.0))
        .unwrap();
    session.add_text("caption", 24.0, 400).unwrap();

    let plan = ExportPlan::from_model(session.model(), session.max_time_ms());
    assert_eq!(plan.video_media, vec!["video-1".to_string()]);
    assert_eq!(plan.audio_cues.len(), 1);

    let mut host = HeadlessExportHost::new().with_recording(b"native".to_vec());
    let mut export = orchestrator(ContainerFormat::Mp4);
    let report = export
        .export(&mut host, session.media_mut(), &plan, &ExportCancel::new())
        .await
        .unwrap();

    assert!(report.transcoded);
    assert_eq!(report.file_name, "video.mp4");
    assert_eq!(report.audio_started.len(), 1);
    assert_eq!(report.audio_started[0].1.round(), 1500.0);
    assert!((report.recorded_ms - 4000.0).abs() < 1.0);

    assert_eq!(host.downloads().len(), 1);
    assert_eq!(host.downloads()[0].bytes, b"nativemp4");
    assert!(host.events().contains(&ExportEvent::RecordingStarted { audio_tracks: 1 }));
    assert!(!host.is_busy());
    assert!(session.media().media("video-1").unwrap().is_paused());
    assert!(session.media().media("audio-1").unwrap().is_paused());
}

#[tokio::test(start_paused = true)]
async fn pasted_media_gets_its_own_source_node() {
    let (mut session, _frames) = session(2000.0);
    let id = session
        .add_audio("audio-1", "music.mp3", 20_000.0)
        .unwrap();
    session.select(Some(id));
    session.copy().unwrap();
    session.paste().unwrap();

    let plan = ExportPlan::from_model(session.model(), session.max_time_ms());
    assert_eq!(plan.media_ids().len(), 2);

    let mut host = HeadlessExportHost::new();
    let mut export = orchestrator(ContainerFormat::Webm);
    for _ in 0..2 {
        export
            .export(&mut host, session.media_mut(), &plan, &ExportCancel::new())
            .await
            .unwrap();
    }
    assert_eq!(host.source_count(), 2);
    assert_eq!(host.downloads().len(), 2);
    assert!(host.downloads().iter().all(|d| d.file_name == "video.webm"));
}
