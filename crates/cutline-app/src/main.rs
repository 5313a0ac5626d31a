//! Cutline - headless timeline driver
//!
//! Loads an editor config, builds a demo scene on in-memory hosts, plays it
//! to the end and optionally exports it.
//!
//! Usage: `cutline [CONFIG.json] [--export]`

use anyhow::{Context, Result};
use cutline_core::{format_time, EditorConfig, TimeFramePatch};
use cutline_editor::EditorSession;
use cutline_export::{
    ExportCancel, ExportOrchestrator, ExportPlan, FfmpegTranscoder, HeadlessExportHost,
};
use cutline_playback::{FrameOutcome, HeadlessMedia, HeadlessMediaHost, ManualFrameHost};
use cutline_timeline::{Animation, AnimationKind, HeadlessSurface};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type Session = EditorSession<HeadlessSurface, HeadlessMediaHost, ManualFrameHost>;

struct Args {
    config: Option<PathBuf>,
    export: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        config: None,
        export: false,
    };
    for arg in std::env::args().skip(1) {
        if arg == "--export" {
            args.export = true;
        } else {
            args.config = Some(PathBuf::from(arg));
        }
    }
    args
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = parse_args();
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    info!(
        max_time = %format_time(config.max_time_ms),
        fps = config.fps,
        "Cutline starting"
    );

    let frames = ManualFrameHost::new(0.0);
    let mut session = build_scene(config, frames.clone())?;
    play_to_end(&mut session, &frames);

    if args.export {
        export(&mut session).await?;
    }
    Ok(())
}

/// A video, a delayed audio track and a faded title.
fn build_scene(config: EditorConfig, frames: ManualFrameHost) -> Result<Session> {
    let surface = HeadlessSurface::new(config.canvas_width, config.canvas_height);
    let mut media = HeadlessMediaHost::new();
    media.insert(HeadlessMedia::new("video-1", "intro.mp4", 8.0));
    media.insert(HeadlessMedia::new("audio-1", "music.mp3", 20.0));

    let mut session = EditorSession::new(config, surface, media, frames)?;
    session.add_video("video-1", "intro.mp4", 8000.0, 16.0 / 9.0)?;
    let audio = session.add_audio("audio-1", "music.mp3", 20_000.0)?;
    session.set_time_frame(audio, TimeFramePatch::start(1000.0))?;
    let title = session.add_text("Cutline", 48.0, 700)?;
    session.add_animation(Animation::new(title, AnimationKind::FadeIn, 1000.0));
    session.add_animation(Animation::new(title, AnimationKind::FadeOut, 1000.0));

    info!(elements = session.elements().len(), "Scene ready");
    Ok(session)
}

/// Run the frame loop on the manual host until playback stops.
fn play_to_end(session: &mut Session, frames: &ManualFrameHost) {
    let frame_ms = session.config().frame_rate().frame_duration_ms();
    let mut last_logged = -1i64;

    session.play();
    while let Some(request) = frames.fire() {
        frames.advance(frame_ms);
        session.media_mut().advance_all(frame_ms / 1000.0);
        match session.tick(request) {
            Some(FrameOutcome::ReachedEnd) | None => break,
            Some(FrameOutcome::Continue) => {}
        }
        let second = (session.current_time_ms() / 1000.0) as i64;
        if second != last_logged {
            last_logged = second;
            info!(playhead = %format_time(session.current_time_ms()), "Playing");
        }
    }
    info!(state = %session.playback_state(), "Playback finished");
}

async fn export(session: &mut Session) -> Result<()> {
    let transcoder = FfmpegTranscoder::find().unwrap_or_else(|| {
        warn!("ffmpeg not found on PATH; non-native exports will fail");
        FfmpegTranscoder::new("ffmpeg")
    });
    let mut orchestrator =
        ExportOrchestrator::new(session.config().export.clone(), Arc::new(transcoder));
    let plan = ExportPlan::from_model(session.model(), session.max_time_ms());
    let mut host = HeadlessExportHost::new();

    session.seek(0.0);
    let report = orchestrator
        .export(&mut host, session.media_mut(), &plan, &ExportCancel::new())
        .await
        .context("export failed")?;
    info!(
        file = %report.file_name,
        bytes = report.size,
        transcoded = report.transcoded,
        recorded = %format_time(report.recorded_ms),
        "Export offered"
    );
    Ok(())
}
