//! Shared session fixtures.

use cutline_animation::skeletal::WALKING;
use cutline_core::EditorConfig;
use cutline_editor::EditorSession;
use cutline_playback::{HeadlessMedia, HeadlessMediaHost, ManualFrameHost};
use cutline_timeline::HeadlessSurface;

pub type Session = EditorSession<HeadlessSurface, HeadlessMediaHost, ManualFrameHost>;

/// Session over in-memory hosts with `video-1` (10 s) and `audio-1` (20 s)
/// loaded and a registered `walker.svg`.
pub fn session(max_time_ms: f64) -> (Session, ManualFrameHost) {
    let config = EditorConfig {
        max_time_ms,
        ..EditorConfig::default()
    };
    let mut media = HeadlessMediaHost::new();
    media.insert(HeadlessMedia::new("video-1", "clip.mp4", 10.0));
    media.insert(HeadlessMedia::new("audio-1", "music.mp3", 20.0));
    let mut surface = HeadlessSurface::new(config.canvas_width, config.canvas_height);
    let parts: Vec<&str> = WALKING.parts.iter().map(|p| p.name).collect();
    surface.register_svg("walker.svg", &parts);

    let frames = ManualFrameHost::new(0.0);
    let session = EditorSession::new(config, surface, media, frames.clone()).unwrap();
    (session, frames)
}
