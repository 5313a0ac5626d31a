//! Cutline Playback - Real-time playback
//!
//! Architecture:
//! - `PlaybackDriver`: Stopped/Playing state machine fed by a `FrameHost`
//! - `MediaHost`/`MediaElement`: backing video and audio clocks
//! - Resync routines that keep those clocks on the playhead

pub mod driver;
pub mod media;

pub use driver::{
    FrameHost, FrameOutcome, FrameRequest, ManualFrameHost, PlaybackDriver, PlaybackState,
};
pub use media::{
    resync_audio, resync_video, HeadlessMedia, HeadlessMediaHost, MediaElement, MediaHost,
    DRIFT_THRESHOLD_SECS,
};
