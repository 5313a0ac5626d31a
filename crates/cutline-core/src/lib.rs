//! Cutline Core - Foundation types for the timeline editor
//!
//! This crate provides the fundamental types used throughout Cutline:
//! - Error taxonomy shared by every crate
//! - Frame rate, time frames and the playhead clock
//! - Placement geometry
//! - Keyframe tracks used by tweens and skeletal animation
//! - Editor configuration

pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod keyframe;
pub mod time;

pub use clock::Clock;
pub use config::{ContainerFormat, EditorConfig, ExportSettings, MAX_EXPORT_LENGTH_MS};
pub use error::{EditorError, Rejection, Result};
pub use geometry::{Placement, Point, Rect};
pub use keyframe::{CubicBezier, EasingCurve, Keyframe, KeyframeTrack};
pub use time::{format_time, FrameRate, TimeFrame, TimeFramePatch};
