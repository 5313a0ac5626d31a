//! Cutline Animation - Tween timeline and scheduling
//!
//! - A seekable tween timeline keyed by element id
//! - The scheduler that rebuilds it from fade, slide and breathe animations
//! - Skeletal SVG part tables shared by the play and seek paths

pub mod scheduler;
pub mod skeletal;
pub mod tween;

pub use scheduler::{breathe_period, AnimationScheduler};
pub use skeletal::{angle_at, sync_skeleton, walking_offset, SkeletalBatch, SkeletalTable};
pub use tween::{ClipWindow, TweenSpec, TweenTarget, TweenTimeline};
