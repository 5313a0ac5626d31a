//! Time representation for frame-accurate scrubbing.
//!
//! The playhead is stored as a frame index; milliseconds are derived from it
//! through the frame rate. Frame rates are rational so NTSC rates stay exact.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance from a frame boundary, in frames, that is still treated as
/// landing exactly on it. Absorbs the rounding left by `ms -> frames`.
const FRAME_SNAP_EPSILON: f64 = 1e-6;

/// Frame rate as a rational number (e.g., 30000/1001 for 29.97 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 30000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Whole-number frame rate.
    #[inline]
    pub const fn from_fps(fps: u32) -> Self {
        Self::new(fps, 1)
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Duration of a single frame in milliseconds.
    #[inline]
    pub fn frame_duration_ms(self) -> f64 {
        self.ms_from_frame(1)
    }

    /// Start of frame `frame` in milliseconds: `frame * 1000 / fps`.
    pub fn ms_from_frame(self, frame: i64) -> f64 {
        let ms = Rational64::new(
            frame * 1000 * self.denominator as i64,
            self.numerator as i64,
        );
        *ms.numer() as f64 / *ms.denom() as f64
    }

    /// Frame index containing `ms`: `floor(ms / 1000 * fps)`.
    pub fn frame_from_ms(self, ms: f64) -> i64 {
        let frames = ms * self.numerator as f64 / (1000.0 * self.denominator as f64);
        let nearest = frames.round();
        if (frames - nearest).abs() < FRAME_SNAP_EPSILON {
            nearest as i64
        } else {
            frames.floor() as i64
        }
    }

    /// Common frame rates
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_60: Self = Self::new(60, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_60
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}

/// Activity window of an element, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeFrame {
    /// Start time (ms)
    pub start: f64,
    /// End time (ms)
    pub end: f64,
}

impl TimeFrame {
    /// Create a new time frame.
    #[inline]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the window.
    #[inline]
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// Closed-interval test, `start <= ms <= end`. Drives visibility.
    #[inline]
    pub fn contains(self, ms: f64) -> bool {
        self.start <= ms && ms <= self.end
    }

    /// Half-open test, `start <= ms < end`. Drives media activity.
    #[inline]
    pub fn contains_half_open(self, ms: f64) -> bool {
        self.start <= ms && ms < self.end
    }

    /// Merge a partial update, clamping start to `>= 0` and end to `<= max_time`.
    pub fn merged(self, patch: TimeFramePatch, max_time: f64) -> Self {
        let start = patch.start.map(|s| s.max(0.0)).unwrap_or(self.start);
        let end = patch.end.map(|e| e.min(max_time)).unwrap_or(self.end);
        Self { start, end }
    }
}

/// Partial time frame update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeFramePatch {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl TimeFramePatch {
    pub fn start(start: f64) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn end(end: f64) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    pub fn both(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Render a millisecond position as `MM:SS.mmm`.
pub fn format_time(ms: f64) -> String {
    let total = ms.max(0.0).floor() as u64;
    let minutes = total / 60_000;
    let seconds = (total / 1000) % 60;
    let millis = total % 1000;
    format!("{minutes:02}:{seconds:02}.{millis:03}")
}
