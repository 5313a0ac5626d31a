//! Timeline clock: playhead position, frame rate and timeline bounds.

use serde::{Deserialize, Serialize};

use crate::time::FrameRate;

/// Playhead state. The frame index is authoritative; milliseconds derive from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    /// Total timeline duration (ms).
    max_time_ms: f64,
    /// Frame rate of the playhead.
    rate: FrameRate,
    /// Current frame index.
    current_key_frame: i64,
}

impl Clock {
    /// Create a clock parked at frame 0.
    pub fn new(max_time_ms: f64, rate: FrameRate) -> Self {
        Self {
            max_time_ms,
            rate,
            current_key_frame: 0,
        }
    }

    #[inline]
    pub fn max_time_ms(&self) -> f64 {
        self.max_time_ms
    }

    pub fn set_max_time_ms(&mut self, max_time_ms: f64) {
        self.max_time_ms = max_time_ms;
    }

    #[inline]
    pub fn rate(&self) -> FrameRate {
        self.rate
    }

    #[inline]
    pub fn current_key_frame(&self) -> i64 {
        self.current_key_frame
    }

    pub fn set_current_key_frame(&mut self, frame: i64) {
        self.current_key_frame = frame;
    }

    /// Playhead position in milliseconds.
    #[inline]
    pub fn current_time_ms(&self) -> f64 {
        self.rate.ms_from_frame(self.current_key_frame)
    }

    /// Move the playhead to the frame containing `ms`.
    pub fn set_current_time_ms(&mut self, ms: f64) {
        self.current_key_frame = self.rate.frame_from_ms(ms);
    }

    /// Snap the playhead back to the start of the timeline.
    pub fn rewind(&mut self) {
        self.current_key_frame = 0;
    }

    /// Whether `ms` lies past the end of the timeline.
    #[inline]
    pub fn is_past_end(&self, ms: f64) -> bool {
        ms > self.max_time_ms
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(30_000.0, FrameRate::FPS_60)
    }
}
