//! Keyframe tracks with linear, hold and Bézier interpolation.
//!
//! Times are milliseconds relative to the start of whatever the track animates
//! (a tween, a skeletal cycle). Easing uses cubic Bézier curves with
//! Newton-Raphson evaluation for converting x to the curve parameter t.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

// ── Easing curves ───────────────────────────────────────────────

/// Cubic Bézier control points for easing (x1, y1, x2, y2).
/// The curve goes from (0,0) to (1,1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn sample_x(&self, t: f64) -> f64 {
        let mt = 1.0 - t;
        3.0 * mt * mt * t * self.x1 + 3.0 * mt * t * t * self.x2 + t * t * t
    }

    fn sample_y(&self, t: f64) -> f64 {
        let mt = 1.0 - t;
        3.0 * mt * mt * t * self.y1 + 3.0 * mt * t * t * self.y2 + t * t * t
    }

    fn sample_dx(&self, t: f64) -> f64 {
        let mt = 1.0 - t;
        3.0 * mt * mt * self.x1 + 6.0 * mt * t * (self.x2 - self.x1) + 3.0 * t * t * (1.0 - self.x2)
    }

    /// Solve for t at `x` with Newton-Raphson and return y.
    pub fn evaluate(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }

        let mut t = x;
        for _ in 0..8 {
            let x_est = self.sample_x(t) - x;
            let dx = self.sample_dx(t);
            if dx.abs() < 1e-12 {
                break;
            }
            t = (t - x_est / dx).clamp(0.0, 1.0);
            if x_est.abs() < 1e-10 {
                break;
            }
        }

        self.sample_y(t)
    }

    pub const LINEAR: Self = Self::new(0.0, 0.0, 1.0, 1.0);
    pub const EASE: Self = Self::new(0.25, 0.1, 0.25, 1.0);
    pub const EASE_OUT: Self = Self::new(0.0, 0.0, 0.58, 1.0);
}

/// How to interpolate between keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum EasingCurve {
    /// Hold the value until the next keyframe.
    Hold,
    #[default]
    Linear,
    Bezier(CubicBezier),
}

// ── Keyframe ────────────────────────────────────────────────────

/// A single keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Offset from the track origin (ms).
    pub time: f64,
    pub value: f64,
    /// Easing used when interpolating TO the next keyframe.
    pub easing: EasingCurve,
}

impl Keyframe {
    pub fn new(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            easing: EasingCurve::Linear,
        }
    }
}

// ── Keyframe track ──────────────────────────────────────────────

/// A track of keyframes for one animated value, kept sorted by time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyframeTrack {
    keyframes: SmallVec<[Keyframe; 4]>,
}

impl KeyframeTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two-point track from `from` to `to` over `duration` ms.
    pub fn between(from: f64, to: f64, duration: f64, easing: EasingCurve) -> Self {
        let mut track = Self::new();
        track.set(0.0, from, easing);
        track.set(duration.max(0.0), to, EasingCurve::Linear);
        track
    }

    /// Values spread evenly over `span` ms, first at 0 and last at `span`.
    pub fn evenly_spaced(values: &[f64], span: f64) -> Self {
        let mut track = Self::new();
        match values.len() {
            0 => {}
            1 => track.set(0.0, values[0], EasingCurve::Linear),
            n => {
                let step = span / (n - 1) as f64;
                for (i, value) in values.iter().enumerate() {
                    track.set(step * i as f64, *value, EasingCurve::Linear);
                }
            }
        }
        track
    }

    /// Insert or update a keyframe, keeping sorted order.
    pub fn set(&mut self, time: f64, value: f64, easing: EasingCurve) {
        if let Some(kf) = self.keyframes.iter_mut().find(|kf| kf.time == time) {
            kf.value = value;
            kf.easing = easing;
            return;
        }
        let pos = self.keyframes.partition_point(|kf| kf.time < time);
        self.keyframes.insert(
            pos,
            Keyframe {
                time,
                value,
                easing,
            },
        );
    }

    /// Evaluate the track at `time`, clamping to the first/last value outside it.
    pub fn evaluate(&self, time: f64) -> f64 {
        let (first, last) = match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }
        let idx = self
            .keyframes
            .partition_point(|kf| kf.time <= time)
            .saturating_sub(1);
        Self::interpolate(&self.keyframes[idx], &self.keyframes[idx + 1], time)
    }

    fn interpolate(a: &Keyframe, b: &Keyframe, time: f64) -> f64 {
        let span = b.time - a.time;
        if span <= 0.0 {
            return a.value;
        }
        let t = ((time - a.time) / span).clamp(0.0, 1.0);
        match a.easing {
            EasingCurve::Hold => a.value,
            EasingCurve::Linear => a.value + (b.value - a.value) * t,
            EasingCurve::Bezier(bezier) => a.value + (b.value - a.value) * bezier.evaluate(t),
        }
    }

    /// Value at the first keyframe.
    pub fn initial_value(&self) -> f64 {
        self.keyframes.first().map_or(0.0, |kf| kf.value)
    }

    /// Time of the last keyframe.
    pub fn duration(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |kf| kf.time)
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }
}

impl fmt::Display for KeyframeTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KeyframeTrack({} keyframes, {} ms)",
            self.keyframes.len(),
            self.duration()
        )
    }
}

// ── Tests ───────────────────────────────────────────────────────
