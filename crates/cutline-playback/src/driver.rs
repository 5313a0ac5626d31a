//! Playback state machine and per-frame scheduling.

use cutline_animation::SkeletalBatch;
use cutline_timeline::{ElementId, ElementModel, RenderSurface};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::media::{resync_audio, resync_video, MediaHost};

/// Handle to a requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

/// Host clock and frame scheduler (the display's animation-frame loop).
pub trait FrameHost {
    /// Wall-clock time in ms.
    fn now_ms(&self) -> f64;

    /// Ask for one callback on the next frame.
    fn request_frame(&mut self) -> FrameRequest;

    fn cancel_frame(&mut self, request: FrameRequest);
}

#[derive(Debug, Default)]
struct ManualClock {
    now_ms: f64,
    next_request: u64,
    pending: Option<FrameRequest>,
    requested: u64,
    cancelled: u64,
}

/// Frame host driven by the caller. Clones share one clock.
#[derive(Debug, Clone, Default)]
pub struct ManualFrameHost {
    clock: Arc<Mutex<ManualClock>>,
}

impl ManualFrameHost {
    pub fn new(now_ms: f64) -> Self {
        let host = Self::default();
        host.clock.lock().now_ms = now_ms;
        host
    }

    pub fn advance(&self, ms: f64) {
        self.clock.lock().now_ms += ms;
    }

    pub fn set_now(&self, now_ms: f64) {
        self.clock.lock().now_ms = now_ms;
    }

    /// The frame callback waiting to fire, if any.
    pub fn pending(&self) -> Option<FrameRequest> {
        self.clock.lock().pending
    }

    /// Fire the pending callback, returning its request.
    pub fn fire(&self) -> Option<FrameRequest> {
        self.clock.lock().pending.take()
    }

    pub fn requested(&self) -> u64 {
        self.clock.lock().requested
    }

    pub fn cancelled(&self) -> u64 {
        self.clock.lock().cancelled
    }
}

impl FrameHost for ManualFrameHost {
    fn now_ms(&self) -> f64 {
        self.clock.lock().now_ms
    }

    fn request_frame(&mut self) -> FrameRequest {
        let mut clock = self.clock.lock();
        clock.next_request += 1;
        clock.requested += 1;
        let request = FrameRequest(clock.next_request);
        clock.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let mut clock = self.clock.lock();
        if clock.pending == Some(request) {
            clock.pending = None;
            clock.cancelled += 1;
        }
    }
}

/// Playback state. Pausing is stopping at the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Playing => write!(f, "playing"),
        }
    }
}

/// What the caller should do after applying a frame's time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The next frame is scheduled.
    Continue,
    /// Playback ran past the end and has stopped.
    ReachedEnd,
}

/// Real-time playback loop state.
///
/// At most one frame callback is pending at a time and at most one
/// skeletal batch exists.
#[derive(Debug, Default)]
pub struct PlaybackDriver {
    state: PlaybackState,
    started_wall_ms: f64,
    started_play_ms: f64,
    pending: Option<FrameRequest>,
    playing_audio: HashSet<ElementId>,
    skeletal: Option<SkeletalBatch>,
}

impl PlaybackDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Enter `Playing` from `playhead_ms` and schedule the first frame.
    pub fn start<F: FrameHost + ?Sized>(&mut self, host: &mut F, playhead_ms: f64) {
        if let Some(request) = self.pending.take() {
            host.cancel_frame(request);
        }
        self.state = PlaybackState::Playing;
        self.started_wall_ms = host.now_ms();
        self.started_play_ms = playhead_ms;
        self.pending = Some(host.request_frame());
        info!(from_ms = playhead_ms, "Playback started");
    }

    /// Enter `Stopped`, cancelling the pending frame and pausing the
    /// skeletal batch.
    pub fn stop<F: FrameHost + ?Sized>(&mut self, host: &mut F) {
        if let Some(request) = self.pending.take() {
            host.cancel_frame(request);
        }
        if let Some(batch) = self.skeletal.as_mut() {
            batch.pause(host.now_ms());
        }
        if self.state == PlaybackState::Playing {
            info!("Playback stopped");
        }
        self.state = PlaybackState::Stopped;
    }

    /// Accept the fired frame `request` and compute its playhead time.
    ///
    /// Returns `None` when stopped or when `request` is not the pending one.
    pub fn begin_frame<F: FrameHost + ?Sized>(
        &mut self,
        host: &F,
        request: FrameRequest,
    ) -> Option<f64> {
        if !self.is_playing() || self.pending != Some(request) {
            return None;
        }
        self.pending = None;
        let elapsed = host.now_ms() - self.started_wall_ms;
        Some(self.started_play_ms + elapsed)
    }

    /// Finish a frame after the caller applied `new_time_ms`.
    pub fn end_frame<F: FrameHost + ?Sized>(
        &mut self,
        host: &mut F,
        new_time_ms: f64,
        max_time_ms: f64,
    ) -> FrameOutcome {
        if new_time_ms > max_time_ms {
            debug!(new_time_ms, max_time_ms, "Playback reached the end");
            self.stop(host);
            FrameOutcome::ReachedEnd
        } else {
            if self.is_playing() {
                self.pending = Some(host.request_frame());
            }
            FrameOutcome::Continue
        }
    }

    /// Resync video and audio elements to the playhead.
    pub fn resync_media<H: MediaHost + ?Sized>(
        &mut self,
        model: &ElementModel,
        host: &mut H,
        playhead_ms: f64,
    ) {
        let playing = self.is_playing();
        resync_video(model, host, playhead_ms, playing);
        resync_audio(model, host, playhead_ms, playing, &mut self.playing_audio);
    }

    /// Audio elements currently started by the driver.
    pub fn playing_audio(&self) -> &HashSet<ElementId> {
        &self.playing_audio
    }

    pub fn skeletal(&self) -> Option<&SkeletalBatch> {
        self.skeletal.as_ref()
    }

    /// Replace the skeletal batch, clearing the old one first.
    pub fn replace_skeletal<S: RenderSurface + ?Sized>(
        &mut self,
        batch: SkeletalBatch,
        surface: &mut S,
    ) {
        self.clear_skeletal(surface);
        self.skeletal = Some(batch);
    }

    pub fn clear_skeletal<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(old) = self.skeletal.take() {
            old.clear(surface);
        }
    }

    /// Advance the running skeletal batch to the host clock.
    pub fn update_skeletal<S, F>(&self, surface: &mut S, host: &F)
    where
        S: RenderSurface + ?Sized,
        F: FrameHost + ?Sized,
    {
        if let Some(batch) = &self.skeletal {
            batch.update(surface, host.now_ms());
        }
    }
}
