//! Export pipeline: one real-time pass over the timeline, recorded.
//!
//! The render surface is captured at a fixed rate while every video and
//! audio element feeds one audio mix merged into the capture. Audio
//! elements start at their timeline position; the recorder stops after the
//! timeline length. The native recording is offered directly, or handed to
//! a [`Transcoder`] first when another container was requested.

use cutline_core::{ContainerFormat, EditorError, ExportSettings, Result};
use cutline_playback::MediaHost;
use cutline_timeline::{ElementModel, ElementProperties};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::host::{AudioNodeId, ExportHost, MixId};
use crate::transcode::Transcoder;

/// Container the recorder produces without a transcode.
pub const NATIVE_FORMAT: ContainerFormat = ContainerFormat::Webm;

/// An audio element's scheduled start.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCue {
    pub media_id: String,
    /// Offset from the start of recording (ms).
    pub start_ms: f64,
}

/// What one export captures, read from the model when the export begins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportPlan {
    pub max_time_ms: f64,
    /// Backing media of video elements, in model order.
    pub video_media: Vec<String>,
    /// Audio starts, earliest first.
    pub audio_cues: Vec<AudioCue>,
}

impl ExportPlan {
    pub fn from_model(model: &ElementModel, max_time_ms: f64) -> Self {
        let mut plan = Self {
            max_time_ms,
            ..Self::default()
        };
        for element in model.iter() {
            match &element.properties {
                ElementProperties::Video(video) => {
                    if !plan.video_media.contains(&video.element_id) {
                        plan.video_media.push(video.element_id.clone());
                    }
                }
                ElementProperties::Audio(audio) => plan.audio_cues.push(AudioCue {
                    media_id: audio.element_id.clone(),
                    start_ms: element.time_frame.start,
                }),
                _ => {}
            }
        }
        plan.audio_cues.sort_by(|a, b| a.start_ms.total_cmp(&b.start_ms));
        plan
    }

    /// Every distinct media element feeding the mix.
    pub fn media_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        let all = self
            .video_media
            .iter()
            .map(String::as_str)
            .chain(self.audio_cues.iter().map(|c| c.media_id.as_str()));
        for id in all {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.max_time_ms.max(0.0) / 1000.0)
    }
}

/// Outcome of a finished export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub file_name: String,
    pub format: ContainerFormat,
    pub size: usize,
    pub transcoded: bool,
    /// Audio elements started during recording, with their offset (ms).
    pub audio_started: Vec<(String, f64)>,
    pub recorded_ms: f64,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Handle for cancelling an in-progress export.
#[derive(Debug, Clone, Default)]
pub struct ExportCancel(Arc<CancelState>);

impl ExportCancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::Release);
        self.0.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.0.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Sleep until `deadline`; `false` if cancelled first.
async fn wait_until(deadline: Instant, cancel: &ExportCancel) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep_until(deadline) => true,
    }
}

fn ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Drives exports for one editor.
///
/// Audio source nodes are kept across exports: a host creates at most one
/// per media element.
pub struct ExportOrchestrator {
    settings: ExportSettings,
    transcoder: Arc<dyn Transcoder + Send + Sync>,
    source_nodes: HashMap<String, AudioNodeId>,
}

impl ExportOrchestrator {
    pub fn new(settings: ExportSettings, transcoder: Arc<dyn Transcoder + Send + Sync>) -> Self {
        Self {
            settings,
            transcoder,
            source_nodes: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn set_format(&mut self, format: ContainerFormat) {
        self.settings.format = format;
    }

    /// Record one pass of the timeline and deliver it.
    pub async fn export<H, M>(
        &mut self,
        host: &mut H,
        media: &mut M,
        plan: &ExportPlan,
        cancel: &ExportCancel,
    ) -> Result<ExportReport>
    where
        H: ExportHost + ?Sized,
        M: MediaHost + ?Sized,
    {
        info!(
            format = self.settings.format.extension(),
            max_time_ms = plan.max_time_ms,
            videos = plan.video_media.len(),
            audios = plan.audio_cues.len(),
            "Export started"
        );

        let mut stream = host.capture(self.settings.capture_fps)?;
        let mix = host.create_mix();
        for media_id in &plan.video_media {
            let Some(element) = media.get_mut(media_id) else {
                warn!(media = %media_id, "Skipping missing video element");
                continue;
            };
            if let Err(err) = element.play() {
                warn!(media = %media_id, error = %err, "Video play rejected");
            }
            self.connect_source(host, media_id, mix);
        }
        for cue in &plan.audio_cues {
            if media.get(&cue.media_id).is_none() {
                warn!(media = %cue.media_id, "Skipping missing audio element");
                continue;
            }
            self.connect_source(host, &cue.media_id, mix);
        }
        stream.add_audio(mix);

        host.start(&stream)?;
        let started = Instant::now();
        let mut audio_started = Vec::new();

        for cue in &plan.audio_cues {
            if cue.start_ms >= plan.max_time_ms {
                break;
            }
            let at = started + Duration::from_secs_f64(cue.start_ms.max(0.0) / 1000.0);
            if !wait_until(at, cancel).await {
                return Err(self.abort(host, media, plan));
            }
            let Some(element) = media.get_mut(&cue.media_id) else {
                continue;
            };
            match element.play() {
                Ok(()) => {
                    let offset = ms(started.elapsed());
                    debug!(media = %cue.media_id, offset_ms = offset, "Audio started");
                    audio_started.push((cue.media_id.clone(), offset));
                }
                Err(err) => warn!(media = %cue.media_id, error = %err, "Audio play rejected"),
            }
        }

        if !wait_until(started + plan.duration(), cancel).await {
            return Err(self.abort(host, media, plan));
        }
        let recording = host.stop()?;
        let recorded_ms = ms(started.elapsed());
        pause_all(media, plan);
        info!(recorded_ms, bytes = recording.len(), "Recording finished");

        let (file_name, size, transcoded) = self.deliver(host, recording).await?;
        Ok(ExportReport {
            file_name,
            format: self.settings.format,
            size,
            transcoded,
            audio_started,
            recorded_ms,
        })
    }

    fn connect_source<H: ExportHost + ?Sized>(&mut self, host: &mut H, media_id: &str, mix: MixId) {
        let node = match self.source_nodes.get(media_id) {
            Some(node) => *node,
            None => match host.create_source(media_id) {
                Ok(node) => {
                    self.source_nodes.insert(media_id.to_string(), node);
                    node
                }
                Err(err) => {
                    warn!(media = %media_id, error = %err, "No audio source node, element is silent");
                    return;
                }
            },
        };
        host.connect(node, mix);
    }

    fn abort<H, M>(&self, host: &mut H, media: &mut M, plan: &ExportPlan) -> EditorError
    where
        H: ExportHost + ?Sized,
        M: MediaHost + ?Sized,
    {
        if let Err(err) = host.stop() {
            debug!(error = %err, "Recorder stop after cancel failed");
        }
        pause_all(media, plan);
        warn!("Export cancelled");
        EditorError::Encoder("Export cancelled".into())
    }

    /// Offer the recording, transcoding it first unless it is already in
    /// the requested container.
    async fn deliver<H: ExportHost + ?Sized>(
        &self,
        host: &mut H,
        recording: Vec<u8>,
    ) -> Result<(String, usize, bool)> {
        let target = self.settings.format;
        let file_name = format!("video.{}", target.extension());
        if target == NATIVE_FORMAT {
            let size = recording.len();
            host.offer(&file_name, target.mime_type(), recording)?;
            return Ok((file_name, size, false));
        }

        host.show();
        let transcoder = Arc::clone(&self.transcoder);
        let result = match tokio::task::spawn_blocking(move || {
            transcoder.transcode(&recording, NATIVE_FORMAT, target)
        })
        .await
        {
            Ok(result) => result,
            Err(err) => Err(EditorError::Encoder(format!("transcode task failed: {err}"))),
        };
        host.hide();

        let bytes = match result {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(error = %err, "Transcode failed");
                return Err(err);
            }
        };
        let size = bytes.len();
        host.offer(&file_name, target.mime_type(), bytes)?;
        Ok((file_name, size, true))
    }
}

fn pause_all<M: MediaHost + ?Sized>(media: &mut M, plan: &ExportPlan) {
    for media_id in plan.media_ids() {
        if let Some(element) = media.get_mut(media_id) {
            element.pause();
        }
    }
}
