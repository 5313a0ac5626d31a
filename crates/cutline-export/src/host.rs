//! Host facilities driven by an export.
//!
//! A display host (the page the editor runs in) provides surface capture, an
//! audio graph, a recorder, a download sink and a busy indicator. Any type
//! implementing all five is an [`ExportHost`].

use cutline_core::{EditorError, Result};
use std::collections::HashMap;

/// Audio-graph source node bound to one media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioNodeId(pub u64);

/// Audio-graph mix destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MixId(pub u64);

/// Live capture of the render surface plus the audio mixes merged into it.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureStream {
    pub fps: u32,
    pub audio: Vec<MixId>,
}

impl CaptureStream {
    /// Merge a mix destination's audio track into the stream.
    pub fn add_audio(&mut self, mix: MixId) {
        if !self.audio.contains(&mix) {
            self.audio.push(mix);
        }
    }
}

pub trait CaptureSource {
    /// Start capturing the render surface at `fps`.
    fn capture(&mut self, fps: u32) -> Result<CaptureStream>;
}

pub trait AudioGraph {
    /// Create the source node for a media element.
    ///
    /// Hosts may refuse a second node for the same element, so callers keep
    /// the node for the lifetime of the graph.
    fn create_source(&mut self, media_id: &str) -> Result<AudioNodeId>;

    fn create_mix(&mut self) -> MixId;

    fn connect(&mut self, node: AudioNodeId, mix: MixId);
}

pub trait Recorder {
    fn start(&mut self, stream: &CaptureStream) -> Result<()>;

    /// Stop recording and assemble the native container.
    fn stop(&mut self) -> Result<Vec<u8>>;
}

pub trait DownloadSink {
    /// Offer a finished file to the user.
    fn offer(&mut self, file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<()>;
}

pub trait BusyIndicator {
    fn show(&mut self);
    fn hide(&mut self);
}

/// Everything an export needs from its host.
pub trait ExportHost: CaptureSource + AudioGraph + Recorder + DownloadSink + BusyIndicator {}

impl<T> ExportHost for T where T: CaptureSource + AudioGraph + Recorder + DownloadSink + BusyIndicator
{}

/// Observable step taken by a [`HeadlessExportHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    CaptureStarted { fps: u32 },
    SourceCreated { media_id: String },
    Connected { node: AudioNodeId, mix: MixId },
    RecordingStarted { audio_tracks: usize },
    RecordingStopped,
    BusyShown,
    BusyHidden,
    Offered { file_name: String },
}

/// A file handed to the download sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// In-memory export host that records every step.
///
/// Like a browser audio context, it refuses to create a second source node
/// for the same media element.
#[derive(Debug, Clone, Default)]
pub struct HeadlessExportHost {
    next_id: u64,
    sources: HashMap<String, AudioNodeId>,
    recording: Option<CaptureStream>,
    recording_bytes: Vec<u8>,
    busy: bool,
    events: Vec<ExportEvent>,
    downloads: Vec<Download>,
}

impl HeadlessExportHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes the recorder returns on stop.
    pub fn with_recording(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.recording_bytes = bytes.into();
        self
    }

    pub fn events(&self) -> &[ExportEvent] {
        &self.events
    }

    pub fn downloads(&self) -> &[Download] {
        &self.downloads
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl CaptureSource for HeadlessExportHost {
    fn capture(&mut self, fps: u32) -> Result<CaptureStream> {
        self.events.push(ExportEvent::CaptureStarted { fps });
        Ok(CaptureStream {
            fps,
            audio: Vec::new(),
        })
    }
}

impl AudioGraph for HeadlessExportHost {
    fn create_source(&mut self, media_id: &str) -> Result<AudioNodeId> {
        if self.sources.contains_key(media_id) {
            return Err(EditorError::ExternalLoad(format!(
                "media element {media_id} is already connected to a source node"
            )));
        }
        let node = AudioNodeId(self.allocate());
        self.sources.insert(media_id.to_string(), node);
        self.events.push(ExportEvent::SourceCreated {
            media_id: media_id.to_string(),
        });
        Ok(node)
    }

    fn create_mix(&mut self) -> MixId {
        MixId(self.allocate())
    }

    fn connect(&mut self, node: AudioNodeId, mix: MixId) {
        self.events.push(ExportEvent::Connected { node, mix });
    }
}

impl Recorder for HeadlessExportHost {
    fn start(&mut self, stream: &CaptureStream) -> Result<()> {
        if self.recording.is_some() {
            return Err(EditorError::Encoder("recorder already running".into()));
        }
        self.events.push(ExportEvent::RecordingStarted {
            audio_tracks: stream.audio.len(),
        });
        self.recording = Some(stream.clone());
        Ok(())
    }

    fn stop(&mut self) -> Result<Vec<u8>> {
        self.recording
            .take()
            .ok_or_else(|| EditorError::Encoder("recorder not running".into()))?;
        self.events.push(ExportEvent::RecordingStopped);
        Ok(self.recording_bytes.clone())
    }
}

impl DownloadSink for HeadlessExportHost {
    fn offer(&mut self, file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<()> {
        self.events.push(ExportEvent::Offered {
            file_name: file_name.to_string(),
        });
        self.downloads.push(Download {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        });
        Ok(())
    }
}

impl BusyIndicator for HeadlessExportHost {
    fn show(&mut self) {
        self.busy = true;
        self.events.push(ExportEvent::BusyShown);
    }

    fn hide(&mut self) {
        self.busy = false;
        self.events.push(ExportEvent::BusyHidden);
    }
}
