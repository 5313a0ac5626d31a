//! Cutline Export - Recording the timeline to a file
//!
//! This crate handles:
//! - The host facilities an export drives (surface capture, audio mixing,
//!   recording, download, busy indicator)
//! - The export orchestrator: real-time capture of one timeline pass
//! - Transcoding the native recording through FFmpeg

pub mod export;
pub mod host;
pub mod transcode;

pub use export::{
    AudioCue, ExportCancel, ExportOrchestrator, ExportPlan, ExportReport, NATIVE_FORMAT,
};
pub use host::{
    AudioGraph, AudioNodeId, BusyIndicator, CaptureSource, CaptureStream, Download, DownloadSink,
    ExportEvent, ExportHost, HeadlessExportHost, MixId, Recorder,
};
pub use transcode::{FfmpegTranscoder, Transcoder};
