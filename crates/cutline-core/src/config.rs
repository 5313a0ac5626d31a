//! Editor configuration, loadable from JSON.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EditorError, Result};
use crate::time::FrameRate;

/// Longest timeline that can be exported (ms).
pub const MAX_EXPORT_LENGTH_MS: f64 = 600_000.0;

/// Container written by the export pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    /// What the capture recorder produces natively.
    Webm,
    /// Requires a transcode pass after recording.
    Mp4,
}

impl ContainerFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Webm => "video/webm",
            Self::Mp4 => "video/mp4",
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Requested output container.
    pub format: ContainerFormat,
    /// Rate at which the render surface is captured.
    pub capture_fps: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ContainerFormat::Mp4,
            capture_fps: 30,
        }
    }
}

/// Session-wide editor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Timeline length (ms).
    pub max_time_ms: f64,
    /// Playhead frame rate.
    pub fps: u32,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub background_color: String,
    pub export: ExportSettings,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_time_ms: 30_000.0,
            fps: 60,
            canvas_width: 800.0,
            canvas_height: 500.0,
            background_color: "#404040".into(),
            export: ExportSettings::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)
            .map_err(|e| EditorError::Serialization(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }

    pub fn frame_rate(&self) -> FrameRate {
        FrameRate::from_fps(self.fps)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(EditorError::Config("fps must be positive".into()));
        }
        if self.export.capture_fps == 0 {
            return Err(EditorError::Config("capture_fps must be positive".into()));
        }
        if !(self.max_time_ms > 0.0 && self.max_time_ms <= MAX_EXPORT_LENGTH_MS) {
            return Err(EditorError::Config(format!(
                "max_time_ms must be in (0, {MAX_EXPORT_LENGTH_MS}], got {}",
                self.max_time_ms
            )));
        }
        if self.canvas_width <= 0.0 || self.canvas_height <= 0.0 {
            return Err(EditorError::Config("canvas size must be positive".into()));
        }
        Ok(())
    }
}
