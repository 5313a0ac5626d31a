//! Re-encoding the native recording into another container.

use cutline_core::{ContainerFormat, EditorError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Converts a finished recording between containers.
///
/// Runs off the timeline thread; implementations may block.
pub trait Transcoder {
    fn transcode(&self, input: &[u8], from: ContainerFormat, to: ContainerFormat) -> Result<Vec<u8>>;
}

/// Video and audio encoders for a target container.
fn encoders(to: ContainerFormat) -> (&'static str, &'static str) {
    match to {
        ContainerFormat::Mp4 => ("libx264", "aac"),
        ContainerFormat::Webm => ("libvpx-vp9", "libopus"),
    }
}

/// Transcoder backed by an `ffmpeg` executable.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    binary: PathBuf,
    scratch_root: Option<PathBuf>,
}

impl FfmpegTranscoder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            scratch_root: None,
        }
    }

    /// Create per-call working directories under `root` instead of the
    /// system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Locate `ffmpeg` on `PATH`.
    pub fn find() -> Option<Self> {
        which::which("ffmpeg").ok().map(Self::new)
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Check that the binary runs.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Command line converting `input` into `output`.
    pub fn args(input: &Path, output: &Path, to: ContainerFormat) -> Vec<String> {
        let (video, audio) = encoders(to);
        let mut args = vec![
            "-y".to_string(),
            "-i".into(),
            input.to_string_lossy().into_owned(),
            "-c:v".into(),
            video.into(),
            "-c:a".into(),
            audio.into(),
        ];
        if to == ContainerFormat::Mp4 {
            args.extend_from_slice(&[
                "-b:a".into(),
                "192k".into(),
                "-strict".into(),
                "experimental".into(),
            ]);
        }
        args.push(output.to_string_lossy().into_owned());
        args
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, input: &[u8], from: ContainerFormat, to: ContainerFormat) -> Result<Vec<u8>> {
        if from == to {
            return Ok(input.to_vec());
        }

        // Removed when `scratch` drops, on every return path.
        let mut builder = tempfile::Builder::new();
        builder.prefix("cutline-transcode-");
        let scratch = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        debug!(path = %scratch.path().display(), "Created transcode scratch dir");
        let input_path = scratch.path().join(format!("video.{}", from.extension()));
        let output_path = scratch.path().join(format!("video.{}", to.extension()));
        std::fs::write(&input_path, input)?;

        info!(
            from = from.extension(),
            to = to.extension(),
            bytes = input.len(),
            "Transcoding recording"
        );
        let output = Command::new(&self.binary)
            .args(Self::args(&input_path, &output_path, to))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                EditorError::Encoder(format!(
                    "Failed to run ffmpeg ({}): {e}",
                    self.binary.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
            return Err(EditorError::Encoder(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                tail.into_iter().rev().collect::<Vec<_>>().join(" | ")
            )));
        }

        let bytes = std::fs::read(&output_path)?;
        debug!(bytes = bytes.len(), "Transcode finished");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mp4_args() {
        let args = FfmpegTranscoder::args(
            Path::new("video.webm"),
            Path::new("video.mp4"),
            ContainerFormat::Mp4,
        );
        assert_eq!(
            args,
            [
                "-y",
                "-i",
                "video.webm",
                "-c:v",
                "libx264",
                "-c:a",
                "aac",
                "-b:a",
                "192k",
                "-strict",
                "experimental",
                "video.mp4"
            ]
        );
    }

    #[test]
    fn test_same_container_passes_through() {
        let transcoder = FfmpegTranscoder::new("/nonexistent/ffmpeg");
        let out = transcoder
            .transcode(b"abc", ContainerFormat::Webm, ContainerFormat::Webm)
            .unwrap();
        assert_eq!(out, b"abc");
    }

    #[test]
    fn test_missing_binary_is_encoder_error() {
        let transcoder = FfmpegTranscoder::new("/nonexistent/ffmpeg");
        assert!(!transcoder.is_available());
        let err = transcoder
            .transcode(b"abc", ContainerFormat::Webm, ContainerFormat::Mp4)
            .unwrap_err();
        assert!(matches!(err, EditorError::Encoder(_)));
    }

    #[test]
    fn test_failed_transcode_leaves_no_scratch_dir() {
        let root = tempfile::tempdir().unwrap();
        let transcoder =
            FfmpegTranscoder::new("/nonexistent/ffmpeg").with_scratch_root(root.path());
        transcoder
            .transcode(b"abc", ContainerFormat::Webm, ContainerFormat::Mp4)
            .unwrap_err();
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }
}
