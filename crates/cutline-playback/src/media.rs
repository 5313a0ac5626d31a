//! Backing media elements and playhead resync.
//!
//! Video and audio elements carry their own clocks. After every playhead
//! change the resync routines pull them back in line: pause outside the
//! element's range, play inside it while playback runs, and hard-seek when
//! the media clock has drifted past [`DRIFT_THRESHOLD_SECS`].

use cutline_core::{EditorError, Result};
use cutline_timeline::{ElementId, ElementKind, ElementModel};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Drift (seconds) tolerated before a media clock is force-set.
pub const DRIFT_THRESHOLD_SECS: f64 = 0.2;

/// A video or audio element with its own playback clock.
pub trait MediaElement {
    fn id(&self) -> &str;

    /// Start playback. May be rejected by the host.
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    /// Media clock in seconds.
    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    /// Length in seconds.
    fn duration(&self) -> f64;

    fn is_paused(&self) -> bool;

    /// Whether a seek is still in flight.
    fn is_seeking(&self) -> bool;
}

/// Owner of the backing media elements, addressed by id.
pub trait MediaHost {
    fn get(&self, id: &str) -> Option<&dyn MediaElement>;

    fn get_mut(&mut self, id: &str) -> Option<&mut dyn MediaElement>;

    /// Allocate a fresh element playing the same source as `id`, returning
    /// the new id.
    fn duplicate(&mut self, id: &str) -> Result<String>;
}

/// In-memory media element with a manually advanced clock.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessMedia {
    id: String,
    src: String,
    duration: f64,
    current_time: f64,
    paused: bool,
    seeking: bool,
    reject_play: bool,
    play_count: u32,
    seek_count: u32,
}

impl HeadlessMedia {
    pub fn new(id: impl Into<String>, src: impl Into<String>, duration: f64) -> Self {
        Self {
            id: id.into(),
            src: src.into(),
            duration,
            current_time: 0.0,
            paused: true,
            seeking: false,
            reject_play: false,
            play_count: 0,
            seek_count: 0,
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    /// Make subsequent `play` calls fail, as an autoplay policy would.
    pub fn set_reject_play(&mut self, reject: bool) {
        self.reject_play = reject;
    }

    pub fn set_seeking(&mut self, seeking: bool) {
        self.seeking = seeking;
    }

    /// Successful `play` calls so far.
    pub fn play_count(&self) -> u32 {
        self.play_count
    }

    /// Writes to `current_time` so far.
    pub fn seek_count(&self) -> u32 {
        self.seek_count
    }

    /// Move the clock forward as if `seconds` had played.
    pub fn advance(&mut self, seconds: f64) {
        if !self.paused {
            self.current_time = (self.current_time + seconds).min(self.duration);
        }
    }
}

impl MediaElement for HeadlessMedia {
    fn id(&self) -> &str {
        &self.id
    }

    fn play(&mut self) -> Result<()> {
        if self.reject_play {
            return Err(EditorError::ExternalLoad(format!(
                "play rejected for {}",
                self.id
            )));
        }
        self.paused = false;
        self.play_count += 1;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds.clamp(0.0, self.duration.max(0.0));
        self.seek_count += 1;
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_seeking(&self) -> bool {
        self.seeking
    }
}

/// In-memory [`MediaHost`].
#[derive(Debug, Clone, Default)]
pub struct HeadlessMediaHost {
    elements: HashMap<String, HeadlessMedia>,
    next_copy: u32,
}

impl HeadlessMediaHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, media: HeadlessMedia) {
        self.elements.insert(media.id.clone(), media);
    }

    pub fn media(&self, id: &str) -> Option<&HeadlessMedia> {
        self.elements.get(id)
    }

    pub fn media_mut(&mut self, id: &str) -> Option<&mut HeadlessMedia> {
        self.elements.get_mut(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Advance every playing element's clock.
    pub fn advance_all(&mut self, seconds: f64) {
        for media in self.elements.values_mut() {
            media.advance(seconds);
        }
    }
}

impl MediaHost for HeadlessMediaHost {
    fn get(&self, id: &str) -> Option<&dyn MediaElement> {
        self.elements.get(id).map(|m| m as &dyn MediaElement)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut dyn MediaElement> {
        self.elements
            .get_mut(id)
            .map(|m| m as &mut dyn MediaElement)
    }

    fn duplicate(&mut self, id: &str) -> Result<String> {
        let source = self
            .elements
            .get(id)
            .ok_or_else(|| EditorError::ResourceMissing(format!("media element {id}")))?;
        self.next_copy += 1;
        let copy_id = format!("{id}-copy{}", self.next_copy);
        let copy = HeadlessMedia::new(copy_id.clone(), source.src.clone(), source.duration);
        self.elements.insert(copy_id.clone(), copy);
        Ok(copy_id)
    }
}

/// Bring every video element in line with the playhead.
///
/// Elements whose backing media cannot be found are skipped.
pub fn resync_video<H: MediaHost + ?Sized>(
    model: &ElementModel,
    host: &mut H,
    playhead_ms: f64,
    playing: bool,
) {
    for element in model.iter().filter(|e| e.kind() == ElementKind::Video) {
        let Some(media_id) = element.media_id() else {
            continue;
        };
        let Some(video) = host.get_mut(media_id) else {
            debug!(element = %element.id, media = media_id, "Video element missing");
            continue;
        };

        if !element.time_frame.contains_half_open(playhead_ms) {
            if !video.is_paused() {
                video.pause();
            }
            continue;
        }

        let expected = ((playhead_ms - element.time_frame.start) / 1000.0).max(0.0);
        if !video.is_seeking() && (video.current_time() - expected).abs() > DRIFT_THRESHOLD_SECS {
            video.set_current_time(expected);
        }
        if playing {
            if video.is_paused() {
                if let Err(e) = video.play() {
                    warn!(element = %element.id, error = %e, "Error playing video");
                }
            }
        } else if !video.is_paused() {
            video.pause();
        }
    }
}

/// Start or stop audio elements as the playhead enters or leaves them.
///
/// `playing_audio` records which audio elements were started so that an
/// element is not restarted on every frame. An element whose `play` is
/// rejected still counts as started: it stays silent, with a warning, until
/// the playhead leaves its range or playback stops.
pub fn resync_audio<H: MediaHost + ?Sized>(
    model: &ElementModel,
    host: &mut H,
    playhead_ms: f64,
    playing: bool,
    playing_audio: &mut HashSet<ElementId>,
) {
    for element in model.iter().filter(|e| e.kind() == ElementKind::Audio) {
        let Some(media_id) = element.media_id() else {
            continue;
        };
        let Some(audio) = host.get_mut(media_id) else {
            debug!(element = %element.id, media = media_id, "Audio element missing");
            continue;
        };

        let active = playing && element.time_frame.contains_half_open(playhead_ms);
        let started = playing_audio.contains(&element.id);
        if active && !started {
            audio.set_current_time(((playhead_ms - element.time_frame.start) / 1000.0).max(0.0));
            if let Err(e) = audio.play() {
                warn!(element = %element.id, error = %e, "Audio play rejected, not retrying");
            }
            playing_audio.insert(element.id);
        } else if !active && started {
            audio.pause();
            audio.set_current_time(0.0);
            playing_audio.remove(&element.id);
        }
    }
    playing_audio.retain(|id| model.get(*id).is_some());
}
