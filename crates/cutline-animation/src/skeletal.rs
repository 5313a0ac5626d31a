//! Skeletal SVG animation: per-part rotation tables.
//!
//! Each table lists rotation key values for named SVG sub-parts. Keys are
//! spread evenly over the cycle and interpolated linearly. The playback path
//! ([`SkeletalBatch`]) evaluates keyframe tracks built from the tables, the
//! seek path ([`sync_skeleton`]) calls [`angle_at`] directly; both yield the
//! same pose for the same elapsed time.

use cutline_core::{EditorError, KeyframeTrack, Result};
use cutline_timeline::{ObjectId, RenderSurface, SkeletalKind};
use tracing::{debug, warn};

/// Rotation keys for one named part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartKeys {
    pub name: &'static str,
    pub keys: &'static [f64],
}

/// A looping set of part rotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkeletalTable {
    pub cycle_ms: f64,
    pub parts: &'static [PartKeys],
}

const ARM_FRONT: &[f64] = &[0.0, -10.44194, -15.853917, -4.174048];
const PALM_BACK: &[f64] = &[0.0, -0.994948, -2.292438, -1.028385];

pub const WALKING: SkeletalTable = SkeletalTable {
    cycle_ms: 1600.0,
    parts: &[
        PartKeys {
            name: "hand-details-front",
            keys: &[0.0, -19.945528, 29.397909, 1.978477],
        },
        PartKeys {
            name: "merged-hand-front",
            keys: ARM_FRONT,
        },
        PartKeys {
            name: "hand-palm",
            keys: ARM_FRONT,
        },
        PartKeys {
            name: "hand-details-back",
            keys: &[0.0, 29.699615, -14.933782, 1.489144],
        },
        PartKeys {
            name: "hand-p2_00000129907696714187617730000016419141933559297423_",
            keys: PALM_BACK,
        },
        PartKeys {
            name: "hand-palm_00000147905328332973391990000012213005386853756323_",
            keys: PALM_BACK,
        },
        PartKeys {
            name: "pant-front-details",
            keys: &[0.0, 4.340396, -25.392531, -2.970139],
        },
        PartKeys {
            name: "merged-path-front",
            keys: &[0.0, 18.0172, 18.953561, 1.219545],
        },
        PartKeys {
            name: "pant-back-details",
            keys: &[0.0, -12.022209, 17.310369, -0.896351],
        },
        PartKeys {
            name: "merged-path-back",
            keys: &[0.0, 6.426719, 11.916115, 0.923514],
        },
    ],
};

pub const HANDSTAND: SkeletalTable = SkeletalTable {
    cycle_ms: 3000.0,
    parts: &[
        PartKeys {
            name: "hand-details-back",
            keys: &[0.0, -52.081355, -94.55654, -151.389937, -60.488341, 2.015952],
        },
        PartKeys {
            name: "hand-details-front",
            keys: &[4.969917, -61.364093, -85.395581, -158.456814, -43.159225, 5.235948],
        },
    ],
};

/// Whole-group walk: slide right over `WALK_SLIDE_MS`, hold, snap back.
pub const WALK_DISTANCE: f64 = 300.0;
pub const WALK_SLIDE_MS: f64 = 10_000.0;
pub const WALK_CYCLE_MS: f64 = 10_500.0;

pub fn table(kind: SkeletalKind) -> &'static SkeletalTable {
    match kind {
        SkeletalKind::Walking => &WALKING,
        SkeletalKind::Handstand => &HANDSTAND,
    }
}

/// Rotation of a part `elapsed_ms` into the loop.
pub fn angle_at(keys: &[f64], cycle_ms: f64, elapsed_ms: f64) -> f64 {
    let Some(&first) = keys.first() else {
        return 0.0;
    };
    if keys.len() < 2 || cycle_ms <= 0.0 {
        return first;
    }
    let t = elapsed_ms.max(0.0) % cycle_ms;
    let segment = cycle_ms / (keys.len() - 1) as f64;
    let index = ((t / segment).floor() as usize).min(keys.len() - 2);
    let progress = (t - index as f64 * segment) / segment;
    keys[index] + (keys[index + 1] - keys[index]) * progress
}

/// Horizontal offset of a walking group `elapsed_ms` into the loop.
pub fn walking_offset(elapsed_ms: f64) -> f64 {
    let t = elapsed_ms.max(0.0) % WALK_CYCLE_MS;
    if t < WALK_SLIDE_MS {
        WALK_DISTANCE * (t / WALK_SLIDE_MS)
    } else {
        WALK_DISTANCE
    }
}

/// Keyframe track equivalent to one part's loop.
pub fn part_track(part: &PartKeys, cycle_ms: f64) -> KeyframeTrack {
    KeyframeTrack::evenly_spaced(part.keys, cycle_ms)
}

/// Pose an SVG group for `elapsed_ms` into its skeletal loop.
///
/// Missing parts are skipped with a warning; the rest are still posed.
pub fn sync_skeleton<S: RenderSurface + ?Sized>(
    surface: &mut S,
    group: ObjectId,
    kind: SkeletalKind,
    base_left: f64,
    elapsed_ms: f64,
) {
    let table = table(kind);
    if kind == SkeletalKind::Walking {
        if let Some(props) = surface.props_mut(group) {
            props.left = base_left + walking_offset(elapsed_ms);
        }
    }
    for part in table.parts {
        let Some(object) = surface.find_part(group, part.name) else {
            warn!(part = part.name, "Missing SVG part, skipping angle update");
            continue;
        };
        if let Some(props) = surface.props_mut(object) {
            props.angle = angle_at(part.keys, table.cycle_ms, elapsed_ms);
        }
    }
}

#[derive(Debug, Clone)]
struct PartTween {
    object: ObjectId,
    track: KeyframeTrack,
}

/// A running set of per-part tweens for one SVG group.
///
/// Created on play, paused on stop and explicitly cleared before a new batch
/// replaces it.
#[derive(Debug, Clone)]
pub struct SkeletalBatch {
    group: ObjectId,
    kind: SkeletalKind,
    base_left: f64,
    parts: Vec<PartTween>,
    started_at: f64,
    elapsed_at_pause: f64,
    running: bool,
}

impl SkeletalBatch {
    /// Build a batch for `group`, starting at wall-clock `now_ms`.
    pub fn start<S: RenderSurface + ?Sized>(
        surface: &S,
        group: ObjectId,
        kind: SkeletalKind,
        now_ms: f64,
    ) -> Result<Self> {
        let base_left = surface
            .props(group)
            .map(|p| p.left)
            .ok_or_else(|| EditorError::ResourceMissing(group.to_string()))?;
        let table = table(kind);
        let parts = table
            .parts
            .iter()
            .filter_map(|part| match surface.find_part(group, part.name) {
                Some(object) => Some(PartTween {
                    object,
                    track: part_track(part, table.cycle_ms),
                }),
                None => {
                    warn!(part = part.name, "Missing SVG part, skipping animation");
                    None
                }
            })
            .collect::<Vec<_>>();
        debug!(kind = ?kind, parts = parts.len(), "Skeletal batch started");
        Ok(Self {
            group,
            kind,
            base_left,
            parts,
            started_at: now_ms,
            elapsed_at_pause: 0.0,
            running: true,
        })
    }

    pub fn group(&self) -> ObjectId {
        self.group
    }

    pub fn kind(&self) -> SkeletalKind {
        self.kind
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn elapsed(&self, now_ms: f64) -> f64 {
        if self.running {
            now_ms - self.started_at
        } else {
            self.elapsed_at_pause
        }
    }

    pub fn pause(&mut self, now_ms: f64) {
        if self.running {
            self.elapsed_at_pause = now_ms - self.started_at;
            self.running = false;
        }
    }

    /// Advance every part to wall-clock `now_ms`. Paused batches do nothing.
    pub fn update<S: RenderSurface + ?Sized>(&self, surface: &mut S, now_ms: f64) {
        if !self.running {
            return;
        }
        let elapsed = self.elapsed(now_ms);
        let cycle = table(self.kind).cycle_ms;
        for part in &self.parts {
            if let Some(props) = surface.props_mut(part.object) {
                props.angle = part.track.evaluate(elapsed % cycle);
            }
        }
        if self.kind == SkeletalKind::Walking {
            if let Some(props) = surface.props_mut(self.group) {
                props.left = self.base_left + walking_offset(elapsed);
            }
        }
    }

    /// Put the group back where the batch found it.
    pub fn clear<S: RenderSurface + ?Sized>(self, surface: &mut S) {
        if self.kind == SkeletalKind::Walking {
            if let Some(props) = surface.props_mut(self.group) {
                props.left = self.base_left;
            }
        }
        debug!(kind = ?self.kind, "Skeletal batch cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cutline_timeline::{HeadlessSurface, ObjectProps, ObjectSpec};

    fn skeleton(surface: &mut HeadlessSurface, kind: SkeletalKind) -> ObjectId {
        let names: Vec<&str> = table(kind).parts.iter().map(|p| p.name).collect();
        surface.register_svg("figure.svg", &names);
        surface
            .create(
                ObjectSpec::Svg {
                    src: "figure.svg".into(),
                },
                ObjectProps::default(),
            )
            .unwrap()
    }

    #[test]
    fn test_angle_at_keys_and_midpoints() {
        let keys = WALKING.parts[0].keys;
        assert_eq!(angle_at(keys, 1600.0, 0.0), 0.0);
        let segment = 1600.0 / 3.0;
        assert!((angle_at(keys, 1600.0, segment) - keys[1]).abs() < 1e-9);
        let mid = angle_at(keys, 1600.0, segment / 2.0);
        assert!((mid - keys[1] / 2.0).abs() < 1e-9);
        assert_eq!(angle_at(keys, 1600.0, 1600.0), 0.0, "wraps to the start");
    }

    #[test]
    fn test_angle_at_matches_track() {
        for table in [&WALKING, &HANDSTAND] {
            for part in table.parts {
                let track = part_track(part, table.cycle_ms);
                for step in 0..50 {
                    let elapsed = step as f64 * 97.3;
                    let direct = angle_at(part.keys, table.cycle_ms, elapsed);
                    let tracked = track.evaluate(elapsed % table.cycle_ms);
                    assert!((direct - tracked).abs() < 1e-9, "{}", part.name);
                }
            }
        }
    }

    #[test]
    fn test_walking_offset() {
        assert_eq!(walking_offset(0.0), 0.0);
        assert_eq!(walking_offset(5000.0), 150.0);
        assert_eq!(walking_offset(10_200.0), 300.0);
        assert_eq!(walking_offset(10_500.0), 0.0);
    }

    #[test]
    fn test_batch_and_sync_agree() {
        let mut surface = HeadlessSurface::default();
        let group = skeleton(&mut surface, SkeletalKind::Walking);
        let mut seeked = surface.clone();

        let batch = SkeletalBatch::start(&surface, group, SkeletalKind::Walking, 1000.0).unwrap();
        assert_eq!(batch.part_count(), WALKING.parts.len());
        batch.update(&mut surface, 1000.0 + 2345.0);
        sync_skeleton(&mut seeked, group, SkeletalKind::Walking, 0.0, 2345.0);

        for part in WALKING.parts {
            let a = surface.find_part(group, part.name).unwrap();
            let b = seeked.find_part(group, part.name).unwrap();
            let (pa, pb) = (surface.props(a).unwrap(), seeked.props(b).unwrap());
            assert!((pa.angle - pb.angle).abs() < 1e-9);
        }
        assert_eq!(surface.props(group).unwrap().left, seeked.props(group).unwrap().left);
    }

    #[test]
    fn test_paused_batch_does_not_move() {
        let mut surface = HeadlessSurface::default();
        let group = skeleton(&mut surface, SkeletalKind::Handstand);
        let mut batch =
            SkeletalBatch::start(&surface, group, SkeletalKind::Handstand, 0.0).unwrap();
        batch.update(&mut surface, 400.0);
        let part = surface.find_part(group, "hand-details-back").unwrap();
        let before = surface.props(part).unwrap().angle;

        batch.pause(400.0);
        batch.update(&mut surface, 900.0);
        assert_eq!(surface.props(part).unwrap().angle, before);
        assert_eq!(batch.elapsed(5000.0), 400.0);
    }
}
