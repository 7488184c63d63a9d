use std::collections::HashMap;

use visage_align::RigidPose;

/// Stable identifier of a tracked face.
///
/// Identity assignment (matching detections across frames) happens upstream;
/// the registry only requires that an id keeps meaning the same face for as
/// long as it stays active. Callers without a matcher can fall back to
/// positional indices, accepting that poses may jump between faces when the
/// detection order changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(
    /// Opaque numeric id assigned by the upstream matcher.
    pub u64,
);

/// Per-track warm-start state.
///
/// Holds the last solved pose of every active track. A pose seeds the next
/// frame's solve for its track; a track with no stored pose gets a cold
/// start.
#[derive(Debug, Clone, Default)]
pub struct TrackRegistry {
    poses: HashMap<TrackId, RigidPose>,
}

impl TrackRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile the registry with the set of currently detected tracks.
    ///
    /// Tracks absent from `active` are retired and their state dropped, so a
    /// face that reappears under the same id starts cold rather than from a
    /// stale pose. New ids need no explicit admission; they simply have no
    /// seed until their first solve is recorded.
    ///
    /// # Returns
    ///
    /// The ids that were retired.
    pub fn sync(&mut self, active: &[TrackId]) -> Vec<TrackId> {
        let retired: Vec<TrackId> = self
            .poses
            .keys()
            .filter(|id| !active.contains(id))
            .copied()
            .collect();
        for id in &retired {
            self.poses.remove(id);
        }
        retired
    }

    /// The warm-start seed for a track, if one exists.
    pub fn seed(&self, id: TrackId) -> Option<&RigidPose> {
        self.poses.get(&id)
    }

    /// Record a track's solved pose as the seed for its next frame.
    pub fn record(&mut self, id: TrackId, pose: RigidPose) {
        self.poses.insert(id, pose);
    }

    /// Whether a track currently has state.
    pub fn contains(&self, id: TrackId) -> bool {
        self.poses.contains_key(&id)
    }

    /// Number of tracks with state.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Whether no track has state.
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_track_has_no_seed() {
        let registry = TrackRegistry::new();
        assert!(registry.seed(TrackId(0)).is_none());
    }

    #[test]
    fn test_record_and_seed() {
        let mut registry = TrackRegistry::new();
        let pose = RigidPose {
            scale: 2.0,
            ..RigidPose::IDENTITY
        };
        registry.record(TrackId(3), pose);
        assert_eq!(registry.seed(TrackId(3)), Some(&pose));
        assert!(registry.seed(TrackId(4)).is_none());
    }

    #[test]
    fn test_sync_retires_missing_tracks() {
        let mut registry = TrackRegistry::new();
        registry.record(TrackId(0), RigidPose::IDENTITY);
        registry.record(TrackId(1), RigidPose::IDENTITY);
        registry.record(TrackId(2), RigidPose::IDENTITY);

        let retired = registry.sync(&[TrackId(0), TrackId(2), TrackId(5)]);

        assert_eq!(retired, vec![TrackId(1)]);
        assert!(registry.contains(TrackId(0)));
        assert!(!registry.contains(TrackId(1)));
        assert!(registry.contains(TrackId(2)));
        // an active id without state is not admitted eagerly
        assert!(!registry.contains(TrackId(5)));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_reappearing_track_starts_cold() {
        let mut registry = TrackRegistry::new();
        registry.record(TrackId(7), RigidPose::IDENTITY);
        registry.sync(&[]);
        registry.sync(&[TrackId(7)]);
        assert!(registry.seed(TrackId(7)).is_none());
    }
}
