use glam::DMat4;

use visage_align::{fit_pose, AlignError, RigidPose, SolverParams};

use crate::compose::{compose_placement, DetectionBox, FrameSize, DEFAULT_MARGIN};
use crate::tracks::{TrackId, TrackRegistry};

/// Error type for the face tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The reference point cloud must not be empty.
    #[error("reference point cloud is empty")]
    EmptyReference,

    /// The pose solve failed.
    #[error(transparent)]
    Align(#[from] AlignError),
}

/// Per-frame face pose tracking pipeline.
///
/// Owns the fixed reference point set, the solver parameters and the
/// per-track warm-start registry; each call to [`FaceTracker::update_track`]
/// runs one solve for one face and returns its placement transform.
///
/// Processing is synchronous and sequential per frame. Tracks share no
/// mutable state with each other beyond their registry slots, so callers
/// wanting parallelism can run one tracker per thread partition.
#[derive(Debug)]
pub struct FaceTracker {
    reference: Vec<[f64; 3]>,
    params: SolverParams,
    margin: f64,
    frame: FrameSize,
    registry: TrackRegistry,
}

impl FaceTracker {
    /// Create a tracker for the given reference point set and frame size.
    ///
    /// # Arguments
    ///
    /// * `reference` - Source point cloud the solver maps onto each face,
    ///   index-corresponding with decoded landmarks.
    /// * `frame` - Source frame dimensions in pixels.
    pub fn new(reference: Vec<[f64; 3]>, frame: FrameSize) -> Result<Self, TrackerError> {
        if reference.is_empty() {
            return Err(TrackerError::EmptyReference);
        }
        Ok(Self {
            reference,
            params: SolverParams::default(),
            margin: DEFAULT_MARGIN,
            frame,
            registry: TrackRegistry::new(),
        })
    }

    /// Replace the solver parameters.
    pub fn with_params(mut self, params: SolverParams) -> Self {
        self.params = params;
        self
    }

    /// Replace the crop margin.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Start a new frame: retire tracks that are no longer detected.
    ///
    /// # Arguments
    ///
    /// * `active` - Ids of all faces detected in the incoming frame.
    pub fn begin_frame(&mut self, active: &[TrackId]) {
        let retired = self.registry.sync(active);
        if !retired.is_empty() {
            log::debug!("retired {} track(s)", retired.len());
        }
    }

    /// Solve one face's pose and compose its placement transform.
    ///
    /// Warm-starts from the track's previous pose when one exists, and
    /// records the new pose as the seed for the next frame.
    ///
    /// # Arguments
    ///
    /// * `id` - Stable id of the tracked face.
    /// * `target` - Decoded landmarks for this face, index-corresponding
    ///   with the reference cloud.
    /// * `detection` - Detection box the landmarks were decoded from.
    ///
    /// # Returns
    ///
    /// The 4x4 placement transform for the renderer.
    pub fn update_track(
        &mut self,
        id: TrackId,
        target: &[[f64; 3]],
        detection: &DetectionBox,
    ) -> Result<DMat4, TrackerError> {
        let seed = self.registry.seed(id).copied();
        log::debug!(
            "track {:?}: {} solve",
            id,
            if seed.is_some() { "warm" } else { "cold" }
        );

        let pose = fit_pose(&self.reference, target, seed.as_ref(), &self.params)?;
        self.registry.record(id, pose);

        Ok(compose_placement(&pose, detection, self.margin, &self.frame))
    }

    /// The last solved pose of a track, if it is active.
    pub fn pose(&self, id: TrackId) -> Option<&RigidPose> {
        self.registry.seed(id)
    }

    /// The reference point set the tracker aligns against.
    pub fn reference(&self) -> &[[f64; 3]] {
        &self.reference
    }
}
