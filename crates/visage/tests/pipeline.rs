use approx::assert_relative_eq;
use glam::DVec3;

use visage::align::RigidPose;
use visage::morph::{MorphableModel, MorphableModelData, NUM_EXPR_COEFFS, NUM_PARAMS, NUM_SHAPE_COEFFS};
use visage::pose::{DetectionBox, FaceTracker, FrameSize, TrackId};

/// Cube corners used both as the tracker reference and, mapped back into
/// crop space, as the synthetic model's mean shape.
fn reference_cloud() -> Vec<[f64; 3]> {
    let mut points = Vec::new();
    for x in [-0.5, 0.5] {
        for y in [-0.5, 0.5] {
            for z in [-0.5, 0.5] {
                points.push([x, y, z]);
            }
        }
    }
    points
}

/// A model whose zero-parameter decode reproduces the reference cloud.
fn synthetic_model() -> MorphableModel {
    let reference = reference_cloud();
    let mut mean_shape = Vec::with_capacity(reference.len() * 3);
    for point in &reference {
        for v in point {
            // invert the (w / 120) * 2 - 1 output normalization
            mean_shape.push((v + 1.0) * 60.0);
        }
    }

    let mut param_mean = vec![0.0; NUM_PARAMS];
    param_mean[0] = 1.0;
    param_mean[5] = 1.0;
    param_mean[10] = 1.0;

    let n3 = mean_shape.len();
    MorphableModel::new(MorphableModelData {
        mean_shape,
        shape_basis: vec![0.0; n3 * NUM_SHAPE_COEFFS],
        expr_basis: vec![0.0; n3 * NUM_EXPR_COEFFS],
        param_mean,
        param_std: vec![1.0; NUM_PARAMS],
    })
    .unwrap()
}

const FRAME: FrameSize = FrameSize {
    width: 640.0,
    height: 480.0,
};

const BOX: DetectionBox = DetectionBox {
    x: 100.0,
    y: 50.0,
    width: 200.0,
    height: 100.0,
};

#[test]
fn decode_solve_compose_roundtrip() {
    let model = synthetic_model();
    let mut tracker = FaceTracker::new(reference_cloud(), FRAME).unwrap();

    // frame 1: the decoded landmarks coincide with the reference, so the
    // solve stays at the identity pose and the placement reduces to the
    // crop rescale
    let landmarks = model.decode(&vec![0.0; NUM_PARAMS]).unwrap();
    assert_eq!(landmarks.len(), model.num_points());
    for (landmark, reference) in landmarks.iter().zip(tracker.reference()) {
        for (l, r) in landmark.iter().zip(reference.iter()) {
            assert_relative_eq!(l, r, epsilon = 1e-12);
        }
    }

    let placement = tracker.update_track(TrackId(0), &landmarks, &BOX).unwrap();
    assert_eq!(*tracker.pose(TrackId(0)).unwrap(), RigidPose::IDENTITY);

    // margin-expanded box is (80, 30, 240, 140) on the 640x480 frame
    let corner = placement.transform_point3(DVec3::new(-1.0, -1.0, 0.0));
    assert_relative_eq!(corner.x, -0.75, epsilon = 1e-12);
    assert_relative_eq!(corner.y, 310.0 / 480.0 * 2.0 - 1.0, epsilon = 1e-12);

    // frame 2: the face moves 6 crop pixels along x (0.1 in model space);
    // ten warm iterations pull the pose most of the way there
    let mut raw = vec![0.0; NUM_PARAMS];
    raw[3] = 6.0;
    let moved = model.decode(&raw).unwrap();
    tracker.update_track(TrackId(0), &moved, &BOX).unwrap();

    let pose = tracker.pose(TrackId(0)).unwrap();
    assert!(
        pose.translation[0] > 0.05 && pose.translation[0] < 0.11,
        "warm start should move toward the 0.1 offset, got {}",
        pose.translation[0]
    );
    assert_relative_eq!(pose.translation[1], 0.0, epsilon = 1e-9);
    assert_relative_eq!(pose.scale, 1.0, epsilon = 1e-9);
}

#[test]
fn track_lifecycle_resets_warm_start() {
    let model = synthetic_model();
    let mut tracker = FaceTracker::new(reference_cloud(), FRAME).unwrap();
    let landmarks = model.decode(&vec![0.0; NUM_PARAMS]).unwrap();

    tracker.update_track(TrackId(0), &landmarks, &BOX).unwrap();
    assert!(tracker.pose(TrackId(0)).is_some());

    // the face disappears for one frame; its state is dropped
    tracker.begin_frame(&[]);
    assert!(tracker.pose(TrackId(0)).is_none());
}
