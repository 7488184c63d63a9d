use glam::{DMat3, DMat4, DVec3};

use visage_align::mat3::det_and_cofactor;
use visage_align::RigidPose;

/// Margin in pixels added around a detection box before cropping, on a
/// 640x480 source. Detector boxes are tight around the face; the crop needs
/// some forehead and chin context.
pub const DEFAULT_MARGIN: f64 = 20.0;

/// Face detection box in source-image pixel coordinates, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionBox {
    /// Left edge in pixels.
    pub x: f64,
    /// Top edge in pixels.
    pub y: f64,
    /// Box width in pixels.
    pub width: f64,
    /// Box height in pixels.
    pub height: f64,
}

/// Pixel dimensions of the source video frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSize {
    /// Frame width in pixels.
    pub width: f64,
    /// Frame height in pixels.
    pub height: f64,
}

/// A detection box expanded symmetrically by a margin.
///
/// The same rectangle feeds the crop handed to the upstream network, the
/// landmark overlay projection, and the placement rescale, so they all stay
/// registered with each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropBox {
    /// Left edge in pixels.
    pub x: f64,
    /// Top edge in pixels.
    pub y: f64,
    /// Crop width in pixels.
    pub width: f64,
    /// Crop height in pixels.
    pub height: f64,
}

impl CropBox {
    /// Expand a detection box by `margin` pixels on every side.
    pub fn from_detection(detection: &DetectionBox, margin: f64) -> Self {
        Self {
            x: detection.x - margin,
            y: detection.y - margin,
            width: detection.width + 2.0 * margin,
            height: detection.height + 2.0 * margin,
        }
    }
}

/// Split accumulated determinant drift out of a solved pose.
///
/// Unconstrained gradient steps let `det R` wander off 1; the sign-preserving
/// cube root `m = cbrt(det R)` moves that drift into the scale (`s' = s * m`)
/// and leaves a unit-determinant rotation (`R' = R / m`). A no-op when
/// `det R == 1`. A near-zero determinant divides by a near-zero `m`; that
/// degenerate case is left to the caller, like solver divergence.
pub fn normalize_pose(pose: &RigidPose) -> RigidPose {
    let (det, _) = det_and_cofactor(&pose.rotation);
    let m = det.cbrt();

    let mut rotation = pose.rotation;
    for row in rotation.iter_mut() {
        for v in row.iter_mut() {
            *v /= m;
        }
    }

    RigidPose {
        rotation,
        translation: pose.translation,
        scale: pose.scale * m,
    }
}

/// Compose the final placement transform for a tracked face.
///
/// The solved pose is determinant-normalized, turned into a model transform
/// `translate(T) * scale(s') * rotate(R')`, and mapped from the canonical
/// `[-1, 1]^3` model space into the frame-normalized sub-rectangle of the
/// margin-expanded detection box.
///
/// # Arguments
///
/// * `pose` - Solved pose from the aligner.
/// * `detection` - Detection box in source-image pixels.
/// * `margin` - Crop margin in pixels.
/// * `frame` - Source frame dimensions in pixels.
///
/// # Returns
///
/// The 4x4 placement transform handed to the renderer.
pub fn compose_placement(
    pose: &RigidPose,
    detection: &DetectionBox,
    margin: f64,
    frame: &FrameSize,
) -> DMat4 {
    let crop = CropBox::from_detection(detection, margin);
    rescale_matrix(&crop, frame) * model_matrix(&normalize_pose(pose))
}

fn model_matrix(pose: &RigidPose) -> DMat4 {
    let r = &pose.rotation;
    let rotation = DMat3::from_cols(
        DVec3::new(r[0][0], r[1][0], r[2][0]),
        DVec3::new(r[0][1], r[1][1], r[2][1]),
        DVec3::new(r[0][2], r[1][2], r[2][2]),
    );
    let t = pose.translation;

    DMat4::from_translation(DVec3::new(t[0], t[1], t[2]))
        * DMat4::from_scale(DVec3::splat(pose.scale))
        * DMat4::from_mat3(rotation)
}

/// Map `[-1, 1]^3` into the frame-normalized crop rectangle.
///
/// The vertical axis flips between the model convention (origin-centered,
/// y up) and the image convention (origin top-left, y down). Depth has no
/// pixel extent of its own and uses the mean of the horizontal and vertical
/// scales.
fn rescale_matrix(crop: &CropBox, frame: &FrameSize) -> DMat4 {
    let scale_x = crop.width / frame.width;
    let scale_y = crop.height / frame.height;
    let scale_z = (scale_x + scale_y) / 2.0;

    let offset_x = crop.x / frame.width;
    // y flips in image space
    let offset_y = (frame.height - crop.height - crop.y) / frame.height;

    DMat4::from_translation(DVec3::new(-1.0, -1.0, -1.0))
        * DMat4::from_scale(DVec3::splat(2.0))
        * DMat4::from_translation(DVec3::new(offset_x, offset_y, 0.0))
        * DMat4::from_scale(DVec3::new(scale_x, scale_y, scale_z))
        * DMat4::from_scale(DVec3::splat(0.5))
        * DMat4::from_translation(DVec3::new(1.0, 1.0, 1.0))
}

/// Project decoded `[-1, 1]` landmarks into source-image pixel coordinates.
///
/// Useful for drawing landmark overlays on top of the video frame.
///
/// # Arguments
///
/// * `vertices` - Decoded landmarks in `[-1, 1]` crop space.
/// * `detection` - Detection box the landmarks were decoded from.
/// * `margin` - Crop margin in pixels.
///
/// # Returns
///
/// One `[x, y]` pixel position per landmark.
pub fn project_to_frame(
    vertices: &[[f64; 3]],
    detection: &DetectionBox,
    margin: f64,
) -> Vec<[f64; 2]> {
    let crop = CropBox::from_detection(detection, margin);
    vertices
        .iter()
        .map(|v| {
            let vx = (v[0] + 1.0) / 2.0;
            // y is inverted for the image default basis
            let vy = (-v[1] + 1.0) / 2.0;
            [vx * crop.width + crop.x, vy * crop.height + crop.y]
        })
        .collect()
}
