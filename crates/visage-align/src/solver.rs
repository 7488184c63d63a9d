use crate::mat3::{det_and_cofactor, matmul33, matvec3, transpose33, MAT3_IDENTITY};

/// Rigid pose mapping a source point cloud onto a target point cloud.
///
/// The rotation is not constrained to be orthonormal during optimization;
/// the regularization terms only keep it close to a proper rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidPose {
    /// Rotation matrix in row-major order.
    pub rotation: [[f64; 3]; 3],
    /// Translation vector.
    pub translation: [f64; 3],
    /// Uniform scale factor.
    pub scale: f64,
}

impl RigidPose {
    /// Identity pose: no rotation, zero translation, unit scale.
    pub const IDENTITY: Self = Self {
        rotation: MAT3_IDENTITY,
        translation: [0.0; 3],
        scale: 1.0,
    };
}

impl Default for RigidPose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Parameters of the gradient-descent pose solver.
#[derive(Debug, Clone)]
pub struct SolverParams {
    /// Fixed gradient-descent step size.
    pub step_size: f64,
    /// Weight of the orthogonality penalty `||R^T R - I||^2`.
    pub lambda_orth: f64,
    /// Weight of the proper-rotation penalty `(det R - 1)^2`.
    pub lambda_det: f64,
    /// Iterations to run when no seed pose is available.
    pub cold_iterations: usize,
    /// Iterations to run when continuing from a previous solution.
    pub warm_iterations: usize,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            step_size: 1e-2,
            lambda_orth: 1e-3,
            lambda_det: 1e-3,
            cold_iterations: 1000,
            warm_iterations: 10,
        }
    }
}

/// Error type for the pose solver.
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    /// Source and target clouds must be index-corresponding.
    #[error("source and target point counts differ ({0} vs {1})")]
    PointCountMismatch(usize, usize),

    /// Clouds must contain at least one point.
    #[error("point clouds are empty")]
    EmptyPointCloud,
}

struct Gradient {
    rotation: [[f64; 3]; 3],
    translation: [f64; 3],
    scale: f64,
}

/// Objective value and gradients at the current pose.
///
/// The objective is
/// `sum_n ||s*R*p_n + T - q_n||^2
///  + lambda_orth * ||R^T R - I||_F^2
///  + lambda_det * (det R - 1)^2`.
fn objective_gradient(
    source: &[[f64; 3]],
    target: &[[f64; 3]],
    pose: &RigidPose,
    params: &SolverParams,
) -> (f64, Gradient) {
    let mut grad = Gradient {
        rotation: [[0.0; 3]; 3],
        translation: [0.0; 3],
        scale: 0.0,
    };
    let mut loss = 0.0;

    for (p, q) in source.iter().zip(target.iter()) {
        let rp = matvec3(&pose.rotation, p);
        let mut resid = [0.0; 3];
        for i in 0..3 {
            resid[i] = pose.scale * rp[i] + pose.translation[i] - q[i];
        }
        for i in 0..3 {
            loss += resid[i] * resid[i];
            grad.translation[i] += 2.0 * resid[i];
            grad.scale += 2.0 * rp[i] * resid[i];
            for j in 0..3 {
                grad.rotation[i][j] += 2.0 * pose.scale * resid[i] * p[j];
            }
        }
    }

    // orthogonality penalty on R^T R - I
    let mut rt_r = [[0.0; 3]; 3];
    matmul33(&transpose33(&pose.rotation), &pose.rotation, &mut rt_r);
    let mut orth = rt_r;
    for (i, row) in orth.iter_mut().enumerate() {
        row[i] -= 1.0;
    }
    let mut orth_r = [[0.0; 3]; 3];
    matmul33(&orth, &pose.rotation, &mut orth_r);

    // proper-rotation penalty on det R - 1; the cofactor matrix is the
    // derivative of the determinant
    let (det, cofactor) = det_and_cofactor(&pose.rotation);

    for i in 0..3 {
        for j in 0..3 {
            loss += params.lambda_orth * orth[i][j] * orth[i][j];
            grad.rotation[i][j] += 4.0 * params.lambda_orth * orth_r[i][j]
                + 2.0 * params.lambda_det * (det - 1.0) * cofactor[i][j];
        }
    }
    loss += params.lambda_det * (det - 1.0) * (det - 1.0);

    (loss, grad)
}

/// Fit the rigid pose aligning `source` onto `target` by gradient descent.
///
/// The two clouds are index-corresponding: point `i` of `source` matches
/// point `i` of `target`. No correspondence search is performed.
///
/// A seed pose warm-starts the solve and switches the iteration count from
/// `cold_iterations` to `warm_iterations`; consecutive video frames are
/// assumed close enough that a few steps keep the pose locked on. Plain
/// fixed-step descent, no convergence test: degenerate geometry may diverge
/// silently and the caller owns detecting non-finite output.
///
/// # Arguments
///
/// * `source` - Reference point cloud to be mapped onto the target.
/// * `target` - Target point cloud.
/// * `seed` - Previous solution, if any.
/// * `params` - Solver parameters.
///
/// # Returns
///
/// The fitted pose, which also serves as the seed for the next frame.
pub fn fit_pose(
    source: &[[f64; 3]],
    target: &[[f64; 3]],
    seed: Option<&RigidPose>,
    params: &SolverParams,
) -> Result<RigidPose, AlignError> {
    if source.len() != target.len() {
        return Err(AlignError::PointCountMismatch(source.len(), target.len()));
    }
    if source.is_empty() {
        return Err(AlignError::EmptyPointCloud);
    }

    let mut pose = seed.copied().unwrap_or(RigidPose::IDENTITY);
    let iterations = if seed.is_some() {
        params.warm_iterations
    } else {
        params.cold_iterations
    };

    for iter in 0..iterations {
        let (loss, grad) = objective_gradient(source, target, &pose, params);
        log::debug!("iteration {}: objective {:.6}", iter, loss);

        for i in 0..3 {
            for j in 0..3 {
                pose.rotation[i][j] -= params.step_size * grad.rotation[i][j];
            }
            pose.translation[i] -= params.step_size * grad.translation[i];
        }
        pose.scale -= params.step_size * grad.scale;
    }

    Ok(pose)
}
