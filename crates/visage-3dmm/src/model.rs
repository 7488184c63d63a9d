use crate::error::ModelError;

/// Length of the raw parameter vector produced by the upstream network.
pub const NUM_PARAMS: usize = 62;

/// Leading parameters holding the 3x4 pose matrix.
pub const NUM_POSE_PARAMS: usize = 12;

/// Number of shape basis coefficients.
pub const NUM_SHAPE_COEFFS: usize = 40;

/// Number of expression basis coefficients.
pub const NUM_EXPR_COEFFS: usize = 10;

/// Side of the square crop the network consumes, in pixels.
pub const CROP_SIZE: f64 = 120.0;

/// Landmark count of the reference face model.
pub const NUM_LANDMARKS: usize = 68;

/// Raw arrays of a morphable model asset.
///
/// All matrices are stored flat in row-major order. `mean_shape` has `3 * N`
/// entries laid out point-major: landmark `n` occupies indices `3n..3n + 3`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, bincode::Encode, bincode::Decode)]
pub struct MorphableModelData {
    /// Mean face shape, `3 * N` values.
    pub mean_shape: Vec<f64>,
    /// Shape basis, `3 * N` rows by 40 columns.
    pub shape_basis: Vec<f64>,
    /// Expression basis, `3 * N` rows by 10 columns.
    pub expr_basis: Vec<f64>,
    /// Per-parameter standardization mean, 62 values.
    pub param_mean: Vec<f64>,
    /// Per-parameter standardization deviation, 62 values.
    pub param_std: Vec<f64>,
}

/// A validated 3D morphable face model.
///
/// Immutable once constructed; loaded once per process and shared by every
/// decode.
#[derive(Debug, Clone)]
pub struct MorphableModel {
    data: MorphableModelData,
    num_points: usize,
}

impl MorphableModel {
    /// Validate raw asset data and build a model.
    ///
    /// All array dimensions are checked against the landmark count implied
    /// by the mean shape, so a truncated or mismatched asset fails here
    /// rather than producing wrong-shaped output later.
    pub fn new(data: MorphableModelData) -> Result<Self, ModelError> {
        let n3 = data.mean_shape.len();
        if n3 == 0 || n3 % 3 != 0 {
            return Err(ModelError::InvalidMeanShape(n3));
        }
        if data.shape_basis.len() != n3 * NUM_SHAPE_COEFFS {
            return Err(ModelError::BasisShapeMismatch {
                name: "shape",
                found: data.shape_basis.len(),
                expected: n3 * NUM_SHAPE_COEFFS,
            });
        }
        if data.expr_basis.len() != n3 * NUM_EXPR_COEFFS {
            return Err(ModelError::BasisShapeMismatch {
                name: "expression",
                found: data.expr_basis.len(),
                expected: n3 * NUM_EXPR_COEFFS,
            });
        }
        if data.param_mean.len() != NUM_PARAMS {
            return Err(ModelError::StandardizationShapeMismatch {
                name: "parameter mean",
                found: data.param_mean.len(),
                expected: NUM_PARAMS,
            });
        }
        if data.param_std.len() != NUM_PARAMS {
            return Err(ModelError::StandardizationShapeMismatch {
                name: "parameter deviation",
                found: data.param_std.len(),
                expected: NUM_PARAMS,
            });
        }
        Ok(Self {
            num_points: n3 / 3,
            data,
        })
    }

    /// Number of landmarks produced per decode.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Borrow the underlying raw arrays.
    pub fn data(&self) -> &MorphableModelData {
        &self.data
    }

    /// Decode a raw 62-value parameter vector into `N` landmarks.
    ///
    /// The parameters are destandardized (`p = raw * std + mean`), split
    /// into a 3x4 pose block, 40 shape coefficients and 10 expression
    /// coefficients, and applied to the basis model:
    ///
    /// `vertex_n = R * base_n + T` with
    /// `base = mean_shape + shape_basis * alpha + expr_basis * beta`.
    ///
    /// Output coordinates are mapped from the `[0, 120]` crop space into
    /// `[-1, 1]`. Degenerate (NaN) parameters propagate unchanged.
    ///
    /// # Arguments
    ///
    /// * `raw` - Raw network output, 62 values.
    ///
    /// # Returns
    ///
    /// One `[x, y, z]` triple per landmark.
    pub fn decode(&self, raw: &[f64]) -> Result<Vec<[f64; 3]>, ModelError> {
        if raw.len() != NUM_PARAMS {
            return Err(ModelError::InvalidParameterCount(raw.len(), NUM_PARAMS));
        }

        // destandardize
        let mut p = [0.0f64; NUM_PARAMS];
        for (i, v) in p.iter_mut().enumerate() {
            *v = raw[i] * self.data.param_std[i] + self.data.param_mean[i];
        }

        // pose block: 3x4 row-major, rotation in columns 0-2, translation
        // in column 3
        let mut rotation = [[0.0f64; 3]; 3];
        let mut translation = [0.0f64; 3];
        for i in 0..3 {
            rotation[i].copy_from_slice(&p[4 * i..4 * i + 3]);
            translation[i] = p[4 * i + 3];
        }

        let alpha = &p[NUM_POSE_PARAMS..NUM_POSE_PARAMS + NUM_SHAPE_COEFFS];
        let beta = &p[NUM_POSE_PARAMS + NUM_SHAPE_COEFFS..];

        // base = mean_shape + shape_basis * alpha + expr_basis * beta
        let n3 = self.data.mean_shape.len();
        let mut base = self.data.mean_shape.clone();
        {
            let mut base_col = faer::mat::from_column_major_slice_mut(&mut base, n3, 1);
            faer::linalg::matmul::matmul(
                &mut base_col,
                faer::mat::from_row_major_slice(&self.data.shape_basis, n3, NUM_SHAPE_COEFFS),
                faer::mat::from_row_major_slice(alpha, NUM_SHAPE_COEFFS, 1),
                Some(1.0),
                1.0,
                faer::Parallelism::None,
            );
            faer::linalg::matmul::matmul(
                &mut base_col,
                faer::mat::from_row_major_slice(&self.data.expr_basis, n3, NUM_EXPR_COEFFS),
                faer::mat::from_row_major_slice(beta, NUM_EXPR_COEFFS, 1),
                Some(1.0),
                1.0,
                faer::Parallelism::None,
            );
        }

        // the flat base vector is point-major: landmark n lives at indices
        // 3n..3n + 3, NOT at a channel-major offset
        let mut vertices = vec![[0.0f64; 3]; self.num_points];
        for (n, vertex) in vertices.iter_mut().enumerate() {
            let b = [base[3 * n], base[3 * n + 1], base[3 * n + 2]];
            for i in 0..3 {
                let w = rotation[i][0] * b[0]
                    + rotation[i][1] * b[1]
                    + rotation[i][2] * b[2]
                    + translation[i];
                // map the [0, CROP_SIZE] crop space into [-1, 1]
                vertex[i] = (w / CROP_SIZE) * 2.0 - 1.0;
            }
        }

        Ok(vertices)
    }
}
