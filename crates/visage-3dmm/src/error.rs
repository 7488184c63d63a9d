/// Error types for the morphable model crate.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Failed to read or write a model asset.
    #[error("Failed to access model asset")]
    Io(#[from] std::io::Error),

    /// Failed to decode a model asset.
    #[error("Failed to decode model asset")]
    Decode(#[from] bincode::error::DecodeError),

    /// Failed to encode a model asset.
    #[error("Failed to encode model asset")]
    Encode(#[from] bincode::error::EncodeError),

    /// The mean shape must hold three values per landmark.
    #[error("mean shape length ({0}) is not a non-zero multiple of 3")]
    InvalidMeanShape(usize),

    /// A basis matrix does not match the landmark count.
    #[error("{name} basis has {found} values, expected {expected}")]
    BasisShapeMismatch {
        /// Which basis failed validation.
        name: &'static str,
        /// Number of values found in the asset.
        found: usize,
        /// Number of values implied by the mean shape.
        expected: usize,
    },

    /// A standardization vector must hold one entry per parameter.
    #[error("{name} vector has {found} values, expected {expected}")]
    StandardizationShapeMismatch {
        /// Which vector failed validation.
        name: &'static str,
        /// Number of values found in the asset.
        found: usize,
        /// Expected parameter count.
        expected: usize,
    },

    /// The raw parameter vector has the wrong length.
    #[error("raw parameter vector has {0} values, expected {1}")]
    InvalidParameterCount(usize, usize),
}
