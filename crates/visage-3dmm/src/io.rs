use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::ModelError;
use crate::model::{MorphableModel, MorphableModelData};

/// Read a morphable model asset from a bincode-encoded binary file.
///
/// The asset holds the five raw arrays of [`MorphableModelData`]; the
/// returned model is dimension-validated, so a truncated or mismatched
/// asset fails fast.
///
/// # Arguments
///
/// * `path` - Path to the binary asset.
///
/// # Returns
///
/// The validated model.
pub fn read_model_binary(path: impl AsRef<Path>) -> Result<MorphableModel, ModelError> {
    let file = std::fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let data: MorphableModelData =
        bincode::decode_from_std_read(&mut reader, bincode::config::standard())?;
    MorphableModel::new(data)
}

/// Write a morphable model asset as a bincode-encoded binary file.
///
/// # Arguments
///
/// * `path` - Destination path.
/// * `data` - Raw model arrays to encode.
pub fn write_model_binary(path: impl AsRef<Path>, data: &MorphableModelData) -> Result<(), ModelError> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    bincode::encode_into_std_write(data, &mut writer, bincode::config::standard())?;
    Ok(())
}
