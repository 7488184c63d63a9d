#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod error;
pub use error::ModelError;

mod model;
pub use model::*;

/// Binary asset reading and writing.
pub mod io;
