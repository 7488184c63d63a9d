#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Small fixed-size 3x3 matrix kernels.
pub mod mat3;

mod solver;
pub use solver::*;
