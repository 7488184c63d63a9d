#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod compose;
pub use compose::*;

mod tracks;
pub use tracks::*;

mod tracker;
pub use tracker::*;
