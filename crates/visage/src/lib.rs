#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use visage_3dmm as morph;

#[doc(inline)]
pub use visage_align as align;

#[doc(inline)]
pub use visage_pose as pose;
