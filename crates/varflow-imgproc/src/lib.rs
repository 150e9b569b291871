#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image statistics module.
pub mod core;

/// Error types for the image processing module.
pub mod error;

/// image filtering module.
pub mod filter;

/// utilities for interpolation.
pub mod interpolation;

/// module containing parallization utilities.
pub mod parallel;

/// Pyramid operations
pub mod pyramid;

/// image and flow geometric transformations module.
pub mod warp;

pub use crate::error::ImgprocError;
