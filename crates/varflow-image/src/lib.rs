#![deny(missing_docs)]
//! Image grid types used by the variational optical flow crates.
//!
//! An [`Image`] is a rectangular grid of `CHANNELS` scalar samples per pixel,
//! tagged with its largest possible [`ImageRegion`] (index origin and size) and
//! its [`ImageGeometry`] (per-axis spacing and physical origin).

/// image representation with region and geometry metadata.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageGeometry, ImageRegion, ImageSize};

/// Single channel floating point image, e.g. a grayscale video frame.
pub type ScalarImage = Image<f32, 1>;

/// Dense displacement field with two components `(u, v)` per pixel.
pub type FlowField = Image<f32, 2>;

/// Per-pixel structure tensor stored as `(T11, T12, T13, T21, T22, T23)`.
pub type StructureTensor = Image<f32, 6>;
