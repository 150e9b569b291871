//! Pixel interpolation methods for image resampling.
//!
//! Flow warping and flow rescaling sample images at continuous coordinates;
//! both go through the bilinear kernel of this module.

mod bilinear;

pub use bilinear::{bilinear_interpolation, is_inside};
