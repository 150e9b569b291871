use crate::image::ImageRegion;

/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images are expected to share the same size.
    #[error("Invalid image size. Expected {0}x{1}, got {2}x{3}")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a pixel index lies outside the image.
    #[error("Pixel index ({0}, {1}) out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when a region is not contained in the largest region of the image.
    #[error("Region {0} is not contained in the largest possible region {1}")]
    RegionOutOfBounds(ImageRegion, ImageRegion),

    /// Error when the pixel spacing is zero, negative or not finite.
    #[error("Invalid spacing [{0}, {1}], spacing must be finite and positive")]
    InvalidSpacing(f32, f32),
}
