use varflow_image::ImageError;

use crate::parallel::ParallelError;

/// Errors raised by the image processing operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImgprocError {
    /// Error coming from the image containers.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error coming from the parallel execution layer.
    #[error(transparent)]
    Parallel(#[from] ParallelError),

    /// The gaussian sigma is negative or not finite.
    #[error("Invalid sigma {0}, sigma must be finite and >= 0")]
    InvalidSigma(f32),

    /// The filter kernels are empty.
    #[error("Invalid kernel length, got kernel_x: {0}, kernel_y: {1}")]
    InvalidKernelLength(usize, usize),

    /// Two images that must share the same size do not.
    #[error("Invalid image size. Expected {0}x{1}, got {2}x{3}")]
    InvalidImageSize(usize, usize, usize, usize),
}
