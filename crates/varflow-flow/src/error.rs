use varflow_image::{ImageError, ImageRegion, ImageSize};
use varflow_imgproc::{parallel::ParallelError, ImgprocError};

/// Errors raised while estimating a flow field.
///
/// Configuration and geometry errors are detected before any pixel is
/// computed, so a failed call never exposes a partial result.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FlowError {
    /// A required input image was not provided.
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    /// An input image has no pixels.
    #[error("input image `{0}` is empty")]
    EmptyImage(&'static str),

    /// A parameter is out of its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Two grids that must be congruent are not.
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// The size of the reference grid.
        expected: ImageSize,
        /// The size that was provided.
        actual: ImageSize,
    },

    /// The output region padded by the stencil halo does not touch the image.
    #[error("the halo of output region {requested} does not intersect the largest region {largest}")]
    HaloOutsideImage {
        /// The requested output region.
        requested: ImageRegion,
        /// The largest possible region of the input image.
        largest: ImageRegion,
    },

    /// The output region is not contained in the image.
    #[error("output region {requested} is not contained in the largest region {largest}")]
    OutputRegionOutsideImage {
        /// The requested output region.
        requested: ImageRegion,
        /// The largest possible region of the input image.
        largest: ImageRegion,
    },

    /// Error coming from the image containers.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error coming from the image processing operations.
    #[error(transparent)]
    Imgproc(#[from] ImgprocError),

    /// Error coming from the parallel execution layer.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}

impl FlowError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
