use varflow_image::Image;

use super::kernels::{gaussian_derivative_kernel_1d, DerivativeOrder};
use super::separable_filter;
use crate::error::ImgprocError;
use crate::parallel::ExecutionStrategy;

/// Image axis along which a derivative is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Along the columns (`x`).
    X,
    /// Along the rows (`y`).
    Y,
}

fn check_sigma(sigma: f32) -> Result<(), ImgprocError> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(ImgprocError::InvalidSigma(sigma));
    }
    Ok(())
}

/// Blur an image using a gaussian blur filter
///
/// Every channel is smoothed independently with the same isotropic sigma.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `sigma` - The sigma of the gaussian kernel in pixels. Zero copies the image.
/// * `strategy` - Execution strategy for the row passes.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Example
///
/// ```
/// use varflow_image::{Image, ImageSize};
/// use varflow_imgproc::filter::gaussian_blur;
/// use varflow_imgproc::parallel::ExecutionStrategy;
///
/// let src = Image::<f32, 1>::from_size_val(ImageSize { width: 4, height: 4 }, 2.0).unwrap();
/// let mut dst = src.clone();
///
/// gaussian_blur(&src, &mut dst, 1.0, ExecutionStrategy::Serial).unwrap();
/// assert!(dst.as_slice().iter().all(|v| (v - 2.0).abs() < 1e-5));
/// ```
pub fn gaussian_blur<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    sigma: f32,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    check_sigma(sigma)?;
    let kernel = gaussian_derivative_kernel_1d(sigma, DerivativeOrder::Zero);
    separable_filter(src, dst, &kernel, &kernel, strategy)
}

/// Compute a gaussian derivative of a single channel image.
///
/// The image is differentiated with `order` along `axis` and smoothed with the
/// zero order gaussian along the other axis. Derivatives are expressed per
/// pixel, independently of the image spacing.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image, same size as `src`.
/// * `sigma` - The smoothing scale in pixels.
/// * `axis` - The differentiation direction.
/// * `order` - The derivative order along `axis`.
/// * `strategy` - Execution strategy for the row passes.
pub fn gaussian_derivative(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    sigma: f32,
    axis: Axis,
    order: DerivativeOrder,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    check_sigma(sigma)?;
    let smooth = gaussian_derivative_kernel_1d(sigma, DerivativeOrder::Zero);
    let derivative = gaussian_derivative_kernel_1d(sigma, order);

    match axis {
        Axis::X => separable_filter(src, dst, &derivative, &smooth, strategy),
        Axis::Y => separable_filter(src, dst, &smooth, &derivative, strategy),
    }
}
