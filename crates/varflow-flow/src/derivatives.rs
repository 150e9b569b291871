use varflow_image::{ImageSize, ScalarImage};
use varflow_imgproc::filter::{gaussian_blur, gaussian_derivative, kernels::DerivativeOrder, Axis};
use varflow_imgproc::parallel::ExecutionStrategy;

use crate::error::FlowError;

/// Spatial and temporal derivatives of an image pair.
///
/// All three images share the region and geometry of the first image.
#[derive(Debug, Clone)]
pub struct SpatioTemporalDerivatives {
    /// First derivative of the first image along `x`.
    pub ix: ScalarImage,
    /// First derivative of the first image along `y`.
    pub iy: ScalarImage,
    /// Difference of the smoothed images, `smooth(image2) - smooth(image1)`.
    pub it: ScalarImage,
}

impl SpatioTemporalDerivatives {
    /// Compute the derivatives at the smoothing scale `spatial_sigma`.
    ///
    /// # Arguments
    ///
    /// * `image1` - The reference (fixed) image.
    /// * `image2` - The image the flow points to (moving).
    /// * `spatial_sigma` - The gaussian scale in pixels.
    /// * `strategy` - Execution strategy for the filters.
    ///
    /// # Errors
    ///
    /// If an image is empty or the two sizes differ.
    pub fn compute(
        image1: &ScalarImage,
        image2: &ScalarImage,
        spatial_sigma: f32,
        strategy: ExecutionStrategy,
    ) -> Result<Self, FlowError> {
        check_pair(image1, image2)?;

        let mut ix = ScalarImage::zeros_like(image1);
        let mut iy = ScalarImage::zeros_like(image1);
        gaussian_derivative(
            image1,
            &mut ix,
            spatial_sigma,
            Axis::X,
            DerivativeOrder::First,
            strategy,
        )?;
        gaussian_derivative(
            image1,
            &mut iy,
            spatial_sigma,
            Axis::Y,
            DerivativeOrder::First,
            strategy,
        )?;

        let mut smooth1 = ScalarImage::zeros_like(image1);
        let mut it = ScalarImage::zeros_like(image1);
        gaussian_blur(image1, &mut smooth1, spatial_sigma, strategy)?;
        gaussian_blur(image2, &mut it, spatial_sigma, strategy)?;
        it.as_slice_mut()
            .iter_mut()
            .zip(smooth1.as_slice().iter())
            .for_each(|(t, &s1)| *t -= s1);

        Ok(Self { ix, iy, it })
    }

    /// Size of the derivative images.
    pub fn size(&self) -> ImageSize {
        self.ix.size()
    }
}

/// Fail fast on empty or non congruent input pairs.
pub(crate) fn check_pair(image1: &ScalarImage, image2: &ScalarImage) -> Result<(), FlowError> {
    if image1.is_empty() {
        return Err(FlowError::EmptyImage("image1"));
    }
    if image2.is_empty() {
        return Err(FlowError::EmptyImage("image2"));
    }
    if image1.size() != image2.size() {
        return Err(FlowError::SizeMismatch {
            expected: image1.size(),
            actual: image2.size(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn temporal_derivative_of_shifted_ramp() -> Result<(), FlowError> {
        let size = ImageSize {
            width: 12,
            height: 8,
        };
        let image1 = ScalarImage::from_fn(size, |x, _| [3.0 * x as f32]);
        let image2 = ScalarImage::from_fn(size, |x, _| [3.0 * x as f32 - 6.0]);

        let d = SpatioTemporalDerivatives::compute(&image1, &image2, 1.0, ExecutionStrategy::Serial)?;
        assert_eq!(d.size(), size);
        assert_abs_diff_eq!(d.ix.pixel(6, 4)?[0], 3.0, epsilon = 1e-4);
        assert_abs_diff_eq!(d.iy.pixel(6, 4)?[0], 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(d.it.pixel(6, 4)?[0], -6.0, epsilon = 1e-4);
        Ok(())
    }

    #[test]
    fn rejects_mismatched_pairs() -> Result<(), FlowError> {
        let a = ScalarImage::from_size_val([4, 4].into(), 0.0)?;
        let b = ScalarImage::from_size_val([4, 5].into(), 0.0)?;
        let empty = ScalarImage::from_size_val([0, 0].into(), 0.0)?;
        assert!(matches!(
            SpatioTemporalDerivatives::compute(&a, &b, 1.0, ExecutionStrategy::Serial),
            Err(FlowError::SizeMismatch { .. })
        ));
        assert_eq!(
            check_pair(&empty, &a),
            Err(FlowError::EmptyImage("image1"))
        );
        Ok(())
    }
}
