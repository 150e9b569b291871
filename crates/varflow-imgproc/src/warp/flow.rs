use varflow_image::Image;

use crate::core::mean;
use crate::error::ImgprocError;
use crate::interpolation::{bilinear_interpolation, is_inside};
use crate::parallel::{self, ExecutionStrategy};

/// Warp an image backward along a displacement field.
///
/// Every output pixel `(x, y)` samples `src` at `(x + u, y + v)` with bilinear
/// interpolation, where `(u, v)` is the flow vector at `(x, y)` in pixels.
/// Samples falling outside `src` take the mean intensity of `src`, a neutral
/// value for the brightness constancy term.
///
/// # Arguments
///
/// * `src` - The image to warp.
/// * `flow` - The displacement field, same size as `src`.
/// * `strategy` - Execution strategy for the rows.
///
/// # Returns
///
/// The warped image, sharing the region and geometry of `src`.
///
/// # Example
///
/// ```
/// use varflow_image::{Image, ImageSize};
/// use varflow_imgproc::parallel::ExecutionStrategy;
/// use varflow_imgproc::warp::warp_by_flow;
///
/// let size = ImageSize { width: 3, height: 1 };
/// let src = Image::<f32, 1>::new(size, vec![0.0, 3.0, 6.0]).unwrap();
/// let flow = Image::<f32, 2>::new(size, vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0]).unwrap();
///
/// let warped = warp_by_flow(&src, &flow, ExecutionStrategy::Serial).unwrap();
/// assert_eq!(warped.as_slice(), &[3.0, 6.0, 3.0]);
/// ```
pub fn warp_by_flow(
    src: &Image<f32, 1>,
    flow: &Image<f32, 2>,
    strategy: ExecutionStrategy,
) -> Result<Image<f32, 1>, ImgprocError> {
    if src.size() != flow.size() {
        return Err(ImgprocError::InvalidImageSize(
            src.cols(),
            src.rows(),
            flow.cols(),
            flow.rows(),
        ));
    }

    let [fill] = mean(src);
    let cols = src.cols();
    let flow_data = flow.as_slice();
    let mut dst = src.clone();

    parallel::for_each_row(strategy, dst.as_slice_mut(), cols, |r, row| {
        let row_flow = &flow_data[r * cols * 2..(r + 1) * cols * 2];
        row.iter_mut()
            .zip(row_flow.chunks_exact(2))
            .enumerate()
            .for_each(|(c, (dst_pixel, uv))| {
                let u = c as f32 + uv[0];
                let v = r as f32 + uv[1];
                *dst_pixel = if is_inside(src, u, v) {
                    bilinear_interpolation(src, u, v)[0]
                } else {
                    fill
                };
            });
    })?;

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use varflow_image::ImageSize;

    #[test]
    fn test_zero_flow_is_identity() -> Result<(), ImgprocError> {
        let size = ImageSize {
            width: 5,
            height: 4,
        };
        let src = Image::<f32, 1>::from_fn(size, |x, y| [(x * y) as f32]);
        let flow = Image::<f32, 2>::from_size_val(size, 0.0)?;
        let warped = warp_by_flow(&src, &flow, ExecutionStrategy::ParallelRows)?;
        assert_eq!(warped, src);
        Ok(())
    }

    #[test]
    fn test_out_of_bounds_takes_mean() -> Result<(), ImgprocError> {
        let size = ImageSize {
            width: 2,
            height: 2,
        };
        let src = Image::<f32, 1>::new(size, vec![1.0, 2.0, 3.0, 6.0])?;
        let flow = Image::<f32, 2>::from_size_val(size, -5.0)?;
        let warped = warp_by_flow(&src, &flow, ExecutionStrategy::Serial)?;
        assert_eq!(warped.as_slice(), &[3.0, 3.0, 3.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_size_mismatch() -> Result<(), ImgprocError> {
        let src = Image::<f32, 1>::from_size_val([2, 2].into(), 0.0)?;
        let flow = Image::<f32, 2>::from_size_val([3, 2].into(), 0.0)?;
        assert_eq!(
            warp_by_flow(&src, &flow, ExecutionStrategy::Serial),
            Err(ImgprocError::InvalidImageSize(2, 2, 3, 2))
        );
        Ok(())
    }
}
