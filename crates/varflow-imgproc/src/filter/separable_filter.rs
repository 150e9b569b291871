use varflow_image::Image;

use crate::error::ImgprocError;
use crate::parallel::{self, ExecutionStrategy};

/// A separable 2D filter that applies horizontal and vertical 1D correlations sequentially.
///
/// Samples outside the image are replaced by the closest border sample
/// (zero-flux boundary), so a constant image stays constant under any kernel
/// that sums to one and vanishes under any derivative kernel.
struct SeparableFilter {
    kernel_x: Vec<f32>,
    kernel_y: Vec<f32>,
    offsets_x: Vec<isize>,
    offsets_y: Vec<isize>,
}

impl SeparableFilter {
    /// Create a new separable filter with the given kernels.
    ///
    /// # Arguments
    ///
    /// * `kernel_x` - The horizontal correlation kernel
    /// * `kernel_y` - The vertical correlation kernel
    fn new(kernel_x: &[f32], kernel_y: &[f32]) -> Self {
        let half_x = kernel_x.len() / 2;
        let half_y = kernel_y.len() / 2;

        let offsets_x = (0..kernel_x.len())
            .map(|i| i as isize - half_x as isize)
            .collect();

        let offsets_y = (0..kernel_y.len())
            .map(|i| i as isize - half_y as isize)
            .collect();

        Self {
            kernel_x: kernel_x.to_vec(),
            kernel_y: kernel_y.to_vec(),
            offsets_x,
            offsets_y,
        }
    }

    /// Apply the filter to an image.
    ///
    /// Performs horizontal filtering followed by vertical filtering using a temporary buffer.
    fn apply<const C: usize>(
        &self,
        src: &Image<f32, C>,
        dst: &mut Image<f32, C>,
        strategy: ExecutionStrategy,
    ) -> Result<(), ImgprocError> {
        let rows = src.rows();
        let cols = src.cols();
        if rows == 0 || cols == 0 {
            return Ok(());
        }

        let src_data = src.as_slice();
        let mut temp = vec![0.0f32; src_data.len()];
        let last_col = cols as isize - 1;
        let last_row = rows as isize - 1;

        // Horizontal
        parallel::for_each_row(strategy, &mut temp, cols * C, |r, row_temp| {
            let row_src = &src_data[r * cols * C..(r + 1) * cols * C];
            for c in 0..cols {
                let mut acc = [0.0f32; C];
                for (&k, &off) in self.kernel_x.iter().zip(self.offsets_x.iter()) {
                    let x = (c as isize + off).clamp(0, last_col) as usize;
                    let px = &row_src[x * C..x * C + C];
                    for (acc_val, &v) in acc.iter_mut().zip(px.iter()) {
                        *acc_val += v * k;
                    }
                }
                row_temp[c * C..c * C + C].copy_from_slice(&acc);
            }
        })?;

        // Vertical
        let temp = &temp;
        parallel::for_each_row(strategy, dst.as_slice_mut(), cols * C, |r, row_dst| {
            row_dst.iter_mut().for_each(|v| *v = 0.0);
            for (&k, &off) in self.kernel_y.iter().zip(self.offsets_y.iter()) {
                let y = (r as isize + off).clamp(0, last_row) as usize;
                let row_temp = &temp[y * cols * C..(y + 1) * cols * C];
                for (d, &t) in row_dst.iter_mut().zip(row_temp.iter()) {
                    *d += t * k;
                }
            }
        })?;

        Ok(())
    }
}

/// Apply a separable filter with execution strategy control.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel.
/// * `kernel_y` - The vertical kernel.
/// * `strategy` - Execution strategy for the row passes.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn separable_filter<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    if kernel_x.is_empty() || kernel_y.is_empty() {
        return Err(ImgprocError::InvalidKernelLength(
            kernel_x.len(),
            kernel_y.len(),
        ));
    }

    if src.size() != dst.size() {
        return Err(ImgprocError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let filter = SeparableFilter::new(kernel_x, kernel_y);
    filter.apply(src, dst, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use varflow_image::ImageSize;

    #[test]
    fn test_separable_filter_f32() -> Result<(), ImgprocError> {
        let size = ImageSize {
            width: 5,
            height: 5,
        };

        #[rustfmt::skip]
        let img = Image::<f32, 1>::new(
            size,
            vec![
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
            ],
        )?;

        let mut dst = Image::<f32, 1>::from_size_val(img.size(), 0f32)?;
        let kernel_x = vec![1.0, 1.0, 1.0];
        let kernel_y = vec![1.0, 1.0, 1.0];
        separable_filter(&img, &mut dst, &kernel_x, &kernel_y, ExecutionStrategy::Serial)?;

        #[rustfmt::skip]
        assert_eq!(
            dst.as_slice(),
            &[
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 1.0, 1.0, 0.0,
                0.0, 1.0, 1.0, 1.0, 0.0,
                0.0, 1.0, 1.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
            ]
        );

        Ok(())
    }

    #[test]
    fn test_replicated_border() -> Result<(), ImgprocError> {
        let img = Image::<f32, 2>::from_size_val([4, 3].into(), 3.0)?;
        let mut dst = Image::<f32, 2>::from_size_val(img.size(), 0.0)?;
        let kernel = vec![0.25, 0.5, 0.25];
        separable_filter(&img, &mut dst, &kernel, &kernel, ExecutionStrategy::ParallelRows)?;
        assert!(dst.as_slice().iter().all(|&v| (v - 3.0).abs() < 1e-6));
        Ok(())
    }

    #[test]
    fn test_invalid_inputs() -> Result<(), ImgprocError> {
        let img = Image::<f32, 1>::from_size_val([4, 3].into(), 0.0)?;
        let mut dst = Image::<f32, 1>::from_size_val([3, 3].into(), 0.0)?;
        assert_eq!(
            separable_filter(&img, &mut dst, &[1.0], &[1.0], ExecutionStrategy::Serial),
            Err(ImgprocError::InvalidImageSize(4, 3, 3, 3))
        );
        let mut dst = img.clone();
        assert_eq!(
            separable_filter(&img, &mut dst, &[], &[1.0], ExecutionStrategy::Serial),
            Err(ImgprocError::InvalidKernelLength(0, 1))
        );
        Ok(())
    }
}
