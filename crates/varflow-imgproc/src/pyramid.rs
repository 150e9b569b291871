use varflow_image::{Image, ImageGeometry, ImageSize};

use crate::error::ImgprocError;
use crate::filter::gaussian_blur;
use crate::interpolation::bilinear_interpolation;
use crate::parallel::{self, ExecutionStrategy};

/// Size of the image obtained by halving `size`, never smaller than one pixel.
pub fn half_size(size: ImageSize) -> ImageSize {
    ImageSize {
        width: (size.width / 2).max(1),
        height: (size.height / 2).max(1),
    }
}

/// Blur an image and then downsample it by two.
///
/// Each output pixel is the mean of a 2x2 block of the smoothed source, so its
/// physical position is the centre of that block: the spacing doubles and the
/// origin moves by half a source pixel.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `sigma` - The smoothing applied before sampling, in source pixels.
/// * `strategy` - Execution strategy for the filters and the sampling.
///
/// # Example
///
/// ```
/// use varflow_image::{Image, ImageSize};
/// use varflow_imgproc::parallel::ExecutionStrategy;
/// use varflow_imgproc::pyramid::pyrdown;
///
/// let image = Image::<f32, 1>::from_size_val(ImageSize { width: 8, height: 5 }, 1.0).unwrap();
/// let down = pyrdown(&image, 1.0, ExecutionStrategy::Serial).unwrap();
///
/// assert_eq!(down.size(), ImageSize { width: 4, height: 2 });
/// assert_eq!(down.geometry().spacing, [2.0, 2.0]);
/// assert_eq!(down.geometry().origin, [0.5, 0.5]);
/// ```
pub fn pyrdown<const C: usize>(
    src: &Image<f32, C>,
    sigma: f32,
    strategy: ExecutionStrategy,
) -> Result<Image<f32, C>, ImgprocError> {
    let mut smoothed = src.clone();
    gaussian_blur(src, &mut smoothed, sigma, strategy)?;

    let dst_size = half_size(src.size());
    let mut dst = Image::<f32, C>::from_size_val(dst_size, 0.0)?;

    parallel::for_each_row(strategy, dst.as_slice_mut(), dst_size.width * C, |r, row| {
        let v = 2.0 * r as f32 + 0.5;
        row.chunks_exact_mut(C).enumerate().for_each(|(c, pixel)| {
            let u = 2.0 * c as f32 + 0.5;
            pixel.copy_from_slice(&bilinear_interpolation(&smoothed, u, v));
        });
    })?;

    let src_geometry = src.geometry();
    let geometry = ImageGeometry {
        spacing: [
            2.0 * src_geometry.spacing[0],
            2.0 * src_geometry.spacing[1],
        ],
        origin: src.local_to_physical(0.5, 0.5),
    };

    Ok(dst.with_geometry(geometry)?)
}

/// Multi-resolution image pyramid.
///
/// Levels are ordered from coarsest (index 0) to finest (the input image).
#[derive(Debug, Clone)]
pub struct ImagePyramid<const C: usize> {
    levels: Vec<Image<f32, C>>,
}

impl<const C: usize> ImagePyramid<C> {
    /// Build a pyramid by recursive downsampling.
    ///
    /// # Arguments
    ///
    /// * `image` - The finest level.
    /// * `num_levels` - Total number of levels, including the input image.
    /// * `sigma` - Smoothing applied before each downsampling step.
    /// * `strategy` - Execution strategy for the filters.
    pub fn build(
        image: &Image<f32, C>,
        num_levels: usize,
        sigma: f32,
        strategy: ExecutionStrategy,
    ) -> Result<Self, ImgprocError> {
        let mut levels = Vec::with_capacity(num_levels.max(1));
        levels.push(image.clone());
        for _ in 1..num_levels {
            let finer = &levels[levels.len() - 1];
            let coarser = pyrdown(finer, sigma, strategy)?;
            levels.push(coarser);
        }
        levels.reverse();
        Ok(Self { levels })
    }

    /// Number of levels in the pyramid.
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Get a level, 0 being the coarsest.
    pub fn level(&self, index: usize) -> Option<&Image<f32, C>> {
        self.levels.get(index)
    }

    /// Iterate over the levels from coarsest to finest.
    pub fn iter(&self) -> impl Iterator<Item = &Image<f32, C>> {
        self.levels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pyramid_sizes_and_geometry() -> Result<(), ImgprocError> {
        let image = Image::<f32, 1>::from_fn(
            ImageSize {
                width: 33,
                height: 16,
            },
            |x, y| [(x + y) as f32],
        );
        let pyramid = ImagePyramid::build(&image, 3, 1.0, ExecutionStrategy::ParallelRows)?;

        assert_eq!(pyramid.num_levels(), 3);
        let sizes = pyramid.iter().map(|l| l.size()).collect::<Vec<_>>();
        assert_eq!(
            sizes,
            vec![
                ImageSize {
                    width: 8,
                    height: 4
                },
                ImageSize {
                    width: 16,
                    height: 8
                },
                ImageSize {
                    width: 33,
                    height: 16
                },
            ]
        );

        let coarsest = pyramid.level(0).unwrap();
        assert_eq!(coarsest.geometry().spacing, [4.0, 4.0]);
        // 0.5 from the first halving plus 0.5 * 2 from the second one
        assert_eq!(coarsest.geometry().origin, [1.5, 1.5]);
        Ok(())
    }

    #[test]
    fn test_pyrdown_never_empties() -> Result<(), ImgprocError> {
        let image = Image::<f32, 1>::from_size_val([1, 3].into(), 5.0)?;
        let down = pyrdown(&image, 0.0, ExecutionStrategy::Serial)?;
        assert_eq!(down.size(), ImageSize { width: 1, height: 1 });
        assert_eq!(down.as_slice(), &[5.0]);
        Ok(())
    }

    #[test]
    fn test_pyrdown_averages_blocks() -> Result<(), ImgprocError> {
        #[rustfmt::skip]
        let image = Image::<f32, 1>::new(
            [4, 2].into(),
            vec![
                0.0, 2.0, 4.0, 6.0,
                2.0, 4.0, 6.0, 8.0,
            ],
        )?;
        let down = pyrdown(&image, 0.0, ExecutionStrategy::Serial)?;
        assert_eq!(down.as_slice(), &[2.0, 6.0]);
        Ok(())
    }
}
