use varflow_image::Image;

use crate::error::ImgprocError;
use crate::interpolation::bilinear_interpolation;
use crate::parallel::{self, ExecutionStrategy};

/// Resample a flow field onto the grid of `reference` and scale its vectors.
///
/// Each target pixel is mapped to its physical point, then into the continuous
/// index space of `flow` (a pure scale and shift between the two grids), and
/// sampled bilinearly with clamping at the borders. The sampled vector is
/// multiplied by `scale`, which rebases displacement magnitudes expressed in
/// pixels: use `2.0` when moving to a grid with half the spacing and `0.5` for
/// the opposite direction.
///
/// # Arguments
///
/// * `flow` - The source displacement field.
/// * `reference` - Any image defining the target region and geometry.
/// * `scale` - Factor applied to every resampled vector.
/// * `strategy` - Execution strategy for the rows.
///
/// # Returns
///
/// A flow field with the region and geometry of `reference`.
pub fn resample_flow<U, const C: usize>(
    flow: &Image<f32, 2>,
    reference: &Image<U, C>,
    scale: f32,
    strategy: ExecutionStrategy,
) -> Result<Image<f32, 2>, ImgprocError> {
    let mut dst = Image::<f32, 2>::zeros_like(reference);
    let cols = dst.cols();
    if flow.is_empty() || cols == 0 {
        return Ok(dst);
    }

    let target_region = reference.region();
    let target_geometry = reference.geometry();

    parallel::for_each_row(strategy, dst.as_slice_mut(), cols * 2, |r, row| {
        row.chunks_exact_mut(2).enumerate().for_each(|(c, pixel)| {
            let point = target_geometry.index_to_physical([
                (c as isize + target_region.index[0]) as f32,
                (r as isize + target_region.index[1]) as f32,
            ]);
            let [u, v] = flow.physical_to_local(point);
            let sample = bilinear_interpolation(flow, u, v);
            pixel[0] = sample[0] * scale;
            pixel[1] = sample[1] * scale;
        });
    })?;

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pyramid::pyrdown;
    use approx::assert_abs_diff_eq;
    use varflow_image::ImageSize;

    #[test]
    fn test_upsample_doubles_vectors() -> Result<(), ImgprocError> {
        let fine = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 8,
                height: 6,
            },
            0.0,
        )?;
        let coarse_grid = pyrdown(&fine, 0.0, ExecutionStrategy::Serial)?;
        let coarse_flow = Image::<f32, 2>::from_fn(coarse_grid.size(), |_, _| [0.5, -0.25])
            .with_metadata_of(&coarse_grid)?;

        let up = resample_flow(&coarse_flow, &fine, 2.0, ExecutionStrategy::Serial)?;
        assert_eq!(up.size(), fine.size());
        assert_eq!(up.geometry(), fine.geometry());
        for uv in up.as_slice().chunks_exact(2) {
            assert_abs_diff_eq!(uv[0], 1.0, epsilon = 1e-6);
            assert_abs_diff_eq!(uv[1], -0.5, epsilon = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_linear_field_follows_physical_points() -> Result<(), ImgprocError> {
        let fine = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 16,
                height: 16,
            },
            0.0,
        )?;
        let coarse_grid = pyrdown(&fine, 0.0, ExecutionStrategy::Serial)?;
        // a field equal to the physical x coordinate of each coarse pixel
        let coarse_flow = Image::<f32, 2>::from_fn(coarse_grid.size(), |x, _| {
            [0.5 + 2.0 * x as f32, 0.0]
        })
        .with_metadata_of(&coarse_grid)?;

        let up = resample_flow(&coarse_flow, &fine, 1.0, ExecutionStrategy::ParallelRows)?;
        // away from the clamped border the field is reproduced exactly
        for x in 1..15 {
            assert_abs_diff_eq!(up.pixel(x, 7)?[0], x as f32, epsilon = 1e-5);
        }
        Ok(())
    }
}
