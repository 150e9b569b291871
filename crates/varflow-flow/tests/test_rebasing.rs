use approx::assert_abs_diff_eq;

use varflow_flow::multires::LEVEL_SCALE;
use varflow_image::{FlowField, ImageSize, ScalarImage};
use varflow_imgproc::parallel::ExecutionStrategy;
use varflow_imgproc::pyramid::ImagePyramid;
use varflow_imgproc::warp::resample_flow;
use varflow_imgproc::ImgprocError;

#[test]
fn test_upsample_then_downsample_round_trip() -> Result<(), ImgprocError> {
    let fine = ScalarImage::from_size_val(
        ImageSize {
            width: 32,
            height: 24,
        },
        0.0,
    )?;
    let pyramid = ImagePyramid::build(&fine, 2, 1.0, ExecutionStrategy::Serial)?;
    let coarse = pyramid.level(0).unwrap();

    // smooth field expressed in coarse pixels
    let field = FlowField::from_fn(coarse.size(), |x, y| {
        let (x, y) = (x as f32, y as f32);
        [0.1 * x - 0.05 * y + 0.3, 0.02 * x * y - 1.0]
    })
    .with_metadata_of(coarse)?;

    let strategy = ExecutionStrategy::ParallelRows;
    let up = resample_flow(&field, &fine, LEVEL_SCALE, strategy)?;
    let back = resample_flow(&up, coarse, 1.0 / LEVEL_SCALE, strategy)?;
    assert_eq!(back.region(), field.region());
    assert_eq!(back.geometry(), field.geometry());

    // bilinear sampling reproduces the field away from the clamped border
    for y in 1..coarse.height() - 1 {
        for x in 1..coarse.width() - 1 {
            let (a, b) = (field.pixel(x, y)?, back.pixel(x, y)?);
            assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-4);
            assert_abs_diff_eq!(a[1], b[1], epsilon = 1e-2);
        }
    }
    Ok(())
}
