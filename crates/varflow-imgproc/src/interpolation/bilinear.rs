use varflow_image::Image;

/// Whether the continuous local coordinate `(u, v)` lies inside the sampled area of the image.
pub fn is_inside<const C: usize>(image: &Image<f32, C>, u: f32, v: f32) -> bool {
    let max_u = image.cols() as f32 - 1.0;
    let max_v = image.rows() as f32 - 1.0;
    u >= 0.0 && v >= 0.0 && u <= max_u && v <= max_v
}

/// Kernel for bilinear interpolation
///
/// Coordinates outside the image are clamped to the border, so the result is
/// always defined for a non empty image.
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
///
/// # Returns
///
/// The interpolated pixel values.
///
/// # Example
///
/// ```
/// use varflow_image::{Image, ImageSize};
/// use varflow_imgproc::interpolation::bilinear_interpolation;
///
/// let image = Image::<f32, 1>::new(
///     ImageSize { width: 2, height: 2 },
///     vec![0.0, 1.0, 2.0, 3.0],
/// ).unwrap();
///
/// assert_eq!(bilinear_interpolation(&image, 0.5, 0.5), [1.5]);
/// assert_eq!(bilinear_interpolation(&image, 5.0, -1.0), [1.0]);
/// ```
pub fn bilinear_interpolation<const C: usize>(image: &Image<f32, C>, u: f32, v: f32) -> [f32; C] {
    let (rows, cols) = (image.rows(), image.cols());
    if rows == 0 || cols == 0 {
        return [0.0; C];
    }

    let u = u.clamp(0.0, (cols - 1) as f32);
    let v = v.clamp(0.0, (rows - 1) as f32);

    let iu0 = (u.trunc() as usize).min(cols - 1);
    let iv0 = (v.trunc() as usize).min(rows - 1);

    let frac_u = u - iu0 as f32;
    let frac_v = v - iv0 as f32;

    let frac_uu = 1.0 - frac_u;
    let frac_vv = 1.0 - frac_v;

    let w00 = frac_uu * frac_vv;
    let w01 = frac_u * frac_vv;
    let w10 = frac_uu * frac_v;
    let w11 = frac_u * frac_v;

    let iu1 = if iu0 + 1 < cols { iu0 + 1 } else { iu0 };
    let iv1 = if iv0 + 1 < rows { iv0 + 1 } else { iv0 };

    let base00 = (iv0 * cols + iu0) * C;
    let base01 = (iv0 * cols + iu1) * C;
    let base10 = (iv1 * cols + iu0) * C;
    let base11 = (iv1 * cols + iu1) * C;

    let data = image.as_slice();

    let p00 = &data[base00..base00 + C];
    let p01 = &data[base01..base01 + C];
    let p10 = &data[base10..base10 + C];
    let p11 = &data[base11..base11 + C];

    let mut pixel = [0.0; C];
    for k in 0..C {
        pixel[k] = p00[k] * w00 + p01[k] * w01 + p10[k] * w10 + p11[k] * w11;
    }

    pixel
}
