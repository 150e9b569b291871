use varflow_image::Image;

/// Compute the per channel mean of an image.
///
/// The sums are accumulated in `f64` to keep large images accurate.
/// An empty image has a zero mean.
///
/// # Example
///
/// ```
/// use varflow_image::{Image, ImageSize};
/// use varflow_imgproc::core::mean;
///
/// let image = Image::<f32, 2>::new(
///     ImageSize { width: 2, height: 1 },
///     vec![1.0, 10.0, 3.0, 20.0],
/// ).unwrap();
///
/// assert_eq!(mean(&image), [2.0, 15.0]);
/// ```
pub fn mean<const C: usize>(image: &Image<f32, C>) -> [f32; C] {
    let n = image.size().num_pixels();
    if n == 0 {
        return [0.0; C];
    }

    let sum = image
        .as_slice()
        .chunks_exact(C)
        .fold([0f64; C], |mut sum, pixel| {
            sum.iter_mut()
                .zip(pixel.iter())
                .for_each(|(s, &v)| *s += v as f64);
            sum
        });

    let mut mean = [0f32; C];
    mean.iter_mut()
        .zip(sum.iter())
        .for_each(|(m, &s)| *m = (s / n as f64) as f32);
    mean
}

/// Largest absolute difference between two images of the same size.
///
/// Returns `None` when the sizes differ.
pub fn max_abs_difference<const C: usize>(a: &Image<f32, C>, b: &Image<f32, C>) -> Option<f32> {
    if a.size() != b.size() {
        return None;
    }
    Some(
        a.as_slice()
            .iter()
            .zip(b.as_slice().iter())
            .fold(0.0f32, |acc, (&x, &y)| acc.max((x - y).abs())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use varflow_image::ImageError;

    #[test]
    fn test_max_abs_difference() -> Result<(), ImageError> {
        let a = Image::<f32, 1>::new([3, 1].into(), vec![0.0, 1.0, 2.0])?;
        let b = Image::<f32, 1>::new([3, 1].into(), vec![0.5, 1.0, -1.0])?;
        assert_eq!(max_abs_difference(&a, &b), Some(3.0));

        let c = Image::<f32, 1>::new([1, 3].into(), vec![0.0; 3])?;
        assert_eq!(max_abs_difference(&a, &c), None);
        Ok(())
    }
}
