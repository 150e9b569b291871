//! Summary statistics of flow fields.

use varflow_image::{FlowField, ImageRegion, ScalarImage};
use varflow_imgproc::core as stats;

use crate::error::FlowError;

/// Largest absolute difference between two flow fields, `‖a - b‖∞`.
///
/// # Errors
///
/// [`FlowError::SizeMismatch`] if the sizes differ.
pub fn max_abs_difference(a: &FlowField, b: &FlowField) -> Result<f32, FlowError> {
    stats::max_abs_difference(a, b).ok_or(FlowError::SizeMismatch {
        expected: a.size(),
        actual: b.size(),
    })
}

/// Mean flow vector over `region`, or over the whole field if `None`.
///
/// `region` is given in the index space of the field.
///
/// # Errors
///
/// If `region` is not inside the field, or is empty.
pub fn mean_vector(flow: &FlowField, region: Option<ImageRegion>) -> Result<[f32; 2], FlowError> {
    let region = region.unwrap_or(flow.region());
    if region.is_empty() {
        return Err(FlowError::EmptyImage("flow region"));
    }
    if region == flow.region() {
        return Ok(stats::mean(flow));
    }
    Ok(stats::mean(&flow.crop(&region)?))
}

/// Euclidean norm of every flow vector.
///
/// # Errors
///
/// If the output image cannot be allocated with the flow metadata.
pub fn magnitude(flow: &FlowField) -> Result<ScalarImage, FlowError> {
    let data = flow
        .as_slice()
        .chunks_exact(2)
        .map(|uv| uv[0].hypot(uv[1]))
        .collect::<Vec<_>>();
    Ok(ScalarImage::new(flow.size(), data)?.with_metadata_of(flow)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use varflow_image::ImageSize;

    #[test]
    fn magnitude_and_mean() -> Result<(), FlowError> {
        #[rustfmt::skip]
        let flow = FlowField::new([2, 2].into(), vec![
            3.0, 4.0,  0.0, 1.0,
            -1.0, 0.0, 6.0, 8.0,
        ])?
        .with_index([5, 5]);

        let norm = magnitude(&flow)?;
        assert_eq!(norm.as_slice(), &[5.0, 1.0, 1.0, 10.0]);
        assert_eq!(norm.region(), flow.region());

        assert_eq!(mean_vector(&flow, None)?, [2.0, 3.25]);
        let corner = ImageRegion::new(
            [6, 6],
            ImageSize {
                width: 1,
                height: 1,
            },
        );
        assert_eq!(mean_vector(&flow, Some(corner))?, [6.0, 8.0]);
        Ok(())
    }

    #[test]
    fn difference_needs_congruent_fields() -> Result<(), FlowError> {
        let a = FlowField::from_size_val([3, 2].into(), 1.0)?;
        let mut b = a.clone();
        b.pixel_mut(2, 1)?[1] = -1.5;
        assert_eq!(max_abs_difference(&a, &b)?, 2.5);

        let c = FlowField::from_size_val([2, 3].into(), 1.0)?;
        assert!(matches!(
            max_abs_difference(&a, &c),
            Err(FlowError::SizeMismatch { .. })
        ));
        Ok(())
    }
}
