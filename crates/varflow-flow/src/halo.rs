use varflow_image::ImageRegion;

use crate::error::FlowError;

/// Radius of the neighbourhood read by the relaxation stencils.
pub const HALO_RADIUS: usize = 1;

/// Input region needed to compute `output` inside an image whose largest region is `largest`.
///
/// The output region is padded by [`HALO_RADIUS`] and cropped to `largest`.
/// Pixels of the halo cut off by the crop are handled by the zero-flux border
/// rule of the steppers.
///
/// # Errors
///
/// * [`FlowError::HaloOutsideImage`] if the padded region does not overlap the image at all.
/// * [`FlowError::OutputRegionOutsideImage`] if the output region itself is not inside the image.
///
/// # Example
///
/// ```
/// use varflow_image::{ImageRegion, ImageSize};
/// use varflow_flow::halo::required_input_region;
///
/// let largest = ImageRegion::from_size(ImageSize { width: 8, height: 8 });
/// let output = ImageRegion::new([0, 2], ImageSize { width: 3, height: 3 });
///
/// let input = required_input_region(&output, &largest).unwrap();
/// assert_eq!(input, ImageRegion::new([0, 1], ImageSize { width: 4, height: 5 }));
/// ```
pub fn required_input_region(
    output: &ImageRegion,
    largest: &ImageRegion,
) -> Result<ImageRegion, FlowError> {
    let input = output
        .pad(HALO_RADIUS)
        .crop(largest)
        .ok_or(FlowError::HaloOutsideImage {
            requested: *output,
            largest: *largest,
        })?;

    if !largest.contains_region(output) {
        return Err(FlowError::OutputRegionOutsideImage {
            requested: *output,
            largest: *largest,
        });
    }

    Ok(input)
}
