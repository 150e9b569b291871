//! Structure tensor of an image pair.
//!
//! For `G = [Ix, Iy, It]` the tensor stores the first two rows of `G Gᵗ`,
//! i.e. `(T11, T12, T13, T21, T22, T23)`, integrated over a gaussian window.

use varflow_image::{ScalarImage, StructureTensor};
use varflow_imgproc::filter::gaussian_blur;
use varflow_imgproc::parallel::{self, ExecutionStrategy};

use crate::derivatives::SpatioTemporalDerivatives;
use crate::error::FlowError;

/// Channel indices of the tensor components.
pub mod component {
    /// `Ix * Ix`
    pub const T11: usize = 0;
    /// `Ix * Iy`
    pub const T12: usize = 1;
    /// `Ix * It`
    pub const T13: usize = 2;
    /// `Iy * Ix`
    pub const T21: usize = 3;
    /// `Iy * Iy`
    pub const T22: usize = 4;
    /// `Iy * It`
    pub const T23: usize = 5;
}

/// Per pixel outer products of the derivatives, before integration.
pub fn raw_structure_tensor(
    derivatives: &SpatioTemporalDerivatives,
    strategy: ExecutionStrategy,
) -> Result<StructureTensor, FlowError> {
    let SpatioTemporalDerivatives { ix, iy, it } = derivatives;
    let cols = ix.cols();
    let mut tensor = StructureTensor::zeros_like(ix);
    if tensor.is_empty() {
        return Ok(tensor);
    }

    let (ix, iy, it) = (ix.as_slice(), iy.as_slice(), it.as_slice());
    parallel::for_each_row(strategy, tensor.as_slice_mut(), cols * 6, |r, row| {
        let offset = r * cols;
        row.chunks_exact_mut(6).enumerate().for_each(|(c, t)| {
            let (dx, dy, dt) = (ix[offset + c], iy[offset + c], it[offset + c]);
            t[component::T11] = dx * dx;
            t[component::T12] = dx * dy;
            t[component::T13] = dx * dt;
            t[component::T21] = dy * dx;
            t[component::T22] = dy * dy;
            t[component::T23] = dy * dt;
        });
    })?;

    Ok(tensor)
}

/// Builds the structure tensor consumed by the CLG relaxation.
///
/// # Example
///
/// ```
/// use varflow_image::{ImageSize, ScalarImage};
/// use varflow_flow::structure_tensor::StructureTensorBuilder;
///
/// let size = ImageSize { width: 8, height: 8 };
/// let fixed = ScalarImage::from_fn(size, |x, y| [(x * y) as f32]);
/// let moving = ScalarImage::from_fn(size, |x, y| [(x * y + x) as f32]);
///
/// let tensor = StructureTensorBuilder::new()
///     .fixed(&fixed)
///     .moving(&moving)
///     .spatial_sigma(1.0)
///     .integration_sigma(2.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(tensor.size(), size);
/// assert_eq!(tensor.num_channels(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct StructureTensorBuilder<'a> {
    fixed: Option<&'a ScalarImage>,
    moving: Option<&'a ScalarImage>,
    spatial_sigma: f32,
    integration_sigma: f32,
    strategy: ExecutionStrategy,
}

impl Default for StructureTensorBuilder<'_> {
    fn default() -> Self {
        Self {
            fixed: None,
            moving: None,
            spatial_sigma: 1.0,
            integration_sigma: 2.0,
            strategy: ExecutionStrategy::default(),
        }
    }
}

impl<'a> StructureTensorBuilder<'a> {
    /// Create a builder with no inputs and the default scales.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image the spatial derivatives are taken on.
    pub fn fixed(mut self, image: &'a ScalarImage) -> Self {
        self.fixed = Some(image);
        self
    }

    /// Set the second image of the pair.
    pub fn moving(mut self, image: &'a ScalarImage) -> Self {
        self.moving = Some(image);
        self
    }

    /// Set the derivative smoothing scale.
    pub fn spatial_sigma(mut self, sigma: f32) -> Self {
        self.spatial_sigma = sigma;
        self
    }

    /// Set the integration window scale.
    pub fn integration_sigma(mut self, sigma: f32) -> Self {
        self.integration_sigma = sigma;
        self
    }

    /// Set the execution strategy of the filters.
    pub fn strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    fn derivatives(&self) -> Result<SpatioTemporalDerivatives, FlowError> {
        let fixed = self.fixed.ok_or(FlowError::MissingInput("fixed image"))?;
        let moving = self.moving.ok_or(FlowError::MissingInput("moving image"))?;
        SpatioTemporalDerivatives::compute(fixed, moving, self.spatial_sigma, self.strategy)
    }

    /// Compute the outer products without the integration window.
    ///
    /// # Errors
    ///
    /// [`FlowError::MissingInput`] if an image was not set.
    pub fn build_raw(&self) -> Result<StructureTensor, FlowError> {
        raw_structure_tensor(&self.derivatives()?, self.strategy)
    }

    /// Compute the integrated structure tensor.
    ///
    /// Each of the six channels is smoothed independently with
    /// `integration_sigma`.
    ///
    /// # Errors
    ///
    /// [`FlowError::MissingInput`] if an image was not set.
    pub fn build(&self) -> Result<StructureTensor, FlowError> {
        let raw = self.build_raw()?;
        let mut tensor = StructureTensor::zeros_like(&raw);
        gaussian_blur(&raw, &mut tensor, self.integration_sigma, self.strategy)?;
        log::debug!(
            "structure tensor built: {} (sigma {}, integration {})",
            tensor.size(),
            self.spatial_sigma,
            self.integration_sigma
        );
        Ok(tensor)
    }
}
