use varflow_image::{FlowField, ImageRegion, StructureTensor};
use varflow_imgproc::parallel::ExecutionStrategy;

use super::{tiled_step, LocalBounds, RelaxationStepper};
use crate::error::FlowError;
use crate::structure_tensor::component::{T11, T12, T13, T21, T22, T23};

/// Over-relaxed update of one pixel of the CLG system.
///
/// The freshly computed `u` feeds the `v` equation.
#[inline]
pub(crate) fn clg_update(
    curr: [f32; 2],
    sum: [f32; 2],
    j: &[f32],
    factor: f32,
    omega: f32,
) -> [f32; 2] {
    let u = (1.0 - omega) * curr[0]
        + omega * (sum[0] - factor * (j[T12] * curr[1] + j[T13])) / (4.0 + factor * j[T11]);
    let v = (1.0 - omega) * curr[1]
        + omega * (sum[1] - factor * (j[T21] * u + j[T23])) / (4.0 + factor * j[T22]);
    [u, v]
}

/// Data term weight of the CLG system, `pixel area / regularization`.
pub(crate) fn clg_factor(tensor: &StructureTensor, regularization: f32) -> Result<f32, FlowError> {
    if !regularization.is_finite() || regularization <= 0.0 {
        return Err(FlowError::invalid(
            "regularization",
            format!("must be finite and > 0, got {regularization}"),
        ));
    }
    Ok(tensor.geometry().pixel_area() / regularization)
}

pub(crate) fn check_relaxation(omega: f32) -> Result<(), FlowError> {
    if !(omega > 0.0 && omega < 2.0) {
        return Err(FlowError::invalid(
            "relaxation",
            format!("must be in (0, 2), got {omega}"),
        ));
    }
    Ok(())
}

/// Double-buffered CLG relaxation driven by the structure tensor.
///
/// Neighbour sums are read from the previous buffer only, so the output
/// region is split into row tiles computed concurrently.
#[derive(Debug)]
pub struct ClgStepper<'a> {
    tensor: &'a StructureTensor,
    factor: f32,
    omega: f32,
    region: ImageRegion,
    bounds: LocalBounds,
    strategy: ExecutionStrategy,
}

impl<'a> ClgStepper<'a> {
    /// Create a stepper for `output_region` of the tensor grid.
    ///
    /// # Arguments
    ///
    /// * `tensor` - The integrated structure tensor.
    /// * `regularization` - The smoothness weight, the data term is scaled by `pixel area / regularization`.
    /// * `relaxation` - The over-relaxation factor in `(0, 2)`.
    /// * `output_region` - The region to update, in the tensor index space.
    /// * `strategy` - How rows are distributed across workers.
    ///
    /// # Errors
    ///
    /// Invalid parameters, or a region whose halo cannot be satisfied.
    pub fn new(
        tensor: &'a StructureTensor,
        regularization: f32,
        relaxation: f32,
        output_region: ImageRegion,
        strategy: ExecutionStrategy,
    ) -> Result<Self, FlowError> {
        check_relaxation(relaxation)?;
        let factor = clg_factor(tensor, regularization)?;
        let bounds = LocalBounds::new(&output_region, &tensor.region())?;
        Ok(Self {
            tensor,
            factor,
            omega: relaxation,
            region: output_region,
            bounds,
            strategy,
        })
    }
}

impl RelaxationStepper for ClgStepper<'_> {
    fn output_region(&self) -> ImageRegion {
        self.region
    }

    fn step(&self, prev: &FlowField, next: &mut FlowField) -> Result<(), FlowError> {
        let data = prev.as_slice();
        let tensor = self.tensor.as_slice();
        let bounds = self.bounds;

        tiled_step(prev, next, bounds, self.strategy, |x, y| {
            let p = y * bounds.width + x;
            let mut sum = [0.0f32; 2];
            for n in bounds.neighbours(x, y) {
                sum[0] += data[n * 2];
                sum[1] += data[n * 2 + 1];
            }
            clg_update(
                [data[p * 2], data[p * 2 + 1]],
                sum,
                &tensor[p * 6..p * 6 + 6],
                self.factor,
                self.omega,
            )
        })
    }
}
