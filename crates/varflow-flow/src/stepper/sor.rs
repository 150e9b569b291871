use varflow_image::{FlowField, ImageRegion, StructureTensor};

use super::clg::{check_relaxation, clg_factor, clg_update};
use super::LocalBounds;
use crate::error::FlowError;

/// In-place successive over-relaxation of the CLG system.
///
/// The sweep visits the output region in raster order on a single buffer, so
/// the left and upper neighbours of a pixel already hold their values for the
/// current sweep (Gauss-Seidel ordering). The result depends on the visiting
/// order, hence the sweep never runs on more than one thread.
#[derive(Debug)]
pub struct ClgSorSweep<'a> {
    tensor: &'a StructureTensor,
    factor: f32,
    omega: f32,
    region: ImageRegion,
    bounds: LocalBounds,
}

impl<'a> ClgSorSweep<'a> {
    /// Create a sweep over `output_region` of the tensor grid.
    ///
    /// # Errors
    ///
    /// Invalid parameters, or a region whose halo cannot be satisfied.
    pub fn new(
        tensor: &'a StructureTensor,
        regularization: f32,
        relaxation: f32,
        output_region: ImageRegion,
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
        })
    }

    /// Region updated by each sweep.
    pub fn output_region(&self) -> ImageRegion {
        self.region
    }

    /// Run one full raster pass over the output region of `flow`.
    ///
    /// # Errors
    ///
    /// [`FlowError::SizeMismatch`] if `flow` does not match the tensor.
    pub fn sweep(&self, flow: &mut FlowField) -> Result<(), FlowError> {
        let bounds = self.bounds;
        bounds.check(flow.size())?;

        let tensor = self.tensor.as_slice();
        let data = flow.as_slice_mut();
        for y in bounds.y0..bounds.y1 {
            for x in bounds.x0..bounds.x1 {
                let p = y * bounds.width + x;
                let mut sum = [0.0f32; 2];
                for n in bounds.neighbours(x, y) {
                    sum[0] += data[n * 2];
                    sum[1] += data[n * 2 + 1];
                }
                let uv = clg_update(
                    [data[p * 2], data[p * 2 + 1]],
                    sum,
                    &tensor[p * 6..p * 6 + 6],
                    self.factor,
                    self.omega,
                );
                data[p * 2] = uv[0];
                data[p * 2 + 1] = uv[1];
            }
        }
        Ok(())
    }
}
