use varflow_image::{FlowField, ImageRegion};
use varflow_imgproc::parallel::ExecutionStrategy;

use super::{tiled_step, LocalBounds, RelaxationStepper};
use crate::derivatives::SpatioTemporalDerivatives;
use crate::error::FlowError;

const AXIS_WEIGHT: f32 = 1.0 / 6.0;
const DIAGONAL_WEIGHT: f32 = 1.0 / 12.0;

/// Double-buffered Horn-Schunck relaxation.
///
/// The stepper solves for a residual on top of a fixed initial flow: the
/// smoothness term is evaluated on the total flow `current + initial`, while
/// the data term only sees the residual, since the derivatives are taken
/// against an image already warped by the initial flow. The total estimate is
/// therefore `current + initial`.
#[derive(Debug)]
pub struct HornSchunckStepper<'a> {
    derivatives: &'a SpatioTemporalDerivatives,
    initial: &'a FlowField,
    weight: f32,
    region: ImageRegion,
    bounds: LocalBounds,
    strategy: ExecutionStrategy,
}

impl<'a> HornSchunckStepper<'a> {
    /// Create a stepper for `output_region` of the derivative grid.
    ///
    /// # Arguments
    ///
    /// * `derivatives` - The spatial and temporal derivatives of the pair.
    /// * `initial_flow` - The flow the residual is computed against.
    /// * `smooth_weighting` - The smoothness weight, squared in the update.
    /// * `output_region` - The region to update, in the derivative index space.
    /// * `strategy` - How rows are distributed across workers.
    ///
    /// # Errors
    ///
    /// Invalid parameters, an initial flow not congruent with the derivatives,
    /// or a region whose halo cannot be satisfied.
    pub fn new(
        derivatives: &'a SpatioTemporalDerivatives,
        initial_flow: &'a FlowField,
        smooth_weighting: f32,
        output_region: ImageRegion,
        strategy: ExecutionStrategy,
    ) -> Result<Self, FlowError> {
        if !smooth_weighting.is_finite() || smooth_weighting <= 0.0 {
            return Err(FlowError::invalid(
                "smooth_weighting",
                format!("must be finite and > 0, got {smooth_weighting}"),
            ));
        }
        let bounds = LocalBounds::new(&output_region, &derivatives.ix.region())?;
        bounds.check(initial_flow.size())?;
        Ok(Self {
            derivatives,
            initial: initial_flow,
            weight: smooth_weighting * smooth_weighting,
            region: output_region,
            bounds,
            strategy,
        })
    }

    // Weighted mean of the eight neighbours of the total flow.
    #[inline]
    fn laplace(&self, current: &[f32], x: usize, y: usize) -> [f32; 2] {
        let initial = self.initial.as_slice();
        let b = &self.bounds;
        let xs = [x.saturating_sub(1), x, (x + 1).min(b.width - 1)];
        let ys = [y.saturating_sub(1), y, (y + 1).min(b.height - 1)];

        let mut acc = [0.0f32; 2];
        for (j, &ny) in ys.iter().enumerate() {
            for (i, &nx) in xs.iter().enumerate() {
                let w = match (i, j) {
                    (1, 1) => continue,
                    (1, _) | (_, 1) => AXIS_WEIGHT,
                    _ => DIAGONAL_WEIGHT,
                };
                let n = (ny * b.width + nx) * 2;
                acc[0] += w * (current[n] + initial[n]);
                acc[1] += w * (current[n + 1] + initial[n + 1]);
            }
        }
        acc
    }
}

impl RelaxationStepper for HornSchunckStepper<'_> {
    fn output_region(&self) -> ImageRegion {
        self.region
    }

    fn step(&self, prev: &FlowField, next: &mut FlowField) -> Result<(), FlowError> {
        let current = prev.as_slice();
        let initial = self.initial.as_slice();
        let (ix, iy, it) = (
            self.derivatives.ix.as_slice(),
            self.derivatives.iy.as_slice(),
            self.derivatives.it.as_slice(),
        );
        let width = self.bounds.width;

        tiled_step(prev, next, self.bounds, self.strategy, |x, y| {
            let p = y * width + x;
            let [lu, lv] = self.laplace(current, x, y);
            let (ru, rv) = (lu - initial[p * 2], lv - initial[p * 2 + 1]);
            let (dx, dy, dt) = (ix[p], iy[p], it[p]);
            let ratio = (dx * ru + dy * rv + dt) / (self.weight + dx * dx + dy * dy);
            [ru - dx * ratio, rv - dy * ratio]
        })
    }
}
