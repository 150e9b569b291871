//! Relaxation steppers.
//!
//! A stepper turns the flow field of one iteration into the next one. The
//! double-buffered steppers read an immutable previous buffer and write a
//! separate next buffer, so rows of the output are computed in parallel. The
//! in-place SOR sweep updates a single buffer in raster order and stays
//! sequential.
//!
//! Every stepper uses the same zero-flux border rule: a neighbour outside the
//! image takes the value of the centre pixel.

use varflow_image::{FlowField, ImageRegion, ImageSize};
use varflow_imgproc::parallel::{self, ExecutionStrategy};

use crate::error::FlowError;
use crate::halo::required_input_region;

mod clg;
pub use clg::ClgStepper;

mod horn_schunck;
pub use horn_schunck::HornSchunckStepper;

mod sor;
pub use sor::ClgSorSweep;

/// One discrete relaxation iteration over a double-buffered flow field.
pub trait RelaxationStepper: Sync {
    /// Region of the flow field updated by [`RelaxationStepper::step`].
    fn output_region(&self) -> ImageRegion;

    /// Compute the next flow field from the previous one.
    ///
    /// Pixels of `next` inside the output region are overwritten; all other
    /// pixels are copied from `prev`.
    ///
    /// # Errors
    ///
    /// [`FlowError::SizeMismatch`] if a buffer does not match the data term.
    fn step(&self, prev: &FlowField, next: &mut FlowField) -> Result<(), FlowError>;
}

/// Output region of a stepper expressed in local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LocalBounds {
    pub x0: usize,
    pub x1: usize,
    pub y0: usize,
    pub y1: usize,
    pub width: usize,
    pub height: usize,
}

impl LocalBounds {
    /// Validate the halo of `output` against `largest` and convert it to local coordinates.
    pub fn new(output: &ImageRegion, largest: &ImageRegion) -> Result<Self, FlowError> {
        required_input_region(output, largest)?;
        let x0 = (output.index[0] - largest.index[0]) as usize;
        let y0 = (output.index[1] - largest.index[1]) as usize;
        Ok(Self {
            x0,
            x1: x0 + output.size.width,
            y0,
            y1: y0 + output.size.height,
            width: largest.size.width,
            height: largest.size.height,
        })
    }

    /// Whether the full image size matches the bounds.
    pub fn check(&self, size: ImageSize) -> Result<(), FlowError> {
        if size.width != self.width || size.height != self.height {
            return Err(FlowError::SizeMismatch {
                expected: ImageSize {
                    width: self.width,
                    height: self.height,
                },
                actual: size,
            });
        }
        Ok(())
    }

    /// Pixel offsets of the left, right, upper and lower neighbours of `(x, y)`.
    #[inline]
    pub fn neighbours(&self, x: usize, y: usize) -> [usize; 4] {
        let left = if x > 0 { x - 1 } else { x };
        let right = if x + 1 < self.width { x + 1 } else { x };
        let up = if y > 0 { y - 1 } else { y };
        let down = if y + 1 < self.height { y + 1 } else { y };
        [
            y * self.width + left,
            y * self.width + right,
            up * self.width + x,
            down * self.width + x,
        ]
    }
}

/// Fill `next` row by row, computing the pixels inside `bounds` with `update`.
pub(crate) fn tiled_step<F>(
    prev: &FlowField,
    next: &mut FlowField,
    bounds: LocalBounds,
    strategy: ExecutionStrategy,
    update: F,
) -> Result<(), FlowError>
where
    F: Fn(usize, usize) -> [f32; 2] + Sync + Send,
{
    bounds.check(prev.size())?;
    bounds.check(next.size())?;

    let row_len = bounds.width * 2;
    let prev_data = prev.as_slice();
    parallel::for_each_row(strategy, next.as_slice_mut(), row_len, |y, row| {
        let prev_row = &prev_data[y * row_len..(y + 1) * row_len];
        if y < bounds.y0 || y >= bounds.y1 {
            row.copy_from_slice(prev_row);
            return;
        }
        row[..bounds.x0 * 2].copy_from_slice(&prev_row[..bounds.x0 * 2]);
        row[bounds.x1 * 2..].copy_from_slice(&prev_row[bounds.x1 * 2..]);
        for x in bounds.x0..bounds.x1 {
            let uv = update(x, y);
            row[x * 2] = uv[0];
            row[x * 2 + 1] = uv[1];
        }
    })?;

    Ok(())
}
