//! Flow engines.
//!
//! An engine builds its data term once from an image pair and then drives a
//! fixed number of relaxation sweeps. Engines are configured once and can be
//! reused for any number of pairs.

use varflow_image::{FlowField, ImageRegion, ScalarImage};

use crate::error::FlowError;
use crate::halo::required_input_region;
use crate::progress::{report, ProgressObserver};
use crate::stepper::RelaxationStepper;

mod clg;
pub use clg::ClgEngine;

mod horn_schunck;
pub use horn_schunck::HornSchunckEngine;

/// Per call options of [`FlowEngine::compute`].
#[derive(Clone, Copy, Default)]
pub struct ComputeOptions<'a> {
    /// Flow the engine refines, congruent with the fixed image.
    pub initial_flow: Option<&'a FlowField>,
    /// Region of the result; the largest region of the fixed image if unset.
    pub output_region: Option<ImageRegion>,
    /// Receives the completed fraction after every sweep.
    pub progress: Option<&'a dyn ProgressObserver>,
}

impl<'a> ComputeOptions<'a> {
    /// Set the initial flow.
    pub fn with_initial_flow(mut self, flow: &'a FlowField) -> Self {
        self.initial_flow = Some(flow);
        self
    }

    /// Set the requested output region.
    pub fn with_output_region(mut self, region: ImageRegion) -> Self {
        self.output_region = Some(region);
        self
    }

    /// Set the progress observer.
    pub fn with_progress(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.progress = Some(observer);
        self
    }
}

impl std::fmt::Debug for ComputeOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeOptions")
            .field("initial_flow", &self.initial_flow.map(|flow| flow.region()))
            .field("output_region", &self.output_region)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Dense flow estimation between a fixed and a moving image.
pub trait FlowEngine {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Estimate the flow mapping `fixed` onto `moving`.
    ///
    /// The returned field has the region and geometry of the requested output
    /// region of `fixed`.
    ///
    /// # Errors
    ///
    /// Configuration and geometry errors are reported before any sweep runs.
    fn compute(
        &self,
        fixed: &ScalarImage,
        moving: &ScalarImage,
        options: &ComputeOptions<'_>,
    ) -> Result<FlowField, FlowError>;
}

impl<E: FlowEngine + ?Sized> FlowEngine for &E {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn compute(
        &self,
        fixed: &ScalarImage,
        moving: &ScalarImage,
        options: &ComputeOptions<'_>,
    ) -> Result<FlowField, FlowError> {
        (**self).compute(fixed, moving, options)
    }
}

/// Requested output region of `fixed`, with its halo validated.
pub(crate) fn output_region(
    fixed: &ScalarImage,
    options: &ComputeOptions<'_>,
) -> Result<ImageRegion, FlowError> {
    let largest = fixed.region();
    let region = options.output_region.unwrap_or(largest);
    required_input_region(&region, &largest)?;
    Ok(region)
}

/// Crop a full size field down to the output region.
pub(crate) fn crop_to(flow: FlowField, region: &ImageRegion) -> Result<FlowField, FlowError> {
    if flow.region() == *region {
        return Ok(flow);
    }
    Ok(flow.crop(region)?)
}

/// Drive `iterations` double-buffered steps, swapping the buffers after each one.
pub(crate) fn relax<S>(
    stepper: &S,
    flow: FlowField,
    iterations: usize,
    progress: Option<&dyn ProgressObserver>,
) -> Result<FlowField, FlowError>
where
    S: RelaxationStepper + ?Sized,
{
    let mut prev = flow;
    let mut next = prev.clone();
    for i in 0..iterations {
        stepper.step(&prev, &mut next)?;
        std::mem::swap(&mut prev, &mut next);
        log::trace!("iteration {}/{}", i + 1, iterations);
        report(progress, i + 1, iterations);
    }
    Ok(prev)
}
