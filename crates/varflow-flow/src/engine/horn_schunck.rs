use varflow_image::{FlowField, ScalarImage};
use varflow_imgproc::parallel::ExecutionStrategy;

use super::{crop_to, output_region, relax, ComputeOptions, FlowEngine};
use crate::config::HornSchunckConfig;
use crate::derivatives::{check_pair, SpatioTemporalDerivatives};
use crate::error::FlowError;
use crate::stepper::HornSchunckStepper;

/// Horn-Schunck flow engine.
///
/// When an initial flow is given the engine returns the residual on top of
/// it, so the total estimate is `initial + result`.
#[derive(Debug, Clone)]
pub struct HornSchunckEngine {
    config: HornSchunckConfig,
    strategy: ExecutionStrategy,
}

impl HornSchunckEngine {
    /// Create an engine, validating the configuration.
    ///
    /// # Errors
    ///
    /// [`FlowError::InvalidParameter`] if a parameter is out of range.
    pub fn new(config: HornSchunckConfig) -> Result<Self, FlowError> {
        config.validate()?;
        Ok(Self {
            config,
            strategy: ExecutionStrategy::default(),
        })
    }

    /// Set the execution strategy of the filters and the sweeps.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The engine configuration.
    pub fn config(&self) -> &HornSchunckConfig {
        &self.config
    }
}

impl FlowEngine for HornSchunckEngine {
    fn name(&self) -> &'static str {
        "horn-schunck"
    }

    fn compute(
        &self,
        fixed: &ScalarImage,
        moving: &ScalarImage,
        options: &ComputeOptions<'_>,
    ) -> Result<FlowField, FlowError> {
        check_pair(fixed, moving)?;
        let region = output_region(fixed, options)?;

        let zero_flow;
        let initial = match options.initial_flow {
            Some(flow) => {
                if flow.size() != fixed.size() {
                    return Err(FlowError::SizeMismatch {
                        expected: fixed.size(),
                        actual: flow.size(),
                    });
                }
                flow
            }
            None => {
                zero_flow = FlowField::zeros_like(fixed);
                &zero_flow
            }
        };

        let config = &self.config;
        let derivatives = SpatioTemporalDerivatives::compute(
            fixed,
            moving,
            config.spatial_sigma,
            self.strategy,
        )?;
        log::debug!(
            "{}: derivatives built, {} sweeps over {}",
            self.name(),
            config.iterations,
            region
        );

        let stepper = HornSchunckStepper::new(
            &derivatives,
            initial,
            config.smooth_weighting,
            region,
            self.strategy,
        )?;
        let flow = relax(
            &stepper,
            FlowField::zeros_like(fixed),
            config.iterations,
            options.progress,
        )?;

        crop_to(flow, &region)
    }
}
