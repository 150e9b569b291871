use varflow_image::{FlowField, ScalarImage};
use varflow_imgproc::parallel::ExecutionStrategy;

use super::{crop_to, output_region, relax, ComputeOptions, FlowEngine};
use crate::config::{ClgConfig, SweepMode};
use crate::derivatives::check_pair;
use crate::error::FlowError;
use crate::progress::report;
use crate::stepper::{ClgSorSweep, ClgStepper};
use crate::structure_tensor::StructureTensorBuilder;

/// Combined Local-Global flow engine.
///
/// # Example
///
/// ```
/// use varflow_flow::config::ClgConfig;
/// use varflow_flow::engine::{ClgEngine, ComputeOptions, FlowEngine};
/// use varflow_image::{ImageSize, ScalarImage};
///
/// let image = ScalarImage::from_size_val(ImageSize { width: 4, height: 4 }, 0.0).unwrap();
/// let config = ClgConfig { iterations: 50, ..Default::default() };
///
/// let engine = ClgEngine::new(config).unwrap();
/// let flow = engine.compute(&image, &image, &ComputeOptions::default()).unwrap();
///
/// assert!(flow.as_slice().iter().all(|&v| v == 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct ClgEngine {
    config: ClgConfig,
    strategy: ExecutionStrategy,
}

impl ClgEngine {
    /// Create an engine, validating the configuration.
    ///
    /// # Errors
    ///
    /// [`FlowError::InvalidParameter`] if a parameter is out of range.
    pub fn new(config: ClgConfig) -> Result<Self, FlowError> {
        config.validate()?;
        Ok(Self {
            config,
            strategy: ExecutionStrategy::default(),
        })
    }

    /// Set the execution strategy of the filters and of the double-buffered sweep.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The engine configuration.
    pub fn config(&self) -> &ClgConfig {
        &self.config
    }
}

impl FlowEngine for ClgEngine {
    fn name(&self) -> &'static str {
        "clg"
    }

    /// Estimate the flow with the CLG relaxation.
    ///
    /// The CLG result is always an increment computed from a zero field, so
    /// an initial flow in `options` is ignored.
    fn compute(
        &self,
        fixed: &ScalarImage,
        moving: &ScalarImage,
        options: &ComputeOptions<'_>,
    ) -> Result<FlowField, FlowError> {
        check_pair(fixed, moving)?;
        let region = output_region(fixed, options)?;
        if options.initial_flow.is_some() {
            log::debug!("{}: initial flow ignored, the result is an increment", self.name());
        }

        let config = &self.config;
        let tensor = StructureTensorBuilder::new()
            .fixed(fixed)
            .moving(moving)
            .spatial_sigma(config.spatial_sigma)
            .integration_sigma(config.integration_sigma)
            .strategy(self.strategy)
            .build()?;

        let mut flow = FlowField::zeros_like(fixed);
        let iterations = config.iterations;
        log::debug!(
            "{}: {} {:?} sweeps over {}",
            self.name(),
            iterations,
            config.sweep,
            region
        );

        match config.sweep {
            SweepMode::InPlace => {
                let sweep =
                    ClgSorSweep::new(&tensor, config.regularization, config.relaxation, region)?;
                for i in 0..iterations {
                    sweep.sweep(&mut flow)?;
                    log::trace!("iteration {}/{}", i + 1, iterations);
                    report(options.progress, i + 1, iterations);
                }
            }
            SweepMode::DoubleBuffered => {
                if config.relaxation > 1.0 {
                    log::warn!(
                        "{}: over-relaxation {} with a double-buffered sweep may not converge",
                        self.name(),
                        config.relaxation
                    );
                }
                let stepper = ClgStepper::new(
                    &tensor,
                    config.regularization,
                    config.relaxation,
                    region,
                    self.strategy,
                )?;
                flow = relax(&stepper, flow, iterations, options.progress)?;
            }
        }

        crop_to(flow, &region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use varflow_image::{ImageRegion, ImageSize};

    fn ramp_pair() -> (ScalarImage, ScalarImage) {
        let size = ImageSize {
            width: 10,
            height: 8,
        };
        let fixed = ScalarImage::from_fn(size, |x, y| [(x * 3 + y) as f32]);
        let moving = ScalarImage::from_fn(size, |x, y| [(x * 3 + y) as f32 - 1.5]);
        (fixed, moving)
    }

    #[test]
    fn reports_every_sweep() -> Result<(), FlowError> {
        let (fixed, moving) = ramp_pair();
        let engine = ClgEngine::new(ClgConfig {
            iterations: 4,
            ..Default::default()
        })?;

        let seen = Mutex::new(Vec::new());
        let observer = |f: f32| seen.lock().unwrap().push(f);
        let options = ComputeOptions::default().with_progress(&observer);
        engine.compute(&fixed, &moving, &options)?;

        assert_eq!(*seen.lock().unwrap(), vec![0.25, 0.5, 0.75, 1.0]);
        Ok(())
    }

    #[test]
    fn result_is_cropped_to_the_output_region() -> Result<(), FlowError> {
        let (fixed, moving) = ramp_pair();
        let engine = ClgEngine::new(ClgConfig {
            iterations: 3,
            sweep: SweepMode::DoubleBuffered,
            relaxation: 1.0,
            ..Default::default()
        })?
        .with_strategy(ExecutionStrategy::Serial);

        let region = ImageRegion::new(
            [2, 1],
            ImageSize {
                width: 5,
                height: 4,
            },
        );
        let options = ComputeOptions::default().with_output_region(region);
        let flow = engine.compute(&fixed, &moving, &options)?;
        assert_eq!(flow.region(), region);
        assert_eq!(flow.geometry(), fixed.geometry());
        Ok(())
    }

    #[test]
    fn fails_before_any_work() -> Result<(), FlowError> {
        let (fixed, _) = ramp_pair();
        let other = ScalarImage::from_size_val([3, 3].into(), 0.0)?;
        let engine = ClgEngine::new(ClgConfig::default())?;
        assert!(matches!(
            engine.compute(&fixed, &other, &ComputeOptions::default()),
            Err(FlowError::SizeMismatch { .. })
        ));

        let options = ComputeOptions::default().with_output_region(ImageRegion::new(
            [-5, 0],
            ImageSize {
                width: 2,
                height: 2,
            },
        ));
        assert!(matches!(
            engine.compute(&fixed, &fixed, &options),
            Err(FlowError::HaloOutsideImage { .. })
        ));
        Ok(())
    }

    #[test]
    fn rejects_invalid_config() {
        let config = ClgConfig {
            regularization: -1.0,
            ..Default::default()
        };
        assert!(ClgEngine::new(config).is_err());
    }
}
