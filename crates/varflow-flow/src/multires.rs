//! Coarse to fine flow estimation.
//!
//! Both images are decomposed into pyramids. The flow is estimated at the
//! coarsest level first, then every finer level refines the upsampled estimate
//! of the previous one on a moving image warped by it.

use varflow_image::{FlowField, ScalarImage};
use varflow_imgproc::parallel::ExecutionStrategy;
use varflow_imgproc::pyramid::ImagePyramid;
use varflow_imgproc::warp::{resample_flow, warp_by_flow};

use crate::config::MultiResolutionConfig;
use crate::derivatives::check_pair;
use crate::engine::{crop_to, output_region, ComputeOptions, FlowEngine};
use crate::error::FlowError;
use crate::progress::report;

/// Factor applied to flow vectors when moving to a level with half the spacing.
pub const LEVEL_SCALE: f32 = 2.0;

/// Multi-resolution coordinator wrapping a [`FlowEngine`].
///
/// # Example
///
/// ```
/// use varflow_flow::config::{HornSchunckConfig, MultiResolutionConfig};
/// use varflow_flow::engine::{ComputeOptions, FlowEngine, HornSchunckEngine};
/// use varflow_flow::multires::MultiResolutionFlow;
/// use varflow_image::{ImageSize, ScalarImage};
///
/// let size = ImageSize { width: 32, height: 24 };
/// let image = ScalarImage::from_size_val(size, 10.0).unwrap();
///
/// let engine = HornSchunckEngine::new(HornSchunckConfig::default()).unwrap();
/// let coordinator = MultiResolutionFlow::new(engine, MultiResolutionConfig::default()).unwrap();
/// let flow = coordinator.compute(&image, &image, &ComputeOptions::default()).unwrap();
///
/// assert_eq!(flow.size(), size);
/// ```
#[derive(Debug, Clone)]
pub struct MultiResolutionFlow<E> {
    engine: E,
    config: MultiResolutionConfig,
    strategy: ExecutionStrategy,
}

impl<E: FlowEngine> MultiResolutionFlow<E> {
    /// Wrap `engine`, validating the pyramid configuration.
    ///
    /// # Errors
    ///
    /// [`FlowError::InvalidParameter`] if a parameter is out of range.
    pub fn new(engine: E, config: MultiResolutionConfig) -> Result<Self, FlowError> {
        config.validate()?;
        Ok(Self {
            engine,
            config,
            strategy: ExecutionStrategy::default(),
        })
    }

    /// Set the execution strategy of the pyramid, warp and resampling stages.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The pyramid configuration.
    pub fn config(&self) -> &MultiResolutionConfig {
        &self.config
    }
}

impl<E: FlowEngine> FlowEngine for MultiResolutionFlow<E> {
    fn name(&self) -> &'static str {
        "multi-resolution"
    }

    /// Estimate the flow from the coarsest to the finest level.
    ///
    /// The progress observer is notified once per level. An initial flow is
    /// not supported since the coarsest estimate always starts from zero.
    fn compute(
        &self,
        fixed: &ScalarImage,
        moving: &ScalarImage,
        options: &ComputeOptions<'_>,
    ) -> Result<FlowField, FlowError> {
        check_pair(fixed, moving)?;
        if options.initial_flow.is_some() {
            return Err(FlowError::invalid(
                "initial_flow",
                "not supported by the multi-resolution coordinator",
            ));
        }
        let region = output_region(fixed, options)?;

        let levels = self.config.number_of_levels;
        let sigma = self.config.pyramid_sigma;
        let fixed_pyramid = ImagePyramid::build(fixed, levels, sigma, self.strategy)?;
        let moving_pyramid = ImagePyramid::build(moving, levels, sigma, self.strategy)?;

        let mut current: Option<FlowField> = None;
        for (level, (fixed_level, moving_level)) in
            fixed_pyramid.iter().zip(moving_pyramid.iter()).enumerate()
        {
            // rebase the coarser estimate onto this grid, or start from zero
            let flow = match current.take() {
                Some(coarse) => resample_flow(&coarse, fixed_level, LEVEL_SCALE, self.strategy)?,
                None => FlowField::zeros_like(fixed_level),
            };
            log::debug!(
                "{}: level {}/{} ({})",
                self.name(),
                level + 1,
                levels,
                fixed_level.size()
            );

            let warped = warp_by_flow(moving_level, &flow, self.strategy)?;
            let level_options = ComputeOptions::default().with_initial_flow(&flow);
            let increment = self.engine.compute(fixed_level, &warped, &level_options)?;

            let mut total = flow;
            total
                .as_slice_mut()
                .iter_mut()
                .zip(increment.as_slice())
                .for_each(|(t, &d)| *t += d);
            current = Some(total);

            report(options.progress, level + 1, levels);
        }

        let flow =
            current.ok_or_else(|| FlowError::invalid("number_of_levels", "must be >= 1"))?;
        crop_to(flow, &region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HornSchunckConfig;
    use crate::engine::HornSchunckEngine;
    use std::sync::Mutex;
    use varflow_image::ImageSize;

    fn coordinator(levels: usize) -> Result<MultiResolutionFlow<HornSchunckEngine>, FlowError> {
        let engine = HornSchunckEngine::new(HornSchunckConfig {
            iterations: 5,
            ..Default::default()
        })?;
        MultiResolutionFlow::new(
            engine,
            MultiResolutionConfig {
                number_of_levels: levels,
                ..Default::default()
            },
        )
    }

    #[test]
    fn reports_one_step_per_level() -> Result<(), FlowError> {
        let image = ScalarImage::from_fn(
            ImageSize {
                width: 20,
                height: 16,
            },
            |x, y| [(x + 2 * y) as f32],
        );
        let seen = Mutex::new(Vec::new());
        let observer = |f: f32| seen.lock().unwrap().push(f);
        let options = ComputeOptions::default().with_progress(&observer);

        let flow = coordinator(4)?.compute(&image, &image, &options)?;
        assert_eq!(flow.size(), image.size());
        assert_eq!(flow.geometry(), image.geometry());
        assert_eq!(*seen.lock().unwrap(), vec![0.25, 0.5, 0.75, 1.0]);
        Ok(())
    }

    #[test]
    fn initial_flow_is_rejected() -> Result<(), FlowError> {
        let image = ScalarImage::from_size_val([8, 8].into(), 1.0)?;
        let initial = FlowField::zeros_like(&image);
        let options = ComputeOptions::default().with_initial_flow(&initial);
        assert!(matches!(
            coordinator(2)?.compute(&image, &image, &options),
            Err(FlowError::InvalidParameter {
                name: "initial_flow",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn single_level_matches_the_engine() -> Result<(), FlowError> {
        let size = ImageSize {
            width: 12,
            height: 9,
        };
        let fixed = ScalarImage::from_fn(size, |x, y| [((x * x + y) % 7) as f32]);
        let moving = ScalarImage::from_fn(size, |x, y| [((x * x + 2 * y) % 7) as f32]);

        let coordinator = coordinator(1)?;
        let direct = coordinator
            .engine()
            .compute(&fixed, &moving, &ComputeOptions::default())?;
        let layered = coordinator.compute(&fixed, &moving, &ComputeOptions::default())?;
        assert_eq!(direct.as_slice(), layered.as_slice());
        Ok(())
    }
}
