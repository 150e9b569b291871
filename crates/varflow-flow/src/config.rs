use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// How the CLG engine sweeps the flow field at each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    /// Successive over-relaxation on a single buffer, in raster order.
    ///
    /// Pixels read neighbours already updated in the same sweep, so the sweep
    /// is strictly sequential.
    #[default]
    InPlace,

    /// Every sweep reads the previous buffer and writes a separate one.
    ///
    /// Rows of the output are computed in parallel.
    DoubleBuffered,
}

/// Parameters of the Combined Local-Global engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClgConfig {
    /// Smoothing scale of the derivatives, in pixels.
    pub spatial_sigma: f32,
    /// Scale of the window integrating the structure tensor, in pixels.
    pub integration_sigma: f32,
    /// Smoothness weight; larger values give smoother fields.
    pub regularization: f32,
    /// Over-relaxation factor, in `(0, 2)`.
    pub relaxation: f32,
    /// Number of sweeps.
    pub iterations: usize,
    /// Sweep discipline.
    pub sweep: SweepMode,
}

impl Default for ClgConfig {
    fn default() -> Self {
        Self {
            spatial_sigma: 1.0,
            integration_sigma: 2.0,
            regularization: 200.0,
            relaxation: 1.9,
            iterations: 200,
            sweep: SweepMode::InPlace,
        }
    }
}

impl ClgConfig {
    /// Check every parameter range.
    ///
    /// # Errors
    ///
    /// [`FlowError::InvalidParameter`] naming the first offending field.
    pub fn validate(&self) -> Result<(), FlowError> {
        check_sigma("spatial_sigma", self.spatial_sigma)?;
        check_sigma("integration_sigma", self.integration_sigma)?;
        check_positive("regularization", self.regularization)?;
        if !(self.relaxation > 0.0 && self.relaxation < 2.0) {
            return Err(FlowError::invalid(
                "relaxation",
                format!("must be in (0, 2), got {}", self.relaxation),
            ));
        }
        check_iterations(self.iterations)
    }
}

/// Parameters of the Horn-Schunck engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HornSchunckConfig {
    /// Smoothing scale of the derivatives, in pixels.
    pub spatial_sigma: f32,
    /// Smoothness weight; its square is added to the gradient energy.
    pub smooth_weighting: f32,
    /// Number of sweeps.
    pub iterations: usize,
}

impl Default for HornSchunckConfig {
    fn default() -> Self {
        Self {
            spatial_sigma: 1.0,
            smooth_weighting: 10.0,
            iterations: 200,
        }
    }
}

impl HornSchunckConfig {
    /// Check every parameter range.
    ///
    /// # Errors
    ///
    /// [`FlowError::InvalidParameter`] naming the first offending field.
    pub fn validate(&self) -> Result<(), FlowError> {
        check_sigma("spatial_sigma", self.spatial_sigma)?;
        check_positive("smooth_weighting", self.smooth_weighting)?;
        check_iterations(self.iterations)
    }
}

/// Parameters of the coarse to fine coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiResolutionConfig {
    /// Number of pyramid levels, the finest one being the input resolution.
    pub number_of_levels: usize,
    /// Smoothing applied before each downsampling step, in pixels.
    pub pyramid_sigma: f32,
}

impl Default for MultiResolutionConfig {
    fn default() -> Self {
        Self {
            number_of_levels: 3,
            pyramid_sigma: 1.0,
        }
    }
}

impl MultiResolutionConfig {
    /// Check every parameter range.
    ///
    /// # Errors
    ///
    /// [`FlowError::InvalidParameter`] naming the first offending field.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.number_of_levels == 0 {
            return Err(FlowError::invalid("number_of_levels", "must be >= 1"));
        }
        check_sigma("pyramid_sigma", self.pyramid_sigma)
    }
}

fn check_sigma(name: &'static str, sigma: f32) -> Result<(), FlowError> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(FlowError::invalid(
            name,
            format!("must be finite and >= 0, got {sigma}"),
        ));
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f32) -> Result<(), FlowError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FlowError::invalid(
            name,
            format!("must be finite and > 0, got {value}"),
        ));
    }
    Ok(())
}

fn check_iterations(iterations: usize) -> Result<(), FlowError> {
    if iterations == 0 {
        return Err(FlowError::invalid("iterations", "must be >= 1"));
    }
    Ok(())
}
