#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Engine and pyramid configuration.
pub mod config;

/// Spatial and temporal derivatives of an image pair.
pub mod derivatives;

/// Flow engines driving the relaxation sweeps.
pub mod engine;

/// Error types for the flow module.
pub mod error;

/// Halo computation of the relaxation stencils.
pub mod halo;

/// Flow field statistics.
pub mod metrics;

/// Multi-resolution coordinator.
pub mod multires;

/// Progress notifications.
pub mod progress;

/// Flow estimation over frame sequences.
pub mod sequence;

/// Relaxation steppers.
pub mod stepper;

/// Structure tensor of an image pair.
pub mod structure_tensor;

pub use crate::config::{ClgConfig, HornSchunckConfig, MultiResolutionConfig, SweepMode};
pub use crate::engine::{ClgEngine, ComputeOptions, FlowEngine, HornSchunckEngine};
pub use crate::error::FlowError;
pub use crate::multires::MultiResolutionFlow;
pub use crate::progress::{NoProgress, ProgressObserver};
