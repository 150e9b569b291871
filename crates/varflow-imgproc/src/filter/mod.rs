//! Filter operations
//!
//! Separable gaussian smoothing and gaussian derivatives with zero-flux
//! (replicated) borders.

/// Filter kernels
pub mod kernels;

/// Filter operations
mod ops;
pub use ops::*;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::*;
