//! Geometric transformations driven by dense displacement fields.

mod flow;
pub use flow::warp_by_flow;

mod resample;
pub use resample::resample_flow;
