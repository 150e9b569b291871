#![doc = include_str!("../README.md")]

#[doc(inline)]
pub use varflow_image as image;

#[doc(inline)]
pub use varflow_imgproc as imgproc;

#[doc(inline)]
pub use varflow_flow as flow;
