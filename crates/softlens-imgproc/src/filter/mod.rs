//! Filter operations
//!
//! This module provides 2D convolution filters for image processing.

/// Edge handling policies
mod border;
pub use border::EdgePolicy;

/// Direct 2D convolution
mod convolution;
pub use convolution::filter2d;

/// Filter errors
mod error;
pub use error::FilterError;

/// Filter kernels
pub mod kernels;
pub use kernels::Kernel2d;

/// Filter operations
mod ops;
pub use ops::*;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::separable_filter;
