#![deny(missing_docs)]
//! Pixel buffer types for the softlens image filters

/// image representation for image filtering purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize, PixelType};
