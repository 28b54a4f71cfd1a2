#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the io module.
pub mod error;

/// Functions to decode and encode images from memory.
pub mod functional;

pub use crate::error::IoError;
