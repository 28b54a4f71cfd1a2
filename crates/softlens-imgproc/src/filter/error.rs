use softlens_image::{ImageError, ImageSize};

/// Errors related to filter operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// The kernel has a zero dimension or its weights do not fill it.
    #[error("Invalid kernel: {width}x{height} kernel with {len} weights")]
    InvalidKernel {
        /// Kernel width.
        width: usize,
        /// Kernel height.
        height: usize,
        /// Number of weights provided.
        len: usize,
    },

    /// The gaussian sigma must be positive and finite.
    #[error("Invalid gaussian sigma: {0}")]
    InvalidSigma(f32),

    /// The source image is empty or its data does not match its shape.
    #[error("Invalid image buffer: {size} with {num_channels} channels and {len} values")]
    InvalidBuffer {
        /// Size of the source image.
        size: ImageSize,
        /// Channels of the source image.
        num_channels: usize,
        /// Number of values in the source data.
        len: usize,
    },

    /// The edge policy name is not recognised.
    #[error("Unknown edge policy: {0}")]
    UnknownEdgePolicy(String),

    /// Failed to create the destination image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] ImageError),
}
