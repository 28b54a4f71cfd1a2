/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error to decode the image.
    #[error("Failed to decode the image. {0}")]
    ImageDecodeError(#[source] image::ImageError),

    /// The image header announces more pixels than allowed.
    #[error("Image of {width}x{height} pixels exceeds the limit of {max_pixels} pixels")]
    TooManyPixels {
        /// Width announced by the header.
        width: u32,
        /// Height announced by the header.
        height: u32,
        /// Maximum number of pixels accepted.
        max_pixels: u64,
    },

    /// The decoder stopped at one of its resource limits.
    #[error("Image decoding exceeded its limits. {0}")]
    DecodeLimitExceeded(#[source] image::ImageError),

    /// Error to encode the JPEG image.
    #[error("Error with Jpeg encoding. {0}")]
    JpegEncodingError(#[source] image::ImageError),

    /// The number of channels cannot be encoded.
    #[error("Unsupported number of channels for encoding: {0}")]
    UnsupportedChannels(usize),

    /// The image dimensions do not fit the codec.
    #[error("Image size {0}x{1} is not supported by the codec")]
    UnsupportedSize(usize, usize),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] softlens_image::ImageError),
}
