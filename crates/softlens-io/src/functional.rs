use std::io::Cursor;

use image::{codecs::jpeg::JpegEncoder, ExtendedColorType, ImageReader};
use softlens_image::{Image, ImageSize};

use crate::error::IoError;

/// Decodes an image from raw bytes, guessing the format from its content.
///
/// Grayscale images decode to a single channel, images with an alpha channel
/// to four channels _(rgba8)_ and everything else to three channels _(rgb8)_.
///
/// # Arguments
///
/// * `bytes` - The encoded image data.
///
/// # Returns
///
/// An image with 8-bit pixel data.
pub fn decode_image(bytes: &[u8]) -> Result<Image<u8>, IoError> {
    decode_image_with_limits(bytes, None)
}

/// Decodes an image from raw bytes, rejecting images with too many pixels.
///
/// The dimensions are read from the header first, so oversized images are
/// rejected before any pixel data is decoded.
///
/// # Arguments
///
/// * `bytes` - The encoded image data.
/// * `max_pixels` - The maximum `width * height` accepted, or `None` for no limit.
///
/// # Returns
///
/// An image with 8-bit pixel data.
///
/// # Errors
///
/// Returns [`IoError::TooManyPixels`] if the header announces more than
/// `max_pixels` pixels and [`IoError::DecodeLimitExceeded`] if the decoder
/// hits its allocation limit.
pub fn decode_image_with_limits(
    bytes: &[u8],
    max_pixels: Option<u64>,
) -> Result<Image<u8>, IoError> {
    let mut reader = image_reader(bytes)?;

    if let Some(max_pixels) = max_pixels {
        let (width, height) = image_reader(bytes)?
            .into_dimensions()
            .map_err(IoError::ImageDecodeError)?;
        if u64::from(width) * u64::from(height) > max_pixels {
            return Err(IoError::TooManyPixels {
                width,
                height,
                max_pixels,
            });
        }

        let max_side = u32::try_from(max_pixels).unwrap_or(u32::MAX);
        let mut limits = image::Limits::default();
        limits.max_image_width = Some(max_side);
        limits.max_image_height = Some(max_side);
        reader.limits(limits);
    }

    let img = reader.decode().map_err(|err| match err {
        image::ImageError::Limits(_) => IoError::DecodeLimitExceeded(err),
        err => IoError::ImageDecodeError(err),
    })?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    let color = img.color();
    let (num_channels, data) = if color.has_alpha() {
        (4, img.into_rgba8().into_raw())
    } else if color.has_color() {
        (3, img.into_rgb8().into_raw())
    } else {
        (1, img.into_luma8().into_raw())
    };

    Ok(Image::new(size, num_channels, data)?)
}

fn image_reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, IoError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| IoError::ImageDecodeError(image::ImageError::IoError(err)))
}

/// Encodes an image as JPEG.
///
/// Single channel images are written as grayscale and three channel images as
/// rgb. The alpha channel of four channel images is dropped.
///
/// # Arguments
///
/// * `image` - The image to encode.
/// * `quality` - The quality of the JPEG encoding, range from 1 (lowest) to 100 (highest).
///
/// # Returns
///
/// The JPEG encoded bytes.
pub fn encode_image_jpeg(image: &Image<u8>, quality: u8) -> Result<Vec<u8>, IoError> {
    let (width, height) = match (u32::try_from(image.width()), u32::try_from(image.height())) {
        (Ok(width), Ok(height)) => (width, height),
        _ => return Err(IoError::UnsupportedSize(image.width(), image.height())),
    };

    let rgb_data;
    let (data, color_type) = match image.num_channels() {
        1 => (image.as_slice(), ExtendedColorType::L8),
        3 => (image.as_slice(), ExtendedColorType::Rgb8),
        4 => {
            rgb_data = image
                .as_slice()
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect::<Vec<_>>();
            (rgb_data.as_slice(), ExtendedColorType::Rgb8)
        }
        n => return Err(IoError::UnsupportedChannels(n)),
    };

    let mut jpeg_data = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_data, quality)
        .encode(data, width, height, color_type)
        .map_err(IoError::JpegEncodingError)?;

    Ok(jpeg_data)
}
