use std::time::Instant;

use softlens::imgproc::filter::{convolve, EdgePolicy, Kernel2d};
use softlens::io::functional::{decode_image_with_limits, encode_image_jpeg};

use crate::error::ServeError;

/// What to apply to an uploaded image.
#[derive(Debug, Clone)]
pub struct BlurSettings {
    pub kernel: Kernel2d,
    pub edge_policy: EdgePolicy,
    pub max_pixels: u64,
    pub jpeg_quality: u8,
}

/// Decode an uploaded image, blur it and encode the result as JPEG.
///
/// Runs to completion on the calling thread, callers in async code should
/// move it to the blocking pool.
pub fn blur_to_jpeg(bytes: &[u8], settings: &BlurSettings) -> Result<Vec<u8>, ServeError> {
    let start_time = Instant::now();

    let src = decode_image_with_limits(bytes, Some(settings.max_pixels))?;
    let dst = convolve(&src, &settings.kernel, settings.edge_policy)?;
    let jpeg_data = encode_image_jpeg(&dst, settings.jpeg_quality)?;

    log::debug!(
        "blurred {} image with {} channels in {:?}",
        src.size(),
        src.num_channels(),
        start_time.elapsed()
    );

    Ok(jpeg_data)
}
