use softlens_image::{Image, PixelType};

use super::convolution::validate_image;
use super::{filter2d, separable_filter, EdgePolicy, FilterError, Kernel2d};

/// Convolve an image with a 2D kernel.
///
/// Every output pixel and channel is the weighted sum of the kernel window
/// around it, anchored at `(kernel.width / 2, kernel.height / 2)`. Border
/// windows are handled according to `edge_policy`:
///
/// * [`EdgePolicy::NoOp`] copies the source pixel wherever the window exceeds the image.
/// * [`EdgePolicy::Zero`] treats out-of-bounds samples as zero.
/// * [`EdgePolicy::Clamp`] samples the nearest in-bounds pixel.
///
/// Sums are accumulated in `f32`, then clamped to the pixel type range and
/// rounded half up for integer pixels. The kernel weights are not normalized.
///
/// Rank-1 kernels are applied as two 1D passes, which matches the direct
/// sweep up to floating point rounding.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `kernel` - The convolution kernel.
/// * `edge_policy` - How kernel windows crossing the image border are handled.
///
/// # Returns
///
/// A new image with the same shape as `src`.
///
/// # Errors
///
/// * [`FilterError::InvalidKernel`] if the kernel has a zero dimension or its
///   weights do not match its size.
/// * [`FilterError::InvalidBuffer`] if the image has no pixels or no channels.
///
/// # Example
///
/// ```
/// use softlens_image::{Image, ImageSize};
/// use softlens_imgproc::filter::{convolve, EdgePolicy, Kernel2d};
///
/// let image = Image::<u8>::from_size_val(
///     ImageSize { width: 3, height: 3 },
///     1,
///     100,
/// ).unwrap();
///
/// let kernel = Kernel2d::box_blur(3).unwrap();
/// let blurred = convolve(&image, &kernel, EdgePolicy::Zero).unwrap();
///
/// assert_eq!(blurred.get([1, 1, 0]), Some(&100));
/// assert_eq!(blurred.get([0, 0, 0]), Some(&44));
/// ```
pub fn convolve<T: PixelType>(
    src: &Image<T>,
    kernel: &Kernel2d,
    edge_policy: EdgePolicy,
) -> Result<Image<T>, FilterError> {
    kernel.validate()?;
    validate_image(src)?;

    if kernel.width > 1 && kernel.height > 1 {
        if let Some((kernel_x, kernel_y)) = kernel.separate() {
            log::debug!(
                "convolving {} with a separable {}x{} kernel, edge policy {}",
                src.size(),
                kernel.width,
                kernel.height,
                edge_policy
            );
            return separable_filter(src, &kernel_x, &kernel_y, edge_policy);
        }
    }

    log::debug!(
        "convolving {} with a {}x{} kernel, edge policy {}",
        src.size(),
        kernel.width,
        kernel.height,
        edge_policy
    );
    filter2d(src, kernel, edge_policy)
}

/// Blur an image using a box blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `kernel_size` - The size of the square kernel.
/// * `edge_policy` - How kernel windows crossing the image border are handled.
pub fn box_blur<T: PixelType>(
    src: &Image<T>,
    kernel_size: usize,
    edge_policy: EdgePolicy,
) -> Result<Image<T>, FilterError> {
    let kernel = Kernel2d::box_blur(kernel_size)?;
    convolve(src, &kernel, edge_policy)
}

/// Blur an image using a gaussian blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `kernel_size` - The size of the square kernel.
/// * `sigma` - The sigma of the gaussian kernel.
/// * `edge_policy` - How kernel windows crossing the image border are handled.
pub fn gaussian_blur<T: PixelType>(
    src: &Image<T>,
    kernel_size: usize,
    sigma: f32,
    edge_policy: EdgePolicy,
) -> Result<Image<T>, FilterError> {
    let kernel = Kernel2d::gaussian(kernel_size, sigma)?;
    convolve(src, &kernel, edge_policy)
}
