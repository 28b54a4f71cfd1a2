use softlens_image::{Image, PixelType};

use super::border::interior;
use super::{EdgePolicy, FilterError, Kernel2d};

/// Check that the source image has pixels and a data length matching its shape.
pub(crate) fn validate_image<T>(src: &Image<T>) -> Result<(), FilterError> {
    let len = src.as_slice().len();
    if src.is_empty() || len != src.width() * src.height() * src.num_channels() {
        return Err(FilterError::InvalidBuffer {
            size: src.size(),
            num_channels: src.num_channels(),
            len,
        });
    }
    Ok(())
}

/// Convolve an image with a 2D kernel, sampling the full kernel window per pixel.
///
/// Computes, for every pixel `(x, y)` and channel `c`,
/// `sum_{j, i} kernel[j, i] * src[x + i - kw / 2, y + j - kh / 2, c]`
/// with out-of-bounds samples resolved by `edge_policy`. Sums are accumulated
/// in `f32` and converted back with [`PixelType::from_f32`].
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
pub fn filter2d<T: PixelType>(
    src: &Image<T>,
    kernel: &Kernel2d,
    edge_policy: EdgePolicy,
) -> Result<Image<T>, FilterError> {
    kernel.validate()?;
    validate_image(src)?;

    let (cols, rows, num_channels) = (src.cols(), src.rows(), src.num_channels());
    let (anchor_x, anchor_y) = kernel.anchor();
    let interior_x = interior(cols, kernel.width, anchor_x);
    let interior_y = interior(rows, kernel.height, anchor_y);

    let src_data = src.as_slice();
    let mut dst_data = vec![T::default(); src_data.len()];
    let mut acc = vec![0.0f32; num_channels];

    for r in 0..rows {
        for c in 0..cols {
            let out_idx = (r * cols + c) * num_channels;
            let dst_pixel = &mut dst_data[out_idx..out_idx + num_channels];

            if edge_policy == EdgePolicy::NoOp
                && !(interior_x.contains(&c) && interior_y.contains(&r))
            {
                dst_pixel.copy_from_slice(&src_data[out_idx..out_idx + num_channels]);
                continue;
            }

            acc.fill(0.0);
            for j in 0..kernel.height {
                let Some(y) = edge_policy.resolve(r as isize + j as isize - anchor_y as isize, rows)
                else {
                    continue;
                };
                for i in 0..kernel.width {
                    let Some(x) =
                        edge_policy.resolve(c as isize + i as isize - anchor_x as isize, cols)
                    else {
                        continue;
                    };
                    let k = kernel.weight(j, i);
                    let idx = (y * cols + x) * num_channels;
                    for (acc_val, val) in acc.iter_mut().zip(&src_data[idx..idx + num_channels]) {
                        *acc_val += val.to_f32() * k;
                    }
                }
            }

            for (dst_val, &acc_val) in dst_pixel.iter_mut().zip(acc.iter()) {
                *dst_val = T::from_f32(acc_val);
            }
        }
    }

    Ok(Image::new(src.size(), num_channels, dst_data)?)
}
