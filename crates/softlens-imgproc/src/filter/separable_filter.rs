use softlens_image::{Image, PixelType};

use super::border::interior;
use super::convolution::validate_image;
use super::{EdgePolicy, FilterError};

/// Apply a separable filter to an image.
///
/// Equivalent to [`super::filter2d`] with the kernel `kernel_y[j] * kernel_x[i]`,
/// computed as a horizontal pass into an `f32` buffer followed by a vertical
/// pass. The kernels are anchored at `len / 2`.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel.
/// * `kernel_y` - The vertical kernel.
/// * `edge_policy` - How kernel windows crossing the image border are handled.
///
/// # Returns
///
/// A new image with the same shape as `src`.
pub fn separable_filter<T: PixelType>(
    src: &Image<T>,
    kernel_x: &[f32],
    kernel_y: &[f32],
    edge_policy: EdgePolicy,
) -> Result<Image<T>, FilterError> {
    if kernel_x.is_empty() || kernel_y.is_empty() {
        return Err(FilterError::InvalidKernel {
            width: kernel_x.len(),
            height: kernel_y.len(),
            len: kernel_x.len() * kernel_y.len(),
        });
    }
    validate_image(src)?;

    let (cols, rows, num_channels) = (src.cols(), src.rows(), src.num_channels());
    let (anchor_x, anchor_y) = (kernel_x.len() / 2, kernel_y.len() / 2);
    let interior_x = interior(cols, kernel_x.len(), anchor_x);
    let interior_y = interior(rows, kernel_y.len(), anchor_y);
    let no_op = edge_policy == EdgePolicy::NoOp;

    let src_data = src.as_slice();
    let mut temp = vec![0.0f32; src_data.len()];

    // Horizontal
    for r in 0..rows {
        let row_offset = r * cols * num_channels;
        for c in 0..cols {
            // columns copied from the source are never read back
            if no_op && !interior_x.contains(&c) {
                continue;
            }
            let out_idx = row_offset + c * num_channels;
            for (i, &k) in kernel_x.iter().enumerate() {
                let Some(x) = edge_policy.resolve(c as isize + i as isize - anchor_x as isize, cols)
                else {
                    continue;
                };
                let idx = row_offset + x * num_channels;
                for (acc_val, val) in temp[out_idx..out_idx + num_channels]
                    .iter_mut()
                    .zip(&src_data[idx..idx + num_channels])
                {
                    *acc_val += val.to_f32() * k;
                }
            }
        }
    }

    // Vertical
    let mut dst_data = vec![T::default(); src_data.len()];
    let mut acc = vec![0.0f32; num_channels];
    for r in 0..rows {
        for c in 0..cols {
            let out_idx = (r * cols + c) * num_channels;
            let dst_pixel = &mut dst_data[out_idx..out_idx + num_channels];

            if no_op && !(interior_x.contains(&c) && interior_y.contains(&r)) {
                dst_pixel.copy_from_slice(&src_data[out_idx..out_idx + num_channels]);
                continue;
            }

            acc.fill(0.0);
            for (j, &k) in kernel_y.iter().enumerate() {
                let Some(y) = edge_policy.resolve(r as isize + j as isize - anchor_y as isize, rows)
                else {
                    continue;
                };
                let idx = (y * cols + c) * num_channels;
                for (acc_val, &val) in acc.iter_mut().zip(&temp[idx..idx + num_channels]) {
                    *acc_val += val * k;
                }
            }

            for (dst_val, &acc_val) in dst_pixel.iter_mut().zip(acc.iter()) {
                *dst_val = T::from_f32(acc_val);
            }
        }
    }

    Ok(Image::new(src.size(), num_channels, dst_data)?)
}
