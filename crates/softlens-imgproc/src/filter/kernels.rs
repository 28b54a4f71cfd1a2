use super::FilterError;

/// Relative tolerance used to decide whether a kernel is the outer product of two vectors.
const SEPARABLE_TOLERANCE: f32 = 1e-6;

/// A 2D convolution kernel.
///
/// The weights are stored row-major, `weights[row * width + col]`, and the
/// kernel is anchored at `(width / 2, height / 2)`. For even sizes the extra
/// column and row of the window fall before the anchor.
///
/// The weights are used as given. A kernel whose weights sum to `s` scales
/// the overall brightness of the output by `s`, so blur kernels should sum to 1.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel2d {
    /// Number of columns of the kernel.
    pub width: usize,
    /// Number of rows of the kernel.
    pub height: usize,
    /// Row-major kernel weights, `width * height` values.
    pub weights: Vec<f32>,
}

impl Kernel2d {
    /// Create a new kernel from row-major weights.
    ///
    /// # Arguments
    ///
    /// * `width` - The number of columns of the kernel.
    /// * `height` - The number of rows of the kernel.
    /// * `weights` - The row-major weights.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernel`] if a dimension is zero or the
    /// number of weights is not `width * height`.
    pub fn new(width: usize, height: usize, weights: Vec<f32>) -> Result<Self, FilterError> {
        let kernel = Self {
            width,
            height,
            weights,
        };
        kernel.validate()?;
        Ok(kernel)
    }

    /// The 1x1 identity kernel.
    pub fn identity() -> Self {
        Self {
            width: 1,
            height: 1,
            weights: vec![1.0],
        }
    }

    /// Create a uniform averaging kernel of `size x size` weights, each `1 / size^2`.
    ///
    /// # Example
    ///
    /// ```
    /// use softlens_imgproc::filter::Kernel2d;
    ///
    /// let kernel = Kernel2d::box_blur(20).unwrap();
    ///
    /// assert_eq!(kernel.weights.len(), 400);
    /// assert_eq!(kernel.weights[0], 1.0 / 400.0);
    /// ```
    pub fn box_blur(size: usize) -> Result<Self, FilterError> {
        let len = size.checked_mul(size).ok_or(FilterError::InvalidKernel {
            width: size,
            height: size,
            len: 0,
        })?;
        Self::new(size, size, vec![1.0 / len as f32; len])
    }

    /// Create a normalized `size x size` gaussian kernel.
    pub fn gaussian(size: usize, sigma: f32) -> Result<Self, FilterError> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(FilterError::InvalidSigma(sigma));
        }
        let kernel = gaussian_kernel_1d(size, sigma);
        Self::from_separable(&kernel, &kernel)
    }

    /// Create a kernel as the outer product of a horizontal and a vertical 1D kernel.
    ///
    /// # Arguments
    ///
    /// * `kernel_x` - The horizontal kernel, one weight per column.
    /// * `kernel_y` - The vertical kernel, one weight per row.
    pub fn from_separable(kernel_x: &[f32], kernel_y: &[f32]) -> Result<Self, FilterError> {
        let weights = kernel_y
            .iter()
            .flat_map(|&ky| kernel_x.iter().map(move |&kx| ky * kx))
            .collect();
        Self::new(kernel_x.len(), kernel_y.len(), weights)
    }

    /// Check the kernel dimensions against its weights.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.width == 0 || self.height == 0 || self.weights.len() != self.width * self.height
        {
            return Err(FilterError::InvalidKernel {
                width: self.width,
                height: self.height,
                len: self.weights.len(),
            });
        }
        Ok(())
    }

    /// The anchor of the kernel as `(x, y)`.
    pub fn anchor(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    /// The weight at the given kernel row and column.
    pub fn weight(&self, row: usize, col: usize) -> f32 {
        self.weights[row * self.width + col]
    }

    /// The sum of all the weights.
    pub fn sum(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// Split a rank-1 kernel into its horizontal and vertical factors.
    ///
    /// Returns `Some((kernel_x, kernel_y))` such that
    /// `weight(row, col) == kernel_y[row] * kernel_x[col]` within a small
    /// relative tolerance, or `None` if the kernel is not separable.
    pub fn separate(&self) -> Option<(Vec<f32>, Vec<f32>)> {
        // pivot on the largest magnitude weight
        let (pivot, max_abs) = self
            .weights
            .iter()
            .map(|w| w.abs())
            .enumerate()
            .fold((0, 0.0f32), |acc, (i, w)| if w > acc.1 { (i, w) } else { acc });

        if max_abs == 0.0 || !max_abs.is_finite() {
            return None;
        }

        let (pivot_row, pivot_col) = (pivot / self.width, pivot % self.width);
        let pivot_val = self.weights[pivot];

        let kernel_x = (0..self.width)
            .map(|col| self.weight(pivot_row, col))
            .collect::<Vec<_>>();
        let kernel_y = (0..self.height)
            .map(|row| self.weight(row, pivot_col) / pivot_val)
            .collect::<Vec<_>>();

        let tolerance = SEPARABLE_TOLERANCE * max_abs;
        for (row, &ky) in kernel_y.iter().enumerate() {
            for (col, &kx) in kernel_x.iter().enumerate() {
                if (self.weight(row, col) - ky * kx).abs() > tolerance {
                    return None;
                }
            }
        }

        Some((kernel_x, kernel_y))
    }
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel, normalized to sum to 1.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size as f32 - 1.0) / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}
