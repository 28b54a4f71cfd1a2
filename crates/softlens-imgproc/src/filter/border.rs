use std::ops::Range;

use super::FilterError;

/// Border handling modes for convolution.
///
/// Decides what happens when the kernel window of an output pixel reaches
/// outside the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgePolicy {
    /// Copy the source pixel unchanged wherever the window exceeds the bounds.
    /// Corresponds to Java's `ConvolveOp.EDGE_NO_OP`.
    #[default]
    NoOp,

    /// Out-of-bounds samples contribute zero to the sum.
    /// Corresponds to OpenCV's `BORDER_CONSTANT` with a zero value.
    Zero,

    /// Replicate the value of the nearest border pixel.
    /// Corresponds to OpenCV's `BORDER_REPLICATE`.
    Clamp,
}

impl EdgePolicy {
    /// Map a possibly out-of-bounds coordinate to the index to sample.
    ///
    /// Returns `None` when the sample contributes nothing. `len` must be non zero.
    #[inline]
    pub(crate) fn resolve(self, idx: isize, len: usize) -> Option<usize> {
        match self {
            EdgePolicy::NoOp | EdgePolicy::Zero => {
                if idx >= 0 && (idx as usize) < len {
                    Some(idx as usize)
                } else {
                    None
                }
            }
            EdgePolicy::Clamp => Some(idx.clamp(0, len as isize - 1) as usize),
        }
    }
}

impl std::fmt::Display for EdgePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            EdgePolicy::NoOp => "no-op",
            EdgePolicy::Zero => "zero",
            EdgePolicy::Clamp => "clamp",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for EdgePolicy {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "no-op" | "noop" | "no_op" => Ok(EdgePolicy::NoOp),
            "zero" => Ok(EdgePolicy::Zero),
            "clamp" | "replicate" => Ok(EdgePolicy::Clamp),
            _ => Err(FilterError::UnknownEdgePolicy(s.to_string())),
        }
    }
}

/// The output coordinates along one axis whose kernel window stays inside the image.
///
/// The window of `i` spans `i - anchor ..= i + (ksize - 1 - anchor)`.
pub(crate) fn interior(len: usize, ksize: usize, anchor: usize) -> Range<usize> {
    anchor..len.saturating_sub(ksize - 1 - anchor)
}
