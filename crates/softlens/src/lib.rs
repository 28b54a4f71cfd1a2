#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use softlens_image as image;

#[doc(inline)]
pub use softlens_imgproc as imgproc;

#[doc(inline)]
pub use softlens_io as io;
