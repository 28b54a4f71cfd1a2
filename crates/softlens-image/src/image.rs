use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use softlens_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Trait for the pixel data types the filters can read and write.
///
/// Filters accumulate in `f32`. Converting back saturates to the range of the
/// pixel type and, for integer types, rounds half up.
pub trait PixelType: Copy + Default + Send + Sync + 'static {
    /// Convert the pixel value to f32.
    fn to_f32(self) -> f32;

    /// Convert a f32 value to the pixel data type.
    fn from_f32(val: f32) -> Self;
}

impl PixelType for f32 {
    fn to_f32(self) -> f32 {
        self
    }

    fn from_f32(val: f32) -> Self {
        val
    }
}

impl PixelType for u8 {
    fn to_f32(self) -> f32 {
        self as f32
    }

    fn from_f32(val: f32) -> Self {
        (val + 0.5).floor().clamp(0.0, u8::MAX as f32) as u8
    }
}

impl PixelType for u16 {
    fn to_f32(self) -> f32 {
        self as f32
    }

    fn from_f32(val: f32) -> Self {
        (val + 0.5).floor().clamp(0.0, u16::MAX as f32) as u16
    }
}

/// Represents an image with pixel data.
///
/// The pixel data is stored row-major with interleaved channels, so the value
/// of channel `c` at `(x, y)` lives at `(y * width + x) * num_channels + c`.
///
/// The number of channels is a runtime value since decoded images may come
/// with one, three or four channels.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T> {
    size: ImageSize,
    num_channels: usize,
    data: Vec<T>,
}

impl<T> Image<T> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `num_channels` - The number of channels per pixel.
    /// * `data` - The pixel data of the image.
    ///
    /// # Returns
    ///
    /// A new image with the given pixel data.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use softlens_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8>::new(
    ///    ImageSize {
    ///       width: 10,
    ///       height: 20,
    ///    },
    ///    3,
    ///    vec![0u8; 10 * 20 * 3],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, num_channels: usize, data: Vec<T>) -> Result<Self, ImageError> {
        // check if the data length matches the image size
        let expected = size.width * size.height * num_channels;
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }

        Ok(Self {
            size,
            num_channels,
            data,
        })
    }

    /// Create a new image with the given size and a constant pixel value.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `num_channels` - The number of channels per pixel.
    /// * `val` - The value of every pixel channel.
    ///
    /// # Examples
    ///
    /// ```
    /// use softlens_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8>::from_size_val(
    ///   ImageSize {
    ///     width: 10,
    ///     height: 20,
    ///   },
    ///   1,
    ///   100u8,
    /// ).unwrap();
    ///
    /// assert_eq!(image.num_channels(), 1);
    /// assert!(image.as_slice().iter().all(|&v| v == 100));
    /// ```
    pub fn from_size_val(size: ImageSize, num_channels: usize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let data = vec![val; size.width * size.height * num_channels];
        Image::new(size, num_channels, data)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Whether the image holds no pixels, i.e. a zero width, height or channel count.
    pub fn is_empty(&self) -> bool {
        self.size.width == 0 || self.size.height == 0 || self.num_channels == 0
    }

    /// Get the pixel data as a flat slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get a reference to a pixel channel value.
    ///
    /// # Arguments
    ///
    /// * `index` - The `[y, x, ch]` index of the value.
    ///
    /// # Returns
    ///
    /// The value or `None` if the index is out of bounds.
    pub fn get(&self, index: [usize; 3]) -> Option<&T> {
        let [y, x, ch] = index;
        if y >= self.height() || x >= self.width() || ch >= self.num_channels {
            return None;
        }
        self.data
            .get((y * self.width() + x) * self.num_channels + ch)
    }

    /// Get the value of a pixel channel.
    ///
    /// # Arguments
    ///
    /// * `x` - The x-coordinate of the pixel.
    /// * `y` - The y-coordinate of the pixel.
    /// * `ch` - The channel index of the pixel.
    ///
    /// # Errors
    ///
    /// If the coordinates or the channel are out of bounds, an error is returned.
    pub fn get_pixel(&self, x: usize, y: usize, ch: usize) -> Result<T, ImageError>
    where
        T: Copy,
    {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }

        if ch >= self.num_channels {
            return Err(ImageError::ChannelIndexOutOfBounds(ch, self.num_channels));
        }

        Ok(self.data[(y * self.width() + x) * self.num_channels + ch])
    }

    /// Get a channel of the image.
    ///
    /// # Arguments
    ///
    /// * `channel` - The channel to get.
    ///
    /// # Returns
    ///
    /// A new single channel image with the given channel.
    ///
    /// # Errors
    ///
    /// If the channel index is out of bounds, an error is returned.
    pub fn channel(&self, channel: usize) -> Result<Image<T>, ImageError>
    where
        T: Copy,
    {
        if channel >= self.num_channels {
            return Err(ImageError::ChannelIndexOutOfBounds(
                channel,
                self.num_channels,
            ));
        }

        let channel_data = self
            .data
            .iter()
            .skip(channel)
            .step_by(self.num_channels)
            .copied()
            .collect();

        Image::new(self.size, 1, channel_data)
    }
}

#[cfg(test)]
mod tests {
    use crate::image::{Image, ImageError, ImageSize, PixelType};

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.width, 10);
        assert_eq!(image_size.height, 20);
        assert_eq!(
            image_size.to_string(),
            "ImageSize { width: 10, height: 20 }"
        );
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = Image::<u8>::new(
            ImageSize {
                width: 10,
                height: 20,
            },
            3,
            vec![0u8; 10 * 20 * 3],
        )?;
        assert_eq!(image.size().width, 10);
        assert_eq!(image.size().height, 20);
        assert_eq!(image.num_channels(), 3);
        assert!(!image.is_empty());

        Ok(())
    }

    #[test]
    fn image_invalid_data_length() {
        let res = Image::<u8>::new(
            ImageSize {
                width: 3,
                height: 3,
            },
            1,
            vec![0u8; 8],
        );
        assert_eq!(res, Err(ImageError::InvalidChannelShape(8, 9)));
    }

    #[test]
    fn image_empty() -> Result<(), ImageError> {
        let image = Image::<u8>::new(
            ImageSize {
                width: 0,
                height: 4,
            },
            3,
            vec![],
        )?;
        assert!(image.is_empty());

        let image = Image::<u8>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            0,
            vec![],
        )?;
        assert!(image.is_empty());

        Ok(())
    }

    #[test]
    fn image_get() -> Result<(), ImageError> {
        let image = Image::<u8>::new(
            ImageSize {
                height: 2,
                width: 1,
            },
            3,
            vec![0, 1, 2, 3, 4, 5],
        )?;
        assert_eq!(image.get([1, 0, 2]), Some(&5u8));
        assert_eq!(image.get([2, 0, 0]), None);
        assert_eq!(image.get([0, 0, 3]), None);

        assert_eq!(image.get_pixel(0, 1, 1)?, 4);
        assert_eq!(
            image.get_pixel(1, 0, 0),
            Err(ImageError::PixelIndexOutOfBounds(1, 0, 1, 2))
        );
        assert_eq!(
            image.get_pixel(0, 0, 3),
            Err(ImageError::ChannelIndexOutOfBounds(3, 3))
        );

        Ok(())
    }

    #[test]
    fn image_channel() -> Result<(), ImageError> {
        let image = Image::<f32>::new(
            ImageSize {
                height: 2,
                width: 1,
            },
            3,
            vec![0., 1., 2., 3., 4., 5.],
        )?;

        let channel = image.channel(2)?;
        assert_eq!(channel.num_channels(), 1);
        assert_eq!(channel.as_slice(), &[2.0, 5.0]);
        assert!(image.channel(3).is_err());

        Ok(())
    }

    #[test]
    fn pixel_type_u8_round_half_up() {
        assert_eq!(u8::from_f32(44.444), 44);
        assert_eq!(u8::from_f32(66.5), 67);
        assert_eq!(u8::from_f32(66.49), 66);
        assert_eq!(u8::from_f32(-3.0), 0);
        assert_eq!(u8::from_f32(300.0), 255);
        assert_eq!(u8::from_f32(f32::NAN), 0);
    }

    #[test]
    fn pixel_type_u16_saturates() {
        assert_eq!(u16::from_f32(70_000.0), u16::MAX);
        assert_eq!(u16::from_f32(1000.5), 1001);
        assert_eq!(1000u16.to_f32(), 1000.0);
    }

    #[test]
    fn pixel_type_f32_is_identity() {
        assert_eq!(f32::from_f32(-1.25), -1.25);
        assert_eq!(300.5f32.to_f32(), 300.5);
    }
}
