use image::{Luma, Rgba};
use imageproc::definitions::Image;

use crate::error::FilterError;

/// RGBA8 raster every stage of the pipeline operates on
pub type PixelBuffer = Image<Rgba<u8>>;

/// The alpha channel of a [`PixelBuffer`] as a standalone scalar field
pub type AlphaMask = Image<Luma<u8>>;

/// Trait for reading and replacing the alpha channel of RGBA buffers
///
/// Color channels are always preserved; only the A component moves between
/// the buffer and the mask.
pub trait AlphaChannelExt {
    /// Copies the alpha channel out into a grayscale mask
    fn alpha_mask(&self) -> AlphaMask;

    /// Replaces the alpha channel with the provided mask
    ///
    /// This consumes the original image.
    ///
    /// # Errors
    ///
    /// * `FilterError::DimensionMismatch` - When image and mask dimensions don't match
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use icon_matte::{AlphaChannelExt, AlphaMask, PixelBuffer};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image = PixelBuffer::new(10, 10);
    /// let mask = AlphaMask::new(10, 10);
    ///
    /// let updated = image.replace_alpha(&mask)?;
    /// # Ok(())
    /// # }
    /// ```
    fn replace_alpha(self, mask: &AlphaMask) -> Result<Self, FilterError>
    where
        Self: Sized;

    /// Replaces the alpha channel with the provided mask in-place
    ///
    /// # Errors
    ///
    /// * `FilterError::DimensionMismatch` - When image and mask dimensions don't match
    fn replace_alpha_mut(&mut self, mask: &AlphaMask) -> Result<&mut Self, FilterError>;
}

impl AlphaChannelExt for PixelBuffer {
    fn alpha_mask(&self) -> AlphaMask {
        AlphaMask::from_fn(self.width(), self.height(), |x, y| {
            Luma([self.get_pixel(x, y)[3]])
        })
    }

    fn replace_alpha(mut self, mask: &AlphaMask) -> Result<Self, FilterError> {
        self.replace_alpha_mut(mask)?;
        Ok(self)
    }

    fn replace_alpha_mut(&mut self, mask: &AlphaMask) -> Result<&mut Self, FilterError> {
        validate_dimensions(self, mask)?;

        self.pixels_mut()
            .zip(mask.pixels())
            .for_each(|(pixel, Luma([alpha]))| {
                pixel[3] = *alpha;
            });

        Ok(self)
    }
}

/// Builds a new buffer whose alpha is computed per pixel from `image`
///
/// The closure always reads the untouched input, so neighborhood filters see
/// a consistent snapshot no matter the visiting order.
pub(crate) fn map_alpha<F>(image: &PixelBuffer, mut f: F) -> PixelBuffer
where
    F: FnMut(u32, u32, &Rgba<u8>) -> u8,
{
    let mut output = image.clone();
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        pixel[3] = f(x, y, image.get_pixel(x, y));
    }
    output
}

/// Function to validate dimensions
#[inline]
fn validate_dimensions(image: &PixelBuffer, mask: &AlphaMask) -> Result<(), FilterError> {
    let expected = image.dimensions();
    let actual = mask.dimensions();
    if expected == actual {
        Ok(())
    } else {
        Err(FilterError::DimensionMismatch { expected, actual })
    }
}
