//! Backdrop subtraction producing the initial alpha matte.
//!
//! Two modes are supported:
//!
//! - **Reference mode** compares each pixel against the same position in a
//!   picture of the bare backdrop. The 1..=100 threshold is scaled by 2.55 into
//!   channel units and attenuated by the reference pixel's own opacity. Pixels
//!   within the threshold become transparent; a band half a threshold wide
//!   above it fades linearly, which yields anti-aliased edges without a blur.
//! - **Color-key mode** compares against a single RGB color using the mean
//!   absolute channel difference. Here the threshold is used unscaled and
//!   surviving alpha is capped in proportion to `diff / threshold`.
//!
//! The two modes intentionally scale the threshold differently; callers that
//! switch modes with the same threshold get different cut-outs.
//!
//! When neither a reference nor a color is available, the four corner pixels
//! are averaged and used as the key color.

use image::{Rgb, Rgba};
use itertools::iproduct;

use crate::error::MatteError;
use crate::icon_matte::alpha_channel::PixelBuffer;
use crate::utils::round_alpha;

/// Reference-mode threshold scale from percent to channel units
const REFERENCE_SCALE: f32 = 2.55;

/// Width of the reference-mode fade band, as a multiple of the threshold
const FADE_BAND: f32 = 1.5;

/// What the matting engine subtracts from the image
#[derive(Debug, Clone, Copy)]
pub enum MatteSource<'a> {
    /// Picture of the bare backdrop, compared pixel by pixel
    Reference(&'a PixelBuffer),
    /// Single key color
    Color(Rgb<u8>),
    /// Key color averaged from the image's four corners
    Auto,
}

/// Trait providing backdrop removal on RGBA buffers
pub trait RemoveBackgroundExt {
    /// Removes the backdrop described by `source`
    ///
    /// This consumes the original image.
    ///
    /// # Errors
    ///
    /// * `MatteError::InvalidThreshold` - When `threshold` is outside 1..=100
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use icon_matte::{MatteSource, PixelBuffer, RemoveBackgroundExt};
    /// use image::Rgb;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image = PixelBuffer::new(64, 64);
    /// let cut = image.remove_background(MatteSource::Color(Rgb([255, 255, 255])), 30)?;
    /// # Ok(())
    /// # }
    /// ```
    fn remove_background(
        self,
        source: MatteSource<'_>,
        threshold: u8,
    ) -> Result<PixelBuffer, MatteError>;
}

impl RemoveBackgroundExt for PixelBuffer {
    fn remove_background(
        self,
        source: MatteSource<'_>,
        threshold: u8,
    ) -> Result<PixelBuffer, MatteError> {
        matte(&self, source, threshold)
    }
}

/// Produces a copy of `image` whose alpha reflects backdrop removal
///
/// Color channels are never modified. A zero-sized image is returned as is.
///
/// # Arguments
///
/// * `image` - Source icon
/// * `source` - Reference picture, key color or automatic corner detection
/// * `threshold` - Aggressiveness in 1..=100
///
/// # Errors
///
/// * `MatteError::InvalidThreshold` - When `threshold` is outside 1..=100
pub fn matte(
    image: &PixelBuffer,
    source: MatteSource<'_>,
    threshold: u8,
) -> Result<PixelBuffer, MatteError> {
    if !(1..=100).contains(&threshold) {
        return Err(MatteError::InvalidThreshold(threshold));
    }

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Ok(image.clone());
    }

    match source {
        MatteSource::Reference(reference) => {
            let _span = tracing::debug_span!("matte_reference", threshold).entered();
            Ok(subtract_reference(image, reference, threshold))
        }
        MatteSource::Color(color) => {
            let _span = tracing::debug_span!("matte_color", threshold).entered();
            Ok(subtract_color(image, color, threshold))
        }
        MatteSource::Auto => {
            let _span = tracing::debug_span!("matte_auto", threshold).entered();
            // Non-empty was checked above, so corners always exist
            let color = detect_background_color(image).unwrap_or(Rgb([255, 255, 255]));
            tracing::debug!(?color, "no reference or key color, using corner average");
            Ok(subtract_color(image, color, threshold))
        }
    }
}

/// Averages the RGB of the four corner pixels
///
/// # Returns
///
/// `None` for a zero-sized image
pub fn detect_background_color(image: &PixelBuffer) -> Option<Rgb<u8>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let corners = [
        image.get_pixel(0, 0),
        image.get_pixel(width - 1, 0),
        image.get_pixel(0, height - 1),
        image.get_pixel(width - 1, height - 1),
    ];

    let mut sum = [0u32; 3];
    for Rgba([red, green, blue, _]) in corners {
        sum[0] += u32::from(*red);
        sum[1] += u32::from(*green);
        sum[2] += u32::from(*blue);
    }

    Some(Rgb(sum.map(|channel| round_alpha(channel as f32 / 4.0))))
}

fn subtract_reference(image: &PixelBuffer, reference: &PixelBuffer, threshold: u8) -> PixelBuffer {
    let mut output = image.clone();

    if image.dimensions() != reference.dimensions() {
        tracing::debug!(
            image = ?image.dimensions(),
            reference = ?reference.dimensions(),
            "reference size differs, matting the overlapping region only"
        );
    }

    let width = image.width().min(reference.width());
    let height = image.height().min(reference.height());
    let base_threshold = f32::from(threshold) * REFERENCE_SCALE;

    for (y, x) in iproduct!(0..height, 0..width) {
        let Rgba([ref_red, ref_green, ref_blue, ref_alpha]) = *reference.get_pixel(x, y);
        if ref_alpha == 0 {
            continue;
        }

        let pixel = output.get_pixel_mut(x, y);
        let max_diff = pixel[0]
            .abs_diff(ref_red)
            .max(pixel[1].abs_diff(ref_green))
            .max(pixel[2].abs_diff(ref_blue));
        let max_diff = f32::from(max_diff);

        let effective = base_threshold * (f32::from(ref_alpha) / 255.0);

        if max_diff < effective {
            pixel[3] = 0;
        } else if max_diff < effective * FADE_BAND {
            let fade = (max_diff - effective) / (effective * (FADE_BAND - 1.0));
            pixel[3] = round_alpha(f32::from(pixel[3]) * fade);
        }
    }

    output
}

fn subtract_color(image: &PixelBuffer, color: Rgb<u8>, threshold: u8) -> PixelBuffer {
    let Rgb([key_red, key_green, key_blue]) = color;
    let threshold = f32::from(threshold);
    let mut output = image.clone();

    for pixel in output.pixels_mut() {
        let diff = (u16::from(pixel[0].abs_diff(key_red))
            + u16::from(pixel[1].abs_diff(key_green))
            + u16::from(pixel[2].abs_diff(key_blue))) as f32
            / 3.0;

        if diff < threshold {
            pixel[3] = 0;
        } else {
            let cap = 255.0 * diff / threshold;
            pixel[3] = pixel[3].min(round_alpha(cap));
        }
    }

    output
}
