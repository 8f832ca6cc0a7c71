//! Per-image processing pipeline.
//!
//! [`process_image`] runs one icon through matting, the edge refinement
//! toolkit and an optional quality method. Every step reads the previous
//! step's buffer and produces a new one; steps switched off in
//! [`ProcessingOptions`] are skipped entirely.

use image::Rgb;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::icon_matte::alpha_channel::PixelBuffer;
use crate::icon_matte::liquid_glass::{remove_liquid_glass, LiquidGlass};
use crate::icon_matte::matting::{matte, MatteSource};
use crate::icon_matte::quality::{AlphaFilter, QualityMethod};
use crate::icon_matte::refine::{self, MAX_ERODE_PIXELS};

/// Options record controlling a single pipeline run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProcessingOptions {
    /// Matting aggressiveness, 1..=100
    pub threshold: u8,
    pub edge_smoothing: bool,
    /// Key color used when no reference picture is supplied
    #[cfg_attr(feature = "serde", serde(with = "rgb_option"))]
    pub target_background_color: Option<Rgb<u8>>,
    pub edge_cleanup: bool,
    /// Rings removed by erosion, 0..=3
    pub erode_pixels: u8,
    pub remove_light_edges: bool,
    pub remove_liquid_glass: bool,
    /// Depth of the liquid-glass zone, 1..=5
    pub glass_outline_width: u8,
    pub glass_brightness: u8,
    pub quality_method: Option<QualityMethod>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            threshold: 30,
            edge_smoothing: true,
            target_background_color: None,
            edge_cleanup: false,
            erode_pixels: 0,
            remove_light_edges: false,
            remove_liquid_glass: false,
            glass_outline_width: 2,
            glass_brightness: 200,
            quality_method: None,
        }
    }
}

impl ProcessingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_edge_smoothing(mut self, enabled: bool) -> Self {
        self.edge_smoothing = enabled;
        self
    }

    pub fn with_target_background_color(mut self, color: Rgb<u8>) -> Self {
        self.target_background_color = Some(color);
        self
    }

    pub fn with_edge_cleanup(mut self, enabled: bool) -> Self {
        self.edge_cleanup = enabled;
        self
    }

    pub fn with_erode_pixels(mut self, pixels: u8) -> Self {
        self.erode_pixels = pixels;
        self
    }

    pub fn with_remove_light_edges(mut self, enabled: bool) -> Self {
        self.remove_light_edges = enabled;
        self
    }

    /// Enables liquid-glass removal with the given zone width and brightness
    pub fn with_liquid_glass(mut self, width: u8, brightness: u8) -> Self {
        self.remove_liquid_glass = true;
        self.glass_outline_width = width;
        self.glass_brightness = brightness;
        self
    }

    pub fn with_quality_method(mut self, method: impl Into<QualityMethod>) -> Self {
        self.quality_method = Some(method.into());
        self
    }

    /// Checks every ranged field
    ///
    /// # Errors
    ///
    /// * `PipelineError::InvalidOptions` - Naming the first field out of range
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(1..=100).contains(&self.threshold) {
            return Err(PipelineError::InvalidOptions(format!(
                "threshold must be 1..=100, got {}",
                self.threshold
            )));
        }
        if self.erode_pixels > MAX_ERODE_PIXELS {
            return Err(PipelineError::InvalidOptions(format!(
                "erode_pixels must be 0..={MAX_ERODE_PIXELS}, got {}",
                self.erode_pixels
            )));
        }
        if !(1..=5).contains(&self.glass_outline_width) {
            return Err(PipelineError::InvalidOptions(format!(
                "glass_outline_width must be 1..=5, got {}",
                self.glass_outline_width
            )));
        }
        Ok(())
    }
}

/// Serializes `Option<Rgb<u8>>` as an optional `[r, g, b]` array
#[cfg(feature = "serde")]
mod rgb_option {
    use image::Rgb;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        color: &Option<Rgb<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        color.map(|Rgb(channels)| channels).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Rgb<u8>>, D::Error> {
        Ok(Option::<[u8; 3]>::deserialize(deserializer)?.map(Rgb))
    }
}

/// Runs one image through the full pipeline
///
/// The matte source is the reference picture when given, otherwise the
/// configured key color, otherwise the color detected from the corners.
///
/// # Errors
///
/// * `PipelineError::InvalidOptions` - When `options` fails validation
/// * `PipelineError::Matte` / `PipelineError::Filter` - When a step rejects its parameters
pub fn process_image(
    image: &PixelBuffer,
    reference: Option<&PixelBuffer>,
    options: &ProcessingOptions,
) -> Result<PixelBuffer, PipelineError> {
    options.validate()?;

    let source = match (reference, options.target_background_color) {
        (Some(reference), _) => MatteSource::Reference(reference),
        (None, Some(color)) => MatteSource::Color(color),
        (None, None) => MatteSource::Auto,
    };

    let mut current = {
        let _span = tracing::debug_span!("matte").entered();
        matte(image, source, options.threshold)?
    };

    if options.edge_smoothing {
        let _span = tracing::debug_span!("smooth_edges").entered();
        current = refine::smooth_edges(&current);
    }
    if options.remove_light_edges {
        let _span = tracing::debug_span!("remove_light_edges").entered();
        current = refine::remove_light_edges(&current);
    }
    if options.erode_pixels > 0 {
        let _span = tracing::debug_span!("erode_edges", passes = options.erode_pixels).entered();
        current = refine::erode_edges(&current, options.erode_pixels)?;
    }
    if options.edge_cleanup {
        let _span = tracing::debug_span!("cleanup_edges").entered();
        current = refine::cleanup_edges(&current);
    }
    if options.remove_liquid_glass {
        let _span = tracing::debug_span!("remove_liquid_glass").entered();
        let params = LiquidGlass::new(options.glass_outline_width, options.glass_brightness)?;
        current = remove_liquid_glass(&current, &params);
    }
    if let Some(method) = &options.quality_method {
        let _span = tracing::debug_span!("quality_method", method = method.name()).entered();
        current = method.apply(&current);
    }

    Ok(current)
}
