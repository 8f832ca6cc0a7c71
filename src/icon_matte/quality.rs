#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::icon_matte::alpha_channel::PixelBuffer;
use crate::icon_matte::contour::ContourSmooth;
use crate::icon_matte::gaussian::GaussianAlphaBlur;
use crate::icon_matte::morphology::Morphology;
use crate::icon_matte::subpixel::{BlurSharpen, Subpixel};
use crate::icon_matte::supersample::Supersample;
use crate::icon_matte::vectorize::Vectorize;

/// Trait for alpha quality-enhancement filters
///
/// Parameters are validated when the filter is constructed, so applying one
/// cannot fail. The input is left untouched and a new buffer of the same size
/// is returned.
pub trait AlphaFilter {
    /// Apply the filter to the image
    fn apply(&self, image: &PixelBuffer) -> PixelBuffer;
}

/// Extension trait for applying an [`AlphaFilter`] fluently
pub trait AlphaFilterExt {
    /// Apply `filter` to the image
    ///
    /// This consumes the original image.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use icon_matte::{AlphaFilterExt, Morphology, PixelBuffer};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image = PixelBuffer::new(32, 32);
    /// let closed = image.enhance(&Morphology::new(1, 1)?);
    /// # Ok(())
    /// # }
    /// ```
    fn enhance<F: AlphaFilter + ?Sized>(self, filter: &F) -> Self;
}

impl AlphaFilterExt for PixelBuffer {
    fn enhance<F: AlphaFilter + ?Sized>(self, filter: &F) -> Self {
        filter.apply(&self)
    }
}

/// The optional final stage of the pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "method", rename_all = "snake_case"))]
pub enum QualityMethod {
    Supersample(Supersample),
    GaussianBlur(GaussianAlphaBlur),
    Morphology(Morphology),
    Subpixel(Subpixel),
    BlurSharpen(BlurSharpen),
    ContourSmooth(ContourSmooth),
    Vectorize(Vectorize),
}

impl QualityMethod {
    /// Short name used in logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Supersample(_) => "supersample",
            Self::GaussianBlur(_) => "gaussian_blur",
            Self::Morphology(_) => "morphology",
            Self::Subpixel(_) => "subpixel",
            Self::BlurSharpen(_) => "blur_sharpen",
            Self::ContourSmooth(_) => "contour_smooth",
            Self::Vectorize(_) => "vectorize",
        }
    }
}

impl AlphaFilter for QualityMethod {
    fn apply(&self, image: &PixelBuffer) -> PixelBuffer {
        match self {
            Self::Supersample(filter) => filter.apply(image),
            Self::GaussianBlur(filter) => filter.apply(image),
            Self::Morphology(filter) => filter.apply(image),
            Self::Subpixel(filter) => filter.apply(image),
            Self::BlurSharpen(filter) => filter.apply(image),
            Self::ContourSmooth(filter) => filter.apply(image),
            Self::Vectorize(filter) => filter.apply(image),
        }
    }
}

macro_rules! impl_from_filter {
    ($($variant:ident => $filter:ty),* $(,)?) => {
        $(
            impl From<$filter> for QualityMethod {
                fn from(filter: $filter) -> Self {
                    Self::$variant(filter)
                }
            }
        )*
    };
}

impl_from_filter! {
    Supersample => Supersample,
    GaussianBlur => GaussianAlphaBlur,
    Morphology => Morphology,
    Subpixel => Subpixel,
    BlurSharpen => BlurSharpen,
    ContourSmooth => ContourSmooth,
    Vectorize => Vectorize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::opaque_square;

    #[test]
    fn test_method_dispatch_matches_direct_call() {
        let image = opaque_square(12, 3, 6);
        let morphology = Morphology::new(1, 1).unwrap();
        let method = QualityMethod::from(morphology);

        assert_eq!(method.name(), "morphology");
        assert_eq!(method.apply(&image), morphology.apply(&image));
    }

    #[test]
    fn test_every_method_preserves_dimensions() {
        let image = opaque_square(16, 4, 8);
        let methods: Vec<QualityMethod> = vec![
            Supersample::new(2).unwrap().into(),
            GaussianAlphaBlur::new(2, 1).unwrap().into(),
            Morphology::new(1, 1).unwrap().into(),
            Subpixel::new(10, 0.5, 150).unwrap().into(),
            BlurSharpen::new(2, 100, 10).unwrap().into(),
            ContourSmooth::new(2, 0.5).unwrap().into(),
            Vectorize::new(8, 1).unwrap().into(),
        ];

        for method in methods {
            let result = image.clone().enhance(&method);
            assert_eq!(result.dimensions(), (16, 16), "{}", method.name());
        }
    }
}
