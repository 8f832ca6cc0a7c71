mod error;
mod icon_matte;
mod utils;

#[cfg(test)]
mod test_utils;

pub use error::{CodecError, FilterError, MatteError, PipelineError};
pub use icon_matte::alpha_channel::{AlphaChannelExt, AlphaMask, PixelBuffer};
pub use icon_matte::batch::{
    BatchItem, BatchProcessor, ImageJob, ImageSource, JobStatus, Progress,
};
pub use icon_matte::boundary::{BoundaryMap, PixelClass};
pub use icon_matte::codec::{decode, encode_png};
pub use icon_matte::contour::ContourSmooth;
pub use icon_matte::gaussian::{GaussianAlphaBlur, GaussianKernel};
pub use icon_matte::geometry::{Point, PointGrid, Polygon};
pub use icon_matte::liquid_glass::{remove_liquid_glass, LiquidGlass};
pub use icon_matte::matting::{detect_background_color, matte, MatteSource, RemoveBackgroundExt};
pub use icon_matte::morphology::{dilate_alpha, erode_alpha, Morphology};
pub use icon_matte::pipeline::{process_image, ProcessingOptions};
pub use icon_matte::quality::{AlphaFilter, AlphaFilterExt, QualityMethod};
pub use icon_matte::refine::{
    cleanup_edges, erode_edges, remove_light_edges, smooth_edges, EdgeRefineExt,
    MAX_ERODE_PIXELS,
};
pub use icon_matte::subpixel::{BlurSharpen, Subpixel};
pub use icon_matte::supersample::Supersample;
pub use icon_matte::vectorize::Vectorize;

pub use imageproc::definitions::Image;
