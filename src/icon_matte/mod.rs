pub mod alpha_channel;
pub mod batch;
pub mod boundary;
pub mod codec;
pub mod contour;
pub mod gaussian;
pub mod geometry;
pub mod liquid_glass;
pub mod matting;
pub mod morphology;
pub mod pipeline;
pub mod quality;
pub mod refine;
pub mod subpixel;
pub mod supersample;
pub mod vectorize;
