use thiserror::Error;

/// Error type for matting operations
///
/// Matting is deliberately forgiving: empty images and reference buffers of a
/// different size are processed rather than rejected, so the only failure is
/// a threshold outside the accepted range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatteError {
    /// Threshold is outside `1..=100`
    #[error("Threshold {0} is out of range, expected 1..=100")]
    InvalidThreshold(u8),
}

/// Error type for edge refinement and quality-enhancement filters
///
/// Filters validate their parameters once, when the parameter struct is
/// constructed, so applying a filter never fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// A filter parameter is outside the range the filter accepts
    ///
    /// # Examples
    ///
    /// Returned by `Supersample::new(1)` because the scale must be 2..=8.
    #[error("Invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in the constructor
        name: &'static str,
        /// Offending value, widened for display
        value: f32,
        /// Human-readable constraint
        reason: &'static str,
    },

    /// Image and alpha mask dimensions do not match
    #[error("Image and mask dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },
}

/// Error type for the image codec collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The input bytes could not be decoded into an image
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// The pixel buffer could not be serialized to PNG
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Error type for a single image's trip through the pipeline
///
/// The batch driver converts this into the job's error message; it never
/// aborts the rest of the batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// The options record violates one of its documented ranges
    #[error("Invalid processing options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Matte(#[from] MatteError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
