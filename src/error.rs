use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The image has no pixels
    #[error("Image has no pixels")]
    EmptyInput,
    /// The requested number of colors is less than 1
    #[error("Target color count must be at least 1")]
    InvalidTargetCount,
    /// The slice provided to the function is too small
    #[error("Buffer is too small")]
    BufferTooSmall,
    /// The pixel layout can't be used for clustering
    #[error("Unsupported pixel format")]
    UnsupportedFormat,
}
