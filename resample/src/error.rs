use crate::raster::{PixelLayout, RasterDesc};
use crate::resampler::MIN_DIMENSION;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "Destination must be at least {min}x{min}, got {width}x{height}",
        min = MIN_DIMENSION
    )]
    InvalidDimension { width: u32, height: u32 },

    #[error(
        "Destination {actual} is not compatible with the result: expected {width}x{height} with {channels} channels"
    )]
    DestinationMismatch {
        width: u32,
        height: u32,
        channels: usize,
        actual: RasterDesc,
    },

    #[error("Unsupported pixel encoding: {0}")]
    UnsupportedEncoding(PixelLayout),

    #[error("Raster must contain at least one pixel, got {width}x{height}")]
    EmptyRaster { width: u32, height: u32 },

    #[error("Buffer length {actual} does not match expected size {expected}")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("Invalid palette: {0}")]
    InvalidPalette(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Returns true for both a too-small destination size and a caller-supplied
    /// destination that does not match the computed one.
    pub fn is_invalid_dimension(&self) -> bool {
        matches!(
            self,
            Error::InvalidDimension { .. } | Error::DestinationMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
