// Error handling
pub use crate::error::{Error, Result};

// Rasters
pub use crate::raster::{PixelLayout, Raster, RasterDesc};

// Kernels and dimension policies
pub use crate::dimension::{AbsoluteDimension, AspectFit, DimensionPolicy, MaxDimension};
pub use crate::filter::{
    BSpline, Bell, BiCubic, BoxFilter, Filter, FilterType, Hermite, Lanczos3, Mitchell, Triangle,
};

// Engine
pub use crate::config::ResampleConfig;
pub use crate::contributors::ContributorTable;
pub use crate::resampler::{resample, Resampler, MIN_DIMENSION};
