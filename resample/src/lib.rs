//! Separable image resampling.
//!
//! A source [`Raster`] is scaled to the size chosen by a [`DimensionPolicy`]
//! with a [`Filter`] kernel in two passes: a horizontal pass into an
//! intermediate buffer, then a vertical pass into the destination. Both passes
//! run on a rayon pool over disjoint rows of their output.

mod config;
mod contributors;
mod dimension;
mod error;
mod filter;
#[cfg(feature = "image")]
mod interop;
mod raster;
mod resampler;

pub mod prelude;

pub use prelude::*;

pub use crate::raster::codec;

#[cfg(test)]
mod testing;
