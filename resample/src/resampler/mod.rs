mod pass;


use std::time::Instant;

use crate::config::ResampleConfig;
use crate::contributors::ContributorTable;
use crate::dimension::DimensionPolicy;
use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::raster::{codec, Raster, RasterDesc};

/// Smallest destination width and height the two passes support.
pub const MIN_DIMENSION: u32 = 3;

/// Two-pass separable resampling engine.
///
/// All per-call state lives on the stack of the call, so one instance can be
/// shared between threads and used by overlapping calls.
#[derive(Debug, Default)]
pub struct Resampler {
    config: ResampleConfig,
    pool: Option<rayon::ThreadPool>,
}

impl Resampler {
    pub fn new(config: ResampleConfig) -> Result<Self> {
        config.validate()?;

        let pool = match config.threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|index| format!("resample-{}", index))
                    .build()
                    .map_err(|e| Error::InvalidConfig(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &ResampleConfig {
        &self.config
    }

    /// Resamples `src` into a new raster using the configured filter.
    pub fn resample(&self, src: &Raster, policy: &dyn DimensionPolicy) -> Result<Raster> {
        self.resample_with(src, None, self.config.filter.kernel(), policy)
    }

    /// Resamples `src` into the caller-supplied `dst` using the configured filter.
    ///
    /// `dst` must already have the size chosen by `policy` and the channel
    /// count of `src`; its native layout may differ.
    pub fn resample_into(
        &self,
        src: &Raster,
        dst: &mut Raster,
        policy: &dyn DimensionPolicy,
    ) -> Result<()> {
        let (width, height) = policy.compute(src.width(), src.height());
        validate_dimensions(width, height)?;
        let channels = source_channels(src)?;
        validate_destination(dst, width, height, channels)?;

        let canonical = self.run(src, self.config.filter.kernel(), width, height, channels)?;
        self.install(|| pass::pack(&canonical, width as usize * channels, dst));
        Ok(())
    }

    /// Resamples `src` with an explicit kernel.
    ///
    /// When `dest` is given it is validated as in
    /// [`resample_into`](Self::resample_into), filled and returned; otherwise a
    /// new raster is allocated in the layout closest to the source's.
    pub fn resample_with(
        &self,
        src: &Raster,
        dest: Option<Raster>,
        filter: &dyn Filter,
        policy: &dyn DimensionPolicy,
    ) -> Result<Raster> {
        let (width, height) = policy.compute(src.width(), src.height());
        validate_dimensions(width, height)?;
        let channels = source_channels(src)?;
        if let Some(dest) = &dest {
            validate_destination(dest, width, height, channels)?;
        }

        let canonical = self.run(src, filter, width, height, channels)?;

        let mut dst = match dest {
            Some(dest) => dest,
            None => {
                let layout = result_layout(src, channels);
                Raster::new_empty(RasterDesc::new(width, height, layout))?
            }
        };
        self.install(|| pass::pack(&canonical, width as usize * channels, &mut dst));

        Ok(dst)
    }

    /// Runs both passes and returns the destination as canonical rows.
    fn run(
        &self,
        src: &Raster,
        filter: &dyn Filter,
        dst_width: u32,
        dst_height: u32,
        channels: usize,
    ) -> Result<Vec<u8>> {
        let src = codec::to_canonical(src)?;
        let src_width = src.width() as usize;
        let src_height = src.height() as usize;

        let horizontal = ContributorTable::new(filter, src_width, dst_width as usize);
        let vertical = ContributorTable::new(filter, src_height, dst_height as usize);

        tracing::debug!(
            src = %src.desc(),
            dst_width,
            dst_height,
            channels,
            filter = filter.name(),
            horizontal_stride = horizontal.stride(),
            vertical_stride = vertical.stride(),
            "resampling"
        );

        let canonical = self.install(|| {
            let start = Instant::now();
            let work = pass::horizontal(&src, &horizontal, channels);
            tracing::trace!(elapsed = ?start.elapsed(), "horizontal pass done");

            let start = Instant::now();
            let out = pass::vertical(&work, &vertical, dst_width as usize * channels);
            tracing::trace!(elapsed = ?start.elapsed(), "vertical pass done");
            out
        });

        Ok(canonical)
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

/// Resamples `src` on the global pool.
///
/// See [`Resampler::resample_with`].
pub fn resample(
    src: &Raster,
    dest: Option<Raster>,
    filter: &dyn Filter,
    policy: &dyn DimensionPolicy,
) -> Result<Raster> {
    Resampler::default().resample_with(src, dest, filter, policy)
}

fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(Error::InvalidDimension { width, height });
    }
    Ok(())
}

fn source_channels(src: &Raster) -> Result<usize> {
    match codec::channel_count(src) {
        0 => Err(Error::UnsupportedEncoding(src.layout())),
        channels => Ok(channels),
    }
}

fn validate_destination(dst: &Raster, width: u32, height: u32, channels: usize) -> Result<()> {
    let matches = dst.width() == width
        && dst.height() == height
        && codec::is_writable(dst.layout())
        && codec::channel_count(dst) == channels;

    if !matches {
        return Err(Error::DestinationMismatch {
            width,
            height,
            channels,
            actual: *dst.desc(),
        });
    }
    Ok(())
}

/// Keeps the source layout when it can be written directly, otherwise the
/// canonical layout the source is converted to.
fn result_layout(src: &Raster, channels: usize) -> crate::raster::PixelLayout {
    if src.layout().is_byte_addressable() {
        src.layout()
    } else {
        codec::canonical_layout(channels).unwrap_or(src.layout())
    }
}
