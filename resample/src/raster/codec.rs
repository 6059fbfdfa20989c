//! Conversion between native pixel layouts and canonical rows.
//!
//! A canonical row holds `width * channels` bytes in B, G, R[, A] order for
//! color rasters and a single byte per pixel for gray rasters. The convolution
//! passes only ever see canonical rows.

use std::borrow::Cow;

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::raster::{PixelLayout, Raster, RasterDesc};

/// Returns the number of canonical channels of `raster`: 1, 3 or 4, or 0 if the
/// layout cannot be resampled.
pub fn channel_count(raster: &Raster) -> usize {
    match raster.layout() {
        PixelLayout::Gray8 | PixelLayout::Gray16 => 1,
        PixelLayout::Bgr8 | PixelLayout::Rgb8 | PixelLayout::Rgb565 => 3,
        PixelLayout::Bgra8 | PixelLayout::Rgba8 | PixelLayout::Argb8 => 4,
        PixelLayout::Indexed8 => match raster.palette() {
            Some(palette) if has_alpha(palette) => 4,
            Some(_) => 3,
            None => 0,
        },
        PixelLayout::GrayAlpha8 => 0,
    }
}

/// Layout a canonical row with `channels` channels maps onto without reordering.
pub fn canonical_layout(channels: usize) -> Option<PixelLayout> {
    match channels {
        1 => Some(PixelLayout::Gray8),
        3 => Some(PixelLayout::Bgr8),
        4 => Some(PixelLayout::Bgra8),
        _ => None,
    }
}

/// Returns true if canonical rows can be written back into `layout`.
pub fn is_writable(layout: PixelLayout) -> bool {
    !matches!(layout, PixelLayout::Indexed8 | PixelLayout::GrayAlpha8)
}

/// Extracts row `y` of `raster` in canonical order into `out`.
///
/// `out` must hold exactly `width * channel_count(raster)` bytes.
///
/// # Panics
///
/// Panics if the layout has no canonical form (`channel_count` is 0), or if
/// an `Indexed8` row holds an index past the palette. [`to_canonical`]
/// checks both and returns an error instead.
pub fn unpack_row(raster: &Raster, y: usize, out: &mut [u8]) {
    let native = raster.row(y);

    match raster.layout() {
        PixelLayout::Gray8 | PixelLayout::Bgr8 | PixelLayout::Bgra8 => {
            out.copy_from_slice(native);
        }
        PixelLayout::Gray16 => {
            for (dst, src) in out.iter_mut().zip(native.chunks_exact(2)) {
                *dst = (u16::from_le_bytes([src[0], src[1]]) >> 8) as u8;
            }
        }
        PixelLayout::Rgb8 => {
            for (dst, src) in out.chunks_exact_mut(3).zip(native.chunks_exact(3)) {
                dst.copy_from_slice(&[src[2], src[1], src[0]]);
            }
        }
        PixelLayout::Rgba8 => {
            for (dst, src) in out.chunks_exact_mut(4).zip(native.chunks_exact(4)) {
                dst.copy_from_slice(&[src[2], src[1], src[0], src[3]]);
            }
        }
        PixelLayout::Argb8 => {
            for (dst, src) in out.chunks_exact_mut(4).zip(native.chunks_exact(4)) {
                dst.copy_from_slice(&[src[3], src[2], src[1], src[0]]);
            }
        }
        PixelLayout::Rgb565 => {
            for (dst, src) in out.chunks_exact_mut(3).zip(native.chunks_exact(2)) {
                let v = u16::from_le_bytes([src[0], src[1]]);
                let r = ((v >> 11) & 0x1f) as u8;
                let g = ((v >> 5) & 0x3f) as u8;
                let b = (v & 0x1f) as u8;
                dst.copy_from_slice(&[(b << 3) | (b >> 2), (g << 2) | (g >> 4), (r << 3) | (r >> 2)]);
            }
        }
        PixelLayout::Indexed8 => {
            let palette = raster.palette().unwrap_or_default();
            let channels = out.len() / native.len().max(1);
            for (dst, &index) in out.chunks_exact_mut(channels).zip(native) {
                let [r, g, b, a] = palette[index as usize];
                dst[0] = b;
                dst[1] = g;
                dst[2] = r;
                if channels == 4 {
                    dst[3] = a;
                }
            }
        }
        PixelLayout::GrayAlpha8 => {
            unreachable!("GrayAlpha8 rows have no canonical form")
        }
    }
}

/// Writes canonical row `row` into row `y` of `raster`.
///
/// # Panics
///
/// Panics if [`is_writable`] is false for the raster's layout.
pub fn pack_row(row: &[u8], raster: &mut Raster, y: usize) {
    let layout = raster.layout();
    encode_row(layout, row, raster.row_mut(y));
}

/// Writes canonical bytes into one native row of `layout`.
///
/// `native` must be exactly the unpadded row.
pub(crate) fn encode_row(layout: PixelLayout, canonical: &[u8], native: &mut [u8]) {
    match layout {
        PixelLayout::Gray8 | PixelLayout::Bgr8 | PixelLayout::Bgra8 => {
            native.copy_from_slice(canonical);
        }
        PixelLayout::Gray16 => {
            for (dst, &v) in native.chunks_exact_mut(2).zip(canonical) {
                dst.copy_from_slice(&(v as u16 * 257).to_le_bytes());
            }
        }
        PixelLayout::Rgb8 => {
            for (dst, src) in native.chunks_exact_mut(3).zip(canonical.chunks_exact(3)) {
                dst.copy_from_slice(&[src[2], src[1], src[0]]);
            }
        }
        PixelLayout::Rgba8 => {
            for (dst, src) in native.chunks_exact_mut(4).zip(canonical.chunks_exact(4)) {
                dst.copy_from_slice(&[src[2], src[1], src[0], src[3]]);
            }
        }
        PixelLayout::Argb8 => {
            for (dst, src) in native.chunks_exact_mut(4).zip(canonical.chunks_exact(4)) {
                dst.copy_from_slice(&[src[3], src[2], src[1], src[0]]);
            }
        }
        PixelLayout::Rgb565 => {
            for (dst, src) in native.chunks_exact_mut(2).zip(canonical.chunks_exact(3)) {
                let (b, g, r) = (src[0] as u16, src[1] as u16, src[2] as u16);
                let v = ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3);
                dst.copy_from_slice(&v.to_le_bytes());
            }
        }
        PixelLayout::Indexed8 | PixelLayout::GrayAlpha8 => {
            unreachable!("{} rasters cannot be written from canonical rows", layout)
        }
    }
}

/// Converts a raster whose layout is not byte addressable into the canonical
/// 3- or 4-channel layout. Byte addressable rasters are borrowed unchanged.
pub fn to_canonical(raster: &Raster) -> Result<Cow<'_, Raster>> {
    let channels = channel_count(raster);
    let layout =
        canonical_layout(channels).ok_or(Error::UnsupportedEncoding(raster.layout()))?;

    if raster.layout().is_byte_addressable() {
        return Ok(Cow::Borrowed(raster));
    }
    if raster.layout() == PixelLayout::Indexed8 {
        check_indices(raster)?;
    }

    let desc = RasterDesc::new(raster.width(), raster.height(), layout);
    let mut converted = Raster::new_empty(desc)?;
    let stride = desc.stride;
    let row_bytes = desc.row_bytes();

    converted
        .bytes_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| unpack_row(raster, y, &mut row[..row_bytes]));

    tracing::debug!(from = %raster.desc(), to = %desc, "converted raster to canonical layout");

    Ok(Cow::Owned(converted))
}

/// Rejects palette indices written past the palette after construction.
fn check_indices(raster: &Raster) -> Result<()> {
    let entries = raster.palette().map_or(0, <[_]>::len);
    for y in 0..raster.height() as usize {
        if let Some(&index) = raster.row(y).iter().find(|&&i| i as usize >= entries) {
            return Err(Error::InvalidPalette(format!(
                "index {} in row {} is out of range for a palette of {} entries",
                index, y, entries
            )));
        }
    }
    Ok(())
}

fn has_alpha(palette: &[[u8; 4]]) -> bool {
    palette.iter().any(|entry| entry[3] != u8::MAX)
}
