//! The two convolution passes and the final packing step.
//!
//! Every step writes disjoint row chunks of its output in parallel and only
//! reads shared inputs, so no synchronization is needed within a step.

use common::parallel::ParRowsMutAuto;
use rayon::prelude::*;

use crate::contributors::ContributorTable;
use crate::raster::{codec, Raster};

const MAX_CHANNEL_VALUE: f32 = 255.0;

/// Clamps an accumulated sample to `[0, 255]`, rounding half up.
#[inline]
pub(super) fn to_byte(sample: f32) -> u8 {
    if sample < 0.0 {
        0
    } else if sample > MAX_CHANNEL_VALUE {
        u8::MAX
    } else {
        (sample + 0.5) as u8
    }
}

/// Resamples every source row horizontally.
///
/// Returns the intermediate buffer of `src_height` rows, each
/// `table.dst_size() * channels` canonical bytes long.
pub(super) fn horizontal(src: &Raster, table: &ContributorTable, channels: usize) -> Vec<u8> {
    let src_row_len = src.width() as usize * channels;
    let row_len = table.dst_size() * channels;
    let mut work = vec![0u8; row_len * src.height() as usize];

    work.par_rows_mut_auto(row_len)
        .for_each(|(first_row, chunk)| {
            let mut src_row = vec![0u8; src_row_len];
            for (local_y, out_row) in chunk.chunks_exact_mut(row_len).enumerate() {
                codec::unpack_row(src, first_row + local_y, &mut src_row);
                match channels {
                    1 => convolve_row::<1>(&src_row, out_row, table),
                    3 => convolve_row::<3>(&src_row, out_row, table),
                    4 => convolve_row::<4>(&src_row, out_row, table),
                    _ => unreachable!("unsupported channel count {}", channels),
                }
            }
        });

    work
}

/// Convolves one canonical row with `N` interleaved channels.
#[inline]
fn convolve_row<const N: usize>(src: &[u8], out: &mut [u8], table: &ContributorTable) {
    for (i, out_pixel) in out.chunks_exact_mut(N).enumerate() {
        let mut samples = [0.0f32; N];
        for (&index, &weight) in table.indices(i).iter().zip(table.weights(i)) {
            let pixel = &src[index * N..index * N + N];
            for c in 0..N {
                samples[c] += pixel[c] as f32 * weight;
            }
        }
        for c in 0..N {
            out_pixel[c] = to_byte(samples[c]);
        }
    }
}

/// Resamples the intermediate buffer vertically into `table.dst_size()`
/// canonical rows of `row_len` bytes.
///
/// Each destination sample is accumulated from the same column of the
/// contributing intermediate rows, in contributor order.
pub(super) fn vertical(work: &[u8], table: &ContributorTable, row_len: usize) -> Vec<u8> {
    let mut out = vec![0u8; row_len * table.dst_size()];

    out.par_rows_mut_auto(row_len)
        .for_each(|(first_row, chunk)| {
            let mut acc = vec![0.0f32; row_len];
            for (local_y, out_row) in chunk.chunks_exact_mut(row_len).enumerate() {
                let y = first_row + local_y;
                acc.fill(0.0);
                for (&index, &weight) in table.indices(y).iter().zip(table.weights(y)) {
                    let work_row = &work[index * row_len..(index + 1) * row_len];
                    for (sum, &sample) in acc.iter_mut().zip(work_row) {
                        *sum += sample as f32 * weight;
                    }
                }
                for (dst, &sum) in out_row.iter_mut().zip(&acc) {
                    *dst = to_byte(sum);
                }
            }
        });

    out
}

/// Writes canonical rows into `dst` in its native layout.
pub(super) fn pack(canonical: &[u8], row_len: usize, dst: &mut Raster) {
    let layout = dst.layout();
    let stride = dst.desc().stride;
    let row_bytes = dst.desc().row_bytes();

    dst.bytes_mut()
        .par_rows_mut_auto(stride)
        .for_each(|(first_row, chunk)| {
            for (local_y, native) in chunk.chunks_exact_mut(stride).enumerate() {
                let y = first_row + local_y;
                let row = &canonical[y * row_len..(y + 1) * row_len];
                codec::encode_row(layout, row, &mut native[..row_bytes]);
            }
        });
}
