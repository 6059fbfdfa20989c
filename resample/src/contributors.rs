//! Per-axis contributor tables.
//!
//! For every destination index the table stores which source samples
//! contribute to it and with what weight. Lists are padded to a common stride
//! so index `i` lives at `i * stride..i * stride + count(i)`.

use crate::filter::Filter;

#[derive(Debug, Clone)]
pub struct ContributorTable {
    src_size: usize,
    dst_size: usize,
    stride: usize,
    counts: Vec<usize>,
    indices: Vec<usize>,
    weights: Vec<f32>,
}

impl ContributorTable {
    /// Builds the table mapping `src_size` samples onto `dst_size` samples.
    ///
    /// When downsampling the filter support is widened by the inverse scale so
    /// every source sample is covered. Candidates outside the source are
    /// mirrored back across the nearest edge; a candidate that is still outside
    /// keeps its slot with a zero weight. Weights of every index are normalized
    /// to sum to one.
    pub fn new(filter: &dyn Filter, src_size: usize, dst_size: usize) -> Self {
        assert!(src_size > 0, "source size must be positive");
        assert!(dst_size > 0, "destination size must be positive");

        let scale = dst_size as f32 / src_size as f32;
        let radius = filter.support_radius();
        let center_offset = 0.5 / scale;

        let (width, norm_factor) = if scale < 1.0 {
            let width = radius / scale;
            // Keeps the kernel's zero crossings on the widened support.
            (width, 1.0 / (width.ceil() / radius))
        } else {
            (radius, 1.0)
        };

        let mut lists: Vec<Vec<(usize, f32)>> = Vec::with_capacity(dst_size);
        for i in 0..dst_size {
            let center = i as f32 / scale + center_offset;
            let left = (center - width).floor() as i64;
            let right = (center + width).ceil() as i64;

            let mut list = Vec::with_capacity((right - left + 1) as usize);
            for j in left..=right {
                let mut weight = filter.weight((center - j as f32) * norm_factor);
                if weight == 0.0 {
                    continue;
                }

                let n = reflect(j, src_size as i64);
                if n < 0 || n >= src_size as i64 {
                    weight = 0.0;
                }
                list.push((n.clamp(0, src_size as i64 - 1) as usize, weight));
            }

            let total: f32 = list.iter().map(|&(_, w)| w).sum();
            if total != 0.0 {
                for (_, w) in &mut list {
                    *w /= total;
                }
            }
            lists.push(list);
        }

        let stride = lists.iter().map(Vec::len).max().unwrap_or(0);
        let mut counts = Vec::with_capacity(dst_size);
        let mut indices = vec![0; dst_size * stride];
        let mut weights = vec![0.0; dst_size * stride];
        for (i, list) in lists.iter().enumerate() {
            counts.push(list.len());
            for (k, &(n, w)) in list.iter().enumerate() {
                indices[i * stride + k] = n;
                weights[i * stride + k] = w;
            }
        }

        Self {
            src_size,
            dst_size,
            stride,
            counts,
            indices,
            weights,
        }
    }

    pub fn src_size(&self) -> usize {
        self.src_size
    }

    pub fn dst_size(&self) -> usize {
        self.dst_size
    }

    /// Maximum number of contributors of any destination index.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of contributors of destination index `i`.
    pub fn count(&self, i: usize) -> usize {
        self.counts[i]
    }

    /// Source indices contributing to destination index `i`.
    #[inline]
    pub fn indices(&self, i: usize) -> &[usize] {
        let start = i * self.stride;
        &self.indices[start..start + self.counts[i]]
    }

    /// Weights matching [`indices`](Self::indices).
    #[inline]
    pub fn weights(&self, i: usize) -> &[f32] {
        let start = i * self.stride;
        &self.weights[start..start + self.counts[i]]
    }

    /// `(source index, weight)` pairs of destination index `i`.
    pub fn contributors(&self, i: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.indices(i)
            .iter()
            .copied()
            .zip(self.weights(i).iter().copied())
    }

    pub fn weight_sum(&self, i: usize) -> f32 {
        self.weights(i).iter().sum()
    }
}

/// Mirrors an out of range index across the nearest edge.
/// The result is still out of range when `j` is more than one size away.
#[inline]
fn reflect(j: i64, size: i64) -> i64 {
    if j < 0 {
        -j
    } else if j >= size {
        2 * size - j - 1
    } else {
        j
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{BoxFilter, FilterType, Lanczos3, Triangle};

    #[test]
    fn weights_sum_to_one() {
        for &filter_type in FilterType::ALL {
            for (src, dst) in [(6, 3), (100, 37), (37, 100), (10, 10), (3, 40), (640, 3)] {
                let table = ContributorTable::new(filter_type.kernel(), src, dst);
                for i in 0..dst {
                    if table.count(i) == 0 {
                        continue;
                    }
                    let sum = table.weight_sum(i);
                    assert!(
                        (sum - 1.0).abs() < 1e-4,
                        "{} {}->{} index {} sums to {}",
                        filter_type,
                        src,
                        dst,
                        i,
                        sum
                    );
                }
            }
        }
    }

    #[test]
    fn indices_stay_in_source_bounds() {
        for (src, dst) in [(1, 5), (2, 9), (5, 3), (4, 2), (7, 64)] {
            let table = ContributorTable::new(&Lanczos3, src, dst);
            for i in 0..dst {
                assert!(table.indices(i).iter().all(|&n| n < src));
            }
        }
    }

    #[test]
    fn stride_is_max_count() {
        let table = ContributorTable::new(&Lanczos3, 100, 25);
        let max = (0..25).map(|i| table.count(i)).max().unwrap();
        assert_eq!(table.stride(), max);
        assert_eq!(table.dst_size(), 25);
        assert_eq!(table.src_size(), 100);
    }

    #[test]
    fn downsampling_widens_support() {
        let up = ContributorTable::new(&Lanczos3, 10, 20);
        let down = ContributorTable::new(&Lanczos3, 20, 10);
        assert!(down.stride() > up.stride());
        // Lanczos3 at half scale spans 2 * 3 / 0.5 source samples; the two
        // end points land on zero crossings and are skipped.
        assert!(down.stride() >= 10, "stride {}", down.stride());
    }

    #[test]
    fn left_edge_mirrors_into_source() {
        let table = ContributorTable::new(&Lanczos3, 10, 10);
        // center of index 0 is 0.5, so j = -2 and j = -1 are candidates
        // and reflect onto 2 and 1.
        let indices = table.indices(0);
        assert!(indices.contains(&1));
        assert!(indices.contains(&2));
        assert_eq!(table.count(0), table.indices(0).len());
    }

    #[test]
    fn unreachable_reflections_keep_zero_weight_slots() {
        // A single source pixel is far smaller than the Lanczos support, so some
        // mirrored candidates fall outside the source and are zeroed.
        let table = ContributorTable::new(&Lanczos3, 1, 4);
        let mut zeroed = 0;
        for i in 0..4 {
            zeroed += table.weights(i).iter().filter(|&&w| w == 0.0).count();
            assert!(table.indices(i).iter().all(|&n| n == 0));
            assert!((table.weight_sum(i) - 1.0).abs() < 1e-4);
        }
        assert!(zeroed > 0, "expected zero-weight slots");
    }

    #[test]
    fn box_downsample_weights_are_normalized() {
        let table = ContributorTable::new(&BoxFilter, 4, 2);
        for i in 0..2 {
            let contributors: Vec<_> = table.contributors(i).collect();
            assert!(!contributors.is_empty());
            let sum: f32 = contributors.iter().map(|&(_, w)| w).sum();
            assert!((sum - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn identity_scale_triangle_picks_neighbours() {
        let table = ContributorTable::new(&Triangle, 8, 8);
        // center of index 3 is 3.5, halfway between samples 3 and 4
        let contributors: Vec<_> = table.contributors(3).collect();
        assert_eq!(contributors.len(), 2);
        assert_eq!(contributors[0].0, 3);
        assert_eq!(contributors[1].0, 4);
        assert!((contributors[0].1 - 0.5).abs() < 1e-6);
    }
}
