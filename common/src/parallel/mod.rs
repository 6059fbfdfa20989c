//! Parallel processing utilities.

use rayon::prelude::*;


/// Multiplier for number of chunks relative to CPU threads.
/// Using 3x threads provides good load balancing when some chunks finish faster.
const CHUNKS_PER_THREAD: usize = 3;

/// Compute the number of rows per chunk for `rows` rows on the current pool.
///
/// Reads the thread count of the pool the caller is running in, so wrapping
/// the iteration in `ThreadPool::install` sizes chunks for that pool.
#[inline]
fn auto_chunk_rows(rows: usize) -> usize {
    let num_chunks = rayon::current_num_threads() * CHUNKS_PER_THREAD;
    (rows / num_chunks).max(1)
}

// ============================================================================
// Parallel iterator wrapper with offset
// ============================================================================

/// Parallel iterator that prepends a row offset to each chunk.
/// Wraps a chunked iterator and yields `(first_row, chunk)` pairs.
pub struct WithOffset<I> {
    inner: I,
    rows_per_chunk: usize,
}

impl<I> WithOffset<I> {
    fn new(inner: I, rows_per_chunk: usize) -> Self {
        Self {
            inner,
            rows_per_chunk,
        }
    }

    /// Number of rows carried by every chunk except possibly the last.
    pub fn rows_per_chunk(&self) -> usize {
        self.rows_per_chunk
    }
}

impl<I> ParallelIterator for WithOffset<I>
where
    I: IndexedParallelIterator,
{
    type Item = (usize, I::Item);

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: rayon::iter::plumbing::UnindexedConsumer<Self::Item>,
    {
        let rows_per_chunk = self.rows_per_chunk;
        self.inner
            .enumerate()
            .map(move |(idx, item)| (idx * rows_per_chunk, item))
            .drive_unindexed(consumer)
    }
}

impl<I> IndexedParallelIterator for WithOffset<I>
where
    I: IndexedParallelIterator,
{
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn drive<C>(self, consumer: C) -> C::Result
    where
        C: rayon::iter::plumbing::Consumer<Self::Item>,
    {
        let rows_per_chunk = self.rows_per_chunk;
        self.inner
            .enumerate()
            .map(move |(idx, item)| (idx * rows_per_chunk, item))
            .drive(consumer)
    }

    fn with_producer<CB>(self, callback: CB) -> CB::Output
    where
        CB: rayon::iter::plumbing::ProducerCallback<Self::Item>,
    {
        let rows_per_chunk = self.rows_per_chunk;
        self.inner
            .enumerate()
            .map(move |(idx, item)| (idx * rows_per_chunk, item))
            .with_producer(callback)
    }
}

/// Parallel iterator over row-aligned mutable chunks that yields `(first_row, chunk)` pairs.
pub type ParRowsMut<'a, T> = WithOffset<rayon::slice::ChunksMut<'a, T>>;

// ============================================================================
// Extension trait
// ============================================================================

/// Extension trait for row-aligned mutable parallel chunks.
pub trait ParRowsMutAuto<'a, T: Send + 'a> {
    /// Split into mutable parallel chunks aligned to row boundaries, sized
    /// automatically for the current thread pool.
    /// Yields `(first_row, chunk)` pairs where chunk contains complete rows.
    fn par_rows_mut_auto(&'a mut self, row_len: usize) -> ParRowsMut<'a, T>;

    /// Same as [`par_rows_mut_auto`](Self::par_rows_mut_auto) with an explicit
    /// number of rows per chunk.
    fn par_rows_mut_with(&'a mut self, row_len: usize, rows_per_chunk: usize)
        -> ParRowsMut<'a, T>;
}

impl<'a, T: Send + 'a> ParRowsMutAuto<'a, T> for [T] {
    fn par_rows_mut_auto(&'a mut self, row_len: usize) -> ParRowsMut<'a, T> {
        assert!(row_len > 0, "row length must be positive");
        let rows = self.len() / row_len;
        self.par_rows_mut_with(row_len, auto_chunk_rows(rows))
    }

    fn par_rows_mut_with(
        &'a mut self,
        row_len: usize,
        rows_per_chunk: usize,
    ) -> ParRowsMut<'a, T> {
        assert!(row_len > 0, "row length must be positive");
        assert!(rows_per_chunk > 0, "rows per chunk must be positive");
        assert_eq!(
            self.len() % row_len,
            0,
            "slice length must be a whole number of rows"
        );
        WithOffset::new(self.par_chunks_mut(row_len * rows_per_chunk), rows_per_chunk)
    }
}
