//! Fixed-size batching of ticker lists.

use std::num::NonZeroUsize;
use std::slice::Chunks;

/// Split `items` into contiguous batches of `batch_size`.
///
/// The last batch holds the remainder when `items.len()` is not a multiple of
/// `batch_size`. An empty slice yields no batches. The iterator borrows the
/// input, so calling this again reproduces the same sequence.
pub fn batches<T>(items: &[T], batch_size: NonZeroUsize) -> Chunks<'_, T> {
    items.chunks(batch_size.get())
}

/// Number of batches `batches` yields for `len` items.
pub fn batch_count(len: usize, batch_size: NonZeroUsize) -> usize {
    len.div_ceil(batch_size.get())
}
