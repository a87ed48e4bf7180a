//! Row-level parallel dispatch for pixel kernels.
//!
//! Small images run sequentially; above [`PARALLEL_THRESHOLD`] pixels, rows
//! are handed to rayon. Every kernel routed through here is a pure function of
//! its row (plus read-only shared data), so both paths produce identical bytes.

use rayon::prelude::*;

/// Minimum number of pixels before work is split across threads.
pub(crate) const PARALLEL_THRESHOLD: usize = 30_000;

/// Apply `f` to every row of `data`, in place.
///
/// `f` receives the row index and the mutable row slice.
pub fn for_each_row_mut<F>(data: &mut [u8], row_len: usize, pixel_count: usize, f: F)
where
    F: Fn(usize, &mut [u8]) + Sync,
{
    if row_len == 0 {
        return;
    }
    if pixel_count >= PARALLEL_THRESHOLD {
        data.par_chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    } else {
        for (y, row) in data.chunks_exact_mut(row_len).enumerate() {
            f(y, row);
        }
    }
}

/// Map every row of `data` to a value, preserving row order.
///
/// Order preservation is what lets callers reduce the results sequentially and
/// stay deterministic even for floating-point accumulators.
pub fn map_rows<T, F>(data: &[u8], row_len: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&[u8]) -> T + Sync + Send,
{
    if row_len == 0 {
        return Vec::new();
    }
    let rows = data.len() / row_len;
    if rows * row_len >= PARALLEL_THRESHOLD * 3 {
        data.par_chunks_exact(row_len).map(f).collect()
    } else {
        data.chunks_exact(row_len).map(f).collect()
    }
}

/// Map every row index `0..rows` to a value, preserving order.
pub fn map_row_indices<T, F>(rows: usize, pixel_count: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if pixel_count >= PARALLEL_THRESHOLD {
        (0..rows).into_par_iter().map(f).collect()
    } else {
        (0..rows).map(f).collect()
    }
}
