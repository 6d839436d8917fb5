//! Splitting a row set into sequential chunks

use std::ops::Range;

/// Split `len` rows into consecutive ranges of at most `width` rows
///
/// Yields `ceil(len / width)` ranges covering `0..len` with no gaps or
/// overlaps; the last range takes the remainder. A zero width is treated as
/// one.
pub fn chunk_ranges(len: usize, width: usize) -> impl Iterator<Item = Range<usize>> {
    let width = width.max(1);
    (0..len.div_ceil(width)).map(move |i| i * width..((i + 1) * width).min(len))
}
