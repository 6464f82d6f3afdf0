//! Chunk geometry: locating the chunk that owns a tree index.
//!
//! A chunk is a contiguous run of tree slots stored and addressed as a
//! unit. Given a [`Structure`] and a tree index in the cold band, this
//! module derives the owning chunk's identity in O(1) integer arithmetic:
//! no side table exists, every derived quantity must agree with every
//! other.
//!
//! All logarithms run on the integer-log path (`ilog2`). The arguments are
//! exact power-sums of the subdivision factor, so float rounding would be
//! the only possible source of error and is avoided entirely.

use crate::id::Id;
use crate::structure::Structure;

/// `factor^exp` as a tree index, computed by shifting: the factor is always
/// a power of two, so `factor^exp == 1 << (exp * log2(factor))`.
#[inline]
pub fn binary_pow(base_log2: u64, exp: u64) -> Id {
    Id::new(1) << (exp * base_log2) as u32
}

/// Smallest tree index at the given depth:
/// `(factor^depth - 1) / (factor - 1)`.
pub fn level_index(dimensions: u64, depth: u64) -> Id {
    (binary_pow(dimensions, depth) - 1) / ((1u64 << dimensions) - 1)
}

/// Slot count at exactly the given depth: `factor^depth`.
#[inline]
pub fn points_at_depth(dimensions: u64, depth: u64) -> Id {
    binary_pow(dimensions, depth)
}

/// Depth of a tree index: `floor(log_factor(index * (factor - 1) + 1))`.
pub fn calc_depth(factor: u64, index: Id) -> u64 {
    ((index * (factor - 1) + 1).ilog2() / factor.ilog2()) as u64
}

/// `floor(log_n(val))` for `n` a power of two (4 for quadtree, 8 for
/// octree).
pub fn log_n(val: u64, n: u64) -> u64 {
    debug_assert!(n == 4 || n == 8, "invalid log base: {n}");
    (val.ilog2() / n.ilog2()) as u64
}

/// Whether `val` is an exact `n^k`.
pub fn is_perfect_log_n(val: u64, n: u64) -> bool {
    val != 0 && (1u64 << (log_n(val, n) * n.ilog2() as u64)) == val
}

/// Location of a tree index within the chunked cold band.
///
/// Pure value, computed on demand. Indices below the cold band are a caller
/// error: the subtraction against `cold_index_begin` fails fatally rather
/// than producing a wrong location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkInfo {
    index: Id,
    depth: u64,
    chunk_id: Id,
    chunk_offset: u64,
    chunk_points: u64,
    chunk_num: u64,
}

impl ChunkInfo {
    pub fn new(structure: &Structure, index: Id) -> Self {
        let depth = calc_depth(structure.factor(), index);
        let level = level_index(structure.dimensions(), depth);
        let base_chunk_points = structure.base_chunk_points();

        let sparse_index_begin = structure.sparse_index_begin();
        let cold_index_begin = structure.cold_index_begin();

        if !structure.dynamic_chunks() || level <= sparse_index_begin {
            // Fixed-size regime: chunks tile the cold band uniformly from
            // its first index.
            let chunk_points = base_chunk_points;
            let (q, r) = (index - cold_index_begin).div_mod(chunk_points);

            Self {
                index,
                depth,
                chunk_id: cold_index_begin + q * chunk_points,
                chunk_offset: r.as_simple(),
                chunk_points,
                chunk_num: q.as_simple(),
            }
        } else {
            // Dynamic regime: chunk size grows by `factor` per depth past
            // the sparse threshold, keeping chunks-per-depth constant.
            let dims = structure.dimensions();
            let sparse_depth_begin = structure.sparse_depth_begin();

            let sparse_first_span = points_at_depth(dims, sparse_depth_begin).as_simple();
            let chunks_per_sparse_depth = sparse_first_span / base_chunk_points;

            let sparse_depth_count = depth - sparse_depth_begin;
            let chunk_points =
                (base_chunk_points * binary_pow(dims, sparse_depth_count)).as_simple();

            let cold_span = sparse_index_begin - cold_index_begin;
            let num_cold_chunks = (cold_span / base_chunk_points).as_simple();
            let prev_levels_chunk_count =
                num_cold_chunks + chunks_per_sparse_depth * sparse_depth_count;

            let level_offset = (index - level).as_simple();
            let slot = level_offset / chunk_points;

            Self {
                index,
                depth,
                chunk_id: level + slot * chunk_points,
                chunk_offset: level_offset % chunk_points,
                chunk_points,
                chunk_num: prev_levels_chunk_count + slot,
            }
        }
    }

    /// Degenerate location for a structure with no cold band.
    pub(crate) fn empty() -> Self {
        Self {
            index: Id::zero(),
            depth: 0,
            chunk_id: Id::zero(),
            chunk_offset: 0,
            chunk_points: 0,
            chunk_num: 0,
        }
    }

    /// The queried tree index.
    #[inline]
    pub fn index(&self) -> Id {
        self.index
    }

    /// Depth of the queried index.
    #[inline]
    pub fn depth(&self) -> u64 {
        self.depth
    }

    /// Tree index of the first slot in the owning chunk.
    #[inline]
    pub fn chunk_id(&self) -> Id {
        self.chunk_id
    }

    /// Offset of the queried index within its chunk.
    #[inline]
    pub fn chunk_offset(&self) -> u64 {
        self.chunk_offset
    }

    /// Slot count of the owning chunk.
    #[inline]
    pub fn chunk_points(&self) -> u64 {
        self.chunk_points
    }

    /// 0-based ordinal of the owning chunk among all cold-band chunks.
    #[inline]
    pub fn chunk_num(&self) -> u64 {
        self.chunk_num
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_index_quadtree() {
        assert_eq!(level_index(2, 0), Id::zero());
        assert_eq!(level_index(2, 1), Id::new(1));
        assert_eq!(level_index(2, 2), Id::new(5));
        assert_eq!(level_index(2, 3), Id::new(21));
    }

    #[test]
    fn test_level_index_octree() {
        assert_eq!(level_index(3, 1), Id::new(1));
        assert_eq!(level_index(3, 2), Id::new(9));
        // (8^8 - 1) / 7
        assert_eq!(level_index(3, 8), Id::new(2396745));
    }

    #[test]
    fn test_level_index_recurrence() {
        // levelIndex(d + 1) = levelIndex(d) * factor + 1, for both factors.
        for dims in [2u64, 3u64] {
            let factor = 1u64 << dims;
            for d in 0..20 {
                assert_eq!(
                    level_index(dims, d + 1),
                    level_index(dims, d) * factor + 1,
                    "dims {dims} depth {d}"
                );
            }
        }
    }

    #[test]
    fn test_points_at_depth() {
        assert_eq!(points_at_depth(2, 5), Id::new(1024));
        assert_eq!(points_at_depth(3, 4), Id::new(4096));
        // Past u64: quadtree depth 40.
        assert_eq!(points_at_depth(2, 40), Id::new(1) << 80);
    }

    #[test]
    fn test_calc_depth_boundaries() {
        for dims in [2u64, 3u64] {
            let factor = 1u64 << dims;
            for d in 1..16 {
                let first = level_index(dims, d);
                assert_eq!(calc_depth(factor, first), d);
                assert_eq!(calc_depth(factor, first - 1), d - 1);
                let last = level_index(dims, d + 1) - 1;
                assert_eq!(calc_depth(factor, last), d);
            }
        }
    }

    #[test]
    fn test_log_n() {
        assert_eq!(log_n(65536, 4), 8);
        assert_eq!(log_n(262144, 8), 6);
        assert_eq!(log_n(1, 4), 0);
    }

    #[test]
    fn test_is_perfect_log_n() {
        assert!(is_perfect_log_n(65536, 4));
        assert!(is_perfect_log_n(262144, 8));
        assert!(!is_perfect_log_n(1000, 4));
        assert!(!is_perfect_log_n(65536, 8));
        assert!(!is_perfect_log_n(0, 4));
    }
}
