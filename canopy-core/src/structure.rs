//! Structure: the index configuration and its derived boundaries.
//!
//! A `Structure` partitions tree depths into three contiguous bands:
//!
//! - **null** `[0, nullDepthEnd)`: slots that are never stored;
//! - **base** `[nullDepthEnd, baseDepthEnd)`: slots kept resident as one
//!   unit by the builder;
//! - **cold** `[baseDepthEnd, coldDepthEnd)`: chunked storage, the subject
//!   of [`ChunkInfo`]. `coldDepthEnd == 0` means unbounded.
//!
//! All index boundaries are materialized once at construction and read-only
//! afterwards, so a `Structure` can be shared freely across threads and
//! every chunk query is O(1) arithmetic.

use crate::bbox::BBox;
use crate::chunk_info::{is_perfect_log_n, level_index, log_n, points_at_depth, ChunkInfo};
use crate::climber::Climber;
use crate::error::{Error, Result};
use crate::id::Id;
use crate::point::Dir;
use serde::{Deserialize, Serialize};

/// Serialized parameter set for a [`Structure`].
///
/// This is the persisted metadata document: camelCase keys, `subset` as a
/// two-element `[id, splits]` array, `[0, 0]` meaning whole.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructureConfig {
    /// End of the null depth band.
    pub null_depth: u64,
    /// End of the base depth band.
    pub base_depth: u64,
    /// End of the cold depth band; 0 = unbounded.
    pub cold_depth: u64,
    /// Nominal tree slots per chunk; must be `factor^n` when a cold band
    /// exists, may be 0 otherwise.
    pub chunk_points: u64,
    /// 2 for quadtree, 3 for octree.
    pub dimensions: u64,
    /// Expected total point count; 0 = unknown (disables the sparse
    /// threshold, with a performance warning).
    pub num_points_hint: u64,
    /// Grow chunk size geometrically past the sparse threshold.
    pub dynamic_chunks: bool,
    /// `(id, splits)` shard identity; `(0, 0)` = whole.
    pub subset: (u64, u64),
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self::octree()
    }
}

impl StructureConfig {
    /// Octree defaults: 3 dimensions, 8^6 points per chunk.
    pub fn octree() -> Self {
        Self {
            null_depth: 6,
            base_depth: 10,
            cold_depth: 0,
            chunk_points: 262_144,
            dimensions: 3,
            num_points_hint: 0,
            dynamic_chunks: true,
            subset: (0, 0),
        }
    }

    /// Quadtree defaults: 2 dimensions, 4^8 points per chunk.
    pub fn quadtree() -> Self {
        Self {
            chunk_points: 65_536,
            dimensions: 2,
            ..Self::octree()
        }
    }

    pub fn with_null_depth(mut self, depth: u64) -> Self {
        self.null_depth = depth;
        self
    }

    pub fn with_base_depth(mut self, depth: u64) -> Self {
        self.base_depth = depth;
        self
    }

    pub fn with_cold_depth(mut self, depth: u64) -> Self {
        self.cold_depth = depth;
        self
    }

    pub fn with_chunk_points(mut self, points: u64) -> Self {
        self.chunk_points = points;
        self
    }

    pub fn with_dimensions(mut self, dimensions: u64) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_num_points_hint(mut self, hint: u64) -> Self {
        self.num_points_hint = hint;
        self
    }

    pub fn with_dynamic_chunks(mut self, dynamic: bool) -> Self {
        self.dynamic_chunks = dynamic;
        self
    }

    pub fn with_subset(mut self, id: u64, splits: u64) -> Self {
        self.subset = (id, splits);
        self
    }
}

/// Validated index structure with materialized band boundaries.
///
/// Immutable after construction except for [`Structure::make_whole`], which
/// clears subset identity when shards are merged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Structure {
    null_depth_begin: u64,
    null_depth_end: u64,
    base_depth_begin: u64,
    base_depth_end: u64,
    cold_depth_begin: u64,
    cold_depth_end: u64,
    sparse_depth_begin: u64,

    null_index_begin: Id,
    null_index_end: Id,
    base_index_begin: Id,
    base_index_end: Id,
    cold_index_begin: Id,
    cold_index_end: Id,
    sparse_index_begin: Id,

    chunk_points: u64,
    nominal_chunk_depth: u64,
    nominal_chunk_index: u64,
    dynamic_chunks: bool,

    dimensions: u64,
    factor: u64,
    num_points_hint: u64,
    subset: (u64, u64),
}

impl Structure {
    /// Validate a configuration and materialize every derived boundary.
    pub fn new(config: StructureConfig) -> Result<Self> {
        if config.dimensions != 2 && config.dimensions != 3 {
            return Err(Error::invalid_config(format!(
                "dimensions must be 2 or 3, got {}",
                config.dimensions
            )));
        }

        let null_depth_end = config.null_depth;
        let base_depth_end = config.base_depth.max(null_depth_end);
        let cold_depth_begin = base_depth_end;
        let cold_depth_end = if config.cold_depth == 0 {
            0
        } else {
            config.cold_depth.max(cold_depth_begin)
        };

        let mut structure = Self {
            null_depth_begin: 0,
            null_depth_end,
            base_depth_begin: null_depth_end,
            base_depth_end,
            cold_depth_begin,
            cold_depth_end,
            sparse_depth_begin: 0,
            null_index_begin: Id::zero(),
            null_index_end: Id::zero(),
            base_index_begin: Id::zero(),
            base_index_end: Id::zero(),
            cold_index_begin: Id::zero(),
            cold_index_end: Id::zero(),
            sparse_index_begin: Id::zero(),
            chunk_points: config.chunk_points,
            nominal_chunk_depth: 0,
            nominal_chunk_index: 0,
            dynamic_chunks: config.dynamic_chunks,
            dimensions: config.dimensions,
            factor: 1u64 << config.dimensions,
            num_points_hint: config.num_points_hint,
            subset: config.subset,
        };

        structure.load_index_values()?;
        Ok(structure)
    }

    /// Rehydrate from a persisted metadata document.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let config: StructureConfig = serde_json::from_value(value)?;
        Self::new(config)
    }

    fn load_index_values(&mut self) -> Result<()> {
        if self.base_depth_end < 4 {
            return Err(Error::invalid_config(format!(
                "base depth too small: {}",
                self.base_depth_end
            )));
        }

        if self.chunk_points == 0 && self.has_cold() {
            return Err(Error::invalid_config(
                "chunk points not specified, but a cold depth was given",
            ));
        }

        if self.has_cold() && !is_perfect_log_n(self.chunk_points, self.factor) {
            return Err(Error::invalid_config(format!(
                "invalid chunk specification {}: must be of the form 4^n for \
                 quadtree, or 8^n for octree",
                self.chunk_points
            )));
        }

        if self.chunk_points > 0 {
            self.nominal_chunk_depth = log_n(self.chunk_points, self.factor);
            self.nominal_chunk_index =
                level_index(self.dimensions, self.nominal_chunk_depth).as_simple();
        }

        self.null_index_begin = Id::zero();
        self.null_index_end = level_index(self.dimensions, self.null_depth_end);
        self.base_index_begin = self.null_index_end;
        self.base_index_end = level_index(self.dimensions, self.base_depth_end);
        self.cold_index_begin = self.base_index_end;
        self.cold_index_end = if self.cold_depth_end != 0 {
            level_index(self.dimensions, self.cold_depth_end)
        } else {
            Id::zero()
        };

        if self.num_points_hint != 0 {
            // Sparse begins one level past the shallowest depth whose slot
            // capacity reaches the hint.
            let mut full_depth = 0u64;
            let mut capacity: u128 = 1;
            while capacity < self.num_points_hint as u128 {
                capacity *= self.factor as u128;
                full_depth += 1;
            }

            self.sparse_depth_begin = (full_depth + 1).max(self.cold_depth_begin);
            self.sparse_index_begin = level_index(self.dimensions, self.sparse_depth_begin);
        } else {
            tracing::warn!(
                "no numPointsHint provided; for more than a few billion points \
                 there may be a large performance hit"
            );
        }

        let (id, splits) = self.subset;
        if splits != 0 {
            let null_span: u128 = 1u128 << (2 * self.null_depth_end.min(32));
            if self.null_depth_end == 0 || null_span < splits as u128 {
                return Err(Error::invalid_config(format!(
                    "invalid null depth {} for requested subset",
                    self.null_depth_end
                )));
            }

            if splits != 4 && splits != 16 && splits != 64 {
                return Err(Error::invalid_config(format!(
                    "invalid subset split: {splits}"
                )));
            }

            if id >= splits {
                return Err(Error::invalid_config(format!(
                    "invalid subset identifier: {id} >= {splits}"
                )));
            }

            if self.has_cold() {
                let cold_first_span =
                    points_at_depth(self.dimensions, self.cold_depth_begin).as_simple();
                let chunks = cold_first_span / self.chunk_points;

                if chunks < splits || chunks % splits != 0 {
                    return Err(Error::invalid_config(format!(
                        "invalid chunk size {} for subset of {splits}",
                        self.chunk_points
                    )));
                }
            }
        }

        Ok(())
    }

    // === Depth bands ===

    #[inline]
    pub fn null_depth_begin(&self) -> u64 {
        self.null_depth_begin
    }

    #[inline]
    pub fn null_depth_end(&self) -> u64 {
        self.null_depth_end
    }

    #[inline]
    pub fn base_depth_begin(&self) -> u64 {
        self.base_depth_begin
    }

    #[inline]
    pub fn base_depth_end(&self) -> u64 {
        self.base_depth_end
    }

    #[inline]
    pub fn cold_depth_begin(&self) -> u64 {
        self.cold_depth_begin
    }

    /// 0 = unbounded.
    #[inline]
    pub fn cold_depth_end(&self) -> u64 {
        self.cold_depth_end
    }

    /// First sparse depth; 0 when no hint was given (never sparse).
    #[inline]
    pub fn sparse_depth_begin(&self) -> u64 {
        self.sparse_depth_begin
    }

    // === Index boundaries ===

    #[inline]
    pub fn null_index_begin(&self) -> Id {
        self.null_index_begin
    }

    #[inline]
    pub fn null_index_end(&self) -> Id {
        self.null_index_end
    }

    #[inline]
    pub fn base_index_begin(&self) -> Id {
        self.base_index_begin
    }

    #[inline]
    pub fn base_index_end(&self) -> Id {
        self.base_index_end
    }

    #[inline]
    pub fn cold_index_begin(&self) -> Id {
        self.cold_index_begin
    }

    /// Zero when the cold band is unbounded.
    #[inline]
    pub fn cold_index_end(&self) -> Id {
        self.cold_index_end
    }

    #[inline]
    pub fn sparse_index_begin(&self) -> Id {
        self.sparse_index_begin
    }

    // === Band predicates ===

    pub fn is_within_null(&self, index: Id) -> bool {
        index < self.null_index_end
    }

    pub fn is_within_base(&self, index: Id) -> bool {
        index >= self.base_index_begin && index < self.base_index_end
    }

    pub fn is_within_cold(&self, index: Id) -> bool {
        index >= self.cold_index_begin
            && (self.cold_index_end.is_zero() || index < self.cold_index_end)
    }

    // === Chunk parameters ===

    /// Nominal slots per chunk in the fixed-size regime.
    #[inline]
    pub fn base_chunk_points(&self) -> u64 {
        self.chunk_points
    }

    /// Depth whose slot count equals one nominal chunk.
    #[inline]
    pub fn nominal_chunk_depth(&self) -> u64 {
        self.nominal_chunk_depth
    }

    /// First tree index at [`Structure::nominal_chunk_depth`].
    #[inline]
    pub fn nominal_chunk_index(&self) -> u64 {
        self.nominal_chunk_index
    }

    #[inline]
    pub fn dynamic_chunks(&self) -> bool {
        self.dynamic_chunks
    }

    #[inline]
    pub fn dimensions(&self) -> u64 {
        self.dimensions
    }

    /// Children per subdivision: 4 or 8.
    #[inline]
    pub fn factor(&self) -> u64 {
        self.factor
    }

    #[inline]
    pub fn is_2d(&self) -> bool {
        self.dimensions == 2
    }

    #[inline]
    pub fn is_3d(&self) -> bool {
        self.dimensions == 3
    }

    #[inline]
    pub fn num_points_hint(&self) -> u64 {
        self.num_points_hint
    }

    /// Whether a cold band exists (unbounded counts as existing).
    pub fn has_cold(&self) -> bool {
        self.cold_depth_end == 0 || self.cold_depth_end > self.cold_depth_begin
    }

    pub fn has_sparse(&self) -> bool {
        self.sparse_depth_begin != 0
    }

    // === Chunk queries ===

    /// Locate the chunk owning a cold-band tree index.
    pub fn get_info(&self, index: Id) -> ChunkInfo {
        ChunkInfo::new(self, index)
    }

    /// Left-inverse of [`ChunkInfo::chunk_num`]: locate a chunk by ordinal.
    pub fn get_info_from_num(&self, chunk_num: u64) -> ChunkInfo {
        if !self.has_cold() {
            return ChunkInfo::empty();
        }

        let chunk_id = if self.has_sparse() && self.dynamic_chunks {
            // Chunks through the first sparse depth keep the nominal size;
            // past it, chunk count per depth is constant.
            let end_fixed = level_index(self.dimensions, self.sparse_depth_begin + 1);
            let fixed_span = end_fixed - self.cold_index_begin;
            let fixed_num = (fixed_span / self.chunk_points).as_simple();

            if chunk_num < fixed_num {
                self.cold_index_begin + Id::new(chunk_num) * self.chunk_points
            } else {
                let leftover = chunk_num - fixed_num;
                let chunks_per_sparse_depth = self.num_chunks_at_depth(self.sparse_depth_begin);

                let depth = self.sparse_depth_begin + 1 + leftover / chunks_per_sparse_depth;
                let chunk_num_in_depth = leftover % chunks_per_sparse_depth;
                let depth_chunk_size =
                    (points_at_depth(self.dimensions, depth) / chunks_per_sparse_depth)
                        .as_simple();

                level_index(self.dimensions, depth)
                    + Id::new(chunk_num_in_depth) * depth_chunk_size
            }
        } else {
            self.cold_index_begin + Id::new(chunk_num) * self.chunk_points
        };

        ChunkInfo::new(self, chunk_id)
    }

    /// Number of chunks covering a single depth.
    ///
    /// Constant for all depths past the sparse threshold; that is the
    /// defining property of dynamic chunks.
    pub fn num_chunks_at_depth(&self, depth: u64) -> u64 {
        if self.chunk_points == 0 {
            return 0;
        }

        if !self.has_sparse() || !self.dynamic_chunks || depth <= self.sparse_depth_begin {
            let span = level_index(self.dimensions, depth + 1)
                - level_index(self.dimensions, depth);
            (span / self.chunk_points).as_simple()
        } else {
            (points_at_depth(self.dimensions, self.sparse_depth_begin) / self.chunk_points)
                .as_simple()
        }
    }

    // === Subsets ===

    #[inline]
    pub fn is_subset(&self) -> bool {
        self.subset.1 != 0
    }

    /// `(id, splits)`; `(0, 0)` when whole.
    #[inline]
    pub fn subset(&self) -> (u64, u64) {
        self.subset
    }

    /// Erase subset identity; used when merging shards into one index.
    pub fn make_whole(&mut self) {
        self.subset = (0, 0);
    }

    /// Spatial region of this shard within the full bounding region.
    ///
    /// Decodes two id bits per descent step, least-significant pair first.
    /// Only quadtree structures can be split.
    pub fn subset_bbox(&self, full: &BBox) -> Result<BBox> {
        if self.is_3d() {
            return Err(Error::unsupported_split_3d(
                "cannot currently split an octree structure",
            ));
        }

        let (id, splits) = self.subset;
        let times = match splits {
            4 => 1,
            16 => 2,
            64 => 3,
            _ => {
                return Err(Error::invalid_config(format!(
                    "invalid subset split: {splits}"
                )))
            }
        };

        let mut climber = Climber::new(*full, self);
        for i in 0..times {
            climber.go(Dir::from_bits_2d(id >> (2 * i)));
        }

        Ok(*climber.bbox())
    }

    /// Name suffix for shard-scoped artifacts: `"-<id>"`, empty when whole.
    pub fn subset_postfix(&self) -> String {
        if self.is_subset() {
            format!("-{}", self.subset.0)
        } else {
            String::new()
        }
    }

    /// Chunk-store name for a chunk: decimal chunk id plus subset postfix.
    pub fn chunk_name(&self, chunk_id: Id) -> String {
        format!("{}{}", chunk_id, self.subset_postfix())
    }

    // === Serialization ===

    /// The persisted parameter set; [`Structure::new`] on the result yields
    /// an equal structure.
    pub fn to_config(&self) -> StructureConfig {
        StructureConfig {
            null_depth: self.null_depth_end,
            base_depth: self.base_depth_end,
            cold_depth: self.cold_depth_end,
            chunk_points: self.chunk_points,
            dimensions: self.dimensions,
            num_points_hint: self.num_points_hint,
            dynamic_chunks: self.dynamic_chunks,
            subset: self.subset,
        }
    }

    /// Persisted metadata document.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.to_config())?)
    }
}
