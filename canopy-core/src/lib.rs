//! # Canopy Core
//!
//! Hierarchical point-cloud index structure: the pure indexing algebra that
//! organizes massive 2D/3D point sets into a regular subdivision tree
//! (quadtree or octree) with chunked, self-describing storage layout.
//!
//! This crate provides:
//! - [`Id`]: exact tree indices wide enough for any configuration
//! - [`Structure`]: depth bands, chunk sizing, subset sharding
//! - [`ChunkInfo`]: O(1) index-to-chunk location, no side table
//! - [`Climber`]: stateful tree walker over bounding regions
//!
//! ## Design Principles
//!
//! 1. **Integer-exact**: every derived quantity is computed on an
//!    integer-log path; a wrong index corrupts the whole layout on disk.
//! 2. **Materialize once**: all band boundaries are derived at
//!    construction; queries afterwards are pure arithmetic, freely
//!    shareable across threads.
//! 3. **Fail fast**: index underflow and word-width overflow are
//!    programmer errors and panic rather than propagate.
//!
//! ## Example
//!
//! ```
//! use canopy_core::{Structure, StructureConfig};
//!
//! let structure = Structure::new(
//!     StructureConfig::quadtree().with_num_points_hint(4_000_000_000),
//! )?;
//!
//! let info = structure.get_info(structure.cold_index_begin());
//! assert_eq!(info.chunk_num(), 0);
//! # Ok::<(), canopy_core::Error>(())
//! ```

pub mod bbox;
pub mod chunk_info;
pub mod climber;
pub mod error;
pub mod id;
pub mod point;
pub mod structure;

pub use bbox::BBox;
pub use chunk_info::{
    binary_pow, calc_depth, is_perfect_log_n, level_index, log_n, points_at_depth, ChunkInfo,
};
pub use climber::Climber;
pub use error::{Error, Result};
pub use id::Id;
pub use point::{Dir, Point};
pub use structure::{Structure, StructureConfig};
