//! # Canopy Ingest
//!
//! Reader-pipeline adapter for the canopy index: resolves source paths to
//! format drivers, optionally interposes a reprojection stage, and emits
//! points into a pooled table.
//!
//! The indexing algebra in `canopy-core` is pure; this crate is the
//! blocking I/O boundary in front of it. The format-driver registry is the
//! single piece of shared mutable state and is serialized under one mutex,
//! held only around registry calls — point emission always runs outside
//! the lock.
//!
//! ## Example
//!
//! ```no_run
//! use canopy_ingest::{Executor, PooledPointTable};
//! use std::path::Path;
//!
//! let executor = Executor::new(true);
//! let mut table = PooledPointTable::new(|batch| {
//!     // hand the batch to the index builder
//!     let _ = batch.len();
//! });
//!
//! if executor.good(Path::new("survey.xyz")) {
//!     executor.run(&mut table, Path::new("survey.xyz"), None);
//! }
//! ```

pub mod driver;
pub mod error;
pub mod executor;
pub mod reprojection;
pub mod table;

pub use driver::{Driver, DriverRegistry, SourceInfo, XyzDriver};
pub use error::{IngestError, Result};
pub use executor::{Executor, Preview};
pub use reprojection::{Reprojection, ReprojectionFilter};
pub use table::{PooledPointTable, DEFAULT_TABLE_CAPACITY};
