//! Executor: the public face of the reader pipeline.
//!
//! Resolves a source path to a format driver, optionally interposes a
//! reprojection stage, and streams points into a pooled table. The driver
//! registry is the only shared mutable state; every acquisition from it
//! happens under a mutex scoped narrowly around the registry call, and the
//! heavy point-emission work runs outside the lock. `run` blocks on the
//! driver's I/O.

use crate::driver::{Driver, DriverRegistry};
use crate::error::{IngestError, Result};
use crate::reprojection::Reprojection;
use crate::table::PooledPointTable;
use canopy_core::BBox;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

/// Source summary for callers deciding how to index: bounds, count, SRS,
/// and the dimension names the driver exposes.
#[derive(Clone, Debug)]
pub struct Preview {
    pub bbox: BBox,
    pub num_points: u64,
    pub srs: String,
    pub dim_names: Vec<String>,
}

/// Blocking reader-pipeline adapter over a shared driver registry.
#[derive(Debug)]
pub struct Executor {
    is3d: bool,
    registry: Mutex<DriverRegistry>,
}

impl Executor {
    pub fn new(is3d: bool) -> Self {
        Self::with_registry(is3d, DriverRegistry::default())
    }

    pub fn with_registry(is3d: bool, registry: DriverRegistry) -> Self {
        Self {
            is3d,
            registry: Mutex::new(registry),
        }
    }

    /// Whether any registered driver can read this path.
    pub fn good(&self, path: &Path) -> bool {
        self.registry.lock().infer_reader_driver(path).is_some()
    }

    /// Summarize a source. `None` when the path has no driver, the source
    /// is unreadable, or a requested reprojection cannot be resolved.
    pub fn preview(&self, path: &Path, reprojection: Option<&Reprojection>) -> Option<Preview> {
        match self.try_preview(path, reprojection) {
            Ok(preview) => Some(preview),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "preview failed");
                None
            }
        }
    }

    /// Stream every point in the source into the table, flushing it at the
    /// end. Returns `false` on any failure; partial emission may have
    /// occurred by then.
    pub fn run(
        &self,
        table: &mut PooledPointTable,
        path: &Path,
        reprojection: Option<&Reprojection>,
    ) -> bool {
        let result = self.try_run(table, path, reprojection);
        table.clear_filter();

        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "read failed");
                false
            }
        }
    }

    fn acquire_driver(&self, path: &Path) -> Result<Arc<dyn Driver>> {
        let registry = self.registry.lock();
        let name = registry
            .infer_reader_driver(path)
            .ok_or_else(|| IngestError::DriverUnknown(path.display().to_string()))?;
        registry
            .create_reader(&name)
            .ok_or(IngestError::DriverUnknown(name))
    }

    fn try_run(
        &self,
        table: &mut PooledPointTable,
        path: &Path,
        reprojection: Option<&Reprojection>,
    ) -> Result<()> {
        let driver = self.acquire_driver(path)?;

        if let Some(wanted) = reprojection {
            let inferred = driver.srs(path)?;
            let resolved = wanted.found_or_default(&inferred);
            let filter = self.registry.lock().create_reprojection_filter(&resolved)?;
            table.set_filter(filter);
        }

        driver.read(path, table)?;
        table.flush();
        Ok(())
    }

    fn try_preview(
        &self,
        path: &Path,
        reprojection: Option<&Reprojection>,
    ) -> Result<Preview> {
        let driver = self.acquire_driver(path)?;
        let info = driver.preview(path)?;

        let mut bbox = BBox::new(info.min, info.max, self.is3d)?;
        let mut srs = info.srs.clone();

        if let Some(wanted) = reprojection {
            let resolved = wanted.found_or_default(&info.srs);
            let filter = self.registry.lock().create_reprojection_filter(&resolved)?;

            // Pass the region corners through the same stage the points
            // would see.
            let mut corners = [info.min, info.max];
            filter.filter(&mut corners);
            bbox = BBox::new(corners[0], corners[1], self.is3d)?;
            srs = wanted.out_srs().to_string();
        }

        Ok(Preview {
            bbox,
            num_points: info.num_points,
            srs,
            dim_names: info.dim_names,
        })
    }
}
