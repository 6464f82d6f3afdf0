//! Format drivers and the shared driver registry.
//!
//! The registry maps source paths to reader drivers by extension and
//! constructs reprojection stages. It is the one piece of shared mutable
//! state in the adapter and is only ever touched under the executor's
//! mutex; the drivers it hands out are owned by the caller and run without
//! locking.

use crate::error::{IngestError, Result};
use crate::reprojection::{Reprojection, ReprojectionFilter};
use crate::table::PooledPointTable;
use canopy_core::Point;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// Source summary produced by a driver preview, before the executor
/// assembles it into a dimensioned bounding region.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceInfo {
    pub min: Point,
    pub max: Point,
    pub num_points: u64,
    pub srs: String,
    pub dim_names: Vec<String>,
}

/// A point-format reader driver.
pub trait Driver: Send + Sync {
    fn name(&self) -> &'static str;

    /// File extensions this driver recognizes, lowercase.
    fn extensions(&self) -> &'static [&'static str];

    /// Summarize a source without emitting points.
    fn preview(&self, path: &Path) -> Result<SourceInfo>;

    /// Emit every point in the source into the table. Returns the point
    /// count read.
    fn read(&self, path: &Path, table: &mut PooledPointTable) -> Result<u64>;

    /// SRS inferred from the source, empty when the format carries none.
    ///
    /// The default implementation pays for a full preview; drivers with a
    /// cheaper metadata path should override it.
    fn srs(&self, path: &Path) -> Result<String> {
        Ok(self.preview(path)?.srs)
    }
}

// === ASCII xyz driver ===

/// Whitespace-separated ASCII coordinates, one point per line.
///
/// `#` starts a comment line; an optional `srs: <name>` header line may
/// precede the data. A third coordinate is optional and further columns
/// (intensity etc.) are ignored.
#[derive(Debug, Default)]
pub struct XyzDriver;

impl XyzDriver {
    fn parse_line(line: &str, lineno: usize) -> Result<Point> {
        let mut parts = line.split_whitespace();

        let mut coord = |axis: &str| -> Result<f64> {
            parts
                .next()
                .ok_or_else(|| {
                    IngestError::parse(format!("line {lineno}: missing {axis} coordinate"))
                })?
                .parse()
                .map_err(|_| {
                    IngestError::parse(format!("line {lineno}: malformed {axis} coordinate"))
                })
        };

        let x = coord("x")?;
        let y = coord("y")?;
        let z = match parts.next() {
            Some(raw) => raw.parse().map_err(|_| {
                IngestError::parse(format!("line {lineno}: malformed z coordinate"))
            })?,
            None => 0.0,
        };

        Ok(Point::new(x, y, z))
    }

    fn header_srs(line: &str) -> Option<&str> {
        line.strip_prefix("srs:").map(str::trim)
    }

    fn scan(
        &self,
        path: &Path,
        mut on_point: impl FnMut(Point),
    ) -> Result<(u64, String)> {
        let reader = BufReader::new(File::open(path)?);
        let mut srs = String::new();
        let mut count = 0u64;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if count == 0 {
                if let Some(header) = Self::header_srs(trimmed) {
                    srs = header.to_string();
                    continue;
                }
            }

            on_point(Self::parse_line(trimmed, i + 1)?);
            count += 1;
        }

        Ok((count, srs))
    }
}

impl Driver for XyzDriver {
    fn name(&self) -> &'static str {
        "readers.xyz"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xyz", "txt"]
    }

    fn preview(&self, path: &Path) -> Result<SourceInfo> {
        let mut min = Point::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point::new(f64::MIN, f64::MIN, f64::MIN);

        let (num_points, srs) = self.scan(path, |p| {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        })?;

        if num_points == 0 {
            return Err(IngestError::parse(format!(
                "no points in source: {}",
                path.display()
            )));
        }

        Ok(SourceInfo {
            min,
            max,
            num_points,
            srs,
            dim_names: vec!["X".to_string(), "Y".to_string(), "Z".to_string()],
        })
    }

    fn read(&self, path: &Path, table: &mut PooledPointTable) -> Result<u64> {
        let (count, _) = self.scan(path, |p| table.push(p))?;
        Ok(count)
    }

    fn srs(&self, path: &Path) -> Result<String> {
        let reader = BufReader::new(File::open(path)?);

        // The header, if any, precedes the first data line.
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some(header) = Self::header_srs(trimmed) {
                return Ok(header.to_string());
            }
            break;
        }

        Ok(String::new())
    }
}

// === Built-in reprojection stage ===

/// SRS-resolving stage with identity coordinate math; real transforms come
/// from external filter implementations registered alongside it.
struct SrsFilter {
    in_srs: String,
    out_srs: String,
}

impl ReprojectionFilter for SrsFilter {
    fn in_srs(&self) -> &str {
        &self.in_srs
    }

    fn out_srs(&self) -> &str {
        &self.out_srs
    }

    fn filter(&self, _points: &mut [Point]) {}
}

// === Registry ===

/// Shared format-driver registry.
///
/// Not internally synchronized; the executor serializes access.
pub struct DriverRegistry {
    drivers: Vec<Arc<dyn Driver>>,
}

impl DriverRegistry {
    pub fn empty() -> Self {
        Self {
            drivers: Vec::new(),
        }
    }

    pub fn register(&mut self, driver: Arc<dyn Driver>) {
        self.drivers.push(driver);
    }

    /// Name of the driver handling this path, if any.
    ///
    /// Pipeline-style `.json` sources are reserved for a future extension
    /// and report as not readable.
    pub fn infer_reader_driver(&self, path: &Path) -> Option<String> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();

        if ext == "json" {
            tracing::debug!(path = %path.display(), "pipeline sources not yet supported");
            return None;
        }

        self.drivers
            .iter()
            .find(|d| d.extensions().contains(&ext.as_str()))
            .map(|d| d.name().to_string())
    }

    /// Hand out the named driver; the caller owns it past the registry
    /// lock.
    pub fn create_reader(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.iter().find(|d| d.name() == name).cloned()
    }

    /// Construct a reprojection stage for a resolved request.
    pub fn create_reprojection_filter(
        &self,
        reprojection: &Reprojection,
    ) -> Result<Box<dyn ReprojectionFilter>> {
        if reprojection.in_srs().is_empty() {
            return Err(IngestError::ReprojectionUnresolved);
        }

        Ok(Box::new(SrsFilter {
            in_srs: reprojection.in_srs().to_string(),
            out_srs: reprojection.out_srs().to_string(),
        }))
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(XyzDriver));
        registry
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field(
                "drivers",
                &self.drivers.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
