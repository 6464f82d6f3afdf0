//! Axis-aligned bounding regions with child-region selection.

use crate::error::{Error, Result};
use crate::point::{Dir, Point};
use serde::{Deserialize, Serialize};

/// A bounding region: a `(min, max)` pair of points plus a 2D/3D flag.
///
/// Invariant: `min.i <= max.i` per active axis (the `z` axis is inactive in
/// 2D mode and passes through geometry operations untouched).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    min: Point,
    max: Point,
    is3d: bool,
}

impl BBox {
    /// Create a bounding region, validating the per-axis ordering invariant.
    pub fn new(min: Point, max: Point, is3d: bool) -> Result<Self> {
        if min.x > max.x || min.y > max.y || (is3d && min.z > max.z) {
            return Err(Error::invalid_bounds(format!(
                "min {min} exceeds max {max}"
            )));
        }

        Ok(Self { min, max, is3d })
    }

    #[inline]
    pub fn min(&self) -> &Point {
        &self.min
    }

    #[inline]
    pub fn max(&self) -> &Point {
        &self.max
    }

    #[inline]
    pub fn is_3d(&self) -> bool {
        self.is3d
    }

    /// Center of the region. In 2D the `z` midpoint is still computed but
    /// never consulted by subdivision.
    pub fn mid(&self) -> Point {
        Point::new(
            self.min.x + (self.max.x - self.min.x) / 2.0,
            self.min.y + (self.max.y - self.min.y) / 2.0,
            self.min.z + (self.max.z - self.min.z) / 2.0,
        )
    }

    /// Extent along `x`.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along `y`.
    #[inline]
    pub fn depth(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Extent along `z`.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.z - self.min.z
    }

    /// Footprint area (`x` by `y`).
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.depth()
    }

    /// Volume; only meaningful in 3D mode.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.width() * self.depth() * self.height()
    }

    /// Half-open containment check over the active axes.
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min.x
            && p.x < self.max.x
            && p.y >= self.min.y
            && p.y < self.max.y
            && (!self.is3d || (p.z >= self.min.z && p.z < self.max.z))
    }

    /// The child region in the given direction.
    ///
    /// Splits each active axis at its midpoint. In 2D the `z` range is
    /// inherited whole and `up` directions are a caller error.
    pub fn go(&self, dir: Dir) -> BBox {
        debug_assert!(self.is3d || !dir.up(), "up direction in a 2D region");

        let mid = self.mid();

        let (min_x, max_x) = if dir.east() {
            (mid.x, self.max.x)
        } else {
            (self.min.x, mid.x)
        };

        let (min_y, max_y) = if dir.south() {
            (self.min.y, mid.y)
        } else {
            (mid.y, self.max.y)
        };

        let (min_z, max_z) = if !self.is3d {
            (self.min.z, self.max.z)
        } else if dir.up() {
            (mid.z, self.max.z)
        } else {
            (self.min.z, mid.z)
        };

        BBox {
            min: Point::new(min_x, min_y, min_z),
            max: Point::new(max_x, max_y, max_z),
            is3d: self.is3d,
        }
    }

    #[inline]
    pub fn go_nwd(&self) -> BBox {
        self.go(Dir::Nwd)
    }

    #[inline]
    pub fn go_ned(&self) -> BBox {
        self.go(Dir::Ned)
    }

    #[inline]
    pub fn go_swd(&self) -> BBox {
        self.go(Dir::Swd)
    }

    #[inline]
    pub fn go_sed(&self) -> BBox {
        self.go(Dir::Sed)
    }
}
