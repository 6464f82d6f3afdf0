//! Stateful tree walker.
//!
//! A `Climber` descends the subdivision tree one child at a time, keeping
//! the current bounding region and the current tree index in lockstep. It
//! is transient: create one per query, walk it down, read off the result.

use crate::bbox::BBox;
use crate::id::Id;
use crate::point::{Dir, Point};
use crate::structure::Structure;

/// Walker over `(bbox, index, depth)`.
///
/// The index follows the breadth-first numbering: the first child of `i` is
/// `i * factor + 1`, so each descent step computes
/// `index * factor + 1 + dir`.
#[derive(Clone, Debug)]
pub struct Climber<'a> {
    structure: &'a Structure,
    bbox: BBox,
    index: Id,
    depth: u64,
}

impl<'a> Climber<'a> {
    pub fn new(bbox: BBox, structure: &'a Structure) -> Self {
        Self {
            structure,
            bbox,
            index: Id::zero(),
            depth: 0,
        }
    }

    /// Descend into the child region in the given direction.
    pub fn go(&mut self, dir: Dir) {
        self.index = self.index * self.structure.factor() + (1 + dir as u64);
        self.depth += 1;
        self.bbox = self.bbox.go(dir);
    }

    /// Descend toward the child region containing the point, returning the
    /// direction taken.
    pub fn magnify(&mut self, p: &Point) -> Dir {
        let mid = self.bbox.mid();

        let mut bits = 0u64;
        if p.x >= mid.x {
            bits |= 0b001;
        }
        if p.y < mid.y {
            bits |= 0b010;
        }

        let dir = if self.structure.is_3d() {
            if p.z >= mid.z {
                bits |= 0b100;
            }
            Dir::from_bits_3d(bits)
        } else {
            Dir::from_bits_2d(bits)
        };

        self.go(dir);
        dir
    }

    pub fn go_nwd(&mut self) {
        self.go(Dir::Nwd)
    }

    pub fn go_ned(&mut self) {
        self.go(Dir::Ned)
    }

    pub fn go_swd(&mut self) {
        self.go(Dir::Swd)
    }

    pub fn go_sed(&mut self) {
        self.go(Dir::Sed)
    }

    #[inline]
    pub fn bbox(&self) -> &BBox {
        &self.bbox
    }

    #[inline]
    pub fn index(&self) -> Id {
        self.index
    }

    #[inline]
    pub fn depth(&self) -> u64 {
        self.depth
    }
}
