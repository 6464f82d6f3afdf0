//! Exact non-negative tree index.
//!
//! Every slot in the subdivision tree is addressed by a single non-negative
//! integer, assigned breadth-first from the root. Depths past ~30 in a
//! quadtree (or ~20 in an octree) overflow `u64`, so indices are carried as
//! `u128` throughout the algebra and only narrowed at the few sites that
//! need a machine word.
//!
//! Arithmetic here is total or fatal: a subtraction that would go negative,
//! or a narrowing of a value wider than 64 bits, indicates a corrupted
//! configuration or a caller-level bug and panics rather than propagating a
//! silently wrong index.

use std::fmt;
use std::ops::{Add, Div, Mul, Rem, Shl, Sub};

/// Tree index wide enough for any realizable structure configuration.
///
/// `u128` covers a quadtree of depth 63 and an octree of depth 42, far past
/// what any depth-band configuration can produce.
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Id(u128);

impl Id {
    /// Index zero (the root slot).
    #[inline]
    pub const fn zero() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn new(v: u64) -> Self {
        Self(v as u128)
    }

    /// Division with remainder by a small divisor.
    ///
    /// Both halves come back as `Id` so that quotients wider than a machine
    /// word survive; narrow at the call site with [`Id::as_simple`] when the
    /// algorithm guarantees the value fits.
    #[inline]
    pub fn div_mod(self, divisor: u64) -> (Id, Id) {
        let d = divisor as u128;
        (Self(self.0 / d), Self(self.0 % d))
    }

    /// Narrow to a machine word.
    ///
    /// # Panics
    ///
    /// Panics if the value exceeds 64 bits. Callers only narrow quantities
    /// the algorithms bound to a word (chunk ordinals, in-chunk offsets), so
    /// a failure here is fatal by design.
    #[inline]
    pub fn as_simple(self) -> u64 {
        u64::try_from(self.0)
            .unwrap_or_else(|_| panic!("tree index {} exceeds 64 bits", self.0))
    }

    /// Floor of the base-2 logarithm.
    ///
    /// # Panics
    ///
    /// Panics on zero.
    #[inline]
    pub fn ilog2(self) -> u32 {
        self.0.ilog2()
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Id {
    type Output = Id;

    #[inline]
    fn add(self, rhs: Id) -> Id {
        Id(self.0 + rhs.0)
    }
}

impl Add<u64> for Id {
    type Output = Id;

    #[inline]
    fn add(self, rhs: u64) -> Id {
        Id(self.0 + rhs as u128)
    }
}

impl Sub for Id {
    type Output = Id;

    #[inline]
    fn sub(self, rhs: Id) -> Id {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Id(v),
            None => panic!("tree index underflow: {} - {}", self.0, rhs.0),
        }
    }
}

impl Sub<u64> for Id {
    type Output = Id;

    #[inline]
    fn sub(self, rhs: u64) -> Id {
        self - Id::new(rhs)
    }
}

impl Mul<u64> for Id {
    type Output = Id;

    #[inline]
    fn mul(self, rhs: u64) -> Id {
        Id(self.0 * rhs as u128)
    }
}

impl Mul<Id> for u64 {
    type Output = Id;

    #[inline]
    fn mul(self, rhs: Id) -> Id {
        Id(self as u128 * rhs.0)
    }
}

impl Div<u64> for Id {
    type Output = Id;

    #[inline]
    fn div(self, rhs: u64) -> Id {
        Id(self.0 / rhs as u128)
    }
}

impl Rem<u64> for Id {
    type Output = Id;

    #[inline]
    fn rem(self, rhs: u64) -> Id {
        Id(self.0 % rhs as u128)
    }
}

impl Shl<u32> for Id {
    type Output = Id;

    #[inline]
    fn shl(self, rhs: u32) -> Id {
        Id(self.0 << rhs)
    }
}

impl From<u64> for Id {
    #[inline]
    fn from(v: u64) -> Self {
        Self(v as u128)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.0)
    }
}

/// Decimal rendering; this is the chunk-naming surface for the chunk store.
impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_mod() {
        let (q, r) = Id::new(100).div_mod(7);
        assert_eq!(q, Id::new(14));
        assert_eq!(r, Id::new(2));
    }

    #[test]
    fn test_div_mod_wide() {
        // Quotient wider than u64 survives the division.
        let big = Id::new(u64::MAX) << 8;
        let (q, r) = big.div_mod(2);
        assert_eq!(q, Id::new(u64::MAX) << 7);
        assert_eq!(r, Id::zero());
    }

    #[test]
    fn test_shift() {
        assert_eq!(Id::new(1) << 10, Id::new(1024));
        assert_eq!(Id::new(3) << 2, Id::new(12));
    }

    #[test]
    fn test_as_simple() {
        assert_eq!(Id::new(u64::MAX).as_simple(), u64::MAX);
        assert_eq!((Id::new(1) << 63).as_simple(), 1u64 << 63);
    }

    #[test]
    #[should_panic(expected = "exceeds 64 bits")]
    fn test_as_simple_overflow() {
        let _ = (Id::new(1) << 64).as_simple();
    }

    #[test]
    #[should_panic(expected = "underflow")]
    fn test_sub_underflow() {
        let _ = Id::new(1) - Id::new(2);
    }

    #[test]
    fn test_ordering() {
        assert!(Id::new(1) < Id::new(2));
        assert!(Id::new(1) << 64 > Id::new(u64::MAX));
    }

    #[test]
    fn test_display_decimal() {
        assert_eq!((Id::new(1) << 64).to_string(), "18446744073709551616");
        assert_eq!(Id::new(2396745).to_string(), "2396745");
    }
}
