//! Reprojection requests and the filter seam.

use canopy_core::Point;
use serde::{Deserialize, Serialize};

/// A coordinate reprojection request.
///
/// `in_srs` may be empty, meaning "use whatever SRS the driver inferred
/// from the source". An empty `in_srs` with no driver-inferred SRS makes
/// the request unresolvable and fails the operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reprojection {
    in_srs: String,
    out_srs: String,
}

impl Reprojection {
    pub fn new(in_srs: impl Into<String>, out_srs: impl Into<String>) -> Self {
        Self {
            in_srs: in_srs.into(),
            out_srs: out_srs.into(),
        }
    }

    #[inline]
    pub fn in_srs(&self) -> &str {
        &self.in_srs
    }

    #[inline]
    pub fn out_srs(&self) -> &str {
        &self.out_srs
    }

    /// Resolve against a driver-inferred SRS: a non-empty inferred SRS wins
    /// over the requested input, the requested output always stands.
    pub fn found_or_default(&self, found: &str) -> Reprojection {
        if found.is_empty() {
            self.clone()
        } else {
            Reprojection::new(found, self.out_srs.clone())
        }
    }
}

/// A reprojection stage interposed between the driver and the point table.
///
/// Concrete coordinate math lives behind this seam; the built-in stage
/// resolves SRS identity only, and external filter implementations supply
/// actual transforms through the registry.
pub trait ReprojectionFilter: Send {
    /// Resolved source SRS.
    fn in_srs(&self) -> &str;

    /// Target SRS.
    fn out_srs(&self) -> &str;

    /// Transform a batch of points in place.
    fn filter(&self, points: &mut [Point]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_srs_wins() {
        let given = Reprojection::new("EPSG:4326", "EPSG:3857");
        let resolved = given.found_or_default("EPSG:32633");
        assert_eq!(resolved.in_srs(), "EPSG:32633");
        assert_eq!(resolved.out_srs(), "EPSG:3857");
    }

    #[test]
    fn test_empty_found_keeps_default() {
        let given = Reprojection::new("EPSG:4326", "EPSG:3857");
        assert_eq!(given.found_or_default(""), given);
    }
}
