//! # Geographic Coordinates
//!
//! A validated latitude/longitude pair. Coordinates are optional on a
//! provenance event, but when present they must be complete and within
//! range; a half-populated pair is a caller defect, not a degraded
//! reading.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A WGS 84 coordinate pair captured at event time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, `-90.0..=90.0`.
    pub lat: f64,
    /// Longitude in degrees, `-180.0..=180.0`.
    pub lng: f64,
}

impl GeoPoint {
    /// Create a coordinate pair, validating both components.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::LatitudeOutOfRange`] or
    /// [`ValidationError::LongitudeOutOfRange`] for out-of-range (or NaN)
    /// components.
    pub fn new(lat: f64, lng: f64) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(ValidationError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Assemble an optional coordinate pair from independently optional
    /// components, as they arrive at the ingest boundary.
    ///
    /// Both absent is a valid "no location fix" reading; both present is
    /// validated via [`GeoPoint::new`]; one present is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PartialCoordinates`] when exactly one
    /// component is present, or the range errors from [`GeoPoint::new`].
    pub fn from_parts(
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Result<Option<Self>, ValidationError> {
        match (lat, lng) {
            (None, None) => Ok(None),
            (Some(lat), Some(lng)) => Ok(Some(Self::new(lat, lng)?)),
            _ => Err(ValidationError::PartialCoordinates),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_point() {
        let p = GeoPoint::new(33.6844, 73.0479).unwrap();
        assert_eq!(p.lat, 33.6844);
        assert_eq!(p.lng, 73.0479);
    }

    #[test]
    fn boundary_values_accepted() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn latitude_out_of_range_rejected() {
        assert_eq!(
            GeoPoint::new(90.001, 0.0),
            Err(ValidationError::LatitudeOutOfRange(90.001))
        );
    }

    #[test]
    fn longitude_out_of_range_rejected() {
        assert_eq!(
            GeoPoint::new(0.0, -180.5),
            Err(ValidationError::LongitudeOutOfRange(-180.5))
        );
    }

    #[test]
    fn nan_rejected() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn from_parts_both_absent() {
        assert_eq!(GeoPoint::from_parts(None, None), Ok(None));
    }

    #[test]
    fn from_parts_both_present() {
        let p = GeoPoint::from_parts(Some(1.0), Some(2.0)).unwrap().unwrap();
        assert_eq!(p.lat, 1.0);
        assert_eq!(p.lng, 2.0);
    }

    #[test]
    fn from_parts_partial_rejected() {
        assert_eq!(
            GeoPoint::from_parts(Some(1.0), None),
            Err(ValidationError::PartialCoordinates)
        );
        assert_eq!(
            GeoPoint::from_parts(None, Some(2.0)),
            Err(ValidationError::PartialCoordinates)
        );
    }
}
