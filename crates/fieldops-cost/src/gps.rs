//! Check-in location verification against the job site.

use fieldops_schedule::model::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::config::GpsThresholds;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GpsStatus {
    Verified,
    Warning,
    OutOfRange,
    /// Site or check-in position missing.
    Unverified,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsVerification {
    pub status: GpsStatus,
    pub distance_m: Option<f64>,
}

/// Great-circle distance in metres.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

pub fn classify_distance(distance_m: Option<f64>, thresholds: &GpsThresholds) -> GpsStatus {
    match distance_m {
        None => GpsStatus::Unverified,
        Some(d) if d <= thresholds.verified_m => GpsStatus::Verified,
        Some(d) if d <= thresholds.warning_m => GpsStatus::Warning,
        Some(_) => GpsStatus::OutOfRange,
    }
}

pub fn verify_check_in(
    site: Option<GeoPoint>,
    check_in: Option<GeoPoint>,
    thresholds: &GpsThresholds,
) -> GpsVerification {
    let distance_m = match (site, check_in) {
        (Some(site), Some(at)) if site.is_valid() && at.is_valid() => Some(haversine_m(site, at)),
        _ => None,
    };
    GpsVerification {
        status: classify_distance(distance_m, thresholds),
        distance_m,
    }
}
