//! Distance ranking for clinic and doctor recommendations.

use crate::{Clinic, User};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// How many clinics are shown when no location is known
pub const RATING_FALLBACK_LIMIT: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance in meters (haversine)
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

/// "850 m" under a kilometer, "3.2 km" above
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as i64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// A clinic with its distance from the user, when known
#[derive(Debug, Clone, PartialEq)]
pub struct RankedClinic {
    pub clinic: Clinic,
    pub distance_m: Option<f64>,
}

impl RankedClinic {
    pub fn distance_label(&self) -> Option<String> {
        self.distance_m.map(format_distance)
    }
}

fn by_rating_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Order clinics for the recommendation list.
///
/// With an origin every clinic is returned, nearest first. Without one the
/// best rated [`RATING_FALLBACK_LIMIT`] are returned.
pub fn rank_clinics(clinics: Vec<Clinic>, origin: Option<GeoPoint>) -> Vec<RankedClinic> {
    match origin {
        Some(origin) => {
            let mut ranked: Vec<RankedClinic> = clinics
                .into_iter()
                .map(|clinic| {
                    let here = GeoPoint::new(clinic.latitude, clinic.longitude);
                    RankedClinic {
                        distance_m: Some(origin.distance_m(&here)),
                        clinic,
                    }
                })
                .collect();
            ranked.sort_by(|a, b| {
                a.distance_m
                    .partial_cmp(&b.distance_m)
                    .unwrap_or(Ordering::Equal)
            });
            ranked
        }
        None => {
            let mut clinics = clinics;
            clinics.sort_by(|a, b| by_rating_desc(a.rating, b.rating));
            clinics
                .into_iter()
                .take(RATING_FALLBACK_LIMIT)
                .map(|clinic| RankedClinic { clinic, distance_m: None })
                .collect()
        }
    }
}

/// Best rated doctors, optionally above a rating floor and capped.
/// Doctors without a rating count as 0.
pub fn top_doctors(doctors: Vec<User>, min_rating: Option<f64>, limit: Option<usize>) -> Vec<User> {
    let mut doctors: Vec<User> = doctors
        .into_iter()
        .filter(|d| min_rating.is_none_or(|floor| d.rating.unwrap_or(0.0) >= floor))
        .collect();
    doctors.sort_by(|a, b| by_rating_desc(a.rating.unwrap_or(0.0), b.rating.unwrap_or(0.0)));
    if let Some(limit) = limit {
        doctors.truncate(limit);
    }
    doctors
}
