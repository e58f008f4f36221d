//! Great-circle geometry

use serde::Serialize;

/// Mean Earth radius in metres
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine distance in metres
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(*self, *other)
    }
}

/// Haversine great-circle distance in metres
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let delta_phi = (b.lat - a.lat).to_radians();
    let delta_lambda = (b.lon - a.lon).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Running mean of points
#[derive(Debug, Clone, Copy, Default)]
pub struct Centroid {
    lat_sum: f64,
    lon_sum: f64,
    count: usize,
}

impl Centroid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Centroid of `points`
    pub fn of<I: IntoIterator<Item = GeoPoint>>(points: I) -> Self {
        let mut centroid = Self::new();
        for p in points {
            centroid.add(p);
        }
        centroid
    }

    pub fn add(&mut self, point: GeoPoint) {
        self.lat_sum += point.lat;
        self.lon_sum += point.lon;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn point(&self) -> Option<GeoPoint> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(GeoPoint::new(self.lat_sum / n, self.lon_sum / n))
    }
}
