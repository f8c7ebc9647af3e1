//! geo.rs — Spherical geodesy in nautical miles
//!
//! Great-circle bearing, haversine range and the forward problem on a
//! spherical earth. All public angles are degrees; radians stay internal.

/// Mean earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// A WGS-84 position, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Initial true bearing from `p1` to `p2`, normalised to [0, 360).
pub fn bearing(p1: Point, p2: Point) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let d_lon = (p2.lon - p1.lon).to_radians();
    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Haversine distance from `p1` to `p2` in nautical miles.
pub fn distance(p1: Point, p2: Point) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let d_lat = (p2.lat - p1.lat).to_radians();
    let d_lon = (p2.lon - p1.lon).to_radians();
    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_NM * c
}

/// Point reached from `p` on true bearing `bearing_deg` after `distance_nm`.
/// Latitude lands in [−90, 90]; longitude is renormalised to [−180, 180).
pub fn destination(p: Point, bearing_deg: f64, distance_nm: f64) -> Point {
    if distance_nm < 1e-9 {
        return p;
    }
    let lat1 = p.lat.to_radians();
    let lon1 = p.lon.to_radians();
    let brng = bearing_deg.to_radians();
    let d_r = distance_nm / EARTH_RADIUS_NM;

    let lat2 = (lat1.sin() * d_r.cos() + lat1.cos() * d_r.sin() * brng.cos()).asin();
    let lon2 = lon1
        + (brng.sin() * d_r.sin() * lat1.cos()).atan2(d_r.cos() - lat1.sin() * lat2.sin());

    let mut lon_deg = lon2.to_degrees();
    if lon_deg >= 180.0 {
        lon_deg -= 360.0;
    } else if lon_deg < -180.0 {
        lon_deg += 360.0;
    }
    Point::new(lat2.to_degrees(), lon_deg)
}

#[cfg(test)]
mod test {
    use super::*;

    fn close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() < eps, "{a} !≈ {b} (eps {eps})");
    }

    #[test]
    fn bearing_due_north() {
        let b = bearing(Point::new(35.10, 129.04), Point::new(35.15, 129.04));
        close(b, 0.0, 1e-9);
    }

    #[test]
    fn bearing_due_east_and_back() {
        let p1 = Point::new(35.10, 129.04);
        let p2 = Point::new(35.10, 129.06);
        close(bearing(p1, p2), 90.0, 0.1);
        close(bearing(p2, p1), 270.0, 0.1);
    }

    #[test]
    fn distance_three_nm_leg() {
        // 0.05° of latitude = 3 NM on the spherical model
        let d = distance(Point::new(35.100, 129.040), Point::new(35.150, 129.040));
        close(d, 3.0, 0.01);
    }

    #[test]
    fn destination_round_trip() {
        let start = Point::new(35.10, 129.04);
        let moved = destination(start, 45.0, 2.5);
        close(distance(start, moved), 2.5, 1e-6);
        close(bearing(start, moved), 45.0, 0.05);
    }

    #[test]
    fn destination_zero_distance_is_identity() {
        let p = Point::new(-12.5, 45.25);
        assert_eq!(destination(p, 123.0, 0.0), p);
    }

    #[test]
    fn destination_wraps_longitude() {
        let p = destination(Point::new(0.0, 179.99), 90.0, 5.0);
        assert!(p.lon < 180.0 && p.lon >= -180.0);
    }
}
