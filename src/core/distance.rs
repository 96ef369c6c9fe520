use crate::models::Location;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two locations in kilometers
#[inline]
pub fn distance_km(from: &Location, to: &Location) -> f64 {
    haversine_distance(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Check if `point` lies within `radius_km` of `center` (inclusive)
#[inline]
pub fn is_within_radius(center: &Location, point: &Location, radius_km: f64) -> bool {
    distance_km(center, point) <= radius_km
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Distance from London to Paris (approximately 344 km)
        let london_lat = 51.5074;
        let london_lon = -0.1278;
        let paris_lat = 48.8566;
        let paris_lon = 2.3522;

        let distance = haversine_distance(london_lat, london_lon, paris_lat, paris_lon);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_identity_and_symmetry() {
        let colosseum = Location::new(41.8902, 12.4922);
        let termini = Location::new(41.9028, 12.4964);

        assert_eq!(distance_km(&colosseum, &colosseum), 0.0);

        let there = distance_km(&colosseum, &termini);
        let back = distance_km(&termini, &colosseum);
        assert!((there - back).abs() <= 1e-9 * there.max(1.0));
    }

    #[test]
    fn test_within_radius() {
        let colosseum = Location::new(41.8902, 12.4922);
        let termini = Location::new(41.9028, 12.4964);

        // Termini is roughly 1.4 km north of the Colosseum
        assert!(is_within_radius(&colosseum, &termini, 2.0));
        assert!(!is_within_radius(&colosseum, &termini, 1.0));
        assert!(is_within_radius(&colosseum, &colosseum, 0.0));
    }
}
