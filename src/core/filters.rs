use crate::models::domain::eq_ignore_case;
use crate::models::{Accommodation, AccommodationType, Location, SearchCriteria};
use super::distance::is_within_radius;

/// Check the rating floor (inclusive)
#[inline]
pub fn matches_min_rating(accommodation: &Accommodation, min_rating: Option<f64>) -> bool {
    min_rating.map_or(true, |min| accommodation.rating >= min)
}

/// Exact, case-insensitive city match
#[inline]
pub fn matches_city(accommodation: &Accommodation, city: Option<&str>) -> bool {
    city.map_or(true, |city| eq_ignore_case(&accommodation.address.city, city.trim()))
}

/// Radius check around a resolved center.
///
/// Without both a center and a radius no geo constraint applies.
#[inline]
pub fn matches_distance(
    accommodation: &Accommodation,
    center: Option<&Location>,
    max_distance_km: Option<f64>,
) -> bool {
    match (center, max_distance_km) {
        (Some(center), Some(radius)) => is_within_radius(center, &accommodation.position, radius),
        _ => true,
    }
}

/// Every required tag must be present; extra amenities never disqualify
#[inline]
pub fn matches_amenities(accommodation: &Accommodation, required: &[String]) -> bool {
    required.iter().all(|tag| accommodation.has_amenity(tag))
}

#[inline]
pub fn matches_max_price(accommodation: &Accommodation, max_price: Option<f64>) -> bool {
    max_price.map_or(true, |max| accommodation.price_per_night <= max)
}

#[inline]
pub fn matches_type(accommodation: &Accommodation, kind: Option<AccommodationType>) -> bool {
    kind.map_or(true, |kind| accommodation.kind == kind)
}

/// Check an accommodation against every supplied predicate (logical AND)
#[inline]
pub fn matches_criteria(accommodation: &Accommodation, criteria: &SearchCriteria) -> bool {
    matches_min_rating(accommodation, criteria.min_rating)
        && matches_city(accommodation, criteria.city.as_deref())
        && matches_distance(accommodation, criteria.center.as_ref(), criteria.max_distance_km)
        && matches_amenities(accommodation, &criteria.required_amenities)
        && matches_max_price(accommodation, criteria.max_price_per_night)
        && matches_type(accommodation, criteria.kind)
}

/// Stable selection of the catalog entries that satisfy `criteria`.
///
/// Surviving records keep their catalog order.
pub fn search(catalog: &[Accommodation], criteria: &SearchCriteria) -> Vec<Accommodation> {
    catalog
        .iter()
        .filter(|accommodation| matches_criteria(accommodation, criteria))
        .cloned()
        .collect()
}
