use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True when both components are finite and inside the valid lat/lon ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Kinds of lodging offered in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccommodationType {
    Hotel,
    BedAndBreakfast,
    Hostel,
    Apartment,
    Resort,
    Guesthouse,
    Motel,
    Villa,
    Boutique,
}

impl AccommodationType {
    pub const ALL: [AccommodationType; 9] = [
        AccommodationType::Hotel,
        AccommodationType::BedAndBreakfast,
        AccommodationType::Hostel,
        AccommodationType::Apartment,
        AccommodationType::Resort,
        AccommodationType::Guesthouse,
        AccommodationType::Motel,
        AccommodationType::Villa,
        AccommodationType::Boutique,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccommodationType::Hotel => "hotel",
            AccommodationType::BedAndBreakfast => "bed-and-breakfast",
            AccommodationType::Hostel => "hostel",
            AccommodationType::Apartment => "apartment",
            AccommodationType::Resort => "resort",
            AccommodationType::Guesthouse => "guesthouse",
            AccommodationType::Motel => "motel",
            AccommodationType::Villa => "villa",
            AccommodationType::Boutique => "boutique",
        }
    }
}

impl fmt::Display for AccommodationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for type names outside the known enumeration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown accommodation type: {0}")]
pub struct UnknownAccommodationType(pub String);

impl FromStr for AccommodationType {
    type Err = UnknownAccommodationType;

    /// Case-insensitive parse of the kebab-case name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownAccommodationType(s.to_string()))
    }
}

/// Postal address of an accommodation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub region: String,
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    pub country: String,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} {}, {}, {}",
            self.street, self.postal_code, self.city, self.region, self.country
        )
    }
}

/// A lodging record from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accommodation {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccommodationType,
    pub rating: f64,
    #[serde(deserialize_with = "normalize_amenities")]
    pub amenities: Vec<String>,
    pub position: Location,
    pub address: Address,
    #[serde(rename = "pricePerNight")]
    pub price_per_night: f64,
    pub description: String,
}

impl Accommodation {
    /// Case-insensitive membership test on the amenity tags
    pub fn has_amenity(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.amenities.iter().any(|a| eq_ignore_case(a, tag))
    }
}

/// Unicode case-insensitive equality, without allocating
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Lower-case, trim and dedupe amenity tags, keeping first-seen order
fn normalize_amenities<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<String> = Vec::deserialize(deserializer)?;
    Ok(normalize_tags(raw))
}

pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Structured search constraints; every `None` field imposes no constraint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub min_rating: Option<f64>,
    pub city: Option<String>,
    pub center: Option<Location>,
    pub max_distance_km: Option<f64>,
    pub required_amenities: Vec<String>,
    pub max_price_per_night: Option<f64>,
    pub kind: Option<AccommodationType>,
}

/// Accommodation paired with its relevance score, only alive during a ranking call
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub accommodation: Accommodation,
    pub score: u8,
}
