//! Place-name resolution.
//!
//! Known landmarks and cities come from a fixed gazetteer. Anything else gets a
//! synthetic coordinate inside the Rome/Lazio box, derived deterministically from
//! the place name so the same input always lands on the same point:
//!
//! 1. normalize: trim, then lower-case
//! 2. seed: 64-bit FNV-1a over the UTF-8 bytes of the normalized name
//! 3. draw two uniforms in `[0, 1)` from SplitMix64, taking the top 53 bits of each output
//! 4. `lat = 41.4 + u1 * 0.8`, `lon = 12.2 + u2 * 1.3`

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use crate::models::Location;

const BUNDLED_GAZETTEER: &str = include_str!("../../data/gazetteer.toml");

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Fallback box, roughly the Lazio region
pub const FALLBACK_MIN_LAT: f64 = 41.4;
pub const FALLBACK_LAT_SPAN: f64 = 0.8;
pub const FALLBACK_MIN_LON: f64 = 12.2;
pub const FALLBACK_LON_SPAN: f64 = 1.3;

/// Errors that can occur while loading a gazetteer
#[derive(Debug, Error)]
pub enum GazetteerError {
    #[error("Failed to read gazetteer: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse gazetteer: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid coordinates for place '{0}'")]
    InvalidCoordinates(String),
}

#[derive(Debug, Deserialize)]
struct GazetteerFile {
    places: HashMap<String, Location>,
}

/// Read-only table of known place names, keyed case-insensitively
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    places: HashMap<String, Location>,
}

impl Gazetteer {
    /// The gazetteer shipped with the crate
    pub fn bundled() -> Result<Self, GazetteerError> {
        Self::from_toml(BUNDLED_GAZETTEER)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GazetteerError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, GazetteerError> {
        let file: GazetteerFile = toml::from_str(raw)?;
        Self::from_entries(file.places)
    }

    pub fn from_entries<I, S>(entries: I) -> Result<Self, GazetteerError>
    where
        I: IntoIterator<Item = (S, Location)>,
        S: AsRef<str>,
    {
        let mut places = HashMap::new();
        for (name, location) in entries {
            let key = normalize(name.as_ref());
            if !location.is_valid() {
                return Err(GazetteerError::InvalidCoordinates(key));
            }
            places.insert(key, location);
        }
        Ok(Self { places })
    }

    pub fn lookup(&self, place: &str) -> Option<Location> {
        self.places.get(&normalize(place)).copied()
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

/// Maps free-text place names to coordinates
#[derive(Debug, Clone)]
pub struct GeoResolver {
    gazetteer: Gazetteer,
}

impl GeoResolver {
    pub fn new(gazetteer: Gazetteer) -> Self {
        Self { gazetteer }
    }

    pub fn bundled() -> Result<Self, GazetteerError> {
        Ok(Self::new(Gazetteer::bundled()?))
    }

    /// Resolve a place name to a location.
    ///
    /// Blank input is unresolved (`None`). Known names return their literal
    /// coordinates; everything else gets the deterministic fallback.
    pub fn resolve(&self, place: &str) -> Option<Location> {
        let normalized = normalize(place);
        if normalized.is_empty() {
            return None;
        }

        if let Some(location) = self.gazetteer.lookup(&normalized) {
            tracing::info!(
                event = "geocode.gazetteer_hit",
                place = %place.trim(),
                latitude = location.latitude,
                longitude = location.longitude,
                "Geocoded '{}' from gazetteer",
                place.trim()
            );
            return Some(location);
        }

        let location = fallback_location(&normalized);
        tracing::warn!(
            event = "geocode.fallback_used",
            place = %place.trim(),
            latitude = location.latitude,
            longitude = location.longitude,
            "Location '{}' not in gazetteer, using synthetic coordinates",
            place.trim()
        );
        Some(location)
    }
}

#[inline]
fn normalize(place: &str) -> String {
    place.trim().to_lowercase()
}

/// 64-bit FNV-1a
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// SplitMix64 generator
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform value in `[0, 1)` with 53 bits of precision
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

/// Synthetic coordinate for a normalized place name, always inside the fallback box
pub fn fallback_location(normalized: &str) -> Location {
    let mut rng = SplitMix64::new(fnv1a_64(normalized.as_bytes()));
    let latitude = FALLBACK_MIN_LAT + rng.next_f64() * FALLBACK_LAT_SPAN;
    let longitude = FALLBACK_MIN_LON + rng.next_f64() * FALLBACK_LON_SPAN;
    Location::new(latitude, longitude)
}
