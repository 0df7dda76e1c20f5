//! Surf spot generation with a cached geocode payload.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use fake::{
    Fake,
    faker::address::en::{BuildingNumber, CityName, CountryName, StreetName},
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shakadb::models::NewSurfSpot;
use time::{Date, Duration, OffsetDateTime};

use crate::config::{BoundingBox, Region};

/// Configuration for surf spot generation.
#[derive(Debug, Clone)]
pub struct SurfSpotGenConfig {
    /// Regions coordinates are drawn from.
    pub regions: Vec<BoundingBox>,
    /// Inclusive difficulty range.
    pub difficulty: (i32, i32),
    /// Days before today the peak season may start.
    pub season_start_window_days: i64,
    /// Inclusive season length range in days.
    pub season_length_days: (i64, i64),
    /// Probability that a forecast link is filled in.
    pub forecast_link_rate: f64,
}

impl Default for SurfSpotGenConfig {
    fn default() -> Self {
        Self {
            regions: Region::ALL.to_vec(),
            difficulty: (1, 5),
            season_start_window_days: 180,
            season_length_days: (30, 150),
            forecast_link_rate: 0.75,
        }
    }
}

/// Decoded form of [`NewSurfSpot::geocode_raw`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCache {
    /// Query that was geocoded.
    pub i: String,
    /// Geocoder output.
    pub o: GeocodeResult,
    /// Cache time in unix milliseconds.
    pub e: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub status: String,
    pub formatted_address: String,
    pub lat: f64,
    pub lng: f64,
}

impl GeocodeCache {
    /// Base64 of the JSON document.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }

    /// Returns `None` for anything that is not base64-wrapped cache JSON.
    pub fn decode(raw: &str) -> Option<Self> {
        let bytes = STANDARD.decode(raw).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// Generates surf spots spread over the configured regions.
pub struct SurfSpotGenerator {
    config: SurfSpotGenConfig,
}

impl SurfSpotGenerator {
    pub fn new() -> Self {
        Self {
            config: SurfSpotGenConfig::default(),
        }
    }

    pub fn with_config(config: SurfSpotGenConfig) -> Self {
        Self { config }
    }

    pub fn generate(&self, rng: &mut impl Rng) -> NewSurfSpot {
        let destination: String = CityName().fake_with_rng(rng);
        let building: String = BuildingNumber().fake_with_rng(rng);
        let street: String = StreetName().fake_with_rng(rng);
        let address = format!("{building} {street}");
        let state_country: String = CountryName().fake_with_rng(rng);

        let (min, max) = self.config.difficulty;
        let difficulty_level = rng.gen_range(min..=max.max(min));

        let (peak_season_begin, peak_season_end) = self.season(OffsetDateTime::now_utc().date(), rng);

        let magic_seaweed_link = if rng.r#gen::<f64>() < self.config.forecast_link_rate {
            Some(format!(
                "https://magicseaweed.com/{}-Surf-Report/{}/",
                destination.replace(' ', "-"),
                rng.gen_range(100..10_000)
            ))
        } else {
            None
        };

        let geocode_raw = self.geocode(&destination, &address, &state_country, rng);

        NewSurfSpot {
            destination,
            address,
            state_country,
            difficulty_level,
            peak_season_begin,
            peak_season_end,
            magic_seaweed_link,
            geocode_raw,
        }
    }

    pub fn generate_batch(&self, count: usize, rng: &mut impl Rng) -> Vec<NewSurfSpot> {
        (0..count).map(|_| self.generate(rng)).collect()
    }

    /// Season starting within the window before `today`; end never precedes begin.
    fn season(&self, today: Date, rng: &mut impl Rng) -> (Date, Date) {
        let back = rng.gen_range(0..=self.config.season_start_window_days.max(0));
        let (min_len, max_len) = self.config.season_length_days;
        let length = rng.gen_range(min_len.max(0)..=max_len.max(min_len).max(0));

        let begin = today.checked_sub(Duration::days(back)).unwrap_or(today);
        let end = begin.checked_add(Duration::days(length)).unwrap_or(begin);
        (begin, end)
    }

    fn geocode(
        &self,
        destination: &str,
        address: &str,
        state_country: &str,
        rng: &mut impl Rng,
    ) -> Option<String> {
        let (lat, lng) = match self.config.regions.len() {
            0 => return None,
            n => self.config.regions[rng.gen_range(0..n)].random_point(rng),
        };

        let cache = GeocodeCache {
            i: format!("{destination}, {state_country}"),
            o: GeocodeResult {
                status: "OK".to_string(),
                formatted_address: format!("{address}, {destination}, {state_country}"),
                lat,
                lng,
            },
            e: (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64,
        };
        cache.encode().ok()
    }
}

impl Default for SurfSpotGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generate_surf_spot() {
        let mut rng = StdRng::seed_from_u64(3);
        let spot = SurfSpotGenerator::new().generate(&mut rng);

        assert!(!spot.destination.is_empty());
        assert!(!spot.address.is_empty());
        assert!((1..=5).contains(&spot.difficulty_level));
        assert!(spot.peak_season_end >= spot.peak_season_begin);
    }

    #[test]
    fn test_geocode_round_trips_into_region() {
        let mut rng = StdRng::seed_from_u64(11);
        let generator = SurfSpotGenerator::with_config(SurfSpotGenConfig {
            regions: vec![Region::BALI],
            ..Default::default()
        });
        let spot = generator.generate(&mut rng);

        let raw = spot.geocode_raw.expect("geocode payload");
        let cache = GeocodeCache::decode(&raw).expect("valid payload");
        assert_eq!(cache.o.status, "OK");
        assert!(cache.i.starts_with(&spot.destination));
        assert!(cache.o.formatted_address.contains(&spot.address));
        assert!(Region::BALI.contains(cache.o.lat, cache.o.lng));
    }

    #[test]
    fn test_geocode_json_keys() {
        let cache = GeocodeCache {
            i: "Uluwatu, Indonesia".into(),
            o: GeocodeResult {
                status: "OK".into(),
                formatted_address: "Jl. Labuansait, Uluwatu, Indonesia".into(),
                lat: -8.81,
                lng: 115.09,
            },
            e: 1_700_000_000_000,
        };
        let json: serde_json::Value =
            serde_json::from_slice(&STANDARD.decode(cache.encode().unwrap()).unwrap()).unwrap();
        assert_eq!(json["o"]["formattedAddress"], "Jl. Labuansait, Uluwatu, Indonesia");
        assert_eq!(json["e"], 1_700_000_000_000i64);
    }

    #[test]
    fn test_no_regions_means_no_geocode() {
        let mut rng = StdRng::seed_from_u64(5);
        let generator = SurfSpotGenerator::with_config(SurfSpotGenConfig {
            regions: Vec::new(),
            ..Default::default()
        });
        assert!(generator.generate(&mut rng).geocode_raw.is_none());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(GeocodeCache::decode("not base64!").is_none());
        assert!(GeocodeCache::decode(&STANDARD.encode("{}")).is_none());
    }

    #[test]
    fn test_forecast_link_rate() {
        let mut rng = StdRng::seed_from_u64(8);
        let always = SurfSpotGenerator::with_config(SurfSpotGenConfig {
            forecast_link_rate: 1.0,
            ..Default::default()
        });
        for spot in always.generate_batch(10, &mut rng) {
            let link = spot.magic_seaweed_link.unwrap();
            assert!(link.starts_with("https://magicseaweed.com/"));
        }
    }
}
