//! Configuration types for seeding and cleanup.

use serde::{Deserialize, Serialize};

use crate::db::SeedError;

/// Geographic bounding box defined by southwest and northeast corners.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum latitude (south)
    pub min_lat: f64,
    /// Minimum longitude (west)
    pub min_lon: f64,
    /// Maximum latitude (north)
    pub max_lat: f64,
    /// Maximum longitude (east)
    pub max_lon: f64,
}

impl BoundingBox {
    pub const fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Returns a random point within the bounding box.
    pub fn random_point(&self, rng: &mut impl rand::Rng) -> (f64, f64) {
        let lat = rng.gen_range(self.min_lat..self.max_lat);
        let lon = rng.gen_range(self.min_lon..self.max_lon);
        (lat, lon)
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat)
            && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

/// Pre-defined coastal regions for surf spot coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Region;

impl Region {
    /// Southern California, Santa Barbara to San Diego.
    pub const SOCAL: BoundingBox = BoundingBox::new(32.5, -120.5, 34.5, -117.1);

    /// Portuguese Atlantic coast, Peniche to Ericeira.
    pub const PORTUGAL: BoundingBox = BoundingBox::new(38.6, -9.5, 39.4, -9.0);

    /// Bali, Indonesia.
    pub const BALI: BoundingBox = BoundingBox::new(-8.85, 114.9, -8.35, 115.7);

    pub const ALL: [BoundingBox; 3] = [Self::SOCAL, Self::PORTUGAL, Self::BALI];
}

/// Configuration for a seeding run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Skip the cleanup phase. When data is already present the heavy
    /// surf spot fixtures are skipped as well.
    pub skip_cleanup: bool,

    /// Follow the paginated cleanup with an unbounded delete of every table.
    pub final_sweep: bool,

    /// Minimum number of travellers after seeding.
    pub traveller_target: usize,

    /// Minimum number of influencers after seeding.
    pub influencer_target: usize,

    /// Surf spots created per run, each with one photo and three thumbnails.
    pub surf_spot_count: usize,

    /// Influencers linked per spot (inclusive range).
    pub influencers_per_spot: (usize, usize),

    /// Travellers linked per spot (inclusive range).
    pub travellers_per_spot: (usize, usize),

    /// Break types linked per spot (inclusive range).
    pub break_types_per_spot: (usize, usize),

    /// Seed for the random generator; `None` draws from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            skip_cleanup: false,
            final_sweep: false,
            traveller_target: 10,
            influencer_target: 5,
            surf_spot_count: 15,
            influencers_per_spot: (1, 3),
            travellers_per_spot: (1, 3),
            break_types_per_spot: (1, 2),
            rng_seed: None,
        }
    }
}

impl SeedConfig {
    /// Reads overrides from the process environment.
    ///
    /// Recognised variables: `SKIP_CLEANUP`, `SEED_FINAL_SWEEP`, `SEED_SURF_SPOTS`,
    /// `SEED_TRAVELLERS`, `SEED_INFLUENCERS`, `SEED_RNG_SEED`.
    pub fn from_env() -> Result<Self, SeedError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SeedConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SeedError> {
        let mut config = Self::default();

        if let Some(v) = lookup("SKIP_CLEANUP") {
            config.skip_cleanup = parse_flag(&v);
        }
        if let Some(v) = lookup("SEED_FINAL_SWEEP") {
            config.final_sweep = parse_flag(&v);
        }
        if let Some(v) = lookup("SEED_SURF_SPOTS") {
            config.surf_spot_count = parse_number("SEED_SURF_SPOTS", &v)?;
        }
        if let Some(v) = lookup("SEED_TRAVELLERS") {
            config.traveller_target = parse_number("SEED_TRAVELLERS", &v)?;
        }
        if let Some(v) = lookup("SEED_INFLUENCERS") {
            config.influencer_target = parse_number("SEED_INFLUENCERS", &v)?;
        }
        if let Some(v) = lookup("SEED_RNG_SEED") {
            config.rng_seed = Some(parse_number("SEED_RNG_SEED", &v)?);
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SeedError> {
    value
        .trim()
        .parse()
        .map_err(|_| {
            SeedError::Config(format!("{key} must be a non-negative integer, got {value:?}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_fixture_targets() {
        let config = SeedConfig::from_lookup(lookup(&[])).unwrap();
        assert!(!config.skip_cleanup);
        assert!(!config.final_sweep);
        assert_eq!(config.traveller_target, 10);
        assert_eq!(config.influencer_target, 5);
        assert_eq!(config.surf_spot_count, 15);
    }

    #[test]
    fn skip_cleanup_accepts_common_truthy_values() {
        for v in ["1", "true", "TRUE", "yes", "on"] {
            let config = SeedConfig::from_lookup(lookup(&[("SKIP_CLEANUP", v)])).unwrap();
            assert!(config.skip_cleanup, "{v} should enable skip_cleanup");
        }
        let config = SeedConfig::from_lookup(lookup(&[("SKIP_CLEANUP", "false")])).unwrap();
        assert!(!config.skip_cleanup);
    }

    #[test]
    fn numeric_overrides_are_validated() {
        let config = SeedConfig::from_lookup(lookup(&[
            ("SEED_SURF_SPOTS", "3"),
            ("SEED_RNG_SEED", "42"),
        ]))
        .unwrap();
        assert_eq!(config.surf_spot_count, 3);
        assert_eq!(config.rng_seed, Some(42));

        let err = SeedConfig::from_lookup(lookup(&[("SEED_TRAVELLERS", "lots")])).unwrap_err();
        assert!(err.to_string().contains("SEED_TRAVELLERS"));
    }

    #[test]
    fn region_points_stay_inside() {
        let mut rng = rand::thread_rng();
        for region in Region::ALL {
            let (lat, lon) = region.random_point(&mut rng);
            assert!(region.contains(lat, lon));
        }
    }
}
