//! Traveller and influencer generation.

use fake::{
    Fake,
    faker::{address::en::CountryName, name::en::Name},
};
use rand::Rng;
use rand_distr::{Distribution, LogNormal};
use shakadb::models::{NewInfluencer, NewTraveller};

/// Configuration for traveller generation.
#[derive(Debug, Clone)]
pub struct TravellerGenConfig {
    /// Probability that a home country is filled in.
    pub home_country_fill_rate: f64,
    /// Mail domains picked from when building addresses.
    pub email_domains: Vec<String>,
}

impl Default for TravellerGenConfig {
    fn default() -> Self {
        Self {
            home_country_fill_rate: 0.8,
            email_domains: ["gmail.com", "outlook.com", "yahoo.com", "proton.me"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Generates travellers with plausible names and addresses.
pub struct TravellerGenerator {
    config: TravellerGenConfig,
}

impl TravellerGenerator {
    pub fn new() -> Self {
        Self {
            config: TravellerGenConfig::default(),
        }
    }

    pub fn with_config(config: TravellerGenConfig) -> Self {
        Self { config }
    }

    pub fn generate(&self, rng: &mut impl Rng) -> NewTraveller {
        let name: String = Name().fake_with_rng(rng);
        let email = self.generate_email(&name, rng);
        let home_country = if rng.r#gen::<f64>() < self.config.home_country_fill_rate {
            Some(CountryName().fake_with_rng(rng))
        } else {
            None
        };

        NewTraveller {
            name,
            email,
            home_country,
        }
    }

    pub fn generate_batch(&self, count: usize, rng: &mut impl Rng) -> Vec<NewTraveller> {
        (0..count).map(|_| self.generate(rng)).collect()
    }

    fn generate_email(&self, name: &str, rng: &mut impl Rng) -> String {
        let suffix: u32 = rng.gen_range(1..9999);
        let domain = match self.config.email_domains.len() {
            0 => "example.com",
            n => self.config.email_domains[rng.gen_range(0..n)].as_str(),
        };
        format!("{}{suffix}@{domain}", slug(name, "."))
    }
}

impl Default for TravellerGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates influencers with a log-normal follower count.
pub struct InfluencerGenerator {
    followers: LogNormal<f64>,
    max_followers: i32,
}

impl InfluencerGenerator {
    /// Median around 8k followers with a long tail into the millions.
    pub fn new() -> Self {
        Self {
            followers: LogNormal::new(9.0, 1.5).unwrap(),
            max_followers: 50_000_000,
        }
    }

    pub fn generate(&self, rng: &mut impl Rng) -> NewInfluencer {
        let name: String = Name().fake_with_rng(rng);
        let instagram_handle = format!("@{}{}", slug(&name, "_"), rng.gen_range(1..999));
        let follower_count = (self.followers.sample(rng) as i64).clamp(0, self.max_followers as i64);

        NewInfluencer {
            name,
            instagram_handle,
            follower_count: follower_count as i32,
        }
    }

    pub fn generate_batch(&self, count: usize, rng: &mut impl Rng) -> Vec<NewInfluencer> {
        (0..count).map(|_| self.generate(rng)).collect()
    }
}

impl Default for InfluencerGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercases `name`, drops punctuation and joins the words with `sep`.
fn slug(name: &str, sep: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generate_traveller() {
        let mut rng = rand::thread_rng();
        let traveller = TravellerGenerator::new().generate(&mut rng);

        assert!(!traveller.name.is_empty());
        assert!(traveller.email.contains('@'));
        assert!(!traveller.email.contains(' '));
    }

    #[test]
    fn test_home_country_fill_rate() {
        let generator = TravellerGenerator::with_config(TravellerGenConfig {
            home_country_fill_rate: 0.0,
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(7);
        assert!(
            generator
                .generate_batch(20, &mut rng)
                .iter()
                .all(|t| t.home_country.is_none())
        );
    }

    #[test]
    fn test_email_without_domains() {
        let generator = TravellerGenerator::with_config(TravellerGenConfig {
            email_domains: Vec::new(),
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generator.generate(&mut rng).email.ends_with("@example.com"));
    }

    #[test]
    fn test_generate_influencers() {
        let mut rng = StdRng::seed_from_u64(99);
        let influencers = InfluencerGenerator::new().generate_batch(50, &mut rng);

        assert_eq!(influencers.len(), 50);
        for influencer in &influencers {
            assert!(influencer.instagram_handle.starts_with('@'));
            assert!(influencer.follower_count >= 0);
            assert!(influencer.follower_count <= 50_000_000);
        }
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Dr. Kelly  Slater", "."), "dr.kelly.slater");
        assert_eq!(slug("Stephanie Gilmore", "_"), "stephanie_gilmore");
    }
}
