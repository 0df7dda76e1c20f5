//! Random many-to-many links between surf spots and their neighbours.

use rand::Rng;
use rand::seq::SliceRandom;
use shakadb::models::{SurfSpotInfluencer, SurfSpotSurfBreakType, SurfSpotTraveller};

/// How many partners each spot gets, as inclusive ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkGenConfig {
    pub influencers_per_spot: (usize, usize),
    pub travellers_per_spot: (usize, usize),
    pub break_types_per_spot: (usize, usize),
}

impl Default for LinkGenConfig {
    fn default() -> Self {
        Self {
            influencers_per_spot: (1, 3),
            travellers_per_spot: (1, 3),
            break_types_per_spot: (1, 2),
        }
    }
}

/// Pivot rows for one batch of spots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedLinks {
    pub influencers: Vec<SurfSpotInfluencer>,
    pub travellers: Vec<SurfSpotTraveller>,
    pub break_types: Vec<SurfSpotSurfBreakType>,
}

impl GeneratedLinks {
    pub fn len(&self) -> usize {
        self.influencers.len() + self.travellers.len() + self.break_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct LinkGenerator {
    config: LinkGenConfig,
}

impl LinkGenerator {
    pub fn new(config: LinkGenConfig) -> Self {
        Self { config }
    }

    /// Picks distinct partners per spot; a spot never links the same partner twice.
    ///
    /// Pools smaller than the requested count yield every member once.
    pub fn generate(
        &self,
        spot_ids: &[i32],
        influencer_ids: &[i32],
        traveller_ids: &[i32],
        break_type_ids: &[i32],
        rng: &mut impl Rng,
    ) -> GeneratedLinks {
        let mut links = GeneratedLinks::default();

        for &surf_spot_id in spot_ids {
            for influencer_id in pick(influencer_ids, self.config.influencers_per_spot, rng) {
                links.influencers.push(SurfSpotInfluencer {
                    surf_spot_id,
                    influencer_id,
                });
            }
            for traveller_id in pick(traveller_ids, self.config.travellers_per_spot, rng) {
                links.travellers.push(SurfSpotTraveller {
                    surf_spot_id,
                    traveller_id,
                });
            }
            for surf_break_type_id in pick(break_type_ids, self.config.break_types_per_spot, rng) {
                links.break_types.push(SurfSpotSurfBreakType {
                    surf_spot_id,
                    surf_break_type_id,
                });
            }
        }

        links
    }
}

impl Default for LinkGenerator {
    fn default() -> Self {
        Self::new(LinkGenConfig::default())
    }
}

fn pick(pool: &[i32], (min, max): (usize, usize), rng: &mut impl Rng) -> Vec<i32> {
    if pool.is_empty() {
        return Vec::new();
    }
    let wanted = rng.gen_range(min..=max.max(min)).min(pool.len());
    pool.choose_multiple(rng, wanted).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_counts_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(21);
        let spots: Vec<i32> = (1..=15).collect();
        let people: Vec<i32> = (100..110).collect();
        let breaks = [1, 2, 3, 4];

        let links = LinkGenerator::default().generate(&spots, &people, &people, &breaks, &mut rng);

        for spot in &spots {
            let n = links.influencers.iter().filter(|l| l.surf_spot_id == *spot).count();
            assert!((1..=3).contains(&n), "spot {spot} has {n} influencers");
            let n = links.travellers.iter().filter(|l| l.surf_spot_id == *spot).count();
            assert!((1..=3).contains(&n));
            let n = links.break_types.iter().filter(|l| l.surf_spot_id == *spot).count();
            assert!((1..=2).contains(&n));
        }
    }

    #[test]
    fn test_no_duplicate_pairs() {
        let mut rng = StdRng::seed_from_u64(4);
        let spots: Vec<i32> = (1..=50).collect();
        let links = LinkGenerator::new(LinkGenConfig {
            influencers_per_spot: (3, 3),
            ..Default::default()
        })
        .generate(&spots, &[1, 2, 3], &[1], &[1, 2], &mut rng);

        let pairs: HashSet<(i32, i32)> = links
            .influencers
            .iter()
            .map(|l| (l.surf_spot_id, l.influencer_id))
            .collect();
        assert_eq!(pairs.len(), links.influencers.len());
        assert_eq!(links.influencers.len(), 150);
        assert_eq!(links.travellers.len(), 50);
    }

    #[test]
    fn test_empty_pools() {
        let mut rng = StdRng::seed_from_u64(0);
        let links = LinkGenerator::default().generate(&[1, 2], &[], &[], &[], &mut rng);
        assert!(links.is_empty());
    }
}
