//! Cleanup-then-fixtures seeding of the surf spot database.

use futures::future::try_join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shakadb::models::DEFAULT_BREAK_TYPES;
use shakadb::{Database, DbError, Table};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::{info, warn};

use super::cleanup::{CleanupReport, delete_surf_data, sweep_all};
use crate::config::SeedConfig;
use crate::generators::{
    GeneratedLinks, InfluencerGenerator, LinkGenConfig, LinkGenerator, PhotoGenerator,
    SurfSpotGenerator, TravellerGenerator,
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("Connection error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// What a seeding run did, plus row counts afterwards.
#[derive(Debug, Clone, Default)]
pub struct SeedReport {
    /// `None` when cleanup was skipped.
    pub cleanup: Option<CleanupReport>,
    /// Rows removed by the final sweep, if it ran.
    pub swept: Option<u64>,
    pub break_types_added: u64,
    pub travellers_created: usize,
    pub influencers_created: usize,
    pub surf_spots_created: usize,
    pub links_created: usize,
    /// Rows per table after the run, in deletion order.
    pub counts: Vec<(Table, u64)>,
}

impl SeedReport {
    pub fn count(&self, table: Table) -> u64 {
        self.counts
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// Seeds fixtures into the database.
pub struct Seeder {
    db: Database,
    spots: SurfSpotGenerator,
    photos: PhotoGenerator,
    travellers: TravellerGenerator,
    influencers: InfluencerGenerator,
}

impl Seeder {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            spots: SurfSpotGenerator::new(),
            photos: PhotoGenerator::new(),
            travellers: TravellerGenerator::new(),
            influencers: InfluencerGenerator::new(),
        }
    }

    /// Opens a pool on `database_url` and wraps it.
    pub async fn connect(database_url: &str) -> Result<Self, SeedError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(Database::new(pool)))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Cleanup followed by fixtures.
    ///
    /// With `skip_cleanup` set and surf spots already present, only the
    /// break types and the traveller and influencer top-ups run.
    pub async fn run(&self, config: &SeedConfig) -> Result<SeedReport, SeedError> {
        let mut rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut report = SeedReport::default();

        if config.skip_cleanup {
            info!("Skipping cleanup");
        } else {
            report.cleanup = Some(self.cleanup().await?);
            if config.final_sweep {
                report.swept = Some(sweep_all(&self.db).await);
            }
        }

        report.break_types_added = self.ensure_break_types().await?;
        report.travellers_created = self
            .top_up_travellers(config.traveller_target, &mut rng)
            .await?;
        report.influencers_created = self
            .top_up_influencers(config.influencer_target, &mut rng)
            .await?;

        let existing_spots = self.db.count(Table::SurfSpots).await?;
        if config.skip_cleanup && existing_spots > 0 {
            info!(
                "Found {} surf spots with cleanup skipped, leaving fixtures alone",
                existing_spots
            );
        } else {
            let spot_ids = self.seed_surf_spots(config.surf_spot_count, &mut rng).await?;
            report.surf_spots_created = spot_ids.len();

            let link_config = LinkGenConfig {
                influencers_per_spot: config.influencers_per_spot,
                travellers_per_spot: config.travellers_per_spot,
                break_types_per_spot: config.break_types_per_spot,
            };
            report.links_created = self.seed_links(&spot_ids, link_config, &mut rng).await?;
        }

        report.counts = self.counts().await?;
        info!(
            spots = report.count(Table::SurfSpots),
            travellers = report.count(Table::Travellers),
            influencers = report.count(Table::Influencers),
            "Seeding finished"
        );
        Ok(report)
    }

    /// Empties every surf table, children first.
    pub async fn cleanup(&self) -> Result<CleanupReport, SeedError> {
        info!("Cleaning up surf data...");
        Ok(delete_surf_data(&self.db).await?)
    }

    /// Inserts the default break types that are missing. Returns how many were added.
    pub async fn ensure_break_types(&self) -> Result<u64, SeedError> {
        let added = self
            .db
            .create_break_types_skip_duplicates(&DEFAULT_BREAK_TYPES)
            .await?;
        info!("Added {} break types", added);
        Ok(added)
    }

    /// Creates travellers until at least `target` exist. Returns how many were created.
    pub async fn top_up_travellers(
        &self,
        target: usize,
        rng: &mut impl Rng,
    ) -> Result<usize, SeedError> {
        let missing = shortfall(self.db.count(Table::Travellers).await?, target);
        if missing == 0 {
            return Ok(0);
        }

        let batch = self.travellers.generate_batch(missing, rng);
        try_join_all(batch.iter().map(|t| self.db.create_traveller(t))).await?;
        info!("Seeded {} travellers", missing);
        Ok(missing)
    }

    /// Creates influencers until at least `target` exist. Returns how many were created.
    pub async fn top_up_influencers(
        &self,
        target: usize,
        rng: &mut impl Rng,
    ) -> Result<usize, SeedError> {
        let missing = shortfall(self.db.count(Table::Influencers).await?, target);
        if missing == 0 {
            return Ok(0);
        }

        let batch = self.influencers.generate_batch(missing, rng);
        try_join_all(batch.iter().map(|i| self.db.create_influencer(i))).await?;
        info!("Seeded {} influencers", missing);
        Ok(missing)
    }

    /// Creates `count` spots, each with one photo and every thumbnail kind.
    ///
    /// Returns the new spot ids.
    pub async fn seed_surf_spots(
        &self,
        count: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<i32>, SeedError> {
        info!("Seeding {} surf spots...", count);
        let mut ids = Vec::with_capacity(count);

        for new_spot in self.spots.generate_batch(count, rng) {
            let spot = self.db.create_surf_spot(&new_spot).await?;
            let photo = self
                .db
                .create_photo(&self.photos.generate(spot.surf_spot_id, rng))
                .await?;
            for (kind, url) in self.photos.thumbnails(photo.photo_id) {
                self.db.create_thumbnail(photo.photo_id, kind, &url).await?;
            }
            ids.push(spot.surf_spot_id);
        }

        info!("Seeded {} surf spots", ids.len());
        Ok(ids)
    }

    /// Links each spot to random influencers, travellers and break types.
    ///
    /// Pairs that already exist are skipped. Returns how many links were added.
    pub async fn seed_links(
        &self,
        spot_ids: &[i32],
        config: LinkGenConfig,
        rng: &mut impl Rng,
    ) -> Result<usize, SeedError> {
        let influencer_ids = self.db.influencer_ids().await?;
        let traveller_ids = self.db.traveller_ids().await?;
        let break_type_ids: Vec<i32> = self
            .db
            .list_break_types()
            .await?
            .into_iter()
            .map(|b| b.surf_break_type_id)
            .collect();

        if influencer_ids.is_empty() || traveller_ids.is_empty() || break_type_ids.is_empty() {
            warn!("Some link pools are empty, spots will have fewer partners");
        }

        let links = LinkGenerator::new(config).generate(
            spot_ids,
            &influencer_ids,
            &traveller_ids,
            &break_type_ids,
            rng,
        );
        let added = self.insert_links(&links).await?;

        if added < links.len() {
            info!("Skipped {} duplicate links", links.len() - added);
        }
        info!("Seeded {} links", added);
        Ok(added)
    }

    async fn insert_links(&self, links: &GeneratedLinks) -> Result<usize, SeedError> {
        let mut added = 0;
        for link in &links.influencers {
            if self
                .db
                .link_influencer(link.surf_spot_id, link.influencer_id)
                .await?
            {
                added += 1;
            }
        }
        for link in &links.travellers {
            if self
                .db
                .link_traveller(link.surf_spot_id, link.traveller_id)
                .await?
            {
                added += 1;
            }
        }
        for link in &links.break_types {
            if self
                .db
                .link_break_type(link.surf_spot_id, link.surf_break_type_id)
                .await?
            {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Row count of every table, in deletion order.
    pub async fn counts(&self) -> Result<Vec<(Table, u64)>, SeedError> {
        let mut counts = Vec::with_capacity(Table::DELETION_ORDER.len());
        for table in Table::DELETION_ORDER {
            counts.push((table, self.db.count(table).await?));
        }
        Ok(counts)
    }

    /// Closes the underlying pool.
    pub async fn close(&self) {
        self.db.close().await;
    }
}

fn shortfall(existing: u64, target: usize) -> usize {
    (target as u64).saturating_sub(existing) as usize
}
