//! Fixture seeding and bulk cleanup for the surf spot database.
//!
//! Cleanup empties every surf table children first, switching between one
//! unbounded delete for small tables and a paginated purge for large ones.
//! Seeding then tops up travellers and influencers and creates surf spots with
//! photos, thumbnails and random links.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_data::prelude::*;
//!
//! let seeder = Seeder::connect(&database_url).await?;
//! seeder.database().migrate().await?;
//! let report = seeder.run(&SeedConfig::from_env()?).await?;
//! seeder.close().await;
//! ```

pub mod config;
pub mod db;
pub mod generators;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{BoundingBox, Region, SeedConfig};
    pub use crate::db::{
        CleanupPlan, PurgeOptions, PurgeOutcome, SeedError, SeedReport, Seeder, delete_safely,
        delete_surf_data, quick_or_purge_by_composite_key, quick_or_purge_by_id, sweep_all,
    };
    pub use crate::generators::{
        InfluencerGenerator, LinkGenerator, PhotoGenerator, SurfSpotGenerator, TravellerGenerator,
    };
    pub use shakadb::{Database, Table};
}
