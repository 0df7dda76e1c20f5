//! Database side of seeding.
//!
//! [`purge`] empties tables page by page through the [`shakadb::Delegate`]
//! seam, [`cleanup`] runs it over every surf table in dependency order and
//! [`Seeder`] ties cleanup and fixture creation together.

pub mod cleanup;
pub mod purge;
pub mod safe;
mod seeder;

pub use cleanup::{CleanupPlan, CleanupReport, CleanupStep, delete_surf_data, sweep_all};
pub use purge::{
    PurgeOptions, PurgeOutcome, PurgeStats, purge_model_by_composite_key, purge_model_by_id,
    quick_or_purge_by_composite_key, quick_or_purge_by_id,
};
pub use safe::delete_safely;
pub use seeder::{SeedError, SeedReport, Seeder};
