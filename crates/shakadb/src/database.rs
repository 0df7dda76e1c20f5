use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::MIGRATOR;
use crate::delegate::{Delegate, Filter, Table, TableDelegate, TableSource};
use crate::errors::DbError;
use crate::models::{
    Influencer, NewInfluencer, NewPhoto, NewSurfSpot, NewTraveller, Photo, SurfBreakType, SurfSpot,
    Thumbnail, ThumbnailKind, Traveller,
};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies pending schema migrations.
    pub async fn migrate(&self) -> Result<(), DbError> {
        MIGRATOR.run(&self.pool).await?;
        tracing::info!("Migrations applied");
        Ok(())
    }

    /// Closes every pooled connection. Further queries fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// A table-agnostic delegate over `table`.
    pub fn delegate(&self, table: Table) -> TableDelegate {
        TableDelegate::new(self.pool.clone(), table)
    }

    pub async fn count(&self, table: Table) -> Result<u64, DbError> {
        self.delegate(table).count(&Filter::All).await
    }

    // --- surf spots ---------------------------------------------------------

    pub async fn create_surf_spot(&self, spot: &NewSurfSpot) -> Result<SurfSpot, DbError> {
        let created = sqlx::query_as(
            r#"
            INSERT INTO surf_spots (destination, address, state_country, difficulty_level,
                                    peak_season_begin, peak_season_end, magic_seaweed_link,
                                    created_time, geocode_raw)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), $8)
            RETURNING surf_spot_id, destination, address, state_country, difficulty_level,
                      peak_season_begin, peak_season_end, magic_seaweed_link,
                      created_time, geocode_raw
            "#,
        )
        .bind(&spot.destination)
        .bind(&spot.address)
        .bind(&spot.state_country)
        .bind(spot.difficulty_level)
        .bind(spot.peak_season_begin)
        .bind(spot.peak_season_end)
        .bind(&spot.magic_seaweed_link)
        .bind(&spot.geocode_raw)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn get_surf_spot(&self, surf_spot_id: i32) -> Result<Option<SurfSpot>, DbError> {
        let spot = sqlx::query_as(
            r#"
            SELECT surf_spot_id, destination, address, state_country, difficulty_level,
                   peak_season_begin, peak_season_end, magic_seaweed_link,
                   created_time, geocode_raw
            FROM surf_spots
            WHERE surf_spot_id = $1
            "#,
        )
        .bind(surf_spot_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(spot)
    }

    pub async fn update_surf_spot_destination(
        &self,
        surf_spot_id: i32,
        destination: &str,
    ) -> Result<SurfSpot, DbError> {
        let updated: Option<SurfSpot> = sqlx::query_as(
            r#"
            UPDATE surf_spots SET destination = $2
            WHERE surf_spot_id = $1
            RETURNING surf_spot_id, destination, address, state_country, difficulty_level,
                      peak_season_begin, peak_season_end, magic_seaweed_link,
                      created_time, geocode_raw
            "#,
        )
        .bind(surf_spot_id)
        .bind(destination)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or(DbError::NotFound)
    }

    pub async fn delete_surf_spot(&self, surf_spot_id: i32) -> Result<SurfSpot, DbError> {
        let deleted: Option<SurfSpot> = sqlx::query_as(
            r#"
            DELETE FROM surf_spots
            WHERE surf_spot_id = $1
            RETURNING surf_spot_id, destination, address, state_country, difficulty_level,
                      peak_season_begin, peak_season_end, magic_seaweed_link,
                      created_time, geocode_raw
            "#,
        )
        .bind(surf_spot_id)
        .fetch_optional(&self.pool)
        .await?;

        deleted.ok_or(DbError::NotFound)
    }

    // --- photos and thumbnails ---------------------------------------------

    pub async fn create_photo(&self, photo: &NewPhoto) -> Result<Photo, DbError> {
        let created = sqlx::query_as(
            r#"
            INSERT INTO photos (surf_spot_id, original_url, caption, created_time)
            VALUES ($1, $2, $3, NOW())
            RETURNING photo_id, surf_spot_id, original_url, caption, created_time
            "#,
        )
        .bind(photo.surf_spot_id)
        .bind(&photo.original_url)
        .bind(&photo.caption)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Inserts a thumbnail, leaving an existing (photo, kind) row untouched.
    pub async fn create_thumbnail(
        &self,
        photo_id: i32,
        kind: ThumbnailKind,
        url: &str,
    ) -> Result<(), DbError> {
        let (width, height) = kind.dimensions();
        sqlx::query(
            r#"
            INSERT INTO thumbnails (photo_id, kind, url, width, height)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (photo_id, kind) DO NOTHING
            "#,
        )
        .bind(photo_id)
        .bind(kind.as_str())
        .bind(url)
        .bind(width)
        .bind(height)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_thumbnails(&self, photo_id: i32) -> Result<Vec<Thumbnail>, DbError> {
        let thumbnails = sqlx::query_as(
            r#"
            SELECT photo_id, kind, url, width, height
            FROM thumbnails
            WHERE photo_id = $1
            ORDER BY width
            "#,
        )
        .bind(photo_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(thumbnails)
    }

    // --- people ---------------------------------------------------------------

    pub async fn create_traveller(&self, traveller: &NewTraveller) -> Result<Traveller, DbError> {
        let created = sqlx::query_as(
            r#"
            INSERT INTO travellers (name, email, home_country, created_time)
            VALUES ($1, $2, $3, NOW())
            RETURNING traveller_id, name, email, home_country, created_time
            "#,
        )
        .bind(&traveller.name)
        .bind(&traveller.email)
        .bind(&traveller.home_country)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn traveller_ids(&self) -> Result<Vec<i32>, DbError> {
        let ids: Vec<i32> =
            sqlx::query_scalar("SELECT traveller_id FROM travellers ORDER BY traveller_id")
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }

    pub async fn create_influencer(
        &self,
        influencer: &NewInfluencer,
    ) -> Result<Influencer, DbError> {
        let created = sqlx::query_as(
            r#"
            INSERT INTO influencers (name, instagram_handle, follower_count, created_time)
            VALUES ($1, $2, $3, NOW())
            RETURNING influencer_id, name, instagram_handle, follower_count, created_time
            "#,
        )
        .bind(&influencer.name)
        .bind(&influencer.instagram_handle)
        .bind(influencer.follower_count)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn influencer_ids(&self) -> Result<Vec<i32>, DbError> {
        let ids: Vec<i32> =
            sqlx::query_scalar("SELECT influencer_id FROM influencers ORDER BY influencer_id")
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }

    // --- break types ------------------------------------------------------------

    /// Inserts every name not already present. Returns how many rows were added.
    pub async fn create_break_types_skip_duplicates(
        &self,
        names: &[&str],
    ) -> Result<u64, DbError> {
        if names.is_empty() {
            return Ok(0);
        }

        let mut qb =
            QueryBuilder::<Postgres>::new("INSERT INTO surf_break_types (break_type_name) ");
        qb.push_values(names, |mut b, name| {
            b.push_bind(*name);
        });
        qb.push(" ON CONFLICT (break_type_name) DO NOTHING");

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn list_break_types(&self) -> Result<Vec<SurfBreakType>, DbError> {
        let types = sqlx::query_as(
            r#"
            SELECT surf_break_type_id, break_type_name
            FROM surf_break_types
            ORDER BY surf_break_type_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(types)
    }

    // --- pivots -------------------------------------------------------------------

    /// Links a spot to an influencer. Returns false if the link already existed.
    pub async fn link_influencer(
        &self,
        surf_spot_id: i32,
        influencer_id: i32,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO surf_spot_influencers (surf_spot_id, influencer_id)
            VALUES ($1, $2)
            ON CONFLICT (surf_spot_id, influencer_id) DO NOTHING
            "#,
        )
        .bind(surf_spot_id)
        .bind(influencer_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Links a spot to a traveller. Returns false if the link already existed.
    pub async fn link_traveller(
        &self,
        surf_spot_id: i32,
        traveller_id: i32,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO surf_spot_travellers (surf_spot_id, traveller_id)
            VALUES ($1, $2)
            ON CONFLICT (surf_spot_id, traveller_id) DO NOTHING
            "#,
        )
        .bind(surf_spot_id)
        .bind(traveller_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Links a spot to a break type. Returns false if the link already existed.
    pub async fn link_break_type(
        &self,
        surf_spot_id: i32,
        surf_break_type_id: i32,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO surf_spot_surf_break_types (surf_spot_id, surf_break_type_id)
            VALUES ($1, $2)
            ON CONFLICT (surf_spot_id, surf_break_type_id) DO NOTHING
            "#,
        )
        .bind(surf_spot_id)
        .bind(surf_break_type_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl TableSource for Database {
    fn delegate_for(&self, table: Table) -> Box<dyn Delegate + '_> {
        Box::new(self.delegate(table))
    }
}
