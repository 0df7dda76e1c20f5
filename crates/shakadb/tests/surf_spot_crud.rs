//! Integration tests for surf spot CRUD against Postgres.
//!
//! To run these tests, you need:
//! 1. A PostgreSQL database
//! 2. DATABASE_URL environment variable set
//!
//! Run with: `DATABASE_URL=postgres://... cargo test -p shakadb --test surf_spot_crud`
//!
//! Migrations are applied on connect. Each test removes the rows it creates.

use shakadb::models::{NewPhoto, NewSurfSpot, ThumbnailKind};
use shakadb::{Database, DbError, Table};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use time::{Duration, OffsetDateTime};

/// Get database pool, skipping tests if DATABASE_URL is not set.
async fn get_test_pool() -> Option<PgPool> {
    let database_url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: DATABASE_URL not set");
            return None;
        }
    };

    match PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
    {
        Ok(pool) => Some(pool),
        Err(e) => {
            eprintln!("Skipping test: Failed to connect to database: {e}");
            None
        }
    }
}

async fn get_test_db() -> Option<Database> {
    let db = Database::new(get_test_pool().await?);
    db.migrate().await.expect("Failed to run migrations");
    Some(db)
}

fn new_spot(destination: &str) -> NewSurfSpot {
    let begin = OffsetDateTime::now_utc().date();
    NewSurfSpot {
        destination: destination.to_string(),
        address: "1 Beach Road".to_string(),
        state_country: "Portugal".to_string(),
        difficulty_level: 3,
        peak_season_begin: begin,
        peak_season_end: begin + Duration::days(90),
        magic_seaweed_link: None,
        geocode_raw: None,
    }
}

#[tokio::test]
async fn test_surf_spot_lifecycle() {
    let Some(db) = get_test_db().await else {
        return;
    };

    let created = db
        .create_surf_spot(&new_spot("Ericeira"))
        .await
        .expect("Failed to create surf spot");
    assert_eq!(created.destination, "Ericeira");
    assert_eq!(created.difficulty_level, 3);

    let fetched = db
        .get_surf_spot(created.surf_spot_id)
        .await
        .expect("Failed to fetch surf spot")
        .expect("Surf spot should exist");
    assert_eq!(fetched.surf_spot_id, created.surf_spot_id);
    assert_eq!(fetched.peak_season_end, created.peak_season_end);

    let updated = db
        .update_surf_spot_destination(created.surf_spot_id, "Peniche")
        .await
        .expect("Failed to update surf spot");
    assert_eq!(updated.destination, "Peniche");
    assert_eq!(updated.address, created.address);

    let deleted = db
        .delete_surf_spot(created.surf_spot_id)
        .await
        .expect("Failed to delete surf spot");
    assert_eq!(deleted.destination, "Peniche");

    let gone = db
        .get_surf_spot(created.surf_spot_id)
        .await
        .expect("Failed to fetch surf spot");
    assert!(gone.is_none());
}

#[tokio::test]
async fn test_missing_surf_spot_is_not_found() {
    let Some(db) = get_test_db().await else {
        return;
    };

    assert!(db.get_surf_spot(i32::MAX).await.unwrap().is_none());
    assert!(matches!(
        db.update_surf_spot_destination(i32::MAX, "Nowhere").await,
        Err(DbError::NotFound)
    ));
    assert!(matches!(
        db.delete_surf_spot(i32::MAX).await,
        Err(DbError::NotFound)
    ));
}

#[tokio::test]
async fn test_thumbnails_are_unique_per_kind() {
    let Some(db) = get_test_db().await else {
        return;
    };

    let spot = db.create_surf_spot(&new_spot("Uluwatu")).await.unwrap();
    let photo = db
        .create_photo(&NewPhoto {
            surf_spot_id: spot.surf_spot_id,
            original_url: "https://images.example.com/uluwatu.jpg".to_string(),
            caption: None,
        })
        .await
        .unwrap();

    for kind in ThumbnailKind::ALL {
        db.create_thumbnail(photo.photo_id, kind, "https://images.example.com/t.jpg")
            .await
            .unwrap();
    }
    db.create_thumbnail(photo.photo_id, ThumbnailKind::Small, "https://images.example.com/dup.jpg")
        .await
        .unwrap();

    let thumbnails = db.get_thumbnails(photo.photo_id).await.unwrap();
    let kinds: Vec<ThumbnailKind> = thumbnails.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, ThumbnailKind::ALL.to_vec());
    assert_eq!((thumbnails[0].width, thumbnails[0].height), (160, 120));
    assert!(db.count(Table::Thumbnails).await.unwrap() >= 3);

    // Children first, there is no cascade.
    sqlx::query("DELETE FROM thumbnails WHERE photo_id = $1")
        .bind(photo.photo_id)
        .execute(db.pool())
        .await
        .expect("Failed to delete thumbnails");
    sqlx::query("DELETE FROM photos WHERE photo_id = $1")
        .bind(photo.photo_id)
        .execute(db.pool())
        .await
        .expect("Failed to delete photo");
    db.delete_surf_spot(spot.surf_spot_id)
        .await
        .expect("Failed to delete surf spot");
}
