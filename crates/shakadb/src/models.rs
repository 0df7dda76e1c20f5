use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SurfSpot {
    pub surf_spot_id: i32,
    pub destination: String,
    pub address: String,
    pub state_country: String,
    pub difficulty_level: i32,
    pub peak_season_begin: Date,
    pub peak_season_end: Date,
    pub magic_seaweed_link: Option<String>,
    pub created_time: OffsetDateTime,
    /// Base64-encoded JSON geocoder response.
    pub geocode_raw: Option<String>,
}

/// A surf spot that has not been inserted yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSurfSpot {
    pub destination: String,
    pub address: String,
    pub state_country: String,
    pub difficulty_level: i32,
    pub peak_season_begin: Date,
    pub peak_season_end: Date,
    pub magic_seaweed_link: Option<String>,
    pub geocode_raw: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Photo {
    pub photo_id: i32,
    pub surf_spot_id: i32,
    pub original_url: String,
    pub caption: Option<String>,
    pub created_time: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPhoto {
    pub surf_spot_id: i32,
    pub original_url: String,
    pub caption: Option<String>,
}

/// Rendition size of a photo thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailKind {
    Small,
    Large,
    Full,
}

impl ThumbnailKind {
    pub const ALL: [ThumbnailKind; 3] = [Self::Small, Self::Large, Self::Full];

    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbnailKind::Small => "small",
            ThumbnailKind::Large => "large",
            ThumbnailKind::Full => "full",
        }
    }

    /// Nominal pixel dimensions (width, height) for this rendition.
    pub fn dimensions(&self) -> (i32, i32) {
        match self {
            ThumbnailKind::Small => (160, 120),
            ThumbnailKind::Large => (800, 600),
            ThumbnailKind::Full => (1920, 1440),
        }
    }
}

impl fmt::Display for ThumbnailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown thumbnail kind: {0}")]
pub struct UnknownThumbnailKind(pub String);

impl FromStr for ThumbnailKind {
    type Err = UnknownThumbnailKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(ThumbnailKind::Small),
            "large" => Ok(ThumbnailKind::Large),
            "full" => Ok(ThumbnailKind::Full),
            other => Err(UnknownThumbnailKind(other.to_string())),
        }
    }
}

impl TryFrom<String> for ThumbnailKind {
    type Error = UnknownThumbnailKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Thumbnail {
    pub photo_id: i32,
    #[sqlx(try_from = "String")]
    pub kind: ThumbnailKind,
    pub url: String,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Influencer {
    pub influencer_id: i32,
    pub name: String,
    pub instagram_handle: String,
    pub follower_count: i32,
    pub created_time: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInfluencer {
    pub name: String,
    pub instagram_handle: String,
    pub follower_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Traveller {
    pub traveller_id: i32,
    pub name: String,
    pub email: String,
    pub home_country: Option<String>,
    pub created_time: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTraveller {
    pub name: String,
    pub email: String,
    pub home_country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SurfBreakType {
    pub surf_break_type_id: i32,
    pub break_type_name: String,
}

/// Break type names every seeded database carries.
pub const DEFAULT_BREAK_TYPES: [&str; 4] =
    ["Beach Break", "Reef Break", "Point Break", "River Mouth"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct SurfSpotInfluencer {
    pub surf_spot_id: i32,
    pub influencer_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct SurfSpotTraveller {
    pub surf_spot_id: i32,
    pub traveller_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct SurfSpotSurfBreakType {
    pub surf_spot_id: i32,
    pub surf_break_type_id: i32,
}
