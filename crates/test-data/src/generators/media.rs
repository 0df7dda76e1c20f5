//! Photo and thumbnail fixtures.

use fake::{Fake, faker::lorem::en::Sentence};
use rand::Rng;
use shakadb::models::{NewPhoto, ThumbnailKind};

/// Image host all generated URLs point at.
pub const IMAGE_HOST: &str = "https://images.example.com";

/// Generates one photo per surf spot and URLs for its thumbnails.
#[derive(Debug, Clone)]
pub struct PhotoGenerator {
    host: String,
    caption_rate: f64,
}

impl PhotoGenerator {
    pub fn new() -> Self {
        Self {
            host: IMAGE_HOST.to_string(),
            caption_rate: 0.6,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into().trim_end_matches('/').to_string();
        self
    }

    pub fn generate(&self, surf_spot_id: i32, rng: &mut impl Rng) -> NewPhoto {
        let key: u64 = rng.r#gen();
        let caption = if rng.r#gen::<f64>() < self.caption_rate {
            Some(Sentence(3..8).fake_with_rng(rng))
        } else {
            None
        };

        NewPhoto {
            surf_spot_id,
            original_url: format!("{}/spots/{surf_spot_id}/{key:016x}.jpg", self.host),
            caption,
        }
    }

    /// URL of the `kind` rendition of a stored photo.
    pub fn thumbnail_url(&self, photo_id: i32, kind: ThumbnailKind) -> String {
        let (width, height) = kind.dimensions();
        format!("{}/thumbs/{photo_id}/{kind}_{width}x{height}.jpg", self.host)
    }

    /// All renditions of a photo, smallest first.
    pub fn thumbnails(&self, photo_id: i32) -> Vec<(ThumbnailKind, String)> {
        ThumbnailKind::ALL
            .iter()
            .map(|kind| (*kind, self.thumbnail_url(photo_id, *kind)))
            .collect()
    }
}

impl Default for PhotoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_url_belongs_to_spot() {
        let mut rng = rand::thread_rng();
        let photo = PhotoGenerator::new().generate(42, &mut rng);

        assert_eq!(photo.surf_spot_id, 42);
        assert!(photo.original_url.starts_with("https://images.example.com/spots/42/"));
        assert!(photo.original_url.ends_with(".jpg"));
    }

    #[test]
    fn test_three_thumbnails() {
        let thumbs = PhotoGenerator::new()
            .with_host("http://localhost:9000/")
            .thumbnails(7);

        let kinds: Vec<ThumbnailKind> = thumbs.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, ThumbnailKind::ALL.to_vec());
        assert_eq!(thumbs[0].1, "http://localhost:9000/thumbs/7/small_160x120.jpg");
    }
}
