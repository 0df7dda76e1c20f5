//! Entity generators for surf data fixtures.
//!
//! - [`SurfSpotGenerator`]: spots with seasons, forecast links and a geocode cache
//! - [`PhotoGenerator`]: one photo per spot plus thumbnail URLs
//! - [`TravellerGenerator`] and [`InfluencerGenerator`]: the people linked to spots
//! - [`LinkGenerator`]: random distinct pivot rows

pub mod links;
pub mod media;
pub mod people;
pub mod surf_spot;

pub use links::{GeneratedLinks, LinkGenConfig, LinkGenerator};
pub use media::PhotoGenerator;
pub use people::{InfluencerGenerator, TravellerGenConfig, TravellerGenerator};
pub use surf_spot::{GeocodeCache, GeocodeResult, SurfSpotGenConfig, SurfSpotGenerator};
