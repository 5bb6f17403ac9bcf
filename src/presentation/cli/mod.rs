use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};

use crate::application::config::{
    BotConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_IMAGE_BYTES, ImageSource,
};
use crate::domain::categories::{DEFAULT_TYPE_COUNT, PLACE_TYPES};
use crate::domain::places::{LatLng, PhotoBounds, PhotoPolicy, SearchArea};
use crate::infrastructure::bluesky::BLUESKY_PDS_URL;
use crate::infrastructure::places::{PLACES_URL, PhotoSize, STREET_VIEW_URL, StreetViewOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    /// A Google Maps photo of the place
    PlacePhoto,
    /// A Street View capture of the address
    StreetView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PhotoPolicyArg {
    /// First photo within 1080-4800 x 720-3600 px
    Bounded,
    /// First photo, any size
    First,
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Post a random place near a city to Bluesky", long_about = None)]
pub struct Cli {
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: String,

    #[arg(long, env = "BLUESKY_USERNAME")]
    pub bluesky_username: Option<String>,

    #[arg(long, env = "BLUESKY_PASSWORD", hide_env_values = true)]
    pub bluesky_password: Option<String>,

    #[arg(long, env = "BLUESKY_PDS_URL", default_value = BLUESKY_PDS_URL)]
    pub bluesky_pds_url: String,

    #[arg(long, env = "PLACEBOT_PLACES_URL", default_value = PLACES_URL)]
    pub places_url: String,

    #[arg(long, env = "PLACEBOT_STREET_VIEW_URL", default_value = STREET_VIEW_URL)]
    pub street_view_url: String,

    #[arg(long, env = "PLACEBOT_CITY", default_value = "Bend, OR")]
    pub city: String,

    #[arg(long, env = "PLACEBOT_LATITUDE", default_value_t = 44.0582, allow_hyphen_values = true)]
    pub latitude: f64,

    #[arg(long, env = "PLACEBOT_LONGITUDE", default_value_t = -121.31531, allow_hyphen_values = true)]
    pub longitude: f64,

    /// Search radius in metres
    #[arg(long, env = "PLACEBOT_RADIUS", default_value_t = 7000.0)]
    pub radius: f64,

    /// How many place types to sample per search
    #[arg(long, env = "PLACEBOT_TYPE_COUNT", default_value_t = DEFAULT_TYPE_COUNT)]
    pub type_count: usize,

    #[arg(long, value_enum, env = "PLACEBOT_SOURCE", default_value_t = SourceArg::PlacePhoto)]
    pub source: SourceArg,

    #[arg(long, value_enum, env = "PLACEBOT_PHOTO_POLICY", default_value_t = PhotoPolicyArg::Bounded)]
    pub photo_policy: PhotoPolicyArg,

    /// Largest image to post, in KiB
    #[arg(long, env = "PLACEBOT_MAX_IMAGE_KB", default_value_t = DEFAULT_MAX_IMAGE_BYTES / 1024)]
    pub max_image_kb: u64,

    /// Select/fetch cycles to try before giving up on oversized images
    #[arg(long, env = "PLACEBOT_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    #[arg(long, env = "PLACEBOT_IMAGES_DIR", default_value = "images")]
    pub images_dir: PathBuf,

    /// Select and download, but log the post instead of publishing it
    #[arg(long, env = "PLACEBOT_DRY_RUN")]
    pub dry_run: bool,
}

/// Account details for posting.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Cli {
    pub fn bot_config(&self) -> BotConfig {
        let source = match self.source {
            SourceArg::PlacePhoto => ImageSource::PlacePhoto {
                policy: match self.photo_policy {
                    PhotoPolicyArg::Bounded => PhotoPolicy::Bounded(PhotoBounds::default()),
                    PhotoPolicyArg::First => PhotoPolicy::First,
                },
                size: PhotoSize::default(),
            },
            SourceArg::StreetView => ImageSource::StreetView(StreetViewOptions::default()),
        };

        BotConfig {
            city: self.city.clone(),
            area: SearchArea {
                center: LatLng {
                    latitude: self.latitude,
                    longitude: self.longitude,
                },
                radius: self.radius,
            },
            place_types: PLACE_TYPES.iter().map(|t| (*t).to_string()).collect(),
            type_count: self.type_count,
            source,
            max_image_bytes: self.max_image_kb.saturating_mul(1024),
            max_attempts: self.max_attempts,
        }
    }

    /// Bluesky credentials, or `None` for a dry run.
    pub fn credentials(&self) -> Result<Option<Credentials>> {
        if self.dry_run {
            return Ok(None);
        }

        match (&self.bluesky_username, &self.bluesky_password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok(Some(Credentials {
                    username: username.clone(),
                    password: password.clone(),
                }))
            }
            _ => bail!("BLUESKY_USERNAME and BLUESKY_PASSWORD are required unless --dry-run is set"),
        }
    }
}
