use crate::domain::BotError;
use crate::domain::caption::ImageKind;
use crate::domain::categories::{DEFAULT_TYPE_COUNT, PLACE_TYPES};
use crate::domain::places::{Acceptance, PhotoPolicy, SearchArea};
use crate::infrastructure::places::{PhotoSize, StreetViewOptions};

/// 976 KiB, just under Bluesky's blob limit.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 976 * 1024;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Where the posted image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A photo attached to the place in Google Maps.
    PlacePhoto { policy: PhotoPolicy, size: PhotoSize },
    /// A Street View capture of the place's address.
    StreetView(StreetViewOptions),
}

impl ImageSource {
    pub fn acceptance(&self) -> Acceptance {
        match self {
            ImageSource::PlacePhoto { policy, .. } => Acceptance {
                require_name: true,
                photo: *policy,
            },
            ImageSource::StreetView(_) => Acceptance {
                require_name: false,
                photo: PhotoPolicy::NotRequired,
            },
        }
    }

    pub fn kind(&self) -> ImageKind {
        match self {
            ImageSource::PlacePhoto { .. } => ImageKind::PlacePhoto,
            ImageSource::StreetView(_) => ImageKind::StreetView,
        }
    }
}

/// Everything one run of the bot needs to know, minus credentials.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Label used in logs.
    pub city: String,
    pub area: SearchArea,
    pub place_types: Vec<String>,
    pub type_count: usize,
    pub source: ImageSource,
    pub max_image_bytes: u64,
    pub max_attempts: u32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            city: "Bend, OR".to_string(),
            area: SearchArea::default(),
            place_types: PLACE_TYPES.iter().map(|t| (*t).to_string()).collect(),
            type_count: DEFAULT_TYPE_COUNT,
            source: ImageSource::PlacePhoto {
                policy: PhotoPolicy::Bounded(Default::default()),
                size: PhotoSize::default(),
            },
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl BotConfig {
    pub fn validate(&self) -> Result<(), BotError> {
        if self.place_types.is_empty() {
            return Err(BotError::Config("at least one place type is required".into()));
        }
        if self.type_count == 0 {
            return Err(BotError::Config("type count must be at least 1".into()));
        }
        if self.max_attempts == 0 {
            return Err(BotError::Config("max attempts must be at least 1".into()));
        }
        if self.max_image_bytes == 0 {
            return Err(BotError::Config("max image size must be above zero".into()));
        }
        if self.area.radius.is_nan() || self.area.radius <= 0.0 {
            return Err(BotError::Config("search radius must be positive".into()));
        }
        if let ImageSource::PlacePhoto {
            policy: PhotoPolicy::NotRequired,
            ..
        } = self.source
        {
            return Err(BotError::Config(
                "the place photo source needs a photo policy that requires a photo".into(),
            ));
        }
        Ok(())
    }
}
