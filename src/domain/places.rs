use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

/// A circular search restriction around a city centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    pub center: LatLng,
    /// Radius in metres.
    pub radius: f64,
}

impl Default for SearchArea {
    fn default() -> Self {
        // Bend, OR
        Self {
            center: LatLng {
                latitude: 44.0582,
                longitude: -121.31531,
            },
            radius: 7000.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DisplayName {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub width_px: u32,
    #[serde(default)]
    pub height_px: u32,
}

/// One search result before filtering.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(default)]
    pub short_formatted_address: Option<String>,
    #[serde(default)]
    pub display_name: Option<DisplayName>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub location: Option<LatLng>,
}

impl Place {
    pub fn address(&self) -> &str {
        self.short_formatted_address.as_deref().unwrap_or("").trim()
    }

    pub fn name(&self) -> &str {
        self.display_name
            .as_ref()
            .map_or("", |name| name.text.as_str())
            .trim()
    }
}

/// The candidate chosen after filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedPlace {
    pub address: String,
    pub name: String,
    pub photo_name: Option<String>,
    pub location: Option<LatLng>,
}

/// Inclusive pixel bounds a photo must fall within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoBounds {
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
}

impl Default for PhotoBounds {
    fn default() -> Self {
        Self {
            min_width: 1080,
            max_width: 4800,
            min_height: 720,
            max_height: 3600,
        }
    }
}

impl PhotoBounds {
    pub fn contains(&self, photo: &Photo) -> bool {
        (self.min_width..=self.max_width).contains(&photo.width_px)
            && (self.min_height..=self.max_height).contains(&photo.height_px)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoPolicy {
    /// No photo needed; the image comes from elsewhere.
    NotRequired,
    /// Take the first photo reference, whatever its size.
    First,
    /// Take the first photo within the bounds.
    Bounded(PhotoBounds),
}

impl PhotoPolicy {
    /// Returns `Some(photo_name)` when the photos satisfy the policy. The inner
    /// value is `None` when no photo is needed.
    #[allow(clippy::option_option)]
    fn pick(self, photos: &[Photo]) -> Option<Option<String>> {
        let usable = |photo: &&Photo| !photo.name.is_empty();
        match self {
            PhotoPolicy::NotRequired => Some(None),
            PhotoPolicy::First => photos
                .first()
                .filter(usable)
                .map(|photo| Some(photo.name.clone())),
            PhotoPolicy::Bounded(bounds) => photos
                .iter()
                .filter(usable)
                .find(|photo| bounds.contains(photo))
                .map(|photo| Some(photo.name.clone())),
        }
    }
}

/// Rules a candidate has to pass to be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acceptance {
    pub require_name: bool,
    pub photo: PhotoPolicy,
}

impl Acceptance {
    pub fn accept(&self, place: &Place) -> Option<SelectedPlace> {
        let address = place.address();
        let name = place.name();
        if address.is_empty() || (self.require_name && name.is_empty()) {
            return None;
        }

        let photo_name = self.photo.pick(&place.photos)?;

        Some(SelectedPlace {
            address: address.to_string(),
            name: name.to_string(),
            photo_name,
            location: place.location,
        })
    }
}

/// Draw random candidates until one passes `acceptance`, dropping each one that fails.
///
/// Returns `None` once the pool is exhausted.
pub fn select_place<R: Rng + ?Sized>(
    mut pool: Vec<Place>,
    acceptance: &Acceptance,
    rng: &mut R,
) -> Option<SelectedPlace> {
    while !pool.is_empty() {
        let index = rng.random_range(0..pool.len());
        let candidate = pool.swap_remove(index);
        if let Some(selected) = acceptance.accept(&candidate) {
            return Some(selected);
        }
        tracing::debug!(
            name = candidate.name(),
            address = candidate.address(),
            remaining = pool.len(),
            "rejected candidate place"
        );
    }
    None
}
