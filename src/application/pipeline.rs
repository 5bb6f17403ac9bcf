use rand::Rng;
use tracing::{info, warn};

use crate::application::config::{BotConfig, ImageSource};
use crate::domain::caption::ImagePost;
use crate::domain::categories::sample_types;
use crate::domain::places::{SelectedPlace, select_place};
use crate::domain::{BotError, BotResult, PostRef, Poster};
use crate::infrastructure::images::ImageStore;
use crate::infrastructure::places::PlacesClient;

/// What a successful run posted.
#[derive(Debug, Clone)]
pub struct PostOutcome {
    pub place: SelectedPlace,
    pub post: PostRef,
    pub attempts: u32,
    pub image_bytes: u64,
}

/// One pass of select, fetch, size check, post and cleanup.
pub struct Pipeline<'a> {
    config: &'a BotConfig,
    places: &'a PlacesClient,
    store: &'a ImageStore,
    poster: &'a dyn Poster,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a BotConfig,
        places: &'a PlacesClient,
        store: &'a ImageStore,
        poster: &'a dyn Poster,
    ) -> Self {
        Self {
            config,
            places,
            store,
            poster,
        }
    }

    /// Run until a place with a small enough image is posted.
    ///
    /// Only an oversized image restarts the cycle, at most `max_attempts` times.
    /// Every other failure ends the run.
    pub async fn run<R>(&self, rng: &mut R) -> BotResult<PostOutcome>
    where
        R: Rng + Send + ?Sized,
    {
        self.config.validate()?;

        for attempt in 1..=self.config.max_attempts {
            let place = self.select(rng).await?;
            info!(
                attempt,
                name = %place.name,
                address = %place.address,
                photo = place.photo_name.as_deref().unwrap_or(""),
                "selected place"
            );

            let bytes = self.fetch(&place).await?;
            let image = self.store.save(image_label(&place), &bytes).await?;

            if image.size() > self.config.max_image_bytes {
                warn!(
                    attempt,
                    size_kb = image.size() / 1024,
                    max_kb = self.config.max_image_bytes / 1024,
                    "image too large, retrying"
                );
                continue;
            }

            let data = image.read().await?;
            let post = ImagePost::for_place(&place, self.config.source.kind(), data);
            let post_ref = self.poster.post_image(&post).await?;

            let image_bytes = image.size();
            if let Err(err) = image.remove().await {
                warn!(error = %err, "posted, but failed to remove image");
            }

            info!(name = %place.name, uri = %post_ref.uri, "posted place");
            return Ok(PostOutcome {
                place,
                post: post_ref,
                attempts: attempt,
                image_bytes,
            });
        }

        Err(BotError::AttemptsExhausted {
            attempts: self.config.max_attempts,
            max_bytes: self.config.max_image_bytes,
        })
    }

    async fn select<R>(&self, rng: &mut R) -> BotResult<SelectedPlace>
    where
        R: Rng + Send + ?Sized,
    {
        let types = sample_types(self.config.place_types.as_slice(), self.config.type_count, rng);
        info!(city = %self.config.city, types = ?types, "searching for places");

        let candidates = self.places.search_nearby(&self.config.area, &types).await?;
        if candidates.is_empty() {
            warn!("no places found");
            return Err(BotError::NoPlaces);
        }

        let count = candidates.len();
        select_place(candidates, &self.config.source.acceptance(), rng).ok_or_else(|| {
            warn!(candidates = count, "no valid places found after filtering");
            BotError::NoValidPlace
        })
    }

    async fn fetch(&self, place: &SelectedPlace) -> BotResult<Vec<u8>> {
        match &self.config.source {
            ImageSource::PlacePhoto { size, .. } => {
                // Acceptance for this source always requires a photo; `validate`
                // rejects the one policy that does not.
                let photo_name = place.photo_name.as_deref().ok_or(BotError::NoValidPlace)?;
                self.places.place_photo(photo_name, *size).await
            }
            ImageSource::StreetView(options) => {
                self.places.street_view(&place.address, options).await
            }
        }
    }
}

/// File stem for a place: its name when it has one, otherwise its address.
fn image_label(place: &SelectedPlace) -> &str {
    if place.name.is_empty() {
        &place.address
    } else {
        &place.name
    }
}
