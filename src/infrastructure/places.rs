use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::places::{LatLng, Place, SearchArea};
use crate::domain::{BotError, BotResult, Service};

pub const PLACES_URL: &str = "https://places.googleapis.com/v1/";
pub const STREET_VIEW_URL: &str = "https://maps.googleapis.com/maps/api/streetview";

pub const FIELD_MASK: &str =
    "places.shortFormattedAddress,places.displayName,places.photos,places.location";

const USER_AGENT: &str = "placebot/1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Max pixel dimensions asked of the photo media endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoSize {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for PhotoSize {
    fn default() -> Self {
        Self {
            max_width: 1080,
            max_height: 1920,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetViewOptions {
    /// `WIDTHxHEIGHT`
    pub size: String,
    pub fov: u32,
}

impl Default for StreetViewOptions {
    fn default() -> Self {
        Self {
            size: "1920x1080".to_string(),
            fov: 75,
        }
    }
}

/// Client for the Places search, photo media and Street View endpoints.
pub struct PlacesClient {
    http: Client,
    api_key: String,
    places_url: Url,
    street_view_url: Url,
}

impl PlacesClient {
    pub fn new(api_key: String, places_url: Url, street_view_url: Url) -> BotResult<Self> {
        let mut places_url = places_url;
        if !places_url.path().ends_with('/') {
            places_url.set_path(&format!("{}/", places_url.path().trim_end_matches('/')));
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BotError::Config(format!("failed to configure HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            places_url,
            street_view_url,
        })
    }

    pub fn from_urls(api_key: String, places_url: &str, street_view_url: &str) -> BotResult<Self> {
        let places = parse_url(places_url)?;
        let street_view = parse_url(street_view_url)?;
        Self::new(api_key, places, street_view)
    }

    fn endpoint(&self, path: &str) -> BotResult<Url> {
        // "./" keeps `places:searchNearby` from parsing as a URL scheme
        self.places_url
            .join(&format!("./{path}"))
            .map_err(|e| BotError::Config(format!("invalid places path {path}: {e}")))
    }

    /// Run a nearby search restricted to `area` and the given primary types.
    ///
    /// A successful response with no `places` key is an empty list.
    pub async fn search_nearby(
        &self,
        area: &SearchArea,
        included_types: &[String],
    ) -> BotResult<Vec<Place>> {
        let url = self.endpoint("places:searchNearby")?;
        let body = SearchNearbyRequest {
            included_primary_types: included_types,
            location_restriction: LocationRestriction {
                circle: Circle {
                    center: area.center,
                    radius: area.radius,
                },
            },
        };

        debug!(types = ?included_types, "searching nearby places");

        let response = self
            .http
            .post(url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&body)
            .send()
            .await
            .map_err(|e| BotError::network(Service::Places, e))?;

        let response = check_status(Service::Places, response).await?;
        let text = response
            .text()
            .await
            .map_err(|e| BotError::network(Service::Places, e))?;

        let parsed: SearchNearbyResponse = serde_json::from_str(&text)
            .map_err(|e| BotError::malformed(Service::Places, e.to_string()))?;

        debug!(count = parsed.places.len(), "places search returned");
        Ok(parsed.places)
    }

    /// Download the media for a photo reference such as `places/ID/photos/REF`.
    pub async fn place_photo(&self, photo_name: &str, size: PhotoSize) -> BotResult<Vec<u8>> {
        let url = self.endpoint(&format!("{}/media", photo_name.trim_matches('/')))?;
        let request = self.http.get(url).query(&[
            ("maxHeightPx", size.max_height.to_string()),
            ("maxWidthPx", size.max_width.to_string()),
            ("key", self.api_key.clone()),
        ]);
        fetch_bytes(Service::PlacePhoto, request).await
    }

    /// Download a Street View image looking at `location` (usually an address).
    pub async fn street_view(
        &self,
        location: &str,
        options: &StreetViewOptions,
    ) -> BotResult<Vec<u8>> {
        let request = self.http.get(self.street_view_url.clone()).query(&[
            ("size", options.size.clone()),
            ("location", location.to_string()),
            ("key", self.api_key.clone()),
            ("fov", options.fov.to_string()),
        ]);
        fetch_bytes(Service::StreetView, request).await
    }
}

fn parse_url(value: &str) -> BotResult<Url> {
    Url::parse(value).map_err(|e| BotError::Config(format!("invalid url {value}: {e}")))
}

async fn fetch_bytes(service: Service, request: reqwest::RequestBuilder) -> BotResult<Vec<u8>> {
    let response = request
        .send()
        .await
        .map_err(|e| BotError::network(service, e))?;
    let response = check_status(service, response).await?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| BotError::network(service, e))?;

    if bytes.is_empty() {
        return Err(BotError::malformed(service, "empty image body"));
    }

    Ok(bytes.to_vec())
}

/// Pass a successful response through, or turn the error body into `BotError::Status`.
async fn check_status(
    service: Service,
    response: reqwest::Response,
) -> BotResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let bytes = response.bytes().await.unwrap_or_default();
    let message = match serde_json::from_slice::<GoogleErrorBody>(&bytes) {
        Ok(body) => match body.error.status {
            Some(code) => format!("{code}: {}", body.error.message),
            None => body.error.message,
        },
        Err(_) => String::from_utf8_lossy(&bytes).trim().to_string(),
    };

    warn!(%service, status = status.as_u16(), reason = %message, "upstream request failed");

    Err(BotError::Status {
        service,
        status: status.as_u16(),
        message,
    })
}

// --- Places API types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchNearbyRequest<'a> {
    included_primary_types: &'a [String],
    location_restriction: LocationRestriction,
}

#[derive(Debug, Serialize)]
struct LocationRestriction {
    circle: Circle,
}

#[derive(Debug, Serialize)]
struct Circle {
    center: LatLng,
    radius: f64,
}

#[derive(Debug, Deserialize)]
struct SearchNearbyResponse {
    #[serde(default)]
    places: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    status: Option<String>,
}
