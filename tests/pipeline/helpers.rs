use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use placebot::domain::caption::ImagePost;
use placebot::domain::{BotResult, PostRef, Poster};
use placebot::infrastructure::bluesky::{BlueskyClient, BlueskySession};
use placebot::infrastructure::images::ImageStore;
use placebot::infrastructure::places::PlacesClient;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const HANDLE: &str = "bot.bsky.social";
pub const APP_PASSWORD: &str = "app-password";
pub const DID: &str = "did:plc:testbot";
pub const ACCESS_JWT: &str = "access-token";
pub const POST_URI: &str = "at://did:plc:testbot/app.bsky.feed.post/3kplacebot";

/// Mock Google and Bluesky servers plus a scratch images directory.
pub struct TestEnv {
    pub google: MockServer,
    pub bluesky: MockServer,
    images: TempDir,
}

impl TestEnv {
    pub async fn start() -> Self {
        Self {
            google: MockServer::start().await,
            bluesky: MockServer::start().await,
            images: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn places_client(&self) -> PlacesClient {
        PlacesClient::from_urls(
            API_KEY.to_string(),
            &format!("{}/v1/", self.google.uri()),
            &format!("{}/maps/api/streetview", self.google.uri()),
        )
        .expect("Failed to build places client")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.images.path().join("images")
    }

    pub fn store(&self) -> ImageStore {
        ImageStore::new(self.images_dir())
    }

    /// Files left in the images directory.
    pub fn leftover_images(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.images_dir()) {
            Ok(entries) => entries.map(|e| e.expect("dir entry").path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub async fn bluesky_session(&self) -> BlueskySession {
        Mock::given(method("POST"))
            .and(path("/xrpc/com.atproto.server.createSession"))
            .and(body_partial_json(
                json!({ "identifier": HANDLE, "password": APP_PASSWORD }),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "did": DID,
                "handle": HANDLE,
                "accessJwt": ACCESS_JWT,
                "refreshJwt": "refresh-token",
                "active": true
            })))
            .mount(&self.bluesky)
            .await;

        BlueskyClient::from_base_url(&self.bluesky.uri())
            .expect("Failed to build bluesky client")
            .login(HANDLE, APP_PASSWORD)
            .await
            .expect("Failed to log in")
    }

    /// Mount blob upload and record creation, each expected `times` times.
    pub async fn mount_bluesky_post(&self, times: u64) {
        Mock::given(method("POST"))
            .and(path("/xrpc/com.atproto.repo.uploadBlob"))
            .and(header("authorization", format!("Bearer {ACCESS_JWT}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "blob": {
                    "$type": "blob",
                    "ref": { "$link": "bafkreitestblob" },
                    "mimeType": "image/jpeg",
                    "size": 1
                }
            })))
            .expect(times)
            .mount(&self.bluesky)
            .await;

        Mock::given(method("POST"))
            .and(path("/xrpc/com.atproto.repo.createRecord"))
            .and(header("authorization", format!("Bearer {ACCESS_JWT}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uri": POST_URI,
                "cid": "bafyreitestcid"
            })))
            .expect(times)
            .mount(&self.bluesky)
            .await;
    }

    pub async fn mount_search(&self, body: Value) {
        self.mount_search_times(body, None).await;
    }

    pub async fn mount_search_times(&self, body: Value, times: Option<u64>) {
        let mock = Mock::given(method("POST"))
            .and(path("/v1/places:searchNearby"))
            .and(header("X-Goog-Api-Key", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(body));
        let mock = match times {
            Some(n) => mock.expect(n),
            None => mock,
        };
        mock.mount(&self.google).await;
    }

    pub async fn mount_photo(&self, photo_name: &str, bytes: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/{photo_name}/media")))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(bytes),
            )
            .mount(&self.google)
            .await;
    }

    /// JSON bodies of every request made to `endpoint` on the Bluesky mock.
    pub async fn bluesky_bodies(&self, endpoint: &str) -> Vec<Value> {
        self.bluesky
            .received_requests()
            .await
            .expect("request recording enabled")
            .into_iter()
            .filter(|r| r.url.path() == endpoint)
            .map(|r| serde_json::from_slice(&r.body).expect("JSON body"))
            .collect()
    }
}

pub fn place_json(address: &str, name: &str, photos: &[(&str, u32, u32)]) -> Value {
    let photos: Vec<Value> = photos
        .iter()
        .map(|(name, width, height)| json!({ "name": name, "widthPx": width, "heightPx": height }))
        .collect();

    json!({
        "shortFormattedAddress": address,
        "displayName": { "text": name, "languageCode": "en" },
        "photos": photos,
        "location": { "latitude": 44.0594, "longitude": -121.3153 }
    })
}

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Records posts instead of publishing them.
#[derive(Default)]
pub struct RecordingPoster {
    posts: Mutex<Vec<ImagePost>>,
}

impl RecordingPoster {
    pub fn posts(&self) -> Vec<ImagePost> {
        self.posts.lock().expect("poster lock").clone()
    }
}

#[async_trait]
impl Poster for RecordingPoster {
    async fn post_image(&self, post: &ImagePost) -> BotResult<PostRef> {
        self.posts.lock().expect("poster lock").push(post.clone());
        Ok(PostRef {
            uri: POST_URI.to_string(),
            cid: "bafyreitestcid".to_string(),
        })
    }
}

/// Deletes every saved image while "posting", so the pipeline's own cleanup fails.
pub struct PurgingPoster {
    dir: PathBuf,
}

impl PurgingPoster {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl Poster for PurgingPoster {
    async fn post_image(&self, _post: &ImagePost) -> BotResult<PostRef> {
        for entry in std::fs::read_dir(&self.dir)? {
            std::fs::remove_file(entry?.path())?;
        }
        Ok(PostRef {
            uri: POST_URI.to_string(),
            cid: "bafyreitestcid".to_string(),
        })
    }
}
