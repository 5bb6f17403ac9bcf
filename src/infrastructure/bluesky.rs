use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::caption::ImagePost;
use crate::domain::{BotError, BotResult, PostRef, Poster, Service};

pub const BLUESKY_PDS_URL: &str = "https://bsky.social";

const USER_AGENT: &str = "placebot/1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const FALLBACK_MIME: &str = "image/jpeg";

const POST_COLLECTION: &str = "app.bsky.feed.post";
const IMAGES_EMBED: &str = "app.bsky.embed.images";

/// Unauthenticated XRPC client for a Bluesky PDS.
pub struct BlueskyClient {
    http: Client,
    pds_url: Url,
}

impl BlueskyClient {
    pub fn new(pds_url: Url) -> BotResult<Self> {
        let mut normalized = pds_url;
        if !normalized.path().ends_with('/') {
            normalized.set_path(&format!("{}/", normalized.path().trim_end_matches('/')));
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BotError::Config(format!("failed to configure HTTP client: {e}")))?;

        Ok(Self {
            http,
            pds_url: normalized,
        })
    }

    pub fn from_base_url(pds_url: &str) -> BotResult<Self> {
        let url = Url::parse(pds_url)
            .map_err(|e| BotError::Config(format!("invalid bluesky url {pds_url}: {e}")))?;
        Self::new(url)
    }

    /// Create a session with a handle (or email) and an app password.
    pub async fn login(self, identifier: &str, password: &str) -> BotResult<BlueskySession> {
        let url = xrpc_endpoint(&self.pds_url, "com.atproto.server.createSession")?;
        let response = self
            .http
            .post(url)
            .json(&CreateSessionRequest {
                identifier,
                password,
            })
            .send()
            .await
            .map_err(|e| BotError::network(Service::Bluesky, e))?;

        let session: CreateSessionResponse = handle_response(response).await?;
        info!(handle = %session.handle, "logged in to bluesky");

        Ok(BlueskySession {
            http: self.http,
            pds_url: self.pds_url,
            did: session.did,
            access_jwt: session.access_jwt,
        })
    }
}

/// A logged-in Bluesky account that can publish posts.
pub struct BlueskySession {
    http: Client,
    pds_url: Url,
    did: String,
    access_jwt: String,
}

impl BlueskySession {
    pub fn did(&self) -> &str {
        &self.did
    }

    async fn upload_blob(&self, bytes: Vec<u8>, mime: &str) -> BotResult<serde_json::Value> {
        let url = xrpc_endpoint(&self.pds_url, "com.atproto.repo.uploadBlob")?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_jwt)
            .header(reqwest::header::CONTENT_TYPE, mime)
            .body(bytes)
            .send()
            .await
            .map_err(|e| BotError::network(Service::Bluesky, e))?;

        let uploaded: UploadBlobResponse = handle_response(response).await?;
        Ok(uploaded.blob)
    }

    async fn create_post(&self, record: PostRecord<'_>) -> BotResult<PostRef> {
        let url = xrpc_endpoint(&self.pds_url, "com.atproto.repo.createRecord")?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_jwt)
            .json(&CreateRecordRequest {
                repo: &self.did,
                collection: POST_COLLECTION,
                record,
            })
            .send()
            .await
            .map_err(|e| BotError::network(Service::Bluesky, e))?;

        let created: CreateRecordResponse = handle_response(response).await?;
        Ok(PostRef {
            uri: created.uri,
            cid: created.cid,
        })
    }
}

#[async_trait]
impl Poster for BlueskySession {
    async fn post_image(&self, post: &ImagePost) -> BotResult<PostRef> {
        let mime = sniff_mime(&post.image);
        let aspect_ratio = aspect_ratio(&post.image);
        let blob = self.upload_blob(post.image.clone(), mime).await?;

        let record = PostRecord {
            kind: POST_COLLECTION,
            text: &post.text,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            embed: ImagesEmbed {
                kind: IMAGES_EMBED,
                images: vec![EmbeddedImage {
                    alt: &post.alt,
                    image: blob,
                    aspect_ratio,
                }],
            },
        };

        let post_ref = self.create_post(record).await?;
        info!(uri = %post_ref.uri, "created bluesky post");
        Ok(post_ref)
    }
}

fn xrpc_endpoint(base: &Url, method: &str) -> BotResult<Url> {
    base.join(&format!("xrpc/{method}"))
        .map_err(|e| BotError::Config(format!("invalid xrpc method {method}: {e}")))
}

async fn handle_response<T>(response: reqwest::Response) -> BotResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| BotError::network(Service::Bluesky, e))?;

    if status.is_success() {
        return serde_json::from_slice(&bytes)
            .map_err(|e| BotError::malformed(Service::Bluesky, e.to_string()));
    }

    let message = match serde_json::from_slice::<XrpcError>(&bytes) {
        Ok(err) => match err.message {
            Some(message) => format!("{}: {message}", err.error),
            None => err.error,
        },
        Err(_) => String::from_utf8_lossy(&bytes).trim().to_string(),
    };

    warn!(status = status.as_u16(), reason = %message, "bluesky request failed");

    Err(BotError::Status {
        service: Service::Bluesky,
        status: status.as_u16(),
        message,
    })
}

/// MIME type from the image's magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes).map_or(FALLBACK_MIME, |format| format.to_mime_type())
}

fn aspect_ratio(bytes: &[u8]) -> Option<AspectRatio> {
    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()?;
    Some(AspectRatio { width, height })
}

// --- XRPC types ---

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    did: String,
    handle: String,
    access_jwt: String,
}

#[derive(Debug, Deserialize)]
struct UploadBlobResponse {
    blob: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct CreateRecordRequest<'a> {
    repo: &'a str,
    collection: &'a str,
    record: PostRecord<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostRecord<'a> {
    #[serde(rename = "$type")]
    kind: &'a str,
    text: &'a str,
    created_at: String,
    embed: ImagesEmbed<'a>,
}

#[derive(Debug, Serialize)]
struct ImagesEmbed<'a> {
    #[serde(rename = "$type")]
    kind: &'a str,
    images: Vec<EmbeddedImage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddedImage<'a> {
    alt: &'a str,
    image: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect_ratio: Option<AspectRatio>,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct AspectRatio {
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct CreateRecordResponse {
    uri: String,
    cid: String,
}

#[derive(Debug, Deserialize)]
struct XrpcError {
    error: String,
    message: Option<String>,
}
