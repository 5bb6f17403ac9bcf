use std::io::Cursor;

use placebot::domain::caption::ImagePost;
use placebot::domain::{BotError, Poster, Service};
use placebot::infrastructure::bluesky::BlueskyClient;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{DID, POST_URI, TestEnv};

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

#[tokio::test]
async fn login_failure_reports_xrpc_error() {
    let env = TestEnv::start().await;
    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.server.createSession"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "AuthenticationRequired",
            "message": "Invalid identifier or password"
        })))
        .mount(&env.bluesky)
        .await;

    let result = BlueskyClient::from_base_url(&env.bluesky.uri())
        .unwrap()
        .login("bot.bsky.social", "wrong")
        .await;

    match result {
        Err(BotError::Status {
            service,
            status,
            message,
        }) => {
            assert_eq!(service, Service::Bluesky);
            assert_eq!(status, 401);
            assert_eq!(message, "AuthenticationRequired: Invalid identifier or password");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("login should fail"),
    }
}

#[tokio::test]
async fn post_uploads_blob_then_creates_record() {
    let env = TestEnv::start().await;
    let session = env.bluesky_session().await;
    assert_eq!(session.did(), DID);

    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.repo.uploadBlob"))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "blob": {
                "$type": "blob",
                "ref": { "$link": "bafkreipng" },
                "mimeType": "image/png",
                "size": 64
            }
        })))
        .expect(1)
        .mount(&env.bluesky)
        .await;
    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.repo.createRecord"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uri": POST_URI,
            "cid": "bafyreipng"
        })))
        .expect(1)
        .mount(&env.bluesky)
        .await;

    let post = ImagePost {
        text: "Drake Park at 777 NW Riverside Blvd".to_string(),
        alt: "An image from Google Maps of Drake Park at 777 NW Riverside Blvd".to_string(),
        image: png(16, 9),
    };

    let post_ref = session.post_image(&post).await.expect("post succeeds");
    assert_eq!(post_ref.uri, POST_URI);
    assert_eq!(post_ref.cid, "bafyreipng");

    let bodies = env.bluesky_bodies("/xrpc/com.atproto.repo.createRecord").await;
    let body = &bodies[0];
    assert_eq!(body["repo"], DID);
    assert_eq!(body["collection"], "app.bsky.feed.post");

    let record = &body["record"];
    assert_eq!(record["$type"], "app.bsky.feed.post");
    assert_eq!(record["text"], post.text);
    assert!(record["createdAt"].as_str().unwrap().ends_with('Z'));

    let image = &record["embed"]["images"][0];
    assert_eq!(record["embed"]["$type"], "app.bsky.embed.images");
    assert_eq!(image["alt"], post.alt);
    assert_eq!(image["image"]["ref"]["$link"], "bafkreipng");
    assert_eq!(image["aspectRatio"], json!({ "width": 16, "height": 9 }));
}
