use async_trait::async_trait;

use crate::domain::BotResult;
use crate::domain::caption::ImagePost;

/// Identifies a published post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRef {
    pub uri: String,
    pub cid: String,
}

impl PostRef {
    /// Placeholder for a post that was never published.
    pub fn dry_run() -> Self {
        Self {
            uri: String::new(),
            cid: String::new(),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.uri.is_empty()
    }
}

#[async_trait]
pub trait Poster: Send + Sync {
    async fn post_image(&self, post: &ImagePost) -> BotResult<PostRef>;
}

/// Logs the post instead of publishing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunPoster;

#[async_trait]
impl Poster for DryRunPoster {
    async fn post_image(&self, post: &ImagePost) -> BotResult<PostRef> {
        tracing::info!(
            text = %post.text,
            alt = %post.alt,
            bytes = post.image.len(),
            "dry run, not posting"
        );
        Ok(PostRef::dry_run())
    }
}
