mod bluesky;
mod helpers;
