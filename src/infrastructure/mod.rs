pub mod bluesky;
pub mod images;
pub mod places;
