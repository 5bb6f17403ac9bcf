pub mod config;
pub mod pipeline;

pub use config::{BotConfig, ImageSource};
pub use pipeline::{Pipeline, PostOutcome};
