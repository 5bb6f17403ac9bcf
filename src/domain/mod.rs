pub mod caption;
pub mod categories;
pub mod errors;
pub mod places;
pub mod posting;

// Re-exports
pub use errors::{BotError, BotResult, Service};
pub use posting::{DryRunPoster, PostRef, Poster};
