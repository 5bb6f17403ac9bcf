use anyhow::Result;
use clap::Parser;
use placebot::application::Pipeline;
use placebot::domain::{DryRunPoster, Poster};
use placebot::infrastructure::bluesky::BlueskyClient;
use placebot::infrastructure::images::ImageStore;
use placebot::infrastructure::places::PlacesClient;
use placebot::presentation::cli::Cli;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();
    let config = cli.bot_config();
    config.validate()?;

    let places = PlacesClient::from_urls(
        cli.google_api_key.clone(),
        &cli.places_url,
        &cli.street_view_url,
    )?;
    let store = ImageStore::new(&cli.images_dir);

    let poster: Box<dyn Poster> = match cli.credentials()? {
        Some(credentials) => {
            let client = BlueskyClient::from_base_url(&cli.bluesky_pds_url)?;
            Box::new(
                client
                    .login(&credentials.username, &credentials.password)
                    .await?,
            )
        }
        None => Box::new(DryRunPoster),
    };

    let mut rng = StdRng::from_os_rng();
    match Pipeline::new(&config, &places, &store, poster.as_ref())
        .run(&mut rng)
        .await
    {
        Ok(outcome) if outcome.post.is_dry_run() => {
            tracing::info!(
                name = %outcome.place.name,
                address = %outcome.place.address,
                attempts = outcome.attempts,
                bytes = outcome.image_bytes,
                "dry run complete, nothing posted"
            );
            Ok(())
        }
        Ok(outcome) => {
            tracing::info!(
                name = %outcome.place.name,
                address = %outcome.place.address,
                attempts = outcome.attempts,
                bytes = outcome.image_bytes,
                uri = %outcome.post.uri,
                "just posted"
            );
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "run failed");
            Err(err.into())
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}
