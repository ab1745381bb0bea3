use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use where2_core::{
    config::mask_secret,
    images::{ImageFinder, ImageSource, PlacePhotoSource, SerpApiImageSource},
    llm::OpenAiClient,
    load_config, load_config_from_env,
    maps::{GoogleMapsClient, MapsProvider},
    suggest::Enricher,
    validate_config,
    weather::OpenWeatherClient,
    ActivityStore, Config, SuggestionPipeline,
};
use where2_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let json = std::env::var("WHERE2_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Load from `WHERE2_CONFIG`, else `config.toml`, else the environment alone.
fn load() -> Result<Config> {
    if let Ok(path) = std::env::var("WHERE2_CONFIG") {
        let path = PathBuf::from(path);
        info!("Loading configuration from {:?}", path);
        return load_config(&path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }

    let path = PathBuf::from("config.toml");
    if path.exists() {
        info!("Loading configuration from {:?}", path);
        load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
    } else {
        info!("No config.toml found, using defaults and environment");
        load_config_from_env().context("Failed to load config from environment")
    }
}

fn build_pipeline(config: &Config, store: Arc<ActivityStore>) -> SuggestionPipeline {
    let chat = Arc::new(OpenAiClient::from_config(&config.openai));
    let weather = Arc::new(OpenWeatherClient::new(config.weather.clone()));
    let maps: Arc<dyn MapsProvider> = Arc::new(GoogleMapsClient::new(config.maps.clone()));

    let mut images = ImageFinder::new(&config.images.placeholder_url).with_source(Arc::new(
        PlacePhotoSource::new(maps.clone(), config.images.photo_max_width),
    ));
    if let Some(key) = config
        .images
        .serpapi_api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
    {
        debug!("SerpAPI key: {}", mask_secret(key));
        let serpapi: Arc<dyn ImageSource> = Arc::new(SerpApiImageSource::new(
            key,
            &config.images.serpapi_base,
            Duration::from_secs(config.images.timeout_secs as u64),
        ));
        images = images.with_source(serpapi);
    }
    info!("Image sources: {:?}", images.source_names());

    let enricher = Enricher::new(maps, Arc::new(images))
        .with_walking_threshold(config.maps.walking_threshold_min)
        .with_geocode_refinement(config.maps.geocode_refinement);

    SuggestionPipeline::new(
        chat,
        weather,
        enricher,
        store,
        config.openai.clone(),
        config.suggest.clone(),
    )
}

async fn run() -> Result<()> {
    init_tracing();

    let config = load()?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully (version {})", VERSION);
    info!("Environment: {:?}", config.environment);
    info!(
        "Models: {} (default), {} (reasoning)",
        config.openai.model, config.openai.reasoning_model
    );
    for key in config.missing_api_keys() {
        warn!("{} is not set, requests that need it will fail", key);
    }
    debug!("OpenAI key: {}", mask_secret(&config.openai.api_key));
    debug!("Weather key: {}", mask_secret(&config.weather.api_key));
    debug!("Maps key: {}", mask_secret(&config.maps.api_key));

    let store = Arc::new(ActivityStore::new());
    let pipeline = build_pipeline(&config, store);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, pipeline));
    let app = create_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
