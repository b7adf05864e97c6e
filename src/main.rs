use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use marketfront_rust::{
    config::Settings, facets, location::LocationStore, marketplace_api, models::Category, routes,
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env first; ignore a missing file.
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketfront_rust=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("Initializing marketfront server...");

    // Load configuration
    let settings = match Settings::new() {
        Ok(s) => {
            tracing::info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };
    let shared_settings = Arc::new(settings);

    facets::set_cache_ttl(shared_settings.facet_cache_ttl_secs);

    let http_client = Arc::new(marketplace_api::build_client()?);
    tracing::info!("Shared HTTP client created.");

    let locations = Arc::new(LocationStore::new(&shared_settings.local_cache_path));

    let app_state = AppState {
        settings: shared_settings.clone(),
        http_client: http_client.clone(),
        locations,
    };

    // Pre-fill the facet option caches in the background so the first filter
    // panel mount doesn't pay for every option-list fetch.
    {
        let client = http_client.clone();
        let settings = shared_settings.clone();
        tokio::spawn(async move {
            for category in [
                Category::Bike,
                Category::Car,
                Category::Property,
                Category::Electronics,
            ] {
                facets::warm_up(&client, &settings, category).await;
            }
        });
    }

    let router: Router = routes::create_router(app_state.clone());
    let app = router.layer(TraceLayer::new_for_http());

    let addr: SocketAddr = app_state.settings.server_address.parse().with_context(|| {
        format!(
            "Invalid server address format: {}",
            app_state.settings.server_address
        )
    })?;

    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => {
            tracing::info!("Server listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
