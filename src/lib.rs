// Customer-facing browsing service for a multi-category classifieds
// marketplace (bikes, cars, property, electronics). Wraps the upstream REST
// API with typed filter state, one envelope normalizer, a pagination reducer,
// and the debounced filter-apply session the listing pages share.

use std::sync::Arc;

use axum::extract::FromRef;
use reqwest::Client;

pub mod config;
pub mod detail;
pub mod error;
pub mod facets;
pub mod filters;
pub mod location;
pub mod marketplace_api;
pub mod models;
pub mod normalize;
pub mod pagination;
pub mod routes;
pub mod session;
pub mod validate;

use crate::config::Settings;
use crate::location::LocationStore;

// Shared application state.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub http_client: Arc<Client>,
    pub locations: Arc<LocationStore>,
}
