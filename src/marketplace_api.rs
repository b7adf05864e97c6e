// Functions to interact with the upstream marketplace REST API (listing
// search, facet option lists, item details, lead capture).
//
// All responses go through `normalize` before leaving this module so the rest
// of the code only ever sees the canonical shapes.

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::Settings;
use crate::error::AppError;
use crate::facets::FacetSpec;
use crate::models::{Category, EnquiryForm, FacetOption, Item, RatingForm};
use crate::normalize;
use crate::pagination::PageInfo;

/// Builds the shared HTTP client. No per-request timeouts or cancellation;
/// staleness is handled by the session's generation counter instead.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!("marketfront_rust/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build reqwest client")
}

/// Unified listing search: GET `/filter` with page + cleaned facet params
/// (+ coordinates). Returns normalized items and pagination fields.
pub async fn search_listings(
    client: &Client,
    settings: &Settings,
    page: u32,
    params: &[(String, String)],
) -> Result<(Vec<Item>, PageInfo), AppError> {
    let url = settings.api_url("filter");
    tracing::debug!(url = %url, page, params = ?params, "searching listings");

    let response = client.get(&url).query(params).send().await?;
    let raw = check_status(response).await?;
    Ok(normalize::listing_page(&raw, page))
}

/// Fetches one facet's option list from its dedicated endpoint.
pub async fn fetch_facet_options(
    client: &Client,
    settings: &Settings,
    spec: &FacetSpec,
) -> Result<Vec<FacetOption>, AppError> {
    let url = settings.api_url(spec.path);
    tracing::debug!(url = %url, facet = spec.key, "fetching facet options");

    let response = client.get(&url).send().await?;
    let raw = check_status(response).await?;
    Ok(normalize::option_list(&raw, spec.active_only))
}

/// Fetches a single item by slug, e.g. GET `/gbike/{slug}`.
pub async fn fetch_item(
    client: &Client,
    settings: &Settings,
    category: Category,
    slug: &str,
) -> Result<Option<Item>, AppError> {
    let url = settings.api_url(&format!("{}/{}", category.api_prefix(), slug));
    tracing::debug!(url = %url, "fetching item detail");

    let response = client.get(&url).send().await?;
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let raw = check_status(response).await?;

    // Detail responses are `{"data": {...}}` or the bare object.
    let body = raw.get("data").unwrap_or(&raw);
    match serde_json::from_value::<Item>(body.clone()) {
        Ok(item) => Ok(Some(item)),
        Err(e) => {
            tracing::warn!(slug, error = %e, "malformed item detail, treating as not found");
            Ok(None)
        }
    }
}

/// Popular list for a category, e.g. GET `/gbike/populer/list`.
/// ("populer" is the upstream's spelling.)
pub async fn fetch_popular(
    client: &Client,
    settings: &Settings,
    category: Category,
) -> Result<Vec<Item>, AppError> {
    let url = settings.api_url(&format!("{}/populer/list", category.api_prefix()));
    let response = client.get(&url).send().await?;
    let raw = check_status(response).await?;
    Ok(normalize::item_list(&raw))
}

/// Hero banner images: GET `/sliderimage?category_id=N`.
pub async fn fetch_slider_images(
    client: &Client,
    settings: &Settings,
    category_id: u32,
) -> Result<Vec<Item>, AppError> {
    let url = settings.api_url("sliderimage");
    let response = client
        .get(&url)
        .query(&[("category_id", category_id.to_string())])
        .send()
        .await?;
    let raw = check_status(response).await?;
    Ok(normalize::item_list(&raw))
}

/// Adds or removes a wishlist entry. Requires the caller's bearer token.
pub async fn set_wishlist(
    client: &Client,
    settings: &Settings,
    item_id: i64,
    wanted: bool,
    bearer: &str,
) -> Result<(), AppError> {
    let request = if wanted {
        client
            .post(settings.api_url("wishlist"))
            .json(&json!({ "item_id": item_id }))
    } else {
        client.delete(settings.api_url(&format!("wishlist/{}", item_id)))
    };

    let response = request.bearer_auth(bearer).send().await?;
    check_status(response).await?;
    Ok(())
}

/// Submits an enquiry: POST `/enquiry/store`.
pub async fn post_enquiry(
    client: &Client,
    settings: &Settings,
    form: &EnquiryForm,
) -> Result<Value, AppError> {
    let response = client
        .post(settings.api_url("enquiry/store"))
        .json(form)
        .send()
        .await?;
    check_status(response).await
}

/// Submits a star rating: POST `/rating`.
pub async fn post_rating(
    client: &Client,
    settings: &Settings,
    form: &RatingForm,
    bearer: Option<&str>,
) -> Result<Value, AppError> {
    let mut request = client.post(settings.api_url("rating")).json(form);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }
    let response = request.send().await?;
    check_status(response).await
}

// Maps non-success statuses through the error taxonomy, preferring the
// upstream body's "message" when one exists, then parses the JSON body.
async fn check_status(response: reqwest::Response) -> Result<Value, AppError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<Value>()
            .await
            .ok()
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string);
        return Err(AppError::from_upstream_status(status, message));
    }

    match response.json::<Value>().await {
        Ok(body) => Ok(body),
        Err(e) => {
            // A non-JSON 200 degrades to "nothing there" rather than erroring.
            tracing::warn!(error = %e, "upstream returned non-JSON success body");
            Ok(Value::Null)
        }
    }
}
