// Handlers for the browsing API. Each one resolves category/filters, calls
// the upstream through the normalizing client, and shapes the canonical
// response the pages consume.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Json as JsonExtract, Path, Query, State},
    response::{IntoResponse, Json},
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde::Serialize;
use serde_json::Value;

use crate::{
    detail::MapPoint,
    error::AppError,
    facets,
    filters::{FilterState, FilterValue},
    marketplace_api,
    models::{Category, EnquiryForm, FacetOption, Item, RatingForm, WishlistRequest},
    pagination::Feed,
    session::{ListingBackend, MarketplaceBackend},
    validate, AppState,
};

// --- Response Wrappers ---

#[derive(Serialize)]
struct FeedResponse {
    success: bool,
    items: Vec<Item>,
    current_page: u32,
    last_page: u32,
    total: u64,
    has_more: bool,
}

#[derive(Serialize)]
struct OptionsResponse {
    success: bool,
    options: Vec<FacetOption>,
}

#[derive(Serialize)]
struct ItemResponse {
    success: bool,
    item: Item,
    map: Option<MapPoint>,
    maps_url: Option<String>,
}

#[derive(Serialize)]
struct ItemListResponse {
    success: bool,
    items: Vec<Item>,
}

#[derive(Serialize)]
struct GenericResponse {
    success: bool,
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating_invited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

// --- Helpers ---

fn parse_category(slug: &str) -> Result<Category, AppError> {
    Category::from_slug(slug)
        .ok_or_else(|| AppError::NotFound(format!("Unknown category '{}'", slug)))
}

fn require_bearer(
    auth: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<String, AppError> {
    auth.map(|TypedHeader(header)| header.token().to_string())
        .ok_or_else(|| AppError::Unauthorized("Please login to continue.".to_string()))
}

// Rebuilds a FilterState from the incoming query string. Comma-joined values
// expand back into multi-selects; page and coordinates are not facets.
fn filters_from_query(category: Category, query: &HashMap<String, String>) -> FilterState {
    let mut state = FilterState::defaults(category);
    for (key, raw) in query {
        if matches!(key.as_str(), "page" | "latitude" | "longitude") {
            continue;
        }
        let values: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        state.set(key, FilterValue::from_selected(&values));
    }
    state
}

// --- API Handlers ---

pub async fn get_listings(
    State(app_state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let category = parse_category(&category)?;
    let page: u32 = query
        .get("page")
        .and_then(|p| p.parse().ok())
        .filter(|&p| p >= 1)
        .unwrap_or(1);
    tracing::info!(category = category.slug(), page, "listing request");

    let filters = filters_from_query(category, &query);

    // Coordinates: explicit query params win, else the cached location.
    let explicit = match (query.get("latitude"), query.get("longitude")) {
        (Some(lat), Some(lng)) => match (lat.parse::<f64>(), lng.parse::<f64>()) {
            (Ok(latitude), Ok(longitude)) => Some((latitude, longitude)),
            _ => None,
        },
        _ => None,
    };
    let cached = app_state.locations.selected_location();

    let mut params = filters.query_params(page, None);
    match (explicit, cached) {
        (Some((lat, lng)), _) => {
            params.push(("latitude".to_string(), lat.to_string()));
            params.push(("longitude".to_string(), lng.to_string()));
        }
        (None, Some(loc)) => {
            params.push(("latitude".to_string(), loc.latitude.to_string()));
            params.push(("longitude".to_string(), loc.longitude.to_string()));
        }
        (None, None) => {}
    }

    let backend = MarketplaceBackend {
        client: Arc::clone(&app_state.http_client),
        settings: Arc::clone(&app_state.settings),
    };
    let (items, info) = backend.fetch_page(page, params).await?;

    let mut feed = Feed::default();
    feed.apply_page(page, items, &info);

    Ok(Json(FeedResponse {
        success: true,
        items: feed.items,
        current_page: feed.current_page,
        last_page: feed.last_page,
        total: feed.total,
        has_more: feed.has_more,
    }))
}

pub async fn get_facet_options(
    State(app_state): State<AppState>,
    Path((category, key)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let category = parse_category(&category)?;
    let spec = facets::find(category, &key).ok_or_else(|| {
        AppError::NotFound(format!(
            "Unknown facet '{}' for category '{}'",
            key,
            category.slug()
        ))
    })?;

    let options = facets::options(&app_state.http_client, &app_state.settings, spec).await;
    Ok(Json(OptionsResponse {
        success: true,
        options,
    }))
}

pub async fn get_item(
    State(app_state): State<AppState>,
    Path((category, slug)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let category = parse_category(&category)?;
    tracing::info!(category = category.slug(), slug = %slug, "item detail request");

    let item = marketplace_api::fetch_item(&app_state.http_client, &app_state.settings, category, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No listing found for '{}'", slug)))?;

    let map = MapPoint::for_item(&item);
    let maps_url = map.as_ref().map(MapPoint::maps_url);
    Ok(Json(ItemResponse {
        success: true,
        item,
        map,
        maps_url,
    }))
}

pub async fn get_popular(
    State(app_state): State<AppState>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let category = parse_category(&category)?;
    let items =
        marketplace_api::fetch_popular(&app_state.http_client, &app_state.settings, category)
            .await?;
    Ok(Json(ItemListResponse {
        success: true,
        items,
    }))
}

pub async fn get_slider_images(
    State(app_state): State<AppState>,
    Path(category_id): Path<u32>,
) -> Result<impl IntoResponse, AppError> {
    let items = marketplace_api::fetch_slider_images(
        &app_state.http_client,
        &app_state.settings,
        category_id,
    )
    .await?;
    Ok(Json(ItemListResponse {
        success: true,
        items,
    }))
}

pub async fn add_wishlist(
    State(app_state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    JsonExtract(request): JsonExtract<WishlistRequest>,
) -> Result<impl IntoResponse, AppError> {
    let token = require_bearer(auth)?;
    marketplace_api::set_wishlist(
        &app_state.http_client,
        &app_state.settings,
        request.item_id,
        true,
        &token,
    )
    .await?;
    Ok(Json(GenericResponse {
        success: true,
        message: Some("Added to wishlist.".to_string()),
        rating_invited: None,
        data: None,
    }))
}

pub async fn remove_wishlist(
    State(app_state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let token = require_bearer(auth)?;
    marketplace_api::set_wishlist(
        &app_state.http_client,
        &app_state.settings,
        item_id,
        false,
        &token,
    )
    .await?;
    Ok(Json(GenericResponse {
        success: true,
        message: Some("Removed from wishlist.".to_string()),
        rating_invited: None,
        data: None,
    }))
}

pub async fn post_enquiry(
    State(app_state): State<AppState>,
    JsonExtract(form): JsonExtract<EnquiryForm>,
) -> Result<impl IntoResponse, AppError> {
    validate::validate_enquiry(&form)?;
    tracing::info!(item_id = form.item_id, "enquiry submission");

    let data =
        marketplace_api::post_enquiry(&app_state.http_client, &app_state.settings, &form).await?;

    // A stored enquiry invites the star-rating follow-up modal.
    Ok(Json(GenericResponse {
        success: true,
        message: Some("Enquiry submitted.".to_string()),
        rating_invited: Some(true),
        data: Some(data),
    }))
}

pub async fn post_rating(
    State(app_state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    JsonExtract(form): JsonExtract<RatingForm>,
) -> Result<impl IntoResponse, AppError> {
    validate::validate_rating(&form)?;

    let bearer = auth.as_ref().map(|TypedHeader(header)| header.token().to_string());
    let data = marketplace_api::post_rating(
        &app_state.http_client,
        &app_state.settings,
        &form,
        bearer.as_deref(),
    )
    .await?;

    Ok(Json(GenericResponse {
        success: true,
        message: Some("Thanks for your feedback.".to_string()),
        rating_invited: None,
        data: Some(data),
    }))
}
