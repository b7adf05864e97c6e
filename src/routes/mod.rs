// Route definitions

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::AppState;

mod api;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/:category/listings", get(api::get_listings))
        .route("/api/:category/facets/:key", get(api::get_facet_options))
        .route("/api/:category/items/:slug", get(api::get_item))
        .route("/api/:category/popular", get(api::get_popular))
        .route("/api/sliders/:category_id", get(api::get_slider_images))
        .route("/api/wishlist", post(api::add_wishlist))
        .route("/api/wishlist/:item_id", delete(api::remove_wishlist))
        .route("/api/enquiry", post(api::post_enquiry))
        .route("/api/rating", post(api::post_rating))
        .with_state(app_state)
}
