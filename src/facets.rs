// The generic multi-select remote facet.
//
// Every filterable attribute follows the same lifecycle (fetch an option
// list, track a selection, collapse it into the filter state), so one
// `FacetSpec` per facet carries everything that actually differs: the filter
// key, the option-list endpoint, the category it belongs to, and whether
// inactive entries should be dropped.

use std::sync::Mutex;

use cached::stores::TimedCache;
use cached::Cached;
use once_cell::sync::Lazy;
use reqwest::Client;

use crate::config::Settings;
use crate::filters::{FilterState, FilterValue};
use crate::marketplace_api;
use crate::models::{Category, FacetOption};

#[derive(Debug, Clone, Copy)]
pub struct FacetSpec {
    /// Key under which selections land in the filter state / query string.
    pub key: &'static str,
    /// Upstream endpoint serving this facet's option list.
    pub path: &'static str,
    /// `None` marks a facet shared across every category.
    pub category: Option<Category>,
    /// Drop options not flagged active by the upstream.
    pub active_only: bool,
}

// Endpoint paths are the upstream's own, spelling quirks included.
static REGISTRY: &[FacetSpec] = &[
    // Shared
    FacetSpec { key: "price_range", path: "price-ranges", category: None, active_only: false },
    FacetSpec { key: "listed_by_id", path: "listed-by", category: None, active_only: false },
    // Bike
    FacetSpec { key: "brand_id", path: "bike/get/brands", category: Some(Category::Bike), active_only: true },
    FacetSpec { key: "kilometers_id", path: "bike/get/kilometers", category: Some(Category::Bike), active_only: false },
    FacetSpec { key: "fuel_type_id", path: "bike/get/fueltypes", category: Some(Category::Bike), active_only: true },
    FacetSpec { key: "owner_id", path: "bike/get/owners", category: Some(Category::Bike), active_only: false },
    // Car
    FacetSpec { key: "brand_id", path: "car/get/brands", category: Some(Category::Car), active_only: true },
    FacetSpec { key: "model_id", path: "car/get/models", category: Some(Category::Car), active_only: true },
    FacetSpec { key: "kilometers_id", path: "car/get/kilometers", category: Some(Category::Car), active_only: false },
    FacetSpec { key: "fuel_type_id", path: "car/get/fueltypes", category: Some(Category::Car), active_only: true },
    FacetSpec { key: "transmission_id", path: "car/get/transmissions", category: Some(Category::Car), active_only: false },
    FacetSpec { key: "owner_id", path: "car/get/owners", category: Some(Category::Car), active_only: false },
    // Property
    FacetSpec { key: "bedroom_id", path: "property/getbedrooms", category: Some(Category::Property), active_only: false },
    FacetSpec { key: "bathroom_id", path: "property/getbathrooms", category: Some(Category::Property), active_only: false },
    FacetSpec { key: "furnishing_id", path: "furnishing-types", category: Some(Category::Property), active_only: true },
    FacetSpec { key: "construction_status_id", path: "construction-statuses", category: Some(Category::Property), active_only: true },
    FacetSpec { key: "building_direction_id", path: "building-directions", category: Some(Category::Property), active_only: false },
];

pub fn registry() -> &'static [FacetSpec] {
    REGISTRY
}

/// Facets applicable to one category (shared facets included).
pub fn registry_for(category: Category) -> impl Iterator<Item = &'static FacetSpec> {
    REGISTRY
        .iter()
        .filter(move |spec| spec.category.is_none() || spec.category == Some(category))
}

pub fn find(category: Category, key: &str) -> Option<&'static FacetSpec> {
    registry_for(category).find(|spec| spec.key == key)
}

/// Selection state of one facet section: the `selected[]` array plus its
/// collapse back into the shared filter state.
#[derive(Debug, Clone)]
pub struct FacetSelection {
    key: String,
    selected: Vec<String>,
}

impl FacetSelection {
    pub fn new(key: &str) -> Self {
        FacetSelection {
            key: key.to_string(),
            selected: Vec::new(),
        }
    }

    /// Re-syncs from the shared filter state (the prop-change path).
    pub fn sync_from(&mut self, state: &FilterState) {
        self.selected = state.get(&self.key).selected();
    }

    /// Adds the value if absent, removes it if present.
    pub fn toggle(&mut self, value: &str) {
        if let Some(pos) = self.selected.iter().position(|v| v == value) {
            self.selected.remove(pos);
        } else {
            self.selected.push(value.to_string());
        }
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn collapse(&self) -> FilterValue {
        FilterValue::from_selected(&self.selected)
    }

    /// Writes the collapsed value back into the shared state.
    pub fn write_into(&self, state: &mut FilterState) {
        state.set(&self.key, self.collapse());
    }
}

// Option lists change rarely; cache them so every panel mount doesn't refetch.
// Keyed by endpoint path. Lifespan is replaced on startup from settings.
static OPTION_CACHE: Lazy<Mutex<TimedCache<String, Vec<FacetOption>>>> =
    Lazy::new(|| Mutex::new(TimedCache::with_lifespan(600)));

/// Applies the configured TTL; called once at startup.
pub fn set_cache_ttl(seconds: u64) {
    let _ = OPTION_CACHE
        .lock()
        .expect("option cache poisoned")
        .cache_set_lifespan(seconds);
}

/// Fetches a facet's option list through the cache. A fetch failure yields an
/// empty list (the UI shows a manual retry); failures are never cached.
pub async fn options(client: &Client, settings: &Settings, spec: &FacetSpec) -> Vec<FacetOption> {
    let cache_key = spec.path.to_string();
    {
        let mut cache = OPTION_CACHE.lock().expect("option cache poisoned");
        if let Some(hit) = cache.cache_get(&cache_key) {
            tracing::debug!(facet = spec.key, "option cache hit");
            return hit.clone();
        }
    }

    match marketplace_api::fetch_facet_options(client, settings, spec).await {
        Ok(options) => {
            if !options.is_empty() {
                OPTION_CACHE
                    .lock()
                    .expect("option cache poisoned")
                    .cache_set(cache_key, options.clone());
            }
            options
        }
        Err(e) => {
            tracing::warn!(facet = spec.key, error = %e, "facet option fetch failed, returning empty list");
            Vec::new()
        }
    }
}

/// Best-effort warm-up of every facet cache for a category, run concurrently.
pub async fn warm_up(client: &Client, settings: &Settings, category: Category) {
    let fetches = registry_for(category).map(|spec| options(client, settings, spec));
    let counts = futures::future::join_all(fetches).await;
    tracing::info!(
        category = category.slug(),
        facets = counts.len(),
        "facet option warm-up complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_scopes_facets_by_category() {
        let bike_keys: Vec<_> = registry_for(Category::Bike).map(|s| s.key).collect();
        assert!(bike_keys.contains(&"brand_id"));
        assert!(bike_keys.contains(&"price_range")); // shared
        assert!(!bike_keys.contains(&"bedroom_id"));

        let property_keys: Vec<_> = registry_for(Category::Property).map(|s| s.key).collect();
        assert!(property_keys.contains(&"bathroom_id"));
        assert!(!property_keys.contains(&"transmission_id"));
    }

    #[test]
    fn find_resolves_per_category_endpoint_for_shared_key() {
        let bike_brands = find(Category::Bike, "brand_id").unwrap();
        assert_eq!(bike_brands.path, "bike/get/brands");
        let car_brands = find(Category::Car, "brand_id").unwrap();
        assert_eq!(car_brands.path, "car/get/brands");
        assert!(find(Category::Property, "brand_id").is_none());
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = FacetSelection::new("fuel_type_id");
        selection.toggle("2");
        selection.toggle("4");
        assert_eq!(selection.selected(), ["2", "4"]);
        selection.toggle("2");
        assert_eq!(selection.selected(), ["4"]);
    }

    #[test]
    fn collapse_follows_the_three_way_convention() {
        let mut selection = FacetSelection::new("fuel_type_id");
        assert_eq!(selection.collapse(), FilterValue::Empty);
        selection.toggle("2");
        assert_eq!(selection.collapse(), FilterValue::One("2".to_string()));
        selection.toggle("4");
        assert_eq!(
            selection.collapse(),
            FilterValue::Many(vec!["2".to_string(), "4".to_string()])
        );
    }

    #[test]
    fn selection_round_trips_through_filter_state() {
        let mut state = FilterState::defaults(Category::Car);
        let mut selection = FacetSelection::new("fuel_type_id");
        selection.toggle("2");
        selection.toggle("4");
        selection.write_into(&mut state);

        let mut resynced = FacetSelection::new("fuel_type_id");
        resynced.sync_from(&state);
        assert_eq!(resynced.selected(), ["2", "4"]);
    }
}
