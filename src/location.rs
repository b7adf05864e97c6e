// Typed store for the client-side cache (the localStorage analogue).
//
// One JSON file, fixed keys (`selectedLocation`, `propertyFilters`), explicit
// read/write API instead of ad hoc JSON parsing scattered across consumers.
// Everything is best-effort: a missing or corrupt cache reads as "nothing
// cached", write failures log a warning and move on. Nothing here is allowed
// to fail a request.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::SelectedLocation;

pub const SELECTED_LOCATION_KEY: &str = "selectedLocation";
pub const PROPERTY_FILTERS_KEY: &str = "propertyFilters";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    #[serde(rename = "selectedLocation", skip_serializing_if = "Option::is_none")]
    selected_location: Option<SelectedLocation>,
    #[serde(rename = "propertyFilters", skip_serializing_if = "Option::is_none")]
    property_filters: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct LocationStore {
    path: PathBuf,
}

impl LocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LocationStore { path: path.into() }
    }

    /// Cached geolocation, or `None` when absent/unreadable. The browsing
    /// pages only ever read this; it is written by the location picker.
    pub fn selected_location(&self) -> Option<SelectedLocation> {
        self.load().selected_location
    }

    pub fn set_selected_location(&self, location: &SelectedLocation) {
        let mut cache = self.load();
        cache.selected_location = Some(location.clone());
        self.save(cache);
    }

    /// The cached filter snapshot (the `propertyFilters` key).
    pub fn cached_filters(&self) -> Option<BTreeMap<String, String>> {
        self.load().property_filters
    }

    pub fn cache_filters(&self, filters: &BTreeMap<String, String>) {
        let mut cache = self.load();
        cache.property_filters = Some(filters.clone());
        self.save(cache);
    }

    fn load(&self) -> CacheFile {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return CacheFile::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt local cache, ignoring");
                CacheFile::default()
            }
        }
    }

    fn save(&self, mut cache: CacheFile) {
        cache.saved_at = Some(Utc::now());
        let serialized = match serde_json::to_string_pretty(&cache) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize local cache");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, serialized) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write local cache");
        }
    }
}
