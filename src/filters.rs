// Filter state and its serialization into `/filter` query parameters.
//
// The contract: a facet with zero selections is absent from the query string,
// one selection serializes as the bare scalar, and two or more serialize as a
// single comma-joined string. Comma-joining is the one canonical convention,
// applied uniformly to every facet.

use std::collections::BTreeMap;

use crate::facets;
use crate::models::{Category, SelectedLocation};

/// Value of one facet inside a `FilterState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Empty,
    One(String),
    Many(Vec<String>),
}

impl FilterValue {
    /// Three-way collapse from a selection list.
    pub fn from_selected(values: &[String]) -> Self {
        match values {
            [] => FilterValue::Empty,
            [single] => FilterValue::One(single.clone()),
            many => FilterValue::Many(many.to_vec()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Empty => true,
            FilterValue::One(v) => v.is_empty(),
            FilterValue::Many(vs) => vs.is_empty(),
        }
    }

    /// Serialized query-parameter value, `None` when the facet is unset.
    pub fn to_param(&self) -> Option<String> {
        match self {
            FilterValue::Empty => None,
            FilterValue::One(v) if v.is_empty() => None,
            FilterValue::One(v) => Some(v.clone()),
            FilterValue::Many(vs) if vs.is_empty() => None,
            FilterValue::Many(vs) => Some(vs.join(",")),
        }
    }

    /// Selection list view, used to sync facet sections from the shared state.
    pub fn selected(&self) -> Vec<String> {
        match self {
            FilterValue::Empty => Vec::new(),
            FilterValue::One(v) if v.is_empty() => Vec::new(),
            FilterValue::One(v) => vec![v.clone()],
            FilterValue::Many(vs) => vs.clone(),
        }
    }
}

/// The canonical per-category filter state owned by a filter panel. Every
/// registered facet key is always present; unset facets hold `Empty`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    category: Category,
    facets: BTreeMap<String, FilterValue>,
}

impl FilterState {
    pub fn defaults(category: Category) -> Self {
        let facets = facets::registry_for(category)
            .map(|spec| (spec.key.to_string(), FilterValue::Empty))
            .collect();
        FilterState { category, facets }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn get(&self, key: &str) -> FilterValue {
        self.facets.get(key).cloned().unwrap_or(FilterValue::Empty)
    }

    /// Writes a facet value. Unknown keys are accepted so ad hoc parameters
    /// (e.g. a free-text search) pass through unharmed.
    pub fn set(&mut self, key: &str, value: FilterValue) {
        self.facets.insert(key.to_string(), value);
    }

    /// "Cleaned filters": every facet that serializes to something, with
    /// multi-selects already comma-joined.
    pub fn clean(&self) -> BTreeMap<String, String> {
        self.facets
            .iter()
            .filter_map(|(key, value)| value.to_param().map(|p| (key.clone(), p)))
            .collect()
    }

    pub fn is_clean_empty(&self) -> bool {
        self.facets.values().all(FilterValue::is_empty)
    }

    /// Full query-parameter list for the unified `/filter` endpoint:
    /// page + category + cleaned facets + coordinates when a location is cached.
    pub fn query_params(
        &self,
        page: u32,
        location: Option<&SelectedLocation>,
    ) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), page.to_string()),
            ("category_id".to_string(), self.category.id().to_string()),
        ];
        for (key, value) in self.clean() {
            params.push((key, value));
        }
        if let Some(loc) = location {
            params.push(("latitude".to_string(), loc.latitude.to_string()));
            params.push(("longitude".to_string(), loc.longitude.to_string()));
        }
        params
    }

    /// Route-change reset: all facets back to the target category's defaults.
    /// Geolocation is not part of the filter state, so it survives untouched.
    pub fn reset_for(&mut self, category: Category) {
        *self = FilterState::defaults(category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(category: Category, entries: &[(&str, FilterValue)]) -> FilterState {
        let mut state = FilterState::defaults(category);
        for (key, value) in entries {
            state.set(key, value.clone());
        }
        state
    }

    #[test]
    fn collapse_law_zero_one_many() {
        assert_eq!(FilterValue::from_selected(&[]), FilterValue::Empty);
        assert_eq!(
            FilterValue::from_selected(&["3".to_string()]),
            FilterValue::One("3".to_string())
        );
        assert_eq!(
            FilterValue::from_selected(&["3".to_string(), "4".to_string()]),
            FilterValue::Many(vec!["3".to_string(), "4".to_string()])
        );
    }

    #[test]
    fn empty_facets_are_absent_from_cleaned_output() {
        let state = state_with(
            Category::Bike,
            &[
                (
                    "price_range",
                    FilterValue::Many(vec!["0-50000".to_string(), "50000-100000".to_string()]),
                ),
                ("brand_id", FilterValue::One(String::new())),
                ("listed_by_id", FilterValue::One("3".to_string())),
            ],
        );
        let cleaned = state.clean();
        assert_eq!(
            cleaned.get("price_range").map(String::as_str),
            Some("0-50000,50000-100000")
        );
        assert_eq!(cleaned.get("listed_by_id").map(String::as_str), Some("3"));
        assert!(!cleaned.contains_key("brand_id"));
        assert_eq!(cleaned.len(), 2);
    }

    #[test]
    fn defaults_clean_to_nothing() {
        let state = FilterState::defaults(Category::Property);
        assert!(state.is_clean_empty());
        assert!(state.clean().is_empty());
    }

    #[test]
    fn query_params_merge_page_facets_and_location() {
        let state = state_with(
            Category::Car,
            &[("fuel_type_id", FilterValue::One("2".to_string()))],
        );
        let location = SelectedLocation {
            latitude: 12.9716,
            longitude: 77.5946,
            address: None,
            city: None,
            state: None,
        };
        let params = state.query_params(3, Some(&location));
        assert!(params.contains(&("page".to_string(), "3".to_string())));
        assert!(params.contains(&("fuel_type_id".to_string(), "2".to_string())));
        assert!(params.contains(&("latitude".to_string(), "12.9716".to_string())));
        assert!(params.contains(&("longitude".to_string(), "77.5946".to_string())));
    }

    #[test]
    fn query_params_omit_location_when_none_cached() {
        let state = FilterState::defaults(Category::Bike);
        let params = state.query_params(1, None);
        assert!(params.iter().all(|(k, _)| k != "latitude" && k != "longitude"));
    }

    #[test]
    fn reset_for_clears_category_facets() {
        let mut state = state_with(
            Category::Bike,
            &[("kilometers_id", FilterValue::One("1".to_string()))],
        );
        state.reset_for(Category::Car);
        assert_eq!(state.category(), Category::Car);
        assert!(state.is_clean_empty());
        assert_eq!(state.get("kilometers_id"), FilterValue::Empty);
    }
}
