// Shared data structures: categories, listing items, facet options, forms.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marketplace verticals. Each maps to its own upstream path prefix and
/// slider category id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bike,
    Car,
    Property,
    Electronics,
}

impl Category {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "bike" => Some(Category::Bike),
            "car" => Some(Category::Car),
            "property" => Some(Category::Property),
            "electronics" => Some(Category::Electronics),
            _ => None,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Category::Bike => "bike",
            Category::Car => "car",
            Category::Property => "property",
            Category::Electronics => "electronics",
        }
    }

    /// Upstream path prefix ("gbike", "properties", ...). The inconsistent
    /// naming is the upstream API's, reproduced verbatim.
    pub fn api_prefix(self) -> &'static str {
        match self {
            Category::Bike => "gbike",
            Category::Car => "gcar",
            Category::Property => "properties",
            Category::Electronics => "gelectronics",
        }
    }

    /// Value the upstream `/filter` endpoint expects in `category_id`.
    pub fn id(self) -> u32 {
        match self {
            Category::Bike => 1,
            Category::Car => 2,
            Category::Property => 3,
            Category::Electronics => 4,
        }
    }
}

/// A listing returned by the upstream API. The UI treats items as bags of
/// optional fields, so everything is optional and unknown keys are retained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    pub id: Option<i64>,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    // Upstream sends prices and coordinates as numbers or strings depending
    // on the endpoint; keep them raw and parse on demand.
    pub price: Option<Value>,
    pub images: Option<Value>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Key used to drop duplicates when accumulating load-more pages.
    pub fn dedupe_key(&self) -> Option<String> {
        if let Some(id) = self.id {
            return Some(format!("id:{}", id));
        }
        self.slug.as_ref().map(|s| format!("slug:{}", s))
    }

    pub fn latitude_f64(&self) -> Option<f64> {
        self.latitude.as_ref().and_then(coord)
    }

    pub fn longitude_f64(&self) -> Option<f64> {
        self.longitude.as_ref().and_then(coord)
    }
}

// Coordinates arrive as JSON numbers or numeric strings.
fn coord(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// One entry of a facet's option list (a brand, a fuel type, a bedroom count).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetOption {
    pub id: Option<i64>,
    pub name: String,
    /// Value written into the filter state when the option is selected.
    /// Falls back to the id, then to the name.
    pub value: String,
}

/// Cached geolocation, persisted under the `selectedLocation` key. Set by the
/// location picker elsewhere; read-only from the browsing pages' perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

// --- Lead-capture forms ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnquiryForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub item_id: i64,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingForm {
    pub item_id: i64,
    pub rating: u8,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WishlistRequest {
    pub item_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_tolerates_missing_fields_and_keeps_extras() {
        let item: Item = serde_json::from_value(json!({
            "id": 7,
            "fuel_type": "petrol",
            "price": "45000"
        }))
        .unwrap();
        assert_eq!(item.id, Some(7));
        assert!(item.brand.is_none());
        assert_eq!(item.extra.get("fuel_type"), Some(&json!("petrol")));
    }

    #[test]
    fn coordinates_parse_from_numbers_and_strings() {
        let item: Item = serde_json::from_value(json!({
            "latitude": "12.9716",
            "longitude": 77.5946
        }))
        .unwrap();
        assert_eq!(item.latitude_f64(), Some(12.9716));
        assert_eq!(item.longitude_f64(), Some(77.5946));
    }

    #[test]
    fn dedupe_key_prefers_id_over_slug() {
        let mut item = Item::default();
        assert_eq!(item.dedupe_key(), None);
        item.slug = Some("honda-activa".to_string());
        assert_eq!(item.dedupe_key(), Some("slug:honda-activa".to_string()));
        item.id = Some(42);
        assert_eq!(item.dedupe_key(), Some("id:42".to_string()));
    }
}
