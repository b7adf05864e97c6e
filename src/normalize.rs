// Response-shape normalization at the API-client boundary.
//
// The upstream API wraps the same data three different ways depending on the
// endpoint: a bare array, `{"data": [...]}`, or a Laravel-style paginator
// `{"data": {"data": [...], "current_page": N, ...}}`. Every consumer used to
// re-derive the shape; here it happens exactly once. A shape we cannot make
// sense of degrades to an empty list with a warning, never an error.

use serde_json::Value;

use crate::models::{FacetOption, Item};
use crate::pagination::PageInfo;

/// Normalizes a `/filter`-style response into items plus pagination fields.
/// `requested_page` seeds the fallbacks for absent envelope fields.
pub fn listing_page(raw: &Value, requested_page: u32) -> (Vec<Item>, PageInfo) {
    let envelope = paginator_envelope(raw);
    let items = envelope
        .map(items_of)
        .unwrap_or_else(|| {
            tracing::warn!("unrecognized listing envelope shape, treating as empty");
            Vec::new()
        });

    let info = PageInfo {
        current_page: envelope
            .and_then(|e| e.get("current_page"))
            .and_then(as_u32)
            .unwrap_or(requested_page),
        last_page: envelope
            .and_then(|e| e.get("last_page"))
            .and_then(as_u32)
            .unwrap_or(requested_page),
        total: envelope
            .and_then(|e| e.get("total"))
            .and_then(Value::as_u64)
            .unwrap_or(items.len() as u64),
        next_page_url: envelope
            .and_then(|e| e.get("next_page_url"))
            .and_then(Value::as_str)
            .map(str::to_string),
    };

    (items, info)
}

/// Normalizes a plain item-list response (popular lists, slider images).
pub fn item_list(raw: &Value) -> Vec<Item> {
    match unwrap_list(raw) {
        Some(list) => parse_items(list),
        None => {
            tracing::warn!("unrecognized item-list shape, treating as empty");
            Vec::new()
        }
    }
}

/// Normalizes a facet option-list response. With `active_only`, entries
/// explicitly marked inactive are dropped.
pub fn option_list(raw: &Value, active_only: bool) -> Vec<FacetOption> {
    let Some(list) = unwrap_list(raw) else {
        tracing::warn!("unrecognized option-list shape, treating as empty");
        return Vec::new();
    };

    list.iter()
        .filter_map(|entry| parse_option(entry))
        .filter(|(_, active)| !active_only || *active)
        .map(|(option, _)| option)
        .collect()
}

// --- Shape detection helpers ---

// Finds the object carrying `data: [...]` plus pagination fields, walking
// through at most one level of `{"data": {...}}` nesting.
fn paginator_envelope(raw: &Value) -> Option<&Value> {
    if raw.is_array() {
        return Some(raw);
    }
    if raw.get("current_page").is_some() || matches!(raw.get("data"), Some(Value::Array(_))) {
        return Some(raw);
    }
    let inner = raw.get("data")?;
    if inner.is_object() {
        return Some(inner);
    }
    None
}

fn items_of(envelope: &Value) -> Vec<Item> {
    match envelope.get("data") {
        Some(Value::Array(list)) => parse_items(list),
        // The envelope itself may be the bare array case.
        _ => match envelope {
            Value::Array(list) => parse_items(list),
            _ => Vec::new(),
        },
    }
}

// Unwraps bare arrays, `{"data": [...]}`, and `{"data": {"data": [...]}}`.
fn unwrap_list(raw: &Value) -> Option<&Vec<Value>> {
    if let Value::Array(list) = raw {
        return Some(list);
    }
    match raw.get("data") {
        Some(Value::Array(list)) => Some(list),
        Some(inner) => match inner.get("data") {
            Some(Value::Array(list)) => Some(list),
            _ => None,
        },
        None => None,
    }
}

fn parse_items(list: &[Value]) -> Vec<Item> {
    list.iter()
        .filter_map(|entry| match serde_json::from_value::<Item>(entry.clone()) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("skipping malformed item in response: {}", e);
                None
            }
        })
        .collect()
}

fn parse_option(entry: &Value) -> Option<(FacetOption, bool)> {
    // Some endpoints serve plain string lists.
    if let Some(s) = entry.as_str() {
        let option = FacetOption {
            id: None,
            name: s.to_string(),
            value: s.to_string(),
        };
        return Some((option, true));
    }

    let obj = entry.as_object()?;

    let name = ["name", "title", "label", "type"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::to_string)?;

    let id = obj.get("id").and_then(Value::as_i64);
    let value = obj
        .get("value")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| id.map(|i| i.to_string()))
        .unwrap_or_else(|| name.clone());

    let active = match (obj.get("status"), obj.get("is_active")) {
        (Some(status), _) => is_truthy(status),
        (None, Some(flag)) => is_truthy(flag),
        (None, None) => true,
    };

    Some((FacetOption { id, name, value }, active))
}

// "1", 1, true, "active" all mean active; the upstream is not consistent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_some_and(|i| i != 0),
        Value::String(s) => matches!(s.as_str(), "1" | "true" | "active" | "Active"),
        _ => false,
    }
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().map(|v| v as u32),
        Value::String(s) => s.parse::<u32>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn laravel_paginator_envelope_is_normalized() {
        let raw = json!({
            "data": {
                "data": [{"id": 1}, {"id": 2}],
                "current_page": 2,
                "last_page": 5,
                "total": 42,
                "next_page_url": "http://api/filter?page=3"
            }
        });
        let (items, info) = listing_page(&raw, 2);
        assert_eq!(items.len(), 2);
        assert_eq!(info.current_page, 2);
        assert_eq!(info.last_page, 5);
        assert_eq!(info.total, 42);
        assert!(info.next_page_url.is_some());
    }

    #[test]
    fn flat_data_array_envelope_is_normalized() {
        let raw = json!({ "data": [{"id": 1}] });
        let (items, info) = listing_page(&raw, 1);
        assert_eq!(items.len(), 1);
        assert_eq!(info.current_page, 1);
        assert_eq!(info.next_page_url, None);
    }

    #[test]
    fn null_next_page_url_normalizes_to_none() {
        let raw = json!({
            "data": { "data": [], "current_page": 1, "last_page": 1, "total": 0, "next_page_url": null }
        });
        let (items, info) = listing_page(&raw, 1);
        assert!(items.is_empty());
        assert_eq!(info.next_page_url, None);
        assert_eq!(info.total, 0);
    }

    #[test]
    fn bare_array_listing_response_is_normalized() {
        let raw = json!([{"id": 1}, {"id": 2}, {"id": 3}]);
        let (items, info) = listing_page(&raw, 1);
        assert_eq!(items.len(), 3);
        assert_eq!(info.total, 3);
        assert_eq!(info.next_page_url, None);
    }

    #[test]
    fn malformed_envelope_degrades_to_empty() {
        let raw = json!("totally not a listing response");
        let (items, info) = listing_page(&raw, 3);
        assert!(items.is_empty());
        assert_eq!(info.current_page, 3);
        assert_eq!(info.last_page, 3);
    }

    #[test]
    fn item_list_handles_all_three_shapes() {
        assert_eq!(item_list(&json!([{"id": 1}])).len(), 1);
        assert_eq!(item_list(&json!({"data": [{"id": 1}, {"id": 2}]})).len(), 2);
        assert_eq!(item_list(&json!({"data": {"data": [{"id": 1}]}})).len(), 1);
        assert!(item_list(&json!(42)).is_empty());
    }

    #[test]
    fn option_list_filters_inactive_when_asked() {
        let raw = json!({ "data": [
            {"id": 1, "name": "Petrol", "status": 1},
            {"id": 2, "name": "Diesel", "status": 0},
            {"id": 3, "name": "Electric", "status": "active"}
        ]});
        let all = option_list(&raw, false);
        assert_eq!(all.len(), 3);
        let active = option_list(&raw, true);
        let names: Vec<_> = active.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Petrol", "Electric"]);
    }

    #[test]
    fn option_value_falls_back_from_value_to_id_to_name() {
        let raw = json!([
            {"id": 5, "name": "0-50000", "value": "0-50000"},
            {"id": 9, "name": "Semi Furnished"},
            {"name": "East Facing"}
        ]);
        let options = option_list(&raw, false);
        assert_eq!(options[0].value, "0-50000");
        assert_eq!(options[1].value, "9");
        assert_eq!(options[2].value, "East Facing");
    }
}
