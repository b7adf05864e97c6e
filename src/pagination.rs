// Pagination reducer for the listing feeds: page 1 replaces, later pages
// append, and "has more" is derived conservatively so infinite scroll can
// never loop past the end.

use serde::{Deserialize, Serialize};

use crate::models::Item;

/// Pagination fields of one `/filter` response, read defensively: a missing
/// `current_page` falls back to the requested page, a missing `last_page`
/// to the current page, so a partial envelope never unlocks extra pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub last_page: u32,
    pub total: u64,
    pub next_page_url: Option<String>,
}

/// Accumulated listing feed for one listing page.
#[derive(Debug, Default)]
pub struct Feed {
    pub items: Vec<Item>,
    pub current_page: u32,
    pub last_page: u32,
    pub total: u64,
    pub has_more: bool,
    pub loading: bool,
    pub loading_more: bool,
}

impl Feed {
    /// Applies one fetched page. `page_no` is the page that was requested;
    /// page 1 replaces the accumulated items (fresh filter application),
    /// anything later appends while skipping already-present items.
    pub fn apply_page(&mut self, page_no: u32, items: Vec<Item>, info: &PageInfo) {
        let page_was_empty = items.is_empty();

        if page_no <= 1 {
            self.items = items;
        } else {
            let seen: std::collections::HashSet<String> = self
                .items
                .iter()
                .filter_map(Item::dedupe_key)
                .collect();
            self.items.extend(
                items
                    .into_iter()
                    .filter(|item| match item.dedupe_key() {
                        Some(key) => !seen.contains(&key),
                        None => true,
                    }),
            );
        }

        self.current_page = if info.current_page > 0 {
            info.current_page
        } else {
            page_no
        };
        self.last_page = if info.last_page > 0 {
            info.last_page
        } else {
            self.current_page
        };
        self.total = info.total;

        // All three must hold: a next page URL, pages remaining, and a
        // non-empty page of results. Guards against off-by-one loops.
        self.has_more = info.next_page_url.is_some()
            && self.current_page < self.last_page
            && !page_was_empty;

        self.loading = false;
        self.loading_more = false;
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: i64) -> Item {
        serde_json::from_value(json!({ "id": id })).unwrap()
    }

    fn info(current: u32, last: u32, total: u64, next: Option<&str>) -> PageInfo {
        PageInfo {
            current_page: current,
            last_page: last,
            total,
            next_page_url: next.map(str::to_string),
        }
    }

    #[test]
    fn page_one_replaces_accumulated_items() {
        let mut feed = Feed::default();
        feed.apply_page(1, vec![item(1), item(2)], &info(1, 3, 25, Some("p2")));
        feed.apply_page(1, vec![item(9)], &info(1, 1, 1, None));
        let ids: Vec<_> = feed.items.iter().map(|i| i.id.unwrap()).collect();
        assert_eq!(ids, vec![9]);
    }

    #[test]
    fn later_pages_append_preserving_order_without_duplicates() {
        let mut feed = Feed::default();
        feed.apply_page(1, vec![item(1), item(2)], &info(1, 3, 25, Some("p2")));
        // Page 2 re-sends item 2 (a listing shifted between pages upstream).
        feed.apply_page(2, vec![item(2), item(3), item(4)], &info(2, 3, 25, Some("p3")));
        let ids: Vec<_> = feed.items.iter().map(|i| i.id.unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(feed.has_more);
    }

    #[test]
    fn null_next_page_url_means_no_more_regardless_of_counters() {
        let mut feed = Feed::default();
        feed.apply_page(1, vec![item(1)], &info(1, 5, 50, None));
        assert!(!feed.has_more);
    }

    #[test]
    fn empty_page_means_no_more_even_with_next_url() {
        let mut feed = Feed::default();
        feed.apply_page(2, Vec::new(), &info(2, 5, 50, Some("p3")));
        assert!(!feed.has_more);
    }

    #[test]
    fn last_page_reached_means_no_more() {
        let mut feed = Feed::default();
        feed.apply_page(3, vec![item(7)], &info(3, 3, 25, Some("stale-url")));
        assert!(!feed.has_more);
    }

    #[test]
    fn empty_first_page_yields_empty_feed_state() {
        let mut feed = Feed::default();
        feed.apply_page(1, Vec::new(), &info(1, 1, 0, None));
        assert!(feed.is_empty());
        assert_eq!(feed.total, 0);
        assert!(!feed.has_more);
    }

    #[test]
    fn missing_envelope_fields_fall_back_to_requested_page() {
        let mut feed = Feed::default();
        feed.apply_page(4, vec![item(1)], &PageInfo::default());
        assert_eq!(feed.current_page, 4);
        assert_eq!(feed.last_page, 4);
        assert!(!feed.has_more);
    }

    #[test]
    fn apply_page_clears_loading_flags() {
        let mut feed = Feed {
            loading: true,
            loading_more: true,
            ..Feed::default()
        };
        feed.apply_page(1, vec![item(1)], &info(1, 1, 1, None));
        assert!(!feed.loading);
        assert!(!feed.loading_more);
    }
}
