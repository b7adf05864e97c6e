// The filter-and-pagination protocol behind a listing page: debounced
// auto-apply, stale-response discarding, and throttled load-more, all driving
// one accumulated feed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::async_trait;
use reqwest::Client;
use tokio::time::{sleep, Duration, Instant};

use crate::config::Settings;
use crate::error::AppError;
use crate::filters::{FilterState, FilterValue};
use crate::marketplace_api;
use crate::models::{Category, Item, SelectedLocation};
use crate::pagination::{Feed, PageInfo};

/// Seam between the session logic and the network, so the protocol is
/// testable without an upstream.
#[async_trait]
pub trait ListingBackend: Send + Sync {
    async fn fetch_page(
        &self,
        page: u32,
        params: Vec<(String, String)>,
    ) -> Result<(Vec<Item>, PageInfo), AppError>;
}

/// Production backend delegating to the upstream `/filter` endpoint.
pub struct MarketplaceBackend {
    pub client: Arc<Client>,
    pub settings: Arc<Settings>,
}

#[async_trait]
impl ListingBackend for MarketplaceBackend {
    async fn fetch_page(
        &self,
        page: u32,
        params: Vec<(String, String)>,
    ) -> Result<(Vec<Item>, PageInfo), AppError> {
        marketplace_api::search_listings(&self.client, &self.settings, page, &params).await
    }
}

/// Debounce gate for auto-apply. Every filter change takes a ticket; a ticket
/// "settles" only if no newer change arrived during the delay, so a burst of
/// rapid toggles yields exactly one settled ticket.
#[derive(Clone)]
pub struct Debouncer {
    delay: Duration,
    seq: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a change and returns its ticket.
    pub fn signal(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Waits out the delay; true iff this ticket is still the newest.
    pub async fn settle(&self, ticket: u64) -> bool {
        sleep(self.delay).await;
        self.seq.load(Ordering::SeqCst) == ticket
    }
}

/// One category page's browsing state: filters, accumulated feed, cached
/// location, and the request bookkeeping that keeps responses ordered.
pub struct BrowseSession<B> {
    backend: B,
    filters: FilterState,
    location: Option<SelectedLocation>,
    pub feed: Feed,
    debouncer: Debouncer,
    // Generation of the newest issued request. Responses from older
    // generations are discarded instead of racing the newest one.
    generation: u64,
    load_more_lock: Duration,
    last_load_more: Option<Instant>,
}

impl<B: ListingBackend> BrowseSession<B> {
    pub fn new(backend: B, category: Category, settings: &Settings) -> Self {
        BrowseSession {
            backend,
            filters: FilterState::defaults(category),
            location: None,
            feed: Feed::default(),
            debouncer: Debouncer::new(Duration::from_millis(settings.auto_apply_debounce_ms)),
            generation: 0,
            load_more_lock: Duration::from_millis(settings.load_more_lock_ms),
            last_load_more: None,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn location(&self) -> Option<&SelectedLocation> {
        self.location.as_ref()
    }

    /// Installs the cached geolocation read from the location store.
    pub fn set_location(&mut self, location: Option<SelectedLocation>) {
        self.location = location;
    }

    /// A facet section writing its collapsed value into the shared state.
    /// Returns the debounce ticket for this change.
    pub fn set_facet(&mut self, key: &str, value: FilterValue) -> u64 {
        self.filters.set(key, value);
        self.debouncer.signal()
    }

    /// Route change: facets reset to the new category's defaults, the cached
    /// location survives, and the feed is emptied.
    pub fn switch_category(&mut self, category: Category) {
        self.filters.reset_for(category);
        self.feed = Feed::default();
        self.last_load_more = None;
        // Invalidate any in-flight fetch from the old category.
        self.generation += 1;
    }

    /// Auto-apply: waits out the debounce for `ticket`; if no newer change
    /// arrived, fetches page 1 with the final combined state. Returns whether
    /// a fetch was actually issued.
    pub async fn auto_apply(&mut self, ticket: u64) -> Result<bool, AppError> {
        if !self.debouncer.settle(ticket).await {
            return Ok(false);
        }
        self.apply_filters().await?;
        Ok(true)
    }

    /// Fresh filter application: page 1, replace semantics.
    pub async fn apply_filters(&mut self) -> Result<(), AppError> {
        self.feed.loading = true;
        self.fetch_into_feed(1).await
    }

    /// Infinite scroll trigger. Refused (returns false) while a fetch is in
    /// flight, when no pages remain, or within the re-entry lock window.
    pub async fn load_more(&mut self) -> Result<bool, AppError> {
        if self.feed.loading || self.feed.loading_more || !self.feed.has_more {
            return Ok(false);
        }
        if let Some(last) = self.last_load_more {
            if last.elapsed() < self.load_more_lock {
                return Ok(false);
            }
        }
        self.last_load_more = Some(Instant::now());
        self.feed.loading_more = true;
        self.fetch_into_feed(self.feed.current_page + 1).await?;
        Ok(true)
    }

    async fn fetch_into_feed(&mut self, page: u32) -> Result<(), AppError> {
        let generation = self.begin_request();
        let params = self.filters.query_params(page, self.location.as_ref());
        let result = self.backend.fetch_page(page, params).await;
        match result {
            Ok((items, info)) => {
                self.finish_request(generation, page, items, &info);
                Ok(())
            }
            Err(e) => {
                self.feed.loading = false;
                self.feed.loading_more = false;
                Err(e)
            }
        }
    }

    /// Marks a new request generation; any response carrying an older one is
    /// stale and must not touch the feed.
    pub fn begin_request(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Applies a response iff its generation is still the newest.
    pub fn finish_request(
        &mut self,
        generation: u64,
        page: u32,
        items: Vec<Item>,
        info: &PageInfo,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(generation, newest = self.generation, "discarding stale response");
            return false;
        }
        self.feed.apply_page(page, items, info);
        true
    }
}
