// Detail-page helpers: map coordinates and the optimistic wishlist toggle.

use axum::async_trait;
use serde::Serialize;

use crate::error::AppError;
use crate::models::Item;

/// Center/marker position for the embedded map on a detail page. Each axis
/// comes from its own field; a marker with latitude on both axes is useless.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl MapPoint {
    /// `None` when the item is missing either coordinate; the page then
    /// renders without a map rather than with a bogus one.
    pub fn for_item(item: &Item) -> Option<Self> {
        Some(MapPoint {
            latitude: item.latitude_f64()?,
            longitude: item.longitude_f64()?,
        })
    }

    /// Click-through URL to the full map view.
    pub fn maps_url(&self) -> String {
        format!(
            "https://www.google.com/maps?q={},{}",
            self.latitude, self.longitude
        )
    }
}

/// Seam for the wishlist API call so the toggle semantics are testable.
#[async_trait]
pub trait WishlistBackend: Send + Sync {
    async fn set_wishlist(&self, item_id: i64, wanted: bool, bearer: &str)
        -> Result<(), AppError>;
}

/// The heart-icon flag on a detail page.
#[derive(Debug, Default)]
pub struct WishlistFlag {
    pub saved: bool,
}

impl WishlistFlag {
    /// Optimistic toggle: flips the flag immediately, calls the API, and
    /// reverts the flag when the call fails. The error is handed back so the
    /// caller can surface a toast.
    pub async fn toggle<B: WishlistBackend>(
        &mut self,
        backend: &B,
        item_id: i64,
        bearer: &str,
    ) -> Result<bool, AppError> {
        let wanted = !self.saved;
        self.saved = wanted;
        match backend.set_wishlist(item_id, wanted, bearer).await {
            Ok(()) => Ok(wanted),
            Err(e) => {
                self.saved = !wanted;
                Err(e)
            }
        }
    }
}
