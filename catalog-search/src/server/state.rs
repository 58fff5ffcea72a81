// App state for the Axum server
use std::sync::Arc;

use catalog_search_shared::ProductEvent;
use tokio::sync::mpsc;

use crate::rates::CurrencyRateCache;
use crate::search::CatalogSearch;

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<CatalogSearch>,
    /// Absent when no rate source is configured.
    pub rates: Option<Arc<CurrencyRateCache>>,
    pub event_sender: mpsc::Sender<ProductEvent>,
    /// Bearer token webhook calls must present, if set.
    pub webhook_token: Option<String>,
}
