use std::sync::Arc;

use shared::{
    domain::{Category, Product},
    error::ApiError,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, error, info};

pub mod cart;
pub mod config;
pub mod detail;
pub mod directory;
pub mod error;
pub mod query;
pub mod state;
pub mod view;

pub use config::{load_settings, Settings};
pub use directory::{HttpProductDirectory, ProductDirectory};
pub use error::DirectoryError;
pub use query::CatalogQuery;
pub use state::{CatalogState, FetchOutcome, RequestToken};

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    ProductsApplied {
        request: RequestToken,
        query: CatalogQuery,
        count: usize,
    },
    StaleResultDiscarded {
        request: RequestToken,
        latest: RequestToken,
    },
    CategoriesLoaded {
        count: usize,
    },
    FetchFailed {
        operation: &'static str,
        error: ApiError,
    },
}

/// Dispatches directory queries into a [`CatalogState`].
///
/// Queries may overlap; each product fetch carries a [`RequestToken`] and only
/// the most recently issued one is applied. Directory failures are logged,
/// published as [`CatalogEvent::FetchFailed`] and degrade to an empty list.
pub struct CatalogClient {
    directory: Arc<dyn ProductDirectory>,
    state: Mutex<CatalogState>,
    events: broadcast::Sender<CatalogEvent>,
}

impl CatalogClient {
    pub fn new(directory: Arc<dyn ProductDirectory>, page_size: usize) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            directory,
            state: Mutex::new(CatalogState::new(page_size)),
            events,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Arc<Self>, DirectoryError> {
        let directory = HttpProductDirectory::new(settings)?;
        Ok(Self::new(Arc::new(directory), settings.page_size))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    /// Default listing and category list, fetched concurrently.
    pub async fn load_initial(&self) -> (FetchOutcome, usize) {
        futures::join!(
            self.submit(CatalogQuery::DefaultListing),
            self.refresh_categories()
        )
    }

    pub async fn search(&self, text: &str, barcode_mode: bool) -> FetchOutcome {
        self.submit(CatalogQuery::from_input(text, barcode_mode))
            .await
    }

    pub async fn submit(&self, query: CatalogQuery) -> FetchOutcome {
        let token = self.state.lock().await.begin_fetch();
        debug!(request = %token, query = %query, "catalog: fetch started");

        let products = self.fetch_products(&query).await;

        let outcome = self.state.lock().await.finish_fetch(token, products);
        match outcome {
            FetchOutcome::Applied { count } => {
                info!(request = %token, query = %query, count, "catalog: results applied");
                let _ = self.events.send(CatalogEvent::ProductsApplied {
                    request: token,
                    query,
                    count,
                });
            }
            FetchOutcome::Stale { latest } => {
                debug!(request = %token, latest = %latest, "catalog: discarding stale results");
                let _ = self.events.send(CatalogEvent::StaleResultDiscarded {
                    request: token,
                    latest,
                });
            }
        }
        outcome
    }

    /// Runs `submit` on a background task without waiting for it.
    pub fn spawn_submit(self: &Arc<Self>, query: CatalogQuery) -> JoinHandle<FetchOutcome> {
        let client = Arc::clone(self);
        tokio::spawn(async move { client.submit(query).await })
    }

    /// Replaces the category list. A failure leaves it empty and is not
    /// propagated.
    pub async fn refresh_categories(&self) -> usize {
        let categories: Vec<Category> = match self.directory.list_categories().await {
            Ok(categories) => categories,
            Err(err) => {
                error!("catalog: failed to fetch categories: {err}");
                let _ = self.events.send(CatalogEvent::FetchFailed {
                    operation: "list_categories",
                    error: ApiError::from(&err),
                });
                Vec::new()
            }
        };

        let count = categories.len();
        self.state.lock().await.set_categories(categories);
        let _ = self.events.send(CatalogEvent::CategoriesLoaded { count });
        count
    }

    /// Lock the session state for reads or view/cart changes.
    pub async fn with_state<R>(&self, f: impl FnOnce(&mut CatalogState) -> R) -> R {
        let mut guard = self.state.lock().await;
        f(&mut guard)
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.is_loading()
    }

    async fn fetch_products(&self, query: &CatalogQuery) -> Vec<Product> {
        let result = match query {
            CatalogQuery::Barcode(barcode) => self.directory.lookup_barcode(barcode).await,
            CatalogQuery::Search(terms) => self.directory.search(Some(terms)).await,
            CatalogQuery::DefaultListing => self.directory.search(None).await,
        };

        match result {
            Ok(products) => products,
            Err(err) => {
                error!(query = %query, "catalog: product fetch failed: {err}");
                let _ = self.events.send(CatalogEvent::FetchFailed {
                    operation: query.operation(),
                    error: ApiError::from(&err),
                });
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
