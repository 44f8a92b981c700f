use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{
    domain::{Barcode, Category, Product},
    protocol::{CategoryListResponse, ProductLookupResponse, SearchResponse},
};
use tracing::debug;
use url::Url;

use crate::{config::Settings, error::DirectoryError};

/// Read-only product directory. Results are already normalized: every
/// product has a non-blank name.
#[async_trait]
pub trait ProductDirectory: Send + Sync {
    async fn lookup_barcode(&self, barcode: &Barcode) -> Result<Vec<Product>, DirectoryError>;
    /// `None` requests the unfiltered default listing.
    async fn search(&self, terms: Option<&str>) -> Result<Vec<Product>, DirectoryError>;
    async fn list_categories(&self) -> Result<Vec<Category>, DirectoryError>;
}

/// Open Food Facts over HTTP.
pub struct HttpProductDirectory {
    http: Client,
    base_url: Url,
    search_page_size: u32,
    category_limit: usize,
}

impl HttpProductDirectory {
    pub fn new(settings: &Settings) -> Result<Self, DirectoryError> {
        let mut builder = Client::builder().user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(DirectoryError::Client)?;

        Ok(Self {
            http,
            base_url: settings.base_url()?,
            search_page_size: settings.search_page_size,
            category_limit: settings.category_limit,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, DirectoryError> {
        self.base_url
            .join(path)
            .map_err(|source| DirectoryError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }

    fn product_url(&self, barcode: &Barcode) -> Result<Url, DirectoryError> {
        let mut url = self.endpoint("api/v0/product/")?;
        url.path_segments_mut()
            .map_err(|()| DirectoryError::UnsupportedUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(&format!("{}.json", barcode.as_str()));
        Ok(url)
    }

    fn search_url(&self, terms: Option<&str>) -> Result<Url, DirectoryError> {
        let mut url = self.endpoint("cgi/search.pl")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(terms) = terms {
                query.append_pair("search_terms", terms);
            }
            query
                .append_pair("json", "true")
                .append_pair("page_size", &self.search_page_size.to_string());
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, DirectoryError> {
        let label = url.to_string();
        debug!(url = %label, "directory: GET");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| DirectoryError::Transport {
                url: label.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status { url: label, status });
        }

        let body = response
            .text()
            .await
            .map_err(|source| DirectoryError::Transport {
                url: label.clone(),
                source,
            })?;
        serde_json::from_str(&body).map_err(|source| DirectoryError::Decode { url: label, source })
    }
}

#[async_trait]
impl ProductDirectory for HttpProductDirectory {
    async fn lookup_barcode(&self, barcode: &Barcode) -> Result<Vec<Product>, DirectoryError> {
        let url = self.product_url(barcode)?;
        let response: ProductLookupResponse = self.get_json(url).await?;
        if response.product.is_none() {
            debug!(
                barcode = %barcode,
                status = ?response.status_verbose,
                "directory: no product for barcode"
            );
        }
        Ok(response.into_products())
    }

    async fn search(&self, terms: Option<&str>) -> Result<Vec<Product>, DirectoryError> {
        let url = self.search_url(terms)?;
        let response: SearchResponse = self.get_json(url).await?;
        Ok(response.into_products())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DirectoryError> {
        let url = self.endpoint("categories.json")?;
        let response: CategoryListResponse = self.get_json(url).await?;
        Ok(response.into_categories(self.category_limit))
    }
}

#[cfg(test)]
#[path = "tests/directory_tests.rs"]
mod tests;
