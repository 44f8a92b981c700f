use std::fmt;

use shared::domain::{Category, CategoryFilter, Product, ProductKey, SortKey};

use crate::{
    cart::Cart,
    detail::ProductDetail,
    view::{CatalogPage, ViewState},
};

/// Sequence number issued per product fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { count: usize },
    Stale { latest: RequestToken },
}

/// Single source of truth for a catalog session: the raw list, the view
/// parameters, the cart and the open detail view. Derived lists are never
/// stored.
#[derive(Debug, Default)]
pub struct CatalogState {
    raw: Vec<Product>,
    categories: Vec<Category>,
    view: ViewState,
    cart: Cart,
    selected: Option<Product>,
    last_issued: u64,
    in_flight: usize,
}

impl CatalogState {
    pub fn new(page_size: usize) -> Self {
        Self {
            view: ViewState::new(page_size),
            ..Self::default()
        }
    }

    /// Issues the next token and counts the fetch as in flight. A new query
    /// also returns the catalog to page 1.
    pub fn begin_fetch(&mut self) -> RequestToken {
        self.last_issued += 1;
        self.in_flight += 1;
        self.view.reset_page();
        RequestToken(self.last_issued)
    }

    /// Applies `products` only when `token` is the latest one issued. The
    /// in-flight count drops either way.
    pub fn finish_fetch(&mut self, token: RequestToken, products: Vec<Product>) -> FetchOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        if token.0 != self.last_issued {
            return FetchOutcome::Stale {
                latest: RequestToken(self.last_issued),
            };
        }

        let count = products.len();
        self.raw = products;
        self.view.reset_page();
        FetchOutcome::Applied { count }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn raw_products(&self) -> &[Product] {
        &self.raw
    }

    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn page(&self) -> CatalogPage<'_> {
        self.view.derive(&self.raw)
    }

    pub fn select_category(&mut self, category: CategoryFilter) {
        self.view.set_category(category);
    }

    pub fn select_sort(&mut self, key: SortKey) {
        self.view.select_sort(key);
    }

    pub fn load_more(&mut self) {
        self.view.load_more();
    }

    pub fn find(&self, key: &ProductKey) -> Option<&Product> {
        self.raw
            .iter()
            .find(|product| &product.key == key)
            .or_else(|| self.selected.as_ref().filter(|product| &product.key == key))
    }

    /// Product at `index` in the current visible page.
    pub fn visible_product(&self, index: usize) -> Option<&Product> {
        self.page().visible.get(index).copied()
    }

    pub fn add_to_cart(&mut self, product: &Product) -> u32 {
        self.cart.add(product)
    }

    /// Adds the product at `key`, if it is still in the raw list or the open
    /// detail view.
    pub fn add_key_to_cart(&mut self, key: &ProductKey) -> Option<u32> {
        let product = self.find(key)?.clone();
        Some(self.cart.add(&product))
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Suspends the catalog view on `product`. The product is kept by value so
    /// a later fetch replacing the raw list does not close the detail.
    pub fn open_detail(&mut self, product: Product) -> ProductDetail {
        let detail = ProductDetail::project(&product);
        self.selected = Some(product);
        detail
    }

    pub fn open_detail_by_key(&mut self, key: &ProductKey) -> Option<ProductDetail> {
        let product = self.find(key)?.clone();
        Some(self.open_detail(product))
    }

    pub fn detail(&self) -> Option<ProductDetail> {
        self.selected.as_ref().map(ProductDetail::project)
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.selected.as_ref()
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
