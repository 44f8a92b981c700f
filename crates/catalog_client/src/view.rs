//! Derivation of the displayed catalog from the raw product list.
//!
//! Every call to [`ViewState::derive`] recomputes filter, sort and page from
//! scratch; nothing is patched incrementally.

use std::cmp::Ordering;

use shared::domain::{CategoryFilter, Product, SortDirection, SortKey, MISSING_GRADE_SENTINEL};

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Keeps products whose free-text `categories` contains the selected id,
/// ignoring case. `All` passes everything through in order.
pub fn filter_by_category<'a>(products: &'a [Product], filter: &CategoryFilter) -> Vec<&'a Product> {
    match filter {
        CategoryFilter::All => products.iter().collect(),
        CategoryFilter::Category(id) => {
            let needle = id.as_str().to_lowercase();
            products
                .iter()
                .filter(|product| {
                    product
                        .categories
                        .as_deref()
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
                })
                .collect()
        }
    }
}

pub fn compare_products(a: &Product, b: &Product, key: SortKey, direction: SortDirection) -> Ordering {
    let ordering = match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Grade => grade_rank(a).cmp(&grade_rank(b)),
    };
    direction.apply(ordering)
}

fn grade_rank(product: &Product) -> char {
    product
        .grade()
        .map(|grade| grade.letter())
        .unwrap_or(MISSING_GRADE_SENTINEL)
}

/// Stable: equal keys keep their filtered order in both directions.
pub fn sort_products(products: &mut [&Product], key: SortKey, direction: SortDirection) {
    products.sort_by(|a, b| compare_products(a, b, key, direction));
}

pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let end = page.max(1).saturating_mul(page_size).min(items.len());
    &items[..end]
}

/// User-controlled view parameters. The raw list lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    category: CategoryFilter,
    sort_key: SortKey,
    direction: SortDirection,
    page: usize,
    page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            category: CategoryFilter::All,
            sort_key: SortKey::default(),
            direction: SortDirection::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
        self.page = 1;
    }

    /// Re-selecting the active key while ascending flips to descending; any
    /// other selection sorts ascending by `key`.
    pub fn select_sort(&mut self, key: SortKey) {
        self.direction = if self.sort_key == key && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.sort_key = key;
        self.page = 1;
    }

    pub fn load_more(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    pub fn reset_page(&mut self) {
        self.page = 1;
    }

    pub fn derive<'a>(&self, raw: &'a [Product]) -> CatalogPage<'a> {
        let mut sorted = filter_by_category(raw, &self.category);
        sort_products(&mut sorted, self.sort_key, self.direction);
        let match_count = sorted.len();
        let visible_len = paginate(&sorted, self.page, self.page_size).len();
        sorted.truncate(visible_len);

        CatalogPage {
            has_more: visible_len < match_count,
            visible: sorted,
            match_count,
            page: self.page,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogPage<'a> {
    pub visible: Vec<&'a Product>,
    /// Size of the filtered list, before pagination.
    pub match_count: usize,
    pub page: usize,
    pub has_more: bool,
}

impl CatalogPage<'_> {
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
