//! Plain-text rendering of catalog state.

use std::fmt::Write as _;

use catalog_client::{
    cart::Cart,
    detail::{ProductDetail, ProductImage},
    CatalogState, FetchOutcome,
};
use shared::domain::{Category, CategoryFilter, SortDirection, SortKey};

pub const NO_PRODUCTS: &str = "No products found.\n";

/// Catalog after a query, noting when the query's own results were superseded.
pub fn query_result(state: &CatalogState, outcome: FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Applied { .. } => catalog(state),
        FetchOutcome::Stale { .. } => {
            format!("(a newer query replaced these results)\n{}", catalog(state))
        }
    }
}

pub fn catalog(state: &CatalogState) -> String {
    let mut out = String::new();
    let page = state.page();
    let view = state.view();
    let sort = match (view.sort_key(), view.direction()) {
        (SortKey::Name, SortDirection::Asc) => "name \u{2191}",
        (SortKey::Name, SortDirection::Desc) => "name \u{2193}",
        (SortKey::Grade, SortDirection::Asc) => "grade \u{2191}",
        (SortKey::Grade, SortDirection::Desc) => "grade \u{2193}",
    };
    let category = match view.category() {
        CategoryFilter::All => "all".to_string(),
        CategoryFilter::Category(id) => id.to_string(),
    };
    let _ = writeln!(
        out,
        "{} products found | category: {category} | sort: {sort} | cart: {}",
        page.match_count,
        state.cart().total_quantity()
    );

    if page.is_empty() {
        out.push_str(NO_PRODUCTS);
        return out;
    }

    for (index, product) in page.visible.iter().enumerate() {
        let grade = product
            .nutrition_grade
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_else(|| "-".to_string());
        let _ = write!(out, "{:>3}. [{grade:^3}] {}", index + 1, product.name);
        if let Some(brand) = &product.brand {
            let _ = write!(out, " ({brand})");
        }
        out.push('\n');
    }

    if page.has_more {
        let _ = writeln!(
            out,
            "showing {} of {}, 'more' to load the next page",
            page.visible.len(),
            page.match_count
        );
    }
    out
}

pub fn detail(detail: &ProductDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", detail.name);
    let _ = writeln!(out, "{}", "=".repeat(detail.name.chars().count()));

    match &detail.image {
        ProductImage::Url(url) => {
            let _ = writeln!(out, "Image: {url}");
        }
        ProductImage::Placeholder => out.push_str("Image: (none)\n"),
    }
    if let Some(badge) = &detail.grade_badge {
        let _ = writeln!(out, "Nutrition grade: {} [{}]", badge.label, badge.color.name());
    }
    if let Some(brand) = &detail.brand {
        let _ = writeln!(out, "Brand: {brand}");
    }
    if let Some(categories) = &detail.categories {
        let _ = writeln!(out, "Categories: {categories}");
    }
    if let Some(ingredients) = &detail.ingredients {
        let _ = writeln!(out, "\nIngredients\n{ingredients}");
    }
    if !detail.nutrients.is_empty() {
        out.push_str("\nNutritional information (per 100g)\n");
        for fact in &detail.nutrients {
            let _ = writeln!(out, "  {:<8} {} {}", fact.label, fact.value, fact.unit);
        }
    }
    if !detail.labels.is_empty() {
        let _ = writeln!(out, "\nLabels: {}", detail.labels.join(" | "));
    }
    out
}

pub fn categories(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories available.\n".to_string();
    }
    let mut out = String::new();
    for category in categories {
        let _ = writeln!(out, "{:<40} {}", category.id, category.name);
    }
    out
}

pub fn cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty.\n".to_string();
    }
    let mut out = String::new();
    for line in cart.lines() {
        let _ = writeln!(out, "{:>3} x {}", line.quantity, line.product.name);
    }
    let _ = writeln!(out, "{} items", cart.total_quantity());
    out
}
