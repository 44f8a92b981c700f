use std::fmt;

use shared::domain::Barcode;

/// One of the three product lookups the directory supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogQuery {
    Barcode(Barcode),
    Search(String),
    DefaultListing,
}

impl CatalogQuery {
    /// Maps raw input to a lookup. Blank input in either mode falls back to
    /// the default listing.
    pub fn from_input(text: &str, barcode_mode: bool) -> Self {
        let text = text.trim();
        if text.is_empty() {
            Self::DefaultListing
        } else if barcode_mode {
            Self::Barcode(Barcode::new(text))
        } else {
            Self::Search(text.to_string())
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Self::Barcode(_) => "lookup_barcode",
            Self::Search(_) => "search",
            Self::DefaultListing => "default_listing",
        }
    }
}

impl fmt::Display for CatalogQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Barcode(code) => write!(f, "barcode {code}"),
            Self::Search(terms) => write!(f, "search '{terms}'"),
            Self::DefaultListing => f.write_str("default listing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_default_listing_in_both_modes() {
        assert_eq!(CatalogQuery::from_input("", false), CatalogQuery::DefaultListing);
        assert_eq!(CatalogQuery::from_input("   ", true), CatalogQuery::DefaultListing);
    }

    #[test]
    fn input_is_trimmed_and_routed_by_mode() {
        assert_eq!(
            CatalogQuery::from_input("  chocolate ", false),
            CatalogQuery::Search("chocolate".into())
        );
        assert_eq!(
            CatalogQuery::from_input(" 3017620422003 ", true),
            CatalogQuery::Barcode(Barcode::new("3017620422003"))
        );
    }
}
