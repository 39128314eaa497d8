//! # Catalog Query Codec
//!
//! Two-way mapping between the storefront URL query string and
//! [`CatalogQuery`].
//!
//! ## Keys
//! ```text
//! ┌────────────┬──────────────────────────┬──────────────────────────────┐
//! │ key        │ value                    │ omitted when                 │
//! ├────────────┼──────────────────────────┼──────────────────────────────┤
//! │ category   │ comma-joined ids         │ set empty                    │
//! │ brand      │ comma-joined ids         │ set empty                    │
//! │ size       │ comma-joined ids         │ set empty                    │
//! │ color      │ comma-joined ids         │ set empty                    │
//! │ priceMin   │ integer đồng             │ equal to lower bound         │
//! │ priceMax   │ integer đồng             │ equal to upper bound         │
//! │ stock      │ "1"                      │ stock-only off               │
//! │ search     │ text                     │ empty                        │
//! │ sort       │ price-asc|price-desc|... │ newest                       │
//! └────────────┴──────────────────────────┴──────────────────────────────┘
//! ```
//!
//! Parsing is forgiving: unknown keys, malformed ids and unknown sort keys
//! are dropped, and prices are clamped into the catalog bounds. When a key
//! repeats, the first occurrence wins.
//!
//! ```rust
//! use uniclub_core::catalog::{CatalogQuery, PriceRange, SortKey};
//! use uniclub_core::Money;
//!
//! let bounds = PriceRange::new(Money::from_dong(100_000), Money::from_dong(900_000));
//! let query = CatalogQuery::parse("?category=2,1&sort=price-asc&bogus=1", bounds);
//! assert_eq!(query.sort, SortKey::PriceAsc);
//! assert_eq!(query.to_query_string(bounds), "category=1%2C2&sort=price-asc");
//! ```

use std::collections::BTreeSet;

use tracing::debug;
use url::form_urlencoded;

use crate::catalog::{CatalogQuery, PriceRange, SortKey};
use crate::money::Money;
use crate::MAX_SEARCH_LEN;

const KEY_CATEGORY: &str = "category";
const KEY_BRAND: &str = "brand";
const KEY_SIZE: &str = "size";
const KEY_COLOR: &str = "color";
const KEY_PRICE_MIN: &str = "priceMin";
const KEY_PRICE_MAX: &str = "priceMax";
const KEY_STOCK: &str = "stock";
const KEY_SEARCH: &str = "search";
const KEY_SORT: &str = "sort";

fn parse_ids(value: &str) -> BTreeSet<i64> {
    value
        .split(',')
        .filter_map(|token| token.trim().parse::<i64>().ok())
        .collect()
}

fn join_ids(ids: &BTreeSet<i64>) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "1" | "true")
}

impl CatalogQuery {
    /// Reads a query string (with or without the leading `?`).
    pub fn parse(query: &str, bounds: PriceRange) -> CatalogQuery {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut parsed = CatalogQuery::new();
        let mut price_min: Option<i64> = None;
        let mut price_max: Option<i64> = None;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if !seen.insert(key.to_string()) {
                continue;
            }
            match &*key {
                KEY_CATEGORY => parsed.categories = parse_ids(&value),
                KEY_BRAND => parsed.brands = parse_ids(&value),
                KEY_SIZE => parsed.sizes = parse_ids(&value),
                KEY_COLOR => parsed.colors = parse_ids(&value),
                KEY_PRICE_MIN => price_min = value.trim().parse().ok(),
                KEY_PRICE_MAX => price_max = value.trim().parse().ok(),
                KEY_STOCK => parsed.in_stock_only = parse_flag(&value),
                KEY_SEARCH => {
                    parsed.search = value.trim().chars().take(MAX_SEARCH_LEN).collect();
                }
                KEY_SORT => parsed.sort = SortKey::parse(value.trim()).unwrap_or_default(),
                other => debug!(key = other, "Ignoring unknown catalog query key"),
            }
        }

        if price_min.is_some() || price_max.is_some() {
            parsed.set_price_range(
                price_min.map(Money::from_dong).unwrap_or(bounds.min),
                price_max.map(Money::from_dong).unwrap_or(bounds.max),
                bounds,
            );
        }

        parsed
    }

    /// Writes the query string (without `?`), omitting every key at its default.
    pub fn to_query_string(&self, bounds: PriceRange) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());

        for (key, ids) in [
            (KEY_CATEGORY, &self.categories),
            (KEY_BRAND, &self.brands),
            (KEY_SIZE, &self.sizes),
            (KEY_COLOR, &self.colors),
        ] {
            if !ids.is_empty() {
                out.append_pair(key, &join_ids(ids));
            }
        }

        if let Some(range) = self.price_filter() {
            if range.min != bounds.min {
                out.append_pair(KEY_PRICE_MIN, &range.min.amount().to_string());
            }
            if range.max != bounds.max {
                out.append_pair(KEY_PRICE_MAX, &range.max.amount().to_string());
            }
        }

        if self.in_stock_only {
            out.append_pair(KEY_STOCK, "1");
        }

        let search = self.search.trim();
        if !search.is_empty() {
            out.append_pair(KEY_SEARCH, search);
        }

        if self.sort != SortKey::default() {
            out.append_pair(KEY_SORT, self.sort.as_str());
        }

        out.finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> PriceRange {
        PriceRange::new(Money::from_dong(100_000), Money::from_dong(900_000))
    }

    #[test]
    fn test_default_query_is_empty_string() {
        assert_eq!(CatalogQuery::new().to_query_string(bounds()), "");
        assert_eq!(CatalogQuery::parse("", bounds()), CatalogQuery::new());
        assert_eq!(CatalogQuery::parse("?", bounds()), CatalogQuery::new());
    }

    #[test]
    fn test_full_round_trip() {
        let mut q = CatalogQuery::new();
        q.categories.extend([3, 1]);
        q.brands.insert(2);
        q.sizes.extend([4, 5]);
        q.colors.insert(7);
        q.set_price_range(Money::from_dong(150_000), Money::from_dong(250_000), bounds());
        q.in_stock_only = true;
        q.search = "áo thun & quần".to_string();
        q.sort = SortKey::Rating;

        let encoded = q.to_query_string(bounds());
        assert_eq!(CatalogQuery::parse(&encoded, bounds()), q);
        // and the second pass is byte-for-byte the same
        assert_eq!(
            CatalogQuery::parse(&encoded, bounds()).to_query_string(bounds()),
            encoded
        );
    }

    #[test]
    fn test_key_order_and_encoding() {
        let mut q = CatalogQuery::new();
        q.sort = SortKey::PriceDesc;
        q.in_stock_only = true;
        q.categories.extend([2, 1]);
        q.search = "hoodie nỉ".to_string();
        assert_eq!(
            q.to_query_string(bounds()),
            "category=1%2C2&stock=1&search=hoodie+n%E1%BB%89&sort=price-desc"
        );
    }

    #[test]
    fn test_single_price_end_is_omitted_at_bound() {
        let mut q = CatalogQuery::new();
        q.set_price_range(Money::from_dong(100_000), Money::from_dong(500_000), bounds());
        assert_eq!(q.to_query_string(bounds()), "priceMax=500000");

        let parsed = CatalogQuery::parse("priceMax=500000", bounds());
        assert_eq!(parsed, q);
    }

    #[test]
    fn test_prices_are_clamped_into_bounds() {
        let q = CatalogQuery::parse("priceMin=1&priceMax=99999999", bounds());
        assert_eq!(q.price_filter(), None);
        assert_eq!(q.to_query_string(bounds()), "");

        let q = CatalogQuery::parse("priceMin=950000", bounds());
        assert_eq!(
            q.price_filter(),
            Some(PriceRange::new(Money::from_dong(900_000), Money::from_dong(900_000)))
        );
    }

    #[test]
    fn test_malformed_tokens_are_ignored() {
        let q = CatalogQuery::parse(
            "category=1,x,,3&brand=abc&priceMin=cheap&sort=random&stock=yes&utm_source=mail",
            bounds(),
        );
        assert_eq!(q.categories, BTreeSet::from([1, 3]));
        assert!(q.brands.is_empty());
        assert_eq!(q.price_filter(), None);
        assert_eq!(q.sort, SortKey::Newest);
        assert!(!q.in_stock_only);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let q = CatalogQuery::parse("sort=rating&sort=price-asc&brand=1&brand=2", bounds());
        assert_eq!(q.sort, SortKey::Rating);
        assert_eq!(q.brands, BTreeSet::from([1]));
    }

    #[test]
    fn test_search_is_trimmed_and_capped() {
        let long = "a".repeat(MAX_SEARCH_LEN + 20);
        let q = CatalogQuery::parse(&format!("search=++{long}"), bounds());
        assert_eq!(q.search.len(), MAX_SEARCH_LEN);
    }
}
