//! # Catalog Filter/Sort Pipeline
//!
//! Turns the raw catalog (products, variants, reviews) plus a
//! [`CatalogQuery`] into the ordered list the storefront shows.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products ──► [active] ──► [search] ──► [category] ──► [brand]          │
//! │                                                         │               │
//! │          ┌──────────────────────────────────────────────┘               │
//! │          ▼                                                              │
//! │       [size ∃] ──► [color ∃] ──► [min price ∈ range] ──► [in stock]     │
//! │                                                         │               │
//! │                                                         ▼               │
//! │                          sort: newest | price-asc | price-desc | rating │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every predicate is independent and an empty selection means "do not
//! restrict". Size and color match when ANY active variant matches.
//! Inputs are borrowed and never modified, so repeated calls with the same
//! inputs return the same list.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::trace;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Product, Review, Variant};

// =============================================================================
// Sort Key
// =============================================================================

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum SortKey {
    /// Most recently created first.
    #[default]
    Newest,
    /// Cheapest minimum price first.
    PriceAsc,
    /// Most expensive minimum price first.
    PriceDesc,
    /// Highest average rating first.
    Rating,
}

impl SortKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::Rating => "rating",
        }
    }

    /// Parses the query-string form. Unknown keys yield `None`.
    pub fn parse(value: &str) -> Option<SortKey> {
        match value {
            "newest" => Some(SortKey::Newest),
            "price-asc" => Some(SortKey::PriceAsc),
            "price-desc" => Some(SortKey::PriceDesc),
            "rating" => Some(SortKey::Rating),
            _ => None,
        }
    }
}

// =============================================================================
// Price Range
// =============================================================================

/// Inclusive price interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceRange {
    pub min: Money,
    pub max: Money,
}

impl PriceRange {
    /// Builds a range, swapping the ends if they arrive reversed.
    pub fn new(a: Money, b: Money) -> Self {
        if a <= b {
            PriceRange { min: a, max: b }
        } else {
            PriceRange { min: b, max: a }
        }
    }

    #[inline]
    pub fn contains(&self, price: Money) -> bool {
        self.min <= price && price <= self.max
    }

    /// Clamps both ends into `bounds`.
    pub fn clamp_within(self, bounds: PriceRange) -> PriceRange {
        PriceRange::new(
            self.min.clamp_to(bounds.min, bounds.max),
            self.max.clamp_to(bounds.min, bounds.max),
        )
    }
}

// =============================================================================
// Catalog Query
// =============================================================================

/// The shopper's current discovery filters.
///
/// The price interval is stored already clamped to the catalog bounds it was
/// set against. A range covering the whole bounds is kept as `None` and does
/// not restrict anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CatalogQuery {
    pub categories: BTreeSet<i64>,
    pub brands: BTreeSet<i64>,
    pub sizes: BTreeSet<i64>,
    pub colors: BTreeSet<i64>,
    pub(crate) price: Option<PriceRange>,
    pub in_stock_only: bool,
    pub search: String,
    pub sort: SortKey,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrows the price interval, clamped into `bounds`.
    pub fn set_price_range(&mut self, min: Money, max: Money, bounds: PriceRange) {
        let range = PriceRange::new(min, max).clamp_within(bounds);
        self.price = (range != bounds).then_some(range);
    }

    /// Drops any price restriction.
    pub fn clear_price_range(&mut self) {
        self.price = None;
    }

    /// The explicit price interval, if one is active.
    pub fn price_filter(&self) -> Option<PriceRange> {
        self.price
    }

    /// The interval the UI slider should show.
    pub fn price_range(&self, bounds: PriceRange) -> PriceRange {
        self.price.unwrap_or(bounds)
    }

    /// Whether nothing restricts the list (sort is not a restriction).
    pub fn is_unrestricted(&self) -> bool {
        self.categories.is_empty()
            && self.brands.is_empty()
            && self.sizes.is_empty()
            && self.colors.is_empty()
            && self.price.is_none()
            && !self.in_stock_only
            && self.search.trim().is_empty()
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn active_variants_of<'a>(product_id: i64, variants: &'a [Variant]) -> Vec<&'a Variant> {
    variants
        .iter()
        .filter(|v| v.product_id == product_id && v.is_active)
        .collect()
}

fn min_price_of(product: &Product, active: &[&Variant]) -> Money {
    active
        .iter()
        .filter_map(|v| v.price)
        .min()
        .unwrap_or(product.base_price)
}

fn out_of_stock(active: &[&Variant]) -> bool {
    active.iter().all(|v| v.quantity <= 0)
}

/// Lowest price among the product's active variants, else its base price.
pub fn min_price(product: &Product, variants: &[Variant]) -> Money {
    min_price_of(product, &active_variants_of(product.id, variants))
}

/// Mean star rating over active reviews, `0.0` when there are none.
pub fn average_rating(product_id: i64, reviews: &[Review]) -> f64 {
    let (sum, count) = reviews
        .iter()
        .filter(|r| r.product_id == product_id && r.is_active)
        .fold((0i64, 0i64), |(s, c), r| (s + r.stars, c + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// True when the product has no active variant with stock.
pub fn is_out_of_stock(product_id: i64, variants: &[Variant]) -> bool {
    out_of_stock(&active_variants_of(product_id, variants))
}

/// `[min, max]` over every active, priced variant.
///
/// Falls back to active products' base prices when no variant carries a
/// price, and to `[0, 0]` for an empty catalog.
pub fn observed_price_bounds(products: &[Product], variants: &[Variant]) -> PriceRange {
    let from_variants = variants
        .iter()
        .filter(|v| v.is_active)
        .filter_map(|v| v.price);
    if let Some(range) = span(from_variants) {
        return range;
    }

    let from_products = products
        .iter()
        .filter(|p| p.is_active)
        .map(|p| p.base_price);
    span(from_products).unwrap_or(PriceRange {
        min: Money::zero(),
        max: Money::zero(),
    })
}

fn span(prices: impl Iterator<Item = Money>) -> Option<PriceRange> {
    prices.fold(None, |acc, p| match acc {
        None => Some(PriceRange { min: p, max: p }),
        Some(r) => Some(PriceRange {
            min: r.min.min(p),
            max: r.max.max(p),
        }),
    })
}

// =============================================================================
// Predicates
// =============================================================================

/// A product together with the facts every predicate and comparator needs.
struct Candidate<'a> {
    product: &'a Product,
    active: Vec<&'a Variant>,
    min_price: Money,
    rating: f64,
}

type Predicate = fn(&Candidate<'_>, &CatalogQuery, &str) -> bool;

fn is_listed(c: &Candidate<'_>, _: &CatalogQuery, _: &str) -> bool {
    c.product.is_active
}

fn matches_search(c: &Candidate<'_>, _: &CatalogQuery, needle: &str) -> bool {
    needle.is_empty() || c.product.name.to_lowercase().contains(needle)
}

fn in_categories(c: &Candidate<'_>, q: &CatalogQuery, _: &str) -> bool {
    q.categories.is_empty() || q.categories.contains(&c.product.category_id)
}

fn in_brands(c: &Candidate<'_>, q: &CatalogQuery, _: &str) -> bool {
    q.brands.is_empty() || q.brands.contains(&c.product.brand_id)
}

fn has_size(c: &Candidate<'_>, q: &CatalogQuery, _: &str) -> bool {
    q.sizes.is_empty() || c.active.iter().any(|v| q.sizes.contains(&v.size_id))
}

fn has_color(c: &Candidate<'_>, q: &CatalogQuery, _: &str) -> bool {
    q.colors.is_empty() || c.active.iter().any(|v| q.colors.contains(&v.color_id))
}

fn in_price_range(c: &Candidate<'_>, q: &CatalogQuery, _: &str) -> bool {
    q.price.map_or(true, |range| range.contains(c.min_price))
}

fn has_stock(c: &Candidate<'_>, q: &CatalogQuery, _: &str) -> bool {
    !q.in_stock_only || !out_of_stock(&c.active)
}

/// Applied in order. Adding a dimension means adding an entry here.
const PREDICATES: [(&str, Predicate); 8] = [
    ("active", is_listed),
    ("search", matches_search),
    ("category", in_categories),
    ("brand", in_brands),
    ("size", has_size),
    ("color", has_color),
    ("price", in_price_range),
    ("stock", has_stock),
];

fn compare(sort: SortKey, a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    match sort {
        SortKey::Newest => b.product.created_at.cmp(&a.product.created_at),
        SortKey::PriceAsc => a.min_price.cmp(&b.min_price),
        SortKey::PriceDesc => b.min_price.cmp(&a.min_price),
        SortKey::Rating => b.rating.total_cmp(&a.rating),
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Filters and orders the catalog for display.
///
/// Ties keep their input order.
pub fn visible_products<'a>(
    products: &'a [Product],
    variants: &'a [Variant],
    reviews: &[Review],
    query: &CatalogQuery,
) -> Vec<&'a Product> {
    let mut by_product: HashMap<i64, Vec<&'a Variant>> = HashMap::new();
    for v in variants.iter().filter(|v| v.is_active) {
        by_product.entry(v.product_id).or_default().push(v);
    }

    let needle = query.search.trim().to_lowercase();

    let mut candidates: Vec<Candidate<'a>> = products
        .iter()
        .map(|product| {
            let active = by_product.get(&product.id).cloned().unwrap_or_default();
            let min_price = min_price_of(product, &active);
            Candidate {
                product,
                active,
                min_price,
                rating: 0.0,
            }
        })
        .filter(|c| {
            PREDICATES.iter().all(|(name, keep)| {
                let kept = keep(c, query, &needle);
                if !kept {
                    trace!(product_id = c.product.id, predicate = *name, "Filtered out");
                }
                kept
            })
        })
        .collect();

    if query.sort == SortKey::Rating {
        for c in &mut candidates {
            c.rating = average_rating(c.product.id, reviews);
        }
    }
    candidates.sort_by(|a, b| compare(query.sort, a, b));

    candidates.into_iter().map(|c| c.product).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
