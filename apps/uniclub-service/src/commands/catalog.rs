//! # Catalog Commands
//!
//! ```text
//! "?category=1&sort=price-asc"
//!        │
//!        ▼
//! CatalogQuery::parse(bounds) ──► snapshot.browse() ──► ProductCard × n
//!        │
//!        └──► to_query_string() ── normalised string for the address bar
//! ```

use serde::Serialize;
use tracing::{debug, info};

use uniclub_core::catalog::{
    average_rating, is_out_of_stock, min_price, CatalogQuery, PriceRange,
};
use uniclub_core::{Brand, Category, Color, CoreError, FacetKind, Money, Product, Review, Size};

use super::label;
use crate::error::ApiResult;
use crate::state::{ConfigState, DbState};

// =============================================================================
// Response Types
// =============================================================================

/// One tile in the product grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub brand_id: i64,
    pub min_price: Money,
    pub average_rating: f64,
    pub out_of_stock: bool,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResponse {
    pub products: Vec<ProductCard>,
    /// Canonical query string for the current filters, without `?`.
    pub query: String,
    pub filters: CatalogQuery,
    /// Slider limits.
    pub price_bounds: PriceRange,
    /// Slider position.
    pub price_range: PriceRange,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilters {
    pub categories: Vec<Category>,
    pub brands: Vec<Brand>,
    pub sizes: Vec<Size>,
    pub colors: Vec<Color>,
    pub price_bounds: PriceRange,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantView {
    pub id: i64,
    pub sku: String,
    pub size: String,
    pub color: String,
    pub price: Money,
    pub quantity: i64,
    pub in_stock: bool,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: Product,
    pub variants: Vec<VariantView>,
    pub reviews: Vec<Review>,
    pub average_rating: f64,
    pub min_price: Money,
    pub out_of_stock: bool,
}

// =============================================================================
// Commands
// =============================================================================

/// Filters and sorts the catalog for a storefront query string.
pub async fn browse_catalog(
    db: &DbState,
    config: &ConfigState,
    query_string: &str,
) -> ApiResult<BrowseResponse> {
    let snapshot = db.inner().catalog().snapshot().await?;
    let bounds = snapshot.price_bounds();

    let mut query = CatalogQuery::parse(query_string, bounds);
    let limit = config.search_max_len();
    if query.search.chars().count() > limit {
        query.search = query.search.chars().take(limit).collect();
    }

    let products: Vec<ProductCard> = snapshot
        .browse(&query)
        .into_iter()
        .map(|p| ProductCard {
            id: p.id,
            name: p.name.clone(),
            category_id: p.category_id,
            brand_id: p.brand_id,
            min_price: min_price(p, &snapshot.variants),
            average_rating: average_rating(p.id, &snapshot.reviews),
            out_of_stock: is_out_of_stock(p.id, &snapshot.variants),
            image: snapshot
                .variants
                .iter()
                .find(|v| v.product_id == p.id && v.is_active && v.image.is_some())
                .and_then(|v| v.image.clone()),
        })
        .collect();

    debug!(matched = products.len(), total = snapshot.products.len(), "Catalog browsed");

    Ok(BrowseResponse {
        query: query.to_query_string(bounds),
        price_range: query.price_range(bounds),
        price_bounds: bounds,
        filters: query,
        products,
    })
}

/// Everything the filter sidebar lists.
pub async fn catalog_filters(db: &DbState) -> ApiResult<CatalogFilters> {
    let snapshot = db.inner().catalog().snapshot().await?;
    Ok(CatalogFilters {
        price_bounds: snapshot.price_bounds(),
        categories: snapshot.categories,
        brands: snapshot.brands,
        sizes: snapshot.sizes,
        colors: snapshot.colors,
    })
}

/// A listed product with its active variants and reviews.
pub async fn product_detail(db: &DbState, product_id: i64) -> ApiResult<ProductDetail> {
    let catalog = db.inner().catalog();
    let product = catalog
        .get_product(product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or(CoreError::ProductNotFound(product_id))?;

    let variants = catalog.variants_for_product(product_id).await?;
    let reviews = catalog.reviews_for_product(product_id).await?;
    let sizes = catalog.facets(FacetKind::Size).await?;
    let colors = catalog.facets(FacetKind::Color).await?;

    let views = variants
        .iter()
        .filter(|v| v.is_active)
        .map(|v| VariantView {
            id: v.id,
            sku: v.sku.clone(),
            size: label(&sizes, v.size_id),
            color: label(&colors, v.color_id),
            price: v.effective_price(&product),
            quantity: v.quantity,
            in_stock: v.in_stock(),
            image: v.image.clone(),
        })
        .collect();

    info!(product_id, "Product viewed");

    Ok(ProductDetail {
        average_rating: average_rating(product_id, &reviews),
        min_price: min_price(&product, &variants),
        out_of_stock: is_out_of_stock(product_id, &variants),
        variants: views,
        reviews,
        product,
    })
}
