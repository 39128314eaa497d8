//! # Catalog Repository
//!
//! Products, variants, reviews and the facet lookup tables, plus the admin
//! stock adjustment.
//!
//! ## Storefront read path
//! ```text
//! snapshot() ──► CatalogSnapshot { products, variants, reviews, facets }
//!                     │
//!                     ├── price_bounds()      slider limits
//!                     ├── browse(&query)      filter/sort pipeline
//!                     └── variant_options()   ledger picker rows
//! ```
//!
//! The pipeline works on whole in-memory lists, so the snapshot loads every
//! row once instead of translating filters to SQL.

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use uniclub_core::catalog::{observed_price_bounds, visible_products, CatalogQuery, PriceRange};
use uniclub_core::ledger::{variant_options, VariantOption};
use uniclub_core::validation::{
    validate_adjustment, validate_price, validate_product_name, validate_required, validate_stars,
};
use uniclub_core::{
    Brand, Category, Color, CoreError, Facet, FacetKind, Product, Review, Size, Variant,
    UNKNOWN_LABEL,
};

use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str =
    "id, name, description, category_id, brand_id, base_price, is_active, created_at, updated_at";
const VARIANT_COLUMNS: &str = "id, sku, product_id, size_id, color_id, price, quantity, image, is_active";
const REVIEW_COLUMNS: &str = "id, product_id, user_id, stars, comment, is_active, created_at";

// =============================================================================
// Snapshot
// =============================================================================

/// Everything the storefront pipeline needs, loaded in one go.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub variants: Vec<Variant>,
    pub reviews: Vec<Review>,
    pub categories: Vec<Category>,
    pub brands: Vec<Brand>,
    pub sizes: Vec<Size>,
    pub colors: Vec<Color>,
}

impl CatalogSnapshot {
    pub fn price_bounds(&self) -> PriceRange {
        observed_price_bounds(&self.products, &self.variants)
    }

    /// Products matching `query`, in display order.
    pub fn browse(&self, query: &CatalogQuery) -> Vec<&Product> {
        visible_products(&self.products, &self.variants, &self.reviews, query)
    }

    /// Picker rows for the goods-receipt ledger.
    pub fn variant_options(&self) -> Vec<VariantOption> {
        variant_options(&self.products, &self.variants, &self.colors, &self.sizes)
    }

    pub fn size_name(&self, id: i64) -> &str {
        label(&self.sizes, id)
    }

    pub fn color_name(&self, id: i64) -> &str {
        label(&self.colors, id)
    }
}

fn label(facets: &[Facet], id: i64) -> &str {
    facets
        .iter()
        .find(|f| f.id == id)
        .map(|f| f.name.as_str())
        .unwrap_or(UNKNOWN_LABEL)
}

// =============================================================================
// Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Loads the whole catalog, active facets only.
    pub async fn snapshot(&self) -> DbResult<CatalogSnapshot> {
        let snapshot = CatalogSnapshot {
            products: self.list_products().await?,
            variants: self.list_variants().await?,
            reviews: self.list_reviews().await?,
            categories: self.active_facets(FacetKind::Category).await?,
            brands: self.active_facets(FacetKind::Brand).await?,
            sizes: self.active_facets(FacetKind::Size).await?,
            colors: self.active_facets(FacetKind::Color).await?,
        };

        debug!(
            products = snapshot.products.len(),
            variants = snapshot.variants.len(),
            reviews = snapshot.reviews.len(),
            "Catalog snapshot loaded"
        );
        Ok(snapshot)
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    pub async fn list_products(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        Ok(sqlx::query_as::<_, Product>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn get_product(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Inserts a product; `product.id` is ignored and assigned by the database.
    pub async fn insert_product(&self, product: &Product) -> DbResult<Product> {
        validate_product_name(&product.name)?;
        validate_price(product.base_price.amount())?;

        debug!(name = %product.name, "Inserting product");

        let sql = format!(
            "INSERT INTO products (name, description, category_id, brand_id, base_price, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {PRODUCT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(product.name.trim())
            .bind(&product.description)
            .bind(product.category_id)
            .bind(product.brand_id)
            .bind(product.base_price)
            .bind(product.is_active)
            .bind(product.created_at)
            .bind(product.updated_at)
            .fetch_one(&self.pool)
            .await?)
    }

    // -------------------------------------------------------------------------
    // Variants
    // -------------------------------------------------------------------------

    pub async fn list_variants(&self) -> DbResult<Vec<Variant>> {
        let sql = format!("SELECT {VARIANT_COLUMNS} FROM variants ORDER BY id");
        Ok(sqlx::query_as::<_, Variant>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn variants_for_product(&self, product_id: i64) -> DbResult<Vec<Variant>> {
        let sql = format!("SELECT {VARIANT_COLUMNS} FROM variants WHERE product_id = ?1 ORDER BY id");
        Ok(sqlx::query_as::<_, Variant>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn get_variant(&self, id: i64) -> DbResult<Option<Variant>> {
        let sql = format!("SELECT {VARIANT_COLUMNS} FROM variants WHERE id = ?1");
        Ok(sqlx::query_as::<_, Variant>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Inserts a variant. SKUs are unique across the catalog.
    pub async fn insert_variant(&self, variant: &Variant) -> DbResult<Variant> {
        validate_required("sku", &variant.sku)?;
        if let Some(price) = variant.price {
            validate_price(price.amount())?;
        }

        debug!(sku = %variant.sku, product_id = variant.product_id, "Inserting variant");

        let sql = format!(
            "INSERT INTO variants (sku, product_id, size_id, color_id, price, quantity, image, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {VARIANT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Variant>(&sql)
            .bind(variant.sku.trim())
            .bind(variant.product_id)
            .bind(variant.size_id)
            .bind(variant.color_id)
            .bind(variant.price)
            .bind(variant.quantity.max(0))
            .bind(&variant.image)
            .bind(variant.is_active)
            .fetch_one(&self.pool)
            .await?)
    }

    /// Adds `amount` units to a variant's stock.
    pub async fn increase_stock(&self, variant_id: i64, amount: i64) -> DbResult<Variant> {
        validate_adjustment(amount)?;

        let sql = format!(
            "UPDATE variants SET quantity = quantity + ?2 WHERE id = ?1 RETURNING {VARIANT_COLUMNS}"
        );
        let variant = sqlx::query_as::<_, Variant>(&sql)
            .bind(variant_id)
            .bind(amount)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Variant", variant_id))?;

        info!(variant_id, amount, stock = variant.quantity, "Stock increased");
        Ok(variant)
    }

    /// Removes `amount` units. Refused when stock would drop below zero.
    pub async fn decrease_stock(&self, variant_id: i64, amount: i64) -> DbResult<Variant> {
        validate_adjustment(amount)?;

        let sql = format!(
            "UPDATE variants SET quantity = quantity - ?2
             WHERE id = ?1 AND quantity >= ?2
             RETURNING {VARIANT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Variant>(&sql)
            .bind(variant_id)
            .bind(amount)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(variant) => {
                info!(variant_id, amount, stock = variant.quantity, "Stock decreased");
                Ok(variant)
            }
            None => {
                let current = self
                    .get_variant(variant_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Variant", variant_id))?;
                Err(CoreError::InsufficientStock {
                    sku: current.sku,
                    available: current.quantity,
                    requested: amount,
                }
                .into())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Reviews
    // -------------------------------------------------------------------------

    pub async fn list_reviews(&self) -> DbResult<Vec<Review>> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY id");
        Ok(sqlx::query_as::<_, Review>(&sql).fetch_all(&self.pool).await?)
    }

    /// Active reviews of one product, newest first.
    pub async fn reviews_for_product(&self, product_id: i64) -> DbResult<Vec<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE product_id = ?1 AND is_active = 1
             ORDER BY created_at DESC, id DESC"
        );
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn insert_review(
        &self,
        product_id: i64,
        user_id: i64,
        stars: i64,
        comment: Option<&str>,
    ) -> DbResult<Review> {
        validate_stars(stars)?;
        if self.get_product(product_id).await?.is_none() {
            return Err(DbError::not_found("Product", product_id));
        }

        let comment = comment.map(str::trim).filter(|c| !c.is_empty());
        let sql = format!(
            "INSERT INTO reviews (product_id, user_id, stars, comment, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)
             RETURNING {REVIEW_COLUMNS}"
        );
        let review = sqlx::query_as::<_, Review>(&sql)
            .bind(product_id)
            .bind(user_id)
            .bind(stars)
            .bind(comment)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        info!(review_id = review.id, product_id, stars, "Review stored");
        Ok(review)
    }

    // -------------------------------------------------------------------------
    // Facets
    // -------------------------------------------------------------------------

    pub async fn facets(&self, kind: FacetKind) -> DbResult<Vec<Facet>> {
        let sql = format!("SELECT id, name, is_active FROM {} ORDER BY id", kind.table());
        Ok(sqlx::query_as::<_, Facet>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn active_facets(&self, kind: FacetKind) -> DbResult<Vec<Facet>> {
        let sql = format!(
            "SELECT id, name, is_active FROM {} WHERE is_active = 1 ORDER BY id",
            kind.table()
        );
        Ok(sqlx::query_as::<_, Facet>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn get_facet(&self, kind: FacetKind, id: i64) -> DbResult<Option<Facet>> {
        let sql = format!("SELECT id, name, is_active FROM {} WHERE id = ?1", kind.table());
        Ok(sqlx::query_as::<_, Facet>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn insert_facet(&self, kind: FacetKind, name: &str) -> DbResult<Facet> {
        validate_required("name", name)?;
        let sql = format!(
            "INSERT INTO {} (name, is_active) VALUES (?1, 1) RETURNING id, name, is_active",
            kind.table()
        );
        Ok(sqlx::query_as::<_, Facet>(&sql)
            .bind(name.trim())
            .fetch_one(&self.pool)
            .await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::seeded;
    use uniclub_core::catalog::SortKey;
    use uniclub_core::Money;

    #[tokio::test]
    async fn test_snapshot_and_bounds() {
        let fx = seeded().await;
        let snapshot = fx.db.catalog().snapshot().await.unwrap();

        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.variants.len(), 2);
        assert_eq!(snapshot.colors.len(), 2);
        assert_eq!(
            snapshot.price_bounds(),
            PriceRange::new(Money::from_dong(150_000), Money::from_dong(150_000))
        );

        let options = snapshot.variant_options();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].color, "Đen");
        assert_eq!(options[0].size, "M");
        assert_eq!(snapshot.size_name(snapshot.variants[0].size_id), "M");
        assert_eq!(snapshot.color_name(9999), UNKNOWN_LABEL);
    }

    #[tokio::test]
    async fn test_browse_filters_on_stock() {
        let fx = seeded().await;
        let catalog = fx.db.catalog();
        catalog.decrease_stock(fx.variant_ids[0], 5).await.unwrap();

        let snapshot = catalog.snapshot().await.unwrap();
        let mut query = CatalogQuery::new();
        query.sort = SortKey::PriceAsc;
        assert_eq!(snapshot.browse(&query).len(), 1);

        query.in_stock_only = true;
        assert!(snapshot.browse(&query).is_empty());
    }

    #[tokio::test]
    async fn test_stock_adjustments() {
        let fx = seeded().await;
        let catalog = fx.db.catalog();
        let id = fx.variant_ids[0];

        assert_eq!(catalog.increase_stock(id, 3).await.unwrap().quantity, 8);
        assert_eq!(catalog.decrease_stock(id, 8).await.unwrap().quantity, 0);

        let err = catalog.decrease_stock(id, 1).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 0, requested: 1, .. })
        ));
        assert_eq!(catalog.get_variant(id).await.unwrap().unwrap().quantity, 0);

        assert!(matches!(
            catalog.increase_stock(id, 0).await.unwrap_err(),
            DbError::Domain(CoreError::Validation(_))
        ));
        assert!(matches!(
            catalog.increase_stock(9999, 1).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
        assert!(matches!(
            catalog.decrease_stock(9999, 1).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_duplicate_sku_is_rejected() {
        let fx = seeded().await;
        let catalog = fx.db.catalog();
        let mut copy = catalog.get_variant(fx.variant_ids[0]).await.unwrap().unwrap();
        copy.quantity = 1;

        let err = catalog.insert_variant(&copy).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_reviews() {
        let fx = seeded().await;
        let catalog = fx.db.catalog();

        let review = catalog
            .insert_review(fx.product_id, 7, 4, Some("  Vải mát  "))
            .await
            .unwrap();
        assert_eq!(review.comment.as_deref(), Some("Vải mát"));
        catalog.insert_review(fx.product_id, 8, 5, Some("   ")).await.unwrap();

        let reviews = catalog.reviews_for_product(fx.product_id).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().any(|r| r.comment.is_none()));

        assert!(matches!(
            catalog.insert_review(fx.product_id, 7, 6, None).await.unwrap_err(),
            DbError::Domain(CoreError::Validation(_))
        ));
        assert!(matches!(
            catalog.insert_review(9999, 7, 5, None).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_facets() {
        let fx = seeded().await;
        let catalog = fx.db.catalog();

        let methods = catalog.facets(FacetKind::PaymentMethod).await.unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "COD");

        assert!(catalog
            .get_facet(FacetKind::Color, 9999)
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            catalog.insert_facet(FacetKind::Color, "Đen").await.unwrap_err(),
            DbError::UniqueViolation { .. }
        ));
    }
}
