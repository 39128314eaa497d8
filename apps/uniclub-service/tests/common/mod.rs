//! Seeded in-memory store shared by the service tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use uniclub_core::checkout::BillingDetails;
use uniclub_core::storage::MemoryStore;
use uniclub_core::{FacetKind, Money, Product, SessionUser, Variant};
use uniclub_db::{Database, DbConfig};
use uniclub_service::config::AppConfig;
use uniclub_service::state::SharedStore;
use uniclub_service::AppContext;

pub struct Seeded {
    pub ctx: AppContext,
    pub category_ao: i64,
    pub category_quan: i64,
    pub tee: i64,
    pub jeans: i64,
    pub hoodie: i64,
    pub retired: i64,
    /// TS001-BLK-M, stock 5, 150 000
    pub tee_black_m: i64,
    /// TS001-BLK-L, stock 2, 160 000
    pub tee_black_l: i64,
    /// QJ002-BLU-M, stock 3, 350 000
    pub jeans_blue_m: i64,
    /// HD003-BLK-L, stock 0, 280 000
    pub hoodie_black_l: i64,
    pub supplier: i64,
    pub cod: i64,
    pub retired_method: i64,
}

/// Three listed products (one sold out), one unlisted product.
pub async fn seeded() -> Seeded {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let catalog = db.catalog();

    let ao = catalog.insert_facet(FacetKind::Category, "Áo").await.unwrap();
    let quan = catalog.insert_facet(FacetKind::Category, "Quần").await.unwrap();
    let brand = catalog.insert_facet(FacetKind::Brand, "UniClub").await.unwrap();
    let m = catalog.insert_facet(FacetKind::Size, "M").await.unwrap();
    let l = catalog.insert_facet(FacetKind::Size, "L").await.unwrap();
    let black = catalog.insert_facet(FacetKind::Color, "Đen").await.unwrap();
    let blue = catalog.insert_facet(FacetKind::Color, "Xanh").await.unwrap();
    let cod = catalog
        .insert_facet(FacetKind::PaymentMethod, "COD")
        .await
        .unwrap();
    let retired_method = catalog
        .insert_facet(FacetKind::PaymentMethod, "Ví cũ")
        .await
        .unwrap();
    sqlx::query("UPDATE payment_methods SET is_active = 0 WHERE id = ?1")
        .bind(retired_method.id)
        .execute(db.pool())
        .await
        .unwrap();

    let mut products = Vec::new();
    for (name, category, price, month, active) in [
        ("Áo thun cổ tròn", ao.id, 150_000, 5, true),
        ("Quần jean slim", quan.id, 350_000, 6, true),
        ("Áo hoodie", ao.id, 280_000, 7, true),
        ("Áo sơ mi cũ", ao.id, 200_000, 1, false),
    ] {
        let at = Utc.with_ymd_and_hms(2024, month, 1, 8, 0, 0).unwrap();
        let product = catalog
            .insert_product(&Product {
                id: 0,
                name: name.to_string(),
                description: None,
                category_id: category,
                brand_id: brand.id,
                base_price: Money::from_dong(price),
                is_active: active,
                created_at: at,
                updated_at: at,
            })
            .await
            .unwrap();
        products.push(product.id);
    }

    let mut variants = Vec::new();
    for (sku, product, size, color, price, quantity) in [
        ("TS001-BLK-M", products[0], m.id, black.id, 150_000, 5),
        ("TS001-BLK-L", products[0], l.id, black.id, 160_000, 2),
        ("QJ002-BLU-M", products[1], m.id, blue.id, 350_000, 3),
        ("HD003-BLK-L", products[2], l.id, black.id, 280_000, 0),
        ("SM004-BLK-M", products[3], m.id, black.id, 200_000, 4),
    ] {
        let variant = catalog
            .insert_variant(&Variant {
                id: 0,
                sku: sku.to_string(),
                product_id: product,
                size_id: size,
                color_id: color,
                price: Some(Money::from_dong(price)),
                quantity,
                image: None,
                is_active: true,
            })
            .await
            .unwrap();
        variants.push(variant.id);
    }

    let supplier = db
        .suppliers()
        .insert("Nhà cung cấp A", Some("0901234567"), None, None)
        .await
        .unwrap();

    let store: SharedStore = Arc::new(MemoryStore::new());
    let ctx = AppContext::with_store(db, store, AppConfig::default());

    Seeded {
        ctx,
        category_ao: ao.id,
        category_quan: quan.id,
        tee: products[0],
        jeans: products[1],
        hoodie: products[2],
        retired: products[3],
        tee_black_m: variants[0],
        tee_black_l: variants[1],
        jeans_blue_m: variants[2],
        hoodie_black_l: variants[3],
        supplier: supplier.id,
        cod: cod.id,
        retired_method: retired_method.id,
    }
}

pub fn shopper(id: i64) -> SessionUser {
    SessionUser {
        id,
        email: format!("khach{id}@uniclub.vn"),
        full_name: "Nguyễn Văn An".to_string(),
        token: format!("token-{id}"),
    }
}

pub fn billing() -> BillingDetails {
    BillingDetails {
        full_name: "Nguyễn Văn An".to_string(),
        phone: "0901234567".to_string(),
        email: "an@uniclub.vn".to_string(),
        address: "12 Lê Lợi".to_string(),
        province: "TP. Hồ Chí Minh".to_string(),
        district: "Quận 1".to_string(),
        ward: "Bến Nghé".to_string(),
    }
}
