//! # Demo Catalog Seeder
//!
//! Loads a small storefront catalog for development.
//!
//! ```bash
//! cargo run -p uniclub-db --bin seed
//! cargo run -p uniclub-db --bin seed -- --db ./data/uniclub.db
//! ```
//!
//! Skips seeding when the database already holds products.

use std::collections::HashMap;
use std::env;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uniclub_core::{FacetKind, Money, Product, Variant};
use uniclub_db::{Database, DbConfig};

const CATEGORIES: &[&str] = &["Áo", "Quần"];
const BRANDS: &[&str] = &["UniClub", "Basic Studio"];
const SIZES: &[&str] = &["M", "L", "30", "32"];
const COLORS: &[&str] = &["Đen", "Trắng", "Xanh"];
const PAYMENT_METHODS: &[&str] = &["Thanh toán khi nhận hàng", "Chuyển khoản ngân hàng"];
const SUPPLIERS: &[(&str, &str)] = &[
    ("Nhà cung cấp A", "0901234567"),
    ("Nhà cung cấp B", "0912345678"),
];

struct SeedProduct {
    name: &'static str,
    category: &'static str,
    brand: &'static str,
    price: i64,
    /// (sku, size, color, stock)
    variants: &'static [(&'static str, &'static str, &'static str, i64)],
}

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Áo thun cổ tròn",
        category: "Áo",
        brand: "UniClub",
        price: 150_000,
        variants: &[
            ("TS001-BLK-M", "M", "Đen", 40),
            ("TS001-BLK-L", "L", "Đen", 25),
            ("TS001-WHT-M", "M", "Trắng", 0),
        ],
    },
    SeedProduct {
        name: "Quần jean nam",
        category: "Quần",
        brand: "Basic Studio",
        price: 350_000,
        variants: &[("QJ002-BLU-30", "30", "Xanh", 12), ("QJ002-BLU-32", "32", "Xanh", 8)],
    },
    SeedProduct {
        name: "Áo hoodie",
        category: "Áo",
        brand: "UniClub",
        price: 280_000,
        variants: &[("HD003-BLK-L", "L", "Đen", 15)],
    },
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./uniclub_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if let Some(path) = args.get(i + 1) {
                    db_path = path.clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("UniClub demo catalog seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./uniclub_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let catalog = db.catalog();

    if !catalog.list_products().await?.is_empty() {
        warn!(path = %db_path, "Database already has products, skipping seed");
        return Ok(());
    }

    let mut ids: HashMap<(FacetKind, String), i64> = HashMap::new();
    for (kind, names) in [
        (FacetKind::Category, CATEGORIES),
        (FacetKind::Brand, BRANDS),
        (FacetKind::Size, SIZES),
        (FacetKind::Color, COLORS),
        (FacetKind::PaymentMethod, PAYMENT_METHODS),
    ] {
        for &name in names {
            let facet = catalog.insert_facet(kind, name).await?;
            ids.insert((kind, name.to_string()), facet.id);
        }
    }
    let id_of = |kind: FacetKind, name: &str| -> Result<i64, String> {
        ids.get(&(kind, name.to_string()))
            .copied()
            .ok_or_else(|| format!("unknown {kind:?} '{name}'"))
    };

    let start = Utc::now() - Duration::days(PRODUCTS.len() as i64);
    let mut variant_count = 0;
    for (n, seed) in PRODUCTS.iter().enumerate() {
        let created_at = start + Duration::days(n as i64);
        let product = catalog
            .insert_product(&Product {
                id: 0,
                name: seed.name.to_string(),
                description: None,
                category_id: id_of(FacetKind::Category, seed.category)?,
                brand_id: id_of(FacetKind::Brand, seed.brand)?,
                base_price: Money::from_dong(seed.price),
                is_active: true,
                created_at,
                updated_at: created_at,
            })
            .await?;

        for &(sku, size, color, stock) in seed.variants {
            catalog
                .insert_variant(&Variant {
                    id: 0,
                    sku: sku.to_string(),
                    product_id: product.id,
                    size_id: id_of(FacetKind::Size, size)?,
                    color_id: id_of(FacetKind::Color, color)?,
                    price: Some(Money::from_dong(seed.price)),
                    quantity: stock,
                    image: None,
                    is_active: true,
                })
                .await?;
            variant_count += 1;
        }
        info!(product = seed.name, "Seeded product");
    }

    for &(name, phone) in SUPPLIERS {
        db.suppliers().insert(name, Some(phone), None, None).await?;
    }

    info!(
        path = %db_path,
        products = PRODUCTS.len(),
        variants = variant_count,
        suppliers = SUPPLIERS.len(),
        "Seed complete"
    );
    Ok(())
}
