//! # UniClub Command Line
//!
//! Read-only catalog queries against a store database, printed as JSON.
//!
//! ```text
//! uniclub-service [--config PATH] browse ["?category=1&sort=price_asc"]
//! uniclub-service [--config PATH] filters
//! uniclub-service [--config PATH] product <ID>
//! uniclub-service [--config PATH] health
//! ```

use std::env;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use uniclub_service::commands::catalog;
use uniclub_service::config::AppConfig;
use uniclub_service::{init_tracing, AppContext};

const USAGE: &str = "Usage: uniclub-service [--config PATH] <browse [QUERY] | filters | product ID | health>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config_path: Option<PathBuf> = None;
    let mut rest = Vec::new();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => config_path = args.next().map(PathBuf::from),
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ => rest.push(arg),
        }
    }

    let config = AppConfig::load(config_path.as_deref())?;
    let context = AppContext::bootstrap(config).await?;

    match rest.first().map(String::as_str) {
        Some("browse") => {
            let query = rest.get(1).map(String::as_str).unwrap_or("");
            print_json(&catalog::browse_catalog(&context.db, &context.config, query).await?)?;
        }
        Some("filters") => print_json(&catalog::catalog_filters(&context.db).await?)?,
        Some("product") => {
            let id = rest
                .get(1)
                .and_then(|raw| raw.parse::<i64>().ok())
                .ok_or("product needs a numeric id")?;
            print_json(&catalog::product_detail(&context.db, id).await?)?;
        }
        Some("health") => {
            let healthy = context.db.inner().health_check().await;
            info!(healthy, "Health check");
            println!("{}", if healthy { "ok" } else { "unhealthy" });
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    context.db.inner().close().await;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
