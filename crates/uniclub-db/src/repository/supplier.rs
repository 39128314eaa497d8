//! # Supplier Repository

use sqlx::SqlitePool;
use tracing::debug;

use uniclub_core::validation::{validate_email, validate_phone, validate_required};
use uniclub_core::Supplier;

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Active suppliers by name, for the receipt form dropdown.
    pub async fn list_active(&self) -> DbResult<Vec<Supplier>> {
        Ok(sqlx::query_as::<_, Supplier>(
            "SELECT id, name, phone, email, address, is_active
             FROM suppliers WHERE is_active = 1 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Supplier>> {
        Ok(sqlx::query_as::<_, Supplier>(
            "SELECT id, name, phone, email, address, is_active FROM suppliers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Blank optional fields are stored as NULL; present ones must be well formed.
    pub async fn insert(
        &self,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
        address: Option<&str>,
    ) -> DbResult<Supplier> {
        validate_required("name", name)?;
        let phone = present(phone);
        let email = present(email);
        if let Some(phone) = phone {
            validate_phone(phone)?;
        }
        if let Some(email) = email {
            validate_email(email)?;
        }

        debug!(name = %name, "Inserting supplier");

        Ok(sqlx::query_as::<_, Supplier>(
            "INSERT INTO suppliers (name, phone, email, address, is_active)
             VALUES (?1, ?2, ?3, ?4, 1)
             RETURNING id, name, phone, email, address, is_active",
        )
        .bind(name.trim())
        .bind(phone)
        .bind(email)
        .bind(present(address))
        .fetch_one(&self.pool)
        .await?)
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
