//! # Validation Module
//!
//! Single-field validators shared by the storefront and admin flows.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Forms (ledger, billing)                                      │
//! │  ├── FieldErrors map, returned and rendered inline                     │
//! │  └── Never thrown                                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service command                                              │
//! │  └── THIS MODULE: single-value business rules                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE (variants.sku)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{MAX_STARS, MIN_STARS};
use crate::MAX_SEARCH_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Rejects empty or whitespace-only values.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 255 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required("name", name)?;

    if name.trim().chars().count() > 255 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 255,
        });
    }

    Ok(())
}

/// Validates catalog search text.
///
/// ## Rules
/// - Can be empty (no restriction)
/// - At most [`MAX_SEARCH_LEN`] characters
///
/// ## Returns
/// The trimmed search string.
///
/// ## Example
/// ```rust
/// use uniclub_core::validation::validate_search_query;
///
/// assert_eq!(validate_search_query("  hoodie ").unwrap(), "hoodie");
/// assert!(validate_search_query(&"a".repeat(101)).is_err());
/// ```
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

/// Minimal email shape check: one `@`, non-empty local part, dotted domain.
///
/// ## Example
/// ```rust
/// use uniclub_core::validation::validate_email;
///
/// assert!(validate_email("an@uniclub.vn").is_ok());
/// assert!(validate_email("an@uniclub").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    validate_required("email", email)?;

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.contains(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(())
}

/// Vietnamese phone numbers: 10 digits starting with 0, or `+84` and 9 digits.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();
    validate_required("phone", phone)?;

    let digits = if let Some(rest) = phone.strip_prefix("+84") {
        rest.len() == 9 && rest.chars().all(|c| c.is_ascii_digit())
    } else {
        phone.len() == 10 && phone.starts_with('0') && phone.chars().all(|c| c.is_ascii_digit())
    };

    if !digits {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be 10 digits starting with 0".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock adjustment amount.
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_adjustment(amount: i64) -> ValidationResult<()> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a price in đồng. Zero is allowed.
pub fn validate_price(amount: i64) -> ValidationResult<()> {
    if amount < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a review star rating.
pub fn validate_stars(stars: i64) -> ValidationResult<()> {
    if !(MIN_STARS..=MAX_STARS).contains(&stars) {
        return Err(ValidationError::OutOfRange {
            field: "stars".to_string(),
            min: MIN_STARS,
            max: MAX_STARS,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("ward", "Phường 13").is_ok());
        assert!(validate_required("ward", "").is_err());
        assert!(validate_required("ward", "   ").is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Áo hoodie nỉ").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_search_query_counts_chars() {
        // 100 multi-byte characters are still within the limit
        assert!(validate_search_query(&"á".repeat(100)).is_ok());
        assert!(validate_search_query(&"á".repeat(101)).is_err());
        assert_eq!(validate_search_query("").unwrap(), "");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("khach@gmail.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("@gmail.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("a@gmail.").is_err());
        assert!(validate_email("a b@gmail.com").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("0901234567").is_ok());
        assert!(validate_phone("+84901234567").is_ok());
        assert!(validate_phone("901234567").is_err());
        assert!(validate_phone("09012345ab").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn test_numeric_validators() {
        assert!(validate_adjustment(1).is_ok());
        assert!(validate_adjustment(0).is_err());
        assert!(validate_adjustment(-3).is_err());

        assert!(validate_price(0).is_ok());
        assert!(validate_price(-1).is_err());

        assert!(validate_stars(1).is_ok());
        assert!(validate_stars(5).is_ok());
        assert!(validate_stars(0).is_err());
        assert!(validate_stars(6).is_err());
    }
}
