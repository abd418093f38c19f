pub mod catalog;
pub mod categories;
pub mod products;
pub mod stock;

use sea_orm::TransactionError;

use crate::errors::ServiceError;
use crate::models::slug::slugify;

pub use catalog::CatalogService;
pub use categories::CategoryService;
pub use products::ProductService;
pub use stock::StockService;

/// Collapses sea-orm's transaction error wrapper back into a ServiceError.
pub(crate) fn flatten_transaction_error(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db) => ServiceError::DatabaseError(db),
        TransactionError::Transaction(service) => service,
    }
}

/// Resolves the slug for a record: an explicitly supplied slug wins, the
/// name is the fallback, and either way the result passes through `slugify`.
/// A slug that normalizes to nothing is a validation error.
pub(crate) fn derive_slug(explicit: Option<&str>, name: &str) -> Result<String, ServiceError> {
    let source = explicit
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(name);
    let slug = slugify(source);
    if slug.is_empty() {
        return Err(ServiceError::ValidationError(
            "Name must contain at least one letter or digit".to_string(),
        ));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_slug_wins_over_name() {
        assert_eq!(
            derive_slug(Some("Promo Verão"), "Vestido Floral").unwrap(),
            "promo-verao"
        );
    }

    #[test]
    fn blank_explicit_slug_falls_back_to_name() {
        assert_eq!(
            derive_slug(Some("   "), "Vestido Floral").unwrap(),
            "vestido-floral"
        );
        assert_eq!(derive_slug(None, "Vestido Floral").unwrap(), "vestido-floral");
    }

    #[test]
    fn unsluggable_name_is_rejected() {
        assert!(derive_slug(None, "!!!").is_err());
    }
}
