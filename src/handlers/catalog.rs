use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::handlers::categories::CategoryResponse;
use crate::handlers::common::{map_service_error, success_response};
use crate::models::catalog_query::{CatalogQuery, CatalogSort, CategoryFilter};
use crate::AppState;

/// Creates the router for the public storefront endpoints. Everything here
/// is read-only and unauthenticated.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(browse_catalog))
        .route("/featured", get(featured_products))
        .route("/categories", get(catalog_categories))
}

/// Browse the catalog with filter and sort criteria
#[utoipa::path(
    get,
    path = "/api/v1/catalog",
    params(CatalogBrowseParams),
    responses(
        (status = 200, description = "Catalog view", body = [crate::models::catalog_query::CatalogEntry]),
        (status = 400, description = "Invalid filter", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn browse_catalog(
    State(state): State<AppState>,
    Query(params): Query<CatalogBrowseParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let query = CatalogQuery {
        category: parse_category_filter(params.category.as_deref())?,
        search: params.q,
        sort: params.sort.unwrap_or_default(),
    };

    let entries = state
        .services
        .catalog
        .browse(&query)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(entries))
}

/// Featured products for the home page shelf
#[utoipa::path(
    get,
    path = "/api/v1/catalog/featured",
    params(FeaturedParams),
    responses(
        (status = 200, description = "Featured products", body = [crate::models::catalog_query::CatalogEntry])
    ),
    tag = "Catalog"
)]
pub async fn featured_products(
    State(state): State<AppState>,
    Query(params): Query<FeaturedParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let entries = state
        .services
        .catalog
        .featured(params.limit)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(entries))
}

/// Active categories for the storefront filter bar
#[utoipa::path(
    get,
    path = "/api/v1/catalog/categories",
    responses(
        (status = 200, description = "Active categories", body = [CategoryResponse])
    ),
    tag = "Catalog"
)]
pub async fn catalog_categories(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let categories = state
        .services
        .catalog
        .active_categories()
        .await
        .map_err(map_service_error)?;

    let categories: Vec<CategoryResponse> =
        categories.into_iter().map(CategoryResponse::from).collect();
    Ok(success_response(categories))
}

/// Parses the category criterion: absent, blank or the "all" sentinel
/// disable filtering, anything else must be a category ID.
fn parse_category_filter(raw: Option<&str>) -> Result<CategoryFilter, ApiError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(CategoryFilter::All),
        Some(value) => Uuid::parse_str(value)
            .map(CategoryFilter::Only)
            .map_err(|_| ApiError::BadRequest(format!("Invalid category filter: {:?}", value))),
    }
}

/// Query parameters for catalog browsing
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CatalogBrowseParams {
    /// Category ID, or "all" to disable the filter
    pub category: Option<String>,
    /// Case-insensitive text filter against name or description
    pub q: Option<String>,
    /// Sort mode: newest, price-asc, price-desc or name
    pub sort: Option<CatalogSort>,
}

/// Query parameters for the featured shelf
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct FeaturedParams {
    pub limit: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_sentinel_disables_category_filter() {
        assert_eq!(parse_category_filter(None).unwrap(), CategoryFilter::All);
        assert_eq!(
            parse_category_filter(Some("all")).unwrap(),
            CategoryFilter::All
        );
        assert_eq!(
            parse_category_filter(Some("  ")).unwrap(),
            CategoryFilter::All
        );
    }

    #[test]
    fn concrete_category_requires_valid_id() {
        let id = Uuid::new_v4();
        assert_eq!(
            parse_category_filter(Some(&id.to_string())).unwrap(),
            CategoryFilter::Only(id)
        );
        assert!(parse_category_filter(Some("not-a-uuid")).is_err());
    }

    #[test]
    fn sort_param_parses_kebab_case() {
        let params: CatalogBrowseParams =
            serde_json::from_str(r#"{"sort": "price-asc"}"#).unwrap();
        assert_eq!(params.sort, Some(CatalogSort::PriceAsc));
    }
}
