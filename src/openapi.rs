use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Boutique Catalog API",
        version = "0.1.0",
        description = r#"
Catalog and admin backend for a small fashion boutique.

## Surface

- **Catalog**: public browsing with category/text filters and sorting
- **Categories**: category administration with derived slugs
- **Products**: product administration; each save replaces the complete
  image and variant sets with the payload's desired state
- **Stock**: movement records with atomic quantity adjustments

## Authentication

Write endpoints require the admin bearer token:

```
Authorization: Bearer <admin-token>
```

Reads are public.
        "#
    ),
    paths(
        crate::handlers::catalog::browse_catalog,
        crate::handlers::catalog::featured_products,
        crate::handlers::catalog::catalog_categories,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::stock::list_movements,
        crate::handlers::stock::record_movement,
    ),
    components(schemas(
        crate::handlers::categories::CategoryResponse,
        crate::handlers::categories::CreateCategoryRequest,
        crate::handlers::categories::UpdateCategoryRequest,
        crate::handlers::products::ProductResponse,
        crate::handlers::products::ImageResponse,
        crate::handlers::products::VariantResponse,
        crate::handlers::products::ProductDetailResponse,
        crate::handlers::products::SaveProductRequest,
        crate::handlers::stock::RecordStockMovementRequest,
        crate::handlers::stock::StockMovementResponse,
        crate::models::catalog_query::CatalogEntry,
        crate::models::catalog_query::CatalogSort,
        crate::models::image_list::ImageDraft,
        crate::models::variant_list::VariantDraft,
        crate::entities::stock_movement::MovementType,
        crate::errors::ErrorResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Catalog", description = "Public storefront browsing"),
        (name = "Categories", description = "Category administration"),
        (name = "Products", description = "Product administration"),
        (name = "Stock", description = "Stock movement records"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("opaque")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI mounted at /swagger-ui, serving the generated document
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
