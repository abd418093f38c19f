use axum::{
    extract::{Json, Path, Query, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedAdmin;
use crate::entities::{ProductImageModel, ProductModel, ProductVariantModel};
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    PaginatedResponse, PaginationParams,
};
use crate::models::{ImageDraft, ImageList, VariantDraft, VariantList};
use crate::services::products::{ProductDetail, ProductListQuery, ProductSaveInput};
use crate::AppState;

/// Creates the router for product endpoints. Reads are public; writes
/// require the admin token.
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// List products for administration
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductListParams, PaginationParams),
    responses(
        (status = 200, description = "Products retrieved", body = [ProductResponse])
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let query = ProductListQuery {
        search: params.search,
        is_active: params.is_active,
        category_id: params.category_id,
        limit: Some(pagination.per_page),
        offset: Some(pagination.offset()),
    };

    let result = state
        .services
        .products
        .list_products(query)
        .await
        .map_err(map_service_error)?;

    let products: Vec<ProductResponse> = result
        .products
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(success_response(PaginatedResponse::new(
        products,
        pagination.page,
        pagination.per_page,
        result.total,
    )))
}

/// Get a product with its images, variants and effective stock
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product retrieved", body = ProductDetailResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let detail = state
        .services
        .products
        .get_product_detail(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ProductDetailResponse::from(detail)))
}

/// Create a product together with its image and variant sets
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = SaveProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductDetailResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 409, description = "Slug already taken", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn create_product(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Json(payload): Json<SaveProductRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let input = build_save_input(payload, state.config.max_product_images)?;

    let detail = state
        .services
        .products
        .create_product(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(ProductDetailResponse::from(detail)))
}

/// Update a product, replacing its image and variant sets with the payload
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = SaveProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductDetailResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn update_product(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveProductRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;
    let input = build_save_input(payload, state.config.max_product_images)?;

    let detail = state
        .services
        .products
        .update_product(id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ProductDetailResponse::from(detail)))
}

/// Delete a product and everything it owns
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .products
        .delete_product(id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

/// Assembles the service input, pushing the payload's image and variant
/// arrays through the draft lists so their invariants (maximum image count,
/// non-negative stock) hold before the save procedure runs.
fn build_save_input(
    payload: SaveProductRequest,
    max_images: usize,
) -> Result<ProductSaveInput, ApiError> {
    let images = ImageList::from_drafts(payload.images, max_images).map_err(map_service_error)?;
    let variants = VariantList::from_drafts(payload.variants).map_err(map_service_error)?;

    Ok(ProductSaveInput {
        name: payload.name,
        slug: normalize_optional_string(payload.slug),
        description: normalize_optional_string(payload.description),
        price: payload.price,
        compare_at_price: payload.compare_at_price,
        category_id: payload.category_id,
        stock_quantity: payload.stock_quantity,
        is_active: payload.is_active,
        is_featured: payload.is_featured,
        images,
        variants,
    })
}

fn normalize_optional_string(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_true() -> bool {
    true
}

/// Query parameters for the product listing
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ProductListParams {
    /// Case-insensitive substring match against name or description
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub category_id: Option<Uuid>,
}

/// Payload for creating or updating a product. The image and variant arrays
/// are the complete desired sets; saving replaces whatever was stored.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SaveProductRequest {
    #[validate(length(max = 255, message = "Product name cannot exceed 255 characters"))]
    pub name: String,
    pub slug: Option<String>,
    #[validate(length(max = 4000, message = "Description cannot exceed 4000 characters"))]
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub stock_quantity: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub images: Vec<ImageDraft>,
    #[serde(default)]
    pub variants: Vec<VariantDraft>,
}

/// Product scalar fields as returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductModel> for ProductResponse {
    fn from(model: ProductModel) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            price: model.price,
            compare_at_price: model.compare_at_price,
            is_featured: model.is_featured,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Product image as returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct ImageResponse {
    pub id: Uuid,
    pub image_url: String,
    pub storage_path: Option<String>,
    pub alt_text: Option<String>,
    pub display_order: i32,
    pub is_primary: bool,
}

impl From<ProductImageModel> for ImageResponse {
    fn from(model: ProductImageModel) -> Self {
        Self {
            id: model.id,
            image_url: model.image_url,
            storage_path: model.storage_path,
            alt_text: model.alt_text,
            display_order: model.display_order,
            is_primary: model.is_primary,
        }
    }
}

/// Product variant as returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct VariantResponse {
    pub id: Uuid,
    pub size: Option<String>,
    pub color: Option<String>,
    pub sku: Option<String>,
    pub stock_quantity: i32,
    pub price_adjustment: Option<Decimal>,
    pub is_available: bool,
}

impl From<ProductVariantModel> for VariantResponse {
    fn from(model: ProductVariantModel) -> Self {
        Self {
            id: model.id,
            size: model.size,
            color: model.color,
            sku: model.sku,
            stock_quantity: model.stock_quantity,
            price_adjustment: model.price_adjustment,
            is_available: model.is_available,
        }
    }
}

/// A product with its dependents and effective stock
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetailResponse {
    #[serde(flatten)]
    pub product: ProductResponse,
    pub images: Vec<ImageResponse>,
    pub variants: Vec<VariantResponse>,
    /// Sum of variant stock, or the product's own stock when it has no variants
    pub stock_quantity: i64,
}

impl From<ProductDetail> for ProductDetailResponse {
    fn from(detail: ProductDetail) -> Self {
        Self {
            product: ProductResponse::from(detail.product),
            images: detail.images.into_iter().map(ImageResponse::from).collect(),
            variants: detail
                .variants
                .into_iter()
                .map(VariantResponse::from)
                .collect(),
            stock_quantity: detail.stock_quantity,
        }
    }
}
