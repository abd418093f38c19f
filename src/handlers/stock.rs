use axum::{
    extract::{Json, Query, State},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedAdmin;
use crate::entities::{stock_movement::MovementType, StockMovementModel};
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::services::stock::{RecordMovementInput, StockMovementQuery};
use crate::AppState;

/// Creates the router for stock movement endpoints. The whole surface is
/// admin-only, matching the back-office inventory screens it serves.
pub fn stock_routes() -> Router<AppState> {
    Router::new().route("/", get(list_movements).post(record_movement))
}

/// List stock movements, newest first
#[utoipa::path(
    get,
    path = "/api/v1/stock",
    params(StockListParams, PaginationParams),
    responses(
        (status = 200, description = "Movements retrieved", body = [StockMovementResponse]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Stock"
)]
pub async fn list_movements(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Query(params): Query<StockListParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let query = StockMovementQuery {
        product_id: params.product_id,
        variant_id: params.variant_id,
        limit: Some(pagination.per_page),
        offset: Some(pagination.offset()),
    };

    let result = state
        .services
        .stock
        .list_movements(query)
        .await
        .map_err(map_service_error)?;

    let movements: Vec<StockMovementResponse> = result
        .movements
        .into_iter()
        .map(StockMovementResponse::from)
        .collect();

    Ok(success_response(PaginatedResponse::new(
        movements,
        pagination.page,
        pagination.per_page,
        result.total,
    )))
}

/// Record a stock movement and adjust the target quantity
#[utoipa::path(
    post,
    path = "/api/v1/stock",
    request_body = RecordStockMovementRequest,
    responses(
        (status = 201, description = "Movement recorded", body = StockMovementResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product or variant not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Movement would drive stock negative", body = crate::errors::ErrorResponse)
    ),
    security(("Bearer" = [])),
    tag = "Stock"
)]
pub async fn record_movement(
    _admin: AuthenticatedAdmin,
    State(state): State<AppState>,
    Json(payload): Json<RecordStockMovementRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = RecordMovementInput {
        product_id: payload.product_id,
        variant_id: payload.variant_id,
        movement_type: payload.movement_type,
        quantity: payload.quantity,
        notes: payload.notes,
    };

    let movement = state
        .services
        .stock
        .record_movement(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(StockMovementResponse::from(movement)))
}

/// Query parameters for the movement listing
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StockListParams {
    pub product_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
}

/// Payload for recording a stock movement
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordStockMovementRequest {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub movement_type: MovementType,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

/// Stock movement as returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct StockMovementResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StockMovementModel> for StockMovementResponse {
    fn from(model: StockMovementModel) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            variant_id: model.variant_id,
            movement_type: model.movement_type,
            quantity: model.quantity,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}
