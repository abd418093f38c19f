use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        product, product_variant, stock_movement, stock_movement::MovementType, Product,
        ProductVariant, StockMovement, StockMovementModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::flatten_transaction_error,
};

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 200;

/// Stock movement service: records each movement and applies its delta to
/// the target variant's (or product's) quantity in the same transaction.
#[derive(Clone)]
pub struct StockService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl StockService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Records a movement and atomically adjusts stock. A movement that
    /// would drive the quantity below zero is rejected; stock never goes
    /// negative.
    #[instrument(skip(self))]
    pub async fn record_movement(
        &self,
        input: RecordMovementInput,
    ) -> Result<StockMovementModel, ServiceError> {
        if input.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "Movement quantity must be positive".to_string(),
            ));
        }

        let delta = match input.movement_type {
            MovementType::Out => -input.quantity,
            MovementType::In | MovementType::Adjustment => input.quantity,
        };
        let movement_id = Uuid::new_v4();

        let movement = self
            .db
            .transaction::<_, StockMovementModel, ServiceError>(move |txn| {
                Box::pin(async move {
                    if let Some(variant_id) = input.variant_id {
                        let variant = ProductVariant::find_by_id(variant_id)
                            .one(txn)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "Product variant {} not found",
                                    variant_id
                                ))
                            })?;
                        if variant.product_id != input.product_id {
                            return Err(ServiceError::InvalidInput(format!(
                                "Variant {} does not belong to product {}",
                                variant_id, input.product_id
                            )));
                        }
                        if variant.stock_quantity + delta < 0 {
                            return Err(ServiceError::InsufficientStock(format!(
                                "Variant {} holds {} units, movement needs {}",
                                variant_id, variant.stock_quantity, input.quantity
                            )));
                        }

                        ProductVariant::update_many()
                            .col_expr(
                                product_variant::Column::StockQuantity,
                                Expr::col(product_variant::Column::StockQuantity).add(delta),
                            )
                            .filter(product_variant::Column::Id.eq(variant_id))
                            .exec(txn)
                            .await?;
                    } else {
                        let target = Product::find_by_id(input.product_id)
                            .one(txn)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "Product {} not found",
                                    input.product_id
                                ))
                            })?;
                        if target.stock_quantity + delta < 0 {
                            return Err(ServiceError::InsufficientStock(format!(
                                "Product {} holds {} units, movement needs {}",
                                input.product_id, target.stock_quantity, input.quantity
                            )));
                        }

                        Product::update_many()
                            .col_expr(
                                product::Column::StockQuantity,
                                Expr::col(product::Column::StockQuantity).add(delta),
                            )
                            .filter(product::Column::Id.eq(input.product_id))
                            .exec(txn)
                            .await?;
                    }

                    let movement = stock_movement::ActiveModel {
                        id: Set(movement_id),
                        product_id: Set(input.product_id),
                        variant_id: Set(input.variant_id),
                        movement_type: Set(input.movement_type),
                        quantity: Set(input.quantity),
                        notes: Set(input.notes),
                        created_at: Set(Utc::now()),
                    };
                    movement.insert(txn).await.map_err(Into::into)
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        self.event_sender
            .send_or_log(Event::StockMovementRecorded {
                movement_id,
                product_id: movement.product_id,
                variant_id: movement.variant_id,
                quantity_delta: delta,
            })
            .await;

        info!(
            "Recorded stock movement {} for product {}",
            movement_id, movement.product_id
        );
        Ok(movement)
    }

    /// Lists movements, newest first, optionally narrowed to one product or
    /// variant.
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        query: StockMovementQuery,
    ) -> Result<StockMovementListResult, ServiceError> {
        let mut db_query = StockMovement::find();

        if let Some(product_id) = query.product_id {
            db_query = db_query.filter(stock_movement::Column::ProductId.eq(product_id));
        }
        if let Some(variant_id) = query.variant_id {
            db_query = db_query.filter(stock_movement::Column::VariantId.eq(variant_id));
        }

        let total = db_query.clone().count(&*self.db).await?;

        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = query.offset.unwrap_or(0);

        let movements = db_query
            .order_by_desc(stock_movement::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&*self.db)
            .await?;

        Ok(StockMovementListResult { movements, total })
    }
}

/// Input for recording a stock movement
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordMovementInput {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Movement listing filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockMovementQuery {
    pub product_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Movement listing result
#[derive(Debug, Serialize)]
pub struct StockMovementListResult {
    pub movements: Vec<StockMovementModel>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_movements_subtract_others_add() {
        let cases = [
            (MovementType::In, 5, 5),
            (MovementType::Adjustment, 5, 5),
            (MovementType::Out, 5, -5),
        ];
        for (movement_type, quantity, expected) in cases {
            let delta = match movement_type {
                MovementType::Out => -quantity,
                MovementType::In | MovementType::Adjustment => quantity,
            };
            assert_eq!(delta, expected);
        }
    }

    #[test]
    fn movement_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MovementType::Adjustment).unwrap(),
            "\"adjustment\""
        );
        let parsed: MovementType = serde_json::from_str("\"out\"").unwrap();
        assert_eq!(parsed, MovementType::Out);
    }
}
