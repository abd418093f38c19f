use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        product, product_image, product_variant, stock_movement, Product, ProductImage,
        ProductImageModel, ProductModel, ProductVariant, ProductVariantModel, StockMovement,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{ImageList, VariantList},
    services::{derive_slug, flatten_transaction_error},
};

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

/// Product administration service. The save procedure persists a product's
/// scalar fields together with a full replacement of its image and variant
/// sets, atomically from the caller's perspective.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates a product with its images and variants in one transaction.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        input: ProductSaveInput,
    ) -> Result<ProductDetail, ServiceError> {
        let checked = validate_save_input(&input)?;
        self.ensure_unique_slug(&checked.slug, None).await?;

        let product_id = Uuid::new_v4();
        let now = Utc::now();

        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    let product = product::ActiveModel {
                        id: Set(product_id),
                        category_id: Set(input.category_id),
                        name: Set(checked.name),
                        slug: Set(checked.slug),
                        description: Set(input.description),
                        price: Set(checked.price),
                        compare_at_price: Set(input.compare_at_price),
                        stock_quantity: Set(input.stock_quantity.unwrap_or(0)),
                        is_featured: Set(input.is_featured),
                        is_active: Set(input.is_active),
                        created_at: Set(now),
                        updated_at: Set(now),
                    };
                    product.insert(txn).await?;

                    replace_images(txn, product_id, &input.images).await?;
                    replace_variants(txn, product_id, &input.variants).await?;
                    Ok(())
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product_id))
            .await;

        info!("Created product: {}", product_id);
        self.get_product_detail(product_id).await
    }

    /// Updates a product's scalar fields and replaces its complete image and
    /// variant sets with the caller's desired state. Empty lists are valid
    /// and clear the corresponding set.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: ProductSaveInput,
    ) -> Result<ProductDetail, ServiceError> {
        let checked = validate_save_input(&input)?;
        let existing = self.get_product(product_id).await?;
        if checked.slug != existing.slug {
            self.ensure_unique_slug(&checked.slug, Some(product_id))
                .await?;
        }

        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    let mut active: product::ActiveModel = existing.into();
                    active.category_id = Set(input.category_id);
                    active.name = Set(checked.name);
                    active.slug = Set(checked.slug);
                    active.description = Set(input.description);
                    active.price = Set(checked.price);
                    active.compare_at_price = Set(input.compare_at_price);
                    if let Some(stock) = input.stock_quantity {
                        active.stock_quantity = Set(stock);
                    }
                    active.is_featured = Set(input.is_featured);
                    active.is_active = Set(input.is_active);
                    active.updated_at = Set(Utc::now());
                    active.update(txn).await?;

                    replace_images(txn, product_id, &input.images).await?;
                    replace_variants(txn, product_id, &input.variants).await?;
                    Ok(())
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(product_id))
            .await;

        info!("Updated product: {}", product_id);
        self.get_product_detail(product_id).await
    }

    /// Gets a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductModel, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Gets a product together with its ordered images, variants and
    /// effective stock.
    #[instrument(skip(self))]
    pub async fn get_product_detail(
        &self,
        product_id: Uuid,
    ) -> Result<ProductDetail, ServiceError> {
        let product = self.get_product(product_id).await?;

        let images = ProductImage::find()
            .filter(product_image::Column::ProductId.eq(product_id))
            .order_by_asc(product_image::Column::DisplayOrder)
            .all(&*self.db)
            .await?;

        let variants = ProductVariant::find()
            .filter(product_variant::Column::ProductId.eq(product_id))
            .order_by_asc(product_variant::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let stock_quantity = effective_stock(&product, &variants);

        Ok(ProductDetail {
            product,
            images,
            variants,
            stock_quantity,
        })
    }

    /// Searches products for the admin listing
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        query: ProductListQuery,
    ) -> Result<ProductListResult, ServiceError> {
        let mut db_query = Product::find();

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            db_query = db_query.filter(
                Condition::any()
                    .add(product::Column::Name.contains(search))
                    .add(product::Column::Description.contains(search)),
            );
        }

        if let Some(is_active) = query.is_active {
            db_query = db_query.filter(product::Column::IsActive.eq(is_active));
        }

        if let Some(category_id) = query.category_id {
            db_query = db_query.filter(product::Column::CategoryId.eq(category_id));
        }

        let total = db_query.clone().count(&*self.db).await?;

        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = query.offset.unwrap_or(0);

        let products = db_query
            .order_by_desc(product::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&*self.db)
            .await?;

        Ok(ProductListResult { products, total })
    }

    /// Deletes a product and everything it owns.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        self.get_product(product_id).await?;

        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    StockMovement::delete_many()
                        .filter(stock_movement::Column::ProductId.eq(product_id))
                        .exec(txn)
                        .await?;
                    ProductImage::delete_many()
                        .filter(product_image::Column::ProductId.eq(product_id))
                        .exec(txn)
                        .await?;
                    ProductVariant::delete_many()
                        .filter(product_variant::Column::ProductId.eq(product_id))
                        .exec(txn)
                        .await?;
                    Product::delete_by_id(product_id).exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        self.event_sender
            .send_or_log(Event::ProductDeleted(product_id))
            .await;

        info!("Deleted product: {}", product_id);
        Ok(())
    }

    async fn ensure_unique_slug(
        &self,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = Product::find().filter(product::Column::Slug.eq(slug));
        if let Some(id) = exclude_id {
            query = query.filter(product::Column::Id.ne(id));
        }

        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Product slug '{}' already exists",
                slug
            )));
        }

        Ok(())
    }
}

/// Deletes every image row for the product and inserts the new ordered set,
/// assigning display_order from the list position and marking position zero
/// primary.
async fn replace_images(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    images: &ImageList,
) -> Result<(), ServiceError> {
    ProductImage::delete_many()
        .filter(product_image::Column::ProductId.eq(product_id))
        .exec(txn)
        .await?;

    let now = Utc::now();
    let records: Vec<product_image::ActiveModel> = images
        .iter()
        .enumerate()
        .map(|(index, draft)| product_image::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            image_url: Set(draft.url.clone()),
            storage_path: Set(draft.storage_path.clone()),
            alt_text: Set(draft.alt_text.clone()),
            display_order: Set(index as i32),
            is_primary: Set(index == 0),
            created_at: Set(now),
        })
        .collect();

    if !records.is_empty() {
        ProductImage::insert_many(records).exec(txn).await?;
    }
    Ok(())
}

/// Deletes every variant row for the product and inserts the new set
/// verbatim.
async fn replace_variants(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    variants: &VariantList,
) -> Result<(), ServiceError> {
    ProductVariant::delete_many()
        .filter(product_variant::Column::ProductId.eq(product_id))
        .exec(txn)
        .await?;

    let now = Utc::now();
    let records: Vec<product_variant::ActiveModel> = variants
        .iter()
        .map(|draft| product_variant::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            size: Set(draft.size.clone()),
            color: Set(draft.color.clone()),
            sku: Set(draft.sku.clone()),
            stock_quantity: Set(draft.stock_quantity),
            price_adjustment: Set(draft.price_adjustment),
            is_available: Set(draft.is_available),
            created_at: Set(now),
            updated_at: Set(now),
        })
        .collect();

    if !records.is_empty() {
        ProductVariant::insert_many(records).exec(txn).await?;
    }
    Ok(())
}

/// A product's displayed stock: the sum of its variant quantities, or its
/// own stock field when it has no variants.
pub fn effective_stock(product: &ProductModel, variants: &[ProductVariantModel]) -> i64 {
    if variants.is_empty() {
        i64::from(product.stock_quantity)
    } else {
        variants.iter().map(|v| i64::from(v.stock_quantity)).sum()
    }
}

/// Scalar fields plus the complete desired image and variant sets for one
/// save. Used for both create and update.
#[derive(Debug, Clone)]
pub struct ProductSaveInput {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    /// Missing price is a validation error, not a default
    pub price: Option<Decimal>,
    pub compare_at_price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub stock_quantity: Option<i32>,
    pub is_active: bool,
    pub is_featured: bool,
    pub images: ImageList,
    pub variants: VariantList,
}

struct CheckedSaveInput {
    name: String,
    slug: String,
    price: Decimal,
}

/// Validates the required fields of a save before any persistence call is
/// made: name, price and category are mandatory, money and stock fields must
/// be non-negative.
fn validate_save_input(input: &ProductSaveInput) -> Result<CheckedSaveInput, ServiceError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::ValidationError(
            "Product name is required".to_string(),
        ));
    }

    let price = input.price.ok_or_else(|| {
        ServiceError::ValidationError("Product price is required".to_string())
    })?;
    if price < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Product price cannot be negative".to_string(),
        ));
    }

    if input.category_id.is_none() {
        return Err(ServiceError::ValidationError(
            "Product category is required".to_string(),
        ));
    }

    if let Some(compare_at) = input.compare_at_price {
        if compare_at < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Compare-at price cannot be negative".to_string(),
            ));
        }
    }

    if let Some(stock) = input.stock_quantity {
        if stock < 0 {
            return Err(ServiceError::ValidationError(
                "Stock quantity cannot be negative".to_string(),
            ));
        }
    }

    let slug = derive_slug(input.slug.as_deref(), &name)?;

    Ok(CheckedSaveInput { name, slug, price })
}

/// A product with its dependents, as returned by every save and detail read
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub product: ProductModel,
    pub images: Vec<ProductImageModel>,
    pub variants: Vec<ProductVariantModel>,
    pub stock_quantity: i64,
}

/// Admin listing filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListQuery {
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub category_id: Option<Uuid>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Admin listing result
#[derive(Debug, Serialize)]
pub struct ProductListResult {
    pub products: Vec<ProductModel>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageDraft, VariantDraft};
    use rust_decimal_macros::dec;

    fn base_input() -> ProductSaveInput {
        ProductSaveInput {
            name: "Vestido Teste".to_string(),
            slug: None,
            description: None,
            price: Some(dec!(100.00)),
            compare_at_price: None,
            category_id: Some(Uuid::new_v4()),
            stock_quantity: None,
            is_active: true,
            is_featured: false,
            images: ImageList::new(),
            variants: VariantList::new(),
        }
    }

    #[test]
    fn valid_input_passes_and_derives_slug() {
        let checked = validate_save_input(&base_input()).unwrap();
        assert_eq!(checked.name, "Vestido Teste");
        assert_eq!(checked.slug, "vestido-teste");
        assert_eq!(checked.price, dec!(100.00));
    }

    #[test]
    fn blank_name_is_rejected() {
        let input = ProductSaveInput {
            name: "   ".to_string(),
            ..base_input()
        };
        assert!(matches!(
            validate_save_input(&input),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn missing_price_is_rejected() {
        let input = ProductSaveInput {
            price: None,
            ..base_input()
        };
        assert!(validate_save_input(&input).is_err());
    }

    #[test]
    fn missing_category_is_rejected() {
        let input = ProductSaveInput {
            category_id: None,
            ..base_input()
        };
        assert!(validate_save_input(&input).is_err());
    }

    #[test]
    fn negative_money_fields_are_rejected() {
        let negative_price = ProductSaveInput {
            price: Some(dec!(-1)),
            ..base_input()
        };
        assert!(validate_save_input(&negative_price).is_err());

        let negative_compare = ProductSaveInput {
            compare_at_price: Some(dec!(-0.01)),
            ..base_input()
        };
        assert!(validate_save_input(&negative_compare).is_err());
    }

    #[test]
    fn explicit_slug_is_normalized() {
        let input = ProductSaveInput {
            slug: Some("Vestido de Verão".to_string()),
            ..base_input()
        };
        let checked = validate_save_input(&input).unwrap();
        assert_eq!(checked.slug, "vestido-de-verao");
    }

    #[test]
    fn effective_stock_sums_variants_or_falls_back() {
        let product = ProductModel {
            id: Uuid::new_v4(),
            category_id: None,
            name: "x".into(),
            slug: "x".into(),
            description: None,
            price: dec!(10),
            compare_at_price: None,
            stock_quantity: 4,
            is_featured: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(effective_stock(&product, &[]), 4);

        let variants: Vec<ProductVariantModel> = [3, 5]
            .iter()
            .map(|&stock| ProductVariantModel {
                id: Uuid::new_v4(),
                product_id: product.id,
                size: None,
                color: None,
                sku: None,
                stock_quantity: stock,
                price_adjustment: None,
                is_available: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .collect();
        assert_eq!(effective_stock(&product, &variants), 8);
    }

    #[test]
    fn save_input_carries_full_desired_state() {
        let images = ImageList::from_drafts(
            vec![ImageDraft {
                url: "a.jpg".into(),
                storage_path: None,
                alt_text: None,
            }],
            5,
        )
        .unwrap();
        let variants = VariantList::from_drafts(vec![VariantDraft {
            size: Some("P".into()),
            stock_quantity: 3,
            ..Default::default()
        }])
        .unwrap();

        let input = ProductSaveInput {
            images,
            variants,
            ..base_input()
        };
        assert_eq!(input.images.len(), 1);
        assert_eq!(input.variants.total_stock(), 3);
    }
}
