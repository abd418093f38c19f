use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entities::{
        category, product, product_image, product_variant, Category, CategoryModel, Product,
        ProductImage, ProductImageModel, ProductModel, ProductVariant, ProductVariantModel,
    },
    errors::ServiceError,
    models::catalog_query::{self, CatalogEntry, CatalogQuery},
    services::products::effective_stock,
};

/// Default number of products on the featured shelf
pub const DEFAULT_FEATURED_LIMIT: u64 = 8;
const MAX_FEATURED_LIMIT: u64 = 24;

/// Read-only service behind the public storefront. Every request fetches a
/// fresh snapshot and derives the view in memory; there is no caching layer.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Produces the browsing view: active, in-stock products ordered newest
    /// first, then filtered and sorted by the caller's criteria.
    #[instrument(skip(self))]
    pub async fn browse(&self, query: &CatalogQuery) -> Result<Vec<CatalogEntry>, ServiceError> {
        let products = Product::find()
            .filter(product::Column::IsActive.eq(true))
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let entries = self.build_entries(products).await?;
        let in_stock: Vec<CatalogEntry> =
            entries.into_iter().filter(|e| e.stock_quantity > 0).collect();

        Ok(catalog_query::apply(in_stock, query))
    }

    /// Products for the home page shelf: featured first, newest first.
    #[instrument(skip(self))]
    pub async fn featured(&self, limit: Option<u64>) -> Result<Vec<CatalogEntry>, ServiceError> {
        let limit = limit.unwrap_or(DEFAULT_FEATURED_LIMIT).min(MAX_FEATURED_LIMIT);

        let products = Product::find()
            .filter(product::Column::IsActive.eq(true))
            .order_by_desc(product::Column::IsFeatured)
            .order_by_desc(product::Column::CreatedAt)
            .limit(limit)
            .all(&*self.db)
            .await?;

        self.build_entries(products).await
    }

    /// Active categories for the storefront filter bar, ordered by name.
    #[instrument(skip(self))]
    pub async fn active_categories(&self) -> Result<Vec<CategoryModel>, ServiceError> {
        Category::find()
            .filter(category::Column::IsActive.eq(true))
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Resolves images, variants and category names for a page of products,
    /// preserving the incoming order.
    async fn build_entries(
        &self,
        products: Vec<ProductModel>,
    ) -> Result<Vec<CatalogEntry>, ServiceError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();

        let images = ProductImage::find()
            .filter(product_image::Column::ProductId.is_in(product_ids.clone()))
            .order_by_asc(product_image::Column::DisplayOrder)
            .all(&*self.db)
            .await?;
        let mut images_by_product: HashMap<Uuid, Vec<ProductImageModel>> = HashMap::new();
        for image in images {
            images_by_product
                .entry(image.product_id)
                .or_default()
                .push(image);
        }

        let variants = ProductVariant::find()
            .filter(product_variant::Column::ProductId.is_in(product_ids))
            .all(&*self.db)
            .await?;
        let mut variants_by_product: HashMap<Uuid, Vec<ProductVariantModel>> = HashMap::new();
        for variant in variants {
            variants_by_product
                .entry(variant.product_id)
                .or_default()
                .push(variant);
        }

        let category_ids: Vec<Uuid> = products.iter().filter_map(|p| p.category_id).collect();
        let category_names: HashMap<Uuid, String> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            Category::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect()
        };

        let entries = products
            .into_iter()
            .map(|p| {
                let variants = variants_by_product.remove(&p.id).unwrap_or_default();
                let primary_image_url = images_by_product
                    .remove(&p.id)
                    .and_then(|imgs| imgs.into_iter().next())
                    .map(|img| img.image_url);
                let stock_quantity = effective_stock(&p, &variants);
                let category_name = p
                    .category_id
                    .and_then(|id| category_names.get(&id).cloned());

                CatalogEntry {
                    id: p.id,
                    name: p.name,
                    slug: p.slug,
                    description: p.description,
                    price: p.price,
                    compare_at_price: p.compare_at_price,
                    category_id: p.category_id,
                    category_name,
                    primary_image_url,
                    stock_quantity,
                    is_featured: p.is_featured,
                    created_at: p.created_at,
                }
            })
            .collect();

        Ok(entries)
    }
}
