pub mod catalog;
pub mod categories;
pub mod common;
pub mod products;
pub mod stock;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{CatalogService, CategoryService, ProductService, StockService};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductService>,
    pub catalog: Arc<CatalogService>,
    pub stock: Arc<StockService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            categories: Arc::new(CategoryService::new(db.clone(), event_sender.clone())),
            products: Arc::new(ProductService::new(db.clone(), event_sender.clone())),
            catalog: Arc::new(CatalogService::new(db.clone())),
            stock: Arc::new(StockService::new(db, event_sender)),
        }
    }
}
