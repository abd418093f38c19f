pub mod catalog_query;
pub mod image_list;
pub mod slug;
pub mod variant_list;

pub use catalog_query::{CatalogEntry, CatalogQuery, CatalogSort, CategoryFilter};
pub use image_list::{ImageDraft, ImageList};
pub use slug::slugify;
pub use variant_list::{VariantDraft, VariantField, VariantList};
