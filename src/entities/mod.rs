pub mod category;
pub mod product;
pub mod product_image;
pub mod product_variant;
pub mod stock_movement;

pub use category::Entity as Category;
pub use product::Entity as Product;
pub use product_image::Entity as ProductImage;
pub use product_variant::Entity as ProductVariant;
pub use stock_movement::Entity as StockMovement;

pub use category::Model as CategoryModel;
pub use product::Model as ProductModel;
pub use product_image::Model as ProductImageModel;
pub use product_variant::Model as ProductVariantModel;
pub use stock_movement::Model as StockMovementModel;
