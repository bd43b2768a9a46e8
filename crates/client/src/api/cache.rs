//! Cache types for catalog API responses.

use crate::types::{Banner, Category, Product, ProductPage};

/// Cached value types. Only read-mostly catalog data is ever cached; cart,
/// favorites, and config responses are not.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductPage),
    Categories(Vec<Category>),
    Banners(Vec<Banner>),
}
