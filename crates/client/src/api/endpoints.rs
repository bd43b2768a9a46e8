//! Typed endpoint wrappers over the REST transport.
//!
//! Thin one-call-per-endpoint methods; interpretation of failures (alerts,
//! rollbacks, refetch policy) belongs to the stores.

use tracing::{debug, instrument};

use minishop_core::{CartLineId, OrderId, ProductId};

use crate::types::{
    Ack, Banner, CartLine, CartLineInput, CartSnapshot, CartValidation, Category,
    FavoritesValidation, NewOrder, Order, OrderPage, Product, ProductMedia, ProductPage, Profile,
    PromoCheck, PromoCheckRequest, QuantityUpdate, ShopConfig,
};

use super::cache::CacheValue;
use super::{ApiError, RemoteClient};

/// Filters and paging for the catalog product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub category_id: Option<i64>,
    pub search: Option<String>,
    pub in_stock: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ProductQuery {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        if let Some(category_id) = self.category_id {
            pairs.push(("category_id", category_id.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(in_stock) = self.in_stock {
            pairs.push(("in_stock", in_stock.to_string()));
        }
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sort_by", sort_by.clone()));
        }
        if let Some(sort_order) = &self.sort_order {
            pairs.push(("sort_order", sort_order.clone()));
        }
        pairs
    }

    /// Cache key for non-search listings. Search results are never cached.
    fn cache_key(&self) -> Option<String> {
        if self.search.is_some() {
            return None;
        }
        Some(format!(
            "products:{}:{}:{}:{}:{}:{}",
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(0),
            self.category_id.unwrap_or(0),
            self.in_stock.map_or(String::new(), |v| v.to_string()),
            self.sort_by.as_deref().unwrap_or(""),
            self.sort_order.as_deref().unwrap_or(""),
        ))
    }
}

impl RemoteClient {
    // =========================================================================
    // Config
    // =========================================================================

    /// Fetch the shop-wide configuration.
    ///
    /// # Errors
    ///
    /// Fails with `ApiError::Server { status: 401, .. }` when the identity
    /// assertion is missing or invalid.
    #[instrument(skip(self))]
    pub async fn get_config(&self) -> Result<ShopConfig, ApiError> {
        self.get("/config").await
    }

    // =========================================================================
    // Catalog (cached)
    // =========================================================================

    /// Get a page of catalog products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        let cache_key = query.cache_key();

        if let Some(key) = &cache_key
            && let Some(CacheValue::Products(page)) = self.cache_get(key).await
        {
            debug!("Cache hit for products");
            return Ok(page);
        }

        let page: ProductPage = self.get_with_query("/products", &query.to_pairs()).await?;

        if let Some(key) = cache_key {
            self.cache_insert(key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Get a single product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.cache_get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get(&format!("/products/{product_id}")).await?;

        self.cache_insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the category tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.cache_get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get("/categories").await?;

        self.cache_insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Get active catalog banners.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_banners(&self) -> Result<Vec<Banner>, ApiError> {
        let cache_key = "banners".to_string();

        if let Some(CacheValue::Banners(banners)) = self.cache_get(&cache_key).await {
            debug!("Cache hit for banners");
            return Ok(banners);
        }

        let banners: Vec<Banner> = self.get("/banners").await?;

        self.cache_insert(cache_key, CacheValue::Banners(banners.clone()))
            .await;

        Ok(banners)
    }

    // =========================================================================
    // Cart (not cached - mutable state)
    // =========================================================================

    /// Get the user's current cart snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<CartSnapshot, ApiError> {
        self.get("/cart").await
    }

    /// Add a line (or increment an existing one) in the cart.
    ///
    /// # Errors
    ///
    /// Fails with a 409 server error when the product or variant has no
    /// stock left.
    #[instrument(skip(self, line), fields(product_id = %line.product_id))]
    pub async fn add_to_cart(&self, line: &CartLineInput) -> Result<CartLine, ApiError> {
        self.post("/cart", line).await
    }

    /// Update a cart line's quantity. The server clamps to available stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is gone or the request fails.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn update_cart_line(
        &self,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<CartLine, ApiError> {
        self.patch(&format!("/cart/{line_id}"), &QuantityUpdate { quantity })
            .await
    }

    /// Remove a single cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is gone or the request fails.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove_cart_line(&self, line_id: CartLineId) -> Result<Ack, ApiError> {
        self.delete(&format!("/cart/{line_id}")).await
    }

    /// Remove every line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<Ack, ApiError> {
        self.delete("/cart").await
    }

    /// Ask the server to re-check every cart line against current stock and
    /// apply corrections. Returns the corrected snapshot plus what changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn validate_cart(&self) -> Result<CartValidation, ApiError> {
        self.post_empty("/cart/validate").await
    }

    // =========================================================================
    // Favorites (not cached - mutable state)
    // =========================================================================

    /// Get the user's favorited products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_favorites(&self) -> Result<Vec<Product>, ApiError> {
        self.get("/favorites").await
    }

    /// Add a product to favorites. Adding an existing favorite is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_favorite(&self, product_id: ProductId) -> Result<Ack, ApiError> {
        self.post_empty(&format!("/favorites/{product_id}")).await
    }

    /// Remove a product from favorites.
    ///
    /// # Errors
    ///
    /// Returns an error if the product was not favorited or the request
    /// fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_favorite(&self, product_id: ProductId) -> Result<Ack, ApiError> {
        self.delete(&format!("/favorites/{product_id}")).await
    }

    /// Drop favorited products that are no longer purchasable server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn validate_favorites(&self) -> Result<FavoritesValidation, ApiError> {
        self.post_empty("/favorites/validate").await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit the cart as an order.
    ///
    /// # Errors
    ///
    /// Fails with a 409 server error carrying `removed`/`adjusted` lists in
    /// the body when stock changed between validation and submission.
    #[instrument(skip(self, order))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        self.post("/orders", order).await
    }

    /// Get the user's order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_orders(&self) -> Result<OrderPage, ApiError> {
        self.get("/orders").await
    }

    /// Get a single order by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, ApiError> {
        self.get(&format!("/orders/{order_id}")).await
    }

    // =========================================================================
    // Promo & profile
    // =========================================================================

    /// Check a promo code against the current cart total.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request))]
    pub async fn check_promo(&self, request: &PromoCheckRequest) -> Result<PromoCheck, ApiError> {
        self.post("/promo/check", request).await
    }

    /// Get the calling user's profile (bonus balance).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_me(&self) -> Result<Profile, ApiError> {
        self.get("/user/me").await
    }

    // =========================================================================
    // Admin media upload (multipart)
    // =========================================================================

    /// Upload a media file for a product.
    ///
    /// The multipart content type (and its boundary) is supplied by the
    /// transport; see the module docs.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller lacks admin rights or the request
    /// fails.
    #[instrument(skip(self, bytes), fields(product_id = %product_id, file_name = %file_name))]
    pub async fn upload_product_media(
        &self,
        product_id: ProductId,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<ProductMedia, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let media: ProductMedia = self
            .post_multipart(&format!("/admin/products/{product_id}/media"), form)
            .await?;

        // Media changed; cached product snapshots are stale now
        self.invalidate_catalog().await;

        Ok(media)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_query_pairs() {
        let query = ProductQuery {
            page: Some(2),
            per_page: Some(20),
            search: Some("mug".to_string()),
            ..ProductQuery::default()
        };
        let pairs = query.to_pairs();
        assert!(pairs.contains(&("page", "2".to_string())));
        assert!(pairs.contains(&("search", "mug".to_string())));
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn test_search_queries_are_not_cached() {
        let query = ProductQuery {
            search: Some("mug".to_string()),
            ..ProductQuery::default()
        };
        assert!(query.cache_key().is_none());

        let query = ProductQuery {
            page: Some(1),
            ..ProductQuery::default()
        };
        assert!(query.cache_key().is_some());
    }

    #[test]
    fn test_distinct_pages_get_distinct_cache_keys() {
        let first = ProductQuery {
            page: Some(1),
            ..ProductQuery::default()
        };
        let second = ProductQuery {
            page: Some(2),
            ..ProductQuery::default()
        };
        assert_ne!(first.cache_key(), second.cache_key());
    }
}
