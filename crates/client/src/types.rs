//! Wire types for the storefront REST API.
//!
//! These mirror the backend's JSON contract one to one. The backend is the
//! source of truth for every derived figure (cart totals, discounts, stock
//! numbers); the client never recomputes them locally.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use minishop_core::{
    BannerId, CartLineId, CategoryId, MediaId, ModificationTypeId, OrderId, OrderItemId, Price,
    ProductId, VariantSelector,
};

// =============================================================================
// Shop configuration
// =============================================================================

/// Shop-wide configuration, fetched once at startup and re-fetched wholesale
/// after settings changes. Never partially merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    pub shop_name: String,
    pub checkout_type: String,
    pub currency: String,
    pub delivery_enabled: bool,
    pub pickup_enabled: bool,
    pub promo_enabled: bool,
    pub payment_enabled: bool,
    #[serde(default)]
    pub bonus_enabled: bool,
    #[serde(default)]
    pub support_link: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default)]
    pub store_address: Option<String>,
    #[serde(default)]
    pub delivery_city: Option<String>,
    #[serde(default)]
    pub delivery_cost: Price,
    #[serde(default)]
    pub free_delivery_min_amount: Price,
    #[serde(default)]
    pub min_order_amount_pickup: Price,
    #[serde(default)]
    pub min_order_amount_delivery: Price,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product category. Children are present on tree-shaped responses only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub sort_order: i32,
    pub is_active: bool,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub children: Vec<Category>,
}

/// Kind of product media attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
}

/// A product image or video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductMedia {
    pub id: MediaId,
    pub media_type: MediaType,
    pub url: String,
    pub sort_order: i32,
}

/// The modification axis a product varies along (e.g. "Size").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModificationTypeRef {
    pub id: ModificationTypeId,
    pub name: String,
}

/// Per-variant stock level as exposed on product responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantStock {
    pub value: String,
    pub quantity: i64,
}

/// A catalog product, including the denormalized display data snapshotted
/// into cart lines and favorites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub old_price: Option<Price>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub is_available: bool,
    pub stock_quantity: i64,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
    #[serde(default)]
    pub external_id: Option<String>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub media: Vec<ProductMedia>,
    #[serde(default)]
    pub modification_type: Option<ModificationTypeRef>,
    #[serde(default)]
    pub variants: Vec<VariantStock>,
}

/// One page of catalog products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// A promotional banner shown on the catalog page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    pub id: BannerId,
    pub image_url: String,
    #[serde(default)]
    pub link: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

// =============================================================================
// Cart
// =============================================================================

/// One cart entry: a product reference, an optional variant selector, the
/// quantity, and a product snapshot as of the last fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub product: Product,
    #[serde(default)]
    pub modification_type_id: Option<ModificationTypeId>,
    #[serde(default)]
    pub modification_value: Option<String>,
    #[serde(default)]
    pub modification_label: Option<String>,
}

impl CartLine {
    /// The normalized variant selector identifying this line.
    #[must_use]
    pub fn selector(&self) -> VariantSelector {
        VariantSelector::new(self.modification_type_id, self.modification_value.clone())
    }
}

/// Full cart snapshot. Totals are server-computed and authoritative.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<CartLine>,
    pub total_price: Price,
    pub total_items: u32,
}

/// Request body for adding a line to the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineInput {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modification_type_id: Option<ModificationTypeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modification_value: Option<String>,
}

impl CartLineInput {
    /// Build an add request from a product, quantity, and selector.
    #[must_use]
    pub fn new(product_id: ProductId, quantity: u32, selector: &VariantSelector) -> Self {
        Self {
            product_id,
            quantity,
            modification_type_id: selector.modification_type_id(),
            modification_value: selector.value().map(str::to_owned),
        }
    }
}

/// Request body for a cart line quantity update.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: u32,
}

/// A cart line dropped by stock validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub old_quantity: u32,
}

/// A cart line whose quantity was clamped down by stock validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub old_quantity: u32,
    pub new_quantity: u32,
}

/// Server response to cart validation: the corrected snapshot plus what
/// changed, so the client can notify the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartValidation {
    pub items: Vec<CartLine>,
    pub total_price: Price,
    pub total_items: u32,
    #[serde(default)]
    pub removed: Vec<RemovedLine>,
    #[serde(default)]
    pub adjusted: Vec<AdjustedLine>,
}

/// The server-side corrections applied during a cart validation pass.
///
/// Transient: produced for user messaging, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartCorrections {
    #[serde(default)]
    pub removed: Vec<RemovedLine>,
    #[serde(default)]
    pub adjusted: Vec<AdjustedLine>,
}

impl CartCorrections {
    /// Whether the validation pass changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.adjusted.is_empty()
    }
}

// =============================================================================
// Favorites
// =============================================================================

/// A favorite dropped by stock validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedFavorite {
    pub product_id: ProductId,
    pub product_name: String,
}

/// Server response to favorites validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FavoritesValidation {
    #[serde(default)]
    pub removed: Vec<RemovedFavorite>,
}

// =============================================================================
// Orders
// =============================================================================

/// Coordinates attached to a delivery address.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Request body for order creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_coords: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_to_use: Option<Decimal>,
}

/// A line item captured on an order, with the price frozen at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_at_order: Price,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub modification_type_id: Option<ModificationTypeId>,
    #[serde(default)]
    pub modification_value: Option<String>,
    #[serde(default)]
    pub modification_label: Option<String>,
}

/// A placed order. Status values are backend-defined strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: String,
    pub total: Price,
    pub discount: Price,
    #[serde(default)]
    pub bonus_used: Price,
    #[serde(default)]
    pub delivery_fee: Price,
    #[serde(default)]
    pub delivery_type: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub delivery_service: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// The user's order history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub items: Vec<Order>,
    pub total: i64,
}

// =============================================================================
// Promo, profile, misc
// =============================================================================

/// Request body for promo code checking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCheckRequest {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_total: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_type: Option<String>,
}

/// Server verdict on a promo code. Evaluation is entirely server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoCheck {
    pub valid: bool,
    #[serde(default)]
    pub discount_type: Option<String>,
    #[serde(default)]
    pub discount_value: Option<Decimal>,
    pub message: String,
}

/// The calling user's profile data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub bonus_balance: Decimal,
}

/// Plain acknowledgement body returned by deletes and favorite toggles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_line_input_skips_absent_variant() {
        let input = CartLineInput::new(ProductId::new(5), 2, &VariantSelector::none());
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({"product_id": 5, "quantity": 2}));
    }

    #[test]
    fn test_cart_line_input_carries_selector() {
        let selector = VariantSelector::new(Some(ModificationTypeId::new(3)), Some("M".into()));
        let input = CartLineInput::new(ProductId::new(5), 1, &selector);
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["modification_type_id"], 3);
        assert_eq!(json["modification_value"], "M");
    }

    #[test]
    fn test_cart_snapshot_decodes_plain_numbers() {
        let snapshot: CartSnapshot = serde_json::from_value(serde_json::json!({
            "items": [],
            "total_price": 123.5,
            "total_items": 0,
        }))
        .unwrap();
        assert_eq!(snapshot.total_items, 0);
        assert!(snapshot.items.is_empty());
    }

    #[test]
    fn test_validation_lists_default_when_absent() {
        let validation: CartValidation = serde_json::from_value(serde_json::json!({
            "items": [],
            "total_price": 0,
            "total_items": 0,
        }))
        .unwrap();
        assert!(validation.removed.is_empty());
        assert!(validation.adjusted.is_empty());
    }
}
