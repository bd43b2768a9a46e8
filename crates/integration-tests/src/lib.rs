//! Integration test harness for the minishop client.
//!
//! Spins up an in-process mock of the storefront backend (an `axum` server
//! on a random loopback port) and wires a real `RemoteClient` at it, so
//! store behavior is tested over actual HTTP: identity header checks,
//! status-code mapping, JSON contracts, and the stock-validation flows.
//!
//! The mock keeps cart, favorites, and stock in shared in-memory state that
//! tests mutate directly to simulate concurrent shoppers draining stock
//! between client requests.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Router;
use axum::extract::{Multipart, Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, post};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::json;

use minishop_core::{
    BannerId, CartLineId, CategoryId, MediaId, ModificationTypeId, OrderId, Price, ProductId,
    VariantSelector,
};

use minishop_client::api::RemoteClient;
use minishop_client::bootstrap::AppBootstrap;
use minishop_client::config::ClientConfig;
use minishop_client::host::{HapticNotification, HostEnvironment};
use minishop_client::store::{CartStore, FavoritesStore};
use minishop_client::types::{
    Ack, AdjustedLine, Banner, CartLine, CartLineInput, CartSnapshot, CartValidation, Category,
    FavoritesValidation, MediaType, ModificationTypeRef, NewOrder, Order, OrderPage, Product,
    ProductMedia, ProductPage, Profile, PromoCheck, PromoCheckRequest, QuantityUpdate,
    RemovedFavorite, RemovedLine, ShopConfig, VariantStock,
};

/// Identity assertion the mock backend accepts.
pub const TEST_INIT_DATA: &str = "test-init-data";

/// The one promo code the mock backend considers valid.
pub const TEST_PROMO_CODE: &str = "WELCOME10";

// =============================================================================
// Recording host
// =============================================================================

/// Host environment that records every alert and haptic for assertions.
#[derive(Default)]
pub struct RecordingHost {
    alerts: Mutex<Vec<String>>,
    haptics: Mutex<Vec<HapticNotification>>,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Alerts shown so far, oldest first.
    #[must_use]
    pub fn alerts(&self) -> Vec<String> {
        lock(&self.alerts).clone()
    }

    /// Haptic notifications fired so far, oldest first.
    #[must_use]
    pub fn haptics(&self) -> Vec<HapticNotification> {
        lock(&self.haptics).clone()
    }
}

impl HostEnvironment for RecordingHost {
    fn identity_assertion(&self) -> Option<SecretString> {
        Some(SecretString::from(TEST_INIT_DATA))
    }

    fn show_alert(&self, message: &str) {
        lock(&self.alerts).push(message.to_string());
    }

    fn notify_haptic(&self, kind: HapticNotification) {
        lock(&self.haptics).push(kind);
    }

    fn enable_closing_confirmation(&self) -> bool {
        true
    }
}

// =============================================================================
// Mock backend state
// =============================================================================

#[derive(Debug, Clone)]
struct ServerLine {
    id: CartLineId,
    product_id: ProductId,
    quantity: u32,
    selector: VariantSelector,
}

#[derive(Default)]
struct ShopState {
    products: Vec<Product>,
    categories: Vec<Category>,
    banners: Vec<Banner>,
    cart: Vec<ServerLine>,
    favorites: Vec<ProductId>,
    orders: Vec<Order>,
    bonus_balance: Decimal,
    /// "METHOD /path" keys that answer 503 until restored.
    failing: HashSet<String>,
    /// "METHOD /path" of every request that passed the identity check.
    requests: Vec<String>,
}

/// In-memory stand-in for the storefront backend.
pub struct MockShop {
    state: Mutex<ShopState>,
    next_line_id: AtomicI64,
    next_order_id: AtomicI64,
    next_media_id: AtomicI64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn test_timestamp() -> NaiveDateTime {
    NaiveDateTime::default()
}

impl MockShop {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ShopState::default()),
            next_line_id: AtomicI64::new(1),
            next_order_id: AtomicI64::new(1),
            next_media_id: AtomicI64::new(1),
        })
    }

    // =========================================================================
    // Seeding and knobs
    // =========================================================================

    /// Add a simple (no-variant) product and return its id.
    pub fn seed_product(&self, name: &str, price: i64, stock: i64) -> ProductId {
        let mut state = lock(&self.state);
        let id = ProductId::new(state.products.len() as i64 + 1);
        state.products.push(Product {
            id,
            name: name.to_string(),
            description: None,
            price: Price::new(Decimal::from(price)),
            old_price: None,
            image_url: None,
            is_available: true,
            stock_quantity: stock,
            category_id: None,
            category_ids: Vec::new(),
            external_id: None,
            created_at: test_timestamp(),
            is_favorite: false,
            media: Vec::new(),
            modification_type: None,
            variants: Vec::new(),
        });
        id
    }

    /// Add a product with per-variant stock and return its id.
    pub fn seed_variant_product(
        &self,
        name: &str,
        price: i64,
        type_id: ModificationTypeId,
        type_name: &str,
        variants: &[(&str, i64)],
    ) -> ProductId {
        let id = self.seed_product(name, price, 0);
        let mut state = lock(&self.state);
        if let Some(product) = state.products.iter_mut().find(|p| p.id == id) {
            product.modification_type = Some(ModificationTypeRef {
                id: type_id,
                name: type_name.to_string(),
            });
            product.variants = variants
                .iter()
                .map(|(value, quantity)| VariantStock {
                    value: (*value).to_string(),
                    quantity: *quantity,
                })
                .collect();
            product.stock_quantity = variants.iter().map(|(_, q)| q).sum();
        }
        id
    }

    /// Change a product's base stock level.
    pub fn set_stock(&self, product_id: ProductId, stock: i64) {
        let mut state = lock(&self.state);
        if let Some(product) = state.products.iter_mut().find(|p| p.id == product_id) {
            product.stock_quantity = stock;
            if stock <= 0 {
                for variant in &mut product.variants {
                    variant.quantity = 0;
                }
            }
        }
    }

    /// Change one variant's stock level.
    pub fn set_variant_stock(&self, product_id: ProductId, value: &str, quantity: i64) {
        let mut state = lock(&self.state);
        if let Some(product) = state.products.iter_mut().find(|p| p.id == product_id) {
            if let Some(variant) = product.variants.iter_mut().find(|v| v.value == value) {
                variant.quantity = quantity;
            }
            product.stock_quantity = product.variants.iter().map(|v| v.quantity).sum();
        }
    }

    /// Add a category and return its id.
    pub fn seed_category(&self, name: &str) -> CategoryId {
        let mut state = lock(&self.state);
        let id = CategoryId::new(state.categories.len() as i64 + 1);
        let sort_order = state.categories.len() as i32;
        state.categories.push(Category {
            id,
            name: name.to_string(),
            slug: name.to_lowercase(),
            sort_order,
            is_active: true,
            parent_id: None,
            image_url: None,
            children: Vec::new(),
        });
        id
    }

    /// Add a banner and return its id.
    pub fn seed_banner(&self, image_url: &str) -> BannerId {
        let mut state = lock(&self.state);
        let id = BannerId::new(state.banners.len() as i64 + 1);
        let sort_order = state.banners.len() as i32;
        state.banners.push(Banner {
            id,
            image_url: image_url.to_string(),
            link: None,
            sort_order,
            is_active: true,
            created_at: test_timestamp(),
        });
        id
    }

    /// Set the calling user's bonus balance.
    pub fn set_bonus_balance(&self, balance: Decimal) {
        lock(&self.state).bonus_balance = balance;
    }

    /// Mark a product unavailable (hidden from purchase regardless of stock).
    pub fn set_unavailable(&self, product_id: ProductId) {
        let mut state = lock(&self.state);
        if let Some(product) = state.products.iter_mut().find(|p| p.id == product_id) {
            product.is_available = false;
        }
    }

    /// Make an endpoint answer 503 until restored. Key format:
    /// `"DELETE /favorites/3"`.
    pub fn fail_endpoint(&self, key: &str) {
        lock(&self.state).failing.insert(key.to_string());
    }

    /// Undo [`Self::fail_endpoint`].
    pub fn restore_endpoint(&self, key: &str) {
        lock(&self.state).failing.remove(key);
    }

    /// Insert a cart line server-side, bypassing the client. Simulates a
    /// cart persisted from a previous session.
    pub fn insert_cart_line(&self, product_id: ProductId, quantity: u32, selector: VariantSelector) {
        let id = CartLineId::new(self.next_line_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.state).cart.push(ServerLine {
            id,
            product_id,
            quantity,
            selector,
        });
    }

    /// Mark a product favorited server-side, bypassing the client.
    pub fn insert_favorite(&self, product_id: ProductId) {
        lock(&self.state).favorites.push(product_id);
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    /// Number of lines in the server-side cart.
    #[must_use]
    pub fn server_cart_len(&self) -> usize {
        lock(&self.state).cart.len()
    }

    /// Product ids currently favorited server-side.
    #[must_use]
    pub fn server_favorites(&self) -> Vec<ProductId> {
        lock(&self.state).favorites.clone()
    }

    /// Orders placed so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        lock(&self.state).orders.clone()
    }

    /// How many authenticated requests hit the given "METHOD /path" key.
    #[must_use]
    pub fn request_count(&self, key: &str) -> usize {
        lock(&self.state)
            .requests
            .iter()
            .filter(|r| r.as_str() == key)
            .count()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn product(state: &ShopState, id: ProductId) -> Option<&Product> {
        state.products.iter().find(|p| p.id == id)
    }

    /// Purchasable stock for a product/selector pair. Zero when the product
    /// is missing or unavailable.
    fn available(state: &ShopState, product_id: ProductId, selector: &VariantSelector) -> i64 {
        let Some(product) = Self::product(state, product_id) else {
            return 0;
        };
        if !product.is_available {
            return 0;
        }
        match selector.value() {
            Some(value) => product
                .variants
                .iter()
                .find(|v| v.value == value)
                .map_or(0, |v| v.quantity),
            None => product.stock_quantity,
        }
    }

    fn cart_line(state: &ShopState, line: &ServerLine) -> Option<CartLine> {
        let product = Self::product(state, line.product_id)?.clone();
        Some(CartLine {
            id: line.id,
            product_id: line.product_id,
            quantity: line.quantity,
            product,
            modification_type_id: line.selector.modification_type_id(),
            modification_value: line.selector.value().map(str::to_owned),
            modification_label: None,
        })
    }

    fn snapshot(state: &ShopState) -> CartSnapshot {
        let items: Vec<CartLine> = state
            .cart
            .iter()
            .filter_map(|line| Self::cart_line(state, line))
            .collect();
        let total_price = items
            .iter()
            .map(|line| line.product.price * line.quantity)
            .sum();
        let total_items = items.iter().map(|line| line.quantity).sum();
        CartSnapshot {
            items,
            total_price,
            total_items,
        }
    }

    /// Apply stock corrections to the server cart, returning what changed.
    fn correct_cart(state: &mut ShopState) -> (Vec<RemovedLine>, Vec<AdjustedLine>) {
        let mut removed = Vec::new();
        let mut adjusted = Vec::new();
        let mut kept = Vec::new();

        for line in state.cart.clone() {
            let name = Self::product(state, line.product_id)
                .map_or_else(|| "unknown".to_string(), |p| p.name.clone());
            let available = Self::available(state, line.product_id, &line.selector);
            if available <= 0 {
                removed.push(RemovedLine {
                    product_id: line.product_id,
                    product_name: name,
                    old_quantity: line.quantity,
                });
            } else if i64::from(line.quantity) > available {
                let new_quantity = u32::try_from(available).unwrap_or(u32::MAX);
                adjusted.push(AdjustedLine {
                    product_id: line.product_id,
                    product_name: name,
                    old_quantity: line.quantity,
                    new_quantity,
                });
                kept.push(ServerLine {
                    quantity: new_quantity,
                    ..line
                });
            } else {
                kept.push(line);
            }
        }

        state.cart = kept;
        (removed, adjusted)
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn json_error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

async fn guard(State(shop): State<Arc<MockShop>>, request: Request, next: Next) -> Response {
    let identity = request
        .headers()
        .get("X-Init-Data")
        .and_then(|v| v.to_str().ok());
    if identity != Some(TEST_INIT_DATA) {
        return json_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let key = format!("{} {}", request.method(), request.uri().path());
    {
        let mut state = lock(&shop.state);
        state.requests.push(key.clone());
        if state.failing.contains(&key) {
            return json_error(StatusCode::SERVICE_UNAVAILABLE, "Service unavailable");
        }
    }

    next.run(request).await
}

async fn get_config() -> Json<ShopConfig> {
    Json(ShopConfig {
        shop_name: "Test Shop".to_string(),
        checkout_type: "form".to_string(),
        currency: "USD".to_string(),
        delivery_enabled: true,
        pickup_enabled: true,
        promo_enabled: true,
        payment_enabled: false,
        bonus_enabled: false,
        support_link: String::new(),
        is_admin: false,
        is_owner: false,
        store_address: None,
        delivery_city: None,
        delivery_cost: Price::ZERO,
        free_delivery_min_amount: Price::ZERO,
        min_order_amount_pickup: Price::ZERO,
        min_order_amount_delivery: Price::ZERO,
    })
}

async fn get_products(State(shop): State<Arc<MockShop>>) -> Json<ProductPage> {
    let state = lock(&shop.state);
    Json(ProductPage {
        items: state.products.clone(),
        total: state.products.len() as i64,
        page: 1,
        per_page: 20,
    })
}

async fn get_product(State(shop): State<Arc<MockShop>>, Path(id): Path<i64>) -> Response {
    let state = lock(&shop.state);
    match MockShop::product(&state, ProductId::new(id)) {
        Some(product) => Json(product.clone()).into_response(),
        None => json_error(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn get_cart(State(shop): State<Arc<MockShop>>) -> Json<CartSnapshot> {
    let state = lock(&shop.state);
    Json(MockShop::snapshot(&state))
}

async fn add_to_cart(
    State(shop): State<Arc<MockShop>>,
    Json(input): Json<CartLineInput>,
) -> Response {
    let mut state = lock(&shop.state);
    let selector = VariantSelector::new(input.modification_type_id, input.modification_value);
    if MockShop::product(&state, input.product_id).is_none() {
        return json_error(StatusCode::NOT_FOUND, "Product not found");
    }

    let available = MockShop::available(&state, input.product_id, &selector);
    if available <= 0 {
        return json_error(StatusCode::CONFLICT, "Item is out of stock");
    }

    let existing = state
        .cart
        .iter_mut()
        .find(|line| line.product_id == input.product_id && line.selector == selector);
    let line = match existing {
        Some(line) => {
            let wanted = i64::from(line.quantity) + i64::from(input.quantity);
            line.quantity = u32::try_from(wanted.min(available)).unwrap_or(u32::MAX);
            line.clone()
        }
        None => {
            let line = ServerLine {
                id: CartLineId::new(shop.next_line_id.fetch_add(1, Ordering::Relaxed)),
                product_id: input.product_id,
                quantity: u32::try_from(i64::from(input.quantity).min(available))
                    .unwrap_or(u32::MAX),
                selector,
            };
            state.cart.push(line.clone());
            line
        }
    };

    match MockShop::cart_line(&state, &line) {
        Some(body) => Json(body).into_response(),
        None => json_error(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn update_cart_line(
    State(shop): State<Arc<MockShop>>,
    Path(id): Path<i64>,
    Json(update): Json<QuantityUpdate>,
) -> Response {
    let mut state = lock(&shop.state);
    let line_id = CartLineId::new(id);

    let Some(index) = state.cart.iter().position(|line| line.id == line_id) else {
        return json_error(StatusCode::NOT_FOUND, "Cart item not found");
    };
    let (product_id, selector) = {
        let line = &state.cart[index];
        (line.product_id, line.selector.clone())
    };
    let available = MockShop::available(&state, product_id, &selector);
    let clamped = u32::try_from(i64::from(update.quantity).min(available.max(0)))
        .unwrap_or(u32::MAX);
    state.cart[index].quantity = clamped;

    let line = state.cart[index].clone();
    match MockShop::cart_line(&state, &line) {
        Some(body) => Json(body).into_response(),
        None => json_error(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn remove_cart_line(State(shop): State<Arc<MockShop>>, Path(id): Path<i64>) -> Response {
    let mut state = lock(&shop.state);
    let line_id = CartLineId::new(id);
    let before = state.cart.len();
    state.cart.retain(|line| line.id != line_id);
    if state.cart.len() == before {
        return json_error(StatusCode::NOT_FOUND, "Cart item not found");
    }
    Json(Ack { ok: true }).into_response()
}

async fn clear_cart(State(shop): State<Arc<MockShop>>) -> Json<Ack> {
    lock(&shop.state).cart.clear();
    Json(Ack { ok: true })
}

async fn validate_cart(State(shop): State<Arc<MockShop>>) -> Json<CartValidation> {
    let mut state = lock(&shop.state);
    let (removed, adjusted) = MockShop::correct_cart(&mut state);
    let snapshot = MockShop::snapshot(&state);
    Json(CartValidation {
        items: snapshot.items,
        total_price: snapshot.total_price,
        total_items: snapshot.total_items,
        removed,
        adjusted,
    })
}

async fn get_favorites(State(shop): State<Arc<MockShop>>) -> Json<Vec<Product>> {
    let state = lock(&shop.state);
    let items = state
        .favorites
        .iter()
        .filter_map(|id| MockShop::product(&state, *id))
        .cloned()
        .map(|mut product| {
            product.is_favorite = true;
            product
        })
        .collect();
    Json(items)
}

async fn add_favorite(State(shop): State<Arc<MockShop>>, Path(id): Path<i64>) -> Response {
    let mut state = lock(&shop.state);
    let product_id = ProductId::new(id);
    if MockShop::product(&state, product_id).is_none() {
        return json_error(StatusCode::NOT_FOUND, "Product not found");
    }
    if !state.favorites.contains(&product_id) {
        state.favorites.push(product_id);
    }
    Json(Ack { ok: true }).into_response()
}

async fn remove_favorite(State(shop): State<Arc<MockShop>>, Path(id): Path<i64>) -> Response {
    let mut state = lock(&shop.state);
    let product_id = ProductId::new(id);
    let before = state.favorites.len();
    state.favorites.retain(|fav| *fav != product_id);
    if state.favorites.len() == before {
        return json_error(StatusCode::NOT_FOUND, "Not in favorites");
    }
    Json(Ack { ok: true }).into_response()
}

async fn validate_favorites(State(shop): State<Arc<MockShop>>) -> Json<FavoritesValidation> {
    let mut state = lock(&shop.state);
    let mut removed = Vec::new();
    let mut kept = Vec::new();
    for product_id in state.favorites.clone() {
        let purchasable =
            MockShop::available(&state, product_id, &VariantSelector::none()) > 0;
        if purchasable {
            kept.push(product_id);
        } else {
            let name = MockShop::product(&state, product_id)
                .map_or_else(|| "unknown".to_string(), |p| p.name.clone());
            removed.push(RemovedFavorite {
                product_id,
                product_name: name,
            });
        }
    }
    state.favorites = kept;
    Json(FavoritesValidation { removed })
}

async fn create_order(
    State(shop): State<Arc<MockShop>>,
    Json(order): Json<NewOrder>,
) -> Response {
    let mut state = lock(&shop.state);
    if state.cart.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "Cart is empty");
    }

    let (removed, adjusted) = MockShop::correct_cart(&mut state);
    if !removed.is_empty() || !adjusted.is_empty() {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "detail": "Cart changed",
                "removed": removed,
                "adjusted": adjusted,
            })),
        )
            .into_response();
    }

    let snapshot = MockShop::snapshot(&state);
    let placed = Order {
        id: minishop_core::OrderId::new(shop.next_order_id.fetch_add(1, Ordering::Relaxed)),
        status: "pending".to_string(),
        total: snapshot.total_price,
        discount: Price::ZERO,
        bonus_used: Price::ZERO,
        delivery_fee: Price::ZERO,
        delivery_type: order.delivery_type,
        customer_name: order.customer_name,
        customer_phone: order.customer_phone,
        address: order.address,
        payment_status: None,
        delivery_service: None,
        tracking_number: None,
        created_at: test_timestamp(),
        items: Vec::new(),
    };
    state.cart.clear();
    state.orders.push(placed.clone());
    Json(placed).into_response()
}

async fn get_categories(State(shop): State<Arc<MockShop>>) -> Json<Vec<Category>> {
    Json(lock(&shop.state).categories.clone())
}

async fn get_banners(State(shop): State<Arc<MockShop>>) -> Json<Vec<Banner>> {
    Json(lock(&shop.state).banners.clone())
}

async fn get_orders(State(shop): State<Arc<MockShop>>) -> Json<OrderPage> {
    let state = lock(&shop.state);
    Json(OrderPage {
        items: state.orders.clone(),
        total: state.orders.len() as i64,
    })
}

async fn get_order(State(shop): State<Arc<MockShop>>, Path(id): Path<i64>) -> Response {
    let state = lock(&shop.state);
    let order_id = OrderId::new(id);
    match state.orders.iter().find(|order| order.id == order_id) {
        Some(order) => Json(order.clone()).into_response(),
        None => json_error(StatusCode::NOT_FOUND, "Order not found"),
    }
}

async fn check_promo(Json(request): Json<PromoCheckRequest>) -> Json<PromoCheck> {
    if request.code == TEST_PROMO_CODE {
        Json(PromoCheck {
            valid: true,
            discount_type: Some("percent".to_string()),
            discount_value: Some(Decimal::from(10)),
            message: "Promo code applied".to_string(),
        })
    } else {
        Json(PromoCheck {
            valid: false,
            discount_type: None,
            discount_value: None,
            message: "Invalid promo code".to_string(),
        })
    }
}

async fn get_me(State(shop): State<Arc<MockShop>>) -> Json<Profile> {
    Json(Profile {
        bonus_balance: lock(&shop.state).bonus_balance,
    })
}

async fn upload_product_media(
    State(shop): State<Arc<MockShop>>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Response {
    // Drain the body before taking the state lock
    let mut file = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("upload.bin").to_string();
            let bytes = field.bytes().await.unwrap_or_default();
            file = Some((file_name, bytes.len()));
        }
    }
    let Some((file_name, _size)) = file else {
        return json_error(StatusCode::BAD_REQUEST, "Missing file field");
    };

    let mut state = lock(&shop.state);
    let product_id = ProductId::new(id);
    let Some(product) = state.products.iter_mut().find(|p| p.id == product_id) else {
        return json_error(StatusCode::NOT_FOUND, "Product not found");
    };

    let media = ProductMedia {
        id: MediaId::new(shop.next_media_id.fetch_add(1, Ordering::Relaxed)),
        media_type: if file_name.ends_with(".mp4") {
            MediaType::Video
        } else {
            MediaType::Image
        },
        url: format!("/media/{file_name}"),
        sort_order: product.media.len() as i32,
    };
    product.media.push(media.clone());
    Json(media).into_response()
}

fn router(shop: Arc<MockShop>) -> Router {
    Router::new()
        .route("/config", get(get_config))
        .route("/products", get(get_products))
        .route("/products/{id}", get(get_product))
        .route("/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route(
            "/cart/{id}",
            delete(remove_cart_line).patch(update_cart_line),
        )
        .route("/cart/validate", post(validate_cart))
        .route("/favorites", get(get_favorites))
        .route("/favorites/{id}", post(add_favorite).delete(remove_favorite))
        .route("/favorites/validate", post(validate_favorites))
        .route("/orders", post(create_order).get(get_orders))
        .route("/orders/{id}", get(get_order))
        .route("/categories", get(get_categories))
        .route("/banners", get(get_banners))
        .route("/promo/check", post(check_promo))
        .route("/user/me", get(get_me))
        .route("/admin/products/{id}/media", post(upload_product_media))
        .layer(middleware::from_fn_with_state(shop.clone(), guard))
        .with_state(shop)
}

// =============================================================================
// Test context
// =============================================================================

/// A running mock backend plus a real client pointed at it.
pub struct TestContext {
    pub shop: Arc<MockShop>,
    pub host: Arc<RecordingHost>,
    pub api: RemoteClient,
    pub addr: SocketAddr,
}

impl TestContext {
    /// Start a mock backend on a random loopback port and build a client
    /// for it. The server task lives until the runtime shuts down.
    ///
    /// # Panics
    ///
    /// Panics if the listener or client cannot be created; tests cannot
    /// proceed without either.
    #[allow(clippy::unwrap_used)]
    pub async fn start() -> Self {
        let shop = MockShop::new();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(shop.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let host = RecordingHost::new();
        let config = ClientConfig::new(format!("http://{addr}").parse().unwrap());
        let api = RemoteClient::new(&config, host.as_ref()).unwrap();

        Self {
            shop,
            host,
            api,
            addr,
        }
    }

    /// A cart store bound to this context's client and host.
    #[must_use]
    pub fn cart_store(&self) -> CartStore {
        CartStore::new(self.api.clone(), self.host.clone())
    }

    /// A favorites store bound to this context's client and host.
    #[must_use]
    pub fn favorites_store(&self) -> FavoritesStore {
        FavoritesStore::new(self.api.clone(), self.host.clone())
    }

    /// A full app bootstrap bound to this context's client and host.
    #[must_use]
    pub fn bootstrap(&self) -> AppBootstrap {
        AppBootstrap::new(self.api.clone(), self.host.clone())
    }
}
