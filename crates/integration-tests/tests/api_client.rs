//! End-to-end coverage for the client wrappers outside the store flows:
//! catalog reads and their cache, order history, promo checking, profile,
//! and the multipart media upload.

#![allow(clippy::unwrap_used)]

use minishop_core::VariantSelector;
use minishop_client::checkout::Checkout;
use minishop_client::types::{MediaType, NewOrder, PromoCheckRequest};
use minishop_integration_tests::{TEST_PROMO_CODE, TestContext};
use rust_decimal::Decimal;

#[tokio::test]
async fn test_order_history_lists_placed_orders() {
    let ctx = TestContext::start().await;
    let mug = ctx.shop.seed_product("Mug", 10, 5);

    let cart = ctx.cart_store();
    cart.add_line(mug, 2, VariantSelector::none()).await.unwrap();

    let checkout = Checkout::new(ctx.api.clone(), cart, ctx.host.clone());
    let placed = checkout
        .place_order(&NewOrder {
            customer_name: "Test Customer".to_string(),
            customer_phone: "+15550100".to_string(),
            ..NewOrder::default()
        })
        .await
        .unwrap();

    let history = ctx.api.get_orders().await.unwrap();
    assert_eq!(history.total, 1);
    assert_eq!(history.items[0].id, placed.id);

    let fetched = ctx.api.get_order(placed.id).await.unwrap();
    assert_eq!(fetched.total, placed.total);
    assert_eq!(fetched.customer_name, "Test Customer");
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let ctx = TestContext::start().await;

    let error = ctx
        .api
        .get_order(minishop_core::OrderId::new(99))
        .await
        .unwrap_err();
    assert_eq!(error.status(), Some(404));
    assert_eq!(error.detail(), Some("Order not found"));
}

#[tokio::test]
async fn test_media_upload_invalidates_cached_product() {
    let ctx = TestContext::start().await;
    let mug = ctx.shop.seed_product("Mug", 10, 5);

    // Prime the cache with the media-less product
    let before = ctx.api.get_product(mug).await.unwrap();
    assert!(before.media.is_empty());

    let media = ctx
        .api
        .upload_product_media(mug, "photo.jpg".to_string(), vec![0xFF, 0xD8, 0xFF])
        .await
        .unwrap();
    assert_eq!(media.media_type, MediaType::Image);
    assert_eq!(media.url, "/media/photo.jpg");

    // The upload busted the catalog cache, so this is a fresh read
    let after = ctx.api.get_product(mug).await.unwrap();
    assert_eq!(after.media.len(), 1);
    assert_eq!(after.media[0].id, media.id);
}

#[tokio::test]
async fn test_catalog_reads_are_cached() {
    let ctx = TestContext::start().await;
    ctx.shop.seed_category("Kitchen");
    ctx.shop.seed_banner("/banners/sale.png");

    let first = ctx.api.get_categories().await.unwrap();
    let second = ctx.api.get_categories().await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].name, "Kitchen");
    assert_eq!(second.len(), 1);
    assert_eq!(ctx.shop.request_count("GET /categories"), 1);

    let banners = ctx.api.get_banners().await.unwrap();
    ctx.api.get_banners().await.unwrap();
    assert_eq!(banners.len(), 1);
    assert_eq!(ctx.shop.request_count("GET /banners"), 1);
}

#[tokio::test]
async fn test_promo_check_round_trip() {
    let ctx = TestContext::start().await;

    let verdict = ctx
        .api
        .check_promo(&PromoCheckRequest {
            code: TEST_PROMO_CODE.to_string(),
            cart_total: None,
            delivery_type: None,
        })
        .await
        .unwrap();
    assert!(verdict.valid);
    assert_eq!(verdict.discount_value, Some(Decimal::from(10)));

    let verdict = ctx
        .api
        .check_promo(&PromoCheckRequest {
            code: "BOGUS".to_string(),
            cart_total: None,
            delivery_type: None,
        })
        .await
        .unwrap();
    assert!(!verdict.valid);
    assert_eq!(verdict.message, "Invalid promo code");
}

#[tokio::test]
async fn test_profile_reports_bonus_balance() {
    let ctx = TestContext::start().await;
    ctx.shop.set_bonus_balance(Decimal::new(2550, 2));

    let profile = ctx.api.get_me().await.unwrap();
    assert_eq!(profile.bonus_balance, Decimal::new(2550, 2));
}
