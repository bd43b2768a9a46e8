//! Cart store behavior over a live mock backend: fetch/mutation resync,
//! variant line identity, and the stock-validation contract.

#![allow(clippy::unwrap_used)]

use minishop_core::{ModificationTypeId, Price, VariantSelector};
use minishop_client::store::StoreError;
use minishop_integration_tests::TestContext;
use rust_decimal::Decimal;

#[tokio::test]
async fn test_fetch_adopts_server_snapshot() {
    let ctx = TestContext::start().await;
    let product = ctx.shop.seed_product("Mug", 10, 5);
    ctx.shop
        .insert_cart_line(product, 2, VariantSelector::none());

    let cart = ctx.cart_store();
    cart.fetch().await.unwrap();

    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.total_items(), 2);
    assert_eq!(cart.total_price(), Price::new(Decimal::from(20)));
    assert!(!cart.is_loading());
}

#[tokio::test]
async fn test_fetch_without_mutation_is_idempotent() {
    let ctx = TestContext::start().await;
    let mug = ctx.shop.seed_product("Mug", 10, 5);
    let bowl = ctx.shop.seed_product("Bowl", 15, 5);
    ctx.shop.insert_cart_line(mug, 2, VariantSelector::none());
    ctx.shop.insert_cart_line(bowl, 1, VariantSelector::none());

    let cart = ctx.cart_store();
    cart.fetch().await.unwrap();
    let first_lines: Vec<_> = cart.lines().iter().map(|l| (l.id, l.quantity)).collect();
    let first_totals = (cart.total_price(), cart.total_items());

    cart.fetch().await.unwrap();
    let second_lines: Vec<_> = cart.lines().iter().map(|l| (l.id, l.quantity)).collect();
    let second_totals = (cart.total_price(), cart.total_items());

    assert_eq!(first_lines, second_lines);
    assert_eq!(first_totals, second_totals);
    assert_eq!(first_totals, (Price::new(Decimal::from(35)), 3));
}

#[tokio::test]
async fn test_add_line_resyncs_from_server() {
    let ctx = TestContext::start().await;
    let product = ctx.shop.seed_product("Mug", 10, 5);

    let cart = ctx.cart_store();
    cart.add_line(product, 3, VariantSelector::none())
        .await
        .unwrap();

    assert_eq!(ctx.shop.server_cart_len(), 1);
    assert_eq!(cart.total_items(), 3);
    assert_eq!(cart.total_price(), Price::new(Decimal::from(30)));
}

#[tokio::test]
async fn test_adding_same_variant_merges_into_one_line() {
    let ctx = TestContext::start().await;
    let product = ctx.shop.seed_product("Mug", 10, 10);

    let cart = ctx.cart_store();
    cart.add_line(product, 1, VariantSelector::none())
        .await
        .unwrap();
    cart.add_line(product, 2, VariantSelector::none())
        .await
        .unwrap();

    let lines = cart.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 3);
}

#[tokio::test]
async fn test_variant_lines_are_distinct() {
    let ctx = TestContext::start().await;
    let type_id = ModificationTypeId::new(1);
    let product =
        ctx.shop
            .seed_variant_product("Shirt", 25, type_id, "Size", &[("M", 4), ("L", 4)]);

    let medium = VariantSelector::new(Some(type_id), Some("M".into()));
    let large = VariantSelector::new(Some(type_id), Some("L".into()));

    let cart = ctx.cart_store();
    cart.add_line(product, 1, medium.clone()).await.unwrap();
    cart.add_line(product, 2, large.clone()).await.unwrap();

    assert_eq!(cart.lines().len(), 2);
    assert_eq!(cart.find_line(product, &medium).unwrap().quantity, 1);
    assert_eq!(cart.find_line(product, &large).unwrap().quantity, 2);
}

#[tokio::test]
async fn test_add_out_of_stock_is_alerted_and_rejected() {
    let ctx = TestContext::start().await;
    let product = ctx.shop.seed_product("Mug", 10, 0);

    let cart = ctx.cart_store();
    let result = cart.add_line(product, 1, VariantSelector::none()).await;

    assert!(matches!(result, Err(StoreError::OutOfStock { .. })));
    assert!(cart.lines().is_empty());
    assert_eq!(ctx.host.alerts(), vec!["Item is out of stock".to_string()]);
}

#[tokio::test]
async fn test_validate_removes_depleted_lines() {
    let ctx = TestContext::start().await;
    let product = ctx.shop.seed_product("Mug", 10, 5);
    ctx.shop
        .insert_cart_line(product, 2, VariantSelector::none());

    let cart = ctx.cart_store();
    cart.fetch().await.unwrap();
    assert_eq!(cart.total_items(), 2);

    // Another shopper drains the stock
    ctx.shop.set_stock(product, 0);

    let corrections = cart.validate().await;
    assert_eq!(corrections.removed.len(), 1);
    assert_eq!(corrections.removed[0].product_name, "Mug");
    assert_eq!(corrections.removed[0].old_quantity, 2);
    assert!(corrections.adjusted.is_empty());

    assert!(cart.lines().is_empty());
    assert_eq!(cart.total_items(), 0);
    assert_eq!(cart.total_price(), Price::ZERO);
}

#[tokio::test]
async fn test_validate_clamps_quantity_to_remaining_stock() {
    let ctx = TestContext::start().await;
    let product = ctx.shop.seed_product("Mug", 10, 5);
    ctx.shop
        .insert_cart_line(product, 5, VariantSelector::none());

    let cart = ctx.cart_store();
    cart.fetch().await.unwrap();

    ctx.shop.set_stock(product, 2);

    let corrections = cart.validate().await;
    assert!(corrections.removed.is_empty());
    assert_eq!(corrections.adjusted.len(), 1);
    assert_eq!(corrections.adjusted[0].old_quantity, 5);
    assert_eq!(corrections.adjusted[0].new_quantity, 2);

    assert_eq!(cart.lines()[0].quantity, 2);
    assert_eq!(cart.total_price(), Price::new(Decimal::from(20)));
}

#[tokio::test]
async fn test_validate_is_idempotent_when_stock_is_fine() {
    let ctx = TestContext::start().await;
    let product = ctx.shop.seed_product("Mug", 10, 5);
    ctx.shop
        .insert_cart_line(product, 2, VariantSelector::none());

    let cart = ctx.cart_store();
    cart.fetch().await.unwrap();

    let first = cart.validate().await;
    let second = cart.validate().await;
    assert!(first.is_empty());
    assert!(second.is_empty());
    assert_eq!(cart.total_items(), 2);
}

#[tokio::test]
async fn test_update_line_picks_up_server_clamping() {
    let ctx = TestContext::start().await;
    let product = ctx.shop.seed_product("Mug", 10, 3);

    let cart = ctx.cart_store();
    cart.add_line(product, 1, VariantSelector::none())
        .await
        .unwrap();
    let line_id = cart.lines()[0].id;

    // Ask for more than exists; the server clamps and the resync shows it
    cart.update_line(line_id, 10).await.unwrap();
    assert_eq!(cart.lines()[0].quantity, 3);
}

#[tokio::test]
async fn test_update_to_zero_removes_the_line() {
    let ctx = TestContext::start().await;
    let product = ctx.shop.seed_product("Mug", 10, 5);

    let cart = ctx.cart_store();
    cart.add_line(product, 2, VariantSelector::none())
        .await
        .unwrap();
    let line_id = cart.lines()[0].id;

    cart.update_line(line_id, 0).await.unwrap();
    assert!(cart.lines().is_empty());
    assert_eq!(ctx.shop.server_cart_len(), 0);
}

#[tokio::test]
async fn test_failed_update_alerts_and_resyncs() {
    let ctx = TestContext::start().await;
    let product = ctx.shop.seed_product("Mug", 10, 5);

    let cart = ctx.cart_store();
    cart.add_line(product, 2, VariantSelector::none())
        .await
        .unwrap();
    let line_id = cart.lines()[0].id;

    ctx.shop.fail_endpoint(&format!("PATCH /cart/{line_id}"));
    let result = cart.update_line(line_id, 4).await;

    assert!(result.is_err());
    assert_eq!(ctx.host.alerts(), vec!["Service unavailable".to_string()]);
    // The failed mutation changed nothing server-side and the resync keeps
    // the local copy in line with that
    assert_eq!(cart.lines()[0].quantity, 2);
}

#[tokio::test]
async fn test_clear_resets_locally_without_refetch() {
    let ctx = TestContext::start().await;
    let product = ctx.shop.seed_product("Mug", 10, 5);

    let cart = ctx.cart_store();
    cart.add_line(product, 2, VariantSelector::none())
        .await
        .unwrap();
    let fetches_before = ctx.shop.request_count("GET /cart");

    cart.clear().await.unwrap();

    assert!(cart.lines().is_empty());
    assert_eq!(cart.total_items(), 0);
    assert_eq!(cart.total_price(), Price::ZERO);
    assert_eq!(ctx.shop.server_cart_len(), 0);
    assert_eq!(ctx.shop.request_count("GET /cart"), fetches_before);
}

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    use minishop_client::api::RemoteClient;
    use minishop_client::config::ClientConfig;
    use minishop_client::host::DetachedHost;

    let ctx = TestContext::start().await;
    ctx.shop.seed_product("Mug", 10, 5);

    let config = ClientConfig::new(format!("http://{}", ctx.addr).parse().unwrap());
    let api = RemoteClient::new(&config, &DetachedHost).unwrap();

    let error = api.get_cart().await.unwrap_err();
    assert_eq!(error.status(), Some(401));
    assert_eq!(error.detail(), Some("Unauthorized"));
}
