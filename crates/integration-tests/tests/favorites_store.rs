//! Favorites store behavior over a live mock backend: optimistic toggling
//! with exact rollback, and the validation refresh policy.

#![allow(clippy::unwrap_used)]

use minishop_core::VariantSelector;
use minishop_integration_tests::TestContext;

#[tokio::test]
async fn test_fetch_and_membership() {
    let ctx = TestContext::start().await;
    let mug = ctx.shop.seed_product("Mug", 10, 5);
    let bowl = ctx.shop.seed_product("Bowl", 15, 5);
    ctx.shop.insert_favorite(mug);

    let favorites = ctx.favorites_store();
    favorites.fetch().await.unwrap();

    assert!(favorites.is_favorite(mug));
    assert!(!favorites.is_favorite(bowl));
    assert_eq!(favorites.items().len(), 1);
}

#[tokio::test]
async fn test_toggle_on_commits_and_refreshes() {
    let ctx = TestContext::start().await;
    let mug = ctx.shop.seed_product("Mug", 10, 5);

    let favorites = ctx.favorites_store();
    favorites.fetch().await.unwrap();

    let snapshot = ctx.api.get_product(mug).await.unwrap();
    favorites.toggle(mug, false, Some(snapshot)).await.unwrap();

    assert!(favorites.is_favorite(mug));
    assert_eq!(ctx.shop.server_favorites(), vec![mug]);
    assert!(favorites.items()[0].is_favorite);
}

#[tokio::test]
async fn test_toggle_off_commits() {
    let ctx = TestContext::start().await;
    let mug = ctx.shop.seed_product("Mug", 10, 5);
    ctx.shop.insert_favorite(mug);

    let favorites = ctx.favorites_store();
    favorites.fetch().await.unwrap();

    favorites.toggle(mug, true, None).await.unwrap();

    assert!(!favorites.is_favorite(mug));
    assert!(ctx.shop.server_favorites().is_empty());
}

#[tokio::test]
async fn test_failed_unfavorite_rolls_back_exactly() {
    let ctx = TestContext::start().await;
    let mug = ctx.shop.seed_product("Mug", 10, 5);
    let bowl = ctx.shop.seed_product("Bowl", 15, 5);
    ctx.shop.insert_favorite(mug);
    ctx.shop.insert_favorite(bowl);

    let favorites = ctx.favorites_store();
    favorites.fetch().await.unwrap();
    let before = favorites.items();

    ctx.shop.fail_endpoint(&format!("DELETE /favorites/{mug}"));
    let result = favorites.toggle(mug, true, None).await;

    assert!(result.is_err());
    assert!(favorites.is_favorite(mug));
    assert!(favorites.is_favorite(bowl));

    // Exact restore, order included
    let after = favorites.items();
    let ids_before: Vec<_> = before.iter().map(|p| p.id).collect();
    let ids_after: Vec<_> = after.iter().map(|p| p.id).collect();
    assert_eq!(ids_before, ids_after);

    assert_eq!(ctx.host.alerts(), vec!["Service unavailable".to_string()]);
}

#[tokio::test]
async fn test_failed_favorite_rolls_back() {
    let ctx = TestContext::start().await;
    let mug = ctx.shop.seed_product("Mug", 10, 5);

    let favorites = ctx.favorites_store();
    favorites.fetch().await.unwrap();

    ctx.shop.fail_endpoint(&format!("POST /favorites/{mug}"));
    let snapshot = ctx.api.get_product(mug).await.unwrap();
    let result = favorites.toggle(mug, false, Some(snapshot)).await;

    assert!(result.is_err());
    assert!(!favorites.is_favorite(mug));
    assert!(ctx.shop.server_favorites().is_empty());
}

#[tokio::test]
async fn test_refresh_failure_after_successful_toggle_keeps_optimistic_state() {
    let ctx = TestContext::start().await;
    let mug = ctx.shop.seed_product("Mug", 10, 5);

    let favorites = ctx.favorites_store();
    favorites.fetch().await.unwrap();

    // The mutation goes through; only the follow-up refresh fails
    ctx.shop.fail_endpoint("GET /favorites");
    let snapshot = ctx.api.get_product(mug).await.unwrap();
    favorites.toggle(mug, false, Some(snapshot)).await.unwrap();

    assert!(favorites.is_favorite(mug));
    assert_eq!(ctx.shop.server_favorites(), vec![mug]);
}

#[tokio::test]
async fn test_validate_drops_depleted_favorites() {
    let ctx = TestContext::start().await;
    let mug = ctx.shop.seed_product("Mug", 10, 5);
    let bowl = ctx.shop.seed_product("Bowl", 15, 5);
    ctx.shop.insert_favorite(mug);
    ctx.shop.insert_favorite(bowl);

    let favorites = ctx.favorites_store();
    favorites.fetch().await.unwrap();

    ctx.shop.set_stock(bowl, 0);

    let removed = favorites.validate().await;
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].product_name, "Bowl");

    assert!(favorites.is_favorite(mug));
    assert!(!favorites.is_favorite(bowl));
}

#[tokio::test]
async fn test_validate_skips_refetch_when_nothing_removed() {
    let ctx = TestContext::start().await;
    let mug = ctx.shop.seed_product("Mug", 10, 5);
    ctx.shop.insert_favorite(mug);

    let favorites = ctx.favorites_store();
    favorites.fetch().await.unwrap();
    let fetches_before = ctx.shop.request_count("GET /favorites");

    let removed = favorites.validate().await;
    assert!(removed.is_empty());
    assert_eq!(ctx.shop.request_count("GET /favorites"), fetches_before);
}

#[tokio::test]
async fn test_favorites_and_cart_validation_are_independent() {
    let ctx = TestContext::start().await;
    let mug = ctx.shop.seed_product("Mug", 10, 5);
    ctx.shop.insert_favorite(mug);
    ctx.shop
        .insert_cart_line(mug, 2, VariantSelector::none());

    let favorites = ctx.favorites_store();
    favorites.fetch().await.unwrap();

    // Favorites validation must not touch the cart
    ctx.shop.set_stock(mug, 0);
    let removed = favorites.validate().await;
    assert_eq!(removed.len(), 1);
    assert_eq!(ctx.shop.server_cart_len(), 1);
}
