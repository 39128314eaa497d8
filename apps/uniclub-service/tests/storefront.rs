//! Shopper flows: browse, cart, checkout, order history, reviews.

mod common;

use uniclub_core::{Money, OrderStatus};
use uniclub_service::commands::cart::{
    add_to_cart, cart_summary, remove_from_cart, set_order_note, update_cart_quantity,
};
use uniclub_service::commands::catalog::{browse_catalog, catalog_filters, product_detail};
use uniclub_service::commands::checkout::{checkout, CheckoutRequest};
use uniclub_service::commands::orders::{
    cancel_order, list_orders, my_orders, order_detail, update_order_status,
};
use uniclub_service::commands::reviews::{submit_review, ReviewRequest};
use uniclub_service::error::ErrorCode;

use common::{billing, seeded, shopper};

fn ids(cards: &[uniclub_service::commands::catalog::ProductCard]) -> Vec<i64> {
    cards.iter().map(|c| c.id).collect()
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_browse_lists_active_products_newest_first() {
    let s = seeded().await;

    let response = browse_catalog(&s.ctx.db, &s.ctx.config, "").await.unwrap();

    assert_eq!(ids(&response.products), vec![s.hoodie, s.jeans, s.tee]);
    assert_eq!(response.query, "");
    assert_eq!(response.price_bounds.min, Money::from_dong(150_000));
    assert_eq!(response.price_bounds.max, Money::from_dong(350_000));

    let hoodie = &response.products[0];
    assert!(hoodie.out_of_stock);
    assert_eq!(hoodie.min_price, Money::from_dong(280_000));
}

#[tokio::test]
async fn test_browse_filters_and_sorts() {
    let s = seeded().await;

    let query = format!("?category={}&sort=price-asc", s.category_ao);
    let response = browse_catalog(&s.ctx.db, &s.ctx.config, &query).await.unwrap();
    assert_eq!(ids(&response.products), vec![s.tee, s.hoodie]);
    assert!(response.query.contains("sort=price-asc"));

    let response = browse_catalog(&s.ctx.db, &s.ctx.config, "?stock=1&sort=price-desc")
        .await
        .unwrap();
    assert_eq!(ids(&response.products), vec![s.jeans, s.tee]);

    let response = browse_catalog(&s.ctx.db, &s.ctx.config, "?priceMin=200000&priceMax=350000")
        .await
        .unwrap();
    assert_eq!(ids(&response.products), vec![s.hoodie, s.jeans]);
    assert_eq!(response.price_range.min, Money::from_dong(200_000));
}

#[tokio::test]
async fn test_browse_search_is_case_insensitive() {
    let s = seeded().await;

    let response = browse_catalog(&s.ctx.db, &s.ctx.config, "?search=JEAN").await.unwrap();
    assert_eq!(ids(&response.products), vec![s.jeans]);

    let response = browse_catalog(&s.ctx.db, &s.ctx.config, "?search=khong-co")
        .await
        .unwrap();
    assert!(response.products.is_empty());
}

#[tokio::test]
async fn test_filters_list_active_facets() {
    let s = seeded().await;

    let filters = catalog_filters(&s.ctx.db).await.unwrap();
    assert_eq!(filters.categories.len(), 2);
    assert_eq!(filters.sizes.len(), 2);
    assert_eq!(filters.colors.len(), 2);
}

#[tokio::test]
async fn test_product_detail() {
    let s = seeded().await;

    let detail = product_detail(&s.ctx.db, s.tee).await.unwrap();
    assert_eq!(detail.variants.len(), 2);
    assert_eq!(detail.min_price, Money::from_dong(150_000));
    assert!(!detail.out_of_stock);
    assert_eq!(detail.variants[0].size, "M");
    assert_eq!(detail.variants[0].color, "Đen");

    let err = product_detail(&s.ctx.db, s.retired).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    let err = product_detail(&s.ctx.db, 9_999).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_totals_and_shipping() {
    let s = seeded().await;
    let ctx = &s.ctx;

    let summary = cart_summary(&ctx.cart, &ctx.config).unwrap();
    assert!(summary.lines.is_empty());
    assert_eq!(summary.shipping_fee, Money::zero());

    let summary = add_to_cart(&ctx.db, &ctx.cart, &ctx.config, s.tee_black_m, 2)
        .await
        .unwrap();
    assert_eq!(summary.item_count, 2);
    assert_eq!(summary.subtotal, Money::from_dong(300_000));
    assert_eq!(summary.shipping_fee, Money::from_dong(30_000));
    assert_eq!(summary.total, Money::from_dong(330_000));
    assert_eq!(summary.free_shipping_gap, Money::from_dong(199_000));
    assert_eq!(summary.lines[0].size, "M");
    assert_eq!(summary.lines[0].color, "Đen");

    let summary = add_to_cart(&ctx.db, &ctx.cart, &ctx.config, s.jeans_blue_m, 1)
        .await
        .unwrap();
    assert_eq!(summary.subtotal, Money::from_dong(650_000));
    assert_eq!(summary.shipping_fee, Money::zero());
    assert_eq!(summary.free_shipping_gap, Money::zero());
}

#[tokio::test]
async fn test_cart_quantity_is_capped_by_stock() {
    let s = seeded().await;
    let ctx = &s.ctx;

    add_to_cart(&ctx.db, &ctx.cart, &ctx.config, s.tee_black_l, 1)
        .await
        .unwrap();
    let summary = add_to_cart(&ctx.db, &ctx.cart, &ctx.config, s.tee_black_l, 10)
        .await
        .unwrap();
    assert_eq!(summary.lines.len(), 1);
    assert_eq!(summary.lines[0].quantity, 2);

    let summary = update_cart_quantity(&ctx.cart, &ctx.config, s.tee_black_l, 0).unwrap();
    assert_eq!(summary.lines[0].quantity, 1);

    let err = update_cart_quantity(&ctx.cart, &ctx.config, s.jeans_blue_m, 1).unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    let summary = remove_from_cart(&ctx.cart, &ctx.config, s.tee_black_l).unwrap();
    assert!(summary.lines.is_empty());
    assert_eq!(summary.total, Money::zero());
}

#[tokio::test]
async fn test_sold_out_or_unknown_variant_is_refused() {
    let s = seeded().await;
    let ctx = &s.ctx;

    let err = add_to_cart(&ctx.db, &ctx.cart, &ctx.config, s.hoodie_black_l, 1)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);

    let err = add_to_cart(&ctx.db, &ctx.cart, &ctx.config, 9_999, 1)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);

    assert!(cart_summary(&ctx.cart, &ctx.config).unwrap().lines.is_empty());
}

// =============================================================================
// Checkout and Orders
// =============================================================================

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let s = seeded().await;
    let ctx = &s.ctx;
    add_to_cart(&ctx.db, &ctx.cart, &ctx.config, s.tee_black_m, 1)
        .await
        .unwrap();

    let request = CheckoutRequest {
        payment_method_id: s.cod,
        billing: billing(),
    };
    let err = checkout(&ctx.db, &ctx.cart, &ctx.session, &ctx.config, request)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::Unauthorized);
    assert_eq!(cart_summary(&ctx.cart, &ctx.config).unwrap().item_count, 1);
}

#[tokio::test]
async fn test_checkout_rejects_bad_input_and_keeps_cart() {
    let s = seeded().await;
    let ctx = &s.ctx;
    ctx.session.login(&shopper(7)).unwrap();

    let request = CheckoutRequest {
        payment_method_id: s.cod,
        billing: billing(),
    };
    let err = checkout(&ctx.db, &ctx.cart, &ctx.session, &ctx.config, request)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    add_to_cart(&ctx.db, &ctx.cart, &ctx.config, s.tee_black_m, 1)
        .await
        .unwrap();

    let request = CheckoutRequest {
        payment_method_id: s.retired_method,
        billing: billing(),
    };
    let err = checkout(&ctx.db, &ctx.cart, &ctx.session, &ctx.config, request)
        .await
        .unwrap_err();
    assert!(err.fields.unwrap().contains("payment_method_id"));

    let mut bad = billing();
    bad.phone = "123".to_string();
    let request = CheckoutRequest {
        payment_method_id: s.cod,
        billing: bad,
    };
    let err = checkout(&ctx.db, &ctx.cart, &ctx.session, &ctx.config, request)
        .await
        .unwrap_err();
    assert!(err.fields.unwrap().contains("phone"));

    assert_eq!(cart_summary(&ctx.cart, &ctx.config).unwrap().item_count, 1);
    assert!(list_orders(&ctx.db, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_places_order_and_clears_cart() {
    let s = seeded().await;
    let ctx = &s.ctx;
    ctx.session.login(&shopper(7)).unwrap();

    add_to_cart(&ctx.db, &ctx.cart, &ctx.config, s.tee_black_m, 2)
        .await
        .unwrap();
    set_order_note(&ctx.session, "Giao giờ hành chính").unwrap();

    let request = CheckoutRequest {
        payment_method_id: s.cod,
        billing: billing(),
    };
    let order = checkout(&ctx.db, &ctx.cart, &ctx.session, &ctx.config, request)
        .await
        .unwrap();

    assert_eq!(order.user_id, 7);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.subtotal, Money::from_dong(300_000));
    assert_eq!(order.total, Money::from_dong(330_000));
    assert_eq!(order.note.as_deref(), Some("Giao giờ hành chính"));

    assert!(cart_summary(&ctx.cart, &ctx.config).unwrap().lines.is_empty());
    assert_eq!(ctx.session.order_note().unwrap(), None);

    // stock is untouched by checkout
    let variant = ctx.db.inner().catalog().get_variant(s.tee_black_m).await.unwrap().unwrap();
    assert_eq!(variant.quantity, 5);

    let detail = order_detail(&ctx.db, &ctx.session, order.id).await.unwrap();
    assert_eq!(detail.lines.len(), 1);
    assert_eq!(detail.lines[0].quantity, 2);
    assert_eq!(detail.billing, billing());
    assert!(detail.cancellable);

    assert_eq!(my_orders(&ctx.db, &ctx.session).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_shopper_cancels_only_own_pending_order() {
    let s = seeded().await;
    let ctx = &s.ctx;
    ctx.session.login(&shopper(7)).unwrap();
    add_to_cart(&ctx.db, &ctx.cart, &ctx.config, s.jeans_blue_m, 1)
        .await
        .unwrap();
    let order = checkout(
        &ctx.db,
        &ctx.cart,
        &ctx.session,
        &ctx.config,
        CheckoutRequest {
            payment_method_id: s.cod,
            billing: billing(),
        },
    )
    .await
    .unwrap();

    ctx.session.login(&shopper(8)).unwrap();
    let err = order_detail(&ctx.db, &ctx.session, order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    let err = cancel_order(&ctx.db, &ctx.session, order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert!(my_orders(&ctx.db, &ctx.session).await.unwrap().is_empty());

    ctx.session.login(&shopper(7)).unwrap();
    let cancelled = cancel_order(&ctx.db, &ctx.session, order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let err = cancel_order(&ctx.db, &ctx.session, order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);
}

#[tokio::test]
async fn test_admin_moves_order_through_statuses() {
    let s = seeded().await;
    let ctx = &s.ctx;
    ctx.session.login(&shopper(7)).unwrap();
    add_to_cart(&ctx.db, &ctx.cart, &ctx.config, s.tee_black_m, 1)
        .await
        .unwrap();
    let order = checkout(
        &ctx.db,
        &ctx.cart,
        &ctx.session,
        &ctx.config,
        CheckoutRequest {
            payment_method_id: s.cod,
            billing: billing(),
        },
    )
    .await
    .unwrap();

    let err = update_order_status(&ctx.db, order.id, OrderStatus::Delivered)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);

    for next in [OrderStatus::Confirmed, OrderStatus::Shipping, OrderStatus::Delivered] {
        let updated = update_order_status(&ctx.db, order.id, next).await.unwrap();
        assert_eq!(updated.status, next);
    }

    let delivered = list_orders(&ctx.db, Some(OrderStatus::Delivered)).await.unwrap();
    assert_eq!(delivered.len(), 1);
    assert!(list_orders(&ctx.db, Some(OrderStatus::Pending)).await.unwrap().is_empty());

    let err = cancel_order(&ctx.db, &ctx.session, order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);
}

#[tokio::test]
async fn test_corrupt_session_is_cleared() {
    let s = seeded().await;
    let ctx = &s.ctx;
    let mut user = shopper(7);
    user.token = " ".to_string();
    ctx.session.login(&user).unwrap();

    let err = my_orders(&ctx.db, &ctx.session).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Unauthorized);
    assert_eq!(ctx.session.current_user().unwrap(), None);
}

// =============================================================================
// Reviews
// =============================================================================

#[tokio::test]
async fn test_reviews_feed_rating_sort() {
    let s = seeded().await;
    let ctx = &s.ctx;
    ctx.session.login(&shopper(7)).unwrap();

    let err = submit_review(
        &ctx.db,
        &ctx.session,
        ReviewRequest {
            product_id: s.jeans,
            stars: 6,
            comment: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);

    let review = submit_review(
        &ctx.db,
        &ctx.session,
        ReviewRequest {
            product_id: s.jeans,
            stars: 4,
            comment: Some("  Vải đẹp  ".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(review.user_id, 7);
    assert_eq!(review.comment.as_deref(), Some("Vải đẹp"));

    let response = browse_catalog(&ctx.db, &ctx.config, "?sort=rating").await.unwrap();
    assert_eq!(response.products[0].id, s.jeans);
    assert_eq!(response.products[0].average_rating, 4.0);

    let detail = product_detail(&ctx.db, s.jeans).await.unwrap();
    assert_eq!(detail.reviews.len(), 1);
}
