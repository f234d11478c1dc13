//! End-to-end cart flows through a `Store` against the in-memory backend
//!
//! Each test drives the cart the way a view does: send a command, wait for
//! the result event, then read state. The backend double behaves like the
//! real service, so the server's view of the cart is checked as well.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::sync::Arc;
use std::time::Duration;
use storefront::{
    CartAction, CartReducer, CartState, CartStore, CheckoutState, Level, Phase, StockPolicy,
    StorefrontEnvironment,
};
use storefront_api::{ApiError, CartLine, CartLineId, Decimal, FailureCategory, Product, ProductId};
use storefront_runtime::Store;
use storefront_testing::{InMemoryStorefront, Operation, test_clock};

const WAIT: Duration = Duration::from_secs(1);

fn product(id: i64, price: i64, stock: u32) -> Product {
    Product {
        id: ProductId(id),
        name: format!("Product {id}"),
        price: Decimal::from(price),
        quantity_in_stock: stock,
        description: None,
        image_url: None,
    }
}

fn line(id: i64, product_id: i64, price: i64, quantity: u32) -> CartLine {
    CartLine {
        id: CartLineId(id),
        product_id: ProductId(product_id),
        product_name: format!("Product {product_id}"),
        price: Decimal::from(price),
        quantity,
    }
}

/// Two products and the two-line cart worth 250
fn backend() -> InMemoryStorefront {
    InMemoryStorefront::new()
        .with_products(vec![product(10, 100, 10), product(20, 50, 10)])
        .with_cart(vec![line(1, 10, 100, 2), line(2, 20, 50, 1)])
}

fn environment(api: &InMemoryStorefront) -> StorefrontEnvironment {
    StorefrontEnvironment::new(Arc::new(api.clone()), Arc::new(test_clock()))
}

fn cart_store(env: StorefrontEnvironment) -> CartStore {
    Store::new(CartState::new(), CartReducer::new(), env)
}

async fn load(store: &CartStore) -> CartAction {
    store
        .send_and_wait_for(CartAction::Load, CartAction::is_load_result, WAIT)
        .await
        .expect("cart load timed out")
}

async fn loaded(api: &InMemoryStorefront) -> CartStore {
    let store = cart_store(environment(api));
    load(&store).await;
    store
}

fn is_quantity_result(action: &CartAction) -> bool {
    matches!(
        action,
        CartAction::QuantityChanged { .. } | CartAction::QuantityChangeFailed { .. }
    )
}

fn is_remove_result(action: &CartAction) -> bool {
    matches!(action, CartAction::LineRemoved { .. } | CartAction::RemoveLineFailed { .. })
}

fn is_add_result(action: &CartAction) -> bool {
    matches!(action, CartAction::LineAdded { .. } | CartAction::AddLineFailed { .. })
}

async fn place_order(store: &CartStore) -> CartAction {
    store.send(CartAction::RequestCheckout).await.unwrap();
    store
        .send_and_wait_for(CartAction::ConfirmCheckout, CartAction::is_order_result, WAIT)
        .await
        .expect("order timed out")
}

#[tokio::test]
async fn total_follows_each_confirmed_change() {
    let api = backend();
    let store = loaded(&api).await;
    assert_eq!(store.state(CartState::total).await, Decimal::from(250));

    let result = store
        .send_and_wait_for(
            CartAction::ChangeQuantity {
                line_id: CartLineId(1),
                delta: 1,
            },
            is_quantity_result,
            WAIT,
        )
        .await
        .unwrap();
    assert!(matches!(result, CartAction::QuantityChanged { quantity: 3, .. }));
    assert_eq!(store.state(CartState::total).await, Decimal::from(300));

    store
        .send_and_wait_for(
            CartAction::RemoveLine {
                line_id: CartLineId(2),
            },
            is_remove_result,
            WAIT,
        )
        .await
        .unwrap();
    assert_eq!(store.state(CartState::total).await, Decimal::from(300));
    assert_eq!(store.state(CartState::len).await, 1);

    let result = place_order(&store).await;
    assert!(matches!(result, CartAction::OrderPlaced { .. }));
    assert_eq!(store.state(CartState::total).await, Decimal::ZERO);
    assert!(store.state(|s| s.checkout.is_placed()).await);

    let orders = api.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total_price, Decimal::from(300));
    assert_eq!(orders[0].items.len(), 1);
}

#[tokio::test]
async fn failed_add_leaves_cart_unchanged_with_one_error() {
    let api = backend();
    let store = loaded(&api).await;
    let before = store.state(CartState::snapshot).await;

    api.fail_next(Operation::AddCartLine, ApiError::Network("connection reset".into()));
    let result = store
        .send_and_wait_for(
            CartAction::AddLine {
                product: product(20, 50, 10),
                quantity: 1,
            },
            is_add_result,
            WAIT,
        )
        .await
        .unwrap();

    assert!(matches!(result, CartAction::AddLineFailed { .. }));
    store
        .state(|s| {
            assert_eq!(s.lines(), &before[..]);
            assert_eq!(s.adds_in_flight, 0);
            assert_eq!(s.notifications.len(), 1);
            let notification = s.notifications.latest().unwrap();
            assert_eq!(notification.level, Level::Error);
            assert_eq!(notification.category, Some(FailureCategory::Network));
        })
        .await;
}

#[tokio::test]
async fn add_merges_into_existing_line() {
    let api = backend();
    let store = loaded(&api).await;

    let result = store
        .send_and_wait_for(
            CartAction::AddLine {
                product: product(20, 50, 10),
                quantity: 2,
            },
            is_add_result,
            WAIT,
        )
        .await
        .unwrap();

    assert!(matches!(result, CartAction::LineAdded { .. }));
    store
        .state(|s| {
            assert_eq!(s.len(), 2);
            assert_eq!(s.line(CartLineId(2)).unwrap().quantity, 3);
            assert_eq!(s.total(), Decimal::from(350));
            assert_eq!(s.notifications.count(Level::Success), 1);
        })
        .await;
}

#[tokio::test]
async fn server_stock_refusal_is_an_inconsistency() {
    let api = InMemoryStorefront::new()
        .with_products(vec![product(10, 100, 3)])
        .with_cart(vec![line(1, 10, 100, 2)]);
    let store = loaded(&api).await;

    // The catalog snapshot still says 3 are available, the server knows 2 are taken
    let result = store
        .send_and_wait_for(
            CartAction::AddLine {
                product: product(10, 100, 3),
                quantity: 2,
            },
            is_add_result,
            WAIT,
        )
        .await
        .unwrap();

    let CartAction::AddLineFailed { error, .. } = result else {
        panic!("expected AddLineFailed, got {result:?}");
    };
    assert_eq!(error.category(), FailureCategory::Inconsistency);
    assert_eq!(store.state(|s| s.line(CartLineId(1)).map(|l| l.quantity)).await, Some(2));
}

#[tokio::test]
async fn removed_line_never_comes_back_on_reload() {
    let api = backend();
    let store = loaded(&api).await;

    store
        .send_and_wait_for(
            CartAction::RemoveLine {
                line_id: CartLineId(1),
            },
            is_remove_result,
            WAIT,
        )
        .await
        .unwrap();
    load(&store).await;

    assert!(store.state(|s| s.line(CartLineId(1)).is_none()).await);
    assert!(api.cart().iter().all(|l| l.id != CartLineId(1)));
}

#[tokio::test]
async fn placed_order_leaves_server_cart_empty() {
    let api = backend();
    let store = loaded(&api).await;

    let result = place_order(&store).await;
    assert!(matches!(result, CartAction::OrderPlaced { .. }));

    let result = load(&store).await;
    assert_eq!(
        result,
        CartAction::CartLoaded {
            session: store.state(|s| s.session).await,
            lines: Vec::new(),
        }
    );
    store
        .state(|s| {
            assert!(s.is_empty());
            assert_eq!(s.checkout, CheckoutState::Idle);
        })
        .await;
    // Stock is the server's business by default
    assert!(api.stock_updates().is_empty());
    assert_eq!(api.stock(ProductId(10)), Some(8));
}

#[tokio::test]
async fn checkout_cannot_start_on_empty_cart() {
    let api = InMemoryStorefront::new();
    let store = loaded(&api).await;

    store.send(CartAction::RequestCheckout).await.unwrap();
    store.send(CartAction::ConfirmCheckout).await.unwrap();

    assert!(store.state(|s| s.checkout.is_idle()).await);
    assert_eq!(api.calls(Operation::PlaceOrder), 0);
}

#[tokio::test]
async fn refused_order_keeps_cart_and_returns_to_idle() {
    let api = backend();
    let store = loaded(&api).await;

    api.fail_next(
        Operation::PlaceOrder,
        ApiError::Status {
            status: 500,
            message: "Internal Server Error".into(),
        },
    );
    let result = place_order(&store).await;

    assert!(matches!(result, CartAction::OrderFailed { .. }));
    store
        .state(|s| {
            assert_eq!(s.len(), 2);
            assert!(s.checkout.is_idle());
            assert_eq!(s.notifications.count(Level::Error), 1);
        })
        .await;
    assert_eq!(api.cart().len(), 2);
}

#[tokio::test]
async fn load_failure_shows_empty_cart() {
    let api = backend();
    api.fail_next(Operation::ReadCart, ApiError::Network("offline".into()));
    let store = cart_store(environment(&api));

    let result = load(&store).await;

    assert!(matches!(result, CartAction::CartLoadFailed { .. }));
    store
        .state(|s| {
            assert!(s.is_ready());
            assert!(s.is_empty());
            assert_eq!(s.notifications.count(Level::Error), 1);
        })
        .await;
}

#[tokio::test]
async fn detached_view_ignores_late_response() {
    let api = backend().with_latency(Duration::from_millis(50));
    let store = loaded(&api).await;

    store
        .send(CartAction::RemoveLine {
            line_id: CartLineId(2),
        })
        .await
        .unwrap();
    assert!(store.state(|s| s.is_pending(CartLineId(2))).await);

    store.send(CartAction::Detach).await.unwrap();
    let mut handle = store.send(CartAction::Load).await.unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The server removed the line, but the answer went to the old view
    assert!(api.cart().iter().all(|l| l.id != CartLineId(2)));
    store
        .state(|s| {
            assert!(!s.has_pending());
            assert!(s.notifications.is_empty());
        })
        .await;
}

#[tokio::test]
async fn late_answer_after_detach_does_not_touch_lines() {
    let api = backend().with_latency(Duration::from_millis(50));
    let store = loaded(&api).await;

    store
        .send(CartAction::ChangeQuantity {
            line_id: CartLineId(1),
            delta: 1,
        })
        .await
        .unwrap();
    store.send(CartAction::Detach).await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;

    // Server accepted the change but this view never applies it
    assert_eq!(api.cart()[0].quantity, 3);
    assert_eq!(store.state(|s| s.line(CartLineId(1)).map(|l| l.quantity)).await, Some(2));
}

#[tokio::test]
async fn invalid_order_is_answered_without_reaching_the_server() {
    let api = InMemoryStorefront::new()
        .with_products(vec![product(10, 100, 10)])
        .with_cart(vec![line(1, 10, 100, 0)]);
    let store = loaded(&api).await;

    store.send(CartAction::RequestCheckout).await.unwrap();
    let result = store
        .send_and_wait_for(CartAction::ConfirmCheckout, CartAction::is_order_result, WAIT)
        .await
        .unwrap();

    assert!(matches!(
        result,
        CartAction::OrderFailed {
            error: ApiError::Validation(_),
            ..
        }
    ));
    assert!(api.orders().is_empty());
    store
        .state(|s| {
            assert_eq!(s.checkout, CheckoutState::Idle);
            assert_eq!(s.notifications.count(Level::Error), 1);
        })
        .await;
}

#[tokio::test]
async fn reload_after_detach_waits_for_its_own_answer() {
    let api = backend().with_latency(Duration::from_millis(100));
    let store = cart_store(environment(&api));

    store.send(CartAction::Load).await.unwrap();
    store.send(CartAction::Detach).await.unwrap();
    tokio::time::sleep(Duration::from_millis(30)).await;

    let result = load(&store).await;

    let (current, phase, len) = store.state(|s| (s.session, s.phase, s.len())).await;
    assert_eq!(result.session(), Some(current));
    assert_eq!(phase, Phase::Ready);
    assert_eq!(len, 2);
}

#[tokio::test]
async fn detached_answers_are_not_broadcast() {
    let api = backend().with_latency(Duration::from_millis(50));
    let store = cart_store(environment(&api));
    let mut rx = store.subscribe_actions();

    let mut handle = store.send(CartAction::Load).await.unwrap();
    store.send(CartAction::Detach).await.unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    assert!(rx.try_recv().is_err());
    assert_eq!(store.state(|s| s.phase).await, Phase::Loading);
}

#[tokio::test]
async fn client_decrement_writes_stock_after_order() {
    let api = backend().with_server_stock_adjustment(false);
    let env = environment(&api).with_stock_policy(StockPolicy::ClientDecrement);
    let store = cart_store(env);
    load(&store).await;

    store.send(CartAction::RequestCheckout).await.unwrap();
    let result = store
        .send_and_wait_for(
            CartAction::ConfirmCheckout,
            |a| matches!(a, CartAction::StockSynced { .. } | CartAction::OrderFailed { .. }),
            WAIT,
        )
        .await
        .unwrap();

    let CartAction::StockSynced {
        mut updated,
        failed,
        ..
    } = result
    else {
        panic!("expected StockSynced, got {result:?}");
    };
    updated.sort();
    assert_eq!(updated, vec![ProductId(10), ProductId(20)]);
    assert!(failed.is_empty());
    assert_eq!(api.stock(ProductId(10)), Some(8));
    assert_eq!(api.stock(ProductId(20)), Some(9));
    assert!(store.state(|s| s.checkout.is_placed()).await);
}

#[tokio::test]
async fn client_decrement_failures_raise_a_warning() {
    let api = backend().with_server_stock_adjustment(false);
    let env = environment(&api).with_stock_policy(StockPolicy::ClientDecrement);
    let store = cart_store(env);
    load(&store).await;

    api.fail_next(Operation::ListProducts, ApiError::Network("offline".into()));
    store.send(CartAction::RequestCheckout).await.unwrap();
    let result = store
        .send_and_wait_for(
            CartAction::ConfirmCheckout,
            |a| matches!(a, CartAction::StockSynced { .. }),
            WAIT,
        )
        .await
        .unwrap();

    assert!(matches!(&result, CartAction::StockSynced { failed, .. } if failed.len() == 2));
    assert_eq!(store.state(|s| s.notifications.count(Level::Warning)).await, 1);
    assert!(api.stock_updates().is_empty());
}

#[tokio::test]
async fn subscribers_read_state_that_reflects_the_event() {
    let api = backend();
    let store = loaded(&api).await;
    let mut rx = store.subscribe_actions();

    store
        .send(CartAction::SetQuantity {
            line_id: CartLineId(2),
            quantity: 4,
        })
        .await
        .unwrap();

    let action = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert!(matches!(action, CartAction::QuantityChanged { quantity: 4, .. }));
    assert_eq!(store.state(CartState::total).await, Decimal::from(400));
}
