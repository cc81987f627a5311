//! End-to-end checkout scenarios over the store and an in-memory gateway.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

mod common;

use boxoffice::app::AppAction;
use boxoffice::environment::CheckoutPolicy;
use boxoffice::slices::{OrdersAction, TicketsAction};
use boxoffice::types::{OrderStatus, PaymentStatus, TicketId};
use common::{sample_user, store, store_with_policy, ticket, upcoming_event};
use std::time::Duration;

const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(2);

fn checkout_finished(action: &AppAction) -> bool {
    matches!(
        action,
        AppAction::Orders(
            OrdersAction::CheckoutCompleted(_) | OrdersAction::CheckoutFailed(_)
        )
    )
}

#[tokio::test]
async fn successful_checkout_completes_order_and_records_payment() {
    let (store, gateway) = store();
    let user = sample_user();
    gateway.seed_events(vec![upcoming_event(1)]);
    gateway.seed_tickets(vec![ticket(1, 1, 50.0), ticket(2, 1, 75.0)]);

    // Load availability and pick both tickets
    let mut handle = store
        .send(AppAction::Tickets(TicketsAction::FetchForEvent(
            boxoffice::types::EventId(1),
        )))
        .await
        .unwrap();
    handle.wait().await;

    let available = store.state(|s| s.tickets.tickets.clone()).await;
    assert_eq!(available.len(), 2);
    for t in available.clone() {
        store
            .send(AppAction::Tickets(TicketsAction::Select(t)))
            .await
            .unwrap();
    }

    let outcome = store
        .send_and_wait_for(
            AppAction::Orders(OrdersAction::Checkout {
                user: Some(user.id),
                tickets: available,
                payment_method: "credit_card".to_string(),
            }),
            checkout_finished,
            CHECKOUT_TIMEOUT,
        )
        .await
        .unwrap();

    let AppAction::Orders(OrdersAction::CheckoutCompleted(order)) = outcome else {
        panic!("expected completed checkout, got {outcome:?}");
    };
    assert_eq!(order.order.status, OrderStatus::Completed);
    assert!((order.order.total_price - 125.0).abs() < f64::EPSILON);
    assert_eq!(order.items.len(), 2);

    // Gateway rows
    let orders = gateway.stored_orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Completed);

    let payments = gateway.stored_payments();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].transaction_id, "txn_test_1");
    assert_eq!(payments[0].payment_method, "credit_card");
    assert_eq!(payments[0].status, PaymentStatus::Completed);
    assert!((payments[0].amount - 125.0).abs() < f64::EPSILON);

    assert_eq!(gateway.stored_order_items().len(), 2);
    assert!(gateway.stored_tickets().iter().all(|t| !t.is_available));

    // State: selection cleared, availability emptied, order held
    let (selected, available, held_orders, current) = store
        .state(|s| {
            (
                s.tickets.selected.len(),
                s.tickets.tickets.len(),
                s.orders.orders.len(),
                s.orders.current_order.is_some(),
            )
        })
        .await;
    assert_eq!(selected, 0);
    assert_eq!(available, 0);
    assert_eq!(held_orders, 1);
    assert!(current);
}

#[tokio::test]
async fn unauthenticated_checkout_fails_without_gateway_calls() {
    let (store, gateway) = store();

    let mut handle = store
        .send(AppAction::Orders(OrdersAction::Checkout {
            user: None,
            tickets: vec![ticket(1, 1, 50.0)],
            payment_method: "credit_card".to_string(),
        }))
        .await
        .unwrap();
    handle.wait().await;

    assert_eq!(gateway.calls(), 0);
    let (loading, error) = store
        .state(|s| (s.orders.loading, s.orders.error.clone()))
        .await;
    assert!(!loading);
    assert_eq!(error.as_deref(), Some("You must be signed in to check out"));
}

#[tokio::test]
async fn empty_selection_fails_without_gateway_calls() {
    let (store, gateway) = store();

    let mut handle = store
        .send(AppAction::Orders(OrdersAction::Checkout {
            user: Some(sample_user().id),
            tickets: vec![],
            payment_method: "credit_card".to_string(),
        }))
        .await
        .unwrap();
    handle.wait().await;

    assert_eq!(gateway.calls(), 0);
    let error = store.state(|s| s.orders.error.clone()).await;
    assert_eq!(error.as_deref(), Some("No tickets selected"));
}

#[tokio::test]
async fn faithful_policy_leaves_partial_rows_in_place() {
    let (store, gateway) = store_with_policy(CheckoutPolicy::Faithful);
    gateway.seed_tickets(vec![ticket(1, 1, 50.0)]);
    gateway.fail_on("insert_order_items");

    let outcome = store
        .send_and_wait_for(
            AppAction::Orders(OrdersAction::Checkout {
                user: Some(sample_user().id),
                tickets: vec![ticket(1, 1, 50.0)],
                payment_method: "credit_card".to_string(),
            }),
            checkout_finished,
            CHECKOUT_TIMEOUT,
        )
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        AppAction::Orders(OrdersAction::CheckoutFailed(_))
    ));

    // The pending order row stays behind untouched
    let orders = gateway.stored_orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Pending);
    assert!(gateway.stored_order_items().is_empty());
    assert!(gateway.stored_payments().is_empty());
    assert!(gateway.stored_tickets()[0].is_available);

    let error = store.state(|s| s.orders.error.clone()).await;
    assert!(error.unwrap().contains("injected failure"));
}

#[tokio::test]
async fn compensating_policy_cancels_the_orphaned_order() {
    let (store, gateway) = store_with_policy(CheckoutPolicy::Compensating);
    gateway.seed_tickets(vec![ticket(1, 1, 50.0)]);
    gateway.fail_on("insert_order_items");

    let outcome = store
        .send_and_wait_for(
            AppAction::Orders(OrdersAction::Checkout {
                user: Some(sample_user().id),
                tickets: vec![ticket(1, 1, 50.0)],
                payment_method: "credit_card".to_string(),
            }),
            checkout_finished,
            CHECKOUT_TIMEOUT,
        )
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        AppAction::Orders(OrdersAction::CheckoutFailed(_))
    ));

    let orders = gateway.stored_orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Cancelled);
    // Tickets were never flipped, so none need releasing
    assert!(gateway.stored_tickets()[0].is_available);
}

#[tokio::test]
async fn compensating_policy_releases_flipped_tickets() {
    let (store, gateway) = store_with_policy(CheckoutPolicy::Compensating);
    gateway.seed_tickets(vec![ticket(1, 1, 50.0), ticket(2, 1, 75.0)]);
    gateway.fail_on("insert_payment");

    let outcome = store
        .send_and_wait_for(
            AppAction::Orders(OrdersAction::Checkout {
                user: Some(sample_user().id),
                tickets: vec![ticket(1, 1, 50.0), ticket(2, 1, 75.0)],
                payment_method: "credit_card".to_string(),
            }),
            checkout_finished,
            CHECKOUT_TIMEOUT,
        )
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        AppAction::Orders(OrdersAction::CheckoutFailed(_))
    ));

    let orders = gateway.stored_orders();
    assert_eq!(orders[0].status, OrderStatus::Cancelled);
    // Flipped tickets come back
    assert!(gateway.stored_tickets().iter().all(|t| t.is_available));
    assert!(gateway.stored_payments().is_empty());
}

#[tokio::test]
async fn order_history_resolves_tickets_per_order() {
    let (store, gateway) = store();
    let user = sample_user();
    gateway.seed_tickets(vec![ticket(1, 1, 50.0), ticket(2, 1, 75.0)]);

    // Place an order first
    store
        .send_and_wait_for(
            AppAction::Orders(OrdersAction::Checkout {
                user: Some(user.id),
                tickets: vec![ticket(1, 1, 50.0), ticket(2, 1, 75.0)],
                payment_method: "paypal".to_string(),
            }),
            checkout_finished,
            CHECKOUT_TIMEOUT,
        )
        .await
        .unwrap();

    // A fresh fetch rebuilds the same orders from gateway rows
    let mut handle = store
        .send(AppAction::Orders(OrdersAction::FetchUserOrders(user.id)))
        .await
        .unwrap();
    handle.wait().await;

    let orders = store.state(|s| s.orders.orders.clone()).await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].items.len(), 2);
    assert_eq!(
        orders[0]
            .items
            .iter()
            .map(|t| t.ticket_id)
            .collect::<Vec<_>>(),
        vec![TicketId(1), TicketId(2)]
    );
}
