//! Orders slice: order history and the checkout workflow
//!
//! Checkout is one effect performing the gateway steps in sequence:
//! insert a pending order, insert its order items, flip the purchased
//! tickets to unavailable, record the payment, then mark the order
//! completed. The effect resolves to exactly one of
//! [`OrdersAction::CheckoutCompleted`] or [`OrdersAction::CheckoutFailed`].
//!
//! When a step fails after the order row exists, the configured
//! [`CheckoutPolicy`] decides whether partial rows are left in place or
//! cleaned up best-effort.

use crate::environment::{AppEnvironment, CheckoutPolicy};
use crate::gateway::TicketingGateway;
use crate::types::{
    NewOrder, NewOrderItem, NewPayment, OrderId, OrderStatus, OrderWithItems, PaymentStatus,
    Ticket, TicketId, UserId,
};
use boxoffice_core::effect::Effect;
use boxoffice_core::environment::{Clock, TransactionIds};
use boxoffice_core::reducer::Reducer;
use boxoffice_core::{Effects, smallvec};
use boxoffice_gateway::GatewayError;
use std::sync::Arc;

/// Orders slice state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrdersState {
    /// The user's orders with their purchased tickets, newest first
    pub orders: Vec<OrderWithItems>,
    /// The order produced by the most recent checkout
    pub current_order: Option<OrderWithItems>,
    /// An orders operation is in flight
    pub loading: bool,
    /// Last failure, user-facing
    pub error: Option<String>,
}

/// Orders slice actions
#[derive(Debug, Clone)]
pub enum OrdersAction {
    /// Fetch a user's order history
    FetchUserOrders(UserId),
    /// Purchase the given tickets
    Checkout {
        /// Purchasing user; `None` fails validation
        user: Option<UserId>,
        /// Tickets to purchase; empty fails validation
        tickets: Vec<Ticket>,
        /// Payment method label recorded on the payment row
        payment_method: String,
    },

    /// History fetch finished
    OrdersLoaded(Vec<OrderWithItems>),
    /// Checkout finished; the order is completed and paid
    CheckoutCompleted(OrderWithItems),
    /// Checkout failed
    CheckoutFailed(String),
    /// History fetch failed
    FetchFailed(String),

    /// Dismiss the stored error
    ClearError,
    /// Drop the most recent checkout's order
    ClearCurrentOrder,
}

/// Reducer for the orders slice
#[derive(Debug, Clone, Copy, Default)]
pub struct OrdersReducer;

impl Reducer for OrdersReducer {
    type State = OrdersState;
    type Action = OrdersAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut OrdersState,
        action: OrdersAction,
        env: &AppEnvironment,
    ) -> Effects<OrdersAction> {
        match action {
            OrdersAction::FetchUserOrders(user) => {
                state.loading = true;
                state.error = None;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match load_order_history(gateway.as_ref(), user).await {
                        Ok(orders) => OrdersAction::OrdersLoaded(orders),
                        Err(e) => OrdersAction::FetchFailed(e.to_string()),
                    })
                }))]
            },

            OrdersAction::Checkout {
                user,
                tickets,
                payment_method,
            } => {
                let Some(user) = user else {
                    state.error = Some("You must be signed in to check out".to_string());
                    return smallvec![];
                };
                if tickets.is_empty() {
                    state.error = Some("No tickets selected".to_string());
                    return smallvec![];
                }

                state.loading = true;
                state.error = None;

                let gateway = env.gateway.clone();
                let clock = env.clock.clone();
                let transaction_ids = env.transaction_ids.clone();
                let policy = env.checkout_policy;
                smallvec![Effect::Future(Box::pin(async move {
                    Some(
                        run_checkout(
                            gateway,
                            clock,
                            transaction_ids,
                            policy,
                            user,
                            tickets,
                            payment_method,
                        )
                        .await,
                    )
                }))]
            },

            OrdersAction::OrdersLoaded(orders) => {
                state.loading = false;
                state.orders = orders;
                smallvec![]
            },

            OrdersAction::CheckoutCompleted(order) => {
                state.loading = false;
                state.current_order = Some(order.clone());
                state.orders.insert(0, order);
                smallvec![]
            },

            OrdersAction::CheckoutFailed(message) => {
                tracing::warn!(error = %message, "Checkout failed");
                state.loading = false;
                state.error = Some(message);
                smallvec![]
            },

            OrdersAction::FetchFailed(message) => {
                tracing::warn!(error = %message, "Order history fetch failed");
                state.loading = false;
                state.error = Some(message);
                smallvec![]
            },

            OrdersAction::ClearError => {
                state.error = None;
                smallvec![]
            },

            OrdersAction::ClearCurrentOrder => {
                state.current_order = None;
                smallvec![]
            },
        }
    }
}

/// Resolve each order row into its purchased tickets
async fn load_order_history(
    gateway: &dyn TicketingGateway,
    user: UserId,
) -> Result<Vec<OrderWithItems>, GatewayError> {
    let orders = gateway.fetch_orders(user).await?;

    let mut with_items = Vec::with_capacity(orders.len());
    for order in orders {
        let items = gateway.fetch_order_items(order.order_id).await?;
        let ticket_ids: Vec<TicketId> = items.iter().map(|i| i.ticket_id).collect();
        let tickets = if ticket_ids.is_empty() {
            Vec::new()
        } else {
            gateway.fetch_tickets(ticket_ids).await?
        };
        with_items.push(OrderWithItems {
            order,
            items: tickets,
        });
    }

    Ok(with_items)
}

/// Run the checkout steps, applying the failure policy on the way out
async fn run_checkout(
    gateway: Arc<dyn TicketingGateway>,
    clock: Arc<dyn Clock>,
    transaction_ids: Arc<dyn TransactionIds>,
    policy: CheckoutPolicy,
    user: UserId,
    tickets: Vec<Ticket>,
    payment_method: String,
) -> OrdersAction {
    let total_price: f64 = tickets.iter().map(|t| t.price).sum();
    let now = clock.now();

    // The order row is the checkout's anchor. If even this fails there is
    // nothing to compensate.
    let order = match gateway
        .insert_order(NewOrder {
            user_id: user,
            total_price,
            date: now,
            status: OrderStatus::Pending,
        })
        .await
    {
        Ok(order) => order,
        Err(e) => return OrdersAction::CheckoutFailed(e.to_string()),
    };

    let ticket_ids: Vec<TicketId> = tickets.iter().map(|t| t.ticket_id).collect();
    let mut tickets_flipped = false;

    let result = async {
        let items: Vec<NewOrderItem> = tickets
            .iter()
            .map(|t| NewOrderItem {
                order_id: order.order_id,
                ticket_id: t.ticket_id,
            })
            .collect();
        gateway.insert_order_items(items).await?;

        gateway.mark_tickets_unavailable(ticket_ids.clone()).await?;
        tickets_flipped = true;

        gateway
            .insert_payment(NewPayment {
                order_id: order.order_id,
                payment_method: payment_method.clone(),
                transaction_id: transaction_ids.transaction_id(),
                amount: total_price,
                status: PaymentStatus::Completed,
                date: now,
            })
            .await?;

        let completed = gateway
            .set_order_status(order.order_id, OrderStatus::Completed)
            .await?;

        Ok::<_, GatewayError>(OrderWithItems {
            order: completed,
            items: tickets.clone(),
        })
    }
    .await;

    match result {
        Ok(completed) => OrdersAction::CheckoutCompleted(completed),
        Err(e) => {
            if policy == CheckoutPolicy::Compensating {
                let flipped = tickets_flipped.then_some(ticket_ids);
                compensate(gateway.as_ref(), order.order_id, flipped).await;
            }
            OrdersAction::CheckoutFailed(e.to_string())
        },
    }
}

/// Best-effort cleanup after a failed checkout step
///
/// Compensation failures are logged, not surfaced; the original failure
/// is what the user sees.
async fn compensate(
    gateway: &dyn TicketingGateway,
    order_id: OrderId,
    flipped_tickets: Option<Vec<TicketId>>,
) {
    if let Err(e) = gateway.set_order_status(order_id, OrderStatus::Cancelled).await {
        tracing::warn!(error = %e, %order_id, "Failed to cancel order during compensation");
    }

    if let Some(ticket_ids) = flipped_tickets {
        if let Err(e) = gateway.release_tickets(ticket_ids).await {
            tracing::warn!(error = %e, %order_id, "Failed to release tickets during compensation");
        }
    }
}
