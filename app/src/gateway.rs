//! Gateway seam for all persistence and auth operations
//!
//! Every network operation the slices perform goes through the
//! [`TicketingGateway`] trait, injected via the environment. Production
//! uses [`RestGateway`] over the hosted gateway's REST dialect; tests use
//! an in-memory double.

use crate::types::{
    Event, EventId, EventPatch, NewEvent, NewOrder, NewOrderItem, NewPayment, NewUser, Order,
    OrderId, OrderItem, OrderStatus, Payment, Speaker, Ticket, TicketId, User, UserId, Venue,
    VenueId,
};
use boxoffice_gateway::{AuthUser, Filter, GatewayError, OrderBy, RestClient, Session};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by gateway operations
///
/// Keeps the trait dyn-compatible so the environment can hold
/// `Arc<dyn TicketingGateway>`.
pub type GatewayFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

/// All persistence and auth operations the application performs
///
/// Implementations must be cheap to clone behind an `Arc` and safe to call
/// concurrently; the store executes effects on separate tasks.
pub trait TicketingGateway: Send + Sync {
    // ---- Events ----

    /// Fetch all events, soonest first
    fn fetch_events(&self) -> GatewayFuture<'_, Vec<Event>>;

    /// Fetch a single event by id
    fn fetch_event(&self, id: EventId) -> GatewayFuture<'_, Event>;

    /// Create an event
    fn create_event(&self, event: NewEvent) -> GatewayFuture<'_, Event>;

    /// Apply a partial update to an event
    fn update_event(&self, id: EventId, patch: EventPatch) -> GatewayFuture<'_, Event>;

    /// Delete an event
    fn delete_event(&self, id: EventId) -> GatewayFuture<'_, ()>;

    // ---- Venues & speakers ----

    /// Fetch all venues, alphabetical
    fn fetch_venues(&self) -> GatewayFuture<'_, Vec<Venue>>;

    /// Fetch a single venue by id
    fn fetch_venue(&self, id: VenueId) -> GatewayFuture<'_, Venue>;

    /// Fetch the speakers appearing at an event
    fn fetch_speakers(&self, event: EventId) -> GatewayFuture<'_, Vec<Speaker>>;

    // ---- Tickets ----

    /// Fetch the still-available tickets for an event, cheapest first
    fn fetch_available_tickets(&self, event: EventId) -> GatewayFuture<'_, Vec<Ticket>>;

    /// Fetch tickets by id regardless of availability
    fn fetch_tickets(&self, ids: Vec<TicketId>) -> GatewayFuture<'_, Vec<Ticket>>;

    /// Flip a single ticket to unavailable, returning the updated row
    fn book_ticket(&self, id: TicketId) -> GatewayFuture<'_, Ticket>;

    /// Flip a batch of tickets to unavailable, returning the updated rows
    fn mark_tickets_unavailable(&self, ids: Vec<TicketId>) -> GatewayFuture<'_, Vec<Ticket>>;

    /// Flip a batch of tickets back to available (checkout compensation)
    fn release_tickets(&self, ids: Vec<TicketId>) -> GatewayFuture<'_, Vec<Ticket>>;

    // ---- Orders & payments ----

    /// Fetch a user's orders, newest first
    fn fetch_orders(&self, user: UserId) -> GatewayFuture<'_, Vec<Order>>;

    /// Fetch the order items belonging to an order
    fn fetch_order_items(&self, order: OrderId) -> GatewayFuture<'_, Vec<OrderItem>>;

    /// Insert an order row
    fn insert_order(&self, order: NewOrder) -> GatewayFuture<'_, Order>;

    /// Insert order item rows
    fn insert_order_items(
        &self,
        items: Vec<NewOrderItem>,
    ) -> GatewayFuture<'_, Vec<OrderItem>>;

    /// Insert a payment row
    fn insert_payment(&self, payment: NewPayment) -> GatewayFuture<'_, Payment>;

    /// Update an order's status, returning the updated row
    fn set_order_status(&self, order: OrderId, status: OrderStatus)
    -> GatewayFuture<'_, Order>;

    // ---- Auth ----

    /// Register a credential pair, opening a session
    fn sign_up(&self, email: String, password: String) -> GatewayFuture<'_, Session>;

    /// Open a session with an existing credential pair
    fn sign_in(&self, email: String, password: String) -> GatewayFuture<'_, Session>;

    /// Close the current session
    fn sign_out(&self) -> GatewayFuture<'_, ()>;

    /// Resolve the user behind the current session, if any
    ///
    /// An absent or expired session resolves to `Ok(None)`, not an error.
    fn current_user(&self) -> GatewayFuture<'_, Option<AuthUser>>;

    /// Fetch the profile row for a user
    fn fetch_profile(&self, id: UserId) -> GatewayFuture<'_, User>;

    /// Insert a profile row for a freshly registered user
    fn insert_profile(&self, user: NewUser) -> GatewayFuture<'_, User>;
}

/// Production gateway backed by the hosted REST client
#[derive(Clone)]
pub struct RestGateway {
    rest: RestClient,
}

impl RestGateway {
    /// Wrap a configured REST client
    #[must_use]
    pub const fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

impl TicketingGateway for RestGateway {
    fn fetch_events(&self) -> GatewayFuture<'_, Vec<Event>> {
        Box::pin(async move { self.rest.select("events", &[], Some(&OrderBy::asc("date"))).await })
    }

    fn fetch_event(&self, id: EventId) -> GatewayFuture<'_, Event> {
        Box::pin(async move {
            self.rest
                .select_one("events", &[Filter::eq("event_id", id.0)])
                .await
        })
    }

    fn create_event(&self, event: NewEvent) -> GatewayFuture<'_, Event> {
        Box::pin(async move { self.rest.insert_one("events", &event).await })
    }

    fn update_event(&self, id: EventId, patch: EventPatch) -> GatewayFuture<'_, Event> {
        Box::pin(async move {
            let patch = serde_json::to_value(&patch)
                .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;
            self.rest
                .update_one("events", &patch, &[Filter::eq("event_id", id.0)])
                .await
        })
    }

    fn delete_event(&self, id: EventId) -> GatewayFuture<'_, ()> {
        Box::pin(async move {
            self.rest
                .delete("events", &[Filter::eq("event_id", id.0)])
                .await
        })
    }

    fn fetch_venues(&self) -> GatewayFuture<'_, Vec<Venue>> {
        Box::pin(async move { self.rest.select("venues", &[], Some(&OrderBy::asc("name"))).await })
    }

    fn fetch_venue(&self, id: VenueId) -> GatewayFuture<'_, Venue> {
        Box::pin(async move {
            self.rest
                .select_one("venues", &[Filter::eq("venue_id", id.0)])
                .await
        })
    }

    fn fetch_speakers(&self, event: EventId) -> GatewayFuture<'_, Vec<Speaker>> {
        Box::pin(async move {
            self.rest
                .select("speakers", &[Filter::eq("event_id", event.0)], None)
                .await
        })
    }

    fn fetch_available_tickets(&self, event: EventId) -> GatewayFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            self.rest
                .select(
                    "tickets",
                    &[
                        Filter::eq("event_id", event.0),
                        Filter::eq("is_available", true),
                    ],
                    Some(&OrderBy::asc("price")),
                )
                .await
        })
    }

    fn fetch_tickets(&self, ids: Vec<TicketId>) -> GatewayFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            self.rest
                .select(
                    "tickets",
                    &[Filter::is_in("ticket_id", ids.iter().map(|id| id.0))],
                    None,
                )
                .await
        })
    }

    fn book_ticket(&self, id: TicketId) -> GatewayFuture<'_, Ticket> {
        Box::pin(async move {
            self.rest
                .update_one(
                    "tickets",
                    &serde_json::json!({ "is_available": false }),
                    &[Filter::eq("ticket_id", id.0)],
                )
                .await
        })
    }

    fn mark_tickets_unavailable(&self, ids: Vec<TicketId>) -> GatewayFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            self.rest
                .update(
                    "tickets",
                    &serde_json::json!({ "is_available": false }),
                    &[Filter::is_in("ticket_id", ids.iter().map(|id| id.0))],
                )
                .await
        })
    }

    fn release_tickets(&self, ids: Vec<TicketId>) -> GatewayFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            self.rest
                .update(
                    "tickets",
                    &serde_json::json!({ "is_available": true }),
                    &[Filter::is_in("ticket_id", ids.iter().map(|id| id.0))],
                )
                .await
        })
    }

    fn fetch_orders(&self, user: UserId) -> GatewayFuture<'_, Vec<Order>> {
        Box::pin(async move {
            self.rest
                .select(
                    "orders",
                    &[Filter::eq("user_id", user.0)],
                    Some(&OrderBy::desc("date")),
                )
                .await
        })
    }

    fn fetch_order_items(&self, order: OrderId) -> GatewayFuture<'_, Vec<OrderItem>> {
        Box::pin(async move {
            self.rest
                .select("order_items", &[Filter::eq("order_id", order.0)], None)
                .await
        })
    }

    fn insert_order(&self, order: NewOrder) -> GatewayFuture<'_, Order> {
        Box::pin(async move { self.rest.insert_one("orders", &order).await })
    }

    fn insert_order_items(
        &self,
        items: Vec<NewOrderItem>,
    ) -> GatewayFuture<'_, Vec<OrderItem>> {
        Box::pin(async move { self.rest.insert("order_items", &items).await })
    }

    fn insert_payment(&self, payment: NewPayment) -> GatewayFuture<'_, Payment> {
        Box::pin(async move { self.rest.insert_one("payments", &payment).await })
    }

    fn set_order_status(
        &self,
        order: OrderId,
        status: OrderStatus,
    ) -> GatewayFuture<'_, Order> {
        Box::pin(async move {
            self.rest
                .update_one(
                    "orders",
                    &serde_json::json!({ "status": status }),
                    &[Filter::eq("order_id", order.0)],
                )
                .await
        })
    }

    fn sign_up(&self, email: String, password: String) -> GatewayFuture<'_, Session> {
        Box::pin(async move { self.rest.sign_up(&email, &password).await })
    }

    fn sign_in(&self, email: String, password: String) -> GatewayFuture<'_, Session> {
        Box::pin(async move { self.rest.sign_in(&email, &password).await })
    }

    fn sign_out(&self) -> GatewayFuture<'_, ()> {
        Box::pin(async move { self.rest.sign_out().await })
    }

    fn current_user(&self) -> GatewayFuture<'_, Option<AuthUser>> {
        Box::pin(async move { self.rest.current_user().await })
    }

    fn fetch_profile(&self, id: UserId) -> GatewayFuture<'_, User> {
        Box::pin(async move {
            self.rest
                .select_one("users", &[Filter::eq("id", id.0)])
                .await
        })
    }

    fn insert_profile(&self, user: NewUser) -> GatewayFuture<'_, User> {
        Box::pin(async move { self.rest.insert_one("users", &user).await })
    }
}
