//! In-memory gateway double for tests and demos
//!
//! Behaves like the hosted gateway over plain vectors: rows get
//! sequential ids, fetches honor the same ordering the REST dialect
//! would, and auth keeps a single session. Failures can be injected per
//! operation to exercise partial checkout outcomes.

use crate::environment::AppEnvironment;
use crate::gateway::{GatewayFuture, TicketingGateway};
use crate::types::{
    Event, EventId, EventPatch, NewEvent, NewOrder, NewOrderItem, NewPayment, NewUser, Order,
    OrderId, OrderItem, OrderItemId, OrderStatus, Payment, PaymentId, Speaker, Ticket, TicketId,
    User, UserId, Venue, VenueId,
};
use boxoffice_gateway::{AuthUser, GatewayError, Session};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    credentials: HashMap<String, (String, UserId)>,
    session: Option<UserId>,
    events: Vec<Event>,
    venues: Vec<Venue>,
    speakers: Vec<Speaker>,
    tickets: Vec<Ticket>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    payments: Vec<Payment>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory implementation of [`TicketingGateway`]
#[derive(Default)]
pub struct InMemoryGateway {
    inner: Mutex<Inner>,
    calls: AtomicUsize,
    failing_ops: Mutex<HashSet<String>>,
}

impl InMemoryGateway {
    /// Create an empty gateway
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the named operation fail until cleared
    pub fn fail_on(&self, op: &str) {
        self.failing_ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(op.to_string());
    }

    /// Stop failing the named operation
    pub fn clear_failure(&self, op: &str) {
        self.failing_ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(op);
    }

    /// Number of gateway operations performed so far
    ///
    /// Seeding and inspection helpers do not count.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Count the call and apply any injected failure
    fn track(&self, op: &str) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self
            .failing_ops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(op)
        {
            return Err(GatewayError::ApiError {
                status: 500,
                message: format!("injected failure: {op}"),
            });
        }
        Ok(())
    }

    // ---- Seeding ----

    /// Seed event rows
    pub fn seed_events(&self, events: Vec<Event>) {
        self.lock().events.extend(events);
    }

    /// Seed venue rows
    pub fn seed_venues(&self, venues: Vec<Venue>) {
        self.lock().venues.extend(venues);
    }

    /// Seed speaker rows
    pub fn seed_speakers(&self, speakers: Vec<Speaker>) {
        self.lock().speakers.extend(speakers);
    }

    /// Seed ticket rows
    pub fn seed_tickets(&self, tickets: Vec<Ticket>) {
        self.lock().tickets.extend(tickets);
    }

    /// Seed a registered user with credentials
    pub fn seed_user(&self, user: User, password: &str) {
        let mut inner = self.lock();
        inner
            .credentials
            .insert(user.email.clone(), (password.to_string(), user.id));
        inner.users.push(user);
    }

    /// Open a session directly, bypassing sign-in
    pub fn open_session(&self, user: UserId) {
        self.lock().session = Some(user);
    }

    // ---- Inspection ----

    /// Snapshot of all order rows
    pub fn stored_orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }

    /// Snapshot of all order item rows
    pub fn stored_order_items(&self) -> Vec<OrderItem> {
        self.lock().order_items.clone()
    }

    /// Snapshot of all payment rows
    pub fn stored_payments(&self) -> Vec<Payment> {
        self.lock().payments.clone()
    }

    /// Snapshot of all ticket rows
    pub fn stored_tickets(&self) -> Vec<Ticket> {
        self.lock().tickets.clone()
    }
}

impl TicketingGateway for InMemoryGateway {
    fn fetch_events(&self) -> GatewayFuture<'_, Vec<Event>> {
        Box::pin(async move {
            self.track("fetch_events")?;
            let mut events = self.lock().events.clone();
            events.sort_by_key(|e| e.date);
            Ok(events)
        })
    }

    fn fetch_event(&self, id: EventId) -> GatewayFuture<'_, Event> {
        Box::pin(async move {
            self.track("fetch_event")?;
            self.lock()
                .events
                .iter()
                .find(|e| e.event_id == id)
                .cloned()
                .ok_or(GatewayError::NotFound)
        })
    }

    fn create_event(&self, event: NewEvent) -> GatewayFuture<'_, Event> {
        Box::pin(async move {
            self.track("create_event")?;
            let mut inner = self.lock();
            let created = Event {
                event_id: EventId(inner.next_id()),
                name: event.name,
                description: event.description,
                location: event.location,
                date: event.date,
                time: event.time,
                venue_id: event.venue_id,
                image_url: event.image_url,
            };
            inner.events.push(created.clone());
            Ok(created)
        })
    }

    fn update_event(&self, id: EventId, patch: EventPatch) -> GatewayFuture<'_, Event> {
        Box::pin(async move {
            self.track("update_event")?;
            let mut inner = self.lock();
            let event = inner
                .events
                .iter_mut()
                .find(|e| e.event_id == id)
                .ok_or(GatewayError::NotFound)?;
            if let Some(name) = patch.name {
                event.name = name;
            }
            if let Some(description) = patch.description {
                event.description = description;
            }
            if let Some(location) = patch.location {
                event.location = location;
            }
            if let Some(date) = patch.date {
                event.date = date;
            }
            if let Some(time) = patch.time {
                event.time = time;
            }
            if let Some(venue_id) = patch.venue_id {
                event.venue_id = venue_id;
            }
            if let Some(image_url) = patch.image_url {
                event.image_url = Some(image_url);
            }
            Ok(event.clone())
        })
    }

    fn delete_event(&self, id: EventId) -> GatewayFuture<'_, ()> {
        Box::pin(async move {
            self.track("delete_event")?;
            self.lock().events.retain(|e| e.event_id != id);
            Ok(())
        })
    }

    fn fetch_venues(&self) -> GatewayFuture<'_, Vec<Venue>> {
        Box::pin(async move {
            self.track("fetch_venues")?;
            let mut venues = self.lock().venues.clone();
            venues.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(venues)
        })
    }

    fn fetch_venue(&self, id: VenueId) -> GatewayFuture<'_, Venue> {
        Box::pin(async move {
            self.track("fetch_venue")?;
            self.lock()
                .venues
                .iter()
                .find(|v| v.venue_id == id)
                .cloned()
                .ok_or(GatewayError::NotFound)
        })
    }

    fn fetch_speakers(&self, event: EventId) -> GatewayFuture<'_, Vec<Speaker>> {
        Box::pin(async move {
            self.track("fetch_speakers")?;
            Ok(self
                .lock()
                .speakers
                .iter()
                .filter(|s| s.event_id == event)
                .cloned()
                .collect())
        })
    }

    fn fetch_available_tickets(&self, event: EventId) -> GatewayFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            self.track("fetch_available_tickets")?;
            let mut tickets: Vec<Ticket> = self
                .lock()
                .tickets
                .iter()
                .filter(|t| t.event_id == event && t.is_available)
                .cloned()
                .collect();
            tickets.sort_by(|a, b| a.price.total_cmp(&b.price));
            Ok(tickets)
        })
    }

    fn fetch_tickets(&self, ids: Vec<TicketId>) -> GatewayFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            self.track("fetch_tickets")?;
            let wanted: HashSet<TicketId> = ids.into_iter().collect();
            Ok(self
                .lock()
                .tickets
                .iter()
                .filter(|t| wanted.contains(&t.ticket_id))
                .cloned()
                .collect())
        })
    }

    fn book_ticket(&self, id: TicketId) -> GatewayFuture<'_, Ticket> {
        Box::pin(async move {
            self.track("book_ticket")?;
            let mut inner = self.lock();
            let ticket = inner
                .tickets
                .iter_mut()
                .find(|t| t.ticket_id == id)
                .ok_or(GatewayError::NotFound)?;
            ticket.is_available = false;
            Ok(ticket.clone())
        })
    }

    fn mark_tickets_unavailable(&self, ids: Vec<TicketId>) -> GatewayFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            self.track("mark_tickets_unavailable")?;
            let wanted: HashSet<TicketId> = ids.into_iter().collect();
            let mut inner = self.lock();
            let mut updated = Vec::new();
            for ticket in inner
                .tickets
                .iter_mut()
                .filter(|t| wanted.contains(&t.ticket_id))
            {
                ticket.is_available = false;
                updated.push(ticket.clone());
            }
            Ok(updated)
        })
    }

    fn release_tickets(&self, ids: Vec<TicketId>) -> GatewayFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            self.track("release_tickets")?;
            let wanted: HashSet<TicketId> = ids.into_iter().collect();
            let mut inner = self.lock();
            let mut updated = Vec::new();
            for ticket in inner
                .tickets
                .iter_mut()
                .filter(|t| wanted.contains(&t.ticket_id))
            {
                ticket.is_available = true;
                updated.push(ticket.clone());
            }
            Ok(updated)
        })
    }

    fn fetch_orders(&self, user: UserId) -> GatewayFuture<'_, Vec<Order>> {
        Box::pin(async move {
            self.track("fetch_orders")?;
            let mut orders: Vec<Order> = self
                .lock()
                .orders
                .iter()
                .filter(|o| o.user_id == user)
                .cloned()
                .collect();
            orders.sort_by_key(|o| std::cmp::Reverse(o.date));
            Ok(orders)
        })
    }

    fn fetch_order_items(&self, order: OrderId) -> GatewayFuture<'_, Vec<OrderItem>> {
        Box::pin(async move {
            self.track("fetch_order_items")?;
            Ok(self
                .lock()
                .order_items
                .iter()
                .filter(|i| i.order_id == order)
                .cloned()
                .collect())
        })
    }

    fn insert_order(&self, order: NewOrder) -> GatewayFuture<'_, Order> {
        Box::pin(async move {
            self.track("insert_order")?;
            let mut inner = self.lock();
            let created = Order {
                order_id: OrderId(inner.next_id()),
                user_id: order.user_id,
                total_price: order.total_price,
                date: order.date,
                status: order.status,
            };
            inner.orders.push(created.clone());
            Ok(created)
        })
    }

    fn insert_order_items(
        &self,
        items: Vec<NewOrderItem>,
    ) -> GatewayFuture<'_, Vec<OrderItem>> {
        Box::pin(async move {
            self.track("insert_order_items")?;
            let mut inner = self.lock();
            let mut created = Vec::with_capacity(items.len());
            for item in items {
                let row = OrderItem {
                    order_item_id: OrderItemId(inner.next_id()),
                    order_id: item.order_id,
                    ticket_id: item.ticket_id,
                };
                inner.order_items.push(row.clone());
                created.push(row);
            }
            Ok(created)
        })
    }

    fn insert_payment(&self, payment: NewPayment) -> GatewayFuture<'_, Payment> {
        Box::pin(async move {
            self.track("insert_payment")?;
            let mut inner = self.lock();
            let created = Payment {
                payment_id: PaymentId(inner.next_id()),
                order_id: payment.order_id,
                payment_method: payment.payment_method,
                transaction_id: payment.transaction_id,
                amount: payment.amount,
                status: payment.status,
                date: payment.date,
            };
            inner.payments.push(created.clone());
            Ok(created)
        })
    }

    fn set_order_status(
        &self,
        order: OrderId,
        status: OrderStatus,
    ) -> GatewayFuture<'_, Order> {
        Box::pin(async move {
            self.track("set_order_status")?;
            let mut inner = self.lock();
            let row = inner
                .orders
                .iter_mut()
                .find(|o| o.order_id == order)
                .ok_or(GatewayError::NotFound)?;
            row.status = status;
            Ok(row.clone())
        })
    }

    fn sign_up(&self, email: String, password: String) -> GatewayFuture<'_, Session> {
        Box::pin(async move {
            self.track("sign_up")?;
            let mut inner = self.lock();
            if inner.credentials.contains_key(&email) {
                return Err(GatewayError::ApiError {
                    status: 422,
                    message: "email already registered".to_string(),
                });
            }
            let id = UserId(Uuid::new_v4());
            inner.credentials.insert(email.clone(), (password, id));
            inner.session = Some(id);
            Ok(mock_session(id, email))
        })
    }

    fn sign_in(&self, email: String, password: String) -> GatewayFuture<'_, Session> {
        Box::pin(async move {
            self.track("sign_in")?;
            let mut inner = self.lock();
            let id = match inner.credentials.get(&email) {
                Some((stored, id)) if *stored == password => *id,
                _ => return Err(GatewayError::Unauthorized),
            };
            inner.session = Some(id);
            Ok(mock_session(id, email))
        })
    }

    fn sign_out(&self) -> GatewayFuture<'_, ()> {
        Box::pin(async move {
            self.track("sign_out")?;
            self.lock().session = None;
            Ok(())
        })
    }

    fn current_user(&self) -> GatewayFuture<'_, Option<AuthUser>> {
        Box::pin(async move {
            self.track("current_user")?;
            let inner = self.lock();
            Ok(inner.session.map(|id| AuthUser {
                id: id.0,
                email: inner
                    .users
                    .iter()
                    .find(|u| u.id == id)
                    .map(|u| u.email.clone()),
            }))
        })
    }

    fn fetch_profile(&self, id: UserId) -> GatewayFuture<'_, User> {
        Box::pin(async move {
            self.track("fetch_profile")?;
            self.lock()
                .users
                .iter()
                .find(|u| u.id == id)
                .cloned()
                .ok_or(GatewayError::NotFound)
        })
    }

    fn insert_profile(&self, user: NewUser) -> GatewayFuture<'_, User> {
        Box::pin(async move {
            self.track("insert_profile")?;
            let created = User {
                id: user.id,
                email: user.email,
                name: user.name,
                user_type: user.user_type,
            };
            self.lock().users.push(created.clone());
            Ok(created)
        })
    }
}

fn mock_session(id: UserId, email: String) -> Session {
    Session {
        access_token: format!("mock-token-{}", id.0),
        token_type: Some("bearer".to_string()),
        expires_in: Some(3600),
        refresh_token: None,
        user: AuthUser {
            id: id.0,
            email: Some(email),
        },
    }
}

/// Environment wired to an empty in-memory gateway
#[must_use]
pub fn test_environment() -> AppEnvironment {
    AppEnvironment::new(std::sync::Arc::new(InMemoryGateway::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn injected_failures_are_scoped_to_one_op() {
        let gateway = InMemoryGateway::new();
        gateway.fail_on("fetch_events");

        assert!(gateway.fetch_events().await.is_err());
        assert!(gateway.fetch_venues().await.is_ok());

        gateway.clear_failure("fetch_events");
        assert!(gateway.fetch_events().await.is_ok());
        assert_eq!(gateway.calls(), 3);
    }

    #[tokio::test]
    async fn sign_in_requires_matching_credentials() {
        let gateway = InMemoryGateway::new();
        gateway.seed_user(
            User {
                id: UserId(Uuid::nil()),
                email: "a@b.test".to_string(),
                name: "Alex".to_string(),
                user_type: crate::types::UserRole::Attendee,
            },
            "secret",
        );

        assert!(matches!(
            gateway
                .sign_in("a@b.test".to_string(), "wrong".to_string())
                .await,
            Err(GatewayError::Unauthorized)
        ));
        assert!(
            gateway
                .sign_in("a@b.test".to_string(), "secret".to_string())
                .await
                .is_ok()
        );
    }
}
