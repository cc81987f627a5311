//! Shared fixtures for integration tests.

#![allow(dead_code)]

use boxoffice::app::{AppReducer, AppState, AppStore};
use boxoffice::environment::{AppEnvironment, CheckoutPolicy};
use boxoffice::mocks::InMemoryGateway;
use boxoffice::types::{Event, EventId, Ticket, TicketId, User, UserId, UserRole, VenueId};
use boxoffice_testing::{SequentialTransactionIds, test_clock};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Store wired to a fresh in-memory gateway with deterministic clock and
/// transaction ids
pub fn store_with_policy(policy: CheckoutPolicy) -> (AppStore, Arc<InMemoryGateway>) {
    let gateway = Arc::new(InMemoryGateway::new());
    let environment = AppEnvironment::new(gateway.clone())
        .with_clock(Arc::new(test_clock()))
        .with_transaction_ids(Arc::new(SequentialTransactionIds::new()))
        .with_checkout_policy(policy);
    let store = AppStore::new(AppState::default(), AppReducer::new(), environment);
    (store, gateway)
}

pub fn store() -> (AppStore, Arc<InMemoryGateway>) {
    store_with_policy(CheckoutPolicy::default())
}

pub fn fixed_now() -> DateTime<Utc> {
    use boxoffice_core::environment::Clock;
    test_clock().now()
}

pub fn sample_user() -> User {
    User {
        id: UserId(Uuid::from_u128(1)),
        email: "alex@example.test".to_string(),
        name: "Alex".to_string(),
        user_type: UserRole::Attendee,
    }
}

pub fn event_at(id: i64, date: DateTime<Utc>) -> Event {
    Event {
        event_id: EventId(id),
        name: format!("Event {id}"),
        description: "An evening of talks".to_string(),
        location: "Main Hall".to_string(),
        date,
        time: "19:00".to_string(),
        venue_id: VenueId(1),
        image_url: None,
    }
}

pub fn upcoming_event(id: i64) -> Event {
    event_at(id, fixed_now() + Duration::days(30))
}

pub fn ticket(id: i64, event: i64, price: f64) -> Ticket {
    Ticket {
        ticket_id: TicketId(id),
        event_id: EventId(event),
        ticket_type: "General Admission".to_string(),
        price,
        seat_number: format!("A{id}"),
        is_available: true,
    }
}
