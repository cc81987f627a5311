//! Derived view aggregates
//!
//! Views are pure projections over [`AppState`]: they allocate their own
//! snapshot and never mutate slice state. Joining orders to events goes
//! through a keyed index so derivation stays linear in the number of
//! tickets held.

use crate::app::AppState;
use crate::types::{Event, EventId, OrderStatus, Speaker, Ticket, Venue};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A purchased ticket joined with its event
#[derive(Debug, Clone, PartialEq)]
pub struct HeldTicket {
    /// The event the ticket admits to
    pub event: Event,
    /// The purchased ticket
    pub ticket: Ticket,
}

/// Join completed orders' tickets with their events, soonest event first
///
/// Tickets whose event is not in the catalog snapshot are dropped rather
/// than rendered half-empty.
#[must_use]
pub fn held_tickets(state: &AppState) -> Vec<HeldTicket> {
    let index: HashMap<EventId, &Event> = state
        .events
        .events
        .iter()
        .map(|e| (e.event_id, e))
        .collect();

    let mut held: Vec<HeldTicket> = state
        .orders
        .orders
        .iter()
        .filter(|o| o.order.status == OrderStatus::Completed)
        .flat_map(|o| o.items.iter())
        .filter_map(|ticket| {
            index.get(&ticket.event_id).map(|event| HeldTicket {
                event: (*event).clone(),
                ticket: ticket.clone(),
            })
        })
        .collect();

    held.sort_by_key(|h| h.event.date);
    held
}

/// Split held tickets into upcoming and past relative to `now`
///
/// An event happening exactly at `now` counts as upcoming.
#[must_use]
pub fn partition_held_tickets(
    state: &AppState,
    now: DateTime<Utc>,
) -> (Vec<HeldTicket>, Vec<HeldTicket>) {
    held_tickets(state)
        .into_iter()
        .partition(|h| h.event.date >= now)
}

/// The my-tickets page: held tickets split by whether the event has passed
#[derive(Debug, Clone, PartialEq)]
pub struct MyTicketsView {
    /// Tickets for events that have not happened yet
    pub upcoming: Vec<HeldTicket>,
    /// Tickets for events already over
    pub past: Vec<HeldTicket>,
}

impl MyTicketsView {
    /// Derive the view from the current state
    #[must_use]
    pub fn derive(state: &AppState, now: DateTime<Utc>) -> Self {
        let (upcoming, past) = partition_held_tickets(state, now);
        Self { upcoming, past }
    }
}

/// The dashboard page: upcoming tickets plus lifetime order totals
///
/// Totals cover every order regardless of status, pending and cancelled
/// included.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Tickets for events that have not happened yet
    pub upcoming: Vec<HeldTicket>,
    /// Number of orders ever placed
    pub total_orders: usize,
    /// Sum of all order totals
    pub total_spent: f64,
}

impl DashboardView {
    /// Derive the view from the current state
    #[must_use]
    pub fn derive(state: &AppState, now: DateTime<Utc>) -> Self {
        let (upcoming, _) = partition_held_tickets(state, now);
        Self {
            upcoming,
            total_orders: state.orders.orders.len(),
            total_spent: state.orders.orders.iter().map(|o| o.order.total_price).sum(),
        }
    }

    /// Total spent formatted for display
    #[must_use]
    pub fn total_spent_display(&self) -> String {
        format_price(self.total_spent)
    }
}

/// The home page: the next few upcoming events
#[derive(Debug, Clone, PartialEq)]
pub struct HomeView {
    /// Soonest upcoming events, at most three
    pub featured: Vec<Event>,
}

impl HomeView {
    /// Derive the view from the current state
    #[must_use]
    pub fn derive(state: &AppState, now: DateTime<Utc>) -> Self {
        let mut upcoming: Vec<Event> = state
            .events
            .events
            .iter()
            .filter(|e| e.date >= now)
            .cloned()
            .collect();
        upcoming.sort_by_key(|e| e.date);
        upcoming.truncate(3);
        Self { featured: upcoming }
    }
}

/// The events listing page: the full catalog, soonest first
#[derive(Debug, Clone, PartialEq)]
pub struct EventsListView {
    /// All known events
    pub events: Vec<Event>,
}

impl EventsListView {
    /// Derive the view from the current state
    #[must_use]
    pub fn derive(state: &AppState) -> Self {
        Self {
            events: state.events.events.clone(),
        }
    }
}

/// The venues listing page
#[derive(Debug, Clone, PartialEq)]
pub struct VenuesView {
    /// All known venues, alphabetical
    pub venues: Vec<Venue>,
}

impl VenuesView {
    /// Derive the view from the current state
    #[must_use]
    pub fn derive(state: &AppState) -> Self {
        Self {
            venues: state.events.venues.clone(),
        }
    }
}

/// The event detail page: the viewed event with its venue, speakers,
/// availability, and the running checkout selection
#[derive(Debug, Clone, PartialEq)]
pub struct EventDetailView {
    /// The viewed event, when loaded
    pub event: Option<Event>,
    /// Its venue, when loaded
    pub venue: Option<Venue>,
    /// Speakers appearing at the event
    pub speakers: Vec<Speaker>,
    /// Tickets still purchasable
    pub available: Vec<Ticket>,
    /// Tickets picked for checkout
    pub selected: Vec<Ticket>,
    /// Sum of the selected ticket prices
    pub total_amount: f64,
}

impl EventDetailView {
    /// Derive the view from the current state
    #[must_use]
    pub fn derive(state: &AppState) -> Self {
        Self {
            event: state.events.current_event.clone(),
            venue: state.events.current_venue.clone(),
            speakers: state.events.speakers.clone(),
            available: state.tickets.tickets.clone(),
            selected: state.tickets.selected.clone(),
            total_amount: state.tickets.selection_total(),
        }
    }
}

/// Format an amount in the display currency with two decimal places
#[must_use]
pub fn format_price(amount: f64) -> String {
    format!("${amount:.2}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can unwrap
mod tests {
    use super::*;
    use crate::types::{Order, OrderId, OrderWithItems, TicketId, UserId, VenueId};
    use chrono::TimeZone;

    fn event_at(id: i64, date: DateTime<Utc>) -> Event {
        Event {
            event_id: EventId(id),
            name: format!("Event {id}"),
            description: String::new(),
            location: "Main Hall".to_string(),
            date,
            time: "19:00".to_string(),
            venue_id: VenueId(1),
            image_url: None,
        }
    }

    fn order_with_ticket(order_id: i64, event_id: i64, status: OrderStatus) -> OrderWithItems {
        OrderWithItems {
            order: Order {
                order_id: OrderId(order_id),
                user_id: UserId(uuid::Uuid::nil()),
                total_price: 50.0,
                date: Utc::now(),
                status,
            },
            items: vec![Ticket {
                ticket_id: TicketId(order_id * 10),
                event_id: EventId(event_id),
                ticket_type: "General Admission".to_string(),
                price: 50.0,
                seat_number: "A1".to_string(),
                is_available: false,
            }],
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn event_exactly_at_now_counts_as_upcoming() {
        let mut state = AppState::default();
        state.events.events = vec![event_at(1, now())];
        state.orders.orders = vec![order_with_ticket(1, 1, OrderStatus::Completed)];

        let view = MyTicketsView::derive(&state, now());
        assert_eq!(view.upcoming.len(), 1);
        assert!(view.past.is_empty());
    }

    #[test]
    fn past_events_land_in_the_past_partition() {
        let mut state = AppState::default();
        state.events.events = vec![
            event_at(1, now() - chrono::Duration::days(7)),
            event_at(2, now() + chrono::Duration::days(7)),
        ];
        state.orders.orders = vec![
            order_with_ticket(1, 1, OrderStatus::Completed),
            order_with_ticket(2, 2, OrderStatus::Completed),
        ];

        let view = MyTicketsView::derive(&state, now());
        assert_eq!(view.upcoming.len(), 1);
        assert_eq!(view.past.len(), 1);
        assert_eq!(view.past[0].event.event_id, EventId(1));
    }

    #[test]
    fn tickets_without_a_catalog_event_are_dropped() {
        let mut state = AppState::default();
        state.events.events = vec![event_at(1, now())];
        state.orders.orders = vec![
            order_with_ticket(1, 1, OrderStatus::Completed),
            order_with_ticket(2, 99, OrderStatus::Completed),
        ];

        assert_eq!(held_tickets(&state).len(), 1);
    }

    #[test]
    fn pending_orders_hold_no_tickets_but_count_in_totals() {
        let mut state = AppState::default();
        state.events.events = vec![event_at(1, now())];
        state.orders.orders = vec![
            order_with_ticket(1, 1, OrderStatus::Completed),
            order_with_ticket(2, 1, OrderStatus::Pending),
        ];

        let view = DashboardView::derive(&state, now());
        assert_eq!(view.upcoming.len(), 1);
        assert_eq!(view.total_orders, 2);
        assert!((view.total_spent - 100.0).abs() < f64::EPSILON);
        assert_eq!(view.total_spent_display(), "$100.00");
    }

    #[test]
    fn home_view_features_at_most_three_soonest_events() {
        let mut state = AppState::default();
        state.events.events = vec![
            event_at(1, now() + chrono::Duration::days(10)),
            event_at(2, now() - chrono::Duration::days(1)),
            event_at(3, now() + chrono::Duration::days(1)),
            event_at(4, now() + chrono::Duration::days(5)),
            event_at(5, now() + chrono::Duration::days(7)),
        ];

        let view = HomeView::derive(&state, now());
        assert_eq!(view.featured.len(), 3);
        assert_eq!(view.featured[0].event_id, EventId(3));
    }
}
