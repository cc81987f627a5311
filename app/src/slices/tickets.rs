//! Tickets slice: availability for the viewed event plus the checkout
//! selection
//!
//! The selection is a local concern; only checkout touches the gateway
//! with it. Booking a single ticket flips its availability remotely and
//! drops it from the held snapshot.

use crate::environment::AppEnvironment;
use crate::types::{EventId, Ticket, TicketId};
use boxoffice_core::effect::Effect;
use boxoffice_core::reducer::Reducer;
use boxoffice_core::{Effects, smallvec};

/// Tickets slice state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketsState {
    /// Available tickets for the viewed event, cheapest first
    pub tickets: Vec<Ticket>,
    /// Tickets the user has picked for checkout
    pub selected: Vec<Ticket>,
    /// A tickets operation is in flight
    pub loading: bool,
    /// Last failure, user-facing
    pub error: Option<String>,
}

impl TicketsState {
    /// Sum of the selected ticket prices
    #[must_use]
    pub fn selection_total(&self) -> f64 {
        self.selected.iter().map(|t| t.price).sum()
    }
}

/// Tickets slice actions
#[derive(Debug, Clone)]
pub enum TicketsAction {
    /// Fetch the available tickets for an event
    FetchForEvent(EventId),
    /// Flip one ticket to unavailable remotely
    Book(TicketId),
    /// Add a ticket to the checkout selection
    Select(Ticket),
    /// Remove a ticket from the checkout selection
    Deselect(TicketId),
    /// Empty the checkout selection
    ClearSelection,

    /// Availability fetch finished
    TicketsLoaded(Vec<Ticket>),
    /// Booking finished
    Booked(Ticket),
    /// A tickets operation failed
    Failed(String),

    /// Dismiss the stored error
    ClearError,
}

/// Reducer for the tickets slice
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketsReducer;

impl Reducer for TicketsReducer {
    type State = TicketsState;
    type Action = TicketsAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut TicketsState,
        action: TicketsAction,
        env: &AppEnvironment,
    ) -> Effects<TicketsAction> {
        match action {
            TicketsAction::FetchForEvent(event_id) => {
                state.loading = true;
                state.error = None;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.fetch_available_tickets(event_id).await {
                        Ok(tickets) => TicketsAction::TicketsLoaded(tickets),
                        Err(e) => TicketsAction::Failed(e.to_string()),
                    })
                }))]
            },

            TicketsAction::Book(id) => {
                state.loading = true;
                state.error = None;

                let gateway = env.gateway.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    Some(match gateway.book_ticket(id).await {
                        Ok(ticket) => TicketsAction::Booked(ticket),
                        Err(e) => TicketsAction::Failed(e.to_string()),
                    })
                }))]
            },

            TicketsAction::Select(ticket) => {
                if !state.selected.iter().any(|t| t.ticket_id == ticket.ticket_id) {
                    state.selected.push(ticket);
                }
                smallvec![]
            },

            TicketsAction::Deselect(id) => {
                state.selected.retain(|t| t.ticket_id != id);
                smallvec![]
            },

            TicketsAction::ClearSelection => {
                state.selected.clear();
                smallvec![]
            },

            TicketsAction::TicketsLoaded(tickets) => {
                state.loading = false;
                state.tickets = tickets;
                smallvec![]
            },

            TicketsAction::Booked(ticket) => {
                state.loading = false;
                state.tickets.retain(|t| t.ticket_id != ticket.ticket_id);
                state.selected.retain(|t| t.ticket_id != ticket.ticket_id);
                smallvec![]
            },

            TicketsAction::Failed(message) => {
                tracing::warn!(error = %message, "Tickets operation failed");
                state.loading = false;
                state.error = Some(message);
                smallvec![]
            },

            TicketsAction::ClearError => {
                state.error = None;
                smallvec![]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::test_environment;

    fn sample_ticket(id: i64, price: f64) -> Ticket {
        Ticket {
            ticket_id: TicketId(id),
            event_id: EventId(1),
            ticket_type: "General Admission".to_string(),
            price,
            seat_number: format!("A{id}"),
            is_available: true,
        }
    }

    #[test]
    fn selecting_the_same_ticket_twice_keeps_one_copy() {
        boxoffice_testing::ReducerTest::new(TicketsReducer)
            .with_env(test_environment())
            .given_state(TicketsState {
                selected: vec![sample_ticket(1, 50.0)],
                ..TicketsState::default()
            })
            .when_action(TicketsAction::Select(sample_ticket(1, 50.0)))
            .then_state(|state| assert_eq!(state.selected.len(), 1))
            .then_no_effects()
            .run();
    }

    #[test]
    fn selection_total_sums_prices() {
        let mut state = TicketsState::default();
        let env = test_environment();

        TicketsReducer.reduce(
            &mut state,
            TicketsAction::Select(sample_ticket(1, 50.0)),
            &env,
        );
        TicketsReducer.reduce(
            &mut state,
            TicketsAction::Select(sample_ticket(2, 75.0)),
            &env,
        );

        assert!((state.selection_total() - 125.0).abs() < f64::EPSILON);
    }

    #[test]
    fn booked_ticket_is_removed_from_both_collections() {
        let mut state = TicketsState {
            tickets: vec![sample_ticket(1, 50.0), sample_ticket(2, 75.0)],
            selected: vec![sample_ticket(1, 50.0)],
            loading: true,
            ..TicketsState::default()
        };

        let mut booked = sample_ticket(1, 50.0);
        booked.is_available = false;

        TicketsReducer.reduce(
            &mut state,
            TicketsAction::Booked(booked),
            &test_environment(),
        );

        assert_eq!(state.tickets.len(), 1);
        assert!(state.selected.is_empty());
        assert!(!state.loading);
    }
}
