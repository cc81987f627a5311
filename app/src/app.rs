//! Application composition: one state, one action enum, one reducer
//!
//! Each slice reducer runs against its own state field; slice effects are
//! lifted into [`AppAction`] so the store's feedback loop dispatches at
//! the app level. The app reducer also owns the one cross-slice rule:
//! a completed checkout clears the ticket selection and drops the
//! purchased tickets from the availability snapshot.

use crate::environment::AppEnvironment;
use crate::slices::{
    AuthAction, AuthReducer, AuthState, EventsAction, EventsReducer, EventsState, OrdersAction,
    OrdersReducer, OrdersState, TicketsAction, TicketsReducer, TicketsState,
};
use crate::types::TicketId;
use boxoffice_core::effect::map_effects;
use boxoffice_core::reducer::Reducer;
use boxoffice_core::Effects;
use boxoffice_runtime::Store;
use std::collections::HashSet;

/// Whole-application state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// Auth slice
    pub auth: AuthState,
    /// Events slice
    pub events: EventsState,
    /// Tickets slice
    pub tickets: TicketsState,
    /// Orders slice
    pub orders: OrdersState,
}

/// Whole-application actions
#[derive(Debug, Clone)]
pub enum AppAction {
    /// Auth slice action
    Auth(AuthAction),
    /// Events slice action
    Events(EventsAction),
    /// Tickets slice action
    Tickets(TicketsAction),
    /// Orders slice action
    Orders(OrdersAction),
}

/// Reducer composing the four slice reducers
#[derive(Debug, Clone, Copy, Default)]
pub struct AppReducer {
    auth: AuthReducer,
    events: EventsReducer,
    tickets: TicketsReducer,
    orders: OrdersReducer,
}

impl AppReducer {
    /// Create the composed reducer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = AppEnvironment;

    fn reduce(
        &self,
        state: &mut AppState,
        action: AppAction,
        env: &AppEnvironment,
    ) -> Effects<AppAction> {
        match action {
            AppAction::Auth(action) => {
                map_effects(self.auth.reduce(&mut state.auth, action, env), AppAction::Auth)
            },
            AppAction::Events(action) => map_effects(
                self.events.reduce(&mut state.events, action, env),
                AppAction::Events,
            ),
            AppAction::Tickets(action) => map_effects(
                self.tickets.reduce(&mut state.tickets, action, env),
                AppAction::Tickets,
            ),
            AppAction::Orders(action) => {
                if let OrdersAction::CheckoutCompleted(order) = &action {
                    let purchased: HashSet<TicketId> =
                        order.items.iter().map(|t| t.ticket_id).collect();
                    state.tickets.selected.clear();
                    state
                        .tickets
                        .tickets
                        .retain(|t| !purchased.contains(&t.ticket_id));
                }
                map_effects(
                    self.orders.reduce(&mut state.orders, action, env),
                    AppAction::Orders,
                )
            },
        }
    }
}

/// The application store type
pub type AppStore = Store<AppState, AppAction, AppEnvironment, AppReducer>;
