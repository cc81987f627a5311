//! State slices
//!
//! Each slice owns a portion of the application state and a reducer for
//! it. Commands describe user intent; every command that touches the
//! gateway resolves to exactly one fulfilled or rejected feedback action.

pub mod auth;
pub mod events;
pub mod orders;
pub mod tickets;

pub use auth::{AuthAction, AuthReducer, AuthState};
pub use events::{EventsAction, EventsReducer, EventsState};
pub use orders::{OrdersAction, OrdersReducer, OrdersState};
pub use tickets::{TicketsAction, TicketsReducer, TicketsState};
