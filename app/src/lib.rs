//! # Boxoffice
//!
//! Event ticketing application built on a unidirectional data flow:
//! four state slices (auth, events, tickets, orders), an async effect
//! runtime, and a hosted gateway for persistence and auth.
//!
//! ## Architecture
//!
//! - [`types`]: domain rows shared across slices and the gateway boundary
//! - [`gateway`]: the persistence/auth seam and its REST implementation
//! - [`environment`]: injected dependencies (gateway, clock, transaction ids)
//! - [`slices`]: slice state, actions, and reducers
//! - [`app`]: the composed state, action enum, reducer, and store type
//! - [`views`]: pure projections over the composed state
//!
//! ## Example
//!
//! ```ignore
//! use boxoffice::app::{AppReducer, AppState, AppStore};
//! use boxoffice::environment::AppEnvironment;
//! use boxoffice::gateway::RestGateway;
//! use boxoffice_gateway::RestClient;
//! use std::sync::Arc;
//!
//! let rest = RestClient::from_env()?;
//! let env = AppEnvironment::new(Arc::new(RestGateway::new(rest)));
//! let store = AppStore::new(AppState::default(), AppReducer::new(), env);
//! ```

pub mod app;
pub mod config;
pub mod environment;
pub mod gateway;
pub mod slices;
pub mod types;
pub mod views;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub use app::{AppAction, AppReducer, AppState, AppStore};
pub use config::Config;
pub use environment::{AppEnvironment, CheckoutPolicy};
