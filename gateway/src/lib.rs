//! # Boxoffice Gateway Client
//!
//! Rust client for the hosted persistence + auth gateway consumed by the
//! boxoffice application: table-style CRUD over `rest/v1` and session-based
//! authentication over `auth/v1`.
//!
//! ## Example
//!
//! ```no_run
//! use boxoffice_gateway::{Filter, OrderBy, RestClient};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct EventRow {
//!     event_id: i64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create client from GATEWAY_URL / GATEWAY_ANON_KEY
//!     let client = RestClient::from_env()?;
//!
//!     let events: Vec<EventRow> = client
//!         .select("events", &[], Some(&OrderBy::asc("date")))
//!         .await?;
//!
//!     let one: EventRow = client
//!         .select_one("events", &[Filter::eq("event_id", 1)])
//!         .await?;
//!
//!     println!("{} events, first: {}", events.len(), one.name);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::RestClient;
pub use error::GatewayError;
pub use types::{AuthUser, Filter, OrderBy, Session};
