//! Domain types shared across slices, views, and the gateway boundary.
//!
//! Row shapes mirror the gateway tables: `users`, `events`, `venues`,
//! `speakers`, `tickets`, `orders`, `order_items`, `payments`. Ids are
//! newtypes over the gateway's integer keys (users use the auth service's
//! UUID keys).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! row_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Primary key of an event row
    EventId
);
row_id!(
    /// Primary key of a venue row
    VenueId
);
row_id!(
    /// Primary key of a speaker row
    SpeakerId
);
row_id!(
    /// Primary key of a ticket row
    TicketId
);
row_id!(
    /// Primary key of an order row
    OrderId
);
row_id!(
    /// Primary key of an order item row
    OrderItemId
);
row_id!(
    /// Primary key of a payment row
    PaymentId
);

/// User identifier, shared between the auth service and the profile table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role a user holds in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full administrative access
    Admin,
    /// Can author and manage events
    Organizer,
    /// Can browse events and purchase tickets
    Attendee,
}

/// Lifecycle of an order row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created at the start of checkout, before payment
    Pending,
    /// Payment recorded, checkout finished
    Completed,
    /// Checkout failed and the order was compensated
    Cancelled,
}

/// Lifecycle of a payment row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Payment initiated but not yet settled
    Pending,
    /// Payment recorded successfully
    Completed,
    /// Payment attempt failed
    Failed,
}

/// Profile row for an authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Auth service user id
    pub id: UserId,
    /// Login email
    pub email: String,
    /// Display name
    pub name: String,
    /// Role in the application
    pub user_type: UserRole,
}

/// Profile row to insert during registration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    /// Auth service user id from the freshly opened session
    pub id: UserId,
    /// Login email
    pub email: String,
    /// Display name
    pub name: String,
    /// Role in the application
    pub user_type: UserRole,
}

/// Event row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Primary key
    pub event_id: EventId,
    /// Event title
    pub name: String,
    /// Long-form description
    pub description: String,
    /// Free-form location label shown on cards
    pub location: String,
    /// When the event takes place
    pub date: DateTime<Utc>,
    /// Doors-open time as displayed ("19:00")
    pub time: String,
    /// Venue hosting the event
    pub venue_id: VenueId,
    /// Optional hero image
    pub image_url: Option<String>,
}

/// Event row to insert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    /// Event title
    pub name: String,
    /// Long-form description
    pub description: String,
    /// Free-form location label
    pub location: String,
    /// When the event takes place
    pub date: DateTime<Utc>,
    /// Doors-open time as displayed
    pub time: String,
    /// Venue hosting the event
    pub venue_id: VenueId,
    /// Optional hero image
    pub image_url: Option<String>,
}

/// Partial update for an event row; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventPatch {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New location label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// New date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// New displayed time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// New venue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<VenueId>,
    /// New hero image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Venue row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    /// Primary key
    pub venue_id: VenueId,
    /// Venue name
    pub name: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// State or region
    pub state: String,
    /// Postal code
    pub zipcode: String,
    /// Seating capacity
    pub capacity: u32,
}

/// Speaker row, attached to an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    /// Primary key
    pub speaker_id: SpeakerId,
    /// Event this speaker appears at
    pub event_id: EventId,
    /// Speaker name
    pub name: String,
    /// Short biography
    pub bio: String,
    /// Optional portrait
    pub image_url: Option<String>,
}

/// Ticket row
///
/// A ticket is a concrete seat at an event. Purchasing flips
/// `is_available` to `false`; the row is never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Primary key
    pub ticket_id: TicketId,
    /// Event this ticket admits to
    pub event_id: EventId,
    /// Tier label ("General Admission", "VIP")
    #[serde(rename = "type")]
    pub ticket_type: String,
    /// Price in the display currency
    pub price: f64,
    /// Seat assignment
    pub seat_number: String,
    /// Whether the ticket can still be purchased
    pub is_available: bool,
}

/// Order row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Primary key
    pub order_id: OrderId,
    /// Purchasing user
    pub user_id: UserId,
    /// Sum of the ticket prices in this order
    pub total_price: f64,
    /// When the order was placed
    pub date: DateTime<Utc>,
    /// Lifecycle status
    pub status: OrderStatus,
}

/// Order row to insert at the start of checkout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    /// Purchasing user
    pub user_id: UserId,
    /// Sum of the ticket prices
    pub total_price: f64,
    /// When the order was placed
    pub date: DateTime<Utc>,
    /// Initial status (always pending)
    pub status: OrderStatus,
}

/// Order item row, linking an order to one purchased ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Primary key
    pub order_item_id: OrderItemId,
    /// Owning order
    pub order_id: OrderId,
    /// Purchased ticket
    pub ticket_id: TicketId,
}

/// Order item row to insert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrderItem {
    /// Owning order
    pub order_id: OrderId,
    /// Purchased ticket
    pub ticket_id: TicketId,
}

/// Payment row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Primary key
    pub payment_id: PaymentId,
    /// Order this payment settles
    pub order_id: OrderId,
    /// Method label ("credit_card", "paypal")
    pub payment_method: String,
    /// Generated transaction id (`txn_` prefixed)
    pub transaction_id: String,
    /// Amount charged
    pub amount: f64,
    /// Lifecycle status
    pub status: PaymentStatus,
    /// When the payment was recorded
    pub date: DateTime<Utc>,
}

/// Payment row to insert during checkout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPayment {
    /// Order this payment settles
    pub order_id: OrderId,
    /// Method label
    pub payment_method: String,
    /// Generated transaction id
    pub transaction_id: String,
    /// Amount charged
    pub amount: f64,
    /// Lifecycle status
    pub status: PaymentStatus,
    /// When the payment was recorded
    pub date: DateTime<Utc>,
}

/// An order joined with the tickets it purchased
///
/// This is the shape the orders slice holds: the order row plus the
/// resolved ticket rows behind its order items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithItems {
    /// The order row
    #[serde(flatten)]
    pub order: Order,
    /// Tickets purchased by this order
    pub items: Vec<Ticket>,
}
