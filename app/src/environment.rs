//! Application environment: injected dependencies for the reducers
//!
//! Reducers never reach for globals. Everything effectful (the gateway,
//! the clock, transaction id generation) is behind a trait object here,
//! so tests swap in deterministic doubles.

use crate::gateway::TicketingGateway;
use boxoffice_core::environment::{Clock, TransactionIds};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::sync::Arc;

/// How checkout behaves when a step fails after the order row exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPolicy {
    /// Leave partial rows in place; the failure is only surfaced to state
    #[default]
    Faithful,
    /// Best-effort cleanup: cancel the order and release flipped tickets
    Compensating,
}

/// Dependencies injected into every reducer
#[derive(Clone)]
pub struct AppEnvironment {
    /// Persistence and auth operations
    pub gateway: Arc<dyn TicketingGateway>,
    /// Time source
    pub clock: Arc<dyn Clock>,
    /// Payment transaction id source
    pub transaction_ids: Arc<dyn TransactionIds>,
    /// Checkout failure handling
    pub checkout_policy: CheckoutPolicy,
}

impl AppEnvironment {
    /// Production environment: system clock, random transaction ids
    #[must_use]
    pub fn new(gateway: Arc<dyn TicketingGateway>) -> Self {
        Self {
            gateway,
            clock: Arc::new(SystemClock),
            transaction_ids: Arc::new(RandomTransactionIds),
            checkout_policy: CheckoutPolicy::default(),
        }
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the transaction id source
    #[must_use]
    pub fn with_transaction_ids(mut self, ids: Arc<dyn TransactionIds>) -> Self {
        self.transaction_ids = ids;
        self
    }

    /// Set the checkout failure policy
    #[must_use]
    pub const fn with_checkout_policy(mut self, policy: CheckoutPolicy) -> Self {
        self.checkout_policy = policy;
        self
    }
}

impl std::fmt::Debug for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppEnvironment")
            .field("checkout_policy", &self.checkout_policy)
            .finish_non_exhaustive()
    }
}

/// Wall-clock time source
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Random `txn_`-prefixed transaction ids
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTransactionIds;

impl TransactionIds for RandomTransactionIds {
    fn transaction_id(&self) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(13)
            .map(|b| (b as char).to_ascii_lowercase())
            .collect();
        format!("txn_{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_core::environment::TransactionIds;

    #[test]
    fn transaction_ids_are_prefixed_and_distinct() {
        let ids = RandomTransactionIds;
        let a = ids.transaction_id();
        let b = ids.transaction_id();
        assert!(a.starts_with("txn_"));
        assert_eq!(a.len(), "txn_".len() + 13);
        assert_ne!(a, b);
    }
}
