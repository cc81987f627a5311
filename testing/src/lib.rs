//! # Boxoffice Testing
//!
//! Testing utilities and helpers for the boxoffice state architecture.
//!
//! This crate provides:
//! - Mock implementations of environment traits (clock, transaction ids)
//! - A Given-When-Then harness for reducer tests
//!
//! ## Example
//!
//! ```ignore
//! use boxoffice_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(TicketsReducer)
//!     .with_env(test_environment())
//!     .given_state(TicketsState::default())
//!     .when_action(TicketsAction::ClearSelection)
//!     .then_state(|state| assert!(state.selected.is_empty()))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use boxoffice_core::environment::{Clock, TransactionIds};

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, TransactionIds, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use boxoffice_testing::mocks::FixedClock;
    /// use boxoffice_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-06-01 12:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Sequential transaction ids for predictable checkout tests
    ///
    /// Yields `txn_test_1`, `txn_test_2`, ...
    #[derive(Debug, Default)]
    pub struct SequentialTransactionIds {
        next: AtomicU64,
    }

    impl SequentialTransactionIds {
        /// Create a generator starting at `txn_test_1`
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl TransactionIds for SequentialTransactionIds {
        fn transaction_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
            format!("txn_test_{n}")
        }
    }
}

/// Given-When-Then harness for reducer tests.
pub mod reducer_test {
    use boxoffice_core::{effect::Effect, reducer::Reducer};

    /// Type alias for state assertion functions
    type StateAssertion<S> = Box<dyn FnOnce(&S)>;

    /// Type alias for effect assertion functions
    type EffectAssertion<A> = Box<dyn FnOnce(&[Effect<A>])>;

    /// Fluent API for testing reducers with readable Given-When-Then syntax
    ///
    /// # Example
    ///
    /// ```ignore
    /// ReducerTest::new(OrdersReducer)
    ///     .with_env(test_environment())
    ///     .given_state(OrdersState::default())
    ///     .when_action(OrdersAction::Checkout { user: None, tickets, payment_method })
    ///     .then_state(|state| {
    ///         assert!(state.error.is_some());
    ///     })
    ///     .then_effects(|effects| {
    ///         assert!(effects.is_empty(), "validation failures issue no gateway calls");
    ///     })
    ///     .run();
    /// ```
    pub struct ReducerTest<R, S, A, E>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        reducer: R,
        environment: Option<E>,
        initial_state: Option<S>,
        action: Option<A>,
        state_assertions: Vec<StateAssertion<S>>,
        effect_assertions: Vec<EffectAssertion<A>>,
    }

    impl<R, S, A, E> ReducerTest<R, S, A, E>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        /// Create a new reducer test with the given reducer
        #[must_use]
        pub const fn new(reducer: R) -> Self {
            Self {
                reducer,
                environment: None,
                initial_state: None,
                action: None,
                state_assertions: Vec::new(),
                effect_assertions: Vec::new(),
            }
        }

        /// Set the environment for the test
        #[must_use]
        pub fn with_env(mut self, env: E) -> Self {
            self.environment = Some(env);
            self
        }

        /// Set the initial state (Given)
        #[must_use]
        pub fn given_state(mut self, state: S) -> Self {
            self.initial_state = Some(state);
            self
        }

        /// Set the action to test (When)
        #[must_use]
        pub fn when_action(mut self, action: A) -> Self {
            self.action = Some(action);
            self
        }

        /// Add an assertion about the resulting state (Then)
        #[must_use]
        pub fn then_state<F>(mut self, assertion: F) -> Self
        where
            F: FnOnce(&S) + 'static,
        {
            self.state_assertions.push(Box::new(assertion));
            self
        }

        /// Add an assertion about the resulting effects (Then)
        #[must_use]
        pub fn then_effects<F>(mut self, assertion: F) -> Self
        where
            F: FnOnce(&[Effect<A>]) + 'static,
        {
            self.effect_assertions.push(Box::new(assertion));
            self
        }

        /// Assert that the action produced no effects at all
        ///
        /// Shorthand for validation-failure cases, where the contract is
        /// that zero gateway calls are issued.
        #[must_use]
        pub fn then_no_effects(self) -> Self {
            self.then_effects(|effects| {
                assert!(
                    effects.iter().all(|e| matches!(e, Effect::None)),
                    "expected no effects, got {}",
                    effects.len()
                );
            })
        }

        /// Run the test and execute all assertions
        ///
        /// # Panics
        ///
        /// Panics if initial state, action, or environment is not set,
        /// or if any assertion fails.
        #[allow(clippy::expect_used)] // Test code can use expect
        pub fn run(self) {
            let mut state = self
                .initial_state
                .expect("Initial state must be set with given_state()");

            let action = self.action.expect("Action must be set with when_action()");

            let env = self
                .environment
                .expect("Environment must be set with with_env()");

            // Execute reducer
            let effects = self.reducer.reduce(&mut state, action, &env);

            // Run state assertions
            for assertion in self.state_assertions {
                assertion(&state);
            }

            // Run effect assertions
            for assertion in self.effect_assertions {
                assertion(&effects);
            }
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, SequentialTransactionIds, test_clock};
pub use reducer_test::ReducerTest;

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_core::environment::TransactionIds;

    #[test]
    fn fixed_clock_is_deterministic() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn transaction_ids_are_sequential() {
        let ids = SequentialTransactionIds::new();
        assert_eq!(ids.transaction_id(), "txn_test_1");
        assert_eq!(ids.transaction_id(), "txn_test_2");
    }
}
