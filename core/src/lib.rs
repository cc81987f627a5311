//! # Boxoffice Core
//!
//! Core traits and types for the boxoffice state architecture.
//!
//! The application is built as a unidirectional data flow: views dispatch
//! actions, a reducer turns `(State, Action, Environment)` into state changes
//! plus effect descriptions, and the runtime executes those effects and feeds
//! resulting actions back into the reducer.
//!
//! ## Core Concepts
//!
//! - **State**: the snapshot a slice holds (events, tickets, orders, auth)
//! - **Action**: all possible inputs to a reducer (commands and their
//!   fulfilled/rejected outcomes)
//! - **Reducer**: pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: side effect descriptions (not execution)
//! - **Environment**: injected dependencies via traits
//!
//! ## Example
//!
//! ```ignore
//! use boxoffice_core::{reducer::Reducer, effect::Effect, Effects, smallvec};
//!
//! impl Reducer for EventsReducer {
//!     type State = EventsState;
//!     type Action = EventsAction;
//!     type Environment = AppEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut EventsState,
//!         action: EventsAction,
//!         env: &AppEnvironment,
//!     ) -> Effects<EventsAction> {
//!         match action {
//!             EventsAction::FetchEvents => {
//!                 state.loading = true;
//!                 let gateway = env.gateway.clone();
//!                 smallvec![Effect::Future(Box::pin(async move {
//!                     Some(match gateway.fetch_events().await {
//!                         Ok(events) => EventsAction::EventsLoaded(events),
//!                         Err(e) => EventsAction::EventsFailed(e.to_string()),
//!                     })
//!                 }))]
//!             }
//!             _ => smallvec![],
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Effect vector returned by reducers.
///
/// Most reducers return zero or one effects, so the vector is inlined.
pub type Effects<A> = SmallVec<[effect::Effect<A>; 4]>;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They contain all slice logic and are deterministic and testable.
pub mod reducer {
    use super::Effects;

    /// The Reducer trait - core abstraction for slice logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: the slice state this reducer operates on
    /// - `Action`: the action type this reducer processes
    /// - `Environment`: the injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for TicketsReducer {
    ///     type State = TicketsState;
    ///     type Action = TicketsAction;
    ///     type Environment = AppEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut TicketsState,
    ///         action: TicketsAction,
    ///         env: &AppEnvironment,
    ///     ) -> Effects<TicketsAction> {
    ///         // slice logic goes here
    ///         smallvec![]
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// Side effects never run here; they are described and handed to the
        /// runtime. State is only touched synchronously, under the store's
        /// write lock.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Effects<Self::Action>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable and mappable.
pub mod effect {
    use super::Effects;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the Store
    /// runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: the action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (for timeouts)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if `Some`, the action is fed back into
        /// the reducer. This is the shape of every gateway operation: the
        /// future performs the network calls and resolves to exactly one
        /// fulfilled or rejected action.
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }
    }

    impl<Action> Effect<Action>
    where
        Action: Send + 'static,
    {
        /// Map the action type produced by this effect
        ///
        /// Used to embed a child slice's effects into a parent action enum:
        /// the parent reducer delegates to the slice reducer, then lifts the
        /// returned effects with `map` so the feedback loop dispatches parent
        /// actions.
        ///
        /// ```ignore
        /// let effects = self.tickets.reduce(&mut state.tickets, action, env);
        /// effects.into_iter().map(|e| e.map(AppAction::Tickets)).collect()
        /// ```
        pub fn map<B, F>(self, f: F) -> Effect<B>
        where
            B: Send + 'static,
            F: Fn(Action) -> B + Send + Sync + Clone + 'static,
        {
            match self {
                Effect::None => Effect::None,
                Effect::Parallel(effects) => Effect::Parallel(
                    effects.into_iter().map(|e| e.map(f.clone())).collect(),
                ),
                Effect::Sequential(effects) => Effect::Sequential(
                    effects.into_iter().map(|e| e.map(f.clone())).collect(),
                ),
                Effect::Delay { duration, action } => Effect::Delay {
                    duration,
                    action: Box::new(f(*action)),
                },
                Effect::Future(fut) => {
                    Effect::Future(Box::pin(async move { fut.await.map(f) }))
                },
            }
        }
    }

    /// Lift a vector of child effects into a parent action enum.
    ///
    /// Convenience over [`Effect::map`] for whole reducer results.
    pub fn map_effects<A, B, F>(effects: Effects<A>, f: F) -> Effects<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + Clone + 'static,
    {
        effects.into_iter().map(|e| e.map(f.clone())).collect()
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected via
/// the Environment parameter, so reducers stay deterministic under test.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production - uses system clock
    /// struct SystemClock;
    /// impl Clock for SystemClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         Utc::now()
    ///     }
    /// }
    ///
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Source of payment transaction identifiers.
    ///
    /// Checkout creates a payment row with a generated transaction id.
    /// Production uses a random `txn_`-prefixed string; tests use a
    /// sequential generator.
    pub trait TransactionIds: Send + Sync {
        /// Generate a fresh transaction id
        fn transaction_id(&self) -> String;
    }
}
