//! # Todolist Testing
//!
//! Testing utilities and helpers for the todolist reducer architecture.
//!
//! This crate provides:
//! - Deterministic implementations of Environment traits
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Invariant replay for property-based tests
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use todolist_testing::ReducerTest;
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(test_environment())
//!     .given_state(TodoState::new())
//!     .when_action(TodoAction::Add { id, title: "Buy milk".into() })
//!     .then_state(|state| assert_eq!(state.count(), 1))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use todolist_core::environment::{Clock, IdGenerator};


pub use reducer_test::{assertions, ReducerTest};

/// Deterministic implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::marker::PhantomData;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todolist_testing::mocks::FixedClock;
    /// use todolist_core::environment::Clock;
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

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }

    /// Counter-based id generator
    ///
    /// Hands out `T::from(1)`, `T::from(2)`, ... so tests can predict every id.
    ///
    /// ```
    /// use todolist_core::environment::IdGenerator;
    /// use todolist_testing::mocks::SequentialIdGenerator;
    ///
    /// let ids = SequentialIdGenerator::<u64>::new();
    /// assert_eq!(ids.next_id(), 1);
    /// assert_eq!(ids.next_id(), 2);
    /// ```
    #[derive(Debug)]
    pub struct SequentialIdGenerator<T> {
        next: AtomicU64,
        _id: PhantomData<fn() -> T>,
    }

    impl<T> SequentialIdGenerator<T> {
        /// Start counting at 1
        #[must_use]
        pub const fn new() -> Self {
            Self::starting_at(1)
        }

        /// Start counting at `first`
        #[must_use]
        pub const fn starting_at(first: u64) -> Self {
            Self {
                next: AtomicU64::new(first),
                _id: PhantomData,
            }
        }
    }

    impl<T> Default for SequentialIdGenerator<T> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<T: From<u64>> IdGenerator for SequentialIdGenerator<T> {
        type Id = T;

        fn next_id(&self) -> T {
            T::from(self.next.fetch_add(1, Ordering::Relaxed))
        }
    }
}

/// Invariant replay for property-based tests
///
/// Feeds a sequence of actions through a reducer and checks an invariant
/// after every single transition, reporting the first step that breaks it.
pub mod properties {
    use std::fmt::Debug;
    use thiserror::Error;
    use todolist_core::reducer::Reducer;

    /// An invariant failed after applying an action
    #[derive(Debug, Error, Clone, PartialEq, Eq)]
    #[error("invariant violated after step {step} ({action}): {message}")]
    pub struct InvariantViolation {
        /// Zero-based index of the offending action
        pub step: usize,
        /// Debug rendering of the offending action
        pub action: String,
        /// What the invariant reported
        pub message: String,
    }

    /// Apply `actions` in order, checking `invariant` after each transition
    ///
    /// Returns the final state when every check passed.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation`] for the first transition after which
    /// `invariant` returned an error.
    pub fn replay<R, I, F>(
        reducer: &R,
        env: &R::Environment,
        initial: R::State,
        actions: I,
        mut invariant: F,
    ) -> Result<R::State, InvariantViolation>
    where
        R: Reducer,
        R::Action: Debug,
        I: IntoIterator<Item = R::Action>,
        F: FnMut(&R::State) -> Result<(), String>,
    {
        let mut state = initial;

        for (step, action) in actions.into_iter().enumerate() {
            let rendered = format!("{action:?}");
            let _effects = reducer.reduce(&mut state, action, env);

            if let Err(message) = invariant(&state) {
                return Err(InvariantViolation {
                    step,
                    action: rendered,
                    message,
                });
            }
        }

        Ok(state)
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, SequentialIdGenerator};
pub use properties::{replay, InvariantViolation};
