//! # Todolist Core
//!
//! Core traits and types for the todolist reducer architecture.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state owned by a store (the todo collection and its derived views)
//! - **Action**: Every input a reducer understands (add, toggle, update, delete)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits (clock, id generation)
//!
//! ## Example
//!
//! ```
//! use todolist_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct TitleState {
//!     titles: Vec<String>,
//! }
//!
//! enum TitleAction {
//!     Push(String),
//! }
//!
//! struct TitleReducer;
//!
//! impl Reducer for TitleReducer {
//!     type State = TitleState;
//!     type Action = TitleAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut TitleState,
//!         action: TitleAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<TitleAction>; 4]> {
//!         match action {
//!             TitleAction::Push(title) => state.titles.push(title),
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let mut state = TitleState::default();
//! let effects = TitleReducer.reduce(&mut state, TitleAction::Push("Buy milk".into()), &());
//! assert!(effects.is_empty());
//! assert_eq!(state.titles, vec!["Buy milk".to_string()]);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Action module - naming support for reducer inputs
///
/// Actions are closed enums, one variant per kind of transition. The
/// [`Action`](action::Action) trait gives the runtime a stable, cheap name for
/// each variant so dispatches can be logged and counted without formatting
/// the whole payload. Derive it with `todolist_macros::Action`.
pub mod action {
    /// Stable naming for action variants
    pub trait Action {
        /// Name of the variant, e.g. `"ToggleLiked"`
        fn name(&self) -> &'static str;
    }
}

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
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
        /// 1. Matches the action against the current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// The store always hands the reducer a private copy of the current
        /// snapshot, so updating in place never affects snapshots that were
        /// already published.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values, not execution.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
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

        /// Wrap an async computation whose result (if any) is fed back to the store
        #[must_use]
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Returns true if executing this effect does nothing
        #[must_use]
        pub fn is_none(&self) -> bool {
            match self {
                Effect::None => true,
                Effect::Parallel(effects) => effects.iter().all(Effect::is_none),
                Effect::Future(_) => false,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Source of identifiers for newly created entities
    ///
    /// Ids handed out by one generator must be distinct for the lifetime of
    /// the generator. Nothing is promised across process restarts.
    pub trait IdGenerator: Send + Sync {
        /// The identifier type produced
        type Id;

        /// Produce the next identifier
        fn next_id(&self) -> Self::Id;
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, SystemClock};

    #[derive(Debug, PartialEq)]
    enum TestAction {
        Done,
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn effect_debug_hides_futures() {
        let effect = Effect::merge(vec![
            Effect::None,
            Effect::future(async { Some(TestAction::Done) }),
        ]);
        assert_eq!(
            format!("{effect:?}"),
            "Effect::Parallel([Effect::None, Effect::Future(<future>)])"
        );
    }

    #[test]
    fn effect_is_none() {
        assert!(Effect::<TestAction>::None.is_none());
        assert!(Effect::<TestAction>::merge(vec![Effect::None, Effect::None]).is_none());
        assert!(!Effect::future(async { None::<TestAction> }).is_none());
    }

    #[test]
    fn future_effect_yields_action() {
        let Effect::Future(fut) = Effect::future(async { Some(TestAction::Done) }) else {
            unreachable!("Effect::future always builds a Future variant");
        };
        assert_eq!(tokio_test::block_on(fut), Some(TestAction::Done));
    }
}
