//! Todo list with liked and saved views.
//!
//! The list is a single [`TodoState`] owned by a [`TodoStore`]. Every change
//! goes through a [`TodoAction`]: the View sends it, the [`TodoReducer`]
//! computes the next state, and the store publishes the new snapshot. The
//! `liked` and `saved` views are re-derived from the list on every transition,
//! so they always hold exactly the items whose flag is set.
//!
//! # Quick Start
//!
//! ```no_run
//! use todolist::{TodoAction, TodoEnvironment, TodoReducer, TodoState, TodoStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = TodoEnvironment::system();
//! let store = TodoStore::new(TodoState::new(), TodoReducer::new(), env);
//!
//! let id = store.environment().next_id();
//! store.send(TodoAction::Add { id, title: "Buy milk".to_string() }).await?;
//! store.send(TodoAction::ToggleLiked { id }).await?;
//!
//! let snapshot = store.snapshot();
//! assert_eq!(snapshot.liked().len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! Without a store, [`reduce`] applies one transition to a borrowed state:
//!
//! ```
//! use todolist::{reduce, TodoAction, TodoId, TodoState};
//!
//! let id = TodoId::new(1);
//! let state = reduce(&TodoState::new(), TodoAction::Add { id, title: "A".into() });
//! let state = reduce(&state, TodoAction::ToggleSaved { id });
//!
//! assert_eq!(state.saved()[0].title, "A");
//! assert!(state.liked().is_empty());
//! ```

pub mod cli;
pub mod config;
pub mod ids;
pub mod reducer;
pub mod types;
pub mod view;
mod wire;

use todolist_runtime::Store;

// Re-export commonly used types
pub use config::TodoConfig;
pub use ids::ClockIdGenerator;
pub use reducer::{TodoEnvironment, TodoReducer};
pub use types::{TodoAction, TodoError, TodoId, TodoItem, TodoState};
pub use view::{TodoSession, ViewError};

/// Store specialised for the todo list
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Applies one action to `state` and returns the next state
///
/// `state` itself is never modified. Unknown ids and unrecognised actions
/// yield a state equal to the input.
#[must_use]
pub fn reduce(state: &TodoState, action: TodoAction) -> TodoState {
    TodoReducer::try_reduce(state, action).unwrap_or_else(|error| {
        tracing::debug!(%error, "Action left the todo list unchanged");
        state.clone()
    })
}
