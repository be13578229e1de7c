//! Reducer logic for the todo list.
//!
//! Every action maps onto exactly one transition of [`TodoState`]. Actions
//! that name an unknown id leave the state untouched; [`TodoReducer::try_reduce`]
//! offers the same transitions with those misses reported as errors.
//!
//! Transitions are pure and return no effects.

use crate::ids::ClockIdGenerator;
use crate::types::{TodoAction, TodoError, TodoId, TodoItem, TodoState};
use std::sync::Arc;
use todolist_core::{
    effect::Effect,
    environment::{IdGenerator, SystemClock},
    reducer::Reducer,
    SmallVec,
};

/// Environment dependencies for the todo list
///
/// The reducer itself needs nothing from the outside world; the id source
/// lives here so the View can mint ids for new items from the same store.
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Source of ids for items created through the View
    pub ids: Arc<dyn IdGenerator<Id = TodoId>>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator<Id = TodoId>>) -> Self {
        Self { ids }
    }

    /// Environment backed by the system clock
    #[must_use]
    pub fn system() -> Self {
        Self::new(Arc::new(ClockIdGenerator::new(Arc::new(SystemClock))))
    }

    /// Next id for a new item
    #[must_use]
    pub fn next_id(&self) -> TodoId {
        self.ids.next_id()
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for the todo list
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies `action` to a copy of `state`, reporting lookup misses
    ///
    /// # Errors
    ///
    /// - [`TodoError::NotFound`] when a toggle, update or delete names an unknown id
    /// - [`TodoError::DuplicateId`] when an add reuses an existing id
    /// - [`TodoError::UnknownAction`] for [`TodoAction::Unknown`]
    ///
    /// On error `state` is untouched and nothing is returned.
    pub fn try_reduce(state: &TodoState, action: TodoAction) -> Result<TodoState, TodoError> {
        let mut next = state.clone();
        Self::apply(&mut next, action)?;
        Ok(next)
    }

    /// Applies one transition in place; on error nothing was changed
    fn apply(state: &mut TodoState, action: TodoAction) -> Result<(), TodoError> {
        match action {
            TodoAction::Add { id, title } => {
                if state.exists(&id) {
                    return Err(TodoError::DuplicateId(id));
                }
                state.push(TodoItem::new(id, title));
                Ok(())
            },
            TodoAction::ToggleLiked { id } => found(state.toggle_liked(&id), id),
            TodoAction::ToggleSaved { id } => found(state.toggle_saved(&id), id),
            TodoAction::UpdateTitle { id, title } => found(state.set_title(&id, title), id),
            TodoAction::Delete { id } => found(state.remove(&id), id),
            TodoAction::Unknown => Err(TodoError::UnknownAction),
        }
    }
}

const fn found(hit: bool, id: TodoId) -> Result<(), TodoError> {
    if hit { Ok(()) } else { Err(TodoError::NotFound(id)) }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if let Err(error) = Self::apply(state, action) {
            // Misses are not errors for the list; the state stays as it was.
            tracing::debug!(%error, "Action left the todo list unchanged");
        }

        SmallVec::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use todolist_testing::{assertions, ReducerTest, SequentialIdGenerator};

    fn create_test_env() -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(SequentialIdGenerator::new()))
    }

    fn id(raw: u64) -> TodoId {
        TodoId::new(raw)
    }

    fn add(raw: u64, title: &str) -> TodoAction {
        TodoAction::Add {
            id: id(raw),
            title: title.to_string(),
        }
    }

    fn titles(items: &[TodoItem]) -> Vec<&str> {
        items.iter().map(|t| t.title.as_str()).collect()
    }

    fn state_with(actions: Vec<TodoAction>) -> TodoState {
        let mut state = TodoState::new();
        for action in actions {
            TodoReducer::new().reduce(&mut state, action, &create_test_env());
        }
        state
    }

    #[test]
    fn test_add_todo() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(add(1, "Buy milk"))
            .then_state(|state| {
                assert_eq!(state.count(), 1);
                let todo = state.get(&id(1)).unwrap();
                assert_eq!(todo.title, "Buy milk");
                assert!(!todo.is_liked);
                assert!(!todo.is_saved);
                assert!(state.liked().is_empty());
                assert!(state.saved().is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_actions([add(2, "B"), add(1, "A"), add(3, "C")])
            .then_state(|state| {
                assert_eq!(titles(state.todos()), ["B", "A", "C"]);
            })
            .run();
    }

    #[test]
    fn test_add_duplicate_id_is_noop() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![add(1, "Existing")]))
            .when_action(add(1, "Duplicate"))
            .then_unchanged()
            .run();
    }

    #[test]
    fn test_toggle_liked_adds_to_liked_view() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![add(1, "A"), add(2, "B")]))
            .when_action(TodoAction::ToggleLiked { id: id(1) })
            .then_state(|state| {
                assert!(state.get(&id(1)).unwrap().is_liked);
                assert!(!state.get(&id(2)).unwrap().is_liked);
                assert_eq!(titles(state.liked()), ["A"]);
                assert!(state.saved().is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_toggle_liked_twice_restores_item() {
        let initial = state_with(vec![add(1, "A")]);

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(initial)
            .when_actions([
                TodoAction::ToggleLiked { id: id(1) },
                TodoAction::ToggleLiked { id: id(1) },
            ])
            .then_unchanged()
            .run();
    }

    #[test]
    fn test_toggle_saved_is_independent_of_liked() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![add(1, "A"), TodoAction::ToggleLiked { id: id(1) }]))
            .when_action(TodoAction::ToggleSaved { id: id(1) })
            .then_state(|state| {
                let todo = state.get(&id(1)).unwrap();
                assert!(todo.is_liked);
                assert!(todo.is_saved);
                assert_eq!(titles(state.liked()), ["A"]);
                assert_eq!(titles(state.saved()), ["A"]);
            })
            .run();
    }

    #[test]
    fn test_update_title_keeps_membership() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![
                add(1, "A"),
                add(2, "B"),
                TodoAction::ToggleSaved { id: id(2) },
            ]))
            .when_action(TodoAction::UpdateTitle {
                id: id(2),
                title: "Buy bread".to_string(),
            })
            .then_state(|state| {
                assert_eq!(titles(state.todos()), ["A", "Buy bread"]);
                assert!(state.liked().is_empty());
                assert_eq!(titles(state.saved()), ["Buy bread"]);
                assert!(state.get(&id(2)).unwrap().is_saved);
            })
            .run();
    }

    #[test]
    fn test_delete_purges_everywhere() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_with(vec![
                add(1, "A"),
                TodoAction::ToggleLiked { id: id(1) },
                TodoAction::ToggleSaved { id: id(1) },
            ]))
            .when_action(TodoAction::Delete { id: id(1) })
            .then_state(|state| {
                assert!(state.is_empty());
                assert!(state.liked().is_empty());
                assert!(state.saved().is_empty());
            })
            .run();
    }

    #[test]
    fn test_unknown_id_is_noop_for_every_lookup() {
        let initial = state_with(vec![add(1, "A"), TodoAction::ToggleLiked { id: id(1) }]);

        for action in [
            TodoAction::ToggleLiked { id: id(9) },
            TodoAction::ToggleSaved { id: id(9) },
            TodoAction::UpdateTitle {
                id: id(9),
                title: "x".to_string(),
            },
            TodoAction::Delete { id: id(9) },
            TodoAction::Unknown,
        ] {
            ReducerTest::new(TodoReducer::new())
                .with_env(create_test_env())
                .given_state(initial.clone())
                .when_action(action)
                .then_unchanged()
                .then_effects(assertions::assert_no_effects)
                .run();
        }
    }

    #[test]
    fn test_scenario_like_save_delete() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_actions([
                add(1, "A"),
                add(2, "B"),
                TodoAction::ToggleLiked { id: id(1) },
                TodoAction::ToggleSaved { id: id(2) },
                TodoAction::Delete { id: id(1) },
            ])
            .then_state(|state| {
                assert_eq!(state.todos(), [TodoItem {
                    id: id(2),
                    title: "B".to_string(),
                    is_liked: false,
                    is_saved: true,
                }]);
                assert!(state.liked().is_empty());
                assert_eq!(titles(state.saved()), ["B"]);
            })
            .run();
    }

    #[test]
    fn test_try_reduce_reports_misses() {
        let state = state_with(vec![add(1, "A")]);

        assert_eq!(
            TodoReducer::try_reduce(&state, TodoAction::Delete { id: id(5) }),
            Err(TodoError::NotFound(id(5)))
        );
        assert_eq!(
            TodoReducer::try_reduce(&state, add(1, "again")),
            Err(TodoError::DuplicateId(id(1)))
        );
        assert_eq!(
            TodoReducer::try_reduce(&state, TodoAction::Unknown),
            Err(TodoError::UnknownAction)
        );
    }

    #[test]
    fn test_try_reduce_leaves_input_untouched() {
        let state = state_with(vec![add(1, "A")]);

        let next = TodoReducer::try_reduce(&state, TodoAction::ToggleSaved { id: id(1) }).unwrap();

        assert!(!state.get(&id(1)).unwrap().is_saved);
        assert!(next.get(&id(1)).unwrap().is_saved);
    }

    #[test]
    fn test_environment_mints_sequential_ids() {
        let env = create_test_env();
        assert_eq!(env.next_id(), id(1));
        assert_eq!(env.next_id(), id(2));
    }
}
