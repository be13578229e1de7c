//! Domain types for the todo list.
//!
//! A todo list is an ordered collection of items plus two derived views:
//! the items the user liked and the items the user saved. The views are
//! never edited directly; every mutation of the collection re-derives them.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use todolist_macros::Action;

/// Unique identifier for a todo item
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Creates a `TodoId` from its raw value
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for TodoId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// Text entered by the user
    pub title: String,
    /// Whether the user liked the item
    pub is_liked: bool,
    /// Whether the user saved the item
    pub is_saved: bool,
}

impl TodoItem {
    /// Creates a new todo item, neither liked nor saved
    #[must_use]
    pub const fn new(id: TodoId, title: String) -> Self {
        Self {
            id,
            title,
            is_liked: false,
            is_saved: false,
        }
    }
}

/// Errors raised by the strict transition path and by state construction
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// No item with this id exists
    #[error("Todo with ID {0} not found")]
    NotFound(TodoId),

    /// An item with this id already exists
    #[error("Todo with ID {0} already exists")]
    DuplicateId(TodoId),

    /// The action tag was not recognised
    #[error("Unknown action")]
    UnknownAction,
}

/// State of the todo list
///
/// `todos` is the single source of truth. `liked` and `saved` always hold
/// exactly the items of `todos` whose flag is set, in `todos` order, so a
/// renamed item shows its new title in every view.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTodoState")]
pub struct TodoState {
    todos: Vec<TodoItem>,
    liked: Vec<TodoItem>,
    saved: Vec<TodoItem>,
}

/// Wire form accepted when deserializing; the views are re-derived
#[derive(Deserialize)]
struct RawTodoState {
    todos: Vec<TodoItem>,
}

impl TryFrom<RawTodoState> for TodoState {
    type Error = TodoError;

    fn try_from(raw: RawTodoState) -> Result<Self, Self::Error> {
        Self::from_items(raw.todos)
    }
}

impl TodoState {
    /// Creates a new empty todo state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            todos: Vec::new(),
            liked: Vec::new(),
            saved: Vec::new(),
        }
    }

    /// Builds a state from existing items, keeping their order
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::DuplicateId`] if two items share an id.
    pub fn from_items(items: Vec<TodoItem>) -> Result<Self, TodoError> {
        let mut seen = std::collections::HashSet::with_capacity(items.len());
        if let Some(item) = items.iter().find(|item| !seen.insert(item.id)) {
            return Err(TodoError::DuplicateId(item.id));
        }

        let mut state = Self {
            todos: items,
            ..Self::new()
        };
        state.rederive();
        Ok(state)
    }

    /// All items, in insertion order
    #[must_use]
    pub fn todos(&self) -> &[TodoItem] {
        &self.todos
    }

    /// Items whose `is_liked` flag is set
    #[must_use]
    pub fn liked(&self) -> &[TodoItem] {
        &self.liked
    }

    /// Items whose `is_saved` flag is set
    #[must_use]
    pub fn saved(&self) -> &[TodoItem] {
        &self.saved
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Returns true if there are no todos
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|todo| todo.id == *id)
    }

    /// Zero-based position of a todo in the list
    #[must_use]
    pub fn position(&self, id: &TodoId) -> Option<usize> {
        self.todos.iter().position(|todo| todo.id == *id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: &TodoId) -> bool {
        self.position(id).is_some()
    }

    /// Appends an item. The caller guarantees the id is not taken.
    pub(crate) fn push(&mut self, item: TodoItem) {
        self.todos.push(item);
        self.rederive();
    }

    /// Flips `is_liked`; returns false if the id is unknown
    pub(crate) fn toggle_liked(&mut self, id: &TodoId) -> bool {
        self.modify(id, |todo| todo.is_liked = !todo.is_liked)
    }

    /// Flips `is_saved`; returns false if the id is unknown
    pub(crate) fn toggle_saved(&mut self, id: &TodoId) -> bool {
        self.modify(id, |todo| todo.is_saved = !todo.is_saved)
    }

    /// Replaces the title; returns false if the id is unknown
    pub(crate) fn set_title(&mut self, id: &TodoId, title: String) -> bool {
        self.modify(id, |todo| todo.title = title)
    }

    /// Removes the item from every collection; returns false if the id is unknown
    pub(crate) fn remove(&mut self, id: &TodoId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.todos.remove(index);
        self.rederive();
        true
    }

    fn modify(&mut self, id: &TodoId, change: impl FnOnce(&mut TodoItem)) -> bool {
        let Some(todo) = self.todos.iter_mut().find(|todo| todo.id == *id) else {
            return false;
        };
        change(todo);
        self.rederive();
        true
    }

    /// Rebuilds both views from the rewritten `todos`
    fn rederive(&mut self) {
        self.liked = self.todos.iter().filter(|todo| todo.is_liked).cloned().collect();
        self.saved = self.todos.iter().filter(|todo| todo.is_saved).cloned().collect();
    }
}

/// Actions the todo list understands
///
/// On the wire an action is an object with a `type` tag and a `payload`,
/// e.g. `{"type": "LIKED_ITEM", "payload": 1}`. See the `wire` module for
/// the accepted payload shapes. Any unrecognised tag becomes
/// [`TodoAction::Unknown`], which leaves the state unchanged.
#[derive(Action, Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    /// Append a new item
    Add {
        /// Identifier chosen by the caller
        id: TodoId,
        /// Title of the item
        title: String,
    },

    /// Flip the liked flag of an item
    ToggleLiked {
        /// Item to toggle
        id: TodoId,
    },

    /// Flip the saved flag of an item
    ToggleSaved {
        /// Item to toggle
        id: TodoId,
    },

    /// Replace the title of an item
    UpdateTitle {
        /// Item to rename
        id: TodoId,
        /// New title
        title: String,
    },

    /// Remove an item from the list and from both views
    Delete {
        /// Item to remove
        id: TodoId,
    },

    /// Any action this list does not handle
    Unknown,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use todolist_core::action::Action as _;

    fn item(raw: u64, title: &str) -> TodoItem {
        TodoItem::new(TodoId::new(raw), title.to_string())
    }

    #[test]
    fn todo_id_display() {
        assert_eq!(TodoId::new(1_700_000_000_000).to_string(), "1700000000000");
    }

    #[test]
    fn todo_item_new() {
        let item = item(1, "Test todo");

        assert_eq!(item.id, TodoId::new(1));
        assert_eq!(item.title, "Test todo");
        assert!(!item.is_liked);
        assert!(!item.is_saved);
    }

    #[test]
    fn from_items_rejects_duplicate_ids() {
        let result = TodoState::from_items(vec![item(1, "A"), item(2, "B"), item(1, "C")]);
        assert_eq!(result, Err(TodoError::DuplicateId(TodoId::new(1))));
    }

    #[test]
    fn from_items_derives_views() {
        let mut liked = item(1, "A");
        liked.is_liked = true;
        let mut both = item(2, "B");
        both.is_liked = true;
        both.is_saved = true;

        let state = TodoState::from_items(vec![liked, item(3, "C"), both]).unwrap();

        let liked_titles: Vec<_> = state.liked().iter().map(|t| t.title.as_str()).collect();
        let saved_titles: Vec<_> = state.saved().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(liked_titles, ["A", "B"]);
        assert_eq!(saved_titles, ["B"]);
    }

    #[test]
    fn renamed_item_is_fresh_in_views() {
        let mut state = TodoState::new();
        state.push(item(1, "Old"));
        assert!(state.toggle_liked(&TodoId::new(1)));
        assert!(state.set_title(&TodoId::new(1), "New".to_string()));

        assert_eq!(state.liked()[0].title, "New");
    }

    #[test]
    fn mutators_report_unknown_ids() {
        let mut state = TodoState::new();
        let missing = TodoId::new(9);

        assert!(!state.toggle_liked(&missing));
        assert!(!state.toggle_saved(&missing));
        assert!(!state.set_title(&missing, "x".to_string()));
        assert!(!state.remove(&missing));
        assert_eq!(state, TodoState::new());
    }

    #[test]
    fn snapshot_serializes_with_views() {
        let mut state = TodoState::new();
        state.push(item(7, "Buy milk"));
        state.toggle_saved(&TodoId::new(7));

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "todos": [{"id": 7, "title": "Buy milk", "isLiked": false, "isSaved": true}],
                "liked": [],
                "saved": [{"id": 7, "title": "Buy milk", "isLiked": false, "isSaved": true}],
            })
        );
    }

    #[test]
    fn deserializing_ignores_stale_views() {
        let json = serde_json::json!({
            "todos": [{"id": 1, "title": "A", "isLiked": true, "isSaved": false}],
            "liked": [],
            "saved": [{"id": 99, "title": "ghost", "isLiked": false, "isSaved": true}],
        });

        let state: TodoState = serde_json::from_value(json).unwrap();
        assert_eq!(state.liked().len(), 1);
        assert!(state.saved().is_empty());
    }

    #[test]
    fn unknown_tag_becomes_unknown_action() {
        for raw in [
            r#"{"type": "RESET_ALL"}"#,
            r#"{"type": "CLEAR_ALL", "payload": {"id": 1}}"#,
            r#"{"type": "CLEAR_ALL", "payload": 5}"#,
        ] {
            let action: TodoAction = serde_json::from_str(raw).unwrap();
            assert_eq!(action, TodoAction::Unknown);
        }
    }

    #[test]
    fn action_names() {
        assert_eq!(TodoAction::Unknown.name(), "Unknown");
        assert_eq!(
            TodoAction::UpdateTitle {
                id: TodoId::new(1),
                title: String::new()
            }
            .name(),
            "UpdateTitle"
        );
    }
}
