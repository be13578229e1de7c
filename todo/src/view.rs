//! View session over a [`TodoStore`].
//!
//! The session owns the UI-local state the store does not care about: the
//! text typed into the "new todo" form and the one dialog that may be open
//! (edit title or confirm delete). It validates input, turns user intent
//! into [`TodoAction`]s and reads snapshots back for rendering. It never
//! touches [`TodoState`] directly.

use crate::types::{TodoAction, TodoId, TodoItem, TodoState};
use crate::TodoStore;
use std::fmt::Write as _;
use std::sync::Arc;
use thiserror::Error;
use todolist_runtime::StoreError;

/// Message shown when a blank title is submitted
pub const EMPTY_TITLE_MESSAGE: &str = "Please enter a value";

/// Errors raised by the View before anything reaches the store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// The submitted title was empty or whitespace only
    #[error("Please enter a value")]
    EmptyTitle,

    /// The submitted title exceeds the configured limit
    #[error("Title is {len} characters long, the limit is {max}")]
    TitleTooLong {
        /// Configured limit, in characters
        max: usize,
        /// Length of the rejected title, in characters
        len: usize,
    },

    /// No item with this id is in the current snapshot
    #[error("Todo with ID {0} not found")]
    NotFound(TodoId),

    /// No item is shown at this 1-based position
    #[error("There is no todo number {0}")]
    NoSuchPosition(usize),

    /// A dialog action was used while that dialog was not open
    #[error("No dialog is open")]
    NoDialogOpen,

    /// The store refused the action
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The dialog currently shown over the list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Dialog {
    /// Nothing open
    #[default]
    Closed,
    /// Editing the title of `id`; `value` is the text in the field
    EditTitle {
        /// Item being edited
        id: TodoId,
        /// Current field contents
        value: String,
    },
    /// Asking whether `id` should be deleted
    ConfirmDelete {
        /// Item to delete on confirmation
        id: TodoId,
    },
}

/// A user's session over a todo store
pub struct TodoSession {
    store: Arc<TodoStore>,
    draft: String,
    dialog: Dialog,
    max_title_len: usize,
}

impl TodoSession {
    /// Creates a session over `store`, accepting titles up to `max_title_len` characters
    #[must_use]
    pub fn new(store: Arc<TodoStore>, max_title_len: usize) -> Self {
        Self {
            store,
            draft: String::new(),
            dialog: Dialog::Closed,
            max_title_len,
        }
    }

    /// The store this session dispatches to
    #[must_use]
    pub fn store(&self) -> &Arc<TodoStore> {
        &self.store
    }

    /// Latest snapshot of the list
    #[must_use]
    pub fn snapshot(&self) -> Arc<TodoState> {
        self.store.snapshot()
    }

    /// Text currently in the new-todo form
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// The open dialog, if any
    #[must_use]
    pub const fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    /// Replaces the text in the new-todo form
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Adds the draft as a new item and clears the form
    ///
    /// The title is stored exactly as typed. On error the draft is kept.
    ///
    /// # Errors
    ///
    /// - [`ViewError::EmptyTitle`] or [`ViewError::TitleTooLong`] if the draft is rejected
    /// - [`ViewError::Store`] if the store is shutting down
    pub async fn submit_draft(&mut self) -> Result<TodoId, ViewError> {
        self.validate(&self.draft)?;

        let id = self.store.environment().next_id();
        self.store
            .send(TodoAction::Add {
                id,
                title: self.draft.clone(),
            })
            .await?;
        self.draft.clear();

        tracing::debug!(%id, "Submitted new todo");
        Ok(id)
    }

    /// Flips the liked flag of `id`
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Store`] if the store is shutting down.
    pub async fn toggle_liked(&self, id: TodoId) -> Result<(), ViewError> {
        self.store.send(TodoAction::ToggleLiked { id }).await?;
        Ok(())
    }

    /// Flips the saved flag of `id`
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Store`] if the store is shutting down.
    pub async fn toggle_saved(&self, id: TodoId) -> Result<(), ViewError> {
        self.store.send(TodoAction::ToggleSaved { id }).await?;
        Ok(())
    }

    /// Opens the edit dialog for `id`, pre-filled with its current title
    ///
    /// Replaces any dialog that was open.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NotFound`] if `id` is not in the current snapshot.
    pub fn begin_edit(&mut self, id: TodoId) -> Result<(), ViewError> {
        let snapshot = self.store.snapshot();
        let todo = snapshot.get(&id).ok_or(ViewError::NotFound(id))?;

        self.dialog = Dialog::EditTitle {
            id,
            value: todo.title.clone(),
        };
        Ok(())
    }

    /// Replaces the text in the edit dialog
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NoDialogOpen`] if the edit dialog is not open.
    pub fn set_edit_value(&mut self, text: impl Into<String>) -> Result<(), ViewError> {
        match &mut self.dialog {
            Dialog::EditTitle { value, .. } => {
                *value = text.into();
                Ok(())
            },
            _ => Err(ViewError::NoDialogOpen),
        }
    }

    /// Renames the item bound to the edit dialog and closes the dialog
    ///
    /// On a validation error the dialog stays open with its text.
    ///
    /// # Errors
    ///
    /// - [`ViewError::NoDialogOpen`] if the edit dialog is not open
    /// - [`ViewError::EmptyTitle`] or [`ViewError::TitleTooLong`] if the text is rejected
    /// - [`ViewError::Store`] if the store is shutting down
    pub async fn submit_edit(&mut self) -> Result<(), ViewError> {
        let Dialog::EditTitle { value, .. } = &self.dialog else {
            return Err(ViewError::NoDialogOpen);
        };
        self.validate(value)?;

        let Dialog::EditTitle { id, value } = std::mem::take(&mut self.dialog) else {
            return Err(ViewError::NoDialogOpen);
        };
        self.store
            .send(TodoAction::UpdateTitle { id, title: value })
            .await?;
        Ok(())
    }

    /// Closes the edit dialog without renaming anything
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NoDialogOpen`] if the edit dialog is not open.
    pub fn cancel_edit(&mut self) -> Result<(), ViewError> {
        match self.dialog {
            Dialog::EditTitle { .. } => {
                self.dialog = Dialog::Closed;
                Ok(())
            },
            _ => Err(ViewError::NoDialogOpen),
        }
    }

    /// Opens the delete confirmation for `id`
    ///
    /// Replaces any dialog that was open.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NotFound`] if `id` is not in the current snapshot.
    pub fn request_delete(&mut self, id: TodoId) -> Result<(), ViewError> {
        if !self.store.snapshot().exists(&id) {
            return Err(ViewError::NotFound(id));
        }
        self.dialog = Dialog::ConfirmDelete { id };
        Ok(())
    }

    /// Deletes the item bound to the confirmation and closes it
    ///
    /// # Errors
    ///
    /// - [`ViewError::NoDialogOpen`] if the confirmation is not open
    /// - [`ViewError::Store`] if the store is shutting down
    pub async fn confirm_delete(&mut self) -> Result<(), ViewError> {
        let Dialog::ConfirmDelete { id } = self.dialog else {
            return Err(ViewError::NoDialogOpen);
        };
        self.dialog = Dialog::Closed;
        self.store.send(TodoAction::Delete { id }).await?;
        Ok(())
    }

    /// Closes the delete confirmation without deleting
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NoDialogOpen`] if the confirmation is not open.
    pub fn cancel_delete(&mut self) -> Result<(), ViewError> {
        match self.dialog {
            Dialog::ConfirmDelete { .. } => {
                self.dialog = Dialog::Closed;
                Ok(())
            },
            _ => Err(ViewError::NoDialogOpen),
        }
    }

    /// Id of the item shown at 1-based `position`
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NoSuchPosition`] if nothing is shown there.
    pub fn id_at(&self, position: usize) -> Result<TodoId, ViewError> {
        position
            .checked_sub(1)
            .and_then(|index| self.store.snapshot().todos().get(index).map(|todo| todo.id))
            .ok_or(ViewError::NoSuchPosition(position))
    }

    fn validate(&self, title: &str) -> Result<(), ViewError> {
        if title.trim().is_empty() {
            return Err(ViewError::EmptyTitle);
        }

        let len = title.chars().count();
        if len > self.max_title_len {
            return Err(ViewError::TitleTooLong {
                max: self.max_title_len,
                len,
            });
        }

        Ok(())
    }
}

impl std::fmt::Debug for TodoSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoSession")
            .field("draft", &self.draft)
            .field("dialog", &self.dialog)
            .field("max_title_len", &self.max_title_len)
            .finish_non_exhaustive()
    }
}

/// Renders the whole list, numbered from 1
#[must_use]
pub fn render_list(state: &TodoState) -> String {
    render_items(state.todos(), "No todos")
}

/// Renders one of the derived views under a heading
#[must_use]
pub fn render_collection(heading: &str, items: &[TodoItem]) -> String {
    format!("{heading} ({})\n{}", items.len(), render_items(items, "Nothing here yet"))
}

fn render_items(items: &[TodoItem], empty: &str) -> String {
    if items.is_empty() {
        return format!("  {empty}\n");
    }

    items.iter().enumerate().fold(String::new(), |mut out, (index, todo)| {
        let heart = if todo.is_liked { '♥' } else { '♡' };
        let saved = if todo.is_saved { " [saved]" } else { "" };
        let _ = writeln!(out, "{:>3}. {heart} {}{saved}", index + 1, todo.title);
        out
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::reducer::{TodoEnvironment, TodoReducer};
    use todolist_runtime::Store;
    use todolist_testing::SequentialIdGenerator;

    fn session() -> TodoSession {
        let env = TodoEnvironment::new(Arc::new(SequentialIdGenerator::new()));
        let store = Store::new(TodoState::new(), TodoReducer::new(), env);
        TodoSession::new(Arc::new(store), 10)
    }

    async fn add(session: &mut TodoSession, title: &str) -> TodoId {
        session.set_draft(title);
        session.submit_draft().await.unwrap()
    }

    #[tokio::test]
    async fn submit_draft_adds_and_clears() {
        let mut session = session();
        session.set_draft("  Buy milk ");

        let id = session.submit_draft().await.unwrap();

        assert_eq!(id, TodoId::new(1));
        assert_eq!(session.draft(), "");
        assert_eq!(session.snapshot().get(&id).unwrap().title, "  Buy milk ");
    }

    #[tokio::test]
    async fn blank_draft_is_rejected_without_dispatch() {
        let mut session = session();
        session.set_draft("   ");

        assert_eq!(session.submit_draft().await, Err(ViewError::EmptyTitle));
        assert_eq!(session.store().version(), 0);
        assert_eq!(session.draft(), "   ");
        assert_eq!(ViewError::EmptyTitle.to_string(), EMPTY_TITLE_MESSAGE);
    }

    #[tokio::test]
    async fn long_draft_is_rejected() {
        let mut session = session();
        session.set_draft("ééééééééééé");

        assert_eq!(
            session.submit_draft().await,
            Err(ViewError::TitleTooLong { max: 10, len: 11 })
        );
        assert!(session.snapshot().is_empty());
    }

    #[tokio::test]
    async fn edit_dialog_renames_bound_item() {
        let mut session = session();
        let first = add(&mut session, "A").await;
        let second = add(&mut session, "B").await;

        session.begin_edit(second).unwrap();
        assert_eq!(session.dialog(), &Dialog::EditTitle {
            id: second,
            value: "B".to_string()
        });

        session.set_edit_value("Buy bread").unwrap();
        session.submit_edit().await.unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.get(&first).unwrap().title, "A");
        assert_eq!(snapshot.get(&second).unwrap().title, "Buy bread");
        assert_eq!(session.dialog(), &Dialog::Closed);
    }

    #[tokio::test]
    async fn blank_edit_keeps_dialog_open() {
        let mut session = session();
        let id = add(&mut session, "A").await;
        session.begin_edit(id).unwrap();
        session.set_edit_value(" ").unwrap();

        assert_eq!(session.submit_edit().await, Err(ViewError::EmptyTitle));
        assert!(matches!(session.dialog(), Dialog::EditTitle { .. }));
        assert_eq!(session.snapshot().get(&id).unwrap().title, "A");
    }

    #[tokio::test]
    async fn cancel_paths_dispatch_nothing() {
        let mut session = session();
        let id = add(&mut session, "A").await;
        let version = session.store().version();

        session.begin_edit(id).unwrap();
        session.set_edit_value("changed").unwrap();
        session.cancel_edit().unwrap();

        session.request_delete(id).unwrap();
        session.cancel_delete().unwrap();

        assert_eq!(session.store().version(), version);
        assert_eq!(session.snapshot().get(&id).unwrap().title, "A");
        assert_eq!(session.dialog(), &Dialog::Closed);
    }

    #[tokio::test]
    async fn delete_confirmation_is_bound_to_chosen_item() {
        let mut session = session();
        let first = add(&mut session, "A").await;
        let second = add(&mut session, "B").await;

        session.request_delete(first).unwrap();
        session.confirm_delete().await.unwrap();

        let snapshot = session.snapshot();
        assert!(!snapshot.exists(&first));
        assert!(snapshot.exists(&second));
    }

    #[tokio::test]
    async fn dialog_actions_need_matching_dialog() {
        let mut session = session();
        let id = add(&mut session, "A").await;

        assert_eq!(session.submit_edit().await, Err(ViewError::NoDialogOpen));
        assert_eq!(session.confirm_delete().await, Err(ViewError::NoDialogOpen));
        assert_eq!(session.set_edit_value("x"), Err(ViewError::NoDialogOpen));

        session.request_delete(id).unwrap();
        assert_eq!(session.cancel_edit(), Err(ViewError::NoDialogOpen));
        assert_eq!(session.submit_edit().await, Err(ViewError::NoDialogOpen));
    }

    #[tokio::test]
    async fn unknown_ids_and_positions() {
        let mut session = session();
        let id = add(&mut session, "A").await;
        let missing = TodoId::new(42);

        assert_eq!(session.begin_edit(missing), Err(ViewError::NotFound(missing)));
        assert_eq!(session.request_delete(missing), Err(ViewError::NotFound(missing)));
        assert_eq!(session.id_at(1), Ok(id));
        assert_eq!(session.id_at(0), Err(ViewError::NoSuchPosition(0)));
        assert_eq!(session.id_at(2), Err(ViewError::NoSuchPosition(2)));
    }

    #[tokio::test]
    async fn toggles_reach_the_store() {
        let mut session = session();
        let id = add(&mut session, "A").await;

        session.toggle_liked(id).await.unwrap();
        session.toggle_saved(id).await.unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.liked().len(), 1);
        assert_eq!(snapshot.saved().len(), 1);
    }

    #[test]
    fn render_markers() {
        let mut liked = TodoItem::new(TodoId::new(1), "Buy milk".to_string());
        liked.is_liked = true;
        let mut saved = TodoItem::new(TodoId::new(2), "Walk dog".to_string());
        saved.is_saved = true;
        let state = TodoState::from_items(vec![liked, saved]).unwrap();

        assert_eq!(
            render_list(&state),
            "  1. ♥ Buy milk\n  2. ♡ Walk dog [saved]\n"
        );
        assert_eq!(
            render_collection("Saved", state.saved()),
            "Saved (1)\n  1. ♡ Walk dog [saved]\n"
        );
    }

    #[test]
    fn render_empty() {
        assert_eq!(render_list(&TodoState::new()), "  No todos\n");
        assert_eq!(render_collection("Liked", &[]), "Liked (0)\n  Nothing here yet\n");
    }
}
