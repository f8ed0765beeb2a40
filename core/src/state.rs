//! Client-side state of the todo list and its pure transition function.
//!
//! # Overview
//! `TodoState` owns the authoritative collection, the pending (unpersisted)
//! todo, the draft title, the filter, the error banner, the edit session and
//! the set of busy ids. `TodoState::reduce` applies one `Action` and returns
//! the `Effect`s the caller has to run. Results of those effects come back as
//! further actions.
//!
//! # Design
//! - The collection only changes when a result action reports success; a
//!   failed call leaves it as it was and raises an error instead.
//! - An id with a mutation in flight is busy; further mutations for it are
//!   ignored until the first one settles.
//! - `ToggleAll` commits all of its updates at once or none of them.
//!   `ClearCompleted` keeps every deletion that succeeded.

use std::collections::BTreeSet;

use crate::banner::{BannerToken, ErrorBanner};
use crate::error::{ApiError, ErrorKind};
use crate::filter;
use crate::types::{EscapeBehavior, FilterMode, Todo, TodoId};

/// The todo currently in edit mode and the text typed so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: TodoId,
    pub buffer: String,
}

/// Everything a front end can ask for, plus the results of effects.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Fetch the collection; dispatched once on mount.
    Load,
    Loaded(Result<Vec<Todo>, ApiError>),

    /// New-todo field changed.
    SetDraft(String),
    /// New-todo form submitted.
    Add,
    Added(Result<Todo, ApiError>),

    Delete(TodoId),
    Deleted {
        id: TodoId,
        result: Result<(), ApiError>,
    },

    ToggleStatus {
        id: TodoId,
        completed: bool,
    },
    StatusUpdated {
        id: TodoId,
        completed: bool,
        result: Result<(), ApiError>,
    },

    /// Title double-clicked. Ignored while the todo has a call in flight.
    StartEdit(TodoId),
    EditInput(String),
    /// Saves the edit buffer. A rename that cannot be claimed leaves the
    /// row in edit mode.
    SubmitEdit,
    BlurEdit,
    /// Escape pressed in the edit field.
    CancelEdit,
    UpdateTitle {
        id: TodoId,
        title: String,
    },
    TitleUpdated {
        id: TodoId,
        title: String,
        result: Result<(), ApiError>,
    },
    /// Result of deleting a todo whose title was edited down to nothing.
    TitleDeleted {
        id: TodoId,
        result: Result<(), ApiError>,
    },

    ToggleAll,
    ToggleAllDone {
        ids: Vec<TodoId>,
        completed: bool,
        result: Result<(), ApiError>,
    },

    ClearCompleted,
    ClearCompletedDone {
        results: Vec<(TodoId, Result<(), ApiError>)>,
    },

    SetFilter(FilterMode),
    DismissError,
    ErrorExpired(BannerToken),
}

/// Calls against the API. Each one reports back with the action named in
/// its doc line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// -> `Loaded`
    Fetch,
    /// -> `Added`
    Create { title: String },
    /// -> `Deleted`
    Delete { id: TodoId },
    /// -> `StatusUpdated`
    SetCompleted { id: TodoId, completed: bool },
    /// -> `TitleUpdated`
    Rename { id: TodoId, title: String },
    /// -> `TitleDeleted`
    DeleteEmptied { id: TodoId },
    /// -> `ToggleAllDone`
    SetCompletedMany { ids: Vec<TodoId>, completed: bool },
    /// -> `ClearCompletedDone`
    DeleteMany { ids: Vec<TodoId> },
}

impl Request {
    /// The result action for this request when it could not run at all.
    pub fn failed(self, error: ApiError) -> Action {
        match self {
            Request::Fetch => Action::Loaded(Err(error)),
            Request::Create { .. } => Action::Added(Err(error)),
            Request::Delete { id } => Action::Deleted { id, result: Err(error) },
            Request::SetCompleted { id, completed } => Action::StatusUpdated {
                id,
                completed,
                result: Err(error),
            },
            Request::Rename { id, title } => Action::TitleUpdated {
                id,
                title,
                result: Err(error),
            },
            Request::DeleteEmptied { id } => Action::TitleDeleted { id, result: Err(error) },
            Request::SetCompletedMany { ids, completed } => Action::ToggleAllDone {
                ids,
                completed,
                result: Err(error),
            },
            Request::DeleteMany { ids } => Action::ClearCompletedDone {
                results: ids.into_iter().map(|id| (id, Err(error.clone()))).collect(),
            },
        }
    }
}

/// Side effects requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Request(Request),
    /// -> `ErrorExpired` once the banner timeout has elapsed.
    ClearErrorLater { token: BannerToken },
    /// Put the cursor back into the new-todo field.
    FocusInput,
}

impl Effect {
    /// Whether the effect talks to the API.
    pub fn is_request(&self) -> bool {
        matches!(self, Effect::Request(_))
    }
}

#[derive(Debug, Clone)]
pub struct TodoState {
    user_id: u64,
    todos: Vec<Todo>,
    pending: Option<Todo>,
    draft: String,
    adding: bool,
    filter: FilterMode,
    banner: ErrorBanner,
    editing: Option<EditSession>,
    busy: BTreeSet<TodoId>,
    escape: EscapeBehavior,
}

impl TodoState {
    pub fn new(user_id: u64, escape: EscapeBehavior) -> Self {
        Self {
            user_id,
            todos: Vec::new(),
            pending: None,
            draft: String::new(),
            adding: false,
            filter: FilterMode::All,
            banner: ErrorBanner::new(),
            editing: None,
            busy: BTreeSet::new(),
            escape,
        }
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn pending(&self) -> Option<&Todo> {
        self.pending.as_ref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_adding(&self) -> bool {
        self.adding
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn error(&self) -> Option<ErrorKind> {
        self.banner.current()
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self, id: TodoId) -> bool {
        self.editing.as_ref().is_some_and(|s| s.id == id)
    }

    pub fn is_busy(&self, id: TodoId) -> bool {
        self.busy.contains(&id)
    }

    pub fn visible_todos(&self) -> Vec<&Todo> {
        filter::filter_todos(&self.todos, self.filter)
    }

    pub fn has_todos(&self) -> bool {
        !self.todos.is_empty()
    }

    pub fn all_completed(&self) -> bool {
        filter::all_completed(&self.todos)
    }

    pub fn active_count(&self) -> usize {
        filter::active_count(&self.todos)
    }

    pub fn has_completed(&self) -> bool {
        filter::has_completed(&self.todos)
    }

    fn find(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    fn find_mut(&mut self, id: TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }

    fn remove(&mut self, id: TodoId) {
        self.todos.retain(|t| t.id != id);
        if self.is_editing(id) {
            self.editing = None;
        }
    }

    fn exit_edit(&mut self, id: TodoId) {
        if self.is_editing(id) {
            self.editing = None;
        }
    }

    /// Accept a mutation for `id` unless it is unknown or already busy.
    fn claim(&mut self, id: TodoId) -> bool {
        if self.find(id).is_none() {
            tracing::debug!(id, "ignoring mutation for unknown todo");
            return false;
        }
        if !self.busy.insert(id) {
            tracing::debug!(id, "ignoring mutation, another one is in flight");
            return false;
        }
        true
    }

    fn fail(&mut self, kind: ErrorKind) -> Effect {
        let token = self.banner.raise(kind);
        Effect::ClearErrorLater { token }
    }

    /// Apply `action` and return the effects to run.
    pub fn reduce(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Load => vec![Effect::Request(Request::Fetch)],
            Action::Loaded(Ok(todos)) => {
                self.todos = todos;
                Vec::new()
            }
            Action::Loaded(Err(_)) => vec![self.fail(ErrorKind::LoadTodos)],

            Action::SetDraft(text) => {
                self.draft = text;
                Vec::new()
            }
            Action::Add => self.add(),
            Action::Added(result) => {
                self.adding = false;
                self.pending = None;
                let mut effects = Vec::new();
                match result {
                    Ok(todo) => {
                        self.todos.push(todo);
                        self.draft.clear();
                    }
                    Err(_) => effects.push(self.fail(ErrorKind::AddTodo)),
                }
                effects.push(Effect::FocusInput);
                effects
            }

            Action::Delete(id) => {
                if !self.claim(id) {
                    return Vec::new();
                }
                vec![Effect::Request(Request::Delete { id })]
            }
            Action::Deleted { id, result } => {
                self.busy.remove(&id);
                let mut effects = Vec::new();
                match result {
                    Ok(()) => self.remove(id),
                    Err(_) => effects.push(self.fail(ErrorKind::DeleteTodo)),
                }
                effects.push(Effect::FocusInput);
                effects
            }

            Action::ToggleStatus { id, completed } => {
                if !self.claim(id) {
                    return Vec::new();
                }
                vec![Effect::Request(Request::SetCompleted { id, completed })]
            }
            Action::StatusUpdated { id, completed, result } => {
                self.busy.remove(&id);
                match result {
                    Ok(()) => {
                        if let Some(todo) = self.find_mut(id) {
                            todo.completed = completed;
                        }
                        Vec::new()
                    }
                    Err(_) => vec![self.fail(ErrorKind::UpdateTodo)],
                }
            }

            Action::StartEdit(id) => {
                if self.busy.contains(&id) {
                    tracing::debug!(id, "not editing a todo with a call in flight");
                    return Vec::new();
                }
                if let Some(todo) = self.find(id) {
                    self.editing = Some(EditSession {
                        id,
                        buffer: todo.title.clone(),
                    });
                }
                Vec::new()
            }
            Action::EditInput(text) => {
                if let Some(session) = self.editing.as_mut() {
                    session.buffer = text;
                }
                Vec::new()
            }
            Action::SubmitEdit | Action::BlurEdit => self.submit_edit(),
            Action::CancelEdit => match self.escape {
                EscapeBehavior::Discard => {
                    self.editing = None;
                    Vec::new()
                }
                EscapeBehavior::Submit => self.submit_edit(),
            },
            Action::UpdateTitle { id, title } => self.update_title(id, &title),
            Action::TitleUpdated { id, title, result } => {
                self.busy.remove(&id);
                match result {
                    Ok(()) => {
                        if let Some(todo) = self.find_mut(id) {
                            todo.title = title;
                        }
                        self.exit_edit(id);
                        Vec::new()
                    }
                    Err(_) => vec![self.fail(ErrorKind::UpdateTodo)],
                }
            }
            Action::TitleDeleted { id, result } => {
                self.busy.remove(&id);
                match result {
                    Ok(()) => {
                        self.remove(id);
                        Vec::new()
                    }
                    Err(_) => vec![self.fail(ErrorKind::DeleteTodo)],
                }
            }

            Action::ToggleAll => self.toggle_all(),
            Action::ToggleAllDone { ids, completed, result } => {
                for id in &ids {
                    self.busy.remove(id);
                }
                match result {
                    Ok(()) => {
                        for todo in self.todos.iter_mut().filter(|t| ids.contains(&t.id)) {
                            todo.completed = completed;
                        }
                        Vec::new()
                    }
                    Err(_) => vec![self.fail(ErrorKind::UpdateTodo)],
                }
            }

            Action::ClearCompleted => {
                let ids: Vec<TodoId> = self
                    .todos
                    .iter()
                    .filter(|t| t.completed && !self.busy.contains(&t.id))
                    .map(|t| t.id)
                    .collect();
                if ids.is_empty() {
                    return Vec::new();
                }
                self.busy.extend(ids.iter().copied());
                vec![Effect::Request(Request::DeleteMany { ids })]
            }
            Action::ClearCompletedDone { results } => {
                let mut failed = 0;
                for (id, result) in results {
                    self.busy.remove(&id);
                    match result {
                        Ok(()) => self.remove(id),
                        Err(_) => failed += 1,
                    }
                }
                if failed > 0 {
                    vec![self.fail(ErrorKind::DeleteSomeTodos)]
                } else {
                    Vec::new()
                }
            }

            Action::SetFilter(mode) => {
                self.filter = mode;
                Vec::new()
            }
            Action::DismissError => {
                self.banner.dismiss();
                Vec::new()
            }
            Action::ErrorExpired(token) => {
                self.banner.expire(token);
                Vec::new()
            }
        }
    }

    fn add(&mut self) -> Vec<Effect> {
        let title = self.draft.trim();
        if title.is_empty() {
            return vec![self.fail(ErrorKind::EmptyTitle)];
        }
        if self.adding {
            return Vec::new();
        }
        let title = title.to_string();
        self.adding = true;
        self.pending = Some(Todo::pending(self.user_id, self.draft.clone()));
        vec![Effect::Request(Request::Create { title })]
    }

    fn submit_edit(&mut self) -> Vec<Effect> {
        match self.editing.clone() {
            Some(EditSession { id, buffer }) => self.update_title(id, &buffer),
            None => Vec::new(),
        }
    }

    fn update_title(&mut self, id: TodoId, title: &str) -> Vec<Effect> {
        let Some(todo) = self.find(id) else {
            return Vec::new();
        };
        let title = title.trim();
        if title == todo.title {
            self.exit_edit(id);
            return Vec::new();
        }
        if !self.claim(id) {
            return Vec::new();
        }
        if title.is_empty() {
            vec![Effect::Request(Request::DeleteEmptied { id })]
        } else {
            vec![Effect::Request(Request::Rename {
                id,
                title: title.to_string(),
            })]
        }
    }

    fn toggle_all(&mut self) -> Vec<Effect> {
        let completed = !self.all_completed();
        let ids: Vec<TodoId> = self
            .todos
            .iter()
            .filter(|t| t.completed != completed)
            .map(|t| t.id)
            .collect();
        if ids.is_empty() {
            return Vec::new();
        }
        if ids.iter().any(|id| self.busy.contains(id)) {
            tracing::debug!("ignoring toggle-all while a todo it touches is busy");
            return Vec::new();
        }
        self.busy.extend(ids.iter().copied());
        vec![Effect::Request(Request::SetCompletedMany { ids, completed })]
    }
}
