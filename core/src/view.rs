//! Render-ready projections of `TodoState`.
//!
//! A front end draws these and turns user input into `Action`s; nothing here
//! holds state of its own.

use crate::state::TodoState;
use crate::types::{FilterMode, TodoId};

/// New-todo form plus the toggle-all control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    /// Toggle-all is only offered when there is something to toggle.
    pub show_toggle_all: bool,
    pub toggle_all_active: bool,
    pub draft: String,
    pub input_disabled: bool,
}

/// One row of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    /// Text of the edit field when the row is in edit mode.
    pub edit_buffer: Option<String>,
    pub controls_disabled: bool,
    /// Loader overlay.
    pub loading: bool,
}

impl ItemView {
    pub fn is_editing(&self) -> bool {
        self.edit_buffer.is_some()
    }

    /// The delete button is hidden while the title is being edited.
    pub fn show_delete(&self) -> bool {
        !self.is_editing()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterLink {
    pub mode: FilterMode,
    pub label: &'static str,
    pub href: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterView {
    pub active_count: usize,
    pub links: Vec<FilterLink>,
    pub clear_completed_enabled: bool,
}

impl FooterView {
    pub fn items_left(&self) -> String {
        format!("{} items left", self.active_count)
    }
}

/// The whole screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppView {
    pub header: HeaderView,
    pub items: Vec<ItemView>,
    /// Placeholder row for a todo that is still being created.
    pub pending: Option<ItemView>,
    /// Absent when there are no todos.
    pub footer: Option<FooterView>,
    pub error: Option<&'static str>,
}

impl AppView {
    pub fn project(state: &TodoState) -> Self {
        let header = HeaderView {
            show_toggle_all: state.has_todos(),
            toggle_all_active: state.all_completed(),
            draft: state.draft().to_string(),
            input_disabled: state.is_adding(),
        };

        let items = state
            .visible_todos()
            .into_iter()
            .map(|todo| {
                let busy = state.is_busy(todo.id);
                ItemView {
                    id: todo.id,
                    title: todo.title.clone(),
                    completed: todo.completed,
                    edit_buffer: state
                        .editing()
                        .filter(|session| session.id == todo.id)
                        .map(|session| session.buffer.clone()),
                    controls_disabled: busy,
                    loading: busy,
                }
            })
            .collect();

        let pending = state.pending().map(|todo| ItemView {
            id: todo.id,
            title: todo.title.clone(),
            completed: todo.completed,
            edit_buffer: None,
            controls_disabled: true,
            loading: state.is_adding(),
        });

        let footer = state.has_todos().then(|| FooterView {
            active_count: state.active_count(),
            links: FilterMode::MODES
                .iter()
                .map(|&mode| FilterLink {
                    mode,
                    label: mode.label(),
                    href: mode.href(),
                    selected: state.filter() == mode,
                })
                .collect(),
            clear_completed_enabled: state.has_completed(),
        });

        Self {
            header,
            items,
            pending,
            footer,
            error: state.error().map(|kind| kind.message()),
        }
    }
}
