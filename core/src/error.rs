//! Error types for the todo client.
//!
//! # Design
//! `ApiError` describes what went wrong talking to the server. `NotFound`
//! gets a dedicated variant because callers distinguish "the resource does
//! not exist" from "the server returned an unexpected status."
//!
//! `ErrorKind` is the user-facing side: the reducer turns every failed
//! operation into one of these and the banner shows its message.

use thiserror::Error;

/// Errors returned by `TodoClient` parse methods and `TodoApi` transports.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server returned 404 — the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a status other than the expected one.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Failure classes shown in the error banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    LoadTodos,
    AddTodo,
    EmptyTitle,
    DeleteTodo,
    DeleteSomeTodos,
    UpdateTodo,
}

impl ErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::LoadTodos => "Unable to load todos",
            ErrorKind::AddTodo => "Unable to add a todo",
            ErrorKind::EmptyTitle => "Title should not be empty",
            ErrorKind::DeleteTodo => "Unable to delete a todo",
            ErrorKind::DeleteSomeTodos => "Unable to delete some completed todos",
            ErrorKind::UpdateTodo => "Unable to update a todo",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
