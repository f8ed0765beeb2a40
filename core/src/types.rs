//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates. The wire
//! format uses camelCase field names (`userId`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Server-assigned todo identifier.
pub type TodoId = u64;

/// Id carried by a todo that has not been persisted yet.
pub const PENDING_ID: TodoId = 0;

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub user_id: u64,
    pub title: String,
    pub completed: bool,
}

impl Todo {
    /// Client-only placeholder shown while a create call is in flight.
    pub fn pending(user_id: u64, title: impl Into<String>) -> Self {
        Self {
            id: PENDING_ID,
            user_id,
            title: title.into(),
            completed: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.id == PENDING_ID
    }
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub user_id: u64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }
}

/// Which slice of the collection is displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterMode {
    pub const MODES: [FilterMode; 3] = [FilterMode::All, FilterMode::Active, FilterMode::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Completed => "completed",
        }
    }

    /// Capitalized link text, e.g. `Active`.
    pub fn label(self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Active => "Active",
            FilterMode::Completed => "Completed",
        }
    }

    /// Fragment link for the filter, e.g. `#/active`.
    pub fn href(self) -> String {
        format!("#/{}", self.as_str())
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "active" => Ok(FilterMode::Active),
            "completed" => Ok(FilterMode::Completed),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

/// What leaving edit mode with the escape key does to the edit buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EscapeBehavior {
    /// Throw the buffer away and keep the stored title.
    #[default]
    Discard,
    /// Submit the buffer as if the field had lost focus.
    Submit,
}

impl FromStr for EscapeBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discard" => Ok(EscapeBehavior::Discard),
            "submit" => Ok(EscapeBehavior::Submit),
            other => Err(format!("unknown escape behavior: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_uses_camel_case_on_the_wire() {
        let todo = Todo {
            id: 7,
            user_id: 42,
            title: "Test".to_string(),
            completed: false,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["userId"], 42);
        assert_eq!(json["id"], 7);
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn pending_todo_uses_sentinel_id() {
        let todo = Todo::pending(3, "draft");
        assert!(todo.is_pending());
        assert!(!todo.completed);
        assert_eq!(todo.user_id, 3);
    }

    #[test]
    fn update_todo_skips_absent_fields() {
        let json = serde_json::to_value(UpdateTodo::completed(true)).unwrap();
        assert_eq!(json, serde_json::json!({ "completed": true }));
    }

    #[test]
    fn filter_mode_parses_case_insensitively() {
        assert_eq!("Active".parse::<FilterMode>().unwrap(), FilterMode::Active);
        assert_eq!(" completed ".parse::<FilterMode>().unwrap(), FilterMode::Completed);
        assert!("done".parse::<FilterMode>().is_err());
    }

    #[test]
    fn filter_mode_links() {
        assert_eq!(FilterMode::Completed.href(), "#/completed");
        assert_eq!(FilterMode::All.label(), "All");
    }
}
