use std::time::Duration;

use clap::Parser;
use todo_core::{ControllerConfig, EscapeBehavior};

/// Terminal client for a single-user todo list.
#[derive(Debug, Parser)]
#[command(name = "todo", version)]
pub struct Config {
    /// Base URL of the todo API.
    #[arg(long, env = "TODO_API_URL", default_value = "http://127.0.0.1:3000")]
    pub base_url: String,

    /// User whose todos are listed and created.
    #[arg(long, env = "TODO_USER_ID", default_value_t = 1)]
    pub user_id: u64,

    /// How long an error stays visible, in milliseconds.
    #[arg(long, default_value_t = 3000)]
    pub error_timeout_ms: u64,

    /// Give up on an API call after this many milliseconds.
    #[arg(long, env = "TODO_REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
    pub request_timeout_ms: u64,

    /// What escape does in the edit field: `discard` or `submit`.
    #[arg(long, default_value = "discard")]
    pub escape: EscapeBehavior,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            user_id: self.user_id,
            error_timeout: Duration::from_millis(self.error_timeout_ms),
            escape: self.escape,
        }
    }
}
