//! Client core for a single-user todo list backed by a REST API.
//!
//! # Overview
//! - `client` / `http`: builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO).
//! - `transport`: the async `TodoApi` seam and its reqwest implementation.
//! - `state`: the list state and its pure reducer. All business rules live
//!   here: validation, optimistic pending todo, busy guards, all-or-nothing
//!   toggle-all, partial clear-completed.
//! - `controller`: runs the reducer's effects on tokio and feeds results back.
//! - `view`: render-ready projection of the state.
//!
//! # Design
//! - The reducer never performs I/O; every side effect is returned as an
//!   `Effect` value, so the rules are testable without a runtime.
//! - The error banner is a tagged `ErrorKind` plus a monotonic token; stale
//!   auto-clear timers cannot clear a newer message.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod banner;
pub mod client;
pub mod controller;
pub mod error;
pub mod filter;
pub mod http;
pub mod state;
pub mod transport;
pub mod types;
pub mod view;

pub use client::TodoClient;
pub use controller::{Controller, ControllerConfig, DEFAULT_ERROR_TIMEOUT};
pub use error::{ApiError, ErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use state::{Action, Effect, Request, TodoState};
pub use transport::{HttpTodoApi, TodoApi, DEFAULT_REQUEST_TIMEOUT};
pub use types::{CreateTodo, EscapeBehavior, FilterMode, Todo, TodoId, UpdateTodo, PENDING_ID};
pub use view::AppView;
