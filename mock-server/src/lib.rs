use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub user_id: u64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<u64>,
}

/// Ids whose updates and deletes answer 500.
#[derive(Clone, Default)]
pub struct Faults(Arc<std::sync::RwLock<HashSet<u64>>>);

impl Faults {
    pub fn fail(&self, id: u64) {
        self.0.write().unwrap_or_else(|e| e.into_inner()).insert(id);
    }

    pub fn heal(&self, id: u64) {
        self.0.write().unwrap_or_else(|e| e.into_inner()).remove(&id);
    }

    fn check(&self, id: u64) -> Result<(), StatusCode> {
        if self.0.read().unwrap_or_else(|e| e.into_inner()).contains(&id) {
            tracing::info!(id, "injected failure");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Ok(())
    }
}

/// Shared server state. Ids are handed out in increasing order, so the
/// ordered map also preserves insertion order.
#[derive(Clone)]
pub struct Db {
    todos: Arc<RwLock<BTreeMap<u64, Todo>>>,
    next_id: Arc<AtomicU64>,
    faults: Faults,
}

impl Db {
    pub fn new() -> Self {
        Self {
            todos: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            faults: Faults::default(),
        }
    }

    pub fn faults(&self) -> Faults {
        self.faults.clone()
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::new()
    }
}

pub fn app() -> Router {
    router(Db::new())
}

pub fn router(db: Db) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", patch(update_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, Db::new()).await
}

pub async fn serve(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, router(db)).await
}

async fn list_todos(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Vec<Todo>> {
    let todos = db.todos.read().await;
    Json(
        todos
            .values()
            .filter(|todo| query.user_id.is_none_or(|user_id| todo.user_id == user_id))
            .cloned()
            .collect(),
    )
}

async fn create_todo(State(db): State<Db>, Json(input): Json<CreateTodo>) -> (StatusCode, Json<Todo>) {
    let todo = Todo {
        id: db.next_id.fetch_add(1, Ordering::Relaxed),
        user_id: input.user_id,
        title: input.title,
        completed: input.completed,
    };
    tracing::debug!(id = todo.id, user_id = todo.user_id, "created todo");
    db.todos.write().await.insert(todo.id, todo.clone());
    (StatusCode::CREATED, Json(todo))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, StatusCode> {
    db.faults.check(id)?;
    let mut todos = db.todos.write().await;
    let todo = todos.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    Ok(Json(todo.clone()))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<u64>) -> Result<StatusCode, StatusCode> {
    db.faults.check(id)?;
    let mut todos = db.todos.write().await;
    todos.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}
