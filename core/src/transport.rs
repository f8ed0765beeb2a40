//! Async access to the todo API.
//!
//! `TodoApi` is the seam the controller depends on. `HttpTodoApi` implements
//! it by pairing the stateless `TodoClient` with a reqwest client that
//! executes each built request.

use std::time::Duration;

use async_trait::async_trait;

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Todo, TodoId, UpdateTodo};

/// The four remote operations, scoped to one user by the implementation.
#[async_trait]
pub trait TodoApi: Send + Sync {
    /// All todos of the user, in server order.
    async fn list(&self) -> Result<Vec<Todo>, ApiError>;

    /// Persist a new todo and return it with its server-assigned id.
    async fn create(&self, title: &str) -> Result<Todo, ApiError>;

    /// Apply a partial update.
    async fn update(&self, id: TodoId, patch: &UpdateTodo) -> Result<Todo, ApiError>;

    async fn delete(&self, id: TodoId) -> Result<(), ApiError>;
}

/// Upper bound on a single API call, connect through reading the body.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `TodoApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTodoApi {
    client: TodoClient,
    http: reqwest::Client,
}

impl HttpTodoApi {
    /// A reqwest-backed API whose calls fail with `Transport` once `timeout`
    /// has elapsed.
    pub fn new(base_url: &str, user_id: u64, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self::with_client(TodoClient::new(base_url, user_id), http))
    }

    pub fn with_client(client: TodoClient, http: reqwest::Client) -> Self {
        Self { client, http }
    }

    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match req.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        tracing::debug!(method = req.method.as_str(), path = %req.path, "sending request");

        let mut builder = self.http.request(method, &req.path);
        for (key, value) in &req.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, headers, body })
    }
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self.execute(self.client.build_list_todos()).await?;
        self.client.parse_list_todos(response)
    }

    async fn create(&self, title: &str) -> Result<Todo, ApiError> {
        let req = self.client.build_create_todo(title)?;
        let response = self.execute(req).await?;
        self.client.parse_create_todo(response)
    }

    async fn update(&self, id: TodoId, patch: &UpdateTodo) -> Result<Todo, ApiError> {
        let req = self.client.build_update_todo(id, patch)?;
        let response = self.execute(req).await?;
        self.client.parse_update_todo(response)
    }

    async fn delete(&self, id: TodoId) -> Result<(), ApiError> {
        let response = self.execute(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }
}
