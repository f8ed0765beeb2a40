//! Effect shell around `TodoState`.
//!
//! # Design
//! The controller is the only owner of the state. `dispatch` runs the
//! reducer and spawns a task per effect; every task reports back over an
//! mpsc channel, and the controller feeds the result into the reducer when
//! `next` or `settle` is awaited. Nothing else ever touches the state.
//!
//! Spawned tasks live in a `JoinSet`, so unmounting (or dropping) the
//! controller aborts everything still in flight and no late response can
//! reach a state that is gone. A request task always reports back: if the
//! `TodoApi` implementation panics, the request's failure action is sent
//! instead.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::ApiError;
use crate::state::{Action, Effect, Request, TodoState};
use crate::transport::TodoApi;
use crate::types::{EscapeBehavior, UpdateTodo};
use crate::view::AppView;

pub const DEFAULT_ERROR_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub user_id: u64,
    /// How long an error stays in the banner after it was last raised.
    pub error_timeout: Duration,
    pub escape: EscapeBehavior,
}

impl ControllerConfig {
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id,
            error_timeout: DEFAULT_ERROR_TIMEOUT,
            escape: EscapeBehavior::default(),
        }
    }
}

struct Completion {
    action: Action,
    request: bool,
}

pub struct Controller {
    state: TodoState,
    api: Arc<dyn TodoApi>,
    error_timeout: Duration,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    tasks: JoinSet<()>,
    requests: usize,
    timers: usize,
    focus_requested: bool,
}

impl Controller {
    pub fn new(api: Arc<dyn TodoApi>, config: ControllerConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: TodoState::new(config.user_id, config.escape),
            api,
            error_timeout: config.error_timeout,
            tx,
            rx,
            tasks: JoinSet::new(),
            requests: 0,
            timers: 0,
            focus_requested: false,
        }
    }

    /// Create the controller and start the initial fetch.
    pub fn mount(api: Arc<dyn TodoApi>, config: ControllerConfig) -> Self {
        let mut controller = Self::new(api, config);
        controller.dispatch(Action::Load);
        controller
    }

    pub fn state(&self) -> &TodoState {
        &self.state
    }

    pub fn view(&self) -> AppView {
        AppView::project(&self.state)
    }

    /// Number of API calls that have not reported back yet.
    pub fn requests_in_flight(&self) -> usize {
        self.requests
    }

    /// Whether `next` has anything to wait for.
    pub fn has_outstanding(&self) -> bool {
        self.requests + self.timers > 0
    }

    /// Returns true once per focus request from the reducer.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    pub fn dispatch(&mut self, action: Action) {
        tracing::trace!(?action, "dispatch");
        for effect in self.state.reduce(action) {
            self.run(effect);
        }
    }

    fn run(&mut self, effect: Effect) {
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(error) = joined {
                tracing::warn!(%error, "effect task ended abnormally");
            }
        }

        match effect {
            Effect::FocusInput => self.focus_requested = true,
            Effect::ClearErrorLater { token } => {
                self.timers += 1;
                let tx = self.tx.clone();
                let delay = self.error_timeout;
                self.tasks.spawn(async move {
                    tokio::time::sleep(delay).await;
                    deliver(&tx, Action::ErrorExpired(token), false);
                });
            }
            Effect::Request(request) => {
                self.requests += 1;
                let tx = self.tx.clone();
                let api = Arc::clone(&self.api);
                self.tasks.spawn(async move {
                    let outcome = AssertUnwindSafe(perform(api.as_ref(), request.clone()))
                        .catch_unwind()
                        .await;
                    let action = match outcome {
                        Ok(action) => action,
                        Err(_) => {
                            tracing::warn!(?request, "todo api call panicked");
                            request.failed(ApiError::Transport("request task panicked".to_string()))
                        }
                    };
                    deliver(&tx, action, true);
                });
            }
        }
    }

    /// Wait for one effect to finish and apply its result. Returns false
    /// without waiting when nothing is outstanding.
    pub async fn next(&mut self) -> bool {
        if !self.has_outstanding() {
            return false;
        }
        match self.rx.recv().await {
            Some(completion) => {
                if completion.request {
                    self.requests -= 1;
                } else {
                    self.timers -= 1;
                }
                self.dispatch(completion.action);
                true
            }
            None => false,
        }
    }

    /// Process results until no API call is in flight. Banner timers that
    /// fire in the meantime are applied too, but are not waited for.
    pub async fn settle(&mut self) {
        while self.requests > 0 {
            if !self.next().await {
                break;
            }
        }
    }

    /// Abort everything in flight and drop the state.
    pub fn unmount(mut self) {
        if self.has_outstanding() {
            tracing::debug!(
                requests = self.requests,
                timers = self.timers,
                "unmounting with work in flight"
            );
        }
        self.tasks.abort_all();
    }
}

fn deliver(tx: &mpsc::UnboundedSender<Completion>, action: Action, request: bool) {
    if tx.send(Completion { action, request }).is_err() {
        tracing::debug!("controller is gone, dropping result");
    }
}

fn logged<T>(op: &'static str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    if let Err(error) = &result {
        tracing::warn!(op, %error, "todo api call failed");
    }
    result
}

async fn perform(api: &dyn TodoApi, request: Request) -> Action {
    match request {
        Request::Fetch => Action::Loaded(logged("list", api.list().await)),
        Request::Create { title } => Action::Added(logged("create", api.create(&title).await)),
        Request::Delete { id } => Action::Deleted {
            id,
            result: logged("delete", api.delete(id).await),
        },
        Request::SetCompleted { id, completed } => {
            let result = api.update(id, &UpdateTodo::completed(completed)).await;
            Action::StatusUpdated {
                id,
                completed,
                result: logged("update", result).map(drop),
            }
        }
        Request::Rename { id, title } => {
            let result = api.update(id, &UpdateTodo::title(title.as_str())).await;
            Action::TitleUpdated {
                id,
                title,
                result: logged("update", result).map(drop),
            }
        }
        Request::DeleteEmptied { id } => Action::TitleDeleted {
            id,
            result: logged("delete", api.delete(id).await),
        },
        Request::SetCompletedMany { ids, completed } => {
            let patch = UpdateTodo::completed(completed);
            // Every update settles before the batch is judged.
            let results = join_all(ids.iter().map(|&id| api.update(id, &patch))).await;
            let result = results.into_iter().collect::<Result<Vec<_>, _>>();
            Action::ToggleAllDone {
                ids,
                completed,
                result: logged("update", result).map(drop),
            }
        }
        Request::DeleteMany { ids } => {
            let results = join_all(ids.iter().map(|&id| api.delete(id))).await;
            Action::ClearCompletedDone {
                results: ids
                    .into_iter()
                    .zip(results)
                    .map(|(id, result)| (id, logged("delete", result)))
                    .collect(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use crate::error::ErrorKind;
    use crate::types::{Todo, TodoId};

    #[derive(Default)]
    struct Calls {
        list: usize,
        create: usize,
        update: usize,
        delete: usize,
        finished: usize,
    }

    /// In-memory API with per-id failures and latencies.
    #[derive(Default)]
    struct FakeApi {
        todos: Mutex<Vec<Todo>>,
        failing: HashSet<TodoId>,
        latency: Duration,
        delays: HashMap<TodoId, Duration>,
        panic_on_create: bool,
        calls: Mutex<Calls>,
    }

    impl FakeApi {
        fn with(todos: Vec<Todo>) -> Self {
            Self {
                todos: Mutex::new(todos),
                ..Self::default()
            }
        }

        fn failing(mut self, ids: &[TodoId]) -> Self {
            self.failing.extend(ids.iter().copied());
            self
        }

        fn slow(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        fn slow_for(mut self, ids: &[TodoId], latency: Duration) -> Self {
            self.delays.extend(ids.iter().map(|&id| (id, latency)));
            self
        }

        async fn wait(&self, id: Option<TodoId>) {
            let latency = id
                .and_then(|id| self.delays.get(&id).copied())
                .unwrap_or(self.latency);
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            self.calls.lock().unwrap().finished += 1;
        }

        fn check(&self, id: TodoId) -> Result<(), ApiError> {
            if self.failing.contains(&id) {
                return Err(ApiError::Http {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TodoApi for FakeApi {
        async fn list(&self) -> Result<Vec<Todo>, ApiError> {
            self.calls.lock().unwrap().list += 1;
            self.wait(None).await;
            Ok(self.todos.lock().unwrap().clone())
        }

        async fn create(&self, title: &str) -> Result<Todo, ApiError> {
            self.calls.lock().unwrap().create += 1;
            if self.panic_on_create {
                panic!("create exploded");
            }
            self.wait(None).await;
            let mut todos = self.todos.lock().unwrap();
            let todo = Todo {
                id: todos.iter().map(|t| t.id).max().unwrap_or(0) + 1,
                user_id: 1,
                title: title.to_string(),
                completed: false,
            };
            todos.push(todo.clone());
            Ok(todo)
        }

        async fn update(&self, id: TodoId, patch: &UpdateTodo) -> Result<Todo, ApiError> {
            self.calls.lock().unwrap().update += 1;
            self.wait(Some(id)).await;
            self.check(id)?;
            let mut todos = self.todos.lock().unwrap();
            let todo = todos.iter_mut().find(|t| t.id == id).ok_or(ApiError::NotFound)?;
            if let Some(title) = &patch.title {
                todo.title = title.clone();
            }
            if let Some(completed) = patch.completed {
                todo.completed = completed;
            }
            Ok(todo.clone())
        }

        async fn delete(&self, id: TodoId) -> Result<(), ApiError> {
            self.calls.lock().unwrap().delete += 1;
            self.wait(Some(id)).await;
            self.check(id)?;
            self.todos.lock().unwrap().retain(|t| t.id != id);
            Ok(())
        }
    }

    fn todo(id: TodoId, title: &str, completed: bool) -> Todo {
        Todo {
            id,
            user_id: 1,
            title: title.to_string(),
            completed,
        }
    }

    async fn mounted(api: &Arc<FakeApi>) -> Controller {
        let mut controller = Controller::mount(api.clone(), ControllerConfig::new(1));
        controller.settle().await;
        controller
    }

    #[tokio::test]
    async fn mount_loads_collection() {
        let api = Arc::new(FakeApi::with(vec![todo(1, "a", false), todo(2, "b", true)]));
        let controller = mounted(&api).await;
        assert_eq!(controller.state().todos().len(), 2);
        assert_eq!(api.calls.lock().unwrap().list, 1);
    }

    #[tokio::test]
    async fn add_round_trip() {
        let api = Arc::new(FakeApi::with(vec![]));
        let mut controller = mounted(&api).await;
        controller.dispatch(Action::SetDraft("  Walk dog ".to_string()));
        controller.dispatch(Action::Add);
        assert!(controller.view().pending.is_some());
        controller.settle().await;
        assert_eq!(controller.state().todos()[0].title, "Walk dog");
        assert!(controller.view().pending.is_none());
        assert!(controller.take_focus_request());
        assert!(!controller.take_focus_request());
    }

    #[tokio::test(start_paused = true)]
    async fn whitespace_add_makes_no_call() {
        let api = Arc::new(FakeApi::with(vec![]));
        let mut controller = mounted(&api).await;
        controller.dispatch(Action::SetDraft("  ".to_string()));
        controller.dispatch(Action::Add);
        controller.settle().await;
        assert_eq!(api.calls.lock().unwrap().create, 0);
        assert_eq!(controller.state().error(), Some(ErrorKind::EmptyTitle));
    }

    #[tokio::test]
    async fn same_title_makes_no_call() {
        let api = Arc::new(FakeApi::with(vec![todo(1, "a", false)]));
        let mut controller = mounted(&api).await;
        controller.dispatch(Action::StartEdit(1));
        controller.dispatch(Action::EditInput(" a ".to_string()));
        controller.dispatch(Action::SubmitEdit);
        controller.settle().await;
        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.update + calls.delete, 0);
        assert!(controller.state().editing().is_none());
    }

    #[tokio::test]
    async fn empty_title_deletes() {
        let api = Arc::new(FakeApi::with(vec![todo(1, "a", false)]));
        let mut controller = mounted(&api).await;
        controller.dispatch(Action::UpdateTitle {
            id: 1,
            title: String::new(),
        });
        controller.settle().await;
        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.delete, 1);
        assert_eq!(calls.update, 0);
        assert!(controller.state().todos().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_all_is_all_or_nothing() {
        let todos = vec![todo(1, "a", false), todo(2, "b", false), todo(3, "c", false)];
        let api = Arc::new(FakeApi::with(todos.clone()).failing(&[2]));
        let mut controller = mounted(&api).await;
        controller.dispatch(Action::ToggleAll);
        controller.settle().await;
        assert_eq!(controller.state().todos(), &todos[..]);
        assert_eq!(controller.state().error(), Some(ErrorKind::UpdateTodo));
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_all_waits_for_every_update() {
        let todos = vec![todo(1, "a", false), todo(2, "b", false), todo(3, "c", false)];
        let api = Arc::new(
            FakeApi::with(todos.clone())
                .failing(&[1])
                .slow_for(&[2, 3], Duration::from_millis(100)),
        );
        let mut controller = mounted(&api).await;
        let finished = api.calls.lock().unwrap().finished;

        controller.dispatch(Action::ToggleAll);
        controller.settle().await;

        assert_eq!(api.calls.lock().unwrap().finished - finished, 3);
        assert_eq!(controller.state().todos(), &todos[..]);
        assert!(!controller.state().is_busy(2));
        assert!(!controller.state().is_busy(3));
        assert_eq!(controller.state().error(), Some(ErrorKind::UpdateTodo));
    }

    #[tokio::test]
    async fn panicking_api_reports_failure() {
        let api = Arc::new(FakeApi {
            panic_on_create: true,
            ..FakeApi::default()
        });
        let mut controller = mounted(&api).await;
        controller.dispatch(Action::SetDraft("x".to_string()));
        controller.dispatch(Action::Add);

        tokio::time::timeout(Duration::from_secs(2), controller.settle())
            .await
            .expect("settle returns after a panicking call");

        assert_eq!(controller.requests_in_flight(), 0);
        assert!(!controller.state().is_adding());
        assert!(controller.view().pending.is_none());
        assert_eq!(controller.state().error(), Some(ErrorKind::AddTodo));
        assert_eq!(controller.state().draft(), "x");
    }

    #[tokio::test(start_paused = true)]
    async fn clear_completed_keeps_partial_success() {
        let api = Arc::new(
            FakeApi::with(vec![todo(1, "a", true), todo(2, "b", true), todo(3, "c", true)]).failing(&[3]),
        );
        let mut controller = mounted(&api).await;
        controller.dispatch(Action::ClearCompleted);
        controller.settle().await;
        let ids: Vec<_> = controller.state().todos().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3]);
        assert_eq!(controller.state().error(), Some(ErrorKind::DeleteSomeTodos));
        assert_eq!(api.calls.lock().unwrap().delete, 3);
    }

    #[tokio::test]
    async fn busy_todo_gets_one_request() {
        let api = Arc::new(FakeApi::with(vec![todo(1, "a", false)]));
        let mut controller = mounted(&api).await;
        controller.dispatch(Action::ToggleStatus { id: 1, completed: true });
        controller.dispatch(Action::Delete(1));
        controller.settle().await;
        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.update, 1);
        assert_eq!(calls.delete, 0);
        assert!(controller.state().todos()[0].completed);
    }

    #[tokio::test(start_paused = true)]
    async fn error_clears_after_timeout() {
        let api = Arc::new(FakeApi::with(vec![]));
        let mut controller = mounted(&api).await;
        let start = Instant::now();
        controller.dispatch(Action::Add);
        assert!(controller.view().error.is_some());
        assert!(controller.next().await);
        assert!(start.elapsed() >= DEFAULT_ERROR_TIMEOUT);
        assert!(controller.view().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dismissed_error_stays_dismissed() {
        let api = Arc::new(FakeApi::with(vec![todo(1, "a", false)]));
        let mut controller = mounted(&api).await;
        controller.dispatch(Action::Add);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        controller.dispatch(Action::DismissError);
        let dismissed = controller.view();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(controller.next().await);
        assert_eq!(controller.view(), dismissed);
        assert!(!controller.has_outstanding());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timer_does_not_clear_newer_error() {
        let api = Arc::new(FakeApi::with(vec![]));
        let mut controller = mounted(&api).await;
        controller.dispatch(Action::Add);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        controller.dispatch(Action::SetDraft(" ".to_string()));
        controller.dispatch(Action::Add);

        assert!(controller.next().await);
        assert_eq!(controller.state().error(), Some(ErrorKind::EmptyTitle));

        assert!(controller.next().await);
        assert_eq!(controller.state().error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_aborts_in_flight_requests() {
        let api = Arc::new(FakeApi::with(vec![todo(1, "a", false)]).slow(Duration::from_millis(100)));
        let controller = Controller::mount(api.clone(), ControllerConfig::new(1));
        assert_eq!(controller.requests_in_flight(), 1);
        controller.unmount();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(api.calls.lock().unwrap().finished, 0);
    }
}
