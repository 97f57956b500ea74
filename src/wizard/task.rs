//! Async task adapters: slow operations whose results are merged back
//! into a wizard store when they resolve.
//!
//! Tasks hold only a weak handle to the store: if the wizard is dropped
//! while a task is in flight, the side effect still runs to completion but
//! its result is discarded. Overlapping tasks writing the same field are
//! last-write-wins.

use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Weak};

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::flow::WizardFlow;
use super::store::WizardStore;

/// Shared handle to a wizard's store.
pub type StoreHandle<F> = Arc<RwLock<WizardStore<F>>>;

/// State of one async operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum TaskState<T> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(String),
}

impl<T> Default for TaskState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> TaskState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Controls bound to this operation should be disabled while pending.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Succeeded(value),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// Spawns operations and merges their outputs into the store they belong to.
#[derive(Debug)]
pub struct TaskRunner<F: WizardFlow> {
    store: Weak<RwLock<WizardStore<F>>>,
    handles: Vec<JoinHandle<()>>,
}

impl<F: WizardFlow> TaskRunner<F> {
    pub fn new(store: &StoreHandle<F>) -> Self {
        Self {
            store: Arc::downgrade(store),
            handles: Vec::new(),
        }
    }

    /// Run `operation` on the runtime; when it resolves, hand its output to
    /// `merge` together with the store, if the store is still alive.
    pub fn spawn<Fut, M>(&mut self, name: &'static str, operation: Fut, merge: M)
    where
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
        M: FnOnce(&mut WizardStore<F>, Fut::Output) + Send + 'static,
    {
        self.handles.retain(|h| !h.is_finished());

        let store = self.store.clone();
        debug!(task = name, "Async task started");
        let handle = tokio::spawn(async move {
            let output = operation.await;
            match store.upgrade() {
                Some(store) => {
                    let mut guard = store.write().await;
                    merge(&mut guard, output);
                    debug!(task = name, "Async task resolved");
                }
                None => {
                    debug!(task = name, "Wizard dropped before task resolved; result discarded");
                }
            }
        });
        self.handles.push(handle);
    }

    /// Number of tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait for every spawned task to resolve.
    pub async fn join_all(&mut self) {
        let handles = std::mem::take(&mut self.handles);
        for result in join_all(handles).await {
            if let Err(e) = result {
                warn!(error = %e, "Async task panicked or was cancelled");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::wizard::store::tests::{TestFlow, TestPatch};

    #[test]
    fn task_state_accessors() {
        let idle: TaskState<u8> = TaskState::default();
        assert!(idle.is_idle());
        assert!(TaskState::<u8>::Pending.is_pending());

        let ok = TaskState::<u8>::from_result::<String>(Ok(7));
        assert!(ok.is_succeeded());
        assert_eq!(ok.value(), Some(&7));

        let failed = TaskState::<u8>::from_result(Err("not found"));
        assert_eq!(failed.failure(), Some("not found"));
        assert_eq!(failed.value(), None);
    }

    #[test]
    fn task_state_serializes_with_status_tag() {
        let json = serde_json::to_value(TaskState::Succeeded("x")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "succeeded", "value": "x"}));
        let json = serde_json::to_value(TaskState::<String>::Pending).unwrap();
        assert_eq!(json, serde_json::json!({"status": "pending"}));
    }

    #[tokio::test]
    async fn merges_result_into_store() {
        let store: StoreHandle<TestFlow> = Arc::new(RwLock::new(WizardStore::new()));
        let mut runner = TaskRunner::new(&store);

        runner.spawn("title", async { "resolved".to_string() }, |store, title| {
            store.update_step_data(TestPatch {
                title: Some(title),
                ..Default::default()
            });
        });
        runner.join_all().await;

        assert_eq!(store.read().await.data().title, "resolved");
        assert_eq!(runner.in_flight(), 0);
    }

    #[tokio::test]
    async fn last_resolved_write_wins() {
        let store: StoreHandle<TestFlow> = Arc::new(RwLock::new(WizardStore::new()));
        let mut runner = TaskRunner::new(&store);

        let set_title = |store: &mut WizardStore<TestFlow>, title: String| {
            store.update_step_data(TestPatch {
                title: Some(title),
                ..Default::default()
            });
        };
        runner.spawn(
            "slow",
            async {
                tokio::time::sleep(Duration::from_millis(40)).await;
                "slow".to_string()
            },
            set_title,
        );
        runner.spawn("fast", async { "fast".to_string() }, set_title);
        runner.join_all().await;

        assert_eq!(store.read().await.data().title, "slow");
    }

    #[tokio::test]
    async fn result_is_discarded_after_store_is_dropped() {
        let store: StoreHandle<TestFlow> = Arc::new(RwLock::new(WizardStore::new()));
        let mut runner = TaskRunner::new(&store);
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let ran_in_task = Arc::clone(&ran);

        runner.spawn(
            "orphan",
            async move {
                let _ = rx.await;
                ran_in_task.store(true, std::sync::atomic::Ordering::SeqCst);
            },
            |_store, _| panic!("merge must not run for a dropped store"),
        );

        drop(store);
        tx.send(()).unwrap();
        runner.join_all().await;

        assert!(ran.load(std::sync::atomic::Ordering::SeqCst), "side effect still runs");
    }
}
