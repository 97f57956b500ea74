//! Wizard controller: validation-gated navigation over a [`WizardStore`].

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::flow::{WizardFlow, WizardStep};
use super::store::{WizardState, WizardStore};
use super::task::{StoreHandle, TaskRunner};
use super::validation::FieldErrors;

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    Advanced { from: usize, to: usize },
    Retreated { from: usize, to: usize },
    /// The active step failed validation; these are the failing fields.
    Blocked { errors: FieldErrors },
    /// Already at the boundary in the requested direction.
    Stayed { at: usize },
}

impl Transition {
    pub fn moved(&self) -> bool {
        matches!(self, Self::Advanced { .. } | Self::Retreated { .. })
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

/// What the presentation layer needs to render the active step.
#[derive(Debug, Clone, Serialize)]
pub struct StepView<S> {
    pub step: S,
    pub index: usize,
    pub total_steps: usize,
    pub label: &'static str,
    /// `index / total_steps * 100`, rounded down.
    pub progress_percent: u8,
    pub can_go_back: bool,
    pub can_go_next: bool,
    pub is_terminal: bool,
    pub errors: FieldErrors,
}

/// Drives one wizard instance: owns its store and the tasks writing to it.
#[derive(Debug)]
pub struct WizardController<F: WizardFlow> {
    store: StoreHandle<F>,
    tasks: TaskRunner<F>,
}

impl<F: WizardFlow> Default for WizardController<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: WizardFlow> WizardController<F> {
    pub fn new() -> Self {
        Self::from_store(WizardStore::new())
    }

    pub fn with_data(data: F::Data) -> Self {
        Self::from_store(WizardStore::with_data(data))
    }

    fn from_store(store: WizardStore<F>) -> Self {
        let store = Arc::new(RwLock::new(store));
        let tasks = TaskRunner::new(&store);
        Self { store, tasks }
    }

    pub async fn snapshot(&self) -> WizardState<F> {
        self.store.read().await.snapshot()
    }

    /// Run `f` against a read guard without cloning the state.
    pub async fn read<R>(&self, f: impl FnOnce(&WizardState<F>) -> R) -> R {
        let store = self.store.read().await;
        f(store.state())
    }

    pub async fn current_step(&self) -> usize {
        self.store.read().await.current_step()
    }

    pub async fn active_step(&self) -> F::Step {
        self.store.read().await.state().step()
    }

    /// Merge a partial record into its step.
    pub async fn update(&self, patch: F::Patch) -> Vec<&'static str> {
        self.store.write().await.update_step_data(patch)
    }

    /// Record an error under `field` without touching the step.
    pub async fn set_field_error(&self, field: &str, message: impl Into<String>) {
        self.store.write().await.set_field_error(field, message);
    }

    pub async fn set_errors(&self, errors: FieldErrors) {
        self.store.write().await.set_errors(errors);
    }

    /// Validate the active step and advance if it passes.
    ///
    /// On failure exactly the failing fields are recorded and the step does
    /// not change. At the terminal step this is a no-op.
    pub async fn next(&self) -> Transition {
        let mut store = self.store.write().await;
        let from = store.current_step();
        if store.state().is_terminal() {
            return Transition::Stayed { at: from };
        }

        let step = store.state().step();
        let errors = F::validate(step, store.data());
        if !errors.is_empty() {
            debug!(step = %step, failing = errors.len(), "Step validation failed");
            store.set_errors(errors.clone());
            return Transition::Blocked { errors };
        }

        store.clear_errors();
        store.advance();
        let to = store.current_step();
        info!(from = %step, to = %store.state().step(), "Wizard advanced");
        Transition::Advanced { from, to }
    }

    /// Step back. Never validated; data entered on the step is kept.
    pub async fn back(&self) -> Transition {
        let mut store = self.store.write().await;
        let from = store.current_step();
        if !store.retreat() {
            return Transition::Stayed { at: from };
        }
        Transition::Retreated {
            from,
            to: store.current_step(),
        }
    }

    /// Render the active step.
    pub async fn view(&self) -> StepView<F::Step> {
        let store = self.store.read().await;
        let state = store.state();
        let step = state.step();
        let progress_percent = if state.total_steps == 0 {
            100
        } else {
            (state.current_step * 100 / state.total_steps) as u8
        };
        StepView {
            step,
            index: state.current_step,
            total_steps: state.total_steps,
            label: step.label(),
            progress_percent,
            can_go_back: state.current_step > 0,
            can_go_next: !state.is_terminal(),
            is_terminal: state.is_terminal(),
            errors: state.errors.clone(),
        }
    }

    /// Start an async operation whose output is merged into this wizard's
    /// store when it resolves.
    pub fn spawn<Fut, M>(&mut self, name: &'static str, operation: Fut, merge: M)
    where
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
        M: FnOnce(&mut WizardStore<F>, Fut::Output) + Send + 'static,
    {
        self.tasks.spawn(name, operation, merge);
    }

    pub fn tasks_in_flight(&self) -> usize {
        self.tasks.in_flight()
    }

    /// Wait for all spawned operations to resolve.
    pub async fn join_pending(&mut self) {
        self.tasks.join_all().await;
    }

    /// Discard all progress.
    pub async fn reset(&self) {
        self.store.write().await.reset();
    }
}
