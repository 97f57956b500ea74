//! Wizard state store: current step, typed step data and field errors.

use serde::Serialize;
use tracing::debug;

use super::flow::{WizardFlow, WizardStep};
use super::validation::FieldErrors;

/// Snapshot of one wizard instance.
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = ""))]
pub struct WizardState<F: WizardFlow> {
    /// Always within `0..=total_steps`.
    pub current_step: usize,
    /// Index of the terminal step, fixed at construction.
    pub total_steps: usize,
    pub data: F::Data,
    pub errors: FieldErrors,
}

impl<F: WizardFlow> WizardState<F> {
    /// The step `current_step` points at.
    pub fn step(&self) -> F::Step {
        F::Step::from_index(self.current_step).unwrap_or(F::Step::ALL[0])
    }

    pub fn is_terminal(&self) -> bool {
        self.current_step == self.total_steps
    }
}

impl<F: WizardFlow> Default for WizardState<F> {
    fn default() -> Self {
        Self {
            current_step: 0,
            total_steps: F::Step::last_index(),
            data: F::Data::default(),
            errors: FieldErrors::new(),
        }
    }
}

/// Owns the state of a single wizard. Not shared across wizards.
#[derive(Debug)]
pub struct WizardStore<F: WizardFlow> {
    state: WizardState<F>,
}

impl<F: WizardFlow> Default for WizardStore<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: WizardFlow> WizardStore<F> {
    /// Fresh store at step 0 with empty defaults.
    pub fn new() -> Self {
        Self {
            state: WizardState::default(),
        }
    }

    /// Fresh store at step 0 seeded with `data`.
    pub fn with_data(data: F::Data) -> Self {
        Self {
            state: WizardState {
                data,
                ..WizardState::default()
            },
        }
    }

    pub fn state(&self) -> &WizardState<F> {
        &self.state
    }

    pub fn snapshot(&self) -> WizardState<F> {
        self.state.clone()
    }

    pub fn data(&self) -> &F::Data {
        &self.state.data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.state.errors
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.state.total_steps
    }

    /// Merge a partial record and clear errors for the touched fields only.
    pub fn update_step_data(&mut self, patch: F::Patch) -> Vec<&'static str> {
        let touched = F::apply(&mut self.state.data, patch);
        for field in &touched {
            self.state.errors.remove(field);
        }
        touched
    }

    /// Move to `index`. Out-of-range indexes are ignored.
    ///
    /// Returns whether the step changed.
    pub fn set_step(&mut self, index: usize) -> bool {
        if index > self.state.total_steps || index == self.state.current_step {
            return false;
        }
        debug!(
            from = self.state.current_step,
            to = index,
            "Wizard step changed"
        );
        self.state.current_step = index;
        true
    }

    /// Step forward unless already at the terminal step.
    pub fn advance(&mut self) -> bool {
        if self.state.current_step >= self.state.total_steps {
            return false;
        }
        self.set_step(self.state.current_step + 1)
    }

    /// Step back unless already at step 0.
    pub fn retreat(&mut self) -> bool {
        if self.state.current_step == 0 {
            return false;
        }
        self.set_step(self.state.current_step - 1)
    }

    /// Replace all errors, e.g. with a validator's output.
    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.state.errors = errors;
    }

    pub fn set_field_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.state.errors.insert(field, message);
    }

    pub fn clear_errors(&mut self) {
        self.state.errors.clear();
    }

    /// Back to step 0 with empty defaults.
    pub fn reset(&mut self) {
        self.state = WizardState::default();
    }
}
