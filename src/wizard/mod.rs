//! Generic multi-step wizard engine.
//!
//! A wizard is a sequence of steps with bounded back/forward navigation.
//! Each concrete wizard implements [`WizardFlow`]: its steps, its typed data,
//! the partial updates accepted per step, and one validator per step. The
//! [`WizardController`] gates `next` on the active step's validator and
//! merges results of async operations back into the [`WizardStore`].

pub mod controller;
pub mod flow;
pub mod store;
pub mod task;
pub mod validation;

pub use controller::{StepView, Transition, WizardController};
pub use flow::{WizardFlow, WizardStep};
pub use store::{WizardState, WizardStore};
pub use task::{StoreHandle, TaskRunner, TaskState};
pub use validation::{FieldErrors, derive_slug, is_valid_email, is_valid_slug, suggest_slug};
