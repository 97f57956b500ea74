//! The two traits a concrete wizard implements to run on the engine.

use std::fmt::{Debug, Display};

use serde::Serialize;

use super::validation::FieldErrors;

/// One screen of a wizard.
///
/// Steps are ordered by their position in [`ALL`](WizardStep::ALL); the last
/// entry is the terminal (summary) step.
pub trait WizardStep: Copy + Eq + Debug + Display + Serialize + Send + Sync + 'static {
    const ALL: &'static [Self];

    /// Label shown in the step indicator.
    fn label(&self) -> &'static str;

    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|s| s == self)
            .unwrap_or_default()
    }

    /// Index of the terminal step.
    fn last_index() -> usize {
        Self::ALL.len().saturating_sub(1)
    }
}

/// Data, mutations and validation rules of a concrete wizard.
pub trait WizardFlow: Debug + Clone + Send + Sync + 'static {
    type Step: WizardStep;
    /// Typed record holding one sub-record per step.
    type Data: Default + Clone + Debug + Serialize + Send + Sync + 'static;
    /// A partial update addressed to one step's record.
    type Patch: Debug + Send + 'static;

    /// Merge `patch` into `data`, returning the fields it touched.
    ///
    /// Fields the patch does not mention are left untouched.
    fn apply(data: &mut Self::Data, patch: Self::Patch) -> Vec<&'static str>;

    /// Validate the record owned by `step`. Empty means valid.
    fn validate(step: Self::Step, data: &Self::Data) -> FieldErrors;
}
