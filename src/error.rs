//! Error types for the onboarding wizards.
//!
//! Collaborator failures (`ServiceError`) never escape a wizard: they are
//! converted into a [`StepError`] at the call site and recorded as a
//! field-level message on the active step.

/// Message shown when a collaborator fails in a way the user cannot fix.
pub const GENERIC_RETRY_MESSAGE: &str = "Something went wrong. Please try again.";

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Step error: {0}")]
    Step(#[from] StepError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors reported by external collaborators (identity service, image encoder).
///
/// The wizards only look at success vs. failure and the optional message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Request rejected: {}", message.as_deref().unwrap_or("no reason given"))]
    Rejected { message: Option<String> },

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),
}

impl ServiceError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: Some(message.into()),
        }
    }
}

/// Step-local errors. Every variant names the field it is displayed under.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    /// A field failed its validator. Blocks `Next` only.
    #[error("{message}")]
    FieldValidation { field: String, message: String },

    /// An add-member / add-skill style operation hit an existing entry.
    #[error("{message}")]
    DuplicateEntry { field: String, message: String },

    /// An async operation resolved to a failure the user can act on.
    #[error("{message}")]
    AsyncOperationFailure { field: String, message: String },

    /// A collaborator failed unexpectedly; the detail is logged, not shown.
    #[error("Something went wrong. Please try again.")]
    UnexpectedCollaborator { field: String, detail: String },
}

impl StepError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FieldValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DuplicateEntry {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Field the error renders beneath.
    pub fn field(&self) -> &str {
        match self {
            Self::FieldValidation { field, .. }
            | Self::DuplicateEntry { field, .. }
            | Self::AsyncOperationFailure { field, .. }
            | Self::UnexpectedCollaborator { field, .. } => field,
        }
    }

    /// Stable code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FieldValidation { .. } => "FIELD_VALIDATION",
            Self::DuplicateEntry { .. } => "DUPLICATE_ENTRY",
            Self::AsyncOperationFailure { .. } => "ASYNC_OPERATION_FAILURE",
            Self::UnexpectedCollaborator { .. } => "UNEXPECTED_COLLABORATOR",
        }
    }

    /// Convert a collaborator failure into the error shown under `field`.
    ///
    /// `fallback` is used when the collaborator rejected the request without
    /// a message. Unavailable/encoding failures are logged and degraded to
    /// [`GENERIC_RETRY_MESSAGE`].
    pub fn from_service(field: impl Into<String>, error: ServiceError, fallback: &str) -> Self {
        let field = field.into();
        match error {
            ServiceError::NotFound { entity, .. } => Self::AsyncOperationFailure {
                field,
                message: format!("{entity} not found"),
            },
            ServiceError::Rejected { message } => Self::AsyncOperationFailure {
                field,
                message: message.unwrap_or_else(|| fallback.to_string()),
            },
            other => {
                tracing::warn!(field = %field, error = %other, "Collaborator call failed");
                Self::UnexpectedCollaborator {
                    field,
                    detail: other.to_string(),
                }
            }
        }
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_error_codes() {
        assert_eq!(StepError::validation("name", "x").code(), "FIELD_VALIDATION");
        assert_eq!(StepError::duplicate("member_email", "x").code(), "DUPLICATE_ENTRY");
        let failure = StepError::from_service("invitation_code", ServiceError::rejected("no"), "");
        assert_eq!(failure.code(), "ASYNC_OPERATION_FAILURE");
    }

    #[test]
    fn not_found_becomes_user_facing_message() {
        let err = StepError::from_service(
            "invitation_code",
            ServiceError::not_found("Invitation", "INVALID"),
            "unused",
        );
        assert_eq!(err.field(), "invitation_code");
        assert_eq!(err.to_string(), "Invitation not found");
    }

    #[test]
    fn rejection_without_message_uses_fallback() {
        let err = StepError::from_service(
            "member_email",
            ServiceError::Rejected { message: None },
            "Failed to send invitation",
        );
        assert_eq!(err.to_string(), "Failed to send invitation");
    }

    #[test]
    fn unexpected_failures_are_degraded() {
        let err = StepError::from_service(
            "form",
            ServiceError::Unavailable("connection reset".into()),
            "unused",
        );
        assert_eq!(err.code(), "UNEXPECTED_COLLABORATOR");
        assert_eq!(err.to_string(), GENERIC_RETRY_MESSAGE);
    }

    #[test]
    fn top_level_error_wraps_service_errors() {
        let err: Error = ServiceError::Unavailable("down".into()).into();
        assert_eq!(err.to_string(), "Service error: Service unavailable: down");
    }
}
